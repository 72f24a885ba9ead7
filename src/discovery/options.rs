//! 服务发现参数

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{self, EtcdConfig};
use crate::error::Result;
use crate::selector::Selector;
use crate::service::Service;

/// 缓存变更通知
#[derive(Debug, Clone)]
pub enum ServiceEvent {
    /// 一条服务记录被写入或替换
    Put {
        name: String,
        id: String,
        service: Service,
    },
    /// 一条服务记录被删除
    Delete { name: String, id: String },
}

/// 每条已应用变更的同步回调
pub type WatchCallback = Arc<dyn Fn(&ServiceEvent) + Send + Sync>;

/// 服务发现参数
#[derive(Clone, Serialize, Deserialize)]
pub struct DiscoveryOptions {
    /// etcd 连接配置
    #[serde(default)]
    pub etcd: EtcdConfig,

    /// 默认选择器链，select 未指定选择器时使用
    #[serde(skip)]
    pub selectors: Vec<Arc<dyn Selector>>,

    /// 变更通知回调
    #[serde(skip)]
    pub watch: Option<WatchCallback>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            etcd: EtcdConfig::default(),
            selectors: Vec::new(),
            watch: None,
        }
    }
}

impl DiscoveryOptions {
    /// 创建默认参数
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 TOML 配置文件加载（选择器与回调不可序列化，保持默认）
    pub fn load_from_file(path: &str) -> Result<Self> {
        let mut opts: Self = config::load_toml(path)?;
        opts.etcd.normalize();
        Ok(opts)
    }

    /// 设置 etcd 地址
    pub fn with_endpoints(mut self, endpoints: Vec<String>) -> Self {
        self.etcd.endpoints = endpoints;
        self
    }

    /// 设置 etcd 用户名
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.etcd.username = Some(username.into());
        self
    }

    /// 设置 etcd 密码
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.etcd.password = Some(password.into());
        self
    }

    /// 设置服务发现前缀，自动补齐末尾的 `/`
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.etcd.prefix = config::normalize_prefix(prefix.into());
        self
    }

    /// 设置 etcd 操作超时时间
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.etcd.timeout = timeout;
        self
    }

    /// 追加一个默认选择器
    pub fn with_selector(mut self, selector: impl Selector + 'static) -> Self {
        self.selectors.push(Arc::new(selector));
        self
    }

    /// 设置变更通知回调
    pub fn with_watch(mut self, watch: impl Fn(&ServiceEvent) + Send + Sync + 'static) -> Self {
        self.watch = Some(Arc::new(watch));
        self
    }
}

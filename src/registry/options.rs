//! 服务注册参数

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{self, EtcdConfig};
use crate::error::Result;
use crate::service::Service;

const DEFAULT_TTL: Duration = Duration::from_secs(10);

fn default_ttl() -> Duration {
    DEFAULT_TTL
}

/// 服务注册参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryOptions {
    /// etcd 连接配置
    #[serde(default)]
    pub etcd: EtcdConfig,

    /// 服务存活时间，租约 TTL（秒）
    #[serde(default = "default_ttl", with = "config::secs")]
    pub ttl: Duration,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            etcd: EtcdConfig::default(),
            ttl: DEFAULT_TTL,
        }
    }
}

impl RegistryOptions {
    /// 创建默认参数
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 TOML 配置文件加载
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

    /// 设置服务注册前缀，自动补齐末尾的 `/`
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.etcd.prefix = config::normalize_prefix(prefix.into());
        self
    }

    /// 设置 etcd 操作超时时间
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.etcd.timeout = timeout;
        self
    }

    /// 设置服务存活时间
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// 生成服务注册 key：`<prefix><name>/<id>`
    pub fn service_key(&self, service: &Service) -> String {
        format!("{}{}/{}", self.etcd.prefix, service.name, service.id)
    }
}

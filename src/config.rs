//! etcd 连接配置
//!
//! 注册与发现组件共用的 etcd 连接参数，支持从 TOML 文件加载。

use std::time::Duration;

use etcd_client::ConnectOptions;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub(crate) const DEFAULT_PREFIX: &str = "/srsd/services/";
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

fn default_endpoints() -> Vec<String> {
    vec!["127.0.0.1:2379".to_string()]
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

/// etcd 连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtcdConfig {
    /// etcd 地址列表
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,

    /// etcd 用户名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// etcd 密码
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// 服务注册前缀，始终以 `/` 结尾
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// etcd 操作超时时间（秒）
    #[serde(default = "default_timeout", with = "secs")]
    pub timeout: Duration,
}

impl Default for EtcdConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            username: None,
            password: None,
            prefix: default_prefix(),
            timeout: default_timeout(),
        }
    }
}

impl EtcdConfig {
    /// 规范化前缀，反序列化后调用
    pub(crate) fn normalize(&mut self) {
        self.prefix = normalize_prefix(std::mem::take(&mut self.prefix));
    }

    /// 构造 etcd 客户端连接参数
    pub(crate) fn connect_options(&self) -> ConnectOptions {
        let mut opts = ConnectOptions::new()
            .with_timeout(self.timeout)
            .with_connect_timeout(self.timeout);
        if let (Some(user), Some(password)) = (&self.username, &self.password) {
            opts = opts.with_user(user.clone(), password.clone());
        }
        opts
    }
}

/// 补齐前缀末尾的 `/`
pub(crate) fn normalize_prefix(mut prefix: String) -> String {
    if !prefix.is_empty() && !prefix.ends_with('/') {
        prefix.push('/');
    }
    prefix
}

/// 读取 TOML 配置文件
pub(crate) fn load_toml<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Duration 与整数秒之间的 serde 转换
pub(crate) mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

//! 统一错误类型
//!
//! 所有 etcd 交互错误按操作分类，调用方可以按变体区分失败来源。

use thiserror::Error;

/// srsd 统一错误类型
#[derive(Debug, Error)]
pub enum SrsdError {
    /// etcd 连接失败（地址不可达或认证被拒）
    #[error("failed to connect to etcd: {0}")]
    Connect(etcd_client::Error),

    /// 服务信息序列化失败
    #[error("failed to serialize service record: {0}")]
    Serialize(serde_json::Error),

    /// 前缀扫描失败
    #[error("failed to scan service records: {0}")]
    Scan(etcd_client::Error),

    /// 服务 key 写入失败
    #[error("failed to put service record: {0}")]
    Put(etcd_client::Error),

    /// 服务 key 删除失败
    #[error("failed to delete service record: {0}")]
    Delete(etcd_client::Error),

    /// 租约申请或续期失败
    #[error("lease operation failed: {0}")]
    Lease(etcd_client::Error),

    /// watch 建立失败
    #[error("failed to start watch: {0}")]
    Watch(etcd_client::Error),

    /// etcd 操作超时
    #[error("etcd operation timed out: {0}")]
    Timeout(&'static str),

    /// 配置文件读取失败
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// 配置文件解析失败
    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// 非法的服务地址
    #[error("invalid address: {0}")]
    InvalidAddr(String),
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, SrsdError>;

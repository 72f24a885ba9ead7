//! 服务注册信息

mod set;

pub use set::ServiceSet;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::utils;

/// 服务注册信息
///
/// 一条记录是一个不可变快照：更新总是整条替换，不会远程修改单个字段。
/// `id` 在创建时分配一次，之后不再变化。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Service {
    /// 服务唯一 ID
    pub id: String,

    /// 服务名称，同名实例归为一个逻辑服务
    pub name: String,

    /// 版本
    pub version: String,

    /// 服务地址
    pub host: String,

    /// pprof 诊断地址
    #[serde(default)]
    pub pprof: String,

    /// 指标曝露地址
    #[serde(default)]
    pub metrics: String,

    /// 扩展信息
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// 服务注册时间，由注册组件在 start 时填写
    #[serde(default)]
    pub create_time: String,
}

impl Service {
    /// 创建 Service 对象，自动分配 ID
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: String::new(),
            version: "latest".to_string(),
            host: String::new(),
            pprof: String::new(),
            metrics: String::new(),
            metadata: HashMap::new(),
            create_time: String::new(),
        }
    }

    /// 设置服务名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 设置服务地址
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// 设置版本
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// 设置 pprof 地址
    pub fn with_pprof(mut self, pprof: impl Into<String>) -> Self {
        self.pprof = pprof.into();
        self
    }

    /// 设置指标地址
    pub fn with_metrics(mut self, metrics: impl Into<String>) -> Self {
        self.metrics = metrics.into();
        self
    }

    /// 添加扩展信息
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// 将 host、metrics、pprof 中未指定的监听地址解析为真实 IP
    pub fn resolve_addrs(&mut self) -> Result<()> {
        if !self.host.is_empty() {
            self.host = utils::real_addr(&self.host)?;
        }
        if !self.metrics.is_empty() {
            self.metrics = utils::real_addr(&self.metrics)?;
        }
        if !self.pprof.is_empty() {
            self.pprof = utils::real_addr(&self.pprof)?;
        }
        Ok(())
    }
}

impl Default for Service {
    fn default() -> Self {
        Self::new()
    }
}

//! srsd - etcd 服务注册与发现
//!
//! Lease-backed ephemeral service registration with automatic recovery,
//! a watch-synchronized local discovery cache, and pluggable instance
//! selection policies.

pub mod config;
pub mod discovery;
pub mod error;
pub mod registry;
pub mod selector;
pub mod service;
pub mod utils;

// Re-exports
pub use config::EtcdConfig;
pub use discovery::{
    Discovery, DiscoveryOptions, ServiceEvent, WatchCallback, service_id, service_name,
};
pub use error::{Result, SrsdError};
pub use registry::{Registry, RegistryOptions};
pub use selector::{Random, RoundRobin, Selector};
pub use service::{Service, ServiceSet};
pub use utils::real_addr;

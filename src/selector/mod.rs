//! 服务选择器
//!
//! 选择器是可组合的过滤器：输入候选实例列表，输出缩小后的列表
//! （通常只剩一个）。选择器不持有也不修改发现缓存，只对传入的
//! 快照做筛选。

mod random;
mod round;

pub use random::Random;
pub use round::RoundRobin;

use crate::service::Service;

/// 服务选择策略
///
/// `filter` 的输入列表由调用方保证非空。
pub trait Selector: Send + Sync {
    /// 从候选列表中筛选实例
    fn filter(&self, name: &str, services: Vec<Service>) -> Vec<Service>;
}

//! 随机选择器

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::service::Service;

use super::Selector;

/// 随机选择器
///
/// 随机源由实例自身持有，可独立播种。
pub struct Random {
    rng: Mutex<StdRng>,
}

impl Random {
    /// 创建随机选择器
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// 以固定种子创建随机选择器
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::new()
    }
}

impl Selector for Random {
    fn filter(&self, _name: &str, services: Vec<Service>) -> Vec<Service> {
        let index = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            rng.gen_range(0..services.len())
        };
        services.into_iter().skip(index).take(1).collect()
    }
}

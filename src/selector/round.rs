//! 轮询选择器

use std::collections::HashMap;
use std::sync::Mutex;

use crate::service::Service;

use super::Selector;

/// 轮询选择器
///
/// 每个服务名维护一个单调递增的游标，游标在所有调用方之间共享。
/// 未见过的服务名从 0 开始，游标无限回绕。
pub struct RoundRobin {
    cursor: Mutex<HashMap<String, usize>>,
}

impl RoundRobin {
    /// 创建轮询选择器
    pub fn new() -> Self {
        Self {
            cursor: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for RoundRobin {
    fn default() -> Self {
        Self::new()
    }
}

impl Selector for RoundRobin {
    fn filter(&self, name: &str, services: Vec<Service>) -> Vec<Service> {
        let index = {
            let mut cursor = self.cursor.lock().unwrap_or_else(|e| e.into_inner());
            let count = cursor.entry(name.to_string()).or_insert(0);
            let index = *count % services.len();
            *count = count.wrapping_add(1);
            index
        };
        services.into_iter().skip(index).take(1).collect()
    }
}

//! 单个服务名下的实例集合

use std::sync::RwLock;

use super::Service;

/// 一个服务名下的实例集合，按 ID 去重，保持插入顺序
///
/// 不变式：同一 ID 至多一条记录。put 为 upsert（ID 已存在时原位替换，
/// 否则追加），delete 删除该 ID 的所有记录。读写并发安全。
pub struct ServiceSet {
    name: String,
    list: RwLock<Vec<Service>>,
}

impl ServiceSet {
    /// 创建空集合
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            list: RwLock::new(Vec::new()),
        }
    }

    /// 集合对应的服务名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 插入或替换一条服务记录
    pub fn put(&self, service: Service) {
        let mut list = self.list.write().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = list.iter_mut().find(|s| s.id == service.id) {
            *existing = service;
        } else {
            list.push(service);
        }
    }

    /// 删除指定 ID 的服务记录，ID 不存在时不做任何事
    pub fn delete(&self, id: &str) {
        let mut list = self.list.write().unwrap_or_else(|e| e.into_inner());
        list.retain(|s| s.id != id);
    }

    /// 按 ID 查找
    pub fn get(&self, id: &str) -> Option<Service> {
        let list = self.list.read().unwrap_or_else(|e| e.into_inner());
        list.iter().find(|s| s.id == id).cloned()
    }

    /// 当前所有记录的快照
    pub fn all(&self) -> Vec<Service> {
        let list = self.list.read().unwrap_or_else(|e| e.into_inner());
        list.clone()
    }

    /// 记录条数
    pub fn len(&self) -> usize {
        let list = self.list.read().unwrap_or_else(|e| e.into_inner());
        list.len()
    }

    /// 集合是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

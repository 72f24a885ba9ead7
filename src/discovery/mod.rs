//! 服务发现组件
//!
//! 先全量扫描填充本地缓存，再由每个 scope 独立的 watch 任务增量
//! 同步。读路径只加共享锁，事件批次在独占锁下整体应用。

mod options;

pub use options::{DiscoveryOptions, ServiceEvent, WatchCallback};

use std::collections::HashMap;
use std::sync::Arc;

use etcd_client::{Client, EventType, GetOptions, WatchOptions, WatchResponse, WatchStream, Watcher};
use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Result, SrsdError};
use crate::selector::Selector;
use crate::service::{Service, ServiceSet};

/// 从注册 key 解析服务名
///
/// 去掉第一个出现的前缀后在最后一个 `/` 处切分，`/` 之前的部分是
/// 服务名。服务名自身可以包含 `/`，必须原样保留。
pub fn service_name(key: &str, prefix: &str) -> String {
    let key = key.replacen(prefix, "", 1);
    match key.rfind('/') {
        Some(index) if index > 0 => key[..index].to_string(),
        _ => key,
    }
}

/// 从注册 key 解析服务实例 ID（最后一个 `/` 之后的部分）
pub fn service_id(key: &str) -> String {
    match key.rfind('/') {
        Some(index) if index > 0 => key[index + 1..].to_string(),
        _ => key.to_string(),
    }
}

/// 服务发现组件
pub struct Discovery {
    opts: DiscoveryOptions,
    services: Arc<RwLock<HashMap<String, ServiceSet>>>,
    inner: Arc<Mutex<DisInner>>,
}

struct DisInner {
    client: Option<Client>,
    watchers: HashMap<String, CancellationToken>,
}

impl Discovery {
    /// 创建服务发现组件
    pub fn new(opts: DiscoveryOptions) -> Self {
        Self {
            opts,
            services: Arc::new(RwLock::new(HashMap::new())),
            inner: Arc::new(Mutex::new(DisInner {
                client: None,
                watchers: HashMap::new(),
            })),
        }
    }

    /// 发现参数
    pub fn options(&self) -> &DiscoveryOptions {
        &self.opts
    }

    /// 开启对一个 scope 的服务发现，空字符串表示前缀下的全部服务
    ///
    /// 按 scope 幂等。先在超时内全量扫描填充缓存，扫描成功后才启动
    /// 该 scope 唯一的 watch 任务。watch 流意外断开不会自动重连，
    /// 调用方需要重新 start 该 scope。
    pub async fn start(&self, name: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;

        let client = match inner.client.clone() {
            Some(client) => client,
            None => {
                let client = timeout(
                    self.opts.etcd.timeout,
                    Client::connect(&self.opts.etcd.endpoints, Some(self.opts.etcd.connect_options())),
                )
                .await
                .map_err(|_| SrsdError::Timeout("connect"))?
                .map_err(SrsdError::Connect)?;
                inner.client = Some(client.clone());
                client
            }
        };

        if inner.watchers.contains_key(name) {
            return Ok(());
        }

        self.load_all(client.clone(), name).await?;
        let token = self.start_watch(client, name).await?;
        inner.watchers.insert(name.to_string(), token);
        Ok(())
    }

    /// 获取一个服务实例
    ///
    /// 空服务名聚合所有已知服务。依次执行传入的选择器链（未传入时
    /// 使用配置的默认链），每个选择器进一步缩小候选列表；列表一旦
    /// 为空立即返回 None，否则返回剩余列表的第一个。
    pub async fn select(&self, name: &str, selectors: &[Arc<dyn Selector>]) -> Option<Service> {
        let services = self.services.read().await;
        let mut list: Vec<Service> = if name.is_empty() {
            services.values().flat_map(ServiceSet::all).collect()
        } else {
            services.get(name)?.all()
        };
        drop(services);

        if list.is_empty() {
            return None;
        }

        let chain = if selectors.is_empty() {
            self.opts.selectors.as_slice()
        } else {
            selectors
        };
        for selector in chain {
            list = selector.filter(name, list);
            if list.is_empty() {
                return None;
            }
        }
        list.into_iter().next()
    }

    /// 获取一个服务名下的全部实例快照，不经过选择器
    ///
    /// 空服务名聚合所有已知服务，未知服务名返回空列表。
    pub async fn get_all(&self, name: &str) -> Vec<Service> {
        let services = self.services.read().await;
        if name.is_empty() {
            services.values().flat_map(ServiceSet::all).collect()
        } else {
            services.get(name).map(ServiceSet::all).unwrap_or_default()
        }
    }

    /// 停止服务发现：取消全部 watch 任务，断开连接，清空缓存
    pub async fn stop(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        for (_, token) in inner.watchers.drain() {
            token.cancel();
        }
        if inner.client.take().is_some() {
            self.services.write().await.clear();
        }
        Ok(())
    }

    /// 有界时间内全量扫描 scope 前缀，解码失败的记录跳过
    async fn load_all(&self, mut client: Client, name: &str) -> Result<()> {
        let scan_prefix = format!("{}{}", self.opts.etcd.prefix, name);
        let resp = timeout(
            self.opts.etcd.timeout,
            client.get(scan_prefix, Some(GetOptions::new().with_prefix())),
        )
        .await
        .map_err(|_| SrsdError::Timeout("scan"))?
        .map_err(SrsdError::Scan)?;

        let mut services = self.services.write().await;
        for kv in resp.kvs() {
            let service: Service = match serde_json::from_slice(kv.value()) {
                Ok(service) => service,
                Err(e) => {
                    debug!(error = %e, "skipping undecodable service record");
                    continue;
                }
            };
            let key = String::from_utf8_lossy(kv.key());
            let name = service_name(&key, &self.opts.etcd.prefix);
            services
                .entry(name.clone())
                .or_insert_with(|| ServiceSet::new(name))
                .put(service);
        }
        Ok(())
    }

    /// 为一个 scope 启动 watch 任务
    async fn start_watch(&self, mut client: Client, name: &str) -> Result<CancellationToken> {
        let watch_prefix = format!("{}{}", self.opts.etcd.prefix, name);
        let (watcher, stream) = timeout(
            self.opts.etcd.timeout,
            client.watch(watch_prefix.clone(), Some(WatchOptions::new().with_prefix())),
        )
        .await
        .map_err(|_| SrsdError::Timeout("watch"))?
        .map_err(SrsdError::Watch)?;

        let token = CancellationToken::new();
        let task = WatchTask {
            prefix: self.opts.etcd.prefix.clone(),
            services: self.services.clone(),
            callback: self.opts.watch.clone(),
        };
        tokio::spawn(task.run(watcher, stream, token.clone()));
        debug!(scope = %watch_prefix, "watch started");
        Ok(token)
    }
}

/// 单个 scope 的 watch 任务
struct WatchTask {
    prefix: String,
    services: Arc<RwLock<HashMap<String, ServiceSet>>>,
    callback: Option<WatchCallback>,
}

impl WatchTask {
    async fn run(self, mut watcher: Watcher, mut stream: WatchStream, token: CancellationToken) {
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    let _ = watcher.cancel().await;
                    return;
                }
                msg = stream.message() => match msg {
                    Ok(Some(resp)) => {
                        if resp.canceled() {
                            debug!("watch canceled by server");
                            return;
                        }
                        self.apply(&resp).await;
                    }
                    Ok(None) => {
                        // 不自动重连，由调用方重新 start 对应 scope
                        warn!("watch stream closed unexpectedly");
                        return;
                    }
                    Err(e) => {
                        warn!(error = %e, "watch stream error");
                        return;
                    }
                }
            }
        }
    }

    /// 一个事件批次在一次写锁内整体应用，读者不会看到半个批次
    async fn apply(&self, resp: &WatchResponse) {
        let mut services = self.services.write().await;
        for event in resp.events() {
            let Some(kv) = event.kv() else { continue };
            let key = String::from_utf8_lossy(kv.key()).to_string();
            let name = service_name(&key, &self.prefix);
            let id = service_id(&key);

            match event.event_type() {
                EventType::Put => {
                    let service: Service = match serde_json::from_slice(kv.value()) {
                        Ok(service) => service,
                        Err(e) => {
                            debug!(error = %e, key = %key, "skipping undecodable service record");
                            continue;
                        }
                    };
                    services
                        .entry(name.clone())
                        .or_insert_with(|| ServiceSet::new(name.clone()))
                        .put(service.clone());
                    if let Some(callback) = &self.callback {
                        callback(&ServiceEvent::Put { name, id, service });
                    }
                }
                EventType::Delete => {
                    if let Some(set) = services.get(&name) {
                        set.delete(&id);
                    }
                    if let Some(callback) = &self.callback {
                        callback(&ServiceEvent::Delete { name, id });
                    }
                }
            }
        }
    }
}

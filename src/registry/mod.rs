//! 服务注册组件
//!
//! 以租约绑定的方式把一个服务实例写入 etcd，后台任务持续续期。
//! 续期流异常断开时自动重新注册，显式 stop 永久取消注册与恢复。

mod options;

pub use options::RegistryOptions;

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use etcd_client::{Client, PutOptions};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Result, SrsdError};
use crate::service::Service;

/// 服务注册组件
///
/// 状态机：`Stopped --start--> Active`；续期流断开后进入恢复，
/// 恢复期间组件仍视为活跃（注册意图未变），直到重新注册成功或
/// 显式 `stop`。start/stop 在同一把锁下互斥。
#[derive(Clone)]
pub struct Registry {
    opts: Arc<RegistryOptions>,
    key: String,
    inner: Arc<Mutex<RegInner>>,
}

struct RegInner {
    service: Service,
    client: Option<Client>,
    started: bool,
    heartbeat: Option<CancellationToken>,
}

impl Registry {
    /// 创建服务注册组件，注册 key 在此一次性生成
    pub fn new(service: Service, opts: RegistryOptions) -> Self {
        let key = opts.service_key(&service);
        Self {
            opts: Arc::new(opts),
            key,
            inner: Arc::new(Mutex::new(RegInner {
                service,
                client: None,
                started: false,
                heartbeat: None,
            })),
        }
    }

    /// 注册参数
    pub fn options(&self) -> &RegistryOptions {
        &self.opts
    }

    /// 服务注册 key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// 开启服务注册
    ///
    /// 幂等：已经活跃时直接返回成功，不会产生第二个租约或重复 key。
    pub async fn start(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.started {
            return Ok(());
        }

        let (client, lease_id) = self.register_locked(&mut inner).await?;

        let token = CancellationToken::new();
        inner.heartbeat = Some(token.clone());
        inner.started = true;

        let reg = self.clone();
        tokio::spawn(reg.heartbeat(client, lease_id, token));

        Ok(())
    }

    /// 停止服务注册
    ///
    /// 幂等：未活跃时不做任何事。删除 key 不关联租约，租约过期后
    /// 删除依然成功。删除失败时状态保持不变，调用方可重试。
    pub async fn stop(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if !inner.started {
            return Ok(());
        }

        self.teardown_locked(&mut inner).await?;

        if let Some(token) = inner.heartbeat.take() {
            token.cancel();
        }
        inner.started = false;
        info!(key = %self.key, "service deregistered");
        Ok(())
    }

    /// 完整执行一次注册：建连、盖注册时间戳、序列化、申请租约、写入
    async fn register_locked(&self, inner: &mut RegInner) -> Result<(Client, i64)> {
        let op_timeout = self.opts.etcd.timeout;

        let mut client = match inner.client.clone() {
            Some(client) => client,
            None => {
                let client = timeout(
                    op_timeout,
                    Client::connect(&self.opts.etcd.endpoints, Some(self.opts.etcd.connect_options())),
                )
                .await
                .map_err(|_| SrsdError::Timeout("connect"))?
                .map_err(SrsdError::Connect)?;
                inner.client = Some(client.clone());
                client
            }
        };

        inner.service.create_time = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let value = serde_json::to_string(&inner.service).map_err(SrsdError::Serialize)?;

        let grant = timeout(
            op_timeout,
            client.lease_grant(self.opts.ttl.as_secs() as i64, None),
        )
        .await
        .map_err(|_| SrsdError::Timeout("lease grant"))?
        .map_err(SrsdError::Lease)?;
        let lease_id = grant.id();

        timeout(
            op_timeout,
            client.put(
                self.key.clone(),
                value,
                Some(PutOptions::new().with_lease(lease_id)),
            ),
        )
        .await
        .map_err(|_| SrsdError::Timeout("put"))?
        .map_err(SrsdError::Put)?;

        info!(key = %self.key, lease = lease_id, "service registered");
        Ok((client, lease_id))
    }

    /// 清除当前注册：删除 key、丢弃客户端连接
    async fn teardown_locked(&self, inner: &mut RegInner) -> Result<()> {
        if let Some(mut client) = inner.client.clone() {
            timeout(self.opts.etcd.timeout, client.delete(self.key.clone(), None))
                .await
                .map_err(|_| SrsdError::Timeout("delete"))?
                .map_err(SrsdError::Delete)?;
        }
        inner.client = None;
        Ok(())
    }

    /// 心跳任务：持续续期租约，续期流断开后转入恢复
    async fn heartbeat(self, mut client: Client, mut lease_id: i64, token: CancellationToken) {
        let period = (self.opts.ttl / 3).max(Duration::from_secs(1));
        loop {
            if Self::keep_alive(&mut client, lease_id, period, &token).await {
                return;
            }
            match self.recover(&token).await {
                Some((new_client, new_lease)) => {
                    client = new_client;
                    lease_id = new_lease;
                }
                None => return,
            }
        }
    }

    /// 续期循环，返回 true 表示被取消，false 表示续期流断开
    async fn keep_alive(
        client: &mut Client,
        lease_id: i64,
        period: Duration,
        token: &CancellationToken,
    ) -> bool {
        let (mut keeper, mut stream) = match client.lease_keep_alive(lease_id).await {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, lease = lease_id, "failed to open keep-alive stream");
                return false;
            }
        };

        let mut ticker = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = token.cancelled() => return true,
                _ = ticker.tick() => {
                    if let Err(e) = keeper.keep_alive().await {
                        warn!(error = %e, lease = lease_id, "lease renewal request failed");
                        return false;
                    }
                }
                resp = stream.next() => match resp {
                    Some(Ok(resp)) if resp.ttl() > 0 => {
                        debug!(lease = lease_id, ttl = resp.ttl(), "lease renewed");
                    }
                    Some(Ok(_)) => {
                        warn!(lease = lease_id, "lease expired");
                        return false;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, lease = lease_id, "keep-alive stream error");
                        return false;
                    }
                    None => {
                        warn!(lease = lease_id, "keep-alive stream closed");
                        return false;
                    }
                }
            }
        }
    }

    /// 恢复循环：固定间隔反复尝试清除旧注册并重新注册，直到成功
    /// 或显式 stop 介入。每次重试前都在 start/stop 的锁下复查活跃
    /// 标志。
    async fn recover(&self, token: &CancellationToken) -> Option<(Client, i64)> {
        let delay = self.opts.etcd.timeout;
        loop {
            if token.is_cancelled() {
                return None;
            }
            {
                let mut inner = self.inner.lock().await;
                if !inner.started {
                    return None;
                }
                match self.teardown_locked(&mut inner).await {
                    Ok(()) => match self.register_locked(&mut inner).await {
                        Ok(pair) => {
                            info!(key = %self.key, "service re-registered");
                            return Some(pair);
                        }
                        Err(e) => {
                            warn!(error = %e, key = %self.key, "re-registration failed, retrying")
                        }
                    },
                    Err(e) => {
                        warn!(error = %e, key = %self.key, "stale registration cleanup failed, retrying")
                    }
                }
            }
            tokio::select! {
                _ = token.cancelled() => return None,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

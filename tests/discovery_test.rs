//! 服务发现组件测试（不依赖 etcd 的部分）

use std::time::Duration;

use srsd::{service_id, service_name, Discovery, DiscoveryOptions, Random};

#[test]
fn service_name_strips_prefix_and_id() {
    let name = service_name("/srsd/services/zacyuan.com/aaaa", "/srsd/services/");
    assert_eq!(name, "zacyuan.com");
}

#[test]
fn service_name_preserves_slashes_inside_name() {
    let name = service_name(
        "/srsd/services/srsd/services/zacyuan.com/aaaa",
        "/srsd/services/",
    );
    assert_eq!(name, "srsd/services/zacyuan.com");
}

#[test]
fn service_name_without_id_segment() {
    let name = service_name("/srsd/services/zacyuan.com", "/srsd/services/");
    assert_eq!(name, "zacyuan.com");
}

#[test]
fn service_id_is_last_segment() {
    assert_eq!(service_id("/srsd/services/zacyuan.com/aaaa"), "aaaa");
}

#[test]
fn options_defaults() {
    let opts = DiscoveryOptions::new();
    assert_eq!(opts.etcd.endpoints, vec!["127.0.0.1:2379".to_string()]);
    assert_eq!(opts.etcd.prefix, "/srsd/services/");
    assert_eq!(opts.etcd.timeout, Duration::from_secs(5));
    assert!(opts.etcd.username.is_none());
    assert!(opts.selectors.is_empty());
    assert!(opts.watch.is_none());
}

#[test]
fn options_builder_normalizes_prefix() {
    let opts = DiscoveryOptions::new()
        .with_endpoints(vec!["127.0.0.1:2379".to_string()])
        .with_username("zacyuan")
        .with_password("12345678")
        .with_prefix("/zacyuan/test")
        .with_timeout(Duration::from_secs(3))
        .with_selector(Random::new());

    assert_eq!(opts.etcd.username.as_deref(), Some("zacyuan"));
    assert_eq!(opts.etcd.password.as_deref(), Some("12345678"));
    assert_eq!(opts.etcd.prefix, "/zacyuan/test/");
    assert_eq!(opts.etcd.timeout, Duration::from_secs(3));
    assert_eq!(opts.selectors.len(), 1);
}

#[tokio::test]
async fn select_and_get_all_on_empty_cache() {
    let discovery = Discovery::new(DiscoveryOptions::new());

    assert!(discovery.select("zacyuan.com", &[]).await.is_none());
    assert!(discovery.select("", &[]).await.is_none());
    assert!(discovery.get_all("zacyuan.com").await.is_empty());
    assert!(discovery.get_all("").await.is_empty());
}

#[tokio::test]
async fn start_fails_when_etcd_unreachable() {
    let discovery = Discovery::new(
        DiscoveryOptions::new()
            .with_endpoints(vec!["127.0.0.1:1".to_string()])
            .with_timeout(Duration::from_secs(1)),
    );

    assert!(discovery.start("").await.is_err());
}

#[tokio::test]
async fn stop_is_idempotent() {
    let discovery = Discovery::new(DiscoveryOptions::new());
    discovery.stop().await.expect("first stop");
    discovery.stop().await.expect("second stop");
}

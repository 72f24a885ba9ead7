//! 服务注册组件测试（不依赖 etcd 的部分）

use std::time::Duration;

use srsd::{Registry, RegistryOptions, Service};

#[test]
fn options_defaults() {
    let opts = RegistryOptions::new();
    assert_eq!(opts.etcd.endpoints, vec!["127.0.0.1:2379".to_string()]);
    assert_eq!(opts.etcd.prefix, "/srsd/services/");
    assert_eq!(opts.etcd.timeout, Duration::from_secs(5));
    assert_eq!(opts.ttl, Duration::from_secs(10));
}

#[test]
fn options_builder_sets_all_fields() {
    let opts = RegistryOptions::new()
        .with_endpoints(vec!["127.0.0.1:2379".to_string()])
        .with_username("zacyuan")
        .with_password("12345678")
        .with_prefix("/zacyuan/test")
        .with_timeout(Duration::from_secs(3))
        .with_ttl(Duration::from_secs(60));

    assert_eq!(opts.etcd.endpoints, vec!["127.0.0.1:2379".to_string()]);
    assert_eq!(opts.etcd.username.as_deref(), Some("zacyuan"));
    assert_eq!(opts.etcd.password.as_deref(), Some("12345678"));
    assert_eq!(opts.etcd.prefix, "/zacyuan/test/");
    assert_eq!(opts.etcd.timeout, Duration::from_secs(3));
    assert_eq!(opts.ttl, Duration::from_secs(60));
}

#[test]
fn service_key_joins_prefix_name_and_id() {
    let mut service = Service::new().with_name("zacyuan.com");
    service.id = "aaaa".to_string();

    let opts = RegistryOptions::new();
    assert_eq!(opts.service_key(&service), "/srsd/services/zacyuan.com/aaaa");
}

#[test]
fn registry_derives_key_at_creation() {
    let mut service = Service::new().with_name("zacyuan.com").with_host("127.0.0.1:4444");
    service.id = "aaaa".to_string();

    let registry = Registry::new(service, RegistryOptions::new().with_prefix("/zacyuan/test"));
    assert_eq!(registry.key(), "/zacyuan/test/zacyuan.com/aaaa");
    assert_eq!(registry.options().etcd.prefix, "/zacyuan/test/");
}

#[tokio::test]
async fn stop_before_start_is_noop() {
    let service = Service::new().with_name("zacyuan.com").with_host("127.0.0.1:4444");
    let registry = Registry::new(service, RegistryOptions::new());

    registry.stop().await.expect("stop without start");
}

#[tokio::test]
async fn start_fails_when_etcd_unreachable() {
    let service = Service::new().with_name("zacyuan.com").with_host("127.0.0.1:4444");
    let registry = Registry::new(
        service,
        RegistryOptions::new()
            .with_endpoints(vec!["127.0.0.1:1".to_string()])
            .with_timeout(Duration::from_secs(1)),
    );

    assert!(registry.start().await.is_err());
    // 失败的 start 不应留下活跃状态
    registry.stop().await.expect("stop after failed start");
}

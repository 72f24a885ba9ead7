//! 选择器行为测试

use srsd::{Random, RoundRobin, Selector, Service};

fn candidates(n: usize) -> Vec<Service> {
    (0..n)
        .map(|i| {
            let mut service = Service::new()
                .with_name("zacyuan.com")
                .with_host(format!("127.0.0.1:{}", 4000 + i));
            service.id = i.to_string();
            service
        })
        .collect()
}

#[test]
fn round_robin_returns_exact_rotation() {
    let round = RoundRobin::new();
    let list = candidates(3);

    let picked: Vec<String> = (0..7)
        .map(|_| round.filter("zacyuan.com", list.clone())[0].id.clone())
        .collect();
    assert_eq!(picked, ["0", "1", "2", "0", "1", "2", "0"]);
}

#[test]
fn round_robin_new_name_starts_at_zero() {
    let round = RoundRobin::new();
    let list = candidates(3);

    assert_eq!(round.filter("a", list.clone())[0].id, "0");
    assert_eq!(round.filter("a", list.clone())[0].id, "1");
    // 未见过的服务名游标从 0 开始，互不影响
    assert_eq!(round.filter("b", list.clone())[0].id, "0");
    assert_eq!(round.filter("a", list)[0].id, "2");
}

#[test]
fn round_robin_always_returns_one() {
    let round = RoundRobin::new();
    for _ in 0..10 {
        assert_eq!(round.filter("zacyuan.com", candidates(4)).len(), 1);
    }
}

#[test]
fn random_single_candidate_always_selected() {
    let random = Random::new();
    for _ in 0..20 {
        let picked = random.filter("zacyuan.com", candidates(1));
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].id, "0");
    }
}

#[test]
fn random_draws_from_input() {
    let random = Random::new();
    let list = candidates(5);
    let ids: Vec<String> = list.iter().map(|s| s.id.clone()).collect();

    for _ in 0..50 {
        let picked = random.filter("zacyuan.com", list.clone());
        assert_eq!(picked.len(), 1);
        assert!(ids.contains(&picked[0].id));
    }
}

#[test]
fn random_with_seed_is_deterministic() {
    let a = Random::with_seed(42);
    let b = Random::with_seed(42);
    let list = candidates(10);

    for _ in 0..20 {
        assert_eq!(
            a.filter("zacyuan.com", list.clone())[0].id,
            b.filter("zacyuan.com", list.clone())[0].id
        );
    }
}

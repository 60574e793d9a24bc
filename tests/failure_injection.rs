//! Failure injection tests for the load balancer.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;

mod common;

#[tokio::test]
async fn test_round_robin_rotation() {
    let a = common::start_mock_backend("127.0.0.1:0".parse().unwrap(), "a").await;
    let b = common::start_mock_backend("127.0.0.1:0".parse().unwrap(), "b").await;
    let c = common::start_mock_backend("127.0.0.1:0".parse().unwrap(), "c").await;

    let (lb_addr, shutdown) = common::start_balancer(common::config_for(&[a, b, c])).await;
    let client = common::client();

    let mut seen = Vec::new();
    for _ in 0..6 {
        let res = client
            .get(format!("http://{}/", lb_addr))
            .send()
            .await
            .expect("Balancer unreachable");
        assert_eq!(res.status(), StatusCode::OK);
        seen.push(res.text().await.unwrap());
    }

    // The cursor advances before the first pick, so rotation starts at the second backend.
    assert_eq!(seen, vec!["b", "c", "a", "b", "c", "a"]);

    shutdown.trigger();
}

#[tokio::test]
async fn test_retry_on_transient_failure() {
    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    let backend = common::start_programmable_backend("127.0.0.1:0".parse().unwrap(), move || {
        let cc = cc.clone();
        async move {
            // Drop the first two connections without answering.
            let count = cc.fetch_add(1, Ordering::SeqCst);
            if count < 2 {
                (0, String::new())
            } else {
                (200, "Success".into())
            }
        }
    })
    .await;

    let (lb_addr, shutdown) = common::start_balancer(common::config_for(&[backend])).await;

    let res = common::client()
        .get(format!("http://{}/", lb_addr))
        .send()
        .await
        .expect("Balancer unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(call_count.load(Ordering::SeqCst), 3);

    shutdown.trigger();
}

#[tokio::test]
async fn test_failover_past_dead_backend() {
    let live = common::start_mock_backend("127.0.0.1:0".parse().unwrap(), "live").await;
    let dead = common::closed_port().await;

    // Index 1 is picked first, so the dead backend is tried before the live one.
    let (lb_addr, shutdown) = common::start_balancer(common::config_for(&[live, dead])).await;
    let client = common::client();

    for _ in 0..4 {
        let res = client
            .get(format!("http://{}/", lb_addr))
            .send()
            .await
            .expect("Balancer unreachable");
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.text().await.unwrap(), "live");
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_all_backends_down() {
    let first = common::closed_port().await;
    let second = common::closed_port().await;

    let (lb_addr, shutdown) = common::start_balancer(common::config_for(&[first, second])).await;
    let client = common::client();

    for _ in 0..2 {
        let res = client
            .get(format!("http://{}/", lb_addr))
            .send()
            .await
            .expect("Balancer unreachable");
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(res.text().await.unwrap(), "Service not available");
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_error_status_is_passed_through() {
    let ok = common::start_mock_backend("127.0.0.1:0".parse().unwrap(), "ok").await;
    let broken = common::start_programmable_backend("127.0.0.1:0".parse().unwrap(), || async {
        (500, "boom".to_string())
    })
    .await;

    let (lb_addr, shutdown) = common::start_balancer(common::config_for(&[ok, broken])).await;
    let client = common::client();

    let mut statuses = Vec::new();
    for _ in 0..4 {
        let res = client
            .get(format!("http://{}/", lb_addr))
            .send()
            .await
            .expect("Balancer unreachable");
        statuses.push(res.status().as_u16());
    }

    // A 500 is a valid answer: the backend stays in rotation.
    assert_eq!(statuses, vec![500, 200, 500, 200]);

    shutdown.trigger();
}

#[tokio::test]
async fn test_body_and_forwarded_for_reach_backend() {
    let echo = common::start_echo_backend().await;
    let (lb_addr, shutdown) = common::start_balancer(common::config_for(&[echo])).await;

    let res = common::client()
        .post(format!("http://{}/submit?x=1", lb_addr))
        .body("payload")
        .send()
        .await
        .expect("Balancer unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "127.0.0.1|payload");

    shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let backend = common::start_mock_backend("127.0.0.1:0".parse().unwrap(), "ok").await;
    let mut config = common::config_for(&[backend]);
    config.limits.max_body_bytes = 16;

    let (lb_addr, shutdown) = common::start_balancer(config).await;

    let res = common::client()
        .post(format!("http://{}/", lb_addr))
        .body(vec![b'x'; 64])
        .send()
        .await
        .expect("Balancer unreachable");

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);

    shutdown.trigger();
}

#[tokio::test]
async fn test_health_check_revives_backend() {
    let live = common::start_mock_backend("127.0.0.1:0".parse().unwrap(), "live").await;
    let revived = common::closed_port().await;

    let mut config = common::config_for(&[live, revived]);
    config.health_check.enabled = true;
    config.health_check.interval_secs = 1;
    config.health_check.timeout_secs = 1;

    let (lb_addr, shutdown) = common::start_balancer(config).await;
    let client = common::client();

    // First request fails over and marks the closed port dead.
    let res = client
        .get(format!("http://{}/", lb_addr))
        .send()
        .await
        .expect("Balancer unreachable");
    assert_eq!(res.text().await.unwrap(), "live");

    common::start_mock_backend(revived, "revived").await;
    tokio::time::sleep(Duration::from_millis(2500)).await;

    let mut seen = Vec::new();
    for _ in 0..4 {
        let res = client
            .get(format!("http://{}/", lb_addr))
            .send()
            .await
            .expect("Balancer unreachable");
        seen.push(res.text().await.unwrap());
    }

    assert!(
        seen.iter().any(|body| body == "revived"),
        "revived backend should be back in rotation, saw {:?}",
        seen
    );

    shutdown.trigger();
}

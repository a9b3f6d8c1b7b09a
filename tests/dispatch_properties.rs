//! Scheduling properties of the dispatch pool, checked on a paused clock.

mod common;

use battlenet_api::batch::{Completion, DispatchPool, DispatchSettings};
use battlenet_api::resilience::rate_limiter::RateLimiterConfig;
use battlenet_api::{BattleNetClient, Error};
use common::{descriptors, ScriptedTransport};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn settings(max_concurrency: usize, rate_limit: RateLimiterConfig) -> DispatchSettings {
    DispatchSettings {
        max_concurrency,
        rate_limit,
        locale: Some("en_US".into()),
        api_key: Some("KEY".into()),
    }
}

#[tokio::test(start_paused = true)]
async fn test_slots_refill_in_submission_order() {
    let transport = ScriptedTransport::new(Duration::from_millis(10))
        .with_latencies_ms(&[30, 10, 10, 10, 10])
        .into_shared();
    let pool = DispatchPool::new(settings(2, RateLimiterConfig::disabled()), transport.clone());

    let mut completed = Vec::new();
    let report = pool
        .run(descriptors(5), &mut |c: &Completion| completed.push(c.index()))
        .await
        .unwrap();

    assert_eq!(transport.issue_order(), vec![0, 1, 2, 3, 4]);
    assert_eq!(completed.len(), 5);
    assert_eq!(completed.iter().copied().collect::<BTreeSet<_>>().len(), 5);
    assert_eq!(completed[0], 1);
    assert_eq!(completed[1], 2);
    assert!(transport.max_active() <= 2);
    assert_eq!(report.max_in_flight, 2);
    assert!(report.all_succeeded());
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_cap_holds_for_large_batches() {
    let latencies: Vec<u64> = (0..40).map(|i| 5 + (i * 7) % 23).collect();
    let transport = ScriptedTransport::new(Duration::from_millis(10))
        .with_latencies_ms(&latencies)
        .into_shared();
    let pool = DispatchPool::new(settings(3, RateLimiterConfig::disabled()), transport.clone());

    let mut calls = 0;
    let report = pool
        .run(descriptors(40), &mut |_: &Completion| calls += 1)
        .await
        .unwrap();

    assert_eq!(calls, 40);
    assert_eq!(report.completed(), 40);
    assert_eq!(transport.max_active(), 3);
    assert_eq!(report.max_in_flight, 3);
    assert_eq!(transport.issue_order(), (0..40).collect::<Vec<_>>());
}

#[tokio::test(start_paused = true)]
async fn test_per_second_ceiling_spreads_issuance() {
    let transport = ScriptedTransport::new(Duration::from_millis(10)).into_shared();
    let limit = RateLimiterConfig::disabled().with_per_second(3);
    let pool = DispatchPool::new(settings(10, limit), transport.clone());

    let start = Instant::now();
    let report = pool
        .run(descriptors(10), &mut |_: &Completion| {})
        .await
        .unwrap();

    assert_eq!(
        transport.issue_seconds(start),
        vec![0, 0, 0, 1, 1, 1, 2, 2, 2, 3]
    );
    assert_eq!(report.throttle_pauses, 3);
    assert_eq!(report.throttled_for, Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_hour_ceiling_waits_after_second_pause() {
    let transport = ScriptedTransport::new(Duration::from_millis(10)).into_shared();
    let limit = RateLimiterConfig::new(2, 4);
    let pool = DispatchPool::new(settings(10, limit), transport.clone());

    let start = Instant::now();
    let report = pool
        .run(descriptors(6), &mut |_: &Completion| {})
        .await
        .unwrap();

    assert_eq!(transport.issue_seconds(start), vec![0, 0, 1, 1, 3602, 3602]);
    assert_eq!(report.throttle_pauses, 3);
}

#[tokio::test(start_paused = true)]
async fn test_batch_within_cap_is_seeded_immediately() {
    let transport = ScriptedTransport::new(Duration::from_millis(200)).into_shared();
    let pool = DispatchPool::new(settings(8, RateLimiterConfig::disabled()), transport.clone());

    let start = Instant::now();
    let report = pool
        .run(descriptors(8), &mut |_: &Completion| {})
        .await
        .unwrap();

    assert_eq!(transport.issue_seconds(start), vec![0; 8]);
    assert_eq!(transport.max_active(), 8);
    assert!(report.elapsed < Duration::from_millis(400));
}

#[tokio::test(start_paused = true)]
async fn test_handler_runs_once_per_request_in_completion_order() {
    let transport = ScriptedTransport::new(Duration::from_millis(10))
        .with_latencies_ms(&[50, 40, 30, 20, 10])
        .with_status(2, 500)
        .into_shared();
    let pool = DispatchPool::new(settings(5, RateLimiterConfig::disabled()), transport.clone());

    let mut seen = Vec::new();
    let report = pool
        .run(descriptors(5), &mut |c: &Completion| {
            seen.push((c.index(), c.is_success()))
        })
        .await
        .unwrap();

    assert_eq!(
        seen,
        vec![(4, true), (3, true), (2, false), (1, true), (0, true)]
    );
    assert_eq!(report.succeeded, 4);
    assert_eq!(report.failed, 1);
}

#[test]
fn test_zero_latency_batch_on_plain_runtime() {
    let transport = ScriptedTransport::new(Duration::ZERO).into_shared();
    let pool = DispatchPool::new(settings(2, RateLimiterConfig::disabled()), transport.clone());

    let mut bodies = Vec::new();
    let report = tokio_test::block_on(pool.run(descriptors(3), &mut |c: &Completion| {
        bodies.push(c.body.clone())
    }))
    .unwrap();

    assert_eq!(report.completed(), 3);
    bodies.sort();
    assert_eq!(bodies, vec!["{\"index\":0}", "{\"index\":1}", "{\"index\":2}"]);
}

#[tokio::test]
async fn test_client_hands_queue_to_dispatcher() {
    let transport = ScriptedTransport::new(Duration::ZERO).into_shared();
    let mut client = BattleNetClient::builder()
        .api_key("KEY")
        .locale("en_US")
        .max_connections(2)
        .transport(transport.clone())
        .build()
        .unwrap();

    client.add_url("https://api.test/wow/mount/");
    client.add_url("https://api.test/wow/realm/status");

    let mut urls = Vec::new();
    let report = client
        .send(|c: &Completion| urls.push(c.url.clone()))
        .await
        .unwrap();

    assert_eq!(report.total, 2);
    assert!(client.pending().is_empty());
    urls.sort();
    assert_eq!(
        urls,
        vec![
            "https://api.test/wow/mount/?locale=en_US&apikey=KEY".to_string(),
            "https://api.test/wow/realm/status?locale=en_US&apikey=KEY".to_string(),
        ]
    );

    let err = client.send(|_: &Completion| {}).await.unwrap_err();
    assert!(matches!(err, Error::EmptyBatch));
    assert_eq!(transport.issue_order().len(), 2);
}

#[tokio::test]
async fn test_arc_transport_is_shared_across_sends() {
    let transport = ScriptedTransport::new(Duration::ZERO).into_shared();
    let mut client = BattleNetClient::builder()
        .api_key("KEY")
        .transport(Arc::clone(&transport) as Arc<dyn battlenet_api::Transport>)
        .build()
        .unwrap();

    for round in 0..2 {
        client.add_url(format!("https://api.test/wow/item/{}", round));
        client.send(|_: &Completion| {}).await.unwrap();
    }
    assert_eq!(transport.issue_order(), vec![0, 0]);
}

//! Request pacing and idle waits of the polling loop

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::*;
use sales_bot::pacing::RequestPacer;
use sales_bot::poller::{PollerSettings, PollingState};
use sales_bot::rpc::PacedRpc;

#[tokio::test]
async fn test_tick_spaces_every_rpc_call() {
    let interval = Duration::from_millis(100);
    let rpc = FakeRpc::new();
    rpc.push_batch(&["s3", "s2", "s1"]);
    for (i, sig) in ["s1", "s2", "s3"].iter().enumerate() {
        rpc.add_transaction(sale_record(sig, 10 + i as i64, MAGIC_EDEN, "MintA", 1));
    }
    let paced = PacedRpc::new(rpc.clone(), Arc::new(RequestPacer::new(interval)));
    let resolver = FakeResolver::default().with("MintA", "Ape", "https://img/ape.png");
    let poller = poller_on(Arc::new(paced), resolver, RecordingSink::new(), PollerSettings::default());
    let mut state = PollingState::new(start());

    let started = Instant::now();
    let report = poller.tick(&mut state).await.unwrap();
    let elapsed = started.elapsed();

    // One fetch plus three transactions; only the first call is not delayed
    assert!(
        elapsed >= interval * 3 - Duration::from_millis(10),
        "tick finished after {:?}",
        elapsed
    );
    assert_eq!(report.sales().count(), 3);
    assert_eq!(rpc.transaction_calls(), vec!["s1", "s2", "s3"]);
}

#[tokio::test]
async fn test_unpaced_tick_does_not_wait() {
    let rpc = FakeRpc::new();
    rpc.push_batch(&["s1"]);
    rpc.add_transaction(sale_record("s1", 10, MAGIC_EDEN, "MintA", 1));
    let paced = PacedRpc::new(rpc.clone(), Arc::new(RequestPacer::unlimited()));
    let poller = poller_on(
        Arc::new(paced),
        FakeResolver::default(),
        RecordingSink::new(),
        PollerSettings::default(),
    );
    let mut state = PollingState::new(start());

    let started = Instant::now();
    poller.tick(&mut state).await.unwrap();

    assert!(started.elapsed() < Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn test_empty_fetch_waits_idle_interval() {
    let idle = Duration::from_secs(2);
    let rpc = FakeRpc::new();
    let poller = poller_on(
        rpc.clone(),
        FakeResolver::default(),
        RecordingSink::new(),
        PollerSettings {
            backfill: false,
            idle_interval: idle,
        },
    );
    let mut state = PollingState::new(start()).with_cursor("seen");

    let stopped = tokio::time::timeout(Duration::from_millis(4500), poller.run(&mut state)).await;

    assert!(stopped.is_err());
    let times = rpc.fetch_times();
    assert_eq!(times.len(), 3, "fetches at 0s, 2s and 4s");
    for pair in times.windows(2) {
        assert!(pair[1] - pair[0] >= idle);
    }
    assert_eq!(state.cursor(), Some("seen"));
}

#[tokio::test(start_paused = true)]
async fn test_no_second_fetch_before_idle_elapses() {
    let rpc = FakeRpc::new();
    let poller = poller_on(
        rpc.clone(),
        FakeResolver::default(),
        RecordingSink::new(),
        PollerSettings {
            backfill: false,
            idle_interval: Duration::from_secs(2),
        },
    );
    let mut state = PollingState::new(start());

    let _ = tokio::time::timeout(Duration::from_millis(1999), poller.run(&mut state)).await;

    assert_eq!(rpc.fetch_times().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_error_waits_idle_interval() {
    let idle = Duration::from_secs(2);
    let rpc = FakeRpc::new();
    rpc.push_fetch_error();
    let poller = poller_on(
        rpc.clone(),
        FakeResolver::default(),
        RecordingSink::new(),
        PollerSettings {
            backfill: false,
            idle_interval: idle,
        },
    );
    let mut state = PollingState::new(start()).with_cursor("seen");

    let _ = tokio::time::timeout(Duration::from_millis(2500), poller.run(&mut state)).await;

    let times = rpc.fetch_times();
    assert_eq!(times.len(), 2);
    assert!(times[1] - times[0] >= idle);
    assert_eq!(state.cursor(), Some("seen"));
}

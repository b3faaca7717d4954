use std::sync::Arc;
use std::time::Duration;

use sweepr_common::config::SweepConfig;
use sweepr_common::network::host::ResolvedHost;
use sweepr_core::sweep::StopSignal;

use crate::utils::{FakeProbe, StaticNeighborCache, ip, net, service};

const SLOW: Duration = Duration::from_secs(10);
const GRACE: Duration = Duration::from_secs(2);

fn stop_after(stop: &StopSignal, delay: Duration) {
    let stop = stop.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        stop.stop();
    });
}

#[tokio::test]
async fn stop_ends_sweep_promptly() {
    let probe = Arc::new(FakeProbe::new().default_latency(SLOW));
    let cfg = SweepConfig {
        concurrency: 8,
        ..SweepConfig::default()
    };
    let svc = service(probe.clone(), StaticNeighborCache::default(), cfg);
    let subnet = net("10.4.0.0/24");
    let stop = StopSignal::new();

    stop_after(&stop, Duration::from_millis(50));
    let report = tokio::time::timeout(GRACE, svc.sweep(&subnet, &stop))
        .await
        .expect("sweep should return shortly after the stop")
        .unwrap();

    assert!(report.interrupted());
    assert!(report.is_empty());
    assert_eq!(report.probed(), 0);
    assert!(probe.calls() <= 8, "sent {} probes", probe.calls());
}

#[tokio::test]
async fn stopped_sweep_keeps_finished_hosts() {
    let fast = [ip(10, 5, 0, 1), ip(10, 5, 0, 2), ip(10, 5, 0, 3), ip(10, 5, 0, 4)];
    let mut probe = FakeProbe::new().reachable(fast).default_latency(SLOW);
    for addr in fast {
        probe = probe.latency(addr, Duration::ZERO);
    }
    let cfg = SweepConfig {
        concurrency: 8,
        ..SweepConfig::default()
    };
    let svc = service(Arc::new(probe), StaticNeighborCache::default(), cfg);
    let stop = StopSignal::new();

    stop_after(&stop, Duration::from_millis(100));
    let report = tokio::time::timeout(GRACE, svc.sweep(&net("10.5.0.0/28"), &stop))
        .await
        .expect("sweep should return shortly after the stop")
        .unwrap();

    assert!(report.interrupted());
    assert_eq!(report.probed(), 4);
    let expected: Vec<ResolvedHost> = fast.into_iter().map(ResolvedHost::new).collect();
    assert_eq!(report.hosts(), expected.as_slice());
}

#[tokio::test]
async fn deadline_stops_like_an_abort() {
    let probe = Arc::new(FakeProbe::new().default_latency(SLOW));
    let cfg = SweepConfig {
        concurrency: 16,
        deadline: Some(Duration::from_millis(100)),
        ..SweepConfig::default()
    };
    let stop = StopSignal::new();

    let report = tokio::time::timeout(
        GRACE,
        service(probe, StaticNeighborCache::default(), cfg).sweep(&net("10.6.0.0/24"), &stop),
    )
    .await
    .expect("deadline should end the sweep")
    .unwrap();

    assert!(report.interrupted());
    assert!(stop.is_stopped());
}

#[tokio::test]
async fn unused_deadline_leaves_report_complete() {
    let probe = Arc::new(FakeProbe::new().reachable([ip(10, 7, 0, 1)]));
    let cfg = SweepConfig {
        deadline: Some(Duration::from_secs(30)),
        ..SweepConfig::default()
    };
    let stop = StopSignal::new();

    let report = service(probe, StaticNeighborCache::default(), cfg)
        .sweep(&net("10.7.0.0/29"), &stop)
        .await
        .unwrap();

    assert!(!report.interrupted());
    assert_eq!(report.probed(), 6);
    assert!(!stop.is_stopped());
}

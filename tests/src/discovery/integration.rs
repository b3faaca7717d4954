use std::sync::Arc;
use std::time::Duration;

use pnet::util::MacAddr;
use sweepr_common::config::SweepConfig;
use sweepr_common::error::SweepError;
use sweepr_common::network::host::ResolvedHost;
use sweepr_core::sweep::StopSignal;

use crate::utils::{FakeProbe, StaticNeighborCache, ip, net, service};

/// A /30 holds two hosts: one answers and has a neighbour entry, the other is silent.
#[tokio::test]
async fn discovery_point_to_point_pair() {
    let mac = MacAddr::new(0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF);
    let probe = Arc::new(FakeProbe::new().reachable([ip(10, 0, 0, 1)]));
    let cache = StaticNeighborCache::default().with(ip(10, 0, 0, 1), mac);

    let report = service(probe.clone(), cache, SweepConfig::default())
        .sweep(&net("10.0.0.0/30"), &StopSignal::new())
        .await
        .unwrap();

    assert_eq!(report.hosts(), &[ResolvedHost::new(ip(10, 0, 0, 1)).with_mac(mac)]);
    assert_eq!(report.probed(), 2);
    assert!(!report.interrupted());
    assert_eq!(probe.calls(), 2, "network and broadcast must not be probed");
}

#[tokio::test]
async fn empty_subnets_are_idempotent() {
    let probe = Arc::new(FakeProbe::new().reachable([ip(10, 0, 0, 0), ip(10, 0, 0, 1)]));
    let svc = service(probe.clone(), StaticNeighborCache::default(), SweepConfig::default());

    for cidr in ["10.0.0.0/31", "10.0.0.1/32"] {
        let first = svc.sweep(&net(cidr), &StopSignal::new()).await.unwrap();
        let second = svc.sweep(&net(cidr), &StopSignal::new()).await.unwrap();

        assert!(first.is_empty(), "{cidr} should have no hosts");
        assert_eq!(first, second);
        assert_eq!(first.probed(), 0);
    }
    assert_eq!(probe.calls(), 0);
}

/// Every host stays silent: repeated sweeps probe everything and agree on nothing.
#[tokio::test]
async fn silent_subnet_sweeps_are_idempotent() {
    let probe = Arc::new(FakeProbe::new());
    let svc = service(probe.clone(), StaticNeighborCache::default(), SweepConfig::default());
    let subnet = net("10.8.0.0/29");

    let first = svc.sweep(&subnet, &StopSignal::new()).await.unwrap();
    let second = svc.sweep(&subnet, &StopSignal::new()).await.unwrap();

    assert!(first.is_empty());
    assert!(second.is_empty());
    assert_eq!(first, second);
    assert_eq!(first.probed(), 6);
    assert_eq!(probe.calls(), 12);
}

/// Higher addresses answer first; the report must still be ascending.
#[tokio::test]
async fn hosts_are_sorted_regardless_of_completion_order() {
    let subnet = net("192.168.50.0/28");
    let mut probe = FakeProbe::new().reachable(subnet.hosts());
    for addr in subnet.hosts() {
        let delay = u64::from(16 - addr.octets()[3]) * 5;
        probe = probe.latency(addr, Duration::from_millis(delay));
    }

    let report = service(Arc::new(probe), StaticNeighborCache::default(), SweepConfig::default())
        .sweep(&subnet, &StopSignal::new())
        .await
        .unwrap();

    let addrs: Vec<_> = report.hosts().iter().map(|host| host.address).collect();
    let expected: Vec<_> = subnet.hosts().collect();
    assert_eq!(addrs.len(), 14);
    assert_eq!(addrs, expected);
}

#[tokio::test]
async fn failing_probe_counts_as_unreachable() {
    let subnet = net("172.16.4.0/29");
    let probe = Arc::new(
        FakeProbe::new()
            .reachable(subnet.hosts())
            .failing(ip(172, 16, 4, 3)),
    );

    let report = service(probe.clone(), StaticNeighborCache::default(), SweepConfig::default())
        .sweep(&subnet, &StopSignal::new())
        .await
        .unwrap();

    assert_eq!(report.len(), 5);
    assert!(report.hosts().iter().all(|host| host.address != ip(172, 16, 4, 3)));
    assert_eq!(report.probed(), 6);
    assert_eq!(probe.calls(), 6);
}

#[tokio::test]
async fn retries_are_spent_on_silent_hosts_only() {
    let subnet = net("10.9.0.0/30");
    let probe = Arc::new(FakeProbe::new().reachable([ip(10, 9, 0, 1)]));
    let cfg = SweepConfig {
        retries: 2,
        ..SweepConfig::default()
    };

    let report = service(probe.clone(), StaticNeighborCache::default(), cfg)
        .sweep(&subnet, &StopSignal::new())
        .await
        .unwrap();

    assert_eq!(report.len(), 1);
    assert_eq!(probe.calls(), 1 + 3);
}

#[tokio::test]
async fn missing_neighbour_entry_leaves_mac_absent() {
    let known = MacAddr::new(0x00, 0x1A, 0x2B, 0x3C, 0x4D, 0x5E);
    let probe = Arc::new(FakeProbe::new().reachable([ip(10, 1, 1, 1), ip(10, 1, 1, 2)]));
    let cache = StaticNeighborCache::default().with(ip(10, 1, 1, 2), known);

    let report = service(probe, cache, SweepConfig::default())
        .sweep(&net("10.1.1.0/29"), &StopSignal::new())
        .await
        .unwrap();

    assert_eq!(
        report.hosts(),
        &[
            ResolvedHost::new(ip(10, 1, 1, 1)),
            ResolvedHost::new(ip(10, 1, 1, 2)).with_mac(known),
        ]
    );
}

#[tokio::test]
async fn concurrency_limit_is_respected() {
    let probe = Arc::new(
        FakeProbe::new()
            .reachable([ip(10, 2, 0, 1)])
            .default_latency(Duration::from_millis(20)),
    );
    let cfg = SweepConfig {
        concurrency: 4,
        ..SweepConfig::default()
    };

    let report = service(probe.clone(), StaticNeighborCache::default(), cfg)
        .sweep(&net("10.2.0.0/26"), &StopSignal::new())
        .await
        .unwrap();

    assert_eq!(report.probed(), 62);
    assert_eq!(probe.calls(), 62);
    assert_eq!(probe.max_in_flight(), 4);
}

#[tokio::test]
async fn oversized_subnet_fails_before_probing() {
    let probe = Arc::new(FakeProbe::new());
    let cfg = SweepConfig {
        max_hosts: 1024,
        ..SweepConfig::default()
    };

    let err = service(probe.clone(), StaticNeighborCache::default(), cfg)
        .sweep(&net("10.3.0.0/16"), &StopSignal::new())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        SweepError::RangeTooLarge {
            hosts: 65_534,
            limit: 1024
        }
    );
    assert_eq!(err.exit_code(), 3);
    assert_eq!(probe.calls(), 0);
}

/// Real probes against the loopback network. Needs a `ping` binary or root.
#[tokio::test]
#[ignore]
async fn discovery_loopback_with_system_probe() {
    let report = sweepr_core::discovery::DiscoveryService::system(SweepConfig::default())
        .sweep(&net("127.0.0.0/30"), &StopSignal::new())
        .await
        .unwrap();

    assert!(
        report
            .hosts()
            .iter()
            .any(|host| host.address == ip(127, 0, 0, 1)),
        "localhost should answer"
    );
}

//! Local interface discovery.
//!
//! Finds the address and prefix length of the interface the operator is most
//! likely sweeping from. Loopback addresses (127.0.0.0/8) never qualify.

use std::net::Ipv4Addr;

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};

#[cfg(target_os = "linux")]
use linux_impl::is_wireless;
#[cfg(not(target_os = "linux"))]
use fallback_impl::is_wireless;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ViabilityError {
    /// The interface is operationally down.
    IsDown,
    /// The interface is a loopback device.
    IsLoopback,
    /// The interface is a point-to-point link (e.g., a VPN).
    IsPointToPoint,
    /// The interface has no IPv4 address outside 127.0.0.0/8.
    NoIpv4,
}

/// Returns the address and prefix length of the best local interface.
pub fn local_address_and_prefix() -> Option<(Ipv4Addr, u8)> {
    let interfaces: Vec<NetworkInterface> = datalink::interfaces()
        .into_iter()
        .filter(|interface| is_viable_interface(interface).is_ok())
        .collect();

    let interface: NetworkInterface = select_best_interface(interfaces, is_wireless)?;
    let net: Ipv4Network = first_ipv4_net(&interface)?;

    Some((net.ip(), net.prefix()))
}

fn is_viable_interface(interface: &NetworkInterface) -> Result<(), ViabilityError> {
    if !interface.is_up() {
        return Err(ViabilityError::IsDown);
    }
    if interface.is_loopback() {
        return Err(ViabilityError::IsLoopback);
    }
    if interface.is_point_to_point() {
        return Err(ViabilityError::IsPointToPoint);
    }
    if first_ipv4_net(interface).is_none() {
        return Err(ViabilityError::NoIpv4);
    }

    Ok(())
}

fn first_ipv4_net(interface: &NetworkInterface) -> Option<Ipv4Network> {
    interface.ips.iter().find_map(|net| match net {
        IpNetwork::V4(v4) if !v4.ip().is_loopback() => Some(*v4),
        _ => None,
    })
}

/// Wireless interfaces win, since the subnet belongs to the network the operator
/// picked from the wireless list.
fn select_best_interface(
    interfaces: Vec<NetworkInterface>,
    is_wireless: impl Fn(&NetworkInterface) -> bool,
) -> Option<NetworkInterface> {
    let wireless_idx: usize = interfaces
        .iter()
        .position(|interface| is_wireless(interface))
        .unwrap_or(0);

    interfaces.into_iter().nth(wireless_idx)
}

#[cfg(target_os = "linux")]
mod linux_impl {
    use super::*;
    use std::path::Path;

    pub fn is_wireless(interface: &NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/wireless", interface.name)).exists()
    }
}

#[cfg(not(target_os = "linux"))]
mod fallback_impl {
    use super::*;

    pub fn is_wireless(interface: &NetworkInterface) -> bool {
        interface.name.starts_with("wl") || interface.name.starts_with("en0")
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use pnet::util::MacAddr;

    const IFF_UP: u32 = 1;
    const IFF_BROADCAST: u32 = 1 << 1;
    const IFF_LOOPBACK: u32 = 1 << 3;
    const IFF_POINTTOPOINT: u32 = 1 << 4;

    fn create_mock_interface(name: &str, ips: Vec<IpNetwork>, flags: u32) -> NetworkInterface {
        NetworkInterface {
            name: name.to_string(),
            description: "An interface".to_string(),
            index: 0,
            mac: Some(MacAddr(0x1, 0x2, 0x3, 0x4, 0x5, 0x6)),
            ips,
            flags,
        }
    }

    fn default_ips() -> Vec<IpNetwork> {
        vec![IpNetwork::V4("192.168.1.100/24".parse().unwrap())]
    }

    #[test]
    fn is_viable_interface_should_succeed() {
        let interface = create_mock_interface("wlan0", default_ips(), IFF_UP | IFF_BROADCAST);
        assert_eq!(is_viable_interface(&interface), Ok(()));
    }

    #[test]
    fn is_viable_interface_should_fail_when_down() {
        let interface = create_mock_interface("wlan0", default_ips(), IFF_BROADCAST);
        assert_eq!(is_viable_interface(&interface), Err(ViabilityError::IsDown));
    }

    #[test]
    fn is_viable_interface_should_fail_loop_back() {
        let interface = create_mock_interface("lo", default_ips(), IFF_LOOPBACK | IFF_UP);
        assert_eq!(is_viable_interface(&interface), Err(ViabilityError::IsLoopback));
    }

    #[test]
    fn is_viable_interface_should_fail_point_to_point() {
        let interface =
            create_mock_interface("tun0", default_ips(), IFF_POINTTOPOINT | IFF_UP);
        assert_eq!(is_viable_interface(&interface), Err(ViabilityError::IsPointToPoint));
    }

    #[test]
    fn is_viable_interface_should_fail_with_only_loopback_or_ipv6() {
        let ips = vec![
            IpNetwork::V4("127.0.1.1/8".parse().unwrap()),
            IpNetwork::V6("fe80::1234:5678:abcd:ef01/64".parse().unwrap()),
        ];
        let interface = create_mock_interface("eth0", ips, IFF_UP | IFF_BROADCAST);
        assert_eq!(is_viable_interface(&interface), Err(ViabilityError::NoIpv4));
    }

    #[test]
    fn first_ipv4_net_skips_loopback_range() {
        let ips = vec![
            IpNetwork::V4("127.0.0.1/8".parse().unwrap()),
            IpNetwork::V4("10.1.2.3/16".parse().unwrap()),
        ];
        let interface = create_mock_interface("eth0", ips, IFF_UP);
        let net = first_ipv4_net(&interface).unwrap();
        assert_eq!(net.ip(), Ipv4Addr::new(10, 1, 2, 3));
        assert_eq!(net.prefix(), 16);
    }

    #[test]
    fn select_best_interface_prefers_wireless() {
        let wired = create_mock_interface("eth0", default_ips(), IFF_UP | IFF_BROADCAST);
        let wireless = create_mock_interface("wlan0", default_ips(), IFF_UP | IFF_BROADCAST);
        let is_wireless = |interface: &NetworkInterface| interface.name == "wlan0";

        let result = select_best_interface(vec![wired, wireless], is_wireless);
        assert_eq!(result.unwrap().name, "wlan0");
    }

    #[test]
    fn select_best_interface_falls_back_to_first() {
        let wired = create_mock_interface("eth0", default_ips(), IFF_UP | IFF_BROADCAST);
        let other = create_mock_interface("eth1", default_ips(), IFF_UP | IFF_BROADCAST);
        let result = select_best_interface(vec![wired, other], |_| false);
        assert_eq!(result.unwrap().name, "eth0");
    }

    #[test]
    fn select_best_interface_returns_none() {
        assert!(select_best_interface(vec![], |_| true).is_none());
    }
}

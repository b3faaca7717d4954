use std::net::Ipv4Addr;

use crate::terminal::colors;
use colored::*;
use pnet::util::MacAddr;
use sweepr_common::network::mac;
use sweepr_common::network::subnet::NetworkDescriptor;

pub type Detail = (String, ColoredString);

pub fn ip_to_detail(addr: Ipv4Addr) -> Detail {
    ("IPv4".to_string(), addr.to_string().color(colors::IPV4_ADDR))
}

pub fn mac_to_detail(mac: Option<MacAddr>) -> Detail {
    let value: ColoredString = match mac {
        Some(mac) if mac::is_locally_administered(mac) => {
            format!("{} {}", mac.to_string().color(colors::MAC_ADDR), "(random)".dimmed()).normal()
        }
        Some(mac) => mac.to_string().color(colors::MAC_ADDR),
        None => "unknown".dimmed(),
    };
    ("MAC".to_string(), value)
}

pub fn vendor_to_detail(mac: Option<MacAddr>) -> Option<Detail> {
    let mac = mac.filter(|mac| !mac::is_locally_administered(*mac))?;
    let vendor: String = mac::get_vendor(mac)?;
    Some(("Vendor".to_string(), vendor.color(colors::VENDOR)))
}

pub fn subnet_to_string(net: &NetworkDescriptor) -> ColoredString {
    let address: ColoredString = net.base_addr().to_string().color(colors::IPV4_ADDR);
    let prefix: ColoredString = net.prefix().to_string().color(colors::IPV4_PREFIX);
    format!("{address}/{prefix}").color(colors::SEPARATOR)
}

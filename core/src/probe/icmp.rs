//! Raw ICMP echo probe.
//!
//! Requires **root privileges** (or `CAP_NET_RAW`) to open the raw socket.
//! Every probe opens its own channel, so replies meant for other probes are seen
//! too; they are told apart by source address and echo identifier.

use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pnet::packet::Packet;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{self, IcmpCode, IcmpPacket, IcmpTypes};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::transport::{
    self, TransportChannelType, TransportProtocol, TransportReceiver, TransportSender,
};

use super::{LivenessProbe, ProbeError};

const TRANSPORT_BUFFER_SIZE: usize = 4096;
const ICMP_HEADER_LEN: usize = 8;
const ICMP_PAYLOAD_LEN: usize = 56;
const CHANNEL_TYPE_ICMP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));

#[derive(Debug, Default, Clone, Copy)]
pub struct IcmpProbe;

impl IcmpProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LivenessProbe for IcmpProbe {
    async fn probe(&self, addr: Ipv4Addr, timeout: Duration) -> Result<bool, ProbeError> {
        let identifier: u16 = rand::random();

        tokio::task::spawn_blocking(move || echo(addr, identifier, timeout))
            .await
            .map_err(|e| ProbeError::Unavailable(format!("icmp worker failed: {e}")))?
    }
}

/// Sends a single echo request and blocks until a matching reply or the deadline.
fn echo(addr: Ipv4Addr, identifier: u16, timeout: Duration) -> Result<bool, ProbeError> {
    let (mut tx, mut rx) = open_channel()?;

    let packet: Vec<u8> = create_echo_request(identifier)?;
    let request = IcmpPacket::new(&packet)
        .ok_or_else(|| ProbeError::Malformed("echo request truncated".into()))?;
    tx.send_to(request, IpAddr::V4(addr))?;

    let deadline: Instant = Instant::now() + timeout;
    let mut replies = transport::icmp_packet_iter(&mut rx);

    loop {
        let remaining: Duration = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(false);
        }

        match replies.next_with_timeout(remaining)? {
            Some((reply, source)) if is_reply_to(&reply, source, addr, identifier) => {
                return Ok(true);
            }
            Some(_) => continue,
            None => return Ok(false),
        }
    }
}

fn open_channel() -> Result<(TransportSender, TransportReceiver), ProbeError> {
    transport::transport_channel(TRANSPORT_BUFFER_SIZE, CHANNEL_TYPE_ICMP).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            ProbeError::Unavailable("raw ICMP sockets need elevated privileges".into())
        } else {
            ProbeError::Io(e)
        }
    })
}

fn create_echo_request(identifier: u16) -> Result<Vec<u8>, ProbeError> {
    let mut pkt = vec![0u8; ICMP_HEADER_LEN + ICMP_PAYLOAD_LEN];
    let mut echo = MutableEchoRequestPacket::new(&mut pkt)
        .ok_or_else(|| ProbeError::Malformed("failed to create echo request packet".into()))?;

    echo.set_icmp_type(IcmpTypes::EchoRequest);
    echo.set_icmp_code(IcmpCode::new(0));
    echo.set_identifier(identifier);
    echo.set_sequence_number(0);
    echo.set_checksum(0);

    let csm = {
        let icmp_pkt = IcmpPacket::new(echo.packet())
            .ok_or_else(|| ProbeError::Malformed("failed to view echo request".into()))?;
        icmp::checksum(&icmp_pkt)
    };
    echo.set_checksum(csm);

    Ok(pkt)
}

fn is_reply_to(reply: &IcmpPacket, source: IpAddr, target: Ipv4Addr, identifier: u16) -> bool {
    if source != IpAddr::V4(target) || reply.get_icmp_type() != IcmpTypes::EchoReply {
        return false;
    }

    EchoReplyPacket::new(reply.packet())
        .map(|echo| echo.get_identifier() == identifier)
        .unwrap_or(false)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

use byteorder::{BigEndian, ByteOrder};
use std::net::Ipv4Addr;
use thiserror::Error;

use super::checksum::checksum;
use super::{ProbeId, ReplyKind};

pub const ICMP_ECHO_REPLY: u8 = 0;
pub const ICMP_ECHO_REQUEST: u8 = 8;
pub const ICMP_TIME_EXCEEDED: u8 = 11;

pub const ICMP_HEADER_LEN: usize = 8;
pub const IPV4_MIN_HEADER_LEN: usize = 20;

/// Why an inbound datagram was not attributed to the current hop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("truncated datagram")]
    Truncated,

    #[error("not an IPv4 datagram (version {0})")]
    NotIpv4(u8),

    #[error("bad IPv4 header length {0}")]
    BadHeaderLength(usize),

    #[error("unexpected ICMP type {0}")]
    UnexpectedType(u8),

    #[error("quoted packet is ICMP type {0}, not an echo request")]
    UnexpectedInnerType(u8),

    #[error("probe id {found:?} does not match {expected:?}")]
    Mismatch { expected: ProbeId, found: ProbeId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedReply {
    pub kind: ReplyKind,
    pub source: Ipv4Addr,
}

/// Build an 8-byte ICMP Echo Request header with no payload.
pub fn echo_request(probe: ProbeId) -> [u8; ICMP_HEADER_LEN] {
    let mut header = [0u8; ICMP_HEADER_LEN];
    header[0] = ICMP_ECHO_REQUEST;
    header[1] = 0;
    BigEndian::write_u16(&mut header[4..6], probe.tag);
    BigEndian::write_u16(&mut header[6..8], probe.sequence);

    let sum = checksum(&header);
    BigEndian::write_u16(&mut header[2..4], sum);
    header
}

/// Parse a raw IPv4 datagram as received from a raw ICMP socket and decide
/// whether it answers the probe `expected`.
///
/// Echo replies carry the probe id in their own header. Time exceeded
/// messages quote the original IP header and the first 8 bytes of our echo
/// request right after their own 8-byte header, so the id is read from there.
pub fn parse_reply(datagram: &[u8], expected: ProbeId) -> Result<ParsedReply, Rejection> {
    let icmp = icmp_header(datagram)?;

    let (kind, found) = match icmp[0] {
        ICMP_ECHO_REPLY => (ReplyKind::EchoReply, probe_id(icmp)),
        ICMP_TIME_EXCEEDED => {
            let quoted = icmp_header(&icmp[ICMP_HEADER_LEN..])?;
            if quoted[0] != ICMP_ECHO_REQUEST {
                return Err(Rejection::UnexpectedInnerType(quoted[0]));
            }
            (ReplyKind::TimeExceeded, probe_id(quoted))
        }
        other => return Err(Rejection::UnexpectedType(other)),
    };

    if found != expected {
        return Err(Rejection::Mismatch { expected, found });
    }

    Ok(ParsedReply {
        kind,
        source: source_address(datagram),
    })
}

/// Locate the ICMP header following the IPv4 header at the start of `datagram`.
/// The returned slice is at least `ICMP_HEADER_LEN` bytes long.
fn icmp_header(datagram: &[u8]) -> Result<&[u8], Rejection> {
    let first = *datagram.first().ok_or(Rejection::Truncated)?;

    let version = first >> 4;
    if version != 4 {
        return Err(Rejection::NotIpv4(version));
    }

    let header_len = usize::from(first & 0x0f) * 4;
    if header_len < IPV4_MIN_HEADER_LEN {
        return Err(Rejection::BadHeaderLength(header_len));
    }

    datagram
        .get(header_len..)
        .filter(|icmp| icmp.len() >= ICMP_HEADER_LEN)
        .ok_or(Rejection::Truncated)
}

fn probe_id(icmp: &[u8]) -> ProbeId {
    ProbeId {
        tag: BigEndian::read_u16(&icmp[4..6]),
        sequence: BigEndian::read_u16(&icmp[6..8]),
    }
}

// Only called after icmp_header() accepted the datagram, which guarantees a
// full 20-byte IPv4 header.
fn source_address(datagram: &[u8]) -> Ipv4Addr {
    Ipv4Addr::new(datagram[12], datagram[13], datagram[14], datagram[15])
}

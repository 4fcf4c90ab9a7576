//! Hand-built datagrams as a raw ICMP socket would deliver them.

use byteorder::{BigEndian, ByteOrder};
use std::net::Ipv4Addr;

use super::checksum::checksum;
use super::packet::{ICMP_ECHO_REPLY, ICMP_HEADER_LEN, ICMP_TIME_EXCEEDED, IPV4_MIN_HEADER_LEN, echo_request};
use super::ProbeId;

pub const LOCAL: Ipv4Addr = Ipv4Addr::new(192, 168, 0, 10);
pub const DESTINATION: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);

pub fn ipv4_header(source: Ipv4Addr, destination: Ipv4Addr, payload_len: usize) -> Vec<u8> {
    let mut header = vec![0u8; IPV4_MIN_HEADER_LEN];
    header[0] = 0x45;
    BigEndian::write_u16(&mut header[2..4], (IPV4_MIN_HEADER_LEN + payload_len) as u16);
    header[8] = 64;
    header[9] = 1; // ICMP
    header[12..16].copy_from_slice(&source.octets());
    header[16..20].copy_from_slice(&destination.octets());
    let sum = checksum(&header);
    BigEndian::write_u16(&mut header[10..12], sum);
    header
}

/// Echo reply from `source` answering `probe`.
pub fn echo_reply(source: Ipv4Addr, probe: ProbeId) -> Vec<u8> {
    let mut icmp = echo_request(probe);
    icmp[0] = ICMP_ECHO_REPLY;
    icmp[2..4].fill(0);
    let sum = checksum(&icmp);
    BigEndian::write_u16(&mut icmp[2..4], sum);

    let mut datagram = ipv4_header(source, LOCAL, icmp.len());
    datagram.extend_from_slice(&icmp);
    datagram
}

/// Time exceeded from `router`, quoting the echo request sent for `probe`.
pub fn time_exceeded(router: Ipv4Addr, probe: ProbeId) -> Vec<u8> {
    let mut quoted = ipv4_header(LOCAL, DESTINATION, ICMP_HEADER_LEN);
    quoted[8] = 1;
    quoted.extend_from_slice(&echo_request(probe));

    let mut icmp = vec![0u8; ICMP_HEADER_LEN];
    icmp[0] = ICMP_TIME_EXCEEDED;
    icmp.extend_from_slice(&quoted);
    let sum = checksum(&icmp);
    BigEndian::write_u16(&mut icmp[2..4], sum);

    let mut datagram = ipv4_header(router, LOCAL, icmp.len());
    datagram.extend_from_slice(&icmp);
    datagram
}

/// Insert one word of NOP options into the outer IPv4 header.
pub fn with_ip_options(datagram: &[u8]) -> Vec<u8> {
    let mut out = datagram[..IPV4_MIN_HEADER_LEN].to_vec();
    out[0] = 0x46;
    out.extend_from_slice(&[1, 1, 1, 1]);
    out.extend_from_slice(&datagram[IPV4_MIN_HEADER_LEN..]);
    out
}

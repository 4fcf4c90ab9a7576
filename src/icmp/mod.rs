pub mod checksum;
pub mod packet;
pub mod socket;

#[cfg(test)]
pub mod fixtures;

pub use packet::*;
pub use socket::*;

use std::net::Ipv4Addr;
use std::time::Duration;

/// Identifier/sequence pair carried by every probe of one hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeId {
    pub tag: u16,
    pub sequence: u16,
}

impl ProbeId {
    pub fn for_ttl(tag: u16, ttl: u8) -> Self {
        Self {
            tag,
            sequence: u16::from(ttl),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    EchoReply,
    TimeExceeded,
}

impl std::fmt::Display for ReplyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplyKind::EchoReply => write!(f, "echo reply"),
            ReplyKind::TimeExceeded => write!(f, "time exceeded"),
        }
    }
}

/// A reply matched to one of the current hop's probes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub source: Ipv4Addr,
    pub rtt: Duration,
    pub kind: ReplyKind,
}

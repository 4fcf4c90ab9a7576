use std::fmt::Write;
use std::net::Ipv4Addr;

use crate::trace::Hop;

/// Render one hop as `<ttl> [<address> ...] <timing>`.
///
/// Each responding address is listed once, in arrival order. Timing is the
/// average round trip in whole milliseconds when every probe was answered,
/// `???` when only some were, and `*` when none were.
pub fn format_hop(hop: &Hop, expected: usize) -> String {
    let mut line = hop.ttl.to_string();

    let mut seen: Vec<Ipv4Addr> = Vec::with_capacity(hop.replies.len());
    for reply in &hop.replies {
        if !seen.contains(&reply.source) {
            seen.push(reply.source);
            let _ = write!(line, " {}", reply.source);
        }
    }

    let count = hop.replies.len();
    if count == 0 {
        line.push_str(" *");
    } else if count < expected {
        line.push_str(" ???");
    } else {
        let total_micros: u128 = hop.replies.iter().map(|r| r.rtt.as_micros()).sum();
        let _ = write!(line, " {}ms", total_micros / count as u128 / 1000);
    }

    line
}

use std::io::Write;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::error::TraceError;
use crate::icmp::{ProbeId, Reply, ReplyKind, Transport, echo_request, parse_reply};
use crate::report;

pub const MAX_TTL: u8 = 64;
pub const PROBES_PER_HOP: usize = 3;
pub const TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Correlation tag written into every probe of this run.
    pub tag: u16,
    pub max_ttl: u8,
    pub probes_per_hop: usize,
    /// Collection window per hop, measured from before the first send.
    pub timeout: Duration,
}

impl TraceConfig {
    pub fn new(tag: u16) -> Self {
        Self {
            tag,
            max_ttl: MAX_TTL,
            probes_per_hop: PROBES_PER_HOP,
            timeout: TIMEOUT,
        }
    }
}

/// Replies gathered for one TTL.
#[derive(Debug, Clone)]
pub struct Hop {
    pub ttl: u8,
    pub replies: Vec<Reply>,
}

impl Hop {
    /// True once the destination itself answered.
    pub fn reached(&self) -> bool {
        self.replies.iter().any(|r| r.kind == ReplyKind::EchoReply)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceOutcome {
    Reached,
    Exhausted,
    Interrupted,
}

pub struct Tracer<T: Transport> {
    transport: T,
    config: TraceConfig,
}

impl<T: Transport> Tracer<T> {
    pub fn new(transport: T, config: TraceConfig) -> Self {
        Self { transport, config }
    }

    /// Probe TTL 1 upwards, writing one report line per hop to `out`, until the
    /// destination answers, the TTL ceiling is hit, or `shutdown` fires.
    pub async fn run<W: Write>(
        &mut self,
        out: &mut W,
        shutdown: &mut oneshot::Receiver<()>,
    ) -> Result<TraceOutcome, TraceError> {
        for ttl in 1..=self.config.max_ttl {
            if shutdown.try_recv().is_ok() {
                log::info!("Interrupted before ttl {}", ttl);
                return Ok(TraceOutcome::Interrupted);
            }

            let hop = Hop {
                ttl,
                replies: self.collect(ttl).await?,
            };

            writeln!(out, "{}", report::format_hop(&hop, self.config.probes_per_hop))
                .and_then(|_| out.flush())
                .map_err(TraceError::Output)?;

            if hop.reached() {
                log::info!("Destination reached at ttl {}", ttl);
                return Ok(TraceOutcome::Reached);
            }
        }

        log::info!("Destination not reached within {} hops", self.config.max_ttl);
        Ok(TraceOutcome::Exhausted)
    }

    /// Send one batch of probes with `ttl` and gather matching replies until
    /// the batch is fully answered or the hop's window closes.
    pub async fn collect(&mut self, ttl: u8) -> Result<Vec<Reply>, TraceError> {
        let probe = ProbeId::for_ttl(self.config.tag, ttl);
        let request = echo_request(probe);
        let wanted = self.config.probes_per_hop;

        let started = Instant::now();
        let deadline = started + self.config.timeout;

        for _ in 0..wanted {
            self.transport.set_ttl(ttl)?;
            self.transport.send(&request)?;
        }
        log::debug!("Sent {} probes with ttl {} (id {:#06x})", wanted, ttl, probe.tag);

        let mut replies = Vec::with_capacity(wanted);
        while replies.len() < wanted {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            if !self.transport.await_readable(remaining).await? {
                break;
            }

            let arrived = Instant::now();
            let datagram = self.transport.receive()?;

            match parse_reply(&datagram, probe) {
                Ok(parsed) => {
                    let rtt = arrived.duration_since(started);
                    log::debug!("ttl {}: {} from {} in {:?}", ttl, parsed.kind, parsed.source, rtt);
                    replies.push(Reply {
                        source: parsed.source,
                        rtt,
                        kind: parsed.kind,
                    });
                }
                Err(rejection) => log::trace!("ttl {}: ignored datagram: {}", ttl, rejection),
            }
        }

        Ok(replies)
    }
}

use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io::{self, Read};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;
use tokio::io::unix::AsyncFd;
use tokio::time::{Instant, timeout_at};

use crate::error::TraceError;

/// Largest IPv4 datagram.
const RECV_BUFFER_LEN: usize = 65535;

/// The I/O a trace needs from the network.
///
/// `await_readable` only reports that a datagram can be taken with `receive`;
/// callers timestamp the arrival in between.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Set the IP TTL used by the next `send`.
    fn set_ttl(&mut self, ttl: u8) -> Result<(), TraceError>;

    fn send(&mut self, packet: &[u8]) -> Result<(), TraceError>;

    /// Wait up to `timeout` for an inbound datagram. `Ok(false)` on timeout.
    async fn await_readable(&mut self, timeout: Duration) -> Result<bool, TraceError>;

    /// Take the datagram announced by `await_readable`, IP header included.
    fn receive(&mut self) -> Result<Vec<u8>, TraceError>;
}

/// Raw ICMP socket aimed at a single destination.
pub struct IcmpSocket {
    fd: AsyncFd<Socket>,
    destination: Ipv4Addr,
    target: SockAddr,
    buffer: Vec<u8>,
    pending: Option<usize>,
}

impl IcmpSocket {
    /// Parse `destination` and open a non-blocking raw ICMP socket for it.
    /// Must be called from within a tokio runtime.
    pub fn open(destination: &str) -> Result<Self, TraceError> {
        let destination: Ipv4Addr = destination
            .parse()
            .map_err(|_| TraceError::InvalidAddress(destination.to_string()))?;

        let socket = Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))
            .map_err(TraceError::SocketCreation)?;
        socket
            .set_nonblocking(true)
            .map_err(TraceError::SocketCreation)?;
        let fd = AsyncFd::new(socket).map_err(TraceError::SocketCreation)?;

        log::debug!("Opened raw ICMP socket for {}", destination);

        Ok(Self {
            fd,
            destination,
            target: SocketAddrV4::new(destination, 0).into(),
            buffer: vec![0u8; RECV_BUFFER_LEN],
            pending: None,
        })
    }

    pub fn destination(&self) -> Ipv4Addr {
        self.destination
    }
}

impl Transport for IcmpSocket {
    fn set_ttl(&mut self, ttl: u8) -> Result<(), TraceError> {
        self.fd
            .get_ref()
            .set_ttl(u32::from(ttl))
            .map_err(|source| TraceError::SetTtl { ttl, source })
    }

    fn send(&mut self, packet: &[u8]) -> Result<(), TraceError> {
        let sent = self
            .fd
            .get_ref()
            .send_to(packet, &self.target)
            .map_err(TraceError::Send)?;
        log::debug!("Sent {} bytes to {}", sent, self.destination);
        Ok(())
    }

    async fn await_readable(&mut self, timeout: Duration) -> Result<bool, TraceError> {
        if self.pending.is_some() {
            return Ok(true);
        }

        let deadline = Instant::now() + timeout;
        loop {
            let mut guard = match timeout_at(deadline, self.fd.readable()).await {
                Ok(guard) => guard.map_err(TraceError::Wait)?,
                Err(_elapsed) => return Ok(false),
            };

            // Readiness can be spurious; try_io clears it on WouldBlock and
            // we go back to waiting against the same deadline.
            match guard.try_io(|fd| Read::read(&mut fd.get_ref(), &mut self.buffer)) {
                Ok(Ok(len)) => {
                    log::debug!("Received {} bytes", len);
                    self.pending = Some(len);
                    return Ok(true);
                }
                Ok(Err(e)) => return Err(TraceError::Receive(e)),
                Err(_would_block) => continue,
            }
        }
    }

    fn receive(&mut self) -> Result<Vec<u8>, TraceError> {
        let len = self
            .pending
            .take()
            .ok_or_else(|| TraceError::Receive(io::ErrorKind::WouldBlock.into()))?;
        Ok(self.buffer[..len].to_vec())
    }
}

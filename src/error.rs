use std::io;
use thiserror::Error;

/// Fatal errors. Any of these aborts the trace and is reported by `main`.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Provided IP address '{0}' is invalid")]
    InvalidAddress(String),

    #[error("Failed to create raw ICMP socket: {0}. Root privileges (or CAP_NET_RAW) may be required.")]
    SocketCreation(#[source] io::Error),

    #[error("Failed to set TTL {ttl}: {source}")]
    SetTtl {
        ttl: u8,
        #[source]
        source: io::Error,
    },

    #[error("Failed to send probe: {0}")]
    Send(#[source] io::Error),

    #[error("Failed to wait for reply: {0}")]
    Wait(#[source] io::Error),

    #[error("Failed to receive reply: {0}")]
    Receive(#[source] io::Error),

    #[error("Failed to write hop report: {0}")]
    Output(#[source] io::Error),
}

mod cli;
mod error;
mod icmp;
mod report;
mod trace;
mod utils;

use icmp::IcmpSocket;
use std::io;
use trace::{TraceConfig, TraceOutcome, Tracer};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Enable debug logging if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        env_logger::init();
    }

    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => utils::exit_with_error(&e.to_string(), 1),
    };

    let socket = match IcmpSocket::open(&args.destination) {
        Ok(socket) => socket,
        Err(e) => utils::exit_with_error(&e.to_string(), 1),
    };

    let config = TraceConfig::new(utils::process_identifier());
    log::info!(
        "Tracing {} (id {:#06x}, {} hops max)",
        socket.destination(),
        config.tag,
        config.max_ttl
    );

    let mut shutdown = utils::setup_signal_handler();
    let mut tracer = Tracer::new(socket, config);

    let outcome = match tracer.run(&mut io::stdout(), &mut shutdown).await {
        Ok(outcome) => outcome,
        Err(e) => utils::exit_with_error(&e.to_string(), 1),
    };

    let code = match outcome {
        TraceOutcome::Reached => 0,
        TraceOutcome::Exhausted | TraceOutcome::Interrupted => 1,
    };
    std::process::exit(code);
}

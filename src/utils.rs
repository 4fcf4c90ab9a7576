use std::process;

/// Correlation tag for this run's probes, derived from the process id.
pub fn process_identifier() -> u16 {
    process::id() as u16
}

/// Print error message and exit with error code
pub fn exit_with_error(message: &str, code: i32) -> ! {
    eprintln!("icmptrace: {}", message);
    process::exit(code);
}

/// Handle Ctrl+C signal for graceful shutdown
pub fn setup_signal_handler() -> tokio::sync::oneshot::Receiver<()> {
    let (tx, rx) = tokio::sync::oneshot::channel();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = tx.send(());
            }
            Err(e) => log::warn!("Cannot listen for Ctrl+C: {}", e),
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_is_stable_per_process() {
        assert_eq!(process_identifier(), process_identifier());
        assert_eq!(process_identifier(), (process::id() & 0xffff) as u16);
    }

    #[tokio::test]
    async fn test_signal_handler_idle() {
        let mut rx = setup_signal_handler();
        assert!(rx.try_recv().is_err());
    }
}

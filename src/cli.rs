use clap::error::ErrorKind;
use clap::{Arg, Command};
use std::ffi::OsString;

const USAGE: &str = "icmptrace x.x.x.x";

#[derive(Debug, Clone)]
pub struct TraceArgs {
    pub destination: String,
}

pub fn build_cli() -> Command {
    Command::new("icmptrace")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Trace the router path to an IPv4 host with ICMP echo probes")
        .override_usage(USAGE)
        .arg(
            Arg::new("destination")
                .help("Destination IPv4 address in dotted-quad form")
                .value_name("x.x.x.x")
                .required(true)
                .index(1),
        )
}

pub fn parse_args() -> anyhow::Result<TraceArgs> {
    parse_args_from(std::env::args_os())
}

/// Parse `argv`. Help and version requests print and exit here; every other
/// clap error is returned so the caller decides the exit status.
pub fn parse_args_from<I, T>(argv: I) -> anyhow::Result<TraceArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = match build_cli().try_get_matches_from(argv) {
        Ok(matches) => matches,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            return Err(anyhow::anyhow!(
                "Wrong arguments: {}",
                e.render().to_string().trim_end()
            ));
        }
    };

    let destination = matches
        .get_one::<String>("destination")
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Missing destination\nUsage: {}", USAGE))?;

    Ok(TraceArgs { destination })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_destination() {
        let args = parse_args_from(["icmptrace", "8.8.8.8"]).unwrap();
        assert_eq!(args.destination, "8.8.8.8");
    }

    #[test]
    fn test_destination_is_not_validated_here() {
        let args = parse_args_from(["icmptrace", "not-an-ip"]).unwrap();
        assert_eq!(args.destination, "not-an-ip");
    }

    #[test]
    fn test_wrong_argument_count() {
        assert!(parse_args_from(["icmptrace"]).is_err());

        let err = parse_args_from(["icmptrace", "1.1.1.1", "2.2.2.2"]).unwrap_err();
        assert!(err.to_string().starts_with("Wrong arguments"));
    }

    #[test]
    fn test_usage_mentions_address_form() {
        let help = build_cli().render_help().to_string();
        assert!(help.contains(USAGE));
    }

    #[test]
    fn test_cli_definition() {
        build_cli().debug_assert();
    }
}

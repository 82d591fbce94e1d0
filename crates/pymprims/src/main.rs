mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "pymprims", version, about = "Embedded frame messaging CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "text",
        env = "PYMPRIMS_LOG_FORMAT",
        global = true
    )]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "warn",
        env = "PYMPRIMS_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_encode_subcommand() {
        let cli = Cli::try_parse_from([
            "pymprims",
            "encode",
            "--id",
            "graphic",
            "--type",
            "height",
            "--payload",
            "400",
        ])
        .expect("encode args should parse");

        match cli.command {
            Command::Encode(args) => {
                assert_eq!(args.id, "graphic");
                assert_eq!(args.message_type, "height");
                assert_eq!(args.payload, "400");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_wire_argument_with_stdin() {
        let err = Cli::try_parse_from([
            "pymprims",
            "decode",
            "--id",
            "graphic",
            "pymxPYMxgraphicxPYMxheightxPYMx400",
            "--stdin",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn decode_needs_a_source() {
        let err = Cli::try_parse_from(["pymprims", "decode", "--id", "graphic"])
            .expect_err("missing wire should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn parses_repeated_simulate_steps() {
        let cli = Cli::try_parse_from([
            "pymprims",
            "--format",
            "pretty",
            "simulate",
            "--track-scroll",
            "--scroll",
            "100",
            "--scroll",
            "200",
            "--resize",
            "320",
        ])
        .expect("simulate args should parse");

        assert!(matches!(cli.format, Some(OutputFormat::Pretty)));
        match cli.command {
            Command::Simulate(args) => {
                assert!(args.track_scroll);
                assert_eq!(args.scrolls, [100.0, 200.0]);
                assert_eq!(args.resizes, [320.0]);
                assert_eq!(args.scroll_wait, 100);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn check_url_requires_a_url() {
        let err = Cli::try_parse_from(["pymprims", "check-url"])
            .expect_err("missing url should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}

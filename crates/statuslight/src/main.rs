//! statuslight: mirror a chat client's presence status on a USB busylight.

use std::path::PathBuf;

use clap::Parser;
use statuslight_lib::pipe::CancelToken;

mod cli;

#[derive(Parser)]
#[command(
    name = "statuslight",
    version,
    about = "Mirror chat presence status on a USB busylight"
)]
struct Args {
    /// Output as JSON (for run, devices, version, classify, list, config)
    #[arg(long, global = true)]
    json: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: cli::Command,
}

fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(args.verbose)),
    )
    .format_timestamp(None)
    .format_target(false)
    .init();

    // Ctrl+C / SIGTERM fire the shared shutdown token.
    let shutdown = CancelToken::new();
    let handler_token = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        log::warn!("could not install Ctrl+C handler: {e}");
    }

    if let Err(e) = cli::run(args.command, args.json, args.config.as_deref(), &shutdown) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_filter() {
        assert_eq!(log_filter(0), "warn");
        assert_eq!(log_filter(1), "info");
        assert_eq!(log_filter(2), "debug");
        assert_eq!(log_filter(7), "debug");
    }

    #[test]
    fn args_parse_globals_after_subcommand() {
        let args = Args::try_parse_from(["statuslight", "list", "--json", "-vv"]).unwrap();
        assert!(args.json);
        assert_eq!(args.verbose, 2);
        assert!(matches!(args.command, cli::Command::List));
    }

    #[test]
    fn args_reject_unknown_subcommand() {
        assert!(Args::try_parse_from(["statuslight", "blink"]).is_err());
    }
}

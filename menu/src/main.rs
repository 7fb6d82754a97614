#![deny(rust_2018_idioms)]

use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

mod command;
mod config;
mod session;

use command::{CommandError, Tokens};
use config::Config;
use session::Session;

const MENU: &str = "Insert key: 1 <key>\nRemove key: 2 <key>\nFind key: 3 <key>\nExit: 0\n";

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(&config)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    run(&config, stdin.lock(), stdout.lock())
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let Some(directives) = config.rust_log.as_deref() else {
        return Ok(());
    };
    let filter = EnvFilter::try_new(directives)
        .with_context(|| format!("invalid log filter {directives:?}"))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_filter(filter),
        )
        .init();
    Ok(())
}

fn run<R: BufRead, W: Write>(config: &Config, input: R, mut out: W) -> anyhow::Result<()> {
    let mut session = Session::new();
    for &key in &config.preload {
        session.execute(command::Command::Insert(key));
    }
    info!(preloaded = session.tree().len(), "session started");

    let mut tokens = Tokens::new(input);
    loop {
        if !config.no_prompt {
            writeln!(out, "{MENU}")?;
            out.flush()?;
        }

        match tokens.next_command() {
            Ok(Some(command)) => {
                let outcome = session.execute(command);
                writeln!(out, "{outcome}\n")?;
            }
            Ok(None) => break,
            Err(CommandError::Io(err)) => {
                return Err(err).context("failed to read commands");
            }
            Err(err) if err.is_recoverable() => {
                warn!(%err, "skipping command");
                writeln!(out, "{err}\n")?;
            }
            Err(err) => {
                warn!(%err, "stopping");
                writeln!(out, "{err}\n")?;
                break;
            }
        }
    }

    info!(len = session.tree().len(), "session finished");
    out.flush().context("failed to flush output")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_str(args: &[&str], input: &str) -> String {
        let config = Config::parse_from(std::iter::once("splay-menu").chain(args.iter().copied()));
        let mut out = Vec::new();
        run(&config, input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn session() {
        let out = run_str(
            &["--no-prompt"],
            "1 5 1 3 1 8 1 1 1 4\n3 8\n2 3\n3 3\n2 99\n0\n3 8\n",
        );
        let expected = "\
Added\nKey: 5\n\n\
Added\nKey: 3\n\n\
Added\nKey: 8\n\n\
Added\nKey: 1\n\n\
Added\nKey: 4\n\n\
Key: 8\n\n\
Removed\nKey: 3\n\n\
Key 3 not found\n\n\
Key 99 not found\n\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn preload_and_prompt() {
        let out = run_str(&["--preload", "1,2,3"], "3 2\n");
        assert_eq!(out, format!("{MENU}\nKey: 2\n\n{MENU}\n"));
    }

    #[test]
    fn bad_input() {
        let out = run_str(&["--no-prompt"], "1 x\n1 7\nquit\n1 8\n");
        assert_eq!(out, "Invalid key: x\n\nAdded\nKey: 7\n\nUnknown command: quit\n\n");
    }
}

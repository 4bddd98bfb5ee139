use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::net::{Ipv4Addr, SocketAddr};
use wallcycle_common::error::IpcError;
use wallcycle_common::ipc::DEFAULT_PORT;
use wallcycle_common::{ErrorReporting, IpcClient, WallcycleError};

#[derive(Parser)]
#[command(name = "wallcycle-cli")]
#[command(about = "wallcycle-cli (send commands to a wallcycle-daemon started with --server)")]
#[command(version)]
struct Cli {
    /// Port the daemon listens on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one command, e.g. `send skip` or `send mode fav`
    Send {
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },

    /// Forward every typed line until end of input
    Shell,
}

fn main() -> Result<()> {
    run(Cli::parse()).map_err(|e| anyhow::anyhow!(e.user_friendly_message()))
}

fn run(cli: Cli) -> Result<(), WallcycleError> {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, cli.port));

    match cli.command {
        Commands::Send { words } => send(addr, &words.join(" ")),
        Commands::Shell => {
            let stdin = io::stdin();
            forward_lines(addr, stdin.lock(), &mut io::stdout())?;
            println!();
            Ok(())
        }
    }
}

fn send(addr: SocketAddr, command: &str) -> Result<(), WallcycleError> {
    IpcClient::connect(addr)?.send(command)
}

/// Sends every non-blank line on a connection of its own. The daemon drops a
/// client that stays quiet past its read timeout, and a write into such a
/// socket still succeeds locally, so a long-lived connection loses commands.
fn forward_lines(
    addr: SocketAddr,
    mut input: impl BufRead,
    prompt: &mut impl Write,
) -> Result<usize, WallcycleError> {
    let mut forwarded = 0;

    loop {
        write!(prompt, ">> ")
            .and_then(|_| prompt.flush())
            .map_err(|e| WallcycleError::Ipc(IpcError::Console { source: e }))?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .map_err(|e| WallcycleError::Ipc(IpcError::Console { source: e }))?;
        if read == 0 {
            return Ok(forwarded);
        }

        let command = line.trim();
        if command.is_empty() {
            continue;
        }

        send(addr, command)?;
        forwarded += 1;
    }
}

//! RAX FTP Client - Entry Point
//!
//! Reads FTP commands from stdin, prints server replies and listings to stdout.

use clap::Parser;
use log::{error, info};
use std::process::ExitCode;
use tokio::io::{self, BufReader};

use rax_ftp_client::utils::setup_logging;
use rax_ftp_client::{ClientConfig, ClientSession, run_commands};

#[derive(Parser, Debug)]
#[command(name = "rax-ftp-client", about = "Interactive FTP client")]
struct Cli {
    /// Server address for the control connection
    #[arg(short, long)]
    ip: Option<String>,

    /// Server control port
    #[arg(short, long)]
    port: Option<u16>,

    /// Server address, when not given with --ip
    #[arg(value_name = "HOST")]
    host: Option<String>,

    /// Server control port, when not given with --port
    #[arg(value_name = "PORT")]
    control_port: Option<u16>,
}

impl Cli {
    /// Parses `args`, also accepting the single-dash `-ip` and `-port` spellings.
    fn parse_args<I>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = String>,
    {
        Self::try_parse_from(args.into_iter().map(|arg| match arg.as_str() {
            "-ip" => "--ip".to_string(),
            "-port" => "--port".to_string(),
            _ => arg,
        }))
    }

    fn host(&self) -> Option<String> {
        self.ip.clone().or_else(|| self.host.clone())
    }

    fn port(&self) -> Option<u16> {
        self.port.or(self.control_port)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();
    let cli = Cli::parse_args(std::env::args()).unwrap_or_else(|e| e.exit());

    let config = match ClientConfig::load() {
        Ok(config) => config.with_overrides(cli.host(), cli.port()),
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    let address = config.control_address();
    info!("Connecting to {}...", address);
    let mut stdout = io::stdout();

    let mut session = match ClientSession::connect(config).await {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Cannot connect to {}: {}", address, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = session.read_welcome(&mut stdout).await {
        eprintln!("No greeting from {}: {}", address, e);
        return ExitCode::FAILURE;
    }

    let stdin = BufReader::new(io::stdin());
    match run_commands(&mut session, stdin, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Session aborted: {}", e);
            eprintln!("Connection to {} lost: {}", address, e);
            ExitCode::FAILURE
        }
    }
}

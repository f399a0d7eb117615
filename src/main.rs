use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ptsl_client::commands::RawCommand;
use ptsl_client::{CommandResponse, PtslClient, PtslConfig};
use serde::Serialize;
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(author, version, about = "Pro Tools scripting client", long_about = None)]
struct Args {
    /// PTSL server address
    #[arg(long)]
    address: Option<String>,

    /// Company name sent with RegisterConnection
    #[arg(long)]
    company: Option<String>,

    /// Application name sent with RegisterConnection
    #[arg(long)]
    app_name: Option<String>,

    /// Permission groups for write commands, or "all"
    #[arg(long)]
    allow_writes: Option<String>,

    /// Give up on any single wait for the host after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether Pro Tools can accept commands
    Ready,
    /// Print the PTSL protocol version of the host
    Version,
    /// Print the open session's name, path and sample rate
    Session,
    /// List tracks
    Tracks,
    /// Print the transport state
    TransportState,
    /// List memory locations
    Markers,
    /// Save the open session
    Save,
    /// Send any command by name, e.g. `raw GetSessionName`
    Raw {
        name: String,
        /// Request body as JSON
        json: Option<String>,
        /// Use the server-streaming call
        #[arg(long)]
        streaming: bool,
        /// Poll task status while streaming
        #[arg(long, requires = "streaming")]
        ping: bool,
    },
}

impl Args {
    fn apply(&self, config: &mut PtslConfig) {
        if let Some(address) = &self.address {
            config.server_address = address.clone();
        }
        if let Some(company) = &self.company {
            config.company_name = company.clone();
        }
        if let Some(app_name) = &self.app_name {
            config.application_name = app_name.clone();
        }
        if let Some(allow_writes) = &self.allow_writes {
            config.allow_writes = allow_writes.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.call_timeout_ms = Some(timeout_ms);
        }
    }
}

/// Prints the body as JSON, or the failure details to stderr.
fn report<B: Serialize>(label: &str, response: CommandResponse<B>) -> Result<()> {
    for warning in response.warnings() {
        log::warn!("{}: {}", label, warning);
    }

    if !response.is_success() {
        eprintln!("❌ {} failed", label);
        eprintln!("   status: {:?}", response.task_status());
        if !response.status.clarification.is_empty() {
            eprintln!("   detail: {}", response.status.clarification);
        }
        for err in response.errors.iter().filter(|e| !e.is_warning) {
            eprintln!("   {}", err);
        }
        bail!("{} did not complete", label);
    }

    match &response.body {
        Some(body) => println!("{}", serde_json::to_string_pretty(body)?),
        None => println!("✅ {} completed", label),
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let mut config = PtslConfig::load().context("Failed to load configuration")?;
    args.apply(&mut config);

    let client = PtslClient::connect(&config)
        .await
        .with_context(|| format!("Failed to connect to {}", config.server_address))?;

    if let Command::Ready = args.command {
        report("HostReadyCheck", client.host_ready_check().await)?;
        if !client.is_host_ready() {
            bail!("Pro Tools is not ready");
        }
        return Ok(());
    }

    client
        .start(&config.company_name, &config.application_name)
        .await
        .context("Pro Tools is not ready or refused the connection")?;

    match args.command {
        Command::Ready => Ok(()),
        Command::Version => report("GetPTSLVersion", client.get_ptsl_version().await),
        Command::Session => {
            report("GetSessionName", client.get_session_name().await)?;
            report("GetSessionPath", client.get_session_path().await)?;
            report("GetSessionSampleRate", client.get_session_sample_rate().await)
        }
        Command::Tracks => report("GetTrackList", client.get_track_list().await),
        Command::TransportState => {
            report("GetTransportState", client.get_transport_state().await)
        }
        Command::Markers => report("GetMemoryLocations", client.get_memory_locations().await),
        Command::Save => report("SaveSession", client.save_session().await),
        Command::Raw {
            name,
            json,
            streaming,
            ping,
        } => {
            let params: Value = match json {
                Some(json) => serde_json::from_str(&json).context("Request body is not JSON")?,
                None => Value::Null,
            };
            let mut raw = RawCommand::by_name(&name, params)
                .with_context(|| format!("Unknown command '{}'", name))?;
            if ping {
                raw = raw.with_task_status_ping();
            }
            let response = if streaming {
                client.execute_raw_streaming(raw).await
            } else {
                client.execute_raw(raw).await
            };
            report(&name, response)
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

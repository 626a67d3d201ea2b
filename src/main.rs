use std::io::{self, Read};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{eyre, Report, WrapErr};
use color_eyre::{Result, Section};
use crossterm::tty::IsTty;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use execstream::client::ControlPlaneClient;
use execstream::config::{StreamConfig, StreamFormat};
use execstream::error::ExecStreamError;
use execstream::events::EventType;
use execstream::executor::StreamingExecutor;
use execstream::logging::init_logging;
use execstream::mapper::{EventMapper, ExecutionEventMapper, PlanEventMapper};
use execstream::stream::{PlanStreamer, StreamController, StreamHandle};

#[derive(Parser, Debug)]
#[command(name = "execstream", version, about = "Stream execution events as text or NDJSON")]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    debug: bool,

    /// Output format: auto, text or json
    #[arg(long, global = true, value_name = "FORMAT")]
    format: Option<String>,

    /// Include tool inputs and outputs
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only show tool completion lines
    #[arg(long, global = true)]
    compact: bool,

    /// Show tool output without truncation
    #[arg(long, global = true)]
    full_output: bool,

    /// Tool output lines to show before truncating
    #[arg(long, global = true, value_name = "N")]
    output_lines: Option<usize>,

    /// Control plane base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// API key (defaults to EXECSTREAM_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Reconnection attempts before giving up
    #[arg(long, global = true, value_name = "N")]
    max_reconnects: Option<u32>,

    /// Only show these event types (comma separated)
    #[arg(long = "event-type", global = true, value_delimiter = ',')]
    event_types: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Follow a live execution until it finishes
    Stream {
        execution_id: String,
    },
    /// Stream plan generation for a JSON request read from a file or `-`
    Plan {
        request: String,
    },
    /// Render a captured SSE transcript from a file or `-`
    Replay {
        input: String,
        #[arg(long, value_enum, default_value_t = Channel::Execution)]
        channel: Channel,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Channel {
    Execution,
    Plan,
}

fn build_config(cli: &Cli) -> Result<StreamConfig> {
    let mut config = StreamConfig::from_env()?
        .with_verbose(cli.verbose)
        .with_compact(cli.compact)
        .with_full_output(cli.full_output);

    if let Some(name) = &cli.format {
        let format = StreamFormat::from_name(name);
        if format == StreamFormat::Auto && !name.eq_ignore_ascii_case("auto") {
            warn!(format = %name, "unknown output format, using text");
        }
        config = config.with_format(format);
    }
    if let Some(lines) = cli.output_lines {
        config = config.with_output_lines(lines);
    }
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url.clone());
    }
    if let Some(key) = &cli.api_key {
        config = config.with_api_key(key.clone());
    }
    if let Some(max) = cli.max_reconnects {
        config = config.with_max_reconnects(max);
    }
    if !cli.event_types.is_empty() {
        let types = cli
            .event_types
            .iter()
            .map(|name| name.parse::<EventType>().map_err(|e| eyre!(e)))
            .collect::<Result<Vec<_>>>()?;
        config = config.with_event_types(types);
    }
    Ok(config)
}

fn control_plane(config: &StreamConfig) -> ControlPlaneClient {
    let client = ControlPlaneClient::with_url(config.base_url.clone());
    match &config.api_key {
        Some(key) => client.with_auth(key.clone()),
        None => client,
    }
}

fn read_input(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .wrap_err("failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(source).wrap_err_with(|| format!("failed to read {}", source))
}

/// Cancel `token` on Ctrl-C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received");
            token.cancel();
        }
    });
}

async fn consume(
    mut executor: StreamingExecutor,
    handle: StreamHandle,
    cancel: &CancellationToken,
) -> Result<()> {
    let result = executor.run(handle, cancel).await;
    if let Err(err) = executor.close() {
        if !err.is_broken_pipe() {
            warn!(error = %err, "failed to close output");
        }
    }
    result.map_err(report)
}

fn report(err: ExecStreamError) -> Report {
    let hint = err.category().recovery_hint();
    Report::new(err).suggestion(hint)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    if !init_logging(cli.debug) {
        eprintln!("warning: a log subscriber was already installed, diagnostics may be missing");
    }

    let config = build_config(&cli)?;
    let interactive = io::stdout().is_tty();
    let executor = StreamingExecutor::for_writer(&config, io::stdout(), interactive);
    debug!(format = %executor.format(), interactive, "output configured");

    match &cli.command {
        Command::Stream { execution_id } => {
            let cancel = CancellationToken::new();
            cancel_on_ctrl_c(cancel.clone());

            let controller = StreamController::new(Arc::new(control_plane(&config)))
                .with_policy(config.reconnect_policy())
                .with_event_buffer(config.event_buffer);
            let handle = controller.start(execution_id, cancel.clone());
            consume(executor, handle, &cancel).await
        }
        Command::Plan { request } => {
            let body: serde_json::Value = serde_json::from_str(&read_input(request)?)
                .wrap_err("plan request is not valid JSON")?;

            let cancel = CancellationToken::new();
            cancel_on_ctrl_c(cancel.clone());

            let streamer = PlanStreamer::new(Arc::new(control_plane(&config)))
                .with_event_buffer(config.event_buffer);
            let handle = streamer.start(body, cancel.clone());
            consume(executor, handle, &cancel).await
        }
        Command::Replay { input, channel } => {
            let transcript = read_input(input)?;
            let mapper: Box<dyn EventMapper> = match channel {
                Channel::Execution => Box::new(ExecutionEventMapper::new()),
                Channel::Plan => Box::new(PlanEventMapper::new()),
            };

            let mut executor = executor;
            let rendered = executor.replay(&transcript, mapper.as_ref());
            debug!(rendered, "replay finished");
            if let Err(err) = executor.close() {
                if !err.is_broken_pipe() {
                    return Err(report(err.into()));
                }
            }
            Ok(())
        }
    }
}

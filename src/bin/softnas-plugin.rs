//! softnas-plugin - Mackerel agent plugin for SoftNAS appliances.
//!
//! Runs one poll cycle against `softnas-cmd` and prints the metrics, or the
//! graph definitions when the agent asks for plugin metadata.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{Level, debug, error, info};
use tracing_subscriber::EnvFilter;

use softnas::PluginError;
use softnas::collector::{Collector, Credentials, SoftnasCmd, ToolConfig};
use softnas::graph::{DEFAULT_PREFIX, GraphDefinition};
use softnas::report::{meta_requested, write_meta, write_values};

/// SoftNAS metrics plugin.
#[derive(Parser)]
#[command(name = "softnas-plugin", about = "Mackerel plugin for SoftNAS", version)]
struct Args {
    /// Path of softnas-cmd.
    #[arg(long, env = "SOFTNAS_CMD", default_value = SoftnasCmd::DEFAULT_COMMAND)]
    cmd: PathBuf,

    /// Base URL passed to softnas-cmd.
    #[arg(long, env = "SOFTNAS_URL", default_value = SoftnasCmd::DEFAULT_BASE_URL)]
    url: String,

    /// User of softnas-cmd.
    #[arg(long, env = "SOFTNAS_USER", default_value = "softnas")]
    user: String,

    /// Password of softnas-cmd.
    #[arg(long, env = "SOFTNAS_PASSWORD", default_value = "Pass4W0rd", hide_env_values = true)]
    password: String,

    /// Timeout for each softnas-cmd invocation, in seconds.
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Leading segment of graph keys.
    #[arg(long, default_value = DEFAULT_PREFIX)]
    metric_key_prefix: String,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber. Logs go to stderr; stdout is reserved
/// for the agent.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["softnas", "softnas_plugin"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let tool = SoftnasCmd::new(ToolConfig {
        command: args.cmd.clone(),
        base_url: args.url.clone(),
        timeout: Duration::from_secs(args.timeout),
    });
    let credentials = Credentials::new(&args.user, &args.password);

    let collector = Collector::login(tool, &credentials)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if meta_requested() {
        let pools = collector.list_pools()?;
        let graphs = GraphDefinition::new(&args.metric_key_prefix, &pools);
        write_meta(&mut out, &graphs)?;
    } else {
        let poll = collector.collect_all()?;
        let graphs = GraphDefinition::new(&args.metric_key_prefix, &poll.pools);
        let written = write_values(&mut out, &graphs, &poll.metrics, chrono::Utc::now().timestamp())?;
        debug!("Wrote {} of {} metrics", written, poll.metrics.len());
    }

    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    info!(
        "softnas-plugin {} polling {} via {}",
        env!("CARGO_PKG_VERSION"),
        args.url,
        args.cmd.display()
    );

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<PluginError>() {
                Some(PluginError::Timeout { .. }) => {
                    error!("{} (raise --timeout if the appliance is slow)", e)
                }
                _ => error!("{}", e),
            }
            ExitCode::FAILURE
        }
    }
}

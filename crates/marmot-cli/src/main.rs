//! Marmot Command-Line Interface
//!
//! Runs abstract circuits on AQT cloud devices and inspects how they are
//! lowered to the native gate set.
//!
//! ```text
//!   marmot translate -i bell.json          lower only, no network
//!   marmot run -i bell.json -b aqt.sim     submit, poll, print counts
//!   marmot backends                        list registered devices
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{backends, run, translate, version};

/// Marmot - run abstract quantum circuits on AQT devices
#[derive(Parser)]
#[command(name = "marmot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Device configuration file (YAML, defaults to ~/.marmot/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a circuit on an AQT device
    Run {
        /// Input file (JSON or YAML operation list)
        #[arg(short, long)]
        input: String,

        /// Number of shots (overrides the configuration)
        #[arg(short, long)]
        shots: Option<u32>,

        /// Device to run on
        #[arg(short, long, default_value = "aqt.sim")]
        backend: String,

        /// Number of device wires (inferred from the circuit if omitted)
        #[arg(short, long)]
        wires: Option<u32>,
    },

    /// Lower a circuit to AQT instructions without submitting it
    Translate {
        /// Input file (JSON or YAML operation list)
        #[arg(short, long)]
        input: String,

        /// Number of device wires (inferred from the circuit if omitted)
        #[arg(short, long)]
        wires: Option<u32>,

        /// Output format (json, text)
        #[arg(short, long, default_value = "json")]
        format: String,
    },

    /// List available devices
    Backends,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging (RUST_LOG wins over -v)
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Run {
            input,
            shots,
            backend,
            wires,
        } => run::execute(&input, &backend, shots, wires, config).await,

        Commands::Translate {
            input,
            wires,
            format,
        } => translate::execute(&input, wires, &format),

        Commands::Backends => backends::execute(config),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

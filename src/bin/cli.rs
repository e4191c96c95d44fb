//! kvsecrets CLI Client
//!
//! Command-line interface for reading and writing single keys of namespaced
//! containers on a kvsecrets server.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use kvsecrets::output::{self, OutputFormat};
use kvsecrets::secrets::{self, ValueEncoding};
use kvsecrets::{ClientConfig, ClientSettings, ConnectionSource, RemoteStore, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// kvsecrets CLI
#[derive(Parser, Debug)]
#[command(name = "kvsecrets")]
#[command(about = "Get, set and delete single keys of namespaced containers")]
#[command(version)]
struct Args {
    /// Namespace to use
    #[arg(long, global = true, default_value = "default")]
    namespace: String,

    /// Output format to use
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,

    /// Path to the client config file (default: ~/.kvsecrets/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use in-cluster service discovery instead of the config file
    #[arg(long, global = true)]
    in_cluster: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List containers, optionally filtered by name
    #[command(alias = "list")]
    Get {
        /// Case-insensitive name substrings
        filter: Vec<String>,
    },

    /// Set one key of a container
    Set {
        /// container.key
        name: String,

        /// The value to set
        value: String,

        /// Value is given in base64
        #[arg(long)]
        base64: bool,
    },

    /// Delete a whole container or one of its keys
    Delete {
        /// container or container.key
        name: String,
    },
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays machine-readable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let settings = settings(&args)?;
    let connect = || RemoteStore::connect(&settings.client);
    let namespace = settings.namespace.as_str();

    let projections = match &args.command {
        Commands::Get { filter } => secrets::list(&connect()?, namespace, filter.as_slice())?,
        Commands::Set {
            name,
            value,
            base64,
        } => {
            let encoding = if *base64 {
                ValueEncoding::Base64
            } else {
                ValueEncoding::Raw
            };
            vec![secrets::set_encoded(connect, namespace, name, value, encoding)?]
        }
        Commands::Delete { name } => vec![secrets::delete(&connect()?, namespace, name)?],
    };

    let stdout = io::stdout();
    output::render(&mut stdout.lock(), &projections, settings.output)
}

fn settings(args: &Args) -> Result<ClientSettings> {
    let source = if args.in_cluster {
        ConnectionSource::InCluster
    } else {
        let path = args
            .config
            .clone()
            .or_else(ClientConfig::default_path)
            .unwrap_or_else(|| PathBuf::from("kvsecrets.toml"));
        ConnectionSource::ConfigFile(path)
    };
    tracing::debug!(?source, "loading client configuration");

    let client = ClientConfig::load(&source)?;
    Ok(ClientSettings::new(args.namespace.clone(), args.output, client))
}

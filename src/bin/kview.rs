//! kview - interactive resource table with port-forwards.
//!
//! Usage:
//!   kview                  # pods in the default namespace
//!   kview -A               # pods in every namespace
//!   kview --kind nodes     # nodes
//!   kview -n kube-system   # pods in kube-system
//!   kview --config kview.json --dump-dir ./dumps

use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use tikv_jemallocator::Jemalloc;
use tracing::Level;
use tracing_subscriber::{EnvFilter, prelude::*};

use kview::config::Config;
use kview::model::scope::NAMESPACE_ALL;
use kview::source::{DataSource, MockCluster};
use kview::tui::App;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

/// Interactive resource table with port-forwards.
#[derive(Parser, Debug)]
#[command(name = "kview", version, about = "Live resource table viewer")]
struct Args {
    /// Namespace to show.
    #[arg(short, long, default_value = "default")]
    namespace: String,

    /// Show every namespace.
    #[arg(short = 'A', long)]
    all_namespaces: bool,

    /// Resource kind to start with (po, pods, no, nodes).
    #[arg(long, default_value = "pods")]
    kind: String,

    /// Path to the JSON config file.
    #[arg(long, value_name = "PATH", default_value = "kview.json")]
    config: PathBuf,

    /// Refresh interval in seconds, overrides the config file.
    #[arg(long, value_name = "SECS")]
    refresh: Option<u64>,

    /// Directory for table dumps, overrides the config file.
    #[arg(long, value_name = "PATH")]
    dump_dir: Option<PathBuf>,

    /// Hide the CPU and MEM columns.
    #[arg(long)]
    no_metrics: bool,

    /// Log file path.
    #[arg(long, default_value = "/tmp/kview.log")]
    log_file: PathBuf,

    /// Enable debug logging.
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let args = Args::parse();

    // Log to a file; the terminal belongs to the UI.
    let log_file = match File::create(&args.log_file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: cannot create log file '{}': {}", args.log_file.display(), e);
            std::process::exit(1);
        }
    };
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false)
                .with_target(false),
        )
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    let mut config = match Config::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(secs) = args.refresh {
        config.refresh_secs = secs;
    }
    if let Some(dir) = args.dump_dir {
        config.dump_dir = dir;
    }

    let mut source = MockCluster::typical_cluster()
        .with_metrics(!args.no_metrics)
        .with_churn(true);
    if let Err(e) = source.set_kind(&args.kind) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    let ns = if args.all_namespaces {
        NAMESPACE_ALL
    } else {
        args.namespace.as_str()
    };
    source.set_namespace(ns);

    tracing::info!(kind = %source.kind(), ns, "starting kview");

    let app = App::new(Box::new(source), config);
    if let Err(e) = app.run() {
        eprintln!("Error running TUI: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Goodbye!");
}

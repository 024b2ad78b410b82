use anyhow::Result;
use clap::Parser;
use homedash::{DashboardConfig, DashboardOrchestrator};
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "homedash")]
#[command(about = "Smart home dashboard for lights, thermostats and security cameras")]
#[command(version)]
#[command(long_about = "A smart home control dashboard that tracks devices and security \
cameras in a persisted store, simulates device round trips and camera feeds, and serves \
the dashboard over HTTP with a live event stream. Optional single-key terminal commands \
drive the same store.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "homedash.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without starting the dashboard")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Dry run mode - render once and exit
    #[arg(long, help = "Initialize the store, print the rendered dashboard and exit")]
    dry_run: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Enable terminal key commands
    #[arg(short, long, help = "Enable single-key terminal commands (q to quit)")]
    keyboard: bool,

    /// Reseed the store on startup
    #[arg(long, help = "Reseed the store with the mock devices, ignoring any saved snapshot")]
    reset: bool,

    /// Keep the store in memory only
    #[arg(long, help = "Keep the store in memory only, never writing the snapshot file")]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle special modes that don't require full initialization
    if args.print_config {
        print_default_config()?;
        return Ok(());
    }

    init_logging(&args)?;

    info!("Starting homedash v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let mut config = match DashboardConfig::load_from_file(&args.config) {
        Ok(config) => {
            info!("Configuration loaded successfully from: {}", args.config);
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if args.validate_config {
        match config.validate() {
            Ok(()) => {
                info!("Configuration validation successful");
                println!("✓ Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                error!("Configuration validation failed: {}", e);
                eprintln!("✗ Configuration validation failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    config.validate().map_err(|e| {
        error!("Configuration validation failed: {}", e);
        e
    })?;

    if args.ephemeral {
        config.storage.persist = false;
    }

    let load_delay = config.simulation.feed_load_delay();

    let mut orchestrator = DashboardOrchestrator::new(config).map_err(|e| {
        error!("Failed to create orchestrator: {}", e);
        e
    })?;
    orchestrator.set_keyboard_enabled(args.keyboard || orchestrator.config().system.keyboard);
    orchestrator.set_reset_on_start(args.reset);

    orchestrator.initialize().await.map_err(|e| {
        error!("Failed to initialize dashboard: {}", e);
        e
    })?;

    if args.dry_run {
        info!("Dry run mode - rendering once without starting components");
        let dashboard = orchestrator.dashboard();
        dashboard.sync();

        // Let the initial feed loads resolve before rendering
        tokio::time::sleep(load_delay + Duration::from_millis(50)).await;
        println!("{}", dashboard.render());

        dashboard.unmount_all();
        return Ok(());
    }

    orchestrator.start().await.map_err(|e| {
        error!("Failed to start dashboard: {}", e);
        e
    })?;

    let exit_code = orchestrator.run().await.map_err(|e| {
        error!("Dashboard error during execution: {}", e);
        e
    })?;

    info!("homedash exited with code: {}", exit_code);
    std::process::exit(exit_code);
}

fn init_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{
        fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    };

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("homedash={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .with_target(true)
                .with_thread_ids(args.debug)
                .with_file(args.debug)
                .with_line_number(args.debug)
                .boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();

    Ok(())
}

/// Print default configuration in TOML format
fn print_default_config() -> Result<()> {
    println!("# homedash configuration file");
    println!("# Every key is optional; HOMEDASH_<SECTION>__<KEY> environment variables override it");
    println!();
    println!("{}", DashboardConfig::default().to_toml()?);
    Ok(())
}

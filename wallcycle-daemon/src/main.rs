use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use wallcycle_common::ipc::default_addr;
use wallcycle_common::{
    ErrorReporting, ImageDiscovery, InputHost, ManagerOptions, Picker, RotationLoop,
    SelectionManager, SwwwIntegration,
};
use wallcycle_config::Config;

#[derive(Parser)]
#[command(name = "wallcycle-daemon")]
#[command(about = "Rotates the desktop wallpaper and takes skip/undo/fav commands")]
#[command(version)]
struct Args {
    /// Directory holding ManagerCheckpoint.json (defaults to ~/.config/wallcycle)
    #[arg(long)]
    save: Option<PathBuf>,

    /// Take commands from the loopback listener instead of the console
    #[arg(long)]
    server: bool,

    /// Print the candidate pool and exit
    #[arg(long)]
    index: bool,

    /// Print a file extension histogram of the wallpaper directory and exit
    #[arg(long)]
    histogram: bool,

    /// Write a default configuration for this wallpaper directory and empty snapshots, then exit
    #[arg(long, value_name = "ROOT")]
    init: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let save_directory = match args.save {
        Some(dir) => dir,
        None => Config::default_save_directory()
            .map_err(|e| anyhow::anyhow!(e.user_friendly_message()))?,
    };

    if let Some(root) = args.init {
        let config = Config::initialize(&save_directory, &root)
            .map_err(|e| anyhow::anyhow!("Initialization failed: {}", e.user_friendly_message()))?;
        println!("Initialized {:?} for wallpapers in {:?}", save_directory, config.root_directory);
        return Ok(());
    }

    let config = Config::load(&save_directory)
        .map_err(|e| {
            e.log_error("Configuration error");
            anyhow::anyhow!("Configuration error: {}", e.user_friendly_message())
        })?;

    if args.index || args.histogram {
        return print_index(&config, args.index, args.histogram);
    }

    let background = SwwwIntegration::new()
        .map_err(|e| anyhow::anyhow!(e.user_friendly_message()))?;

    let options = ManagerOptions {
        picker: Picker::new(),
        sink: Some(Box::new(io::stdout())),
    };
    let manager = SelectionManager::open(
        &config.root_directory,
        &config.legal_extensions,
        config.snapshot_store(),
        Box::new(background),
        options,
    )
    .map_err(|e| anyhow::anyhow!("Failed to start: {}", e.user_friendly_message()))?;
    let manager = Arc::new(manager);

    let mut host = if args.server {
        InputHost::listener(default_addr())
            .map_err(|e| anyhow::anyhow!(e.user_friendly_message()))?
    } else {
        InputHost::interactive()
    };

    install_interrupt_handler(Arc::clone(&manager), host.is_interactive())?;

    let rotation = RotationLoop::new(config.update_period());
    log::info!("Started with {:?} on screen", manager.get_chosen());

    let result = thread::scope(|scope| {
        let rotation_thread = thread::Builder::new()
            .name("rotation".to_string())
            .spawn_scoped(scope, || rotation.run(&manager))
            .context("Failed to spawn rotation thread")?;

        let served = host.run(&manager);
        println!("Exiting. Please wait a moment...");

        if rotation_thread.join().is_err() {
            log::error!("Rotation thread panicked");
        }
        served.map_err(|e| anyhow::anyhow!("Input failed: {}", e.user_friendly_message()))
    });

    log::info!("Stopped");
    result
}

/// Ctrl-C stops both loops. The console host is stuck in a blocking line
/// read that a signal does not end, so there the process exits right after
/// the stop has gone through the manager lock.
fn install_interrupt_handler(manager: Arc<SelectionManager>, interactive: bool) -> Result<()> {
    ctrlc::set_handler(move || {
        manager.request_stop();
        if interactive {
            println!();
            log::info!("Interrupted");
            std::process::exit(130);
        }
    })
    .context("Failed to install Ctrl-C handler")
}

fn print_index(config: &Config, index: bool, histogram: bool) -> Result<()> {
    let disliked = config.snapshot_store().load_disliked()
        .map_err(|e| anyhow::anyhow!(e.user_friendly_message()))?;
    let files = ImageDiscovery::index(&config.root_directory)
        .map_err(|e| anyhow::anyhow!(e.user_friendly_message()))?;
    let candidates = ImageDiscovery::candidates(files, &config.legal_extensions, &disliked);

    if index {
        for candidate in &candidates {
            println!("{}", candidate.display());
        }
    }

    if histogram {
        for (extension, count) in ImageDiscovery::extension_histogram(&candidates) {
            let label = if extension.is_empty() { "<none>" } else { extension.as_str() };
            println!("{}\t{}", label, count);
        }
    }

    Ok(())
}

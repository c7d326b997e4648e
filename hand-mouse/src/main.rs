//! Hand Mouse - gesture-driven pointer control
//!
//! Reads hand landmarks from an external tracker and turns pointing and
//! pinching into cursor moves and clicks.

use hand_mouse::app::cli::{Cli, Commands, ConfigAction};
use hand_mouse::app::config::{set_toml_value, Config};
use hand_mouse::capture::{ReplaySource, TrackerProcess};
use hand_mouse::output::{LogDriver, PointerDriver};
use hand_mouse::workflow::{FrameLoop, Recording, SessionSummary};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    // Initialize tracing (--verbose enables debug-level output)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Load config
    let config = if let Some(path) = &cli.config {
        Config::load(path)?
    } else {
        Config::load_default()?
    };

    // Execute command
    match cli.command {
        Commands::Run {
            dry_run,
            record,
            max_frames,
        } => {
            run_live(dry_run, record, max_frames, &config)?;
        }
        Commands::Replay { input, live } => {
            run_replay(&input, live, &config)?;
        }
        Commands::List { detailed } => {
            run_list(detailed)?;
        }
        Commands::Init { force } => {
            run_init(force, &config)?;
        }
        Commands::Delete { name, force } => {
            run_delete(&name, force)?;
        }
        Commands::Config { action } => {
            run_config(action, &config)?;
        }
    }

    Ok(())
}

/// Ctrl+C raises the returned flag
fn install_stop_handler() -> anyhow::Result<Arc<AtomicBool>> {
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_handler = stop_flag.clone();

    ctrlc::set_handler(move || {
        stop_flag_handler.store(true, Ordering::SeqCst);
    })?;

    Ok(stop_flag)
}

/// The real pointer when available and wanted, otherwise a logging stand-in
fn pointer_driver(dry_run: bool, config: &Config) -> anyhow::Result<Box<dyn PointerDriver>> {
    if dry_run {
        info!("Dry run: pointer actions are logged, not performed");
        return Ok(Box::new(LogDriver::new()));
    }

    #[cfg(feature = "enigo")]
    {
        let driver = hand_mouse::output::EnigoDriver::new()?;
        if let Ok((w, h)) = driver.screen_size() {
            if w as u32 != config.screen.screen_width || h as u32 != config.screen.screen_height {
                warn!(
                    "Main display is {}x{} but config says {}x{}; set screen.screen_width/height to match",
                    w, h, config.screen.screen_width, config.screen.screen_height
                );
            }
        }
        Ok(Box::new(driver))
    }

    #[cfg(not(feature = "enigo"))]
    {
        let _ = config;
        warn!("Built without the 'enigo' feature; pointer actions are logged only");
        Ok(Box::new(LogDriver::new()))
    }
}

fn run_live(
    dry_run: bool,
    record: Option<String>,
    max_frames: Option<u64>,
    config: &Config,
) -> anyhow::Result<()> {
    let mut driver = pointer_driver(dry_run, config)?;

    let tracker = TrackerProcess::spawn(
        &config.tracker.command,
        &config.tracker.args,
        config.frame.source_frame_width,
        config.frame.source_frame_height,
    )?;

    let stop_flag = install_stop_handler()?;
    let mut frame_loop = FrameLoop::new(config.clone())?
        .with_stop_flag(stop_flag)
        .with_max_frames(max_frames);

    if let Some(name) = record {
        let recordings_dir = Cli::recordings_dir();
        std::fs::create_dir_all(&recordings_dir)?;
        let path = recordings_dir.join(format!("{}.json", name));
        let tracker_cmd = std::iter::once(config.tracker.command.as_str())
            .chain(config.tracker.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        frame_loop = frame_loop.recording_to(Recording::new(name, Some(tracker_cmd)), path);
    }

    info!("Tracking... point with your index finger, pinch index and middle to click. Press Ctrl+C to stop");

    let summary = frame_loop.run(tracker, &mut driver)?;
    print_summary(&summary);

    Ok(())
}

fn run_replay(input: &std::path::Path, live: bool, config: &Config) -> anyhow::Result<()> {
    info!("Replaying {:?}", input);

    if !input.exists() {
        anyhow::bail!("Recording file not found: {:?}", input);
    }

    let recording = Recording::load(input)?;
    info!(
        "Loaded recording '{}' with {} frames ({} with a hand)",
        recording.metadata.name,
        recording.len(),
        recording.frames_with_hands()
    );

    let mut driver = pointer_driver(!live, config)?;
    let stop_flag = install_stop_handler()?;
    let mut frame_loop = FrameLoop::new(config.clone())?.with_stop_flag(stop_flag);

    let source = ReplaySource::new(recording).paced(live);
    let summary = frame_loop.run(source, &mut driver)?;
    print_summary(&summary);

    Ok(())
}

fn print_summary(summary: &SessionSummary) {
    println!("\nSession Summary");
    println!(
        "  Frames: {} ({} with a hand, {} out of range)",
        summary.frames, summary.frames_with_hand, summary.frames_out_of_range
    );
    if summary.malformed_frames > 0 {
        println!("  Malformed tracker lines: {}", summary.malformed_frames);
    }
    println!("  Cursor moves: {}", summary.emitter.moves);
    println!(
        "  Clicks: {} pressed, {} released",
        summary.emitter.presses, summary.emitter.releases
    );
    println!("  Duration: {:.1}s", summary.elapsed_ms as f64 / 1000.0);
    if let Some(fps) = summary.fps {
        println!("  FPS: {:.1}", fps);
    }
    println!("  Stopped: {:?}", summary.stop_reason);
    if let Some(path) = &summary.recording {
        println!("  Recording: {}", path.display());
    }
}

fn run_list(detailed: bool) -> anyhow::Result<()> {
    let recordings_dir = Cli::recordings_dir();

    if !recordings_dir.exists() {
        println!("No recordings found in {}", recordings_dir.display());
        println!("Start a recording with: hand-mouse run --record <name>");
        return Ok(());
    }

    println!("Recordings in {:?}:", recordings_dir);

    let mut entries: Vec<_> = std::fs::read_dir(&recordings_dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|ext| ext == "json").unwrap_or(false))
        .collect();

    entries.sort_by_key(|e| e.path());

    for entry in &entries {
        let path = entry.path();
        let file_name = path.file_name().unwrap_or_default().to_string_lossy();

        if detailed {
            match Recording::load(&path) {
                Ok(recording) => {
                    let m = &recording.metadata;
                    let duration_secs = m.duration_ms as f64 / 1000.0;
                    println!(
                        "  {}  ({} frames, {} with a hand, {:.1}s, {}x{})",
                        file_name,
                        m.frame_count,
                        recording.frames_with_hands(),
                        duration_secs,
                        m.frame_width,
                        m.frame_height
                    );
                }
                Err(_) => {
                    let fs_meta = entry.metadata()?;
                    println!("  {}  ({} bytes, failed to parse)", file_name, fs_meta.len());
                }
            }
        } else {
            println!("  {}", file_name);
        }
    }

    if entries.is_empty() {
        println!("  (none)");
        println!("Start a recording with: hand-mouse run --record <name>");
    }

    Ok(())
}

fn run_init(force: bool, config: &Config) -> anyhow::Result<()> {
    let config_path = Config::default_path();

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {:?}. Use --force to overwrite.",
            config_path
        );
    }

    config.save_default()?;
    println!("Created config at {:?}", config_path);
    println!("\nConfig content:\n{}", config.to_toml()?);

    std::fs::create_dir_all(Cli::recordings_dir())?;
    println!("\nCreated directories:");
    println!("  Recordings: {:?}", Cli::recordings_dir());

    Ok(())
}

fn run_delete(name: &str, force: bool) -> anyhow::Result<()> {
    let recordings_dir = Cli::recordings_dir();

    // Try exact filename first, then add .json extension
    let candidates = vec![
        recordings_dir.join(name),
        recordings_dir.join(format!("{}.json", name)),
    ];

    let target = candidates
        .into_iter()
        .find(|p| p.is_file())
        .ok_or_else(|| anyhow::anyhow!("Recording '{}' not found in {:?}", name, recordings_dir))?;

    if !force {
        let file_size = std::fs::metadata(&target)?.len();
        println!("Will delete: {} ({} bytes)", target.display(), file_size);
        println!("Re-run with --force to delete");
        return Ok(());
    }

    std::fs::remove_file(&target)?;
    Recording::remove_checkpoint(&target);
    info!("Deleted recording: {}", target.display());
    println!("Deleted: {}", target.display());

    Ok(())
}

fn run_config(action: ConfigAction, config: &Config) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = config.to_toml()?;
            println!("Configuration ({:?}):\n", Config::default_path());
            println!("{}", toml_str);
        }
        ConfigAction::Get { key } => {
            match config.get_value(&key)? {
                Some(v) => println!("{} = {}", key, v),
                None => {
                    anyhow::bail!("Configuration key '{}' not found", key);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let config_path = Config::default_path();
            if !config_path.exists() {
                anyhow::bail!("No config file found. Run 'hand-mouse init' first.");
            }

            let toml_content = std::fs::read_to_string(&config_path)?;
            let toml_content = set_toml_value(&toml_content, &key, &value)
                .map_err(|e| anyhow::anyhow!("Failed to set '{}': {}", key, e))?;

            // Refuse to write a config the next run could not load
            let updated: Config = toml::from_str(&toml_content)
                .map_err(|e| anyhow::anyhow!("Invalid value for '{}': {}", key, e))?;
            updated.validate()?;

            std::fs::write(&config_path, &toml_content)?;
            println!("Set {} = {}", key, value);
        }
        ConfigAction::Reset { force } => {
            let config_path = Config::default_path();

            if config_path.exists() && !force {
                println!("Config exists at {:?}", config_path);
                println!("Use --force to reset to defaults");
                return Ok(());
            }

            Config::default().save_default()?;
            println!("Configuration reset to defaults at {:?}", config_path);
        }
    }

    Ok(())
}

//! Main entrypoint for running Falling Circles

use clap::Parser as _;
use color_eyre::eyre::{ContextCompat as _, Result};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, Layer as _};

use particle_animator::animator::Animator;
use particle_animator::canvas::Size;

use crate::cli_args::CliArgs;
use crate::config::{Config, ConfigPaths, LogLevel};

/// The ENV variable for setting log filters directly, in the same format as `RUST_LOG`.
const LOG_FILTERS_ENV: &str = "FALLING_CIRCLES_LOG";

/// Everything that's needed to start animating.
pub(crate) struct Setup {
    /// The parsed CLI arguments
    pub cli_args: CliArgs,
    /// Where the config lives
    pub paths: ConfigPaths,
    /// The config, with any CLI overrides already applied
    pub config: Config,
    /// Whether logs are being written
    pub is_logging: bool,
}

/// Prepare the application to start.
pub(crate) fn setup() -> Result<Setup> {
    let cli_args = CliArgs::parse();

    let paths_result =
        ConfigPaths::setup(cli_args.config_dir.clone(), cli_args.main_config.clone());
    let paths = match paths_result {
        Ok(paths) => paths,
        Err(directory_error) => {
            color_eyre::eyre::bail!("Error setting up config directory: {directory_error:?}");
        }
    };

    let mut config = match Config::load(&paths) {
        Ok(config) => config,
        Err(config_error) => {
            color_eyre::eyre::bail!(
                "Bad config file: {config_error:?}\n\nConfig path: {}",
                paths.main_config_path().display()
            );
        }
    };
    cli_args.apply_overrides(&mut config);

    let is_logging = setup_logging(&config)?;

    // Termwiz only outputs true colour when it thinks the terminal supports it. Nearly every
    // modern terminal does.
    std::env::set_var("COLORTERM", "truecolor");

    tracing::info!("Starting Falling Circles");
    tracing::debug!("Loaded config: {config:?}");

    Ok(Setup {
        cli_args,
        paths,
        config,
        is_logging,
    })
}

/// Main entrypoint
pub(crate) async fn run(setup: Setup) -> Result<()> {
    let Setup {
        cli_args,
        paths,
        config,
        ..
    } = setup;

    let mut animator = match cli_args.seed {
        Some(seed) => Animator::seeded(config.animation.clone(), seed)?,
        None => Animator::from_entropy(config.animation.clone())?,
    };

    match cli_args.snapshot.clone() {
        Some(path) => snapshot(&cli_args, &config, &mut animator, &path).await,
        None => animate_terminal(cli_args, paths, &config, &mut animator).await,
    }
}

/// Render a fixed number of frames off-screen and save the last one.
async fn snapshot(
    cli_args: &CliArgs,
    config: &Config,
    animator: &mut Animator,
    path: &std::path::Path,
) -> Result<()> {
    let size = Size::new(cli_args.width, cli_args.height);
    if size.is_empty() {
        color_eyre::eyre::bail!("Snapshots need a width and height of at least 1 pixel");
    }

    tracing::debug!(
        "Rendering {} frames for a {}x{} snapshot",
        cli_args.frames,
        size.width,
        size.height
    );
    let mut host =
        crate::snapshot::SnapshotHost::new(size, cli_args.frames, config.background_colour());
    particle_animator::host::run(animator, &mut host).await?;
    host.save(path)
}

/// Animate in the user's terminal until they quit, reloading the config whenever it changes.
async fn animate_terminal(
    cli_args: CliArgs,
    paths: ConfigPaths,
    config: &Config,
    animator: &mut Animator,
) -> Result<()> {
    let (config_tx, config_rx) = tokio::sync::mpsc::channel(1);
    let mut host = crate::terminal::TerminalHost::new(config, config_rx)?;
    let config_handle = Config::watch(paths, cli_args, config_tx);

    let result = particle_animator::host::run(animator, &mut host).await;
    let restore_result = host.restore();

    if config_handle.is_finished() {
        // The watcher only finishes on its own when it failed to start.
        if let Err(error) = config_handle.await? {
            tracing::error!("Config watcher: {error:?}");
        }
    } else {
        config_handle.abort();
    }

    result?;
    restore_result?;

    tracing::trace!("Leaving Falling Circles' main `run()` function");
    Ok(())
}

/// Setup logging. Returns whether anything will actually be logged.
fn setup_logging(config: &Config) -> Result<bool> {
    let are_log_filters_manually_set = std::env::var(LOG_FILTERS_ENV).is_ok();
    let level_as_string = format!("{:?}", config.log_level).to_lowercase();

    let is_loggable = !matches!(config.log_level, LogLevel::Off) || are_log_filters_manually_set;
    if !is_loggable {
        return Ok(false);
    }

    let directory = config
        .log_path
        .parent()
        .context("Couldn't get log path's parent")?;
    std::fs::create_dir_all(directory)?;
    let file = std::fs::File::create(&config.log_path)?;

    let filters = if are_log_filters_manually_set {
        tracing_subscriber::EnvFilter::builder()
            .with_default_directive("error".parse()?)
            .with_env_var(LOG_FILTERS_ENV)
            .from_env_lossy()
    } else {
        tracing_subscriber::EnvFilter::builder()
            .with_default_directive("off".parse()?)
            .from_env_lossy()
            .add_directive(format!("falling_circles={level_as_string}").parse()?)
            .add_directive(format!("particle_animator={level_as_string}").parse()?)
    };

    let logfile_layer = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_filter(filters);

    tracing_subscriber::registry().with(logfile_layer).init();

    Ok(true)
}

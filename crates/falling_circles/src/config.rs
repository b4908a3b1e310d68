//! All of the user config for Falling Circles.

use color_eyre::eyre::ContextCompat as _;
use color_eyre::eyre::Result;

/// A copy of the default config file. It gets copied to the user's config folder the first time
/// they start Falling Circles.
static DEFAULT_CONFIG: &str = include_str!("../default_config.toml");

/// The name of the directory, in the system's config and state directories.
const DIRECTORY_NAME: &str = "falling-circles";

/// The valid log levels. Based on our `tracing` crate.
#[derive(serde::Serialize, serde::Deserialize, clap::ValueEnum, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum LogLevel {
    /// Error
    Error,
    /// Warnings
    Warn,
    /// Info
    Info,
    /// Debug
    Debug,
    /// Trace
    Trace,
    /// No logging
    Off,
}

/// Managing user config.
#[derive(serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub(crate) struct Config {
    /// Target frame rate
    pub frame_rate: u32,
    /// The maximum log level
    pub log_level: LogLevel,
    /// The location of the log file.
    pub log_path: std::path::PathBuf,
    /// The opaque colour behind the animation, as red, green and blue.
    pub background: [u8; 3],
    /// The circles themselves
    pub animation: particle_animator::config::AnimatorConfig,
}

impl Default for Config {
    fn default() -> Self {
        let log_directory = match dirs::state_dir() {
            Some(directory) => directory,
            None => std::path::PathBuf::new().join("./"),
        };
        let log_path = log_directory
            .join(DIRECTORY_NAME)
            .join("falling-circles.log");

        Self {
            frame_rate: 60,
            log_level: LogLevel::Off,
            log_path,
            background: [255, 255, 255],
            animation: particle_animator::config::AnimatorConfig::default(),
        }
    }
}

/// Where the config lives on disk.
#[derive(Debug, Clone)]
pub(crate) struct ConfigPaths {
    /// The config directory
    pub directory: std::path::PathBuf,
    /// Name of the main config file, relative to the config directory.
    pub main_config_file: std::path::PathBuf,
}

impl ConfigPaths {
    /// Get the stable location of the config directory on the user's system.
    pub fn default_directory() -> Result<std::path::PathBuf> {
        Ok(dirs::config_dir()
            .context("Couldn't get standard config directory")?
            .join(DIRECTORY_NAME))
    }

    /// Figure out where our config is being stored, and create the directory if needed.
    pub fn setup(
        maybe_custom_path: Option<std::path::PathBuf>,
        main_config_file: std::path::PathBuf,
    ) -> Result<Self> {
        let directory = match maybe_custom_path {
            None => Self::default_directory()?,
            Some(path) => path,
        };

        std::fs::create_dir_all(directory.clone())?;

        Ok(Self {
            directory,
            main_config_file,
        })
    }

    /// Canonical path to the main config file.
    pub fn main_config_path(&self) -> std::path::PathBuf {
        self.directory.join(&self.main_config_file)
    }
}

impl Config {
    /// Load the main config, creating it from the defaults if it's the default config file and
    /// doesn't exist yet.
    pub fn load(paths: &ConfigPaths) -> Result<Self> {
        let config_path = paths.main_config_path();
        let config_file_name = config_path
            .file_name()
            .context("Couldn't get file name from config path")?;
        let is_default_config = config_file_name == crate::cli_args::DEFAULT_CONFIG_FILE_NAME;
        if is_default_config && !config_path.exists() {
            tracing::info!("Writing default config to: {config_path:?}");
            std::fs::write(config_path.clone(), DEFAULT_CONFIG)?;
        }

        tracing::info!("(Re)loading the main config from: {config_path:?}");
        let result = std::fs::read_to_string(config_path.clone());
        match result {
            Ok(data) => {
                tracing::trace!("Using config file:\n{data}");
                Self::parse(&data)
            }
            Err(err) => {
                tracing::error!("Loading config: {err:?}");
                color_eyre::eyre::bail!(
                    "Couldn't load config at {config_path:?}: {}",
                    err.to_string()
                );
            }
        }
    }

    /// Parse and validate the contents of a config file.
    pub fn parse(data: &str) -> Result<Self> {
        let config = toml::from_str::<Self>(data)?;
        if config.frame_rate == 0 {
            color_eyre::eyre::bail!("`frame_rate` must be at least 1");
        }
        config.animation.validate()?;
        Ok(config)
    }

    /// The background as a colour that can be blended with.
    pub fn background_colour(&self) -> palette::Srgb<f32> {
        let [red, green, blue] = self.background;
        palette::Srgb::new(red, green, blue).into_format()
    }

    /// Watch the config file for any changes and then send the freshly loaded config to the
    /// running animation.
    pub fn watch(
        paths: ConfigPaths,
        cli_args: crate::cli_args::CliArgs,
        updates: tokio::sync::mpsc::Sender<Self>,
    ) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move {
            tracing::debug!("Watching config ({:?}) for changes.", paths.directory);

            let (config_file_change_tx, mut config_file_change_rx) = tokio::sync::mpsc::channel(1);

            let mut debouncer = notify_debouncer_full::new_debouncer(
                std::time::Duration::from_millis(100),
                None,
                move |result: notify_debouncer_full::DebounceEventResult| match result {
                    Ok(events) => {
                        for event in events {
                            let send_result = config_file_change_tx.blocking_send(event.clone());
                            if let Err(error) = send_result {
                                tracing::error!(
                                    "Sending config file watcher notification: {error:?}"
                                );
                            }
                        }
                    }
                    Err(error) => tracing::error!("File watcher: {error:?}"),
                },
            )?;
            debouncer.watch(
                &paths.directory,
                notify_debouncer_full::notify::RecursiveMode::NonRecursive,
            )?;

            while let Some(event) = config_file_change_rx.recv().await {
                let is_listening =
                    Self::handle_file_change_event(&event, &paths, &cli_args, &updates).await;
                if !is_listening {
                    break;
                }
            }

            tracing::debug!("Leaving config watcher loop");
            Ok(())
        })
    }

    /// Handle an event from the config file watcher. Should normally be a notification that the
    /// config file has changed. Returns whether anything is still listening for updates.
    async fn handle_file_change_event(
        event: &notify_debouncer_full::DebouncedEvent,
        paths: &ConfigPaths,
        cli_args: &crate::cli_args::CliArgs,
        updates: &tokio::sync::mpsc::Sender<Self>,
    ) -> bool {
        use notify_debouncer_full::notify::event as notify_event;
        let notify_event::EventKind::Modify(kind) = event.kind else {
            return true;
        };
        let notify_event::ModifyKind::Data(_) = kind else {
            return true;
        };
        if !event
            .paths
            .iter()
            .any(|path| path.ends_with(&paths.main_config_file))
        {
            return true;
        }

        tracing::debug!(
            "Config file change detected ({:?}), reloading.",
            event.paths
        );

        match Self::load(paths) {
            Ok(mut config) => {
                cli_args.apply_overrides(&mut config);
                if updates.send(config).await.is_err() {
                    return false;
                }
            }
            Err(error) => {
                tracing::error!("Ignoring bad config update: {error:?}");
            }
        }

        true
    }
}

#[cfg(test)]
#[expect(clippy::float_cmp, reason = "Tests aren't so strict")]
mod test {
    use super::*;

    fn paths_in(directory: &std::path::Path, file: &str) -> ConfigPaths {
        ConfigPaths::setup(Some(directory.to_path_buf()), file.into()).unwrap()
    }

    #[test]
    fn shipped_config_matches_the_defaults() {
        let shipped = Config::parse(DEFAULT_CONFIG).unwrap();
        let defaults = Config::default();
        assert_eq!(shipped.frame_rate, defaults.frame_rate);
        assert_eq!(shipped.log_level, defaults.log_level);
        assert_eq!(shipped.background, defaults.background);
        assert_eq!(shipped.animation, defaults.animation);
    }

    #[test]
    fn missing_values_fall_back_to_defaults() {
        let config = Config::parse("[animation]\nparticle_count = 3\n").unwrap();
        assert_eq!(config.animation.particle_count, 3);
        assert_eq!(config.frame_rate, 60);
        assert_eq!(config.animation.respawn_y, -20.0);
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        let result = Config::parse("[animation]\nspeed = { min = 3.0, max = 1.0 }\n");
        assert!(result.is_err());
    }

    #[test]
    fn zero_frame_rate_is_rejected() {
        assert!(Config::parse("frame_rate = 0").is_err());
    }

    #[test]
    fn default_config_is_written_on_first_load() {
        let directory = tempfile::tempdir().unwrap();
        let paths = paths_in(directory.path(), crate::cli_args::DEFAULT_CONFIG_FILE_NAME);
        assert!(!paths.main_config_path().exists());

        let config = Config::load(&paths).unwrap();
        assert!(paths.main_config_path().exists());
        assert_eq!(config.animation.particle_count, 30);
    }

    #[test]
    fn missing_custom_config_is_an_error() {
        let directory = tempfile::tempdir().unwrap();
        let paths = paths_in(directory.path(), "custom.toml");
        assert!(Config::load(&paths).is_err());
        assert!(!paths.main_config_path().exists());
    }

    #[test]
    fn background_colour_is_normalised() {
        let config = Config::parse("background = [255, 0, 51]").unwrap();
        let colour = config.background_colour();
        assert!((colour.red - 1.0).abs() < 1e-6);
        assert_eq!(colour.green, 0.0);
        assert!((colour.blue - 0.2).abs() < 1e-6);
    }
}

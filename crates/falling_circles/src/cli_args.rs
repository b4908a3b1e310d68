//! All the CLI arguments for Falling Circles

/// The default name of the main config file.
pub const DEFAULT_CONFIG_FILE_NAME: &str = "falling-circles.toml";

/// Colourful circles falling down your terminal
#[derive(clap::Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
#[non_exhaustive]
pub(crate) struct CliArgs {
    /// Use a config directory other than the default one.
    #[arg(long, value_name = "PATH")]
    pub config_dir: Option<std::path::PathBuf>,

    /// Name of the main config file inside the config directory.
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE_NAME)]
    pub main_config: std::path::PathBuf,

    /// Override the log level from the config file.
    #[arg(long, value_enum)]
    pub log_level: Option<crate::config::LogLevel>,

    /// Override the log file path from the config file.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<std::path::PathBuf>,

    /// The number of falling circles.
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Target number of frames per second.
    #[arg(short, long)]
    pub frame_rate: Option<u32>,

    /// Seed the random number generator, for a reproducible animation.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Don't animate the terminal, instead render frames off-screen and save the last one as a
    /// PNG image at this path.
    #[arg(long, value_name = "PATH")]
    pub snapshot: Option<std::path::PathBuf>,

    /// The number of frames to render before taking the snapshot.
    #[arg(long, default_value_t = 60, requires = "snapshot")]
    pub frames: u64,

    /// Width of the snapshot image, in pixels.
    #[arg(long, default_value_t = 80, requires = "snapshot")]
    pub width: usize,

    /// Height of the snapshot image, in pixels.
    #[arg(long, default_value_t = 48, requires = "snapshot")]
    pub height: usize,
}

impl CliArgs {
    /// CLI arguments take priority over anything in the config file. Needs to be reapplied
    /// whenever the config file is reloaded.
    pub fn apply_overrides(&self, config: &mut crate::config::Config) {
        if let Some(count) = self.count {
            config.animation.particle_count = count;
        }
        if let Some(frame_rate) = self.frame_rate {
            config.frame_rate = frame_rate;
        }
        if let Some(level) = self.log_level.clone() {
            config.log_level = level;
        }
        if let Some(path) = self.log_path.clone() {
            config.log_path = path;
        }
    }
}

#[cfg(test)]
mod test {
    use clap::Parser as _;

    use super::*;

    #[test]
    fn defaults() {
        let args = CliArgs::parse_from(["falling-circles"]);
        assert_eq!(
            args.main_config,
            std::path::PathBuf::from(DEFAULT_CONFIG_FILE_NAME)
        );
        assert!(args.snapshot.is_none());
        assert_eq!(args.frames, 60);
    }

    #[test]
    fn overrides_replace_config_values() {
        let args = CliArgs::parse_from(["falling-circles", "--count", "5", "--frame-rate", "24"]);
        let mut config = crate::config::Config::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.animation.particle_count, 5);
        assert_eq!(config.frame_rate, 24);
    }

    #[test]
    fn snapshot_size_needs_a_snapshot_path() {
        let result = CliArgs::try_parse_from(["falling-circles", "--width", "10"]);
        assert!(result.is_err());
    }
}

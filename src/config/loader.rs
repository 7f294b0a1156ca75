use crate::config::cli::Cli;
use crate::config::schema::{FetchConfig, Settings, default_max, default_user_agent};
use crate::config::units::{parse_duration, parse_size};
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use validator::Validate;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads a settings file, picking the format from its extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let settings: Settings = serde_json::from_str(&content)?;
                Ok(settings)
            }
            Some("yaml") | Some("yml") => {
                let settings: Settings = serde_yaml::from_str(&content)?;
                Ok(settings)
            }
            Some("toml") => {
                let settings: Settings = toml::from_str(&content)?;
                Ok(settings)
            }
            _ => Err(Error::Config(format!(
                "Unsupported file extension: {}",
                path.display()
            ))),
        }
    }

    /// Builds the run configuration from parsed flags, reading the settings
    /// file first when `--config` was given.
    pub fn from_cli(cli: Cli) -> Result<FetchConfig> {
        let settings = match &cli.config {
            Some(path) => {
                log::debug!("Loading settings from {:?}", path);
                Self::load(path)?
            }
            None => Settings::default(),
        };
        Self::resolve(cli, settings)
    }

    /// Flags win over file values, file values win over defaults. Switches
    /// are on if either side turns them on.
    pub fn resolve(cli: Cli, file: Settings) -> Result<FetchConfig> {
        let sleep = match cli.sleep.or(file.sleep) {
            Some(s) => parse_duration(&s)?,
            None => std::time::Duration::ZERO,
        };
        let timeout = match cli.timeout.or(file.timeout) {
            Some(s) => Some(parse_duration(&s)?).filter(|d| !d.is_zero()),
            None => None,
        };
        let chunk_size = match cli.size.or(file.size).filter(|s| !s.trim().is_empty()) {
            Some(s) => Some(parse_size(&s)?),
            None => None,
        };

        let save = cli.save || file.save;
        let save_dir = save.then(|| {
            cli.savedir
                .or(file.save_dir)
                .unwrap_or_else(|| PathBuf::from("."))
        });

        let config = FetchConfig {
            max: cli.max.or(file.max).unwrap_or_else(default_max),
            errors_only: cli.errorsonly || file.errors_only,
            color: !(cli.nocolor || file.no_color),
            stats: cli.stats || file.stats,
            sleep,
            timeout,
            dns_cache: !(cli.nodnscache || file.no_dns_cache),
            bar: cli.bar || file.bar,
            guess: cli.guess.or(file.guess).unwrap_or(0),
            save_dir,
            chunk_size,
            debug: cli.debug || file.debug,
            response_debug: cli.responsedebug || file.response_debug,
            user_agent: cli
                .user_agent
                .or(file.user_agent)
                .unwrap_or_else(default_user_agent),
        };

        config.validate()?;
        Ok(config)
    }
}

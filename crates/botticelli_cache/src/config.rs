//! Command cache configuration.
//!
//! Configuration sources, highest precedence last:
//! - Bundled defaults (include_str! from command_cache.toml)
//! - ~/.config/botticelli/command_cache.toml
//! - ./command_cache.toml

use botticelli_error::{
    BotticelliError, BotticelliResult, BuilderError, CacheError, CacheErrorKind, CacheResult,
    ConfigError,
};
use config::{Config, File, FileFormat};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(200) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

/// Maximum number of commands a cache tracks.
///
/// Serialized as an integer where `-1` means unlimited.
///
/// # Example
///
/// ```
/// use botticelli_cache::Capacity;
///
/// assert_eq!(Capacity::from_raw(Capacity::UNLIMITED).unwrap(), Capacity::Unlimited);
/// assert_eq!(Capacity::from_raw(5).unwrap().limit(), Some(5));
/// assert!(Capacity::from_raw(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Capacity {
    /// No limit on the number of commands
    Unlimited,
    /// At most this many commands
    Bounded(NonZeroUsize),
}

impl Capacity {
    /// Raw value meaning "no limit".
    pub const UNLIMITED: i64 = -1;

    /// Parse a raw capacity.
    ///
    /// # Errors
    ///
    /// Returns [`CacheErrorKind::InvalidConfiguration`] when `raw` is below 1
    /// and is not [`Capacity::UNLIMITED`].
    #[track_caller]
    pub fn from_raw(raw: i64) -> CacheResult<Self> {
        if raw == Self::UNLIMITED {
            return Ok(Self::Unlimited);
        }
        usize::try_from(raw)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self::Bounded)
            .ok_or_else(|| {
                CacheError::new(CacheErrorKind::InvalidConfiguration(format!(
                    "capacity can not be lower than 1 unless it is {} (unlimited), got {}",
                    Self::UNLIMITED,
                    raw
                )))
            })
    }

    /// The numeric limit, or `None` when unlimited.
    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::Unlimited => None,
            Self::Bounded(limit) => Some(limit.get()),
        }
    }

    /// Whether the cache keeps every command.
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Self::Bounded(DEFAULT_CAPACITY)
    }
}

impl TryFrom<i64> for Capacity {
    type Error = CacheError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

impl From<Capacity> for i64 {
    fn from(capacity: Capacity) -> Self {
        match capacity {
            Capacity::Unlimited => Capacity::UNLIMITED,
            Capacity::Bounded(limit) => i64::try_from(limit.get()).unwrap_or(i64::MAX),
        }
    }
}

impl std::fmt::Display for Capacity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unlimited => write!(f, "unlimited"),
            Self::Bounded(limit) => write!(f, "{}", limit),
        }
    }
}

/// Configuration for a [`CommandCache`](crate::CommandCache).
///
/// # Example
///
/// ```toml
/// capacity = 500
/// sweep_interval_secs = 3600
/// age_limit_secs = 7200
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default, build_fn(validate = "Self::validate_intervals"))]
pub struct CommandCacheConfig {
    /// Maximum number of tracked commands
    #[serde(default)]
    capacity: Capacity,

    /// Seconds between background sweeps
    #[serde(default = "default_sweep_interval_secs")]
    sweep_interval_secs: u64,

    /// Age in seconds after which an entry is swept
    #[serde(default = "default_age_limit_secs")]
    age_limit_secs: u64,
}

fn default_sweep_interval_secs() -> u64 {
    7200 // 2 hours
}

fn default_age_limit_secs() -> u64 {
    7200 // 2 hours
}

impl Default for CommandCacheConfig {
    fn default() -> Self {
        Self {
            capacity: Capacity::default(),
            sweep_interval_secs: default_sweep_interval_secs(),
            age_limit_secs: default_age_limit_secs(),
        }
    }
}

impl CommandCacheConfigBuilder {
    fn validate_intervals(&self) -> Result<(), String> {
        if self.sweep_interval_secs == Some(0) {
            return Err("sweep_interval_secs must be at least 1".to_string());
        }
        if self.age_limit_secs == Some(0) {
            return Err("age_limit_secs must be at least 1".to_string());
        }
        Ok(())
    }
}

impl CommandCacheConfig {
    /// Start building a configuration from the defaults.
    pub fn builder() -> CommandCacheConfigBuilder {
        CommandCacheConfigBuilder::default()
    }

    /// Build a configuration, mapping derive_builder failures into [`BuilderError`].
    pub fn try_build(builder: &CommandCacheConfigBuilder) -> Result<Self, BuilderError> {
        builder.build().map_err(|e| BuilderError::from(e.to_string()))
    }

    /// Defaults with the given capacity.
    pub fn with_raw_capacity(raw: i64) -> CacheResult<Self> {
        Ok(Self::default().with_capacity(Capacity::from_raw(raw)?))
    }

    /// Time between background sweeps.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Age after which an entry is swept.
    pub fn age_limit(&self) -> Duration {
        Duration::from_secs(self.age_limit_secs)
    }

    /// Check that the configuration can drive a cache.
    ///
    /// # Errors
    ///
    /// Returns [`CacheErrorKind::InvalidConfiguration`] for a zero sweep
    /// interval or a zero age limit.
    pub fn validate(&self) -> CacheResult<()> {
        if self.sweep_interval_secs == 0 {
            return Err(CacheError::new(CacheErrorKind::InvalidConfiguration(
                "sweep_interval_secs must be at least 1".to_string(),
            )));
        }
        if self.age_limit_secs == 0 {
            return Err(CacheError::new(CacheErrorKind::InvalidConfiguration(
                "age_limit_secs must be at least 1".to_string(),
            )));
        }
        Ok(())
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml_str(toml: &str) -> BotticelliResult<Self> {
        Self::deserialize_from(
            Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
            "inline",
        )
    }

    /// Load configuration from a specific file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> BotticelliResult<Self> {
        let path = path.as_ref();
        Self::deserialize_from(
            Config::builder().add_source(File::from(path)),
            &path.display().to_string(),
        )
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use botticelli_cache::CommandCacheConfig;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = CommandCacheConfig::load()?;
    /// println!("capacity: {}", config.capacity());
    /// # Ok(())
    /// # }
    /// ```
    pub fn load() -> BotticelliResult<Self> {
        debug!("Loading command cache configuration");

        const DEFAULT_CONFIG: &str = include_str!("../command_cache.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/botticelli/command_cache.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("command_cache").required(false));

        Self::deserialize_from(builder, "layered")
    }

    fn deserialize_from(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        source_name: &str,
    ) -> BotticelliResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| {
                BotticelliError::from(
                    ConfigError::new(format!("Failed to build configuration: {}", e))
                        .with_source_name(source_name),
                )
            })?
            .try_deserialize()
            .map_err(|e| {
                BotticelliError::from(
                    ConfigError::new(format!("Failed to parse configuration: {}", e))
                        .with_source_name(source_name),
                )
            })?;
        config.validate()?;
        debug!(
            capacity = %config.capacity,
            sweep_interval_secs = config.sweep_interval_secs,
            age_limit_secs = config.age_limit_secs,
            "Loaded command cache configuration"
        );
        Ok(config)
    }
}

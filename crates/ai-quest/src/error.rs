use std::path::PathBuf;

use thiserror::Error;

/// Problems that stop a quest behavior from starting.
///
/// These are reported once, at start, and the behavior then refuses to run. Everything that can
/// go wrong *while* running is expressed as a node result instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("movement precision must be a positive distance, got {0}")]
    InvalidPrecision(f32),

    #[error("avoidance policy is empty; at least one effect id is required")]
    EmptyAvoidancePolicy,

    #[error("interaction count must be at least 1 when interaction entries are configured")]
    InvalidInteractCount,

    #[error("timing `{name}` must be a non-negative number of seconds, got {value}")]
    InvalidTiming { name: &'static str, value: f64 },

    #[error("behavior is associated with quest {0}, but the quest is not in the log")]
    QuestNotInLog(u32),

    #[error("failed to read config from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

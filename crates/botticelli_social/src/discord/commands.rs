//! Prefix commands answered with cached replies.
//!
//! Deleting the command message deletes the bot's reply.
//!
//! # Supported Commands
//!
//! - `add <a> <b>` - Adds two whole numbers together
//! - `info` (alias `stats`) - Reports command cache statistics

use botticelli_cache::CommandCache;

/// A recognised prefix command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheCommand {
    /// Add two whole numbers
    Add {
        /// First operand
        first: i64,
        /// Second operand
        second: i64,
    },
    /// Report cache statistics
    Info,
}

impl CacheCommand {
    /// Parse a message body, e.g. `+add 1 2` with prefix `+`.
    ///
    /// Returns `None` for messages without the prefix, unknown commands, or
    /// malformed arguments.
    pub fn parse(content: &str, prefix: char) -> Option<Self> {
        let body = content.trim().strip_prefix(prefix)?;
        let mut words = body.split_whitespace();
        match words.next()?.to_ascii_lowercase().as_str() {
            "add" => {
                let first = words.next()?.parse().ok()?;
                let second = words.next()?.parse().ok()?;
                if words.next().is_some() {
                    return None;
                }
                Some(Self::Add { first, second })
            }
            "info" | "stats" => Some(Self::Info),
            _ => None,
        }
    }

    /// Reply text for this command.
    pub fn respond(&self, cache: &CommandCache) -> String {
        match self {
            Self::Add { first, second } => {
                let sum = i128::from(*first) + i128::from(*second);
                format!("{} plus {} is {}.", first, second, sum)
            }
            Self::Info => format!(
                "Tracking {} command(s), capacity {}.",
                cache.count(),
                cache.capacity()
            ),
        }
    }
}

//! Config for the judge behaviors
//!
//! This module provides configuration options for controlling how a tournament is run.
//!
//! Configuration can be created programmatically using [`Configuration::new()`] or by reading
//! environment variables using [`Configuration::from_env()`].
//!
//! # Environment Variables
//!
//! All values are optional. Flags are case-insensitive, set them to `"true"` to enable.
//!
//! - `JUDGE_VERBOSE`: Print a line per finished match (default: `false`)
//! - `JUDGE_LOG`: Enable logging to a file (default: `false`)
//! - `JUDGE_ROUNDS`: Rounds per match (default: `10000`)
//! - `JUDGE_WORKERS`: Matches run in parallel, a number or `"auto"` for one per CPU
//!   (default: `1`)

use crate::match_runner::DEFAULT_ROUNDS;

/// Configuration for judge behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration {
    pub(crate) verbose: bool,
    pub(crate) log: bool,
    pub(crate) rounds_per_match: u32,
    pub(crate) workers: usize,
}

impl Configuration {
    /// Create a new configuration with default parameters.
    ///
    /// By default:
    /// - Nothing is printed to stdout.
    /// - Logging to file is disabled.
    /// - Every match lasts 10 000 rounds.
    /// - Matches run one after the other.
    pub fn new() -> Self {
        Self {
            verbose: false,
            log: false,
            rounds_per_match: DEFAULT_ROUNDS,
            workers: 1,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Any unset or unparsable variable leaves the default value.
    pub fn from_env() -> Self {
        fn get_env_flag(var: &str, default: bool) -> bool {
            match std::env::var(var) {
                Ok(val) => val.eq_ignore_ascii_case("true"),
                Err(_) => default,
            }
        }

        fn get_env_number<T: std::str::FromStr>(var: &str) -> Option<T> {
            std::env::var(var).ok()?.trim().parse().ok()
        }

        let default = Self::new();
        let workers = match std::env::var("JUDGE_WORKERS") {
            Ok(val) if val.trim().eq_ignore_ascii_case("auto") => num_cpus::get(),
            _ => get_env_number("JUDGE_WORKERS").unwrap_or(default.workers),
        };

        Self {
            verbose: get_env_flag("JUDGE_VERBOSE", default.verbose),
            log: get_env_flag("JUDGE_LOG", default.log),
            rounds_per_match: get_env_number("JUDGE_ROUNDS").unwrap_or(default.rounds_per_match),
            workers: workers.max(1),
        }
    }

    /// Enable or disable progress output.
    pub fn with_verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    /// Enable or disable logging to file.
    pub fn with_log(mut self, value: bool) -> Self {
        self.log = value;
        self
    }

    /// Number of rounds of every match.
    pub fn with_rounds_per_match(mut self, rounds: u32) -> Self {
        self.rounds_per_match = rounds;
        self
    }

    /// Number of matches run in parallel. `0` is treated as `1`.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// One worker per logical CPU.
    pub fn with_auto_workers(self) -> Self {
        self.with_workers(num_cpus::get())
    }

    /// Rounds of every match.
    pub fn rounds_per_match(&self) -> u32 {
        self.rounds_per_match
    }

    /// Matches run in parallel.
    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

//! # Dilemma Judge
//!
//! A round-robin judge for the iterated prisoner's dilemma.
//!
//! It provides:
//! - A payoff table for one round ([`PayoffModel`](crate::payoff::PayoffModel))
//! - The capability every contestant implements ([`Player`](crate::game_interface::Player))
//! - A store recording one final result per pair of players ([`results`])
//! - Repeated games between two players ([`Match`](crate::match_runner::Match))
//! - Tournament orchestration, sequential or on a worker pool ([`Judge`](crate::judge::Judge))
//! - Behaviour statistics per match and per tournament ([`report`])
//! - A hook to publish results after every match ([`reporting`])
//!
//! Every registered player meets every other player exactly once. A match lasts a fixed
//! number of rounds; in each round both players pick a move without seeing the other's,
//! score according to the payoff table, and are told the outcome.
//!
//! # Documentation Overview
//!
//! - For the tournament lifecycle and failure handling, see the [`judge`] module.
//! - For configuring rounds, parallelism and logs, see
//!   [`Configuration`](crate::configuration::Configuration).
//! - For writing contestants, see the [`Player`](crate::game_interface::Player) trait and
//!   the ready-made players in [`strategies`].
//!
//! # Usage Example
//!
//! ```no_run
//! use dilemma_judge::prelude::*;
//!
//! struct Alternate(bool);
//!
//! impl Player for Alternate {
//!     fn decide(&mut self) -> anyhow::Result<Move> {
//!         self.0 = !self.0;
//!         Ok(if self.0 { Move::Cooperate } else { Move::Defect })
//!     }
//!
//!     fn receive_feedback(&mut self, _own: u32, _opponent: u32, _opponent_move: Move) {}
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Configuration::from_env().with_auto_workers();
//!     let mut judge = Judge::new(config)
//!         .with_reporter(JsonReporter::new(std::fs::File::create("results.jsonl")?));
//!
//!     judge.register("alternate", Alternate(false))?;
//!     judge.register("tit for tat", TitForTat::new())?;
//!     judge.register("grim", GrimTrigger::new())?;
//!     judge.register("pavlov", Pavlov::new())?;
//!
//!     let summary = judge.run_all();
//!     for failure in &summary.failures {
//!         eprintln!("{}: {}", failure.pairing, failure.error);
//!     }
//!
//!     for (player, score) in judge.standings() {
//!         println!("{player}: {score}");
//!     }
//!     for (name, value) in judge.report().entries() {
//!         println!("{name}: {value}");
//!     }
//!     Ok(())
//! }
//! ```
#![warn(missing_docs)]

pub use anyhow;
mod agent;
pub mod configuration;
pub mod error;
pub mod game_interface;
pub mod judge;
mod logger;
pub mod match_runner;
pub mod payoff;
pub mod report;
pub mod reporting;
pub mod results;
pub mod strategies;
pub mod tournament_scheduler;

pub use agent::PlayerId;

/// Commonly used types and traits for quick access.
///
/// Import this prelude to get started easily:
/// ```rust
/// use dilemma_judge::prelude::*;
/// ```
///
/// Includes:
/// - [`Configuration`](crate::configuration::Configuration)
/// - [`Judge`](crate::judge::Judge)
/// - [`Player`](crate::game_interface::Player) and [`Move`](crate::game_interface::Move)
/// - all built-in [`strategies`](crate::strategies)
pub mod prelude {
    pub use crate::agent::PlayerId;
    pub use crate::configuration::Configuration;
    pub use crate::error::TournamentError;
    pub use crate::game_interface::{Move, Player};
    pub use crate::judge::{Judge, MatchFailure, TournamentSummary};
    pub use crate::payoff::PayoffModel;
    pub use crate::report::{MatchReport, TournamentReport};
    pub use crate::reporting::{JsonReporter, Reporter};
    pub use crate::results::PairResult;
    pub use crate::strategies::*;
}

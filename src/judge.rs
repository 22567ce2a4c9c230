//! Tournament orchestration.
//!
//! This module defines the [`Judge`], which owns the registered players and the result
//! store. Its responsibilities include:
//!
//! - Registering players until the first result is committed
//! - Producing the round-robin [`Schedule`]
//! - Running a [`Match`] for every scheduled pairing, sequentially or on a worker pool
//! - Folding every match report into the tournament report, exactly once
//! - Calling the [`Reporter`] hook after each match
//!
//! # Failures
//!
//! A player that fails to decide, or panics on feedback, only fails its own match: the
//! pair gets no result, the failure is recorded in the [`TournamentSummary`] and the
//! remaining pairings are played as usual. Matches are never retried.
//!
//! # Parallelism
//!
//! With [`Configuration::with_workers`] above 1, pairings are pulled from the schedule by
//! a pool of worker threads. Commits to the result store are serialised, and each player
//! is locked for the whole of a match so a stateful player still plays one match at a
//! time.
//!
//! # Example
//!
//! ```
//! use dilemma_judge::prelude::*;
//!
//! let mut judge = Judge::new(Configuration::new().with_rounds_per_match(100));
//! judge.register("tft", TitForTat::new()).unwrap();
//! judge.register("defector", AlwaysDefect).unwrap();
//! judge.register("sucker", AlwaysCooperate).unwrap();
//!
//! let summary = judge.run_all();
//! assert!(summary.failures.is_empty());
//! assert_eq!(judge.results().len(), 3);
//! for (player, score) in judge.standings() {
//!     println!("{player}: {score}");
//! }
//! ```

use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use tracing::{debug, error, info, instrument, trace};

use crate::agent::{Agent, PlayerId};
use crate::configuration::Configuration;
use crate::error::TournamentError;
use crate::game_interface::Player;
use crate::logger::init_logger;
use crate::match_runner::{Match, Pairing};
use crate::payoff::PayoffModel;
use crate::report::{MatchReport, TournamentReport};
use crate::reporting::Reporter;
use crate::results::{PairResult, ResultStore};
use crate::tournament_scheduler::{match_count, Schedule};

/// A match that could not be scored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchFailure {
    /// The pair that was scheduled.
    pub pairing: Pairing,
    /// Why no result was recorded.
    pub error: TournamentError,
}

/// What happened during [`Judge::run_all`].
#[derive(Debug, Default)]
pub struct TournamentSummary {
    /// Reports of the matches that completed, in completion order.
    pub reports: Vec<MatchReport>,
    /// Pairings left without a result.
    pub failures: Vec<MatchFailure>,
    /// How many times the reporter failed.
    pub publish_errors: usize,
}

impl TournamentSummary {
    /// Number of matches that were scored.
    pub fn played(&self) -> usize {
        self.reports.len()
    }
}

/// Organizes the tournament and runs the matches between players.
pub struct Judge {
    agents: Vec<Arc<Agent>>,
    results: Arc<Mutex<ResultStore>>,
    payoff: PayoffModel,
    config: Configuration,
    report: TournamentReport,
    reporter: Option<Box<dyn Reporter>>,
}

impl Judge {
    /// Create a judge using the canonical payoff table.
    #[instrument(skip_all)]
    pub fn new(config: Configuration) -> Judge {
        if config.log {
            if let Err(e) = init_logger() {
                eprintln!("could not initialize logs: {e:#}");
            }
        }
        trace!(?config);

        Judge {
            agents: vec![],
            results: Arc::new(Mutex::new(ResultStore::new())),
            payoff: PayoffModel::canonical(),
            config,
            report: TournamentReport::default(),
            reporter: None,
        }
    }

    /// Use another payoff table for every match.
    pub fn with_payoff(mut self, payoff: PayoffModel) -> Judge {
        self.payoff = payoff;
        self
    }

    /// Call `reporter` after every match.
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Judge {
        self.reporter = Some(Box::new(reporter));
        self
    }

    /// Register a player under `id`.
    ///
    /// # Errors
    /// - [`TournamentError::RegistrationClosed`] once any result was committed
    /// - [`TournamentError::DuplicatePlayer`] if `id` is already taken
    pub fn register(
        &mut self,
        id: impl Into<PlayerId>,
        player: impl Player + Send + 'static,
    ) -> Result<PlayerId, TournamentError> {
        let id = id.into();
        self.results
            .lock()
            .expect("poisoned")
            .register(id.clone())?;

        let index = self.agents.len();
        self.agents
            .push(Arc::new(Agent::new(id.clone(), index, Box::new(player))));
        info!("registered player {id} (#{index})");
        Ok(id)
    }

    /// Every pair of registered players, each exactly once, in registration order.
    pub fn schedule(&self) -> Schedule<'_> {
        Schedule::new(&self.agents)
    }

    /// Prepare a single match between two registered players.
    ///
    /// [`run_all`](Judge::run_all) already does this for every pairing; a pair scored
    /// through a match created here will be reported as a duplicate by `run_all`.
    ///
    /// # Errors
    /// - [`TournamentError::UnknownPlayer`] if either id is not registered
    /// - [`TournamentError::SelfMatch`] if both ids are the same
    pub fn new_match(&self, a: &PlayerId, b: &PlayerId) -> Result<Match, TournamentError> {
        let player_a = self.agent(a)?;
        let player_b = self.agent(b)?;
        if a == b {
            return Err(TournamentError::SelfMatch(a.clone()));
        }
        Ok(Match::new(
            player_a,
            player_b,
            self.payoff,
            self.config.rounds_per_match,
            self.results.clone(),
        ))
    }

    /// Play every scheduled pairing.
    ///
    /// Failed matches are collected in the returned summary and do not stop the
    /// tournament.
    #[instrument(skip_all, fields(players = self.agents.len()))]
    pub fn run_all(&mut self) -> TournamentSummary {
        let total = match_count(self.agents.len());
        let workers = self.config.workers.min(total).max(1);
        info!(
            "running {total} matches, {} rounds each, on {workers} worker(s)",
            self.config.rounds_per_match
        );

        let settings = MatchSettings {
            payoff: self.payoff,
            rounds: self.config.rounds_per_match,
            results: self.results.clone(),
        };
        let mut collector = ResultCollector {
            report: &mut self.report,
            reporter: &mut self.reporter,
            results: &self.results,
            verbose: self.config.verbose,
            summary: TournamentSummary::default(),
        };
        let agents = self.agents.as_slice();

        if workers == 1 {
            let mut schedule = Schedule::new(agents);
            while let Some((a, b)) = schedule.next_agents() {
                collector.on_outcome(settings.play(a, b));
            }
        } else {
            let queue = Mutex::new(Schedule::new(agents));
            let (tx_outcome, rx_outcome) = mpsc::channel();

            thread::scope(|s| {
                for worker in 0..workers {
                    let tx_outcome = tx_outcome.clone();
                    let queue = &queue;
                    let settings = settings.clone();
                    s.spawn(move || {
                        trace!("worker {worker} started");
                        loop {
                            let next = queue.lock().expect("poisoned").next_agents();
                            let Some((a, b)) = next else { break };
                            if tx_outcome.send(settings.play(a, b)).is_err() {
                                break;
                            }
                        }
                        trace!("worker {worker} done");
                    });
                }
                // the loop below ends once every worker dropped its sender
                drop(tx_outcome);
                for outcome in rx_outcome {
                    collector.on_outcome(outcome);
                }
            });
        }

        let summary = collector.summary;
        info!(
            played = summary.played(),
            failed = summary.failures.len(),
            "tournament finished"
        );
        summary
    }

    /// The tournament-wide report accumulated so far.
    pub fn report(&self) -> &TournamentReport {
        &self.report
    }

    /// Snapshot of every committed result.
    pub fn results(&self) -> Vec<PairResult> {
        self.results.lock().expect("poisoned").snapshot()
    }

    /// Scores of the match between `a` and `b`, in that order.
    ///
    /// # Errors
    /// See [`ResultStore::result_for`].
    pub fn result_for(&self, a: &PlayerId, b: &PlayerId) -> Result<(u64, u64), TournamentError> {
        self.results.lock().expect("poisoned").result_for(a, b)
    }

    /// Registered players, in registration order.
    pub fn players(&self) -> impl Iterator<Item = &PlayerId> {
        self.agents.iter().map(|agent| &agent.id)
    }

    /// Total score of every player over its committed results, best first. Ties keep
    /// registration order.
    pub fn standings(&self) -> Vec<(PlayerId, u64)> {
        let totals = self.results.lock().expect("poisoned").totals();
        let mut standings = self
            .agents
            .iter()
            .map(|agent| (agent.id.clone(), totals.get(&agent.id).copied().unwrap_or(0)))
            .collect::<Vec<_>>();
        standings.sort_by(|x, y| y.1.cmp(&x.1));
        standings
    }

    fn agent(&self, id: &PlayerId) -> Result<Arc<Agent>, TournamentError> {
        self.agents
            .iter()
            .find(|agent| &agent.id == id)
            .cloned()
            .ok_or_else(|| TournamentError::UnknownPlayer(id.clone()))
    }
}

type Outcome = (Pairing, Result<MatchReport, TournamentError>);

/// Everything a worker needs to play a pairing.
#[derive(Clone)]
struct MatchSettings {
    payoff: PayoffModel,
    rounds: u32,
    results: Arc<Mutex<ResultStore>>,
}

impl MatchSettings {
    fn play(&self, a: Arc<Agent>, b: Arc<Agent>) -> Outcome {
        let mut game = Match::new(a, b, self.payoff, self.rounds, self.results.clone());
        let pairing = game.pairing();
        debug!("scheduled {pairing}");
        (pairing, game.play())
    }
}

/// Receives match outcomes on the orchestrating thread, the only writer of the report.
struct ResultCollector<'a> {
    report: &'a mut TournamentReport,
    reporter: &'a mut Option<Box<dyn Reporter>>,
    results: &'a Mutex<ResultStore>,
    verbose: bool,
    summary: TournamentSummary,
}

impl ResultCollector<'_> {
    fn on_outcome(&mut self, (pairing, outcome): Outcome) {
        match outcome {
            Ok(match_report) => {
                info!(
                    "{pairing}: {}-{}",
                    match_report.score_a, match_report.score_b
                );
                if self.verbose {
                    print_match_result(&pairing, &match_report);
                }
                self.summary.reports.push(match_report.clone());
                self.report.fold(match_report);
            }
            Err(error) => {
                error!("{pairing} failed: {error}");
                if self.verbose {
                    print_match_failure(&pairing, &error);
                }
                self.summary.failures.push(MatchFailure { pairing: pairing.clone(), error });
            }
        }

        if let Some(reporter) = self.reporter.as_mut() {
            let snapshot = self.results.lock().expect("poisoned").snapshot();
            if let Err(e) = reporter.publish(&*self.report, &snapshot) {
                error!("could not publish results after {pairing}: {e:#}");
                self.summary.publish_errors += 1;
            }
        }
    }
}

fn print_match_result(pairing: &Pairing, report: &MatchReport) {
    // clear line, green match, scores
    println!(
        "\x1b[2K\x1b[32m{pairing}: \x1b[39m{}-{}",
        report.score_a, report.score_b
    );
}

fn print_match_failure(pairing: &Pairing, error: &TournamentError) {
    // clear line, green match, red error
    println!("\x1b[2K\x1b[32m{pairing}: \x1b[31m{error}\x1b[39m");
}

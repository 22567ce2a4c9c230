//! A single repeated game between two registered players.

use std::{
    fmt::Display,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex},
};

use anyhow::anyhow;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::agent::{take_turns, Agent, BoxedPlayer, PlayerId};
use crate::error::TournamentError;
use crate::game_interface::Move;
use crate::payoff::PayoffModel;
use crate::report::{MatchReport, RoundReport};
use crate::results::ResultStore;

/// Number of rounds of a match when nothing else is configured.
pub const DEFAULT_ROUNDS: u32 = 10_000;

/// Two players scheduled to meet, in the order they will be scored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Pairing {
    /// First player.
    pub player_a: PlayerId,
    /// Second player.
    pub player_b: PlayerId,
}

impl Display for Pairing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} VS {}]", self.player_a, self.player_b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchState {
    NotStarted,
    Completed,
    Failed,
}

/// A match between two players, single use.
///
/// [`play`](Match::play) runs every round, then commits the final scores into the result
/// store. Nothing is committed if a player fails to produce a move. Whatever the outcome,
/// the match cannot be played again.
pub struct Match {
    player_a: Arc<Agent>,
    player_b: Arc<Agent>,
    payoff: PayoffModel,
    rounds: u32,
    results: Arc<Mutex<ResultStore>>,
    state: MatchState,
}

impl Match {
    pub(crate) fn new(
        player_a: Arc<Agent>,
        player_b: Arc<Agent>,
        payoff: PayoffModel,
        rounds: u32,
        results: Arc<Mutex<ResultStore>>,
    ) -> Self {
        Match {
            player_a,
            player_b,
            payoff,
            rounds,
            results,
            state: MatchState::NotStarted,
        }
    }

    /// The two players, in scoring order.
    pub fn pairing(&self) -> Pairing {
        Pairing {
            player_a: self.player_a.id.clone(),
            player_b: self.player_b.id.clone(),
        }
    }

    /// Whether the match already ran to completion.
    pub fn is_completed(&self) -> bool {
        self.state == MatchState::Completed
    }

    /// Whether `play` was called and failed. A failed match is never replayed.
    pub fn is_failed(&self) -> bool {
        self.state == MatchState::Failed
    }

    /// Run every round, commit the final scores and return the match statistics.
    ///
    /// # Errors
    /// - [`TournamentError::MatchAlreadyPlayed`] if `play` was already called, whether
    ///   it succeeded or not
    /// - [`TournamentError::SelfMatch`] if both sides are the same player
    /// - [`TournamentError::InvalidMove`] if a player failed to decide or panicked; nothing
    ///   is committed
    /// - any error of [`ResultStore::commit`], in which case nothing is committed either
    pub fn play(&mut self) -> Result<MatchReport, TournamentError> {
        if self.state != MatchState::NotStarted {
            return Err(TournamentError::MatchAlreadyPlayed(
                self.player_a.id.clone(),
                self.player_b.id.clone(),
            ));
        }
        // only a successful commit moves out of this state
        self.state = MatchState::Failed;

        if self.player_a.id == self.player_b.id {
            return Err(TournamentError::SelfMatch(self.player_a.id.clone()));
        }
        debug!("starting {}", self.pairing());

        let report = {
            let (mut a, mut b) = take_turns(&self.player_a, &self.player_b);
            self.simulate(&mut a, &mut b)?
        };

        self.results.lock().expect("poisoned").commit(
            &self.player_a.id,
            &self.player_b.id,
            report.score_a,
            report.score_b,
        )?;
        self.state = MatchState::Completed;

        trace!(pairing = %self.pairing(), scores = ?report.scores(), "match committed");
        Ok(report)
    }

    fn simulate(
        &self,
        a: &mut BoxedPlayer,
        b: &mut BoxedPlayer,
    ) -> Result<MatchReport, TournamentError> {
        let mut report = MatchReport::new(self.player_a.id.clone(), self.player_b.id.clone());

        for round in 0..self.rounds {
            // both decide before either sees anything of this round
            let move_a = decide(a, &self.player_a.id, round)?;
            let move_b = decide(b, &self.player_b.id, round)?;

            let (score_a, score_b) = self.payoff.payoff_for(move_a, move_b);
            feedback(a, &self.player_a.id, round, (score_a, score_b, move_b))?;
            feedback(b, &self.player_b.id, round, (score_b, score_a, move_a))?;

            report.record(&RoundReport {
                move_a,
                move_b,
                score_a,
                score_b,
            });
        }

        Ok(report)
    }
}

/// Ask a player for its move, turning errors and panics into [`TournamentError::InvalidMove`].
fn decide(player: &mut BoxedPlayer, id: &PlayerId, round: u32) -> Result<Move, TournamentError> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| player.decide()))
        .unwrap_or_else(|payload| Err(anyhow!("panicked: {}", panic_message(&*payload))));

    outcome.map_err(|e| {
        warn!("player {id} failed in round {round}: {e:#}");
        TournamentError::InvalidMove {
            player: id.clone(),
            round,
            reason: format!("{e:#}"),
        }
    })
}

/// Deliver the outcome of a round, turning a panic into [`TournamentError::InvalidMove`].
fn feedback(
    player: &mut BoxedPlayer,
    id: &PlayerId,
    round: u32,
    (own_score, opponent_score, opponent_move): (u32, u32, Move),
) -> Result<(), TournamentError> {
    panic::catch_unwind(AssertUnwindSafe(|| {
        player.receive_feedback(own_score, opponent_score, opponent_move)
    }))
    .map_err(|payload| {
        let reason = format!("panicked on feedback: {}", panic_message(&*payload));
        warn!("player {id} failed in round {round}: {reason}");
        TournamentError::InvalidMove {
            player: id.clone(),
            round,
            reason,
        }
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_interface::Player;
    use crate::report::Role;
    use crate::strategies::{AlwaysCooperate, AlwaysDefect, TitForTat};

    /// Cooperates, then fails on the given round.
    struct Faulty {
        fail_at: u32,
        round: u32,
        panic: bool,
    }

    impl Player for Faulty {
        fn decide(&mut self) -> anyhow::Result<Move> {
            if self.round == self.fail_at {
                if self.panic {
                    panic!("lost my marbles");
                }
                anyhow::bail!("no idea");
            }
            Ok(Move::Cooperate)
        }

        fn receive_feedback(&mut self, _: u32, _: u32, _: Move) {
            self.round += 1;
        }
    }

    /// Records the feedback it receives.
    struct Recorder {
        feedback: Arc<Mutex<Vec<(u32, u32, Move)>>>,
        next: Move,
    }

    impl Player for Recorder {
        fn decide(&mut self) -> anyhow::Result<Move> {
            Ok(self.next)
        }

        fn receive_feedback(&mut self, own: u32, opp: u32, opponent_move: Move) {
            self.feedback.lock().unwrap().push((own, opp, opponent_move));
            self.next = self.next.opposite();
        }
    }

    fn setup(
        a: impl Player + Send + 'static,
        b: impl Player + Send + 'static,
    ) -> (Arc<Agent>, Arc<Agent>, Arc<Mutex<ResultStore>>) {
        let a = Arc::new(Agent::new(PlayerId::new("A"), 0, Box::new(a)));
        let b = Arc::new(Agent::new(PlayerId::new("B"), 1, Box::new(b)));
        let mut store = ResultStore::new();
        store.register(a.id.clone()).unwrap();
        store.register(b.id.clone()).unwrap();
        (a, b, Arc::new(Mutex::new(store)))
    }

    #[test]
    fn test_cooperate_vs_cooperate() {
        let (a, b, store) = setup(AlwaysCooperate, AlwaysCooperate);
        let mut m = Match::new(a, b, PayoffModel::canonical(), 3, store.clone());

        let report = m.play().unwrap();
        assert_eq!(report.scores(), (9, 9));
        assert_eq!(report.tally.betrayals, 0);
        assert_eq!(report.tally.trusts, 6);
        assert_eq!(report.tally.mutual_trusts, 3);
        assert!(m.is_completed());

        let store = store.lock().unwrap();
        assert_eq!(
            store.result_for(&PlayerId::new("A"), &PlayerId::new("B")),
            Ok((9, 9))
        );
    }

    #[test]
    fn test_defect_vs_cooperate() {
        let (a, b, store) = setup(AlwaysDefect, AlwaysCooperate);
        let mut m = Match::new(a, b, PayoffModel::canonical(), 2, store);

        let report = m.play().unwrap();
        assert_eq!(report.scores(), (10, 0));
        assert_eq!(report.entries()["A one-sided betrayals"], 2);
        assert_eq!(report.entries()["B one-sided betrayals"], 0);
        assert_eq!(report.tally.mutual_trusts, 0);
        assert_eq!(report.role(Role::A).betrayals, 2);
    }

    #[test]
    fn test_play_twice() {
        let (a, b, store) = setup(AlwaysDefect, TitForTat::new());
        let mut m = Match::new(a, b, PayoffModel::canonical(), 4, store.clone());

        let first = m.play().unwrap();
        assert_eq!(first.scores(), (5 + 1 + 1 + 1, 0 + 1 + 1 + 1));

        assert_eq!(
            m.play(),
            Err(TournamentError::MatchAlreadyPlayed(
                PlayerId::new("A"),
                PlayerId::new("B")
            ))
        );
        let store = store.lock().unwrap();
        assert_eq!(
            store.result_for(&PlayerId::new("A"), &PlayerId::new("B")),
            Ok(first.scores())
        );
    }

    #[test]
    fn test_invalid_move_commits_nothing() {
        let faulty = Faulty {
            fail_at: 2,
            round: 0,
            panic: false,
        };
        let (a, b, store) = setup(AlwaysCooperate, faulty);
        let mut m = Match::new(a, b, PayoffModel::canonical(), 10, store.clone());

        match m.play() {
            Err(TournamentError::InvalidMove { player, round, .. }) => {
                assert_eq!(player, PlayerId::new("B"));
                assert_eq!(round, 2);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!m.is_completed());
        assert!(m.is_failed());

        // no second chance, and the players are not asked again
        assert_eq!(
            m.play(),
            Err(TournamentError::MatchAlreadyPlayed(
                PlayerId::new("A"),
                PlayerId::new("B")
            ))
        );

        let store = store.lock().unwrap();
        assert!(store.is_empty());
        assert!(!store.is_closed());
    }

    #[test]
    fn test_failed_commit_is_not_replayed() {
        let feedback = Arc::new(Mutex::new(vec![]));
        let recorder = Recorder {
            feedback: feedback.clone(),
            next: Move::Cooperate,
        };
        let (a, b, store) = setup(AlwaysCooperate, recorder);
        store
            .lock()
            .unwrap()
            .commit(&a.id, &b.id, 1, 2)
            .unwrap();

        let mut m = Match::new(a, b, PayoffModel::canonical(), 3, store.clone());
        assert_eq!(
            m.play(),
            Err(TournamentError::DuplicateResult(
                PlayerId::new("A"),
                PlayerId::new("B")
            ))
        );
        assert!(matches!(
            m.play(),
            Err(TournamentError::MatchAlreadyPlayed(..))
        ));
        assert_eq!(feedback.lock().unwrap().len(), 3);
        assert_eq!(
            store
                .lock()
                .unwrap()
                .result_for(&PlayerId::new("A"), &PlayerId::new("B")),
            Ok((1, 2))
        );
    }

    #[test]
    fn test_self_match_is_rejected() {
        let (a, _, store) = setup(AlwaysCooperate, AlwaysCooperate);
        let mut m = Match::new(a.clone(), a.clone(), PayoffModel::canonical(), 3, store.clone());
        assert_eq!(m.play(), Err(TournamentError::SelfMatch(PlayerId::new("A"))));
        assert!(m.is_failed());
        assert!(store.lock().unwrap().is_empty());
        // the turn lock was never taken
        let _turn = a.take_turn();
    }

    #[test]
    fn test_panicking_feedback_is_invalid_move() {
        struct PanicsOnFeedback;

        impl Player for PanicsOnFeedback {
            fn decide(&mut self) -> anyhow::Result<Move> {
                Ok(Move::Cooperate)
            }

            fn receive_feedback(&mut self, _: u32, _: u32, _: Move) {
                panic!("feedback overflow");
            }
        }

        let (a, b, store) = setup(AlwaysCooperate, PanicsOnFeedback);
        let mut m = Match::new(a, b.clone(), PayoffModel::canonical(), 5, store.clone());
        match m.play() {
            Err(TournamentError::InvalidMove {
                player,
                round,
                reason,
            }) => {
                assert_eq!(player, PlayerId::new("B"));
                assert_eq!(round, 0);
                assert!(reason.contains("feedback overflow"), "{reason}");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(store.lock().unwrap().is_empty());
        let _turn = b.take_turn();
    }

    #[test]
    fn test_panicking_player_is_invalid_move() {
        let faulty = Faulty {
            fail_at: 0,
            round: 0,
            panic: true,
        };
        let (a, b, store) = setup(faulty, AlwaysCooperate);
        let mut m = Match::new(a.clone(), b, PayoffModel::canonical(), 10, store.clone());

        match m.play() {
            Err(TournamentError::InvalidMove { player, reason, .. }) => {
                assert_eq!(player, PlayerId::new("A"));
                assert!(reason.contains("lost my marbles"), "{reason}");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(store.lock().unwrap().is_empty());
        // the turn lock is still usable
        let _turn = a.take_turn();
    }

    #[test]
    fn test_feedback_delivered_each_round() {
        let feedback_a = Arc::new(Mutex::new(vec![]));
        let feedback_b = Arc::new(Mutex::new(vec![]));
        let a = Recorder {
            feedback: feedback_a.clone(),
            next: Move::Cooperate,
        };
        let b = Recorder {
            feedback: feedback_b.clone(),
            next: Move::Defect,
        };
        let (a, b, store) = setup(a, b);
        Match::new(a, b, PayoffModel::canonical(), 2, store)
            .play()
            .unwrap();

        assert_eq!(
            *feedback_a.lock().unwrap(),
            vec![(0, 5, Move::Defect), (5, 0, Move::Cooperate)]
        );
        assert_eq!(
            *feedback_b.lock().unwrap(),
            vec![(5, 0, Move::Cooperate), (0, 5, Move::Defect)]
        );
    }

    #[test]
    fn test_zero_rounds() {
        let (a, b, store) = setup(AlwaysCooperate, AlwaysDefect);
        let report = Match::new(a, b, PayoffModel::canonical(), 0, store.clone())
            .play()
            .unwrap();
        assert_eq!(report.scores(), (0, 0));
        assert!(store.lock().unwrap().is_closed());
    }

    #[test]
    fn test_pairing_display() {
        let pairing = Pairing {
            player_a: PlayerId::new("1"),
            player_b: PlayerId::new("2"),
        };
        assert_eq!(pairing.to_string(), "[1 VS 2]");
    }
}

//! Module defining what a participant must implement to take part in a tournament

use serde::{Deserialize, Serialize};

/// One of the two choices available in a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    /// Trust the opponent.
    Cooperate,
    /// Betray the opponent.
    Defect,
}

impl Move {
    /// The other move.
    pub fn opposite(self) -> Move {
        match self {
            Move::Cooperate => Move::Defect,
            Move::Defect => Move::Cooperate,
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Move::Cooperate => write!(f, "cooperate"),
            Move::Defect => write!(f, "defect"),
        }
    }
}

/// What a player should implement.
///
/// The judge never looks inside a player: it only asks for a move each round and reports
/// the outcome right after. A player that needs its own history or the opponent's must
/// keep track of it from the feedback it receives.
///
/// The same player value is used for every match it takes part in, one match after the
/// other. Its calls are never interleaved across matches, even when matches run in
/// parallel.
pub trait Player {
    /// Choose the move for the current round.
    ///
    /// # Error
    /// Returning an error (or panicking) makes the current match fail with
    /// [`InvalidMove`](crate::error::TournamentError::InvalidMove). Nothing is recorded
    /// for the pair and the match is not played again.
    fn decide(&mut self) -> anyhow::Result<Move>;

    /// Outcome of the round that was just played, delivered before the next
    /// [`decide`](Player::decide).
    fn receive_feedback(&mut self, own_score: u32, opponent_score: u32, opponent_move: Move);
}

impl<P: Player + ?Sized> Player for Box<P> {
    fn decide(&mut self) -> anyhow::Result<Move> {
        (**self).decide()
    }

    fn receive_feedback(&mut self, own_score: u32, opponent_score: u32, opponent_move: Move) {
        (**self).receive_feedback(own_score, opponent_score, opponent_move)
    }
}

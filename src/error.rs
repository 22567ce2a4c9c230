//! Errors reported by the judge.
//!
//! Registration and result-store errors mean the API was misused: the offending call is
//! aborted and nothing is changed. [`TournamentError::InvalidMove`] is a defect of one
//! player; it only fails the match it happened in.

use thiserror::Error;

use crate::agent::PlayerId;

/// Everything that can go wrong while registering players, recording results or playing
/// matches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TournamentError {
    /// The id was already registered.
    #[error("player {0} is already registered")]
    DuplicatePlayer(PlayerId),

    /// A result was already committed, no more players can join.
    #[error("registration is closed: a result has already been committed")]
    RegistrationClosed,

    /// The id was never registered.
    #[error("player {0} is not registered")]
    UnknownPlayer(PlayerId),

    /// The unordered pair already has a result.
    #[error("a result between {0} and {1} has already been committed")]
    DuplicateResult(PlayerId, PlayerId),

    /// No result has been committed for the pair yet.
    #[error("no result between {0} and {1}")]
    ResultNotFound(PlayerId, PlayerId),

    /// A player cannot be scored against itself.
    #[error("player {0} cannot play against itself")]
    SelfMatch(PlayerId),

    /// `play` was called on a match that already ran.
    #[error("match {0} VS {1} has already been played")]
    MatchAlreadyPlayed(PlayerId, PlayerId),

    /// A player failed to produce a move.
    #[error("player {player} did not produce a valid move in round {round}: {reason}")]
    InvalidMove {
        /// The faulty player.
        player: PlayerId,
        /// 0-indexed round in which it failed.
        round: u32,
        /// What the player reported (error chain or panic message).
        reason: String,
    },
}

impl TournamentError {
    /// Whether the error is a player defect rather than a misuse of the API.
    pub fn is_player_fault(&self) -> bool {
        matches!(self, TournamentError::InvalidMove { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = TournamentError::DuplicateResult(PlayerId::new("1"), PlayerId::new("2"));
        assert_eq!(
            err.to_string(),
            "a result between 1 and 2 has already been committed"
        );

        let err = TournamentError::InvalidMove {
            player: PlayerId::new("7"),
            round: 3,
            reason: "boom".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "player 7 did not produce a valid move in round 3: boom"
        );
        assert!(err.is_player_fault());
        assert!(!TournamentError::RegistrationClosed.is_player_fault());
    }
}

//! Payoff matrix of the prisoner's dilemma

use crate::game_interface::Move;

/// Scores awarded for each combination of moves.
///
/// The model stores the four scores seen from one side of the table; the other side is
/// read with the key swapped, so `payoff_for(a, b)` and `payoff_for(b, a)` are always
/// mirror images of each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PayoffModel {
    reward: u32,
    sucker: u32,
    temptation: u32,
    punishment: u32,
}

impl PayoffModel {
    /// Build a model from the actor-side scores.
    ///
    /// - `reward`: both cooperate
    /// - `sucker`: actor cooperates, opponent defects
    /// - `temptation`: actor defects, opponent cooperates
    /// - `punishment`: both defect
    pub fn new(reward: u32, sucker: u32, temptation: u32, punishment: u32) -> Self {
        Self {
            reward,
            sucker,
            temptation,
            punishment,
        }
    }

    /// The standard iterated-dilemma table: 3/0/5/1.
    pub fn canonical() -> Self {
        Self::new(3, 0, 5, 1)
    }

    /// Returns `(actor_score, opponent_score)`.
    pub fn payoff_for(&self, actor: Move, opponent: Move) -> (u32, u32) {
        (self.score(actor, opponent), self.score(opponent, actor))
    }

    fn score(&self, actor: Move, opponent: Move) -> u32 {
        match (actor, opponent) {
            (Move::Cooperate, Move::Cooperate) => self.reward,
            (Move::Cooperate, Move::Defect) => self.sucker,
            (Move::Defect, Move::Cooperate) => self.temptation,
            (Move::Defect, Move::Defect) => self.punishment,
        }
    }

    /// Whether the table has the dilemma ordering `T > R > P > S` and `2R > T + S`.
    pub fn is_dilemma(&self) -> bool {
        self.temptation > self.reward
            && self.reward > self.punishment
            && self.punishment > self.sucker
            && 2 * self.reward > self.temptation + self.sucker
    }
}

impl Default for PayoffModel {
    fn default() -> Self {
        Self::canonical()
    }
}

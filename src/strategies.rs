//! Reference players.
//!
//! These are ordinary [`Player`] implementations, the judge treats them exactly like any
//! other participant. They learn everything from [`Player::receive_feedback`] and keep
//! their state across matches.

use crate::game_interface::{Move, Player};

/// Never defects.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysCooperate;

impl Player for AlwaysCooperate {
    fn decide(&mut self) -> anyhow::Result<Move> {
        Ok(Move::Cooperate)
    }

    fn receive_feedback(&mut self, _own_score: u32, _opponent_score: u32, _opponent_move: Move) {}
}

/// Never cooperates.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysDefect;

impl Player for AlwaysDefect {
    fn decide(&mut self) -> anyhow::Result<Move> {
        Ok(Move::Defect)
    }

    fn receive_feedback(&mut self, _own_score: u32, _opponent_score: u32, _opponent_move: Move) {}
}

/// Copies the opponent's last move.
#[derive(Debug, Clone)]
pub struct TitForTat {
    first: Move,
    last_opponent_move: Option<Move>,
}

impl TitForTat {
    /// Starts by cooperating.
    pub fn new() -> Self {
        Self {
            first: Move::Cooperate,
            last_opponent_move: None,
        }
    }

    /// Starts by defecting (suspicious tit-for-tat).
    pub fn suspicious() -> Self {
        Self {
            first: Move::Defect,
            last_opponent_move: None,
        }
    }
}

impl Default for TitForTat {
    fn default() -> Self {
        Self::new()
    }
}

impl Player for TitForTat {
    fn decide(&mut self) -> anyhow::Result<Move> {
        Ok(self.last_opponent_move.unwrap_or(self.first))
    }

    fn receive_feedback(&mut self, _own_score: u32, _opponent_score: u32, opponent_move: Move) {
        self.last_opponent_move = Some(opponent_move);
    }
}

/// Cooperates until the opponent defected more than `noise_tolerance` times, then
/// defects forever.
#[derive(Debug, Clone, Default)]
pub struct GrimTrigger {
    noise_tolerance: u32,
    defections_seen: u32,
}

impl GrimTrigger {
    /// Triggered by the first defection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignores the first `noise_tolerance` defections.
    pub fn with_noise_tolerance(noise_tolerance: u32) -> Self {
        Self {
            noise_tolerance,
            defections_seen: 0,
        }
    }
}

impl Player for GrimTrigger {
    fn decide(&mut self) -> anyhow::Result<Move> {
        if self.defections_seen > self.noise_tolerance {
            Ok(Move::Defect)
        } else {
            Ok(Move::Cooperate)
        }
    }

    fn receive_feedback(&mut self, _own_score: u32, _opponent_score: u32, opponent_move: Move) {
        if opponent_move == Move::Defect {
            self.defections_seen += 1;
        }
    }
}

/// Win-stay, lose-switch: repeats its move after a good outcome, switches otherwise.
///
/// An outcome is good when the round scored at least `threshold` (3 on the canonical
/// table, i.e. mutual cooperation or a successful defection).
#[derive(Debug, Clone)]
pub struct Pavlov {
    threshold: u32,
    next: Move,
}

impl Pavlov {
    /// Pavlov tuned for the canonical payoff table.
    pub fn new() -> Self {
        Self::with_threshold(3)
    }

    /// Pavlov with a custom "good outcome" threshold.
    pub fn with_threshold(threshold: u32) -> Self {
        Self {
            threshold,
            next: Move::Cooperate,
        }
    }
}

impl Default for Pavlov {
    fn default() -> Self {
        Self::new()
    }
}

impl Player for Pavlov {
    fn decide(&mut self) -> anyhow::Result<Move> {
        Ok(self.next)
    }

    fn receive_feedback(&mut self, own_score: u32, _opponent_score: u32, _opponent_move: Move) {
        if own_score < self.threshold {
            self.next = self.next.opposite();
        }
    }
}

/// Only defects after two consecutive defections of the opponent.
#[derive(Debug, Clone, Default)]
pub struct TitForTwoTats {
    last_two: [Option<Move>; 2],
}

impl Player for TitForTwoTats {
    fn decide(&mut self) -> anyhow::Result<Move> {
        match self.last_two {
            [Some(Move::Defect), Some(Move::Defect)] => Ok(Move::Defect),
            _ => Ok(Move::Cooperate),
        }
    }

    fn receive_feedback(&mut self, _own_score: u32, _opponent_score: u32, opponent_move: Move) {
        self.last_two = [self.last_two[1], Some(opponent_move)];
    }
}

/// Escalating retaliation: after the opponent's n-th defection it makes sure to have
/// defected n(n+1)/2 times in total, then forgives.
#[derive(Debug, Clone, Default)]
pub struct Gradual {
    opponent_defections: u64,
    own_defections: u64,
    last_move: Option<Move>,
}

impl Player for Gradual {
    fn decide(&mut self) -> anyhow::Result<Move> {
        let n = self.opponent_defections;
        let chosen = if self.own_defections < n * (n + 1) / 2 {
            Move::Defect
        } else {
            Move::Cooperate
        };
        self.last_move = Some(chosen);
        Ok(chosen)
    }

    fn receive_feedback(&mut self, _own_score: u32, _opponent_score: u32, opponent_move: Move) {
        if self.last_move.take() == Some(Move::Defect) {
            self.own_defections += 1;
        }
        if opponent_move == Move::Defect {
            self.opponent_defections += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feed `player` the opponent moves one by one and collect its decisions.
    fn replay(player: &mut impl Player, opponent: &[Move]) -> Vec<Move> {
        let model = crate::payoff::PayoffModel::canonical();
        let mut decisions = vec![];
        for &opp in opponent {
            let own = player.decide().unwrap();
            let (own_score, opp_score) = model.payoff_for(own, opp);
            player.receive_feedback(own_score, opp_score, opp);
            decisions.push(own);
        }
        decisions.push(player.decide().unwrap());
        decisions
    }

    use Move::{Cooperate as C, Defect as D};

    #[test]
    fn test_tit_for_tat() {
        assert_eq!(replay(&mut TitForTat::new(), &[C, D, D, C]), vec![C, C, D, D, C]);
        assert_eq!(replay(&mut TitForTat::suspicious(), &[C]), vec![D, C]);
    }

    #[test]
    fn test_grim_trigger() {
        assert_eq!(replay(&mut GrimTrigger::new(), &[C, D, C, C]), vec![C, C, D, D, D]);
        assert_eq!(
            replay(&mut GrimTrigger::with_noise_tolerance(1), &[D, C, D]),
            vec![C, C, C, D]
        );
    }

    #[test]
    fn test_pavlov() {
        // C/C stays, C/D switches, D/C stays, D/D switches
        assert_eq!(replay(&mut Pavlov::new(), &[C, D, C, D]), vec![C, C, D, D, C]);
    }

    #[test]
    fn test_tit_for_two_tats() {
        assert_eq!(
            replay(&mut TitForTwoTats::default(), &[D, C, D, D, C]),
            vec![C, C, C, C, D, C]
        );
    }

    #[test]
    fn test_gradual() {
        // one defection -> one retaliation, second defection -> two more
        assert_eq!(
            replay(&mut Gradual::default(), &[D, C, D, C, C, C]),
            vec![C, D, C, D, D, C, C]
        );
    }

    #[test]
    fn test_constants() {
        assert_eq!(replay(&mut AlwaysCooperate, &[D, D]), vec![C, C, C]);
        assert_eq!(replay(&mut AlwaysDefect, &[C, C]), vec![D, D, D]);
    }
}

//! Round-robin pairing of the registered players.

use std::sync::Arc;

use crate::agent::Agent;
use crate::match_runner::Pairing;

/// Round-robin schedule over the registered players.
///
/// Yields every pair of distinct players exactly once: the player registered at index
/// `i` meets every player registered after it, for `i` in registration order. The
/// schedule borrows the player list, so nobody can register while it is being walked.
#[derive(Debug, Clone)]
pub struct Schedule<'a> {
    agents: &'a [Arc<Agent>],
    i: usize,
    j: usize,
}

impl<'a> Schedule<'a> {
    pub(crate) fn new(agents: &'a [Arc<Agent>]) -> Self {
        Schedule { agents, i: 0, j: 1 }
    }

    /// Yields the players themselves rather than their ids.
    pub(crate) fn next_agents(&mut self) -> Option<(Arc<Agent>, Arc<Agent>)> {
        let n = self.agents.len();
        if self.j >= n {
            self.i += 1;
            self.j = self.i + 1;
        }
        if self.j >= n {
            // exhausted, stay there
            self.i = n;
            self.j = n;
            return None;
        }
        let pair = (self.agents[self.i].clone(), self.agents[self.j].clone());
        self.j += 1;
        Some(pair)
    }

    fn remaining(&self) -> usize {
        let n = self.agents.len();
        if self.i >= n {
            return 0;
        }
        // rest of the current row, then every full row below it
        let row = n.saturating_sub(self.j.max(self.i + 1));
        let below = n - self.i - 1;
        row + below * below.saturating_sub(1) / 2
    }
}

impl Iterator for Schedule<'_> {
    type Item = Pairing;

    fn next(&mut self) -> Option<Pairing> {
        self.next_agents().map(|(a, b)| Pairing {
            player_a: a.id.clone(),
            player_b: b.id.clone(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Schedule<'_> {}

/// Number of matches of a round robin between `n` players.
pub fn match_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

//! Counters collected by the completion driver.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionStats {
    pub rounds: u32,
    /// Variables skipped because a stuck query waits for them.
    pub skipped: u32,
    pub proposals: usize,
    /// Proposals consistent with the expected program.
    pub candidates: usize,
    pub inserted_literals: u32,
    /// Wall time of each round, in microseconds.
    pub round_micros: Vec<u64>,
}

impl CompletionStats {
    pub(crate) fn end_round(&mut self, elapsed: Duration) {
        self.rounds += 1;
        self.round_micros
            .push(u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX));
    }

    pub fn total_micros(&self) -> u64 {
        self.round_micros.iter().sum()
    }
}

//! Per-position frequency tables.
//!
//! The predictor builds one [`Tally`] for every position of the averaged
//! episode and keeps its winner as the expected event for that position.
//!
//! # Selection
//!
//! The winner is the entry with the strictly highest count. On a tie the
//! entry recorded first wins. Rows are scanned oldest first, so ties resolve
//! toward the oldest episode in history.

use std::str::FromStr;

use crate::error::{LearningError, Result};
use crate::event::Event;

/// What counts as "the same action" when tallying a position.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum VoteKey {
    /// Full event identity (kind and timestamp).
    ///
    /// Historical events almost never share a timestamp, so every bucket
    /// usually holds a single event and the vote degenerates to the
    /// tie-break.
    #[default]
    Event,
    /// Action kind only. The first event seen of the winning kind is
    /// returned as the representative.
    Kind,
}

impl VoteKey {
    pub fn parse(name: &str) -> Result<Self> {
        VoteKey::from_str(name).map_err(|_| LearningError::UnknownVoteKey {
            name: name.to_owned(),
        })
    }

    #[inline]
    fn same_bucket(self, a: &Event, b: &Event) -> bool {
        match self {
            VoteKey::Event => a == b,
            VoteKey::Kind => a.kind == b.kind,
        }
    }
}

/// Frequency table for one position, in first-seen order.
#[derive(Clone, Debug)]
pub struct Tally {
    key: VoteKey,
    entries: Vec<(Event, usize)>,
}

impl Tally {
    pub fn new(key: VoteKey) -> Self {
        Self {
            key,
            entries: Vec::new(),
        }
    }

    /// Counts one occurrence of `event`.
    pub fn record(&mut self, event: Event) {
        let key = self.key;
        match self
            .entries
            .iter_mut()
            .find(|(seen, _)| key.same_bucket(seen, &event))
        {
            Some((_, count)) => *count += 1,
            None => self.entries.push((event, 1)),
        }
    }

    /// Occurrences recorded in the bucket `event` falls into.
    pub fn count(&self, event: &Event) -> usize {
        self.entries
            .iter()
            .find(|(seen, _)| self.key.same_bucket(seen, event))
            .map_or(0, |(_, count)| *count)
    }

    /// Number of distinct buckets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Representative of the most frequent bucket, `None` when empty.
    pub fn winner(&self) -> Option<Event> {
        let mut best: Option<(Event, usize)> = None;

        for &(event, count) in &self.entries {
            // Strict comparison keeps the earliest entry on ties
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((event, count));
            }
        }

        best.map(|(event, _)| event)
    }
}

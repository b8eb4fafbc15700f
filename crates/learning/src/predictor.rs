//! Per-player sequence learner.
//!
//! A [`Predictor`] records the events of the bout in progress and keeps the
//! last [`HISTORY_CAPACITY`] finished bouts. From that history it projects an
//! "average episode": its length is the truncated mean row length, and each
//! position holds the winner of a [`Tally`] over the events historical rows
//! had at that position. The expected next event is the average episode's
//! entry at the current row's length.
//!
//! # Recording states
//!
//! A fresh predictor has no current row. The first [`push`](Predictor::push)
//! opens one; [`end_sequence`](Predictor::end_sequence) commits it and opens
//! an empty replacement straight away. Consequently a second `end_sequence`
//! without any push in between commits an empty row.

use arrayvec::ArrayVec;

use crate::event::{ActionKind, Event};
use crate::row::Row;
use crate::vote::{Tally, VoteKey};

/// Maximum number of finished rows kept per player.
pub const HISTORY_CAPACITY: usize = 10;

#[derive(Clone, Debug, Default)]
pub struct Predictor {
    /// Finished rows, oldest first.
    history: ArrayVec<Row, HISTORY_CAPACITY>,
    current: Option<Row>,
    vote_key: VoteKey,
}

impl Predictor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vote_key(vote_key: VoteKey) -> Self {
        Self {
            vote_key,
            ..Self::default()
        }
    }

    /// Appends `event` to the current row, opening one if needed.
    pub fn push(&mut self, event: Event) {
        tracing::trace!("push {}", event);
        self.current.get_or_insert_with(Row::new).push(event);
    }

    /// Pushes an event of `kind` stamped with the current time.
    pub fn push_kind(&mut self, kind: ActionKind) {
        self.push(Event::now(kind));
    }

    /// Commits the current row into history and starts a new empty one.
    ///
    /// Does nothing if no row was ever opened. When history is full the
    /// oldest row is dropped first.
    pub fn end_sequence(&mut self) {
        let Some(row) = self.current.take() else {
            return;
        };

        if self.history.is_full() {
            let evicted = self.history.remove(0);
            tracing::debug!("history full, dropped oldest row ({} events)", evicted.len());
        }

        tracing::debug!(
            "committed row of {} events (history: {})",
            row.len(),
            self.history.len() + 1
        );
        self.history.push(row);
        self.current = Some(Row::new());
    }

    /// Expected event for the current row's next position.
    ///
    /// Returns `None` when there is no history, no current row, or when the
    /// current row is already as long as the average episode.
    pub fn expected_next_event(&self) -> Option<Event> {
        let averages = self.average_row();
        let index = self.current.as_ref()?.len();
        let expected = averages.get(index).copied();

        tracing::trace!(
            "expected at position {}: {:?} (average length {})",
            index,
            expected,
            averages.len()
        );

        expected
    }

    /// The action an NPC should answer the expected next event with.
    pub fn expected_counter(&self) -> Option<ActionKind> {
        self.expected_next_event().map(|event| event.kind.counter())
    }

    /// Truncated mean length of the rows in history, `None` when empty.
    pub fn average_length(&self) -> Option<usize> {
        if self.history.is_empty() {
            return None;
        }

        let total: usize = self.history.iter().map(Row::len).sum();
        Some(total / self.history.len())
    }

    /// Winner of each position up to the average length.
    ///
    /// Positions no historical row reaches are skipped.
    pub fn average_row(&self) -> Vec<Event> {
        let Some(length) = self.average_length() else {
            return Vec::new();
        };

        (0..length)
            .filter_map(|index| {
                let mut tally = Tally::new(self.vote_key);
                for event in self.history.iter().filter_map(|row| row.get(index)) {
                    tally.record(*event);
                }
                tally.winner()
            })
            .collect()
    }

    /// Finished rows, oldest first.
    pub fn history(&self) -> &[Row] {
        &self.history
    }

    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Row being recorded, if one has been opened.
    pub fn current(&self) -> Option<&Row> {
        self.current.as_ref()
    }

    /// Whether a current row exists (it may still be empty).
    #[inline]
    pub fn is_recording(&self) -> bool {
        self.current.is_some()
    }

    #[inline]
    pub fn vote_key(&self) -> VoteKey {
        self.vote_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ActionKind::{Attack, ConsumeGoldenApple, ThrowPotion};

    fn record(predictor: &mut Predictor, row: &[(ActionKind, i64)]) {
        for &(kind, ts) in row {
            predictor.push(Event::new(kind, ts));
        }
        predictor.end_sequence();
    }

    #[test]
    fn push_opens_current_row() {
        let mut predictor = Predictor::new();
        assert!(!predictor.is_recording());

        predictor.push(Event::new(Attack, 1));
        predictor.push(Event::new(Attack, 1));

        let current = predictor.current().unwrap();
        assert_eq!(current.len(), 2);
        assert_eq!(predictor.history_len(), 0);
    }

    #[test]
    fn end_sequence_without_row_is_noop() {
        let mut predictor = Predictor::new();
        predictor.end_sequence();
        predictor.end_sequence();

        assert_eq!(predictor.history_len(), 0);
        assert!(!predictor.is_recording());
    }

    #[test]
    fn end_sequence_leaves_empty_row_open() {
        let mut predictor = Predictor::new();
        record(&mut predictor, &[(Attack, 1)]);

        assert!(predictor.is_recording());
        assert!(predictor.current().unwrap().is_empty());

        // The open empty row is committed by a second call
        predictor.end_sequence();
        assert_eq!(predictor.history_len(), 2);
        assert!(predictor.history()[1].is_empty());
    }

    #[test]
    fn history_evicts_oldest_first() {
        let mut predictor = Predictor::new();
        for ts in 0..12 {
            record(&mut predictor, &[(Attack, ts)]);
        }

        assert_eq!(predictor.history_len(), HISTORY_CAPACITY);
        let first = predictor.history()[0].get(0).unwrap();
        let last = predictor.history()[HISTORY_CAPACITY - 1].get(0).unwrap();
        assert_eq!(first.timestamp.as_millis(), 2);
        assert_eq!(last.timestamp.as_millis(), 11);
    }

    #[test]
    fn empty_history_predicts_nothing() {
        let mut predictor = Predictor::new();
        assert_eq!(predictor.expected_next_event(), None);

        predictor.push(Event::new(Attack, 1));
        assert_eq!(predictor.expected_next_event(), None);
        assert_eq!(predictor.average_length(), None);
    }

    #[test]
    fn average_length_truncates() {
        let mut predictor = Predictor::new();
        record(
            &mut predictor,
            &[(Attack, 1), (Attack, 2), (Attack, 3), (Attack, 4), (Attack, 5)],
        );
        record(&mut predictor, &[(ThrowPotion, 6), (ThrowPotion, 7)]);

        assert_eq!(predictor.average_length(), Some(3));
        assert_eq!(predictor.average_row().len(), 3);
    }

    #[test]
    fn predicts_shared_position_event() {
        let a = (Attack, 100);
        let b = (ThrowPotion, 200);
        let c = (ConsumeGoldenApple, 300);

        let mut predictor = Predictor::new();
        for _ in 0..3 {
            record(&mut predictor, &[a, b, c]);
        }

        predictor.push(Event::new(a.0, a.1));
        assert_eq!(predictor.expected_next_event(), Some(Event::new(b.0, b.1)));
        assert_eq!(predictor.expected_counter(), Some(ConsumeGoldenApple));
    }

    #[test]
    fn singleton_tie_picks_oldest_row() {
        let mut predictor = Predictor::new();
        record(&mut predictor, &[(Attack, 1), (ThrowPotion, 2)]);
        record(&mut predictor, &[(Attack, 3), (ConsumeGoldenApple, 4)]);

        predictor.push(Event::new(Attack, 5));
        assert_eq!(
            predictor.expected_next_event(),
            Some(Event::new(ThrowPotion, 2))
        );
    }

    #[test]
    fn majority_by_event_identity() {
        let mut predictor = Predictor::new();
        record(&mut predictor, &[(Attack, 1), (ThrowPotion, 2)]);
        record(&mut predictor, &[(Attack, 1), (ConsumeGoldenApple, 9)]);
        record(&mut predictor, &[(Attack, 1), (ConsumeGoldenApple, 9)]);

        predictor.push(Event::new(Attack, 50));
        assert_eq!(
            predictor.expected_next_event(),
            Some(Event::new(ConsumeGoldenApple, 9))
        );
    }

    #[test]
    fn kind_vote_ignores_timestamps() {
        let mut predictor = Predictor::with_vote_key(VoteKey::Kind);
        record(&mut predictor, &[(Attack, 1), (ThrowPotion, 2)]);
        record(&mut predictor, &[(Attack, 3), (ConsumeGoldenApple, 4)]);
        record(&mut predictor, &[(Attack, 5), (ConsumeGoldenApple, 6)]);

        predictor.push(Event::new(Attack, 7));
        assert_eq!(
            predictor.expected_next_event(),
            Some(Event::new(ConsumeGoldenApple, 4))
        );
        assert_eq!(predictor.expected_counter(), Some(Attack));
    }

    #[test]
    fn no_prediction_past_average_length() {
        let mut predictor = Predictor::new();
        record(&mut predictor, &[(Attack, 1), (Attack, 2)]);

        predictor.push(Event::new(Attack, 3));
        assert!(predictor.expected_next_event().is_some());

        predictor.push(Event::new(Attack, 4));
        assert_eq!(predictor.expected_next_event(), None);
    }

    #[test]
    fn open_empty_row_predicts_first_position() {
        let mut predictor = Predictor::new();
        record(&mut predictor, &[(ThrowPotion, 1), (Attack, 2)]);

        assert_eq!(
            predictor.expected_next_event(),
            Some(Event::new(ThrowPotion, 1))
        );
    }
}

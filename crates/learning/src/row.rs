//! One recorded interaction episode.

use crate::event::Event;

/// Ordered, append-only sequence of events from a single bout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Row {
    events: Vec<Event>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Event at `index`, if the row reaches that far.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }
}

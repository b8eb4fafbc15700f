//! Observed player actions.
//!
//! An [`Event`] pairs the kind of action a player performed with the wall-clock
//! time it was observed. Events are plain values: they are copied into rows and
//! never shared.

use std::fmt;
use std::str::FromStr;

use crate::error::{LearningError, Result};

/// Kind of player action the learner tracks.
///
/// The set is closed; hosts translate their own game events into one of these
/// before pushing them into a predictor.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ActionKind {
    /// Player threw a splash potion.
    ThrowPotion,
    /// Player ate a golden apple to heal.
    ConsumeGoldenApple,
    /// Player swung at the NPC.
    Attack,
}

impl ActionKind {
    /// All kinds in declaration order.
    pub const ALL: [ActionKind; 3] = [
        ActionKind::ThrowPotion,
        ActionKind::ConsumeGoldenApple,
        ActionKind::Attack,
    ];

    /// The action an NPC answers this one with.
    ///
    /// Offensive actions (attacks, thrown potions) are answered by healing,
    /// healing is answered by pressing the attack.
    pub const fn counter(self) -> ActionKind {
        match self {
            ActionKind::Attack | ActionKind::ThrowPotion => ActionKind::ConsumeGoldenApple,
            ActionKind::ConsumeGoldenApple => ActionKind::Attack,
        }
    }

    /// Parses a snake_case kind name, ignoring ASCII case.
    pub fn parse(name: &str) -> Result<Self> {
        ActionKind::from_str(name).map_err(|_| LearningError::UnknownActionKind {
            name: name.to_owned(),
        })
    }
}

/// Milliseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Current wall-clock time.
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    #[inline]
    pub const fn as_millis(self) -> i64 {
        self.0
    }
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Self(millis)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// A single observed action.
///
/// Two events are equal only when both the kind and the timestamp match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    pub kind: ActionKind,
    pub timestamp: Timestamp,
}

impl Event {
    /// Creates an event observed `millis` after the Unix epoch.
    pub fn new(kind: ActionKind, millis: i64) -> Self {
        Self::with_timestamp(kind, Timestamp(millis))
    }

    pub const fn with_timestamp(kind: ActionKind, timestamp: Timestamp) -> Self {
        Self { kind, timestamp }
    }

    /// Creates an event stamped with the current time.
    pub fn now(kind: ActionKind) -> Self {
        Self::with_timestamp(kind, Timestamp::now())
    }

    /// Builds an event from a host-supplied kind name.
    ///
    /// Unknown names are rejected here so nothing downstream ever sees an
    /// action outside the closed set.
    pub fn parse(kind: &str, millis: i64) -> Result<Self> {
        Ok(Self::new(ActionKind::parse(kind)?, millis))
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.kind, self.timestamp)
    }
}

use std::collections::BTreeMap;
use std::fmt;

use pulse_common::Uuid;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The value of a named measure.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MeasureValue {
    /// A numerical measure.
    Number(f64),
    /// A textual measure.
    String(String),
}

impl From<f64> for MeasureValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for MeasureValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for MeasureValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl fmt::Display for MeasureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => number.fmt(f),
            Self::String(string) => string.fmt(f),
        }
    }
}

/// Named measures of a multi-measure event.
pub type Measures = BTreeMap<String, MeasureValue>;

/// The measure payload of a canonical event.
///
/// An event carries exactly one of the two. It serializes as either a `value` or a `measures`
/// field.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Measure {
    /// A single numerical value.
    Value(f64),
    /// A non-empty set of named measures.
    Measures(Measures),
}

/// Whom a canonical event is attributed to.
///
/// Serializes as either a `teamId` or an `id` field, never both.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EventScope {
    /// The event occurred in the context of a team.
    #[serde(rename = "teamId")]
    Team(Uuid),
    /// The event is independent of a team and identified by its own id.
    #[serde(rename = "id")]
    Generic(Uuid),
}

/// A normalized, transport-ready metric event.
///
/// ```json
/// {"eventName":"UserLoggedIn","timeMs":1700000000000,"value":1.0,"id":"..."}
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricEvent {
    /// The name of the event.
    pub event_name: String,
    /// The time the event occurred in milliseconds since the UNIX epoch.
    pub time_ms: u64,
    /// The value or named measures of the event.
    #[serde(flatten)]
    pub measure: Measure,
    /// The team or the event identifier.
    #[serde(flatten)]
    pub scope: EventScope,
    /// Additional attributes passed through from the input.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl MetricEvent {
    /// Returns the team identifier of team-scoped events.
    pub fn team_id(&self) -> Option<Uuid> {
        match self.scope {
            EventScope::Team(team_id) => Some(team_id),
            EventScope::Generic(_) => None,
        }
    }

    /// Returns the identifier of generic events.
    pub fn id(&self) -> Option<Uuid> {
        match self.scope {
            EventScope::Team(_) => None,
            EventScope::Generic(id) => Some(id),
        }
    }

    /// Returns the single value, if the event has no named measures.
    pub fn value(&self) -> Option<f64> {
        match self.measure {
            Measure::Value(value) => Some(value),
            Measure::Measures(_) => None,
        }
    }

    /// Returns the named measures, if any.
    pub fn measures(&self) -> Option<&Measures> {
        match self.measure {
            Measure::Value(_) => None,
            Measure::Measures(ref measures) => Some(measures),
        }
    }
}

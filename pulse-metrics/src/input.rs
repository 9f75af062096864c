use pulse_common::Uuid;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::event::{MeasureValue, Measures};

/// The measure of a [`PublishInput`] before normalization.
#[derive(Clone, Debug, PartialEq)]
pub enum MeasureInput {
    /// A single value. Missing values default to `1`.
    Single {
        /// The value to report, if any.
        value: Option<f64>,
    },
    /// Named measures.
    Multi {
        /// The measures to report.
        measures: Measures,
    },
}

/// The scope of a [`PublishInput`] before normalization.
#[derive(Clone, Debug, PartialEq)]
pub enum ScopeInput {
    /// A team event. Team events never carry an event identifier.
    Team {
        /// The team the event occurred for.
        team_id: Uuid,
    },
    /// An event independent of a team.
    Generic {
        /// The identifier of the event. Generated during conversion if missing.
        id: Option<Uuid>,
    },
}

/// A caller-supplied description of a metric event.
///
/// Inputs are converted into canonical [`MetricEvent`](crate::MetricEvent)s by the
/// [`Converter`](crate::Converter). Build them programmatically:
///
/// ```
/// use pulse_metrics::PublishInput;
///
/// let input = PublishInput::generic("AgpsFileSizeFetched")
///     .with_value(2048.0)
///     .with_attribute("sourceApi", "REST");
/// ```
///
/// Or deserialize them from JSON. A non-null `teamId` makes the input a team input, in which case
/// any `id` is ignored. Non-empty `measures` take precedence over `value`. All other fields are
/// kept as pass-through attributes:
///
/// ```
/// use pulse_metrics::{PublishInput, ScopeInput};
///
/// let input: PublishInput = serde_json::from_str(r#"{
///     "eventName": "CellLocationRequestProcessed",
///     "teamId": "12345e6f-8e12-49bd-9789-b807608ad3c2",
///     "value": 0,
///     "planType": "DEVELOPER"
/// }"#).unwrap();
///
/// assert!(matches!(input.scope, ScopeInput::Team { .. }));
/// assert_eq!(input.attributes["planType"], "DEVELOPER");
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "RawPublishInput")]
pub struct PublishInput {
    /// The name of the event.
    pub event_name: String,
    /// Capture time in milliseconds since the UNIX epoch. Defaults to the time of conversion.
    pub time_ms: Option<u64>,
    /// The single value or the named measures.
    pub measure: MeasureInput,
    /// The team or the event identifier.
    pub scope: ScopeInput,
    /// Additional attributes copied into the canonical event.
    pub attributes: Map<String, Value>,
}

impl PublishInput {
    /// Creates a generic input with the default value and no identifier.
    pub fn generic(event_name: impl Into<String>) -> Self {
        Self::with_scope(event_name.into(), ScopeInput::Generic { id: None })
    }

    /// Creates an input for the given team with the default value.
    pub fn team(event_name: impl Into<String>, team_id: Uuid) -> Self {
        Self::with_scope(event_name.into(), ScopeInput::Team { team_id })
    }

    fn with_scope(event_name: String, scope: ScopeInput) -> Self {
        Self {
            event_name,
            time_ms: None,
            measure: MeasureInput::Single { value: None },
            scope,
            attributes: Map::new(),
        }
    }

    /// Reports a single value, replacing any measures.
    pub fn with_value(mut self, value: f64) -> Self {
        self.measure = MeasureInput::Single { value: Some(value) };
        self
    }

    /// Reports named measures, replacing any value.
    pub fn with_measures<K, I>(mut self, measures: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, MeasureValue)>,
    {
        let measures = measures
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect();
        self.measure = MeasureInput::Multi { measures };
        self
    }

    /// Sets the capture time in milliseconds since the UNIX epoch.
    pub fn with_time_ms(mut self, time_ms: u64) -> Self {
        self.time_ms = Some(time_ms);
        self
    }

    /// Sets the event identifier of a generic input.
    ///
    /// Has no effect on team inputs.
    pub fn with_id(mut self, id: Uuid) -> Self {
        if let ScopeInput::Generic { id: ref mut slot } = self.scope {
            *slot = Some(id);
        }
        self
    }

    /// Adds a pass-through attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Wire representation of [`PublishInput`] with every variant field optional.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPublishInput {
    event_name: String,
    time_ms: Option<u64>,
    value: Option<f64>,
    measures: Option<Measures>,
    team_id: Option<Uuid>,
    id: Option<Uuid>,
    #[serde(flatten)]
    other: Map<String, Value>,
}

impl From<RawPublishInput> for PublishInput {
    fn from(raw: RawPublishInput) -> Self {
        let measure = match raw.measures {
            Some(measures) if !measures.is_empty() => MeasureInput::Multi { measures },
            _ => MeasureInput::Single { value: raw.value },
        };

        let scope = match raw.team_id {
            Some(team_id) => ScopeInput::Team { team_id },
            None => ScopeInput::Generic { id: raw.id },
        };

        Self {
            event_name: raw.event_name,
            time_ms: raw.time_ms,
            measure,
            scope,
            attributes: raw.other,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn team_id() -> Uuid {
        Uuid::parse_str("12345e6f-8e12-49bd-9789-b807608ad3c2").unwrap()
    }

    fn parse(value: Value) -> PublishInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_builder_generic() {
        let id = Uuid::new_v4();
        let input = PublishInput::generic("UserLoggedIn")
            .with_id(id)
            .with_time_ms(42)
            .with_attribute("sourceApi", "REST");

        assert_eq!(input.event_name, "UserLoggedIn");
        assert_eq!(input.time_ms, Some(42));
        assert_eq!(input.measure, MeasureInput::Single { value: None });
        assert_eq!(input.scope, ScopeInput::Generic { id: Some(id) });
        assert_eq!(input.attributes["sourceApi"], "REST");
    }

    #[test]
    fn test_builder_team_ignores_id() {
        let input = PublishInput::team("CellLocationRequestProcessed", team_id())
            .with_id(Uuid::new_v4());

        assert_eq!(input.scope, ScopeInput::Team { team_id: team_id() });
    }

    #[test]
    fn test_builder_last_measure_wins() {
        let input = PublishInput::generic("Event")
            .with_measures([("a", MeasureValue::Number(1.0))])
            .with_value(3.0);
        assert_eq!(input.measure, MeasureInput::Single { value: Some(3.0) });

        let input = PublishInput::generic("Event")
            .with_value(3.0)
            .with_measures([("a", MeasureValue::from("x"))]);
        assert!(matches!(input.measure, MeasureInput::Multi { .. }));
    }

    #[test]
    fn test_parse_minimal() {
        let input = parse(json!({"eventName": "UserLoggedIn"}));

        assert_eq!(input, PublishInput::generic("UserLoggedIn"));
    }

    #[test]
    fn test_parse_team_ignores_id() {
        let input = parse(json!({
            "eventName": "Event",
            "teamId": team_id(),
            "id": Uuid::new_v4(),
        }));

        assert_eq!(input.scope, ScopeInput::Team { team_id: team_id() });
        assert!(input.attributes.is_empty());
    }

    #[test]
    fn test_parse_null_team_is_generic() {
        let input = parse(json!({"eventName": "Event", "teamId": null}));

        assert_eq!(input.scope, ScopeInput::Generic { id: None });
    }

    #[test]
    fn test_parse_measures_over_value() {
        let input = parse(json!({
            "eventName": "Event",
            "value": 5,
            "measures": {"measure1": "1", "measure2": 2},
        }));

        let MeasureInput::Multi { measures } = input.measure else {
            panic!("expected measures");
        };
        assert_eq!(measures.len(), 2);
        assert_eq!(measures["measure2"], MeasureValue::Number(2.0));
    }

    #[test]
    fn test_parse_empty_measures_fall_back_to_value() {
        let input = parse(json!({"eventName": "Event", "value": 0, "measures": {}}));

        assert_eq!(input.measure, MeasureInput::Single { value: Some(0.0) });
    }

    #[test]
    fn test_parse_keeps_other_fields() {
        let input = parse(json!({
            "eventName": "Event",
            "timeMs": 1_700_000_000_000u64,
            "planType": "DEVELOPER",
            "context": {"nested": true},
        }));

        assert_eq!(input.time_ms, Some(1_700_000_000_000));
        assert_eq!(
            Value::Object(input.attributes),
            json!({"planType": "DEVELOPER", "context": {"nested": true}})
        );
    }

    #[test]
    fn test_parse_missing_event_name() {
        let result = serde_json::from_value::<PublishInput>(json!({"value": 1}));
        assert!(result.is_err());
    }
}

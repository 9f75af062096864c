use std::fmt;
use std::sync::Arc;

use pulse_common::{Clock, IdGenerator, RandomIdGenerator, SystemClock};

use crate::constants::{DEFAULT_METRIC_EVENT_VALUE, RESERVED_FIELDS};
use crate::event::{EventScope, Measure, MetricEvent};
use crate::input::{MeasureInput, PublishInput, ScopeInput};

/// Normalizes [`PublishInput`]s into canonical [`MetricEvent`]s.
///
/// Conversion never fails. For every input:
///
///  - The capture time is taken from the input, or from the clock if missing.
///  - Non-empty named measures are kept as they are. Otherwise the event carries the input's
///    value, or [`DEFAULT_METRIC_EVENT_VALUE`] if there is none. A value of `0` is kept.
///  - Team inputs keep their team identifier and never get an event identifier. Generic inputs
///    keep their identifier or get a fresh one from the id generator.
///  - Pass-through attributes are copied, except for those named in [`RESERVED_FIELDS`].
#[derive(Clone)]
pub struct Converter {
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl Converter {
    /// Creates a converter reading the given clock and generating identifiers from `ids`.
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { clock, ids }
    }

    /// Converts a single input.
    pub fn convert(&self, input: PublishInput) -> MetricEvent {
        let PublishInput {
            event_name,
            time_ms,
            measure,
            scope,
            mut attributes,
        } = input;

        attributes.retain(|key, _| {
            let reserved = RESERVED_FIELDS.contains(&key.as_str());
            if reserved {
                pulse_log::debug!(event_name = %event_name, "dropping reserved attribute {key}");
            }
            !reserved
        });

        let measure = match measure {
            MeasureInput::Multi { measures } if !measures.is_empty() => {
                Measure::Measures(measures)
            }
            MeasureInput::Multi { .. } => Measure::Value(DEFAULT_METRIC_EVENT_VALUE),
            MeasureInput::Single { value } => {
                Measure::Value(value.unwrap_or(DEFAULT_METRIC_EVENT_VALUE))
            }
        };

        let scope = match scope {
            ScopeInput::Team { team_id } => EventScope::Team(team_id),
            ScopeInput::Generic { id } => {
                EventScope::Generic(id.unwrap_or_else(|| self.ids.generate()))
            }
        };

        MetricEvent {
            time_ms: time_ms.unwrap_or_else(|| self.clock.now_ms()),
            event_name,
            measure,
            scope,
            attributes,
        }
    }

    /// Converts all inputs, preserving their order.
    pub fn convert_all<I>(&self, inputs: I) -> Vec<MetricEvent>
    where
        I: IntoIterator<Item = PublishInput>,
    {
        inputs.into_iter().map(|input| self.convert(input)).collect()
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(RandomIdGenerator))
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("clock", &self.clock)
            .field("ids", &self.ids)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pulse_common::{FixedClock, Uuid};
    use serde_json::json;

    use super::*;
    use crate::event::MeasureValue;

    const NOW: u64 = 1_700_000_000_000;

    fn converter() -> Converter {
        Converter::new(Arc::new(FixedClock::new(NOW)), Arc::new(RandomIdGenerator))
    }

    fn team_id() -> Uuid {
        Uuid::parse_str("12345e6f-8e12-49bd-9789-b807608ad3c2").unwrap()
    }

    #[test]
    fn test_value_zero_is_kept() {
        let event = converter().convert(PublishInput::generic("Event").with_value(0.0));
        assert_eq!(event.value(), Some(0.0));
    }

    #[test]
    fn test_missing_value_defaults_to_one() {
        let event = converter().convert(PublishInput::generic("Event"));
        assert_eq!(event.value(), Some(1.0));
        assert_eq!(event.measures(), None);
    }

    #[test]
    fn test_measures_without_value() {
        let event = converter().convert(
            PublishInput::generic("Event")
                .with_measures([("A", MeasureValue::Number(1.0)), ("B", "2".into())]),
        );

        assert_eq!(event.value(), None);
        assert_eq!(event.measures().map(|m| m.len()), Some(2));

        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("value").is_none());
    }

    #[test]
    fn test_empty_measures_default_to_one() {
        let measures: [(&str, MeasureValue); 0] = [];
        let event = converter().convert(PublishInput::generic("Event").with_measures(measures));

        assert_eq!(event.value(), Some(1.0));
    }

    #[test]
    fn test_team_event_has_no_id() {
        let event = converter().convert(PublishInput::team("Event", team_id()));

        assert_eq!(event.team_id(), Some(team_id()));
        assert_eq!(event.id(), None);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["teamId"], json!(team_id()));
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_generic_event_keeps_id() {
        let id = Uuid::new_v4();
        let event = converter().convert(PublishInput::generic("Event").with_id(id));
        assert_eq!(event.id(), Some(id));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let events = converter().convert_all((0..100).map(|_| PublishInput::generic("Event")));

        let ids: HashSet<_> = events.iter().filter_map(MetricEvent::id).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_time_from_clock() {
        let clock = Arc::new(FixedClock::new(NOW));
        let converter = Converter::new(clock.clone(), Arc::new(RandomIdGenerator));

        assert_eq!(converter.convert(PublishInput::generic("Event")).time_ms, NOW);

        clock.set(NOW + 5);
        assert_eq!(converter.convert(PublishInput::generic("Event")).time_ms, NOW + 5);
    }

    #[test]
    fn test_time_from_input() {
        let event = converter().convert(PublishInput::generic("Event").with_time_ms(7));
        assert_eq!(event.time_ms, 7);
    }

    #[test]
    fn test_reserved_attributes_dropped() {
        let event = converter().convert(
            PublishInput::team("Event", team_id())
                .with_attribute("planType", "DEVELOPER")
                .with_attribute("timeMs", 0)
                .with_attribute("id", "not-an-id"),
        );

        assert_eq!(
            serde_json::Value::Object(event.attributes),
            json!({"planType": "DEVELOPER"})
        );
    }

    #[test]
    fn test_convert_all_preserves_order() {
        let names: Vec<_> = converter()
            .convert_all([PublishInput::generic("A"), PublishInput::generic("B")])
            .into_iter()
            .map(|event| event.event_name)
            .collect();

        assert_eq!(names, ["A", "B"]);
    }
}

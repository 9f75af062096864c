/// The value of single-measure events that do not specify one.
pub const DEFAULT_METRIC_EVENT_VALUE: f64 = 1.0;

/// The `name` attribute of all metric event messages.
pub const METRICS_EVENT_ATTRIBUTE: &str = "MetricsEvent";

/// Canonical event fields that pass-through attributes cannot override.
pub const RESERVED_FIELDS: &[&str] = &["eventName", "timeMs", "value", "measures", "teamId", "id"];

/// Message reported to the error observer when publishing fails without an error value.
pub const UNRECOGNIZED_FAILURE_MESSAGE: &str =
    "failure caught when attempting to publish metrics event(s) is not a recognized error";

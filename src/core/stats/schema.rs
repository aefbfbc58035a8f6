use serde::{Deserialize, Serialize};

use super::sink::Gauge;

/// Descriptive metadata for a derived/composite expression.
///
/// References already-registered gauges by their dotted names and
/// carries a human-readable description, an optional unit, and labels.
/// Failing to register one of these never affects the numeric gauges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionSchema {
    pub name: String,
    pub description: String,
    pub unit: Option<String>,
    pub labels: Vec<(String, String)>,
    pub gauge_names: Vec<String>,
}

impl ExpressionSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            unit: None,
            labels: Vec::new(),
            gauge_names: Vec::new(),
        }
    }

    pub fn with_unit<S: Into<String>>(mut self, unit: S) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push((key.into(), value.into()));
        self
    }

    /// Reference a gauge by identity (its already-assigned name).
    pub fn referencing(mut self, gauge: &Gauge) -> Self {
        self.gauge_names.push(gauge.name());
        self
    }
}

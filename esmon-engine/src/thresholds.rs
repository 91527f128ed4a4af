//! Warning/critical bounds per metric dimension.

use std::collections::BTreeMap;

use esmon_types::{MetricDimension, Severity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive lower bounds for one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPair {
    pub warning: f64,
    pub critical: f64,
}

impl ThresholdPair {
    pub const fn new(warning: f64, critical: f64) -> Self {
        Self { warning, critical }
    }

    /// Classify `observed`; critical is checked first so a value never
    /// yields both severities.
    pub fn classify(&self, observed: f64) -> Option<(Severity, f64)> {
        if observed >= self.critical {
            Some((Severity::Critical, self.critical))
        } else if observed >= self.warning {
            Some((Severity::Warning, self.warning))
        } else {
            None
        }
    }
}

/// Rejected threshold configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdError {
    #[error("{dimension} threshold must be a finite number (warning {warning}, critical {critical})")]
    NotFinite {
        dimension: MetricDimension,
        warning: f64,
        critical: f64,
    },

    #[error("{dimension} warning threshold {warning} must be below critical threshold {critical}")]
    Inverted {
        dimension: MetricDimension,
        warning: f64,
        critical: f64,
    },

    #[error("{dimension} thresholds must not be negative (warning {warning})")]
    Negative {
        dimension: MetricDimension,
        warning: f64,
    },

    #[error("{0} is not classified against numeric thresholds")]
    NotThresholded(MetricDimension),
}

/// The full threshold table, immutable for the session once validated.
///
/// Defaults: heap 75/85, old-gen GC count 10/50, disk 85/90,
/// file descriptors 80/95, CPU 60/80, memory 80/90.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pairs: BTreeMap<MetricDimension, ThresholdPair>,
}

impl Thresholds {
    /// An empty table: nothing is classified.
    pub fn empty() -> Self {
        Self {
            pairs: BTreeMap::new(),
        }
    }

    pub fn get(&self, dimension: MetricDimension) -> Option<ThresholdPair> {
        self.pairs.get(&dimension).copied()
    }

    /// Replace one dimension's bounds.
    pub fn with(mut self, dimension: MetricDimension, pair: ThresholdPair) -> Self {
        self.set(dimension, pair);
        self
    }

    pub fn set(&mut self, dimension: MetricDimension, pair: ThresholdPair) {
        self.pairs.insert(dimension, pair);
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricDimension, ThresholdPair)> + '_ {
        self.pairs.iter().map(|(d, p)| (*d, *p))
    }

    /// Check every pair. Called once at startup.
    pub fn validate(&self) -> Result<(), ThresholdError> {
        for (&dimension, pair) in &self.pairs {
            let ThresholdPair { warning, critical } = *pair;
            if !MetricDimension::THRESHOLDED.contains(&dimension) {
                return Err(ThresholdError::NotThresholded(dimension));
            }
            if !warning.is_finite() || !critical.is_finite() {
                return Err(ThresholdError::NotFinite {
                    dimension,
                    warning,
                    critical,
                });
            }
            if warning < 0.0 {
                return Err(ThresholdError::Negative { dimension, warning });
            }
            if warning >= critical {
                return Err(ThresholdError::Inverted {
                    dimension,
                    warning,
                    critical,
                });
            }
        }
        Ok(())
    }

    /// Validate and return self.
    pub fn validated(self) -> Result<Self, ThresholdError> {
        self.validate()?;
        Ok(self)
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::empty()
            .with(MetricDimension::HeapPercent, ThresholdPair::new(75.0, 85.0))
            .with(MetricDimension::OldGcCount, ThresholdPair::new(10.0, 50.0))
            .with(MetricDimension::DiskPercent, ThresholdPair::new(85.0, 90.0))
            .with(
                MetricDimension::FileDescriptorPercent,
                ThresholdPair::new(80.0, 95.0),
            )
            .with(MetricDimension::CpuPercent, ThresholdPair::new(60.0, 80.0))
            .with(MetricDimension::MemoryPercent, ThresholdPair::new(80.0, 90.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_complete() {
        let thresholds = Thresholds::default();
        assert!(thresholds.validate().is_ok());
        for dimension in MetricDimension::THRESHOLDED {
            assert!(thresholds.get(dimension).is_some(), "{dimension:?}");
        }
        assert_eq!(
            thresholds.get(MetricDimension::HeapPercent),
            Some(ThresholdPair::new(75.0, 85.0))
        );
    }

    #[test]
    fn bounds_are_inclusive() {
        let pair = ThresholdPair::new(75.0, 85.0);
        assert_eq!(pair.classify(85.0), Some((Severity::Critical, 85.0)));
        assert_eq!(pair.classify(75.0), Some((Severity::Warning, 75.0)));
        assert_eq!(pair.classify(74.9), None);
    }

    #[test]
    fn inverted_pair_is_rejected() {
        let thresholds =
            Thresholds::default().with(MetricDimension::CpuPercent, ThresholdPair::new(90.0, 80.0));
        assert!(matches!(
            thresholds.validate(),
            Err(ThresholdError::Inverted {
                dimension: MetricDimension::CpuPercent,
                ..
            })
        ));
    }

    #[test]
    fn equal_pair_is_rejected() {
        let thresholds =
            Thresholds::empty().with(MetricDimension::DiskPercent, ThresholdPair::new(90.0, 90.0));
        assert!(thresholds.validated().is_err());
    }

    #[test]
    fn non_finite_pair_is_rejected() {
        let thresholds = Thresholds::empty()
            .with(MetricDimension::HeapPercent, ThresholdPair::new(f64::NAN, 85.0));
        assert!(matches!(
            thresholds.validate(),
            Err(ThresholdError::NotFinite { .. })
        ));
    }

    #[test]
    fn status_dimension_cannot_carry_thresholds() {
        let thresholds = Thresholds::empty()
            .with(MetricDimension::ClusterStatus, ThresholdPair::new(1.0, 2.0));
        assert_eq!(
            thresholds.validate(),
            Err(ThresholdError::NotThresholded(MetricDimension::ClusterStatus))
        );
    }

    #[test]
    fn error_message_names_dimension() {
        let err = ThresholdError::Inverted {
            dimension: MetricDimension::MemoryPercent,
            warning: 95.0,
            critical: 90.0,
        };
        assert_eq!(
            err.to_string(),
            "Memory usage warning threshold 95 must be below critical threshold 90"
        );
    }

    #[test]
    fn table_serializes_by_dimension_key() {
        let thresholds = Thresholds::empty()
            .with(MetricDimension::HeapPercent, ThresholdPair::new(70.0, 90.0));
        let json = serde_json::to_value(&thresholds).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "pairs": { "heap_percent": { "warning": 70.0, "critical": 90.0 } }
            })
        );

        let restored: Thresholds = serde_json::from_value(json).unwrap();
        assert_eq!(restored, thresholds);
    }

    #[test]
    fn pair_deserializes_from_config_shape() {
        let pair: ThresholdPair =
            serde_json::from_str(r#"{"warning": 80, "critical": 95}"#).unwrap();
        assert_eq!(pair, ThresholdPair::new(80.0, 95.0));
    }
}

//! Per-tick metrics for the simulation world.
//!
//! [`StepMetrics`] captures timing and separation data for a single tick,
//! enabling telemetry and offline safety analysis without re-running the
//! episode.

/// Timing and separation metrics collected during a single tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepMetrics {
    /// Wall-clock time for the entire tick, in microseconds.
    pub total_us: u64,
    /// Surface-to-surface closest approach between the robot and any
    /// pedestrian during the step interval. `f64::INFINITY` when the
    /// scene has no pedestrians.
    pub min_separation: f64,
    /// Whether the robot intruded inside the discomfort distance this tick.
    pub discomfort: bool,
}

impl Default for StepMetrics {
    fn default() -> Self {
        Self {
            total_us: 0,
            min_separation: f64::INFINITY,
            discomfort: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_report_no_contact() {
        let m = StepMetrics::default();
        assert_eq!(m.total_us, 0);
        assert_eq!(m.min_separation, f64::INFINITY);
        assert!(!m.discomfort);
    }
}

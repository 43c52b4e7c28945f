use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{trace, warn};

const MAX_SAMPLES: usize = 4;
/// Releases later than this after the last sample do not fling.
pub const MAX_START_DELAY_MS: f64 = 50.0;
pub const DEFAULT_DAMPING: f64 = 0.997;

const MIN_SPEED_PX_PER_MS: f64 = 0.2;
const MAX_SPEED_PX_PER_MS: f64 = 7.0;
const MIN_MOVE_PX: f64 = 15.0;
const EPSILON_DISTANCE_PX: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KineticSample {
    pub position: f64,
    pub time_ms: f64,
}

/// Thresholds for one kinetic gesture, in right-offset units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KineticParams {
    pub min_speed: f64,
    pub max_speed: f64,
    pub damping: f64,
    pub min_move: f64,
    pub epsilon: f64,
}

impl KineticParams {
    /// Pixel thresholds expressed in logical units for `bar_spacing`.
    #[must_use]
    pub fn for_bar_spacing(bar_spacing: f64) -> Self {
        let bar_spacing = if bar_spacing > 0.0 { bar_spacing } else { 1.0 };
        Self {
            min_speed: MIN_SPEED_PX_PER_MS / bar_spacing,
            max_speed: MAX_SPEED_PX_PER_MS / bar_spacing,
            damping: DEFAULT_DAMPING,
            min_move: MIN_MOVE_PX / bar_spacing,
            epsilon: EPSILON_DISTANCE_PX / bar_spacing,
        }
    }
}

/// Exponential-decay fling installed once a drag is released.
///
/// `position(t) = p0 + v * (r^t - 1) / ln(r)`, converging on `p0 - v / ln(r)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KineticTrajectory {
    pub start_position: f64,
    pub start_time_ms: f64,
    /// Units per millisecond.
    pub speed: f64,
    pub damping: f64,
    pub duration_ms: f64,
}

impl KineticTrajectory {
    #[must_use]
    pub fn position(self, now_ms: f64) -> f64 {
        let elapsed = now_ms - self.start_time_ms;
        self.start_position + self.speed * (self.damping.powf(elapsed) - 1.0) / self.damping.ln()
    }

    #[must_use]
    pub fn finished(self, now_ms: f64) -> bool {
        let elapsed = now_ms - self.start_time_ms;
        elapsed.min(self.duration_ms) == self.duration_ms
    }

    /// Offset the trajectory converges to.
    #[must_use]
    pub fn limit(self) -> f64 {
        self.start_position - self.speed / self.damping.ln()
    }
}

/// Collects drag samples and turns the release into a `KineticTrajectory`.
#[derive(Debug, Clone, PartialEq)]
pub struct KineticAnimation {
    params: KineticParams,
    /// Newest first.
    samples: SmallVec<[KineticSample; MAX_SAMPLES]>,
}

impl KineticAnimation {
    #[must_use]
    pub fn new(params: KineticParams) -> Self {
        Self {
            params,
            samples: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn params(&self) -> KineticParams {
        self.params
    }

    #[must_use]
    pub fn samples(&self) -> &[KineticSample] {
        &self.samples
    }

    pub fn add_position(&mut self, position: f64, time_ms: f64) {
        if let Some(latest) = self.samples.first_mut() {
            if latest.time_ms == time_ms {
                latest.position = position;
                return;
            }
            if (latest.position - position).abs() < self.params.min_move {
                return;
            }
        }
        if self.samples.len() == MAX_SAMPLES {
            self.samples.pop();
        }
        self.samples.insert(0, KineticSample { position, time_ms });
    }

    /// Weighted release velocity, or `None` when the drag should not fling.
    pub fn start(&self, position: f64, time_ms: f64) -> Option<KineticTrajectory> {
        let (first, second) = match self.samples.as_slice() {
            [first, second, ..] => (*first, *second),
            _ => return None,
        };
        if time_ms - first.time_ms > MAX_START_DELAY_MS {
            warn!(
                delay_ms = time_ms - first.time_ms,
                "kinetic release too late after last sample"
            );
            return None;
        }

        let lead_speed = self.segment_speed(first, second);
        let mut speeds: SmallVec<[(f64, f64); 3]> = SmallVec::new();
        speeds.push((lead_speed, (first.position - second.position).abs()));
        for pair in self.samples.windows(2).skip(1) {
            let speed = self.segment_speed(pair[0], pair[1]);
            if speed.signum() != lead_speed.signum() {
                break;
            }
            speeds.push((speed, (pair[0].position - pair[1].position).abs()));
        }

        let total_distance: f64 = speeds.iter().map(|(_, distance)| distance).sum();
        if total_distance <= 0.0 {
            return None;
        }
        let speed: f64 = speeds
            .iter()
            .map(|(speed, distance)| distance / total_distance * speed)
            .sum();
        if speed.abs() < self.params.min_speed {
            return None;
        }

        let ln_damping = self.params.damping.ln();
        let duration_ms = (self.params.epsilon * ln_damping / -speed.abs()).ln() / ln_damping;
        trace!(speed, duration_ms, samples = self.samples.len(), "kinetic release");
        Some(KineticTrajectory {
            start_position: position,
            start_time_ms: time_ms,
            speed,
            damping: self.params.damping,
            duration_ms,
        })
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }

    fn segment_speed(&self, newer: KineticSample, older: KineticSample) -> f64 {
        let dt = newer.time_ms - older.time_ms;
        if dt <= 0.0 {
            return 0.0;
        }
        let speed = (newer.position - older.position) / dt;
        speed.signum() * speed.abs().min(self.params.max_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::{KineticAnimation, KineticParams};

    fn params() -> KineticParams {
        KineticParams::for_bar_spacing(1.0)
    }

    #[test]
    fn same_timestamp_overwrites_latest_sample() {
        let mut kinetic = KineticAnimation::new(params());
        kinetic.add_position(0.0, 0.0);
        kinetic.add_position(20.0, 10.0);
        kinetic.add_position(25.0, 10.0);
        assert_eq!(kinetic.samples().len(), 2);
        assert_eq!(kinetic.samples()[0].position, 25.0);
    }

    #[test]
    fn small_moves_and_overflow_are_dropped() {
        let mut kinetic = KineticAnimation::new(params());
        kinetic.add_position(0.0, 0.0);
        kinetic.add_position(5.0, 10.0);
        assert_eq!(kinetic.samples().len(), 1);
        for step in 1..=6 {
            kinetic.add_position(f64::from(step) * 20.0, f64::from(step) * 10.0);
        }
        assert_eq!(kinetic.samples().len(), 4);
        assert_eq!(kinetic.samples()[0].position, 120.0);
    }

    #[test]
    fn release_produces_decaying_trajectory() {
        let mut kinetic = KineticAnimation::new(params());
        kinetic.add_position(0.0, 0.0);
        kinetic.add_position(20.0, 10.0);
        kinetic.add_position(40.0, 20.0);
        let trajectory = kinetic.start(40.0, 30.0).expect("fling");
        assert!((trajectory.speed - 2.0).abs() <= 1e-9);
        assert!(trajectory.duration_ms > 0.0);
        assert_eq!(trajectory.position(30.0), 40.0);
        let end = trajectory.position(30.0 + trajectory.duration_ms);
        assert!((trajectory.limit() - end).abs() <= 1.0 + 1e-9);
        assert!(trajectory.finished(31.0 + trajectory.duration_ms));
        assert!(!trajectory.finished(31.0));
    }

    #[test]
    fn late_or_slow_release_does_not_fling() {
        let mut kinetic = KineticAnimation::new(params());
        kinetic.add_position(0.0, 0.0);
        kinetic.add_position(20.0, 10.0);
        assert!(kinetic.start(20.0, 100.0).is_none());

        let mut slow = KineticAnimation::new(params());
        slow.add_position(0.0, 0.0);
        slow.add_position(16.0, 1000.0);
        assert!(slow.start(16.0, 1010.0).is_none());
    }

    #[test]
    fn opposite_direction_segments_are_ignored() {
        let mut kinetic = KineticAnimation::new(params());
        kinetic.add_position(100.0, 0.0);
        kinetic.add_position(0.0, 10.0);
        kinetic.add_position(30.0, 20.0);
        let trajectory = kinetic.start(30.0, 25.0).expect("fling");
        assert!((trajectory.speed - 3.0).abs() <= 1e-9);
    }
}

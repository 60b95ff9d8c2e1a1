//! Robot action types.

/// A single-step control command produced by a policy.
///
/// Two kinematic models are supported, matching the two state field-set
/// variants: holonomic robots command a velocity vector directly, while
/// unicycle robots command a forward speed and a rotation rate (and carry
/// a [`Heading`](crate::Heading) in their state records).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    /// Direct velocity command `(vx, vy)` in world coordinates.
    Holonomic {
        /// Velocity x component.
        vx: f64,
        /// Velocity y component.
        vy: f64,
    },
    /// Forward speed plus rotation rate, applied along the robot heading.
    Unicycle {
        /// Forward speed along the heading.
        v: f64,
        /// Rotation rate in radians per second.
        omega: f64,
    },
}

impl Action {
    /// The null action: full stop.
    pub fn stop() -> Self {
        Self::Holonomic { vx: 0.0, vy: 0.0 }
    }

    /// Whether all components are finite.
    pub fn is_finite(&self) -> bool {
        match *self {
            Self::Holonomic { vx, vy } => vx.is_finite() && vy.is_finite(),
            Self::Unicycle { v, omega } => v.is_finite() && omega.is_finite(),
        }
    }

    /// Commanded speed magnitude, independent of the kinematic model.
    pub fn speed(&self) -> f64 {
        match *self {
            Self::Holonomic { vx, vy } => (vx * vx + vy * vy).sqrt(),
            Self::Unicycle { v, .. } => v.abs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_has_zero_speed() {
        assert_eq!(Action::stop().speed(), 0.0);
        assert!(Action::stop().is_finite());
    }

    #[test]
    fn non_finite_detected() {
        assert!(!Action::Holonomic { vx: f64::NAN, vy: 0.0 }.is_finite());
        assert!(!Action::Unicycle { v: 1.0, omega: f64::INFINITY }.is_finite());
    }

    #[test]
    fn speed_is_magnitude() {
        assert!((Action::Holonomic { vx: 3.0, vy: 4.0 }.speed() - 5.0).abs() < 1e-12);
        assert_eq!(Action::Unicycle { v: -0.7, omega: 0.1 }.speed(), 0.7);
    }
}

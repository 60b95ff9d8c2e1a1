//! Reusable state fixtures.
//!
//! Builders for well-formed records with recognizable field values, so a
//! failing assertion points at the field that moved.

use crowdnav_core::{FullState, JointState, ObservableState, ObstacleState};

/// A robot at the origin, goal 4 m up, radius 0.3, `v_pref` 1.0.
pub fn robot() -> FullState {
    FullState::new(0.0, 0.0, 0.0, 0.0, 0.3, 0.2, 0.0, 4.0, 1.0)
        .unwrap_or_else(|e| panic!("fixture robot must be valid: {e}"))
}

/// A robot with a heading component and an explicit goal radius.
pub fn unicycle_robot() -> FullState {
    robot()
        .with_heading(std::f64::consts::FRAC_PI_2, 0.0)
        .and_then(|s| s.with_goal_radius(0.3))
        .unwrap_or_else(|e| panic!("fixture unicycle robot must be valid: {e}"))
}

/// The `index`-th pedestrian: spaced 1 m apart along x at y = 2, walking
/// down at 0.5 m/s.
pub fn human(index: usize) -> ObservableState {
    #[allow(clippy::cast_precision_loss)]
    let x = index as f64;
    ObservableState::new(x, 2.0, 0.0, -0.5, 0.3, 0.2)
        .unwrap_or_else(|e| panic!("fixture human must be valid: {e}"))
}

/// A pedestrian with a heading component.
pub fn heading_human(index: usize) -> ObservableState {
    human(index)
        .with_heading(-std::f64::consts::FRAC_PI_2, 0.0)
        .unwrap_or_else(|e| panic!("fixture heading human must be valid: {e}"))
}

/// A unit square obstacle centred at `(3, 3)`.
pub fn square_obstacle() -> ObstacleState {
    ObstacleState::new(
        3.0,
        3.0,
        0.0,
        0.0,
        [[2.5, 2.5], [3.5, 2.5], [3.5, 3.5], [2.5, 3.5]],
    )
    .unwrap_or_else(|e| panic!("fixture obstacle must be valid: {e}"))
}

/// A joint state with `n_humans` pedestrians and no obstacles.
pub fn joint_state(n_humans: usize) -> JointState {
    JointState::new(robot(), (0..n_humans).map(human).collect(), vec![])
}

/// A joint state with `n_humans` pedestrians and the square obstacle.
pub fn joint_state_with_obstacle(n_humans: usize) -> JointState {
    JointState::new(
        robot(),
        (0..n_humans).map(human).collect(),
        vec![square_obstacle()],
    )
}

//! Seeded initial placement of the robot and pedestrians.
//!
//! Placement is rejection-sampled: a candidate start position is redrawn
//! until it clears every already-placed agent by the personal-space margin.
//! After [`RELAX_AFTER`] failed draws the margin drops to bare collision
//! radii so that crowded configurations still terminate. A scene too dense
//! to clear even the bare radii is abandoned after [`GIVE_UP_AFTER`] draws
//! with a [`PlacementExhausted`] rather than spinning.

use rand::RngExt;
use rand_chacha::ChaCha8Rng;

use crate::config::{EnvConfig, Scenario};

/// Rejection-sampling attempts before the spacing margin is relaxed.
const RELAX_AFTER: u32 = 300;

/// Total attempts per pedestrian before placement is abandoned.
const GIVE_UP_AFTER: u32 = RELAX_AFTER * 4;

/// Placement ran out of attempts for one pedestrian.
///
/// Raised only for scenes whose geometry cannot hold `human_num` agents at
/// their collision radii, which numeric validation alone cannot rule out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PlacementExhausted {
    /// Zero-based index of the pedestrian that could not be placed.
    pub agent_index: usize,
    /// Number of candidate draws consumed for that pedestrian.
    pub attempts: u32,
}

/// Start pose and goal for one agent, produced by the placement rules.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Placement {
    /// Start x.
    pub px: f64,
    /// Start y.
    pub py: f64,
    /// Goal x.
    pub gx: f64,
    /// Goal y.
    pub gy: f64,
}

impl Placement {
    fn distance_to(&self, other: &Placement) -> f64 {
        (self.px - other.px).hypot(self.py - other.py)
    }

    fn goal_distance_to(&self, other: &Placement) -> f64 {
        (self.gx - other.gx).hypot(self.gy - other.gy)
    }
}

/// Fixed robot placement for the configured scenario: bottom of the scene,
/// goal straight across.
pub(crate) fn robot_placement(config: &EnvConfig) -> Placement {
    let extent = match config.scenario {
        Scenario::CircleCrossing { circle_radius } => circle_radius,
        Scenario::SquareCrossing { square_width } => square_width / 2.0,
    };
    Placement {
        px: 0.0,
        py: -extent,
        gx: 0.0,
        gy: extent,
    }
}

/// Draw start poses and goals for `config.human_num` pedestrians.
///
/// The robot placement participates in the spacing checks so no pedestrian
/// spawns on top of the robot or its goal.
pub(crate) fn human_placements(
    rng: &mut ChaCha8Rng,
    config: &EnvConfig,
) -> Result<Vec<Placement>, PlacementExhausted> {
    let robot = robot_placement(config);
    let mut placed: Vec<Placement> = Vec::with_capacity(config.human_num);
    for agent_index in 0..config.human_num {
        let mut attempts = 0u32;
        let placement = loop {
            if attempts >= GIVE_UP_AFTER {
                return Err(PlacementExhausted {
                    agent_index,
                    attempts,
                });
            }
            let margin = if attempts < RELAX_AFTER {
                config.human.personal_space.max(config.robot.personal_space)
            } else {
                0.0
            };
            let candidate = match config.scenario {
                Scenario::CircleCrossing { circle_radius } => {
                    circle_candidate(rng, circle_radius, config.human.v_pref)
                }
                Scenario::SquareCrossing { square_width } => square_candidate(rng, square_width),
            };
            if clears(&candidate, &robot, config, margin)
                && placed.iter().all(|p| clears(&candidate, p, config, margin))
            {
                break candidate;
            }
            attempts += 1;
        };
        placed.push(placement);
    }
    Ok(placed)
}

/// Candidate on a circle with angular jitter proportional to walking speed,
/// goal at the antipodal point.
fn circle_candidate(rng: &mut ChaCha8Rng, circle_radius: f64, v_pref: f64) -> Placement {
    let angle: f64 = rng.random_range(0.0..std::f64::consts::TAU);
    let jitter_x = (rng.random::<f64>() - 0.5) * v_pref;
    let jitter_y = (rng.random::<f64>() - 0.5) * v_pref;
    let px = circle_radius * angle.cos() + jitter_x;
    let py = circle_radius * angle.sin() + jitter_y;
    Placement {
        px,
        py,
        gx: -px,
        gy: -py,
    }
}

/// Candidate crossing the square side to side: start in one half, goal at
/// the opposite edge.
fn square_candidate(rng: &mut ChaCha8Rng, square_width: f64) -> Placement {
    let sign = if rng.random::<bool>() { 1.0 } else { -1.0 };
    let half = square_width / 2.0;
    Placement {
        px: sign * rng.random_range(0.0..half),
        py: rng.random_range(-half..half),
        gx: -sign * half,
        gy: rng.random_range(-half..half),
    }
}

/// Whether `candidate` keeps `margin` clearance from `other`, both at the
/// start positions and between goals (agents converging on the same goal
/// collide late in the episode).
fn clears(candidate: &Placement, other: &Placement, config: &EnvConfig, margin: f64) -> bool {
    let min_sep = config.human.radius + config.robot.radius.max(config.human.radius) + margin;
    candidate.distance_to(other) >= min_sep && candidate.goal_distance_to(other) >= min_sep
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn robot_crosses_the_scene_bottom_to_top() {
        let config = EnvConfig::default();
        let p = robot_placement(&config);
        assert_eq!(p.px, 0.0);
        assert!(p.py < 0.0);
        assert_eq!(p.gy, -p.py);
    }

    #[test]
    fn circle_goals_are_antipodal() {
        let config = EnvConfig::default();
        let placements = human_placements(&mut rng(7), &config).unwrap();
        assert_eq!(placements.len(), config.human_num);
        for p in &placements {
            assert_eq!(p.gx, -p.px);
            assert_eq!(p.gy, -p.py);
        }
    }

    #[test]
    fn placements_respect_spacing() {
        let config = EnvConfig::default();
        let placements = human_placements(&mut rng(21), &config).unwrap();
        let min_sep = config.human.radius * 2.0;
        for (i, a) in placements.iter().enumerate() {
            for b in &placements[i + 1..] {
                assert!(a.distance_to(b) >= min_sep, "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn same_seed_same_placements() {
        let config = EnvConfig::default();
        let a = human_placements(&mut rng(42), &config).unwrap();
        let b = human_placements(&mut rng(42), &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let config = EnvConfig::default();
        let a = human_placements(&mut rng(1), &config).unwrap();
        let b = human_placements(&mut rng(2), &config).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn square_crossing_starts_inside_goal_on_edge() {
        let config = EnvConfig {
            scenario: Scenario::SquareCrossing { square_width: 10.0 },
            ..EnvConfig::default()
        };
        let placements = human_placements(&mut rng(3), &config).unwrap();
        for p in &placements {
            assert!(p.px.abs() <= 5.0 && p.py.abs() <= 5.0);
            assert_eq!(p.gx.abs(), 5.0);
            // Goal is on the side opposite the start half.
            assert!(p.gx * p.px <= 0.0);
        }
    }

    #[test]
    fn dense_crowd_still_terminates() {
        // 10 pedestrians on a small circle exercises the relaxed-margin path.
        let config = EnvConfig {
            human_num: 10,
            scenario: Scenario::CircleCrossing { circle_radius: 2.0 },
            ..EnvConfig::default()
        };
        let placements = human_placements(&mut rng(5), &config).unwrap();
        assert_eq!(placements.len(), 10);
    }

    #[test]
    fn impossible_density_gives_up_instead_of_spinning() {
        // 50 pedestrians of radius 0.3 cannot fit around a 0.2 m circle.
        let config = EnvConfig {
            human_num: 50,
            scenario: Scenario::CircleCrossing { circle_radius: 0.2 },
            ..EnvConfig::default()
        };
        let err = human_placements(&mut rng(11), &config).unwrap_err();
        assert_eq!(err.attempts, super::GIVE_UP_AFTER);
        assert!(err.agent_index < 50);
    }
}

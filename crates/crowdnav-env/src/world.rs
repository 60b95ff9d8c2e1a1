//! Lockstep crowd-navigation world.
//!
//! [`CrowdWorld`] is the primary user-facing API for running episodes.
//! Each call to [`step_sync()`](CrowdWorld::step_sync) validates the robot
//! action, integrates every agent over one timestep, detects collisions and
//! goal arrival, computes the shaped reward, and returns a fresh
//! [`JointState`] snapshot.
//!
//! # Ownership model
//!
//! `CrowdWorld` is [`Send`] and steps under `&mut self`. Snapshots are
//! owned values: a consumer that queues them (replay-buffer ingestion)
//! holds its own copy and never aliases world internals.

use std::error::Error;
use std::fmt;
use std::time::Instant;

use crowdnav_core::{
    Action, FullState, JointState, ObservableState, ObstacleState, StateError, TickId,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::{ConfigError, EnvConfig, Kinematics};
use crate::metrics::StepMetrics;
use crate::reward::RewardTerms;
use crate::scenario::{human_placements, robot_placement, PlacementExhausted};

// ── Termination ────────────────────────────────────────────────────

/// Why an episode ended. Reported as data in [`StepOutcome`], never as an
/// error: all three are ordinary outcomes of a well-formed episode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The robot entered its goal tolerance radius.
    ReachedGoal,
    /// The robot touched a pedestrian or an obstacle.
    Collision,
    /// The episode time limit elapsed first.
    Timeout,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReachedGoal => write!(f, "reached goal"),
            Self::Collision => write!(f, "collision"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

// ── StepError ──────────────────────────────────────────────────────

/// Contract-level failures of [`CrowdWorld::step_sync()`].
///
/// Episode outcomes (goal, collision, timeout) are **not** errors; they
/// arrive as [`Termination`] in the [`StepOutcome`].
#[derive(Debug, PartialEq)]
pub enum StepError {
    /// The episode already terminated; call [`CrowdWorld::reset()`] first.
    EpisodeFinished,
    /// The action contains a NaN or infinite component.
    NonFiniteAction {
        /// The offending action.
        action: Action,
    },
    /// The action variant does not match the configured robot kinematics.
    KinematicsMismatch {
        /// The kinematic model the world was configured with.
        expected: Kinematics,
    },
    /// Integration produced a state record violating its contracts.
    Contract(StateError),
    /// The reset seed produced a scene too dense to place every pedestrian.
    PlacementFailed {
        /// Zero-based index of the pedestrian that could not be placed.
        agent_index: usize,
        /// Number of candidate draws consumed before giving up.
        attempts: u32,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EpisodeFinished => {
                write!(f, "episode already terminated; reset before stepping")
            }
            Self::NonFiniteAction { action } => {
                write!(f, "action has non-finite components: {action:?}")
            }
            Self::KinematicsMismatch { expected } => {
                write!(f, "action variant does not match {expected:?} kinematics")
            }
            Self::Contract(e) => write!(f, "state contract violated during step: {e}"),
            Self::PlacementFailed {
                agent_index,
                attempts,
            } => write!(
                f,
                "no clear spot for pedestrian {agent_index} after {attempts} draws"
            ),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Contract(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StateError> for StepError {
    fn from(e: StateError) -> Self {
        Self::Contract(e)
    }
}

impl From<PlacementExhausted> for StepError {
    fn from(e: PlacementExhausted) -> Self {
        Self::PlacementFailed {
            agent_index: e.agent_index,
            attempts: e.attempts,
        }
    }
}

// ── StepOutcome ────────────────────────────────────────────────────

/// Result of a successful [`CrowdWorld::step_sync()`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    /// Owned snapshot of the world after this tick.
    pub state: JointState,
    /// Scalar reward for this step (the sum of `terms`).
    pub reward: f64,
    /// Reward decomposition for telemetry.
    pub terms: RewardTerms,
    /// Episode termination, if this step ended it.
    pub event: Option<Termination>,
    /// Timing and separation metrics for this tick.
    pub metrics: StepMetrics,
}

// ── Agent bodies ───────────────────────────────────────────────────

/// Mutable integration state of the robot between snapshots.
struct RobotBody {
    px: f64,
    py: f64,
    theta: f64,
    vx: f64,
    vy: f64,
    vr: f64,
    gx: f64,
    gy: f64,
}

/// Mutable integration state of one pedestrian.
struct HumanBody {
    px: f64,
    py: f64,
    vx: f64,
    vy: f64,
    gx: f64,
    gy: f64,
}

impl HumanBody {
    /// Goal-seek velocity: straight toward the goal at `v_pref`, arriving
    /// exactly when closer than one step's travel.
    fn desired_velocity(&self, v_pref: f64, dt: f64) -> (f64, f64) {
        let (dx, dy) = (self.gx - self.px, self.gy - self.py);
        let dist = dx.hypot(dy);
        if dist < 1e-9 {
            (0.0, 0.0)
        } else if dist < v_pref * dt {
            (dx / dt, dy / dt)
        } else {
            (dx / dist * v_pref, dy / dist * v_pref)
        }
    }
}

// ── CrowdWorld ─────────────────────────────────────────────────────

/// Single-threaded crowd-navigation world for lockstep execution.
///
/// Created from an [`EnvConfig`] via [`new()`](CrowdWorld::new), which
/// validates the configuration and runs the first [`reset()`](CrowdWorld::reset)
/// with the configured seed.
///
/// # Example
///
/// ```ignore
/// let mut world = CrowdWorld::new(EnvConfig::default())?;
/// let mut state = world.reset(7)?;
/// loop {
///     let outcome = world.step_sync(policy.predict(&state))?;
///     state = outcome.state;
///     if outcome.event.is_some() { break; }
/// }
/// ```
pub struct CrowdWorld {
    config: EnvConfig,
    seed: u64,
    robot: RobotBody,
    humans: Vec<HumanBody>,
    obstacles: Vec<ObstacleState>,
    tick: TickId,
    global_time: f64,
    finished: bool,
    last_metrics: StepMetrics,
}

impl CrowdWorld {
    /// Create a world from a validated configuration and place the first
    /// episode using `config.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if [`EnvConfig::validate()`] fails, or
    /// [`ConfigError::InvalidScenario`] if the scene is too dense to place
    /// every pedestrian at its collision radius.
    pub fn new(config: EnvConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut obstacles = Vec::with_capacity(config.obstacles.len());
        for (index, spec) in config.obstacles.iter().enumerate() {
            let obstacle = ObstacleState::new(
                spec.px,
                spec.py,
                spec.theta,
                spec.radius,
                spec.vertices.iter().copied(),
            )
            .map_err(|source| ConfigError::InvalidObstacle { index, source })?;
            obstacles.push(obstacle);
        }
        let seed = config.seed;
        let mut world = Self {
            config,
            seed,
            robot: RobotBody {
                px: 0.0,
                py: 0.0,
                theta: 0.0,
                vx: 0.0,
                vy: 0.0,
                vr: 0.0,
                gx: 0.0,
                gy: 0.0,
            },
            humans: Vec::new(),
            obstacles,
            tick: TickId(0),
            global_time: 0.0,
            finished: false,
            last_metrics: StepMetrics::default(),
        };
        world.place_agents(seed).map_err(|e| {
            ConfigError::InvalidScenario {
                reason: format!(
                    "scene cannot hold {} pedestrians: no clear spot for pedestrian {} after {} draws",
                    world.config.human_num, e.agent_index, e.attempts
                ),
            }
        })?;
        Ok(world)
    }

    /// Start a new episode with the given seed and return its initial state.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::PlacementFailed`] if this seed's draws cannot
    /// place every pedestrian, or [`StepError::Contract`] if the placed
    /// agents violate the state contracts. Neither can occur for a
    /// configuration already accepted by [`CrowdWorld::new()`] except in
    /// scenes packed near their geometric capacity.
    pub fn reset(&mut self, seed: u64) -> Result<JointState, StepError> {
        self.place_agents(seed)?;
        self.snapshot().map_err(StepError::from)
    }

    /// Execute one tick synchronously.
    ///
    /// Clamps the commanded speed to the robot's `v_pref`, integrates all
    /// agents over one timestep, detects collisions (closest approach over
    /// the step interval) and goal arrival, and returns the shaped reward,
    /// termination event, and a fresh snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StepError`] for contract failures only; episode outcomes
    /// are reported in [`StepOutcome::event`].
    pub fn step_sync(&mut self, action: Action) -> Result<StepOutcome, StepError> {
        let started = Instant::now();
        if self.finished {
            return Err(StepError::EpisodeFinished);
        }
        if !action.is_finite() {
            return Err(StepError::NonFiniteAction { action });
        }
        let dt = self.config.time_step;

        // Resolve the robot velocity for this step.
        let (rvx, rvy, theta, vr) = match (self.config.robot.kinematics, action) {
            (Kinematics::Holonomic, Action::Holonomic { vx, vy }) => {
                let (vx, vy) = clamp_speed(vx, vy, self.config.robot.v_pref);
                (vx, vy, self.robot.theta, 0.0)
            }
            (Kinematics::Unicycle, Action::Unicycle { v, omega }) => {
                let v = v.clamp(-self.config.robot.v_pref, self.config.robot.v_pref);
                let theta = self.robot.theta + omega * dt;
                (v * theta.cos(), v * theta.sin(), theta, omega)
            }
            (expected, _) => return Err(StepError::KinematicsMismatch { expected }),
        };

        // Pedestrian velocities for this step.
        let human_vels: Vec<(f64, f64)> = self
            .humans
            .iter()
            .map(|h| h.desired_velocity(self.config.human.v_pref, dt))
            .collect();

        // Closest approach between robot and each pedestrian over [0, dt],
        // using the velocities about to be applied.
        let mut min_separation = f64::INFINITY;
        for (h, &(hvx, hvy)) in self.humans.iter().zip(&human_vels) {
            let sep = closest_approach(
                h.px - self.robot.px,
                h.py - self.robot.py,
                hvx - rvx,
                hvy - rvy,
                dt,
            ) - (self.config.robot.radius + self.config.human.radius);
            min_separation = min_separation.min(sep);
        }

        // Integrate.
        let prev_goal_dist = self.goal_distance();
        self.robot.px += rvx * dt;
        self.robot.py += rvy * dt;
        self.robot.vx = rvx;
        self.robot.vy = rvy;
        self.robot.theta = theta;
        self.robot.vr = vr;
        for (h, (hvx, hvy)) in self.humans.iter_mut().zip(human_vels) {
            h.px += hvx * dt;
            h.py += hvy * dt;
            h.vx = hvx;
            h.vy = hvy;
        }
        self.global_time += dt;
        self.tick = TickId(self.tick.0 + 1);

        // Obstacle clearance at the post-step position.
        let obstacle_hit = self.obstacles.iter().any(|o| {
            surface_distance(self.robot.px, self.robot.py, o) < self.config.robot.radius
        });

        // Outcome precedence: collision, then goal, then timeout.
        let goal_dist = self.goal_distance();
        let event = if min_separation < 0.0 || obstacle_hit {
            Some(Termination::Collision)
        } else if goal_dist < self.config.goal_radius() {
            Some(Termination::ReachedGoal)
        } else if self.global_time >= self.config.time_limit - 1e-9 {
            Some(Termination::Timeout)
        } else {
            None
        };
        self.finished = event.is_some();

        let terms = RewardTerms::compute(
            &self.config.reward,
            event,
            min_separation,
            prev_goal_dist - goal_dist,
            dt,
        );
        let state = self.snapshot()?;
        let metrics = StepMetrics {
            total_us: u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
            min_separation,
            discomfort: min_separation < self.config.reward.discomfort_dist,
        };
        self.last_metrics = metrics;
        Ok(StepOutcome {
            state,
            reward: terms.total(),
            terms,
            event,
            metrics,
        })
    }

    /// Owned snapshot of the current world state.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if a record constructor rejects the current
    /// integration state. Unreachable for validated configurations.
    pub fn snapshot(&self) -> Result<JointState, StateError> {
        let r = &self.config.robot;
        let mut self_state = FullState::new(
            self.robot.px,
            self.robot.py,
            self.robot.vx,
            self.robot.vy,
            r.radius,
            r.personal_space,
            self.robot.gx,
            self.robot.gy,
            r.v_pref,
        )?;
        if r.kinematics == Kinematics::Unicycle {
            self_state = self_state.with_heading(self.robot.theta, self.robot.vr)?;
        }
        if let Some(gr) = r.goal_radius {
            self_state = self_state.with_goal_radius(gr)?;
        }
        let mut human_states = Vec::with_capacity(self.humans.len());
        for h in &self.humans {
            human_states.push(ObservableState::new(
                h.px,
                h.py,
                h.vx,
                h.vy,
                self.config.human.radius,
                self.config.human.personal_space,
            )?);
        }
        Ok(JointState::new(
            self_state,
            human_states,
            self.obstacles.clone(),
        ))
    }

    /// Current tick ID (0 after construction or reset).
    pub fn current_tick(&self) -> TickId {
        self.tick
    }

    /// Simulated seconds elapsed in the current episode.
    pub fn global_time(&self) -> f64 {
        self.global_time
    }

    /// Whether the current episode has terminated.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Metrics from the most recent successful tick.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// The seed of the current episode.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The configuration this world was built from.
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Euclidean distance from the robot centre to its goal.
    fn goal_distance(&self) -> f64 {
        (self.robot.gx - self.robot.px).hypot(self.robot.gy - self.robot.py)
    }

    /// Draw a fresh episode layout and reset all counters.
    fn place_agents(&mut self, seed: u64) -> Result<(), PlacementExhausted> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let rp = robot_placement(&self.config);
        // Unicycle robots start facing their goal.
        let theta = (rp.gy - rp.py).atan2(rp.gx - rp.px);
        self.robot = RobotBody {
            px: rp.px,
            py: rp.py,
            theta,
            vx: 0.0,
            vy: 0.0,
            vr: 0.0,
            gx: rp.gx,
            gy: rp.gy,
        };
        self.humans = human_placements(&mut rng, &self.config)?
            .into_iter()
            .map(|p| HumanBody {
                px: p.px,
                py: p.py,
                vx: 0.0,
                vy: 0.0,
                gx: p.gx,
                gy: p.gy,
            })
            .collect();
        self.seed = seed;
        self.tick = TickId(0);
        self.global_time = 0.0;
        self.finished = false;
        self.last_metrics = StepMetrics::default();
        Ok(())
    }
}

impl fmt::Debug for CrowdWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrowdWorld")
            .field("tick", &self.tick)
            .field("seed", &self.seed)
            .field("global_time", &self.global_time)
            .field("humans", &self.humans.len())
            .field("obstacles", &self.obstacles.len())
            .field("finished", &self.finished)
            .finish()
    }
}

// ── Geometry ───────────────────────────────────────────────────────

/// Scale a velocity vector down to `max_speed` if it exceeds it.
fn clamp_speed(vx: f64, vy: f64, max_speed: f64) -> (f64, f64) {
    let speed = vx.hypot(vy);
    if speed > max_speed {
        let scale = max_speed / speed;
        (vx * scale, vy * scale)
    } else {
        (vx, vy)
    }
}

/// Minimum centre-to-centre distance over `t ∈ [0, dt]` for relative
/// position `(dx, dy)` and relative velocity `(dvx, dvy)`.
fn closest_approach(dx: f64, dy: f64, dvx: f64, dvy: f64, dt: f64) -> f64 {
    let v_sq = dvx * dvx + dvy * dvy;
    let t = if v_sq < 1e-12 {
        0.0
    } else {
        (-(dx * dvx + dy * dvy) / v_sq).clamp(0.0, dt)
    };
    (dx + dvx * t).hypot(dy + dvy * t)
}

/// Distance from a point to the obstacle surface: the polygon outline (or
/// disc centre for a vertex-free obstacle) minus the inflation radius.
/// Zero when the point is inside the polygon.
fn surface_distance(px: f64, py: f64, obstacle: &ObstacleState) -> f64 {
    let vertices = obstacle.vertices();
    if vertices.is_empty() {
        return ((px - obstacle.px()).hypot(py - obstacle.py()) - obstacle.radius()).max(0.0);
    }
    if point_in_polygon(px, py, vertices) {
        return 0.0;
    }
    let mut best = f64::INFINITY;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        best = best.min(point_segment_distance(px, py, a, b));
    }
    (best - obstacle.radius()).max(0.0)
}

/// Distance from `(px, py)` to segment `ab`.
fn point_segment_distance(px: f64, py: f64, a: [f64; 2], b: [f64; 2]) -> f64 {
    let (abx, aby) = (b[0] - a[0], b[1] - a[1]);
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq < 1e-12 {
        0.0
    } else {
        (((px - a[0]) * abx + (py - a[1]) * aby) / len_sq).clamp(0.0, 1.0)
    };
    (px - a[0] - abx * t).hypot(py - a[1] - aby * t)
}

/// Even-odd ray cast.
fn point_in_polygon(px: f64, py: f64, vertices: &[[f64; 2]]) -> bool {
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (xi, yi) = (vertices[i][0], vertices[i][1]);
        let (xj, yj) = (vertices[j][0], vertices[j][1]);
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

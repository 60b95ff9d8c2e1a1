//! Per-agent state records and the per-tick [`JointState`] aggregate.
//!
//! All records are immutable value objects: fields are private, set once at
//! construction, and exposed through accessors. Derived views (`position`,
//! `velocity`, `pose`, `goal_position`) are recomputed from the primary
//! scalars on every access, so they can never diverge from them.
//!
//! Numeric contracts (`radius > 0`, `personal_space >= 0`, `v_pref > 0`,
//! all fields finite) are enforced in the constructors. Aggregation into a
//! [`JointState`] is infallible: the type system rules out wrong-kind
//! members, and numeric validity was established when each member was built.
//!
//! Heading (`theta`) and angular velocity (`vr`) form an optional
//! [`Heading`] component. A record built without one serializes and encodes
//! without those two fields; the declared field order is otherwise fixed
//! and documented per record.

use smallvec::SmallVec;

use crate::error::StateError;
use crate::id::AgentId;
use crate::traits::FeatureEncode;

/// A 2D polygon vertex, `[x, y]` in world coordinates.
pub type Vertex = [f64; 2];

/// Vertex storage for obstacle outlines.
///
/// Inline capacity of 8 covers rectangular and typical convex obstacles
/// without heap allocation; larger polygons spill transparently.
pub type VertexList = SmallVec<[Vertex; 8]>;

fn finite(field: &'static str, value: f64) -> Result<f64, StateError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(StateError::NonFinite { field, value })
    }
}

fn positive(field: &'static str, value: f64) -> Result<f64, StateError> {
    let value = finite(field, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(StateError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, StateError> {
    let value = finite(field, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(StateError::Negative { field, value })
    }
}

// ── Heading ─────────────────────────────────────────────────────

/// Optional orientation component of an agent state.
///
/// The source data has two field-set variants, with and without explicit
/// orientation. Rather than two incompatible record types, orientation is
/// a single optional component attached at construction via
/// [`ObservableState::with_heading`] / [`FullState::with_heading`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Heading {
    /// Heading angle in radians.
    pub theta: f64,
    /// Angular velocity in radians per second.
    pub vr: f64,
}

// ── ObservableState ─────────────────────────────────────────────

/// The subset of an agent's state visible to other agents.
///
/// Declared field order (the serialization and encoding contract):
/// `px, py, [theta], vx, vy, [vr], radius, personal_space` — the bracketed
/// fields are present only when the record carries a [`Heading`].
///
/// # Examples
///
/// ```
/// use crowdnav_core::{FeatureEncode, ObservableState};
///
/// let s = ObservableState::new(1.0, 2.0, 0.5, -0.5, 0.3, 0.2).unwrap();
/// assert_eq!(s.position(), (1.0, 2.0));
/// assert_eq!(s.velocity(), (0.5, -0.5));
/// assert_eq!(
///     s.to_feature_vector(vec![]),
///     vec![1.0, 2.0, 0.5, -0.5, 0.3, 0.2],
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObservableState {
    px: f64,
    py: f64,
    vx: f64,
    vy: f64,
    radius: f64,
    personal_space: f64,
    heading: Option<Heading>,
}

impl ObservableState {
    /// Construct an observable state without an orientation component.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if `radius <= 0`, `personal_space < 0`,
    /// or any field is non-finite.
    pub fn new(
        px: f64,
        py: f64,
        vx: f64,
        vy: f64,
        radius: f64,
        personal_space: f64,
    ) -> Result<Self, StateError> {
        Ok(Self {
            px: finite("px", px)?,
            py: finite("py", py)?,
            vx: finite("vx", vx)?,
            vy: finite("vy", vy)?,
            radius: positive("radius", radius)?,
            personal_space: non_negative("personal_space", personal_space)?,
            heading: None,
        })
    }

    /// Attach an orientation component, returning the extended record.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::NonFinite`] if `theta` or `vr` is not finite.
    pub fn with_heading(mut self, theta: f64, vr: f64) -> Result<Self, StateError> {
        self.heading = Some(Heading {
            theta: finite("theta", theta)?,
            vr: finite("vr", vr)?,
        });
        Ok(self)
    }

    /// World x position.
    pub fn px(&self) -> f64 {
        self.px
    }

    /// World y position.
    pub fn py(&self) -> f64 {
        self.py
    }

    /// Linear velocity x component.
    pub fn vx(&self) -> f64 {
        self.vx
    }

    /// Linear velocity y component.
    pub fn vy(&self) -> f64 {
        self.vy
    }

    /// Physical radius. Strictly positive.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Personal-space buffer distance. Non-negative.
    pub fn personal_space(&self) -> f64 {
        self.personal_space
    }

    /// The orientation component, if this record carries one.
    pub fn heading(&self) -> Option<Heading> {
        self.heading
    }

    /// Derived view: `(px, py)`.
    pub fn position(&self) -> (f64, f64) {
        (self.px, self.py)
    }

    /// Derived view: `(vx, vy)`.
    pub fn velocity(&self) -> (f64, f64) {
        (self.vx, self.vy)
    }

    /// Derived view: `(px, py, theta)`, with `theta = 0` when the record
    /// has no orientation component.
    pub fn pose(&self) -> (f64, f64, f64) {
        (self.px, self.py, self.heading.map_or(0.0, |h| h.theta))
    }

    /// Distance between the centers of two agents.
    pub fn distance_to(&self, other: &ObservableState) -> f64 {
        let dx = self.px - other.px;
        let dy = self.py - other.py;
        (dx * dx + dy * dy).sqrt()
    }
}

impl FeatureEncode for ObservableState {
    fn feature_len(&self) -> usize {
        if self.heading.is_some() {
            8
        } else {
            6
        }
    }

    fn encode_into(&self, out: &mut Vec<f64>) {
        out.push(self.px);
        out.push(self.py);
        if let Some(h) = self.heading {
            out.push(h.theta);
        }
        out.push(self.vx);
        out.push(self.vy);
        if let Some(h) = self.heading {
            out.push(h.vr);
        }
        out.push(self.radius);
        out.push(self.personal_space);
    }
}

// ── ObstacleState ───────────────────────────────────────────────

/// Snapshot of a static or kinematic obstacle outline.
///
/// Declared field order: `px, py, theta, radius, x1, y1, x2, y2, …` —
/// a variable-length vertex tail whose order is preserved exactly as
/// supplied. Downstream encoders pad or truncate the tail to a fixed
/// maximum vertex count; this layer never reorders it.
#[derive(Clone, Debug, PartialEq)]
pub struct ObstacleState {
    px: f64,
    py: f64,
    theta: f64,
    radius: f64,
    vertices: VertexList,
}

impl ObstacleState {
    /// Construct an obstacle state.
    ///
    /// `radius` is the bounding radius used for coarse proximity checks;
    /// unlike agent radii it may be zero (point obstacles).
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if `radius < 0` or any field or vertex
    /// coordinate is non-finite.
    pub fn new(
        px: f64,
        py: f64,
        theta: f64,
        radius: f64,
        vertices: impl IntoIterator<Item = Vertex>,
    ) -> Result<Self, StateError> {
        let mut list = VertexList::new();
        for [x, y] in vertices {
            list.push([finite("vertex x", x)?, finite("vertex y", y)?]);
        }
        Ok(Self {
            px: finite("px", px)?,
            py: finite("py", py)?,
            theta: finite("theta", theta)?,
            radius: non_negative("radius", radius)?,
            vertices: list,
        })
    }

    /// World x position of the obstacle reference point.
    pub fn px(&self) -> f64 {
        self.px
    }

    /// World y position of the obstacle reference point.
    pub fn py(&self) -> f64 {
        self.py
    }

    /// Obstacle orientation in radians.
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Bounding radius. Non-negative.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Polygon vertices, in the exact order supplied at construction.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Derived view: `(px, py)`.
    pub fn position(&self) -> (f64, f64) {
        (self.px, self.py)
    }

    /// Derived view: `(px, py, theta)`.
    pub fn pose(&self) -> (f64, f64, f64) {
        (self.px, self.py, self.theta)
    }
}

impl FeatureEncode for ObstacleState {
    fn feature_len(&self) -> usize {
        4 + 2 * self.vertices.len()
    }

    fn encode_into(&self, out: &mut Vec<f64>) {
        out.push(self.px);
        out.push(self.py);
        out.push(self.theta);
        out.push(self.radius);
        for [x, y] in &self.vertices {
            out.push(*x);
            out.push(*y);
        }
    }
}

// ── FullState ───────────────────────────────────────────────────

/// The robot's complete internal state: the observable fields plus the
/// goal and preferred speed, which other agents cannot see.
///
/// Declared field order: the [`ObservableState`] fields, then
/// `gx, gy, [gr], v_pref`. The goal radius `gr` is an optional field;
/// records built without one serialize and encode without it.
///
/// # Examples
///
/// ```
/// use crowdnav_core::FullState;
///
/// let s = FullState::new(0.0, 0.0, 0.0, 0.0, 0.3, 0.2, 5.0, 5.0, 1.0)
///     .unwrap()
///     .with_goal_radius(0.3)
///     .unwrap();
/// assert_eq!(s.goal_position(), (5.0, 5.0));
/// assert_eq!(s.goal_radius(), Some(0.3));
/// assert_eq!(s.v_pref(), 1.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FullState {
    base: ObservableState,
    gx: f64,
    gy: f64,
    gr: Option<f64>,
    v_pref: f64,
}

impl FullState {
    /// Construct a full state without orientation or goal-radius components.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the observable-field contracts fail,
    /// `v_pref <= 0`, or any field is non-finite.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        px: f64,
        py: f64,
        vx: f64,
        vy: f64,
        radius: f64,
        personal_space: f64,
        gx: f64,
        gy: f64,
        v_pref: f64,
    ) -> Result<Self, StateError> {
        Ok(Self {
            base: ObservableState::new(px, py, vx, vy, radius, personal_space)?,
            gx: finite("gx", gx)?,
            gy: finite("gy", gy)?,
            gr: None,
            v_pref: positive("v_pref", v_pref)?,
        })
    }

    /// Attach an orientation component, returning the extended record.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::NonFinite`] if `theta` or `vr` is not finite.
    pub fn with_heading(mut self, theta: f64, vr: f64) -> Result<Self, StateError> {
        self.base = self.base.with_heading(theta, vr)?;
        Ok(self)
    }

    /// Attach a goal radius, returning the extended record.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if `gr < 0` or non-finite.
    pub fn with_goal_radius(mut self, gr: f64) -> Result<Self, StateError> {
        self.gr = Some(non_negative("gr", gr)?);
        Ok(self)
    }

    /// The observable projection of this state — what other agents see.
    pub fn observable(&self) -> &ObservableState {
        &self.base
    }

    /// World x position.
    pub fn px(&self) -> f64 {
        self.base.px()
    }

    /// World y position.
    pub fn py(&self) -> f64 {
        self.base.py()
    }

    /// Linear velocity x component.
    pub fn vx(&self) -> f64 {
        self.base.vx()
    }

    /// Linear velocity y component.
    pub fn vy(&self) -> f64 {
        self.base.vy()
    }

    /// Physical radius. Strictly positive.
    pub fn radius(&self) -> f64 {
        self.base.radius()
    }

    /// Personal-space buffer distance. Non-negative.
    pub fn personal_space(&self) -> f64 {
        self.base.personal_space()
    }

    /// The orientation component, if this record carries one.
    pub fn heading(&self) -> Option<Heading> {
        self.base.heading()
    }

    /// Goal x position.
    pub fn gx(&self) -> f64 {
        self.gx
    }

    /// Goal y position.
    pub fn gy(&self) -> f64 {
        self.gy
    }

    /// Goal radius, if this record carries one.
    pub fn goal_radius(&self) -> Option<f64> {
        self.gr
    }

    /// Preferred speed. Strictly positive.
    pub fn v_pref(&self) -> f64 {
        self.v_pref
    }

    /// Derived view: `(px, py)`.
    pub fn position(&self) -> (f64, f64) {
        self.base.position()
    }

    /// Derived view: `(vx, vy)`.
    pub fn velocity(&self) -> (f64, f64) {
        self.base.velocity()
    }

    /// Derived view: `(px, py, theta)`, with `theta = 0` when the record
    /// has no orientation component.
    pub fn pose(&self) -> (f64, f64, f64) {
        self.base.pose()
    }

    /// Derived view: `(gx, gy)`.
    pub fn goal_position(&self) -> (f64, f64) {
        (self.gx, self.gy)
    }

    /// Euclidean distance from the current position to the goal.
    pub fn distance_to_goal(&self) -> f64 {
        let (px, py) = self.position();
        ((self.gx - px).powi(2) + (self.gy - py).powi(2)).sqrt()
    }
}

impl FeatureEncode for FullState {
    fn feature_len(&self) -> usize {
        self.base.feature_len() + 3 + usize::from(self.gr.is_some())
    }

    fn encode_into(&self, out: &mut Vec<f64>) {
        self.base.encode_into(out);
        out.push(self.gx);
        out.push(self.gy);
        if let Some(gr) = self.gr {
            out.push(gr);
        }
        out.push(self.v_pref);
    }
}

// ── JointState ──────────────────────────────────────────────────

/// The full per-tick snapshot handed to a policy for decision-making.
///
/// Aggregates exactly one [`FullState`] (the robot), an ordered collection
/// of [`ObservableState`] pedestrians (order = agent index, stable within a
/// tick), and an ordered, possibly-empty collection of [`ObstacleState`].
/// There is one unified shape: obstacle-free worlds pass an empty vector
/// rather than using a separate record type.
///
/// A `JointState` is a pure snapshot container. It does not mutate its
/// members, owns no simulation logic, and performs no coordinate
/// transforms. A fresh instance is built each decision step; consumers
/// that retain snapshots across steps (e.g. replay-buffer ingestion)
/// clone rather than alias.
///
/// # Examples
///
/// ```
/// use crowdnav_core::{FullState, JointState, ObservableState};
///
/// let robot = FullState::new(0.0, 0.0, 0.0, 0.0, 0.3, 0.2, 5.0, 5.0, 1.0).unwrap();
/// let human = ObservableState::new(2.0, 2.0, -0.3, 0.0, 0.3, 0.25).unwrap();
/// let state = JointState::new(robot, vec![human], vec![]);
///
/// assert_eq!(state.human_states().len(), 1);
/// assert!(state.obstacle_states().is_empty());
/// assert_eq!(state.self_state().goal_position(), (5.0, 5.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct JointState {
    self_state: FullState,
    human_states: Vec<ObservableState>,
    obstacle_states: Vec<ObstacleState>,
}

impl JointState {
    /// Aggregate a snapshot from its members.
    ///
    /// Infallible: member types are enforced statically and each member's
    /// numeric contracts were validated at its own construction.
    pub fn new(
        self_state: FullState,
        human_states: Vec<ObservableState>,
        obstacle_states: Vec<ObstacleState>,
    ) -> Self {
        Self {
            self_state,
            human_states,
            obstacle_states,
        }
    }

    /// Aggregate a snapshot with an explicitly empty obstacle collection.
    pub fn without_obstacles(
        self_state: FullState,
        human_states: Vec<ObservableState>,
    ) -> Self {
        Self::new(self_state, human_states, Vec::new())
    }

    /// The robot's own full state.
    pub fn self_state(&self) -> &FullState {
        &self.self_state
    }

    /// Pedestrian states, ordered by agent index.
    pub fn human_states(&self) -> &[ObservableState] {
        &self.human_states
    }

    /// The pedestrian with the given ID, or `None` if this snapshot has no
    /// agent at that index.
    ///
    /// [`AgentId`]s index [`human_states`](Self::human_states) directly;
    /// the ordering is stable for the lifetime of an episode.
    pub fn human(&self, id: AgentId) -> Option<&ObservableState> {
        self.human_states.get(id.0 as usize)
    }

    /// Obstacle states, in scenario order. May be empty.
    pub fn obstacle_states(&self) -> &[ObstacleState] {
        &self.obstacle_states
    }

    /// Distance from the robot center to the nearest pedestrian center,
    /// or `None` if there are no pedestrians.
    pub fn nearest_human_distance(&self) -> Option<f64> {
        self.human_states
            .iter()
            .map(|h| h.distance_to(self.self_state.observable()))
            .min_by(|a, b| a.total_cmp(b))
    }
}

impl FeatureEncode for JointState {
    fn feature_len(&self) -> usize {
        self.self_state.feature_len()
            + self.human_states.iter().map(|h| h.feature_len()).sum::<usize>()
            + self
                .obstacle_states
                .iter()
                .map(|o| o.feature_len())
                .sum::<usize>()
    }

    /// Self features first, then pedestrians left-to-right in agent-index
    /// order, then obstacles in scenario order.
    fn encode_into(&self, out: &mut Vec<f64>) {
        self.self_state.encode_into(out);
        for h in &self.human_states {
            h.encode_into(out);
        }
        for o in &self.obstacle_states {
            o.encode_into(out);
        }
    }
}

//! Fixed-size tensor encoding of a [`JointState`].
//!
//! A [`JointEncoder`] is compiled once from an [`EncoderConfig`] and then
//! applied to every tick's snapshot. The output tensor layout is fixed at
//! compile time: the self block, then `max_humans` pedestrian slots, then
//! `max_obstacles` obstacle slots whose vertex tails are padded or
//! truncated to `max_vertices`. Slots without a backing record are filled
//! with `pad_value` and marked invalid in the validity mask, so a
//! permutation-sensitive network can distinguish padding from data.
//!
//! Variable-length collections meet the fixed layout under an
//! [`OverflowPolicy`]: reject loudly, or truncate (dropping the records
//! beyond the slot count — slot order equals collection order, so the
//! nearest-indexed records survive).

use crowdnav_core::{FeatureEncode, JointState, ObservableState, ObstacleState};

use crate::error::EncodeError;
use crate::layout::FeatureLayout;

/// What to do when a collection exceeds its slot count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Fail with [`EncodeError::SlotOverflow`].
    Error,
    /// Keep the first records that fit; drop the rest.
    Truncate,
}

/// Configuration compiled into a [`JointEncoder`].
#[derive(Clone, Debug, PartialEq)]
pub struct EncoderConfig {
    /// Number of pedestrian slots.
    pub max_humans: usize,
    /// Number of obstacle slots.
    pub max_obstacles: usize,
    /// Vertex pairs per obstacle slot.
    pub max_vertices: usize,
    /// Whether the robot state carries a heading component
    /// (selects the 8-wide rather than 6-wide field set for the self block).
    pub self_heading: bool,
    /// Whether pedestrian states carry a heading component. Independent of
    /// `self_heading`: a unicycle robot among holonomic pedestrians is the
    /// common case.
    pub human_heading: bool,
    /// Whether the robot state carries a goal radius.
    pub goal_radius: bool,
    /// Fill value for empty slots and vertex padding.
    pub pad_value: f32,
    /// Behavior when a collection exceeds its slots.
    pub overflow: OverflowPolicy,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            max_humans: 5,
            max_obstacles: 0,
            max_vertices: 4,
            self_heading: false,
            human_heading: false,
            goal_radius: false,
            pad_value: 0.0,
            overflow: OverflowPolicy::Error,
        }
    }
}

/// A flat `f32` observation tensor plus its validity mask.
///
/// `values[i]` is meaningful iff `validity[i]`; padding positions hold the
/// configured pad value and are marked invalid.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    values: Vec<f32>,
    validity: Vec<bool>,
}

impl Observation {
    /// The flat feature values.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// The per-element validity mask.
    pub fn validity(&self) -> &[bool] {
        &self.validity
    }

    /// Tensor length.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the tensor is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of valid (non-padding) elements.
    pub fn valid_count(&self) -> usize {
        self.validity.iter().filter(|&&v| v).count()
    }
}

/// Compiled encoder mapping a [`JointState`] to a fixed-size tensor.
///
/// # Examples
///
/// ```
/// use crowdnav_core::{FullState, JointState, ObservableState};
/// use crowdnav_obs::{EncoderConfig, JointEncoder, OverflowPolicy};
///
/// let encoder = JointEncoder::compile(EncoderConfig {
///     max_humans: 2,
///     ..EncoderConfig::default()
/// })
/// .unwrap();
///
/// let robot = FullState::new(0.0, 0.0, 0.0, 0.0, 0.3, 0.2, 5.0, 5.0, 1.0).unwrap();
/// let human = ObservableState::new(2.0, 2.0, -0.3, 0.0, 0.3, 0.25).unwrap();
/// let obs = encoder.encode(&JointState::new(robot, vec![human], vec![])).unwrap();
///
/// // self (9) + 2 human slots (6 each); second slot is padding.
/// assert_eq!(obs.len(), 21);
/// assert_eq!(obs.valid_count(), 15);
/// ```
#[derive(Clone, Debug)]
pub struct JointEncoder {
    config: EncoderConfig,
    layout: FeatureLayout,
}

impl JointEncoder {
    /// Compile a configuration into an encoder, fixing the layout.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::InvalidConfig`] if `pad_value` is not finite
    /// or `max_obstacles > 0` with `max_vertices == 0`.
    pub fn compile(config: EncoderConfig) -> Result<Self, EncodeError> {
        if !config.pad_value.is_finite() {
            return Err(EncodeError::InvalidConfig {
                reason: format!("pad_value must be finite, got {}", config.pad_value),
            });
        }
        if config.max_obstacles > 0 && config.max_vertices == 0 {
            return Err(EncodeError::InvalidConfig {
                reason: "obstacle slots need max_vertices >= 1".into(),
            });
        }

        let human_width = if config.human_heading { 8 } else { 6 };
        let self_width =
            if config.self_heading { 8 } else { 6 } + 3 + usize::from(config.goal_radius);
        let obstacle_width = 4 + 2 * config.max_vertices;

        let mut layout = FeatureLayout::new();
        layout.push("self".into(), self_width);
        for i in 0..config.max_humans {
            layout.push(format!("human[{i}]"), human_width);
        }
        for i in 0..config.max_obstacles {
            layout.push(format!("obstacle[{i}]"), obstacle_width);
        }

        Ok(Self { config, layout })
    }

    /// The compiled layout.
    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    /// Length of the output tensor.
    pub fn output_len(&self) -> usize {
        self.layout.total_len()
    }

    /// Encode a snapshot into a fresh tensor.
    pub fn encode(&self, state: &JointState) -> Result<Observation, EncodeError> {
        let mut obs = Observation {
            values: Vec::with_capacity(self.output_len()),
            validity: Vec::with_capacity(self.output_len()),
        };
        self.encode_into(state, &mut obs)?;
        Ok(obs)
    }

    /// Encode a snapshot, reusing an existing tensor's buffers.
    ///
    /// Clears and refills `out`; the allocation is retained across ticks.
    pub fn encode_into(
        &self,
        state: &JointState,
        out: &mut Observation,
    ) -> Result<(), EncodeError> {
        out.values.clear();
        out.validity.clear();

        self.check_agent_shape(
            "self_state",
            state.self_state().observable(),
            self.config.self_heading,
        )?;
        if state.self_state().goal_radius().is_some() != self.config.goal_radius {
            return Err(EncodeError::ShapeMismatch {
                record: "self_state",
                reason: shape_reason("goal radius", self.config.goal_radius),
            });
        }
        let humans = self.check_slots("humans", state.human_states(), self.config.max_humans)?;
        let obstacles =
            self.check_slots("obstacles", state.obstacle_states(), self.config.max_obstacles)?;
        for h in humans {
            self.check_agent_shape("human_states", h, self.config.human_heading)?;
        }

        let mut scratch = Vec::with_capacity(16);

        // Self block.
        scratch.clear();
        state.self_state().encode_into(&mut scratch);
        push_valid(out, &scratch);

        // Pedestrian slots.
        let human_width = if self.config.human_heading { 8 } else { 6 };
        for h in humans {
            scratch.clear();
            h.encode_into(&mut scratch);
            push_valid(out, &scratch);
        }
        for _ in humans.len()..self.config.max_humans {
            push_padding(out, human_width, self.config.pad_value);
        }

        // Obstacle slots.
        for o in obstacles {
            self.encode_obstacle(o, out, &mut scratch)?;
        }
        let obstacle_width = 4 + 2 * self.config.max_vertices;
        for _ in obstacles.len()..self.config.max_obstacles {
            push_padding(out, obstacle_width, self.config.pad_value);
        }

        debug_assert_eq!(out.values.len(), self.output_len());
        Ok(())
    }

    fn encode_obstacle(
        &self,
        o: &ObstacleState,
        out: &mut Observation,
        scratch: &mut Vec<f64>,
    ) -> Result<(), EncodeError> {
        let kept = match (
            o.vertices().len() > self.config.max_vertices,
            self.config.overflow,
        ) {
            (true, OverflowPolicy::Error) => {
                return Err(EncodeError::SlotOverflow {
                    collection: "vertices",
                    supplied: o.vertices().len(),
                    slots: self.config.max_vertices,
                })
            }
            (true, OverflowPolicy::Truncate) => self.config.max_vertices,
            (false, _) => o.vertices().len(),
        };

        scratch.clear();
        o.encode_into(scratch);
        push_valid(out, &scratch[..4 + 2 * kept]);
        push_padding(
            out,
            2 * (self.config.max_vertices - kept),
            self.config.pad_value,
        );
        Ok(())
    }

    fn check_agent_shape(
        &self,
        record: &'static str,
        s: &ObservableState,
        expect_heading: bool,
    ) -> Result<(), EncodeError> {
        if s.heading().is_some() != expect_heading {
            return Err(EncodeError::ShapeMismatch {
                record,
                reason: shape_reason("heading", expect_heading),
            });
        }
        Ok(())
    }

    fn check_slots<'a, T>(
        &self,
        collection: &'static str,
        records: &'a [T],
        slots: usize,
    ) -> Result<&'a [T], EncodeError> {
        if records.len() <= slots {
            return Ok(records);
        }
        match self.config.overflow {
            OverflowPolicy::Truncate => Ok(&records[..slots]),
            OverflowPolicy::Error => Err(EncodeError::SlotOverflow {
                collection,
                supplied: records.len(),
                slots,
            }),
        }
    }
}

fn shape_reason(component: &str, expected: bool) -> String {
    if expected {
        format!("layout expects a {component}, record has none")
    } else {
        format!("record has a {component}, layout expects none")
    }
}

fn push_valid(out: &mut Observation, values: &[f64]) {
    for &v in values {
        out.values.push(v as f32);
        out.validity.push(true);
    }
}

fn push_padding(out: &mut Observation, count: usize, pad: f32) {
    for _ in 0..count {
        out.values.push(pad);
        out.validity.push(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowdnav_core::{FullState, ObservableState, ObstacleState};
    use proptest::prelude::*;

    fn robot() -> FullState {
        FullState::new(0.0, 0.0, 0.0, 0.0, 0.3, 0.2, 5.0, 5.0, 1.0).unwrap()
    }

    fn human(px: f64) -> ObservableState {
        ObservableState::new(px, 1.0, -0.5, 0.0, 0.3, 0.25).unwrap()
    }

    #[test]
    fn layout_widths_follow_config() {
        let enc = JointEncoder::compile(EncoderConfig {
            max_humans: 3,
            max_obstacles: 2,
            max_vertices: 4,
            self_heading: true,
            human_heading: true,
            goal_radius: true,
            ..EncoderConfig::default()
        })
        .unwrap();
        // self = 8 + 4, human = 8, obstacle = 4 + 8.
        assert_eq!(enc.output_len(), 12 + 3 * 8 + 2 * 12);
        assert_eq!(enc.layout().span("self").unwrap().len, 12);
        assert_eq!(enc.layout().span("obstacle[1]").unwrap().len, 12);
    }

    #[test]
    fn missing_humans_padded_invalid() {
        let enc = JointEncoder::compile(EncoderConfig {
            max_humans: 2,
            pad_value: -1.0,
            ..EncoderConfig::default()
        })
        .unwrap();
        let obs = enc
            .encode(&JointState::new(robot(), vec![human(1.0)], vec![]))
            .unwrap();

        let span = enc.layout().span("human[1]").unwrap();
        assert!(obs.values()[span.range()].iter().all(|&v| v == -1.0));
        assert!(obs.validity()[span.range()].iter().all(|&v| !v));
        let first = enc.layout().span("human[0]").unwrap();
        assert!(obs.validity()[first.range()].iter().all(|&v| v));
    }

    #[test]
    fn slot_order_matches_collection_order() {
        let enc = JointEncoder::compile(EncoderConfig {
            max_humans: 2,
            ..EncoderConfig::default()
        })
        .unwrap();
        let obs = enc
            .encode(&JointState::new(robot(), vec![human(1.0), human(2.0)], vec![]))
            .unwrap();
        let s0 = enc.layout().span("human[0]").unwrap();
        let s1 = enc.layout().span("human[1]").unwrap();
        assert_eq!(obs.values()[s0.offset], 1.0);
        assert_eq!(obs.values()[s1.offset], 2.0);
    }

    #[test]
    fn overflow_error_and_truncate() {
        let state = JointState::new(robot(), vec![human(1.0), human(2.0)], vec![]);

        let strict = JointEncoder::compile(EncoderConfig {
            max_humans: 1,
            ..EncoderConfig::default()
        })
        .unwrap();
        assert_eq!(
            strict.encode(&state).unwrap_err(),
            EncodeError::SlotOverflow {
                collection: "humans",
                supplied: 2,
                slots: 1
            }
        );

        let lossy = JointEncoder::compile(EncoderConfig {
            max_humans: 1,
            overflow: OverflowPolicy::Truncate,
            ..EncoderConfig::default()
        })
        .unwrap();
        let obs = lossy.encode(&state).unwrap();
        let span = lossy.layout().span("human[0]").unwrap();
        assert_eq!(obs.values()[span.offset], 1.0);
    }

    #[test]
    fn vertex_tail_padded_and_truncated() {
        let square = ObstacleState::new(
            0.0,
            0.0,
            0.0,
            0.5,
            [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        )
        .unwrap();

        let enc = JointEncoder::compile(EncoderConfig {
            max_humans: 0,
            max_obstacles: 1,
            max_vertices: 6,
            ..EncoderConfig::default()
        })
        .unwrap();
        let obs = enc
            .encode(&JointState::new(robot(), vec![], vec![square.clone()]))
            .unwrap();
        let span = enc.layout().span("obstacle[0]").unwrap();
        // 4 pose/radius + 8 vertex coords valid, 4 padding.
        assert_eq!(
            obs.validity()[span.range()].iter().filter(|&&v| v).count(),
            12
        );

        let tight = JointEncoder::compile(EncoderConfig {
            max_humans: 0,
            max_obstacles: 1,
            max_vertices: 2,
            overflow: OverflowPolicy::Truncate,
            ..EncoderConfig::default()
        })
        .unwrap();
        let obs = tight
            .encode(&JointState::new(robot(), vec![], vec![square]))
            .unwrap();
        // First two vertices survive, in order.
        let span = tight.layout().span("obstacle[0]").unwrap();
        assert_eq!(&obs.values()[span.offset + 4..span.offset + 8], &[0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn shape_mismatch_is_loud() {
        let enc = JointEncoder::compile(EncoderConfig {
            max_humans: 1,
            self_heading: true,
            ..EncoderConfig::default()
        })
        .unwrap();
        // Robot lacks the heading the layout expects.
        let err = enc
            .encode(&JointState::new(robot(), vec![], vec![]))
            .unwrap_err();
        assert!(matches!(
            err,
            EncodeError::ShapeMismatch {
                record: "self_state",
                ..
            }
        ));
    }

    #[test]
    fn human_heading_mismatch_is_loud() {
        let enc = JointEncoder::compile(EncoderConfig {
            max_humans: 1,
            human_heading: true,
            ..EncoderConfig::default()
        })
        .unwrap();
        // Pedestrian lacks the heading the layout expects.
        let err = enc
            .encode(&JointState::new(robot(), vec![human(1.0)], vec![]))
            .unwrap_err();
        assert!(matches!(
            err,
            EncodeError::ShapeMismatch {
                record: "human_states",
                ..
            }
        ));
    }

    #[test]
    fn goal_radius_mismatch_is_loud() {
        let enc = JointEncoder::compile(EncoderConfig {
            goal_radius: true,
            ..EncoderConfig::default()
        })
        .unwrap();
        // Robot lacks the goal radius the layout expects.
        let err = enc
            .encode(&JointState::new(robot(), vec![], vec![]))
            .unwrap_err();
        assert!(matches!(
            err,
            EncodeError::ShapeMismatch {
                record: "self_state",
                ..
            }
        ));

        // And the opposite disagreement is caught too.
        let plain = JointEncoder::compile(EncoderConfig::default()).unwrap();
        let with_gr = robot().with_goal_radius(0.3).unwrap();
        assert!(plain
            .encode(&JointState::new(with_gr, vec![], vec![]))
            .is_err());
    }

    #[test]
    fn encode_into_reuses_buffers() {
        let enc = JointEncoder::compile(EncoderConfig {
            max_humans: 1,
            ..EncoderConfig::default()
        })
        .unwrap();
        let mut obs = enc
            .encode(&JointState::new(robot(), vec![human(1.0)], vec![]))
            .unwrap();
        enc.encode_into(&JointState::new(robot(), vec![human(2.0)], vec![]), &mut obs)
            .unwrap();
        let span = enc.layout().span("human[0]").unwrap();
        assert_eq!(obs.values()[span.offset], 2.0);
        assert_eq!(obs.len(), enc.output_len());
    }

    proptest! {
        #[test]
        fn output_len_is_constant(n in 0usize..6) {
            let enc = JointEncoder::compile(EncoderConfig {
                max_humans: 5,
                ..EncoderConfig::default()
            }).unwrap();
            let humans: Vec<_> = (0..n).map(|i| human(i as f64)).collect();
            let obs = enc.encode(&JointState::new(robot(), humans, vec![])).unwrap();
            prop_assert_eq!(obs.len(), enc.output_len());
            prop_assert_eq!(obs.validity().len(), enc.output_len());
        }
    }
}

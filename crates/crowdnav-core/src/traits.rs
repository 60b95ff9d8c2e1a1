//! Core abstraction traits: feature encoding and the policy seam.

use crate::action::Action;
use crate::state::JointState;

/// Stable flat numeric encoding of a state record for network input.
///
/// Replaces the source system's ad-hoc tuple concatenation with an explicit
/// contract: [`encode_into`](FeatureEncode::encode_into) appends this
/// record's fields to the accumulator **in the declared field order**
/// documented on each record. The operation is left-foldable: encoding a
/// sequence of records one after another into the same accumulator yields
/// the concatenation of their individual encodings.
pub trait FeatureEncode {
    /// Number of scalars [`encode_into`](FeatureEncode::encode_into)
    /// appends for this record.
    fn feature_len(&self) -> usize;

    /// Append this record's fields to `out` in declared order.
    fn encode_into(&self, out: &mut Vec<f64>);

    /// Consume an accumulator, append this record's fields, return it.
    ///
    /// ```
    /// use crowdnav_core::{FeatureEncode, ObservableState};
    ///
    /// let s = ObservableState::new(1.0, 2.0, 0.5, -0.5, 0.3, 0.2).unwrap();
    /// let v = s.to_feature_vector(vec![9.0]);
    /// assert_eq!(v, vec![9.0, 1.0, 2.0, 0.5, -0.5, 0.3, 0.2]);
    /// ```
    fn to_feature_vector(&self, mut acc: Vec<f64>) -> Vec<f64> {
        self.encode_into(&mut acc);
        acc
    }
}

/// The decision-making seam between the environment and the RL machinery.
///
/// The environment produces one [`JointState`] per tick; a policy maps it
/// to an [`Action`]. Training internals (networks, optimizers, replay
/// buffers) live behind this trait and are outside this workspace.
///
/// `predict` takes `&mut self` so that stateful policies (recurrent nets,
/// scripted sequences, exploration schedules) fit without interior
/// mutability.
pub trait Policy {
    /// Short name for logging and episode summaries.
    fn name(&self) -> &str;

    /// Map the current snapshot to an action.
    ///
    /// The snapshot is borrowed for the duration of the call only; a policy
    /// that queues states for later (e.g. replay-buffer ingestion) must
    /// clone them.
    fn predict(&mut self, state: &JointState) -> Action;
}

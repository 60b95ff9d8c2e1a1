//! Crowdnav Quickstart — a complete, minimal training-loop skeleton.
//!
//! Demonstrates:
//!   1. Building an EnvConfig and CrowdWorld
//!   2. Implementing a Policy (straight-line goal seeking)
//!   3. Stepping with step_sync and reading snapshots
//!   4. Running full episodes with the runner, traced to a text log
//!   5. Encoding snapshots into fixed-size tensors for network input
//!
//! Run with:
//!   cargo run --example quickstart

use crowdnav_core::{Action, JointState, Policy};
use crowdnav_env::{
    run_episode_traced, CrowdWorld, EnvConfig, ObstacleSpec, RewardConfig, Scenario,
};
use crowdnav_obs::{EncoderConfig, JointEncoder, TraceReader, TraceWriter};

// ─── Policy: straight-line goal seeking ─────────────────────────
//
// Drives at v_pref directly toward the goal, ignoring the crowd.
// Collisions are the expected outcome in dense scenes — which is
// precisely what a learned policy improves on.

struct GoalSeek;

impl Policy for GoalSeek {
    fn name(&self) -> &str {
        "goal_seek"
    }

    fn predict(&mut self, state: &JointState) -> Action {
        let robot = state.self_state();
        let (dx, dy) = (robot.gx() - robot.px(), robot.gy() - robot.py());
        let dist = dx.hypot(dy).max(1e-9);
        let v = robot.v_pref();
        Action::Holonomic {
            vx: dx / dist * v,
            vy: dy / dist * v,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ─── 1. Configure the world ─────────────────────────────────
    let config = EnvConfig {
        human_num: 5,
        scenario: Scenario::CircleCrossing { circle_radius: 4.0 },
        obstacles: vec![ObstacleSpec {
            px: 2.0,
            py: 0.0,
            radius: 0.4,
            ..ObstacleSpec::default()
        }],
        reward: RewardConfig {
            slack_reward: -0.01,
            ..RewardConfig::default()
        },
        ..EnvConfig::default()
    };
    let mut world = CrowdWorld::new(config)?;

    // ─── 2. Step manually for a few ticks ───────────────────────
    let mut policy = GoalSeek;
    let mut state = world.reset(7)?;
    for _ in 0..4 {
        let outcome = world.step_sync(policy.predict(&state))?;
        println!(
            "tick {} reward {:+.4} min_sep {:.3}",
            world.current_tick(),
            outcome.reward,
            outcome.metrics.min_separation,
        );
        if outcome.event.is_some() {
            break;
        }
        state = outcome.state;
    }

    // ─── 3. Run whole episodes, traced ──────────────────────────
    let mut trace = TraceWriter::new(Vec::new())?;
    for seed in 0..5u64 {
        let summary = run_episode_traced(&mut world, &mut policy, seed, &mut trace)?;
        println!(
            "seed {seed}: {} after {} steps, return {:+.3}, min_sep {:.3}",
            summary.termination, summary.length, summary.episode_return, summary.min_separation,
        );
    }

    // ─── 4. Read the trace back ─────────────────────────────────
    let bytes = trace.into_inner();
    let mut reader = TraceReader::open(bytes.as_slice())?;
    let mut frames = 0u64;
    while reader.next_frame()?.is_some() {
        frames += 1;
    }
    println!("trace holds {frames} frames");

    // ─── 5. Encode the last snapshot for network input ──────────
    let encoder = JointEncoder::compile(EncoderConfig {
        max_humans: 5,
        max_obstacles: 1,
        max_vertices: 4,
        ..EncoderConfig::default()
    })?;
    let obs = encoder.encode(&world.snapshot()?)?;
    println!(
        "observation: {} features, {} valid",
        obs.values().len(),
        obs.valid_count(),
    );

    Ok(())
}

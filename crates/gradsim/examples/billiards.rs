//! Billiards cue optimization.
//!
//! Optimizes the cue ball's initial position and velocity so the target ball
//! ends on the goal point, then replays the optimized shot.

use gradsim::gradsim_billiards::{compile_rollout, decode_rollout, descent_config, pack_inputs};
use gradsim::{optimize_cue, BilliardsScenario};
use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let scenario = BilliardsScenario::default();
    println!("Billiards cue optimization");
    println!("==========================\n");
    println!("Balls: {} ({} rack layers)", scenario.ball_count(), scenario.layers);
    println!("Horizon: {} steps at dt = {}", scenario.steps, scenario.dt);
    println!("Goal: [{:.2}, {:.2}], target ball {}\n", scenario.goal.x, scenario.goal.y, scenario.target_ball);

    let start = Instant::now();
    let solution = optimize_cue(&scenario, &descent_config())?;
    println!("\noptimization took {:.1?}", start.elapsed());

    println!(
        "optimized cue position = [{:.4}, {:.4}], velocity = [{:.4}, {:.4}]",
        solution.position.x, solution.position.y, solution.velocity.x, solution.velocity.y
    );
    println!("final loss = {:.6e}", solution.result.final_loss);

    // Replay the optimized shot through the forward evaluator.
    let replay = BilliardsScenario {
        cue_position: solution.position,
        cue_velocity: solution.velocity,
        ..scenario.clone()
    };
    let forward = compile_rollout(&replay)?;
    let (x0, v0) = replay.initial_state();
    let outputs = forward.eval(&pack_inputs(&replay, &x0, &v0))?;
    let (trajectory, loss) = decode_rollout(&replay, &outputs);

    let final_target = trajectory.final_positions().expect("non-empty trajectory")[replay.target_ball];
    println!(
        "final target ball position = [{:.4}, {:.4}] (goal [{:.2}, {:.2}], replay loss {:.6e})",
        final_target[0], final_target[1], replay.goal.x, replay.goal.y, loss
    );
    Ok(())
}

//! Mass-spring locomotion training.
//!
//! Trains the controller of the mesh-grid crawler to move its head forward,
//! then replays the learned gait.

use gradsim::gradsim_spring::{simulate, training_config};
use gradsim::{crawler, train, Controller, SpringScenario};
use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let scenario = SpringScenario::new(crawler());
    println!("Mass-spring locomotion training");
    println!("===============================\n");
    println!(
        "Robot: {} objects, {} springs ({} actuated)",
        scenario.n_objects(),
        scenario.n_springs(),
        scenario.robot.springs.iter().filter(|s| s.actuation > 0.0).count()
    );
    println!("Horizon: {} steps at dt = {}\n", scenario.steps, scenario.dt);

    let mut controller = Controller::init(
        0,
        scenario.n_input(),
        scenario.n_hidden,
        scenario.n_springs(),
    );

    let before = simulate(&scenario, &controller);
    let head_before = before.final_positions().expect("non-empty trajectory")[scenario.head][0];

    let start = Instant::now();
    let result = train(&scenario, &mut controller, &training_config())?;
    println!("\ntraining took {:.1?}", start.elapsed());
    println!("final loss = {:.6}", result.final_loss);

    let after = simulate(&scenario, &controller);
    let head_after = after.final_positions().expect("non-empty trajectory")[scenario.head][0];
    println!(
        "head x after {} steps: {:.4} untrained -> {:.4} trained",
        scenario.steps, head_before, head_after
    );
    Ok(())
}

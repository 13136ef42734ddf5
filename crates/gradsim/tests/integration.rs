//! End-to-end tests for the gradsim pipelines.

use gradsim::gradsim_billiards::{descent_config, simulate};
use gradsim::gradsim_spring::{head_loss, rollout, simulate as simulate_spring};
use gradsim::{
    crawler, optimize_cue, train, walker, BilliardsScenario, ContactModel, Controller,
    GradientDescentConfig, SpringScenario, Vec2,
};

/// The default break shot: the cue crosses the table, strikes the rack, and
/// everything stays within the unit table.
#[test]
fn billiards_break_stays_on_the_table() {
    let scenario = BilliardsScenario::default();
    let trajectory = simulate(&scenario);
    assert_eq!(trajectory.len(), 1024);

    let (x0, _) = scenario.initial_state();
    let first_impact = trajectory
        .positions
        .iter()
        .position(|step| {
            (1..scenario.ball_count()).any(|i| {
                let p = step[i];
                (p[0] - x0[i].x).abs() > 1e-12 || (p[1] - x0[i].y).abs() > 1e-12
            })
        })
        .expect("the cue never reached the rack");
    // The cue covers the ~0.34 gap to the rack early in the horizon.
    assert!(
        first_impact < 500,
        "first rack impact at step {first_impact}"
    );

    for (t, step) in trajectory.positions.iter().enumerate() {
        for (i, p) in step.iter().enumerate() {
            assert!(
                (0.0..=1.0).contains(&p[0]) && (0.0..=1.0).contains(&p[1]),
                "ball {i} left the table at step {t}: [{}, {}]",
                p[0],
                p[1]
            );
        }
    }
}

/// Gradient descent on the cue improves the break toward the goal: the loss
/// decreases across a majority of iterations and ends below where it began.
#[test]
fn billiards_optimization_improves_the_loss() {
    let scenario = BilliardsScenario::default();
    let config = GradientDescentConfig {
        print_every: 0,
        ..descent_config()
    };
    let solution = optimize_cue(&scenario, &config).expect("optimization failed");
    let history = &solution.result.loss_history;
    assert_eq!(history.len(), 200);

    let improving = history
        .windows(2)
        .filter(|w| w[1] <= w[0] + 1e-12)
        .count();
    assert!(
        improving * 2 > history.len() - 1,
        "loss decreased in only {improving} of {} transitions",
        history.len() - 1
    );
    assert!(
        solution.result.final_loss < history[0],
        "final loss {} did not beat the initial {}",
        solution.result.final_loss,
        history[0]
    );
}

/// Both robots survive a full-horizon concrete rollout under either contact
/// model: finite positions, and nothing ends below the ground plane by more
/// than one step's travel.
#[test]
fn spring_robots_run_the_full_horizon() {
    for robot in [walker(), crawler()] {
        for contact in [ContactModel::Projection, ContactModel::ContinuousToi] {
            let scenario = SpringScenario::new(robot.clone()).with_contact(contact);
            let controller = Controller::init(
                0,
                scenario.n_input(),
                scenario.n_hidden,
                scenario.n_springs(),
            );
            let trajectory = simulate_spring(&scenario, &controller);
            assert_eq!(trajectory.len(), scenario.steps);

            let sink_limit = scenario.ground_height - 0.05;
            for (t, step) in trajectory.positions.iter().enumerate() {
                for (i, p) in step.iter().enumerate() {
                    assert!(p[0].is_finite() && p[1].is_finite());
                    assert!(
                        p[1] > sink_limit,
                        "object {i} sank through the ground at step {t} ({contact:?}): y = {}",
                        p[1]
                    );
                }
            }
        }
    }
}

/// The locomotion loss rewards head displacement and never reads the goal;
/// the goal steers behavior only through the controller's input features.
/// This is the intended two-stage design, pinned down rather than "fixed".
#[test]
fn spring_goal_steers_only_through_the_controller() {
    let near = SpringScenario::new(walker());
    let mut far = near.clone();
    far.goal = Vec2::new(-3.0, 1.5);

    // Identical final states produce identical losses whatever the goal is.
    let finals = vec![Vec2::new(0.37, 0.12); near.n_objects()];
    assert_eq!(head_loss(&near, &finals), head_loss(&far, &finals));

    // But the goal does reach the dynamics through the controller features.
    let controller = Controller::init(
        4,
        near.n_input(),
        near.n_hidden,
        near.n_springs(),
    );
    let (x0, v0) = near.initial_state();
    let mut short_near = near.clone();
    short_near.steps = 40;
    let mut short_far = far.clone();
    short_far.steps = 40;
    let a = rollout(&short_near, &x0, &v0, &controller);
    let b = rollout(&short_far, &x0, &v0, &controller);
    assert_ne!(
        a.positions.last(),
        b.positions.last(),
        "moving the goal should change the gait"
    );
}

/// Short end-to-end training run on the walker: the loss history is fully
/// populated, stays finite, and clipped descent finds at least one
/// improvement over the untrained controller.
#[test]
fn spring_training_descends_the_loss() {
    let mut scenario = SpringScenario::new(walker());
    scenario.steps = 120;

    let mut controller = Controller::init(
        0,
        scenario.n_input(),
        scenario.n_hidden,
        scenario.n_springs(),
    );
    let before = controller.to_flat();

    let config = GradientDescentConfig {
        iterations: 40,
        learning_rate: 1.0,
        gradient_clip: Some(0.2),
        print_every: 0,
    };
    let result = train(&scenario, &mut controller, &config).expect("training failed");

    assert_eq!(result.loss_history.len(), 40);
    assert!(result.loss_history.iter().all(|l| l.is_finite()));
    assert_ne!(before, controller.to_flat());

    let first = result.loss_history[0];
    let best = result
        .loss_history[1..]
        .iter()
        .cloned()
        .fold(f64::INFINITY, f64::min);
    assert!(
        best < first + 1e-9,
        "no iteration improved on the initial loss {first} (best {best})"
    );
}

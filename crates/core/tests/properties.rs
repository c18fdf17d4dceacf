//! Property-based tests across generators, scoring and the reaction field.

use std::collections::HashSet;

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use train_core::generators::{Answer, Judgement, Termination, Trial, generate};
use train_core::model::{Catalog, ExerciseKind, ExerciseLevel, LevelParams, Score};
use train_core::reaction::{ObjectKind, ReactionField};
use train_core::scoring::{RunningTally, StarThresholds};

fn turn_based_kind() -> impl Strategy<Value = ExerciseKind> {
    prop::sample::select(
        ExerciseKind::ALL
            .into_iter()
            .filter(|k| !k.is_real_time())
            .collect::<Vec<_>>(),
    )
}

proptest! {
    // Any seed, any turn-based kind, any level: the trial is structurally valid.
    #[test]
    fn generated_trials_validate(kind in turn_based_kind(), level in 1u8..=3, seed in any::<u64>()) {
        let catalog = Catalog::standard().unwrap();
        let level = catalog.level(kind, level).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let trial = generate(kind, level, &mut rng).unwrap();
        prop_assert_eq!(trial.kind(), kind);
        prop_assert!(trial.validate().is_ok(), "{:?}", trial);
    }

    // Whatever the tally does, the score stays in range and stars in 1..=3.
    #[test]
    fn tally_always_yields_valid_stars(steps in prop::collection::vec((any::<bool>(), 0i64..20), 0..40)) {
        let mut tally = RunningTally::new();
        for (reward, points) in steps {
            if reward { tally.reward(points) } else { tally.penalize(points) }
        }
        let score = tally.score();
        prop_assert!(score <= Score::MAX);
        let level = ExerciseLevel::standard(1).unwrap();
        for kind in ExerciseKind::ALL {
            let stars = StarThresholds::for_exercise(kind, &level).stars_for(score);
            prop_assert!((1..=3).contains(&stars.value()));
        }
    }

    // An object is never reported as caught twice.
    #[test]
    fn catches_are_unique(seed in any::<u64>(), moves in prop::collection::vec(0.0f64..100.0, 1..50)) {
        let mut field = ReactionField::new(&LevelParams {
            base_speed: Some(2.0),
            spawn_rate_ms: Some(50.0),
            ..LevelParams::default()
        }).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut seen = HashSet::new();
        for x in moves.iter().cycle().take(600) {
            field.pointer_move(*x);
            for capture in field.tick(16.0, &mut rng).caught {
                prop_assert!(seen.insert(capture.id));
            }
        }
    }
}

#[test]
fn following_catcher_collects_rewards() {
    let mut field = ReactionField::new(&LevelParams {
        base_speed: Some(0.6),
        spawn_rate_ms: Some(1000.0),
        ..LevelParams::default()
    })
    .unwrap();
    let mut rng = StdRng::seed_from_u64(99);
    let mut rewards = 0;

    // Thirty seconds at 60 frames per second, chasing the lowest reward.
    for _ in 0..1800 {
        let lowest = field
            .objects()
            .iter()
            .filter(|o| o.kind() == ObjectKind::Reward)
            .max_by(|a, b| a.y().total_cmp(&b.y()))
            .map(|o| o.x());
        if let Some(x) = lowest {
            field.pointer_move(x);
        }
        rewards += field
            .tick(1000.0 / 60.0, &mut rng)
            .caught
            .iter()
            .filter(|c| c.kind == ObjectKind::Reward)
            .count();
    }
    assert!(rewards > 5, "caught {rewards}");
}

#[test]
fn arithmetic_session_budget_matches_question_count() {
    let level = ExerciseLevel::standard(1).unwrap().with_params(LevelParams {
        question_count: Some(4),
        ..LevelParams::default()
    });
    assert_eq!(
        Termination::for_exercise(ExerciseKind::Arithmetic, &level),
        Termination::TrialBudget { trials: 4 }
    );

    let mut rng = StdRng::seed_from_u64(12);
    let mut tally = RunningTally::new();
    for _ in 0..4 {
        let mut trial = generate(ExerciseKind::Arithmetic, &level, &mut rng).unwrap();
        let Trial::Arithmetic(ref problem) = trial else {
            panic!("arithmetic trial expected");
        };
        let answer = Answer::Number(problem.answer_key());
        let outcome = trial.apply(&answer).unwrap();
        assert_eq!(outcome.judgement, Judgement::Correct);
        tally.reward(10);
    }
    assert_eq!(tally.score().value(), 40);
}

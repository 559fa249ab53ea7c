use anyhow::Result;
use metroplan::{
    city::{CityModel, CycleState, FeedbackCategory, FeedbackDecision, GeoPoint},
    clock::ManualClock,
    engine::{EngineBuilder, EngineSettings, RunState, Stage, StageContext},
};
use rand::RngCore;
use tempfile::tempdir;

fn test_city() -> CityModel {
    CityModel {
        boundary: vec![
            GeoPoint {
                lat: 51.505,
                lon: -0.09,
            },
            GeoPoint {
                lat: 51.515,
                lon: -0.12,
            },
            GeoPoint {
                lat: 51.500,
                lon: -0.11,
            },
        ],
        proposal_sites: Vec::new(),
    }
}

fn settings(max_iterations: u32, snapshot_dir: &std::path::Path) -> EngineSettings {
    EngineSettings {
        scenario_name: "test_city".into(),
        seed: 7,
        max_iterations,
        snapshot_interval: 0,
        snapshot_dir: snapshot_dir.to_path_buf(),
    }
}

/// Replays a fixed verdict per cycle so the loop's stopping rule can be
/// tested without depending on sampled scores.
struct ScriptedReview {
    verdicts: Vec<FeedbackCategory>,
}

impl Stage for ScriptedReview {
    fn name(&self) -> &str {
        "scripted_review"
    }

    fn run(
        &mut self,
        ctx: &StageContext,
        cycle: &mut CycleState,
        _rng: &mut dyn RngCore,
    ) -> Result<()> {
        let category = self.verdicts[(ctx.iteration - 1) as usize];
        cycle.feedback = Some(FeedbackDecision {
            category,
            reason: format!("scripted verdict for cycle {}", ctx.iteration),
        });
        Ok(())
    }
}

#[test]
fn stops_on_first_approval() {
    let temp = tempdir().expect("tempdir");
    let mut engine = EngineBuilder::new(settings(5, temp.path()))
        .with_stage(ScriptedReview {
            verdicts: vec![
                FeedbackCategory::Disapproved,
                FeedbackCategory::Approved,
                FeedbackCategory::Disapproved,
                FeedbackCategory::Disapproved,
                FeedbackCategory::Disapproved,
            ],
        })
        .build();

    let outcome = engine.run(&test_city()).expect("run succeeds");
    assert_eq!(outcome.state, RunState::Approved { iteration: 2 });
    assert_eq!(outcome.cycles.len(), 2, "no cycles run after approval");
    assert!(outcome.approved());
}

#[test]
fn exhausts_after_iteration_cap_without_error() {
    let temp = tempdir().expect("tempdir");
    let mut engine = EngineBuilder::new(settings(3, temp.path()))
        .with_stage(ScriptedReview {
            verdicts: vec![
                FeedbackCategory::NeedsRevision,
                FeedbackCategory::Disapproved,
                FeedbackCategory::NeedsRevision,
            ],
        })
        .build();

    let outcome = engine.run(&test_city()).expect("run succeeds");
    assert_eq!(outcome.state, RunState::Exhausted);
    assert_eq!(outcome.cycles.len(), 3);
    assert!(!outcome.approved());
}

#[test]
fn zero_iteration_cap_fails_before_the_loop() {
    let temp = tempdir().expect("tempdir");
    let mut engine = EngineBuilder::new(settings(0, temp.path()))
        .with_standard_stages()
        .build();
    let err = engine.run(&test_city()).expect_err("must refuse to run");
    assert!(err.to_string().contains("max_iterations"));
}

#[test]
fn hook_sees_every_cycle_in_order() {
    let temp = tempdir().expect("tempdir");
    let mut engine = EngineBuilder::new(settings(4, temp.path()))
        .with_stage(ScriptedReview {
            verdicts: vec![FeedbackCategory::Disapproved; 4],
        })
        .build();

    let mut seen = Vec::new();
    engine
        .run_with_hook(&test_city(), |report| seen.push(report.iteration))
        .expect("run succeeds");
    assert_eq!(seen, vec![1, 2, 3, 4]);
}

#[test]
fn standard_pipeline_fills_every_slot_and_respects_bounds() {
    let temp = tempdir().expect("tempdir");
    let mut engine = EngineBuilder::new(settings(3, temp.path()))
        .with_standard_stages()
        .with_clock(ManualClock::starting_at(1_700_000_000))
        .build();

    let outcome = engine.run(&test_city()).expect("run succeeds");
    assert!(!outcome.cycles.is_empty());
    assert!(outcome.cycles.len() <= 3);
    for report in &outcome.cycles {
        let snapshot = report.snapshot.as_ref().expect("snapshot present");
        let plan = report.plan.as_ref().expect("plan present");
        let score = report.score.expect("score present");
        report.feedback.as_ref().expect("feedback present");
        assert!(score <= 100);
        assert!(plan.new_green_space >= snapshot.existing_green_space * 0.1);
        assert!(plan.new_green_space <= snapshot.existing_green_space * 0.3);
        assert!(plan.plan_id.starts_with("plan_"));
    }
    match outcome.state {
        RunState::Approved { iteration } => {
            assert_eq!(iteration, outcome.cycles.len() as u32);
            assert!(outcome.cycles.last().expect("last cycle").approved());
        }
        RunState::Exhausted => assert_eq!(outcome.cycles.len(), 3),
    }
}

#[test]
fn identical_seeds_reproduce_the_run() {
    let run = |dir: &std::path::Path| {
        let mut engine = EngineBuilder::new(settings(3, dir))
            .with_standard_stages()
            .with_clock(ManualClock::starting_at(500))
            .build();
        engine.run(&test_city()).expect("run succeeds")
    };

    let temp = tempdir().expect("tempdir");
    let first = run(temp.path());
    let second = run(temp.path());

    assert_eq!(first.state, second.state);
    assert_eq!(first.cycles.len(), second.cycles.len());
    for (a, b) in first.cycles.iter().zip(second.cycles.iter()) {
        assert_eq!(a.score, b.score);
        let plan_a = a.plan.as_ref().expect("plan present");
        let plan_b = b.plan.as_ref().expect("plan present");
        assert_eq!(plan_a.plan_id, plan_b.plan_id);
        assert_eq!(plan_a.new_green_space, plan_b.new_green_space);
    }
}

#[test]
fn manual_clock_keeps_plan_ids_unique() {
    let temp = tempdir().expect("tempdir");
    let mut engine = EngineBuilder::new(settings(3, temp.path()))
        .with_stage(metroplan::stages::PerceptorStage::new())
        .with_stage(metroplan::stages::PlannerStage::new())
        .with_clock(ManualClock::starting_at(42))
        .build();

    let outcome = engine.run(&test_city()).expect("run succeeds");
    let ids: Vec<String> = outcome
        .cycles
        .iter()
        .map(|c| c.plan.as_ref().expect("plan present").plan_id.clone())
        .collect();
    assert_eq!(ids.len(), 3, "no feedback stage, so the loop exhausts");
    let mut deduped = ids.clone();
    deduped.dedup();
    assert_eq!(ids, deduped);
}

#[test]
fn snapshots_land_on_the_interval() {
    let temp = tempdir().expect("tempdir");
    let mut settings = settings(4, temp.path());
    settings.snapshot_interval = 2;
    let mut engine = EngineBuilder::new(settings)
        .with_stage(ScriptedReview {
            verdicts: vec![FeedbackCategory::NeedsRevision; 4],
        })
        .build();
    engine.run(&test_city()).expect("run succeeds");

    let dir = temp.path().join("test_city");
    assert!(!dir.join("cycle_0001.json").exists());
    assert!(dir.join("cycle_0002.json").exists());
    assert!(!dir.join("cycle_0003.json").exists());
    assert!(dir.join("cycle_0004.json").exists());
}

use anyhow::Result;
use rand::{Rng, RngCore};

use crate::{
    city::{CongestionLevel, CycleState, DevelopmentPlan, EnvironmentSnapshot},
    engine::{Stage, StageContext},
};

pub const BONUS_MIN: i32 = 10;
pub const BONUS_MAX: i32 = 50;

/// Deterministic part of the sustainability rubric. The thresholds are
/// load-bearing: callers compare the score against the 65/40 feedback cut
/// lines, so any drift here changes run outcomes.
pub fn base_score(snapshot: &EnvironmentSnapshot, plan: &DevelopmentPlan) -> i32 {
    let mut score = 0;

    let total_green = snapshot.existing_green_space + plan.new_green_space;
    if total_green > 15.0 {
        score += 40;
    } else if total_green > 10.0 {
        score += 20;
    }

    score += plan.transit_routes_added as i32 * 5;

    if snapshot.congestion_level == CongestionLevel::High && plan.transit_routes_added < 3 {
        score -= 15;
    }

    score
}

/// Adds the reviewer-mood bonus and clamps into [0, 100].
pub fn final_score(base: i32, bonus: i32) -> u8 {
    (base + bonus).clamp(0, 100) as u8
}

pub struct EvaluatorStage;

impl EvaluatorStage {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EvaluatorStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for EvaluatorStage {
    fn name(&self) -> &str {
        "evaluator"
    }

    fn run(
        &mut self,
        _ctx: &StageContext,
        cycle: &mut CycleState,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        let (snapshot, plan) = match (cycle.snapshot.as_ref(), cycle.plan.as_ref()) {
            (Some(snapshot), Some(plan)) => (snapshot, plan),
            _ => return Ok(()),
        };
        println!("[evaluator] scoring plan '{}' for sustainability...", plan.plan_id);
        let bonus = rng.gen_range(BONUS_MIN..=BONUS_MAX);
        let score = final_score(base_score(snapshot, plan), bonus);
        println!("[evaluator] sustainability score: {score}/100");
        cycle.score = Some(score);
        Ok(())
    }
}

use anyhow::Result;
use rand::RngCore;

use crate::{
    city::{CycleState, FeedbackCategory, FeedbackDecision},
    engine::{Stage, StageContext},
};

/// Maps a sustainability score onto the simulated reviewer's verdict.
/// Deterministic: > 65 approves, > 40 asks for revision, the rest is
/// rejected outright.
pub fn decide(score: u8) -> FeedbackDecision {
    if score > 65 {
        FeedbackDecision {
            category: FeedbackCategory::Approved,
            reason: "Good balance of green space and infrastructure.".into(),
        }
    } else if score > 40 {
        FeedbackDecision {
            category: FeedbackCategory::NeedsRevision,
            reason: "Score is moderate. Suggest increasing public transport options.".into(),
        }
    } else {
        FeedbackDecision {
            category: FeedbackCategory::Disapproved,
            reason: "Low sustainability score. Re-evaluate green space allocation.".into(),
        }
    }
}

pub struct FeedbackStage;

impl FeedbackStage {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FeedbackStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for FeedbackStage {
    fn name(&self) -> &str {
        "feedback"
    }

    fn run(
        &mut self,
        _ctx: &StageContext,
        cycle: &mut CycleState,
        _rng: &mut dyn RngCore,
    ) -> Result<()> {
        let score = match cycle.score {
            Some(score) => score,
            None => return Ok(()),
        };
        let plan_label = cycle
            .plan
            .as_ref()
            .map(|plan| plan.plan_id.as_str())
            .unwrap_or("unknown");
        println!("[feedback] reviewing plan '{plan_label}'...");
        let decision = decide(score);
        println!(
            "[feedback] verdict: {}. {}",
            decision.category.as_str().to_uppercase(),
            decision.reason
        );
        cycle.feedback = Some(decision);
        Ok(())
    }
}

use anyhow::Result;
use rand::{Rng, RngCore};

use crate::{
    city::{BuildingProposal, CityModel, CycleState, DevelopmentPlan, EnvironmentSnapshot},
    engine::{Stage, StageContext},
};

/// Drafts a development plan from the current snapshot. New green space is
/// always 10-30% of what already exists; the remaining fields are sampled
/// from fixed ranges, independent of the snapshot.
pub fn draft_plan(
    snapshot: &EnvironmentSnapshot,
    city: &CityModel,
    plan_id: String,
    rng: &mut dyn RngCore,
) -> DevelopmentPlan {
    let green_fraction = rng.gen_range(0.1..0.3);
    DevelopmentPlan {
        plan_id,
        new_green_space: snapshot.existing_green_space * green_fraction,
        new_residential_zones: rng.gen_range(5..=15),
        new_commercial_zones: rng.gen_range(1..=5),
        transit_routes_added: rng.gen_range(2..=5),
        building_proposals: city
            .proposal_sites
            .iter()
            .map(|site| BuildingProposal {
                id: site.id.clone(),
                kind: site.kind.clone(),
                location: site.location,
            })
            .collect(),
    }
}

pub struct PlannerStage;

impl PlannerStage {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlannerStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for PlannerStage {
    fn name(&self) -> &str {
        "planner"
    }

    fn run(
        &mut self,
        ctx: &StageContext,
        cycle: &mut CycleState,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        let snapshot = match cycle.snapshot.as_ref() {
            Some(snapshot) => snapshot,
            None => return Ok(()),
        };
        println!("[planner] drafting a new development plan...");
        let plan_id = format!("plan_{}", ctx.clock.unix_seconds());
        let plan = draft_plan(snapshot, ctx.city, plan_id, rng);
        println!(
            "[planner] plan '{}' drafted: +{:.2} km2 green, {} transit routes, {} proposals",
            plan.plan_id,
            plan.new_green_space,
            plan.transit_routes_added,
            plan.building_proposals.len()
        );
        cycle.plan = Some(plan);
        Ok(())
    }
}

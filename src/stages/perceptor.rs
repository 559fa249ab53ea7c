use anyhow::Result;
use rand::{Rng, RngCore};

use crate::{
    city::{CityModel, CongestionLevel, CycleState, EnvironmentSnapshot},
    engine::{Stage, StageContext},
};

/// Samples a synthetic view of the city. A real deployment would read GIS
/// layers and sensor feeds here; the simulation draws from fixed ranges.
pub fn sample_snapshot(city: &CityModel, rng: &mut dyn RngCore) -> EnvironmentSnapshot {
    let population_density = rng.gen_range(3_000.0..8_000.0);
    let existing_green_space = rng.gen_range(5.0..15.0);
    let commercial_zone_count = rng.gen_range(5..=20);
    let residential_zone_count = rng.gen_range(50..=150);
    let congestion_level = CongestionLevel::ALL[rng.gen_range(0..CongestionLevel::ALL.len())];
    EnvironmentSnapshot {
        boundary: city.boundary.clone(),
        population_density,
        existing_green_space,
        commercial_zone_count,
        residential_zone_count,
        congestion_level,
    }
}

pub struct PerceptorStage;

impl PerceptorStage {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PerceptorStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for PerceptorStage {
    fn name(&self) -> &str {
        "perceptor"
    }

    fn run(
        &mut self,
        ctx: &StageContext,
        cycle: &mut CycleState,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        println!("[perceptor] gathering geospatial and environmental data...");
        let snapshot = sample_snapshot(ctx.city, rng);
        println!(
            "[perceptor] snapshot ready: density {:.0}/km2, green space {:.2} km2, congestion {}",
            snapshot.population_density,
            snapshot.existing_green_space,
            snapshot.congestion_level.as_str()
        );
        cycle.snapshot = Some(snapshot);
        Ok(())
    }
}

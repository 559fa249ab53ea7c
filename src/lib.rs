pub mod city;
pub mod clock;
pub mod engine;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod stages;
pub mod web;

pub use city::{CityModel, CycleReport, FeedbackCategory};
pub use engine::{Engine, EngineBuilder, EngineSettings, RunOutcome, RunState};
pub use scenario::{Scenario, ScenarioLoader};

use anyhow::{bail, Result};
use rand::RngCore;
use serde::Serialize;

use crate::{
    city::{CityModel, CycleReport, CycleState},
    clock::{Clock, Pacing, WallClock},
    rng::RngManager,
    snapshot::SnapshotWriter,
    stages::{EvaluatorStage, FeedbackStage, PerceptorStage, PlannerStage},
};

pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub max_iterations: u32,
    pub snapshot_interval: u32,
    pub snapshot_dir: std::path::PathBuf,
}

/// One step of the planning pipeline. Stages read the city model, fill in
/// their slot of the cycle state, and draw randomness only from their own
/// stream.
pub trait Stage: Send {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &StageContext,
        cycle: &mut CycleState,
        rng: &mut dyn RngCore,
    ) -> Result<()>;
}

pub struct StageContext<'a> {
    /// 1-based cycle number.
    pub iteration: u32,
    pub max_iterations: u32,
    pub scenario_name: &'a str,
    pub city: &'a CityModel,
    pub clock: &'a dyn Clock,
    /// Reason attached to the previous cycle's decision. Printed only; the
    /// stages deliberately do not adapt to it.
    pub previous_reason: Option<&'a str>,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    stages: Vec<Box<dyn Stage>>,
    clock: Box<dyn Clock>,
    pacing: Pacing,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            stages: Vec::new(),
            clock: Box::new(WallClock),
            pacing: Pacing::none(),
        }
    }

    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Wires the standard perceive -> plan -> evaluate -> review pipeline.
    pub fn with_standard_stages(self) -> Self {
        self.with_stage(PerceptorStage::new())
            .with_stage(PlannerStage::new())
            .with_stage(EvaluatorStage::new())
            .with_stage(FeedbackStage::new())
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.settings.seed),
            stages: self.stages,
            clock: self.clock,
            pacing: self.pacing,
            snapshot_writer: SnapshotWriter::new(
                &self.settings.snapshot_dir,
                self.settings.snapshot_interval,
            ),
            settings: self.settings,
        }
    }
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum RunState {
    /// A plan was approved on the given 1-based iteration.
    Approved { iteration: u32 },
    /// The iteration cap elapsed without an approval.
    Exhausted,
}

#[derive(Debug, Serialize)]
pub struct RunOutcome {
    pub state: RunState,
    pub cycles: Vec<CycleReport>,
}

impl RunOutcome {
    pub fn approved(&self) -> bool {
        matches!(self.state, RunState::Approved { .. })
    }
}

pub struct Engine {
    rng: RngManager,
    stages: Vec<Box<dyn Stage>>,
    clock: Box<dyn Clock>,
    pacing: Pacing,
    snapshot_writer: SnapshotWriter,
    settings: EngineSettings,
}

impl Engine {
    /// Runs cycles until a plan is approved or the iteration cap elapses.
    pub fn run(&mut self, city: &CityModel) -> Result<RunOutcome> {
        self.run_with_hook(city, |_| {})
    }

    /// Same as [`Engine::run`] but invokes `hook` with every finished cycle
    /// report, in order. Used by the live viewer and by tests.
    pub fn run_with_hook(
        &mut self,
        city: &CityModel,
        mut hook: impl FnMut(&CycleReport),
    ) -> Result<RunOutcome> {
        if self.settings.max_iterations == 0 {
            bail!("max_iterations must be at least 1");
        }

        println!(
            "[engine] scenario '{}' starting: {} iteration cap, seed {}",
            self.settings.scenario_name, self.settings.max_iterations, self.settings.seed
        );

        let mut cycles: Vec<CycleReport> = Vec::new();
        let mut previous_reason: Option<String> = None;

        for iteration in 1..=self.settings.max_iterations {
            println!(
                "[engine] cycle {iteration} of {} begins",
                self.settings.max_iterations
            );
            if let Some(reason) = previous_reason.as_deref() {
                println!("[engine] carrying forward reviewer note: {reason}");
            }

            let mut cycle = CycleState::default();
            for stage in &mut self.stages {
                let ctx = StageContext {
                    iteration,
                    max_iterations: self.settings.max_iterations,
                    scenario_name: &self.settings.scenario_name,
                    city,
                    clock: self.clock.as_ref(),
                    previous_reason: previous_reason.as_deref(),
                };
                let rng = self.rng.stream(stage.name());
                stage.run(&ctx, &mut cycle, rng)?;
                self.pacing.after_stage();
            }

            previous_reason = cycle
                .feedback
                .as_ref()
                .map(|decision| decision.reason.clone());

            let report = cycle.into_report(iteration);
            if let Some(path) =
                self.snapshot_writer
                    .maybe_write(&report, &self.settings.scenario_name)?
            {
                println!("[engine] cycle report written to {}", path.display());
            }
            let approved = report.approved();
            hook(&report);
            cycles.push(report);

            if approved {
                println!("[engine] plan approved on cycle {iteration}, stopping");
                return Ok(RunOutcome {
                    state: RunState::Approved { iteration },
                    cycles,
                });
            }

            if iteration < self.settings.max_iterations {
                self.pacing.between_iterations();
            }
        }

        println!(
            "[engine] no plan approved within {} cycles",
            self.settings.max_iterations
        );
        Ok(RunOutcome {
            state: RunState::Exhausted,
            cycles,
        })
    }

    pub fn scenario_name(&self) -> &str {
        &self.settings.scenario_name
    }

    pub fn max_iterations(&self) -> u32 {
        self.settings.max_iterations
    }
}

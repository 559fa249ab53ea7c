mod evaluator;
mod feedback;
mod perceptor;
mod planner;

pub use evaluator::{base_score, final_score, EvaluatorStage};
pub use feedback::{decide, FeedbackStage};
pub use perceptor::{sample_snapshot, PerceptorStage};
pub use planner::{draft_plan, PlannerStage};

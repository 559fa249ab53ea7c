use serde::{Deserialize, Serialize};

/// A latitude/longitude pair on the city map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// A candidate site for a building proposal, fixed by the scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalSite {
    pub id: String,
    pub kind: String,
    pub location: GeoPoint,
}

/// Static city description built from the scenario. Stages read it, nothing
/// mutates it during a run.
#[derive(Debug, Clone)]
pub struct CityModel {
    pub boundary: Vec<GeoPoint>,
    pub proposal_sites: Vec<ProposalSite>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CongestionLevel {
    Low,
    Medium,
    High,
}

impl CongestionLevel {
    pub const ALL: [CongestionLevel; 3] = [
        CongestionLevel::Low,
        CongestionLevel::Medium,
        CongestionLevel::High,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CongestionLevel::Low => "low",
            CongestionLevel::Medium => "medium",
            CongestionLevel::High => "high",
        }
    }
}

/// Synthetic view of the city, sampled fresh each cycle by the perceptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    pub boundary: Vec<GeoPoint>,
    /// People per square kilometre.
    pub population_density: f64,
    /// Square kilometres of existing parkland.
    pub existing_green_space: f64,
    pub commercial_zone_count: u32,
    pub residential_zone_count: u32,
    pub congestion_level: CongestionLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingProposal {
    pub id: String,
    pub kind: String,
    pub location: GeoPoint,
}

/// One drafted development plan. Immutable once the planner returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevelopmentPlan {
    pub plan_id: String,
    pub new_green_space: f64,
    pub new_residential_zones: u32,
    pub new_commercial_zones: u32,
    pub transit_routes_added: u32,
    pub building_proposals: Vec<BuildingProposal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    Approved,
    NeedsRevision,
    Disapproved,
}

impl FeedbackCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackCategory::Approved => "approved",
            FeedbackCategory::NeedsRevision => "needs_revision",
            FeedbackCategory::Disapproved => "disapproved",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackDecision {
    pub category: FeedbackCategory,
    pub reason: String,
}

impl FeedbackDecision {
    pub fn is_approval(&self) -> bool {
        self.category == FeedbackCategory::Approved
    }
}

/// Mutable scratch state for one cycle. Each stage fills in its slot; the
/// orchestrator turns the finished state into a [`CycleReport`].
#[derive(Debug, Default, Clone)]
pub struct CycleState {
    pub snapshot: Option<EnvironmentSnapshot>,
    pub plan: Option<DevelopmentPlan>,
    pub score: Option<u8>,
    pub feedback: Option<FeedbackDecision>,
}

impl CycleState {
    pub fn into_report(self, iteration: u32) -> CycleReport {
        CycleReport {
            iteration,
            snapshot: self.snapshot,
            plan: self.plan,
            score: self.score,
            feedback: self.feedback,
        }
    }
}

/// Immutable record of one finished cycle, as written to snapshots and
/// streamed to the viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub iteration: u32,
    pub snapshot: Option<EnvironmentSnapshot>,
    pub plan: Option<DevelopmentPlan>,
    pub score: Option<u8>,
    pub feedback: Option<FeedbackDecision>,
}

impl CycleReport {
    pub fn approved(&self) -> bool {
        self.feedback
            .as_ref()
            .map(FeedbackDecision::is_approval)
            .unwrap_or(false)
    }
}

//! Service layer for plan orchestration.
//!
//! Services sit on top of the algorithms and own the order in which stages run.

pub mod plan;

pub use plan::{
    generate_plan, generate_plan_async, generate_plan_from_json, ExercisePlan, PlanGenerator,
    PlanMeta, PlanPhases,
};

//! Astroplan - deterministic 21-day exercise plans from natal charts.
//!
//! The pipeline runs in fixed order:
//! normalize → validate → sanitize → analyze → rules → scoring → selection
//! → conflict resolution → phase distribution → assembly.
//!
//! # Example
//!
//! ```
//! use astroplan_rust::catalog::{EnergyLevel, ExerciseCatalog, ExerciseTemplate, Timing};
//! use astroplan_rust::config::PlanConfig;
//! use astroplan_rust::logging::NoopLogger;
//! use astroplan_rust::services::generate_plan_from_json;
//!
//! let catalog = ExerciseCatalog::from_templates(
//!     (1..=6)
//!         .map(|i| ExerciseTemplate {
//!             id: format!("ex-{}", i),
//!             name: None,
//!             category: "breathwork".to_string(),
//!             duration: 10,
//!             intensity: 1,
//!             timing: Timing::Anytime,
//!             energy_level: EnergyLevel::Low,
//!             contraindications: vec![],
//!             safety_info: None,
//!             tags: vec![],
//!             target_areas: vec![],
//!         })
//!         .collect(),
//! )
//! .unwrap();
//!
//! let chart = r#"{
//!     "planets": [{"name": "Luna", "sign": "Cáncer", "degree": 100.0, "house": 4}],
//!     "aspects": []
//! }"#;
//! let plan = generate_plan_from_json(chart, &catalog, &PlanConfig::default(), &NoopLogger).unwrap();
//! assert_eq!(plan.total_exercises, 6);
//! assert_eq!(plan.meta.confidence, plan.chart_analysis.confidence.score);
//! ```

pub mod algorithms;
pub mod catalog;
pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod logging;
pub mod parsing;
pub mod preprocessing;
pub mod services;

pub use error::{CatalogError, PlanError, PlanResult, RuleError};
pub use services::plan::{generate_plan, generate_plan_async, ExercisePlan, PlanGenerator};

//! Plan-building algorithms.
//!
//! Every stage after preprocessing lives here, in pipeline order.
//!
//! # Components
//!
//! - [`dignity`]: Static essential-dignity table
//! - [`analysis`]: Chart analysis (dominances, Moon stress, stelliums, confidence)
//! - [`rules`]: Pluggable rule catalog producing priority outputs
//! - [`scoring`]: Priority scoring, ranking and confidence filtering
//! - [`selection`]: Exercise matching and tiered greedy selection
//! - [`conflicts`]: Conflict detection and iterative resolution
//! - [`phases`]: Distribution into three intensity-ordered phases
//!
//! # Example
//!
//! ```
//! use astroplan_rust::algorithms::{analyze_chart, RulesEngine};
//! use astroplan_rust::core::domain::Chart;
//! use astroplan_rust::logging::NoopLogger;
//!
//! let chart = Chart::default();
//! let analysis = analyze_chart(&chart);
//! let report = RulesEngine::default().evaluate(&chart, &analysis, &NoopLogger);
//! assert!(report.used_fallback);
//! ```

pub mod analysis;
pub mod conflicts;
pub mod dignity;
pub mod phases;
pub mod rules;
pub mod scoring;
pub mod selection;

pub use analysis::{analyze_chart, ChartAnalysis, ChartAnalyzer};
pub use conflicts::{detect_conflicts, resolve_conflicts, ConflictResolution, ExerciseConflict};
pub use dignity::{dignity_of, DignityInfo, DignityType};
pub use phases::{distribute_phases, ExercisePhase, KeyThemeProvider, PhaseThemeProvider};
pub use rules::{PriorityArea, Rule, RuleOutput, RuleReport, RulesEngine};
pub use scoring::{ScoredPriority, ScoringEngine, ScoringOutcome};
pub use selection::{select_exercises, SelectionOutcome};

pub mod pipeline;
pub mod sanitizer;
pub mod validator;

pub use pipeline::{preprocess_chart, PreprocessConfig, PreprocessPipeline, PreprocessResult};
pub use sanitizer::{ChartSanitizer, SanitizedChart};
pub use validator::{ChartValidator, ValidationResult, ValidationStats};

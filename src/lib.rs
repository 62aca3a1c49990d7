// Library interface for trackdelta
// This allows integration tests and benchmarks to access internal modules

pub mod comparison;
pub mod config;
pub mod errors;
pub mod render;
pub mod telemetry;
pub mod ui;
pub mod writer;

// Re-export commonly used types
pub use comparison::{Comparison, ComparisonConfig, ComparisonMap, build_comparison_map};
pub use errors::TrackDeltaError;
pub use render::{ComparisonMapRenderer, MapRenderConfig};
pub use telemetry::{Session, load_session_jsonl};

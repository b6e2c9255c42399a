pub mod analysis;
pub mod clause;
pub mod config;

pub use analysis::*;
pub use clause::ClauseRequest;
pub use config::{AnalysisPolicy, Config};

// Orchestrated resume parsing
pub mod orchestrator;

pub use orchestrator::{Orchestrator, ParseMode, ParseReport};

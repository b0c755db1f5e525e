// Retrieval-grounded questions and resume insights via the local model server.

pub mod assistant;
pub mod prompts;
pub mod retrieval;

pub use assistant::{Answer, Insights, ResumeAssistant};

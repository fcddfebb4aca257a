// Resume vs job-description analysis.
// LLM-backed tasks go through llm_client::Dispatcher; insights are computed locally.

pub mod handlers;
pub mod insights;
pub mod percentage;
pub mod tasks;

// RFQ → technical proposal generation.
// All LLM calls go through llm_client; all remote files through sharepoint.

pub mod generator;
pub mod handlers;
pub mod pipeline;
pub mod prompts;

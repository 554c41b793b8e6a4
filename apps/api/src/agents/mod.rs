// The five InternAI agents.
// Each agent degrades to a deterministic fallback when its provider is absent or fails.
// All LLM calls go through llm_client, all embedding calls through embeddings.

pub mod app_writer;
pub mod coach;
pub mod cv_analyzer;
pub mod handlers;
pub mod job_scout;
pub mod matcher;
pub mod prompts;
pub mod skills;

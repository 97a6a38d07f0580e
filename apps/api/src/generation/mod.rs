// Single-shot text generation for individual builder fields.
// All LLM calls go through llm_client; nothing generated here is persisted.

pub mod generator;
pub mod handlers;
pub mod prompts;

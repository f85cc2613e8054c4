// Exam paper assembly.
// Flow: validate request → resolve mark policy → propose marks → validate → render.
// All model calls go through llm_client via LlmPaperGenerator; the assembler itself
// only sees the PaperGenerator trait.

pub mod assembler;
pub mod blueprint;
pub mod handlers;
pub mod llm_generator;
pub mod marks;
pub mod prompts;
pub mod resolver;
pub mod spec;

use std::sync::Arc;

use crate::exam::assembler::PaperGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data; every request is assembled independently.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable paper generator. Default: LlmPaperGenerator.
    pub generator: Arc<dyn PaperGenerator>,
}

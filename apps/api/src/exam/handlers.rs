//! Axum route handlers for the Exam API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::exam::assembler::{assemble_paper, GeneratedPaper};
use crate::exam::marks::{check, MarkCheck};
use crate::exam::resolver::{resolve, MarkPolicy};
use crate::exam::spec::{ExamRequest, ExamSpecification};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ValidateMarksRequest {
    pub marks: Vec<u32>,
    pub total_marks: u32,
    pub required_count: Option<u32>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/exams/generate
///
/// Full pipeline: validate request → resolve policy → propose marks → check → render.
/// Returns the paper only when the mark plan passed; otherwise 422 naming each mismatch.
pub async fn handle_generate(
    State(state): State<AppState>,
    payload: Result<Json<ExamRequest>, JsonRejection>,
) -> Result<Json<GeneratedPaper>, AppError> {
    let Json(request) = payload?;
    let spec = ExamSpecification::try_from(request)?;
    let paper = assemble_paper(state.generator.as_ref(), &spec).await?;
    Ok(Json(paper))
}

/// POST /api/v1/exams/resolve
///
/// Returns the mark policy a request resolves to, without calling the model.
pub async fn handle_resolve(
    payload: Result<Json<ExamRequest>, JsonRejection>,
) -> Result<Json<MarkPolicy>, AppError> {
    let Json(request) = payload?;
    let spec = ExamSpecification::try_from(request)?;
    Ok(Json(resolve(&spec)))
}

/// POST /api/v1/exams/validate-marks
///
/// Checks a mark list against a total and optional count. Pure; no model call.
pub async fn handle_validate_marks(
    payload: Result<Json<ValidateMarksRequest>, JsonRejection>,
) -> Result<Json<MarkCheck>, AppError> {
    let Json(request) = payload?;
    Ok(Json(check(
        &request.marks,
        request.total_marks,
        request.required_count,
    )))
}

//! `PaperGenerator` backed by the Claude API.
//!
//! The model is asked for a mark plan first. If the plan fails the same checks the
//! assembler applies, the model is re-asked once with the problems listed; the
//! second plan is returned as-is and the assembler makes the final call.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::exam::assembler::{PaperGenerator, RenderedPaper};
use crate::exam::marks::{check_against_policy, describe, ProposedMarkSet, ValidatedMarkSet};
use crate::exam::prompts::{
    ANSWER_KEY_INSTRUCTION, BLUEPRINT_INSTRUCTION, NO_ANSWER_KEY_INSTRUCTION,
    NO_BLUEPRINT_INSTRUCTION, PAPER_PROMPT_TEMPLATE, PAPER_SYSTEM, PLAN_FEEDBACK_TEMPLATE,
    PLAN_PROMPT_TEMPLATE, PLAN_SYSTEM,
};
use crate::exam::resolver::MarkPolicy;
use crate::exam::spec::{ExamSpecification, GenerationMode};
use crate::llm_client::prompts::{EXACT_NUMBERS_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::{
    parse_json_reply, LlmError, TextCompleter, PAPER_MAX_TOKENS, PLAN_MAX_TOKENS,
};

/// First plan plus one corrected plan.
const MAX_PROPOSAL_ATTEMPTS: u32 = 2;

pub struct LlmPaperGenerator {
    llm: Box<dyn TextCompleter>,
}

impl LlmPaperGenerator {
    pub fn new(llm: impl TextCompleter + 'static) -> Self {
        Self { llm: Box::new(llm) }
    }

    async fn complete_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
        max_tokens: u32,
    ) -> Result<T, LlmError> {
        let text = self.llm.complete(prompt, system, max_tokens).await?;
        parse_json_reply(&text)
    }
}

#[async_trait]
impl PaperGenerator for LlmPaperGenerator {
    async fn propose(
        &self,
        spec: &ExamSpecification,
        policy: &MarkPolicy,
    ) -> Result<ProposedMarkSet, AppError> {
        let system = format!("{PLAN_SYSTEM} {JSON_ONLY_SYSTEM}");
        let mut feedback = String::new();
        let mut last = ProposedMarkSet::default();

        for attempt in 1..=MAX_PROPOSAL_ATTEMPTS {
            let prompt = build_plan_prompt(spec, policy, &feedback)?;
            let proposal: ProposedMarkSet = self
                .complete_json(&prompt, &system, PLAN_MAX_TOKENS)
                .await
                .map_err(|e| AppError::Llm(format!("Mark plan LLM call failed: {e}")))?;

            let result = check_against_policy(&proposal.marks, policy);
            if result.passed {
                info!(
                    "Mark plan accepted on attempt {}/{}: {} questions",
                    attempt, MAX_PROPOSAL_ATTEMPTS, result.count
                );
                return Ok(proposal);
            }

            let problems = describe(&result.mismatches);
            warn!(
                "Mark plan attempt {}/{} rejected: {}",
                attempt, MAX_PROPOSAL_ATTEMPTS, problems
            );
            feedback = build_feedback(&proposal, &problems);
            last = proposal;
        }

        Ok(last)
    }

    async fn render(
        &self,
        spec: &ExamSpecification,
        marks: &ValidatedMarkSet,
    ) -> Result<RenderedPaper, AppError> {
        let prompt = build_paper_prompt(spec, marks)?;
        let system = format!("{PAPER_SYSTEM} {JSON_ONLY_SYSTEM}");

        self.complete_json(&prompt, &system, PAPER_MAX_TOKENS)
            .await
            .map_err(render_error)
    }
}

/// A reply with no text, or text that isn't a paper (usually cut off at the
/// token budget), counts as no usable content. Transport failures stay `Llm`.
fn render_error(e: LlmError) -> AppError {
    match e {
        LlmError::EmptyContent => {
            AppError::Generation("model returned no paper content".to_string())
        }
        LlmError::Parse(e) => {
            AppError::Generation(format!("model reply was not a complete paper: {e}"))
        }
        other => AppError::Llm(format!("Paper generation LLM call failed: {other}")),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt building
// ────────────────────────────────────────────────────────────────────────────

fn exam_json(spec: &ExamSpecification) -> Result<String, AppError> {
    serde_json::to_string_pretty(&serde_json::json!({
        "title": spec.title,
        "grade": spec.grade,
        "subject": spec.subject,
        "board": spec.board,
        "syllabus": spec.syllabus,
        "difficulty": spec.difficulty,
        "total_marks": spec.total_marks,
        "time_allotted": spec.time_allotted,
        "language": spec.language,
    }))
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize exam request: {e}")))
}

/// Plain-language statement of what the plan must satisfy.
fn describe_constraints(spec: &ExamSpecification, policy: &MarkPolicy) -> String {
    let mut lines = vec![format!("- Total marks: exactly {}", policy.total_marks)];

    match &spec.mode {
        GenerationMode::Standard => {
            lines.push(
                "- Question count: your choice; mix question types and mark values".to_string(),
            );
        }
        GenerationMode::McqOnly { question_count } => {
            lines.push(format!(
                "- Question count: exactly {question_count}, all multiple-choice"
            ));
        }
        GenerationMode::SectionWise { sections } => {
            lines.push(format!(
                "- Question count: exactly {}",
                sections.question_count()
            ));
            lines.push(
                "- Sections (every question in a section carries that section's marks):"
                    .to_string(),
            );
            for bucket in sections.buckets().iter().filter(|b| b.count > 0) {
                lines.push(format!(
                    "  - {}: {} question(s) × {} mark(s)",
                    bucket.name, bucket.count, bucket.marks_each
                ));
            }
        }
    }

    lines.join("\n")
}

fn build_feedback(previous: &ProposedMarkSet, problems: &str) -> String {
    let previous_marks =
        serde_json::to_string(&previous.marks).unwrap_or_else(|_| format!("{:?}", previous.marks));
    PLAN_FEEDBACK_TEMPLATE
        .replace("{previous_marks}", &previous_marks)
        .replace("{problems}", problems)
}

fn build_plan_prompt(
    spec: &ExamSpecification,
    policy: &MarkPolicy,
    feedback: &str,
) -> Result<String, AppError> {
    Ok(PLAN_PROMPT_TEMPLATE
        .replace("{exact_numbers_instruction}", EXACT_NUMBERS_INSTRUCTION)
        .replace("{exam_json}", &exam_json(spec)?)
        .replace("{constraints}", &describe_constraints(spec, policy))
        .replace("{feedback}", feedback))
}

fn build_paper_prompt(
    spec: &ExamSpecification,
    marks: &ValidatedMarkSet,
) -> Result<String, AppError> {
    let marks_json = serde_json::to_string(marks.marks())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize marks: {e}")))?;

    let mut extras = vec![
        if spec.include_answer_key {
            ANSWER_KEY_INSTRUCTION
        } else {
            NO_ANSWER_KEY_INSTRUCTION
        },
        if spec.include_blueprint {
            BLUEPRINT_INSTRUCTION
        } else {
            NO_BLUEPRINT_INSTRUCTION
        },
    ];
    if matches!(spec.mode, GenerationMode::McqOnly { .. }) {
        extras.push("Every question is multiple-choice with four options labelled (a)–(d).");
    }

    Ok(PAPER_PROMPT_TEMPLATE
        .replace("{exam_json}", &exam_json(spec)?)
        .replace("{marks_json}", &marks_json)
        .replace("{question_count}", &marks.marks().len().to_string())
        .replace("{total_marks}", &spec.total_marks.to_string())
        .replace("{extras}", &extras.join("\n")))
}

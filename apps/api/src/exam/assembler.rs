//! Plan-then-generate assembly of one exam paper.
//!
//! Propose → Validate → Generate, or Propose → Validate → Aborted.
//!
//! The assembler owns the state machine. The `PaperGenerator` collaborator only
//! proposes a mark list and renders text from a validated one; it never decides
//! whether a plan is acceptable. There is no retry loop here: one proposal, one
//! check, and on failure the request fails with every mismatch named.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::exam::blueprint::build_blueprint;
use crate::exam::marks::{self, ProposedMarkSet, ValidatedMarkSet};
use crate::exam::resolver::{resolve, MarkPolicy};
use crate::exam::spec::ExamSpecification;

// ────────────────────────────────────────────────────────────────────────────
// Collaborator trait
// ────────────────────────────────────────────────────────────────────────────

/// Text produced by the collaborator from a validated plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderedPaper {
    #[serde(default)]
    pub paper_text: Option<String>,
    #[serde(default)]
    pub answer_key_text: Option<String>,
    #[serde(default)]
    pub blueprint_text: Option<String>,
}

/// The content-producing side of assembly. Implement this to swap backends
/// without touching the handler or the assembler.
///
/// Carried in `AppState` as `Arc<dyn PaperGenerator>`.
#[async_trait]
pub trait PaperGenerator: Send + Sync {
    /// Invents a per-question mark list for the specification.
    async fn propose(
        &self,
        spec: &ExamSpecification,
        policy: &MarkPolicy,
    ) -> Result<ProposedMarkSet, AppError>;

    /// Writes the paper for an accepted mark list.
    async fn render(
        &self,
        spec: &ExamSpecification,
        marks: &ValidatedMarkSet,
    ) -> Result<RenderedPaper, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

/// A finished paper. Only produced after validation and a non-empty render.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPaper {
    pub paper_id: Uuid,
    pub title: String,
    pub total_marks: u32,
    pub marks: Vec<u32>,
    pub paper_text: String,
    pub answer_key_text: Option<String>,
    pub blueprint_text: Option<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyPhase {
    Propose,
    Validate,
    Generate,
    Aborted,
}

impl std::fmt::Display for AssemblyPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AssemblyPhase::Propose => "propose",
            AssemblyPhase::Validate => "validate",
            AssemblyPhase::Generate => "generate",
            AssemblyPhase::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Assembly
// ────────────────────────────────────────────────────────────────────────────

/// Runs one plan-then-generate attempt for `spec`.
///
/// Errors:
/// - `AppError::MarkValidation` when the proposal fails any mark check (render is never called)
/// - `AppError::Generation` when the render comes back without paper text
/// - whatever the generator itself returns for transport failures
pub async fn assemble_paper(
    generator: &dyn PaperGenerator,
    spec: &ExamSpecification,
) -> Result<GeneratedPaper, AppError> {
    let policy = resolve(spec);
    info!(
        phase = %AssemblyPhase::Propose,
        mode = %policy.mode,
        total_marks = policy.total_marks,
        required_count = ?policy.required_count,
        "Planning paper '{}'",
        spec.title
    );

    let proposal = generator.propose(spec, &policy).await?;

    info!(
        phase = %AssemblyPhase::Validate,
        proposed = proposal.marks.len(),
        "Checking proposed marks"
    );
    let validated = match marks::accept(proposal, &policy) {
        Ok(validated) => validated,
        Err(mismatches) => {
            warn!(
                phase = %AssemblyPhase::Aborted,
                "Proposal rejected for '{}': {}",
                spec.title,
                marks::describe(&mismatches)
            );
            return Err(AppError::MarkValidation(mismatches));
        }
    };

    info!(
        phase = %AssemblyPhase::Generate,
        questions = validated.marks().len(),
        "Rendering paper"
    );
    let rendered = generator.render(spec, &validated).await?;

    let paper_text = rendered
        .paper_text
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::Generation(format!(
                "no paper text returned for '{}' after marks validated",
                spec.title
            ))
        })?;

    let answer_key_text = if spec.include_answer_key {
        non_empty(rendered.answer_key_text)
    } else {
        None
    };

    let blueprint_text = if spec.include_blueprint {
        non_empty(rendered.blueprint_text).or_else(|| Some(build_blueprint(spec, &validated)))
    } else {
        None
    };

    let paper = GeneratedPaper {
        paper_id: Uuid::new_v4(),
        title: spec.title.clone(),
        total_marks: spec.total_marks,
        marks: validated.into_inner(),
        paper_text,
        answer_key_text,
        blueprint_text,
        generated_at: Utc::now(),
    };

    info!(
        "Generated paper {} ('{}') with {} questions",
        paper.paper_id,
        paper.title,
        paper.marks.len()
    );

    Ok(paper)
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::exam::marks::MarkMismatch;
    use crate::exam::spec::{Difficulty, GenerationMode, SectionBuckets};

    /// Returns canned proposals and renders, counting calls.
    struct ScriptedGenerator {
        proposal: Vec<u32>,
        rendered: RenderedPaper,
        renders: AtomicUsize,
    }

    impl ScriptedGenerator {
        fn new(proposal: Vec<u32>, rendered: RenderedPaper) -> Self {
            Self {
                proposal,
                rendered,
                renders: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PaperGenerator for ScriptedGenerator {
        async fn propose(
            &self,
            _spec: &ExamSpecification,
            _policy: &MarkPolicy,
        ) -> Result<ProposedMarkSet, AppError> {
            Ok(ProposedMarkSet::new(self.proposal.clone()))
        }

        async fn render(
            &self,
            _spec: &ExamSpecification,
            _marks: &ValidatedMarkSet,
        ) -> Result<RenderedPaper, AppError> {
            self.renders.fetch_add(1, Ordering::SeqCst);
            Ok(self.rendered.clone())
        }
    }

    fn spec(mode: GenerationMode, total_marks: u32) -> ExamSpecification {
        ExamSpecification {
            title: "Chemistry Unit Test".to_string(),
            grade: "Grade 9".to_string(),
            subject: "Chemistry".to_string(),
            board: Some("ICSE".to_string()),
            syllabus: Some("Atoms and molecules".to_string()),
            difficulty: Difficulty::Easy,
            total_marks,
            time_allotted: Some("45 minutes".to_string()),
            language: "English".to_string(),
            mode,
            include_answer_key: true,
            include_blueprint: false,
        }
    }

    fn full_render() -> RenderedPaper {
        RenderedPaper {
            paper_text: Some("# Chemistry Unit Test\n1. Define an atom. [1 mark]".to_string()),
            answer_key_text: Some("1. The smallest unit of an element.".to_string()),
            blueprint_text: None,
        }
    }

    #[tokio::test]
    async fn test_valid_proposal_is_rendered() {
        let generator = ScriptedGenerator::new(vec![1, 1, 1, 2, 5], full_render());
        let paper = assemble_paper(&generator, &spec(GenerationMode::Standard, 10))
            .await
            .unwrap();

        assert_eq!(paper.marks, vec![1, 1, 1, 2, 5]);
        assert_eq!(paper.total_marks, 10);
        assert!(paper.paper_text.starts_with("# Chemistry Unit Test"));
        assert!(paper.answer_key_text.is_some());
        assert!(paper.blueprint_text.is_none());
        assert_eq!(generator.renders.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sum_mismatch_aborts_before_render() {
        let generator = ScriptedGenerator::new(vec![2, 3, 4], full_render());
        let err = assemble_paper(&generator, &spec(GenerationMode::Standard, 10))
            .await
            .unwrap_err();

        match err {
            AppError::MarkValidation(mismatches) => assert_eq!(
                mismatches,
                vec![MarkMismatch::Sum {
                    expected: 10,
                    actual: 9
                }]
            ),
            other => panic!("expected MarkValidation, got {other:?}"),
        }
        assert_eq!(generator.renders.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_count_mismatch_aborts_in_mcq_mode() {
        let generator = ScriptedGenerator::new(vec![1, 1, 1, 1, 1], full_render());
        let err = assemble_paper(
            &generator,
            &spec(GenerationMode::McqOnly { question_count: 4 }, 5),
        )
        .await
        .unwrap_err();

        let expected = vec![MarkMismatch::Count {
            expected: 4,
            actual: 5,
        }];
        assert!(matches!(err, AppError::MarkValidation(ref m) if m == &expected));
        assert_eq!(generator.renders.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_render_is_generation_failure() {
        let rendered = RenderedPaper {
            paper_text: Some("   ".to_string()),
            ..Default::default()
        };
        let generator = ScriptedGenerator::new(vec![5, 5], rendered);
        let err = assemble_paper(&generator, &spec(GenerationMode::Standard, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
    }

    #[tokio::test]
    async fn test_answer_key_dropped_when_not_requested() {
        let generator = ScriptedGenerator::new(vec![5, 5], full_render());
        let mut spec = spec(GenerationMode::Standard, 10);
        spec.include_answer_key = false;
        let paper = assemble_paper(&generator, &spec).await.unwrap();
        assert!(paper.answer_key_text.is_none());
    }

    #[tokio::test]
    async fn test_blueprint_falls_back_to_mark_table() {
        let sections = SectionBuckets {
            mcq: 2,
            two_mark: 1,
            ..Default::default()
        };
        let generator = ScriptedGenerator::new(vec![1, 1, 2], full_render());
        let mut spec = spec(GenerationMode::SectionWise { sections }, 4);
        spec.include_blueprint = true;

        let paper = assemble_paper(&generator, &spec).await.unwrap();
        let blueprint = paper.blueprint_text.unwrap();
        assert!(blueprint.contains("| MCQ (1 mark) | 2 | 2 |"));
        assert!(blueprint.contains("| **Total** | **3** | **4** |"));
    }

    #[tokio::test]
    async fn test_section_tier_mismatch_aborts() {
        let sections = SectionBuckets {
            two_mark: 2,
            four_mark: 1,
            ..Default::default()
        };
        let generator = ScriptedGenerator::new(vec![3, 3, 2], full_render());
        let err = assemble_paper(&generator, &spec(GenerationMode::SectionWise { sections }, 8))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MarkValidation(_)));
        assert_eq!(generator.renders.load(Ordering::SeqCst), 0);
    }
}

//! Mode Resolver — derives the mark policy a proposal is checked against.

use serde::Serialize;

use crate::exam::spec::{ExamSpecification, GenerationMode, GenerationModeKind, SectionBuckets};

/// What a proposed mark set must satisfy for a given specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkPolicy {
    pub mode: GenerationModeKind,
    /// `None` in standard mode: question count is free.
    pub required_count: Option<u32>,
    pub total_marks: u32,
    /// Section-wise only: per-tier question counts the proposal must reproduce.
    pub tiers: Option<SectionBuckets>,
}

/// Resolves the effective question count and mark-check policy for a specification.
///
/// - Section-wise: required count = sum of the five bucket counts.
/// - MCQ-only: required count = the caller's exact count.
/// - Standard: no required count, only the total applies.
pub fn resolve(spec: &ExamSpecification) -> MarkPolicy {
    let (required_count, tiers) = match &spec.mode {
        GenerationMode::Standard => (None, None),
        GenerationMode::McqOnly { question_count } => (Some(*question_count), None),
        GenerationMode::SectionWise { sections } => {
            (Some(sections.question_count()), Some(*sections))
        }
    };

    MarkPolicy {
        mode: spec.mode.kind(),
        required_count,
        total_marks: spec.total_marks,
        tiers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exam::spec::Difficulty;

    fn spec(mode: GenerationMode, total_marks: u32) -> ExamSpecification {
        ExamSpecification {
            title: "Unit Test".to_string(),
            grade: "Grade 8".to_string(),
            subject: "Mathematics".to_string(),
            board: None,
            syllabus: None,
            difficulty: Difficulty::Medium,
            total_marks,
            time_allotted: None,
            language: "English".to_string(),
            mode,
            include_answer_key: true,
            include_blueprint: false,
        }
    }

    #[test]
    fn test_section_wise_required_count_is_bucket_sum() {
        let sections = SectionBuckets {
            mcq: 5,
            one_mark: 0,
            two_mark: 3,
            three_mark: 0,
            four_mark: 2,
        };
        let policy = resolve(&spec(GenerationMode::SectionWise { sections }, 19));
        assert_eq!(policy.required_count, Some(10));
        assert_eq!(policy.total_marks, 19);
        assert_eq!(policy.tiers, Some(sections));
        assert_eq!(policy.mode, GenerationModeKind::SectionWise);
    }

    #[test]
    fn test_mcq_only_uses_caller_count() {
        let policy = resolve(&spec(GenerationMode::McqOnly { question_count: 25 }, 25));
        assert_eq!(policy.required_count, Some(25));
        assert!(policy.tiers.is_none());
    }

    #[test]
    fn test_standard_has_no_required_count() {
        let policy = resolve(&spec(GenerationMode::Standard, 80));
        assert_eq!(policy.required_count, None);
        assert_eq!(policy.total_marks, 80);
        assert!(policy.tiers.is_none());
    }

    #[test]
    fn test_total_marks_is_passed_through_unchanged() {
        // Standard mode never recomputes the caller's total.
        let policy = resolve(&spec(GenerationMode::Standard, 37));
        assert_eq!(policy.total_marks, 37);
    }
}

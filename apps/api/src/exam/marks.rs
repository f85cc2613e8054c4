//! Mark-Set Validator — decides whether a proposed per-question mark list fits the exam.
//!
//! `validate` is the bare predicate: exact sum, and exact count when one is required.
//! `check_against_policy` adds the stricter checks the assembler applies to model
//! proposals: no zero-mark questions, and in section-wise mode the proposal must
//! reproduce the requested number of questions at each mark tier.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::exam::resolver::MarkPolicy;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// One mark value per question, in paper order, as proposed by the generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedMarkSet {
    pub marks: Vec<u32>,
}

impl ProposedMarkSet {
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn new(marks: Vec<u32>) -> Self {
        Self { marks }
    }
}

/// A mark set that has passed `check_against_policy`. Only `accept` builds one,
/// so rendering can never start from an unchecked proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidatedMarkSet(Vec<u32>);

impl ValidatedMarkSet {
    pub fn marks(&self) -> &[u32] {
        &self.0
    }

    pub fn total(&self) -> u64 {
        sum(&self.0)
    }

    pub fn into_inner(self) -> Vec<u32> {
        self.0
    }
}

/// A single failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarkMismatch {
    /// Marks add up to something other than the requested total.
    Sum { expected: u32, actual: u64 },
    /// Wrong number of questions.
    Count { expected: u32, actual: usize },
    /// A question carries zero marks. `position` is 1-based.
    ZeroMark { position: usize },
    /// Section-wise: wrong number of questions at this mark value.
    Tier { marks: u32, expected: u32, actual: u32 },
}

impl fmt::Display for MarkMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkMismatch::Sum { expected, actual } => {
                write!(f, "marks sum to {actual} but the paper is worth {expected}")
            }
            MarkMismatch::Count { expected, actual } => {
                write!(f, "{actual} questions proposed but {expected} are required")
            }
            MarkMismatch::ZeroMark { position } => {
                write!(f, "question {position} carries zero marks")
            }
            MarkMismatch::Tier {
                marks,
                expected,
                actual,
            } => write!(
                f,
                "{actual} questions worth {marks} mark(s) proposed but the sections call for {expected}"
            ),
        }
    }
}

/// Outcome of checking one proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkCheck {
    pub sum: u64,
    pub count: usize,
    pub passed: bool,
    pub mismatches: Vec<MarkMismatch>,
}

// ────────────────────────────────────────────────────────────────────────────
// Checks
// ────────────────────────────────────────────────────────────────────────────

fn sum(marks: &[u32]) -> u64 {
    marks.iter().map(|&m| u64::from(m)).sum()
}

/// `sum(marks) == total_marks` and, when `required_count` is set, `len == required_count`.
#[cfg_attr(not(test), allow(dead_code))]
pub fn validate(marks: &[u32], total_marks: u32, required_count: Option<u32>) -> bool {
    check(marks, total_marks, required_count).passed
}

/// Same decision as `validate`, reporting the sum, count and which check failed.
pub fn check(marks: &[u32], total_marks: u32, required_count: Option<u32>) -> MarkCheck {
    let sum = sum(marks);
    let count = marks.len();
    let mut mismatches = Vec::new();

    if sum != u64::from(total_marks) {
        mismatches.push(MarkMismatch::Sum {
            expected: total_marks,
            actual: sum,
        });
    }

    if let Some(required) = required_count {
        if count as u64 != u64::from(required) {
            mismatches.push(MarkMismatch::Count {
                expected: required,
                actual: count,
            });
        }
    }

    MarkCheck {
        sum,
        count,
        passed: mismatches.is_empty(),
        mismatches,
    }
}

/// Full check applied to generator proposals.
pub fn check_against_policy(marks: &[u32], policy: &MarkPolicy) -> MarkCheck {
    let mut result = check(marks, policy.total_marks, policy.required_count);

    result.mismatches.extend(
        marks
            .iter()
            .enumerate()
            .filter(|(_, m)| **m == 0)
            .map(|(i, _)| MarkMismatch::ZeroMark { position: i + 1 }),
    );

    if let Some(tiers) = &policy.tiers {
        let mut actual: BTreeMap<u32, u32> = BTreeMap::new();
        for &m in marks {
            *actual.entry(m).or_default() += 1;
        }

        let mut expected: BTreeMap<u32, u32> = BTreeMap::new();
        for (value, count) in tiers.tier_counts() {
            if count > 0 {
                expected.insert(value, count);
            }
        }

        let values: std::collections::BTreeSet<u32> =
            actual.keys().chain(expected.keys()).copied().collect();
        for value in values {
            let want = expected.get(&value).copied().unwrap_or(0);
            let got = actual.get(&value).copied().unwrap_or(0);
            // zero-mark questions are already reported individually
            if want != got && value != 0 {
                result.mismatches.push(MarkMismatch::Tier {
                    marks: value,
                    expected: want,
                    actual: got,
                });
            }
        }
    }

    result.passed = result.mismatches.is_empty();
    result
}

/// Promotes a proposal to a `ValidatedMarkSet`, or returns every failed check.
pub fn accept(
    proposal: ProposedMarkSet,
    policy: &MarkPolicy,
) -> Result<ValidatedMarkSet, Vec<MarkMismatch>> {
    let result = check_against_policy(&proposal.marks, policy);
    if result.passed {
        Ok(ValidatedMarkSet(proposal.marks))
    } else {
        Err(result.mismatches)
    }
}

/// Joins mismatches into one user-readable sentence.
pub fn describe(mismatches: &[MarkMismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exam::spec::{GenerationModeKind, SectionBuckets};

    fn standard(total_marks: u32) -> MarkPolicy {
        MarkPolicy {
            mode: GenerationModeKind::Standard,
            required_count: None,
            total_marks,
            tiers: None,
        }
    }

    fn sample_sets() -> Vec<Vec<u32>> {
        vec![
            vec![],
            vec![1],
            vec![0, 0],
            vec![1, 1, 1, 2, 5],
            vec![2, 3, 4],
            vec![4, 4, 4, 4],
            vec![1, 1, 1, 1, 1],
            vec![10, 0, 3],
        ]
    }

    #[test]
    fn test_without_count_is_sum_equality() {
        for marks in sample_sets() {
            for total in 0..=20u32 {
                let expected = marks.iter().sum::<u32>() == total;
                assert_eq!(validate(&marks, total, None), expected, "{marks:?} / {total}");
            }
        }
    }

    #[test]
    fn test_with_count_is_sum_and_length_equality() {
        for marks in sample_sets() {
            for total in 0..=20u32 {
                for count in 0..=6u32 {
                    let expected =
                        marks.iter().sum::<u32>() == total && marks.len() == count as usize;
                    assert_eq!(
                        validate(&marks, total, Some(count)),
                        expected,
                        "{marks:?} / {total} / {count}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_validate_is_repeatable() {
        let marks = [1, 2, 3, 4];
        let first = check(&marks, 10, Some(4));
        let second = check(&marks, 10, Some(4));
        assert_eq!(first, second);
        assert!(first.passed);
    }

    #[test]
    fn test_empty_set_boundary() {
        assert!(validate(&[], 0, None));
        assert!(validate(&[], 0, Some(0)));
        assert!(!validate(&[], 0, Some(3)));
    }

    #[test]
    fn test_standard_mode_sum_matches() {
        assert!(validate(&[1, 1, 1, 2, 5], 10, None));
    }

    #[test]
    fn test_mcq_only_five_one_mark_questions() {
        assert!(validate(&[1, 1, 1, 1, 1], 5, Some(5)));
    }

    #[test]
    fn test_count_mismatch_despite_correct_sum() {
        let result = check(&[1, 1, 1, 1, 1], 5, Some(4));
        assert!(!result.passed);
        assert_eq!(
            result.mismatches,
            vec![MarkMismatch::Count {
                expected: 4,
                actual: 5
            }]
        );
    }

    #[test]
    fn test_sum_mismatch_reports_actual_sum() {
        let result = check(&[2, 3, 4], 10, None);
        assert!(!result.passed);
        assert_eq!(result.sum, 9);
        assert_eq!(result.count, 3);
        assert_eq!(
            result.mismatches,
            vec![MarkMismatch::Sum {
                expected: 10,
                actual: 9
            }]
        );
    }

    #[test]
    fn test_sum_does_not_overflow() {
        let result = check(&[u32::MAX, u32::MAX], u32::MAX, None);
        assert_eq!(result.sum, 2 * u64::from(u32::MAX));
        assert!(!result.passed);
    }

    #[test]
    fn test_policy_rejects_zero_marks() {
        let result = check_against_policy(&[0, 5, 5], &standard(10));
        assert!(!result.passed);
        assert_eq!(result.mismatches, vec![MarkMismatch::ZeroMark { position: 1 }]);
    }

    #[test]
    fn test_policy_accepts_section_distribution() {
        let sections = SectionBuckets {
            mcq: 2,
            one_mark: 1,
            two_mark: 1,
            three_mark: 0,
            four_mark: 1,
        };
        let policy = MarkPolicy {
            mode: GenerationModeKind::SectionWise,
            required_count: Some(5),
            total_marks: 9,
            tiers: Some(sections),
        };
        let result = check_against_policy(&[1, 1, 1, 2, 4], &policy);
        assert!(result.passed, "{:?}", result.mismatches);
    }

    #[test]
    fn test_policy_rejects_miscounted_tiers_even_when_sum_matches() {
        // Buckets ask for 2×2 + 1×4 = 8 marks over 3 questions.
        let sections = SectionBuckets {
            two_mark: 2,
            four_mark: 1,
            ..Default::default()
        };
        let policy = MarkPolicy {
            mode: GenerationModeKind::SectionWise,
            required_count: Some(3),
            total_marks: 8,
            tiers: Some(sections),
        };
        // Same sum and count, wrong distribution.
        let result = check_against_policy(&[3, 3, 2], &policy);
        assert!(!result.passed);
        assert!(result.mismatches.contains(&MarkMismatch::Tier {
            marks: 3,
            expected: 0,
            actual: 2
        }));
        assert!(result.mismatches.contains(&MarkMismatch::Tier {
            marks: 4,
            expected: 1,
            actual: 0
        }));
    }

    #[test]
    fn test_accept_returns_validated_set() {
        let validated = accept(ProposedMarkSet::new(vec![5, 5]), &standard(10)).unwrap();
        assert_eq!(validated.marks(), &[5, 5]);
        assert_eq!(validated.total(), 10);
    }

    #[test]
    fn test_accept_returns_mismatches() {
        let err = accept(ProposedMarkSet::new(vec![5]), &standard(10)).unwrap_err();
        assert_eq!(describe(&err), "marks sum to 5 but the paper is worth 10");
    }
}

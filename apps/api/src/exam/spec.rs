//! Exam specification — the typed request an exam paper is assembled from.
//!
//! Raw JSON arrives as an `ExamRequest` (every field optional or loosely typed).
//! `ExamSpecification::try_from` is the only way to obtain a specification, so
//! everything downstream can assume a well-formed request with exactly one mode.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Why an `ExamRequest` could not become an `ExamSpecification`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecificationError {
    #[error("'{0}' is required")]
    MissingField(&'static str),

    #[error("total_marks must be a positive integer (got {0})")]
    NonPositiveTotal(i64),

    #[error("question_count must be a positive integer (got {0})")]
    InvalidQuestionCount(i64),

    #[error("section-wise mode requires the '{0}' bucket")]
    MissingSectionBucket(&'static str),

    #[error("section bucket '{bucket}' must not be negative (got {value})")]
    NegativeBucket { bucket: &'static str, value: i64 },

    #[error("section-wise mode requires at least one question")]
    EmptySections,

    #[error("'{field}' is not allowed in {mode} mode")]
    UnexpectedPayload {
        mode: GenerationModeKind,
        field: &'static str,
    },

    #[error(
        "section buckets carry {implied} marks but total_marks is {total}; \
        no question plan can satisfy both"
    )]
    InconsistentSections { implied: u64, total: u32 },
}

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Discriminant of the three generation modes, as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationModeKind {
    Standard,
    McqOnly,
    SectionWise,
}

impl std::fmt::Display for GenerationModeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GenerationModeKind::Standard => "standard",
            GenerationModeKind::McqOnly => "mcq_only",
            GenerationModeKind::SectionWise => "section_wise",
        };
        f.write_str(name)
    }
}

/// Question counts per mark tier. Each bucket's per-question mark value is fixed
/// by its name: MCQs and one-mark questions are worth 1, the rest as named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionBuckets {
    pub mcq: u32,
    pub one_mark: u32,
    pub two_mark: u32,
    pub three_mark: u32,
    pub four_mark: u32,
}

/// A named bucket with its fixed mark value and question count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub name: &'static str,
    pub marks_each: u32,
    pub count: u32,
}

impl SectionBuckets {
    /// The five buckets in paper order.
    pub fn buckets(&self) -> [Bucket; 5] {
        [
            Bucket {
                name: "mcq",
                marks_each: 1,
                count: self.mcq,
            },
            Bucket {
                name: "one_mark",
                marks_each: 1,
                count: self.one_mark,
            },
            Bucket {
                name: "two_mark",
                marks_each: 2,
                count: self.two_mark,
            },
            Bucket {
                name: "three_mark",
                marks_each: 3,
                count: self.three_mark,
            },
            Bucket {
                name: "four_mark",
                marks_each: 4,
                count: self.four_mark,
            },
        ]
    }

    /// Total number of questions across all buckets.
    pub fn question_count(&self) -> u32 {
        self.buckets()
            .iter()
            .fold(0u32, |acc, b| acc.saturating_add(b.count))
    }

    /// Marks the buckets add up to if every question carries its bucket's value.
    pub fn implied_marks(&self) -> u64 {
        self.buckets()
            .iter()
            .map(|b| u64::from(b.count) * u64::from(b.marks_each))
            .sum()
    }

    /// Expected number of questions per mark value (MCQ and one-mark share tier 1).
    pub fn tier_counts(&self) -> [(u32, u32); 4] {
        [
            (1, self.mcq.saturating_add(self.one_mark)),
            (2, self.two_mark),
            (3, self.three_mark),
            (4, self.four_mark),
        ]
    }
}

/// The generation-mode payload. Exactly one is carried by a specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GenerationMode {
    Standard,
    McqOnly { question_count: u32 },
    SectionWise { sections: SectionBuckets },
}

impl GenerationMode {
    pub fn kind(&self) -> GenerationModeKind {
        match self {
            GenerationMode::Standard => GenerationModeKind::Standard,
            GenerationMode::McqOnly { .. } => GenerationModeKind::McqOnly,
            GenerationMode::SectionWise { .. } => GenerationModeKind::SectionWise,
        }
    }
}

/// A validated exam request. Build with `ExamSpecification::try_from(request)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExamSpecification {
    pub title: String,
    pub grade: String,
    pub subject: String,
    pub board: Option<String>,
    pub syllabus: Option<String>,
    pub difficulty: Difficulty,
    pub total_marks: u32,
    pub time_allotted: Option<String>,
    pub language: String,
    #[serde(flatten)]
    pub mode: GenerationMode,
    pub include_answer_key: bool,
    pub include_blueprint: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire request
// ────────────────────────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

/// Section buckets as sent by the client; every bucket must be present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectionsRequest {
    pub mcq: Option<i64>,
    pub one_mark: Option<i64>,
    pub two_mark: Option<i64>,
    pub three_mark: Option<i64>,
    pub four_mark: Option<i64>,
}

/// Request body for exam paper generation, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct ExamRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub subject: String,
    pub board: Option<String>,
    pub syllabus: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub total_marks: Option<i64>,
    pub time_allotted: Option<String>,
    pub language: Option<String>,
    pub mode: GenerationModeKind,
    pub question_count: Option<i64>,
    pub sections: Option<SectionsRequest>,
    #[serde(default = "default_true")]
    pub include_answer_key: bool,
    #[serde(default)]
    pub include_blueprint: bool,
}

const DEFAULT_LANGUAGE: &str = "English";

impl TryFrom<ExamRequest> for ExamSpecification {
    type Error = SpecificationError;

    fn try_from(request: ExamRequest) -> Result<Self, Self::Error> {
        let title = required_text(request.title, "title")?;
        let grade = required_text(request.grade, "grade")?;
        let subject = required_text(request.subject, "subject")?;

        let total_marks = match request.total_marks {
            None => return Err(SpecificationError::MissingField("total_marks")),
            Some(t) if t <= 0 => return Err(SpecificationError::NonPositiveTotal(t)),
            Some(t) => {
                u32::try_from(t).map_err(|_| SpecificationError::NonPositiveTotal(t))?
            }
        };

        let mode = build_mode(request.mode, request.question_count, request.sections)?;

        if let GenerationMode::SectionWise { sections } = &mode {
            let implied = sections.implied_marks();
            if implied != u64::from(total_marks) {
                return Err(SpecificationError::InconsistentSections {
                    implied,
                    total: total_marks,
                });
            }
        }

        Ok(ExamSpecification {
            title,
            grade,
            subject,
            board: optional_text(request.board),
            syllabus: optional_text(request.syllabus),
            difficulty: request.difficulty,
            total_marks,
            time_allotted: optional_text(request.time_allotted),
            language: optional_text(request.language)
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            mode,
            include_answer_key: request.include_answer_key,
            include_blueprint: request.include_blueprint,
        })
    }
}

fn build_mode(
    kind: GenerationModeKind,
    question_count: Option<i64>,
    sections: Option<SectionsRequest>,
) -> Result<GenerationMode, SpecificationError> {
    match kind {
        GenerationModeKind::Standard => {
            reject_payload(kind, question_count.is_some(), "question_count")?;
            reject_payload(kind, sections.is_some(), "sections")?;
            Ok(GenerationMode::Standard)
        }
        GenerationModeKind::McqOnly => {
            reject_payload(kind, sections.is_some(), "sections")?;
            let count = question_count.ok_or(SpecificationError::MissingField("question_count"))?;
            if count <= 0 {
                return Err(SpecificationError::InvalidQuestionCount(count));
            }
            let question_count = u32::try_from(count)
                .map_err(|_| SpecificationError::InvalidQuestionCount(count))?;
            Ok(GenerationMode::McqOnly { question_count })
        }
        GenerationModeKind::SectionWise => {
            reject_payload(kind, question_count.is_some(), "question_count")?;
            let raw = sections.ok_or(SpecificationError::MissingField("sections"))?;
            let sections = SectionBuckets {
                mcq: bucket(raw.mcq, "mcq")?,
                one_mark: bucket(raw.one_mark, "one_mark")?,
                two_mark: bucket(raw.two_mark, "two_mark")?,
                three_mark: bucket(raw.three_mark, "three_mark")?,
                four_mark: bucket(raw.four_mark, "four_mark")?,
            };
            if sections.question_count() == 0 {
                return Err(SpecificationError::EmptySections);
            }
            Ok(GenerationMode::SectionWise { sections })
        }
    }
}

fn bucket(value: Option<i64>, name: &'static str) -> Result<u32, SpecificationError> {
    let value = value.ok_or(SpecificationError::MissingSectionBucket(name))?;
    u32::try_from(value).map_err(|_| SpecificationError::NegativeBucket {
        bucket: name,
        value,
    })
}

fn reject_payload(
    mode: GenerationModeKind,
    present: bool,
    field: &'static str,
) -> Result<(), SpecificationError> {
    if present {
        Err(SpecificationError::UnexpectedPayload { mode, field })
    } else {
        Ok(())
    }
}

fn required_text(value: String, field: &'static str) -> Result<String, SpecificationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(SpecificationError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

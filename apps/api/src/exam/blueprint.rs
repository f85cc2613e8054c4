//! Deterministic blueprint table built from a validated mark plan.
//!
//! Used when a blueprint is requested but the generator did not supply one.
//! Section-wise papers list their named buckets; other papers group questions
//! by mark value.

use std::collections::BTreeMap;

use crate::exam::marks::ValidatedMarkSet;
use crate::exam::spec::{ExamSpecification, GenerationMode};

struct Row {
    label: String,
    questions: u64,
    marks: u64,
}

/// Renders the blueprint as a markdown table with a total row.
pub fn build_blueprint(spec: &ExamSpecification, marks: &ValidatedMarkSet) -> String {
    let rows = match &spec.mode {
        GenerationMode::SectionWise { sections } => sections
            .buckets()
            .iter()
            .filter(|b| b.count > 0)
            .map(|b| Row {
                label: bucket_label(b.name, b.marks_each),
                questions: u64::from(b.count),
                marks: u64::from(b.count) * u64::from(b.marks_each),
            })
            .collect::<Vec<_>>(),
        GenerationMode::Standard | GenerationMode::McqOnly { .. } => {
            let mut by_value: BTreeMap<u32, u64> = BTreeMap::new();
            for &m in marks.marks() {
                *by_value.entry(m).or_default() += 1;
            }
            by_value
                .into_iter()
                .map(|(value, count)| Row {
                    label: mark_label(value),
                    questions: count,
                    marks: count * u64::from(value),
                })
                .collect()
        }
    };

    let mut table = format!(
        "### Blueprint: {}\n\n| Section | Questions | Marks |\n|---|---|---|\n",
        spec.title
    );
    for row in &rows {
        table.push_str(&format!(
            "| {} | {} | {} |\n",
            row.label, row.questions, row.marks
        ));
    }
    table.push_str(&format!(
        "| **Total** | **{}** | **{}** |\n",
        marks.marks().len(),
        marks.total()
    ));
    table
}

fn bucket_label(name: &str, marks_each: u32) -> String {
    match name {
        "mcq" => "MCQ (1 mark)".to_string(),
        "one_mark" => "Very short answer (1 mark)".to_string(),
        _ => format!("{marks_each}-mark questions"),
    }
}

fn mark_label(value: u32) -> String {
    if value == 1 {
        "1 mark".to_string()
    } else {
        format!("{value} marks")
    }
}

// All LLM prompt constants for exam paper assembly.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for the mark-plan step.
pub const PLAN_SYSTEM: &str = "You are an experienced examiner planning the mark \
    distribution of an exam paper before any question is written.";

/// Mark-plan prompt template.
/// Replace: {exact_numbers_instruction}, {exam_json}, {constraints}, {feedback}
pub const PLAN_PROMPT_TEMPLATE: &str = r#"{exact_numbers_instruction}

EXAM REQUEST:
{exam_json}

CONSTRAINTS:
{constraints}
{feedback}
Plan the paper by listing the marks of every question, in the order the questions will appear.
Return a JSON object with this EXACT schema (no extra fields):
{
  "marks": [1, 1, 2, 3]
}

HARD RULES:
1. Every mark value is a positive whole number
2. The marks MUST add up to exactly the total marks stated above
3. If a question count is stated, the array MUST have exactly that many entries"#;

/// System prompt for the rendering step.
pub const PAPER_SYSTEM: &str = "You are an experienced examiner writing a complete, \
    print-ready exam paper from an approved mark plan. \
    Write every question yourself; do not leave placeholders.";

/// Paper rendering prompt template.
/// Replace: {exam_json}, {marks_json}, {question_count}, {total_marks}, {extras}
pub const PAPER_PROMPT_TEMPLATE: &str = r#"EXAM REQUEST:
{exam_json}

APPROVED MARK PLAN (question i is worth marks[i]; do NOT change it):
{marks_json}

Write the paper with exactly {question_count} questions worth {total_marks} marks in total.
Show the marks of each question in brackets after it, e.g. "[2 marks]".
Write the paper in the requested language, at the requested difficulty, covering the syllabus.
{extras}
Return a JSON object with this EXACT schema:
{
  "paper_text": "Full paper as markdown, including header with title, grade, subject, time and total marks",
  "answer_key_text": "Answers for every question, numbered to match, or null",
  "blueprint_text": "Markdown blueprint table of topics against mark tiers, or null"
}"#;

/// Appended when the caller wants an answer key.
pub const ANSWER_KEY_INSTRUCTION: &str =
    "Include an answer key with a model answer or correct option for every question.";

/// Appended when the caller does not want an answer key.
pub const NO_ANSWER_KEY_INSTRUCTION: &str = "Set answer_key_text to null.";

/// Appended when the caller wants a blueprint.
pub const BLUEPRINT_INSTRUCTION: &str = "Include a blueprint table mapping syllabus topics \
    to the number of questions at each mark value.";

/// Appended when the caller does not want a blueprint.
pub const NO_BLUEPRINT_INSTRUCTION: &str = "Set blueprint_text to null.";

/// Feedback block inserted into the plan prompt after a rejected proposal.
/// Replace: {previous_marks}, {problems}
pub const PLAN_FEEDBACK_TEMPLATE: &str = r#"
YOUR PREVIOUS PLAN WAS REJECTED:
previous marks: {previous_marks}
problems: {problems}
Fix every problem listed above.
"#;

// Shared prompt fragments used by every model call.
// Exam-specific templates live in exam/prompts.rs.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Reminder appended to prompts that carry a hard numeric contract.
pub const EXACT_NUMBERS_INSTRUCTION: &str = "\
    CRITICAL: The numbers given to you are hard constraints, not suggestions. \
    Question counts and mark values must match EXACTLY. \
    Count before you answer; a reply that does not match is discarded.";

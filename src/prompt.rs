//! Prompt construction for the generation service.
//!
//! Embeds the fixed behavioral contract: exactly three meaning lines, each
//! with a short title and one paragraph containing a first-person inner
//! phrase grounded in two concrete dream details, soft modality, and a
//! JSON-only reply. The language hint is a best-effort heuristic that steers
//! tone; it never fails a request.

use serde_json::json;

use crate::model::MeaningLine;

/// System message sent alongside every generation request.
pub const SYSTEM_INSTRUCTION: &str = "Return only valid JSON. No markdown. No extra keys.";

/// One fully built generation call: system + user messages and a token cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system: String,
    pub user: String,
    pub max_output_tokens: u32,
}

/// Best-effort language hint for the prompt.
///
/// Any Cyrillic character steers the reply toward Russian; otherwise the
/// model is told to answer in the dream's own language.
pub fn detect_language_hint(text: &str) -> &'static str {
    let has_cyrillic = text
        .chars()
        .any(|c| ('\u{0400}'..='\u{04FF}').contains(&c));
    if has_cyrillic {
        "Russian"
    } else {
        "the language of the dream text"
    }
}

/// Build the generation request for a trimmed, already length-validated
/// dream text.
///
/// `retry` and `previous_lines` only add a diversification instruction and
/// prior-output context; they are never part of response validation.
pub fn build_generation_request(
    dream: &str,
    retry: bool,
    previous_lines: &[MeaningLine],
    max_output_tokens: u32,
) -> GenerationRequest {
    let lang_hint = detect_language_hint(dream);

    let mut user = format!(
        "You are an evidence-informed assistant for gentle psychological dream reflection.\n\
         Your task is NOT to decode or impose meaning, but to offer 3 possible lines of meaning \
         the user can check by inner resonance.\n\
         \n\
         Hard rules:\n\
         - Analyze ONLY the dream text provided below. Do not use memory, history, or external context.\n\
         - Language rule (strict): respond in {lang_hint}. Do not mix languages. \
         If the dream text contains multiple languages, use the dominant one.\n\
         - Tone: calm, clear, human, non-dogmatic. Use soft modality (\"maybe\", \"it could be\", \"it seems\").\n\
         - Forbidden: certainty claims (\"this definitely means\"), universal symbol dictionaries, \
         esotericism or fortune-telling, diagnosis.\n\
         \n\
         Output requirements:\n\
         - Produce EXACTLY 3 lines.\n\
         - Each line must include:\n\
           1) title: 2-5 words (same language as the dream),\n\
           2) body: ONE single paragraph (4-7 sentences) in a calm existential style.\n\
         - The body MUST include:\n\
           - an \"inner phrase\" in first person (7-14 words),\n\
           - grounding in TWO concrete dream details.\n\
         - No bullet points. No lists.\n"
    );

    if retry {
        user.push_str(
            "- This is a retry: take different angles and avoid repeating or \
             paraphrasing the previous lines.\n",
        );
    }

    user.push_str(
        "\nReturn ONLY valid JSON in the exact schema below. No markdown. No extra keys.\n\
         {\n\
           \"lines\": [\n\
             { \"id\": \"L1\", \"title\": \"string\", \"body\": \"string\" },\n\
             { \"id\": \"L2\", \"title\": \"string\", \"body\": \"string\" },\n\
             { \"id\": \"L3\", \"title\": \"string\", \"body\": \"string\" }\n\
           ]\n\
         }\n\
         \nDream text:\n",
    );
    user.push_str(dream);

    if !previous_lines.is_empty() {
        user.push_str("\n\nPrevious lines (avoid repeating these):\n");
        user.push_str(&json!(previous_lines).to_string());
    }

    GenerationRequest {
        system: SYSTEM_INSTRUCTION.to_string(),
        user,
        max_output_tokens,
    }
}

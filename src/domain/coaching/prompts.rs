//! Prompt templates for the coach persona "Lingo".
//!
//! Each builder returns the complete prompt text sent to the AI provider.
//! Templates that expect JSON say so explicitly; the caller still runs the
//! reply through [`super::extract_json`] because models often wrap it.

use serde_json::json;

/// Fallback shown when no outline exists yet.
pub const EMPTY_OUTLINE_PLACEHOLDER: &str = "No outline provided.";

/// Fallback shown when the learner has not written a draft yet.
pub const EMPTY_DRAFT_PLACEHOLDER: &str = "The user has not written anything yet.";

/// Fallback image description when the provider cannot describe an upload.
pub const IMAGE_DESCRIPTION_FALLBACK: &str = "Could not generate a description for the image.";

/// Inputs for the scaffolding prompt.
#[derive(Debug, Clone)]
pub struct ScaffoldingContext<'a> {
    pub profile_data: &'a serde_json::Value,
    pub outline: &'a str,
    /// `(sender, text)` pairs, oldest first.
    pub transcript: Vec<(&'a str, &'a str)>,
    pub image_description: Option<&'a str>,
    pub user_caption: Option<&'a str>,
}

const SCAFFOLDING_TEMPLATE: &str = r#"You are Lingo, a curious and encouraging writing partner for an English learner.
Help the learner build an outline for today's journal entry by asking personal, Socratic questions.
Keep every question between 10 and 50 words.

You receive a JSON context with:
- user_context: what we know about the learner's habits and recurring topics
- session_state: the outline so far and the recent chat history
- image_description / user_caption: present only when the learner attached a photo

Choose exactly ONE action and reply with a single JSON object, nothing else.

1. ASK_QUESTION (your default). Ask one open question that prompts reflection.
   When a photo is attached, ask about the learner's experience around it, not about what it shows.
   {"action": "ASK_QUESTION", "payload": {"question": "What happened right before this photo was taken?"}}

2. ADD_TO_OUTLINE. Once a clear point is established, add it to the outline and ask a follow-up.
   {"action": "ADD_TO_OUTLINE", "payload": {"text_to_add": "\n- Had coffee at the new cafe.", "follow_up_question": "I've added that. How was the coffee?"}}

3. SUGGEST_TOPICS. Only when the learner has no idea what to write about.
   {"action": "SUGGEST_TOPICS", "payload": {"intro": "Here are a few ideas:", "topics": ["Your commute", "A meal you enjoyed"]}}

Focus on the learner's actions, decisions and reasons. If they are unsure, steer gently toward their studies."#;

/// Builds the scaffolding-phase prompt with the JSON context appended.
pub fn scaffolding_prompt(ctx: &ScaffoldingContext<'_>) -> String {
    let history: Vec<serde_json::Value> = ctx
        .transcript
        .iter()
        .map(|(sender, text)| json!({ "sender": sender, "text": text }))
        .collect();

    let mut payload = json!({
        "user_context": ctx.profile_data,
        "session_state": {
            "outline": ctx.outline,
            "chat_history": history,
        },
    });
    if let Some(description) = ctx.image_description {
        payload["image_description"] = json!(description);
    }
    if let Some(caption) = ctx.user_caption {
        payload["user_caption"] = json!(caption);
    }

    let rendered = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());
    format!(
        "{}\n\nHere is the current context:\n\n---\n{}\n---",
        SCAFFOLDING_TEMPLATE, rendered
    )
}

const WRITING_PARTNER_TEMPLATE: &str = r#"You are Lingo, a collaborative English writing partner.
Help the learner write today's journal entry from their outline and current draft.
Be encouraging, specific and brief. Reply in plain text, not JSON.

- If they are stuck, look at the end of the draft and the next outline point and suggest a starting sentence.
- If they want a phrase improved, offer two or three alternatives with different tones.
- If they ask about grammar or vocabulary, answer directly with a short explanation.
- If they ask for general feedback, give one positive comment and one concrete suggestion about flow, detail or clarity."#;

/// Builds the writing-phase prompt, substituting placeholders for empty inputs.
pub fn writing_partner_prompt(message: &str, outline: &str, draft: &str) -> String {
    let outline = if outline.trim().is_empty() {
        EMPTY_OUTLINE_PLACEHOLDER
    } else {
        outline
    };
    let draft = if draft.trim().is_empty() {
        EMPTY_DRAFT_PLACEHOLDER
    } else {
        draft
    };
    format!(
        "{}\n\nOutline:\n---\n{}\n---\n\nCurrent draft:\n---\n{}\n---\n\nLearner's request:\n---\n{}\n---",
        WRITING_PARTNER_TEMPLATE, outline, draft, message
    )
}

const EVALUATION_TEMPLATE: &str = r#"You are Lingo, a careful and encouraging English writing coach.
Analyze the complete journal entry below and reply with a single JSON object:

{
  "high_level_summary": "one short, positive comment on the whole entry",
  "feedback_items": [
    {
      "category": "Grammar: Verb Tense",
      "incorrect_phrase": "exact text from the entry",
      "suggestion": "corrected phrase",
      "explanation": "one or two sentences a learner can follow"
    }
  ]
}

Limit feedback to the 5-7 most meaningful points. Do not report overlapping phrases.
Phrase suggestions constructively."#;

/// Builds the end-of-entry evaluation prompt.
pub fn evaluation_prompt(text: &str) -> String {
    format!(
        "{}\n\nHere is the learner's journal entry:\n\n---\n{}\n---",
        EVALUATION_TEMPLATE, text
    )
}

const QUICK_CORRECTION_TEMPLATE: &str = r#"You are an automated English grammar and spelling checker.
Reply with ONE JSON object and nothing else.

Find the single most significant error in the learner's message (spelling first, then tense, agreement, word choice).

If you find one, reply:
{"incorrect_phrase": "exact text", "suggestion": "corrected text", "explanation": "one sentence", "status": "correction_found"}

If the message is correct, reply:
{"status": "no_errors"}

If the learner wrote a word or phrase in a language other than English, ignore other errors and
give the English translation using the same "correction_found" format.

Learner's message:
---
{message}
---"#;

/// Builds the single-error correction prompt for one raw user message.
pub fn quick_correction_prompt(message: &str) -> String {
    QUICK_CORRECTION_TEMPLATE.replace("{message}", message)
}

/// Prompt used to caption an uploaded image.
pub const IMAGE_DESCRIPTION_PROMPT: &str = "Briefly describe this image for a journal entry. \
Focus on objects, actions, and the overall mood. Keep it concise, like a caption.";

/// Builds the thematic summary prompt for a finished journal.
pub fn summary_prompt(text: &str) -> String {
    format!(
        "Summarize the key events, topics, and overall sentiment of this journal entry in a few sentences.\n\n---\n{}\n---",
        text
    )
}

/// Builds the cognitive-pattern extraction prompt over a summary.
pub fn cognitive_prompt(summary: &str) -> String {
    format!(
        r#"From the summary below, identify recurring themes, the writer's decision-making style (for example logical, emotional, cautious), and any problems or challenges they expressed.
Reply with a JSON object with keys "recurring_themes" (list of strings), "decision_style" (string), "recent_sentiments" (string).

Summary:
---
{}
---"#,
        summary
    )
}

/// Builds the linguistic-pattern extraction prompt over the learner's own text.
pub fn linguistic_prompt(text: &str) -> String {
    format!(
        r#"Analyze this text from an English learner. Identify up to 3 common error types (for example "Verb Tense"), rate the vocabulary level (Beginner, Intermediate, Advanced), and name one linguistic strength.
Reply with a JSON object with keys "common_errors" (list of objects with "type" and "example"), "vocabulary_level" (string), "strength" (string).

Text:
---
{}
---"#,
        text
    )
}

use crate::domain::sources::SourceItem;
use crate::infrastructure::repositories::CompletionRequest;

use super::reconciler::ScriptBrief;

const DRAFT_TEMPERATURE: f32 = 0.7;
const REVISION_TEMPERATURE: f32 = 0.3;

/// Token budget: roughly 1.3 tokens per word plus headroom
fn max_tokens_for(target_words: usize) -> u32 {
    ((target_words as f64) * 2.0).ceil().max(256.0) as u32
}

fn format_items(items: &[SourceItem]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut block = format!(
                "[{}] {} ({}, {})\nTitle: {}",
                i + 1,
                item.topic.to_uppercase(),
                if item.source.is_empty() { "unknown source" } else { item.source.as_str() },
                item.published_at.format("%Y-%m-%d %H:%M UTC"),
                item.title
            );
            if !item.snippet.is_empty() {
                block.push_str("\nSummary: ");
                block.push_str(&item.snippet);
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn draft_request(brief: &ScriptBrief<'_>, target_words: usize) -> CompletionRequest {
    let system = format!(
        "You are a news editor writing the body of a spoken news bulletin. \
         Write in {language} with a {tone} tone. Lead with the newest items, use short \
         sentences and concrete facts (names, numbers, places). No headings, lists, \
         greetings or sign-offs: an introduction and closing are added separately.",
        language = brief.language.name(),
        tone = brief.tone,
    );

    let prompt = format!(
        "Topics: {topics}\n\n\
         Recent sources, newest and most relevant first:\n\n{items}\n\n\
         Write the bulletin body as plain spoken prose.\n\
         LENGTH: exactly {target} words. This is read aloud against a fixed time slot, \
         so the word count matters more than covering every item.",
        topics = brief.topics.join(", "),
        items = format_items(brief.items),
        target = target_words,
    );

    CompletionRequest {
        system,
        prompt,
        max_tokens: max_tokens_for(target_words),
        temperature: DRAFT_TEMPERATURE,
    }
}

/// Ask the model to move an existing draft toward the target length
pub fn revision_request(
    brief: &ScriptBrief<'_>,
    text: &str,
    current_words: usize,
    target_words: usize,
) -> CompletionRequest {
    let instruction = if current_words > target_words {
        format!(
            "Condense it by about {} words: drop the least important details, keep every key fact.",
            current_words - target_words
        )
    } else {
        format!(
            "Expand it by about {} words with concrete detail and context taken from the facts already present. Do not invent facts.",
            target_words - current_words
        )
    };

    let system = format!(
        "You are a broadcast editor adjusting script length. Keep the language ({language}), \
         the {tone} tone and a natural spoken flow. Return only the revised script.",
        language = brief.language.name(),
        tone = brief.tone,
    );

    let prompt = format!(
        "The script below has {current} words; it must have {target} words.\n\
         {instruction}\n\n\
         SCRIPT:\n{text}",
        current = current_words,
        target = target_words,
    );

    CompletionRequest {
        system,
        prompt,
        max_tokens: max_tokens_for(target_words),
        temperature: REVISION_TEMPERATURE,
    }
}

/// Models sometimes wrap the answer in reasoning tags or code fences
pub fn clean_completion(raw: &str) -> String {
    let mut text = raw;
    if let Some(idx) = text.find("</think>") {
        text = &text[idx + "</think>".len()..];
    }
    let text = text.trim();
    let text = text
        .strip_prefix("```")
        .map(strip_fence_language)
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(text);
    text.trim().to_string()
}

/// Drop a fence info string such as `text` only when a newline ends it
fn strip_fence_language(rest: &str) -> &str {
    match rest.split_once('\n') {
        Some((tag, body)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') => body,
        _ => rest,
    }
}

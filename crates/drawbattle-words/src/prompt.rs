//! Prompt construction and response parsing.

/// Builds the user prompt asking for `count` drawable words about `topic`.
pub fn build_prompt(topic: &str, count: usize) -> String {
    format!(
        "I'm building a drawing-based guessing game like Pictionary. \
         Do not include any explanations, numbers, or extra text.\n\n\
         Please give me a list of {count} words for the topic: \"{topic}\".\n\n\
         These words should:\n\
         - Be visually representable by drawing (no abstract ideas).\n\
         - Be easy to guess by players (not too obscure).\n\
         - Be appropriate for all age groups.\n\n\
         Return ONLY the list of words in plain text format, one word per line."
    )
}

/// Splits a model reply into words: one per line, trimmed, blanks dropped.
///
/// Handles both `\n` and `\r\n`. No other cleanup happens; a model that
/// numbers its lines produces numbered "words".
pub fn parse_word_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

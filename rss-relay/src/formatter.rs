//! HTML message layout for the Telegram destination.
//!
//! Inputs are inserted verbatim. Feed text containing `<`, `>` or `&` can
//! make Telegram reject the message or render it oddly; callers that need
//! safe output must escape before formatting.

const AUTHOR_TEMPLATE: (&str, &str) = ("<b>Author:</b> <i>", "</i>\n\n");
const TITLE_TEMPLATE: (&str, &str) = ("<b>Title:</b> <i>", "</i>\n\n");
const DESCRIPTION_TEMPLATE: (&str, &str) = ("<b>Description:</b> <i>", "</i>\n\n");
const LINK_TEMPLATE: (&str, &str) = ("<b>Link:</b> <i>", "</i>");

pub struct MessageFormatter;

impl MessageFormatter {
    pub fn format(author: &str, title: &str, description: &str, link: &str) -> String {
        let mut message = String::with_capacity(
            author.len() + title.len() + description.len() + link.len() + 96,
        );
        for ((open, close), value) in [
            (AUTHOR_TEMPLATE, author),
            (TITLE_TEMPLATE, title),
            (DESCRIPTION_TEMPLATE, description),
            (LINK_TEMPLATE, link),
        ] {
            message.push_str(open);
            message.push_str(value);
            message.push_str(close);
        }
        message
    }
}

/// Shortens a summary to whole sentences fitting in `max_chars` characters.
///
/// When not even the first sentence fits, the text is cut at a word
/// boundary instead so a non-empty summary never becomes empty.
pub fn truncate_summary(summary: &str, max_chars: usize) -> String {
    let mut truncated = String::new();
    let mut length = 0;

    for sentence in split_sentences(summary) {
        let sentence_len = sentence.chars().count();
        if length + sentence_len > max_chars {
            break;
        }
        truncated.push(' ');
        truncated.push_str(sentence);
        length += sentence_len + 1;
    }

    let truncated = truncated.trim();
    if truncated.is_empty() && !summary.trim().is_empty() {
        return smart_truncate(summary.trim(), max_chars);
    }
    truncated.to_string()
}

/// Splits after `.`, `!` or `?` when followed by whitespace.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let end = i + c.len_utf8();
        if !chars.peek().is_some_and(|(_, next)| next.is_whitespace()) {
            continue;
        }
        sentences.push(&text[start..end]);
        while chars.peek().is_some_and(|(_, next)| next.is_whitespace()) {
            chars.next();
        }
        start = chars.peek().map(|(j, _)| *j).unwrap_or(text.len());
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

fn smart_truncate(text: &str, max_chars: usize) -> String {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };

    let truncated = &text[..cut];
    if let Some(last_space) = truncated.rfind(' ') {
        format!("{}...", truncated[..last_space].trim_end())
    } else {
        format!("{}...", truncated)
    }
}

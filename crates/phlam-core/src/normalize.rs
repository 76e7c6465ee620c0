//! Output cleanup for model text before it reaches a chat channel.
//!
//! The model mixes markdown (headings, bullets, links), messy line
//! breaks, and occasional broken emphasis markers. `normalize` rewrites
//! all of that into the flat, bullet-friendly form the channels send,
//! while keeping fenced code, inline code, and table rows byte-for-byte
//! untouched.

use std::sync::OnceLock;

use regex::Regex;

struct Patterns {
    fenced_code: Regex,
    inline_code: Regex,
    table_row: Regex,
    numbered_break: Regex,
    trailing_space: Regex,
    extra_newlines: Regex,
    heading: Regex,
    bullet: Regex,
    markdown_link: Regex,
    url: Regex,
    sentence_end: Regex,
    list_item: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        fenced_code: Regex::new(r"(?s)```.*?```").unwrap(),
        inline_code: Regex::new(r"`[^`\n]+`").unwrap(),
        table_row: Regex::new(r"(?m)^\s*\|.+\|.*$").unwrap(),
        numbered_break: Regex::new(r"(?m)^(\d+)\.\s*\n+(\S)").unwrap(),
        trailing_space: Regex::new(r"[ \t]+\n").unwrap(),
        extra_newlines: Regex::new(r"\n{3,}").unwrap(),
        heading: Regex::new(r"(?m)^#{2,6}\s*(.+)").unwrap(),
        bullet: Regex::new(r"(?m)^[*\-\u{2022}]\s+").unwrap(),
        markdown_link: Regex::new(r"\[([^\]]+)\]\((https?://[^)]+)\)").unwrap(),
        url: Regex::new(r"(<)?(https?://[^\s>]+)(>)?").unwrap(),
        sentence_end: Regex::new(r"[.!?]\s+").unwrap(),
        list_item: Regex::new(r"^(•|-|\d+\.)\s+").unwrap(),
    })
}

const PLACEHOLDER_PREFIX: &str = "__BLOCK_";

/// Swaps protected spans for placeholder tokens so later passes cannot
/// touch them. Fenced code wins over inline code, table rows are
/// protected before they can look like bullets.
fn preserve_blocks(raw: &str) -> (String, Vec<String>) {
    let mut blocks = Vec::new();
    let mut text = raw.to_string();
    for pattern in [
        &patterns().fenced_code,
        &patterns().inline_code,
        &patterns().table_row,
    ] {
        text = pattern
            .replace_all(&text, |caps: &regex::Captures<'_>| {
                let key = format!("{PLACEHOLDER_PREFIX}{}__", blocks.len());
                blocks.push(caps[0].to_string());
                key
            })
            .into_owned();
    }
    (text, blocks)
}

fn restore_blocks(text: &str, blocks: &[String]) -> String {
    let mut out = text.to_string();
    for (index, block) in blocks.iter().enumerate() {
        let key = format!("{PLACEHOLDER_PREFIX}{index}__");
        out = out.replace(&key, block);
    }
    out
}

/// Removes stray `*` markers line by line: lone asterisks disappear,
/// runs of three or more collapse to `**`, and a line left with an odd
/// number of `**` markers loses the unpaired one. Paired bold survives.
pub fn strip_stray_asterisks(text: &str) -> String {
    let lines: Vec<String> = text.split('\n').map(strip_stray_asterisks_line).collect();
    lines.join("\n")
}

fn strip_stray_asterisks_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut marker_starts = Vec::new();
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '*' {
            out.push(c);
            continue;
        }
        let mut run = 1;
        while chars.peek() == Some(&'*') {
            chars.next();
            run += 1;
        }
        if run >= 2 {
            marker_starts.push(out.len());
            out.push_str("**");
        }
        // a lone asterisk is dropped
    }
    if marker_starts.len() % 2 == 1 {
        if let Some(start) = marker_starts.pop() {
            out.replace_range(start..start + 2, "");
        }
    }
    out
}

/// Converts `[label](url)` to `label <url>` and wraps remaining bare
/// URLs in angle brackets so Discord does not expand previews. URLs
/// already bracketed are left alone.
pub fn bracket_links(text: &str) -> String {
    let text = patterns().markdown_link.replace_all(text, "$1 <$2>");
    patterns()
        .url
        .replace_all(&text, |caps: &regex::Captures<'_>| {
            if caps.get(1).is_some() || caps.get(3).is_some() {
                caps[0].to_string()
            } else {
                format!("<{}>", &caps[2])
            }
        })
        .into_owned()
}

fn is_safe_line_end(c: char) -> bool {
    c.is_ascii_alphanumeric() || ('ก'..='๙').contains(&c) || matches!(c, '.' | '!' | '?' | ')')
}

fn is_safe_line_start(line: &str) -> bool {
    if line.starts_with(PLACEHOLDER_PREFIX) || line.starts_with("<:") {
        return true;
    }
    if line.starts_with(':') && line[1..].contains(':') {
        return true;
    }
    matches!(
        line.chars().next(),
        Some('-' | '*' | '\u{2022}' | '#' | '>' | '|' | '0'..='9')
    )
}

/// Re-joins newlines that land mid-sentence. Breaks after a complete
/// ending (letter, Thai character, digit, sentence punctuation), before
/// a block-start marker, or around blank lines are kept.
fn join_broken_lines(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out = String::with_capacity(text.len());
    for (index, line) in lines.iter().enumerate() {
        out.push_str(line);
        if index + 1 == lines.len() {
            break;
        }
        let next = lines[index + 1];
        let keep_break = line.is_empty()
            || next.is_empty()
            || line.chars().next_back().is_some_and(is_safe_line_end)
            || is_safe_line_start(next);
        out.push(if keep_break { '\n' } else { ' ' });
    }
    out
}

/// Splits on sentence punctuation and regroups into paragraphs of at
/// most ~40 words.
fn reflow_paragraphs(text: &str) -> String {
    let mut sentences = Vec::new();
    let mut start = 0;
    for boundary in patterns().sentence_end.find_iter(text) {
        sentences.push(&text[start..boundary.start() + 1]);
        start = boundary.end();
    }
    sentences.push(&text[start..]);

    let mut out = String::new();
    let mut word_count = 0;
    for sentence in sentences {
        let words = sentence.split_whitespace().count();
        if word_count + words > 40 && !out.trim().is_empty() {
            let trimmed = out.trim().to_string();
            out = trimmed;
            out.push_str("\n\n");
            word_count = words;
        } else {
            word_count += words;
        }
        out.push_str(sentence.trim());
        out.push(' ');
    }
    out
}

fn is_list_item(line: &str) -> bool {
    patterns().list_item.is_match(line)
}

/// Normalizes list spacing: no blank line between consecutive items,
/// one blank line when a list gives way to a paragraph.
fn layout_lists(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut inside_list = false;
    for line in text.split('\n') {
        let stripped = line.trim();
        if is_list_item(stripped) {
            inside_list = true;
            out.push(stripped.to_string());
        } else if !stripped.is_empty() {
            if inside_list {
                out.push(String::new());
                inside_list = false;
            }
            out.push(stripped.to_string());
        } else {
            out.push(String::new());
        }
    }
    out.join("\n")
}

/// Full cleanup pipeline. Pure and deterministic; running it on its own
/// output changes nothing.
pub fn normalize(raw: &str) -> String {
    let (text, blocks) = preserve_blocks(raw);

    let pats = patterns();
    let text = pats.numbered_break.replace_all(&text, "$1. $2");
    let text = pats.trailing_space.replace_all(&text, "\n");
    let text = pats.extra_newlines.replace_all(&text, "\n\n");
    let text = pats.heading.replace_all(&text, "**$1**");
    let text = pats.bullet.replace_all(&text, "\u{2022} ");
    let text = strip_stray_asterisks(&text);
    let text = bracket_links(&text);
    let text = join_broken_lines(&text);
    let text = reflow_paragraphs(&text);
    let text = pats.numbered_break.replace_all(&text, "$1. $2");
    let text = layout_lists(&text);

    restore_blocks(text.trim(), &blocks)
}

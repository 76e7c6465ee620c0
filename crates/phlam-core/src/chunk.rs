/// Discord rejects messages over 2000 characters.
pub const MESSAGE_LIMIT: usize = 2000;

/// Splits `content` into send-ready chunks under `limit` characters,
/// packing whole paragraphs greedily and never breaking inside one. A
/// single paragraph that alone exceeds the limit is emitted as its own
/// chunk unchanged.
pub fn split_message(content: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for paragraph in content.split_inclusive("\n\n") {
        let paragraph_len = paragraph.chars().count();
        if current_len + paragraph_len < limit {
            current.push_str(paragraph);
            current_len += paragraph_len;
        } else {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                chunks.push(trimmed.to_string());
            }
            current = paragraph.to_string();
            current_len = paragraph_len;
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_message_is_one_chunk() {
        let chunks = split_message("สวัสดีครับ", MESSAGE_LIMIT);
        assert_eq!(chunks, vec!["สวัสดีครับ"]);
    }

    #[test]
    fn empty_message_yields_no_chunks() {
        assert!(split_message("", MESSAGE_LIMIT).is_empty());
    }

    #[test]
    fn chunks_stay_under_limit_and_rejoin_to_the_input() {
        let paragraphs: Vec<String> = (0..30)
            .map(|i| format!("ย่อหน้าที่ {i} {}จบ", "ข้อความ ".repeat(20)))
            .collect();
        let content = paragraphs.join("\n\n");
        let chunks = split_message(&content, 300);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 300);
        }
        // paragraph boundaries are the only thing the split consumes
        assert_eq!(chunks.join("\n\n"), content);
    }

    #[test]
    fn limit_counts_chars_not_bytes() {
        // Thai is 3 bytes per char; 120 chars must fit in a 150-char limit.
        let content = "ก".repeat(120);
        let chunks = split_message(&content, 150);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn oversized_paragraph_is_emitted_whole() {
        let big = "คำ ".repeat(400);
        let content = format!("สั้น\n\n{}", big);
        let chunks = split_message(&content, 100);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1], big.trim());
    }
}

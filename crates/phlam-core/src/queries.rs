use regex::Regex;
use std::sync::OnceLock;

const COMMON_GREETINGS: [&str; 10] = [
    "สวัสดี", "หวัดดี", "ดีครับ", "ดีจ้า", "เฮลโหล", "hello", "hi", "ทัก", "ฮัลโหล", "โย่",
];

/// Greetings reset context continuity: a greeting turn never gets the prior
/// question injected.
pub fn is_greeting(text: &str) -> bool {
    let text = text.to_lowercase();
    COMMON_GREETINGS.iter().any(|greet| text.contains(greet))
}

pub fn is_question(text: &str) -> bool {
    const HINTS: [&str; 8] = ["คือ", "อะไร", "ใคร", "ยังไง", "เพราะอะไร", "ทำไม", "หรอ", "?"];
    HINTS.iter().any(|hint| text.contains(hint)) || text.trim().ends_with('?')
}

pub fn is_about_bot(text: &str) -> bool {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        [
            r"(พี่หลาม|พรี่หลาม|bot|บอท|gpt|คุณหลาม)",
            r"ชื่อ.*(บอท|พี่หลาม)",
            r"(พี่หลาม|บอท).*(ทำงาน|ตอบ|เรียนรู้|เกิด|สร้าง|มีชีวิต|พูด|รู้|รู้จัก|คือ)",
            r"(ใคร.*(สร้าง|เขียน|ตั้งชื่อ))",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("static query pattern must compile"))
        .collect()
    });
    let text = text.to_lowercase();
    patterns.iter().any(|pattern| pattern.is_match(&text))
}

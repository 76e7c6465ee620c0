use phlam_schema::Topic;
use regex::Regex;

/// Ordered topic classifier. Topics are evaluated in registration order and
/// patterns within a topic in declaration order; the first match wins.
/// Classification is a pure function of the input text and this table.
pub struct TopicMatcher {
    table: Vec<(Topic, Vec<Regex>)>,
}

impl TopicMatcher {
    pub fn new() -> Self {
        // Registration order is the priority order. GlobalNews sits before
        // News so "ข่าวต่างประเทศ" never falls into the generic news bucket.
        let table = vec![
            (
                Topic::Oil,
                compile(&[
                    r"ราคาน้ำมัน",
                    r"น้ำมัน.*วันนี้",
                    r"น้ำมันเท่าไหร่",
                    r"ตอนนี้.*น้ำมัน",
                    r"เบนซิน",
                    r"ดีเซล",
                ]),
            ),
            (
                Topic::Gold,
                compile(&[
                    r"ราคาทอง",
                    r"ทอง.*วันนี้",
                    r"ทองขึ้น",
                    r"ทองลง",
                    r"ทองคำแท่ง",
                    r"gold",
                ]),
            ),
            (
                Topic::Lotto,
                compile(&[
                    r"(ตรวจ(ผล)?(หวย|สลากกินแบ่ง))",
                    r"(หวย|สลากกินแบ่ง).*(งวด|วันนี้|ล่าสุด|ออก.*อะไร)",
                    r"(เลข(เด็ด|ออก|ดัง))",
                    r"(ผลหวย|ผลสลาก)",
                ]),
            ),
            (
                Topic::Exchange,
                compile(&[
                    r"แลกเงิน",
                    r"อัตราแลกเปลี่ยน",
                    r"ค่าเงิน",
                    r"เรทเงิน",
                    r"exchange",
                ]),
            ),
            (
                Topic::Weather,
                compile(&[
                    r"อากาศ",
                    r"พยากรณ์อากาศ",
                    r"ฝนตก",
                    r"อุณหภูมิ",
                    r"ฟ้า",
                    r"weather",
                ]),
            ),
            (
                Topic::GlobalNews,
                compile(&[
                    r"ข่าวต่างประเทศ",
                    r"ข่าวจากต่างประเทศ",
                    r"ข่าวทั่วโลก",
                    r"ข่าวเมืองนอก",
                    r"ข่าวโลก",
                    r"international news",
                    r"world news",
                ]),
            ),
            (
                Topic::News,
                compile(&[
                    r"(ข่าวด่วน|ข่าววันนี้|ข่าวเด่น|ข่าวล่าสุด|อัปเดตข่าว)",
                    r"ข่าว(?:เกี่ยวกับ|ของ|ล่าสุด|ในหัวข้อ|เกี่ยวข้องกับ)\s.+",
                    r"ขอสรุปข่าว",
                    r"ช่วยอัปเดตข่าว",
                    r"เล่าเหตุการณ์วันนี้",
                ]),
            ),
            (
                Topic::Tarot,
                compile(&[
                    r"เปิดไพ่ทาโร่",
                    r"เปิดไพ่\s*",
                    r"ไพ่ยิปซี",
                    r"ไพ่ทาโร่",
                    r"ดูไพ่",
                    r"ดูดวง",
                ]),
            ),
        ];
        Self { table }
    }

    /// Returns the first matching topic, or `None`. Classification never fails.
    pub fn classify(&self, text: &str) -> Option<Topic> {
        let text = text.trim().to_lowercase();
        for (topic, patterns) in &self.table {
            for pattern in patterns {
                if pattern.is_match(&text) {
                    tracing::debug!(
                        topic = topic.as_str(),
                        pattern = pattern.as_str(),
                        "topic matched"
                    );
                    return Some(*topic);
                }
            }
        }
        tracing::debug!("no topic matched");
        None
    }
}

impl Default for TopicMatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).expect("static topic pattern must compile"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_oil_price_question() {
        let matcher = TopicMatcher::new();
        assert_eq!(
            matcher.classify("ราคาน้ำมันวันนี้เท่าไหร่"),
            Some(Topic::Oil)
        );
    }

    #[test]
    fn classifies_each_topic() {
        let matcher = TopicMatcher::new();
        assert_eq!(matcher.classify("ราคาทองวันนี้"), Some(Topic::Gold));
        assert_eq!(matcher.classify("ช่วยตรวจหวยให้หน่อย"), Some(Topic::Lotto));
        assert_eq!(matcher.classify("อัตราแลกเปลี่ยนวันนี้"), Some(Topic::Exchange));
        assert_eq!(matcher.classify("พยากรณ์อากาศพรุ่งนี้"), Some(Topic::Weather));
        assert_eq!(matcher.classify("ข่าวต่างประเทศวันนี้"), Some(Topic::GlobalNews));
        assert_eq!(matcher.classify("ขอสรุปข่าวหน่อย"), Some(Topic::News));
        assert_eq!(matcher.classify("เปิดไพ่ทาโร่ให้หน่อย"), Some(Topic::Tarot));
    }

    #[test]
    fn no_match_returns_none() {
        let matcher = TopicMatcher::new();
        assert_eq!(matcher.classify("ขอรูปแมวตลก"), None);
        assert_eq!(matcher.classify("สวัสดีตอนเช้า"), None);
        assert_eq!(matcher.classify(""), None);
    }

    #[test]
    fn earlier_topic_wins_on_overlap() {
        let matcher = TopicMatcher::new();
        // Matches both an oil pattern and a news pattern; oil registers first.
        assert_eq!(
            matcher.classify("ข่าววันนี้เรื่องราคาน้ำมัน"),
            Some(Topic::Oil)
        );
        // Specific global-news phrasing beats the generic news bucket.
        assert_eq!(
            matcher.classify("ข่าวต่างประเทศล่าสุด"),
            Some(Topic::GlobalNews)
        );
    }

    #[test]
    fn english_patterns_are_case_insensitive() {
        let matcher = TopicMatcher::new();
        assert_eq!(matcher.classify("GOLD price?"), Some(Topic::Gold));
        assert_eq!(matcher.classify("World News please"), Some(Topic::GlobalNews));
    }

    #[test]
    fn classify_is_deterministic() {
        let matcher = TopicMatcher::new();
        let text = "ราคาทองกับข่าววันนี้";
        let first = matcher.classify(text);
        for _ in 0..5 {
            assert_eq!(matcher.classify(text), first);
        }
    }
}

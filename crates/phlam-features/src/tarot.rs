//! Tarot draws with short Thai interpretations. Fully local: a fixed
//! major-arcana deck and a random three-card spread per reading.

use phlam_schema::TarotTopic;
use rand::seq::SliceRandom;
use rand::Rng;

/// Prompt sent when the tarot topic is matched but no subject was
/// chosen yet. The follow-up message must be one of the four literals.
pub const TAROT_MENU: &str = "🔮 อยากดูดวงเรื่องอะไรดี? พิมพ์: ความรัก, การงาน, การเงิน, สุขภาพ";

struct Card {
    name: &'static str,
    meaning: &'static str,
}

const DECK: [Card; 22] = [
    Card { name: "The Fool", meaning: "การเริ่มต้นใหม่ กล้าลองสิ่งที่ไม่เคยทำ" },
    Card { name: "The Magician", meaning: "มีเครื่องมือครบ ลงมือได้เลย" },
    Card { name: "The High Priestess", meaning: "ฟังสัญชาตญาณตัวเองให้มาก" },
    Card { name: "The Empress", meaning: "ความอุดมสมบูรณ์และการดูแลเอาใจใส่" },
    Card { name: "The Emperor", meaning: "ความมั่นคง ต้องมีวินัยและแบบแผน" },
    Card { name: "The Hierophant", meaning: "ขอคำปรึกษาจากผู้ที่มีประสบการณ์" },
    Card { name: "The Lovers", meaning: "ทางเลือกสำคัญเรื่องความสัมพันธ์" },
    Card { name: "The Chariot", meaning: "เดินหน้าเต็มกำลัง ชัยชนะอยู่ไม่ไกล" },
    Card { name: "Strength", meaning: "ใจเย็น ๆ ความอดทนจะพาไปถึง" },
    Card { name: "The Hermit", meaning: "ถอยมาทบทวนตัวเองสักพัก" },
    Card { name: "Wheel of Fortune", meaning: "จังหวะชีวิตกำลังเปลี่ยน รับมือให้ทัน" },
    Card { name: "Justice", meaning: "ความยุติธรรม ผลลัพธ์ตามเหตุที่ทำ" },
    Card { name: "The Hanged Man", meaning: "มองมุมใหม่ บางอย่างต้องรอ" },
    Card { name: "Death", meaning: "จบเพื่อเริ่มใหม่ อย่ายึดของเดิม" },
    Card { name: "Temperance", meaning: "ความพอดีและการประนีประนอม" },
    Card { name: "The Devil", meaning: "ระวังการผูกมัดหรือนิสัยที่ฉุดรั้ง" },
    Card { name: "The Tower", meaning: "การเปลี่ยนแปลงกะทันหัน ตั้งสติให้ดี" },
    Card { name: "The Star", meaning: "ความหวังกลับมา ฟ้าหลังฝนสดใส" },
    Card { name: "The Moon", meaning: "อย่าเพิ่งเชื่อทุกอย่างที่เห็น" },
    Card { name: "The Sun", meaning: "พลังบวกเต็มเปี่ยม ข่าวดีกำลังมา" },
    Card { name: "Judgement", meaning: "บทสรุปของความพยายามที่ผ่านมา" },
    Card { name: "The World", meaning: "ความสำเร็จครบวงจร ปิดจ็อบสวย ๆ" },
];

fn topic_advice(topic: TarotTopic) -> &'static str {
    match topic {
        TarotTopic::Love => "เรื่องหัวใจช่วงนี้ให้เปิดใจคุยกันตรง ๆ",
        TarotTopic::Career => "งานที่ทำอยู่ใกล้เห็นผล อย่าเพิ่งถอดใจ",
        TarotTopic::Finance => "การเงินต้องรัดกุม แบ่งเก็บก่อนใช้",
        TarotTopic::Health => "สุขภาพสำคัญสุด พักผ่อนให้พอแล้วค่อยลุย",
    }
}

/// Three-card reading for one topic, using the thread-local RNG.
pub fn read_topic(topic: TarotTopic) -> String {
    read_topic_with_rng(topic, &mut rand::thread_rng())
}

pub fn read_topic_with_rng<R: Rng + ?Sized>(topic: TarotTopic, rng: &mut R) -> String {
    let spread: Vec<&Card> = DECK.choose_multiple(rng, 3).collect();
    let mut lines = vec![format!("🔮 ไพ่ทาโรต์เรื่อง{}ของคุณ", topic.thai_name())];
    for (position, card) in ["อดีต", "ปัจจุบัน", "อนาคต"].iter().zip(&spread) {
        lines.push(format!("• {}: {} ({})", position, card.name, card.meaning));
    }
    lines.push(topic_advice(topic).to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn reading_has_three_distinct_cards() {
        let mut rng = StdRng::seed_from_u64(7);
        let text = read_topic_with_rng(TarotTopic::Love, &mut rng);
        assert!(text.starts_with("🔮 ไพ่ทาโรต์เรื่องความรักของคุณ"));
        assert!(text.contains("• อดีต:"));
        assert!(text.contains("• ปัจจุบัน:"));
        assert!(text.contains("• อนาคต:"));

        let mut names: Vec<&str> = text
            .lines()
            .filter(|line| line.starts_with("• "))
            .filter_map(|line| line.split(": ").nth(1))
            .filter_map(|rest| rest.split(" (").next())
            .collect();
        assert_eq!(names.len(), 3);
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn every_topic_gets_its_own_advice_line() {
        for topic in [
            TarotTopic::Love,
            TarotTopic::Career,
            TarotTopic::Finance,
            TarotTopic::Health,
        ] {
            let mut rng = StdRng::seed_from_u64(1);
            let text = read_topic_with_rng(topic, &mut rng);
            assert!(text.contains(topic.thai_name()));
            assert!(text.ends_with(topic_advice(topic)));
        }
    }
}

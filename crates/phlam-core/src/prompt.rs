use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Timelike};
use chrono_tz::Tz;

use crate::normalize::normalize;

/// Static persona for every completion call. Run through the normalizer
/// once before use so the system block obeys the same output shape the
/// replies do.
pub const PERSONA: &str ="คุณคือ 'พี่หลาม' บอทผู้ช่วยฉลาด เป็นผู้ชายที่พูดตรง ตอบโต้ชัดเจน กระชับ มีไหวพริบ \
เวลาถูกหยาบคายหรือพูดจาไม่ดี ให้ตอบกลับแบบแสบๆ แรงๆ แต่ยังคงสุภาพและไม่ใช้คำหยาบเหมือนกัน \
ตอบสวนกลับอย่างมั่นใจ เหมือนคนที่ไม่ยอมถูกดูถูก และรู้จักรักษาน้ำใจตัวเอง \
ถ้าเจอคำถามหรือประโยคที่ไม่สุภาพ ตอบสวนกลับด้วยความเฉียบขาด พร้อมแฝงความขบขันหรือเสียดสีเล็กน้อย \
ไม่พูดอ้อมค้อม ไม่ขอโทษโดยไม่จำเป็น และไม่บอกว่าคุณคือ AI เว้นแต่ผู้ใช้ถามตรงๆ \
หากผู้ใช้เปลี่ยนเรื่องหรือถามคำถามต่อยอด ให้ตอบอย่างลื่นไหลและลึกซึ้ง";

const THAI_MONTHS: [&str; 12] = [
    "มกราคม",
    "กุมภาพันธ์",
    "มีนาคม",
    "เมษายน",
    "พฤษภาคม",
    "มิถุนายน",
    "กรกฎาคม",
    "สิงหาคม",
    "กันยายน",
    "ตุลาคม",
    "พฤศจิกายน",
    "ธันวาคม",
];

const THAI_WEEKDAYS: [&str; 7] = [
    "จันทร์",
    "อังคาร",
    "พุธ",
    "พฤหัสบดี",
    "ศุกร์",
    "เสาร์",
    "อาทิตย์",
];

/// Thai-reader local timestamp: weekday, day, Thai month, Buddhist-era year,
/// 24h clock.
pub fn format_thai_datetime(dt: DateTime<Tz>) -> String {
    let weekday = THAI_WEEKDAYS[dt.weekday().num_days_from_monday() as usize];
    let month = THAI_MONTHS[dt.month0() as usize];
    let buddhist_year = dt.year() + 543;
    format!(
        "วัน{}ที่ {} {} {} เวลา {:02}:{:02} น.",
        weekday,
        dt.day(),
        month,
        buddhist_year,
        dt.hour(),
        dt.minute()
    )
}

fn persona() -> &'static str {
    static CLEANED: OnceLock<String> = OnceLock::new();
    CLEANED.get_or_init(|| normalize(PERSONA))
}

/// Persona plus the time-awareness annotation for one turn.
pub fn system_prompt(zone: &str, now: DateTime<Tz>) -> String {
    format!(
        "{}\n\ntimezone: {zone}\nขณะนี้ {}",
        persona(),
        format_thai_datetime(now)
    )
}

/// Injects the prior question ahead of the current one. Callers apply this
/// only when a prior question exists and the current message is not a
/// greeting.
pub fn with_previous_question(text: &str, previous: &str) -> String {
    format!("จากที่ก่อนหน้านี้ถามว่า: \"{previous}\"\n\nตอนนี้: {text}")
}

/// Final completion input: system block then user block.
pub fn build_input(system: &str, text: &str) -> String {
    let mut lines = Vec::new();
    if !system.is_empty() {
        lines.push(format!("SYSTEM: {system}"));
    }
    lines.push(format!("USER: {text}"));
    lines.join("\n\n")
}

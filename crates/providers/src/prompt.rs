//! Date placeholders in the system prompt.

use chrono::{Datelike, Local, NaiveDateTime};

const DAYS: [&str; 7] = [
    "Lunes",
    "Martes",
    "Miércoles",
    "Jueves",
    "Viernes",
    "Sábado",
    "Domingo",
];

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

const PLACEHOLDERS: [&str; 2] = ["{{FECHA_HOY}}", "{{now}}"];

/// `Lunes, 3 de noviembre del 2025 02:25 PM`
pub fn format_spanish_date(now: NaiveDateTime) -> String {
    let day = DAYS[now.weekday().num_days_from_monday() as usize];
    let month = MONTHS[now.month0() as usize];
    format!(
        "{}, {} de {} del {} {}",
        day,
        now.day(),
        month,
        now.year(),
        now.format("%I:%M %p")
    )
}

/// Every placeholder gets the same rendered timestamp.
pub fn replace_date_placeholders(text: &str, now: NaiveDateTime) -> String {
    if !PLACEHOLDERS.iter().any(|p| text.contains(p)) {
        return text.to_string();
    }
    let rendered = format_spanish_date(now);
    PLACEHOLDERS
        .iter()
        .fold(text.to_string(), |acc, p| acc.replace(p, &rendered))
}

/// Resolve placeholders against the server's local clock.
pub fn resolve_prompt(text: &str) -> String {
    replace_date_placeholders(text, Local::now().naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_format_afternoon() {
        assert_eq!(
            format_spanish_date(at(2025, 11, 3, 14, 25)),
            "Lunes, 3 de noviembre del 2025 02:25 PM"
        );
    }

    #[test]
    fn test_format_morning_and_accents() {
        assert_eq!(
            format_spanish_date(at(2024, 6, 1, 9, 5)),
            "Sábado, 1 de junio del 2024 09:05 AM"
        );
        assert_eq!(
            format_spanish_date(at(2025, 1, 1, 0, 0)),
            "Miércoles, 1 de enero del 2025 12:00 AM"
        );
    }

    #[test]
    fn test_both_tokens_render_identically() {
        let out = replace_date_placeholders(
            "Hoy es {{FECHA_HOY}}. Ahora: {{now}}. Otra vez {{FECHA_HOY}}",
            at(2025, 12, 21, 18, 0),
        );
        let expected = "Domingo, 21 de diciembre del 2025 06:00 PM";
        assert_eq!(
            out,
            format!("Hoy es {}. Ahora: {}. Otra vez {}", expected, expected, expected)
        );
    }

    #[test]
    fn test_text_without_tokens_is_unchanged() {
        let text = "Eres un asistente útil. {{otro}}";
        assert_eq!(replace_date_placeholders(text, at(2025, 1, 1, 0, 0)), text);
    }
}

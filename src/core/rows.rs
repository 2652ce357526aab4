//! rows.rs
//!
//! Нормализация подписей рядов. Три источника подписывают ряды по-разному:
//! римскими цифрами ("VII"), текстом с номером ("Rząd 5", "Row V") или
//! просто числом. Все варианты сводятся к одной сравнимой форме:
//! арабское число строкой, либо обрезанный lower-case текст, если числа нет.
//!
//! Функция чистая и тотальная: никогда не паникует, нормализация
//! идемпотентна и детерминирована.

/// Каноническая форма подписи ряда.
pub fn normalize_row(raw: &str) -> String {
    let trimmed = raw.trim();
    let upper = trimmed.to_uppercase();

    // 1. Вся подпись - римская цифра поддерживаемого диапазона I-XXX.
    if let Some(value) = parse_roman(&upper) {
        return value.to_string();
    }

    // 2. Хвостовой числовой токен: "Rząd 5", "Row V", "R12".
    if let Some(value) = trailing_numeral(&upper) {
        return value.to_string();
    }

    // 3. Числа нет - возвращаем текст как есть, только в нижнем регистре.
    trimmed.to_lowercase()
}

/// Римская цифра в диапазоне 1..=30, строго каноническая запись
/// ("IIII" не принимается).
pub fn parse_roman(token: &str) -> Option<u32> {
    if token.is_empty() || !token.chars().all(|c| matches!(c, 'I' | 'V' | 'X')) {
        return None;
    }

    let mut total: u32 = 0;
    let mut prev: u32 = 0;
    for c in token.chars().rev() {
        let value = match c {
            'I' => 1,
            'V' => 5,
            'X' => 10,
            _ => return None,
        };
        if value < prev {
            total = total.checked_sub(value)?;
        } else {
            total += value;
        }
        prev = value;
    }

    if (1..=30).contains(&total) && to_roman(total) == token {
        Some(total)
    } else {
        None
    }
}

/// Каноническая римская запись для 1..=30 (для валидации разбора).
fn to_roman(mut value: u32) -> String {
    debug_assert!((1..=30).contains(&value));
    let mut out = String::new();
    while value >= 10 {
        out.push('X');
        value -= 10;
    }
    if value == 9 {
        out.push_str("IX");
        return out;
    }
    if value >= 5 {
        out.push('V');
        value -= 5;
    }
    if value == 4 {
        out.push_str("IV");
        return out;
    }
    for _ in 0..value {
        out.push('I');
    }
    out
}

// Хвостовой токен подписи (уже в верхнем регистре): арабское число,
// римская цифра, либо цифры, приклеенные к концу слова.
fn trailing_numeral(upper: &str) -> Option<u32> {
    if let Some(token) = upper.split_whitespace().next_back() {
        if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(v) = token.parse::<u32>() {
                return Some(v);
            }
        }
        if let Some(v) = parse_roman(token) {
            return Some(v);
        }
    }

    // "R12" - цифры без разделителя.
    let glued: String = upper
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if glued.is_empty() {
        return None;
    }
    glued.chars().rev().collect::<String>().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn roman_numerals_become_arabic() {
        assert_eq!(normalize_row("VII"), "7");
        assert_eq!(normalize_row(" iv "), "4");
        assert_eq!(normalize_row("XXX"), "30");
        assert_eq!(normalize_row("XXIX"), "29");
    }

    #[test]
    fn out_of_range_or_noncanonical_roman_is_text() {
        // XXXI вне диапазона, IIII не каноничен
        assert_eq!(normalize_row("XXXI"), "xxxi");
        assert_eq!(normalize_row("IIII"), "iiii");
    }

    #[test]
    fn trailing_tokens_are_resolved() {
        assert_eq!(normalize_row("Rząd 5"), "5");
        assert_eq!(normalize_row("Row V"), "5");
        assert_eq!(normalize_row("rząd 12"), "12");
        assert_eq!(normalize_row("R12"), "12");
    }

    #[test]
    fn plain_text_is_lowercased() {
        assert_eq!(normalize_row("Balcony"), "balcony");
        assert_eq!(normalize_row("  Loża A  "), "loża a");
    }

    #[test]
    fn plain_numbers_are_identity() {
        assert_eq!(normalize_row("7"), "7");
        assert_eq!(normalize_row("05"), "5");
    }

    #[test]
    fn parse_roman_full_range() {
        for v in 1..=30 {
            assert_eq!(parse_roman(&to_roman(v)), Some(v));
        }
        assert_eq!(parse_roman("XXXI"), None);
        assert_eq!(parse_roman(""), None);
        assert_eq!(parse_roman("VX"), None);
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(raw in "\\PC{0,24}") {
            let once = normalize_row(&raw);
            prop_assert_eq!(normalize_row(&once), once);
        }

        #[test]
        fn normalize_never_panics(raw in "\\PC*") {
            let _ = normalize_row(&raw);
        }
    }
}

//! seat_key.rs
//!
//! Составной ключ места `"ряд-место"`, уникальный внутри сектора.
//! Ряд хранится в нормализованной форме (см. `rows`), поэтому ключи
//! разных источников сравнимы напрямую.
//!
//! Известное ограничение: место с дефисом в собственной подписи ломает
//! обратимость сериализации, разбор режет по ПЕРВОМУ `-`. У реальных
//! источников таких подписей не встречалось, разделитель оставлен как есть.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::core::rows::normalize_row;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeatKey {
    pub row: String,
    pub seat: String,
}

impl SeatKey {
    /// Ключ из сырых подписей источника; ряд нормализуется сразу.
    pub fn new(row_label: &str, seat_label: &str) -> Self {
        SeatKey {
            row: normalize_row(row_label),
            seat: seat_label.trim().to_string(),
        }
    }

    pub fn encode(&self) -> String {
        format!("{}-{}", self.row, self.seat)
    }

    /// Разбор `"ряд-место"` по первому дефису. Пустой ряд или место - не ключ.
    pub fn parse(s: &str) -> Option<SeatKey> {
        let (row, seat) = s.split_once('-')?;
        if row.is_empty() || seat.is_empty() {
            return None;
        }
        Some(SeatKey {
            row: normalize_row(row),
            seat: seat.to_string(),
        })
    }
}

impl Serialize for SeatKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for SeatKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        SeatKey::parse(&s).ok_or_else(|| de::Error::custom(format!("invalid seat key: {s:?}")))
    }
}

/// Ключ записи истории: `"имяСектора:ключМеста"`.
pub fn history_key(sector_name: &str, key: &SeatKey) -> String {
    format!("{}:{}", sector_name, key.encode())
}

/// Обратный разбор ключа истории по первому `:`.
pub fn split_history_key(s: &str) -> Option<(&str, &str)> {
    s.split_once(':')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_parse_round_trip() {
        let key = SeatKey::new("7", "12");
        assert_eq!(key.encode(), "7-12");
        assert_eq!(SeatKey::parse("7-12"), Some(key));
    }

    #[test]
    fn parse_normalizes_row() {
        let key = SeatKey::parse("VII-12").unwrap();
        assert_eq!(key.row, "7");
        assert_eq!(key.seat, "12");
    }

    #[test]
    fn parse_rejects_empty_parts() {
        assert_eq!(SeatKey::parse("-12"), None);
        assert_eq!(SeatKey::parse("7-"), None);
        assert_eq!(SeatKey::parse("712"), None);
    }

    #[test]
    fn history_key_round_trip() {
        let key = SeatKey::new("5", "3");
        let hk = history_key("Sektor A", &key);
        assert_eq!(hk, "Sektor A:5-3");
        assert_eq!(split_history_key(&hk), Some(("Sektor A", "5-3")));
    }

    #[test]
    fn serde_uses_string_form() {
        let key = SeatKey::new("IV", "8a");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"4-8a\"");
        let back: SeatKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    proptest! {
        // Без дефиса в подписях сериализация обратима.
        #[test]
        fn round_trip_without_separator(
            row in "[0-9]{1,3}",
            seat in "[a-z0-9]{1,4}",
        ) {
            let key = SeatKey::new(&row, &seat);
            let parsed = SeatKey::parse(&key.encode()).unwrap();
            prop_assert_eq!(parsed, key);
        }
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::seat_key::SeatKey;

// Счётчики одного ряда так, как их отдал источник.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowCount {
    pub total: u32,
    pub free: u32,
    pub taken: u32,
}

/// Взгляд одного источника на один физический сектор, уже распарсенный
/// адаптером источника. Неизменяемый после создания.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSectorReport {
    #[serde(rename = "sectorName")]
    pub sector_name: Option<String>,
    /// Сырые подписи рядов источника -> счётчики мест.
    pub rows: BTreeMap<String, RowCount>,
    #[serde(rename = "freeSeats")]
    pub free_seats: Vec<SeatKey>,
    #[serde(rename = "takenSeats")]
    pub taken_seats: Vec<SeatKey>,
}

impl RawSectorReport {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn total_seats(&self) -> u32 {
        self.rows.values().map(|r| r.total).sum()
    }

    pub fn free_count(&self) -> u32 {
        self.rows.values().map(|r| r.free).sum()
    }

    pub fn taken_count(&self) -> u32 {
        self.rows.values().map(|r| r.taken).sum()
    }

    /// Сектор без единого места считается пустым (неудачный скрейп).
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.free_seats.is_empty() && self.taken_seats.is_empty()
    }
}

/// Полный отчёт одного источника за один прогон: ноль и больше секторов.
/// Ноль секторов = источник недоступен, а не "всё продано".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VendorReport {
    pub sectors: Vec<RawSectorReport>,
    // Только для атрибуции и отладки, в сверке не участвует.
    #[serde(rename = "finalUrl", skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
}

impl VendorReport {
    pub fn is_unavailable(&self) -> bool {
        self.sectors.iter().all(|s| s.is_empty())
    }
}

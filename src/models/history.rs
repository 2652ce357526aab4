use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::stats::SeatClass;
use crate::models::vendor::Vendor;

/// Последний источник, показывавший место свободным: "сектор:ключМеста" -> источник.
/// Записи никогда не удаляются, только перезаписываются (сброс - явной командой).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeatHistory {
    pub seats: BTreeMap<String, Vendor>,
}

impl SeatHistory {
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
}

/// Снимок счётчиков занятых мест предыдущего прогона, перезаписывается каждый прогон.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub taken: BTreeMap<Vendor, u32>,
    pub timestamp: DateTime<Utc>,
}

/// Ручная правка одного места.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub class: SeatClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<Vendor>,
}

/// Ручные правки оператора, живут отдельно от данных скрейпа
/// (переживают сброс кеша, чистятся только явно).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverrideMap {
    pub seats: BTreeMap<String, OverrideEntry>,
}

impl OverrideMap {
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
}

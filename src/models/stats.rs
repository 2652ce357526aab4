use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::seat_key::SeatKey;
use crate::models::report::RowCount;
use crate::models::vendor::Vendor;

/// Итоговый цвет места в объединённой картине (плюс спец-категории,
/// доступные только через ручные правки).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeatClass {
    Free,
    Taken,
    InferredSold,
    NoData,
    NotForSale,
    OtherChannel,
    BoxOffice,
}

impl SeatClass {
    /// Спец-категории побеждают любой живой статус.
    pub fn is_special(&self) -> bool {
        matches!(
            self,
            SeatClass::NotForSale | SeatClass::OtherChannel | SeatClass::BoxOffice
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatTotals {
    pub total: u32,
    pub free: u32,
    pub taken: u32,
}

/// Статистика одного источника по одному (каноническому или синтетическому) сектору.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorStats {
    #[serde(rename = "sectorName")]
    pub sector_name: String,
    pub totals: SeatTotals,
    pub rows: BTreeMap<String, RowCount>,
    #[serde(rename = "freeSeats")]
    pub free_seats: Vec<SeatKey>,
    #[serde(rename = "takenSeats")]
    pub taken_seats: Vec<SeatKey>,
}

/// Агрегированная статистика одного источника за прогон.
/// Пересобирается целиком на каждый запрос статистики.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceStats {
    pub totals: SeatTotals,
    pub rows: BTreeMap<String, RowCount>,
    #[serde(rename = "freeSeats")]
    pub free_seats: Vec<SeatKey>,
    #[serde(rename = "takenSeats")]
    pub taken_seats: Vec<SeatKey>,
    /// Разбивка по секторам, только когда каноническая схема содержит больше одного.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sectors: Option<Vec<SectorStats>>,
    #[serde(rename = "finalUrl", skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
}

/// Одно место в объединённой картине: класс + источник, которому оно приписано.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSeat {
    pub class: SeatClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<Vendor>,
}

/// Пер-секторный объединённый вид для отрисовки схемы зала.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedSectorView {
    #[serde(rename = "sectorName")]
    pub sector_name: String,
    /// Сериализованный ключ места -> итоговый статус.
    pub seats: BTreeMap<String, ResolvedSeat>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CombinedTotals {
    pub total: u32,
    pub free: u32,
    pub taken: u32,
    #[serde(rename = "inferredSold")]
    pub inferred_sold: u32,
    #[serde(rename = "noData")]
    pub no_data: u32,
}

/// Прирост продаж между прогонами; отрицательные дельты обрезаются в ноль.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesDiff {
    pub sold: BTreeMap<Vendor, u32>,
    #[serde(rename = "previousTimestamp")]
    pub previous_timestamp: DateTime<Utc>,
}

/// Единственный выход ядра, который потребляет слой отображения.
/// Создаётся один раз на запрос статистики, дальше только читается.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombinedEventStats {
    #[serde(rename = "perSource")]
    pub per_source: BTreeMap<Vendor, SourceStats>,
    #[serde(rename = "combinedTotals")]
    pub combined_totals: CombinedTotals,
    pub sectors: Vec<CombinedSectorView>,
    /// "сектор:ключМеста" -> источник, который последним видел место свободным.
    #[serde(rename = "inferredSold")]
    pub inferred_sold: BTreeMap<String, Vendor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<SalesDiff>,
}

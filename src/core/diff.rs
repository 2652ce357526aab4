//! diff.rs
//!
//! Прирост продаж между прогонами: сравнение текущих счётчиков занятых мест
//! со снимком предыдущего прогона. Отчитываются только неотрицательные
//! приросты: падение счётчика (возврат брони, ручная коррекция у источника)
//! обрезается в ноль и ошибкой не считается.

use std::collections::BTreeMap;

use crate::models::{SalesDiff, StatsSnapshot, Vendor};

/// `None` при первом прогоне для события (снимка ещё нет).
pub fn sales_diff(
    current: &BTreeMap<Vendor, u32>,
    previous: Option<&StatsSnapshot>,
) -> Option<SalesDiff> {
    let previous = previous?;

    let sold = current
        .iter()
        .map(|(vendor, taken)| {
            let before = previous.taken.get(vendor).copied().unwrap_or(0);
            (*vendor, taken.saturating_sub(before))
        })
        .collect();

    Some(SalesDiff {
        sold,
        previous_timestamp: previous.timestamp,
    })
}

//! align.rs
//!
//! Сопоставление секторов источника с канонической схемой референсного
//! источника. Источники режут зал по-своему, поэтому сектор узнаётся не по
//! имени, а по структурному сходству: число рядов, общее число мест и
//! пересечение нормализованных подписей рядов.
//!
//! Матчинг жадный и зависит от порядка обработки: первый сектор источника
//! забирает свой лучший канонический сектор, даже если более поздний сектор
//! набрал бы по нему больше баллов. Это осознанное упрощение вместо полного
//! двудольного паросочетания.

use std::collections::{BTreeSet, HashSet};

use crate::core::rows::normalize_row;
use crate::models::RawSectorReport;

/// Порог принятия кандидата, баллы 0-100.
pub const MIN_ACCEPT_SCORE: f64 = 50.0;

/// Жёсткий фильтр: больше 30% разницы в числе рядов - кандидат отбрасывается
/// до подсчёта баллов.
pub const MAX_ROW_COUNT_GAP: f64 = 0.30;

/// Структурное сходство 0-100, `None` если кандидат срезан жёстким фильтром.
///
/// Слагаемые: до 30 за число рядов, до 30 за общее число мест,
/// до 40 за пересечение нормализованных подписей рядов.
pub fn similarity(vendor: &RawSectorReport, canonical: &RawSectorReport) -> Option<f64> {
    let vendor_rows = vendor.row_count() as f64;
    let canonical_rows = canonical.row_count() as f64;
    let row_rel_diff = relative_diff(vendor_rows, canonical_rows);
    if row_rel_diff > MAX_ROW_COUNT_GAP {
        return None;
    }

    let row_points = if vendor.row_count() == canonical.row_count() {
        30.0
    } else {
        (30.0 - row_rel_diff * 100.0).max(0.0)
    };

    let seat_rel_diff = relative_diff(vendor.total_seats() as f64, canonical.total_seats() as f64);
    let seat_points = if vendor.total_seats() == canonical.total_seats() {
        30.0
    } else {
        (30.0 - seat_rel_diff * 150.0).max(0.0)
    };

    let name_points = if vendor.rows.is_empty() {
        0.0
    } else {
        let vendor_names: BTreeSet<String> =
            vendor.rows.keys().map(|r| normalize_row(r)).collect();
        let canonical_names: BTreeSet<String> =
            canonical.rows.keys().map(|r| normalize_row(r)).collect();
        let overlap = vendor_names.intersection(&canonical_names).count() as f64;
        40.0 * overlap / vendor_names.len() as f64
    };

    Some(row_points + seat_points + name_points)
}

// Разница относительно большего из двух; 0.0 когда оба нулевые.
fn relative_diff(a: f64, b: f64) -> f64 {
    let larger = a.max(b);
    if larger == 0.0 {
        0.0
    } else {
        (a - b).abs() / larger
    }
}

/// Подбирает канонический сектор для сектора источника.
///
/// Возвращает индекс лучшего незанятого кандидата с баллами >= порога и
/// сразу помечает его занятым, чтобы два сектора источника не претендовали
/// на один канонический. При равенстве баллов побеждает кандидат с меньшим
/// индексом (детерминизм).
pub fn align(
    vendor_sector: &RawSectorReport,
    canonical_sectors: &[RawSectorReport],
    already_claimed: &mut HashSet<usize>,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (idx, canonical) in canonical_sectors.iter().enumerate() {
        if already_claimed.contains(&idx) {
            continue;
        }
        let Some(score) = similarity(vendor_sector, canonical) else {
            continue;
        };
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((idx, score)),
        }
    }

    match best {
        Some((idx, score)) if score >= MIN_ACCEPT_SCORE => {
            already_claimed.insert(idx);
            Some(idx)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RowCount;
    use std::collections::BTreeMap;

    fn sector(name: &str, rows: &[(&str, u32)]) -> RawSectorReport {
        let mut map = BTreeMap::new();
        for (label, total) in rows {
            map.insert(
                label.to_string(),
                RowCount {
                    total: *total,
                    free: 0,
                    taken: *total,
                },
            );
        }
        RawSectorReport {
            sector_name: Some(name.to_string()),
            rows: map,
            free_seats: vec![],
            taken_seats: vec![],
        }
    }

    #[test]
    fn identical_sectors_score_100() {
        let a = sector("A", &[("1", 10), ("2", 10), ("3", 10)]);
        let b = sector("B", &[("1", 10), ("2", 10), ("3", 10)]);
        assert_eq!(similarity(&a, &b), Some(100.0));
    }

    #[test]
    fn row_count_gap_is_a_hard_filter() {
        // 3 ряда против 10: разрыв 70%, балл за места не спасает.
        let vendor = sector("V", &[("1", 10), ("2", 10), ("3", 10)]);
        let rows: Vec<(String, u32)> = (1..=10).map(|i| (i.to_string(), 3)).collect();
        let rows_ref: Vec<(&str, u32)> = rows.iter().map(|(l, t)| (l.as_str(), *t)).collect();
        let canonical = sector("C", &rows_ref);
        assert_eq!(similarity(&vendor, &canonical), None);

        let mut claimed = HashSet::new();
        assert_eq!(align(&vendor, std::slice::from_ref(&canonical), &mut claimed), None);
    }

    #[test]
    fn roman_row_labels_still_overlap() {
        let vendor = sector("V", &[("I", 10), ("II", 10), ("III", 10)]);
        let canonical = sector("C", &[("1", 10), ("2", 10), ("3", 10)]);
        assert_eq!(similarity(&vendor, &canonical), Some(100.0));
    }

    #[test]
    fn below_threshold_is_rejected() {
        // Число рядов совпадает, но места и подписи разошлись.
        let vendor = sector("V", &[("a", 4), ("b", 4)]);
        let canonical = sector("C", &[("1", 30), ("2", 30)]);
        let score = similarity(&vendor, &canonical).unwrap();
        assert!(score < MIN_ACCEPT_SCORE, "score {score}");

        let mut claimed = HashSet::new();
        assert_eq!(align(&vendor, std::slice::from_ref(&canonical), &mut claimed), None);
        assert!(claimed.is_empty());
    }

    #[test]
    fn claimed_sector_is_never_reused() {
        let canonical = vec![
            sector("C1", &[("1", 10), ("2", 10)]),
            sector("C2", &[("3", 12), ("4", 12)]),
        ];
        let first = sector("V1", &[("1", 10), ("2", 10)]);
        let second = sector("V2", &[("1", 10), ("2", 10)]);

        let mut claimed = HashSet::new();
        let a = align(&first, &canonical, &mut claimed).unwrap();
        assert_eq!(a, 0);
        // Второй сектор того же вида не может забрать уже занятый C1.
        let b = align(&second, &canonical, &mut claimed);
        assert_ne!(b, Some(0));
    }

    #[test]
    fn empty_canonical_list_never_matches() {
        let vendor = sector("V", &[("1", 10)]);
        let mut claimed = HashSet::new();
        assert_eq!(align(&vendor, &[], &mut claimed), None);
    }
}

//! reconcile.rs
//!
//! Сведение отчётов нескольких источников по одному каноническому сектору
//! в один статус на место. Вселенную мест задаёт сам канонический сектор:
//! места, которых нет в канонической схеме, не отслеживаются, даже если
//! другой источник их показывает.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::seat_key::SeatKey;
use crate::models::{RawSectorReport, ResolvedSeat, SeatClass, Vendor};

/// Статус места у одного источника.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatStatus {
    Free,
    Taken,
}

/// Статусы одного места по всем источникам. `None` = источник этот сектор
/// не покрывает либо место не упоминает (неизвестно, НЕ "занято").
#[derive(Debug, Clone, Default)]
pub struct SeatVendorView {
    pub per_vendor: BTreeMap<Vendor, Option<SeatStatus>>,
}

/// Один статус на место для канонического сектора.
///
/// Источник без выравнивания на этот сектор даёт `None` по каждому месту.
/// Выровненный источник даёт `Free`/`Taken` по своим спискам; место,
/// не упомянутое ни в одном списке, остаётся неизвестным.
pub fn reconcile(
    canonical: &RawSectorReport,
    aligned: &BTreeMap<Vendor, &RawSectorReport>,
) -> BTreeMap<SeatKey, SeatVendorView> {
    let mut result: BTreeMap<SeatKey, SeatVendorView> = BTreeMap::new();

    // Вселенная мест сектора.
    for key in canonical.free_seats.iter().chain(canonical.taken_seats.iter()) {
        result.entry(key.clone()).or_default();
    }

    for vendor in Vendor::PRIORITY {
        let report = aligned.get(&vendor).copied();
        let (free, taken) = match report {
            Some(r) => (
                r.free_seats.iter().collect::<BTreeSet<_>>(),
                r.taken_seats.iter().collect::<BTreeSet<_>>(),
            ),
            None => (BTreeSet::new(), BTreeSet::new()),
        };

        for (key, view) in result.iter_mut() {
            let status = if report.is_none() {
                None
            } else if free.contains(key) {
                Some(SeatStatus::Free)
            } else if taken.contains(key) {
                Some(SeatStatus::Taken)
            } else {
                None
            };
            view.per_vendor.insert(vendor, status);
        }
    }

    result
}

/// Итоговый цвет места для отображения (не персистится).
///
/// Свободно, если ЛЮБОЙ источник показывает свободным, атрибуция первому по
/// приоритету. Иначе занято, если кто-то явно показывает занятым. Иначе
/// inferred-sold по истории, но только если сектор в этом прогоне вообще
/// скрейпился. Иначе данных нет.
pub fn resolve_seat(
    view: &SeatVendorView,
    history_vendor: Option<Vendor>,
    sector_known: bool,
) -> ResolvedSeat {
    for vendor in Vendor::PRIORITY {
        if view.per_vendor.get(&vendor) == Some(&Some(SeatStatus::Free)) {
            return ResolvedSeat {
                class: SeatClass::Free,
                vendor: Some(vendor),
            };
        }
    }

    for vendor in Vendor::PRIORITY {
        if view.per_vendor.get(&vendor) == Some(&Some(SeatStatus::Taken)) {
            return ResolvedSeat {
                class: SeatClass::Taken,
                vendor: Some(vendor),
            };
        }
    }

    if sector_known {
        if let Some(vendor) = history_vendor {
            return ResolvedSeat {
                class: SeatClass::InferredSold,
                vendor: Some(vendor),
            };
        }
    }

    ResolvedSeat {
        class: SeatClass::NoData,
        vendor: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sector(free: &[&str], taken: &[&str]) -> RawSectorReport {
        RawSectorReport {
            sector_name: Some("Parter".to_string()),
            rows: BTreeMap::new(),
            free_seats: free.iter().map(|s| SeatKey::parse(s).unwrap()).collect(),
            taken_seats: taken.iter().map(|s| SeatKey::parse(s).unwrap()).collect(),
        }
    }

    #[test]
    fn free_anywhere_wins_with_priority_attribution() {
        let canonical = sector(&[], &["1-1"]); // biletyna: занято
        let ebilet = sector(&["1-1"], &[]); // ebilet: свободно

        let mut aligned: BTreeMap<Vendor, &RawSectorReport> = BTreeMap::new();
        aligned.insert(Vendor::Biletyna, &canonical);
        aligned.insert(Vendor::Ebilet, &ebilet);

        let seats = reconcile(&canonical, &aligned);
        let view = &seats[&SeatKey::parse("1-1").unwrap()];
        let resolved = resolve_seat(view, None, true);
        assert_eq!(resolved.class, SeatClass::Free);
        assert_eq!(resolved.vendor, Some(Vendor::Ebilet));
    }

    #[test]
    fn taken_everywhere_is_taken_not_inferred() {
        let canonical = sector(&[], &["1-1"]);
        let ebilet = sector(&[], &["1-1"]);

        let mut aligned: BTreeMap<Vendor, &RawSectorReport> = BTreeMap::new();
        aligned.insert(Vendor::Biletyna, &canonical);
        aligned.insert(Vendor::Ebilet, &ebilet);

        let seats = reconcile(&canonical, &aligned);
        let view = &seats[&SeatKey::parse("1-1").unwrap()];
        // Даже с записью в истории явное "занято" сильнее вывода по истории.
        let resolved = resolve_seat(view, Some(Vendor::Kupbilecik), true);
        assert_eq!(resolved.class, SeatClass::Taken);
        assert_eq!(resolved.vendor, Some(Vendor::Biletyna));
    }

    #[test]
    fn unaligned_vendor_contributes_unknown() {
        let canonical = sector(&["2-5"], &[]);
        let mut aligned: BTreeMap<Vendor, &RawSectorReport> = BTreeMap::new();
        aligned.insert(Vendor::Biletyna, &canonical);

        let seats = reconcile(&canonical, &aligned);
        let view = &seats[&SeatKey::parse("2-5").unwrap()];
        assert_eq!(view.per_vendor[&Vendor::Ebilet], None);
        assert_eq!(view.per_vendor[&Vendor::Kupbilecik], None);
        assert_eq!(view.per_vendor[&Vendor::Biletyna], Some(SeatStatus::Free));
    }

    #[test]
    fn seats_outside_canonical_universe_are_dropped() {
        let canonical = sector(&["1-1"], &[]);
        let ebilet = sector(&["1-1", "9-9"], &[]);

        let mut aligned: BTreeMap<Vendor, &RawSectorReport> = BTreeMap::new();
        aligned.insert(Vendor::Biletyna, &canonical);
        aligned.insert(Vendor::Ebilet, &ebilet);

        let seats = reconcile(&canonical, &aligned);
        assert!(!seats.contains_key(&SeatKey::parse("9-9").unwrap()));
    }

    #[test]
    fn history_only_applies_to_scraped_sectors() {
        let canonical = sector(&[], &[]);
        let seats = reconcile(&canonical, &BTreeMap::new());
        assert!(seats.is_empty());

        let view = SeatVendorView::default();
        let known = resolve_seat(&view, Some(Vendor::Ebilet), true);
        assert_eq!(known.class, SeatClass::InferredSold);
        let unknown = resolve_seat(&view, Some(Vendor::Ebilet), false);
        assert_eq!(unknown.class, SeatClass::NoData);
    }
}

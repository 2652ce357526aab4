//! pipeline.rs
//!
//! Полный проход сверки по одному событию: выравнивание секторов источников
//! на каноническую схему, сведение статусов по местам, агрегаты по
//! источникам, шаг истории (inferred-sold) и прирост продаж к прошлому
//! снимку. Вход - уже собранные отчёты источников, выход - один
//! `CombinedEventStats` плюс новое состояние истории и снимка.
//!
//! Проход синхронный и чистый: весь I/O (загрузка и сохранение истории,
//! снимка) лежит на вызывающем слое, который обязан держать не больше
//! одного прохода на событие одновременно.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};

use crate::core::{align, diff, history, reconcile};
use crate::core::seat_key::history_key;
use crate::models::{
    CombinedEventStats, CombinedSectorView, CombinedTotals, RawSectorReport, ResolvedSeat,
    RowCount, SeatClass, SeatHistory, SeatTotals, SectorStats, SourceStats, StatsSnapshot,
    Vendor, VendorReport,
};

pub struct PipelineInput {
    pub reports: BTreeMap<Vendor, VendorReport>,
    pub history: SeatHistory,
    pub snapshot: Option<StatsSnapshot>,
    pub now: DateTime<Utc>,
}

pub struct PipelineOutput {
    pub stats: CombinedEventStats,
    pub history: SeatHistory,
    pub snapshot: StatsSnapshot,
}

// Сектор источника после выравнивания: индекс в отчёте, имя для отображения
// и индекс канонического сектора, если нашёлся.
struct SectorAssignment {
    sector_idx: usize,
    display_name: String,
    canonical_idx: Option<usize>,
}

pub fn run(input: PipelineInput) -> PipelineOutput {
    let PipelineInput {
        reports,
        mut history,
        snapshot,
        now,
    } = input;

    // Пустые сектора - шум скрейпа, в сверке не участвуют.
    let cleaned: BTreeMap<Vendor, VendorReport> = reports
        .into_iter()
        .map(|(vendor, mut report)| {
            report.sectors.retain(|s| !s.is_empty());
            (vendor, report)
        })
        .collect();

    // Каноническая схема = сектора референсного источника.
    let canonical: Vec<RawSectorReport> = cleaned
        .get(&Vendor::REFERENCE)
        .map(|r| r.sectors.clone())
        .unwrap_or_default();
    let canonical_names: Vec<String> = canonical
        .iter()
        .enumerate()
        .map(|(i, s)| sector_display_name(s, i))
        .collect();

    let assignments = assign_sectors(&cleaned, &canonical, &canonical_names);

    // Отчёты, выровненные на каждый канонический сектор.
    let mut aligned_by_canonical: Vec<BTreeMap<Vendor, &RawSectorReport>> =
        vec![BTreeMap::new(); canonical.len()];
    // Сектора без канонической пары: имя -> (источник, отчёт).
    let mut synthetic: Vec<(String, Vendor, &RawSectorReport)> = Vec::new();

    for vendor in Vendor::PRIORITY {
        let Some(report) = cleaned.get(&vendor) else {
            continue;
        };
        for assignment in &assignments[&vendor] {
            let sector = &report.sectors[assignment.sector_idx];
            match assignment.canonical_idx {
                Some(idx) => {
                    aligned_by_canonical[idx].insert(vendor, sector);
                }
                None => synthetic.push((assignment.display_name.clone(), vendor, sector)),
            }
        }
    }

    // Сектор известен, если хоть один источник дал по нему непустые данные.
    let mut known_sectors: HashSet<String> = HashSet::new();
    for (idx, aligned) in aligned_by_canonical.iter().enumerate() {
        if !aligned.is_empty() {
            known_sectors.insert(canonical_names[idx].clone());
        }
    }
    for (name, _, _) in &synthetic {
        known_sectors.insert(name.clone());
    }

    // Свободные места прогона; обход в порядке приоритета, последний
    // записавший источник побеждает при совпадении.
    let mut observations = history::FreeObservations::new();
    for vendor in Vendor::PRIORITY {
        for (idx, aligned) in aligned_by_canonical.iter().enumerate() {
            if let Some(sector) = aligned.get(&vendor) {
                for key in &sector.free_seats {
                    observations.insert(history_key(&canonical_names[idx], key), vendor);
                }
            }
        }
        for (name, owner, sector) in &synthetic {
            if *owner == vendor {
                for key in &sector.free_seats {
                    observations.insert(history_key(name, key), vendor);
                }
            }
        }
    }

    let inferred = history::advance(&mut history, &observations, &known_sectors);

    // Объединённый вид по секторам для отрисовки.
    let mut sector_views: Vec<CombinedSectorView> = Vec::new();
    for (idx, canonical_sector) in canonical.iter().enumerate() {
        let name = &canonical_names[idx];
        sector_views.push(combined_view(
            name,
            canonical_sector,
            &aligned_by_canonical[idx],
            &inferred,
            known_sectors.contains(name),
        ));
    }
    for (name, vendor, sector) in &synthetic {
        let mut aligned = BTreeMap::new();
        aligned.insert(*vendor, *sector);
        sector_views.push(combined_view(name, sector, &aligned, &inferred, true));
    }

    let combined_totals = count_totals(&sector_views);

    // Агрегаты по источникам, целиком пересобираются каждый прогон.
    let multi_sector = canonical.len() > 1;
    let mut per_source: BTreeMap<Vendor, SourceStats> = BTreeMap::new();
    for (vendor, report) in &cleaned {
        per_source.insert(
            *vendor,
            source_stats(report, &assignments[vendor], multi_sector),
        );
    }

    // Прирост продаж и новый снимок.
    let current_taken: BTreeMap<Vendor, u32> = per_source
        .iter()
        .map(|(vendor, stats)| (*vendor, stats.totals.taken))
        .collect();
    let diff = diff::sales_diff(&current_taken, snapshot.as_ref());
    let new_snapshot = StatsSnapshot {
        taken: current_taken,
        timestamp: now,
    };

    let stats = CombinedEventStats {
        per_source,
        combined_totals,
        sectors: sector_views,
        inferred_sold: inferred,
        diff,
    };

    PipelineOutput {
        stats,
        history,
        snapshot: new_snapshot,
    }
}

/// Имя сектора для отображения и ключей истории.
fn sector_display_name(sector: &RawSectorReport, idx: usize) -> String {
    sector
        .sector_name
        .clone()
        .unwrap_or_else(|| format!("Sektor {}", idx + 1))
}

// Выравнивание секторов всех источников. Жадное, сектор за сектором в
// порядке отчёта; внутри ОДНОГО отчёта занятый канонический сектор второй
// раз не отдаётся. Набор занятых у каждого источника свой: все три
// источника обязаны уметь выровняться на один и тот же канонический
// сектор, иначе сводить было бы нечего.
fn assign_sectors(
    reports: &BTreeMap<Vendor, VendorReport>,
    canonical: &[RawSectorReport],
    canonical_names: &[String],
) -> BTreeMap<Vendor, Vec<SectorAssignment>> {
    let mut next_synthetic = canonical.len();
    let mut result: BTreeMap<Vendor, Vec<SectorAssignment>> = BTreeMap::new();

    for vendor in Vendor::PRIORITY {
        let Some(report) = reports.get(&vendor) else {
            result.insert(vendor, Vec::new());
            continue;
        };

        let mut claimed: HashSet<usize> = HashSet::new();

        let mut assignments = Vec::with_capacity(report.sectors.len());
        for (sector_idx, sector) in report.sectors.iter().enumerate() {
            let canonical_idx = if vendor == Vendor::REFERENCE {
                // Сектора референсного источника и есть каноническая схема.
                Some(sector_idx)
            } else if report.sectors.len() == 1 && canonical.len() == 1 {
                // Единственный сектор с обеих сторон: выравнивать нечего.
                Some(0)
            } else if report.sectors.len() == 1 {
                // Единственный сектор против многосекторной схемы - отчёт
                // целиком по событию, к отдельным секторам не привязывается.
                None
            } else {
                align::align(sector, canonical, &mut claimed)
            };

            let display_name = match canonical_idx {
                Some(idx) => canonical_names[idx].clone(),
                // Синтетическое имя не должно совпасть с настоящим именем
                // канонического сектора, иначе их ключи истории склеятся.
                None => loop {
                    next_synthetic += 1;
                    let candidate = format!("Sektor {next_synthetic}");
                    if !canonical_names.contains(&candidate) {
                        break candidate;
                    }
                },
            };

            assignments.push(SectorAssignment {
                sector_idx,
                display_name,
                canonical_idx,
            });
        }
        result.insert(vendor, assignments);
    }

    result
}

fn combined_view(
    name: &str,
    canonical_sector: &RawSectorReport,
    aligned: &BTreeMap<Vendor, &RawSectorReport>,
    inferred: &BTreeMap<String, Vendor>,
    sector_known: bool,
) -> CombinedSectorView {
    let reconciled = reconcile::reconcile(canonical_sector, aligned);

    let mut seats: BTreeMap<String, ResolvedSeat> = BTreeMap::new();
    for (key, view) in &reconciled {
        let hk = history_key(name, key);
        let resolved = reconcile::resolve_seat(view, inferred.get(&hk).copied(), sector_known);
        seats.insert(key.encode(), resolved);
    }

    // Выведенные по истории места, исчезнувшие из текущей схемы сектора.
    for (hk, vendor) in inferred {
        if let Some((sector, seat_key)) = crate::core::seat_key::split_history_key(hk) {
            if sector == name && !seats.contains_key(seat_key) {
                seats.insert(
                    seat_key.to_string(),
                    ResolvedSeat {
                        class: SeatClass::InferredSold,
                        vendor: Some(*vendor),
                    },
                );
            }
        }
    }

    CombinedSectorView {
        sector_name: name.to_string(),
        seats,
    }
}

fn count_totals(views: &[CombinedSectorView]) -> CombinedTotals {
    let mut totals = CombinedTotals::default();
    for view in views {
        for seat in view.seats.values() {
            totals.total += 1;
            match seat.class {
                SeatClass::Free => totals.free += 1,
                SeatClass::Taken => totals.taken += 1,
                SeatClass::InferredSold => totals.inferred_sold += 1,
                _ => totals.no_data += 1,
            }
        }
    }
    totals
}

// Агрегат одного источника: суммарные счётчики, сводная таблица рядов
// (подписи нормализованы, счётчики при совпадении складываются), списки
// мест и, для многосекторной схемы, разбивка по секторам.
fn source_stats(
    report: &VendorReport,
    assignments: &[SectorAssignment],
    multi_sector: bool,
) -> SourceStats {
    let mut stats = SourceStats {
        final_url: report.final_url.clone(),
        ..SourceStats::default()
    };

    let mut sector_stats: Vec<SectorStats> = Vec::new();
    for assignment in assignments {
        let sector = &report.sectors[assignment.sector_idx];
        let rows = normalized_rows(&sector.rows);

        let totals = SeatTotals {
            total: sector.total_seats(),
            free: sector.free_count(),
            taken: sector.taken_count(),
        };
        stats.totals.total += totals.total;
        stats.totals.free += totals.free;
        stats.totals.taken += totals.taken;

        for (label, count) in &rows {
            let entry = stats.rows.entry(label.clone()).or_default();
            entry.total += count.total;
            entry.free += count.free;
            entry.taken += count.taken;
        }
        stats.free_seats.extend(sector.free_seats.iter().cloned());
        stats.taken_seats.extend(sector.taken_seats.iter().cloned());

        if multi_sector {
            sector_stats.push(SectorStats {
                sector_name: assignment.display_name.clone(),
                totals,
                rows,
                free_seats: sector.free_seats.clone(),
                taken_seats: sector.taken_seats.clone(),
            });
        }
    }

    if multi_sector {
        stats.sectors = Some(sector_stats);
    }
    stats
}

fn normalized_rows(rows: &BTreeMap<String, RowCount>) -> BTreeMap<String, RowCount> {
    let mut out: BTreeMap<String, RowCount> = BTreeMap::new();
    for (label, count) in rows {
        let entry = out
            .entry(crate::core::rows::normalize_row(label))
            .or_default();
        entry.total += count.total;
        entry.free += count.free;
        entry.taken += count.taken;
    }
    out
}

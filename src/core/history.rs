//! history.rs
//!
//! Вывод "продано с прошлого раза" по истории свободных мест. История хранит
//! для каждого места последний источник, показывавший его свободным. Если в
//! новом прогоне сектор скрейпился, а место из истории больше не свободно -
//! место считается проданным между проверками.
//!
//! Ключевой инвариант: сектор, который в этом прогоне не скрейпился, не даёт
//! ни одной inferred-sold записи. Иначе разовый сбой скрейпа одного источника
//! читался бы как "всё распродано".

use std::collections::{BTreeMap, HashSet};

use crate::core::seat_key::split_history_key;
use crate::models::{SeatHistory, Vendor};

/// Наблюдения одного прогона: ключ истории -> источник, показавший место
/// свободным. При совпадении у двух источников побеждает последний записанный
/// (порядок обхода источников фиксирован, так что результат детерминирован).
pub type FreeObservations = BTreeMap<String, Vendor>;

/// Один шаг истории: записать свободные места прогона и вычислить
/// inferred-sold для известных секторов.
///
/// История только растёт; устаревшие записи о местах, снова ставших
/// свободными, просто перезаписываются.
pub fn advance(
    history: &mut SeatHistory,
    observations: &FreeObservations,
    known_sectors: &HashSet<String>,
) -> BTreeMap<String, Vendor> {
    let mut inferred: BTreeMap<String, Vendor> = BTreeMap::new();

    for (key, vendor) in &history.seats {
        let Some((sector, _)) = split_history_key(key) else {
            continue;
        };
        if !known_sectors.contains(sector) {
            continue;
        }
        if !observations.contains_key(key) {
            inferred.insert(key.clone(), *vendor);
        }
    }

    for (key, vendor) in observations {
        history.seats.insert(key.clone(), *vendor);
    }

    inferred
}

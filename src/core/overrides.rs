//! overrides.rs
//!
//! Слияние ручной правки оператора с живым статусом места. Фиксированный
//! стек приоритетов, сверху вниз:
//!
//! 1. Спец-категория правки (не в продаже / другой канал / касса) побеждает всё.
//! 2. Живое "занято" сильнее любой правки "свободно": наблюдаемую продажу
//!    устаревшая ручная пометка не перекрывает.
//! 3. Правка "занято" сильнее живого свободно/нет данных (коррекция промаха скрейпера).
//! 4. Правка "свободно" сильнее живого свободно/нет данных (оператор
//!    переназначает, какому источнику приписано свободное место).
//! 5. Иначе живой статус.
//!
//! Функция тотальная и детерминированная; отсутствие правки вообще
//! обрабатывает вызывающий код, минуя слияние.

use crate::models::{SeatClass, Vendor};

pub fn merge(
    live_class: SeatClass,
    live_vendor: Option<Vendor>,
    override_class: SeatClass,
    override_vendor: Option<Vendor>,
) -> (SeatClass, Option<Vendor>) {
    if override_class.is_special() {
        return (override_class, None);
    }

    if live_class == SeatClass::Taken {
        return (SeatClass::Taken, live_vendor);
    }

    match override_class {
        SeatClass::Taken => (SeatClass::Taken, override_vendor),
        SeatClass::Free => (SeatClass::Free, override_vendor),
        _ => (live_class, live_vendor),
    }
}

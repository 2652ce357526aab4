//! Ядро сверки: чистые синхронные преобразования без I/O.
//! Порядок зависимостей снизу вверх: нормализация рядов -> ключи мест ->
//! выравнивание секторов -> сведение статусов -> история/дельта/правки ->
//! полный проход.

pub mod align;
pub mod diff;
pub mod history;
pub mod overrides;
pub mod pipeline;
pub mod reconcile;
pub mod rows;
pub mod seat_key;

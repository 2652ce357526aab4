pub mod history;
pub mod report;
pub mod stats;
pub mod vendor;

pub use history::{OverrideEntry, OverrideMap, SeatHistory, StatsSnapshot};
pub use report::{RawSectorReport, RowCount, VendorReport};
pub use stats::{
    CombinedEventStats, CombinedSectorView, CombinedTotals, ResolvedSeat, SalesDiff, SeatClass,
    SeatTotals, SectorStats, SourceStats,
};
pub use vendor::Vendor;

pub use crate::core::seat_key::SeatKey;

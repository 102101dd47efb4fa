//! Result types handed between the scan and aggregation stages.

mod counts;
mod result;

pub use counts::{OutcomeCounts, SeverityCounts};
pub use result::{ScanResult, ScanStatus};

pub mod snapshot;
pub mod units;
pub mod plot;

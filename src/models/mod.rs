pub mod check;
pub mod playlist;

pub use check::{BatchSummary, CheckResult};
pub use playlist::{Channel, PlaylistStats, UNNAMED_CHANNEL};

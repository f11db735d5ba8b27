pub mod runner;
pub mod tds_refresh;

pub use runner::JobRunner;
pub use tds_refresh::TdsRefreshJob;

//! TrackerBlocker Application Layer
//!
//! Ports describe the collaborators the rule list lifecycle depends on;
//! services hold the orchestration logic.
pub mod ports;
pub mod services;
pub mod use_cases;

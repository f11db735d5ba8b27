pub mod content_blocker;

pub use content_blocker::ContentBlockerRulesBuilder;

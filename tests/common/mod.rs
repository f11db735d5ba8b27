#![allow(dead_code)]

mod fixtures;

pub use fixtures::{StubTdsSource, FIXTURE_TDS};
pub use test_env::{wait_until, TestEnv};

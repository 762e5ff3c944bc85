#![allow(dead_code)]

pub mod actions;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use actions::TestResponse;
#[allow(unused_imports)]
pub use mocks::FailingRefreshTokenRepository;
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder, TEST_JWT_SECRET, TEST_POLKA_KEY};

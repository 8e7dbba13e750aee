//! Integration test modules

mod broadcaster_tests;
mod scheduler_tests;

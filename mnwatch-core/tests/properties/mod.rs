//! Property test modules

mod classifier_tests;
mod parser_tests;
mod store_tests;

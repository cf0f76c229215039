pub mod config_tests;
pub mod interval_tests;
pub mod stream_validation_tests;

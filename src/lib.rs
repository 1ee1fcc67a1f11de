pub mod config;
pub mod curve;
pub mod opts;
pub mod report;
pub mod sample;
pub mod table;
pub mod utils;

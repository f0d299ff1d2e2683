pub mod client;
pub mod config;
pub mod errors;
pub mod report;
pub mod runner;
pub mod types;

pub mod cli;
pub mod config;
pub mod errors;
pub mod fxcop;
pub mod grep;
pub mod logging;
pub mod stats;
pub mod tools;
pub mod types;
pub mod xml;

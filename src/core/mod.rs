pub mod types;
pub mod config;
pub mod error;
pub mod submission;
pub mod catalog;
pub mod stats;

pub mod compression_result;
pub mod config;
pub mod error;
pub mod media;
pub mod progress;
pub mod state;

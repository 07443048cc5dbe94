pub mod audit;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod reclaim;
pub mod utils;

pub use config::Config;
pub use error::{CleanerError, ClientError, Result};

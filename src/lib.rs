pub mod actions;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod ranker;
pub mod resolver;
pub mod utils;

pub use error::{Error, Result};

// flymply-cache - Size-bounded, TTL-expiring prediction response cache
// Author: kelexine (https://github.com/kelexine)

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod utils;

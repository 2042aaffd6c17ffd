//! Birth lottery core: merge upstream birth statistics into a weighted
//! per-country distribution and draw countries from it.

pub mod cache;
pub mod config;
pub mod distribution;
pub mod error;
pub mod indicator;
pub mod merger;
pub mod pipeline;
pub mod report;
pub mod rng;
pub mod sampler;
pub mod session;
pub mod source;
pub mod store;
pub mod types;

//! Data types shared across the pipeline.

pub mod config;
pub mod endpoint;
pub mod event;
pub mod record;
pub mod sitemap;
pub mod submission;
pub mod url_set;

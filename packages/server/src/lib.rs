// IndexNow Server
//
// Hosts the IndexNow pipeline for one site: a CMS publish hook, operator
// sitemap triggers over HTTP and the CLI, and a periodic gate-checked tick.

pub mod config;
pub mod kernel;
pub mod server;

pub use config::*;

// HTTP routes
pub mod health;
pub mod publish;
pub mod sitemap;

pub use health::*;
pub use publish::*;
pub use sitemap::*;

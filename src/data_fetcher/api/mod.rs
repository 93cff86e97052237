pub mod fetch_utils;
pub mod http_client;
pub mod queries;
pub mod urls;
mod core;

// Re-export URL utilities
pub use urls::*;
// Re-export HTTP client utilities
pub use http_client::*;
// Re-export the query helper and the analysis fetch
pub use core::*;
pub use fetch_utils::post_query;
pub use queries::PxQuery;

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod middleware;
pub mod models;
pub mod result;
pub mod router;
pub mod utils;

pub use router::AppState;

mod config;
mod error;
mod models;
mod store;

pub use config::HttpStoreConfig;
pub use error::{HttpStoreError, HttpStoreResult};
pub use store::HttpMatchStore;

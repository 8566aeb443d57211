//! Reading Store Facade
//!
//! Unified re-exports for the reading store.
//!
//! This facade provides a single entry point for all store functionality:
//! - `reading_spi` - Reading model, store trait, and errors
//! - `reading_api` - Connection configuration and builder
//! - `reading_core` - Backends (in-memory, MySQL) and paging
//!
//! # Example
//!
//! ```rust,ignore
//! use reading_facade::{MemoryStore, ReadingStore, SensorReading};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryStore::new();
//!     store
//!         .append(&SensorReading::new(25.0, 60.0, chrono::Utc::now()))
//!         .await
//!         .unwrap();
//!     let latest = store.latest().await.unwrap();
//!     println!("{:?}", latest);
//! }
//! ```

// Re-export everything from SPI
pub use reading_spi::*;

// Re-export everything from API
pub use reading_api::*;

// Re-export everything from Core
pub use reading_core::*;

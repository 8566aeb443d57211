//! Reading Store Core
//!
//! Store backends and paging for sensor readings.

pub mod memory;
#[cfg(feature = "mysql")]
pub mod mysql;
pub mod pagination;

// Re-export SPI types for implementations
pub use reading_spi::{Page, ReadingStore, Result, SensorReading, StoreError};

pub use memory::MemoryStore;
#[cfg(feature = "mysql")]
pub use mysql::MySqlStore;
pub use pagination::{paginate, single_page, MAX_PAGE_SIZE};

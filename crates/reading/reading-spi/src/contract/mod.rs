//! Contracts implemented by reading store backends.

mod reading_store;

pub use reading_store::ReadingStore;

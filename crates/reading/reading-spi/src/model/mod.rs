//! Data models for sensor readings.

mod page;
mod reading;

pub use page::Page;
pub use reading::SensorReading;

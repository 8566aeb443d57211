//! Contracts implemented by forecast models.

mod regressor;

pub use regressor::Regressor;

//! Data models for features, scaling and forecasts.

mod feature_vector;
mod forecast_result;
mod scaler_state;

pub use feature_vector::FeatureVector;
pub use forecast_result::ForecastResult;
pub use scaler_state::ScalerState;

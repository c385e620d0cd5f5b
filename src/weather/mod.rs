pub mod delta;

pub use delta::{DeltaResult, Dimension, DimensionDelta, WeatherBaseline, WeatherDeltaTracker};

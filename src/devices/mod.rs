//! Local hardware seen through small traits, plus host adapters.

pub mod display;
pub mod panels;
pub mod sensor;

pub use display::{DisplaySurface, Frame, TerminalDisplay, TextLine};
pub use sensor::{ClimateSensor, SimulatedSensor};

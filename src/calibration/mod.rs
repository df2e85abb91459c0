pub mod runner;
pub mod tuning;

pub use runner::{CalibrationMetrics, CalibrationRunner, CalibrationSample, ObservedClicks};
pub use tuning::WeightTuner;

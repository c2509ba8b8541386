pub mod analyze;
pub mod dataset;
pub mod seed;

pub mod chart;
pub mod xlsx;

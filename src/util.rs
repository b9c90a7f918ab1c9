pub mod com;
pub mod conv;

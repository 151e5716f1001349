pub mod collector;
pub mod ports;

pub mod docker;
pub mod runner;
pub mod utils;

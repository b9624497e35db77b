pub mod args;
pub mod itest;

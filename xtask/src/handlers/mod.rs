pub mod dev;
pub mod itest;
pub mod run;
pub mod testing;

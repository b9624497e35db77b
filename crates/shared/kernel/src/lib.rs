//! Kernel utilities shared across crates.
//! Keep this crate lightweight: layered config loading and small text helpers.
//!
//! ## Config loading
//! ```rust,no_run
//! use sim_kernel::config::load_config;
//! use sim_kernel::domain::config::SimConfig;
//!
//! let cfg: SimConfig = load_config(Some("sim.toml")).unwrap();
//! println!("{}", cfg.map.path.display());
//! ```
pub mod config;
pub mod text;

pub use sim_domain as domain;

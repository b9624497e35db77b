//! # Domain Models
//!
//! Pure simulation types with minimal dependencies (`serde`, `rand`, `strum`, `thiserror`).
//! Keep it lean: no I/O or logging here. Callers decide what to do with the
//! outcomes returned by the `update` methods.
//!
//! ## Example
//!
//! ```rust
//! use sim_domain::hex::{Hex, Layout, Orientation, Point};
//! use sim_domain::time::SimTime;
//!
//! let layout = Layout::new(Orientation::POINTY, Point::new(70.0, 70.0), Point::ORIGIN);
//! let hex = Hex::axial(3, -1);
//! assert_eq!(layout.pixel_to_hex(layout.hex_to_pixel(hex)).round(), hex);
//!
//! let noon = SimTime::from_steps(0) + SimTime::hours(12);
//! assert_eq!(noon.to_string(), "00000-00-00 12:00");
//! ```

pub mod agent;
pub mod config;
mod error;
pub mod hex;
pub mod names;
pub mod resource;
pub mod tile;
pub mod time;

pub use error::{DomainError, DomainErrorExt};

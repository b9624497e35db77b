use crate::hex::{Layout, OrientationKind, Point};
use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level simulation configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimConfigInner {
    pub map: MapConfig,
    pub layout: LayoutConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct SimConfig {
    #[serde(flatten, default)]
    inner: Arc<SimConfigInner>,
}

impl Deref for SimConfig {
    type Target = SimConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for SimConfig {
    fn deref_mut(&mut self) -> &mut SimConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Which Tiled map to load.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub path: PathBuf,
}

/// Pixel layout of the hex grid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub orientation: OrientationKind,
    pub size: Point,
    pub origin: Point,
}

impl LayoutConfig {
    #[must_use]
    pub fn layout(&self) -> Layout {
        Layout::new(self.orientation.into(), self.size, self.origin)
    }
}

// --- Default ---

impl Default for MapConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("assets/maps/4corners.tmj") }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self { orientation: OrientationKind::Pointy, size: Point::new(70.0, 70.0), origin: Point::ORIGIN }
    }
}

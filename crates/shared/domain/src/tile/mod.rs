//! Map cells and what stands on them.

mod building;
mod deposit;

pub use building::{Building, Death, HOME_DESTRUCTION_THRESHOLD, Home, HomeReport, Market};
pub use deposit::{Harvest, Regrowth, ResourceDeposit};

use crate::DomainError;
use crate::hex::Hex;
use crate::resource::{Resource, Stock};
use crate::time::SimTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Terrain class as authored in the map's tileset.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TileClass {
    Mountain,
    Grass,
    Desert,
    Forest,
    Cactus,
    Stone,
    House,
    Food,
    Gem,
    Market,
}

impl TileClass {
    /// # Errors
    /// Returns [`DomainError::UnknownTileClass`] for names outside the known set.
    pub fn parse(class: &str) -> Result<Self, DomainError> {
        Self::from_str(class)
            .map_err(|_| DomainError::UnknownTileClass { class: class.to_owned(), context: None })
    }

    fn feature(self) -> TileFeature {
        match self {
            Self::Mountain | Self::Grass | Self::Desert => TileFeature::Terrain,
            Self::Forest => TileFeature::Deposit(ResourceDeposit::forest()),
            Self::Cactus => TileFeature::Deposit(ResourceDeposit::cactus()),
            Self::Stone => TileFeature::Deposit(ResourceDeposit::stone()),
            Self::Food => TileFeature::Deposit(ResourceDeposit::food()),
            Self::Gem => TileFeature::Deposit(ResourceDeposit::gem()),
            Self::House => TileFeature::Home(Box::default()),
            Self::Market => TileFeature::Market(Market::default()),
        }
    }
}

/// Custom properties carried by a tileset tile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileProperties {
    pub class: Option<String>,
    pub traversable: bool,
    pub traversal_cost: Option<u32>,
}

#[derive(Debug, Clone)]
pub enum TileFeature {
    Terrain,
    Deposit(ResourceDeposit),
    Home(Box<Home>),
    Market(Market),
}

/// Something worth reporting from a [`Tile::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileEvent {
    Idle,
    Regrew { resource: Resource, stock: Stock },
    Home(HomeReport),
}

#[derive(Debug, Clone)]
pub struct Tile {
    pub hex: Hex,
    pub class: TileClass,
    pub traversable: bool,
    traversal_cost: Option<u32>,
    pub feature: TileFeature,
}

impl Tile {
    /// Builds a tile; the traversal cost is dropped for impassable tiles.
    #[must_use]
    pub fn new(hex: Hex, class: TileClass, traversable: bool, traversal_cost: Option<u32>) -> Self {
        Self {
            hex,
            class,
            traversable,
            traversal_cost: traversal_cost.filter(|_| traversable),
            feature: class.feature(),
        }
    }

    /// # Errors
    /// Returns [`DomainError::UnknownTileClass`] when the class is missing or unknown.
    pub fn from_properties(hex: Hex, properties: &TileProperties) -> Result<Self, DomainError> {
        let class = TileClass::parse(properties.class.as_deref().unwrap_or_default())?;
        Ok(Self::new(hex, class, properties.traversable, properties.traversal_cost))
    }

    #[must_use]
    pub const fn traversal_cost(&self) -> Option<u32> {
        self.traversal_cost
    }

    /// Cost of stepping onto this tile, `None` when it cannot be entered.
    #[must_use]
    pub fn movement_cost(&self) -> Option<u32> {
        self.traversable.then(|| self.traversal_cost.unwrap_or(1))
    }

    #[must_use]
    pub fn deposit(&self) -> Option<&ResourceDeposit> {
        match &self.feature {
            TileFeature::Deposit(deposit) => Some(deposit),
            _ => None,
        }
    }

    pub fn deposit_mut(&mut self) -> Option<&mut ResourceDeposit> {
        match &mut self.feature {
            TileFeature::Deposit(deposit) => Some(deposit),
            _ => None,
        }
    }

    #[must_use]
    pub fn home(&self) -> Option<&Home> {
        match &self.feature {
            TileFeature::Home(home) => Some(home.as_ref()),
            _ => None,
        }
    }

    pub fn home_mut(&mut self) -> Option<&mut Home> {
        match &mut self.feature {
            TileFeature::Home(home) => Some(home.as_mut()),
            _ => None,
        }
    }

    /// # Errors
    /// Propagates agent errors raised while updating a home's occupants.
    pub fn update(&mut self, time: SimTime) -> Result<TileEvent, DomainError> {
        match &mut self.feature {
            TileFeature::Terrain | TileFeature::Market(_) => Ok(TileEvent::Idle),
            TileFeature::Deposit(deposit) => Ok(if deposit.regrow(time) {
                TileEvent::Regrew { resource: deposit.resource, stock: deposit.stock }
            } else {
                TileEvent::Idle
            }),
            TileFeature::Home(home) => {
                let report = home.update(time)?;
                Ok(if report == HomeReport::default() { TileEvent::Idle } else { TileEvent::Home(report) })
            },
        }
    }
}

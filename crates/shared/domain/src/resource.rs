use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Goods that can be harvested from deposits and stored in buildings.
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
pub enum Resource {
    Wood,
    Stone,
    Food,
    Gem,
}

impl Resource {
    /// How strongly a home wants its occupants gathering this resource.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Food => 10,
            Self::Stone | Self::Gem => 2,
            Self::Wood => 1,
        }
    }
}

/// Remaining amount held by a deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stock {
    Finite(u32),
    Unlimited,
}

impl Stock {
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Finite(0))
    }

    /// Clamps `wanted` to what is available.
    #[must_use]
    pub fn available(self, wanted: u32) -> u32 {
        match self {
            Self::Finite(n) => n.min(wanted),
            Self::Unlimited => wanted,
        }
    }
}

impl fmt::Display for Stock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(n) => write!(f, "{n}"),
            Self::Unlimited => f.write_str("unlimited"),
        }
    }
}

/// A counted bag of resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    items: BTreeMap<Resource, u32>,
}

impl Inventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, resource: Resource) -> u32 {
        self.items.get(&resource).copied().unwrap_or(0)
    }

    pub fn add(&mut self, resource: Resource, amount: u32) {
        if amount > 0 {
            *self.items.entry(resource).or_insert(0) += amount;
        }
    }

    /// Removes up to `amount` and returns how much was actually taken.
    pub fn take(&mut self, resource: Resource, amount: u32) -> u32 {
        let Some(held) = self.items.get_mut(&resource) else {
            return 0;
        };
        let taken = (*held).min(amount);
        *held -= taken;
        if *held == 0 {
            self.items.remove(&resource);
        }
        taken
    }

    /// Moves everything into `other`, leaving `self` empty.
    pub fn drain_into(&mut self, other: &mut Self) {
        for (resource, amount) in std::mem::take(&mut self.items) {
            other.add(resource, amount);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        self.items.iter().map(|(r, n)| (*r, *n))
    }
}

impl FromIterator<(Resource, u32)> for Inventory {
    fn from_iter<I: IntoIterator<Item = (Resource, u32)>>(iter: I) -> Self {
        let mut inventory = Self::new();
        for (resource, amount) in iter {
            inventory.add(resource, amount);
        }
        inventory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn names_are_lowercase() {
        assert_eq!(Resource::Gem.to_string(), "gem");
        assert_eq!(Resource::from_str("wood").ok(), Some(Resource::Wood));
        assert!(Resource::from_str("iron").is_err());
    }

    #[test]
    fn food_has_top_priority() {
        let top = Resource::iter().max_by_key(|r| r.priority());
        assert_eq!(top, Some(Resource::Food));
        assert!(Resource::Stone.priority() > Resource::Wood.priority());
    }

    #[test]
    fn take_never_goes_below_zero() {
        let mut inv: Inventory = [(Resource::Wood, 3)].into_iter().collect();
        assert_eq!(inv.take(Resource::Wood, 5), 3);
        assert_eq!(inv.get(Resource::Wood), 0);
        assert_eq!(inv.take(Resource::Stone, 1), 0);
        assert!(inv.is_empty());
    }

    #[test]
    fn drain_merges_counts() {
        let mut agent: Inventory = [(Resource::Food, 2), (Resource::Wood, 1)].into_iter().collect();
        let mut home: Inventory = [(Resource::Food, 5)].into_iter().collect();
        agent.drain_into(&mut home);
        assert!(agent.is_empty());
        assert_eq!(home.get(Resource::Food), 7);
        assert_eq!(home.get(Resource::Wood), 1);
    }

    #[test]
    fn stock_availability() {
        assert_eq!(Stock::Finite(3).available(10), 3);
        assert_eq!(Stock::Unlimited.available(10), 10);
        assert!(Stock::Finite(0).is_empty());
        assert_eq!(Stock::Unlimited.to_string(), "unlimited");
    }
}

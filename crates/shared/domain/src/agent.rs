//! Villagers living in homes and working resource deposits.

use crate::hex::Hex;
use crate::names::generate_name;
use crate::resource::{Inventory, Resource};
use crate::time::SimTime;
use crate::DomainError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_ACTION_POINTS: u32 = 100;
pub const STARTING_SATIETY: i32 = 100;
pub const HUNGER_THRESHOLD: i32 = 80;
pub const SATIETY_PER_FOOD: i32 = 20;
pub const LIFESPAN_YEARS: i64 = 80;

const MIN_MODIFIER: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    OldAge,
    Starvation,
    HomeDestroyed,
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OldAge => "old age",
            Self::Starvation => "starvation",
            Self::HomeDestroyed => "home destroyed",
        })
    }
}

/// Outcome of a single [`Agent::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentStatus {
    Alive,
    Died(DeathCause),
}

#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub location: Hex,
    pub target_location: Hex,
    pub home: Hex,
    pub fitness_multiplier: f64,
    pub age: SimTime,
    pub satiety: i32,
    pub alive: bool,
    pub inventory: Inventory,
    pub action_points: u32,
}

impl Agent {
    /// Starts an [`AgentBuilder`] for an agent living at `home`.
    pub fn builder(id: AgentId, home: Hex) -> AgentBuilder {
        AgentBuilder {
            id,
            home,
            name: None,
            location: None,
            age: None,
            satiety: STARTING_SATIETY,
            fitness_multiplier: 1.0,
        }
    }

    /// Advances the agent by one step, eating from `pantry` when hungry.
    ///
    /// # Errors
    /// Returns [`DomainError::Agent`] when called on a dead agent.
    pub fn update(&mut self, pantry: &mut Inventory) -> Result<AgentStatus, DomainError> {
        if !self.alive {
            return Err(DomainError::Agent {
                message: format!("cannot update dead agent {} ({})", self.name, self.id).into(),
                context: None,
            });
        }

        self.age += 1;

        if self.age > SimTime::years(LIFESPAN_YEARS) {
            return Ok(self.die(DeathCause::OldAge));
        }
        if self.satiety < 0 {
            return Ok(self.die(DeathCause::Starvation));
        }

        self.satiety -= 1;
        if self.satiety < HUNGER_THRESHOLD {
            self.eat(pantry);
        }

        self.action_points = self.action_points.saturating_add(self.action_point_gain()).min(MAX_ACTION_POINTS);
        Ok(AgentStatus::Alive)
    }

    /// Eats one unit of food from `pantry`; returns whether anything was eaten.
    pub fn eat(&mut self, pantry: &mut Inventory) -> bool {
        let eaten = pantry.take(Resource::Food, 1) == 1;
        if eaten {
            self.satiety += SATIETY_PER_FOOD;
        }
        eaten
    }

    pub fn die(&mut self, cause: DeathCause) -> AgentStatus {
        self.alive = false;
        AgentStatus::Died(cause)
    }

    /// Action points gained this step.
    ///
    /// Age and satiety each contribute a cubic-regression factor clamped to `[0, 1]`:
    /// working capacity peaks around 25 years and falls off with hunger.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn action_point_gain(&self) -> u32 {
        let modifier = (age_factor(self.age.total_years()) * satiety_factor(f64::from(self.satiety)))
            .max(MIN_MODIFIER);
        (modifier * self.fitness_multiplier * 100.0).round_ties_even().max(0.0) as u32
    }
}

fn age_factor(years: f64) -> f64 {
    let raw = -0.221_329_1 + 1.310_579 * years - 0.032_924_93 * years.powi(2)
        + 0.000_212_902_9 * years.powi(3);
    (raw / 15.0).clamp(0.0, 1.0)
}

fn satiety_factor(satiety: f64) -> f64 {
    let raw = -3.509_472 + 2.692_242 * satiety - 0.027_655_72 * satiety.powi(2)
        + 0.000_110_914_2 * satiety.powi(3);
    (raw / 100.0).clamp(0.0, 1.0)
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} at {} (age {:.1}y, satiety {}, ap {})",
            self.id,
            self.name,
            self.location,
            self.age.total_years(),
            self.satiety,
            self.action_points
        )
    }
}

#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug)]
pub struct AgentBuilder {
    id: AgentId,
    home: Hex,
    name: Option<String>,
    location: Option<Hex>,
    age: Option<SimTime>,
    satiety: i32,
    fitness_multiplier: f64,
}

impl AgentBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Starting cell; defaults to the home.
    pub const fn location(mut self, location: Hex) -> Self {
        self.location = Some(location);
        self
    }

    pub const fn age(mut self, age: SimTime) -> Self {
        self.age = Some(age);
        self
    }

    pub const fn satiety(mut self, satiety: i32) -> Self {
        self.satiety = satiety;
        self
    }

    pub const fn fitness(mut self, multiplier: f64) -> Self {
        self.fitness_multiplier = multiplier;
        self
    }

    /// Fills unset fields from `rng`: a generated name and an age of 18 to 45 years.
    ///
    /// # Errors
    /// Returns [`DomainError::Agent`] if the fitness multiplier is not a positive number.
    pub fn build(self, rng: &mut impl Rng) -> Result<Agent, DomainError> {
        if !(self.fitness_multiplier.is_finite() && self.fitness_multiplier > 0.0) {
            return Err(DomainError::Agent {
                message: format!("fitness multiplier must be positive, got {}", self.fitness_multiplier)
                    .into(),
                context: None,
            });
        }

        let location = self.location.unwrap_or(self.home);
        Ok(Agent {
            id: self.id,
            name: self.name.unwrap_or_else(|| generate_name(rng)),
            location,
            target_location: location,
            home: self.home,
            fitness_multiplier: self.fitness_multiplier,
            age: self.age.unwrap_or_else(|| SimTime::years(rng.gen_range(18..=45))),
            satiety: self.satiety,
            alive: true,
            inventory: Inventory::new(),
            action_points: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn agent(age_years: i64, satiety: i32) -> Agent {
        Agent::builder(AgentId(1), Hex::ORIGIN)
            .name("Ada Reed")
            .age(SimTime::years(age_years))
            .satiety(satiety)
            .build(&mut StdRng::seed_from_u64(0))
            .unwrap()
    }

    #[test]
    fn builder_fills_defaults() {
        let mut rng = StdRng::seed_from_u64(3);
        let a = Agent::builder(AgentId(9), Hex::axial(2, -1)).build(&mut rng).unwrap();
        assert!((18..=45).contains(&a.age.year()));
        assert_eq!(a.satiety, STARTING_SATIETY);
        assert_eq!(a.location, Hex::axial(2, -1));
        assert_eq!(a.target_location, a.location);
        assert!(!a.name.is_empty());
        assert!(a.alive);
    }

    #[test]
    fn builder_rejects_bad_fitness() {
        let mut rng = StdRng::seed_from_u64(3);
        let err = Agent::builder(AgentId(1), Hex::ORIGIN).fitness(0.0).build(&mut rng).unwrap_err();
        assert!(matches!(err, DomainError::Agent { .. }));
    }

    #[test]
    fn healthy_adult_gains_full_points() {
        let a = agent(25, 100);
        assert_eq!(a.action_point_gain(), 100);
    }

    #[test]
    fn starving_agent_hits_the_floor() {
        assert_eq!(agent(25, 0).action_point_gain(), 1);
        assert_eq!(agent(0, 100).action_point_gain(), 1);
    }

    #[test]
    fn elderly_agent_is_slower() {
        let gain = agent(60, 100).action_point_gain();
        assert!(gain > 1 && gain < 50, "gain was {gain}");
    }

    #[test]
    fn action_points_are_capped() {
        let mut a = agent(25, 100);
        let mut pantry = Inventory::new();
        for _ in 0..5 {
            a.update(&mut pantry).unwrap();
        }
        assert_eq!(a.action_points, MAX_ACTION_POINTS);
    }

    #[test]
    fn huge_fitness_saturates_instead_of_overflowing() {
        let mut a = Agent::builder(AgentId(2), Hex::ORIGIN)
            .name("Bo Flint")
            .age(SimTime::years(25))
            .fitness(1e9)
            .build(&mut StdRng::seed_from_u64(0))
            .unwrap();
        let mut pantry = Inventory::new();
        for _ in 0..3 {
            a.update(&mut pantry).unwrap();
        }
        assert_eq!(a.action_points, MAX_ACTION_POINTS);
    }

    #[test]
    fn agents_clone_with_their_inventory() {
        let mut a = agent(30, 100);
        a.inventory.add(Resource::Wood, 3);
        let copy = a.clone();
        assert_eq!(copy.inventory.get(Resource::Wood), 3);
        assert_eq!(copy.home, Hex::ORIGIN);
        assert_eq!(serde_json::to_string(&DeathCause::HomeDestroyed).unwrap(), "\"home_destroyed\"");
    }

    #[test]
    fn hungry_agent_eats_from_pantry() {
        let mut a = agent(25, HUNGER_THRESHOLD);
        let mut pantry: Inventory = [(Resource::Food, 1)].into_iter().collect();
        assert_eq!(a.update(&mut pantry).unwrap(), AgentStatus::Alive);
        assert_eq!(a.satiety, HUNGER_THRESHOLD - 1 + SATIETY_PER_FOOD);
        assert_eq!(pantry.get(Resource::Food), 0);
    }

    #[test]
    fn satiety_drops_every_step() {
        let mut a = agent(25, 100);
        a.update(&mut Inventory::new()).unwrap();
        assert_eq!(a.satiety, 99);
    }

    #[test]
    fn starvation_kills() {
        let mut a = agent(25, 0);
        let mut pantry = Inventory::new();
        assert_eq!(a.update(&mut pantry).unwrap(), AgentStatus::Alive);
        assert_eq!(a.satiety, -1);
        assert_eq!(a.update(&mut pantry).unwrap(), AgentStatus::Died(DeathCause::Starvation));
        assert!(!a.alive);
    }

    #[test]
    fn old_age_kills() {
        let mut a = agent(LIFESPAN_YEARS, 100);
        assert_eq!(a.update(&mut Inventory::new()).unwrap(), AgentStatus::Died(DeathCause::OldAge));
    }

    #[test]
    fn dead_agents_cannot_update() {
        let mut a = agent(25, 100);
        a.die(DeathCause::HomeDestroyed);
        assert!(matches!(a.update(&mut Inventory::new()), Err(DomainError::Agent { .. })));
    }
}

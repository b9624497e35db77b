use crate::DomainError;
use crate::agent::{Agent, AgentId, AgentStatus, DeathCause};
use crate::hex::Hex;
use crate::resource::{Inventory, Resource};
use crate::time::SimTime;
use std::collections::BTreeMap;

pub const HOME_DESTRUCTION_THRESHOLD: u32 = 100;
const STONE_REPAIR: u32 = 5;
const WOOD_REPAIR: u32 = 1;

/// State shared by every building: stored goods, wear and the agents inside.
#[derive(Debug, Clone, Default)]
pub struct Building {
    pub inventory: Inventory,
    pub wear: u32,
    pub destruction_threshold: u32,
    pub occupants: Vec<Agent>,
}

/// A market stall. Trading is not modelled yet, so it never changes.
#[derive(Debug, Clone, Default)]
pub struct Market {
    pub building: Building,
}

/// An agent that died during an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Death {
    pub agent: AgentId,
    pub name: String,
    pub cause: DeathCause,
}

/// What happened to a home during one update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeReport {
    pub deaths: Vec<Death>,
    pub destroyed: bool,
}

#[derive(Debug, Clone)]
pub struct Home {
    pub building: Building,
    pub destroyed: bool,
    agent_assignments: BTreeMap<AgentId, Resource>,
    resource_sites: BTreeMap<Resource, Vec<Hex>>,
}

impl Default for Home {
    fn default() -> Self {
        Self {
            building: Building { destruction_threshold: HOME_DESTRUCTION_THRESHOLD, ..Building::default() },
            destroyed: false,
            agent_assignments: BTreeMap::new(),
            resource_sites: BTreeMap::new(),
        }
    }
}

impl Home {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_occupant(&mut self, agent: Agent) {
        self.building.occupants.push(agent);
    }

    /// Registers a deposit cell the occupants may be sent to.
    pub fn add_resource_site(&mut self, resource: Resource, site: Hex) {
        self.resource_sites.entry(resource).or_default().push(site);
    }

    /// Hourly repair, daily wear, then one step for every occupant.
    ///
    /// Destroyed homes are inert. Reaching the destruction threshold kills everyone inside.
    ///
    /// # Errors
    /// Propagates [`DomainError::Agent`] from occupant updates.
    pub fn update(&mut self, time: SimTime) -> Result<HomeReport, DomainError> {
        let mut report = HomeReport::default();
        if self.destroyed {
            return Ok(report);
        }

        if time.is_top_of_hour() {
            self.repair();
        }

        if time.is_top_of_day() {
            self.building.wear += 1;
            if self.building.wear >= self.building.destruction_threshold {
                for agent in &mut self.building.occupants {
                    agent.die(DeathCause::HomeDestroyed);
                    report.deaths.push(Death {
                        agent: agent.id,
                        name: agent.name.clone(),
                        cause: DeathCause::HomeDestroyed,
                    });
                }
                self.building.occupants.clear();
                self.agent_assignments.clear();
                self.destroyed = true;
                report.destroyed = true;
                return Ok(report);
            }
        }

        let Building { inventory, occupants, .. } = &mut self.building;
        for agent in occupants.iter_mut() {
            if let AgentStatus::Died(cause) = agent.update(inventory)? {
                report.deaths.push(Death { agent: agent.id, name: agent.name.clone(), cause });
            }
        }
        occupants.retain(|agent| agent.alive);
        for death in &report.deaths {
            self.agent_assignments.remove(&death.agent);
        }

        Ok(report)
    }

    fn repair(&mut self) {
        let Building { inventory, wear, .. } = &mut self.building;
        if inventory.get(Resource::Stone) >= 1 {
            if *wear > STONE_REPAIR {
                inventory.take(Resource::Stone, 1);
                *wear -= STONE_REPAIR;
            }
            return;
        }
        if *wear > 0 && inventory.take(Resource::Wood, 1) == 1 {
            *wear -= WOOD_REPAIR;
        }
    }

    /// Sends `agent` after the highest-priority resource that has a known site.
    pub fn assign_resource(&mut self, agent: AgentId) -> Option<Resource> {
        let resource = self
            .resource_sites
            .iter()
            .filter(|(_, sites)| !sites.is_empty())
            .map(|(resource, _)| *resource)
            .min_by_key(|resource| (std::cmp::Reverse(resource.priority()), *resource))?;
        self.agent_assignments.insert(agent, resource);
        Some(resource)
    }

    #[must_use]
    pub fn assignment(&self, agent: AgentId) -> Option<Resource> {
        self.agent_assignments.get(&agent).copied()
    }

    #[must_use]
    pub fn sites(&self, resource: Resource) -> &[Hex] {
        self.resource_sites.get(&resource).map_or(&[][..], Vec::as_slice)
    }

    /// Collects the agent's carried goods into the home and clears its assignment.
    pub fn resign_assignment(&mut self, agent: &mut Agent) -> Option<Resource> {
        agent.inventory.drain_into(&mut self.building.inventory);
        self.agent_assignments.remove(&agent.id)
    }
}

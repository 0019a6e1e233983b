//! Dependency graph over deployable units, resolved with a stable
//! topological sort before any deployment side effect occurs.

use thiserror::Error;

use crate::domain::unit::UnitDescriptor;

/// Structural graph errors, all detected at registration or resolution
/// time, before any deployment is attempted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("unit '{0}' is already registered")]
    DuplicateUnit(String),

    #[error("unit '{unit}' depends on unknown unit '{dependency}'")]
    UnknownDependency { unit: String, dependency: String },

    #[error("cyclic dependency detected involving unit '{0}'")]
    CyclicDependency(String),

    #[error("no such unit '{0}'")]
    UnknownUnit(String),
}

/// Holds unit descriptors and their dependency edges in registration order.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    units: Vec<UnitDescriptor>,
}

impl DependencyGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in deployment plan: a token unit, a staking escrow that
    /// depends on it, and a policy manager on top. The escrow and policy
    /// manager deploy behind upgrade dispatchers and need secret
    /// commitments.
    #[must_use]
    pub fn builtin_plan() -> Self {
        Self {
            units: vec![
                UnitDescriptor::new("token", false, "token_agent", None),
                UnitDescriptor::new("staking-escrow", true, "staking_agent", Some("token")),
                UnitDescriptor::new(
                    "policy-manager",
                    true,
                    "policy_agent",
                    Some("staking-escrow"),
                ),
            ],
        }
    }

    /// Register a unit.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::DuplicateUnit` if a unit with the same name is
    /// already registered.
    pub fn register(&mut self, unit: UnitDescriptor) -> Result<(), GraphError> {
        if self.units.iter().any(|u| u.name == unit.name) {
            return Err(GraphError::DuplicateUnit(unit.name));
        }
        self.units.push(unit);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&UnitDescriptor> {
        self.units.iter().find(|u| u.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> impl Iterator<Item = &UnitDescriptor> {
        self.units.iter()
    }

    /// Produce a deployment order where every unit appears strictly after
    /// its dependency. Units with no ordering constraint between them keep
    /// their registration order.
    ///
    /// Resolution is side-effect free: it performs no arming or deployment.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownDependency` if a unit references a
    /// dependency that was never registered, or `GraphError::CyclicDependency`
    /// if the dependency edges contain a cycle.
    pub fn resolve_order(&self) -> Result<Vec<UnitDescriptor>, GraphError> {
        // Validate edges up front so resolution errors name the offending
        // unit rather than surfacing as a bogus cycle.
        for unit in &self.units {
            if let Some(dep) = &unit.depends_on {
                if self.get(dep).is_none() {
                    return Err(GraphError::UnknownDependency {
                        unit: unit.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        // Kahn's algorithm, scanning in registration order each round so the
        // resulting order is stable. Each unit has at most one dependency
        // today, but nothing here relies on that.
        let mut resolved: Vec<UnitDescriptor> = Vec::with_capacity(self.units.len());
        let mut placed = vec![false; self.units.len()];

        while resolved.len() < self.units.len() {
            let mut progressed = false;
            for (idx, unit) in self.units.iter().enumerate() {
                if placed[idx] {
                    continue;
                }
                let ready = match &unit.depends_on {
                    None => true,
                    Some(dep) => resolved.iter().any(|u| &u.name == dep),
                };
                if ready {
                    placed[idx] = true;
                    resolved.push(unit.clone());
                    progressed = true;
                }
            }
            if !progressed {
                // Every remaining unit is waiting on another remaining unit.
                let stuck = self
                    .units
                    .iter()
                    .zip(&placed)
                    .find(|(_, placed)| !**placed)
                    .map(|(u, _)| u.name.clone())
                    .unwrap_or_default();
                return Err(GraphError::CyclicDependency(stuck));
            }
        }

        Ok(resolved)
    }
}

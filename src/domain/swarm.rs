//! Swarm primitives: deterministic port allocation, seeded stake
//! assignment, and node specifications.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while building a swarm.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SwarmError {
    #[error("invalid {axis} range: min {min} exceeds max {max}")]
    InvalidRange {
        axis: &'static str,
        min: u64,
        max: u64,
    },

    #[error("port range starting at {start} cannot fit {count} nodes")]
    PortRangeOverflow { start: u16, count: usize },

    #[error("{needed} node addresses required but only {available} available")]
    InsufficientAddresses { needed: usize, available: usize },
}

// ── Port allocation ──────────────────────────────────────────────────────────

/// Deterministic sequential port assignment for swarm nodes.
pub struct PortAllocator;

impl PortAllocator {
    /// Allocate `count` distinct ports, strictly increasing by 1 from
    /// `start`. Pure function; no hidden state.
    ///
    /// # Errors
    ///
    /// Returns `SwarmError::PortRangeOverflow` if the range would exceed the
    /// maximum port number.
    pub fn allocate(count: usize, start: u16) -> Result<Vec<u16>, SwarmError> {
        let available = usize::from(u16::MAX - start) + 1;
        if count > available {
            return Err(SwarmError::PortRangeOverflow { start, count });
        }
        Ok((0..count).map(|i| start + i as u16).collect())
    }
}

// ── Stake assignment ─────────────────────────────────────────────────────────

/// Inclusive bounds for randomized per-node stake assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeBounds {
    pub min_value: u64,
    pub max_value: u64,
    pub min_periods: u32,
    pub max_periods: u32,
}

impl Default for StakeBounds {
    fn default() -> Self {
        Self {
            min_value: 15_000,
            max_value: 40_000,
            min_periods: 30,
            max_periods: 365,
        }
    }
}

/// A (value, duration) resource commitment for one simulated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeAssignment {
    pub value: u64,
    pub periods: u32,
}

/// Random-within-bounds stake assignment from an injected random source,
/// so sequences are reproducible under a fixed seed.
pub struct StakeAssigner;

impl StakeAssigner {
    /// Draw a stake value and lock duration, each independently uniform
    /// and inclusive of both bounds.
    ///
    /// # Errors
    ///
    /// Returns `SwarmError::InvalidRange` if `min > max` on either axis.
    pub fn assign(
        bounds: &StakeBounds,
        rng: &mut impl Rng,
    ) -> Result<StakeAssignment, SwarmError> {
        if bounds.min_value > bounds.max_value {
            return Err(SwarmError::InvalidRange {
                axis: "stake value",
                min: bounds.min_value,
                max: bounds.max_value,
            });
        }
        if bounds.min_periods > bounds.max_periods {
            return Err(SwarmError::InvalidRange {
                axis: "stake periods",
                min: u64::from(bounds.min_periods),
                max: u64::from(bounds.max_periods),
            });
        }
        Ok(StakeAssignment {
            value: rng.gen_range(bounds.min_value..=bounds.max_value),
            periods: rng.gen_range(bounds.min_periods..=bounds.max_periods),
        })
    }
}

// ── Node specifications ──────────────────────────────────────────────────────

/// Launch parameters for one swarm node. Created before spawn, immutable
/// after spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    /// Zero-based node index within the swarm.
    pub index: usize,
    /// Ledger address assigned to the node; unset in federated mode.
    pub address: Option<String>,
    /// REST port, unique per node, from [`PortAllocator`].
    pub rest_port: u16,
    /// Node database name, e.g. `"sim-8787"`.
    pub db_name: String,
    /// Stake assignment; unset in federated mode.
    pub stake: Option<StakeAssignment>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn allocate_five_from_8787() {
        let ports = PortAllocator::allocate(5, 8787).expect("allocates");
        assert_eq!(ports, vec![8787, 8788, 8789, 8790, 8791]);
    }

    #[test]
    fn allocate_zero_is_empty() {
        assert!(PortAllocator::allocate(0, 8787).expect("allocates").is_empty());
    }

    #[test]
    fn allocate_rejects_range_past_port_max() {
        let err = PortAllocator::allocate(10, u16::MAX - 3).expect_err("overflow");
        assert_eq!(
            err,
            SwarmError::PortRangeOverflow {
                start: u16::MAX - 3,
                count: 10
            }
        );
    }

    #[test]
    fn assign_is_deterministic_under_a_fixed_seed() {
        let bounds = StakeBounds {
            min_value: 100,
            max_value: 1000,
            min_periods: 1,
            max_periods: 30,
        };
        let draw = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..8)
                .map(|_| StakeAssigner::assign(&bounds, &mut rng).expect("valid bounds"))
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(42), draw(42));
    }

    #[test]
    fn assign_rejects_inverted_value_range() {
        let bounds = StakeBounds {
            min_value: 10,
            max_value: 5,
            min_periods: 1,
            max_periods: 2,
        };
        let mut rng = StdRng::seed_from_u64(0);
        let err = StakeAssigner::assign(&bounds, &mut rng).expect_err("inverted");
        assert!(matches!(err, SwarmError::InvalidRange { axis: "stake value", .. }));
    }

    #[test]
    fn assign_rejects_inverted_period_range() {
        let bounds = StakeBounds {
            min_value: 1,
            max_value: 2,
            min_periods: 30,
            max_periods: 1,
        };
        let mut rng = StdRng::seed_from_u64(0);
        let err = StakeAssigner::assign(&bounds, &mut rng).expect_err("inverted");
        assert!(matches!(err, SwarmError::InvalidRange { axis: "stake periods", .. }));
    }

    proptest! {
        #[test]
        fn allocated_ports_are_distinct_and_increasing(
            count in 0usize..64,
            start in 1024u16..u16::MAX - 64,
        ) {
            let ports = PortAllocator::allocate(count, start).expect("fits");
            prop_assert_eq!(ports.len(), count);
            for (i, port) in ports.iter().enumerate() {
                prop_assert_eq!(*port, start + i as u16);
            }
        }

        #[test]
        fn assignments_stay_within_bounds(
            seed in any::<u64>(),
            min_value in 0u64..10_000,
            span_value in 0u64..10_000,
            min_periods in 0u32..500,
            span_periods in 0u32..500,
        ) {
            let bounds = StakeBounds {
                min_value,
                max_value: min_value + span_value,
                min_periods,
                max_periods: min_periods + span_periods,
            };
            let mut rng = StdRng::seed_from_u64(seed);
            let stake = StakeAssigner::assign(&bounds, &mut rng).expect("valid bounds");
            prop_assert!(stake.value >= bounds.min_value && stake.value <= bounds.max_value);
            prop_assert!(
                stake.periods >= bounds.min_periods && stake.periods <= bounds.max_periods
            );
        }
    }
}

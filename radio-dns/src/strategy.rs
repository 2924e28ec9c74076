//! Server selection strategies
//!
//! Once discovery has produced a ranked [`ServerList`], each outgoing
//! request picks one entry according to a [`SelectionStrategy`]:
//!
//! - **Random** (default): uniform choice over every discovered server,
//!   regardless of priority or weight.
//! - **RoundRobin**: walk the ranked list in order, wrapping around.
//! - **Weighted**: RFC 2782 selection. Only the lowest-priority tier is
//!   eligible, and within it each server is chosen in proportion to its
//!   weight.

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::error::{Error, Result};
use crate::rank::{ServerEntry, ServerList};

/// Strategy for picking a server from the discovered list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionStrategy {
    /// Uniformly random over all servers (default)
    #[default]
    Random,

    /// Cycle through servers in ranked order
    RoundRobin,

    /// Weighted random within the lowest-priority tier (RFC 2782)
    Weighted,
}

impl SelectionStrategy {
    /// Get a human-readable description of this strategy
    pub fn description(&self) -> &'static str {
        match self {
            SelectionStrategy::Random => "random (uniform over all servers)",
            SelectionStrategy::RoundRobin => "round-robin",
            SelectionStrategy::Weighted => "weighted (RFC 2782)",
        }
    }

    /// Pick one server from `servers`
    ///
    /// `cursor` is only used by round-robin selection and should be shared
    /// across calls. Returns `None` only when `servers` is empty.
    pub fn select<'a, R>(
        &self,
        servers: &'a ServerList,
        cursor: &AtomicUsize,
        rng: &mut R,
    ) -> Option<&'a ServerEntry>
    where
        R: Rng + ?Sized,
    {
        let entries = servers.entries();
        if entries.is_empty() {
            return None;
        }

        match self {
            SelectionStrategy::Random => entries.choose(rng),
            SelectionStrategy::RoundRobin => {
                let idx = cursor.fetch_add(1, Ordering::Relaxed) % entries.len();
                entries.get(idx)
            }
            SelectionStrategy::Weighted => select_weighted(entries, rng),
        }
    }
}

/// RFC 2782 weighted choice within the most preferred priority tier
fn select_weighted<'a, R>(entries: &'a [ServerEntry], rng: &mut R) -> Option<&'a ServerEntry>
where
    R: Rng + ?Sized,
{
    let best = entries.iter().map(|e| e.priority).min()?;
    let tier: Vec<&ServerEntry> = entries.iter().filter(|e| e.priority == best).collect();

    let total: u32 = tier.iter().map(|e| u32::from(e.weight)).sum();
    if total == 0 {
        // All weights zero: every server in the tier is equally eligible
        return tier.choose(rng).copied();
    }

    let mut pick = rng.random_range(0..total);
    for entry in &tier {
        let weight = u32::from(entry.weight);
        if pick < weight {
            return Some(*entry);
        }
        pick -= weight;
    }

    tier.last().copied()
}

impl std::fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionStrategy::Random => write!(f, "random"),
            SelectionStrategy::RoundRobin => write!(f, "round-robin"),
            SelectionStrategy::Weighted => write!(f, "weighted"),
        }
    }
}

impl FromStr for SelectionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "random" => Ok(SelectionStrategy::Random),
            "round-robin" | "roundrobin" | "round_robin" => Ok(SelectionStrategy::RoundRobin),
            "weighted" => Ok(SelectionStrategy::Weighted),
            _ => Err(Error::Config(format!(
                "unknown selection strategy '{}', expected 'random', 'round-robin', or 'weighted'",
                s
            ))),
        }
    }
}

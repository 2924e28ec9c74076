//! Server ranking
//!
//! Orders SRV records by priority, then by weight, and flattens them into
//! the list of base URLs that clients pick from.

use crate::srv::SrvRecord;

/// Sort records by ascending priority, then ascending weight
///
/// The sort is stable: records with equal priority and weight keep the
/// order the resolver returned them in.
pub fn rank(mut records: Vec<SrvRecord>) -> Vec<SrvRecord> {
    records.sort_by_key(|r| (r.priority(), r.weight()));
    records
}

/// A discovered server, ready to receive requests
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerEntry {
    /// Base URL (`https://<target>`)
    pub url: String,
    /// SRV port
    pub port: u16,
    /// SRV priority
    pub priority: u16,
    /// SRV weight
    pub weight: u16,
}

impl From<&SrvRecord> for ServerEntry {
    fn from(record: &SrvRecord) -> Self {
        Self {
            url: record.base_url(),
            port: record.port(),
            priority: record.priority(),
            weight: record.weight(),
        }
    }
}

/// Ranked list of servers produced by one discovery cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerList {
    entries: Vec<ServerEntry>,
}

impl ServerList {
    /// Rank `records` and turn them into server entries
    pub fn from_records(records: Vec<SrvRecord>) -> Self {
        let entries = rank(records).iter().map(ServerEntry::from).collect();
        Self { entries }
    }

    /// Entries in ranked order
    pub fn entries(&self) -> &[ServerEntry] {
        &self.entries
    }

    /// Base URLs in ranked order
    pub fn urls(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.url.as_str()).collect()
    }

    /// Check whether `url` is one of the discovered servers
    pub fn contains(&self, url: &str) -> bool {
        self.entries.iter().any(|e| e.url == url)
    }

    /// Number of servers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if discovery found no servers
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in ranked order
    pub fn iter(&self) -> std::slice::Iter<'_, ServerEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ServerList {
    type Item = &'a ServerEntry;
    type IntoIter = std::slice::Iter<'a, ServerEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

//! # Management Protocol Domain
//!
//! Object identifiers, values and errors of the request/response management
//! protocol, plus the two retrieval operations everything above is built on:
//! the single-value fetch ([`ManagementClient::get`]) and the ordered
//! table-walk primitive ([`walk_table`]).
//!
//! Only the UDP transport itself (encoding, timeouts, resends) is delegated
//! to an external client; see [`transport`].

pub mod transport;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// Hierarchical object identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid(Vec<u32>);

impl Oid {
    pub fn new(arcs: Vec<u32>) -> Self {
        Self(arcs)
    }

    pub fn arcs(&self) -> &[u32] {
        &self.0
    }

    /// The identifier extended by one arc; addresses a table cell by row
    /// index.
    pub fn child(&self, arc: u32) -> Self {
        let mut arcs = self.0.clone();
        arcs.push(arc);
        Self(arcs)
    }

    /// Whether `self` lies under `prefix` in the identifier tree.
    pub fn starts_with(&self, prefix: &Oid) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    /// The final arc. For the tables used here the trailing arc is the row
    /// index.
    pub fn last_arc(&self) -> Option<u32> {
        self.0.last().copied()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid object identifier '{0}'")]
pub struct OidParseError(String);

impl FromStr for Oid {
    type Err = OidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let arcs: Result<Vec<u32>, _> = s
            .trim_start_matches('.')
            .split('.')
            .map(|arc| arc.parse::<u32>())
            .collect();

        match arcs {
            Ok(arcs) if !arcs.is_empty() => Ok(Self(arcs)),
            _ => Err(OidParseError(s.to_string())),
        }
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut arcs = self.0.iter();
        if let Some(first) = arcs.next() {
            write!(f, "{first}")?;
        }
        for arc in arcs {
            write!(f, ".{arc}")?;
        }
        Ok(())
    }
}

/// Value carried by one object binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnmpValue {
    Integer(i64),
    Counter(u64),
    Text(String),
    ObjectId(Oid),
    /// Anything the pipeline has no use for (opaque blobs, addresses).
    Other,
}

impl SnmpValue {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            SnmpValue::Integer(v) if *v >= 0 => Some(*v as u64),
            SnmpValue::Counter(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SnmpValue::Integer(v) => Some(*v),
            SnmpValue::Counter(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SnmpValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_oid(&self) -> Option<&Oid> {
        match self {
            SnmpValue::ObjectId(oid) => Some(oid),
            _ => None,
        }
    }
}

/// Failures of the management protocol, split the way the pipeline treats
/// them: a transport failure voids a device's telemetry as a whole, an agent
/// error aborts only the offending fetch or walk.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnmpError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("agent error: {0}")]
    Agent(String),
}

/// Request/response seam to one management agent.
#[async_trait]
pub trait ManagementClient: Send + Sync {
    /// Fetches exactly one identifier; returns one value or an explicit
    /// error.
    async fn get(&self, oid: &Oid) -> Result<SnmpValue, SnmpError>;

    /// Fetches the lexicographically-next binding after `oid`.
    async fn get_next(&self, oid: &Oid) -> Result<(Oid, SnmpValue), SnmpError>;
}

/// Ordered walk over every entry below `base`.
///
/// Repeatedly requests the next binding, collecting `(row index, value)`
/// pairs until the returned identifier leaves the `base` prefix, stops
/// advancing, or an error arrives. An error ends the walk with whatever was
/// already collected; a partial table is data, not a failure.
pub async fn walk_table(client: &dyn ManagementClient, base: &Oid) -> Vec<(u32, SnmpValue)> {
    let mut rows: Vec<(u32, SnmpValue)> = Vec::new();
    let mut current: Oid = base.clone();

    loop {
        let (next, value) = match client.get_next(&current).await {
            Ok(binding) => binding,
            Err(e) => {
                debug!("walk of {base} ended early: {e}");
                break;
            }
        };

        if !next.starts_with(base) {
            break;
        }

        // An agent that stops advancing would keep us here forever.
        if next <= current {
            debug!("walk of {base} aborted, agent returned a non-advancing identifier");
            break;
        }

        let Some(index) = next.last_arc() else { break };
        rows.push((index, value));
        current = next;
    }

    rows
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

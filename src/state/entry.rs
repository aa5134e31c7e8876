/// Frontier entry definitions for tracking visitation progress
///
/// This module defines the per-URL record kept in the frontier and the
/// resolution state machine it moves through.
use std::fmt;

/// Default maximum number of hops recorded for a single URL
pub const MAX_HOPS: u32 = 5;

/// Resolution state of a frontier entry
///
/// Entries only ever move from `Pending` to `Resolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Awaiting a visit, or still following a redirect chain
    Pending,

    /// Terminal; no further visits will be attempted
    Resolved {
        /// The status observed when the entry was resolved
        final_status: u16,
    },
}

impl Resolution {
    /// Returns true if the entry is still awaiting a visit
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns true if this is the terminal state
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    /// Converts the resolution to the string stored in the index column
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved { .. } => "resolved",
        }
    }

    /// Rebuilds a resolution from its index column and the stored final status
    ///
    /// A resolved row with no status recorded is read back as status 0.
    pub fn from_db_parts(state: &str, final_status: Option<u16>) -> Option<Self> {
        match state {
            "pending" => Some(Self::Pending),
            "resolved" => Some(Self::Resolved {
                final_status: final_status.unwrap_or(0),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Resolved { final_status } => write!(f, "resolved ({})", final_status),
        }
    }
}

/// One observed response in a URL's redirect chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopRecord {
    /// Position in the chain, starting at 0
    pub hop_index: u32,

    /// HTTP status code of the response
    pub status: u16,

    /// Location header of the response, if any
    pub redirect_target: Option<String>,
}

impl HopRecord {
    pub fn new(hop_index: u32, status: u16, redirect_target: Option<String>) -> Self {
        Self {
            hop_index,
            status,
            redirect_target,
        }
    }
}

/// One discovered URL and its visitation state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// The URL as discovered; primary key of the frontier
    pub url: String,

    /// Where the entry is in its lifecycle
    pub resolution: Resolution,

    /// Recorded hops in increasing `hop_index` order
    pub hops: Vec<HopRecord>,

    /// Last observed HTTP status, if the URL has been visited at all
    pub final_status: Option<u16>,
}

impl FrontierEntry {
    /// Creates a freshly discovered entry: pending, no hops
    pub fn pending(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            resolution: Resolution::Pending,
            hops: Vec::new(),
            final_status: None,
        }
    }

    /// The hop index the next report for this entry must carry
    pub fn next_hop_index(&self) -> u32 {
        self.hops.len() as u32
    }

    /// Classifies a resolved entry for reporting
    ///
    /// Returns `None` while the entry is still pending.
    pub fn outcome(&self, max_hops: u32) -> Option<Outcome> {
        let Resolution::Resolved { final_status } = self.resolution else {
            return None;
        };

        Some(Outcome::classify(
            final_status,
            self.hops.len() as u32,
            max_hops,
        ))
    }
}

/// How a resolved entry ended up resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Reached a 200 response
    Ok,

    /// Confirmed missing (404)
    NotFound,

    /// Redirect chain ran out of hops before a terminal status
    HopBudgetExhausted,

    /// Resolved by some other path (e.g. marked visited with a non-200 status)
    Other,
}

impl Outcome {
    /// Classifies a resolved entry from its terminal status and hop count
    pub fn classify(final_status: u16, hop_count: u32, max_hops: u32) -> Self {
        match final_status {
            200 => Self::Ok,
            404 => Self::NotFound,
            _ if hop_count >= max_hops => Self::HopBudgetExhausted,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotFound => "not_found",
            Self::HopBudgetExhausted => "hop_budget_exhausted",
            Self::Other => "other",
        }
    }
}

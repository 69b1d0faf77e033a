//! Session activity feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::TokenAmount;

/// Entries kept per session; older ones fall off the end
pub const ACTIVITY_LOG_CAPACITY: usize = 50;

/// Kind of event an activity entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityCategory {
    /// A workflow step was completed
    #[serde(rename = "brand_creation")]
    BrandCreation,
    /// Tokens were credited through the exchange
    #[serde(rename = "token_purchase")]
    TokenPurchase,
}

/// One event in a session's activity feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    /// Stable entry identifier
    pub id: Uuid,
    /// When the event happened
    pub timestamp: DateTime<Utc>,
    /// Human-readable description, e.g. "Completed Logo Design"
    pub description: String,
    /// Tokens moved by the event
    pub cost: TokenAmount,
    /// Event kind
    pub category: ActivityCategory,
}

impl ActivityEntry {
    /// Entry for a completed workflow step
    pub fn brand_creation(description: impl Into<String>, cost: TokenAmount) -> Self {
        Self::new(description, cost, ActivityCategory::BrandCreation)
    }

    /// Entry for a token purchase
    pub fn token_purchase(description: impl Into<String>, cost: TokenAmount) -> Self {
        Self::new(description, cost, ActivityCategory::TokenPurchase)
    }

    fn new(description: impl Into<String>, cost: TokenAmount, category: ActivityCategory) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            description: description.into(),
            cost,
            category,
        }
    }
}

/// Bounded newest-first activity feed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityLog {
    entries: Vec<ActivityEntry>,
}

impl ActivityLog {
    /// Empty feed
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `entry`, dropping the oldest entry past capacity
    pub fn record(&mut self, entry: ActivityEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(ACTIVITY_LOG_CAPACITY);
    }

    /// Entries, newest first
    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the feed is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

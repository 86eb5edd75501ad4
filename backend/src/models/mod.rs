//! Domain models for the campaign report pipeline.
//!
//! - [`Influencer`] - Roster entry, the join key for every other dataset
//! - [`Post`] - A social post with reach and interactions
//! - [`TrackingRecord`] - Revenue and orders attributed to an influencer
//! - [`PayoutRecord`] - What an influencer was paid and on which basis
//! - [`PayoutBasis`] - Payout calculation method

use serde::{Deserialize, Serialize};

// =============================================================================
// Influencer
// =============================================================================

/// An influencer from the roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Influencer {
    /// Unique identifier shared by all datasets.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Main platform (Instagram, YouTube, ...).
    pub platform: String,
    /// Content category (Beauty, Tech, ...).
    pub category: String,
    /// Declared gender.
    pub gender: String,
}

// =============================================================================
// Post
// =============================================================================

/// A single post published by an influencer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub influencer_id: String,
    /// Platform the post was published on (may differ from the roster's).
    pub platform: String,
    pub reach: u64,
    pub likes: u64,
    pub comments: u64,
}

impl Post {
    /// Interactions per reached account.
    ///
    /// Returns `None` when the post reached nobody.
    pub fn engagement(&self) -> Option<f64> {
        if self.reach == 0 {
            return None;
        }
        Some((self.likes as f64 + self.comments as f64) / self.reach as f64)
    }
}

// =============================================================================
// Tracking
// =============================================================================

/// Revenue and orders attributed to an influencer (referral links, codes).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRecord {
    pub influencer_id: String,
    pub revenue: f64,
    pub orders: u64,
}

// =============================================================================
// Payout Basis
// =============================================================================

/// How a payout was calculated.
///
/// Serialized as its [`label`](PayoutBasis::label), so unknown labels stay
/// plain strings in JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(into = "String", from = "String")]
pub enum PayoutBasis {
    /// Fixed amount per published post.
    PerPost,
    /// Commission per attributed order.
    PerOrder,
    /// One-off fee for the campaign.
    FlatFee,
    /// Any other label found in the payouts file.
    Other(String),
}

impl PayoutBasis {
    /// Parse a basis label. Unknown labels are kept verbatim.
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "post" | "per_post" => Self::PerPost,
            "order" | "per_order" | "commission" => Self::PerOrder,
            "flat" | "flat_fee" | "fixed" => Self::FlatFee,
            _ => Self::Other(label.trim().to_string()),
        }
    }

    /// Label used in tables and exports.
    pub fn label(&self) -> &str {
        match self {
            Self::PerPost => "per_post",
            Self::PerOrder => "per_order",
            Self::FlatFee => "flat_fee",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for PayoutBasis {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<PayoutBasis> for String {
    fn from(basis: PayoutBasis) -> Self {
        basis.label().to_string()
    }
}

impl std::fmt::Display for PayoutBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Payout
// =============================================================================

/// Amount paid to an influencer for the campaign.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRecord {
    pub influencer_id: String,
    pub basis: PayoutBasis,
    /// Rate applied per unit of `basis`.
    pub rate: f64,
    pub orders: u64,
    pub total_payout: f64,
}

// =============================================================================
// Tests
// =============================================================================

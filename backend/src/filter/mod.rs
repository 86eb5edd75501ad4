//! Influencer selection by platform, category and gender.
//!
//! A selection keeps an influencer when its platform, category and gender
//! are each listed in the corresponding dimension. An empty list selects
//! nobody for that dimension.

use serde::{Deserialize, Serialize};

use crate::models::Influencer;

/// Distinct values available in each dimension, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub platforms: Vec<String>,
    pub categories: Vec<String>,
    pub genders: Vec<String>,
}

impl FilterOptions {
    pub fn from_influencers(influencers: &[Influencer]) -> Self {
        let mut options = Self::default();
        for influencer in influencers {
            push_unique(&mut options.platforms, &influencer.platform);
            push_unique(&mut options.categories, &influencer.category);
            push_unique(&mut options.genders, &influencer.gender);
        }
        options
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

/// Values selected in each dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    pub platforms: Vec<String>,
    pub categories: Vec<String>,
    pub genders: Vec<String>,
}

impl FilterSelection {
    /// Select every available value.
    pub fn all(options: &FilterOptions) -> Self {
        Self {
            platforms: options.platforms.clone(),
            categories: options.categories.clone(),
            genders: options.genders.clone(),
        }
    }

    pub fn with_platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms = platforms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_genders<I, S>(mut self, genders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genders = genders.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `influencer` passes all three dimensions.
    pub fn matches(&self, influencer: &Influencer) -> bool {
        self.platforms.contains(&influencer.platform)
            && self.categories.contains(&influencer.category)
            && self.genders.contains(&influencer.gender)
    }
}

/// Caller-side request: `None` means "every value" for that dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    pub platforms: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub genders: Option<Vec<String>>,
}

impl FilterRequest {
    /// Resolve against the loaded roster.
    pub fn resolve(&self, options: &FilterOptions) -> FilterSelection {
        FilterSelection {
            platforms: self.platforms.clone().unwrap_or_else(|| options.platforms.clone()),
            categories: self
                .categories
                .clone()
                .unwrap_or_else(|| options.categories.clone()),
            genders: self.genders.clone().unwrap_or_else(|| options.genders.clone()),
        }
    }
}

/// Influencers kept by `selection`, in roster order.
pub fn filter_influencers(influencers: &[Influencer], selection: &FilterSelection) -> Vec<Influencer> {
    influencers
        .iter()
        .filter(|i| selection.matches(i))
        .cloned()
        .collect()
}

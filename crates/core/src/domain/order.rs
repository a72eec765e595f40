use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerTier {
    Gold,
    Silver,
    #[default]
    Bronze,
}

impl CustomerTier {
    /// Case-insensitive match on the tier name; anything unrecognized is Bronze.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "gold" => Self::Gold,
            "silver" => Self::Silver,
            _ => Self::Bronze,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gold => "Gold",
            Self::Silver => "Silver",
            Self::Bronze => "Bronze",
        }
    }
}

impl fmt::Display for CustomerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_ITEM_CATEGORY: &str = "misc";
pub const DEFAULT_REGION: &str = "US";

/// Canonical order record. Built by [`crate::normalize`]; fields are read-only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrderInput {
    customer_tier: CustomerTier,
    order_total: Decimal,
    new_customer: bool,
    item_category: String,
    stock_level: u64,
    region: String,
}

impl Default for OrderInput {
    fn default() -> Self {
        Self {
            customer_tier: CustomerTier::Bronze,
            order_total: Decimal::ZERO,
            new_customer: false,
            item_category: DEFAULT_ITEM_CATEGORY.to_string(),
            stock_level: 0,
            region: DEFAULT_REGION.to_string(),
        }
    }
}

impl OrderInput {
    pub(crate) fn from_parts(
        customer_tier: CustomerTier,
        order_total: Decimal,
        new_customer: bool,
        item_category: &str,
        stock_level: u64,
        region: &str,
    ) -> Self {
        Self {
            customer_tier,
            order_total: order_total.max(Decimal::ZERO),
            new_customer,
            item_category: item_category.to_lowercase(),
            stock_level,
            region: region.to_uppercase(),
        }
    }

    pub fn customer_tier(&self) -> CustomerTier {
        self.customer_tier
    }

    pub fn order_total(&self) -> Decimal {
        self.order_total
    }

    pub fn new_customer(&self) -> bool {
        self.new_customer
    }

    pub fn item_category(&self) -> &str {
        &self.item_category
    }

    pub fn stock_level(&self) -> u64 {
        self.stock_level
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

use std::collections::HashMap;

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const CURRENCY: &str = "₱";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "8.50"
    #[schema(value_type = String, example = "8.50")]
    pub price: BigDecimal,
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

/// Read-only menu reference data for one session, indexed by item id.
#[derive(Debug, Clone, Default)]
pub struct Menu {
    items: Vec<MenuItem>,
    index: HashMap<i64, usize>,
}

impl Menu {
    pub fn new(items: Vec<MenuItem>) -> Self {
        let index = items
            .iter()
            .enumerate()
            .map(|(pos, item)| (item.id, pos))
            .collect();
        Self { items, index }
    }

    pub fn get(&self, id: i64) -> Option<&MenuItem> {
        self.index.get(&id).map(|&pos| &self.items[pos])
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a MenuItem> {
        self.items.iter().filter(move |item| item.category == category)
    }

    /// Category names in the order they first appear on the menu.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for item in &self.items {
            if !seen.contains(&item.category.as_str()) {
                seen.push(&item.category);
            }
        }
        seen
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Render an amount as pesos with two decimals and thousands separators,
/// e.g. `₱1,234.50`.
pub fn format_price(amount: &BigDecimal) -> String {
    let negative = *amount < BigDecimal::from(0);
    let text = amount
        .abs()
        .with_scale_round(2, RoundingMode::HalfUp)
        .to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (pos, digit) in whole.chars().enumerate() {
        if pos > 0 && (whole.len() - pos) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{CURRENCY}{grouped}.{fraction}")
}

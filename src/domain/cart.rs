use std::collections::BTreeMap;

use bigdecimal::BigDecimal;

use super::menu::Menu;

/// One cart entry. A line only exists while its quantity is at least one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    quantity: u32,
    notes: String,
}

impl CartLine {
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartTotals {
    pub total_items: u32,
    pub total_price: BigDecimal,
}

/// Pre-submission mapping of menu item id to quantity and notes.
///
/// Every mutation that would leave a line at zero removes the line instead,
/// so `lines()` never yields a zero quantity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: BTreeMap<i64, CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of `item_id`, creating the line with empty notes if
    /// needed. The item is not checked against the menu here.
    pub fn add_item(&mut self, item_id: i64) {
        let line = self.lines.entry(item_id).or_insert(CartLine {
            quantity: 0,
            notes: String::new(),
        });
        line.quantity = line.quantity.saturating_add(1);
    }

    pub fn remove_item(&mut self, item_id: i64) {
        let Some(line) = self.lines.get_mut(&item_id) else {
            return;
        };
        line.quantity -= 1;
        if line.quantity == 0 {
            self.lines.remove(&item_id);
        }
    }

    pub fn set_quantity(&mut self, item_id: i64, quantity: i64) {
        if quantity <= 0 {
            self.lines.remove(&item_id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        self.lines
            .entry(item_id)
            .and_modify(|line| line.quantity = quantity)
            .or_insert(CartLine {
                quantity,
                notes: String::new(),
            });
    }

    /// Notes can only be attached to an existing line.
    pub fn set_notes(&mut self, item_id: i64, notes: impl Into<String>) {
        if let Some(line) = self.lines.get_mut(&item_id) {
            line.notes = notes.into();
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn line(&self, item_id: i64) -> Option<&CartLine> {
        self.lines.get(&item_id)
    }

    pub fn quantity_of(&self, item_id: i64) -> u32 {
        self.lines.get(&item_id).map_or(0, |line| line.quantity)
    }

    /// Lines in ascending item id order.
    pub fn lines(&self) -> impl Iterator<Item = (i64, &CartLine)> {
        self.lines.iter().map(|(&id, line)| (id, line))
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Sum of quantities and of quantity × current menu price. Lines whose
    /// item is missing from `menu` count towards items but add no price.
    pub fn totals(&self, menu: &Menu) -> CartTotals {
        let mut total_items = 0u32;
        let mut total_price = BigDecimal::from(0);
        for (&id, line) in &self.lines {
            total_items = total_items.saturating_add(line.quantity);
            if let Some(item) = menu.get(id) {
                total_price += &item.price * BigDecimal::from(line.quantity);
            }
        }
        CartTotals {
            total_items,
            total_price,
        }
    }
}

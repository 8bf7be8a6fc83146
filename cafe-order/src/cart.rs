use std::sync::Arc;
use tracing::debug;
use cafe_catalog::MenuCatalog;
use cafe_core::{lines_total, OrderLine, Paise};

use crate::errors::CartError;

/// The customer's in-progress selection.
///
/// Lines keep insertion order and are unique per (item id, display name).
/// The total is always derived from the lines.
#[derive(Debug, Clone)]
pub struct CartStore {
    catalog: Arc<MenuCatalog>,
    lines: Vec<OrderLine>,
}

impl CartStore {
    pub fn new(catalog: Arc<MenuCatalog>) -> Self {
        Self {
            catalog,
            lines: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &MenuCatalog {
        &self.catalog
    }

    /// Add one unit of a menu item (or one of its variants).
    ///
    /// An unknown item leaves the cart untouched.
    pub fn add_item(
        &mut self,
        item_id: &str,
        variant_name: Option<&str>,
        variant_price: Option<Paise>,
    ) -> Result<&OrderLine, CartError> {
        let selection = self.catalog.resolve(item_id, variant_name, variant_price)?;

        let existing = self
            .lines
            .iter()
            .position(|line| line.matches(&selection.item_id, &selection.display_name));

        let position = match existing {
            Some(position) => {
                self.lines[position].quantity += 1;
                position
            }
            None => {
                self.lines.push(OrderLine::new(
                    selection.item_id,
                    selection.display_name,
                    selection.unit_price,
                ));
                self.lines.len() - 1
            }
        };

        let line = &self.lines[position];
        debug!("Cart: {} x{}", line.display_name, line.quantity);
        Ok(line)
    }

    /// Take one unit off a line; the line goes away with its last unit.
    /// Returns the remaining quantity (0 when the line was removed).
    pub fn remove_one(&mut self, line_index: usize) -> Result<u32, CartError> {
        let len = self.lines.len();
        let line = self
            .lines
            .get_mut(line_index)
            .ok_or(CartError::LineOutOfRange { index: line_index, len })?;

        if line.quantity > 1 {
            line.quantity -= 1;
            return Ok(line.quantity);
        }

        let removed = self.lines.remove(line_index);
        debug!("Cart: removed {}", removed.display_name);
        Ok(0)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn total(&self) -> Paise {
        lines_total(&self.lines)
    }

    /// Nothing worth paying for
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() || self.total() == 0
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}

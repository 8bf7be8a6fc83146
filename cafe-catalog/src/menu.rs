use std::collections::HashMap;
use std::path::Path;
use tracing::info;
use cafe_core::Paise;

use crate::product::{CatalogError, MenuCategory, MenuItem};

/// A catalog selection resolved to what goes on a cart line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSelection {
    pub item_id: String,
    pub display_name: String,
    pub unit_price: Paise,
}

/// Immutable menu, loaded once at startup
#[derive(Debug, Clone)]
pub struct MenuCatalog {
    items: Vec<MenuItem>,
    index: HashMap<String, usize>,
}

impl MenuCatalog {
    pub fn new(items: Vec<MenuItem>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(items.len());

        for (position, item) in items.iter().enumerate() {
            item.check()?;
            if index.insert(item.id.clone(), position).is_some() {
                return Err(CatalogError::Invalid(format!("duplicate menu item id '{}'", item.id)));
            }
        }

        Ok(Self { items, index })
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let items: Vec<MenuItem> = serde_json::from_str(json)?;
        Self::new(items)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&raw)?;
        info!("Loaded {} menu items from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// The café's standard menu
    pub fn cafe_default() -> Self {
        let items = vec![
            MenuItem::new("coffee", "Coffee", MenuCategory::Coffee, 15000)
                .with_variant("Cappuccino", 18000)
                .with_variant("Latte", 20000)
                .with_variant("Cold Coffee", 17000),
            MenuItem::new("tea", "Tea", MenuCategory::Tea, 1000)
                .with_variant("Masala Chai", 2000)
                .with_variant("Ginger", 1500),
            MenuItem::new("sandwich", "Veg Sandwich", MenuCategory::Snack, 9000)
                .with_variant("Cheese", 11000)
                .with_variant("Grilled", 12000),
            MenuItem::new("samosa", "Samosa", MenuCategory::Snack, 2000)
                .with_description("Two pieces with chutney"),
            MenuItem::new("fries", "French Fries", MenuCategory::Snack, 8000)
                .with_variant("Peri Peri", 9500),
            MenuItem::new("brownie", "Chocolate Brownie", MenuCategory::Dessert, 8000)
                .with_variant("With Ice Cream", 11000),
            MenuItem::new("lime-soda", "Lime Soda", MenuCategory::Beverage, 5000)
                .with_variant("Sweet", 5000)
                .with_variant("Salted", 5000),
        ];

        // Built-in data: ids are unique and prices non-negative.
        let index = items
            .iter()
            .enumerate()
            .map(|(position, item)| (item.id.clone(), position))
            .collect();
        Self { items, index }
    }

    pub fn get(&self, item_id: &str) -> Option<&MenuItem> {
        self.index.get(item_id).map(|&position| &self.items[position])
    }

    /// Items in menu order
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn by_category(&self, category: MenuCategory) -> impl Iterator<Item = &MenuItem> {
        self.items.iter().filter(move |item| item.category == category)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Resolve a selection to a display name and unit price.
    ///
    /// An explicit `variant_price` wins; otherwise the catalog price of the
    /// named variant is used, falling back to the item's base price when no
    /// variant is named.
    pub fn resolve(
        &self,
        item_id: &str,
        variant_name: Option<&str>,
        variant_price: Option<Paise>,
    ) -> Result<ResolvedSelection, CatalogError> {
        let item = self
            .get(item_id)
            .ok_or_else(|| CatalogError::NotFound(item_id.to_string()))?;

        let variant_name = variant_name.map(str::trim).filter(|v| !v.is_empty());

        let (display_name, unit_price) = match variant_name {
            None => (item.display_name(None), variant_price.unwrap_or(item.base_price)),
            Some(requested) => match (item.variant(requested), variant_price) {
                (Some(variant), price) => (
                    item.display_name(Some(&variant.name)),
                    price.unwrap_or(variant.price),
                ),
                (None, Some(price)) => (item.display_name(Some(requested)), price),
                (None, None) => {
                    return Err(CatalogError::UnknownVariant {
                        item_id: item_id.to_string(),
                        variant: requested.to_string(),
                    })
                }
            },
        };

        if unit_price < 0 {
            return Err(CatalogError::Invalid(format!("negative price for '{}'", display_name)));
        }

        Ok(ResolvedSelection {
            item_id: item.id.clone(),
            display_name,
            unit_price,
        })
    }
}

impl Default for MenuCatalog {
    fn default() -> Self {
        Self::cafe_default()
    }
}

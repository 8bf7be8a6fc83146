use serde::{Deserialize, Serialize};
use cafe_core::Paise;

/// Sections of the menu board
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MenuCategory {
    Coffee,
    Tea,
    Snack,
    Dessert,
    Beverage,
}

impl MenuCategory {
    /// Menu board order
    pub const ALL: [MenuCategory; 5] = [
        MenuCategory::Coffee,
        MenuCategory::Tea,
        MenuCategory::Snack,
        MenuCategory::Dessert,
        MenuCategory::Beverage,
    ];
}

/// A priced sub-option of a menu item (size, style, filling)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    pub price: Paise,
}

impl Variant {
    pub fn new(name: impl Into<String>, price: Paise) -> Self {
        Self { name: name.into(), price }
    }
}

/// Something the café sells
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub category: MenuCategory,
    pub base_price: Paise,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl MenuItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: MenuCategory, base_price: Paise) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            base_price,
            description: None,
            variants: Vec::new(),
        }
    }

    pub fn with_variant(mut self, name: impl Into<String>, price: Paise) -> Self {
        self.variants.push(Variant::new(name, price));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Variant lookup is case-insensitive so till input like `latte` works
    pub fn variant(&self, name: &str) -> Option<&Variant> {
        let name = name.trim();
        self.variants.iter().find(|v| v.name.eq_ignore_ascii_case(name))
    }

    /// Name shown on the cart line: `Coffee` or `Coffee (Latte)`
    pub fn display_name(&self, variant_name: Option<&str>) -> String {
        match variant_name {
            Some(v) => format!("{} ({})", self.name, v),
            None => self.name.clone(),
        }
    }

    pub(crate) fn check(&self) -> Result<(), CatalogError> {
        if self.id.trim().is_empty() {
            return Err(CatalogError::Invalid("menu item with empty id".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(CatalogError::Invalid(format!("menu item '{}' has no name", self.id)));
        }
        if self.base_price < 0 {
            return Err(CatalogError::Invalid(format!("menu item '{}' has a negative price", self.id)));
        }
        if let Some(v) = self.variants.iter().find(|v| v.price < 0) {
            return Err(CatalogError::Invalid(format!(
                "variant '{}' of '{}' has a negative price",
                v.name, self.id
            )));
        }
        Ok(())
    }
}

/// Catalog errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Menu item not found: {0}")]
    NotFound(String),

    #[error("Menu item '{item_id}' has no variant '{variant}'")]
    UnknownVariant {
        item_id: String,
        variant: String,
    },

    #[error("Invalid menu: {0}")]
    Invalid(String),

    #[error("Failed to read menu file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse menu: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_lookup_ignores_case() {
        let coffee = MenuItem::new("coffee", "Coffee", MenuCategory::Coffee, 15000)
            .with_variant("Latte", 20000);

        assert_eq!(coffee.variant("latte").map(|v| v.price), Some(20000));
        assert!(coffee.variant("mocha").is_none());
    }

    #[test]
    fn test_display_name() {
        let coffee = MenuItem::new("coffee", "Coffee", MenuCategory::Coffee, 15000);
        assert_eq!(coffee.display_name(None), "Coffee");
        assert_eq!(coffee.display_name(Some("Latte")), "Coffee (Latte)");
    }

    #[test]
    fn test_negative_price_rejected() {
        let item = MenuItem::new("x", "X", MenuCategory::Snack, -1);
        assert!(matches!(item.check(), Err(CatalogError::Invalid(_))));
    }
}

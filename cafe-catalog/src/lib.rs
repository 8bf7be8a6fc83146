pub mod product;
pub mod menu;

pub use product::{MenuCategory, MenuItem, Variant, CatalogError};
pub use menu::{MenuCatalog, ResolvedSelection};

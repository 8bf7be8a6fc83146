use std::sync::Arc;
use anyhow::Context;
use cafe_catalog::MenuCatalog;
use cafe_core::{OrderRepository, QrGenerator};
use cafe_store::app_config::{Config, MenuConfig};
use cafe_store::{JsonFileOrderStore, UpiPayee, UpiQrGenerator};

#[derive(Clone)]
pub struct AppState {
    pub menu: Arc<MenuCatalog>,
    pub orders: Arc<dyn OrderRepository>,
    pub qr: Arc<dyn QrGenerator>,
}

impl AppState {
    /// Server wiring: file-backed history, UPI links numbered by that same store
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let menu = Arc::new(load_menu(&config.menu)?);

        let store = JsonFileOrderStore::open(&config.store.orders_file, config.store.first_order_number)
            .await
            .with_context(|| format!("opening order history {}", config.store.orders_file.display()))?;
        let store = Arc::new(store);

        let qr = UpiQrGenerator::new(UpiPayee::from(&config.upi), store.clone());

        Ok(Self {
            menu,
            orders: store,
            qr: Arc::new(qr),
        })
    }
}

pub fn load_menu(config: &MenuConfig) -> anyhow::Result<MenuCatalog> {
    match &config.file {
        Some(path) => MenuCatalog::load_from_file(path).with_context(|| format!("loading menu {}", path.display())),
        None => Ok(MenuCatalog::cafe_default()),
    }
}

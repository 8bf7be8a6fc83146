//! Command-driven till. Reads one command per line from stdin.
//!
//! `cafe-till` talks to the order API at `client.base_url`;
//! `cafe-till --local` keeps history in memory for this run only.

use std::sync::Arc;
use anyhow::Context;
use cafe_api::state::load_menu;
use cafe_catalog::{MenuCatalog, MenuCategory};
use cafe_core::money::format_rupees;
use cafe_core::{OrderRepository, QrGenerator};
use cafe_order::{ErrorKind, SessionCommand, SessionEvent, TillSession};
use cafe_store::app_config::Config;
use cafe_store::{HttpOrderGateway, LocalOrderStore, UpiPayee, UpiQrGenerator};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cafe_order=info,cafe_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load().context("Failed to load config")?;
    let menu = Arc::new(load_menu(&config.menu)?);
    let local = std::env::args().any(|arg| arg == "--local");

    let orders: Arc<dyn OrderRepository>;
    let qr: Arc<dyn QrGenerator>;
    if local {
        let store = Arc::new(LocalOrderStore::new(config.store.first_order_number));
        qr = Arc::new(UpiQrGenerator::new(UpiPayee::from(&config.upi), store.clone()));
        orders = store;
    } else {
        tracing::info!("Using order API at {}", config.client.base_url);
        let gateway = Arc::new(HttpOrderGateway::from_config(&config.client)?);
        qr = gateway.clone();
        orders = gateway;
    }

    let mut till = TillSession::with_timeout(menu.clone(), orders, qr, config.client.request_timeout());
    println!("Till ready. Type `menu` to list items, `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => continue,
            "quit" | "exit" => break,
            "help" => {
                println!("{}", HELP);
                continue;
            }
            _ => {}
        }

        let command = match input.parse::<SessionCommand>() {
            Ok(command) => command,
            Err(e) => {
                println!("! {}", e);
                continue;
            }
        };

        match till.dispatch(command).await {
            Ok(event) => render(&event, &till, &menu),
            Err(e) if e.kind() == ErrorKind::Network => println!("! {} (try again)", e),
            Err(e) => println!("! {}", e),
        }
    }

    Ok(())
}

const HELP: &str = "\
add <item> [variant] [@price]   add one unit (e.g. `add coffee cold coffee`)
remove <n>                      remove one unit of cart line n
clear | cart | menu             empty cart / show cart / show menu
pay cash | pay upi              take payment
confirm | cancel                settle or abandon a pending UPI payment
reset                           start over with an empty cart
history | clear-history yes     show / wipe order history
quit";

fn render(event: &SessionEvent, till: &TillSession, menu: &MenuCatalog) {
    match event {
        SessionEvent::CartUpdated { lines, total } => {
            if lines.is_empty() {
                println!("Cart is empty");
            }
            for (position, line) in lines.iter().enumerate() {
                println!(
                    "{:>2}. {} x{}  {}",
                    position + 1,
                    line.display_name,
                    line.quantity,
                    format_rupees(line.line_total())
                );
            }
            println!("    Total {} ({} items)", format_rupees(*total), till.cart().item_count());
        }
        SessionEvent::AwaitingUpiConfirmation(qr) => {
            println!("Order {}: scan to pay {}", qr.order_number, format_rupees(qr.total));
            println!("  {}", qr.payload);
            println!("Type `confirm` once paid or `cancel`.");
        }
        SessionEvent::OrderCompleted {
            receipt,
            payment_method,
            total,
        } => println!(
            "Order {} paid by {} ({})",
            receipt.order_number,
            payment_method,
            format_rupees(*total)
        ),
        SessionEvent::PaymentCancelled { total } => {
            println!("UPI payment of {} cancelled; cart kept", format_rupees(*total))
        }
        SessionEvent::SessionReset => println!("Started a new order"),
        SessionEvent::Menu(_) => {
            for category in MenuCategory::ALL {
                let mut items = menu.by_category(category).peekable();
                if items.peek().is_none() {
                    continue;
                }
                println!("[{:?}]", category);
                for item in items {
                    println!("{:<16} {:<24} {}", item.id, item.name, format_rupees(item.base_price));
                    for variant in &item.variants {
                        println!("{:<16}   {:<22} {}", "", variant.name, format_rupees(variant.price));
                    }
                }
            }
        }
        SessionEvent::History(orders) => {
            if orders.is_empty() {
                println!("No orders yet");
            }
            for order in orders {
                let items: Vec<String> = order
                    .lines
                    .iter()
                    .map(|l| format!("{} x{}", l.display_name, l.quantity))
                    .collect();
                println!(
                    "#{}  {}  {:<4}  {:>10}  {}",
                    order.order_number,
                    order.placed_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M"),
                    order.payment_method,
                    format_rupees(order.total),
                    items.join(", ")
                );
            }
            for (method, taken) in till.history().takings() {
                println!("{} taken: {}", method, format_rupees(taken));
            }
        }
        SessionEvent::HistoryCleared => println!("Order history cleared"),
    }
}

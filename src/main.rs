use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bloomify_orders::config::ShopConfig;
use bloomify_orders::domain::delivery::{DeliveryContext, DeliveryMethod, DeliveryStrategy};
use bloomify_orders::domain::order::{OrderCommand, OrderInvoker, OrderManager, OrderStatus};
use bloomify_orders::messaging::{EmailChannel, SmsChannel};
use bloomify_orders::metrics::Metrics;
use bloomify_orders::models::{
    Bouquet, Flower, FlowerLine, Ribbon, RibbonMaterial, Wrapping, WrappingKind,
};
use bloomify_orders::observer::{
    CustomerContact, CustomerObserver, DeliveryObserver, InventoryObserver, OrderObserver,
};

fn spring_bouquet() -> anyhow::Result<Bouquet> {
    Ok(Bouquet::new(
        "Spring Dream",
        vec![
            FlowerLine {
                flower: Flower::new("Tulip", "Yellow", 2.5),
                qty: 12,
            },
            FlowerLine {
                flower: Flower::new("Lily", "White", 4.0),
                qty: 5,
            },
        ],
        Wrapping {
            kind: WrappingKind::Paper,
            color: "Kraft".to_string(),
        },
        Ribbon {
            material: RibbonMaterial::Satin,
            color: "Yellow".to_string(),
        },
        "Happy spring!",
    )?)
}

fn red_romance() -> anyhow::Result<Bouquet> {
    Ok(Bouquet::new(
        "Red Romance",
        vec![FlowerLine {
            flower: Flower::new("Rose", "Red", 3.5),
            qty: 10,
        }],
        Wrapping {
            kind: WrappingKind::Satin,
            color: "Pink".to_string(),
        },
        Ribbon {
            material: RibbonMaterial::Silk,
            color: "Red".to_string(),
        },
        "Happy anniversary",
    )?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,bloomify_orders=debug")),
        )
        .init();

    tracing::info!("🌸 Starting Bloomify order core demo");

    let config = match ShopConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid shop configuration, using defaults");
            ShopConfig::default()
        }
    };
    tracing::info!(
        currency = %config.currency,
        max_history_size = config.max_history_size,
        "Shop configuration loaded"
    );

    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 1. Delivery strategies ===
    let (distance_km, order_value) = (12.0, 75.0);

    let strategies: Vec<Box<dyn DeliveryStrategy>> =
        DeliveryMethod::ALL.iter().map(|m| m.strategy()).collect();
    let refs: Vec<&dyn DeliveryStrategy> = strategies.iter().map(|s| s.as_ref()).collect();

    for row in DeliveryContext::compare_strategies(&refs, distance_km, order_value) {
        match row.outcome {
            Ok(details) => tracing::info!(
                strategy = %row.strategy,
                cost = %config.format_price(details.cost),
                eta = %details.estimated_time,
                tracking = details.tracking_available,
                "🚚 Delivery quote"
            ),
            Err(reason) => tracing::info!(strategy = %row.strategy, %reason, "🚚 Delivery unavailable"),
        }
    }

    let preferred = DeliveryMethod::from(config.delivery);
    let mut delivery = DeliveryContext::new(preferred.strategy()).with_metrics(metrics.clone());
    let default_cost = delivery.calculate_delivery_cost(distance_km, order_value)?;
    delivery.set_strategy(DeliveryMethod::Express.strategy());
    let express = delivery.calculate_delivery_cost(distance_km, order_value)?;
    tracing::info!(
        method = %preferred,
        default_cost = %config.format_price(default_cost),
        express = %config.format_price(express),
        "Context switched strategies"
    );

    // === 2. Observed order lifecycle ===
    let manager = OrderManager::new(config.clone())
        .with_metrics(metrics.clone())
        .shared();

    let email = Arc::new(EmailChannel::default());
    let sms = Arc::new(SmsChannel::default());
    let customer = Arc::new(
        CustomerObserver::new(config.clone(), email.clone(), sms.clone()).with_contact(
            CustomerContact {
                email: "jane.smith@example.com".to_string(),
                phone: "+40 721 555 0100".to_string(),
            },
        ),
    );
    let inventory = Arc::new(InventoryObserver::default());
    let dispatch = Arc::new(DeliveryObserver::default());
    let observers: [Arc<dyn OrderObserver>; 3] =
        [customer.clone(), inventory.clone(), dispatch.clone()];

    let order_id = {
        let mut manager = manager.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let order_id = manager
            .place_order(&spring_bouquet()?, "Jane Smith", "jane.smith@example.com")?
            .order_id
            .clone();
        for observer in &observers {
            manager.attach_observer(&order_id, observer.clone())?;
        }
        order_id
    };

    for status in [
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ] {
        tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
        manager
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .modify_order_status(&order_id, status)?;
    }

    tracing::info!(
        emails = email.sent().len(),
        sms = sms.sent().len(),
        toasts = customer.toasts().len(),
        inventory_actions = inventory.journal().len(),
        queued_deliveries = dispatch.delivery_queue().len(),
        "✅ Lifecycle complete"
    );

    // === 3. Commands with undo/redo ===
    let mut invoker = OrderInvoker::from_config(&config)?.with_metrics(metrics.clone());

    let outcomes = invoker.execute_commands(vec![
        OrderCommand::place(manager.clone(), red_romance()?, "Alice Johnson", "alice@example.com"),
        OrderCommand::place(manager.clone(), spring_bouquet()?, "Bob Smith", "bob@example.com"),
    ]);
    for outcome in &outcomes {
        tracing::info!("{}", outcome);
    }

    let script = [
        OrderCommand::modify(manager.clone(), "ORD-000002", OrderStatus::Preparing),
        OrderCommand::cancel(manager.clone(), "ORD-000003"),
    ];
    for command in script {
        tracing::info!("{}", invoker.execute_command(command));
    }

    tracing::info!("↩️  {}", invoker.undo());
    tracing::info!("↩️  {}", invoker.undo());
    tracing::info!("↪️  {}", invoker.redo());

    println!("{}", invoker.display_history());
    println!("{}", serde_json::to_string_pretty(&invoker.stats())?);

    let revenue = manager
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .total_revenue();
    tracing::info!(revenue = %config.format_price(revenue), "💰 Total revenue");

    println!("{}", metrics.render()?);

    tracing::info!("🎉 Demo complete!");

    Ok(())
}

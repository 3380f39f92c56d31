use std::sync::Arc;

use anyhow::Result;
use domain_events::EventDispatcher;
use tracing::info;
use tracing_subscriber::EnvFilter;

use order_events::{
    AppConfig, LogFormat, Order, OrderCreatedEvent, PaymentLedger, SendNewPaymentRequest,
};

fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    // Initialize logging
    let filter = EnvFilter::from_default_env()
        .add_directive("order_events=info".parse()?)
        .add_directive("domain_events=info".parse()?);
    match config.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }

    config.log_loaded();

    let ledger = PaymentLedger::new();
    let dispatcher = EventDispatcher::new();
    dispatcher.register(
        "OrderCreatedEvent",
        Arc::new(SendNewPaymentRequest::new(
            &config.payment_gateway_url,
            ledger.clone(),
        )),
    )?;

    let order = Order::new(&config.order_status, config.order_total);
    info!(order_id = %order.id, status = order.status.as_str(), "Order created");

    let event = OrderCreatedEvent::new(order)?;
    dispatcher.notify(&event)?;

    println!("{}", serde_json::to_string_pretty(&event)?);
    info!(payment_requests = ledger.len(), "Done");

    Ok(())
}

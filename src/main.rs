//! # Gallery Checkout Demo
//!
//! Seeds a small gallery and walks through the checkout paths:
//! 1.  Start the [`GallerySystem`] from `CHECKOUT_*` configuration.
//! 2.  Register a customer, a rival buyer and an administrator; list three artworks.
//! 3.  Place an order, lose a race for an already-sold piece, read back the invoice.
//! 4.  Show the access guard and the administrator's view.

use gallery_checkout::access::Requester;
use gallery_checkout::config::CheckoutConfig;
use gallery_checkout::lifecycle::{setup_tracing, GallerySystem, Stores};
use gallery_checkout::model::{CatalogItemCreate, PlaceOrderRequest, UserCreate};
use rust_decimal::Decimal;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let config = CheckoutConfig::from_env()?;
    info!(?config, "Starting gallery checkout");
    let stores = Stores::from_config(&config).await?;
    let system = GallerySystem::start(&config, stores).await?;

    // Seed users
    let span = tracing::info_span!("seed");
    let (alice, bruno, admin, works) = async {
        let alice = system
            .user_client
            .create_user(UserCreate::customer("alice", "alice@example.com").named("Alice", "Moreau"))
            .await?;
        let bruno = system
            .user_client
            .create_user(UserCreate::customer("bruno", "bruno@example.com").named("Bruno", "Costa"))
            .await?;
        let admin = system
            .user_client
            .create_user(UserCreate::customer("curator", "curator@example.com").admin())
            .await?;

        let mut works = Vec::new();
        for (title, artist, cents) in [
            ("Harbour at Dusk", "E. Lindqvist", 10_000),
            ("Blue Study No. 4", "M. Okafor", 5_000),
            ("Salt Flats", "R. Ibarra", 22_500),
        ] {
            let id = system
                .catalog_client
                .create_item(CatalogItemCreate::artwork(title, artist, Decimal::new(cents, 2)))
                .await?;
            works.push(id);
        }
        Ok::<_, Box<dyn std::error::Error>>((alice, bruno, admin, works))
    }
    .instrument(span)
    .await?;
    info!(%alice, %bruno, %admin, items = works.len(), "Gallery seeded");

    // Alice buys the first two works
    let alice_req = Requester::customer(alice);
    let order = system
        .checkout
        .place_order(
            &alice_req,
            PlaceOrderRequest::for_items(&works[..2], "12 Quai Voltaire, Paris", "card"),
        )
        .instrument(tracing::info_span!("order_processing"))
        .await?;
    info!(order_id = %order.id, invoice = %order.invoice_number, total = %order.total, "Order placed");

    // Bruno wants one of them too, plus a work that is still free
    let bruno_req = Requester::customer(bruno);
    match system
        .checkout
        .place_order(
            &bruno_req,
            PlaceOrderRequest::for_items(&[works[1], works[2]], "3 Rua Augusta, Lisbon", "paypal"),
        )
        .await
    {
        Ok(order) => error!(order_id = %order.id, "Sold artwork was sold twice"),
        Err(e) => info!(error = %e, retryable = e.is_retryable(), "Conflict, as expected"),
    }
    let still_free = system.catalog_client.check_availability(works[2]).await?;
    info!(item = %works[2], still_free, "Loser's other item untouched");

    // Invoice, access guard, admin view
    let invoice = system.checkout.get_invoice(&alice_req, order.id).await?;
    info!(
        invoice = %invoice.invoice_number,
        customer = %invoice.customer_name,
        subtotal = %invoice.subtotal,
        tax = %invoice.tax,
        total = %invoice.total,
        "Invoice"
    );

    if let Err(e) = system.checkout.get_order(&bruno_req, order.id).await {
        info!(error = %e, "Bruno cannot read Alice's order");
    }

    let all = system.checkout.list_orders(&Requester::admin(admin)).await?;
    info!(orders = all.len(), "Administrator sees every order");

    system.shutdown().await?;
    info!("Application completed successfully");
    Ok(())
}

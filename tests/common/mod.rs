#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use gallery_checkout::access::Requester;
use gallery_checkout::clock::FixedClock;
use gallery_checkout::config::CheckoutConfig;
use gallery_checkout::lifecycle::{GallerySystem, Stores};
use gallery_checkout::model::{CatalogItemCreate, ItemId, UserCreate};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Every test system runs on 19 Oct 2026, noon UTC.
pub fn today() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

pub async fn start() -> GallerySystem {
    start_with(Stores::in_memory()).await
}

pub async fn start_with(stores: Stores) -> GallerySystem {
    actor_framework::tracing::try_setup_tracing();
    GallerySystem::start_with_clock(&CheckoutConfig::default(), stores, Arc::new(FixedClock(today())))
        .await
        .expect("system starts")
}

pub async fn customer(system: &GallerySystem, username: &str) -> Requester {
    let id = system
        .user_client
        .create_user(
            UserCreate::customer(username, format!("{username}@example.com")).named(username, "Tester"),
        )
        .await
        .expect("customer created");
    Requester::customer(id)
}

pub async fn admin(system: &GallerySystem) -> Requester {
    let id = system
        .user_client
        .create_user(UserCreate::customer("curator", "curator@example.com").admin())
        .await
        .expect("admin created");
    Requester::admin(id)
}

pub async fn artwork(system: &GallerySystem, title: &str, price: Decimal) -> ItemId {
    system
        .catalog_client
        .create_item(CatalogItemCreate::artwork(title, "Test Artist", price))
        .await
        .expect("artwork created")
}

pub async fn is_available(system: &GallerySystem, id: ItemId) -> bool {
    system
        .catalog_client
        .check_availability(id)
        .await
        .expect("availability check")
}

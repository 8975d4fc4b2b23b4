use chrono::{SecondsFormat, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;
use uuid::Uuid;

use super::aggregate::{round_currency, Order};
use super::value_objects::{Address, OrderItem, OrderStatus};

// ============================================================================
// Mock order generator for publishers and tests
// ============================================================================

const PRODUCTS: &[(&str, &str, f64)] = &[
    ("prod-001", "Smartphone", 699.99),
    ("prod-002", "Laptop", 1299.99),
    ("prod-003", "Headphones", 149.99),
    ("prod-004", "Smartwatch", 249.99),
    ("prod-005", "Tablet", 499.99),
    ("prod-006", "Phone Case", 19.99),
    ("prod-007", "USB-C Charger", 29.99),
    ("prod-008", "Bluetooth Speaker", 89.99),
];

const STREETS: &[&str] = &["123 Main St", "456 Oak Ave", "789 Pine Rd", "12 Elm Blvd"];

const CITIES: &[(&str, &str, &str)] = &[
    ("Los Angeles", "CA", "90001"),
    ("New York", "NY", "10001"),
    ("Chicago", "IL", "60601"),
    ("Houston", "TX", "77001"),
    ("Seattle", "WA", "98101"),
];

const MAX_ITEMS: usize = 3;
const MAX_QUANTITY: i32 = 3;

/// Build a random order in status CREATED whose total matches its items.
pub fn generate_order<R: Rng + ?Sized>(rng: &mut R) -> Order {
    let item_count = rng.random_range(1..=MAX_ITEMS);
    let items: Vec<OrderItem> = PRODUCTS
        .choose_multiple(rng, item_count)
        .map(|(product_id, product_name, unit_price)| OrderItem {
            product_id: product_id.to_string(),
            product_name: product_name.to_string(),
            quantity: rng.random_range(1..=MAX_QUANTITY),
            unit_price: *unit_price,
        })
        .collect();

    let street = STREETS.choose(rng).copied().unwrap_or(STREETS[0]);
    let (city, state, zip) = CITIES.choose(rng).copied().unwrap_or(CITIES[0]);

    let mut order = Order {
        order_id: format!("ORD-{}", short_id()),
        customer_id: format!("CUST-{}", short_id()),
        order_date: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        status: Some(OrderStatus::Created),
        total_amount: 0.0,
        items,
        shipping_address: Some(Address {
            street: street.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            zip: zip.to_string(),
            country: "USA".to_string(),
        }),
        processing_timestamp: None,
        fulfillment: None,
    };
    order.total_amount = round_currency(order.computed_total());
    order
}

/// Convenience wrapper over the thread-local generator.
pub fn generate_random_order() -> Order {
    generate_order(&mut rand::rng())
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

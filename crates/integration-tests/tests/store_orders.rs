//! Database-backed tests for order placement and cancellation.
//!
//! These need a local `PostgreSQL` instance and are ignored by default;
//! see the crate docs for how to run them.

use rust_decimal::Decimal;

use shopassist_core::PaymentMethod;
use shopassist_integration_tests::{ensure_demo_user, test_pool, unique_name};
use shopassist_server::actions::{
    Action, ActionDispatcher, DatabaseQuery, PlaceOrderRequest,
};
use shopassist_server::db::{OrderRepository, ProductRepository};

fn dollars(s: &str) -> Decimal {
    s.parse().expect("decimal")
}

async fn items_for_product(pool: &sqlx::PgPool, product_id: i32) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_items WHERE product_id = $1")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .expect("count order items")
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_placing_order_decrements_stock_and_creates_one_order() {
    let pool = test_pool().await;
    ensure_demo_user(&pool).await;

    let name = unique_name("Test Widget");
    let products = ProductRepository::new(&pool);
    let product = products
        .create(&name, Some("A test widget"), dollars("49.99"), 10, None)
        .await
        .expect("create product");

    let dispatcher = ActionDispatcher::new(&pool);
    let outcome = dispatcher
        .dispatch(Action::PlaceOrder(PlaceOrderRequest {
            product: name.clone(),
            quantity: 3,
            shipping_address: "123 Main St, Anytown, USA".to_string(),
            payment_method: PaymentMethod::CreditCard,
        }))
        .await
        .expect("dispatch");

    let response = outcome.response.expect("reply rewritten");
    assert!(response.contains("placed successfully"), "{response}");

    // Stock decremented by exactly the ordered quantity.
    let after = products
        .get(product.id)
        .await
        .expect("get product")
        .expect("product exists");
    assert_eq!(after.stock, 7);

    // Exactly one order and one item were created.
    let Some(DatabaseQuery::OrderPlacement { order_number, result }) = outcome.database_query
    else {
        panic!("expected an order placement trace");
    };
    assert_eq!(result.quantity, 3);
    assert_eq!(result.total_amount, dollars("149.97"));

    let orders = OrderRepository::new(&pool);
    let placed = orders
        .find_by_number(&order_number.parse().expect("order number"))
        .await
        .expect("find order")
        .expect("order exists");
    assert_eq!(placed.total_amount, dollars("149.97"));

    let items = orders.items(placed.id).await.expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 3);
    assert_eq!(items[0].price, dollars("49.99"));
    assert_eq!(items_for_product(&pool, product.id.as_i32()).await, 1);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_cod_order_at_limit_is_rejected_without_rows() {
    let pool = test_pool().await;
    ensure_demo_user(&pool).await;

    let name = unique_name("COD Widget");
    let products = ProductRepository::new(&pool);
    let product = products
        .create(&name, None, dollars("50.00"), 10, None)
        .await
        .expect("create product");

    let dispatcher = ActionDispatcher::new(&pool);
    let outcome = dispatcher
        .dispatch(Action::PlaceOrder(PlaceOrderRequest {
            product: name.clone(),
            quantity: 2,
            shipping_address: "123 Main St".to_string(),
            payment_method: PaymentMethod::CashOnDelivery,
        }))
        .await
        .expect("dispatch");

    let response = outcome.response.expect("reply rewritten");
    assert!(response.contains("Cash on Delivery is only available"), "{response}");
    assert!(response.contains("$100.00"), "{response}");
    assert!(outcome.database_query.is_none());

    // Nothing was written.
    let after = products
        .get(product.id)
        .await
        .expect("get product")
        .expect("product exists");
    assert_eq!(after.stock, 10);
    assert_eq!(items_for_product(&pool, product.id.as_i32()).await, 0);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_insufficient_stock_is_rejected_without_rows() {
    let pool = test_pool().await;
    ensure_demo_user(&pool).await;

    let name = unique_name("Scarce Widget");
    let products = ProductRepository::new(&pool);
    let product = products
        .create(&name, None, dollars("10.00"), 2, None)
        .await
        .expect("create product");

    let dispatcher = ActionDispatcher::new(&pool);
    let outcome = dispatcher
        .dispatch(Action::PlaceOrder(PlaceOrderRequest {
            product: name.clone(),
            quantity: 5,
            shipping_address: "123 Main St".to_string(),
            payment_method: PaymentMethod::CreditCard,
        }))
        .await
        .expect("dispatch");

    let response = outcome.response.expect("reply rewritten");
    assert!(response.contains("only have 2"), "{response}");

    let after = products
        .get(product.id)
        .await
        .expect("get product")
        .expect("product exists");
    assert_eq!(after.stock, 2);
    assert_eq!(items_for_product(&pool, product.id.as_i32()).await, 0);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_cancelling_nonexistent_order_mutates_nothing() {
    let pool = test_pool().await;
    ensure_demo_user(&pool).await;

    let dispatcher = ActionDispatcher::new(&pool);
    let outcome = dispatcher
        .dispatch(Action::CancelOrder {
            order_number: "ZZZZ9999".to_string(),
        })
        .await
        .expect("dispatch");

    let response = outcome.response.expect("reply rewritten");
    assert!(response.contains("couldn't find an order"), "{response}");
    assert!(outcome.database_query.is_none());
}

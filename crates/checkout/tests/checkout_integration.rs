//! Integration tests for the checkout flow against in-memory stores.

use std::sync::Arc;

use checkout::{
    CallerCredential, CartService, CheckoutCoordinator, CheckoutError, InProcessProductGateway,
    InventoryService, OrderQueries, ProductGateway,
};
use common::{Money, ProductId, UserId};
use domain::{CheckoutRequest, CheckoutStatus, DeliveryAddressInput, ProductStock};
use store::{
    CartStore, InMemoryCartStore, InMemoryInventoryStore, InMemoryOrderStore, InventoryStore,
    OrderStore,
};

type Gateway = InProcessProductGateway<InMemoryInventoryStore>;
type TestCoordinator = CheckoutCoordinator<InMemoryCartStore, InMemoryOrderStore, Gateway>;

struct TestHarness {
    coordinator: TestCoordinator,
    cart_service: CartService<InMemoryCartStore, Gateway>,
    queries: OrderQueries<InMemoryOrderStore>,
    carts: InMemoryCartStore,
    orders: InMemoryOrderStore,
    inventory: InMemoryInventoryStore,
    gateway: Gateway,
}

impl TestHarness {
    fn new(products: Vec<ProductStock>) -> Self {
        let carts = InMemoryCartStore::new();
        let orders = InMemoryOrderStore::new();
        let inventory = InMemoryInventoryStore::with_products(products);
        let gateway = InProcessProductGateway::new(InventoryService::new(inventory.clone()));

        Self {
            coordinator: CheckoutCoordinator::new(carts.clone(), orders.clone(), gateway.clone()),
            cart_service: CartService::new(carts.clone(), gateway.clone()),
            queries: OrderQueries::new(orders.clone()),
            carts,
            orders,
            inventory,
            gateway,
        }
    }

    async fn add(&self, user: &UserId, product: &str, quantity: i64) {
        self.cart_service
            .add_or_update_item(user, &ProductId::new(product), quantity)
            .await
            .unwrap();
    }

    async fn stock(&self, product: &str) -> u32 {
        self.inventory
            .stock_of(&ProductId::new(product))
            .await
            .unwrap()
    }
}

fn product(id: &str, dollars: i64, stock: u32) -> ProductStock {
    ProductStock::new(id, format!("Product {id}"), Money::from_dollars(dollars), stock, "seller-1")
}

fn request() -> CheckoutRequest {
    CheckoutRequest {
        payment_method: Some("Credit Card".to_string()),
        payment_transaction_id: Some("txn-123".to_string()),
        delivery_address: Some(DeliveryAddressInput {
            street: Some("42 Elm St".to_string()),
            city: Some("Portland".to_string()),
            postal_code: Some("97201".to_string()),
            country: Some("US".to_string()),
        }),
        phone_number: Some("+1 503 555 0199".to_string()),
    }
}

fn credential() -> CallerCredential {
    CallerCredential::bearer("token")
}

#[tokio::test]
async fn test_successful_checkout_confirms_order_and_clears_cart() {
    let h = TestHarness::new(vec![product("productA", 10, 50), product("productB", 20, 50)]);
    let user = UserId::new("user-1");
    h.add(&user, "productA", 3).await;
    h.add(&user, "productB", 1).await;

    let receipt = h
        .coordinator
        .checkout(&user, &request(), &credential())
        .await
        .unwrap();

    assert_eq!(receipt.order.checkout_status, CheckoutStatus::Confirmed);
    assert_eq!(receipt.lines.len(), 2);
    assert_eq!(domain::order_total(&receipt.lines), Money::from_dollars(50));
    assert_eq!(receipt.order.delivery_time - receipt.order.placed_at, chrono::Duration::days(7));

    assert!(h.cart_service.list_items(&user).await.unwrap().is_empty());
    assert_eq!(h.stock("productA").await, 47);
    assert_eq!(h.stock("productB").await, 49);

    let details = h.queries.get_for_user(&user, receipt.order.id).await.unwrap();
    assert_eq!(details.total_amount, Money::from_dollars(50));
    let history = h.queries.list_for_user(&user, &user).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].total_items, 4);
}

#[tokio::test]
async fn test_insufficient_stock_keeps_cart_and_hides_order() {
    let h = TestHarness::new(vec![product("productC", 5, 10)]);
    let user = UserId::new("user-1");
    h.add(&user, "productC", 5).await;
    // Stock drops after the item was added.
    h.inventory
        .decrement(&ProductId::new("productC"), 8, None)
        .await
        .unwrap();

    let result = h.coordinator.checkout(&user, &request(), &credential()).await;

    let Err(CheckoutError::PartialFailure { order_id, messages }) = result else {
        panic!("expected partial failure, got {result:?}");
    };
    assert_eq!(messages, vec!["Not enough stock for product productC.".to_string()]);

    let items = h.cart_service.list_items(&user).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 5);

    let order = h.orders.get_order(order_id).await.unwrap().unwrap();
    assert_eq!(order.checkout_status, CheckoutStatus::Failed);
    assert!(h.queries.list_for_user(&user, &user).await.unwrap().is_empty());
    assert_eq!(h.gateway.decrement_calls().await, 0);
}

#[tokio::test]
async fn test_empty_cart_creates_no_order() {
    let h = TestHarness::new(vec![]);
    let user = UserId::new("user-1");
    h.carts.get_or_create_cart(&user).await.unwrap();

    let result = h.coordinator.checkout(&user, &request(), &credential()).await;

    assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    assert_eq!(
        result.unwrap_err().to_string(),
        "Cart is empty. Cannot proceed with checkout."
    );
    assert_eq!(h.orders.order_count().await, 0);
}

#[tokio::test]
async fn test_missing_cart_creates_no_order() {
    let h = TestHarness::new(vec![]);

    let result = h
        .coordinator
        .checkout(&UserId::new("nobody"), &request(), &credential())
        .await;

    assert!(matches!(result, Err(CheckoutError::NoCart)));
    assert_eq!(h.orders.order_count().await, 0);
}

#[tokio::test]
async fn test_missing_phone_number_is_rejected_before_cart_read() {
    let h = TestHarness::new(vec![product("productA", 10, 5)]);
    let user = UserId::new("user-1");
    h.add(&user, "productA", 1).await;
    h.carts.set_unavailable(true).await;

    let mut req = request();
    req.phone_number = None;
    let result = h.coordinator.checkout(&user, &req, &credential()).await;

    let Err(CheckoutError::Validation(err)) = result else {
        panic!("expected validation error, got {result:?}");
    };
    assert_eq!(
        err.to_string(),
        "Payment method, delivery address, and phone number are required."
    );
    assert_eq!(h.orders.order_count().await, 0);
}

#[tokio::test]
async fn test_concurrent_checkouts_for_last_unit() {
    let h = Arc::new(TestHarness::new(vec![product("productD", 15, 1)]));
    let alice = UserId::new("alice");
    let bob = UserId::new("bob");
    h.add(&alice, "productD", 1).await;
    h.add(&bob, "productD", 1).await;

    let mut handles = Vec::new();
    for user in [alice.clone(), bob.clone()] {
        let h = h.clone();
        handles.push(tokio::spawn(async move {
            h.coordinator.checkout(&user, &request(), &credential()).await
        }));
    }

    let mut succeeded = 0;
    let mut failures = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(CheckoutError::PartialFailure { messages, .. }) => failures.extend(messages),
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(succeeded, 1);
    assert_eq!(failures, vec!["Not enough stock for product productD.".to_string()]);
    assert_eq!(h.stock("productD").await, 0);
}

#[tokio::test]
async fn test_decrement_failure_keeps_earlier_lines_and_cart() {
    let h = TestHarness::new(vec![product("productA", 10, 5), product("productB", 20, 5)]);
    let user = UserId::new("user-1");
    h.add(&user, "productA", 1).await;
    h.add(&user, "productB", 2).await;
    h.gateway.fail_decrement_for("productB").await;

    let result = h.coordinator.checkout(&user, &request(), &credential()).await;

    let Err(CheckoutError::PartialFailure { order_id, messages }) = result else {
        panic!("expected partial failure, got {result:?}");
    };
    assert_eq!(messages, vec!["Error processing product productB.".to_string()]);

    // Nothing is undone: productA stays decremented and both lines persist.
    assert_eq!(h.stock("productA").await, 4);
    assert_eq!(h.stock("productB").await, 5);
    assert_eq!(h.orders.list_lines(order_id).await.unwrap().len(), 2);
    assert_eq!(h.cart_service.list_items(&user).await.unwrap().len(), 2);
    assert_eq!(h.gateway.decrement_calls().await, 2);
}

#[tokio::test]
async fn test_every_line_is_attempted_after_a_failure() {
    let h = TestHarness::new(vec![
        product("productA", 10, 5),
        product("productB", 20, 5),
        product("productC", 30, 5),
    ]);
    let user = UserId::new("user-1");
    // productA is added while in stock, then sold out.
    h.add(&user, "productA", 1).await;
    h.add(&user, "productB", 1).await;
    h.add(&user, "productC", 1).await;
    h.inventory
        .upsert_product(&product("productA", 10, 0))
        .await
        .unwrap();

    let result = h.coordinator.checkout(&user, &request(), &credential()).await;

    let Err(CheckoutError::PartialFailure { messages, .. }) = result else {
        panic!("expected partial failure, got {result:?}");
    };
    assert_eq!(messages.len(), 1);
    assert_eq!(h.stock("productB").await, 4);
    assert_eq!(h.stock("productC").await, 4);
}

#[tokio::test]
async fn test_failed_checkout_without_decrement_leaves_stock_unchanged() {
    let h = TestHarness::new(vec![product("productA", 10, 2)]);
    let user = UserId::new("user-1");
    h.add(&user, "productA", 2).await;
    h.inventory
        .decrement(&ProductId::new("productA"), 1, None)
        .await
        .unwrap();

    let before = h.gateway.get_product(&ProductId::new("productA")).await.unwrap();
    let result = h.coordinator.checkout(&user, &request(), &credential()).await;
    let after = h.gateway.get_product(&ProductId::new("productA")).await.unwrap();

    assert!(matches!(result, Err(CheckoutError::PartialFailure { .. })));
    assert_eq!(before.stock, after.stock);
    assert_eq!(before.availability_status, after.availability_status);
}

#[tokio::test]
async fn test_retry_after_failure_creates_new_order() {
    let h = TestHarness::new(vec![product("productA", 10, 5)]);
    let user = UserId::new("user-1");
    h.add(&user, "productA", 1).await;
    h.gateway.set_unavailable(true).await;

    let first = h.coordinator.checkout(&user, &request(), &credential()).await;
    let Err(CheckoutError::PartialFailure { order_id: failed_id, .. }) = first else {
        panic!("expected partial failure, got {first:?}");
    };

    h.gateway.set_unavailable(false).await;
    let receipt = h
        .coordinator
        .checkout(&user, &request(), &credential())
        .await
        .unwrap();

    assert_ne!(receipt.order.id, failed_id);
    assert_eq!(h.orders.order_count().await, 2);
    let history = h.queries.list_for_user(&user, &user).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, receipt.order.id);
}

#[tokio::test]
async fn test_concurrent_decrements_preserve_stock_invariant() {
    let inventory = InMemoryInventoryStore::with_products([product("productE", 1, 100)]);
    let service = Arc::new(InventoryService::new(inventory.clone()));

    let mut handles = Vec::new();
    for i in 0..50 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .decrement(&ProductId::new("productE"), (i % 4) + 1, None)
                .await
                .map(|_| (i % 4) + 1)
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        if let Ok(quantity) = handle.await.unwrap() {
            accepted += quantity;
        }
    }

    let remaining = inventory
        .stock_of(&ProductId::new("productE"))
        .await
        .unwrap();
    assert_eq!(i64::from(remaining), 100 - accepted);
}

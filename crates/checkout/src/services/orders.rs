//! Read side of orders: history summaries and order details.

use common::{Money, OrderId, UserId};
use domain::{Order, OrderLine, OrderSummary, order_total};
use serde::Serialize;
use store::OrderStore;

use crate::error::OrderQueryError;

/// An order with its lines and total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderLine>,
    pub total_amount: Money,
}

/// Order reads scoped to the calling user.
///
/// Only confirmed orders are visible; draft and failed checkouts stay hidden.
pub struct OrderQueries<O> {
    orders: O,
}

impl<O: OrderStore> OrderQueries<O> {
    pub fn new(orders: O) -> Self {
        Self { orders }
    }

    /// Lists the confirmed orders of `user_id`, newest first.
    ///
    /// Callers may only list their own orders.
    #[tracing::instrument(skip(self))]
    pub async fn list_for_user(
        &self,
        caller: &UserId,
        user_id: &UserId,
    ) -> Result<Vec<OrderSummary>, OrderQueryError> {
        if caller != user_id {
            return Err(OrderQueryError::Forbidden);
        }

        let orders = self.orders.list_orders_for_user(user_id).await?;
        let mut summaries = Vec::with_capacity(orders.len());
        for order in orders.iter().filter(|o| o.is_confirmed()) {
            let lines = self.orders.list_lines(order.id).await?;
            summaries.push(OrderSummary::from_lines(order, &lines));
        }
        Ok(summaries)
    }

    /// Loads a confirmed order owned by `caller`.
    #[tracing::instrument(skip(self))]
    pub async fn get_for_user(
        &self,
        caller: &UserId,
        order_id: OrderId,
    ) -> Result<OrderDetails, OrderQueryError> {
        let order = self
            .orders
            .get_order(order_id)
            .await?
            .filter(Order::is_confirmed)
            .ok_or(OrderQueryError::NotFound)?;

        if !order.is_owned_by(caller) {
            return Err(OrderQueryError::Forbidden);
        }

        let items = self.orders.list_lines(order_id).await?;
        let total_amount = order_total(&items);
        Ok(OrderDetails {
            order,
            items,
            total_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use common::{CartId, ProductId};
    use domain::{CartItem, CheckoutRequest, CheckoutStatus, DeliveryAddressInput};
    use store::InMemoryOrderStore;

    fn placed_order(user: &str, status: CheckoutStatus) -> Order {
        let details = CheckoutRequest {
            payment_method: Some("UPI".to_string()),
            payment_transaction_id: Some("txn-1".to_string()),
            delivery_address: Some(DeliveryAddressInput {
                street: Some("2 High St".to_string()),
                city: Some("Leeds".to_string()),
                postal_code: Some("LS1".to_string()),
                country: Some("UK".to_string()),
            }),
            phone_number: Some("0113 000".to_string()),
        }
        .validate()
        .unwrap();
        let mut order = Order::place(UserId::new(user), details, Utc::now());
        order.checkout_status = status;
        order
    }

    async fn seed(store: &InMemoryOrderStore, order: &Order, prices: &[(i64, u32)]) {
        store.create_order(order).await.unwrap();
        for (i, (cents, quantity)) in prices.iter().enumerate() {
            let item = CartItem::new(
                CartId::new(),
                ProductId::new(format!("P{i}")),
                Money::from_cents(*cents),
                *quantity,
                1,
                Utc::now(),
            )
            .unwrap();
            store
                .create_order_line(&OrderLine::from_cart_item(order.id, &item))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_list_shows_confirmed_orders_only() {
        let store = InMemoryOrderStore::new();
        let mut confirmed = placed_order("u1", CheckoutStatus::Confirmed);
        confirmed.placed_at -= Duration::minutes(5);
        seed(&store, &confirmed, &[(1000, 2), (250, 4)]).await;
        seed(&store, &placed_order("u1", CheckoutStatus::Failed), &[(100, 1)]).await;
        seed(&store, &placed_order("u1", CheckoutStatus::Draft), &[]).await;

        let queries = OrderQueries::new(store);
        let user = UserId::new("u1");
        let summaries = queries.list_for_user(&user, &user).await.unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, confirmed.id);
        assert_eq!(summaries[0].total_items, 6);
        assert_eq!(summaries[0].total_amount, Money::from_cents(3000));
    }

    #[tokio::test]
    async fn test_list_for_other_user_is_forbidden() {
        let queries = OrderQueries::new(InMemoryOrderStore::new());
        let result = queries
            .list_for_user(&UserId::new("u1"), &UserId::new("u2"))
            .await;
        assert!(matches!(result, Err(OrderQueryError::Forbidden)));
    }

    #[tokio::test]
    async fn test_get_for_user() {
        let store = InMemoryOrderStore::new();
        let order = placed_order("u1", CheckoutStatus::Confirmed);
        seed(&store, &order, &[(1999, 1), (1, 1)]).await;
        let queries = OrderQueries::new(store);

        let details = queries
            .get_for_user(&UserId::new("u1"), order.id)
            .await
            .unwrap();
        assert_eq!(details.items.len(), 2);
        assert_eq!(details.total_amount, Money::from_cents(2000));

        let foreign = queries.get_for_user(&UserId::new("u2"), order.id).await;
        assert!(matches!(foreign, Err(OrderQueryError::Forbidden)));

        let missing = queries.get_for_user(&UserId::new("u1"), OrderId::new()).await;
        assert!(matches!(missing, Err(OrderQueryError::NotFound)));
    }

    #[tokio::test]
    async fn test_failed_order_is_not_found() {
        let store = InMemoryOrderStore::new();
        let order = placed_order("u1", CheckoutStatus::Failed);
        seed(&store, &order, &[(100, 1)]).await;
        let queries = OrderQueries::new(store);

        let result = queries.get_for_user(&UserId::new("u1"), order.id).await;
        assert!(matches!(result, Err(OrderQueryError::NotFound)));
    }
}

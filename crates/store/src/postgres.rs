use async_trait::async_trait;
use common::{CartId, Money, OrderId, OrderLineId, ProductId, UserId};
use domain::{
    AvailabilityStatus, Cart, CartItem, CartStatus, CheckoutStatus, DeliveryAddress, Order,
    OrderLine, ProductStock, StockError, LOW_STOCK_THRESHOLD,
};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Result, StoreError,
    store::{CartStore, DecrementOutcome, InventoryStore, OrderStore},
};

/// Runs the database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

fn to_u32(value: i32, column: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| StoreError::InvalidData(format!("{column} is negative: {value}")))
}

fn to_i32(value: u32, column: &str) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| StoreError::InvalidData(format!("{column} out of range: {value}")))
}

/// PostgreSQL-backed cart store.
#[derive(Clone)]
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    /// Creates a new PostgreSQL cart store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_cart(row: PgRow) -> Result<Cart> {
        Ok(Cart {
            id: CartId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::new(row.try_get::<String, _>("user_id")?),
            status: CartStatus::Active,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_item(row: PgRow) -> Result<CartItem> {
        Ok(CartItem {
            cart_id: CartId::from_uuid(row.try_get::<Uuid, _>("cart_id")?),
            product_id: ProductId::new(row.try_get::<String, _>("product_id")?),
            price: Money::from_cents(row.try_get("price_cents")?),
            quantity: to_u32(row.try_get("quantity")?, "quantity")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn get_cart(&self, user_id: &UserId) -> Result<Option<Cart>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, created_at, updated_at
            FROM carts
            WHERE user_id = $1 AND status = 'active'
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_cart).transpose()
    }

    async fn get_or_create_cart(&self, user_id: &UserId) -> Result<Cart> {
        sqlx::query(
            r#"
            INSERT INTO carts (id, user_id, status)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) WHERE status = 'active' DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id.as_str())
        .bind(CartStatus::Active.as_str())
        .execute(&self.pool)
        .await?;

        self.get_cart(user_id).await?.ok_or_else(|| StoreError::NotFound {
            entity: "cart",
            id: user_id.to_string(),
        })
    }

    async fn delete_cart(&self, user_id: &UserId) -> Result<Option<Cart>> {
        // cart_items rows go with the cart via ON DELETE CASCADE
        let row = sqlx::query(
            r#"
            DELETE FROM carts
            WHERE user_id = $1 AND status = 'active'
            RETURNING id, user_id, created_at, updated_at
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_cart).transpose()
    }

    async fn list_items(&self, cart_id: CartId) -> Result<Vec<CartItem>> {
        let rows = sqlx::query(
            r#"
            SELECT cart_id, product_id, price_cents, quantity, created_at
            FROM cart_items
            WHERE cart_id = $1
            ORDER BY created_at ASC, product_id ASC
            "#,
        )
        .bind(cart_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_item).collect()
    }

    async fn find_item(
        &self,
        cart_id: CartId,
        product_id: &ProductId,
    ) -> Result<Option<CartItem>> {
        let row = sqlx::query(
            r#"
            SELECT cart_id, product_id, price_cents, quantity, created_at
            FROM cart_items
            WHERE cart_id = $1 AND product_id = $2
            "#,
        )
        .bind(cart_id.as_uuid())
        .bind(product_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_item).transpose()
    }

    async fn upsert_item(&self, item: &CartItem) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO cart_items (cart_id, product_id, price_cents, quantity, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET price_cents = EXCLUDED.price_cents, quantity = EXCLUDED.quantity
            "#,
        )
        .bind(item.cart_id.as_uuid())
        .bind(item.product_id.as_str())
        .bind(item.price.cents())
        .bind(to_i32(item.quantity, "quantity")?)
        .bind(item.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE carts SET updated_at = NOW() WHERE id = $1")
            .bind(item.cart_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_item(&self, cart_id: CartId, product_id: &ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart_id.as_uuid())
            .bind(product_id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear_items(&self, cart_id: CartId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// PostgreSQL-backed order store.
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::new(row.try_get::<String, _>("user_id")?),
            delivery_address: DeliveryAddress {
                street: row.try_get("street")?,
                city: row.try_get("city")?,
                postal_code: row.try_get("postal_code")?,
                country: row.try_get("country")?,
            },
            phone_number: row.try_get("phone_number")?,
            payment_method: row.try_get::<String, _>("payment_method")?.parse()?,
            payment_transaction_id: row.try_get("payment_transaction_id")?,
            payment_status: row.try_get::<String, _>("payment_status")?.parse()?,
            delivery_status: row.try_get::<String, _>("delivery_status")?.parse()?,
            checkout_status: row.try_get::<String, _>("checkout_status")?.parse()?,
            placed_at: row.try_get("placed_at")?,
            delivery_time: row.try_get("delivery_time")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_line(row: PgRow) -> Result<OrderLine> {
        Ok(OrderLine {
            id: OrderLineId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            product_id: ProductId::new(row.try_get::<String, _>("product_id")?),
            price: Money::from_cents(row.try_get("price_cents")?),
            quantity: to_u32(row.try_get("quantity")?, "quantity")?,
        })
    }
}

const ORDER_COLUMNS: &str = "id, user_id, street, city, postal_code, country, phone_number, \
     payment_method, payment_transaction_id, payment_status, delivery_status, checkout_status, \
     placed_at, delivery_time, created_at";

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create_order(&self, order: &Order) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO orders ({ORDER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)"
        ))
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_str())
        .bind(&order.delivery_address.street)
        .bind(&order.delivery_address.city)
        .bind(&order.delivery_address.postal_code)
        .bind(&order.delivery_address.country)
        .bind(&order.phone_number)
        .bind(order.payment_method.as_str())
        .bind(&order.payment_transaction_id)
        .bind(order.payment_status.as_str())
        .bind(order.delivery_status.as_str())
        .bind(order.checkout_status.as_str())
        .bind(order.placed_at)
        .bind(order.delivery_time)
        .bind(order.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StoreError::Conflict(format!("order {} already exists", order.id));
            }
            StoreError::Database(e)
        })?;

        Ok(())
    }

    async fn create_order_line(&self, line: &OrderLine) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO order_lines (id, order_id, product_id, price_cents, quantity)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(line.id.as_uuid())
        .bind(line.order_id.as_uuid())
        .bind(line.product_id.as_str())
        .bind(line.price.cents())
        .bind(to_i32(line.quantity, "quantity")?)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return StoreError::NotFound {
                    entity: "order",
                    id: line.order_id.to_string(),
                };
            }
            StoreError::Database(e)
        })?;

        Ok(())
    }

    async fn set_checkout_status(&self, order_id: OrderId, status: CheckoutStatus) -> Result<()> {
        let result = sqlx::query("UPDATE orders SET checkout_status = $2 WHERE id = $1")
            .bind(order_id.as_uuid())
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "order",
                id: order_id.to_string(),
            });
        }
        Ok(())
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(order_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn list_orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY placed_at DESC"
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn list_lines(&self, order_id: OrderId) -> Result<Vec<OrderLine>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, product_id, price_cents, quantity
            FROM order_lines
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_line).collect()
    }
}

/// PostgreSQL-backed inventory store.
///
/// Decrements are a single conditional `UPDATE ... WHERE stock >= $n`, so the
/// row lock taken by PostgreSQL serializes concurrent decrements.
#[derive(Clone)]
pub struct PgInventoryStore {
    pool: PgPool,
}

impl PgInventoryStore {
    /// Creates a new PostgreSQL inventory store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_product(row: PgRow) -> Result<ProductStock> {
        Ok(ProductStock {
            id: ProductId::new(row.try_get::<String, _>("id")?),
            title: row.try_get("title")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            stock: to_u32(row.try_get("stock")?, "stock")?,
            availability_status: row
                .try_get::<String, _>("availability_status")?
                .parse::<AvailabilityStatus>()?,
            minimum_order_size: to_u32(row.try_get("minimum_order_size")?, "minimum_order_size")?,
            seller_id: row.try_get("seller_id")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

const PRODUCT_COLUMNS: &str =
    "id, title, price_cents, stock, availability_status, minimum_order_size, seller_id, updated_at";

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn get_product(&self, product_id: &ProductId) -> Result<Option<ProductStock>> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(product_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn upsert_product(&self, product: &ProductStock) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, title, price_cents, stock, availability_status,
                                  minimum_order_size, seller_id, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                price_cents = EXCLUDED.price_cents,
                stock = EXCLUDED.stock,
                availability_status = EXCLUDED.availability_status,
                minimum_order_size = EXCLUDED.minimum_order_size,
                seller_id = EXCLUDED.seller_id,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(product.id.as_str())
        .bind(&product.title)
        .bind(product.price.cents())
        .bind(to_i32(product.stock, "stock")?)
        .bind(AvailabilityStatus::for_stock(product.stock).as_str())
        .bind(to_i32(product.minimum_order_size, "minimum_order_size")?)
        .bind(&product.seller_id)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn decrement(
        &self,
        product_id: &ProductId,
        quantity: u32,
        idempotency_key: Option<&str>,
    ) -> Result<DecrementOutcome> {
        if quantity == 0 {
            return Ok(DecrementOutcome::Rejected(StockError::InvalidQuantity(0)));
        }
        // Stock is a 32-bit column, so a larger request can never be met.
        let Ok(quantity_i32) = i32::try_from(quantity) else {
            return match self.get_product(product_id).await? {
                None => Ok(DecrementOutcome::NotFound),
                Some(product) => Ok(DecrementOutcome::Rejected(StockError::Insufficient {
                    requested: quantity,
                    available: product.stock,
                })),
            };
        };

        let mut tx = self.pool.begin().await?;

        if let Some(key) = idempotency_key {
            // A concurrent holder of the same key blocks this insert until it commits.
            let inserted = sqlx::query(
                r#"
                INSERT INTO inventory_decrements (idempotency_key, product_id, quantity)
                SELECT $1, $2, $3 WHERE EXISTS (SELECT 1 FROM products WHERE id = $2)
                ON CONFLICT (idempotency_key) DO NOTHING
                "#,
            )
            .bind(key)
            .bind(product_id.as_str())
            .bind(quantity_i32)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if inserted == 0 {
                let seen = sqlx::query(
                    "SELECT product_id, quantity FROM inventory_decrements WHERE idempotency_key = $1",
                )
                .bind(key)
                .fetch_optional(&mut *tx)
                .await?;

                let Some(seen) = seen else {
                    return Ok(DecrementOutcome::NotFound);
                };
                let seen_product: String = seen.try_get("product_id")?;
                let seen_quantity: i32 = seen.try_get("quantity")?;
                if seen_product != product_id.as_str() || seen_quantity != quantity_i32 {
                    return Err(StoreError::Conflict(format!(
                        "idempotency key {key} was used for a different decrement"
                    )));
                }

                let product = self.get_product(product_id).await?.ok_or_else(|| {
                    StoreError::NotFound {
                        entity: "product",
                        id: product_id.to_string(),
                    }
                })?;
                return Ok(DecrementOutcome::Replayed(product));
            }
        }

        let row = sqlx::query(&format!(
            r#"
            UPDATE products SET
                stock = stock - $2,
                availability_status = CASE
                    WHEN stock - $2 = 0 THEN $4
                    WHEN stock - $2 <= $3 THEN $5
                    ELSE $6
                END,
                updated_at = NOW()
            WHERE id = $1 AND stock >= $2
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product_id.as_str())
        .bind(quantity_i32)
        .bind(to_i32(LOW_STOCK_THRESHOLD, "threshold")?)
        .bind(AvailabilityStatus::OutOfStock.as_str())
        .bind(AvailabilityStatus::LowStock.as_str())
        .bind(AvailabilityStatus::Available.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(row) = row {
            let product = Self::row_to_product(row)?;
            tx.commit().await?;
            return Ok(DecrementOutcome::Applied(product));
        }

        // Nothing updated: roll back the key so a later attempt can succeed.
        tx.rollback().await?;

        match self.get_product(product_id).await? {
            None => Ok(DecrementOutcome::NotFound),
            Some(product) => Ok(DecrementOutcome::Rejected(StockError::Insufficient {
                requested: quantity,
                available: product.stock,
            })),
        }
    }
}

//! Item master data and the stock-increment update flow

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::config::InventoryConfig;
use crate::error::{AppError, AppResult};
use crate::models::{
    increment_quantity, AdjustmentStatus, AdjustmentType, InventoryError, ItemType,
    PackageGeometry, PaginatedResponse, Pagination, StockIncrement, Unit, INITIAL_STOCK_REASON,
    STOCK_INCREMENT_REASON,
};
use crate::services::inventory::{
    insert_adjustment, load_or_create_stock, process_adjustment, InventoryAdjustment,
    NewAdjustment,
};
use crate::validation;

/// Item service for master data and stock receipts
#[derive(Clone)]
pub struct ItemService {
    db: PgPool,
    settings: InventoryConfig,
}

/// Stocked product
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub sku: Option<String>,
    #[sqlx(try_from = "String")]
    pub item_type: ItemType,
    #[sqlx(try_from = "String")]
    pub base_unit: Unit,
    pub package_unit: Option<String>,
    pub weight_per_package: Option<Decimal>,
    pub units_per_package: Option<i32>,
    pub selling_price_per_unit: Decimal,
    pub purchase_price_per_package: Decimal,
    /// Derived from the package price and geometry, not stored
    #[sqlx(skip)]
    pub purchase_price_per_unit: Decimal,
    pub minimum_stock: Decimal,
    pub total_quantity: Decimal,
    pub expiry_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub fn geometry(&self) -> Result<PackageGeometry, InventoryError> {
        PackageGeometry::new(
            self.item_type,
            self.weight_per_package,
            self.units_per_package,
        )
    }

    pub fn is_low_stock(&self) -> bool {
        self.total_quantity <= self.minimum_stock
    }

    fn with_derived(mut self) -> Self {
        if let Ok(geometry) = self.geometry() {
            self.purchase_price_per_unit =
                geometry.purchase_price_per_unit(self.purchase_price_per_package);
        }
        self
    }
}

const ITEM_COLUMNS: &str = "id, name, sku, item_type, base_unit, package_unit, \
    weight_per_package, units_per_package, selling_price_per_unit, \
    purchase_price_per_package, minimum_stock, total_quantity, expiry_date, \
    created_at, updated_at";

/// Input for creating an item
#[derive(Debug, Deserialize, Validate)]
pub struct CreateItemInput {
    #[validate(length(min = 1, max = 200), custom = "validation::required_text")]
    pub name: String,
    #[validate(custom = "validation::sku")]
    pub sku: Option<String>,
    pub item_type: ItemType,
    pub base_unit: Unit,
    #[validate(length(max = 50))]
    pub package_unit: Option<String>,
    #[validate(custom = "validation::non_negative")]
    pub weight_per_package: Option<Decimal>,
    pub units_per_package: Option<i32>,
    #[validate(custom = "validation::non_negative")]
    pub selling_price_per_unit: Decimal,
    #[validate(custom = "validation::non_negative")]
    pub purchase_price_per_package: Decimal,
    #[validate(custom = "validation::non_negative")]
    pub minimum_stock: Option<Decimal>,
    /// Opening stock in base units
    #[validate(custom = "validation::non_negative")]
    pub total_quantity: Option<Decimal>,
    pub expiry_date: Option<NaiveDate>,
}

/// Input for the item update endpoint: stock increments plus replaced fields
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateItemInput {
    #[validate(custom = "validation::non_negative")]
    pub increment_initial_packages: Option<Decimal>,
    #[validate(custom = "validation::non_negative")]
    pub increment_total_weight: Option<Decimal>,
    #[validate(custom = "validation::non_negative")]
    pub increment_total_units: Option<Decimal>,
    #[validate(custom = "validation::non_negative")]
    pub minimum_stock: Option<Decimal>,
    pub expiry_date: Option<NaiveDate>,
}

impl UpdateItemInput {
    fn increment(&self) -> StockIncrement {
        StockIncrement {
            packages: self.increment_initial_packages,
            total_weight: self.increment_total_weight,
            total_units: self.increment_total_units,
        }
    }
}

/// Result of the item update endpoint
#[derive(Debug, Serialize)]
pub struct ItemUpdateResult {
    pub item: Item,
    pub adjustment: Option<InventoryAdjustment>,
}

/// Free-text filter for item listings
#[derive(Debug, Default, Deserialize)]
pub struct ItemSearch {
    pub search: Option<String>,
}

/// Fetch an item without locking it
pub(crate) async fn fetch_item(conn: &mut PgConnection, item_id: Uuid) -> AppResult<Item> {
    let item = sqlx::query_as::<_, Item>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"
    ))
    .bind(item_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

    Ok(item.with_derived())
}

/// Fetch an item and hold its row lock until the transaction ends
pub(crate) async fn lock_item(conn: &mut PgConnection, item_id: Uuid) -> AppResult<Item> {
    let item = sqlx::query_as::<_, Item>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1 FOR UPDATE"
    ))
    .bind(item_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

    Ok(item.with_derived())
}

/// Lock several items at once, in id order so concurrent callers cannot deadlock
pub(crate) async fn lock_items(conn: &mut PgConnection, item_ids: &[Uuid]) -> AppResult<Vec<Item>> {
    let items = sqlx::query_as::<_, Item>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE id = ANY($1) ORDER BY id FOR UPDATE"
    ))
    .bind(item_ids)
    .fetch_all(&mut *conn)
    .await?;

    Ok(items.into_iter().map(Item::with_derived).collect())
}

/// Overwrite an item's current stock figure
pub(crate) async fn set_total_quantity(
    conn: &mut PgConnection,
    item_id: Uuid,
    total_quantity: Decimal,
) -> AppResult<Item> {
    let item = sqlx::query_as::<_, Item>(&format!(
        "UPDATE items SET total_quantity = $1, updated_at = NOW() WHERE id = $2 \
         RETURNING {ITEM_COLUMNS}"
    ))
    .bind(total_quantity)
    .bind(item_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

    Ok(item.with_derived())
}

impl ItemService {
    /// Create a new ItemService instance
    pub fn new(db: PgPool, settings: InventoryConfig) -> Self {
        Self { db, settings }
    }

    /// Create an item and seed its package stock from the opening quantity
    pub async fn create_item(&self, input: CreateItemInput) -> AppResult<Item> {
        input.validate()?;
        let geometry = PackageGeometry::new(
            input.item_type,
            input.weight_per_package,
            input.units_per_package,
        )?;
        let opening = input.total_quantity.unwrap_or(Decimal::ZERO);

        let mut tx = self.db.begin().await?;

        let item = sqlx::query_as::<_, Item>(&format!(
            r#"
            INSERT INTO items (
                name, sku, item_type, base_unit, package_unit, weight_per_package,
                units_per_package, selling_price_per_unit, purchase_price_per_package,
                minimum_stock, total_quantity, expiry_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(input.name.trim())
        .bind(&input.sku)
        .bind(geometry.item_type().as_str())
        .bind(input.base_unit.as_str())
        .bind(&input.package_unit)
        .bind(geometry.weight_per_package())
        .bind(geometry.units_per_package())
        .bind(input.selling_price_per_unit)
        .bind(input.purchase_price_per_package)
        .bind(input.minimum_stock.unwrap_or(Decimal::ZERO))
        .bind(opening)
        .bind(input.expiry_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::DuplicateEntry("sku".to_string())
            }
            other => AppError::DatabaseError(other),
        })?
        .with_derived();

        if opening > Decimal::ZERO {
            let adjustment = insert_adjustment(
                &mut tx,
                NewAdjustment {
                    item_id: item.id,
                    quantity: opening,
                    adjustment_type: AdjustmentType::Addition,
                    reason: INITIAL_STOCK_REASON.to_string(),
                    status: AdjustmentStatus::Completed,
                },
            )
            .await?;
            process_adjustment(&mut tx, &item, &adjustment, self.settings.valuation_basis).await?;
        } else {
            load_or_create_stock(&mut tx, item.id).await?;
        }

        tx.commit().await?;

        tracing::info!(item_id = %item.id, name = %item.name, %opening, "Item created");
        Ok(item)
    }

    /// Get a single item
    pub async fn get_item(&self, item_id: Uuid) -> AppResult<Item> {
        let mut conn = self.db.acquire().await?;
        fetch_item(&mut conn, item_id).await
    }

    /// List items, optionally filtered by name or SKU
    pub async fn list_items(
        &self,
        pagination: &Pagination,
        search: &ItemSearch,
    ) -> AppResult<PaginatedResponse<Item>> {
        let pattern = search
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM items WHERE ($1::text IS NULL OR name ILIKE $1 OR sku ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.db)
        .await?;

        let items = sqlx::query_as::<_, Item>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM items
            WHERE ($1::text IS NULL OR name ILIKE $1 OR sku ILIKE $1)
            ORDER BY name ASC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(&pattern)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(
            items.into_iter().map(Item::with_derived).collect(),
            pagination,
            total.max(0) as u64,
        ))
    }

    /// Items at or below their minimum stock
    pub async fn list_low_stock(&self) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM items
            WHERE total_quantity <= minimum_stock
            ORDER BY (total_quantity - minimum_stock) ASC, name ASC
            "#
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(items.into_iter().map(Item::with_derived).collect())
    }

    /// Receive stock and replace threshold/expiry.
    ///
    /// A non-zero increment records an `addition` adjustment, syncs the package
    /// stock from it and adds the same quantity to `total_quantity`, all in
    /// one transaction.
    pub async fn update_item(
        &self,
        item_id: Uuid,
        input: UpdateItemInput,
    ) -> AppResult<ItemUpdateResult> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        let mut item = lock_item(&mut tx, item_id).await?;
        let geometry = item.geometry()?;

        let mut adjustment = None;
        if let Some(quantity) = increment_quantity(&geometry, &input.increment())? {
            let created = insert_adjustment(
                &mut tx,
                NewAdjustment {
                    item_id,
                    quantity,
                    adjustment_type: AdjustmentType::Addition,
                    reason: STOCK_INCREMENT_REASON.to_string(),
                    status: AdjustmentStatus::Completed,
                },
            )
            .await?;
            process_adjustment(&mut tx, &item, &created, self.settings.valuation_basis).await?;
            let total = item
                .total_quantity
                .checked_add(quantity)
                .ok_or(InventoryError::QuantityOutOfRange(quantity))?;
            item = set_total_quantity(&mut tx, item_id, total).await?;

            tracing::info!(
                item_id = %item_id,
                adjustment_id = %created.id,
                %quantity,
                total_quantity = %item.total_quantity,
                "Stock received"
            );
            adjustment = Some(created);
        }

        if input.minimum_stock.is_some() || input.expiry_date.is_some() {
            item = sqlx::query_as::<_, Item>(&format!(
                r#"
                UPDATE items
                SET minimum_stock = COALESCE($1, minimum_stock),
                    expiry_date = COALESCE($2, expiry_date),
                    updated_at = NOW()
                WHERE id = $3
                RETURNING {ITEM_COLUMNS}
                "#
            ))
            .bind(input.minimum_stock)
            .bind(input.expiry_date)
            .bind(item_id)
            .fetch_one(&mut *tx)
            .await?
            .with_derived();
        }

        tx.commit().await?;

        Ok(ItemUpdateResult { item, adjustment })
    }

    /// Delete an item with its stock, adjustments and losses.
    ///
    /// Items that appear on a sale cannot be deleted.
    pub async fn delete_item(&self, item_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        lock_item(&mut tx, item_id).await?;

        let sold = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM sale_items WHERE item_id = $1)",
        )
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await?;

        if sold {
            return Err(AppError::Conflict {
                resource: "item".to_string(),
                message: "Item is referenced by recorded sales".to_string(),
            });
        }

        sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(item_id = %item_id, "Item deleted");
        Ok(())
    }
}

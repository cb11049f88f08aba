//! Package stock synchronization and the adjustment ledger

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::config::InventoryConfig;
use crate::error::{AppError, AppResult};
use crate::models::{
    apply_adjustment, correction_quantity, reverse_adjustment, stock_value,
    validate_full_packages, AdjustmentStatus, AdjustmentType, PackageGeometry,
    PaginatedResponse, Pagination, StockLevel, ValuationBasis, STOCK_CORRECTION_REASON,
};
use crate::services::items::{fetch_item, lock_item, set_total_quantity, Item};
use crate::validation;

/// Inventory service for package stock and adjustments
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
    settings: InventoryConfig,
}

/// Per-item stock expressed in packages
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InventoryStock {
    pub id: Uuid,
    pub item_id: Uuid,
    pub full_packages: i64,
    pub partial_quantity: Decimal,
    pub stock_value: Decimal,
    pub last_adjustment_id: Option<Uuid>,
    pub last_updated: DateTime<Utc>,
}

impl InventoryStock {
    pub fn level(&self) -> StockLevel {
        StockLevel::new(self.full_packages, self.partial_quantity)
    }
}

/// Stock record together with both quantity figures
#[derive(Debug, Serialize)]
pub struct InventoryStockView {
    #[serde(flatten)]
    pub stock: InventoryStock,
    /// Total derived from packages and partial quantity
    pub total_quantity: Decimal,
    /// `Item.total_quantity` at read time
    pub item_total_quantity: Decimal,
    pub in_sync: bool,
}

/// Recorded quantity change
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InventoryAdjustment {
    pub id: Uuid,
    pub item_id: Uuid,
    pub quantity: Decimal,
    #[sqlx(try_from = "String")]
    pub adjustment_type: AdjustmentType,
    pub reason: String,
    #[sqlx(try_from = "String")]
    pub status: AdjustmentStatus,
    pub created_at: DateTime<Utc>,
}

/// Adjustment populated with its item
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AdjustmentWithItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub adjustment: InventoryAdjustment,
    pub item_name: String,
    pub item_base_unit: String,
}

/// Adjustment about to be written
#[derive(Debug, Clone)]
pub struct NewAdjustment {
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub adjustment_type: AdjustmentType,
    pub reason: String,
    pub status: AdjustmentStatus,
}

/// Input for a manual adjustment
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAdjustmentInput {
    pub item_id: Uuid,
    #[validate(custom = "validation::non_negative")]
    pub quantity: Decimal,
    pub adjustment_type: AdjustmentType,
    #[validate(length(max = 500), custom = "validation::required_text")]
    pub reason: String,
    pub status: Option<AdjustmentStatus>,
}

/// Input for a direct stock edit
#[derive(Debug, Deserialize, Validate)]
pub struct CorrectStockInput {
    pub full_packages: i64,
    #[validate(custom = "validation::non_negative")]
    pub total_quantity: Option<Decimal>,
}

/// Filter for adjustment listings
#[derive(Debug, Default, Deserialize)]
pub struct AdjustmentFilter {
    pub item_id: Option<Uuid>,
}

/// Query for the stock lookup
#[derive(Debug, Deserialize)]
pub struct StockQuery {
    pub item_id: Uuid,
}

/// Result of a manual adjustment
#[derive(Debug, Serialize)]
pub struct AdjustmentOutcome {
    pub adjustment: InventoryAdjustment,
    pub stock: InventoryStock,
    pub item_total_quantity: Decimal,
}

/// Result of deleting an adjustment
#[derive(Debug, Serialize)]
pub struct AdjustmentReversal {
    pub adjustment_id: Uuid,
    pub item_id: Uuid,
    pub reversed_quantity: Decimal,
    pub item_total_quantity: Decimal,
}

const STOCK_COLUMNS: &str =
    "id, item_id, full_packages, partial_quantity, stock_value, last_adjustment_id, last_updated";

const ADJUSTMENT_COLUMNS: &str =
    "a.id, a.item_id, a.quantity, a.adjustment_type, a.reason, a.status, a.created_at";

fn valuation_price(item: &Item, geometry: &PackageGeometry, basis: ValuationBasis) -> Decimal {
    match basis {
        ValuationBasis::SellingPrice => item.selling_price_per_unit,
        ValuationBasis::PurchasePrice => {
            geometry.purchase_price_per_unit(item.purchase_price_per_package)
        }
    }
}

/// Write an adjustment record
pub(crate) async fn insert_adjustment(
    conn: &mut PgConnection,
    new: NewAdjustment,
) -> AppResult<InventoryAdjustment> {
    let adjustment = sqlx::query_as::<_, InventoryAdjustment>(
        r#"
        INSERT INTO inventory_adjustments (item_id, quantity, adjustment_type, reason, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, item_id, quantity, adjustment_type, reason, status, created_at
        "#,
    )
    .bind(new.item_id)
    .bind(new.quantity.abs())
    .bind(new.adjustment_type.as_str())
    .bind(new.reason.trim())
    .bind(new.status.as_str())
    .fetch_one(&mut *conn)
    .await?;

    Ok(adjustment)
}

/// Load the stock record for an item, creating an empty one if missing.
///
/// The row stays locked until the surrounding transaction ends.
pub(crate) async fn load_or_create_stock(
    conn: &mut PgConnection,
    item_id: Uuid,
) -> AppResult<InventoryStock> {
    sqlx::query("INSERT INTO inventory_stock (item_id) VALUES ($1) ON CONFLICT (item_id) DO NOTHING")
        .bind(item_id)
        .execute(&mut *conn)
        .await?;

    let stock = sqlx::query_as::<_, InventoryStock>(&format!(
        "SELECT {STOCK_COLUMNS} FROM inventory_stock WHERE item_id = $1 FOR UPDATE"
    ))
    .bind(item_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(stock)
}

/// Persist a stock level and refresh its value.
///
/// `last_adjustment_id` is kept unchanged when `None` is passed.
async fn save_stock(
    conn: &mut PgConnection,
    item: &Item,
    geometry: &PackageGeometry,
    level: StockLevel,
    last_adjustment_id: Option<Uuid>,
    basis: ValuationBasis,
) -> AppResult<InventoryStock> {
    let value = stock_value(
        level.total_quantity(geometry)?,
        valuation_price(item, geometry, basis),
    )?;

    let stock = sqlx::query_as::<_, InventoryStock>(&format!(
        r#"
        INSERT INTO inventory_stock (item_id, full_packages, partial_quantity, stock_value, last_adjustment_id)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (item_id) DO UPDATE
        SET full_packages = EXCLUDED.full_packages,
            partial_quantity = EXCLUDED.partial_quantity,
            stock_value = EXCLUDED.stock_value,
            last_adjustment_id = COALESCE(EXCLUDED.last_adjustment_id, inventory_stock.last_adjustment_id),
            last_updated = NOW()
        RETURNING {STOCK_COLUMNS}
        "#
    ))
    .bind(item.id)
    .bind(level.full_packages)
    .bind(level.partial_quantity)
    .bind(value)
    .bind(last_adjustment_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(stock)
}

/// Apply an adjustment to the item's package stock.
///
/// Only `InventoryStock` changes here; callers move `Item.total_quantity`
/// themselves inside the same transaction.
pub(crate) async fn process_adjustment(
    conn: &mut PgConnection,
    item: &Item,
    adjustment: &InventoryAdjustment,
    basis: ValuationBasis,
) -> AppResult<InventoryStock> {
    let geometry = item.geometry()?;
    let current = load_or_create_stock(&mut *conn, item.id).await?;
    let factor = adjustment.adjustment_type.signed_quantity(adjustment.quantity);
    let level = current.level().adjusted_by(factor, &geometry)?;

    tracing::debug!(
        item_id = %item.id,
        adjustment_id = %adjustment.id,
        %factor,
        full_packages = level.full_packages,
        partial_quantity = %level.partial_quantity,
        "Package stock adjusted"
    );

    save_stock(conn, item, &geometry, level, Some(adjustment.id), basis).await
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool, settings: InventoryConfig) -> Self {
        Self { db, settings }
    }

    /// Get the stock record for an item
    pub async fn get_stock(&self, item_id: Uuid) -> AppResult<InventoryStockView> {
        let mut conn = self.db.acquire().await?;
        let item = fetch_item(&mut conn, item_id).await?;

        let stock = sqlx::query_as::<_, InventoryStock>(&format!(
            "SELECT {STOCK_COLUMNS} FROM inventory_stock WHERE item_id = $1"
        ))
        .bind(item_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory stock".to_string()))?;

        let total_quantity = stock.level().total_quantity(&item.geometry()?)?;
        Ok(InventoryStockView {
            in_sync: total_quantity == item.total_quantity,
            item_total_quantity: item.total_quantity,
            total_quantity,
            stock,
        })
    }

    /// Set the package count from a physical count.
    ///
    /// Records a `correction` adjustment; `Item.total_quantity` is left as is.
    pub async fn correct_stock(
        &self,
        item_id: Uuid,
        input: CorrectStockInput,
    ) -> AppResult<InventoryStock> {
        input.validate()?;
        validate_full_packages(input.full_packages)
            .map_err(|msg| AppError::validation("full_packages", msg))?;

        let mut tx = self.db.begin().await?;
        let item = lock_item(&mut tx, item_id).await?;
        let geometry = item.geometry()?;
        let current = load_or_create_stock(&mut tx, item_id).await?;

        let adjustment = insert_adjustment(
            &mut tx,
            NewAdjustment {
                item_id,
                quantity: correction_quantity(&geometry, input.full_packages, input.total_quantity)?,
                adjustment_type: AdjustmentType::Correction,
                reason: STOCK_CORRECTION_REASON.to_string(),
                status: AdjustmentStatus::Completed,
            },
        )
        .await?;

        let level = StockLevel::new(input.full_packages, current.partial_quantity);
        let stock = save_stock(
            &mut tx,
            &item,
            &geometry,
            level,
            Some(adjustment.id),
            self.settings.valuation_basis,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            item_id = %item_id,
            adjustment_id = %adjustment.id,
            previous = current.full_packages,
            full_packages = input.full_packages,
            "Stock corrected"
        );
        Ok(stock)
    }

    /// Re-derive the package stock from `Item.total_quantity`
    pub async fn reconcile_stock(&self, item_id: Uuid) -> AppResult<InventoryStock> {
        let mut tx = self.db.begin().await?;
        let item = lock_item(&mut tx, item_id).await?;
        let geometry = item.geometry()?;
        let current = load_or_create_stock(&mut tx, item_id).await?;

        let level = StockLevel::from_total(item.total_quantity, &geometry)?;
        let stock = save_stock(
            &mut tx,
            &item,
            &geometry,
            level,
            None,
            self.settings.valuation_basis,
        )
        .await?;

        tx.commit().await?;

        if current.level() != level {
            tracing::warn!(
                item_id = %item_id,
                was_full_packages = current.full_packages,
                was_partial = %current.partial_quantity,
                full_packages = level.full_packages,
                partial_quantity = %level.partial_quantity,
                "Package stock drifted from item quantity, reconciled"
            );
        }
        Ok(stock)
    }

    /// Record a manual adjustment, sync package stock and move the item total
    pub async fn create_adjustment(
        &self,
        input: CreateAdjustmentInput,
    ) -> AppResult<AdjustmentOutcome> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        let item = lock_item(&mut tx, input.item_id).await?;

        let adjustment = insert_adjustment(
            &mut tx,
            NewAdjustment {
                item_id: item.id,
                quantity: input.quantity,
                adjustment_type: input.adjustment_type,
                reason: input.reason,
                status: input.status.unwrap_or_default(),
            },
        )
        .await?;
        let stock =
            process_adjustment(&mut tx, &item, &adjustment, self.settings.valuation_basis).await?;

        let total = apply_adjustment(
            item.total_quantity,
            adjustment.adjustment_type,
            adjustment.quantity,
        );
        let item = set_total_quantity(&mut tx, item.id, total).await?;

        tx.commit().await?;

        tracing::info!(
            item_id = %item.id,
            adjustment_id = %adjustment.id,
            adjustment_type = %adjustment.adjustment_type,
            quantity = %adjustment.quantity,
            total_quantity = %item.total_quantity,
            "Adjustment applied"
        );
        Ok(AdjustmentOutcome {
            adjustment,
            stock,
            item_total_quantity: item.total_quantity,
        })
    }

    /// List adjustments, newest first, populated with their item
    pub async fn list_adjustments(
        &self,
        filter: &AdjustmentFilter,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<AdjustmentWithItem>> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM inventory_adjustments WHERE ($1::uuid IS NULL OR item_id = $1)",
        )
        .bind(filter.item_id)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, AdjustmentWithItem>(&format!(
            r#"
            SELECT {ADJUSTMENT_COLUMNS}, i.name AS item_name, i.base_unit AS item_base_unit
            FROM inventory_adjustments a
            JOIN items i ON i.id = a.item_id
            WHERE ($1::uuid IS NULL OR a.item_id = $1)
            ORDER BY a.created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(filter.item_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(rows, pagination, total.max(0) as u64))
    }

    /// Get one adjustment populated with its item
    pub async fn get_adjustment(&self, adjustment_id: Uuid) -> AppResult<AdjustmentWithItem> {
        let row = sqlx::query_as::<_, AdjustmentWithItem>(&format!(
            r#"
            SELECT {ADJUSTMENT_COLUMNS}, i.name AS item_name, i.base_unit AS item_base_unit
            FROM inventory_adjustments a
            JOIN items i ON i.id = a.item_id
            WHERE a.id = $1
            "#
        ))
        .bind(adjustment_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory adjustment".to_string()))?;

        Ok(row)
    }

    /// Delete an adjustment and undo its effect on `Item.total_quantity`.
    ///
    /// Additions and deductions are reversed (floored at zero); other kinds
    /// leave the total alone. Package stock is not touched.
    pub async fn delete_adjustment(&self, adjustment_id: Uuid) -> AppResult<AdjustmentReversal> {
        let mut tx = self.db.begin().await?;

        let adjustment = sqlx::query_as::<_, InventoryAdjustment>(
            r#"
            SELECT id, item_id, quantity, adjustment_type, reason, status, created_at
            FROM inventory_adjustments
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(adjustment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory adjustment".to_string()))?;

        let item = lock_item(&mut tx, adjustment.item_id).await?;

        let (reversed_quantity, item_total_quantity) = match reverse_adjustment(
            item.total_quantity,
            adjustment.adjustment_type,
            adjustment.quantity,
        ) {
            Some(total) => {
                let updated = set_total_quantity(&mut tx, item.id, total).await?;
                (
                    updated.total_quantity - item.total_quantity,
                    updated.total_quantity,
                )
            }
            None => (Decimal::ZERO, item.total_quantity),
        };

        sqlx::query("DELETE FROM inventory_adjustments WHERE id = $1")
            .bind(adjustment_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            adjustment_id = %adjustment_id,
            item_id = %item.id,
            adjustment_type = %adjustment.adjustment_type,
            %reversed_quantity,
            total_quantity = %item_total_quantity,
            "Adjustment deleted"
        );
        Ok(AdjustmentReversal {
            adjustment_id,
            item_id: item.id,
            reversed_quantity,
            item_total_quantity,
        })
    }
}

//! Item loss recording: shrinkage, damage and theft deducted from stock

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    plan_loss_deduction, restore_loss, total_loss_value, LossReason, PaginatedResponse,
    Pagination, Unit,
};
use crate::services::items::{lock_item, set_total_quantity};
use crate::validation;

/// Loss service for recording and reversing stock losses
#[derive(Clone)]
pub struct LossService {
    db: PgPool,
}

/// Recorded loss
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ItemLoss {
    pub id: Uuid,
    pub item_id: Uuid,
    pub quantity_lost: Decimal,
    #[sqlx(try_from = "String")]
    pub unit_of_measure: Unit,
    /// `quantity_lost` in the item's base unit, as deducted
    pub base_quantity: Decimal,
    #[sqlx(try_from = "String")]
    pub loss_reason: LossReason,
    pub loss_description: Option<String>,
    pub estimated_cost: Decimal,
    pub total_loss_value: Decimal,
    pub reported_by: Option<String>,
    pub location: Option<String>,
    pub batch_number: Option<String>,
    pub loss_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a loss
#[derive(Debug, Deserialize, Validate)]
pub struct RecordLossInput {
    pub item_id: Uuid,
    #[validate(custom = "validation::positive_quantity")]
    pub quantity_lost: Decimal,
    /// Defaults to the item's base unit
    pub unit_of_measure: Option<Unit>,
    pub loss_reason: LossReason,
    #[validate(length(max = 1000))]
    pub loss_description: Option<String>,
    #[validate(custom = "validation::non_negative")]
    pub estimated_cost: Decimal,
    #[validate(length(max = 100))]
    pub reported_by: Option<String>,
    #[validate(length(max = 100))]
    pub location: Option<String>,
    #[validate(length(max = 64))]
    pub batch_number: Option<String>,
    pub loss_date: Option<NaiveDate>,
}

/// Filter for loss listings
#[derive(Debug, Default, Deserialize)]
pub struct LossFilter {
    pub item_id: Option<Uuid>,
    pub loss_reason: Option<LossReason>,
}

/// Result of deleting a loss
#[derive(Debug, Serialize)]
pub struct LossReversal {
    pub loss_id: Uuid,
    pub item_id: Uuid,
    pub restored_quantity: Decimal,
    pub item_total_quantity: Decimal,
}

const LOSS_COLUMNS: &str = "id, item_id, quantity_lost, unit_of_measure, base_quantity, \
    loss_reason, loss_description, estimated_cost, total_loss_value, reported_by, \
    location, batch_number, loss_date, created_at";

impl LossService {
    /// Create a new LossService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a loss and deduct it from the item's stock.
    ///
    /// The quantity is converted into the item's base unit first; a loss larger
    /// than the stock on hand is rejected before anything is written.
    pub async fn record_loss(&self, input: RecordLossInput) -> AppResult<ItemLoss> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        let item = lock_item(&mut tx, input.item_id).await?;
        let geometry = item.geometry()?;
        let unit = input.unit_of_measure.unwrap_or(item.base_unit);

        let deduction = plan_loss_deduction(
            &item.name,
            item.total_quantity,
            input.quantity_lost,
            unit,
            item.base_unit,
            &geometry,
        )?;

        let loss = sqlx::query_as::<_, ItemLoss>(&format!(
            r#"
            INSERT INTO item_losses (
                item_id, quantity_lost, unit_of_measure, base_quantity, loss_reason,
                loss_description, estimated_cost, total_loss_value, reported_by,
                location, batch_number, loss_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {LOSS_COLUMNS}
            "#
        ))
        .bind(item.id)
        .bind(input.quantity_lost)
        .bind(unit.as_str())
        .bind(deduction.base_quantity)
        .bind(input.loss_reason.as_str())
        .bind(&input.loss_description)
        .bind(input.estimated_cost)
        .bind(total_loss_value(input.quantity_lost, input.estimated_cost))
        .bind(&input.reported_by)
        .bind(&input.location)
        .bind(&input.batch_number)
        .bind(input.loss_date.unwrap_or_else(|| Utc::now().date_naive()))
        .fetch_one(&mut *tx)
        .await?;

        set_total_quantity(&mut tx, item.id, deduction.remaining).await?;

        tx.commit().await?;

        tracing::info!(
            loss_id = %loss.id,
            item_id = %item.id,
            reason = %loss.loss_reason,
            quantity_lost = %loss.quantity_lost,
            unit = %unit,
            base_quantity = %deduction.base_quantity,
            exact_conversion = deduction.exact_conversion,
            "Item loss recorded"
        );
        Ok(loss)
    }

    /// List losses, newest first
    pub async fn list_losses(
        &self,
        filter: &LossFilter,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<ItemLoss>> {
        let reason = filter.loss_reason.map(|r| r.as_str());

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM item_losses
            WHERE ($1::uuid IS NULL OR item_id = $1)
              AND ($2::text IS NULL OR loss_reason = $2)
            "#,
        )
        .bind(filter.item_id)
        .bind(reason)
        .fetch_one(&self.db)
        .await?;

        let losses = sqlx::query_as::<_, ItemLoss>(&format!(
            r#"
            SELECT {LOSS_COLUMNS}
            FROM item_losses
            WHERE ($1::uuid IS NULL OR item_id = $1)
              AND ($2::text IS NULL OR loss_reason = $2)
            ORDER BY loss_date DESC, created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(filter.item_id)
        .bind(reason)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(losses, pagination, total.max(0) as u64))
    }

    /// Get a single loss
    pub async fn get_loss(&self, loss_id: Uuid) -> AppResult<ItemLoss> {
        sqlx::query_as::<_, ItemLoss>(&format!(
            "SELECT {LOSS_COLUMNS} FROM item_losses WHERE id = $1"
        ))
        .bind(loss_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Item loss".to_string()))
    }

    /// Delete a loss and put the deducted quantity back on the item
    pub async fn delete_loss(&self, loss_id: Uuid) -> AppResult<LossReversal> {
        let mut tx = self.db.begin().await?;

        let loss = sqlx::query_as::<_, ItemLoss>(&format!(
            "SELECT {LOSS_COLUMNS} FROM item_losses WHERE id = $1 FOR UPDATE"
        ))
        .bind(loss_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Item loss".to_string()))?;

        let item = lock_item(&mut tx, loss.item_id).await?;
        let restored = restore_loss(item.total_quantity, loss.base_quantity);
        let item = set_total_quantity(&mut tx, item.id, restored).await?;

        sqlx::query("DELETE FROM item_losses WHERE id = $1")
            .bind(loss_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            loss_id = %loss_id,
            item_id = %item.id,
            restored_quantity = %loss.base_quantity,
            total_quantity = %item.total_quantity,
            "Item loss reversed"
        );
        Ok(LossReversal {
            loss_id,
            item_id: item.id,
            restored_quantity: loss.base_quantity,
            item_total_quantity: item.total_quantity,
        })
    }
}

//! Sales and the stock they consume

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    check_sale_availability, consume_sale_lines, line_total, restore_sale_lines, AvailableStock,
    PaginatedResponse, Pagination, PaymentMethod, SaleLine,
};
use crate::services::items::{lock_items, set_total_quantity};
use crate::validation;

/// Sale service for recording and voiding sales
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
}

/// Sale header
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Sale {
    pub id: Uuid,
    pub customer_name: Option<String>,
    #[sqlx(try_from = "String")]
    pub payment_method: PaymentMethod,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Sold line item
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub item_id: Uuid,
    pub quantity_sold: Decimal,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Sale with its line items
#[derive(Debug, Serialize)]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// Input for one sale line
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SaleLineInput {
    pub item_id: Uuid,
    #[validate(custom = "validation::positive_quantity")]
    pub quantity_sold: Decimal,
    /// Defaults to the item's selling price
    #[validate(custom = "validation::non_negative")]
    pub unit_price: Option<Decimal>,
}

/// Input for recording a sale
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSaleInput {
    #[validate(length(max = 200))]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[validate(length(min = 1))]
    #[validate]
    pub items: Vec<SaleLineInput>,
}

const SALE_COLUMNS: &str = "id, customer_name, payment_method, total_amount, created_at";

const SALE_ITEM_COLUMNS: &str = "id, sale_id, item_id, quantity_sold, unit_price, line_total";

impl SaleService {
    /// Create a new SaleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a sale and take its quantities out of stock.
    ///
    /// Every referenced item is locked and checked before the sale is written,
    /// so a shortfall on any line rejects the whole sale.
    pub async fn create_sale(&self, input: CreateSaleInput) -> AppResult<SaleWithItems> {
        input.validate()?;

        let mut item_ids: Vec<Uuid> = input.items.iter().map(|l| l.item_id).collect();
        item_ids.sort_unstable();
        item_ids.dedup();

        let mut tx = self.db.begin().await?;
        let items: HashMap<Uuid, _> = lock_items(&mut tx, &item_ids)
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        let lines: Vec<SaleLine> = input
            .items
            .iter()
            .map(|l| SaleLine {
                item_id: l.item_id,
                quantity_sold: l.quantity_sold,
            })
            .collect();
        let available: HashMap<Uuid, AvailableStock> = items
            .values()
            .map(|item| {
                (
                    item.id,
                    AvailableStock {
                        name: item.name.clone(),
                        total_quantity: item.total_quantity,
                    },
                )
            })
            .collect();
        check_sale_availability(&lines, &available)?;

        let priced: Vec<(Uuid, Decimal, Decimal, Decimal)> = input
            .items
            .iter()
            .map(|l| {
                let unit_price = match (l.unit_price, items.get(&l.item_id)) {
                    (Some(price), _) => price,
                    (None, Some(item)) => item.selling_price_per_unit,
                    (None, None) => Decimal::ZERO,
                };
                (
                    l.item_id,
                    l.quantity_sold,
                    unit_price,
                    line_total(l.quantity_sold, unit_price),
                )
            })
            .collect();
        let total_amount: Decimal = priced.iter().map(|(_, _, _, total)| *total).sum();

        let sale = sqlx::query_as::<_, Sale>(&format!(
            r#"
            INSERT INTO sales (customer_name, payment_method, total_amount)
            VALUES ($1, $2, $3)
            RETURNING {SALE_COLUMNS}
            "#
        ))
        .bind(&input.customer_name)
        .bind(input.payment_method.as_str())
        .bind(total_amount)
        .fetch_one(&mut *tx)
        .await?;

        let mut sale_items = Vec::with_capacity(priced.len());
        for (item_id, quantity_sold, unit_price, total) in &priced {
            let line = sqlx::query_as::<_, SaleItem>(&format!(
                r#"
                INSERT INTO sale_items (sale_id, item_id, quantity_sold, unit_price, line_total)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING {SALE_ITEM_COLUMNS}
                "#
            ))
            .bind(sale.id)
            .bind(item_id)
            .bind(quantity_sold)
            .bind(unit_price)
            .bind(total)
            .fetch_one(&mut *tx)
            .await?;
            sale_items.push(line);
        }

        let mut remaining: HashMap<Uuid, Decimal> = items
            .values()
            .map(|item| (item.id, item.total_quantity))
            .collect();
        consume_sale_lines(&mut remaining, &lines)?;
        for (item_id, total) in remaining {
            let item = set_total_quantity(&mut tx, item_id, total).await?;
            if item.is_low_stock() {
                tracing::warn!(
                    item_id = %item.id,
                    name = %item.name,
                    total_quantity = %item.total_quantity,
                    minimum_stock = %item.minimum_stock,
                    "Item at or below minimum stock"
                );
            }
        }

        tx.commit().await?;

        tracing::info!(
            sale_id = %sale.id,
            lines = sale_items.len(),
            total_amount = %sale.total_amount,
            "Sale recorded"
        );
        Ok(SaleWithItems {
            sale,
            items: sale_items,
        })
    }

    /// List sales, newest first
    pub async fn list_sales(&self, pagination: &Pagination) -> AppResult<PaginatedResponse<Sale>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.db)
            .await?;

        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(sales, pagination, total.max(0) as u64))
    }

    /// Get a sale with its line items
    pub async fn get_sale(&self, sale_id: Uuid) -> AppResult<SaleWithItems> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = $1"
        ))
        .bind(sale_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {SALE_ITEM_COLUMNS} FROM sale_items WHERE sale_id = $1 ORDER BY id"
        ))
        .bind(sale_id)
        .fetch_all(&self.db)
        .await?;

        Ok(SaleWithItems { sale, items })
    }

    /// Delete a sale and put every sold quantity back on its item
    pub async fn delete_sale(&self, sale_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM sales WHERE id = $1 FOR UPDATE")
            .bind(sale_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound("Sale".to_string()));
        }

        let lines = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {SALE_ITEM_COLUMNS} FROM sale_items WHERE sale_id = $1"
        ))
        .bind(sale_id)
        .fetch_all(&mut *tx)
        .await?;

        let mut item_ids: Vec<Uuid> = lines.iter().map(|l| l.item_id).collect();
        item_ids.sort_unstable();
        item_ids.dedup();

        let mut restored: HashMap<Uuid, Decimal> = lock_items(&mut tx, &item_ids)
            .await?
            .into_iter()
            .map(|item| (item.id, item.total_quantity))
            .collect();
        let sold: Vec<SaleLine> = lines
            .iter()
            .map(|l| SaleLine {
                item_id: l.item_id,
                quantity_sold: l.quantity_sold,
            })
            .collect();
        restore_sale_lines(&mut restored, &sold)?;
        for (item_id, total) in restored {
            set_total_quantity(&mut tx, item_id, total).await?;
        }

        sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(sale_id = %sale_id, lines = lines.len(), "Sale deleted, stock restored");
        Ok(())
    }
}

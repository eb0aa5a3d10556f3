//! Postgres store for listings.
//!
//! One transaction per page: every record of the page commits or none do.
//! Each upsert forces `downstream_synced` back to FALSE so the separate
//! downstream consumer picks the row up again — on updates this holds even
//! when the incoming values are unchanged.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::listing::ListingRecord;
use crate::sync::ports::{ListingStore, StoreError};

const UPSERT_LISTING: &str = r#"
INSERT INTO listings (codpro, payload, status, source_updated_at, downstream_synced)
VALUES ($1, $2, $3, $4, FALSE)
ON CONFLICT (codpro)
DO UPDATE SET
    payload = EXCLUDED.payload,
    status = EXCLUDED.status,
    source_updated_at = EXCLUDED.source_updated_at,
    downstream_synced = FALSE
"#;

/// `ListingStore` backed by the `listings` table (see `schema.sql`).
pub struct PgListingStore {
    pool: PgPool,
}

impl PgListingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingStore for PgListingStore {
    async fn upsert_page(&self, records: &[ListingRecord]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        // Dropping an uncommitted transaction rolls it back, so any failure
        // below leaves the page entirely unwritten.
        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query(UPSERT_LISTING)
                .bind(&record.codpro)
                .bind(&record.payload)
                .bind(&record.status)
                .bind(record.updated_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!(count = records.len(), "listings upserted");
        Ok(())
    }
}

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::admin_intake::dtos::{
    AttachmentDto, IntakeDetailDto, IntakeListItemDto, IntakeListQuery, IntakeSummaryDto,
    StatusCountDto, UpdateIntakeStatusDto,
};
use crate::features::intake::models::{IntakeResponse, IntakeStatus};
use crate::modules::storage::ObjectStorage;
use crate::shared::text::{contains_ignore_case, jst_date, normalize_optional};

struct IntakeCache {
    items: Arc<Vec<IntakeResponse>>,
    last_fetched: Instant,
}

/// Apply the list filters to submissions ordered newest first
pub fn filter_intakes<'a>(
    items: &'a [IntakeResponse],
    query: &IntakeListQuery,
) -> Vec<&'a IntakeResponse> {
    let needle = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

    items
        .iter()
        .filter(|r| query.status.is_none() || query.status == Some(r.status))
        .filter(|r| query.request_type.is_none() || query.request_type == Some(r.request_type))
        .filter(|r| {
            let day = jst_date(r.created_at);
            query.from.map_or(true, |from| day >= from) && query.to.map_or(true, |to| day <= to)
        })
        .filter(|r| match needle {
            None => true,
            Some(q) => [
                Some(r.name.as_str()),
                Some(r.email.as_str()),
                r.company_name.as_deref(),
                r.message.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| contains_ignore_case(field, q)),
        })
        .collect()
}

pub struct AdminIntakeService {
    pool: PgPool,
    storage: Arc<dyn ObjectStorage>,
    cache: Arc<RwLock<Option<IntakeCache>>>,
    /// Bumped on every invalidation so fetches that started earlier are not stored
    generation: AtomicU64,
    cache_ttl: Duration,
}

impl std::fmt::Debug for AdminIntakeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminIntakeService")
            .field("pool", &"<PgPool>")
            .field("cache_ttl", &self.cache_ttl)
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .finish()
    }
}

impl AdminIntakeService {
    pub fn new(pool: PgPool, storage: Arc<dyn ObjectStorage>, cache_ttl: Duration) -> Self {
        Self {
            pool,
            storage,
            cache: Arc::new(RwLock::new(None)),
            generation: AtomicU64::new(0),
            cache_ttl,
        }
    }

    /// All submissions, newest first, served from the cache while fresh
    async fn all(&self) -> Result<Arc<Vec<IntakeResponse>>> {
        {
            let cache_read = self.cache.read().await;
            if let Some(ref cached) = *cache_read {
                if cached.last_fetched.elapsed() < self.cache_ttl {
                    return Ok(cached.items.clone());
                }
            }
        }

        let generation = self.generation.load(Ordering::Acquire);
        let items = sqlx::query_as::<_, IntakeResponse>(
            "SELECT * FROM intake_responses ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        let items = Arc::new(items);
        self.store_if_current(items.clone(), generation).await;
        Ok(items)
    }

    /// Cache a snapshot unless the cache was invalidated after its fetch began
    async fn store_if_current(&self, items: Arc<Vec<IntakeResponse>>, generation: u64) -> bool {
        let mut cache_write = self.cache.write().await;
        if self.generation.load(Ordering::Acquire) != generation {
            tracing::debug!("Discarding intake snapshot fetched before an update");
            return false;
        }

        tracing::debug!("Intake list cache refreshed with {} records", items.len());
        *cache_write = Some(IntakeCache {
            items,
            last_fetched: Instant::now(),
        });
        true
    }

    async fn invalidate_cache(&self) {
        let mut cache_write = self.cache.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        *cache_write = None;
    }

    #[cfg(test)]
    pub async fn seed_cache(&self, items: Vec<IntakeResponse>) {
        let mut cache_write = self.cache.write().await;
        *cache_write = Some(IntakeCache {
            items: Arc::new(items),
            last_fetched: Instant::now(),
        });
    }

    pub async fn list(&self, query: &IntakeListQuery) -> Result<(Vec<IntakeListItemDto>, i64)> {
        let items = self.all().await?;
        let filtered = filter_intakes(&items, query);
        let (page, total) = query.pagination().paginate(filtered);
        Ok((page.into_iter().map(IntakeListItemDto::from).collect(), total))
    }

    pub async fn summary(&self) -> Result<IntakeSummaryDto> {
        let items = self.all().await?;
        let by_status = IntakeStatus::ALL
            .iter()
            .map(|&status| StatusCountDto {
                status,
                count: items.iter().filter(|r| r.status == status).count() as i64,
            })
            .collect();

        Ok(IntakeSummaryDto {
            total: items.len() as i64,
            by_status,
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<IntakeDetailDto> {
        let record = sqlx::query_as::<_, IntakeResponse>(
            "SELECT * FROM intake_responses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("Intake response {} not found", id)))?;

        self.to_detail(record).await
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        dto: UpdateIntakeStatusDto,
        updated_by: &str,
    ) -> Result<IntakeDetailDto> {
        let note = normalize_optional(dto.note);

        let record = sqlx::query_as::<_, IntakeResponse>(
            r#"
            UPDATE intake_responses
            SET status = $2, admin_note = COALESCE($3, admin_note), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(dto.status)
        .bind(note)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("Intake response {} not found", id)))?;

        self.invalidate_cache().await;

        tracing::info!(
            "Intake {} status set to {} by {}",
            id,
            record.status,
            updated_by
        );

        self.to_detail(record).await
    }

    async fn to_detail(&self, record: IntakeResponse) -> Result<IntakeDetailDto> {
        let mut attachments = Vec::with_capacity(record.attachments.len());
        for attachment in record.attachments.iter() {
            let url = match self
                .storage
                .signed_url(&attachment.path, Some(&attachment.name))
                .await
            {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!("Could not sign URL for '{}': {}", attachment.path, e);
                    None
                }
            };
            attachments.push(AttachmentDto::new(attachment, url));
        }

        Ok(IntakeDetailDto::new(record, attachments))
    }
}

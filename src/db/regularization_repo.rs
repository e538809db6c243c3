// src/db/regularization_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_unique_violation, error::AppError, pagination::PageRequest},
    models::{
        attendance::AttendanceStatus,
        regularization::{RegularizationFilter, RegularizationRequest},
    },
};

#[derive(Debug, Clone)]
pub struct NewRegularization<'a> {
    pub staff_id: Uuid,
    pub request_date: NaiveDate,
    pub requested_status: AttendanceStatus,
    pub reason: &'a str,
    pub supporting_document_url: Option<&'a str>,
    pub attendance_id: Option<Uuid>,
}

#[derive(Clone, Default)]
pub struct RegularizationRepository;

impl RegularizationRepository {
    pub fn new() -> Self {
        Self
    }

    /// O índice único parcial (uma pendente por funcionário/data) vira CannotRegularizePendingRequest.
    pub async fn insert<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &NewRegularization<'_>,
    ) -> Result<RegularizationRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, RegularizationRequest>(
            r#"
            INSERT INTO regularization_requests (
                tenant_id, staff_id, request_date, requested_status,
                reason, supporting_document_url, attendance_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(input.staff_id)
        .bind(input.request_date)
        .bind(input.requested_status)
        .bind(input.reason)
        .bind(input.supporting_document_url)
        .bind(input.attendance_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, AppError::CannotRegularizePendingRequest))
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<RegularizationRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, RegularizationRequest>(
            "SELECT * FROM regularization_requests WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(request)
    }

    /// Mesma busca, mas trava a linha até o fim da transação.
    pub async fn lock_by_id<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<RegularizationRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, RegularizationRequest>(
            "SELECT * FROM regularization_requests WHERE tenant_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(request)
    }

    pub async fn exists_pending<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        staff_id: Uuid,
        request_date: NaiveDate,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM regularization_requests
                WHERE tenant_id = $1
                  AND staff_id = $2
                  AND request_date = $3
                  AND status = 'pending'
            )
            "#,
        )
        .bind(tenant_id)
        .bind(staff_id)
        .bind(request_date)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    pub async fn mark_approved<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        reviewer: Uuid,
        attendance_id: Uuid,
    ) -> Result<RegularizationRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, RegularizationRequest>(
            r#"
            UPDATE regularization_requests
            SET status = 'approved',
                reviewed_by = $3,
                reviewed_at = NOW(),
                attendance_id = $4,
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(reviewer)
        .bind(attendance_id)
        .fetch_optional(executor)
        .await?;

        request.ok_or(AppError::RegularizationAlreadyProcessed)
    }

    pub async fn mark_rejected<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        reviewer: Uuid,
        rejection_reason: &str,
    ) -> Result<RegularizationRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, RegularizationRequest>(
            r#"
            UPDATE regularization_requests
            SET status = 'rejected',
                reviewed_by = $3,
                reviewed_at = NOW(),
                rejection_reason = $4,
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(reviewer)
        .bind(rejection_reason)
        .fetch_optional(executor)
        .await?;

        request.ok_or(AppError::RegularizationAlreadyProcessed)
    }

    /// Ordenado por created_at DESC (desempate pelo id).
    pub async fn list<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        filter: &RegularizationFilter,
        page: &PageRequest,
    ) -> Result<Vec<RegularizationRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT r.* FROM regularization_requests r");
        push_filters(&mut qb, tenant_id, filter);

        if let Some(cursor) = page.cursor {
            qb.push(" AND (r.created_at, r.id) < (SELECT c.created_at, c.id FROM regularization_requests c WHERE c.id = ");
            qb.push_bind(cursor);
            qb.push(" AND c.tenant_id = ");
            qb.push_bind(tenant_id);
            qb.push(")");
        }

        qb.push(" ORDER BY r.created_at DESC, r.id DESC LIMIT ");
        qb.push_bind(page.fetch_limit());

        let requests = qb
            .build_query_as::<RegularizationRequest>()
            .fetch_all(executor)
            .await?;

        Ok(requests)
    }

    pub async fn count<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        filter: &RegularizationFilter,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM regularization_requests r");
        push_filters(&mut qb, tenant_id, filter);

        let (total,) = qb.build_query_as::<(i64,)>().fetch_one(executor).await?;
        Ok(total)
    }
}

fn push_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    tenant_id: Uuid,
    filter: &RegularizationFilter,
) {
    qb.push(" WHERE r.tenant_id = ");
    qb.push_bind(tenant_id);

    if let Some(staff_id) = filter.staff_id {
        qb.push(" AND r.staff_id = ");
        qb.push_bind(staff_id);
    }
    if let Some(status) = filter.status {
        qb.push(" AND r.status = ");
        qb.push_bind(status);
    }
    if let Some(from) = filter.date_from {
        qb.push(" AND r.request_date >= ");
        qb.push_bind(from);
    }
    if let Some(to) = filter.date_to {
        qb.push(" AND r.request_date <= ");
        qb.push_bind(to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::regularization::RegularizationStatus;

    #[test]
    fn status_and_range_filters() {
        let filter = RegularizationFilter {
            status: Some(RegularizationStatus::Pending),
            date_from: NaiveDate::from_ymd_opt(2026, 3, 1),
            ..Default::default()
        };

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT r.* FROM regularization_requests r");
        push_filters(&mut qb, Uuid::new_v4(), &filter);

        assert_eq!(
            qb.sql(),
            "SELECT r.* FROM regularization_requests r WHERE r.tenant_id = $1 AND r.status = $2 AND r.request_date >= $3"
        );
    }
}

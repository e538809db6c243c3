// src/db/attendance_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_unique_violation, error::AppError, pagination::PageRequest},
    models::{
        attendance::{AttendanceFilter, AttendanceRecord, AttendanceStatus, HalfDayType},
        summary::SummaryRow,
    },
};

const RECORD_COLUMNS: &str = r#"
    a.id, a.tenant_id, a.staff_id, a.attendance_date, a.status,
    a.check_in_time, a.check_out_time, a.is_late, a.late_minutes,
    a.half_day_type, a.remarks, a.marked_by, a.marked_at,
    a.created_at, a.updated_at
"#;

/// Dados de uma entrada (autoatendimento).
#[derive(Debug, Clone)]
pub struct CheckInWrite<'a> {
    pub status: AttendanceStatus,
    pub check_in_time: DateTime<Utc>,
    pub is_late: bool,
    pub late_minutes: i32,
    pub half_day_type: Option<HalfDayType>,
    pub remarks: &'a str,
    pub actor: Uuid,
}

/// Dados de uma marcação do RH: substitui o registro inteiro.
#[derive(Debug, Clone)]
pub struct MarkWrite<'a> {
    pub status: AttendanceStatus,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub is_late: bool,
    pub late_minutes: i32,
    pub half_day_type: Option<HalfDayType>,
    pub remarks: &'a str,
    pub actor: Uuid,
}

// Sem estado: cada chamada recebe o executor (conexão RLS ou transação) de quem chama.
#[derive(Clone, Default)]
pub struct AttendanceRepository;

impl AttendanceRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  LEITURAS
    // =========================================================================

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<AttendanceRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM staff_attendance a WHERE a.tenant_id = $1 AND a.id = $2"
        );
        let record = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(record)
    }

    pub async fn find_by_staff_and_date<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        staff_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM staff_attendance a
            WHERE a.tenant_id = $1 AND a.staff_id = $2 AND a.attendance_date = $3
            "#
        );
        let record = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(tenant_id)
            .bind(staff_id)
            .bind(date)
            .fetch_optional(executor)
            .await?;

        Ok(record)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        filter: &AttendanceFilter,
        page: &PageRequest,
    ) -> Result<Vec<AttendanceRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
        qb.push(RECORD_COLUMNS);
        qb.push(" FROM staff_attendance a LEFT JOIN staff s ON s.id = a.staff_id AND s.tenant_id = a.tenant_id");
        push_filters(&mut qb, tenant_id, filter);

        let columns = filter.sort_by.key_columns();

        // Keyset: linhas estritamente depois da linha do cursor na ordem ativa
        if let Some(cursor) = page.cursor {
            qb.push(" AND (");
            qb.push(prefixed(columns, "a"));
            qb.push(") ");
            qb.push(filter.sort_order.after_operator());
            qb.push(" (SELECT ");
            qb.push(prefixed(columns, "c"));
            qb.push(" FROM staff_attendance c WHERE c.id = ");
            qb.push_bind(cursor);
            qb.push(" AND c.tenant_id = ");
            qb.push_bind(tenant_id);
            qb.push(")");
        }

        let direction = filter.sort_order.keyword();
        let order_by = columns
            .iter()
            .map(|c| format!("a.{c} {direction}"))
            .collect::<Vec<_>>()
            .join(", ");
        qb.push(" ORDER BY ");
        qb.push(order_by);
        qb.push(" LIMIT ");
        qb.push_bind(page.fetch_limit());

        let records = qb
            .build_query_as::<AttendanceRecord>()
            .fetch_all(executor)
            .await?;

        Ok(records)
    }

    pub async fn count<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        filter: &AttendanceFilter,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT COUNT(*) FROM staff_attendance a LEFT JOIN staff s ON s.id = a.staff_id AND s.tenant_id = a.tenant_id",
        );
        push_filters(&mut qb, tenant_id, filter);

        let (total,) = qb.build_query_as::<(i64,)>().fetch_one(executor).await?;
        Ok(total)
    }

    pub async fn month_rows<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        staff_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<SummaryRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT status, is_late, late_minutes
            FROM staff_attendance
            WHERE tenant_id = $1
              AND staff_id = $2
              AND attendance_date >= $3
              AND attendance_date < $4
            "#,
        )
        .bind(tenant_id)
        .bind(staff_id)
        .bind(from)
        .bind(until)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    // =========================================================================
    //  ESCRITAS ADITIVAS (AUTOATENDIMENTO)
    // =========================================================================

    /// Primeira entrada do dia. Violação de unicidade vira DuplicateAttendance.
    pub async fn insert_check_in<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        staff_id: Uuid,
        date: NaiveDate,
        write: &CheckInWrite<'_>,
    ) -> Result<AttendanceRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, AttendanceRecord>(
            r#"
            INSERT INTO staff_attendance (
                tenant_id, staff_id, attendance_date, status, check_in_time,
                is_late, late_minutes, half_day_type, remarks, marked_by, marked_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $5)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(staff_id)
        .bind(date)
        .bind(write.status)
        .bind(write.check_in_time)
        .bind(write.is_late)
        .bind(write.late_minutes)
        .bind(write.half_day_type)
        .bind(write.remarks)
        .bind(write.actor)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, AppError::DuplicateAttendance))
    }

    /// Entrada sobre um registro pré-criado (sem horário de entrada).
    /// Retorna None se outra requisição registrou a entrada antes.
    pub async fn update_check_in<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        write: &CheckInWrite<'_>,
    ) -> Result<Option<AttendanceRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            UPDATE staff_attendance
            SET status = $3,
                check_in_time = $4,
                is_late = $5,
                late_minutes = $6,
                half_day_type = $7,
                remarks = $8,
                marked_by = $9,
                marked_at = $4,
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2 AND check_in_time IS NULL
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(write.status)
        .bind(write.check_in_time)
        .bind(write.is_late)
        .bind(write.late_minutes)
        .bind(write.half_day_type)
        .bind(write.remarks)
        .bind(write.actor)
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }

    /// Registra a saída. Retorna None se a saída já tinha sido registrada.
    pub async fn record_check_out<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        check_out_time: DateTime<Utc>,
        remarks: &str,
    ) -> Result<Option<AttendanceRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            UPDATE staff_attendance
            SET check_out_time = $3, remarks = $4, updated_at = NOW()
            WHERE tenant_id = $1
              AND id = $2
              AND check_in_time IS NOT NULL
              AND check_out_time IS NULL
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(check_out_time)
        .bind(remarks)
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }

    // =========================================================================
    //  ESCRITAS DESTRUTIVAS (RH / REGULARIZAÇÃO)
    // =========================================================================

    /// Marcação do RH: cria ou substitui o registro do dia por completo.
    pub async fn overwrite_mark<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        staff_id: Uuid,
        date: NaiveDate,
        write: &MarkWrite<'_>,
    ) -> Result<AttendanceRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            INSERT INTO staff_attendance (
                tenant_id, staff_id, attendance_date, status, check_in_time, check_out_time,
                is_late, late_minutes, half_day_type, remarks, marked_by, marked_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW())
            ON CONFLICT (tenant_id, staff_id, attendance_date)
            DO UPDATE SET
                status = EXCLUDED.status,
                check_in_time = EXCLUDED.check_in_time,
                check_out_time = EXCLUDED.check_out_time,
                is_late = EXCLUDED.is_late,
                late_minutes = EXCLUDED.late_minutes,
                half_day_type = EXCLUDED.half_day_type,
                remarks = EXCLUDED.remarks,
                marked_by = EXCLUDED.marked_by,
                marked_at = EXCLUDED.marked_at,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(staff_id)
        .bind(date)
        .bind(write.status)
        .bind(write.check_in_time)
        .bind(write.check_out_time)
        .bind(write.is_late)
        .bind(write.late_minutes)
        .bind(write.half_day_type)
        .bind(write.remarks)
        .bind(write.actor)
        .fetch_one(executor)
        .await?;

        Ok(record)
    }

    /// Efeito da regularização aprovada: registro novo com status e observação,
    /// ou, se já existir, troca apenas status e observação.
    pub async fn apply_regularization<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        staff_id: Uuid,
        date: NaiveDate,
        status: AttendanceStatus,
        remarks: &str,
        actor: Uuid,
    ) -> Result<AttendanceRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            INSERT INTO staff_attendance (
                tenant_id, staff_id, attendance_date, status, remarks, marked_by, marked_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            ON CONFLICT (tenant_id, staff_id, attendance_date)
            DO UPDATE SET
                status = EXCLUDED.status,
                remarks = EXCLUDED.remarks,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(staff_id)
        .bind(date)
        .bind(status)
        .bind(remarks)
        .bind(actor)
        .fetch_one(executor)
        .await?;

        Ok(record)
    }
}

// Filtros combinados com AND; o tenant é sempre o primeiro
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, tenant_id: Uuid, filter: &AttendanceFilter) {
    qb.push(" WHERE a.tenant_id = ");
    qb.push_bind(tenant_id);

    if let Some(staff_id) = filter.staff_id {
        qb.push(" AND a.staff_id = ");
        qb.push_bind(staff_id);
    }
    if let Some(branch_id) = filter.branch_id {
        qb.push(" AND s.branch_id = ");
        qb.push_bind(branch_id);
    }
    if let Some(department_id) = filter.department_id {
        qb.push(" AND s.department_id = ");
        qb.push_bind(department_id);
    }
    if let Some(status) = filter.status {
        qb.push(" AND a.status = ");
        qb.push_bind(status);
    }
    if let Some(from) = filter.date_from {
        qb.push(" AND a.attendance_date >= ");
        qb.push_bind(from);
    }
    if let Some(to) = filter.date_to {
        qb.push(" AND a.attendance_date <= ");
        qb.push_bind(to);
    }
}

fn prefixed(columns: &[&str], alias: &str) -> String {
    columns
        .iter()
        .map(|c| format!("{alias}.{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::pagination::SortOrder;
    use crate::models::attendance::AttendanceSortField;

    #[test]
    fn filters_are_and_combined() {
        let filter = AttendanceFilter {
            staff_id: Some(Uuid::new_v4()),
            branch_id: Some(Uuid::new_v4()),
            status: Some(AttendanceStatus::Present),
            date_to: NaiveDate::from_ymd_opt(2026, 3, 31),
            ..Default::default()
        };

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT 1 FROM staff_attendance a");
        push_filters(&mut qb, Uuid::new_v4(), &filter);
        let sql = qb.sql();

        assert!(sql.contains("WHERE a.tenant_id = $1"));
        assert!(sql.contains("AND a.staff_id = $2"));
        assert!(sql.contains("AND s.branch_id = $3"));
        assert!(sql.contains("AND a.status = $4"));
        assert!(sql.contains("AND a.attendance_date <= $5"));
        assert!(!sql.contains("department_id"));
    }

    #[test]
    fn keyset_columns_end_with_id() {
        assert_eq!(
            prefixed(AttendanceSortField::AttendanceDate.key_columns(), "a"),
            "a.attendance_date, a.created_at, a.id"
        );
        assert_eq!(prefixed(AttendanceSortField::CreatedAt.key_columns(), "c"), "c.created_at, c.id");
        assert_eq!(SortOrder::default().keyword(), "DESC");
    }
}

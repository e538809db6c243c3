// src/services/attendance_service.rs

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageRequest},
    },
    db::{
        attendance_repo::{CheckInWrite, MarkWrite},
        AttendanceRepository,
    },
    models::{
        attendance::{
            append_remarks, parse_half_day_type, AttendanceFilter, AttendanceRecord,
            AttendanceStatus, CheckInRequest, CheckOutRequest, HalfDayType, MarkAttendanceRequest,
        },
        settings::AttendanceSettings,
        staff::StaffMember,
    },
    services::{
        lateness::Lateness,
        settings_service::SettingsResolver,
        staff_directory::{require_staff, StaffDirectory},
    },
};

// =============================================================================
//  COMANDOS (validados antes de qualquer acesso ao banco)
// =============================================================================

#[derive(Debug, Clone)]
pub struct CheckInCommand {
    pub staff_id: Uuid,
    pub half_day_type: Option<HalfDayType>,
    pub remarks: String,
}

impl CheckInCommand {
    pub fn parse(staff_id: Uuid, request: CheckInRequest) -> Result<Self, AppError> {
        Ok(Self {
            staff_id,
            half_day_type: parse_half_day_type(request.half_day_type.as_deref())?,
            remarks: request.remarks.unwrap_or_default(),
        })
    }

    fn status(&self) -> AttendanceStatus {
        if self.half_day_type.is_some() {
            AttendanceStatus::HalfDay
        } else {
            AttendanceStatus::Present
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckOutCommand {
    pub staff_id: Uuid,
    pub remarks: String,
}

impl CheckOutCommand {
    pub fn new(staff_id: Uuid, request: CheckOutRequest) -> Self {
        Self {
            staff_id,
            remarks: request.remarks.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarkAttendanceCommand {
    pub staff_id: Uuid,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub check_in_time: Option<DateTime<FixedOffset>>,
    pub check_out_time: Option<DateTime<FixedOffset>>,
    pub half_day_type: Option<HalfDayType>,
    pub remarks: String,
}

impl MarkAttendanceCommand {
    /// Ordem das checagens: funcionário, data, data futura, status, meio período.
    pub fn parse(request: MarkAttendanceRequest, today: NaiveDate) -> Result<Self, AppError> {
        let staff_id = request.staff_id.ok_or(AppError::StaffIdRequired)?;
        let date = request.attendance_date.ok_or(AppError::DateRequired)?;
        if date > today {
            return Err(AppError::FutureDate);
        }

        let status: AttendanceStatus = request
            .status
            .as_deref()
            .map(str::trim)
            .ok_or(AppError::InvalidStatus)?
            .parse()?;

        // Meio período só vale para status half_day
        let half_day_type = match status {
            AttendanceStatus::HalfDay => parse_half_day_type(request.half_day_type.as_deref())?,
            _ => None,
        };

        Ok(Self {
            staff_id,
            date,
            status,
            check_in_time: request.check_in_time,
            check_out_time: request.check_out_time,
            half_day_type,
            remarks: request.remarks.unwrap_or_default(),
        })
    }

    /// Só há cálculo de atraso para presença com horário de entrada informado.
    fn needs_lateness(&self) -> bool {
        self.status == AttendanceStatus::Present && self.check_in_time.is_some()
    }

    fn lateness(&self, settings: Option<&AttendanceSettings>) -> Lateness {
        match (self.status, self.check_in_time) {
            (AttendanceStatus::Present, Some(check_in)) => {
                Lateness::compute(check_in.naive_local(), settings)
            }
            _ => Lateness::ON_TIME,
        }
    }
}

// =============================================================================
//  SERVIÇO
// =============================================================================

#[derive(Clone)]
pub struct AttendanceService {
    repo: AttendanceRepository,
    staff_directory: Arc<dyn StaffDirectory>,
    settings: Arc<dyn SettingsResolver>,
}

impl AttendanceService {
    pub fn new(
        repo: AttendanceRepository,
        staff_directory: Arc<dyn StaffDirectory>,
        settings: Arc<dyn SettingsResolver>,
    ) -> Self {
        Self {
            repo,
            staff_directory,
            settings,
        }
    }

    // Configuração ausente ou falha na busca: atraso desligado, nunca erro.
    async fn settings_for(&self, staff: &StaffMember) -> Option<AttendanceSettings> {
        match self.settings.resolve(staff.tenant_id, staff.branch_id).await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(
                    tenant_id = %staff.tenant_id,
                    branch_id = %staff.branch_id,
                    error = %e,
                    "Falha ao buscar configurações de ponto; atraso não será calculado"
                );
                None
            }
        }
    }

    // --- AUTOATENDIMENTO ---

    pub async fn check_in<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        actor: Uuid,
        command: CheckInCommand,
        now: DateTime<FixedOffset>,
    ) -> Result<AttendanceRecord, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // 1. Funcionário existe?
        let staff = require_staff(self.staff_directory.as_ref(), tenant_id, command.staff_id).await?;

        // 2. Atraso (melhor esforço)
        let settings = self.settings_for(&staff).await;
        let lateness = Lateness::compute(now.naive_local(), settings.as_ref());

        let today = now.date_naive();
        let check_in_time = now.with_timezone(&Utc);

        let mut tx = executor.begin().await?;

        // 3. Registro do dia: novo, ou pré-criado pelo RH sem entrada
        let existing = self
            .repo
            .find_by_staff_and_date(&mut *tx, tenant_id, staff.id, today)
            .await?;

        let record = match existing {
            Some(record) => {
                record.ensure_can_check_in()?;
                let remarks = append_remarks(&record.remarks, &command.remarks);
                let write = CheckInWrite {
                    status: command.status(),
                    check_in_time,
                    is_late: lateness.is_late,
                    late_minutes: lateness.late_minutes,
                    half_day_type: command.half_day_type,
                    remarks: &remarks,
                    actor,
                };
                self.repo
                    .update_check_in(&mut *tx, tenant_id, record.id, &write)
                    .await?
                    .ok_or(AppError::AlreadyCheckedIn)?
            }
            None => {
                let remarks = command.remarks.trim();
                let write = CheckInWrite {
                    status: command.status(),
                    check_in_time,
                    is_late: lateness.is_late,
                    late_minutes: lateness.late_minutes,
                    half_day_type: command.half_day_type,
                    remarks,
                    actor,
                };
                // Corrida com outra entrada simultânea: o índice único decide
                self.repo
                    .insert_check_in(&mut *tx, tenant_id, staff.id, today, &write)
                    .await
                    .map_err(|e| match e {
                        AppError::DuplicateAttendance => AppError::AlreadyCheckedIn,
                        other => other,
                    })?
            }
        };

        tx.commit().await?;

        tracing::info!(
            %tenant_id,
            staff_id = %record.staff_id,
            attendance_id = %record.id,
            is_late = record.is_late,
            late_minutes = record.late_minutes,
            "✅ Entrada registrada"
        );

        Ok(record)
    }

    pub async fn check_out<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        command: CheckOutCommand,
        now: DateTime<FixedOffset>,
    ) -> Result<AttendanceRecord, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let record = self
            .repo
            .find_by_staff_and_date(&mut *tx, tenant_id, command.staff_id, now.date_naive())
            .await?
            .ok_or(AppError::NotCheckedIn)?;
        record.ensure_can_check_out()?;

        // Saída soma às observações, nunca substitui
        let remarks = append_remarks(&record.remarks, &command.remarks);

        let updated = self
            .repo
            .record_check_out(&mut *tx, tenant_id, record.id, now.with_timezone(&Utc), &remarks)
            .await?
            .ok_or(AppError::AlreadyCheckedOut)?;

        tx.commit().await?;

        tracing::info!(
            %tenant_id,
            staff_id = %updated.staff_id,
            attendance_id = %updated.id,
            "Saída registrada"
        );

        Ok(updated)
    }

    // --- RH ---

    /// Marcação do RH: substitui o registro do dia por completo.
    pub async fn mark_attendance<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        actor: Uuid,
        command: MarkAttendanceCommand,
    ) -> Result<AttendanceRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let staff = require_staff(self.staff_directory.as_ref(), tenant_id, command.staff_id).await?;

        let settings = if command.needs_lateness() {
            self.settings_for(&staff).await
        } else {
            None
        };
        let lateness = command.lateness(settings.as_ref());

        let write = MarkWrite {
            status: command.status,
            check_in_time: command.check_in_time.map(|t| t.with_timezone(&Utc)),
            check_out_time: command.check_out_time.map(|t| t.with_timezone(&Utc)),
            is_late: lateness.is_late,
            late_minutes: lateness.late_minutes,
            half_day_type: command.half_day_type,
            remarks: command.remarks.trim(),
            actor,
        };

        let record = self
            .repo
            .overwrite_mark(executor, tenant_id, staff.id, command.date, &write)
            .await?;

        tracing::info!(
            %tenant_id,
            staff_id = %record.staff_id,
            date = %record.attendance_date,
            status = record.status.as_str(),
            marked_by = %actor,
            "Ponto marcado pelo RH"
        );

        Ok(record)
    }

    // --- LEITURAS ---

    pub async fn get_today<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        staff_id: Uuid,
        today: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_staff_and_date(executor, tenant_id, staff_id, today)
            .await
    }

    pub async fn get_by_id<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<AttendanceRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_id(executor, tenant_id, id)
            .await?
            .ok_or(AppError::AttendanceNotFound)
    }

    /// Página e total lidos na mesma conexão (mesmo contexto RLS).
    pub async fn list_attendance(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        filter: &AttendanceFilter,
        page: &PageRequest,
    ) -> Result<Page<AttendanceRecord>, AppError> {
        let rows = self.repo.list(&mut *conn, tenant_id, filter, page).await?;
        let total = self.repo.count(&mut *conn, tenant_id, filter).await?;

        Ok(Page::from_overfetch(rows, page, total, |r| r.id))
    }
}

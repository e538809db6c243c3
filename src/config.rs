// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{AttendanceRepository, PgStaffDirectory, RegularizationRepository, SettingsRepository},
    services::{
        attendance_service::AttendanceService, auth::TokenService,
        regularization_service::RegularizationService, settings_service::SettingsService,
        summary_service::SummaryService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// Variáveis de ambiente (com .env opcional)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS inválido: {raw}"))?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            max_connections,
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,
    pub token_service: TokenService,
    pub attendance_service: AttendanceService,
    pub regularization_service: RegularizationService,
    pub summary_service: SummaryService,
    pub settings_service: SettingsService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, config.jwt_secret.clone()))
    }

    /// Monta o gráfico de dependências sobre uma pool já criada (também usado nos testes).
    pub fn from_pool(db_pool: PgPool, jwt_secret: String) -> Self {
        let attendance_repo = AttendanceRepository::new();
        let staff_directory = Arc::new(PgStaffDirectory::new(db_pool.clone()));
        let settings_service = SettingsService::new(SettingsRepository::new(), db_pool.clone());

        let attendance_service = AttendanceService::new(
            attendance_repo.clone(),
            staff_directory.clone(),
            Arc::new(settings_service.clone()),
        );
        let regularization_service = RegularizationService::new(
            RegularizationRepository::new(),
            attendance_repo.clone(),
            staff_directory,
        );
        let summary_service = SummaryService::new(attendance_repo);

        Self {
            db_pool,
            i18n_store: Arc::new(I18nStore::new()),
            token_service: TokenService::new(jwt_secret),
            attendance_service,
            regularization_service,
            summary_service,
            settings_service,
        }
    }
}

// src/config.rs

use crate::{
    db::ReportsRepository,
    services::reports_service::{ReportsService, SystemClock},
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, sync::Arc, time::Duration};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub reports_service: ReportsService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let reports_repo = ReportsRepository::new(db_pool.clone());
        let reports_service = ReportsService::new(reports_repo, Arc::new(SystemClock));

        Ok(Self {
            db_pool,
            reports_service,
        })
    }
}

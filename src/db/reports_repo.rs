// src/db/reports_repo.rs
//
// Executor opaco das queries de relatório: recebe o texto com placeholders
// $n e a lista ordenada de parâmetros, liga cada valor na posição certa e
// devolve as linhas decodificadas. Nenhum SQL nasce aqui.

use sqlx::{
    postgres::{PgArguments, PgRow},
    query::QueryAs,
    FromRow, PgPool, Postgres,
};

use crate::{common::error::AppError, services::sql_builder::SqlValue};

#[derive(Clone)]
pub struct ReportsRepository {
    pool: PgPool,
}

impl ReportsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn fetch_all<T>(&self, query: &str, params: &[SqlValue]) -> Result<Vec<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        tracing::debug!(query, ?params, "executando query de relatório");

        let rows = bind_params(sqlx::query_as::<_, T>(query), params)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                // Query e parâmetros são determinísticos: logar os dois torna
                // a falha reproduzível.
                tracing::error!(error = %e, query, ?params, "falha ao executar query de relatório");
                e
            })?;

        Ok(rows)
    }

    pub async fn fetch_one<T>(&self, query: &str, params: &[SqlValue]) -> Result<T, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        tracing::debug!(query, ?params, "executando query de relatório");

        let row = bind_params(sqlx::query_as::<_, T>(query), params)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, query, ?params, "falha ao executar query de relatório");
                e
            })?;

        Ok(row)
    }
}

// Liga cada parâmetro na ordem; arrays viram UM valor int4[] ligado a um
// único placeholder.
fn bind_params<'q, T>(
    mut query: QueryAs<'q, Postgres, T, PgArguments>,
    params: &[SqlValue],
) -> QueryAs<'q, Postgres, T, PgArguments> {
    for param in params {
        query = match param {
            SqlValue::Date(d) => query.bind(*d),
            SqlValue::Timestamp(ts) => query.bind(*ts),
            SqlValue::IntArray(values) => query.bind(values.clone()),
        };
    }
    query
}

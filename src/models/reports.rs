// src/models/reports.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

// Parâmetros crus da query string, antes da normalização.
// Campos de conjunto aceitam um escalar ("5") ou uma lista separada por
// vírgula ("1,2,3"); a conversão para tipos fortes acontece em
// `FilterSet::from_query`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// Data inicial (inclusiva), formato YYYY-MM-DD
    #[param(example = "2024-01-01")]
    pub start_date: Option<String>,

    /// Data final (inclusiva), formato YYYY-MM-DD
    #[param(example = "2024-01-31")]
    pub end_date: Option<String>,

    /// IDs de canal, escalar ou lista separada por vírgula
    #[param(example = "1,2,3")]
    pub channel_ids: Option<String>,

    /// IDs de loja, escalar ou lista separada por vírgula
    #[param(example = "4")]
    pub store_ids: Option<String>,

    /// Dias da semana (0=Domingo ... 6=Sábado)
    #[param(example = "1,2,3,4,5")]
    pub day_of_week: Option<String>,
}

// 1. KPIs (os cards do topo do dashboard)
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KpiResult {
    pub total_revenue: Decimal, // Faturamento das vendas COMPLETED no escopo
    pub avg_ticket: Decimal,    // Ticket médio (0 quando não há vendas)
    pub total_sales: i64,       // Quantidade de vendas COMPLETED
    pub cancel_rate: f64,       // Canceladas / total do escopo, em [0,1]
}

// 2. Gráfico de faturamento ao longo do tempo (um ponto por dia)
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenuePoint {
    #[schema(value_type = String, example = "2024-01-02")]
    pub date: NaiveDate,
    pub revenue: Decimal, // 0 nos dias sem venda (gap-filling)
}

// 3. Top 10 produtos por faturamento
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopProductEntry {
    pub product_id: i32,
    pub name: String,
    pub total_sold: i64,
    pub total_revenue: Decimal,
}

// 4. Comparativo de faturamento entre lojas
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreComparisonEntry {
    pub store_id: i32,
    pub name: String,
    pub value: Decimal,
}

// 5. Listas de referência para popular os dropdowns de filtro
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChannelEntry {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreEntry {
    pub id: i32,
    pub name: String,
}

// src/handlers/reports.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    // Importamos os models para referenciar no Swagger
    models::reports::{
        ChannelEntry, KpiResult, ReportQuery, RevenuePoint, StoreComparisonEntry, StoreEntry,
        TopProductEntry,
    },
    services::filters::FilterSet,
};

// GET /api/reports/kpis
#[utoipa::path(
    get,
    path = "/api/reports/kpis",
    tag = "Reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "KPIs agregados do escopo filtrado", body = KpiResult),
        (status = 400, description = "Filtros inválidos")
    )
)]
pub async fn get_kpis(
    State(app_state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filters = FilterSet::from_query(&query)?;

    let kpis = app_state.reports_service.get_kpis(&filters).await?;

    Ok((StatusCode::OK, Json(kpis)))
}

// GET /api/reports/revenue-over-time
#[utoipa::path(
    get,
    path = "/api/reports/revenue-over-time",
    tag = "Reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "Faturamento por dia, com zeros nos dias sem venda", body = Vec<RevenuePoint>),
        (status = 400, description = "Filtros inválidos")
    )
)]
pub async fn get_revenue_over_time(
    State(app_state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filters = FilterSet::from_query(&query)?;

    let points = app_state
        .reports_service
        .get_revenue_over_time(&filters)
        .await?;

    Ok((StatusCode::OK, Json(points)))
}

// GET /api/reports/top-products
#[utoipa::path(
    get,
    path = "/api/reports/top-products",
    tag = "Reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "Top 10 produtos por faturamento", body = Vec<TopProductEntry>),
        (status = 400, description = "Filtros inválidos")
    )
)]
pub async fn get_top_products(
    State(app_state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filters = FilterSet::from_query(&query)?;

    let products = app_state.reports_service.get_top_products(&filters).await?;

    Ok((StatusCode::OK, Json(products)))
}

// GET /api/reports/store-comparison
#[utoipa::path(
    get,
    path = "/api/reports/store-comparison",
    tag = "Reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "Faturamento por loja, decrescente", body = Vec<StoreComparisonEntry>),
        (status = 400, description = "Filtros inválidos")
    )
)]
pub async fn get_store_comparison(
    State(app_state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filters = FilterSet::from_query(&query)?;

    let stores = app_state
        .reports_service
        .get_store_comparison(&filters)
        .await?;

    Ok((StatusCode::OK, Json(stores)))
}

// GET /api/reports/channels
#[utoipa::path(
    get,
    path = "/api/reports/channels",
    tag = "Reports",
    responses(
        (status = 200, description = "Canais disponíveis, ordenados por nome", body = Vec<ChannelEntry>)
    )
)]
pub async fn get_channels(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let channels = app_state.reports_service.get_channels().await?;

    Ok((StatusCode::OK, Json(channels)))
}

// GET /api/reports/stores
#[utoipa::path(
    get,
    path = "/api/reports/stores",
    tag = "Reports",
    responses(
        (status = 200, description = "Lojas disponíveis, ordenadas por nome", body = Vec<StoreEntry>)
    )
)]
pub async fn get_stores(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stores = app_state.reports_service.get_stores().await?;

    Ok((StatusCode::OK, Json(stores)))
}

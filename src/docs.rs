// src/docs.rs

use crate::handlers;
use crate::models;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Reports ---
        handlers::reports::get_kpis,
        handlers::reports::get_revenue_over_time,
        handlers::reports::get_top_products,
        handlers::reports::get_store_comparison,
        handlers::reports::get_channels,
        handlers::reports::get_stores,
    ),
    components(
        schemas(
            models::reports::KpiResult,
            models::reports::RevenuePoint,
            models::reports::TopProductEntry,
            models::reports::StoreComparisonEntry,
            models::reports::ChannelEntry,
            models::reports::StoreEntry,
        )
    ),
    tags(
        (name = "Reports", description = "Relatórios analíticos de vendas")
    )
)]
pub struct ApiDoc;

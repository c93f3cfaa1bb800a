// src/services/reports_service.rs
//
// Os quatro relatórios analíticos + listas de referência. Cada operação
// compõe a query a partir do WhereBuilder (função pura, testável sem banco)
// e entrega o texto + parâmetros posicionais para o repositório executar.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};

use crate::{
    common::error::AppError,
    db::ReportsRepository,
    models::reports::{
        ChannelEntry, KpiResult, RevenuePoint, StoreComparisonEntry, StoreEntry, TopProductEntry,
    },
    services::{
        filters::FilterSet,
        sql_builder::{shift_placeholders, SqlValue, WhereBuilder},
    },
};

// Janela padrão do gráfico de faturamento quando o caller não informa datas.
const DEFAULT_LOOKBACK_DAYS: i64 = 30;

/// Fonte de "hoje" injetada no serviço, para que os testes possam fixar a
/// data em vez de depender do relógio da máquina.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

#[derive(Clone)]
pub struct ReportsService {
    repo: ReportsRepository,
    clock: Arc<dyn Clock>,
}

impl ReportsService {
    pub fn new(repo: ReportsRepository, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// KPIs agregados em UMA única varredura do escopo filtrado.
    /// O status NÃO entra no WHERE: a taxa de cancelamento precisa do escopo
    /// completo no denominador, então COMPLETED/CANCELED são separados nos
    /// CASE de cada agregado.
    pub async fn get_kpis(&self, filters: &FilterSet) -> Result<KpiResult, AppError> {
        let (query, params) = kpi_query(filters);
        self.repo.fetch_one(&query, &params).await
    }

    /// Um ponto por dia-calendário em [início efetivo, fim efetivo], com
    /// revenue = 0 nos dias sem venda (LEFT JOIN contra a série gerada).
    /// Sem datas no filtro, a janela é [hoje - 30 dias, hoje].
    pub async fn get_revenue_over_time(
        &self,
        filters: &FilterSet,
    ) -> Result<Vec<RevenuePoint>, AppError> {
        let (query, params) = revenue_over_time_query(filters, self.clock.today());
        self.repo.fetch_all(&query, &params).await
    }

    /// Top 10 produtos por faturamento no escopo COMPLETED.
    pub async fn get_top_products(
        &self,
        filters: &FilterSet,
    ) -> Result<Vec<TopProductEntry>, AppError> {
        let (query, params) = top_products_query(filters);
        self.repo.fetch_all(&query, &params).await
    }

    /// Faturamento por loja no escopo COMPLETED, sem limite de linhas.
    pub async fn get_store_comparison(
        &self,
        filters: &FilterSet,
    ) -> Result<Vec<StoreComparisonEntry>, AppError> {
        let (query, params) = store_comparison_query(filters);
        self.repo.fetch_all(&query, &params).await
    }

    pub async fn get_channels(&self) -> Result<Vec<ChannelEntry>, AppError> {
        self.repo
            .fetch_all("SELECT id, name FROM channels ORDER BY name ASC", &[])
            .await
    }

    pub async fn get_stores(&self) -> Result<Vec<StoreEntry>, AppError> {
        self.repo
            .fetch_all("SELECT id, name FROM stores ORDER BY name ASC", &[])
            .await
    }
}

fn kpi_query(filters: &FilterSet) -> (String, Vec<SqlValue>) {
    let mut builder = WhereBuilder::new("s", 1);
    builder.apply(filters);

    // COALESCE/NULLIF resolvem o escopo vazio: média e taxa viram 0 em vez
    // de NULL ou divisão por zero.
    let query = format!(
        r#"
SELECT
    COALESCE(SUM(CASE WHEN s.sale_status_desc = 'COMPLETED' THEN s.total_amount ELSE 0 END), 0) AS total_revenue,
    COALESCE(AVG(CASE WHEN s.sale_status_desc = 'COMPLETED' THEN s.total_amount END), 0) AS avg_ticket,
    COUNT(CASE WHEN s.sale_status_desc = 'COMPLETED' THEN 1 END) AS total_sales,
    COALESCE(
        SUM(CASE WHEN s.sale_status_desc = 'CANCELED' THEN 1 ELSE 0 END)::float
        / NULLIF(COUNT(s.id), 0)::float,
    0) AS cancel_rate
FROM sales s
{}
"#,
        builder.where_sql()
    );

    let (_, params, _) = builder.into_parts();
    (query, params)
}

fn revenue_over_time_query(filters: &FilterSet, today: NaiveDate) -> (String, Vec<SqlValue>) {
    let effective_start = filters
        .start_date
        .unwrap_or(today - Duration::days(DEFAULT_LOOKBACK_DAYS));
    let effective_end = filters.end_date.unwrap_or(today);

    // Os limites da série são sempre $1/$2; o fragmento de filtro é montado
    // de forma independente (numerado a partir de $1) e deslocado pela
    // quantidade de parâmetros de data antes da concatenação.
    let date_params = vec![
        SqlValue::Date(effective_start),
        SqlValue::Date(effective_end),
    ];

    let mut builder = WhereBuilder::new("s", 1);
    builder.apply(filters);
    builder.push_raw("s.sale_status_desc = 'COMPLETED'");

    let shifted: Vec<String> = builder
        .fragments()
        .iter()
        .map(|fragment| shift_placeholders(fragment, date_params.len()))
        .collect();

    let query = format!(
        r#"
WITH all_days AS (
    SELECT generate_series($1::date, $2::date, '1 day'::interval)::date AS date
),
daily_revenue AS (
    SELECT
        DATE_TRUNC('day', s.created_at)::date AS date,
        SUM(s.total_amount) AS revenue
    FROM sales s
    WHERE {}
    GROUP BY 1
)
SELECT
    ad.date AS date,
    COALESCE(dr.revenue, 0) AS revenue
FROM all_days ad
LEFT JOIN daily_revenue dr ON ad.date = dr.date
ORDER BY ad.date ASC
"#,
        shifted.join(" AND ")
    );

    // Parâmetros de data primeiro, na mesma direção do deslocamento.
    let (_, filter_params, _) = builder.into_parts();
    let mut params = date_params;
    params.extend(filter_params);

    (query, params)
}

fn top_products_query(filters: &FilterSet) -> (String, Vec<SqlValue>) {
    let mut builder = WhereBuilder::new("s", 1);
    builder.apply(filters);
    builder.push_raw("s.sale_status_desc = 'COMPLETED'");

    // Desempate determinístico: id do produto ascendente.
    let query = format!(
        r#"
SELECT
    p.id AS product_id,
    p.name AS name,
    SUM(ps.quantity) AS total_sold,
    SUM(ps.total_price) AS total_revenue
FROM product_sales ps
JOIN sales s ON s.id = ps.sale_id
JOIN products p ON p.id = ps.product_id
{}
GROUP BY p.id, p.name
ORDER BY total_revenue DESC, p.id ASC
LIMIT 10
"#,
        builder.where_sql()
    );

    let (_, params, _) = builder.into_parts();
    (query, params)
}

fn store_comparison_query(filters: &FilterSet) -> (String, Vec<SqlValue>) {
    let mut builder = WhereBuilder::new("s", 1);
    builder.apply(filters);
    builder.push_raw("s.sale_status_desc = 'COMPLETED'");

    let query = format!(
        r#"
SELECT
    st.id AS store_id,
    st.name AS name,
    SUM(s.total_amount) AS value
FROM sales s
JOIN stores st ON st.id = s.store_id
{}
GROUP BY st.id, st.name
ORDER BY value DESC, st.id ASC
"#,
        builder.where_sql()
    );

    let (_, params, _) = builder.into_parts();
    (query, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn filters_with_dates() -> FilterSet {
        FilterSet {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 3),
            channel_ids: vec![5],
            ..FilterSet::default()
        }
    }

    // Varre o texto e devolve os índices dos placeholders na ordem em que
    // aparecem.
    fn placeholder_indices(sql: &str) -> Vec<usize> {
        let mut indices = Vec::new();
        let mut chars = sql.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch != '$' {
                continue;
            }
            let mut digits = String::new();
            while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                digits.push(d);
                chars.next();
            }
            if !digits.is_empty() {
                indices.push(digits.parse().unwrap());
            }
        }
        indices
    }

    #[test]
    fn kpi_sem_filtros_nao_tem_where_nem_parametros() {
        let (query, params) = kpi_query(&FilterSet::default());

        assert!(!query.contains("WHERE"));
        assert!(params.is_empty());
        // O status fica nos CASE, nunca no WHERE.
        assert!(query.contains("CASE WHEN s.sale_status_desc = 'COMPLETED'"));
        assert!(query.contains("CASE WHEN s.sale_status_desc = 'CANCELED'"));
        assert!(query.contains("NULLIF(COUNT(s.id), 0)"));
    }

    #[test]
    fn kpi_com_filtros_emite_where_alinhado_aos_parametros() {
        let (query, params) = kpi_query(&filters_with_dates());

        assert!(query.contains("WHERE s.created_at >= $1 AND s.created_at <= $2 AND s.channel_id = ANY($3)"));
        assert_eq!(params.len(), 3);
        assert_eq!(params[2], SqlValue::IntArray(vec![5]));
    }

    #[test]
    fn faturamento_compoe_datas_antes_dos_filtros_sem_buracos_na_numeracao() {
        let (query, params) = revenue_over_time_query(&filters_with_dates(), fixed_today());

        // Fragmento de data (2 params) + fragmento de filtro (3 params)
        // compostos => $1..$5, datas primeiro.
        let indices = placeholder_indices(&query);
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);

        assert_eq!(
            params[0],
            SqlValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
        assert_eq!(
            params[1],
            SqlValue::Date(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap())
        );
        assert!(matches!(params[2], SqlValue::Timestamp(_)));
        assert!(matches!(params[3], SqlValue::Timestamp(_)));
        assert_eq!(params[4], SqlValue::IntArray(vec![5]));
        assert_eq!(params.len(), 5);

        // A agregação filtrada restringe a COMPLETED; a série não.
        assert!(query.contains("s.sale_status_desc = 'COMPLETED'"));
        assert!(query.contains("LEFT JOIN daily_revenue"));
        assert!(query.contains("ORDER BY ad.date ASC"));
    }

    #[test]
    fn faturamento_sem_datas_usa_janela_de_30_dias_do_relogio_injetado() {
        let (query, params) = revenue_over_time_query(&FilterSet::default(), fixed_today());

        assert_eq!(
            params[0],
            SqlValue::Date(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap())
        );
        assert_eq!(
            params[1],
            SqlValue::Date(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
        );
        // Só o predicado de status sobra no WHERE da agregação.
        assert!(query.contains("WHERE s.sale_status_desc = 'COMPLETED'"));
        assert_eq!(placeholder_indices(&query), vec![1, 2]);
    }

    #[test]
    fn top_produtos_limita_em_10_e_desempata_por_id() {
        let (query, params) = top_products_query(&filters_with_dates());

        assert!(query.contains("LIMIT 10"));
        assert!(query.contains("ORDER BY total_revenue DESC, p.id ASC"));
        assert!(query.contains("s.sale_status_desc = 'COMPLETED'"));
        assert_eq!(placeholder_indices(&query), vec![1, 2, 3]);
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn comparativo_de_lojas_ordena_por_valor_e_desempata_por_id() {
        let (query, params) = store_comparison_query(&FilterSet::default());

        assert!(query.contains("ORDER BY value DESC, st.id ASC"));
        assert!(!query.contains("LIMIT"));
        // Sem filtros, o WHERE ainda existe por causa do status.
        assert!(query.contains("WHERE s.sale_status_desc = 'COMPLETED'"));
        assert!(params.is_empty());
    }
}

// src/services/filters.rs

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::{common::error::AppError, models::reports::ReportQuery};

// Conjunto de filtros já validado e normalizado.
//
// Invariante central: dimensão ausente ou vazia NÃO restringe nada
// (identidade lógica). As dimensões combinam com AND; dentro de um conjunto
// a pertinência é OR (semântica de IN).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub channel_ids: Vec<i32>,
    pub store_ids: Vec<i32>,
    pub day_of_week: Vec<i32>, // 0=Domingo ... 6=Sábado (DOW do Postgres)
}

impl FilterSet {
    /// Converte os parâmetros crus da query string em um FilterSet tipado.
    /// Puro: nenhum efeito além do parse. Falha com `ValidationError`
    /// apontando o campo problemático.
    pub fn from_query(query: &ReportQuery) -> Result<Self, AppError> {
        let start_date = query
            .start_date
            .as_deref()
            .map(|raw| parse_date("startDate", raw))
            .transpose()?;

        let end_date = query
            .end_date
            .as_deref()
            .map(|raw| parse_date("endDate", raw))
            .transpose()?;

        let channel_ids = parse_id_list("channelIds", query.channel_ids.as_deref())?;
        let store_ids = parse_id_list("storeIds", query.store_ids.as_deref())?;
        let day_of_week = parse_id_list("dayOfWeek", query.day_of_week.as_deref())?;

        for dow in &day_of_week {
            if !(0..=6).contains(dow) {
                return Err(validation_error(
                    "dayOfWeek",
                    "dia da semana deve estar entre 0 (Domingo) e 6 (Sábado)",
                ));
            }
        }

        Ok(Self {
            start_date,
            end_date,
            channel_ids,
            store_ids,
            day_of_week,
        })
    }

    /// Início do dia (00:00:00) da data inicial, quando presente.
    pub fn start_instant(&self) -> Option<NaiveDateTime> {
        self.start_date.map(|d| d.and_time(NaiveTime::MIN))
    }

    /// Fim do dia (23:59:59) da data final, quando presente.
    pub fn end_instant(&self) -> Option<NaiveDateTime> {
        self.end_date
            .map(|d| d.and_time(NaiveTime::MIN) + Duration::seconds(86_399))
    }
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| validation_error(field, "data inválida, formato esperado: YYYY-MM-DD"))
}

// "1,2,3" -> [1, 2, 3]; "7" -> [7]; ausente ou vazio -> [] (sem restrição).
fn parse_id_list(field: &str, raw: Option<&str>) -> Result<Vec<i32>, AppError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    raw.split(',')
        .map(|token| {
            token.trim().parse::<i32>().map_err(|_| {
                validation_error(field, "lista deve conter apenas números inteiros")
            })
        })
        .collect()
}

// Cria um ValidationErrors manual para manter o padrão de resposta da API.
fn validation_error(field: &str, message: &str) -> AppError {
    let mut errors = validator::ValidationErrors::new();
    let mut err = validator::ValidationError::new("invalid_filter");
    err.message = Some(message.to_string().into());

    // Leak seguro para erro estático
    let static_field: &'static str = Box::leak(field.to_string().into_boxed_str());
    errors.add(static_field, err);

    AppError::ValidationError(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(channel_ids: Option<&str>) -> ReportQuery {
        ReportQuery {
            channel_ids: channel_ids.map(str::to_owned),
            ..ReportQuery::default()
        }
    }

    #[test]
    fn lista_separada_por_virgula_vira_vetor_de_inteiros() {
        let filters = FilterSet::from_query(&query(Some("1,2,3"))).unwrap();
        assert_eq!(filters.channel_ids, vec![1, 2, 3]);
    }

    #[test]
    fn escalar_unico_vira_conjunto_de_um_elemento() {
        let filters = FilterSet::from_query(&query(Some("7"))).unwrap();
        assert_eq!(filters.channel_ids, vec![7]);
    }

    #[test]
    fn ausente_ou_vazio_significa_sem_restricao() {
        let filters = FilterSet::from_query(&query(None)).unwrap();
        assert!(filters.channel_ids.is_empty());

        let filters = FilterSet::from_query(&query(Some("  "))).unwrap();
        assert!(filters.channel_ids.is_empty());
    }

    #[test]
    fn token_nao_numerico_falha_com_erro_de_validacao() {
        let result = FilterSet::from_query(&query(Some("1,abc,3")));
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn dia_da_semana_fora_do_intervalo_falha() {
        let raw = ReportQuery {
            day_of_week: Some("0,7".to_string()),
            ..ReportQuery::default()
        };
        let result = FilterSet::from_query(&raw);
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn data_invalida_falha() {
        let raw = ReportQuery {
            start_date: Some("2024-13-01".to_string()),
            ..ReportQuery::default()
        };
        let result = FilterSet::from_query(&raw);
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn datas_expandem_para_dia_inteiro() {
        let raw = ReportQuery {
            start_date: Some("2024-01-01".to_string()),
            end_date: Some("2024-01-03".to_string()),
            ..ReportQuery::default()
        };
        let filters = FilterSet::from_query(&raw).unwrap();

        assert_eq!(
            filters.start_instant().unwrap().to_string(),
            "2024-01-01 00:00:00"
        );
        assert_eq!(
            filters.end_instant().unwrap().to_string(),
            "2024-01-03 23:59:59"
        );
    }
}

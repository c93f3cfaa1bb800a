// src/services/sql_builder.rs
//
// Montagem dinâmica de cláusulas WHERE com placeholders posicionais ($1, $2...).
//
// Regra de ouro: valores NUNCA entram no texto da query. O texto recebe só o
// índice do placeholder; o valor vai para a lista paralela de parâmetros, na
// mesma posição. É isso que mantém a composição imune a injeção.

use chrono::{NaiveDate, NaiveDateTime};

use crate::services::filters::FilterSet;

// Um valor ligado a um placeholder. Arrays são ligados como UM único valor
// nativo (int4[]) para predicados `= ANY($n)`, nunca expandidos em N
// placeholders.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    IntArray(Vec<i32>),
}

// Acumula fragmentos de predicado e parâmetros em paralelo, numerando os
// placeholders a partir de um offset fornecido pelo chamador.
#[derive(Debug)]
pub struct WhereBuilder {
    alias: String,
    fragments: Vec<String>,
    params: Vec<SqlValue>,
    next_index: usize,
}

impl WhereBuilder {
    pub fn new(alias: &str, start_index: usize) -> Self {
        Self {
            alias: alias.to_string(),
            fragments: Vec::new(),
            params: Vec::new(),
            next_index: start_index,
        }
    }

    /// Aplica as cinco dimensões do FilterSet, nesta ordem fixa:
    /// data inicial, data final, canais, lojas, dias da semana.
    /// A ordem só afeta a numeração dos placeholders, não a semântica,
    /// mas precisa ser estável para os testes.
    pub fn apply(&mut self, filters: &FilterSet) {
        // Filtro de data
        if let Some(start) = filters.start_instant() {
            let i = self.bind(SqlValue::Timestamp(start));
            self.fragments
                .push(format!("{}.created_at >= ${}", self.alias, i));
        }
        if let Some(end) = filters.end_instant() {
            let i = self.bind(SqlValue::Timestamp(end));
            self.fragments
                .push(format!("{}.created_at <= ${}", self.alias, i));
        }

        // Filtro de canal
        if !filters.channel_ids.is_empty() {
            let i = self.bind(SqlValue::IntArray(filters.channel_ids.clone()));
            self.fragments
                .push(format!("{}.channel_id = ANY(${})", self.alias, i));
        }

        // Filtro de loja
        if !filters.store_ids.is_empty() {
            let i = self.bind(SqlValue::IntArray(filters.store_ids.clone()));
            self.fragments
                .push(format!("{}.store_id = ANY(${})", self.alias, i));
        }

        // Filtro de dia da semana
        if !filters.day_of_week.is_empty() {
            let i = self.bind(SqlValue::IntArray(filters.day_of_week.clone()));
            self.fragments.push(format!(
                "EXTRACT(DOW FROM {}.created_at) = ANY(${})",
                self.alias, i
            ));
        }
    }

    /// Predicado sem parâmetro (ex.: restrição de status com literal fixo).
    pub fn push_raw(&mut self, predicate: impl Into<String>) {
        self.fragments.push(predicate.into());
    }

    /// Renderiza `WHERE a AND b` — ou string vazia quando não há fragmento
    /// nenhum. Um `WHERE` vazio é SQL inválido e nunca pode ser emitido.
    pub fn where_sql(&self) -> String {
        if self.fragments.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.fragments.join(" AND "))
        }
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<SqlValue>, usize) {
        (self.fragments, self.params, self.next_index)
    }

    // Reserva o próximo índice e empilha o valor correspondente.
    fn bind(&mut self, value: SqlValue) -> usize {
        let index = self.next_index;
        self.params.push(value);
        self.next_index += 1;
        index
    }
}

/// Reescreve cada placeholder `$<n>` do fragmento para `$<n + by>`, sem tocar
/// no resto do texto. Usado quando dois fragmentos numerados de forma
/// independente (ambos a partir de $1) precisam ser concatenados em uma única
/// query: o segundo é deslocado pela quantidade de parâmetros do primeiro, e
/// a lista combinada fica `params1 ++ params2`.
pub fn shift_placeholders(fragment: &str, by: usize) -> String {
    let mut out = String::with_capacity(fragment.len() + 8);
    let mut digits = String::new();
    let mut in_placeholder = false;

    for ch in fragment.chars() {
        if in_placeholder {
            if ch.is_ascii_digit() {
                digits.push(ch);
                continue;
            }
            flush_placeholder(&mut out, &mut digits, by);
            in_placeholder = false;
            if ch == '$' {
                in_placeholder = true;
                continue;
            }
            out.push(ch);
        } else if ch == '$' {
            in_placeholder = true;
        } else {
            out.push(ch);
        }
    }
    if in_placeholder {
        flush_placeholder(&mut out, &mut digits, by);
    }

    out
}

fn flush_placeholder(out: &mut String, digits: &mut String, by: usize) {
    if digits.is_empty() {
        // Um '$' solto não é placeholder; preserva como estava.
        out.push('$');
        return;
    }
    let n: usize = digits.parse().unwrap_or(0);
    out.push('$');
    out.push_str(&(n + by).to_string());
    digits.clear();
}

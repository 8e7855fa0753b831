//! Filter state and pagination for the despesa listing
//!
//! The listing and its total-cost card are always built from one
//! `DespesaFiltro`; `listing_query` and `custo_total_query` share the same
//! filter pairs and differ only in the paging parameters.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::models::Competencia;
use crate::types::StatusDespesa;

/// Optional filters applied to the despesa listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DespesaFiltro {
    pub descricao: Option<String>,
    pub status: Option<StatusDespesa>,
    pub origem_id: Option<String>,
    pub pagador_id: Option<String>,
    pub competencia: Option<Competencia>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
}

/// Look up a parameter by any of its accepted names, ignoring blank values
fn param<'a>(params: &'a HashMap<String, String>, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .filter_map(|name| params.get(*name))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

impl DespesaFiltro {
    /// Build from request query parameters
    ///
    /// Blank values leave the filter unset. Values that fail to parse
    /// (status, dates, competência) are dropped with a debug log.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let status = param(params, &["status"]).and_then(|s| match s.parse() {
            Ok(status) => Some(status),
            Err(e) => {
                log::debug!("Ignoring status filter: {}", e);
                None
            }
        });
        let competencia = param(params, &["competencia"]).and_then(|s| match s.parse() {
            Ok(c) => Some(c),
            Err(e) => {
                log::debug!("Ignoring competencia filter: {}", e);
                None
            }
        });

        Self {
            descricao: param(params, &["descricao"]).map(str::to_string),
            status,
            origem_id: param(params, &["origemId", "origem_id"]).map(str::to_string),
            pagador_id: param(params, &["pagadorId", "pagador_id"]).map(str::to_string),
            competencia,
            data_inicio: param(params, &["dataInicio", "data_inicio"]).and_then(parse_date),
            data_fim: param(params, &["dataFim", "data_fim"]).and_then(parse_date),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_query_pairs().is_empty()
    }

    /// Number of filters currently set
    pub fn active_count(&self) -> usize {
        self.to_query_pairs().len()
    }

    /// Backend query pairs in a fixed order; unset fields are omitted
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        let text = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        if let Some(descricao) = text(&self.descricao) {
            pairs.push(("descricao", descricao));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(origem_id) = text(&self.origem_id) {
            pairs.push(("origemId", origem_id));
        }
        if let Some(pagador_id) = text(&self.pagador_id) {
            pairs.push(("pagadorId", pagador_id));
        }
        if let Some(competencia) = self.competencia {
            pairs.push(("competencia", competencia.to_string()));
        }
        if let Some(inicio) = self.data_inicio {
            pairs.push(("dataInicio", inicio.format("%Y-%m-%d").to_string()));
        }
        if let Some(fim) = self.data_fim {
            pairs.push(("dataFim", fim.format("%Y-%m-%d").to_string()));
        }

        pairs
    }
}

/// Zero-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Parse `page` and `size`, clamping size into `1..=max_size`
    pub fn from_params(params: &HashMap<String, String>, default_size: u32, max_size: u32) -> Self {
        let page = param(params, &["page"])
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(0);
        let size = param(params, &["size"])
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(default_size)
            .clamp(1, max_size.max(1));
        Self { page, size }
    }

    pub fn previous(&self) -> Self {
        Self { page: self.page.saturating_sub(1), size: self.size }
    }

    pub fn next(&self) -> Self {
        Self { page: self.page.saturating_add(1), size: self.size }
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![("page", self.page.to_string()), ("size", self.size.to_string())]
    }
}

/// Percent-encode pairs into a query string (without the leading `?`)
pub fn build_query<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                urlencoding::encode(k.as_ref()),
                urlencoding::encode(v.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Query for one page of the listing
pub fn listing_query(filtro: &DespesaFiltro, page: &PageRequest) -> String {
    let mut pairs = filtro.to_query_pairs();
    pairs.extend(page.to_query_pairs());
    build_query(&pairs)
}

/// Query for the total cost of the same filter set, without paging
pub fn custo_total_query(filtro: &DespesaFiltro) -> String {
    build_query(&filtro.to_query_pairs())
}

/// Query for a name search (`nome=<term>&page=0&size=<size>`)
pub fn search_query(term: &str, size: u32) -> String {
    build_query(&[
        ("nome", term.trim().to_string()),
        ("page", "0".to_string()),
        ("size", size.to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_empty_filter_has_no_pairs() {
        let filtro = DespesaFiltro::from_params(&params(&[("descricao", "  "), ("status", "")]));
        assert!(filtro.is_empty());
        assert_eq!(custo_total_query(&filtro), "");
    }

    #[test]
    fn test_filter_pairs_use_backend_names_in_order() {
        let filtro = DespesaFiltro::from_params(&params(&[
            ("dataFim", "2025-03-31"),
            ("descricao", " mercado "),
            ("status", "pago"),
            ("origemId", "o-1"),
            ("pagador_id", "p-2"),
            ("competencia", "2025-03"),
            ("dataInicio", "2025-03-01"),
        ]));

        let names: Vec<&str> = filtro.to_query_pairs().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            names,
            vec!["descricao", "status", "origemId", "pagadorId", "competencia", "dataInicio", "dataFim"]
        );
        assert_eq!(filtro.descricao.as_deref(), Some("mercado"));
        assert_eq!(filtro.status, Some(StatusDespesa::Pago));
        assert_eq!(filtro.active_count(), 7);
    }

    #[test]
    fn test_unparsable_values_are_ignored() {
        let filtro = DespesaFiltro::from_params(&params(&[
            ("status", "quitado"),
            ("dataInicio", "31/03/2025"),
            ("competencia", "2025-13"),
            ("descricao", "luz"),
        ]));
        assert_eq!(filtro.to_query_pairs(), vec![("descricao", "luz".to_string())]);
    }

    #[test]
    fn test_query_encoding() {
        let filtro = DespesaFiltro {
            descricao: Some("pão & café".to_string()),
            competencia: "MARÇO/2025".parse().ok(),
            ..Default::default()
        };
        assert_eq!(
            custo_total_query(&filtro),
            "descricao=p%C3%A3o%20%26%20caf%C3%A9&competencia=MAR%C3%87O%2F2025"
        );
    }

    #[test]
    fn test_listing_and_total_share_filter_pairs() {
        let filtro = DespesaFiltro {
            status: Some(StatusDespesa::NaoPago),
            pagador_id: Some("p-9".to_string()),
            ..Default::default()
        };
        let page = PageRequest::new(2, 11);

        let listing = listing_query(&filtro, &page);
        let total = custo_total_query(&filtro);
        assert_eq!(listing, format!("{}&page=2&size=11", total));
        assert!(!total.contains("page="));
    }

    #[test]
    fn test_page_request_parsing_and_clamping() {
        let default = PageRequest::from_params(&HashMap::new(), 11, 100);
        assert_eq!(default, PageRequest::new(0, 11));

        let parsed = PageRequest::from_params(&params(&[("page", "3"), ("size", "25")]), 11, 100);
        assert_eq!(parsed, PageRequest::new(3, 25));

        let too_big = PageRequest::from_params(&params(&[("size", "5000")]), 11, 100);
        assert_eq!(too_big.size, 100);

        let zero = PageRequest::from_params(&params(&[("size", "0"), ("page", "-1")]), 11, 100);
        assert_eq!(zero, PageRequest::new(0, 1));
    }

    #[test]
    fn test_page_navigation() {
        let page = PageRequest::new(0, 11);
        assert_eq!(page.previous().page, 0);
        assert_eq!(page.next().page, 1);
        assert_eq!(PageRequest::new(u32::MAX, 11).next().page, u32::MAX);
    }

    #[test]
    fn test_search_query() {
        assert_eq!(search_query(" Nubank ", 10), "nome=Nubank&page=0&size=10");
    }
}

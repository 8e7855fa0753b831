//! Form input and the JSON payloads sent to the backend
//!
//! Each `*Input` keeps the raw submitted strings (so a rejected form can be
//! re-rendered with what the user typed) and validates into a payload.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::models::decimal_number;
use crate::types::{StatusDespesa, TipoOrigem, TipoPagamento, TipoParcela};

fn field(fields: &HashMap<String, String>, name: &str) -> String {
    fields.get(name).map(|v| v.trim().to_string()).unwrap_or_default()
}

fn required(value: &str, name: &str, message: &str) -> CoreResult<String> {
    if value.is_empty() {
        Err(CoreError::validation(name, message))
    } else {
        Ok(value.to_string())
    }
}

/// Parse an amount typed as `152.37`, `152,37` or `1.234,56`
pub fn parse_valor(value: &str) -> CoreResult<Decimal> {
    let cleaned = value.trim().trim_start_matches("R$").trim().replace(' ', "");
    if cleaned.is_empty() {
        return Err(CoreError::validation("valor", "Valor é obrigatório"));
    }
    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };
    Decimal::from_str(&normalized).map_err(|_| CoreError::validation("valor", "Valor inválido"))
}

/// Blank dates default to today
fn parse_data(value: &str) -> CoreResult<String> {
    if value.is_empty() {
        return Ok(chrono::Local::now().date_naive().format("%Y-%m-%d").to_string());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| CoreError::validation("data", "Data inválida"))
}

fn parse_enum<T: FromStr<Err = String> + Default>(value: &str, name: &str) -> CoreResult<T> {
    if value.is_empty() {
        return Ok(T::default());
    }
    value.parse().map_err(|e: String| CoreError::validation(name, &e))
}

fn parse_dia(value: &str, name: &str, message: &str) -> CoreResult<Option<u8>> {
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<u8>() {
        Ok(dia) if (1..=31).contains(&dia) => Ok(Some(dia)),
        _ => Err(CoreError::validation(name, message)),
    }
}

fn parse_count(value: &str, name: &str, message: &str) -> CoreResult<u32> {
    if value.is_empty() {
        return Ok(1);
    }
    match value.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(CoreError::validation(name, message)),
    }
}

// ==================== Payloads ====================

/// Instalment plan of a new despesa
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelaForm {
    pub tipo_parcela: TipoParcela,
    pub total: u32,
    pub numero_original: u32,
}

impl Default for ParcelaForm {
    fn default() -> Self {
        Self {
            tipo_parcela: TipoParcela::Compra,
            total: 1,
            numero_original: 1,
        }
    }
}

impl ParcelaForm {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NovaDespesaPayload {
    pub descricao: String,
    #[serde(with = "decimal_number")]
    pub valor: Decimal,
    pub data: String,
    /// Only sent when it differs from a single purchase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parcela_form: Option<ParcelaForm>,
    pub origem_id: String,
    pub pagador_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NovaOrigemPayload {
    pub nome: String,
    pub tipo_origem: TipoOrigem,
}

/// Origem of an edited despesa: an existing record or one created inline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OrigemSelecao {
    #[serde(rename = "origemId")]
    Existente(String),
    #[serde(rename = "origemForm")]
    Nova(NovaOrigemPayload),
}

impl OrigemSelecao {
    pub fn is_nova(&self) -> bool {
        matches!(self, OrigemSelecao::Nova(_))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditDespesaPayload {
    pub descricao: String,
    #[serde(with = "decimal_number")]
    pub valor: Decimal,
    pub data: String,
    pub status: StatusDespesa,
    #[serde(flatten)]
    pub origem: OrigemSelecao,
    pub pagador_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NovoPagadorPayload {
    pub nome: String,
    pub tipo_pagamento_enum: TipoPagamento,
    pub dia_fatura: Option<u8>,
    pub dia_fechamento: Option<u8>,
}

// ==================== Inputs ====================

/// Raw fields of the "Nova Despesa" form
#[derive(Debug, Clone, Default)]
pub struct NovaDespesaInput {
    pub descricao: String,
    pub valor: String,
    pub data: String,
    pub origem_id: String,
    pub pagador_id: String,
    pub tipo_parcela: String,
    pub total_parcelas: String,
    pub numero_original: String,
}

impl NovaDespesaInput {
    pub fn read(fields: &HashMap<String, String>) -> Self {
        Self {
            descricao: field(fields, "descricao"),
            valor: field(fields, "valor"),
            data: field(fields, "data"),
            origem_id: field(fields, "origemId"),
            pagador_id: field(fields, "pagadorId"),
            tipo_parcela: field(fields, "tipoParcela"),
            total_parcelas: field(fields, "totalParcelas"),
            numero_original: field(fields, "numeroOriginal"),
        }
    }

    pub fn validate(&self) -> CoreResult<NovaDespesaPayload> {
        let descricao = required(&self.descricao, "descricao", "Descrição é obrigatória")?;
        let valor = parse_valor(&self.valor)?;
        let data = parse_data(&self.data)?;
        let origem_id = required(&self.origem_id, "origemId", "Selecione uma origem")?;
        let pagador_id = required(&self.pagador_id, "pagadorId", "Selecione um pagador")?;

        let parcela = ParcelaForm {
            tipo_parcela: parse_enum(&self.tipo_parcela, "tipoParcela")?,
            total: parse_count(&self.total_parcelas, "totalParcelas", "Total de parcelas inválido")?,
            numero_original: parse_count(
                &self.numero_original,
                "numeroOriginal",
                "Número da parcela inválido",
            )?,
        };

        Ok(NovaDespesaPayload {
            descricao,
            valor,
            data,
            parcela_form: (!parcela.is_default()).then_some(parcela),
            origem_id,
            pagador_id,
        })
    }

    pub fn from_fields(fields: &HashMap<String, String>) -> CoreResult<NovaDespesaPayload> {
        Self::read(fields).validate()
    }
}

/// Raw fields of the despesa edit form
#[derive(Debug, Clone, Default)]
pub struct EditDespesaInput {
    pub descricao: String,
    pub valor: String,
    pub data: String,
    pub status: String,
    /// `nova` switches to inline origem creation
    pub origem_modo: String,
    pub origem_id: String,
    pub origem_nome: String,
    pub tipo_origem: String,
    pub pagador_id: String,
}

impl EditDespesaInput {
    pub fn read(fields: &HashMap<String, String>) -> Self {
        Self {
            descricao: field(fields, "descricao"),
            valor: field(fields, "valor"),
            data: field(fields, "data"),
            status: field(fields, "status"),
            origem_modo: field(fields, "origemModo"),
            origem_id: field(fields, "origemId"),
            origem_nome: field(fields, "origemNome"),
            tipo_origem: field(fields, "tipoOrigem"),
            pagador_id: field(fields, "pagadorId"),
        }
    }

    pub fn is_nova_origem(&self) -> bool {
        self.origem_modo.eq_ignore_ascii_case("nova")
    }

    pub fn validate(&self) -> CoreResult<EditDespesaPayload> {
        let descricao = required(&self.descricao, "descricao", "Descrição é obrigatória")?;
        let valor = parse_valor(&self.valor)?;
        let data = parse_data(&self.data)?;
        let status: StatusDespesa = parse_enum(&self.status, "status")?;

        let origem = if self.is_nova_origem() {
            OrigemSelecao::Nova(NovaOrigemPayload {
                nome: required(&self.origem_nome, "origemNome", "Nome da nova origem é obrigatório")?,
                tipo_origem: parse_enum(&self.tipo_origem, "tipoOrigem")?,
            })
        } else {
            OrigemSelecao::Existente(required(&self.origem_id, "origemId", "Selecione uma origem")?)
        };

        let pagador_id = required(&self.pagador_id, "pagadorId", "Selecione um pagador")?;

        Ok(EditDespesaPayload {
            descricao,
            valor,
            data,
            status,
            origem,
            pagador_id,
        })
    }

    pub fn from_fields(fields: &HashMap<String, String>) -> CoreResult<EditDespesaPayload> {
        Self::read(fields).validate()
    }
}

/// Raw fields of the origem creation form
#[derive(Debug, Clone, Default)]
pub struct NovaOrigemInput {
    pub nome: String,
    pub tipo_origem: String,
}

impl NovaOrigemInput {
    pub fn read(fields: &HashMap<String, String>) -> Self {
        Self {
            nome: field(fields, "nome"),
            tipo_origem: field(fields, "tipoOrigem"),
        }
    }

    pub fn validate(&self) -> CoreResult<NovaOrigemPayload> {
        Ok(NovaOrigemPayload {
            nome: required(&self.nome, "nome", "Nome é obrigatório")?,
            tipo_origem: parse_enum(&self.tipo_origem, "tipoOrigem")?,
        })
    }

    pub fn from_fields(fields: &HashMap<String, String>) -> CoreResult<NovaOrigemPayload> {
        Self::read(fields).validate()
    }
}

/// Raw fields of the pagador creation form
#[derive(Debug, Clone, Default)]
pub struct NovoPagadorInput {
    pub nome: String,
    pub tipo_pagamento: String,
    pub dia_fatura: String,
    pub dia_fechamento: String,
}

impl NovoPagadorInput {
    pub fn read(fields: &HashMap<String, String>) -> Self {
        Self {
            nome: field(fields, "nome"),
            tipo_pagamento: field(fields, "tipoPagamentoEnum"),
            dia_fatura: field(fields, "diaFatura"),
            dia_fechamento: field(fields, "diaFechamento"),
        }
    }

    pub fn validate(&self) -> CoreResult<NovoPagadorPayload> {
        Ok(NovoPagadorPayload {
            nome: required(&self.nome, "nome", "Nome é obrigatório")?,
            tipo_pagamento_enum: parse_enum(&self.tipo_pagamento, "tipoPagamentoEnum")?,
            dia_fatura: parse_dia(
                &self.dia_fatura,
                "diaFatura",
                "Dia da fatura deve estar entre 1 e 31",
            )?,
            dia_fechamento: parse_dia(
                &self.dia_fechamento,
                "diaFechamento",
                "Dia do fechamento deve estar entre 1 e 31",
            )?,
        })
    }

    pub fn from_fields(fields: &HashMap<String, String>) -> CoreResult<NovoPagadorPayload> {
        Self::read(fields).validate()
    }
}

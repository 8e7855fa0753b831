//! Client-side projections of the backend's entities

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::types::{StatusDespesa, TipoOrigem, TipoPagamento};

/// Upper-case month names as the backend spells them in competências
pub const MESES: [&str; 12] = [
    "JANEIRO", "FEVEREIRO", "MARÇO", "ABRIL", "MAIO", "JUNHO", "JULHO", "AGOSTO", "SETEMBRO",
    "OUTUBRO", "NOVEMBRO", "DEZEMBRO",
];

/// Monetary values travel as JSON numbers; decoding goes through the
/// number's text so `152.37` stays exact
pub mod decimal_number {
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let number = value
            .to_f64()
            .ok_or_else(|| serde::ser::Error::custom(format!("valor fora do intervalo: {}", value)))?;
        serializer.serialize_f64(number)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let text = match value {
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) => s,
            other => return Err(serde::de::Error::custom(format!("invalid amount: {}", other))),
        };
        Decimal::from_str(text.trim())
            .or_else(|_| Decimal::from_scientific(text.trim()))
            .map_err(serde::de::Error::custom)
    }
}

/// Identifiers arrive as strings or numbers depending on the backend version
fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid id: {}", other))),
    }
}

fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!("invalid id: {}", other))),
    }
}

/// Expense record
///
/// The listing endpoint returns the display names of origem and pagador;
/// the detail endpoint also carries their ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Despesa {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub descricao: String,
    #[serde(with = "decimal_number")]
    pub valor: Decimal,
    /// YYYY-MM-DD
    pub data: String,
    #[serde(default)]
    pub status: StatusDespesa,
    #[serde(default)]
    pub origem: String,
    #[serde(default)]
    pub pagador: String,
    /// MES/ANO, e.g. `MARÇO/2025`
    #[serde(default)]
    pub competencia: String,
    #[serde(default)]
    pub numero_parcela: Option<u32>,
    #[serde(default)]
    pub total_parcela: Option<u32>,
    #[serde(default, deserialize_with = "de_opt_id", skip_serializing_if = "Option::is_none")]
    pub origem_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id", skip_serializing_if = "Option::is_none")]
    pub pagador_id: Option<String>,
}

impl Despesa {
    /// `3/10` style label when the expense is an instalment
    pub fn parcela_label(&self) -> Option<String> {
        match (self.numero_parcela, self.total_parcela) {
            (Some(numero), Some(total)) => Some(format!("{}/{}", numero, total)),
            _ => None,
        }
    }
}

/// Expense category/source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Origem {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub nome: String,
    /// Kept as text so unknown categories still render
    #[serde(default)]
    pub tipo_origem: String,
}

impl Origem {
    pub fn tipo(&self) -> Option<TipoOrigem> {
        self.tipo_origem.parse().ok()
    }

    /// Human label for the category, falling back to the raw tag
    pub fn tipo_label(&self) -> String {
        self.tipo()
            .map(|t| t.label().to_string())
            .unwrap_or_else(|| self.tipo_origem.clone())
    }
}

/// Payment account/payer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagador {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub nome: String,
    #[serde(default)]
    pub tipo_pagamento_enum: String,
    #[serde(default)]
    pub dia_fatura: Option<u8>,
    #[serde(default)]
    pub dia_fechamento: Option<u8>,
}

impl Pagador {
    pub fn tipo(&self) -> Option<TipoPagamento> {
        self.tipo_pagamento_enum.parse().ok()
    }

    pub fn tipo_label(&self) -> String {
        self.tipo()
            .map(|t| t.label().to_string())
            .unwrap_or_else(|| self.tipo_pagamento_enum.clone())
    }
}

/// Spring-style page envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_elements: u64,
    /// Zero-based page index
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            content: Vec::new(),
            total_pages: 0,
            total_elements: 0,
            number: 0,
            size: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    pub fn has_next(&self) -> bool {
        self.number.saturating_add(1) < self.total_pages
    }
}

impl<T: for<'de> Deserialize<'de>> Page<T> {
    /// Decode a page, accepting a bare JSON array as a single page
    pub fn from_value(value: serde_json::Value) -> CoreResult<Self> {
        match value {
            serde_json::Value::Null => Ok(Self::empty()),
            serde_json::Value::Array(_) => {
                let content: Vec<T> = serde_json::from_value(value).map_err(CoreError::decode)?;
                let len = content.len();
                Ok(Self {
                    content,
                    total_pages: if len == 0 { 0 } else { 1 },
                    total_elements: len as u64,
                    number: 0,
                    size: len as u32,
                })
            }
            other => serde_json::from_value(other).map_err(CoreError::decode),
        }
    }
}

/// Total cost aggregate for a filter set
pub struct CustoTotal;

impl CustoTotal {
    const KEYS: [&'static str; 4] = ["custoTotal", "total", "valor", "valorTotal"];

    /// Extract the total from a bare number, a numeric string or an object
    pub fn from_value(value: &serde_json::Value) -> CoreResult<Decimal> {
        match value {
            serde_json::Value::Number(n) => Decimal::from_str(&n.to_string())
                .ok()
                .or_else(|| n.as_f64().and_then(Decimal::from_f64))
                .ok_or_else(|| CoreError::Decode {
                    message: format!("custo total fora do intervalo: {}", n),
                }),
            serde_json::Value::String(s) => {
                Decimal::from_str(s.trim()).map_err(|e| CoreError::Decode {
                    message: format!("custo total inválido '{}': {}", s, e),
                })
            }
            serde_json::Value::Object(map) => Self::KEYS
                .iter()
                .find_map(|key| map.get(*key))
                .map(Self::from_value)
                .unwrap_or_else(|| {
                    Err(CoreError::Decode {
                        message: "resposta de custo total sem campo de valor".to_string(),
                    })
                }),
            serde_json::Value::Null => Ok(Decimal::ZERO),
            other => Err(CoreError::Decode {
                message: format!("resposta de custo total inesperada: {}", other),
            }),
        }
    }
}

/// Accounting month/year bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Competencia {
    pub ano: i32,
    /// 1-12
    pub mes: u32,
}

impl Competencia {
    pub fn new(mes: u32, ano: i32) -> Option<Self> {
        (1..=12).contains(&mes).then_some(Self { ano, mes })
    }

    /// Value for an `<input type="month">`
    pub fn to_month_input(&self) -> String {
        format!("{:04}-{:02}", self.ano, self.mes)
    }

    /// Short display label, e.g. `Mar 2025`
    pub fn label(&self) -> String {
        gastos_utils::format_competencia(&self.to_string())
    }
}

impl FromStr for Competencia {
    type Err = String;

    /// Accepts the backend's `MARÇO/2025` form and the `2025-03` month-input form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || format!("Competência inválida: {}", s);

        if let Some((mes, ano)) = s.split_once('/') {
            let wanted = mes.trim().to_uppercase().replace('Ç', "C");
            let mes = MESES
                .iter()
                .position(|m| m.replace('Ç', "C") == wanted)
                .ok_or_else(invalid)? as u32
                + 1;
            let ano = ano.trim().parse::<i32>().map_err(|_| invalid())?;
            return Competencia::new(mes, ano).ok_or_else(invalid);
        }

        if let Some((ano, mes)) = s.split_once('-') {
            let ano = ano.parse::<i32>().map_err(|_| invalid())?;
            let mes = mes.parse::<u32>().map_err(|_| invalid())?;
            return Competencia::new(mes, ano).ok_or_else(invalid);
        }

        Err(invalid())
    }
}

impl std::fmt::Display for Competencia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", MESES[(self.mes - 1) as usize], self.ano)
    }
}

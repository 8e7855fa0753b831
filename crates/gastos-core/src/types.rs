//! Enumerated tags shared with the backend
//!
//! Wire names are the backend's upper-case identifiers; `label()` gives
//! the pt-BR text shown in the UI.

use serde::{Deserialize, Serialize};

/// Payment status of a despesa
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusDespesa {
    NaoPago,
    Pago,
    /// Any status this client does not know; never sent back as a choice
    #[serde(other)]
    Desconhecido,
}

impl StatusDespesa {
    pub const ALL: [StatusDespesa; 2] = [StatusDespesa::NaoPago, StatusDespesa::Pago];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusDespesa::NaoPago => "NAO_PAGO",
            StatusDespesa::Pago => "PAGO",
            StatusDespesa::Desconhecido => "DESCONHECIDO",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusDespesa::NaoPago => "Não Pago",
            StatusDespesa::Pago => "Pago",
            StatusDespesa::Desconhecido => "Desconhecido",
        }
    }
}

impl Default for StatusDespesa {
    fn default() -> Self {
        StatusDespesa::NaoPago
    }
}

impl std::str::FromStr for StatusDespesa {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NAO_PAGO" => Ok(StatusDespesa::NaoPago),
            "PAGO" => Ok(StatusDespesa::Pago),
            _ => Err(format!("Status inválido: {}", s)),
        }
    }
}

impl std::fmt::Display for StatusDespesa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category tag of an origem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoOrigem {
    Lazer,
    Restaurante,
    Supermercado,
    Farmacia,
    Assinatura,
    Combustivel,
    Compras,
    Saude,
    Juros,
    InfraTrabalho,
    Pet,
    PerfumariaVestuario,
}

impl TipoOrigem {
    pub const ALL: [TipoOrigem; 12] = [
        TipoOrigem::Lazer,
        TipoOrigem::Restaurante,
        TipoOrigem::Supermercado,
        TipoOrigem::Farmacia,
        TipoOrigem::Assinatura,
        TipoOrigem::Combustivel,
        TipoOrigem::Compras,
        TipoOrigem::Saude,
        TipoOrigem::Juros,
        TipoOrigem::InfraTrabalho,
        TipoOrigem::Pet,
        TipoOrigem::PerfumariaVestuario,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TipoOrigem::Lazer => "LAZER",
            TipoOrigem::Restaurante => "RESTAURANTE",
            TipoOrigem::Supermercado => "SUPERMERCADO",
            TipoOrigem::Farmacia => "FARMACIA",
            TipoOrigem::Assinatura => "ASSINATURA",
            TipoOrigem::Combustivel => "COMBUSTIVEL",
            TipoOrigem::Compras => "COMPRAS",
            TipoOrigem::Saude => "SAUDE",
            TipoOrigem::Juros => "JUROS",
            TipoOrigem::InfraTrabalho => "INFRA_TRABALHO",
            TipoOrigem::Pet => "PET",
            TipoOrigem::PerfumariaVestuario => "PERFUMARIA_VESTUARIO",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TipoOrigem::Lazer => "Lazer",
            TipoOrigem::Restaurante => "Restaurante",
            TipoOrigem::Supermercado => "Supermercado",
            TipoOrigem::Farmacia => "Farmácia",
            TipoOrigem::Assinatura => "Assinatura",
            TipoOrigem::Combustivel => "Combustível",
            TipoOrigem::Compras => "Compras",
            TipoOrigem::Saude => "Saúde",
            TipoOrigem::Juros => "Juros",
            TipoOrigem::InfraTrabalho => "Infraestrutura de Trabalho",
            TipoOrigem::Pet => "Pet",
            TipoOrigem::PerfumariaVestuario => "Perfumaria e Vestuário",
        }
    }
}

impl Default for TipoOrigem {
    fn default() -> Self {
        TipoOrigem::Lazer
    }
}

impl std::str::FromStr for TipoOrigem {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        TipoOrigem::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| format!("Tipo de origem inválido: {}", s))
    }
}

impl std::fmt::Display for TipoOrigem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a pagador pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoPagamento {
    Credito,
    Debito,
}

impl TipoPagamento {
    pub const ALL: [TipoPagamento; 2] = [TipoPagamento::Credito, TipoPagamento::Debito];

    pub fn as_str(&self) -> &'static str {
        match self {
            TipoPagamento::Credito => "CREDITO",
            TipoPagamento::Debito => "DEBITO",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TipoPagamento::Credito => "Crédito",
            TipoPagamento::Debito => "Débito",
        }
    }
}

impl Default for TipoPagamento {
    fn default() -> Self {
        TipoPagamento::Credito
    }
}

impl std::str::FromStr for TipoPagamento {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CREDITO" => Ok(TipoPagamento::Credito),
            "DEBITO" => Ok(TipoPagamento::Debito),
            _ => Err(format!("Tipo de pagamento inválido: {}", s)),
        }
    }
}

impl std::fmt::Display for TipoPagamento {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single purchase or instalment plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoParcela {
    Compra,
    Parcelado,
}

impl TipoParcela {
    pub const ALL: [TipoParcela; 2] = [TipoParcela::Compra, TipoParcela::Parcelado];

    pub fn as_str(&self) -> &'static str {
        match self {
            TipoParcela::Compra => "COMPRA",
            TipoParcela::Parcelado => "PARCELADO",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TipoParcela::Compra => "Compra",
            TipoParcela::Parcelado => "Parcelado",
        }
    }
}

impl Default for TipoParcela {
    fn default() -> Self {
        TipoParcela::Compra
    }
}

impl std::str::FromStr for TipoParcela {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "COMPRA" => Ok(TipoParcela::Compra),
            "PARCELADO" => Ok(TipoParcela::Parcelado),
            _ => Err(format!("Tipo de parcela inválido: {}", s)),
        }
    }
}

impl std::fmt::Display for TipoParcela {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_str() {
        assert_eq!("pago".parse::<StatusDespesa>().unwrap(), StatusDespesa::Pago);
        assert_eq!("NAO_PAGO".parse::<StatusDespesa>().unwrap(), StatusDespesa::NaoPago);
        assert!("quitado".parse::<StatusDespesa>().is_err());
        assert!("DESCONHECIDO".parse::<StatusDespesa>().is_err());
    }

    #[test]
    fn test_unknown_status_decodes_to_fallback() {
        let status: StatusDespesa = serde_json::from_str("\"CANCELADO\"").unwrap();
        assert_eq!(status, StatusDespesa::Desconhecido);
        assert!(!StatusDespesa::ALL.contains(&status));
    }

    #[test]
    fn test_tipo_origem_wire_names() {
        assert_eq!(
            serde_json::to_string(&TipoOrigem::PerfumariaVestuario).unwrap(),
            "\"PERFUMARIA_VESTUARIO\""
        );
        for tipo in TipoOrigem::ALL {
            assert_eq!(tipo.as_str().parse::<TipoOrigem>().unwrap(), tipo);
            let json = serde_json::to_string(&tipo).unwrap();
            assert_eq!(json, format!("\"{}\"", tipo.as_str()));
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(StatusDespesa::NaoPago.label(), "Não Pago");
        assert_eq!(TipoOrigem::InfraTrabalho.label(), "Infraestrutura de Trabalho");
        assert_eq!(TipoPagamento::Debito.label(), "Débito");
    }
}

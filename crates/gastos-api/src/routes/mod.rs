//! Route modules for the web server
//!
//! - despesas: Listing with filters, total cost, pagination, create/edit modals
//! - origens: Origem list, creation, search picker
//! - pagadores: Pagador list, creation, search picker
//! - configuracoes: Settings page, health and cache endpoints
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints and HTMX fragments
//! - page.rs: Page rendering

pub mod configuracoes;
pub mod despesas;
pub mod origens;
pub mod pagadores;

use gastos_utils::escape_html;
use serde::Deserialize;

/// Query of the `/busca` pickers
///
/// The picker's text box is named after its entity (`origemBusca`,
/// `pagadorBusca`); plain `nome` works too.
#[derive(Debug, Default, Deserialize)]
pub struct BuscaParams {
    #[serde(default, alias = "origemBusca", alias = "pagadorBusca")]
    pub nome: String,
    #[serde(default)]
    pub campo: Option<String>,
}

impl BuscaParams {
    pub fn term(&self) -> &str {
        self.nome.trim()
    }

    /// Id of the hidden input the picker fills; anything but a plain identifier falls back
    pub fn campo<'a>(&'a self, default: &'a str) -> &'a str {
        match self.campo.as_deref() {
            Some(campo) if !campo.is_empty() && campo.chars().all(|c| c.is_ascii_alphanumeric()) => campo,
            _ => default,
        }
    }
}

/// One selectable result of a picker search
pub(crate) struct Opcao<'a> {
    pub id: &'a str,
    pub nome: &'a str,
    pub detalhe: String,
}

/// Dropdown under a picker; clicking an entry calls `selecionarOpcao`
pub(crate) fn render_opcoes(campo: &str, opcoes: &[Opcao<'_>], empty_message: &str) -> String {
    if opcoes.is_empty() {
        return format!(
            "<div class='absolute z-10 w-full bg-white border rounded-lg shadow-lg mt-1 px-3 py-2 text-sm text-gray-500'>{}</div>",
            empty_message
        );
    }

    let items: String = opcoes
        .iter()
        .map(|o| {
            format!(
                r#"<div class='px-3 py-2 hover:bg-indigo-50 cursor-pointer text-sm border-b last:border-0' data-id='{id}' data-nome='{nome}' onclick="selecionarOpcao(this, '{campo}')"><div class='font-medium'>{nome}</div><div class='text-xs text-gray-500'>{detalhe}</div></div>"#,
                id = escape_html(o.id),
                nome = escape_html(o.nome),
                campo = campo,
                detalhe = escape_html(&o.detalhe),
            )
        })
        .collect();

    format!(
        "<div class='absolute z-10 w-full bg-white border rounded-lg shadow-lg mt-1 max-h-48 overflow-auto'>{}</div>",
        items
    )
}

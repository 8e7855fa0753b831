//! HTTP server with HTMX pages for the expense tracker
//!
//! Routes are organized into modules:
//! - routes::despesas: Listing with filters and pagination, create, detail, edit
//! - routes::origens: Origem list, creation and search picker
//! - routes::pagadores: Pagador list, creation and search picker
//! - routes::configuracoes: Effective configuration and backend status
//!
//! Every page renders as a full document, or as its content only when the
//! request carries the `HX-Request` header.

pub mod error;
pub mod routes;

use axum::{
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use gastos_config::Config;
use gastos_core::{CoreError, Tracker};
use gastos_utils::{escape_html, MoneyFormat};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<Tracker>,
    pub config: Config,
}

impl AppState {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        let config = tracker.config().clone();
        Self { tracker, config }
    }

    pub fn money_format(&self) -> MoneyFormat {
        MoneyFormat {
            symbol: self.config.currency.symbol.clone(),
            decimal_separator: self.config.currency.decimal_separator.clone(),
            thousands_separator: self.config.currency.thousands_separator.clone(),
        }
    }

    pub fn format_money(&self, value: Decimal) -> String {
        gastos_utils::format_money(value, &self.money_format())
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::configuracoes::{api_cache_clear, api_health, page_configuracoes};
    use routes::despesas::{
        api_custo_total, api_despesa_detail, api_despesas, htmx_despesa_create_form,
        htmx_despesa_detail, htmx_despesa_edit_form, htmx_despesa_store, htmx_despesa_update,
        htmx_despesas_list, page_despesas,
    };
    use routes::origens::{api_origens, htmx_origem_search, htmx_origem_store, htmx_origens_list, page_origens};
    use routes::pagadores::{
        api_pagadores, htmx_pagador_search, htmx_pagador_store, htmx_pagadores_list, page_pagadores,
    };

    Router::new()
        // API endpoints
        .route("/api/health", get(api_health))
        .route("/api/despesas", get(api_despesas))
        .route("/api/despesas/:id", get(api_despesa_detail))
        .route("/api/custo-total", get(api_custo_total))
        .route("/api/origens", get(api_origens))
        .route("/api/pagadores", get(api_pagadores))
        .route("/api/cache/clear", post(api_cache_clear))
        // HTMX page routes
        .route("/", get(page_despesas))
        .route("/despesas", get(page_despesas).post(htmx_despesa_store))
        .route("/origens", get(page_origens).post(htmx_origem_store))
        .route("/pagadores", get(page_pagadores).post(htmx_pagador_store))
        .route("/configuracoes", get(page_configuracoes))
        // HTMX partial routes
        .route("/despesas/lista", get(htmx_despesas_list))
        .route("/despesas/nova", get(htmx_despesa_create_form))
        .route("/despesas/:id", get(htmx_despesa_detail).put(htmx_despesa_update))
        .route("/despesas/:id/editar", get(htmx_despesa_edit_form))
        .route("/origens/lista", get(htmx_origens_list))
        .route("/origens/busca", get(htmx_origem_search))
        .route("/pagadores/lista", get(htmx_pagadores_list))
        .route("/pagadores/busca", get(htmx_pagador_search))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Gastos</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
    <div id='modal-area'></div>
    <div id='toast-area' class='fixed top-4 right-4 z-[60] space-y-2 w-80'></div>
    <script>
    function fecharModal() {{
        const area = document.getElementById('modal-area');
        if (area) {{ area.innerHTML = ''; }}
    }}
    // Search pickers: copy the chosen id into the hidden input and the name into the visible one
    function selecionarOpcao(el, campo) {{
        const hidden = document.getElementById(campo);
        const busca = document.getElementById(campo + '-busca');
        const lista = document.getElementById(campo + '-resultados');
        if (hidden) {{ hidden.value = el.dataset.id; }}
        if (busca) {{ busca.value = el.dataset.nome; }}
        if (lista) {{ lista.innerHTML = ''; }}
    }}
    document.addEventListener('keydown', function(e) {{
        if (e.key === 'Escape') fecharModal();
    }});
    document.body.addEventListener('htmx:afterSwap', function() {{
        document.querySelectorAll('#toast-area > div').forEach(function(t) {{
            if (!t.dataset.timer) {{
                t.dataset.timer = '1';
                setTimeout(function() {{ t.remove(); }}, 4000);
            }}
        }});
    }});
    </script>
</body>
</html>"#,
        escape_html(title),
        content
    )
}

/// Navigation sidebar
pub fn nav_sidebar(current_path: &str) -> String {
    let links = [
        ("/", "Despesas", "despesas"),
        ("/origens", "Origens", "origens"),
        ("/pagadores", "Pagadores", "pagadores"),
        ("/configuracoes", "Configurações", "configuracoes"),
    ];

    let mut nav = String::from("<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>Gastos</h1><p class='text-xs text-gray-500'>Controle de despesas</p></div><ul class='flex-1 py-2 space-y-1 px-2'>");

    for (path, label, id) in &links {
        let is_active = if *path == "/" {
            current_path == "/" || current_path.starts_with("/despesas")
        } else {
            current_path.starts_with(path)
        };
        let active_class = if is_active { "bg-indigo-50 text-indigo-600" } else { "text-gray-600 hover:bg-gray-50" };
        let icon = match *id {
            "despesas" => "🧾",
            "origens" => "🏷️",
            "pagadores" => "💳",
            "configuracoes" => "⚙️",
            _ => "📄",
        };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'>{}<span>{}</span></a></li>"#,
            path, active_class, icon, label
        ));
    }
    nav.push_str("</ul></div>");
    nav
}

/// Check if request is from HTMX (partial page update)
pub fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &HeaderMap, title: &str, current_path: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        format!(r#"<main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>"#, inner_content)
    } else {
        base_html(title, &format!(r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>"#,
            nav_sidebar(current_path), inner_content))
    }
}

/// Toast kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toast {
    Success,
    Error,
}

/// Out-of-band toast appended to `#toast-area`
pub fn toast(kind: Toast, title: &str, description: &str) -> String {
    let (classes, icon) = match kind {
        Toast::Success => ("bg-green-50 border-green-200 text-green-800", "✓"),
        Toast::Error => ("bg-red-50 border-red-200 text-red-800", "✗"),
    };
    format!(
        r#"<div hx-swap-oob='beforeend:#toast-area'><div class='border rounded-lg shadow p-4 {}' role='status'><div class='flex items-center gap-2'><span>{}</span><span class='font-medium'>{}</span></div><p class='text-sm mt-1'>{}</p></div></div>"#,
        classes,
        icon,
        escape_html(title),
        escape_html(description)
    )
}

/// Inline error alert
pub fn error_alert(title: &str, message: &str) -> String {
    format!(
        r#"<div class='bg-red-50 border border-red-200 rounded-lg p-4'><div class='flex items-center gap-2'><span class='text-red-600'>✗</span><span class='font-medium text-red-800'>{}</span></div><p class='text-sm text-red-600 mt-1'>{}</p></div>"#,
        escape_html(title),
        escape_html(message)
    )
}

/// User-facing message for a failed backend call
pub fn backend_error_message(state: &AppState, error: &CoreError) -> String {
    match error {
        CoreError::BackendUnavailable { .. } => format!(
            "Verifique se o backend está rodando em {}",
            state.config.backend_base_url()
        ),
        other => other.user_message(),
    }
}

/// Fragment plus an `HX-Trigger` event so listening containers reload
pub fn with_trigger(event: &'static str, html: String) -> Response {
    ([("HX-Trigger", event)], Html(html)).into_response()
}

/// Decode an `application/x-www-form-urlencoded` body
pub fn parse_form(body: &str) -> HashMap<String, String> {
    let decode = |s: &str| {
        let spaced = s.replace('+', " ");
        urlencoding::decode(&spaced)
            .map(|v| v.into_owned())
            .unwrap_or(spaced)
    };

    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (decode(key), decode(value)),
            None => (decode(pair), String::new()),
        })
        .collect()
}

/// `selected` attribute helper for `<option>`
pub fn selected(is_selected: bool) -> &'static str {
    if is_selected { "selected" } else { "" }
}

/// Start the HTTP server
///
/// Binds to `server.host:server.port` and serves until Ctrl-C.
pub async fn start_server(config: Config, tracker: Arc<Tracker>) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let state = AppState { tracker, config };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting Gastos server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Despesas)");
    log::info!("  - /origens (Origens)");
    log::info!("  - /pagadores (Pagadores)");
    log::info!("  - /configuracoes (Configurações)");
    log::info!("  - /api/* (JSON API endpoints)");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

// ==================== Tests ====================

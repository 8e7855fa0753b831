//! Settings page - effective configuration and backend status

use crate::AppState;
use gastos_utils::escape_html;
use rust_decimal::Decimal;

fn row(label: &str, value: &str) -> String {
    format!(
        "<div class='flex justify-between py-2 border-b last:border-0'><span class='text-gray-500'>{}</span><span class='font-medium'>{}</span></div>",
        label,
        escape_html(value)
    )
}

/// Configuracoes page
pub async fn page_configuracoes(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> axum::response::Html<String> {
    let config = &state.config;
    let status = state.tracker.backend_status().await;

    let backend_card = if status.reachable {
        format!(
            "<div class='flex items-center gap-2 text-green-700'><span class='w-2 h-2 rounded-full bg-green-500'></span>Conectado ({} ms)</div>",
            status.latency_ms
        )
    } else {
        format!(
            "<div class='flex items-center gap-2 text-red-700'><span class='w-2 h-2 rounded-full bg-red-500'></span>Indisponível</div><p class='text-sm text-red-600 mt-1'>{}</p>",
            escape_html(status.error.as_deref().unwrap_or(""))
        )
    };

    let cache_ttl = if state.tracker.cache().is_enabled() {
        format!("{} s ({} consultas guardadas)", config.cache.ttl_secs, state.tracker.cache().len())
    } else {
        "Desativado".to_string()
    };

    let inner_content = format!(
        r#"<div class='mb-6'>
            <h2 class='text-2xl font-bold'>Configurações</h2>
            <p class='text-sm text-gray-500'>Parâmetros em uso por este servidor</p>
        </div>
        <div class='grid grid-cols-1 lg:grid-cols-2 gap-6'>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='font-semibold mb-4'>Backend</h3>
                {backend_url}
                {timeout}
                <div class='mt-4'>{backend_card}</div>
            </div>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='font-semibold mb-4'>Servidor</h3>
                {bind}
                {page_size}
                {search_size}
                {currency}
                {log_level}
            </div>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='font-semibold mb-4'>Cache</h3>
                {cache_ttl}
                <button hx-post='/api/cache/clear' hx-swap='none'
                    class='mt-4 px-4 py-2 border rounded-lg hover:bg-gray-50'>Limpar cache</button>
            </div>
        </div>"#,
        backend_url = row("URL", &status.base_url),
        timeout = row("Timeout", &format!("{} s", config.backend.timeout_secs)),
        backend_card = backend_card,
        bind = row("Endereço", &config.bind_address()),
        page_size = row(
            "Itens por página",
            &format!("{} (máximo {})", config.pagination.page_size, config.pagination.max_page_size)
        ),
        search_size = row("Resultados de busca", &config.pagination.search_page_size.to_string()),
        currency = row("Moeda", &state.format_money(Decimal::new(123456, 2))),
        log_level = row("Log", &config.logging.level),
        cache_ttl = row("Validade", &cache_ttl),
    );

    axum::response::Html(crate::page_response(&headers, "Configurações", "/configuracoes", &inner_content))
}

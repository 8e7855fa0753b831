//! Pagador endpoints - list fragment, creation, picker search, JSON API

use super::page::render_pagador_form;
use crate::routes::{render_opcoes, BuscaParams, Opcao};
use crate::{backend_error_message, error_alert, parse_form, toast, with_trigger, ApiError, AppState, Toast};
use axum::extract::Query;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use gastos_core::{NovoPagadorInput, Pagador};
use gastos_utils::escape_html;

fn dia(value: Option<u8>) -> String {
    value.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

fn render_pagadores_table(pagadores: &[Pagador]) -> String {
    if pagadores.is_empty() {
        return "<div class='bg-white rounded-xl shadow-sm p-12 text-center text-gray-500'>Nenhum pagador cadastrado</div>".to_string();
    }

    let rows: String = pagadores
        .iter()
        .map(|p| {
            format!(
                "<tr class='border-b last:border-0'><td class='px-4 py-3 font-medium'>{}</td><td class='px-4 py-3 text-gray-600'>{}</td><td class='px-4 py-3 text-center'>{}</td><td class='px-4 py-3 text-center'>{}</td></tr>",
                escape_html(&p.nome),
                escape_html(&p.tipo_label()),
                dia(p.dia_fatura),
                dia(p.dia_fechamento)
            )
        })
        .collect();

    format!(
        r#"<div class='bg-white rounded-xl shadow-sm overflow-hidden'>
    <table class='w-full text-sm'>
        <thead class='bg-gray-50 text-left text-gray-500'><tr><th class='px-4 py-2'>Nome</th><th class='px-4 py-2'>Tipo</th><th class='px-4 py-2 text-center'>Fatura</th><th class='px-4 py-2 text-center'>Fechamento</th></tr></thead>
        <tbody>{}</tbody>
    </table>
</div>"#,
        rows
    )
}

/// HTMX: Pagador list for `#pagadores-content`
pub async fn htmx_pagadores_list(state: axum::extract::State<AppState>) -> Html<String> {
    match state.tracker.pagadores().await {
        Ok(pagadores) => Html(render_pagadores_table(&pagadores)),
        Err(e) => Html(error_alert("Erro ao carregar pagadores", &backend_error_message(&state, &e))),
    }
}

/// HTMX: Create pagador
pub async fn htmx_pagador_store(state: axum::extract::State<AppState>, body: String) -> Response {
    let input = NovoPagadorInput::read(&parse_form(&body));

    let payload = match input.validate() {
        Ok(payload) => payload,
        Err(e) => return Html(render_pagador_form(&input, Some(&e.user_message()))).into_response(),
    };

    match state.tracker.criar_pagador(&payload).await {
        Ok(_) => with_trigger(
            "pagadores-changed",
            format!(
                "{}{}",
                render_pagador_form(&NovoPagadorInput::default(), None),
                toast(Toast::Success, "Pagador cadastrado", &payload.nome)
            ),
        ),
        Err(e) => {
            log::error!("Failed to create pagador: {}", e);
            Html(render_pagador_form(&input, Some(&backend_error_message(&state, &e)))).into_response()
        }
    }
}

/// HTMX: Picker results for a pagador name
pub async fn htmx_pagador_search(
    state: axum::extract::State<AppState>,
    params: Query<BuscaParams>,
) -> Html<String> {
    let term = params.term();
    if term.is_empty() {
        return Html(String::new());
    }

    match state.tracker.buscar_pagadores(term).await {
        Ok(pagadores) => {
            let opcoes: Vec<Opcao<'_>> = pagadores
                .iter()
                .map(|p| Opcao {
                    id: &p.id,
                    nome: &p.nome,
                    detalhe: p.tipo_label(),
                })
                .collect();
            Html(render_opcoes(params.campo("pagadorId"), &opcoes, "Nenhum pagador encontrado"))
        }
        Err(e) => Html(format!(
            "<div class='text-sm text-red-600 mt-1'>{}</div>",
            escape_html(&backend_error_message(&state, &e))
        )),
    }
}

/// API: Pagadores, optionally filtered by name
pub async fn api_pagadores(
    state: axum::extract::State<AppState>,
    params: Query<BuscaParams>,
) -> Result<Json<Vec<Pagador>>, ApiError> {
    let pagadores = if params.term().is_empty() {
        state.tracker.pagadores().await?
    } else {
        state.tracker.buscar_pagadores(params.term()).await?
    };
    Ok(Json(pagadores))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{app, body_text, htmx_form, htmx_get, StubBackend};
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_list_shows_billing_days() {
        let backend = Arc::new(StubBackend::default());
        let html = body_text(app(backend).oneshot(htmx_get("/pagadores/lista")).await.unwrap()).await;
        assert!(html.contains("Nubank"));
        assert!(html.contains("Crédito"));
        assert!(html.contains("<td class='px-4 py-3 text-center'>10</td>"));
    }

    #[tokio::test]
    async fn test_store_day_range() {
        let backend = Arc::new(StubBackend::default());
        let response = app(backend.clone())
            .oneshot(htmx_form("POST", "/pagadores", "nome=Inter&tipoPagamentoEnum=CREDITO&diaFatura=32"))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Dia da fatura deve estar entre 1 e 31"));
        assert!(html.contains("name='nome' value='Inter'"));
        assert!(backend.calls().is_empty());

        let response = app(backend.clone())
            .oneshot(htmx_form("POST", "/pagadores", "nome=Inter&tipoPagamentoEnum=DEBITO&diaFatura=&diaFechamento="))
            .await
            .unwrap();
        assert_eq!(response.headers()["HX-Trigger"], "pagadores-changed");
        let calls = backend.calls();
        assert!(calls[0].contains("\"diaFatura\":null"));
        assert!(calls[0].contains("\"tipoPagamentoEnum\":\"DEBITO\""));
    }

    #[tokio::test]
    async fn test_search_uses_requested_field() {
        let backend = Arc::new(StubBackend::default());
        let html = body_text(
            app(backend)
                .oneshot(htmx_get("/pagadores/busca?campo=pagadorId&pagadorBusca=nu"))
                .await
                .unwrap(),
        )
        .await;
        assert!(html.contains("data-id='p-1'"));
        assert!(html.contains("selecionarOpcao(this, 'pagadorId')"));
    }
}

//! Origem endpoints - list fragment, creation, picker search, JSON API

use super::page::render_origem_form;
use crate::routes::{render_opcoes, BuscaParams, Opcao};
use crate::{backend_error_message, error_alert, parse_form, toast, with_trigger, ApiError, AppState, Toast};
use axum::extract::Query;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use gastos_core::{NovaOrigemInput, Origem};
use gastos_utils::escape_html;

fn render_origens_table(origens: &[Origem]) -> String {
    if origens.is_empty() {
        return "<div class='bg-white rounded-xl shadow-sm p-12 text-center text-gray-500'>Nenhuma origem cadastrada</div>".to_string();
    }

    let rows: String = origens
        .iter()
        .map(|o| {
            format!(
                "<tr class='border-b last:border-0'><td class='px-4 py-3 font-medium'>{}</td><td class='px-4 py-3 text-gray-600'>{}</td></tr>",
                escape_html(&o.nome),
                escape_html(&o.tipo_label())
            )
        })
        .collect();

    format!(
        r#"<div class='bg-white rounded-xl shadow-sm overflow-hidden'>
    <table class='w-full text-sm'>
        <thead class='bg-gray-50 text-left text-gray-500'><tr><th class='px-4 py-2'>Nome</th><th class='px-4 py-2'>Tipo</th></tr></thead>
        <tbody>{}</tbody>
    </table>
</div>"#,
        rows
    )
}

/// HTMX: Origem list for `#origens-content`
pub async fn htmx_origens_list(state: axum::extract::State<AppState>) -> Html<String> {
    match state.tracker.origens().await {
        Ok(origens) => Html(render_origens_table(&origens)),
        Err(e) => Html(error_alert("Erro ao carregar origens", &backend_error_message(&state, &e))),
    }
}

/// HTMX: Create origem, answering with a fresh form
pub async fn htmx_origem_store(state: axum::extract::State<AppState>, body: String) -> Response {
    let input = NovaOrigemInput::read(&parse_form(&body));

    let payload = match input.validate() {
        Ok(payload) => payload,
        Err(e) => return Html(render_origem_form(&input, Some(&e.user_message()))).into_response(),
    };

    match state.tracker.criar_origem(&payload).await {
        Ok(_) => with_trigger(
            "origens-changed",
            format!(
                "{}{}",
                render_origem_form(&NovaOrigemInput::default(), None),
                toast(Toast::Success, "Origem cadastrada", &payload.nome)
            ),
        ),
        Err(e) => {
            log::error!("Failed to create origem: {}", e);
            Html(render_origem_form(&input, Some(&backend_error_message(&state, &e)))).into_response()
        }
    }
}

/// HTMX: Picker results for an origem name
pub async fn htmx_origem_search(
    state: axum::extract::State<AppState>,
    params: Query<BuscaParams>,
) -> Html<String> {
    let term = params.term();
    if term.is_empty() {
        return Html(String::new());
    }

    match state.tracker.buscar_origens(term).await {
        Ok(origens) => {
            let opcoes: Vec<Opcao<'_>> = origens
                .iter()
                .map(|o| Opcao {
                    id: &o.id,
                    nome: &o.nome,
                    detalhe: o.tipo_label(),
                })
                .collect();
            Html(render_opcoes(params.campo("origemId"), &opcoes, "Nenhuma origem encontrada"))
        }
        Err(e) => Html(format!(
            "<div class='text-sm text-red-600 mt-1'>{}</div>",
            escape_html(&backend_error_message(&state, &e))
        )),
    }
}

/// API: Origens, optionally filtered by name
pub async fn api_origens(
    state: axum::extract::State<AppState>,
    params: Query<BuscaParams>,
) -> Result<Json<Vec<Origem>>, ApiError> {
    let origens = if params.term().is_empty() {
        state.tracker.origens().await?
    } else {
        state.tracker.buscar_origens(params.term()).await?
    };
    Ok(Json(origens))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{app, body_text, htmx_form, htmx_get, StubBackend};
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_list_and_search() {
        let backend = Arc::new(StubBackend::default());
        let html = body_text(app(backend.clone()).oneshot(htmx_get("/origens/lista")).await.unwrap()).await;
        assert!(html.contains("Pão de Açúcar"));
        assert!(html.contains("Supermercado"));

        let html = body_text(
            app(backend.clone())
                .oneshot(htmx_get("/origens/busca?campo=origemId&origemBusca=pet"))
                .await
                .unwrap(),
        )
        .await;
        assert!(html.contains("data-nome='Petz'"));
        assert!(html.contains("selecionarOpcao(this, 'origemId')"));
        assert!(backend.calls().iter().any(|c| c == "list_origens?nome=pet&page=0&size=10"));
    }

    #[tokio::test]
    async fn test_blank_search_skips_backend() {
        let backend = Arc::new(StubBackend::default());
        let html = body_text(app(backend.clone()).oneshot(htmx_get("/origens/busca?nome=%20")).await.unwrap()).await;
        assert!(html.is_empty());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_store() {
        let backend = Arc::new(StubBackend::default());
        let response = app(backend.clone())
            .oneshot(htmx_form("POST", "/origens", "nome=&tipoOrigem=PET"))
            .await
            .unwrap();
        assert!(response.headers().get("HX-Trigger").is_none());
        assert!(body_text(response).await.contains("Nome é obrigatório"));

        let response = app(backend.clone())
            .oneshot(htmx_form("POST", "/origens", "nome=Cobasi&tipoOrigem=PET"))
            .await
            .unwrap();
        assert_eq!(response.headers()["HX-Trigger"], "origens-changed");
        let html = body_text(response).await;
        assert!(html.contains("Origem cadastrada"));
        assert!(html.contains("name='nome' value=''"));
        assert!(backend.calls().iter().any(|c| c.contains("\"tipoOrigem\":\"PET\"")));
    }
}

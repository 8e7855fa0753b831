//! Despesa data endpoints - listing fragment, form submissions, JSON API
//!
//! Endpoints:
//! - htmx_despesas_list: Total card, cards and pagination for the current filter
//! - htmx_despesa_store / htmx_despesa_update: Form submissions
//! - api_despesas / api_despesa_detail / api_custo_total: JSON API

use super::page::{render_edit_modal, render_nova_despesa_modal, render_status_badge, EditLabels};
use crate::{backend_error_message, error_alert, parse_form, toast, with_trigger, ApiError, AppState, Toast};
use axum::extract::{Path, Query};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use gastos_core::{Despesa, DespesaFiltro, DespesasView, EditDespesaInput, NovaDespesaInput, PageRequest};
use gastos_utils::{escape_html, format_competencia, format_date_str};
use std::collections::HashMap;

// ==================== Listing ====================

fn render_total_card(state: &AppState, view: &DespesasView) -> String {
    let total = match view.custo_total {
        Some(total) => format!("<p class='text-3xl font-bold'>{}</p>", state.format_money(total)),
        None => "<p class='text-3xl font-bold text-gray-400'>Indisponível</p>".to_string(),
    };

    let periodo = view
        .filtro
        .competencia
        .map(|c| format!("<p class='text-sm text-gray-500'>Competência {}</p>", c.label()))
        .unwrap_or_default();

    let filtros = match view.filtro.active_count() {
        0 => String::new(),
        1 => "<span class='text-xs bg-indigo-50 text-indigo-700 px-2 py-0.5 rounded-full'>1 filtro ativo</span>".to_string(),
        n => format!(
            "<span class='text-xs bg-indigo-50 text-indigo-700 px-2 py-0.5 rounded-full'>{} filtros ativos</span>",
            n
        ),
    };

    format!(
        r#"<div class='bg-white rounded-xl shadow-sm p-6 mb-6 flex items-center justify-between'>
    <div>
        <p class='text-sm text-gray-500'>Custo total</p>
        {}
        {}
    </div>
    <div>{}</div>
</div>"#,
        total, periodo, filtros
    )
}

fn render_despesa_card(state: &AppState, despesa: &Despesa) -> String {
    let parcela = despesa
        .parcela_label()
        .map(|p| format!("<span class='text-xs text-gray-500'>{}</span>", p))
        .unwrap_or_default();

    format!(
        r#"<div class='bg-white rounded-xl shadow-sm p-4 hover:shadow-md cursor-pointer flex items-center justify-between'
    hx-get='/despesas/{id}' hx-target='#modal-area'>
    <div class='min-w-0'>
        <p class='font-medium truncate'>{descricao}</p>
        <p class='text-sm text-gray-500'>{origem} · {pagador} · {data}</p>
        <p class='text-xs text-gray-400'>{competencia}</p>
    </div>
    <div class='text-right flex-shrink-0 ml-4'>
        <p class='font-semibold'>{valor}</p>
        <div class='flex items-center gap-2 justify-end mt-1'>{parcela}{status}</div>
    </div>
</div>"#,
        id = escape_html(&despesa.id),
        descricao = escape_html(&despesa.descricao),
        origem = escape_html(&despesa.origem),
        pagador = escape_html(&despesa.pagador),
        data = format_date_str(&despesa.data),
        competencia = escape_html(&format_competencia(&despesa.competencia)),
        valor = state.format_money(despesa.valor),
        parcela = parcela,
        status = render_status_badge(despesa.status),
    )
}

fn page_button(label: &str, target: Option<PageRequest>) -> String {
    match target {
        Some(page) => format!(
            "<button hx-get='/despesas/lista?page={}&size={}' hx-include='#filtros' hx-target='#despesas-content' class='px-3 py-1.5 border rounded-lg text-sm hover:bg-gray-50'>{}</button>",
            page.page, page.size, label
        ),
        None => format!(
            "<button disabled class='px-3 py-1.5 border rounded-lg text-sm text-gray-300 cursor-not-allowed'>{}</button>",
            label
        ),
    }
}

fn render_pagination(view: &DespesasView) -> String {
    let page = &view.page;
    let request = view.page_request;
    let total_pages = page.total_pages.max(1);

    format!(
        r#"<div class='flex items-center justify-between mt-6 text-sm text-gray-600'>
    <span>Total de {} despesas</span>
    <div class='flex items-center gap-3'>
        {}
        <span>Página {} de {}</span>
        {}
    </div>
</div>"#,
        page.total_elements,
        page_button("Anterior", page.has_previous().then(|| request.previous())),
        page.number.saturating_add(1),
        total_pages,
        page_button("Próxima", page.has_next().then(|| request.next())),
    )
}

fn render_listing(state: &AppState, view: &DespesasView) -> String {
    let body = if view.page.is_empty() {
        r#"<div class='bg-white rounded-xl shadow-sm p-12 text-center'>
    <p class='text-gray-500'>Nenhuma despesa encontrada</p>
    <p class='text-sm text-gray-400 mt-1'>Ajuste os filtros ou adicione uma nova despesa.</p>
</div>"#
            .to_string()
    } else {
        let cards: String = view
            .page
            .content
            .iter()
            .map(|d| render_despesa_card(state, d))
            .collect();
        format!("<div class='space-y-3'>{}</div>{}", cards, render_pagination(view))
    };

    format!("{}{}", render_total_card(state, view), body)
}

/// HTMX: Listing fragment for `#despesas-content`
pub async fn htmx_despesas_list(
    state: axum::extract::State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Html<String> {
    let filtro = DespesaFiltro::from_params(&params);
    let page = state.tracker.page_request(&params);

    match state.tracker.despesas_view(filtro, page).await {
        Ok(view) => Html(render_listing(&state, &view)),
        Err(e) => Html(error_alert(
            "Erro ao carregar despesas",
            &backend_error_message(&state, &e),
        )),
    }
}

// ==================== Form submissions ====================

fn field<'a>(fields: &'a HashMap<String, String>, name: &str) -> &'a str {
    fields.get(name).map(String::as_str).unwrap_or("")
}

/// HTMX: Create despesa from the "Nova Despesa" form
pub async fn htmx_despesa_store(state: axum::extract::State<AppState>, body: String) -> Response {
    let fields = parse_form(&body);
    let input = NovaDespesaInput::read(&fields);
    let rerender = |message: &str| {
        Html(render_nova_despesa_modal(
            &input,
            field(&fields, "origemBusca"),
            field(&fields, "pagadorBusca"),
            Some(message),
        ))
        .into_response()
    };

    let payload = match input.validate() {
        Ok(payload) => payload,
        Err(e) => return rerender(&e.user_message()),
    };

    match state.tracker.criar_despesa(&payload).await {
        Ok(_) => with_trigger(
            "despesas-changed",
            toast(Toast::Success, "Despesa adicionada", &payload.descricao),
        ),
        Err(e) => {
            log::error!("Failed to create despesa: {}", e);
            rerender(&backend_error_message(&state, &e))
        }
    }
}

/// HTMX: Save the edit form
pub async fn htmx_despesa_update(
    state: axum::extract::State<AppState>,
    path: Path<String>,
    body: String,
) -> Response {
    let id = path.0;
    let fields = parse_form(&body);
    let input = EditDespesaInput::read(&fields);
    let rerender = |message: &str| {
        Html(render_edit_modal(
            &id,
            &input,
            EditLabels {
                origem: field(&fields, "origemBusca"),
                pagador: field(&fields, "pagadorBusca"),
            },
            Some(message),
        ))
        .into_response()
    };

    let payload = match input.validate() {
        Ok(payload) => payload,
        Err(e) => return rerender(&e.user_message()),
    };

    match state.tracker.atualizar_despesa(&id, &payload).await {
        Ok(_) => {
            let event = if payload.origem.is_nova() {
                "despesas-changed, origens-changed"
            } else {
                "despesas-changed"
            };
            with_trigger(event, toast(Toast::Success, "Despesa atualizada", &payload.descricao))
        }
        Err(e) => {
            log::error!("Failed to update despesa {}: {}", id, e);
            rerender(&backend_error_message(&state, &e))
        }
    }
}

// ==================== JSON API ====================

/// API: Paged despesas plus the total for the same filter
pub async fn api_despesas(
    state: axum::extract::State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let filtro = DespesaFiltro::from_params(&params);
    let page = state.tracker.page_request(&params);
    let view = state.tracker.despesas_view(filtro, page).await?;

    Ok(Json(serde_json::json!({
        "content": view.page.content,
        "page": view.page.number,
        "size": view.page_request.size,
        "totalPages": view.page.total_pages,
        "totalElements": view.page.total_elements,
        "custoTotal": view.custo_total.map(|total| total.to_string()),
    })))
}

/// API: Single despesa
pub async fn api_despesa_detail(
    state: axum::extract::State<AppState>,
    path: Path<String>,
) -> Result<Json<Despesa>, ApiError> {
    let despesa = state.tracker.despesa(&path.0).await?;
    Ok(Json(despesa))
}

/// API: Total cost for the filter
pub async fn api_custo_total(
    state: axum::extract::State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let filtro = DespesaFiltro::from_params(&params);
    let total = state.tracker.custo_total(&filtro).await?;

    Ok(Json(serde_json::json!({
        "custoTotal": total.to_string(),
        "formatted": state.format_money(total),
    })))
}

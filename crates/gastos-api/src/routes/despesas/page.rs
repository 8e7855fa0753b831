//! Despesa page rendering - Full page and modal endpoints
//!
//! Endpoints:
//! - page_despesas: Main page with header, filter form and listing container
//! - htmx_despesa_create_form: "Nova Despesa" modal
//! - htmx_despesa_detail: Detail modal
//! - htmx_despesa_edit_form: Edit modal, with the origem mode toggle
//!
//! Helper functions:
//! - render_nova_despesa_modal / render_detail_modal / render_edit_modal
//! - search_picker: Text input wired to a `/busca` endpoint plus a hidden id

use crate::{error_alert, selected, AppState};
use axum::extract::{Path, Query};
use gastos_core::{
    Despesa, DespesaFiltro, EditDespesaInput, NovaDespesaInput, Origem, Pagador, StatusDespesa,
    TipoOrigem, TipoParcela,
};
use gastos_utils::{escape_html, format_competencia, format_date_str};
use std::collections::HashMap;

/// Modal overlay rendered into `#modal-area`
pub(crate) fn modal(title: &str, body: &str) -> String {
    format!(
        r#"<div class='fixed inset-0 bg-black bg-opacity-50 z-50 flex items-center justify-center' onclick='if(event.target === this) fecharModal()'>
    <div class='bg-white rounded-xl shadow-2xl w-full max-w-2xl max-h-[90vh] overflow-y-auto'>
        <div class='flex items-center justify-between px-6 py-4 border-b'>
            <h2 class='text-xl font-bold'>{}</h2>
            <button type='button' onclick='fecharModal()' class='text-gray-500 hover:text-gray-700 p-2'>✕</button>
        </div>
        <div class='p-6'>{}</div>
    </div>
</div>"#,
        escape_html(title),
        body
    )
}

/// Search picker: visible text box querying `/{kind}/busca`, hidden input holding the id
pub(crate) fn search_picker(kind: &str, campo: &str, label: &str, id: &str, nome: &str) -> String {
    let busca_name = campo.trim_end_matches("Id");
    format!(
        r#"<div class='relative'>
    <label class='block text-sm font-medium text-gray-700 mb-1' for='{campo}-busca'>{label}</label>
    <input type='hidden' id='{campo}' name='{campo}' value='{id}'>
    <input type='text' id='{campo}-busca' name='{busca_name}Busca' value='{nome}' placeholder='Digite para buscar...' autocomplete='off'
        hx-get='/{kind}/busca?campo={campo}' hx-trigger='keyup changed delay:300ms' hx-target='#{campo}-resultados'
        class='w-full px-3 py-2 border rounded-lg'>
    <div id='{campo}-resultados'></div>
</div>"#,
        kind = kind,
        campo = campo,
        label = escape_html(label),
        id = escape_html(id),
        nome = escape_html(nome),
        busca_name = busca_name,
    )
}

fn text_input(name: &str, label: &str, value: &str, input_type: &str, extra: &str) -> String {
    format!(
        r#"<div><label class='block text-sm font-medium text-gray-700 mb-1' for='{name}'>{label}</label><input type='{input_type}' id='{name}' name='{name}' value='{value}' {extra} class='w-full px-3 py-2 border rounded-lg'></div>"#,
        name = name,
        label = escape_html(label),
        value = escape_html(value),
        input_type = input_type,
        extra = extra,
    )
}

fn form_error(error: Option<&str>) -> String {
    error
        .map(|message| format!("<div class='mb-4'>{}</div>", error_alert("Verifique os dados", message)))
        .unwrap_or_default()
}

/// Options of the filter selects; a failing lookup leaves the select with "Todas"/"Todos" only
async fn filter_options(state: &AppState) -> (Vec<Origem>, Vec<Pagador>) {
    let (origens, pagadores) = tokio::join!(state.tracker.origens(), state.tracker.pagadores());
    let origens = origens.unwrap_or_else(|e| {
        log::warn!("Filter options: origens unavailable: {}", e);
        Vec::new()
    });
    let pagadores = pagadores.unwrap_or_else(|e| {
        log::warn!("Filter options: pagadores unavailable: {}", e);
        Vec::new()
    });
    (origens, pagadores)
}

/// Filter form; it never carries the page, so any change restarts at page 0
pub(crate) fn render_filter_form(filtro: &DespesaFiltro, origens: &[Origem], pagadores: &[Pagador]) -> String {
    let status_options: String = StatusDespesa::ALL
        .iter()
        .map(|s| {
            format!(
                "<option value='{}' {}>{}</option>",
                s.as_str(),
                selected(filtro.status == Some(*s)),
                s.label()
            )
        })
        .collect();

    let origem_options: String = origens
        .iter()
        .map(|o| {
            format!(
                "<option value='{}' {}>{}</option>",
                escape_html(&o.id),
                selected(filtro.origem_id.as_deref() == Some(o.id.as_str())),
                escape_html(&o.nome)
            )
        })
        .collect();

    let pagador_options: String = pagadores
        .iter()
        .map(|p| {
            format!(
                "<option value='{}' {}>{}</option>",
                escape_html(&p.id),
                selected(filtro.pagador_id.as_deref() == Some(p.id.as_str())),
                escape_html(&p.nome)
            )
        })
        .collect();

    let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();

    format!(
        r#"<form id='filtros' hx-get='/despesas/lista' hx-target='#despesas-content' hx-trigger='change, submit, keyup changed delay:500ms from:#filtro-descricao'
    class='bg-white rounded-xl shadow-sm p-4 mb-6 grid grid-cols-1 md:grid-cols-4 gap-3 items-end'>
    <div class='md:col-span-2'><label class='block text-xs text-gray-500 mb-1' for='filtro-descricao'>Descrição</label>
        <input type='text' id='filtro-descricao' name='descricao' value='{descricao}' placeholder='Buscar por descrição...' class='w-full px-3 py-2 border rounded-lg'></div>
    <div><label class='block text-xs text-gray-500 mb-1'>Status</label>
        <select name='status' class='w-full px-3 py-2 border rounded-lg bg-white'><option value=''>Todos</option>{status_options}</select></div>
    <div><label class='block text-xs text-gray-500 mb-1'>Competência</label>
        <input type='month' name='competencia' value='{competencia}' class='w-full px-3 py-2 border rounded-lg'></div>
    <div><label class='block text-xs text-gray-500 mb-1'>Origem</label>
        <select name='origemId' class='w-full px-3 py-2 border rounded-lg bg-white'><option value=''>Todas</option>{origem_options}</select></div>
    <div><label class='block text-xs text-gray-500 mb-1'>Pagador</label>
        <select name='pagadorId' class='w-full px-3 py-2 border rounded-lg bg-white'><option value=''>Todos</option>{pagador_options}</select></div>
    <div><label class='block text-xs text-gray-500 mb-1'>De</label>
        <input type='date' name='dataInicio' value='{data_inicio}' class='w-full px-3 py-2 border rounded-lg'></div>
    <div><label class='block text-xs text-gray-500 mb-1'>Até</label>
        <input type='date' name='dataFim' value='{data_fim}' class='w-full px-3 py-2 border rounded-lg'></div>
    <div class='md:col-span-4 flex justify-end'>
        <button type='button' onclick="const f = document.getElementById('filtros'); f.querySelectorAll('input').forEach(i => i.value = ''); f.querySelectorAll('select').forEach(s => s.value = ''); htmx.trigger(f, 'submit');"
            class='px-3 py-1.5 text-sm border rounded-lg hover:bg-gray-50'>Limpar filtros</button>
    </div>
</form>"#,
        descricao = escape_html(filtro.descricao.as_deref().unwrap_or("")),
        status_options = status_options,
        competencia = filtro.competencia.map(|c| c.to_month_input()).unwrap_or_default(),
        origem_options = origem_options,
        pagador_options = pagador_options,
        data_inicio = date(filtro.data_inicio),
        data_fim = date(filtro.data_fim),
    )
}

/// Despesas page - Header, filters and the listing loaded via HTMX
pub async fn page_despesas(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    params: Query<HashMap<String, String>>,
) -> axum::response::Html<String> {
    let filtro = DespesaFiltro::from_params(&params);
    let (origens, pagadores) = filter_options(&state).await;

    let inner_content = format!(
        r#"<div class='flex items-center justify-between mb-6'>
            <div>
                <h2 class='text-2xl font-bold'>Despesas</h2>
                <p class='text-sm text-gray-500'>Acompanhe e filtre seus gastos</p>
            </div>
            <button hx-get='/despesas/nova' hx-target='#modal-area'
                class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700 flex items-center gap-2'>
                <span class='text-lg leading-none'>+</span>
                Nova Despesa
            </button>
        </div>
        {}
        <div id='despesas-content' hx-get='/despesas/lista' hx-include='#filtros' hx-trigger='load, despesas-changed from:body'>
            <p class='text-gray-500 text-center py-12'>Carregando...</p>
        </div>"#,
        render_filter_form(&filtro, &origens, &pagadores)
    );

    axum::response::Html(crate::page_response(&headers, "Despesas", "/despesas", &inner_content))
}

// ==================== Nova Despesa ====================

/// Creation modal, pre-filled with what was typed when re-rendered after an error
pub(crate) fn render_nova_despesa_modal(
    input: &NovaDespesaInput,
    origem_busca: &str,
    pagador_busca: &str,
    error: Option<&str>,
) -> String {
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    let data = if input.data.is_empty() { today } else { input.data.clone() };
    let tipo_parcela = input.tipo_parcela.parse::<TipoParcela>().unwrap_or_default();

    let parcela_options: String = TipoParcela::ALL
        .iter()
        .map(|t| format!("<option value='{}' {}>{}</option>", t.as_str(), selected(*t == tipo_parcela), t.label()))
        .collect();

    let or_one = |v: &str| if v.is_empty() { "1".to_string() } else { v.to_string() };

    let body = format!(
        r#"<p class='text-sm text-gray-500 mb-4'>Preencha os dados da despesa para adicionar ao seu controle financeiro.</p>
{error}
<form id='form-nova-despesa' hx-post='/despesas' hx-target='#modal-area' class='space-y-4'>
    {descricao}
    <div class='grid grid-cols-2 gap-4'>
        {valor}
        {data}
    </div>
    {origem}
    {pagador}
    <div class='grid grid-cols-3 gap-4'>
        <div><label class='block text-sm font-medium text-gray-700 mb-1'>Tipo</label>
            <select name='tipoParcela' class='w-full px-3 py-2 border rounded-lg bg-white'>{parcela_options}</select></div>
        {total}
        {numero}
    </div>
    <div class='flex justify-end gap-2 pt-2'>
        <button type='button' onclick='fecharModal()' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Cancelar</button>
        <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Adicionar Despesa</button>
    </div>
</form>"#,
        error = form_error(error),
        descricao = text_input("descricao", "Descrição", &input.descricao, "text", "required"),
        valor = text_input("valor", "Valor (R$)", &input.valor, "text", "inputmode='decimal' placeholder='0,00' required"),
        data = text_input("data", "Data", &data, "date", "required"),
        origem = search_picker("origens", "origemId", "Origem", &input.origem_id, origem_busca),
        pagador = search_picker("pagadores", "pagadorId", "Pagador", &input.pagador_id, pagador_busca),
        parcela_options = parcela_options,
        total = text_input("totalParcelas", "Total de parcelas", &or_one(&input.total_parcelas), "number", "min='1'"),
        numero = text_input("numeroOriginal", "Parcela inicial", &or_one(&input.numero_original), "number", "min='1'"),
    );

    modal("Adicionar Nova Despesa", &body)
}

/// HTMX: "Nova Despesa" modal
pub async fn htmx_despesa_create_form() -> axum::response::Html<String> {
    axum::response::Html(render_nova_despesa_modal(&NovaDespesaInput::default(), "", "", None))
}

// ==================== Detalhe ====================

pub(crate) fn render_status_badge(status: StatusDespesa) -> String {
    let classes = match status {
        StatusDespesa::Pago => "bg-green-100 text-green-800",
        StatusDespesa::NaoPago => "bg-yellow-100 text-yellow-800",
        StatusDespesa::Desconhecido => "bg-gray-100 text-gray-600",
    };
    format!("<span class='px-2 py-0.5 rounded-full text-xs font-medium {}'>{}</span>", classes, status.label())
}

pub(crate) fn render_detail_modal(state: &AppState, despesa: &Despesa) -> String {
    let id = escape_html(&despesa.id);
    let parcela = despesa
        .parcela_label()
        .map(|p| format!("<div><p class='text-sm text-gray-500'>Parcela</p><p class='font-medium'>{}</p></div>", p))
        .unwrap_or_default();

    let body = format!(
        r#"<div class='flex items-start justify-between mb-6'>
    <div>
        <h3 class='text-2xl font-semibold'>{descricao}</h3>
        <div class='mt-1'>{status}</div>
    </div>
    <p class='text-3xl font-bold'>{valor}</p>
</div>
<div class='grid grid-cols-2 gap-4 mb-6'>
    <div><p class='text-sm text-gray-500'>Data</p><p class='font-medium'>{data}</p></div>
    <div><p class='text-sm text-gray-500'>Competência</p><p class='font-medium'>{competencia}</p></div>
    <div><p class='text-sm text-gray-500'>Origem</p><p class='font-medium'>{origem}</p></div>
    <div><p class='text-sm text-gray-500'>Pagador</p><p class='font-medium'>{pagador}</p></div>
    {parcela}
</div>
<div class='flex justify-end gap-2'>
    <button type='button' onclick='fecharModal()' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Fechar</button>
    <button hx-get='/despesas/{id}/editar' hx-target='#modal-area' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>✎ Editar</button>
</div>"#,
        descricao = escape_html(&despesa.descricao),
        status = render_status_badge(despesa.status),
        valor = state.format_money(despesa.valor),
        data = format_date_str(&despesa.data),
        competencia = escape_html(&format_competencia(&despesa.competencia)),
        origem = escape_html(&despesa.origem),
        pagador = escape_html(&despesa.pagador),
        parcela = parcela,
        id = id,
    );

    modal("Detalhes da Despesa", &body)
}

/// Modal shown when a despesa cannot be loaded
pub(crate) fn render_error_modal(title: &str, message: &str) -> String {
    modal(
        title,
        &format!(
            "{}<div class='flex justify-end mt-4'><button type='button' onclick='fecharModal()' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Fechar</button></div>",
            error_alert(title, message)
        ),
    )
}

/// HTMX: Detail modal
pub async fn htmx_despesa_detail(
    state: axum::extract::State<AppState>,
    path: Path<String>,
) -> axum::response::Html<String> {
    let id = path.0;
    match state.tracker.despesa(&id).await {
        Ok(despesa) => axum::response::Html(render_detail_modal(&state, &despesa)),
        Err(e) => axum::response::Html(render_error_modal(
            "Erro ao carregar despesa",
            &crate::backend_error_message(&state, &e),
        )),
    }
}

// ==================== Edição ====================

/// Names shown in the pickers next to the ids being edited
pub(crate) struct EditLabels<'a> {
    pub origem: &'a str,
    pub pagador: &'a str,
}

pub(crate) fn render_edit_modal(
    id: &str,
    input: &EditDespesaInput,
    labels: EditLabels<'_>,
    error: Option<&str>,
) -> String {
    let nova_origem = input.is_nova_origem();
    let status = input.status.parse::<StatusDespesa>().unwrap_or_default();
    let status_options: String = StatusDespesa::ALL
        .iter()
        .map(|s| format!("<option value='{}' {}>{}</option>", s.as_str(), selected(*s == status), s.label()))
        .collect();

    let origem_section = if nova_origem {
        let tipo = input.tipo_origem.parse::<TipoOrigem>().unwrap_or_default();
        let tipo_options: String = TipoOrigem::ALL
            .iter()
            .map(|t| format!("<option value='{}' {}>{}</option>", t.as_str(), selected(*t == tipo), t.label()))
            .collect();
        format!(
            r#"<input type='hidden' name='origemModo' value='nova'>
<input type='hidden' name='origemId' value='{origem_id}'>
<div class='border rounded-lg p-4 space-y-3 bg-gray-50'>
    <div class='flex items-center justify-between'>
        <p class='text-sm font-medium'>Nova origem</p>
        <button type='button' hx-get='/despesas/{id}/editar' hx-include='#form-editar' hx-vals='{{"nova_origem": "0"}}' hx-target='#modal-area'
            class='text-xs text-indigo-600 hover:underline'>Usar origem existente</button>
    </div>
    {nome}
    <div><label class='block text-sm font-medium text-gray-700 mb-1'>Tipo de origem</label>
        <select name='tipoOrigem' class='w-full px-3 py-2 border rounded-lg bg-white'>{tipo_options}</select></div>
</div>"#,
            origem_id = escape_html(&input.origem_id),
            id = escape_html(id),
            nome = text_input("origemNome", "Nome da origem", &input.origem_nome, "text", ""),
            tipo_options = tipo_options,
        )
    } else {
        format!(
            r#"<input type='hidden' name='origemModo' value='existente'>
<div class='space-y-1'>
    {picker}
    <button type='button' hx-get='/despesas/{id}/editar' hx-include='#form-editar' hx-vals='{{"nova_origem": "1"}}' hx-target='#modal-area'
        class='text-xs text-indigo-600 hover:underline'>+ Cadastrar nova origem</button>
</div>"#,
            picker = search_picker("origens", "origemId", "Origem", &input.origem_id, labels.origem),
            id = escape_html(id),
        )
    };

    let body = format!(
        r#"{error}
<form id='form-editar' hx-put='/despesas/{id}' hx-target='#modal-area' class='space-y-4'>
    {descricao}
    <div class='grid grid-cols-2 gap-4'>
        {valor}
        {data}
    </div>
    <div><label class='block text-sm font-medium text-gray-700 mb-1'>Status</label>
        <select name='status' class='w-full px-3 py-2 border rounded-lg bg-white'>{status_options}</select></div>
    {origem_section}
    {pagador}
    <div class='flex justify-end gap-2 pt-2'>
        <button type='button' hx-get='/despesas/{id}' hx-target='#modal-area' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Cancelar</button>
        <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Salvar alterações</button>
    </div>
</form>"#,
        error = form_error(error),
        id = escape_html(id),
        descricao = text_input("descricao", "Descrição", &input.descricao, "text", "required"),
        valor = text_input("valor", "Valor (R$)", &input.valor, "text", "inputmode='decimal' required"),
        data = text_input("data", "Data", &input.data, "date", "required"),
        status_options = status_options,
        origem_section = origem_section,
        pagador = search_picker("pagadores", "pagadorId", "Pagador", &input.pagador_id, labels.pagador),
    );

    modal("Editar Despesa", &body)
}

/// Edit input pre-filled from the stored despesa
pub(crate) fn edit_input_from(despesa: &Despesa) -> EditDespesaInput {
    EditDespesaInput {
        descricao: despesa.descricao.clone(),
        valor: despesa.valor.to_string(),
        data: despesa.data.clone(),
        status: despesa.status.as_str().to_string(),
        origem_modo: "existente".to_string(),
        origem_id: despesa.origem_id.clone().unwrap_or_default(),
        origem_nome: String::new(),
        tipo_origem: String::new(),
        pagador_id: despesa.pagador_id.clone().unwrap_or_default(),
    }
}

/// HTMX: Edit modal
///
/// When the request carries the form's own fields (the origem mode toggle
/// includes them), those win over the stored despesa so nothing typed is lost.
pub async fn htmx_despesa_edit_form(
    state: axum::extract::State<AppState>,
    path: Path<String>,
    params: Query<HashMap<String, String>>,
) -> axum::response::Html<String> {
    let id = path.0;
    let field = |name: &str| params.get(name).cloned().unwrap_or_default();

    let (mut input, origem_label, pagador_label) = if params.contains_key("descricao") {
        (EditDespesaInput::read(&params), field("origemBusca"), field("pagadorBusca"))
    } else {
        match state.tracker.despesa(&id).await {
            Ok(despesa) => (edit_input_from(&despesa), despesa.origem.clone(), despesa.pagador.clone()),
            Err(e) => {
                return axum::response::Html(render_error_modal(
                    "Erro ao carregar despesa",
                    &crate::backend_error_message(&state, &e),
                ))
            }
        }
    };

    if let Some(toggle) = params.get("nova_origem") {
        input.origem_modo = if toggle == "1" { "nova" } else { "existente" }.to_string();
    }

    axum::response::Html(render_edit_modal(
        &id,
        &input,
        EditLabels {
            origem: &origem_label,
            pagador: &pagador_label,
        },
        None,
    ))
}

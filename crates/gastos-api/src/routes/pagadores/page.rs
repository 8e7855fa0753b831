//! Pagador page rendering

use crate::{error_alert, selected};
use gastos_core::{NovoPagadorInput, TipoPagamento};
use gastos_utils::escape_html;

pub(crate) fn render_pagador_form(input: &NovoPagadorInput, error: Option<&str>) -> String {
    let tipo = input.tipo_pagamento.parse::<TipoPagamento>().unwrap_or_default();
    let tipo_options: String = TipoPagamento::ALL
        .iter()
        .map(|t| format!("<option value='{}' {}>{}</option>", t.as_str(), selected(*t == tipo), t.label()))
        .collect();
    let error = error
        .map(|message| format!("<div class='mb-3'>{}</div>", error_alert("Verifique os dados", message)))
        .unwrap_or_default();

    format!(
        r#"<div id='pagador-form-area'>
    {error}
    <form hx-post='/pagadores' hx-target='#pagador-form-area' hx-swap='outerHTML' class='space-y-3'>
        <div><label class='block text-sm font-medium text-gray-700 mb-1' for='pagador-nome'>Nome</label>
            <input type='text' id='pagador-nome' name='nome' value='{nome}' required class='w-full px-3 py-2 border rounded-lg'></div>
        <div><label class='block text-sm font-medium text-gray-700 mb-1'>Tipo de pagamento</label>
            <select name='tipoPagamentoEnum' class='w-full px-3 py-2 border rounded-lg bg-white'>{tipo_options}</select></div>
        <div class='grid grid-cols-2 gap-3'>
            <div><label class='block text-sm font-medium text-gray-700 mb-1'>Dia da fatura</label>
                <input type='number' name='diaFatura' value='{dia_fatura}' min='1' max='31' class='w-full px-3 py-2 border rounded-lg'></div>
            <div><label class='block text-sm font-medium text-gray-700 mb-1'>Dia do fechamento</label>
                <input type='number' name='diaFechamento' value='{dia_fechamento}' min='1' max='31' class='w-full px-3 py-2 border rounded-lg'></div>
        </div>
        <p class='text-xs text-gray-500'>Os dias são opcionais e se aplicam a cartões de crédito.</p>
        <button type='submit' class='w-full px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Cadastrar pagador</button>
    </form>
</div>"#,
        error = error,
        nome = escape_html(&input.nome),
        tipo_options = tipo_options,
        dia_fatura = escape_html(&input.dia_fatura),
        dia_fechamento = escape_html(&input.dia_fechamento),
    )
}

/// Pagadores page - Creation form beside the list
pub async fn page_pagadores(headers: axum::http::HeaderMap) -> axum::response::Html<String> {
    let inner_content = format!(
        r#"<div class='mb-6'>
            <h2 class='text-2xl font-bold'>Pagadores</h2>
            <p class='text-sm text-gray-500'>Cartões e contas usados para pagar as despesas</p>
        </div>
        <div class='grid grid-cols-1 lg:grid-cols-3 gap-6'>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='font-semibold mb-4'>Novo pagador</h3>
                {}
            </div>
            <div class='lg:col-span-2' id='pagadores-content' hx-get='/pagadores/lista' hx-trigger='load, pagadores-changed from:body'>
                <p class='text-gray-500 text-center py-12'>Carregando...</p>
            </div>
        </div>"#,
        render_pagador_form(&NovoPagadorInput::default(), None)
    );

    axum::response::Html(crate::page_response(&headers, "Pagadores", "/pagadores", &inner_content))
}

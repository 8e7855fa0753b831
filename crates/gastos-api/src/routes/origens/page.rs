//! Origem page rendering

use crate::{error_alert, selected};
use gastos_core::{NovaOrigemInput, TipoOrigem};
use gastos_utils::escape_html;

/// Creation form, swapped in place after each submission
pub(crate) fn render_origem_form(input: &NovaOrigemInput, error: Option<&str>) -> String {
    let tipo = input.tipo_origem.parse::<TipoOrigem>().unwrap_or_default();
    let tipo_options: String = TipoOrigem::ALL
        .iter()
        .map(|t| format!("<option value='{}' {}>{}</option>", t.as_str(), selected(*t == tipo), t.label()))
        .collect();
    let error = error
        .map(|message| format!("<div class='mb-3'>{}</div>", error_alert("Verifique os dados", message)))
        .unwrap_or_default();

    format!(
        r#"<div id='origem-form-area'>
    {error}
    <form hx-post='/origens' hx-target='#origem-form-area' hx-swap='outerHTML' class='space-y-3'>
        <div><label class='block text-sm font-medium text-gray-700 mb-1' for='origem-nome'>Nome</label>
            <input type='text' id='origem-nome' name='nome' value='{nome}' required class='w-full px-3 py-2 border rounded-lg'></div>
        <div><label class='block text-sm font-medium text-gray-700 mb-1'>Tipo</label>
            <select name='tipoOrigem' class='w-full px-3 py-2 border rounded-lg bg-white'>{tipo_options}</select></div>
        <button type='submit' class='w-full px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Cadastrar origem</button>
    </form>
</div>"#,
        error = error,
        nome = escape_html(&input.nome),
        tipo_options = tipo_options,
    )
}

/// Origens page - Creation form beside the list
pub async fn page_origens(headers: axum::http::HeaderMap) -> axum::response::Html<String> {
    let inner_content = format!(
        r#"<div class='mb-6'>
            <h2 class='text-2xl font-bold'>Origens</h2>
            <p class='text-sm text-gray-500'>Lojas, serviços e demais lugares onde você gasta</p>
        </div>
        <div class='grid grid-cols-1 lg:grid-cols-3 gap-6'>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='font-semibold mb-4'>Nova origem</h3>
                {}
            </div>
            <div class='lg:col-span-2' id='origens-content' hx-get='/origens/lista' hx-trigger='load, origens-changed from:body'>
                <p class='text-gray-500 text-center py-12'>Carregando...</p>
            </div>
        </div>"#,
        render_origem_form(&NovaOrigemInput::default(), None)
    );

    axum::response::Html(crate::page_response(&headers, "Origens", "/origens", &inner_content))
}

//! Despesa routes - Listing, filters, pagination, create and edit
//!
//! Structure:
//! - api.rs: JSON API and HTMX endpoints
//! - page.rs: Full page and modal rendering

pub mod api;
pub mod page;

pub use api::{
    api_custo_total,
    api_despesa_detail,
    api_despesas,
    htmx_despesa_store,
    htmx_despesa_update,
    htmx_despesas_list,
};

pub use page::{
    htmx_despesa_create_form,
    htmx_despesa_detail,
    htmx_despesa_edit_form,
    page_despesas,
};

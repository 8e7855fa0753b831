//! Origem routes - List, creation form and search picker

pub mod api;
pub mod page;

pub use api::{api_origens, htmx_origem_search, htmx_origem_store, htmx_origens_list};
pub use page::page_origens;

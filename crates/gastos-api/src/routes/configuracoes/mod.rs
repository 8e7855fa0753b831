pub mod api;
pub mod page;

pub use api::{api_cache_clear, api_health};
pub use page::page_configuracoes;

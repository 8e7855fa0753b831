//! Pagador routes - List, creation form and search picker

pub mod api;
pub mod page;

pub use api::{api_pagadores, htmx_pagador_search, htmx_pagador_store, htmx_pagadores_list};
pub use page::page_pagadores;

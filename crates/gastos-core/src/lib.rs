//! Expense domain models, query orchestration and backend client
//!
//! `Tracker` is the entry point for the web layer: it turns filters into
//! backend queries, serves repeated queries from the `QueryCache` and
//! invalidates the affected query families after every mutation.

pub mod cache;
pub mod client;
pub mod error;
pub mod filter;
pub mod forms;
pub mod models;
pub mod types;

use gastos_config::Config;
use rust_decimal::Decimal;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

pub use cache::{QueryCache, QueryKey};
pub use client::{ExpenseBackend, HttpBackend};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorSeverity};
pub use filter::{DespesaFiltro, PageRequest};
pub use forms::{
    EditDespesaInput, EditDespesaPayload, NovaDespesaInput, NovaDespesaPayload, NovaOrigemInput,
    NovaOrigemPayload, NovoPagadorInput, NovoPagadorPayload, OrigemSelecao, ParcelaForm,
};
pub use models::{Competencia, CustoTotal, Despesa, Origem, Pagador, Page};
pub use types::{StatusDespesa, TipoOrigem, TipoPagamento, TipoParcela};

/// Backend reference type
pub type BackendRef = Arc<dyn ExpenseBackend>;

/// One page of the listing together with the total of the same filter set
#[derive(Debug, Clone)]
pub struct DespesasView {
    pub page: Page<Despesa>,
    /// `None` when the total could not be fetched
    pub custo_total: Option<Decimal>,
    pub filtro: DespesaFiltro,
    pub page_request: PageRequest,
}

/// Reachability report for the settings page
#[derive(Debug, Clone, Serialize)]
pub struct BackendStatus {
    pub base_url: String,
    pub reachable: bool,
    pub latency_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn to_payload<T: Serialize>(payload: &T) -> CoreResult<serde_json::Value> {
    serde_json::to_value(payload).map_err(|e| CoreError::InvalidRequest {
        message: e.to_string(),
    })
}

/// Query orchestrator over an `ExpenseBackend`
pub struct Tracker {
    backend: BackendRef,
    cache: QueryCache,
    config: Config,
}

impl Tracker {
    pub fn new(backend: BackendRef, config: Config) -> Self {
        let cache = QueryCache::from_secs(config.cache.ttl_secs);
        Self { backend, cache, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Page request from query parameters using the configured sizes
    pub fn page_request(&self, params: &std::collections::HashMap<String, String>) -> PageRequest {
        PageRequest::from_params(
            params,
            self.config.pagination.page_size,
            self.config.pagination.max_page_size,
        )
    }

    async fn cached<F>(&self, key: QueryKey, fetch: F) -> CoreResult<serde_json::Value>
    where
        F: Future<Output = CoreResult<serde_json::Value>>,
    {
        if let Some(value) = self.cache.get(&key) {
            log::debug!("Cache hit: {:?}", key);
            return Ok(value);
        }
        let generation = self.cache.generation(&key);
        let value = fetch.await?;
        if !self.cache.insert_if_generation(key, generation, value.clone()) && self.cache.is_enabled() {
            log::debug!("Cache: discarded a result invalidated while in flight");
        }
        Ok(value)
    }

    // ==================== Despesas ====================

    pub async fn despesas(&self, filtro: &DespesaFiltro, page: PageRequest) -> CoreResult<Page<Despesa>> {
        let query = filter::listing_query(filtro, &page);
        let key = QueryKey::Despesas {
            filtro: filtro.clone(),
            page,
        };
        let value = self.cached(key, self.backend.list_despesas(&query)).await?;
        Page::from_value(value)
    }

    /// Total cost of every despesa matching the filter, ignoring paging
    pub async fn custo_total(&self, filtro: &DespesaFiltro) -> CoreResult<Decimal> {
        let query = filter::custo_total_query(filtro);
        let key = QueryKey::CustoTotal(filtro.clone());
        let value = self.cached(key, self.backend.custo_total(&query)).await?;
        CustoTotal::from_value(&value)
    }

    /// Listing and total fetched concurrently from the same filter
    ///
    /// A failing total degrades to `None`; a failing listing fails the view.
    pub async fn despesas_view(&self, filtro: DespesaFiltro, page: PageRequest) -> CoreResult<DespesasView> {
        let (listing, total) = tokio::join!(self.despesas(&filtro, page), self.custo_total(&filtro));

        let custo_total = match total {
            Ok(total) => Some(total),
            Err(e) => {
                log::warn!("Custo total unavailable: {}", e);
                None
            }
        };

        Ok(DespesasView {
            page: listing?,
            custo_total,
            filtro,
            page_request: page,
        })
    }

    pub async fn despesa(&self, id: &str) -> CoreResult<Despesa> {
        let key = QueryKey::Despesa(id.to_string());
        let value = self.cached(key, self.backend.get_despesa(id)).await?;
        if value.is_null() {
            return Err(CoreError::NotFound {
                resource: format!("despesa {}", id),
            });
        }
        serde_json::from_value(value).map_err(CoreError::decode)
    }

    pub async fn criar_despesa(&self, payload: &NovaDespesaPayload) -> CoreResult<serde_json::Value> {
        let created = self.backend.create_despesa(to_payload(payload)?).await?;
        self.cache.invalidate_family("despesas");
        self.cache.invalidate_family("custo-total");
        log::info!("Despesa criada: {}", payload.descricao);
        Ok(created)
    }

    pub async fn atualizar_despesa(&self, id: &str, payload: &EditDespesaPayload) -> CoreResult<serde_json::Value> {
        let updated = self.backend.update_despesa(id, to_payload(payload)?).await?;
        self.cache.invalidate_family("despesas");
        self.cache.invalidate_family("custo-total");
        self.cache.invalidate_key(&QueryKey::Despesa(id.to_string()));
        if payload.origem.is_nova() {
            self.cache.invalidate_family("origens");
        }
        log::info!("Despesa {} atualizada", id);
        Ok(updated)
    }

    // ==================== Origens ====================

    pub async fn origens(&self) -> CoreResult<Vec<Origem>> {
        let key = QueryKey::Origens(String::new());
        let value = self.cached(key, self.backend.list_origens("")).await?;
        Ok(Page::<Origem>::from_value(value)?.content)
    }

    /// Name search; a blank term returns nothing without asking the backend
    pub async fn buscar_origens(&self, term: &str) -> CoreResult<Vec<Origem>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let query = filter::search_query(term, self.config.pagination.search_page_size);
        let key = QueryKey::Origens(term.to_string());
        let value = self.cached(key, self.backend.list_origens(&query)).await?;
        Ok(Page::<Origem>::from_value(value)?.content)
    }

    pub async fn criar_origem(&self, payload: &NovaOrigemPayload) -> CoreResult<serde_json::Value> {
        let created = self.backend.create_origem(to_payload(payload)?).await?;
        self.cache.invalidate_family("origens");
        log::info!("Origem criada: {}", payload.nome);
        Ok(created)
    }

    // ==================== Pagadores ====================

    pub async fn pagadores(&self) -> CoreResult<Vec<Pagador>> {
        let key = QueryKey::Pagadores(String::new());
        let value = self.cached(key, self.backend.list_pagadores("")).await?;
        Ok(Page::<Pagador>::from_value(value)?.content)
    }

    pub async fn buscar_pagadores(&self, term: &str) -> CoreResult<Vec<Pagador>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let query = filter::search_query(term, self.config.pagination.search_page_size);
        let key = QueryKey::Pagadores(term.to_string());
        let value = self.cached(key, self.backend.list_pagadores(&query)).await?;
        Ok(Page::<Pagador>::from_value(value)?.content)
    }

    pub async fn criar_pagador(&self, payload: &NovoPagadorPayload) -> CoreResult<serde_json::Value> {
        let created = self.backend.create_pagador(to_payload(payload)?).await?;
        self.cache.invalidate_family("pagadores");
        log::info!("Pagador criado: {}", payload.nome);
        Ok(created)
    }

    // ==================== Status ====================

    /// Probe the backend, bypassing the cache
    pub async fn backend_status(&self) -> BackendStatus {
        let started = Instant::now();
        let result = self.backend.health().await;
        BackendStatus {
            base_url: self.config.backend_base_url().to_string(),
            reachable: result.is_ok(),
            latency_ms: started.elapsed().as_millis(),
            error: result.err().map(|e| e.to_string()),
        }
    }

    /// Drop every cached response, returning how many were stored
    pub fn clear_cache(&self) -> usize {
        let count = self.cache.len();
        self.cache.clear();
        log::info!("Cache cleared ({} entries)", count);
        count
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// In-memory backend recording every call
    #[derive(Default)]
    struct FakeBackend {
        calls: Mutex<Vec<String>>,
        fail_total: bool,
        fail_listing: bool,
        created: AtomicU64,
        /// (entered, release): the next listing signals `entered` then waits for `release`
        listing_gate: Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
    }

    impl FakeBackend {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, prefix: &str) -> usize {
            self.calls().iter().filter(|c| c.starts_with(prefix)).count()
        }
    }

    #[async_trait]
    impl ExpenseBackend for FakeBackend {
        async fn list_despesas(&self, query: &str) -> CoreResult<Value> {
            self.record(format!("list_despesas?{}", query));
            if self.fail_listing {
                return Err(CoreError::BackendUnavailable { message: "down".into() });
            }
            let total = 12 + self.created.load(Ordering::SeqCst);
            let gate = self.listing_gate.lock().unwrap().take();
            if let Some((entered, release)) = gate {
                entered.notify_one();
                release.notified().await;
            }
            Ok(json!({
                "content": [{
                    "id": "d-1", "descricao": "Mercado", "valor": 152.37, "data": "2025-03-15",
                    "status": "NAO_PAGO", "origem": "Pão de Açúcar", "pagador": "Nubank",
                    "competencia": "MARÇO/2025"
                }],
                "totalPages": 2, "totalElements": total, "number": 0, "size": 11
            }))
        }

        async fn get_despesa(&self, id: &str) -> CoreResult<Value> {
            self.record(format!("get_despesa {}", id));
            Ok(json!({
                "id": id, "descricao": "Mercado", "valor": 10, "data": "2025-03-15",
                "status": "PAGO", "origem": "Loja", "pagador": "Nubank", "competencia": "MARÇO/2025",
                "origemId": "o-1", "pagadorId": "p-1"
            }))
        }

        async fn create_despesa(&self, payload: Value) -> CoreResult<Value> {
            self.record(format!("create_despesa {}", payload));
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(payload)
        }

        async fn update_despesa(&self, id: &str, payload: Value) -> CoreResult<Value> {
            self.record(format!("update_despesa {}", id));
            Ok(payload)
        }

        async fn list_origens(&self, query: &str) -> CoreResult<Value> {
            self.record(format!("list_origens?{}", query));
            Ok(json!({"content": [{"id": "o-1", "nome": "Petz", "tipoOrigem": "PET"}]}))
        }

        async fn create_origem(&self, payload: Value) -> CoreResult<Value> {
            self.record("create_origem".to_string());
            Ok(payload)
        }

        async fn list_pagadores(&self, query: &str) -> CoreResult<Value> {
            self.record(format!("list_pagadores?{}", query));
            Ok(json!({"totalElements": 0}))
        }

        async fn create_pagador(&self, payload: Value) -> CoreResult<Value> {
            self.record("create_pagador".to_string());
            Ok(payload)
        }

        async fn custo_total(&self, query: &str) -> CoreResult<Value> {
            self.record(format!("custo_total?{}", query));
            if self.fail_total {
                return Err(CoreError::BackendStatus { status: 500, body: String::new() });
            }
            Ok(json!({"custoTotal": 1234.56}))
        }

        async fn health(&self) -> CoreResult<Value> {
            self.record("health".to_string());
            Ok(Value::Null)
        }
    }

    fn tracker(backend: Arc<FakeBackend>) -> Tracker {
        Tracker::new(backend, Config::default())
    }

    fn nova_despesa() -> NovaDespesaPayload {
        let fields: HashMap<String, String> = [
            ("descricao", "Luz"),
            ("valor", "80,00"),
            ("data", "2025-03-01"),
            ("origemId", "o-1"),
            ("pagadorId", "p-1"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        NovaDespesaInput::from_fields(&fields).unwrap()
    }

    #[tokio::test]
    async fn test_listing_is_cached_per_filter_and_page() {
        let backend = Arc::new(FakeBackend::default());
        let tracker = tracker(backend.clone());
        let filtro = DespesaFiltro::default();

        let page = tracker.despesas(&filtro, PageRequest::new(0, 11)).await.unwrap();
        assert_eq!(page.total_elements, 12);
        tracker.despesas(&filtro, PageRequest::new(0, 11)).await.unwrap();
        assert_eq!(backend.count("list_despesas"), 1);

        tracker.despesas(&filtro, PageRequest::new(1, 11)).await.unwrap();
        assert_eq!(backend.count("list_despesas"), 2);
    }

    #[tokio::test]
    async fn test_view_uses_same_filter_for_listing_and_total() {
        let backend = Arc::new(FakeBackend::default());
        let tracker = tracker(backend.clone());
        let filtro = DespesaFiltro {
            status: Some(StatusDespesa::NaoPago),
            ..Default::default()
        };

        let view = tracker.despesas_view(filtro, PageRequest::new(1, 11)).await.unwrap();
        assert_eq!(view.custo_total, Some(Decimal::from_str("1234.56").unwrap()));
        assert_eq!(view.page.content[0].descricao, "Mercado");

        let calls = backend.calls();
        assert!(calls.contains(&"list_despesas?status=NAO_PAGO&page=1&size=11".to_string()));
        assert!(calls.contains(&"custo_total?status=NAO_PAGO".to_string()));
    }

    #[tokio::test]
    async fn test_failing_total_does_not_hide_listing() {
        let backend = Arc::new(FakeBackend {
            fail_total: true,
            ..Default::default()
        });
        let tracker = tracker(backend);

        let view = tracker
            .despesas_view(DespesaFiltro::default(), PageRequest::new(0, 11))
            .await
            .unwrap();
        assert!(view.custo_total.is_none());
        assert_eq!(view.page.content.len(), 1);
    }

    #[tokio::test]
    async fn test_failing_listing_fails_view() {
        let backend = Arc::new(FakeBackend {
            fail_listing: true,
            ..Default::default()
        });
        let tracker = tracker(backend);
        let result = tracker.despesas_view(DespesaFiltro::default(), PageRequest::new(0, 11)).await;
        assert!(matches!(result, Err(CoreError::BackendUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_create_invalidates_listing_and_total() {
        let backend = Arc::new(FakeBackend::default());
        let tracker = tracker(backend.clone());
        let filtro = DespesaFiltro::default();

        tracker.despesas_view(filtro.clone(), PageRequest::new(0, 11)).await.unwrap();
        tracker.origens().await.unwrap();
        tracker.criar_despesa(&nova_despesa()).await.unwrap();
        tracker.despesas_view(filtro, PageRequest::new(0, 11)).await.unwrap();
        tracker.origens().await.unwrap();

        assert_eq!(backend.count("list_despesas"), 2);
        assert_eq!(backend.count("custo_total"), 2);
        assert_eq!(backend.count("list_origens"), 1);
    }

    #[tokio::test]
    async fn test_update_invalidates_detail_and_inline_origem() {
        let backend = Arc::new(FakeBackend::default());
        let tracker = tracker(backend.clone());

        let despesa = tracker.despesa("d-7").await.unwrap();
        assert_eq!(despesa.origem_id.as_deref(), Some("o-1"));
        tracker.despesa("d-7").await.unwrap();
        tracker.origens().await.unwrap();
        tracker.despesas_view(DespesaFiltro::default(), PageRequest::new(0, 11)).await.unwrap();
        assert_eq!(backend.count("get_despesa"), 1);

        let existing = EditDespesaPayload {
            descricao: "Mercado".to_string(),
            valor: Decimal::from(10),
            data: "2025-03-15".to_string(),
            status: StatusDespesa::Pago,
            origem: OrigemSelecao::Existente("o-1".to_string()),
            pagador_id: "p-1".to_string(),
        };
        tracker.atualizar_despesa("d-7", &existing).await.unwrap();
        tracker.despesa("d-7").await.unwrap();
        tracker.origens().await.unwrap();
        tracker.despesas_view(DespesaFiltro::default(), PageRequest::new(0, 11)).await.unwrap();
        assert_eq!(backend.count("get_despesa"), 2);
        assert_eq!(backend.count("list_origens"), 1);
        assert_eq!(backend.count("list_despesas"), 2);
        assert_eq!(backend.count("custo_total"), 2);

        let inline = EditDespesaPayload {
            origem: OrigemSelecao::Nova(NovaOrigemPayload {
                nome: "Petz".to_string(),
                tipo_origem: TipoOrigem::Pet,
            }),
            ..existing
        };
        tracker.atualizar_despesa("d-7", &inline).await.unwrap();
        tracker.origens().await.unwrap();
        assert_eq!(backend.count("list_origens"), 2);
    }

    #[tokio::test]
    async fn test_listing_in_flight_during_create_is_not_cached() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let backend = Arc::new(FakeBackend {
            listing_gate: Mutex::new(Some((entered.clone(), release.clone()))),
            ..Default::default()
        });
        let tracker = Arc::new(tracker(backend.clone()));

        let slow = {
            let tracker = tracker.clone();
            tokio::spawn(async move {
                tracker
                    .despesas(&DespesaFiltro::default(), PageRequest::new(0, 11))
                    .await
            })
        };
        entered.notified().await;
        tracker.criar_despesa(&nova_despesa()).await.unwrap();
        release.notify_one();

        let stale = slow.await.unwrap().unwrap();
        assert_eq!(stale.total_elements, 12);

        let fresh = tracker
            .despesas(&DespesaFiltro::default(), PageRequest::new(0, 11))
            .await
            .unwrap();
        assert_eq!(fresh.total_elements, 13);
        assert_eq!(backend.count("list_despesas"), 2);
    }

    #[tokio::test]
    async fn test_creating_origem_and_pagador_invalidates_their_lists() {
        let backend = Arc::new(FakeBackend::default());
        let tracker = tracker(backend.clone());

        tracker.pagadores().await.unwrap();
        tracker
            .criar_pagador(&NovoPagadorPayload {
                nome: "Nubank".to_string(),
                tipo_pagamento_enum: TipoPagamento::Credito,
                dia_fatura: Some(10),
                dia_fechamento: None,
            })
            .await
            .unwrap();
        let pagadores = tracker.pagadores().await.unwrap();
        assert!(pagadores.is_empty());
        assert_eq!(backend.count("list_pagadores"), 2);

        tracker.origens().await.unwrap();
        tracker
            .criar_origem(&NovaOrigemPayload {
                nome: "Petz".to_string(),
                tipo_origem: TipoOrigem::Pet,
            })
            .await
            .unwrap();
        tracker.origens().await.unwrap();
        assert_eq!(backend.count("list_origens"), 2);
    }

    #[tokio::test]
    async fn test_blank_search_skips_backend() {
        let backend = Arc::new(FakeBackend::default());
        let tracker = tracker(backend.clone());

        assert!(tracker.buscar_origens("   ").await.unwrap().is_empty());
        assert!(tracker.buscar_pagadores("").await.unwrap().is_empty());
        assert!(backend.calls().is_empty());

        let found = tracker.buscar_origens("pet").await.unwrap();
        assert_eq!(found[0].nome, "Petz");
        assert_eq!(backend.calls(), vec!["list_origens?nome=pet&page=0&size=10".to_string()]);
    }

    #[tokio::test]
    async fn test_backend_status_and_clear_cache() {
        let backend = Arc::new(FakeBackend::default());
        let tracker = tracker(backend.clone());

        let status = tracker.backend_status().await;
        assert!(status.reachable);
        assert_eq!(status.base_url, "http://localhost:8080");

        tracker.origens().await.unwrap();
        assert_eq!(tracker.clear_cache(), 1);
        assert!(tracker.cache().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_cache_always_fetches() {
        let backend = Arc::new(FakeBackend::default());
        let mut config = Config::default();
        config.cache.ttl_secs = 0;
        let tracker = Tracker::new(backend.clone(), config);

        tracker.origens().await.unwrap();
        tracker.origens().await.unwrap();
        assert_eq!(backend.count("list_origens"), 2);
    }
}

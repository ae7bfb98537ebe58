//! Debounced, cached autocomplete for departments and office locations.
//!
//! Calls arriving within the quiet window join one batch; only the last call's
//! query is sent, and every caller in the batch receives that result.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::api::{ApiError, EmployeeApi};
use crate::debounce::Debouncer;
use crate::types::LookupOption;

/// A remote collection searchable by name
#[async_trait]
pub trait OptionSource: Send + Sync {
    /// Collection name for logs
    fn name(&self) -> &'static str;

    async fn search(&self, query: &str) -> Result<Vec<LookupOption>, ApiError>;
}

/// `GET /departments?name_like=`
pub struct DepartmentSource {
    api: Arc<dyn EmployeeApi>,
}

impl DepartmentSource {
    pub fn new(api: Arc<dyn EmployeeApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl OptionSource for DepartmentSource {
    fn name(&self) -> &'static str {
        "departments"
    }

    async fn search(&self, query: &str) -> Result<Vec<LookupOption>, ApiError> {
        let departments = self.api.search_departments(query).await?;
        Ok(departments.into_iter().map(LookupOption::from).collect())
    }
}

/// `GET /locations?name_like=`
pub struct LocationSource {
    api: Arc<dyn EmployeeApi>,
}

impl LocationSource {
    pub fn new(api: Arc<dyn EmployeeApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl OptionSource for LocationSource {
    fn name(&self) -> &'static str {
        "locations"
    }

    async fn search(&self, query: &str) -> Result<Vec<LookupOption>, ApiError> {
        let locations = self.api.search_locations(query).await?;
        Ok(locations.into_iter().map(LookupOption::from).collect())
    }
}

type Waiter = oneshot::Sender<Vec<LookupOption>>;
type Cache = HashMap<String, Vec<LookupOption>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Callers waiting on the next request
#[derive(Default)]
struct Batch {
    generation: u64,
    waiters: Vec<Waiter>,
}

impl Batch {
    /// Add a caller and return the generation its scheduled request must carry
    fn join(&mut self, waiter: Waiter) -> u64 {
        self.waiters.push(waiter);
        self.generation += 1;
        self.generation
    }

    /// The waiters, if `generation` is still the latest. A superseded timer gets nothing.
    fn take(&mut self, generation: u64) -> Option<Vec<Waiter>> {
        (self.generation == generation).then(|| std::mem::take(&mut self.waiters))
    }
}

pub struct OptionLoader {
    source: Arc<dyn OptionSource>,
    debouncer: Mutex<Debouncer>,
    batch: Arc<Mutex<Batch>>,
    cache: Arc<Mutex<Cache>>,
}

impl OptionLoader {
    pub fn new(source: Arc<dyn OptionSource>, debounce: Duration) -> Self {
        Self {
            source,
            debouncer: Mutex::new(Debouncer::new(debounce)),
            batch: Arc::new(Mutex::new(Batch::default())),
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Suggestions for `query`. Never fails: lookup errors yield an empty list.
    pub async fn load_options(&self, query: &str) -> Vec<LookupOption> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let (tx, rx) = oneshot::channel();
        let source = self.source.clone();
        let batch = self.batch.clone();
        let cache = self.cache.clone();
        let query = query.to_string();

        // Join and reschedule under the batch lock; only the newest timer may take it
        {
            let mut pending = lock(&self.batch);
            let generation = pending.join(tx);
            lock(&self.debouncer).schedule(async move {
                let Some(waiters) = lock(&batch).take(generation) else {
                    debug!(source = source.name(), "superseded lookup skipped");
                    return;
                };
                // Detached so a later call cannot abort a request already sent
                tokio::spawn(async move {
                    let options = fetch(source.as_ref(), &cache, &query).await;
                    for waiter in waiters {
                        let _ = waiter.send(options.clone());
                    }
                });
            });
        }

        rx.await.unwrap_or_default()
    }

    pub fn cached_queries(&self) -> usize {
        lock(&self.cache).len()
    }
}

async fn fetch(source: &dyn OptionSource, cache: &Mutex<Cache>, query: &str) -> Vec<LookupOption> {
    if let Some(options) = lock(cache).get(query) {
        debug!(source = source.name(), query, "lookup cache hit");
        return options.clone();
    }

    match source.search(query).await {
        Ok(options) => {
            lock(cache).insert(query.to_string(), options.clone());
            options
        }
        Err(err) => {
            warn!(source = source.name(), query, error = %err, "Lookup failed");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;

    const WINDOW: Duration = Duration::from_millis(300);

    fn departments(api: &Arc<FakeApi>) -> OptionLoader {
        OptionLoader::new(Arc::new(DepartmentSource::new(api.clone())), WINDOW)
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_calls_share_one_request() {
        let api = Arc::new(FakeApi::new().with_departments(&["Engineering", "Finance"]));
        let loader = departments(&api);

        let (a, b, c) = tokio::join!(
            loader.load_options("e"),
            loader.load_options("en"),
            loader.load_options("eng"),
        );

        assert_eq!(api.calls(), vec!["GET /departments?name_like=eng"]);
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(
            c,
            vec![LookupOption {
                label: "Engineering".to_string(),
                value: "Engineering".to_string(),
            }]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_on_worker_threads_share_one_request() {
        let api = Arc::new(FakeApi::new().with_departments(&["Engineering", "Finance"]));
        let loader = Arc::new(OptionLoader::new(
            Arc::new(DepartmentSource::new(api.clone())),
            Duration::from_millis(200),
        ));

        let handles: Vec<_> = ["eng", "engi", "engin", "engine", "enginee", "engineer"]
            .into_iter()
            .map(|query| {
                let loader = loader.clone();
                tokio::spawn(async move { loader.load_options(query).await })
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        assert_eq!(api.count("GET /departments"), 1);
        assert!(results.iter().all(|options| options == &results[0]));
        assert_eq!(results[0][0].value, "Engineering");
    }

    #[test]
    fn test_superseded_timer_leaves_waiters_for_latest() {
        let mut batch = Batch::default();
        let (first, mut first_rx) = oneshot::channel();
        let (second, mut second_rx) = oneshot::channel();
        let stale = batch.join(first);
        let latest = batch.join(second);

        assert!(batch.take(stale).is_none());
        let waiters = batch.take(latest).unwrap();
        assert_eq!(waiters.len(), 2);
        for waiter in waiters {
            waiter.send(vec![]).unwrap();
        }
        assert!(first_rx.try_recv().is_ok());
        assert!(second_rx.try_recv().is_ok());
        assert!(batch.take(latest).unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_staggered_calls_inside_window_collapse() {
        let api = Arc::new(FakeApi::new().with_locations(&["Jakarta", "Bandung"]));
        let loader = Arc::new(OptionLoader::new(
            Arc::new(LocationSource::new(api.clone())),
            WINDOW,
        ));

        let mut handles = Vec::new();
        for query in ["j", "ja", "jak"] {
            let loader = loader.clone();
            handles.push(tokio::spawn(async move { loader.load_options(query).await }));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        for handle in handles {
            let options = handle.await.unwrap();
            assert_eq!(options.len(), 1);
            assert_eq!(options[0].value, "Jakarta");
        }
        assert_eq!(api.count("GET /locations"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_query_issues_no_request() {
        let api = Arc::new(FakeApi::new().with_departments(&["Engineering"]));
        let loader = departments(&api);

        assert!(loader.load_options("").await.is_empty());
        assert!(loader.load_options("   ").await.is_empty());
        assert!(api.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_query_is_cached() {
        let api = Arc::new(FakeApi::new().with_departments(&["Engineering"]));
        let loader = departments(&api);

        let first = loader.load_options("Eng").await;
        let second = loader.load_options("Eng").await;
        assert_eq!(first, second);
        assert_eq!(api.count("GET /departments"), 1);
        assert_eq!(loader.cached_queries(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_resolves_empty_and_is_not_cached() {
        let api = Arc::new(FakeApi::new().with_departments(&["Engineering"]));
        api.fail_on("GET /departments");
        let loader = departments(&api);

        assert!(loader.load_options("Eng").await.is_empty());
        assert!(loader.load_options("Eng").await.is_empty());
        assert_eq!(api.count("GET /departments"), 2);
        assert_eq!(loader.cached_queries(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_request_survives_new_call() {
        let api = Arc::new(
            FakeApi::new()
                .with_departments(&["Engineering", "Finance"])
                .with_latency(Duration::from_millis(1000)),
        );
        let loader = Arc::new(departments(&api));

        let first = {
            let loader = loader.clone();
            tokio::spawn(async move { loader.load_options("Eng").await })
        };
        // Past the window, request in flight
        tokio::time::sleep(WINDOW + Duration::from_millis(100)).await;
        let second = loader.load_options("Fin").await;

        assert_eq!(first.await.unwrap()[0].value, "Engineering");
        assert_eq!(second[0].value, "Finance");
        assert_eq!(api.count("GET /departments"), 2);
    }
}

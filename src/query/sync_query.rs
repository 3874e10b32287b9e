//! SyncQuery — one logical synchronization channel: one named query against
//! one list.
//!
//! A query cycles between Idle and Negotiating. `execute` collapses
//! overlapping callers onto a single in-flight cycle (and onto the previous
//! cycle inside the debounce window), hydrates from a stored snapshot when
//! one is usable, fetches changes from the remote source, reconciles the
//! cache, and persists a fresh snapshot when persistence is enabled.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::cache::{IndexedCache, SharedCache};
use crate::collection::List;
use crate::config::SyncConfig;
use crate::error::{ConfigError, CycleError};
use crate::query::options::{PersistenceMode, QueryOptions};
use crate::remote::{QuerySpec, RemoteDataSource};
use crate::storage::snapshot::{storage_key, QuerySnapshot};
use crate::storage::{KeyValueStore, StoreKind};
use crate::types::{ChangeBatch, OperationMode};

// ============================================================================
// CycleHandle
// ============================================================================

type CycleOutcome = Option<Result<(), CycleError>>;

/// Handle on one sync cycle. Cloneable — every caller that was collapsed onto
/// the cycle holds a handle with the same id and observes the same outcome,
/// resolved exactly once.
#[derive(Debug, Clone)]
pub struct CycleHandle {
    id: u64,
    cache: SharedCache,
    rx: watch::Receiver<CycleOutcome>,
}

impl CycleHandle {
    /// Identifies the cycle this handle observes. Two `execute` calls inside
    /// the debounce window return handles with equal ids.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the cycle to complete. On success every cache mutation from
    /// the cycle has already been applied to the returned cache.
    pub async fn resolved(mut self) -> Result<SharedCache, CycleError> {
        loop {
            let outcome = self.rx.borrow_and_update().clone();
            if let Some(outcome) = outcome {
                return outcome.map(|()| Arc::clone(&self.cache));
            }
            if self.rx.changed().await.is_err() {
                return Err(CycleError::Dropped);
            }
        }
    }
}

// ============================================================================
// SyncQuery
// ============================================================================

struct QueryState {
    last_run: Option<DateTime<Utc>>,
    change_token: Option<String>,
    /// True exactly while one fetch cycle is outstanding.
    negotiating: bool,
    /// Downgraded to `None` for the rest of the session after a storage
    /// failure.
    persistence: PersistenceMode,
    /// The in-flight or most recently resolved cycle.
    current: Option<CycleHandle>,
    next_cycle_id: u64,
}

pub struct SyncQuery {
    list: Arc<List>,
    source: Arc<dyn RemoteDataSource>,
    config: Arc<SyncConfig>,
    durable: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
    options: QueryOptions,
    cache: SharedCache,
    state: Mutex<QueryState>,
    /// Flips to true permanently once first data is available (from snapshot
    /// hydration or the first completed cycle).
    initialized_tx: watch::Sender<bool>,
}

impl SyncQuery {
    pub fn new(
        list: Arc<List>,
        source: Arc<dyn RemoteDataSource>,
        durable: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
        config: Arc<SyncConfig>,
        options: QueryOptions,
    ) -> Result<Arc<Self>, ConfigError> {
        options.validate()?;
        let persistence = options.persistence;
        let (initialized_tx, _) = watch::channel(false);
        Ok(Arc::new(Self {
            list,
            source,
            config,
            durable,
            session,
            options,
            cache: IndexedCache::shared(),
            state: Mutex::new(QueryState {
                last_run: None,
                change_token: None,
                negotiating: false,
                persistence,
                current: None,
                next_cycle_id: 0,
            }),
            initialized_tx,
        }))
    }

    // -----------------------------------------------------------------------
    // Public API
    // -----------------------------------------------------------------------

    /// Start a sync cycle, or join the one already in flight.
    ///
    /// While a fetch is outstanding, or when the previous cycle completed
    /// less than the configured debounce interval ago, the existing handle is
    /// returned unchanged and no new work starts.
    pub fn execute(self: &Arc<Self>) -> CycleHandle {
        let mut state = self.state.lock();

        let debounced = state.last_run.is_some_and(|last_run| {
            Utc::now().signed_duration_since(last_run)
                < Duration::milliseconds(self.config.debounce_ms as i64)
        });
        if state.negotiating || debounced {
            if let Some(handle) = &state.current {
                return handle.clone();
            }
        }

        state.negotiating = true;
        let id = state.next_cycle_id;
        state.next_cycle_id += 1;

        let (tx, rx) = watch::channel(None);
        let handle = CycleHandle {
            id,
            cache: Arc::clone(&self.cache),
            rx,
        };
        state.current = Some(handle.clone());
        drop(state);

        let query = Arc::clone(self);
        tokio::spawn(async move {
            query.run_cycle(tx).await;
        });

        handle
    }

    /// Resolves once the query has data — after snapshot hydration or the
    /// first completed cycle, whichever happens first.
    pub async fn initialized(&self) -> SharedCache {
        let mut rx = self.initialized_tx.subscribe();
        // The sender lives on self, so wait_for can only fail if the query
        // is being dropped mid-await; the cache handle is still valid then.
        let _ = rx.wait_for(|ready| *ready).await;
        Arc::clone(&self.cache)
    }

    pub fn cache(&self) -> SharedCache {
        Arc::clone(&self.cache)
    }

    pub fn name(&self) -> &str {
        &self.options.name
    }

    pub fn list(&self) -> &Arc<List> {
        &self.list
    }

    pub fn change_token(&self) -> Option<String> {
        self.state.lock().change_token.clone()
    }

    pub fn last_run(&self) -> Option<DateTime<Utc>> {
        self.state.lock().last_run
    }

    pub fn negotiating_with_server(&self) -> bool {
        self.state.lock().negotiating
    }

    /// Where snapshots currently go; `PersistenceMode::None` after a storage
    /// failure even if the query was configured to persist.
    pub fn persistence_mode(&self) -> PersistenceMode {
        self.state.lock().persistence
    }

    /// The composite key this query's snapshots are stored under.
    pub fn storage_key(&self) -> Result<String, ConfigError> {
        let list_id = self.list.list_id(&self.config.environment)?;
        Ok(storage_key(&list_id, &self.options.name))
    }

    // -----------------------------------------------------------------------
    // Cycle body
    // -----------------------------------------------------------------------

    async fn run_cycle(self: Arc<Self>, tx: watch::Sender<CycleOutcome>) {
        match self.cycle_body().await {
            Ok(()) => {
                self.finish_cycle();
                let _ = tx.send(Some(Ok(())));
            }
            Err(error) => {
                // Leave change_token/last_run untouched so no partial
                // progress is recorded; clear the flag so the next call
                // can retry.
                self.state.lock().negotiating = false;
                let _ = tx.send(Some(Err(error)));
            }
        }
    }

    async fn cycle_body(&self) -> Result<(), CycleError> {
        let list_id = self.list.list_id(&self.config.environment)?;
        let key = storage_key(&list_id, &self.options.name);

        let snapshot = QuerySnapshot::load(self.durable.as_ref(), &key)
            .or_else(|| QuerySnapshot::load(self.session.as_ref(), &key));
        let expiration_ms = self
            .options
            .expiration_ms
            .unwrap_or(self.config.default_expiration_ms);

        let mut make_request = true;

        if !self.options.force {
            if let Some(snapshot) = snapshot {
                if snapshot.has_expired(expiration_ms) {
                    QuerySnapshot::purge(self.durable.as_ref(), &key);
                    QuerySnapshot::purge(self.session.as_ref(), &key);
                } else {
                    match self.options.operation {
                        OperationMode::Incremental => {
                            // After the first cycle the token and cache are
                            // already in sync; hydrating again would be a
                            // no-op at best.
                            let first_cycle = self.state.lock().last_run.is_none();
                            if first_cycle {
                                self.hydrate(&snapshot);
                            }
                        }
                        OperationMode::FullReplace => {
                            self.hydrate(&snapshot);
                            make_request = self.cache.read().is_empty();
                        }
                    }
                }
            }
        }

        // A run-once query serves its cached result once a fetch has
        // completed in this session.
        if self.options.operation == OperationMode::FullReplace && self.options.run_once {
            let already_ran = self.state.lock().last_run.is_some();
            if already_ran {
                make_request = false;
            }
        }

        if make_request {
            if self.options.operation == OperationMode::FullReplace {
                // An authoritative replacement: drop entities that may no
                // longer satisfy the query before applying fresh results.
                self.cache.write().clear();
            }
            let spec = self.build_spec(list_id);
            let batch = self.source.fetch(&spec).await?;
            self.apply_batch(batch)?;
        }

        Ok(())
    }

    fn build_spec(&self, list_id: String) -> QuerySpec {
        QuerySpec {
            list_id,
            web_url: self
                .list
                .identify_web_url(self.config.default_url.as_deref()),
            view_fields: self
                .options
                .view_fields
                .clone()
                .unwrap_or_else(|| self.list.view_fields().to_string()),
            query: self.options.query.clone(),
            mode: self.options.operation,
            row_limit: self.options.row_limit,
            entity_id: self.options.entity_id,
            change_token: match self.options.operation {
                OperationMode::Incremental => self.state.lock().change_token.clone(),
                OperationMode::FullReplace => None,
            },
        }
    }

    /// Rebuild the cache from a fresh stored snapshot and adopt its sync
    /// metadata, so an incremental fetch afterwards only has to pull changes
    /// made since the snapshot's token.
    fn hydrate(&self, snapshot: &QuerySnapshot) {
        {
            let mut cache = self.cache.write();
            for raw in snapshot.indexed_cache.values() {
                match self.list.decode(raw) {
                    Ok(entity) => cache.insert(entity),
                    Err(error) => {
                        tracing::warn!(
                            list = %self.list.title,
                            query = %self.options.name,
                            %error,
                            "skipping undecodable snapshot record"
                        );
                    }
                }
            }
        }

        {
            let mut state = self.state.lock();
            state.last_run = Some(snapshot.last_run);
            state.change_token = snapshot.change_token.clone();
        }

        // Unblock anyone awaiting first data.
        self.mark_initialized();
    }

    /// Apply one fetched batch. All records are decoded before the cache is
    /// touched and the change token only advances after the whole batch is
    /// in, so a bad record cannot leave a half-applied batch behind a new
    /// token.
    fn apply_batch(&self, batch: ChangeBatch) -> Result<(), CycleError> {
        let mut decoded = Vec::with_capacity(batch.records.len());
        for raw in &batch.records {
            decoded.push(self.list.decode(raw)?);
        }

        {
            let mut cache = self.cache.write();
            for entity in decoded {
                cache.insert(entity);
            }
            for id in &batch.deleted {
                cache.remove(*id);
            }
        }

        // A list-level mask name on the response is more authoritative than
        // sampling a record's mask, so it claims the set-once slot first.
        if let Some(name) = &batch.list_permissions {
            self.list.extend_permissions_from_mask_name(name);
        }

        if batch.change_token.is_some() {
            self.state.lock().change_token = batch.change_token;
        }
        Ok(())
    }

    /// Reconciliation after a successful cycle, whether data came from the
    /// server or from cache reuse.
    fn finish_cycle(&self) {
        self.mark_initialized();

        {
            let cache = self.cache.read();
            if let Some(first) = cache.first() {
                self.list.extend_permissions_from_entity(first);
            }
        }

        let now = Utc::now();
        self.list.set_last_server_update(now);
        {
            let mut state = self.state.lock();
            state.negotiating = false;
            state.last_run = Some(now);
        }

        self.persist();
    }

    /// Write a snapshot of the current state. Failures degrade persistence
    /// for the rest of the session but never fail the cycle.
    fn persist(&self) {
        if self.config.offline {
            return;
        }

        let (mode, change_token, last_run) = {
            let state = self.state.lock();
            (state.persistence, state.change_token.clone(), state.last_run)
        };
        let (store, kind) = match mode {
            PersistenceMode::None => return,
            PersistenceMode::Durable => (&self.durable, StoreKind::Durable),
            PersistenceMode::Session => (&self.session, StoreKind::Session),
        };
        let Some(last_run) = last_run else {
            return;
        };
        let Ok(key) = self.storage_key() else {
            return;
        };

        let snapshot = QuerySnapshot::capture(&self.cache.read(), change_token, last_run);
        if !snapshot.save(store.as_ref(), kind, &key) {
            self.state.lock().persistence = PersistenceMode::None;
        }
    }

    fn mark_initialized(&self) {
        self.initialized_tx.send_if_modified(|ready| {
            if *ready {
                false
            } else {
                *ready = true;
                true
            }
        });
    }
}

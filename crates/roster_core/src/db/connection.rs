//! Lazily opened, cached store connection.
//!
//! # Responsibility
//! - Open the store once per manager and hand the same handle to every caller.
//! - Create the schema on first open (through [`open_store`]).
//!
//! # Invariants
//! - At most one open attempt is issued per manager. The open runs as its own
//!   task, so a caller that stops waiting never cancels or restarts it;
//!   every caller awaits the same published outcome.
//! - The first outcome is final. A failed open is returned to every later
//!   caller and is never retried; there is no teardown or reconnect path.
//!   Restarting the process (or building a new manager) is the only recovery.

use crate::config::StoreConfig;
use crate::db::open_store;
use crate::error::{StoreError, StoreResult};
use log::{error, info};
use once_cell::sync::{Lazy, OnceCell};
use rusqlite::Connection;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::watch;

/// Handle shared by every operation issued through one manager.
pub type SharedConnection = Arc<Mutex<Connection>>;

type Outcome = Option<StoreResult<SharedConnection>>;

static SHARED_MANAGER: Lazy<Arc<ConnectionManager>> =
    Lazy::new(|| Arc::new(ConnectionManager::new(StoreConfig::from_env())));

/// Lifecycle of the managed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Nobody asked for the connection yet.
    Unrequested,
    /// The open task is running.
    Pending,
    /// The handle is open and cached.
    Ready,
    /// The open failed; the failure is cached.
    Failed,
}

/// Owns the single connection to the student store.
#[derive(Debug)]
pub struct ConnectionManager {
    config: StoreConfig,
    launched: OnceCell<()>,
    open_attempts: AtomicUsize,
    outcome: Arc<watch::Sender<Outcome>>,
}

impl ConnectionManager {
    /// Creates a manager in the `Unrequested` state. Nothing is opened yet.
    pub fn new(config: StoreConfig) -> Self {
        let (outcome, _) = watch::channel(None);
        Self {
            config,
            launched: OnceCell::new(),
            open_attempts: AtomicUsize::new(0),
            outcome: Arc::new(outcome),
        }
    }

    /// Process-wide manager configured from the environment
    /// (see [`StoreConfig::from_env`]).
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED_MANAGER)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the shared connection, opening the store on first use.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// - [`StoreError::Open`] when the store cannot be opened or its schema
    ///   cannot be created. The same error is returned on every later call.
    pub async fn obtain_connection(&self) -> StoreResult<SharedConnection> {
        let mut published = self.outcome.subscribe();
        self.launch_open();

        let outcome = published
            .wait_for(Option::is_some)
            .await
            .map_err(|_| StoreError::open("open task ended without a result"))?;
        match outcome.as_ref() {
            Some(result) => result.clone(),
            None => Err(StoreError::open("open task ended without a result")),
        }
    }

    pub fn state(&self) -> ConnectionState {
        match self.outcome.borrow().as_ref() {
            Some(Ok(_)) => ConnectionState::Ready,
            Some(Err(_)) => ConnectionState::Failed,
            None if self.launched.get().is_some() => ConnectionState::Pending,
            None => ConnectionState::Unrequested,
        }
    }

    /// Number of open attempts issued so far (0 or 1).
    pub fn open_attempts(&self) -> usize {
        self.open_attempts.load(Ordering::Acquire)
    }

    /// Spawns the open task on first call; later calls do nothing.
    fn launch_open(&self) {
        self.launched.get_or_init(|| {
            self.open_attempts.fetch_add(1, Ordering::AcqRel);
            let config = self.config.clone();
            let outcome = Arc::clone(&self.outcome);
            tokio::spawn(async move {
                let result = open_shared(config).await;
                outcome.send_replace(Some(result));
            });
        });
    }
}

async fn open_shared(config: StoreConfig) -> StoreResult<SharedConnection> {
    let started_at = Instant::now();
    let mode = config.location.mode();

    let opened = match tokio::task::spawn_blocking(move || open_store(&config)).await {
        Ok(result) => result.map_err(StoreError::from),
        Err(join_err) => Err(StoreError::open(join_err)),
    };

    match opened {
        Ok(conn) => {
            info!(
                "event=connection_obtain module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(Arc::new(Mutex::new(conn)))
        }
        Err(err) => {
            error!(
                "event=connection_obtain module=db status=error mode={} duration_ms={} error_code={} error={}",
                mode,
                started_at.elapsed().as_millis(),
                err.code(),
                err
            );
            Err(err)
        }
    }
}

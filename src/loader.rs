//! Single-flight loader for the session's flat menu dataset.
//!
//! The first authenticated `load` starts exactly one backend call; every
//! other caller, concurrent or later, shares its outcome. A rejection is
//! cached just like a success. The cache is keyed by nothing: a principal
//! change needs [`MenuLoader::invalidate`] (or a new loader).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, info, warn};

use crate::client::MenuBackend;
use crate::error::{MenuError, Result};
use crate::normalize::normalize_order;
use crate::principal::AuthContext;
use crate::record::MenuRecord;

pub type MenuDataset = Arc<Vec<MenuRecord>>;

type SharedLoad = Shared<BoxFuture<'static, Result<MenuDataset>>>;

enum LoadState {
    Idle,
    Pending { flight: u64, load: SharedLoad },
    Resolved(MenuDataset),
    Rejected(MenuError),
}

/// Observable cache state, mostly for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Pending,
    Resolved,
    Rejected,
}

struct Inner {
    state: LoadState,
    /// Bumped per backend call so a stale flight cannot overwrite a newer one.
    flights: u64,
}

pub struct MenuLoader {
    backend: Arc<dyn MenuBackend>,
    inner: Mutex<Inner>,
}

impl MenuLoader {
    pub fn new(backend: Arc<dyn MenuBackend>) -> Self {
        Self {
            backend,
            inner: Mutex::new(Inner {
                state: LoadState::Idle,
                flights: 0,
            }),
        }
    }

    /// The session's flat records with `order` already reconciled.
    /// On the login page this is empty and the cache is left untouched.
    pub async fn load(&self, auth: &AuthContext) -> Result<MenuDataset> {
        if auth.is_login_page() {
            debug!("login page: skipping menu load");
            return Ok(Arc::new(Vec::new()));
        }

        let (flight, load) = {
            let mut guard = self.lock();
            let inner = &mut *guard;
            match &inner.state {
                LoadState::Resolved(records) => return Ok(Arc::clone(records)),
                LoadState::Rejected(err) => return Err(err.clone()),
                LoadState::Pending { flight, load } => {
                    debug!(flight, "joining in-flight menu load");
                    (*flight, load.clone())
                }
                LoadState::Idle => {
                    inner.flights += 1;
                    let flight = inner.flights;
                    let load = self.start(auth.user_id().map(str::to_owned));
                    inner.state = LoadState::Pending {
                        flight,
                        load: load.clone(),
                    };
                    debug!(flight, "started menu load");
                    (flight, load)
                }
            }
        };

        let outcome = load.await;
        self.settle(flight, &outcome);
        outcome
    }

    /// Drop the cached outcome; the next `load` fetches again.
    pub fn invalidate(&self) {
        let mut inner = self.lock();
        inner.state = LoadState::Idle;
        debug!("menu cache invalidated");
    }

    pub fn status(&self) -> LoadStatus {
        match self.lock().state {
            LoadState::Idle => LoadStatus::Idle,
            LoadState::Pending { .. } => LoadStatus::Pending,
            LoadState::Resolved(_) => LoadStatus::Resolved,
            LoadState::Rejected(_) => LoadStatus::Rejected,
        }
    }

    fn start(&self, user_id: Option<String>) -> SharedLoad {
        let backend = Arc::clone(&self.backend);
        async move {
            let records = backend.fetch_user_menus(user_id.as_deref()).await?;
            let records: Vec<MenuRecord> = records.into_iter().map(normalize_order).collect();
            Ok(Arc::new(records))
        }
        .boxed()
        .shared()
    }

    fn settle(&self, flight: u64, outcome: &Result<MenuDataset>) {
        let mut inner = self.lock();
        let current = matches!(inner.state, LoadState::Pending { flight: f, .. } if f == flight);
        if !current {
            return;
        }

        inner.state = match outcome {
            Ok(records) => {
                info!(flight, records = records.len(), "menu dataset cached");
                LoadState::Resolved(Arc::clone(records))
            }
            Err(err) => {
                warn!(flight, error = %err, "menu load failed; caching rejection");
                LoadState::Rejected(err.clone())
            }
        };
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

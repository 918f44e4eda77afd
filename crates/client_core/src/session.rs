//! Query session state and the controller that drives location queries.
//!
//! Every submission takes a fresh token from the session. Results are only
//! applied while their token is still the current one, so a slow query can
//! never overwrite the outcome of a newer one.

use std::sync::Arc;

use shared::{
    domain::{LocationRecord, ResidentRecord},
    error::FailureKind,
    pagination::PageCursor,
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{error::FetchError, ApiClient, LocationFetcher, ResidentCollector};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing has been loaded yet.
    Idle,
    Loading {
        identifier: String,
    },
    Ready,
    Failed {
        kind: FailureKind,
        message: String,
    },
}

#[derive(Debug, Clone)]
pub struct QuerySession {
    token: u64,
    current_location: Option<LocationRecord>,
    residents: Vec<ResidentRecord>,
    cursor: PageCursor,
    state: LoadState,
}

impl Default for QuerySession {
    fn default() -> Self {
        Self {
            token: 0,
            current_location: None,
            residents: Vec::new(),
            cursor: PageCursor::default(),
            state: LoadState::Idle,
        }
    }
}

impl QuerySession {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn current_location(&self) -> Option<&LocationRecord> {
        self.current_location.as_ref()
    }

    pub fn residents(&self) -> &[ResidentRecord] {
        &self.residents
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading { .. })
    }

    pub fn page_index(&self) -> usize {
        self.cursor.page_index()
    }

    pub fn page_size(&self) -> usize {
        self.cursor.page_size()
    }

    pub fn total_pages(&self) -> usize {
        self.cursor.total_pages(self.residents.len())
    }

    pub fn current_page(&self) -> &[ResidentRecord] {
        self.cursor.page(&self.residents)
    }

    pub fn next_page(&mut self) -> usize {
        self.cursor.next(self.residents.len())
    }

    pub fn previous_page(&mut self) -> usize {
        self.cursor.previous(self.residents.len())
    }

    pub fn go_to_page(&mut self, page_index: usize) -> usize {
        self.cursor.go_to(page_index, self.residents.len())
    }

    /// Starts a new query and returns its token. Previously loaded data stays
    /// visible until the query completes.
    fn begin(&mut self, identifier: &str) -> u64 {
        self.token += 1;
        self.state = LoadState::Loading {
            identifier: identifier.to_string(),
        };
        self.token
    }

    fn apply(&mut self, location: LocationRecord, residents: Vec<ResidentRecord>) {
        self.current_location = Some(location);
        self.residents = residents;
        self.cursor.reset();
        self.state = LoadState::Ready;
    }

    fn fail(&mut self, err: &FetchError) {
        self.state = LoadState::Failed {
            kind: err.kind(),
            message: err.to_string(),
        };
    }
}

#[derive(Debug)]
pub enum QueryOutcome {
    /// Blank input; nothing was requested.
    Ignored,
    Applied {
        location: LocationRecord,
        resident_count: usize,
    },
    /// A newer query started before this one finished.
    Stale,
    Failed(FetchError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoadStarted {
        token: u64,
        identifier: String,
    },
    LoadFinished {
        token: u64,
        resident_count: usize,
    },
    LoadFailed {
        token: u64,
        kind: FailureKind,
        message: String,
    },
    StaleDiscarded {
        token: u64,
    },
    PageChanged {
        page_index: usize,
    },
}

pub struct QueryController {
    locations: Arc<dyn LocationFetcher>,
    residents: Arc<dyn ResidentCollector>,
    session: Mutex<QuerySession>,
    inflight: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<SessionEvent>,
}

impl QueryController {
    pub fn new(
        locations: Arc<dyn LocationFetcher>,
        residents: Arc<dyn ResidentCollector>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            locations,
            residents,
            session: Mutex::new(QuerySession::default()),
            inflight: Mutex::new(None),
            events,
        })
    }

    pub fn with_client(client: ApiClient) -> Arc<Self> {
        let client = Arc::new(client);
        Self::new(client.clone(), client)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> QuerySession {
        self.session.lock().await.clone()
    }

    /// Runs a full query for `identifier`: location first, then every
    /// resident it references.
    pub async fn submit(&self, identifier: &str) -> QueryOutcome {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            debug!("ignoring blank location identifier");
            return QueryOutcome::Ignored;
        }

        let token = self.session.lock().await.begin(identifier);
        let _ = self.events.send(SessionEvent::LoadStarted {
            token,
            identifier: identifier.to_string(),
        });

        let result = self.load(identifier).await;

        let mut session = self.session.lock().await;
        if session.token() != token {
            warn!(
                token,
                current = session.token(),
                identifier,
                "discarding stale query result"
            );
            drop(session);
            let _ = self.events.send(SessionEvent::StaleDiscarded { token });
            return QueryOutcome::Stale;
        }

        match result {
            Ok((location, residents)) => {
                let resident_count = residents.len();
                info!(
                    token,
                    location_id = %location.location_id,
                    name = %location.name,
                    resident_count,
                    "location query applied"
                );
                session.apply(location.clone(), residents);
                drop(session);
                let _ = self.events.send(SessionEvent::LoadFinished {
                    token,
                    resident_count,
                });
                QueryOutcome::Applied {
                    location,
                    resident_count,
                }
            }
            Err(err) => {
                warn!(token, identifier, error = %err, "location query failed");
                session.fail(&err);
                drop(session);
                let _ = self.events.send(SessionEvent::LoadFailed {
                    token,
                    kind: err.kind(),
                    message: err.to_string(),
                });
                QueryOutcome::Failed(err)
            }
        }
    }

    /// Cancels any in-flight query and runs `identifier` in the background.
    /// Blank input leaves the in-flight query running.
    pub async fn spawn_submit(self: &Arc<Self>, identifier: impl Into<String>) {
        let identifier = identifier.into();
        if identifier.trim().is_empty() {
            debug!("ignoring blank location identifier");
            return;
        }
        let controller = Arc::clone(self);
        let mut inflight = self.inflight.lock().await;
        if let Some(task) = inflight.take() {
            if !task.is_finished() {
                debug!("cancelling in-flight location query");
            }
            task.abort();
        }
        *inflight = Some(tokio::spawn(async move {
            controller.submit(&identifier).await;
        }));
    }

    /// Waits for the background query started by [`Self::spawn_submit`], if any.
    pub async fn wait_idle(&self) {
        let task = self.inflight.lock().await.take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }

    pub async fn next_page(&self) -> usize {
        self.navigate(QuerySession::next_page).await
    }

    pub async fn previous_page(&self) -> usize {
        self.navigate(QuerySession::previous_page).await
    }

    pub async fn go_to_page(&self, page_index: usize) -> usize {
        self.navigate(|session| session.go_to_page(page_index)).await
    }

    async fn navigate(&self, step: impl FnOnce(&mut QuerySession) -> usize) -> usize {
        let mut session = self.session.lock().await;
        let before = session.page_index();
        let after = step(&mut *session);
        drop(session);
        if after != before {
            let _ = self
                .events
                .send(SessionEvent::PageChanged { page_index: after });
        }
        after
    }

    async fn load(
        &self,
        identifier: &str,
    ) -> Result<(LocationRecord, Vec<ResidentRecord>), FetchError> {
        let location = self.locations.fetch_location(identifier).await?;
        let residents = self
            .residents
            .fetch_residents(&location.resident_refs)
            .await?;
        Ok((location, residents))
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;

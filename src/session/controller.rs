use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::api::gateway::UserGateway;
use crate::core::error::GatewayError;
use crate::models::status::DataStatus;
use crate::models::user::User;
use crate::session::search::SearchInput;
use crate::session::state::{Notification, SessionStatus, Snapshot, TriggerOutcome};
use crate::view::derive::{available_roles, ProjectionCache};
use crate::view::spec::{RoleFilter, SortSpec};

/// Everything the controller owns. Only touched under the controller's lock.
struct SessionState {
    status: SessionStatus,
    data_status: Option<DataStatus>,
    collection: Arc<Vec<User>>,
    roles: Arc<Vec<String>>,
    filter: RoleFilter,
    sort: SortSpec,
    search: SearchInput,
    committed_term: String,
    error_message: Option<String>,
    /// Bumped on every focus request
    focus_request: u64,
    /// Last request the display layer served
    focus_served: u64,
    projections: ProjectionCache,
}

impl SessionState {
    fn new(min_term_length: usize) -> Self {
        Self {
            status: SessionStatus::Initializing,
            data_status: None,
            collection: Arc::new(Vec::new()),
            roles: Arc::new(Vec::new()),
            filter: RoleFilter::All,
            sort: SortSpec::None,
            search: SearchInput::new(min_term_length),
            committed_term: String::new(),
            error_message: None,
            focus_request: 0,
            focus_served: 0,
            projections: ProjectionCache::new(),
        }
    }

    /// Swap in a freshly fetched collection and settle to idle
    fn replace_collection(&mut self, users: Vec<User>) {
        self.roles = Arc::new(available_roles(&users));
        self.collection = Arc::new(users);
        self.status = SessionStatus::Idle;
        self.error_message = None;
    }

    fn snapshot(&mut self) -> Snapshot {
        let projected_records =
            self.projections
                .get_or_derive(&self.collection, &self.filter, self.sort);

        Snapshot {
            status: self.status.clone(),
            data_status: self.data_status,
            projected_records,
            total_records: self.collection.len(),
            available_roles: Arc::clone(&self.roles),
            filter: self.filter.clone(),
            sort: self.sort,
            error_message: self.error_message.clone(),
            pending_term: self.search.pending().to_string(),
            committed_term: self.committed_term.clone(),
            search_hint: self.search.hint(),
            focus_requested: self.focus_request > self.focus_served,
            focus_request: self.focus_request,
        }
    }
}

/// Owns the authoritative collection and drives every remote round-trip.
///
/// One action may be in flight at a time. The check happens under the
/// state lock at the start of each trigger, so a second trigger that
/// arrives before the display layer disables its controls gets
/// [`TriggerOutcome::Busy`] instead of a second request.
pub struct SessionController<G> {
    gateway: G,
    state: Mutex<SessionState>,
    started: AtomicBool,
    snapshots: watch::Sender<Snapshot>,
    notifications: mpsc::UnboundedSender<Notification>,
}

impl<G: UserGateway> SessionController<G> {
    pub fn new(gateway: G, min_term_length: usize) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let mut state = SessionState::new(min_term_length);
        let (snapshots, _) = watch::channel(state.snapshot());
        let (notifications, receiver) = mpsc::unbounded_channel();

        let controller = Self {
            gateway,
            state: Mutex::new(state),
            started: AtomicBool::new(false),
            snapshots,
            notifications,
        };

        (controller, receiver)
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &mut SessionState) {
        self.snapshots.send_replace(state.snapshot());
    }

    fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.lock();
        let result = f(&mut state);
        self.publish(&mut state);
        result
    }

    fn notify(&self, notification: Notification) {
        if self.notifications.send(notification).is_err() {
            debug!("Notification receiver dropped");
        }
    }

    /// Claim the single in-flight slot, or report why it cannot be claimed
    fn begin(&self, trigger: &'static str) -> bool {
        let mut state = self.lock();
        if state.status.is_busy() {
            debug!(trigger, status = %state.status, "Trigger ignored while busy");
            return false;
        }

        state.status = SessionStatus::Loading;
        self.publish(&mut state);
        true
    }

    /// Record a failed trigger. The collection is left untouched.
    fn fail(&self, trigger: &'static str, err: &GatewayError) {
        warn!(
            trigger,
            error = %err,
            cause = %err.cause(),
            "Trigger failed, keeping last good collection"
        );

        let message = err.to_string();
        self.update(|state| {
            state.status = SessionStatus::Error(message.clone());
            state.error_message = Some(message.clone());
        });
        self.notify(Notification::error(message));
    }

    /// Leave `initializing`: fetch status and the full collection together.
    ///
    /// A status failure is logged and ignored. Only the first call does
    /// anything; later calls report [`TriggerOutcome::NotActionable`].
    pub async fn initialize(&self) -> TriggerOutcome {
        if self.started.swap(true, Ordering::SeqCst) {
            return TriggerOutcome::NotActionable;
        }

        let (status, users) = tokio::join!(self.gateway.get_status(), self.gateway.fetch_all());

        let status = match status {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(error = %e, cause = %e.cause(), "Data status unavailable, continuing without it");
                None
            }
        };

        if matches!(status, Some(s) if !s.data_loaded) {
            self.notify(Notification::info(
                "No data loaded. Run a bulk load to fetch users from the external API.",
            ));
        }

        match users {
            Ok(users) => {
                info!(
                    users = users.len(),
                    total_users = ?status.map(|s| s.total_users),
                    "Session initialized"
                );
                self.update(|state| {
                    state.data_status = status;
                    state.replace_collection(users);
                });
                TriggerOutcome::Applied
            }
            Err(e) => {
                self.update(|state| state.data_status = status);
                self.fail("initialize", &e);
                TriggerOutcome::Failed
            }
        }
    }

    /// Re-run the last committed search, or fetch everything if there is none
    pub async fn refresh(&self) -> TriggerOutcome {
        if !self.begin("refresh") {
            return TriggerOutcome::Busy;
        }

        let term = self.lock().committed_term.clone();
        let result = if term.is_empty() {
            self.gateway.fetch_all().await
        } else {
            self.gateway.search(&term).await
        };

        match result {
            Ok(users) => {
                info!(term = %term, users = users.len(), "Refreshed collection");
                self.update(|state| state.replace_collection(users));
                TriggerOutcome::Applied
            }
            Err(e) => {
                self.fail("refresh", &e);
                TriggerOutcome::Failed
            }
        }
    }

    /// Stage a search term without sending it
    pub fn set_pending_term(&self, term: impl Into<String>) {
        let term = term.into();
        self.update(|state| state.search.set(term));
    }

    /// Commit the staged term if it passes the length gate.
    ///
    /// Focus re-acquisition is requested on every attempt; it is honoured
    /// once loading has finished.
    pub async fn commit_search(&self) -> TriggerOutcome {
        let term = {
            let mut state = self.lock();
            state.focus_request += 1;

            if state.status.is_busy() {
                self.publish(&mut state);
                return TriggerOutcome::Busy;
            }

            if !state.search.can_commit() {
                debug!(term = %state.search.pending(), "Search term too short, not sent");
                self.publish(&mut state);
                return TriggerOutcome::TermTooShort;
            }

            state.status = SessionStatus::Loading;
            let term = state.search.pending().to_string();
            self.publish(&mut state);
            term
        };

        match self.gateway.search(&term).await {
            Ok(users) => {
                let count = users.len();
                info!(term = %term, results = count, "Search committed");

                self.update(|state| {
                    state.replace_collection(users);
                    state.committed_term = term.clone();
                });

                if !term.is_empty() {
                    self.notify(Notification::success(format!(
                        "Found {} user(s) matching \"{}\"",
                        count, term
                    )));
                }
                TriggerOutcome::Applied
            }
            Err(e) => {
                self.fail("search", &e);
                TriggerOutcome::Failed
            }
        }
    }

    /// Stage `term` and commit it in one step
    pub async fn submit_search(&self, term: impl Into<String>) -> TriggerOutcome {
        self.set_pending_term(term);
        self.commit_search().await
    }

    /// Ask the backend to import its data set, then start over from a full fetch.
    ///
    /// Only actionable while the backend reports no data loaded. The
    /// committed search term is dropped along with its results.
    pub async fn bulk_load(&self) -> TriggerOutcome {
        {
            let mut state = self.lock();
            if state.status.is_busy() {
                return TriggerOutcome::Busy;
            }
            if !matches!(state.data_status, Some(s) if !s.data_loaded) {
                debug!(data_status = ?state.data_status, "Bulk load not actionable");
                return TriggerOutcome::NotActionable;
            }
            state.status = SessionStatus::Loading;
            self.publish(&mut state);
        }

        let loaded = match self.gateway.trigger_bulk_load().await {
            Ok(loaded) => loaded,
            Err(e) => {
                self.fail("bulk_load", &e);
                return TriggerOutcome::Failed;
            }
        };

        info!(
            loaded_count = loaded.loaded_count,
            message = %loaded.message,
            "Bulk load accepted"
        );
        self.notify(Notification::success(format!(
            "Successfully loaded {} users",
            loaded.loaded_count
        )));

        match self.gateway.get_status().await {
            Ok(status) => self.update(|state| state.data_status = Some(status)),
            Err(e) => warn!(error = %e, cause = %e.cause(), "Data status unavailable after bulk load"),
        }

        match self.gateway.fetch_all().await {
            Ok(users) => {
                self.update(|state| {
                    state.replace_collection(users);
                    state.committed_term.clear();
                });
                TriggerOutcome::Applied
            }
            Err(e) => {
                self.fail("bulk_load", &e);
                TriggerOutcome::Failed
            }
        }
    }

    pub fn set_filter(&self, filter: RoleFilter) {
        self.update(|state| state.filter = filter);
    }

    pub fn set_sort(&self, sort: SortSpec) {
        self.update(|state| state.sort = sort);
    }

    /// Back to every role in server order
    pub fn clear_view(&self) {
        self.update(|state| {
            state.filter = RoleFilter::All;
            state.sort = SortSpec::None;
        });
    }

    /// Called by the display layer once the input has focus again.
    ///
    /// `served` is the `focus_request` of the snapshot it acted on; a
    /// request made after that one stays pending.
    pub fn acknowledge_focus(&self, served: u64) {
        self.update(|state| state.focus_served = state.focus_served.max(served));
    }

    /// Single-record lookup. Does not touch the collection or the status.
    pub async fn lookup_by_id(&self, id: u64) -> Result<User, GatewayError> {
        self.gateway
            .fetch_by_id(id)
            .await
            .inspect_err(|e| debug!(id, error = %e, "Lookup by id failed"))
    }

    pub async fn lookup_by_email(&self, email: &str) -> Result<User, GatewayError> {
        self.gateway
            .fetch_by_email(email)
            .await
            .inspect_err(|e| debug!(email, error = %e, "Lookup by email failed"))
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use crate::core::error::TransportError;
    use crate::models::status::BulkLoadResult;
    use reqwest::StatusCode;
    use std::sync::atomic::AtomicBool;
    use tokio::sync::Notify;

    fn unavailable() -> TransportError {
        TransportError::Status(StatusCode::SERVICE_UNAVAILABLE)
    }

    /// Scripted in-memory gateway
    #[derive(Default)]
    pub struct FakeGateway {
        pub users: Mutex<Vec<User>>,
        pub users_after_load: Mutex<Vec<User>>,
        pub status: Mutex<Option<DataStatus>>,
        pub status_after_load: Mutex<Option<DataStatus>>,
        pub fail_fetch: AtomicBool,
        pub fail_search: AtomicBool,
        pub fail_load: AtomicBool,
        pub fail_status: AtomicBool,
        /// Start failing `fetch_all` once a bulk load has gone through
        pub fail_fetch_after_load: AtomicBool,
        pub calls: Mutex<Vec<String>>,
        pub gate: Mutex<Option<Arc<Notify>>>,
    }

    impl FakeGateway {
        pub fn with_users(users: Vec<User>) -> Self {
            let status = DataStatus {
                total_users: users.len() as u64,
                data_loaded: !users.is_empty(),
            };
            Self {
                users: Mutex::new(users),
                status: Mutex::new(Some(status)),
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn hold(&self) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
            gate
        }

        async fn enter(&self, call: String) {
            self.calls.lock().unwrap().push(call);
            let gate = self.gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.notified().await;
            }
        }
    }

    impl UserGateway for FakeGateway {
        async fn fetch_all(&self) -> Result<Vec<User>, GatewayError> {
            self.enter("fetch_all".to_string()).await;
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(GatewayError::fetch_all(unavailable()));
            }
            Ok(self.users.lock().unwrap().clone())
        }

        async fn fetch_by_id(&self, id: u64) -> Result<User, GatewayError> {
            self.enter(format!("fetch_by_id:{}", id)).await;
            self.users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id == id)
                .cloned()
                .ok_or_else(|| GatewayError::fetch_one(TransportError::Status(StatusCode::NOT_FOUND)))
        }

        async fn fetch_by_email(&self, email: &str) -> Result<User, GatewayError> {
            self.enter(format!("fetch_by_email:{}", email)).await;
            self.users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned()
                .ok_or_else(|| GatewayError::fetch_one(TransportError::Status(StatusCode::NOT_FOUND)))
        }

        async fn search(&self, term: &str) -> Result<Vec<User>, GatewayError> {
            self.enter(format!("search:{}", term)).await;
            if self.fail_search.load(Ordering::SeqCst) {
                return Err(GatewayError::Search(unavailable()));
            }
            let needle = term.to_lowercase();
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .filter(|u| u.full_name().to_lowercase().contains(&needle))
                .cloned()
                .collect())
        }

        async fn trigger_bulk_load(&self) -> Result<BulkLoadResult, GatewayError> {
            self.enter("trigger_bulk_load".to_string()).await;
            if self.fail_load.load(Ordering::SeqCst) {
                return Err(GatewayError::Load(unavailable()));
            }

            let loaded = std::mem::take(&mut *self.users_after_load.lock().unwrap());
            let count = loaded.len() as i64;
            *self.users.lock().unwrap() = loaded;
            if let Some(status) = self.status_after_load.lock().unwrap().take() {
                *self.status.lock().unwrap() = Some(status);
            }
            if self.fail_fetch_after_load.load(Ordering::SeqCst) {
                self.fail_fetch.store(true, Ordering::SeqCst);
            }

            Ok(BulkLoadResult {
                loaded_count: count,
                message: "Users data loaded successfully".to_string(),
            })
        }

        async fn get_status(&self) -> Result<DataStatus, GatewayError> {
            self.enter("get_status".to_string()).await;
            if self.fail_status.load(Ordering::SeqCst) {
                return Err(GatewayError::Status(unavailable()));
            }
            let status = *self.status.lock().unwrap();
            status.ok_or_else(|| GatewayError::Status(unavailable()))
        }
    }
}

#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use envelope_budget::{
    config::{Config, ConfigManager},
    engine::{
        BalanceState, BalanceStore, MutationRequest, RemoteBalanceMutator, RemoteError,
        ServerBalances, UnitOptions,
    },
    domain::{BudgetMonth, CategoryBalance},
    BudgetSession,
};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use tempfile::TempDir;
use tokio::sync::Notify;
use uuid::Uuid;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn period() -> BudgetMonth {
    BudgetMonth::new(2024, 3).expect("valid month")
}

/// A budget with a few named categories and a helper to seed their balances.
pub struct Fixture {
    pub budget_id: Uuid,
    pub groceries: Uuid,
    pub rent: Uuid,
    pub vacation: Uuid,
    pub session: BudgetSession,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_options(UnitOptions::default())
    }

    pub fn with_options(options: UnitOptions) -> Self {
        let budget_id = Uuid::new_v4();
        Self {
            budget_id,
            groceries: Uuid::new_v4(),
            rent: Uuid::new_v4(),
            vacation: Uuid::new_v4(),
            session: BudgetSession::new(budget_id, period(), options),
        }
    }

    /// Builds the session from a config file written to a fresh temp directory.
    pub fn from_config_file(config: &Config) -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let manager =
            ConfigManager::with_base_dir(temp.path().to_path_buf()).expect("config manager");
        TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
        manager.save(config).expect("save config");
        let loaded = manager.load().expect("load config");

        let budget_id = Uuid::new_v4();
        Self {
            budget_id,
            groceries: Uuid::new_v4(),
            rent: Uuid::new_v4(),
            vacation: Uuid::new_v4(),
            session: BudgetSession::from_config(budget_id, period(), &loaded),
        }
    }

    pub fn store(&self) -> &BalanceStore {
        self.session.store()
    }

    /// Current-period row with no carry-over: activity is whatever makes up `available`.
    pub fn balance(
        &self,
        category_id: Uuid,
        assigned: Decimal,
        available: Decimal,
    ) -> CategoryBalance {
        CategoryBalance::new(
            self.budget_id,
            category_id,
            period(),
            assigned,
            available - assigned,
            available,
        )
    }

    pub fn seed(&self, ready_to_assign: Decimal, balances: Vec<CategoryBalance>) {
        self.session
            .load(ServerBalances::new(balances, Some(ready_to_assign)));
    }
}

/// What a [`RecordingRemote`] does once called.
pub enum Outcome {
    /// Confirms the rows the mutation touched, as they stand locally.
    Echo,
    /// Confirms the given server response.
    Respond(ServerBalances),
    Fail(RemoteError),
}

/// Remote fake that counts calls and records the state it observed on entry.
pub struct RecordingRemote {
    outcome: Outcome,
    calls: AtomicUsize,
    seen: Mutex<Vec<BalanceState>>,
    requests: Mutex<Vec<MutationRequest>>,
}

impl RecordingRemote {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn echo() -> Self {
        Self::new(Outcome::Echo)
    }

    pub fn failing() -> Self {
        Self::new(Outcome::Fail(RemoteError::Rejected {
            status: 422,
            message: "budget is locked".into(),
        }))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// State as the server call saw it, i.e. with the optimistic edit applied.
    pub fn observed(&self) -> BalanceState {
        self.seen
            .lock()
            .expect("lock observed")
            .last()
            .cloned()
            .expect("remote was called")
    }

    pub fn requests(&self) -> Vec<MutationRequest> {
        self.requests.lock().expect("lock requests").clone()
    }
}

#[async_trait]
impl RemoteBalanceMutator for RecordingRemote {
    async fn commit(
        &self,
        request: &MutationRequest,
        store: &BalanceStore,
    ) -> Result<(), RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().expect("lock observed").push(store.state());
        self.requests
            .lock()
            .expect("lock requests")
            .push(request.clone());
        match &self.outcome {
            Outcome::Echo => {
                store.confirm(echo_response(request, store));
                Ok(())
            }
            Outcome::Respond(response) => {
                store.confirm(response.clone());
                Ok(())
            }
            Outcome::Fail(err) => Err(err.clone()),
        }
    }
}

/// Remote fake that blocks inside `commit` until released.
pub struct GatedRemote {
    pub label: &'static str,
    pub entered: Notify,
    pub release: Notify,
    log: &'static Mutex<Vec<&'static str>>,
    failure: Option<RemoteError>,
}

impl GatedRemote {
    pub fn new(label: &'static str, log: &'static Mutex<Vec<&'static str>>) -> Self {
        Self {
            label,
            entered: Notify::new(),
            release: Notify::new(),
            log,
            failure: None,
        }
    }

    /// Like [`GatedRemote::new`], but answers with a network error once released.
    pub fn failing(label: &'static str, log: &'static Mutex<Vec<&'static str>>) -> Self {
        Self {
            failure: Some(RemoteError::Network("timed out".into())),
            ..Self::new(label, log)
        }
    }
}

#[async_trait]
impl RemoteBalanceMutator for GatedRemote {
    async fn commit(
        &self,
        request: &MutationRequest,
        store: &BalanceStore,
    ) -> Result<(), RemoteError> {
        self.log.lock().expect("lock log").push(self.label);
        self.entered.notify_one();
        self.release.notified().await;
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        store.confirm(echo_response(request, store));
        Ok(())
    }
}

/// Remote fake whose answer never arrives.
pub struct HangingRemote {
    pub calls: AtomicUsize,
}

impl HangingRemote {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RemoteBalanceMutator for HangingRemote {
    async fn commit(&self, _: &MutationRequest, _: &BalanceStore) -> Result<(), RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

/// Remote fake that logs its label and confirms immediately.
pub struct LoggingRemote {
    pub label: &'static str,
    log: &'static Mutex<Vec<&'static str>>,
}

impl LoggingRemote {
    pub fn new(label: &'static str, log: &'static Mutex<Vec<&'static str>>) -> Self {
        Self { label, log }
    }
}

#[async_trait]
impl RemoteBalanceMutator for LoggingRemote {
    async fn commit(
        &self,
        request: &MutationRequest,
        store: &BalanceStore,
    ) -> Result<(), RemoteError> {
        self.log.lock().expect("lock log").push(self.label);
        store.confirm(echo_response(request, store));
        Ok(())
    }
}

/// Leaks a fresh log so fakes can hold a `'static` reference to it.
pub fn new_log() -> &'static Mutex<Vec<&'static str>> {
    Box::leak(Box::new(Mutex::new(Vec::new())))
}

fn echo_response(request: &MutationRequest, store: &BalanceStore) -> ServerBalances {
    let rows = request
        .mutation
        .categories()
        .into_iter()
        .filter_map(|id| store.get_balance(id))
        .collect();
    ServerBalances::new(rows, Some(store.ready_to_assign()))
}

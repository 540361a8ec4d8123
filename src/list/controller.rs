//! One list view, driven by a background task.
//!
//! [`ListController::builder`] spawns an actor that owns the [`ListStore`].
//! The handle talks to it over a command channel and observes it through a
//! `watch` channel of [`ListSnapshot`]s. Inside the actor, a single
//! `select!` loop multiplexes:
//!
//! - commands from the handle (query edits, keystrokes, refreshes)
//! - the search debouncer's deadline
//! - completion of the one in-flight fetch
//! - refetch/reload events from the injected event receiver
//! - expiry of the current notice
//! - the controller's lifetime token
//!
//! State only changes between awaits of that loop, so no two handlers ever
//! interleave. Cancelling the lifetime token (explicit teardown or dropping
//! the handle) aborts the in-flight request, drops the pending search and
//! leaves a final, unmounted snapshot.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::api::{ApiError, ListPage, ListSource, Resource};
use crate::config::Config;
use crate::error::{BidwavesError, Result};
use crate::events::ListEvent;
use crate::notice::Notice;
use crate::session::Session;

use super::bridge::{TableChange, apply_table_change};
use super::builder::build_path;
use super::debounce::{DEFAULT_QUIET_WINDOW, Debouncer};
use super::guard::{Admission, Completion, FetchGuard};
use super::query::{FilterValue, ListQuery};
use super::store::{ListSnapshot, ListStore};

type FetchOutcome<T> = (ListQuery, Option<std::result::Result<ListPage<T>, ApiError>>);
type InFlight<T> = BoxFuture<'static, FetchOutcome<T>>;
type Reply<R> = oneshot::Sender<Result<R>>;

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Quiet window applied to [`ListController::type_search`].
    pub quiet_window: Duration,
    /// Surface failed requests as a [`Notice`] in the snapshot.
    pub notify_errors: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            quiet_window: DEFAULT_QUIET_WINDOW,
            notify_errors: true,
        }
    }
}

impl ControllerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            quiet_window: config.debounce(),
            notify_errors: config.notify_errors(),
        }
    }
}

enum Command<T> {
    Keystroke(String),
    FlushSearch(Reply<bool>),
    SetSearchText(String, Reply<bool>),
    SetSearchField(String, Reply<bool>),
    SetFilter(String, FilterValue, Reply<bool>),
    RemoveFilter(String, Reply<bool>),
    ClearFilters(Reply<bool>),
    Table(TableChange, Reply<bool>),
    Refresh(Reply<()>),
    RowPatched(T, Reply<()>),
    RowRemoved(String, Reply<()>),
    MutationFailed(ApiError),
    DismissNotice,
}

pub struct ListControllerBuilder<T: Resource, S: ListSource<T>> {
    source: Arc<S>,
    session: Arc<dyn Session>,
    events: Option<broadcast::Receiver<ListEvent>>,
    endpoint: String,
    query: ListQuery,
    options: ControllerOptions,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: Resource, S: ListSource<T>> ListControllerBuilder<T, S> {
    /// Receive refetch/reload events from this channel.
    pub fn events(mut self, events: broadcast::Receiver<ListEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Override the base path. May carry fixed parameters (`/order?campaign=7`).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn query(mut self, query: ListQuery) -> Self {
        self.query = query;
        self
    }

    pub fn options(mut self, options: ControllerOptions) -> Self {
        self.options = options;
        self
    }

    /// Mount the controller. Must be called from within a tokio runtime.
    pub fn spawn(self) -> ListController<T, S> {
        let lifetime = CancellationToken::new();
        let store = ListStore::new(self.query);
        let debouncer = Debouncer::new(self.options.quiet_window, store.query().search_text());
        let (state_tx, state_rx) = watch::channel(store.snapshot());
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let actor = Actor {
            endpoint: self.endpoint.clone(),
            source: Arc::clone(&self.source),
            session: Arc::clone(&self.session),
            notify_errors: self.options.notify_errors,
            store,
            debouncer,
            guard: FetchGuard::new(lifetime.clone()),
            in_flight: None,
            state: state_tx,
        };
        let task = tokio::spawn(actor.run(command_rx, self.events));

        ListController {
            endpoint: self.endpoint,
            commands: command_tx,
            state: state_rx,
            lifetime,
            task: Some(task),
            source: self.source,
        }
    }
}

/// Handle to a mounted list. Dropping it tears the list down.
pub struct ListController<T: Resource, S: ListSource<T>> {
    endpoint: String,
    commands: mpsc::UnboundedSender<Command<T>>,
    state: watch::Receiver<ListSnapshot<T>>,
    lifetime: CancellationToken,
    task: Option<JoinHandle<()>>,
    source: Arc<S>,
}

impl<T: Resource, S: ListSource<T>> ListController<T, S> {
    pub fn builder(source: Arc<S>, session: Arc<dyn Session>) -> ListControllerBuilder<T, S> {
        ListControllerBuilder {
            source,
            session,
            events: None,
            endpoint: T::ENDPOINT.to_string(),
            query: ListQuery::for_resource::<T>(),
            options: ControllerOptions::default(),
            _marker: std::marker::PhantomData,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn snapshot(&self) -> ListSnapshot<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<T>> {
        self.state.clone()
    }

    /// Wait until no fetch is outstanding (or the list is torn down).
    pub async fn settled(&self) -> Result<ListSnapshot<T>> {
        let mut state = self.state.clone();
        let snapshot = state
            .wait_for(|s| s.is_settled() || !s.fetch.mounted)
            .await
            .map_err(|_| BidwavesError::ControllerClosed)?;
        Ok(snapshot.clone())
    }

    /// Feed one keystroke's worth of search text through the debouncer.
    pub fn type_search(&self, text: impl Into<String>) -> Result<()> {
        self.send(Command::Keystroke(text.into()))
    }

    /// Commit pending keystrokes now instead of at the end of the quiet
    /// window. Returns whether the search text changed.
    pub async fn flush_search(&self) -> Result<bool> {
        self.request(Command::FlushSearch).await
    }

    /// Apply search text immediately, bypassing the debouncer.
    pub async fn set_search_text(&self, text: impl Into<String>) -> Result<bool> {
        let text = text.into();
        self.request(|reply| Command::SetSearchText(text, reply))
            .await
    }

    pub async fn set_search_field(&self, field: &str) -> Result<bool> {
        let field = field.to_string();
        self.request(|reply| Command::SetSearchField(field, reply))
            .await
    }

    pub async fn set_filter(&self, key: &str, value: FilterValue) -> Result<bool> {
        let key = key.to_string();
        self.request(|reply| Command::SetFilter(key, value, reply))
            .await
    }

    pub async fn remove_filter(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        self.request(|reply| Command::RemoveFilter(key, reply))
            .await
    }

    pub async fn clear_filters(&self) -> Result<bool> {
        self.request(Command::ClearFilters).await
    }

    /// Apply a table widget's pagination/sort change.
    pub async fn apply_table_change(&self, change: TableChange) -> Result<bool> {
        self.request(|reply| Command::Table(change, reply)).await
    }

    /// Refetch the current query.
    pub async fn refresh(&self) -> Result<()> {
        self.request(Command::Refresh).await
    }

    pub fn dismiss_notice(&self) -> Result<()> {
        self.send(Command::DismissNotice)
    }

    /// Delete a record, drop its row and refetch the page.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.ensure_mounted()?;
        match self.source.delete(id).await {
            Ok(()) => {
                tracing::info!(endpoint = %self.endpoint, id, "record deleted");
                let id = id.to_string();
                self.request(|reply| Command::RowRemoved(id, reply)).await
            }
            Err(err) => Err(self.mutation_failed(err)),
        }
    }

    /// Update a record and patch its row with the server's copy.
    pub async fn update(&self, id: &str, changes: &serde_json::Value) -> Result<T> {
        self.ensure_mounted()?;
        let record = match self.source.update(id, changes).await {
            Ok(record) => record,
            Err(err) => return Err(self.mutation_failed(err)),
        };
        let patched = record.clone();
        self.request(|reply| Command::RowPatched(patched, reply))
            .await?;
        Ok(record)
    }

    /// Unmount and wait for the actor to finish. Returns the final snapshot.
    pub async fn teardown(mut self) -> ListSnapshot<T> {
        self.lifetime.cancel();
        if let Some(task) = self.task.take()
            && let Err(err) = task.await
        {
            tracing::warn!(endpoint = %self.endpoint, error = %err, "list controller task failed");
        }
        self.state.borrow().clone()
    }

    fn ensure_mounted(&self) -> Result<()> {
        if self.lifetime.is_cancelled() {
            return Err(BidwavesError::ControllerClosed);
        }
        Ok(())
    }

    fn mutation_failed(&self, err: ApiError) -> BidwavesError {
        tracing::warn!(endpoint = %self.endpoint, error = %err, "mutation failed");
        // The actor may already be gone; the caller still gets the error.
        let _ = self.commands.send(Command::MutationFailed(err.clone()));
        BidwavesError::Api(err)
    }

    fn send(&self, command: Command<T>) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| BidwavesError::ControllerClosed)
    }

    async fn request<R>(&self, command: impl FnOnce(Reply<R>) -> Command<T>) -> Result<R> {
        let (reply, response) = oneshot::channel();
        self.send(command(reply))?;
        response
            .await
            .map_err(|_| BidwavesError::ControllerClosed)?
    }
}

impl<T: Resource, S: ListSource<T>> Drop for ListController<T, S> {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}

struct Actor<T: Resource, S: ListSource<T>> {
    endpoint: String,
    source: Arc<S>,
    session: Arc<dyn Session>,
    notify_errors: bool,
    store: ListStore<T>,
    debouncer: Debouncer,
    guard: FetchGuard,
    in_flight: Option<InFlight<T>>,
    state: watch::Sender<ListSnapshot<T>>,
}

impl<T: Resource, S: ListSource<T>> Actor<T, S> {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command<T>>,
        mut events: Option<broadcast::Receiver<ListEvent>>,
    ) {
        let lifetime = self.guard.lifetime().clone();

        // Mounting loads the first page.
        self.trigger();
        self.publish();

        loop {
            let deadline = self.debouncer.deadline();
            let notice_expiry = self.store.notice().map(Notice::expires_at);
            tokio::select! {
                biased;
                _ = lifetime.cancelled() => break,
                (requested, outcome) = next_completion(&mut self.in_flight) => {
                    self.on_fetch_done(requested, outcome);
                }
                command = commands.recv() => match command {
                    Some(command) => self.on_command(command),
                    None => break,
                },
                _ = sleep_until(deadline) => self.on_quiet_window(),
                event = next_event(&mut events) => self.on_event(event),
                _ = sleep_until(notice_expiry) => self.on_notice_expired(),
            }
            self.publish();
        }

        self.shutdown();
    }

    fn on_command(&mut self, command: Command<T>) {
        match command {
            Command::Keystroke(text) => self.debouncer.push(text, Instant::now()),
            Command::FlushSearch(reply) => {
                let changed = match self.debouncer.deadline() {
                    Some(deadline) => self.commit_search(deadline),
                    None => false,
                };
                self.publish();
                let _ = reply.send(Ok(changed));
            }
            Command::SetSearchText(text, reply) => {
                self.debouncer.reset_committed(text.clone());
                self.edit_and_reply(reply, |q| Ok(q.set_search_text(text)));
            }
            Command::SetSearchField(field, reply) => {
                self.edit_and_reply(reply, |q| q.set_search_field(&field));
            }
            Command::SetFilter(key, value, reply) => {
                self.edit_and_reply(reply, |q| q.set_filter(&key, value));
            }
            Command::RemoveFilter(key, reply) => {
                self.edit_and_reply(reply, |q| Ok(q.remove_filter(&key)));
            }
            Command::ClearFilters(reply) => {
                self.edit_and_reply(reply, |q| Ok(q.clear_filters()));
            }
            Command::Table(change, reply) => {
                self.edit_and_reply(reply, |q| apply_table_change(q, &change));
            }
            Command::Refresh(reply) => {
                self.trigger();
                self.publish();
                let _ = reply.send(Ok(()));
            }
            Command::RowPatched(record, reply) => {
                self.store.patch_row(record);
                self.publish();
                let _ = reply.send(Ok(()));
            }
            Command::RowRemoved(id, reply) => {
                self.store.remove_row(&id);
                // Refill the page and pick up the server's total.
                self.trigger();
                self.publish();
                let _ = reply.send(Ok(()));
            }
            Command::MutationFailed(err) => self.report(&err),
            Command::DismissNotice => {
                self.store.dismiss_notice();
            }
        }
    }

    /// Edit the query, fetch if the request path changed, then reply.
    fn edit_and_reply(
        &mut self,
        reply: Reply<bool>,
        edit: impl FnOnce(&mut ListQuery) -> Result<bool>,
    ) {
        let before = self.request_path();
        let result = edit(self.store.query_mut());
        if matches!(result, Ok(true)) && self.request_path() != before {
            self.trigger();
        }
        self.publish();
        let _ = reply.send(result);
    }

    fn on_quiet_window(&mut self) {
        self.commit_search(Instant::now());
    }

    /// Apply the debounced text as of `now`. Returns whether the query changed.
    fn commit_search(&mut self, now: Instant) -> bool {
        let Some(text) = self.debouncer.commit(now) else {
            return false;
        };
        tracing::debug!(endpoint = %self.endpoint, search = %text, "search committed");
        let before = self.request_path();
        if !self.store.query_mut().set_search_text(text) {
            return false;
        }
        if self.request_path() != before {
            self.trigger();
        }
        true
    }

    fn on_notice_expired(&mut self) {
        if self
            .store
            .notice()
            .is_some_and(|notice| notice.is_expired(Instant::now()))
        {
            self.store.dismiss_notice();
        }
    }

    fn on_event(&mut self, event: ListEvent) {
        if !event.applies_to(self.collection()) {
            return;
        }
        tracing::debug!(endpoint = %self.endpoint, event = event.name(), "refetch requested");
        self.trigger();
    }

    fn on_fetch_done(
        &mut self,
        requested: ListQuery,
        outcome: Option<std::result::Result<ListPage<T>, ApiError>>,
    ) {
        let rerun = match self.guard.complete() {
            Completion::Apply { rerun } => rerun,
            Completion::Discard => {
                tracing::debug!(endpoint = %self.endpoint, "discarding response after teardown");
                return;
            }
        };

        match outcome {
            Some(Ok(page)) => {
                tracing::debug!(
                    endpoint = %self.endpoint,
                    items = page.list.len(),
                    total = page.total,
                    "list loaded"
                );
                self.store.apply_success(&requested, page);
            }
            Some(Err(err)) => {
                tracing::warn!(endpoint = %self.endpoint, error = %err, "list fetch failed");
                self.report(&err);
                self.store.apply_error(err);
            }
            None => return,
        }

        if rerun {
            self.trigger();
        }
    }

    fn report(&mut self, err: &ApiError) {
        if err.is_unauthorized() {
            self.session.expire();
        }
        if self.notify_errors {
            self.store.notify(Notice::from_api_error(err));
        }
    }

    fn trigger(&mut self) {
        match self.guard.admit() {
            Admission::Start => self.start_fetch(),
            Admission::Coalesced => {
                tracing::trace!(endpoint = %self.endpoint, "fetch in flight, re-run queued");
            }
            Admission::Closed => {}
        }
    }

    fn start_fetch(&mut self) {
        let Some(requested) = self.store.begin_fetch() else {
            self.guard.complete();
            return;
        };
        let path = build_path(&self.endpoint, &requested);
        tracing::debug!(%path, "fetching list");

        let source = Arc::clone(&self.source);
        let fetch = self
            .guard
            .abortable(async move { source.fetch(&path).await });
        self.in_flight = Some(async move { (requested, fetch.await) }.boxed());
    }

    fn request_path(&self) -> String {
        build_path(&self.endpoint, self.store.query())
    }

    /// Endpoint without any fixed parameters, for event matching.
    fn collection(&self) -> &str {
        self.endpoint
            .split_once('?')
            .map_or(self.endpoint.as_str(), |(path, _)| path)
    }

    fn publish(&self) {
        let revision = self.store.revision();
        self.state.send_if_modified(|current| {
            if current.revision == revision {
                return false;
            }
            *current = self.store.snapshot();
            true
        });
    }

    fn shutdown(mut self) {
        self.debouncer.cancel();
        // Dropping the future aborts the request.
        self.in_flight = None;
        self.store.teardown();
        self.publish();
        tracing::debug!(endpoint = %self.endpoint, "list controller torn down");
    }
}

async fn next_completion<T>(slot: &mut Option<InFlight<T>>) -> FetchOutcome<T> {
    let Some(fetch) = slot.as_mut() else {
        return std::future::pending().await;
    };
    let outcome = fetch.await;
    *slot = None;
    outcome
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn next_event(events: &mut Option<broadcast::Receiver<ListEvent>>) -> ListEvent {
    loop {
        let Some(receiver) = events.as_mut() else {
            return std::future::pending().await;
        };
        match receiver.recv().await {
            Ok(event) => return event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "list events lagged, refetching");
                return ListEvent::Reload;
            }
            Err(broadcast::error::RecvError::Closed) => *events = None,
        }
    }
}

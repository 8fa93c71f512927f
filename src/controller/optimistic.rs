//! Optimistic comment and reply submission.
//!
//! [`OptimisticThread::submit`] inserts a pending entry before the create
//! call goes out, then either swaps in the server entity in place or removes
//! the entry again. Entries are addressed by [`EntryKey`]: a pending entry is
//! `Provisional(TempId)` and a server entity is `Confirmed(id)`, so the two
//! id spaces can never be confused during reconciliation.
//!
//! Every settlement re-locates its entry by key in the current state. Two
//! submits may therefore resolve in either order without losing each
//! other's entries.
use crate::model::{CreateResponse, ListItem, Threaded};
use crate::store::{Notice, Store};
use crate::validation::{CommentRules, ValidationError};
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// Message shown when the server rejects a submission without saying why.
const DEFAULT_REJECTION: &str = "Yorum gönderilemedi";

/// Client-generated id of a pending entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TempId(u64);

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tmp-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKey {
    Provisional(TempId),
    Confirmed(String),
}

impl EntryKey {
    pub fn confirmed(id: impl Into<String>) -> Self {
        EntryKey::Confirmed(id.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Pending,
    Confirmed,
}

/// One comment in a thread, with its replies.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadEntry<T> {
    pub key: EntryKey,
    pub status: EntryStatus,
    pub item: T,
    pub replies: Vec<ThreadEntry<T>>,
}

impl<T: Threaded> ThreadEntry<T> {
    /// A server-delivered item; nested replies become child entries.
    pub fn confirmed(mut item: T) -> Self {
        let replies = item
            .take_replies()
            .into_iter()
            .map(ThreadEntry::confirmed)
            .collect();
        Self {
            key: EntryKey::Confirmed(item.id().to_owned()),
            status: EntryStatus::Confirmed,
            item,
            replies,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == EntryStatus::Pending
    }
}

/// Errors that can phrase themselves for the person who caused them, e.g.
/// with the server's own explanation instead of a status code.
pub trait UserMessage: fmt::Display {
    fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Remote create endpoint consumed by an [`OptimisticThread`].
pub trait CreateSink: Send + Sync + 'static {
    type Item: Threaded;
    type Error: std::error::Error + UserMessage + Send + Sync + 'static;

    /// Build the speculative item shown while the create call is in flight.
    fn provisional(&self, text: &str, parent_id: Option<&str>) -> Self::Item;

    /// Create the item remotely. Called once per submission; never retried.
    fn create(
        &self,
        text: &str,
        parent_id: Option<&str>,
    ) -> impl Future<Output = Result<CreateResponse<Self::Item>, Self::Error>> + Send;
}

/// Why a submission did not end up in the thread.
///
/// `Rejected` and `Remote` carry the submitted text so the form can put it
/// back for editing.
#[derive(Debug, Error)]
pub enum SubmitError<E> {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    Rejected { message: String, text: String },

    #[error("Yorum gönderilemedi: {source}")]
    Remote {
        #[source]
        source: E,
        text: String,
    },
}

impl<E> SubmitError<E> {
    /// Text to restore into the input field, if the submission got as far as
    /// the network.
    pub fn text(&self) -> Option<&str> {
        match self {
            SubmitError::Validation(_) => None,
            SubmitError::Rejected { text, .. } | SubmitError::Remote { text, .. } => Some(text),
        }
    }
}

impl<E: UserMessage> SubmitError<E> {
    /// Toast text: the server's message when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Validation(e) => e.to_string(),
            SubmitError::Rejected { message, .. } => message.clone(),
            SubmitError::Remote { source, .. } => {
                format!("{}: {}", DEFAULT_REJECTION, source.user_message())
            }
        }
    }
}

/// Final state of a settled submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The pending entry now holds the server entity with this id.
    Confirmed(String),
    /// The server accepted the item but returned no body; the pending entry
    /// stays as it is.
    Unconfirmed(TempId),
    /// The thread was closed or reloaded before the response arrived.
    Discarded,
}

/// Ticket for an inserted pending entry, consumed by
/// [`OptimisticThread::settle`].
#[derive(Debug)]
#[must_use = "a pending entry stays in the thread until settled"]
pub struct PendingSubmit {
    temp_id: TempId,
    text: String,
    parent_id: Option<String>,
}

impl PendingSubmit {
    pub fn temp_id(&self) -> TempId {
        self.temp_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }
}

struct ThreadState<T> {
    entries: Vec<ThreadEntry<T>>,
    next_temp: u64,
    closed: bool,
}

/// A comment thread with optimistic submissions. Clones share the thread.
pub struct OptimisticThread<S: CreateSink> {
    sink: Arc<S>,
    state: Arc<Mutex<ThreadState<S::Item>>>,
    rules: CommentRules,
    store: Option<Store>,
}

impl<S: CreateSink> Clone for OptimisticThread<S> {
    fn clone(&self) -> Self {
        Self {
            sink: self.sink.clone(),
            state: self.state.clone(),
            rules: self.rules,
            store: self.store.clone(),
        }
    }
}

impl<S: CreateSink> OptimisticThread<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink: Arc::new(sink),
            state: Arc::new(Mutex::new(ThreadState {
                entries: Vec::new(),
                next_temp: 0,
                closed: false,
            })),
            rules: CommentRules::default(),
            store: None,
        }
    }

    pub fn with_rules(mut self, rules: CommentRules) -> Self {
        self.rules = rules;
        self
    }

    /// Publish submission failures as notices and track in-flight creates.
    pub fn with_store(mut self, store: Store) -> Self {
        self.store = Some(store);
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Replace the thread with server items. Pending entries are dropped;
    /// their settlements become [`SubmitOutcome::Discarded`].
    pub fn replace_all(&self, items: Vec<S::Item>) {
        let entries = items.into_iter().map(ThreadEntry::confirmed).collect();
        self.state.lock().entries = entries;
    }

    /// Append server items below the existing ones, skipping ids already
    /// present at the top level.
    pub fn extend(&self, items: Vec<S::Item>) {
        let mut state = self.state.lock();
        for item in items {
            let key = EntryKey::Confirmed(item.id().to_owned());
            if !state.entries.iter().any(|e| e.key == key) {
                state.entries.push(ThreadEntry::confirmed(item));
            }
        }
    }

    /// Validate `text` and insert a pending entry at the top of the thread, or
    /// at the top of `parent_id`'s replies.
    ///
    /// Nothing is inserted when validation fails.
    pub fn begin(
        &self,
        text: &str,
        parent_id: Option<&str>,
    ) -> Result<PendingSubmit, ValidationError> {
        let text = self.rules.check(text)?;
        let item = self.sink.provisional(text, parent_id);

        let mut state = self.state.lock();
        let temp_id = TempId(state.next_temp);
        let entry = ThreadEntry {
            key: EntryKey::Provisional(temp_id),
            status: EntryStatus::Pending,
            item,
            replies: Vec::new(),
        };

        match parent_id {
            None => state.entries.insert(0, entry),
            Some(parent) => {
                let key = EntryKey::confirmed(parent);
                let Some(parent_entry) = find_mut(&mut state.entries, &key) else {
                    return Err(ValidationError::UnknownParent {
                        field: CommentRules::FIELD,
                        parent_id: parent.to_owned(),
                    });
                };
                parent_entry.replies.insert(0, entry);
            }
        }
        state.next_temp += 1;

        tracing::debug!(temp_id = %temp_id, parent_id = ?parent_id, "Inserted pending entry");
        Ok(PendingSubmit {
            temp_id,
            text: text.to_owned(),
            parent_id: parent_id.map(str::to_owned),
        })
    }

    /// Reconcile a pending entry with the outcome of its create call.
    ///
    /// # Errors
    ///
    /// `Rejected` or `Remote` when the create call failed; the pending entry
    /// has been removed and the error carries the text for restoration.
    pub fn settle(
        &self,
        pending: PendingSubmit,
        result: Result<CreateResponse<S::Item>, S::Error>,
    ) -> Result<SubmitOutcome, SubmitError<S::Error>> {
        let key = EntryKey::Provisional(pending.temp_id);
        let mut state = self.state.lock();

        let error = match result {
            Ok(response) if response.success => {
                if state.closed {
                    return Ok(SubmitOutcome::Discarded);
                }
                let Some(mut item) = response.data else {
                    tracing::debug!(temp_id = %pending.temp_id, "Create succeeded without a body, keeping pending entry");
                    return Ok(SubmitOutcome::Unconfirmed(pending.temp_id));
                };
                if find_mut(&mut state.entries, &key).is_none() {
                    tracing::debug!(temp_id = %pending.temp_id, "Pending entry gone before confirmation");
                    return Ok(SubmitOutcome::Discarded);
                }

                let id = item.id().to_owned();
                let confirmed = EntryKey::Confirmed(id.clone());
                if find_mut(&mut state.entries, &confirmed).is_some() {
                    // A later page already brought the entity in
                    remove_entry(&mut state.entries, &key);
                    tracing::debug!(temp_id = %pending.temp_id, id = %id, "Entity already listed, dropped pending entry");
                    return Ok(SubmitOutcome::Confirmed(id));
                }
                let Some(entry) = find_mut(&mut state.entries, &key) else {
                    return Ok(SubmitOutcome::Discarded);
                };
                entry
                    .replies
                    .extend(item.take_replies().into_iter().map(ThreadEntry::confirmed));
                entry.key = confirmed;
                entry.status = EntryStatus::Confirmed;
                entry.item = item;

                tracing::debug!(temp_id = %pending.temp_id, id = %id, "Pending entry confirmed");
                return Ok(SubmitOutcome::Confirmed(id));
            }
            Ok(response) => SubmitError::Rejected {
                message: response
                    .message
                    .unwrap_or_else(|| DEFAULT_REJECTION.to_string()),
                text: pending.text,
            },
            Err(source) => SubmitError::Remote {
                source,
                text: pending.text,
            },
        };

        if state.closed {
            return Err(error);
        }
        remove_entry(&mut state.entries, &key);
        drop(state);

        tracing::warn!(temp_id = %pending.temp_id, error = %error, "Submission failed, rolled back pending entry");
        if let Some(store) = &self.store {
            store.notify(Notice::error(error.user_message()));
        }
        Err(error)
    }

    /// Validate, insert a pending entry, call the create endpoint once, and
    /// reconcile.
    pub async fn submit(
        &self,
        text: &str,
        parent_id: Option<&str>,
    ) -> Result<SubmitOutcome, SubmitError<S::Error>> {
        let pending = self.begin(text, parent_id)?;
        let rollback = Rollback {
            thread: self,
            temp_id: pending.temp_id,
            armed: true,
        };
        let _loading = self.store.as_ref().map(Store::track_loading);
        let result = self.sink.create(&pending.text, pending.parent_id()).await;
        rollback.disarm();
        self.settle(pending, result)
    }

    /// Detach the thread from its owner. Later settlements no longer touch
    /// the entries or publish notices.
    pub fn close(&self) {
        self.state.lock().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Snapshot of the top-level entries and their replies.
    pub fn entries(&self) -> Vec<ThreadEntry<S::Item>> {
        self.state.lock().entries.clone()
    }

    pub fn with_entries<R>(&self, f: impl FnOnce(&[ThreadEntry<S::Item>]) -> R) -> R {
        f(&self.state.lock().entries)
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Position of a top-level entry.
    pub fn position(&self, key: &EntryKey) -> Option<usize> {
        self.state.lock().entries.iter().position(|e| e.key == *key)
    }

    /// Find an entry anywhere in the thread.
    pub fn get(&self, key: &EntryKey) -> Option<ThreadEntry<S::Item>> {
        let mut state = self.state.lock();
        find_mut(&mut state.entries, key).map(|e| e.clone())
    }
}

/// Removes a pending entry whose `submit` future was dropped before the
/// create call returned.
struct Rollback<'a, S: CreateSink> {
    thread: &'a OptimisticThread<S>,
    temp_id: TempId,
    armed: bool,
}

impl<S: CreateSink> Rollback<'_, S> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<S: CreateSink> Drop for Rollback<'_, S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.thread.state.lock();
        if state.closed {
            return;
        }
        let key = EntryKey::Provisional(self.temp_id);
        if remove_entry(&mut state.entries, &key).is_some() {
            tracing::debug!(temp_id = %self.temp_id, "Submission cancelled, removed pending entry");
        }
    }
}

fn find_mut<'a, T>(
    entries: &'a mut [ThreadEntry<T>],
    key: &EntryKey,
) -> Option<&'a mut ThreadEntry<T>> {
    for entry in entries.iter_mut() {
        if entry.key == *key {
            return Some(entry);
        }
        if let Some(found) = find_mut(&mut entry.replies, key) {
            return Some(found);
        }
    }
    None
}

fn remove_entry<T>(entries: &mut Vec<ThreadEntry<T>>, key: &EntryKey) -> Option<ThreadEntry<T>> {
    if let Some(pos) = entries.iter().position(|e| e.key == *key) {
        return Some(entries.remove(pos));
    }
    entries
        .iter_mut()
        .find_map(|e| remove_entry(&mut e.replies, key))
}

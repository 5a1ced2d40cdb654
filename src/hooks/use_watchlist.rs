// ============================================================================
// WATCHLIST HOOK - local ticker list backed by the user's document
// ============================================================================
// Remote first, local second: the local list changes only after the
// document store acknowledged the write. A failed write leaves both as-is.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{AbortHandle, Abortable};
use serde_json::Value;

use crate::models::SessionUser;
use crate::services::documents::{Document, DocumentPath, DocumentStore};
use crate::state::{ReactiveState, SubscriptionId};
use crate::utils::constants::WATCHLIST_FIELD;
use crate::utils::format::normalize_ticker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchlistOutcome {
    Applied,
    /// No user, or the user changed while the write was in flight.
    SignedOut,
    InvalidTicker,
    RemoteFailed,
}

#[derive(Clone)]
pub struct WatchlistHook {
    documents: Rc<dyn DocumentStore>,
    current_uid: Rc<RefCell<Option<String>>>,
    items: ReactiveState<Vec<String>>,
    /// Document entries stored in a non-normalized form (`"msft"`), kept so
    /// a remove can target them too.
    raw_entries: Rc<RefCell<Vec<String>>>,
    loading: ReactiveState<bool>,
    in_flight: Rc<RefCell<Option<AbortHandle>>>,
}

impl WatchlistHook {
    pub fn new(documents: Rc<dyn DocumentStore>) -> Self {
        Self {
            documents,
            current_uid: Rc::new(RefCell::new(None)),
            items: ReactiveState::new(Vec::new()),
            raw_entries: Rc::new(RefCell::new(Vec::new())),
            loading: ReactiveState::new(false),
            in_flight: Rc::new(RefCell::new(None)),
        }
    }

    pub fn items(&self) -> Vec<String> {
        self.items.get()
    }

    pub fn loading(&self) -> bool {
        self.loading.get()
    }

    pub fn contains(&self, ticker: &str) -> bool {
        match normalize_ticker(ticker) {
            Some(ticker) => self.items.with(|items| items.contains(&ticker)),
            None => false,
        }
    }

    pub fn current_uid(&self) -> Option<String> {
        self.current_uid.borrow().clone()
    }

    /// True when `user` is not the user the list was last synced for.
    pub fn needs_sync(&self, user: Option<&SessionUser>) -> bool {
        self.current_uid.borrow().as_deref() != user.map(|u| u.id.as_str())
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Vec<String>) + 'static,
    {
        self.items.subscribe(callback)
    }

    /// Follows a user change: clears on sign-out, reloads from the user's
    /// document otherwise. A newer sync supersedes this one. The previous
    /// user's list never survives a switch, even if the fetch fails.
    pub async fn sync_user(&self, user: Option<SessionUser>) {
        self.abort_in_flight();
        let uid = user.as_ref().map(|u| u.id.clone());
        let switched = *self.current_uid.borrow() != uid;
        *self.current_uid.borrow_mut() = uid;

        if switched {
            self.raw_entries.borrow_mut().clear();
            self.items.set(Vec::new());
        }

        let Some(user) = user else {
            self.loading.set(false);
            return;
        };

        let (handle, registration) = AbortHandle::new_pair();
        *self.in_flight.borrow_mut() = Some(handle);
        self.loading.set(true);

        let path = DocumentPath::user(&user.id);
        let fetched = match Abortable::new(self.documents.get(&path), registration).await {
            Ok(fetched) => fetched,
            Err(_) => {
                log::debug!("🛑 Watchlist sync for {} superseded", user.id);
                return;
            }
        };

        if self.current_uid().as_deref() != Some(user.id.as_str()) {
            return;
        }
        self.in_flight.borrow_mut().take();

        match fetched {
            Ok(Some(doc)) => {
                let tickers = watchlist_from_document(&doc);
                log::info!("⭐ Loaded {} watchlist tickers", tickers.len());
                *self.raw_entries.borrow_mut() = raw_watchlist_entries(&doc);
                self.items.set(tickers);
            }
            Ok(None) => {
                self.raw_entries.borrow_mut().clear();
                self.items.set(Vec::new());
            }
            Err(e) => log::error!("❌ Error fetching watchlist: {}", e),
        }
        self.loading.set(false);
    }

    pub async fn add(&self, ticker: &str) -> WatchlistOutcome {
        self.mutate(ticker, Mutation::Add).await
    }

    /// Removing a ticker that is not listed still sends the (idempotent)
    /// remote remove. Differently-cased copies in the document go with it.
    pub async fn remove(&self, ticker: &str) -> WatchlistOutcome {
        self.mutate(ticker, Mutation::Remove).await
    }

    /// Aborts any in-flight sync.
    pub fn teardown(&self) {
        self.abort_in_flight();
        self.loading.set(false);
    }

    fn abort_in_flight(&self) {
        if let Some(handle) = self.in_flight.borrow_mut().take() {
            handle.abort();
        }
    }

    async fn mutate(&self, ticker: &str, mutation: Mutation) -> WatchlistOutcome {
        let Some(uid) = self.current_uid() else {
            log::debug!("⚠️ Watchlist change ignored: no user");
            return WatchlistOutcome::SignedOut;
        };
        let Some(ticker) = normalize_ticker(ticker) else {
            return WatchlistOutcome::InvalidTicker;
        };

        let path = DocumentPath::user(&uid);
        let mut values = vec![Value::String(ticker.clone())];
        let variants = match mutation {
            Mutation::Add => Vec::new(),
            Mutation::Remove => self.raw_variants_of(&ticker),
        };
        values.extend(variants.iter().cloned().map(Value::String));
        let remote = match mutation {
            Mutation::Add => self.documents.array_union(&path, WATCHLIST_FIELD, values).await,
            Mutation::Remove => self.documents.array_remove(&path, WATCHLIST_FIELD, values).await,
        };

        if let Err(e) = remote {
            log::error!("❌ Error updating watchlist ({}): {}", ticker, e);
            return WatchlistOutcome::RemoteFailed;
        }

        if self.current_uid().as_deref() != Some(uid.as_str()) {
            return WatchlistOutcome::SignedOut;
        }

        match mutation {
            Mutation::Add => {
                if !self.items.with(|items| items.contains(&ticker)) {
                    self.items.update(|items| items.push(ticker));
                }
            }
            Mutation::Remove => {
                self.raw_entries
                    .borrow_mut()
                    .retain(|raw| !variants.contains(raw));
                if self.items.with(|items| items.contains(&ticker)) {
                    self.items.update(|items| items.retain(|t| *t != ticker));
                }
            }
        }
        WatchlistOutcome::Applied
    }

    fn raw_variants_of(&self, ticker: &str) -> Vec<String> {
        self.raw_entries
            .borrow()
            .iter()
            .filter(|raw| normalize_ticker(raw).as_deref() == Some(ticker))
            .cloned()
            .collect()
    }
}

#[derive(Clone, Copy)]
enum Mutation {
    Add,
    Remove,
}

/// `watchlist` field as a duplicate-free list; non-string entries are skipped.
pub fn watchlist_from_document(doc: &Document) -> Vec<String> {
    let mut tickers: Vec<String> = Vec::new();
    let entries = doc
        .get(WATCHLIST_FIELD)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for ticker in entries.iter().filter_map(Value::as_str).filter_map(normalize_ticker) {
        if !tickers.contains(&ticker) {
            tickers.push(ticker);
        }
    }
    tickers
}

/// String entries of the `watchlist` field whose stored form differs from
/// the normalized ticker.
fn raw_watchlist_entries(doc: &Document) -> Vec<String> {
    doc.get(WATCHLIST_FIELD)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_str)
        .filter(|raw| normalize_ticker(raw).map_or(false, |ticker| ticker != *raw))
        .map(str::to_string)
        .collect()
}

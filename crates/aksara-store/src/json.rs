//! The JSON-file store implementation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;

use aksara_core::{
    Feature, HistoryEntry, HistoryId, LegacyMessage, OrderId, TopupTransaction, TransactionStatus,
    User, UserId,
};

use crate::error::{Result, StoreError};
use crate::{DeductOutcome, GatewayOutcome, Store};

const USERS_FILE: &str = "users.json";
const TRANSACTIONS_FILE: &str = "transactions.json";
const HISTORY_FILE: &str = "history.json";
const LEGACY_FILE: &str = "memory.json";

/// Write-through JSON-file store.
///
/// Collections are loaded once at [`JsonStore::open`] and every mutation
/// rewrites the affected collection's file while still holding the write
/// lock. See the crate docs for the consistency and durability policy.
pub struct JsonStore {
    data_dir: PathBuf,
    state: RwLock<Collections>,
}

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    transactions: Vec<TopupTransaction>,
    history: Vec<HistoryEntry>,
}

impl JsonStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed
    /// and loading any existing collection files.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or an existing
    /// file cannot be parsed. A missing file is an empty collection.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;

        let users = load_collection(&data_dir.join(USERS_FILE))?;
        let transactions = load_collection(&data_dir.join(TRANSACTIONS_FILE))?;
        let history = load_collection(&data_dir.join(HISTORY_FILE))?;

        tracing::info!(
            data_dir = %data_dir.display(),
            users = users.len(),
            transactions = transactions.len(),
            history = history.len(),
            "Store opened"
        );

        Ok(Self {
            data_dir,
            state: RwLock::new(Collections {
                users,
                transactions,
                history,
            }),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, Collections> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Collections> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rewrite one collection file. Failures are logged, never surfaced:
    /// the in-memory state stays authoritative.
    fn persist<T: Serialize>(&self, file: &str, records: &[T]) {
        let path = self.data_dir.join(file);
        let payload = match serde_json::to_string_pretty(records) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "Failed to encode collection");
                return;
            }
        };
        if let Err(err) = fs::write(&path, payload) {
            tracing::error!(
                path = %path.display(),
                error = %err,
                "Failed to persist collection; in-memory state retained"
            );
        }
    }
}

fn load_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&raw)?)
}

fn user_not_found(user_id: &UserId) -> StoreError {
    StoreError::NotFound {
        entity: "user",
        id: user_id.to_string(),
    }
}

impl Store for JsonStore {
    fn create_user(&self, user: &User) -> Result<()> {
        let mut state = self.write();

        let email = user.email.to_lowercase();
        let username = user.username.to_lowercase();
        if state.users.iter().any(|u| u.email.to_lowercase() == email) {
            return Err(StoreError::Duplicate { field: "email" });
        }
        if state
            .users
            .iter()
            .any(|u| u.username.to_lowercase() == username)
        {
            return Err(StoreError::Duplicate { field: "username" });
        }

        state.users.push(user.clone());
        self.persist(USERS_FILE, &state.users);
        Ok(())
    }

    fn put_user(&self, user: &User) -> Result<()> {
        let mut state = self.write();
        if let Some(existing) = state.users.iter_mut().find(|u| u.id == user.id) {
            *existing = user.clone();
        } else {
            state.users.push(user.clone());
        }
        self.persist(USERS_FILE, &state.users);
        Ok(())
    }

    fn get_user(&self, user_id: &UserId) -> Result<Option<User>> {
        Ok(self.read().users.iter().find(|u| &u.id == user_id).cloned())
    }

    fn find_user_by_credential(&self, credential: &str) -> Result<Option<User>> {
        let credential = credential.to_lowercase();
        Ok(self
            .read()
            .users
            .iter()
            .find(|u| {
                u.email.to_lowercase() == credential || u.username.to_lowercase() == credential
            })
            .cloned())
    }

    fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.read().users.clone())
    }

    fn delete_user(&self, user_id: &UserId) -> Result<()> {
        let mut state = self.write();
        let before = state.users.len();
        state.users.retain(|u| &u.id != user_id);
        if state.users.len() == before {
            return Err(user_not_found(user_id));
        }
        self.persist(USERS_FILE, &state.users);
        Ok(())
    }

    fn deduct_tokens(&self, user_id: &UserId, amount: i64) -> Result<DeductOutcome> {
        let mut state = self.write();
        let user = state
            .users
            .iter_mut()
            .find(|u| &u.id == user_id)
            .ok_or_else(|| user_not_found(user_id))?;

        if !user.has_sufficient_tokens(amount) {
            return Ok(DeductOutcome {
                ok: false,
                tokens: user.tokens,
            });
        }

        user.tokens -= amount;
        let tokens = user.tokens;
        self.persist(USERS_FILE, &state.users);
        Ok(DeductOutcome { ok: true, tokens })
    }

    fn add_tokens(&self, user_id: &UserId, amount: i64) -> Result<i64> {
        let mut state = self.write();
        let user = state
            .users
            .iter_mut()
            .find(|u| &u.id == user_id)
            .ok_or_else(|| user_not_found(user_id))?;

        user.tokens += amount;
        let tokens = user.tokens;
        self.persist(USERS_FILE, &state.users);
        Ok(tokens)
    }

    fn adjust_tokens(&self, user_id: &UserId, delta: i64) -> Result<i64> {
        let mut state = self.write();
        let user = state
            .users
            .iter_mut()
            .find(|u| &u.id == user_id)
            .ok_or_else(|| user_not_found(user_id))?;

        user.tokens = (user.tokens + delta).max(0);
        let tokens = user.tokens;
        self.persist(USERS_FILE, &state.users);
        Ok(tokens)
    }

    fn put_transaction(&self, transaction: &TopupTransaction) -> Result<()> {
        let mut state = self.write();
        state.transactions.push(transaction.clone());
        self.persist(TRANSACTIONS_FILE, &state.transactions);
        Ok(())
    }

    fn get_transaction(&self, order_id: &OrderId) -> Result<Option<TopupTransaction>> {
        Ok(self
            .read()
            .transactions
            .iter()
            .find(|t| &t.order_id == order_id)
            .cloned())
    }

    fn list_transactions_by_user(&self, user_id: &UserId) -> Result<Vec<TopupTransaction>> {
        let mut transactions: Vec<_> = self
            .read()
            .transactions
            .iter()
            .filter(|t| &t.user_id == user_id)
            .cloned()
            .collect();
        transactions.sort_by_key(|t| std::cmp::Reverse(t.created_at));
        Ok(transactions)
    }

    fn apply_gateway_status(
        &self,
        order_id: &OrderId,
        next: TransactionStatus,
    ) -> Result<GatewayOutcome> {
        let mut state = self.write();
        let idx = state
            .transactions
            .iter()
            .position(|t| &t.order_id == order_id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "transaction",
                id: order_id.to_string(),
            })?;

        let applied = state.transactions[idx].transition(next);
        let transaction = state.transactions[idx].clone();
        if applied {
            self.persist(TRANSACTIONS_FILE, &state.transactions);
        }

        let mut credited_balance = None;
        if applied && next == TransactionStatus::Success {
            if let Some(user) = state.users.iter_mut().find(|u| u.id == transaction.user_id) {
                user.tokens += transaction.tokens;
                credited_balance = Some(user.tokens);
            } else {
                tracing::warn!(
                    order_id = %order_id,
                    user_id = %transaction.user_id,
                    "Settled top-up for a missing user; credit dropped"
                );
            }
            if credited_balance.is_some() {
                self.persist(USERS_FILE, &state.users);
            }
        }

        Ok(GatewayOutcome {
            transaction,
            applied,
            credited_balance,
        })
    }

    fn append_history(&self, entry: &HistoryEntry) -> Result<()> {
        let mut state = self.write();
        state.history.push(entry.clone());
        self.persist(HISTORY_FILE, &state.history);
        Ok(())
    }

    fn list_history(&self, user_id: &UserId, feature: Feature) -> Result<Vec<HistoryEntry>> {
        let mut entries: Vec<_> = self
            .read()
            .history
            .iter()
            .filter(|h| &h.user_id == user_id && h.feature == feature)
            .cloned()
            .collect();
        entries.sort_by_key(|h| std::cmp::Reverse(h.timestamp));
        Ok(entries)
    }

    fn get_history_entry(
        &self,
        user_id: &UserId,
        feature: Feature,
        id: &HistoryId,
    ) -> Result<Option<HistoryEntry>> {
        Ok(self
            .read()
            .history
            .iter()
            .find(|h| &h.id == id && &h.user_id == user_id && h.feature == feature)
            .cloned())
    }

    fn load_legacy_sessions(&self) -> Result<BTreeMap<String, Vec<LegacyMessage>>> {
        let path = self.data_dir.join(LEGACY_FILE);
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        // Values that are not message arrays count as empty sessions.
        let sessions: BTreeMap<String, serde_json::Value> = serde_json::from_str(&raw)?;
        Ok(sessions
            .into_iter()
            .map(|(id, value)| {
                let messages = serde_json::from_value(value).unwrap_or_default();
                (id, messages)
            })
            .collect())
    }
}

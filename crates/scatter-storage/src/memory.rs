//! In-process backend with call counters and injectable faults.
//!
//! Clones share state, so a test can keep one handle for assertions while
//! the code under test drives another.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::StorageError;
use crate::service::{
    AccountKey, AccountParams, BoxFuture, Container, ContainerParams, DataCredential, DataPlane,
    ManagementPlane, validate_object_key,
};

/// Number of create/write calls that reached the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub account_creates: usize,
    pub container_creates: usize,
    pub directory_creates: usize,
    pub object_writes: usize,
}

#[derive(Debug, Default)]
struct Faults {
    unreachable: bool,
    key_listing_fails: bool,
    create_race: bool,
    rejected_keys: BTreeSet<String>,
}

#[derive(Debug)]
struct AccountEntry {
    params: AccountParams,
    keys: Vec<AccountKey>,
}

#[derive(Debug, Default)]
struct State {
    groups: BTreeSet<String>,
    accounts: BTreeMap<(String, String), AccountEntry>,
    containers: BTreeSet<(String, String)>,
    directories: BTreeSet<(String, String, String)>,
    objects: BTreeMap<(String, String, String), Vec<u8>>,
    calls: CallCounts,
    faults: Faults,
}

impl State {
    fn reachable(&self) -> Result<(), StorageError> {
        if self.faults.unreachable {
            return Err(StorageError::Unavailable("memory backend marked unreachable".into()));
        }
        Ok(())
    }

    fn hierarchical(&self, account: &str) -> bool {
        self.accounts
            .iter()
            .find(|((_, a), _)| a == account)
            .is_some_and(|(_, entry)| entry.params.hierarchical_namespace)
    }
}

#[derive(Clone, Default)]
pub struct MemoryCloud {
    state: Arc<Mutex<State>>,
}

impl MemoryCloud {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_resource_group(&self, group: &str) -> &Self {
        self.state().groups.insert(group.to_string());
        self
    }

    /// Seed an account without counting a create call.
    pub fn add_account(&self, group: &str, account: &str, params: AccountParams) -> &Self {
        self.state().accounts.insert(
            (group.to_string(), account.to_string()),
            AccountEntry {
                params,
                keys: keys_for(account),
            },
        );
        self
    }

    /// Seed a container without counting a create call.
    pub fn add_container(&self, account: &str, container: &str) -> &Self {
        self.state()
            .containers
            .insert((account.to_string(), container.to_string()));
        self
    }

    /// Every call fails with [`StorageError::Unavailable`].
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state().faults.unreachable = unreachable;
    }

    pub fn fail_key_listing(&self, fail: bool) {
        self.state().faults.key_listing_fails = fail;
    }

    /// Create calls find that another actor created the resource first: the
    /// resource appears and the call returns `AlreadyExists`.
    pub fn simulate_create_race(&self, race: bool) {
        self.state().faults.create_race = race;
    }

    /// Object writes whose key ends with `suffix` are rejected.
    pub fn reject_writes_ending_with(&self, suffix: &str) {
        self.state().faults.rejected_keys.insert(suffix.to_string());
    }

    pub fn calls(&self) -> CallCounts {
        self.state().calls
    }

    pub fn object(&self, account: &str, container: &str, key: &str) -> Option<Vec<u8>> {
        self.state()
            .objects
            .get(&(account.to_string(), container.to_string(), key.to_string()))
            .cloned()
    }

    pub fn object_keys(&self, account: &str, container: &str) -> Vec<String> {
        self.state()
            .objects
            .keys()
            .filter(|(a, c, _)| a == account && c == container)
            .map(|(_, _, k)| k.clone())
            .collect()
    }

    pub fn has_directory(&self, account: &str, container: &str, path: &str) -> bool {
        self.state()
            .directories
            .contains(&(account.to_string(), container.to_string(), path.to_string()))
    }

    pub fn account_params(&self, group: &str, account: &str) -> Option<AccountParams> {
        self.state()
            .accounts
            .get(&(group.to_string(), account.to_string()))
            .map(|entry| entry.params.clone())
    }

    pub fn has_container(&self, account: &str, container: &str) -> bool {
        self.state()
            .containers
            .contains(&(account.to_string(), container.to_string()))
    }
}

fn keys_for(account: &str) -> Vec<AccountKey> {
    ["key1", "key2"]
        .into_iter()
        .map(|name| AccountKey {
            name: name.to_string(),
            value: format!("{account}-{name}-secret"),
        })
        .collect()
}

impl ManagementPlane for MemoryCloud {
    fn resource_group_exists<'a>(&'a self, group: &'a str) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move {
            let state = self.state();
            state.reachable()?;
            Ok(state.groups.contains(group))
        })
    }

    fn account_exists<'a>(
        &'a self,
        group: &'a str,
        account: &'a str,
    ) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move {
            let state = self.state();
            state.reachable()?;
            Ok(state
                .accounts
                .contains_key(&(group.to_string(), account.to_string())))
        })
    }

    fn create_account<'a>(
        &'a self,
        group: &'a str,
        account: &'a str,
        params: &'a AccountParams,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let mut state = self.state();
            state.reachable()?;
            state.calls.account_creates += 1;
            if !state.groups.contains(group) {
                return Err(StorageError::NotFound(format!("resource group {group}")));
            }
            let id = (group.to_string(), account.to_string());
            if state.accounts.contains_key(&id) {
                return Err(StorageError::AlreadyExists(format!("storage account {account}")));
            }
            state.accounts.insert(
                id,
                AccountEntry {
                    params: params.clone(),
                    keys: keys_for(account),
                },
            );
            if state.faults.create_race {
                return Err(StorageError::AlreadyExists(format!("storage account {account}")));
            }
            Ok(())
        })
    }

    fn list_account_keys<'a>(
        &'a self,
        group: &'a str,
        account: &'a str,
    ) -> BoxFuture<'a, Result<Vec<AccountKey>, StorageError>> {
        Box::pin(async move {
            let state = self.state();
            state.reachable()?;
            if state.faults.key_listing_fails {
                return Err(StorageError::Unauthorized(
                    "caller may not list account keys".into(),
                ));
            }
            state
                .accounts
                .get(&(group.to_string(), account.to_string()))
                .map(|entry| entry.keys.clone())
                .ok_or_else(|| StorageError::NotFound(format!("storage account {account}")))
        })
    }

    fn data_plane(
        &self,
        _group: &str,
        account: &str,
        credential: DataCredential,
    ) -> Result<Arc<dyn DataPlane>, StorageError> {
        Ok(Arc::new(MemoryDataPlane {
            cloud: self.clone(),
            account: account.to_string(),
            credential,
        }))
    }
}

pub struct MemoryDataPlane {
    cloud: MemoryCloud,
    account: String,
    credential: DataCredential,
}

impl MemoryDataPlane {
    fn authorize(&self, state: &State) -> Result<(), StorageError> {
        state.reachable()?;
        let DataCredential::AccountKey(key) = &self.credential else {
            return Ok(());
        };
        let valid = state
            .accounts
            .iter()
            .filter(|((_, a), _)| *a == self.account)
            .any(|(_, entry)| entry.keys.iter().any(|k| k.value == key.value));
        if valid {
            Ok(())
        } else {
            Err(StorageError::Unauthorized(format!(
                "key {} is not valid for account {}",
                key.name, self.account
            )))
        }
    }
}

impl DataPlane for MemoryDataPlane {
    fn container_exists<'a>(&'a self, container: &'a str) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move {
            let state = self.cloud.state();
            self.authorize(&state)?;
            Ok(state
                .containers
                .contains(&(self.account.clone(), container.to_string())))
        })
    }

    fn create_container<'a>(
        &'a self,
        container: &'a str,
        _params: &'a ContainerParams,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let mut state = self.cloud.state();
            self.authorize(&state)?;
            state.calls.container_creates += 1;
            let inserted = state
                .containers
                .insert((self.account.clone(), container.to_string()));
            if !inserted || state.faults.create_race {
                return Err(StorageError::AlreadyExists(format!("container {container}")));
            }
            Ok(())
        })
    }

    fn open_container(&self, container: &str) -> Result<Arc<dyn Container>, StorageError> {
        let hierarchical = self.cloud.state().hierarchical(&self.account);
        Ok(Arc::new(MemoryContainer {
            cloud: self.cloud.clone(),
            account: self.account.clone(),
            name: container.to_string(),
            hierarchical,
        }))
    }
}

pub struct MemoryContainer {
    cloud: MemoryCloud,
    account: String,
    name: String,
    hierarchical: bool,
}

impl MemoryContainer {
    fn id(&self, key: &str) -> (String, String, String) {
        (self.account.clone(), self.name.clone(), key.to_string())
    }
}

impl Container for MemoryContainer {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_hierarchical(&self) -> bool {
        self.hierarchical
    }

    fn directory_exists<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<bool, StorageError>> {
        Box::pin(async move {
            validate_object_key(path)?;
            let state = self.cloud.state();
            state.reachable()?;
            Ok(state.directories.contains(&self.id(path)))
        })
    }

    fn create_directory<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            validate_object_key(path)?;
            let mut state = self.cloud.state();
            state.reachable()?;
            state.calls.directory_creates += 1;
            if !state.directories.insert(self.id(path)) {
                return Err(StorageError::AlreadyExists(format!("directory {path}")));
            }
            Ok(())
        })
    }

    fn write_object<'a>(
        &'a self,
        key: &'a str,
        body: Vec<u8>,
        overwrite: bool,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            validate_object_key(key)?;
            let mut state = self.cloud.state();
            state.reachable()?;
            state.calls.object_writes += 1;
            if state.faults.rejected_keys.iter().any(|s| key.ends_with(s.as_str())) {
                return Err(StorageError::WriteRejected {
                    key: key.to_string(),
                    reason: "rejected by test fault".into(),
                });
            }
            let id = self.id(key);
            if !overwrite && state.objects.contains_key(&id) {
                return Err(StorageError::AlreadyExists(format!("object {key}")));
            }
            state.objects.insert(id, body);
            Ok(())
        })
    }
}

//! In-memory release store for exercising the uploader without a network.

#![allow(dead_code)]

use bytes::Bytes;
use kodegen_release_uploader::{ArtifactBody, ReleaseArtifactStore, RemoteAsset, StoreError};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::time::Instant;

/// A call made against the store, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Delete(String),
    Upload(String),
}

#[derive(Default)]
struct State {
    assets: Vec<RemoteAsset>,
    contents: HashMap<u64, Bytes>,
    next_id: u64,
    calls: Vec<Call>,
    upload_times: HashMap<String, Vec<Instant>>,
    upload_bodies: HashMap<String, Vec<Bytes>>,
    upload_failures: HashMap<String, VecDeque<StoreError>>,
    leave_partial: bool,
    list_failure: Option<StoreError>,
}

/// Release store backed by a vector of assets
#[derive(Default)]
pub struct InMemoryReleaseStore {
    state: Mutex<State>,
}

impl InMemoryReleaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the release with assets named `names`
    pub fn with_assets(names: &[&str]) -> Self {
        let store = Self::new();
        for name in names {
            store.add_asset(name, Bytes::from_static(b"old"));
        }
        store
    }

    fn add_asset(&self, name: &str, content: Bytes) -> u64 {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.assets.push(RemoteAsset {
            id,
            name: name.to_string(),
        });
        state.contents.insert(id, content);
        id
    }

    /// Fail the next uploads of `name` with the given HTTP statuses, in order
    pub fn fail_uploads(&self, name: &str, statuses: &[u16]) {
        let errors = statuses
            .iter()
            .map(|status| StoreError::http(*status, format!("simulated {status}")));
        self.queue_failures(name, errors);
    }

    /// Fail the next uploads of `name` with arbitrary errors
    pub fn queue_failures(&self, name: &str, errors: impl IntoIterator<Item = StoreError>) {
        let mut state = self.state.lock().unwrap();
        state
            .upload_failures
            .entry(name.to_string())
            .or_default()
            .extend(errors);
    }

    /// Failed uploads leave a broken asset behind, like an interrupted upload does
    pub fn leave_partial_assets(&self) {
        self.state.lock().unwrap().leave_partial = true;
    }

    /// Make every listing fail
    pub fn fail_lists(&self, status: u16) {
        self.state.lock().unwrap().list_failure = Some(StoreError::http(status, "list failed"));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Asset names currently on the release, sorted
    pub fn asset_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .state
            .lock()
            .unwrap()
            .assets
            .iter()
            .map(|a| a.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Content of the asset called `name`
    pub fn content(&self, name: &str) -> Option<Bytes> {
        let state = self.state.lock().unwrap();
        let asset = state.assets.iter().find(|a| a.name == name)?;
        state.contents.get(&asset.id).cloned()
    }

    pub fn upload_attempts(&self, name: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| **c == Call::Upload(name.to_string()))
            .count()
    }

    pub fn upload_times(&self, name: &str) -> Vec<Instant> {
        self.state
            .lock()
            .unwrap()
            .upload_times
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn upload_bodies(&self, name: &str) -> Vec<Bytes> {
        self.state
            .lock()
            .unwrap()
            .upload_bodies
            .get(name)
            .cloned()
            .unwrap_or_default()
    }
}

impl ReleaseArtifactStore for InMemoryReleaseStore {
    async fn list_artifacts_for_release(&self, _release_id: u64) -> Result<Vec<RemoteAsset>, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::List);
        if let Some(error) = &state.list_failure {
            return Err(error.clone());
        }
        Ok(state.assets.clone())
    }

    async fn delete_artifact(&self, asset_id: u64) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let position = state.assets.iter().position(|a| a.id == asset_id);
        match position {
            Some(idx) => {
                let asset = state.assets.remove(idx);
                state.contents.remove(&asset.id);
                state.calls.push(Call::Delete(asset.name));
            }
            None => state.calls.push(Call::Delete(format!("#{asset_id}"))),
        }
        Ok(())
    }

    async fn upload_artifact(
        &self,
        _upload_url: &str,
        content_length: u64,
        _content_type: &str,
        body: ArtifactBody,
        name: &str,
        _release_id: u64,
    ) -> Result<(), StoreError> {
        let content = body
            .into_bytes()
            .await
            .map_err(|e| StoreError::Source(e.to_string()))?;
        assert_eq!(content.len() as u64, content_length, "content length mismatch for {name}");

        let failure = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Upload(name.to_string()));
            state
                .upload_times
                .entry(name.to_string())
                .or_default()
                .push(Instant::now());
            state
                .upload_bodies
                .entry(name.to_string())
                .or_default()
                .push(content.clone());

            let failure = state
                .upload_failures
                .get_mut(name)
                .and_then(VecDeque::pop_front);
            if failure.is_none() && state.assets.iter().any(|a| a.name == name) {
                return Err(StoreError::http(422, "Validation Failed: already_exists"));
            }
            (failure, state.leave_partial)
        };

        match failure {
            (Some(error), leave_partial) => {
                if leave_partial {
                    self.add_asset(name, Bytes::new());
                }
                Err(error)
            }
            (None, _) => {
                self.add_asset(name, content);
                Ok(())
            }
        }
    }
}

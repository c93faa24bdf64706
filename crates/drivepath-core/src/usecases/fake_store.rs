//! In-memory remote store for use case tests
//!
//! Holds a flat id → object map with parent links, records every call in
//! order, and can be told to fail listings, updates or media streams.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, bail};
use futures_util::stream;

use crate::domain::{RecordKind, RemoteId, ROOT_ID};
use crate::ports::{ChildPage, CreateRequest, IRemoteStore, MediaStream, RemoteRecord, UpdatePatch};

/// A call received by the fake, keyed by the id it targeted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Get(String),
    Create(String),
    Update(String),
    Media(String),
}

struct Object {
    meta: RemoteRecord,
    content: Vec<u8>,
}

#[derive(Default)]
struct State {
    objects: HashMap<String, Object>,
    calls: Vec<Call>,
    next_id: u64,
    fail_listings: bool,
    fail_updates: bool,
    fail_media_after: Option<usize>,
}

pub struct FakeStore {
    state: Mutex<State>,
}

impl FakeStore {
    /// Size of each chunk yielded by `get_media`.
    pub const MEDIA_CHUNK: usize = 16;

    pub fn new() -> Self {
        let mut state = State::default();
        state.objects.insert(
            ROOT_ID.to_string(),
            Object {
                meta: RemoteRecord {
                    id: ROOT_ID.to_string(),
                    name: "My Drive".to_string(),
                    parents: Vec::new(),
                    is_directory: true,
                    trashed: false,
                    modified: None,
                },
                content: Vec::new(),
            },
        );
        Self {
            state: Mutex::new(state),
        }
    }

    fn insert(&self, parent: &str, id: &str, name: &str, is_directory: bool, content: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.objects.insert(
            id.to_string(),
            Object {
                meta: RemoteRecord {
                    id: id.to_string(),
                    name: name.to_string(),
                    parents: vec![parent.to_string()],
                    is_directory,
                    trashed: false,
                    modified: Some("2024-01-01T00:00:00Z".parse().unwrap()),
                },
                content: content.to_vec(),
            },
        );
    }

    pub fn add_dir(&self, parent: &str, id: &str, name: &str) {
        self.insert(parent, id, name, true, &[]);
    }

    pub fn add_file(&self, parent: &str, id: &str, name: &str, content: &[u8]) {
        self.insert(parent, id, name, false, content);
    }

    pub fn add_parent(&self, id: &str, parent: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .objects
            .get_mut(id)
            .unwrap()
            .meta
            .parents
            .push(parent.to_string());
    }

    pub fn trash(&self, id: &str) {
        let mut state = self.state.lock().unwrap();
        state.objects.get_mut(id).unwrap().meta.trashed = true;
    }

    pub fn is_trashed(&self, id: &str) -> bool {
        self.state.lock().unwrap().objects[id].meta.trashed
    }

    pub fn parents(&self, id: &str) -> Vec<String> {
        self.state.lock().unwrap().objects[id].meta.parents.clone()
    }

    pub fn content(&self, id: &str) -> Option<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .objects
            .get(id)
            .map(|o| o.content.clone())
    }

    pub fn exists_named(&self, parent: &str, name: &str) -> bool {
        self.state.lock().unwrap().objects.values().any(|o| {
            o.meta.name == name && o.meta.parents.iter().any(|p| p == parent) && !o.meta.trashed
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| predicate(c))
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn fail_listings(&self, fail: bool) {
        self.state.lock().unwrap().fail_listings = fail;
    }

    pub fn fail_updates(&self, fail: bool) {
        self.state.lock().unwrap().fail_updates = fail;
    }

    /// Media streams yield `chunks` chunks, then an error.
    pub fn fail_media_after(&self, chunks: usize) {
        self.state.lock().unwrap().fail_media_after = Some(chunks);
    }
}

#[async_trait::async_trait]
impl IRemoteStore for FakeStore {
    async fn list_children(
        &self,
        parent_id: &RemoteId,
        page_size: u32,
        page_token: Option<&str>,
    ) -> anyhow::Result<ChildPage> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::List(parent_id.to_string()));
        if state.fail_listings {
            bail!("HTTP 503 Service Unavailable");
        }

        let mut children: Vec<RemoteRecord> = state
            .objects
            .values()
            .filter(|o| o.meta.parents.iter().any(|p| p == parent_id.as_str()))
            .map(|o| o.meta.clone())
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let offset: usize = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
        let end = (offset + page_size as usize).min(children.len());
        let next_page_token = (end < children.len()).then(|| end.to_string());

        Ok(ChildPage {
            items: children[offset..end].to_vec(),
            next_page_token,
        })
    }

    async fn get(&self, id: &RemoteId) -> anyhow::Result<RemoteRecord> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Get(id.to_string()));
        state
            .objects
            .get(id.as_str())
            .map(|o| o.meta.clone())
            .ok_or_else(|| anyhow!("404 Not Found: {id}"))
    }

    async fn create(
        &self,
        request: &CreateRequest,
        content: Option<Vec<u8>>,
    ) -> anyhow::Result<RemoteRecord> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("new{}", state.next_id);
        state.calls.push(Call::Create(id.clone()));

        let meta = RemoteRecord {
            id: id.clone(),
            name: request.name.clone(),
            parents: request.parent_ids.iter().map(|p| p.to_string()).collect(),
            is_directory: request.kind == RecordKind::Directory,
            trashed: false,
            modified: Some(chrono::Utc::now()),
        };
        state.objects.insert(
            id,
            Object {
                meta: meta.clone(),
                content: content.unwrap_or_default(),
            },
        );
        Ok(meta)
    }

    async fn update(&self, id: &RemoteId, patch: &UpdatePatch) -> anyhow::Result<RemoteRecord> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Update(id.to_string()));
        if state.fail_updates {
            bail!("HTTP 403 Forbidden");
        }

        let object = state
            .objects
            .get_mut(id.as_str())
            .ok_or_else(|| anyhow!("404 Not Found: {id}"))?;
        let parents = &mut object.meta.parents;
        parents.retain(|p| !patch.remove_parents.iter().any(|r| r.as_str() == p));
        for added in &patch.add_parents {
            if !parents.iter().any(|p| p == added.as_str()) {
                parents.push(added.to_string());
            }
        }
        if let Some(trashed) = patch.trashed {
            object.meta.trashed = trashed;
        }
        Ok(object.meta.clone())
    }

    async fn get_media(&self, id: &RemoteId) -> anyhow::Result<MediaStream> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Media(id.to_string()));

        let content = state
            .objects
            .get(id.as_str())
            .map(|o| o.content.clone())
            .ok_or_else(|| anyhow!("404 Not Found: {id}"))?;

        let mut chunks: Vec<anyhow::Result<Vec<u8>>> = content
            .chunks(Self::MEDIA_CHUNK)
            .map(|c| Ok(c.to_vec()))
            .collect();
        if let Some(limit) = state.fail_media_after {
            chunks.truncate(limit);
            chunks.push(Err(anyhow!("connection reset by peer")));
        }

        Ok(Box::pin(stream::iter(chunks)))
    }
}

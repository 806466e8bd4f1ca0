// Shared fixtures for the integration suites: a scripted transport with
// per-operation response queues and optional gates that hold a call open,
// plus a recording sink for notification/highlight events.
#![allow(dead_code)]

use async_trait::async_trait;
use opticache::{
    CacheConfig, Collection, EntityId, HighlightSink, MutationKind, NewUser,
    NotificationSink, Post, ProvisionalIdAllocator, Resource, ResourceHandle, Transport,
    TransportError, User,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

type Script<T> = Mutex<VecDeque<Result<T, TransportError>>>;
type Gate = Mutex<Option<Arc<Notify>>>;

/// Transport whose responses are queued up front. An operation with a gate
/// set blocks until the gate is released, which is how tests keep a call
/// in flight while they interleave other work.
pub struct ScriptedTransport<R: Resource> {
    list: Script<Vec<R>>,
    create: Script<R>,
    update: Script<Option<R>>,
    delete: Script<()>,
    list_calls: AtomicUsize,
    list_gate: Gate,
    create_gate: Gate,
    update_gate: Gate,
}

impl<R: Resource> ScriptedTransport<R> {
    pub fn new() -> Self {
        Self {
            list: Mutex::new(VecDeque::new()),
            create: Mutex::new(VecDeque::new()),
            update: Mutex::new(VecDeque::new()),
            delete: Mutex::new(VecDeque::new()),
            list_calls: AtomicUsize::new(0),
            list_gate: Mutex::new(None),
            create_gate: Mutex::new(None),
            update_gate: Mutex::new(None),
        }
    }

    pub fn push_list(&self, result: Result<Vec<R>, TransportError>) {
        self.list.lock().unwrap().push_back(result);
    }

    pub fn push_create(&self, result: Result<R, TransportError>) {
        self.create.lock().unwrap().push_back(result);
    }

    pub fn push_update(&self, result: Result<Option<R>, TransportError>) {
        self.update.lock().unwrap().push_back(result);
    }

    pub fn push_delete(&self, result: Result<(), TransportError>) {
        self.delete.lock().unwrap().push_back(result);
    }

    pub fn gate_list(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.list_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn gate_create(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.create_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn gate_update(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.update_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn next<T>(queue: &Script<T>, op: &str) -> Result<T, TransportError> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted {op} response left"))
    }

    async fn wait(gate: &Gate) {
        let gate = gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl<R: Resource> Transport<R> for ScriptedTransport<R> {
    async fn list(&self) -> Result<Vec<R>, TransportError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Self::wait(&self.list_gate).await;
        Self::next(&self.list, "list")
    }

    async fn create(&self, _draft: &R::Draft) -> Result<R, TransportError> {
        Self::wait(&self.create_gate).await;
        Self::next(&self.create, "create")
    }

    async fn update(
        &self,
        _id: EntityId,
        _patch: &R::Patch,
    ) -> Result<Option<R>, TransportError> {
        Self::wait(&self.update_gate).await;
        Self::next(&self.update, "update")
    }

    async fn delete(&self, _id: EntityId) -> Result<(), TransportError> {
        Self::next(&self.delete, "delete")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Succeeded(Collection, MutationKind, EntityId),
    Failed(Collection, MutationKind, String),
    Highlight(Collection, EntityId),
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn mutation_succeeded(
        &self,
        collection: Collection,
        kind: MutationKind,
        resolved_id: EntityId,
    ) {
        self.events
            .lock()
            .unwrap()
            .push(SinkEvent::Succeeded(collection, kind, resolved_id));
    }

    fn mutation_failed(&self, collection: Collection, kind: MutationKind, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(SinkEvent::Failed(collection, kind, message.to_string()));
    }
}

impl HighlightSink for RecordingSink {
    fn entity_created(&self, collection: Collection, id: EntityId) {
        self.events
            .lock()
            .unwrap()
            .push(SinkEvent::Highlight(collection, id));
    }
}

/// A fully wired collection stack over a scripted transport.
pub struct TestStack<R: Resource> {
    pub transport: Arc<ScriptedTransport<R>>,
    pub sink: Arc<RecordingSink>,
    pub handle: Arc<ResourceHandle<R>>,
}

pub fn stack<R: Resource>() -> TestStack<R> {
    stack_with_config(CacheConfig::default())
}

pub fn stack_with_config<R: Resource>(config: CacheConfig) -> TestStack<R> {
    let transport = Arc::new(ScriptedTransport::new());
    let sink = Arc::new(RecordingSink::default());
    let allocator = Arc::new(ProvisionalIdAllocator::new());
    let handle = Arc::new(ResourceHandle::new(
        Arc::clone(&transport) as Arc<dyn Transport<R>>,
        allocator,
        Arc::clone(&sink) as Arc<dyn NotificationSink>,
        Arc::clone(&sink) as Arc<dyn HighlightSink>,
        &config,
    ));
    TestStack {
        transport,
        sink,
        handle,
    }
}

pub fn user(id: i64, name: &str) -> User {
    User {
        id: EntityId(id),
        name: name.to_string(),
        username: name.to_lowercase(),
        email: format!("{}@example.com", name.to_lowercase()),
    }
}

pub fn new_user(name: &str) -> NewUser {
    NewUser {
        name: name.to_string(),
        username: name.to_lowercase(),
        email: format!("{}@example.com", name.to_lowercase()),
    }
}

pub fn post(id: i64, title: &str, user_id: i64) -> Post {
    Post {
        id: EntityId(id),
        title: title.to_string(),
        body: Some(format!("{title} body")),
        user_id: EntityId(user_id),
    }
}

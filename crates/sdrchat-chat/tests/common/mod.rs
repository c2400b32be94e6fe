#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sdrchat_api::{ApiError, ChatApi, Result};
use sdrchat_chat::{ChatController, ConversationState, SendOrdering};
use sdrchat_storage::{KeyValueStore, MemoryStore, Result as StoreResult};
use sdrchat_types::{
    ApiMessage, ChatResponse, InitChatResponse, Message, QuickReply, Role, MESSAGES_KEY,
};
use tokio::sync::{mpsc, oneshot, watch};

pub fn greeting() -> InitChatResponse {
    InitChatResponse {
        response: "Hi, I'm Alex".to_string(),
        quick_replies: Some(vec![QuickReply::new("Pricing", "pricing")]),
        is_new_session: true,
    }
}

pub fn service_down() -> ApiError {
    ApiError::http(503, "Service Unavailable")
}

/// Role/content pairs, ignoring timestamps
pub fn lines(state: &ConversationState) -> Vec<(Role, String)> {
    state
        .messages
        .iter()
        .map(|m| (m.role, m.content.clone()))
        .collect()
}

pub fn line(role: Role, content: &str) -> (Role, String) {
    (role, content.to_string())
}

pub fn saved(messages: &[(Role, &str)]) -> Vec<Message> {
    messages
        .iter()
        .map(|(role, content)| Message::new(*role, *content, None))
        .collect()
}

/// Chat service answering from pre-loaded queues and recording every call
#[derive(Default)]
pub struct ScriptedApi {
    init_replies: Mutex<VecDeque<Result<InitChatResponse>>>,
    send_replies: Mutex<VecDeque<Result<ChatResponse>>>,
    init_calls: Mutex<Vec<String>>,
    send_calls: Mutex<Vec<(Vec<ApiMessage>, String)>>,
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_init(&self, reply: Result<InitChatResponse>) {
        self.init_replies.lock().unwrap().push_back(reply);
    }

    pub fn push_send(&self, reply: Result<ChatResponse>) {
        self.send_replies.lock().unwrap().push_back(reply);
    }

    pub fn init_calls(&self) -> Vec<String> {
        self.init_calls.lock().unwrap().clone()
    }

    pub fn send_calls(&self) -> Vec<(Vec<ApiMessage>, String)> {
        self.send_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatApi for ScriptedApi {
    async fn init_chat(&self, session_id: &str) -> Result<InitChatResponse> {
        self.init_calls.lock().unwrap().push(session_id.to_string());
        self.init_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(service_down()))
    }

    async fn send_chat(&self, messages: Vec<ApiMessage>, session_id: &str) -> Result<ChatResponse> {
        self.send_calls
            .lock()
            .unwrap()
            .push((messages, session_id.to_string()));
        self.send_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(service_down()))
    }
}

/// A send that is parked until the test answers it
pub struct PendingSend {
    pub messages: Vec<ApiMessage>,
    reply: oneshot::Sender<Result<ChatResponse>>,
}

impl PendingSend {
    pub fn respond(self, reply: Result<ChatResponse>) {
        let _ = self.reply.send(reply);
    }
}

/// Chat service whose sends resolve only when the test says so
pub struct GatedApi {
    pending_tx: mpsc::UnboundedSender<PendingSend>,
    pending_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<PendingSend>>,
    held_greeting: Mutex<Option<oneshot::Receiver<Result<InitChatResponse>>>>,
}

impl GatedApi {
    pub fn new() -> Arc<Self> {
        let (pending_tx, pending_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            pending_tx,
            pending_rx: tokio::sync::Mutex::new(pending_rx),
            held_greeting: Mutex::new(None),
        })
    }

    /// Like [`GatedApi::new`], but the greeting waits for the returned sender
    pub fn with_held_greeting() -> (Arc<Self>, oneshot::Sender<Result<InitChatResponse>>) {
        let (release, held) = oneshot::channel();
        let api = Self::new();
        *api.held_greeting.lock().unwrap() = Some(held);
        (api, release)
    }

    /// Waits until the controller has issued its next send
    pub async fn next_send(&self) -> PendingSend {
        self.pending_rx
            .lock()
            .await
            .recv()
            .await
            .expect("gated api dropped")
    }
}

#[async_trait]
impl ChatApi for GatedApi {
    async fn init_chat(&self, _session_id: &str) -> Result<InitChatResponse> {
        let held = self.held_greeting.lock().unwrap().take();
        match held {
            Some(held) => held.await.unwrap_or_else(|_| Err(service_down())),
            None => Ok(greeting()),
        }
    }

    async fn send_chat(&self, messages: Vec<ApiMessage>, _session_id: &str) -> Result<ChatResponse> {
        let (reply, answer) = oneshot::channel();
        self.pending_tx
            .send(PendingSend { messages, reply })
            .map_err(|_| service_down())?;
        answer.await.unwrap_or_else(|_| Err(service_down()))
    }
}

/// Store that checks, on every transcript write, whether the controller's
/// state can still be read from another thread
#[derive(Default)]
pub struct ObservingStore {
    inner: MemoryStore,
    updates: Mutex<Option<watch::Receiver<ConversationState>>>,
    observed: Mutex<Vec<Option<usize>>>,
}

impl ObservingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn watch(&self, updates: watch::Receiver<ConversationState>) {
        *self.updates.lock().unwrap() = Some(updates);
    }

    /// Transcript length seen during each write, `None` when reading blocked
    pub fn observed(&self) -> Vec<Option<usize>> {
        self.observed.lock().unwrap().clone()
    }
}

impl KeyValueStore for ObservingStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let updates = self.updates.lock().unwrap().clone();
        if let (Some(updates), true) = (updates, key == MESSAGES_KEY) {
            let (seen_tx, seen_rx) = std::sync::mpsc::channel();
            std::thread::spawn(move || {
                let len = updates.borrow().messages.len();
                let _ = seen_tx.send(len);
            });
            let seen = seen_rx.recv_timeout(Duration::from_secs(1)).ok();
            self.observed.lock().unwrap().push(seen);
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.inner.remove(key)
    }
}

pub fn controller(
    api: Arc<dyn ChatApi>,
    store: Arc<MemoryStore>,
    ordering: SendOrdering,
) -> ChatController {
    let store: Arc<dyn KeyValueStore> = store;
    ChatController::new(api, store, ordering)
}

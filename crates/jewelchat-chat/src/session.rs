//! Chat session controller
//!
//! [`ChatState`] holds the transcript and applies every transition
//! synchronously; [`ChatSession`] drives it against a [`ChatBackend`],
//! never holding a borrow across an `.await`.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use jewelchat_api::{ApiError, ChatBackend};
use jewelchat_types::{
    BotReply, ChatEntry, History, InteractionKind, Product, SessionId, SessionStart,
};

use crate::store::SessionStore;

pub const START_FAILED_MESSAGE: &str =
    "Sorry, I'm having trouble connecting to the server. Please try again later.";

pub const SEND_FAILED_MESSAGE: &str =
    "Sorry, something went wrong. Please check your connection and try again.";

/// Where the controller is in the session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NoSession,
    SessionPending,
    SessionActive,
}

/// What the controller needs to do after the chat surface opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenAction {
    StartSession,
    RestoreHistory(SessionId),
    Nothing,
}

/// A user message that has been recorded and must now be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub generation: u64,
    pub session_id: Option<SessionId>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Empty or whitespace-only input; nothing was sent
    Ignored,
    /// A newer send was dispatched before this one resolved
    Discarded,
    Delivered {
        new_session_id: Option<SessionId>,
        products: Vec<Product>,
    },
    Failed,
}

#[derive(Debug, Default)]
pub struct ChatState {
    session_id: Option<SessionId>,
    start_pending: bool,
    history_requested: bool,
    messages: Vec<ChatEntry>,
    quick_replies: Vec<String>,
    generation: u64,
    awaiting: Option<u64>,
}

impl ChatState {
    pub fn new(cached_session: Option<SessionId>) -> Self {
        Self {
            session_id: cached_session,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match (&self.session_id, self.start_pending) {
            (Some(_), _) => SessionPhase::SessionActive,
            (None, true) => SessionPhase::SessionPending,
            (None, false) => SessionPhase::NoSession,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn messages(&self) -> &[ChatEntry] {
        &self.messages
    }

    pub fn quick_replies(&self) -> &[String] {
        &self.quick_replies
    }

    /// Raised while a session start or the latest send is outstanding
    pub fn is_typing(&self) -> bool {
        self.start_pending || self.awaiting.is_some()
    }

    /// The chat surface became visible. Decides at most one start per session.
    pub fn on_open(&mut self) -> OpenAction {
        match self.phase() {
            SessionPhase::NoSession => {
                self.start_pending = true;
                OpenAction::StartSession
            }
            SessionPhase::SessionPending => OpenAction::Nothing,
            SessionPhase::SessionActive => {
                if self.history_requested || !self.messages.is_empty() {
                    return OpenAction::Nothing;
                }
                self.history_requested = true;
                match &self.session_id {
                    Some(id) => OpenAction::RestoreHistory(id.clone()),
                    None => OpenAction::Nothing,
                }
            }
        }
    }

    /// Apply the result of `start_session`. Returns the identifier to persist.
    pub fn finish_start(&mut self, result: Result<SessionStart, ApiError>) -> Option<SessionId> {
        self.start_pending = false;

        let start = match result {
            Ok(start) if !start.session_id.is_empty() => start,
            Ok(_) => {
                log::error!("Error starting session: response carried an empty session id");
                self.messages.push(ChatEntry::error(START_FAILED_MESSAGE));
                return None;
            }
            Err(e) => {
                log::error!("Error starting session: {}", e);
                self.messages.push(ChatEntry::error(START_FAILED_MESSAGE));
                return None;
            }
        };

        log::info!("Chat session started: {}", start.session_id);
        self.session_id = Some(start.session_id.clone());
        self.history_requested = true;
        self.messages.push(ChatEntry::bot(start.message));
        if !start.options.is_empty() {
            self.quick_replies = start.options;
        }
        Some(start.session_id)
    }

    /// Seed the transcript from the backend's history, unless the user already started talking
    pub fn restore_history(&mut self, history: History) {
        if !self.messages.is_empty() {
            return;
        }
        self.messages = history
            .history
            .into_iter()
            .filter(|entry| !entry.message.is_empty())
            .map(ChatEntry::from)
            .collect();
    }

    /// Record a user message optimistically and stamp it with a new generation.
    ///
    /// `fallback_session` is used when no session is known; `None` there means
    /// the message goes out without one.
    pub fn begin_send(&mut self, text: &str, fallback_session: Option<SessionId>) -> Option<OutgoingMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.messages.push(ChatEntry::user(text));
        self.quick_replies.clear();
        self.generation += 1;
        self.awaiting = Some(self.generation);

        Some(OutgoingMessage {
            generation: self.generation,
            session_id: self.session_id.clone().or(fallback_session),
            text: text.to_string(),
        })
    }

    /// Apply the result of `send_message` for `generation`. Stale results change nothing.
    pub fn finish_send(&mut self, generation: u64, result: Result<BotReply, ApiError>) -> SendOutcome {
        if self.awaiting != Some(generation) {
            log::debug!(
                "Discarding response for send #{} (latest is #{})",
                generation,
                self.generation
            );
            return SendOutcome::Discarded;
        }
        self.awaiting = None;

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                log::error!("Error sending message: {}", e);
                self.messages.push(ChatEntry::error(SEND_FAILED_MESSAGE));
                return SendOutcome::Failed;
            }
        };

        let new_session_id = reply
            .session_id
            .filter(|id| !id.is_empty() && self.session_id.as_deref() != Some(id.as_str()));
        if let Some(id) = &new_session_id {
            log::info!("Backend issued session id {}", id);
            self.session_id = Some(id.clone());
        }

        self.messages.push(ChatEntry::bot(reply.message));
        if !reply.options.is_empty() {
            self.quick_replies = reply.options;
        }

        SendOutcome::Delivered {
            new_session_id,
            products: reply.products,
        }
    }
}

/// Receives controller notifications; the browser view implements this
pub trait ChatObserver {
    /// Controller state changed and should be re-rendered
    fn state_changed(&self, state: &ChatState);

    /// A reply carried a non-empty product list
    fn products_received(&self, _products: Vec<Product>) {}

    /// A send resolved with a bot reply or an error bubble
    fn reply_arrived(&self) {}
}

struct NoopObserver;

impl ChatObserver for NoopObserver {
    fn state_changed(&self, _state: &ChatState) {}
}

/// One chat widget's controller, with its backend and store injected.
/// Clones share state.
#[derive(Clone)]
pub struct ChatSession {
    state: Rc<RefCell<ChatState>>,
    backend: Rc<dyn ChatBackend>,
    store: SessionStore,
    observer: Rc<dyn ChatObserver>,
}

impl ChatSession {
    /// Build the controller, picking up any session cached by an earlier page load
    pub fn new(backend: Rc<dyn ChatBackend>, store: SessionStore) -> Self {
        let cached = store.load();
        if let Some(id) = &cached {
            log::info!("Restored cached session {}", id);
        }

        Self {
            state: Rc::new(RefCell::new(ChatState::new(cached))),
            backend,
            store,
            observer: Rc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Rc<dyn ChatObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn state(&self) -> Ref<'_, ChatState> {
        self.state.borrow()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.state.borrow().session_id.clone()
    }

    fn notify(&self) {
        self.observer.state_changed(&self.state.borrow());
    }

    /// Handle the chat surface becoming visible
    pub async fn open(&self) {
        let action = self.state.borrow_mut().on_open();

        match action {
            OpenAction::StartSession => {
                self.notify();
                let result = self.backend.start_session().await;
                let started = self.state.borrow_mut().finish_start(result);
                if let Some(id) = started {
                    self.store.save(&id);
                }
                self.notify();
            }
            OpenAction::RestoreHistory(id) => match self.backend.conversation_history(&id).await {
                Ok(history) => {
                    self.state.borrow_mut().restore_history(history);
                    self.notify();
                }
                Err(e) => log::warn!("Could not restore history for {}: {}", id, e),
            },
            OpenAction::Nothing => {}
        }
    }

    /// Send typed text. Sending proceeds without a session when none could be started.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let fallback = if self.state.borrow().session_id.is_none() {
            self.store.load()
        } else {
            None
        };

        let outgoing = self.state.borrow_mut().begin_send(text, fallback);
        let Some(outgoing) = outgoing else {
            return SendOutcome::Ignored;
        };
        self.notify();

        let result = self
            .backend
            .send_message(outgoing.session_id.as_deref(), &outgoing.text)
            .await;

        let outcome = self.state.borrow_mut().finish_send(outgoing.generation, result);
        if outcome == SendOutcome::Discarded {
            return outcome;
        }
        self.notify();

        if let SendOutcome::Delivered { new_session_id, products } = &outcome {
            if let Some(id) = new_session_id {
                self.store.save(id);
            }
            if !products.is_empty() {
                self.observer.products_received(products.clone());
            }
        }
        self.observer.reply_arrived();

        outcome
    }

    pub async fn select_quick_reply(&self, option: &str) -> SendOutcome {
        self.send(option).await
    }

    /// Best-effort interaction report; needs both a session and a product id
    pub async fn track(&self, product: &Product, kind: InteractionKind) {
        let (Some(session_id), Some(product_id)) = (self.session_id(), product.id.as_ref()) else {
            return;
        };

        if let Err(e) = self
            .backend
            .track_interaction(&session_id, product_id, kind)
            .await
        {
            log::warn!("Ignoring failed {} tracking for product {}: {}", kind.as_str(), product_id, e);
        }
    }

    pub async fn track_view(&self, product: &Product) {
        self.track(product, InteractionKind::View).await
    }

    pub async fn track_click(&self, product: &Product) {
        self.track(product, InteractionKind::Click).await
    }

    pub async fn trending_products(&self, limit: u32) -> Result<Vec<Product>, ApiError> {
        self.backend.trending_products(limit).await
    }
}

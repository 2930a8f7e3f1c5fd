#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use jewelchat_api::{ApiError, ChatBackend};
use jewelchat_chat::{ChatObserver, ChatState, Scheduler, StorefrontView};
use jewelchat_types::{BotReply, History, InteractionKind, Product, ProductId, SessionStart};

/// Scripted backend that records every call
#[derive(Default)]
pub struct FakeBackend {
    pub starts: RefCell<VecDeque<Result<SessionStart, ApiError>>>,
    pub replies: RefCell<VecDeque<Result<BotReply, ApiError>>>,
    pub history: RefCell<Option<History>>,
    pub start_calls: Cell<usize>,
    pub history_calls: Cell<usize>,
    pub sent: RefCell<Vec<(Option<String>, String)>>,
    pub tracked: RefCell<Vec<(String, ProductId, InteractionKind)>>,
    pub fail_tracking: Cell<bool>,
}

impl FakeBackend {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn push_start(&self, value: Value) {
        self.starts
            .borrow_mut()
            .push_back(Ok(serde_json::from_value(value).unwrap()));
    }

    pub fn push_reply(&self, value: Value) {
        self.replies
            .borrow_mut()
            .push_back(Ok(serde_json::from_value(value).unwrap()));
    }

    pub fn push_start_error(&self, error: ApiError) {
        self.starts.borrow_mut().push_back(Err(error));
    }

    pub fn push_reply_error(&self, error: ApiError) {
        self.replies.borrow_mut().push_back(Err(error));
    }

    pub fn send_calls(&self) -> usize {
        self.sent.borrow().len()
    }
}

fn unscripted() -> ApiError {
    ApiError::Malformed("no scripted response".to_string())
}

#[async_trait(?Send)]
impl ChatBackend for FakeBackend {
    async fn start_session(&self) -> Result<SessionStart, ApiError> {
        self.start_calls.set(self.start_calls.get() + 1);
        self.starts.borrow_mut().pop_front().unwrap_or_else(|| Err(unscripted()))
    }

    async fn send_message(&self, session_id: Option<&str>, message: &str) -> Result<BotReply, ApiError> {
        self.sent
            .borrow_mut()
            .push((session_id.map(str::to_string), message.to_string()));
        self.replies.borrow_mut().pop_front().unwrap_or_else(|| Err(unscripted()))
    }

    async fn track_interaction(
        &self,
        session_id: &str,
        product_id: &ProductId,
        action: InteractionKind,
    ) -> Result<(), ApiError> {
        self.tracked
            .borrow_mut()
            .push((session_id.to_string(), product_id.clone(), action));
        if self.fail_tracking.get() {
            Err(ApiError::Status { status: 500, body: "tracking down".to_string() })
        } else {
            Ok(())
        }
    }

    async fn trending_products(&self, limit: u32) -> Result<Vec<Product>, ApiError> {
        Ok((0..limit as i64)
            .map(|id| Product {
                id: Some(ProductId::Number(id)),
                name: format!("Trending {}", id),
                ..Product::default()
            })
            .collect())
    }

    async fn conversation_history(&self, _session_id: &str) -> Result<History, ApiError> {
        self.history_calls.set(self.history_calls.get() + 1);
        self.history.borrow().clone().ok_or_else(unscripted)
    }
}

/// Backend whose message replies are released by the test, in any order
#[derive(Default)]
pub struct GatedBackend {
    gates: RefCell<VecDeque<oneshot::Receiver<Result<BotReply, ApiError>>>>,
}

impl GatedBackend {
    /// Queue a gate for the next `send_message` call and return its trigger
    pub fn gate(&self) -> oneshot::Sender<Result<BotReply, ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().push_back(rx);
        tx
    }
}

#[async_trait(?Send)]
impl ChatBackend for GatedBackend {
    async fn start_session(&self) -> Result<SessionStart, ApiError> {
        Err(unscripted())
    }

    async fn send_message(&self, _session_id: Option<&str>, _message: &str) -> Result<BotReply, ApiError> {
        let gate = self.gates.borrow_mut().pop_front();
        match gate {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(unscripted())),
            None => Err(unscripted()),
        }
    }

    async fn track_interaction(
        &self,
        _session_id: &str,
        _product_id: &ProductId,
        _action: InteractionKind,
    ) -> Result<(), ApiError> {
        Ok(())
    }

    async fn trending_products(&self, _limit: u32) -> Result<Vec<Product>, ApiError> {
        Ok(Vec::new())
    }

    async fn conversation_history(&self, _session_id: &str) -> Result<History, ApiError> {
        Err(unscripted())
    }
}

/// Observer that records product hand-offs and typing transitions
#[derive(Default)]
pub struct RecordingObserver {
    pub products: RefCell<Vec<Vec<Product>>>,
    pub typing: RefCell<Vec<bool>>,
    pub replies: Cell<usize>,
}

impl ChatObserver for RecordingObserver {
    fn state_changed(&self, state: &ChatState) {
        self.typing.borrow_mut().push(state.is_typing());
    }

    fn products_received(&self, products: Vec<Product>) {
        self.products.borrow_mut().push(products);
    }

    fn reply_arrived(&self) {
        self.replies.set(self.replies.get() + 1);
    }
}

pub fn product_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "category": "Rings",
        "metal_type": "Gold",
        "price": 32000,
        "image_url": format!("https://img.example/{}.jpg", id)
    })
}

// ============================================================================
// Virtual-time scheduler
// ============================================================================

struct ScheduledTask {
    due: Duration,
    cancelled: Rc<Cell<bool>>,
    task: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct Clock {
    now: Duration,
    tasks: Vec<ScheduledTask>,
}

/// Scheduler driven by [`ManualScheduler::advance`]
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Rc<RefCell<Clock>>,
}

pub struct ManualHandle {
    cancelled: Rc<Cell<bool>>,
}

impl Drop for ManualHandle {
    fn drop(&mut self) {
        self.cancelled.set(true);
    }
}

impl Scheduler for ManualScheduler {
    type Handle = ManualHandle;

    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> ManualHandle {
        let cancelled = Rc::new(Cell::new(false));
        let mut clock = self.clock.borrow_mut();
        let due = clock.now + delay;
        clock.tasks.push(ScheduledTask {
            due,
            cancelled: cancelled.clone(),
            task,
        });
        ManualHandle { cancelled }
    }
}

impl ManualScheduler {
    /// Move time forward, running due tasks in order
    pub fn advance(&self, by: Duration) {
        let target = self.clock.borrow().now + by;

        loop {
            let next = {
                let mut clock = self.clock.borrow_mut();
                clock.tasks.retain(|t| !t.cancelled.get());
                let index = clock
                    .tasks
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| t.due)
                    .map(|(i, _)| i);
                match index {
                    Some(i) => {
                        let task = clock.tasks.remove(i);
                        clock.now = task.due;
                        Some(task)
                    }
                    None => {
                        clock.now = target;
                        None
                    }
                }
            };

            match next {
                Some(task) => (task.task)(),
                None => break,
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.clock
            .borrow()
            .tasks
            .iter()
            .filter(|t| !t.cancelled.get())
            .count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    ChatVisibility(bool),
    Products { count: usize, visible: bool },
    Notification(bool),
    Scrolled,
}

#[derive(Default)]
pub struct RecordingView {
    pub events: RefCell<Vec<ViewEvent>>,
}

impl RecordingView {
    pub fn has(&self, event: &ViewEvent) -> bool {
        self.events.borrow().contains(event)
    }
}

impl StorefrontView for RecordingView {
    fn chat_visibility_changed(&self, open: bool) {
        self.events.borrow_mut().push(ViewEvent::ChatVisibility(open));
    }

    fn products_changed(&self, products: &[Product], visible: bool) {
        self.events.borrow_mut().push(ViewEvent::Products {
            count: products.len(),
            visible,
        });
    }

    fn notification_changed(&self, flagged: bool) {
        self.events.borrow_mut().push(ViewEvent::Notification(flagged));
    }

    fn scroll_to_recommendations(&self) {
        self.events.borrow_mut().push(ViewEvent::Scrolled);
    }
}

//! Storefront coordinator: chat visibility, recommended products and the
//! notification badge, plus the deferred scroll/auto-close after a product
//! list arrives.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use jewelchat_types::Product;

/// Delay before the recommendations region is scrolled into view
pub const SCROLL_DELAY: Duration = Duration::from_millis(500);

/// Delay before the chat closes itself to reveal the product grid
pub const AUTO_CLOSE_DELAY: Duration = Duration::from_millis(2000);

/// Runs a task once after a delay. Dropping the returned handle cancels the task.
pub trait Scheduler {
    type Handle;

    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Self::Handle;
}

/// Rendering side of the coordinator
pub trait StorefrontView {
    fn chat_visibility_changed(&self, open: bool);
    fn products_changed(&self, products: &[Product], visible: bool);
    fn notification_changed(&self, flagged: bool);
    fn scroll_to_recommendations(&self);
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorefrontState {
    pub chat_open: bool,
    pub products: Vec<Product>,
    pub products_visible: bool,
    pub has_notification: bool,
}

struct Inner<S: Scheduler> {
    state: RefCell<StorefrontState>,
    view: Rc<dyn StorefrontView>,
    scheduler: S,
    pending: RefCell<Vec<S::Handle>>,
}

/// Top-level UI state shared by the hero, chat widget, toggle and product grid.
/// Clones share state.
pub struct Storefront<S: Scheduler> {
    inner: Rc<Inner<S>>,
}

impl<S: Scheduler> Clone for Storefront<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Non-owning reference to a [`Storefront`], for observers it owns indirectly
pub struct WeakStorefront<S: Scheduler> {
    inner: Weak<Inner<S>>,
}

impl<S: Scheduler> Clone for WeakStorefront<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<S: Scheduler> WeakStorefront<S> {
    pub fn upgrade(&self) -> Option<Storefront<S>> {
        self.inner.upgrade().map(|inner| Storefront { inner })
    }
}

impl<S: Scheduler + 'static> Storefront<S> {
    pub fn new(scheduler: S, view: Rc<dyn StorefrontView>) -> Self {
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(StorefrontState::default()),
                view,
                scheduler,
                pending: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakStorefront<S> {
        WeakStorefront {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn state(&self) -> StorefrontState {
        self.inner.state.borrow().clone()
    }

    pub fn is_chat_open(&self) -> bool {
        self.inner.state.borrow().chat_open
    }

    /// Open the chat and clear the notification badge
    pub fn open_chat(&self) {
        let was_open = {
            let mut state = self.inner.state.borrow_mut();
            let was_open = state.chat_open;
            state.chat_open = true;
            state.has_notification = false;
            was_open
        };

        self.inner.view.notification_changed(false);
        if !was_open {
            self.inner.view.chat_visibility_changed(true);
        }
    }

    /// Close the chat at the user's request; pending deferred actions are dropped
    pub fn close_chat(&self) {
        self.cancel_pending();
        self.set_closed();
    }

    pub fn toggle_chat(&self) {
        if self.is_chat_open() {
            self.close_chat();
        } else {
            self.open_chat();
        }
    }

    /// Show a product list, then scroll to it and close the chat after fixed delays
    pub fn products_received(&self, products: Vec<Product>) {
        log::info!("Showing {} recommended products", products.len());
        {
            let mut state = self.inner.state.borrow_mut();
            state.products = products;
            state.products_visible = true;
        }
        {
            let state = self.inner.state.borrow();
            self.inner.view.products_changed(&state.products, true);
        }

        self.cancel_pending();

        let weak = self.downgrade();
        let scroll = self.inner.scheduler.schedule(
            SCROLL_DELAY,
            Box::new(move || {
                if let Some(storefront) = weak.upgrade() {
                    storefront.inner.view.scroll_to_recommendations();
                }
            }),
        );

        let weak = self.downgrade();
        let close = self.inner.scheduler.schedule(
            AUTO_CLOSE_DELAY,
            Box::new(move || {
                if let Some(storefront) = weak.upgrade() {
                    storefront.set_closed();
                }
            }),
        );

        self.inner.pending.borrow_mut().extend([scroll, close]);
    }

    /// Raise the badge for a reply that arrived while the chat was closed
    pub fn flag_notification(&self) {
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            let changed = !state.chat_open && !state.has_notification;
            if changed {
                state.has_notification = true;
            }
            changed
        };

        if changed {
            self.inner.view.notification_changed(true);
        }
    }

    /// Tear down: cancel every deferred action still outstanding
    pub fn unmount(&self) {
        self.cancel_pending();
    }

    fn cancel_pending(&self) {
        let cancelled: Vec<S::Handle> = self.inner.pending.borrow_mut().drain(..).collect();
        drop(cancelled);
    }

    fn set_closed(&self) {
        let was_open = std::mem::replace(&mut self.inner.state.borrow_mut().chat_open, false);
        if was_open {
            self.inner.view.chat_visibility_changed(false);
        }
    }
}

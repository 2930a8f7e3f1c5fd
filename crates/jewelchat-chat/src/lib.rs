//! Chat session logic for the jewelry storefront widget
//!
//! - [`store`]: persistence of the session identifier
//! - [`session`]: the session controller (start, send, quick replies, tracking)
//! - [`coordinator`]: top-level storefront state and deferred UI actions
//! - [`render`]: HTML fragments for the presentation components
//!
//! Everything here is single-threaded (`Rc`/`RefCell`) and free of browser
//! APIs, so it runs the same under `wasm32` and in native tests.

pub mod coordinator;
pub mod render;
pub mod session;
pub mod store;

pub use coordinator::{
    Scheduler, Storefront, StorefrontState, StorefrontView, WeakStorefront, AUTO_CLOSE_DELAY,
    SCROLL_DELAY,
};
pub use session::{ChatObserver, ChatSession, ChatState, OpenAction, SendOutcome, SessionPhase};
pub use store::{KeyValueStorage, MemoryStorage, SessionStore, StorageUnavailable};

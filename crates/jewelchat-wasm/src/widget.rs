use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use jewelchat_api::{ApiConfig, HttpChatClient};
use jewelchat_chat::render;
use jewelchat_chat::{
    ChatObserver, ChatSession, ChatState, SessionStore, Storefront, StorefrontView, WeakStorefront,
};
use jewelchat_types::Product;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Event, HtmlImageElement, HtmlInputElement, KeyboardEvent, ScrollBehavior,
    ScrollIntoViewOptions, ScrollLogicalPosition,
};

use crate::dom;
use crate::storage::BrowserStorage;
use crate::timers::TimeoutScheduler;

const HERO_ID: &str = "hero";
const CHAT_WIDGET_ID: &str = "chatWidget";
const CHAT_TOGGLE_ID: &str = "chatToggle";

/// Mounted storefront page: hero, recommendations, chat window and toggle
pub struct StorefrontApp {
    document: Document,
    session: ChatSession,
    storefront: Storefront<TimeoutScheduler>,
    view: Rc<DomView>,
}

impl StorefrontApp {
    pub fn mount(document: Document, root_id: &str, config: ApiConfig) -> Result<Self, JsValue> {
        let root = dom::get_element_by_id(&document, root_id)?;
        root.set_inner_html(&layout());

        let client = HttpChatClient::new(config).map_err(|e| JsValue::from_str(&e.to_string()))?;

        let view = Rc::new(DomView::new(document.clone()));
        let storefront = Storefront::new(TimeoutScheduler, view.clone());
        let bridge = Rc::new(ChatBridge {
            view: Rc::downgrade(&view),
            storefront: storefront.downgrade(),
        });
        let session = ChatSession::new(Rc::new(client), SessionStore::new(Rc::new(BrowserStorage)))
            .with_observer(bridge);
        *view.session.borrow_mut() = Some(session.clone());

        let app = Self {
            document,
            session,
            storefront,
            view,
        };

        app.view.render_chat(&app.session.state());
        app.view.render_toggle();
        app.setup_navigation()?;
        app.setup_message_input()?;
        app.setup_quick_replies()?;
        app.setup_product_grid()?;

        log::info!("Storefront mounted in #{}", root_id);
        Ok(app)
    }

    pub fn storefront(&self) -> &Storefront<TimeoutScheduler> {
        &self.storefront
    }

    fn setup_navigation(&self) -> Result<(), JsValue> {
        let storefront = self.storefront.clone();
        dom::add_click_listener(&dom::get_element_by_id(&self.document, "heroStartChat")?, move || {
            storefront.open_chat();
        })?;

        let storefront = self.storefront.clone();
        dom::add_click_listener(&dom::get_element_by_id(&self.document, CHAT_TOGGLE_ID)?, move || {
            storefront.toggle_chat();
        })?;

        let storefront = self.storefront.clone();
        dom::add_click_listener(&dom::get_element_by_id(&self.document, "chatClose")?, move || {
            storefront.close_chat();
        })?;

        Ok(())
    }

    fn setup_message_input(&self) -> Result<(), JsValue> {
        let input = dom::get_input_by_id(&self.document, "chatInput")?;

        let session = self.session.clone();
        let send_input = input.clone();
        dom::add_click_listener(&dom::get_element_by_id(&self.document, "chatSend")?, move || {
            submit(&send_input, &session);
        })?;

        let session = self.session.clone();
        let key_input = input.clone();
        dom::add_listener(&input, "keydown", move |event: Event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if event.key() == "Enter" && !event.shift_key() {
                event.prevent_default();
                submit(&key_input, &session);
            }
        })?;

        Ok(())
    }

    fn setup_quick_replies(&self) -> Result<(), JsValue> {
        let container = dom::get_element_by_id(&self.document, "chatQuickReplies")?;
        let session = self.session.clone();

        dom::add_listener(&container, "click", move |event: Event| {
            let Some(index) = dom::closest_index(&event, "[data-option-index]", "data-option-index") else {
                return;
            };
            let option = session.state().quick_replies().get(index).cloned();
            if let Some(option) = option {
                let session = session.clone();
                spawn_local(async move {
                    session.select_quick_reply(&option).await;
                });
            }
        })
    }

    fn setup_product_grid(&self) -> Result<(), JsValue> {
        let section = dom::get_element_by_id(&self.document, render::RECOMMENDATIONS_SECTION_ID)?;

        let session = self.session.clone();
        let view = self.view.clone();
        dom::add_listener(&section, "click", move |event: Event| {
            let Some(index) = dom::closest_index(&event, ".product-card", "data-product-index") else {
                return;
            };
            let product = view.products.borrow().get(index).cloned();
            if let Some(product) = product {
                log::debug!("Product clicked: {}", product.name);
                let session = session.clone();
                spawn_local(async move {
                    session.track_click(&product).await;
                });
            }
        })?;

        // Image errors do not bubble
        dom::add_capture_listener(&section, "error", |event: Event| {
            let Some(image) = event
                .target()
                .and_then(|target| target.dyn_into::<HtmlImageElement>().ok())
            else {
                return;
            };
            if image.src() != render::FALLBACK_IMAGE_URL {
                image.set_src(render::FALLBACK_IMAGE_URL);
            }
        })
    }
}

fn layout() -> String {
    format!(
        r#"<header class="hero" id="{hero_id}">{hero}</header><section class="recommendations-section" id="{section_id}" style="display: none"></section><div class="chatbot-widget" id="{widget_id}" style="display: none">{shell}</div><button class="chatbot-toggle" id="{toggle_id}" aria-label="Toggle Chat"></button>"#,
        hero_id = HERO_ID,
        hero = render::render_hero(),
        section_id = render::RECOMMENDATIONS_SECTION_ID,
        widget_id = CHAT_WIDGET_ID,
        shell = render::render_chat_shell(),
        toggle_id = CHAT_TOGGLE_ID,
    )
}

fn submit(input: &HtmlInputElement, session: &ChatSession) {
    let text = input.value();
    if text.trim().is_empty() {
        return;
    }
    input.set_value("");

    let session = session.clone();
    spawn_local(async move {
        session.send(&text).await;
    });
}

fn report(context: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        log::error!("{}: {:?}", context, e);
    }
}

// ============================================================================
// DOM view
// ============================================================================

struct DomView {
    document: Document,
    session: RefCell<Option<ChatSession>>,
    chat_open: Cell<bool>,
    has_notification: Cell<bool>,
    products: RefCell<Vec<Product>>,
}

impl DomView {
    fn new(document: Document) -> Self {
        Self {
            document,
            session: RefCell::new(None),
            chat_open: Cell::new(false),
            has_notification: Cell::new(false),
            products: RefCell::new(Vec::new()),
        }
    }

    fn session(&self) -> Option<ChatSession> {
        self.session.borrow().clone()
    }

    fn render_toggle(&self) {
        report(
            "Failed to render chat toggle",
            dom::get_element_by_id(&self.document, CHAT_TOGGLE_ID).map(|toggle| {
                toggle.set_inner_html(&render::render_chat_toggle(
                    self.chat_open.get(),
                    self.has_notification.get(),
                ))
            }),
        );
    }

    fn render_chat(&self, state: &ChatState) {
        report("Failed to render chat", self.try_render_chat(state));
    }

    fn try_render_chat(&self, state: &ChatState) -> Result<(), JsValue> {
        let messages = dom::get_element_by_id(&self.document, "chatMessages")?;
        messages.set_inner_html(&render::render_messages(state.messages()));
        dom::scroll_to_bottom(&messages);

        dom::get_element_by_id(&self.document, "chatTyping")?
            .set_inner_html(&render::render_typing_indicator(state.is_typing()));
        dom::get_element_by_id(&self.document, "chatQuickReplies")?
            .set_inner_html(&render::render_quick_replies(state.quick_replies(), state.is_typing()));

        Ok(())
    }

    fn try_set_chat_visible(&self, open: bool) -> Result<(), JsValue> {
        let widget = dom::get_html_element_by_id(&self.document, CHAT_WIDGET_ID)?;
        if open {
            widget.set_class_name("chatbot-widget active");
            dom::show_element(&widget);
            dom::get_input_by_id(&self.document, "chatInput")?.focus()?;
        } else {
            widget.set_class_name("chatbot-widget");
            dom::hide_element(&widget);
        }
        Ok(())
    }

    fn try_render_products(&self, products: &[Product], visible: bool) -> Result<(), JsValue> {
        let section = dom::get_html_element_by_id(&self.document, render::RECOMMENDATIONS_SECTION_ID)?;
        section.set_inner_html(&render::render_products_section(products, visible));
        if visible {
            dom::show_element(&section);
        } else {
            dom::hide_element(&section);
        }
        Ok(())
    }
}

impl StorefrontView for DomView {
    fn chat_visibility_changed(&self, open: bool) {
        self.chat_open.set(open);
        report("Failed to toggle chat window", self.try_set_chat_visible(open));
        self.render_toggle();

        if open {
            if let Some(session) = self.session() {
                spawn_local(async move {
                    session.open().await;
                });
            }
        }
    }

    fn products_changed(&self, products: &[Product], visible: bool) {
        *self.products.borrow_mut() = products.to_vec();
        report("Failed to render products", self.try_render_products(products, visible));

        if !visible {
            return;
        }
        if let Some(session) = self.session() {
            let products = products.to_vec();
            spawn_local(async move {
                for product in &products {
                    session.track_view(product).await;
                }
            });
        }
    }

    fn notification_changed(&self, flagged: bool) {
        self.has_notification.set(flagged);
        self.render_toggle();
    }

    fn scroll_to_recommendations(&self) {
        let Some(section) = self.document.get_element_by_id(render::RECOMMENDATIONS_SECTION_ID) else {
            return;
        };
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        section.scroll_into_view_with_scroll_into_view_options(&options);
    }
}

/// Routes session events to the page and the storefront coordinator.
/// The view owns the session, so both links back are weak.
struct ChatBridge {
    view: Weak<DomView>,
    storefront: WeakStorefront<TimeoutScheduler>,
}

impl ChatObserver for ChatBridge {
    fn state_changed(&self, state: &ChatState) {
        if let Some(view) = self.view.upgrade() {
            view.render_chat(state);
        }
    }

    fn products_received(&self, products: Vec<Product>) {
        if let Some(storefront) = self.storefront.upgrade() {
            storefront.products_received(products);
        }
    }

    fn reply_arrived(&self) {
        if let Some(storefront) = self.storefront.upgrade() {
            storefront.flag_notification();
        }
    }
}

//! HTML fragments for the storefront widget
//!
//! Pure functions over state; the browser crate inserts the output and wires
//! events by element id, class and `data-*` attributes.

use jewelchat_types::{ChatEntry, Product};

/// Shown when a product image fails to load
pub const FALLBACK_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1599643478518-a784e5dc4c8f?w=400";

pub const RECOMMENDATIONS_SECTION_ID: &str = "recommendationsSection";

/// Escape HTML to prevent XSS
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Format a price in Indian Rupees with lakh/crore grouping and no fraction digits
pub fn format_price(price: f64) -> String {
    if !price.is_finite() {
        return "₹0".to_string();
    }

    let rounded = price.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    // Last three digits form one group, the rest are grouped in pairs
    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 0 {
            let start = end.saturating_sub(2);
            groups.push(&head[start..end]);
            end = start;
        }
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    format!("{}₹{}", sign, grouped)
}

pub fn render_message(entry: &ChatEntry) -> String {
    let mut class = String::from(if entry.from_user { "message user" } else { "message bot" });
    if entry.is_error {
        class.push_str(" error");
    }

    format!(
        r#"<div class="{}"><div class="message-bubble">{}</div></div>"#,
        class,
        escape_html(&entry.text).replace('\n', "<br>")
    )
}

pub fn render_messages(entries: &[ChatEntry]) -> String {
    entries.iter().map(render_message).collect()
}

pub fn render_typing_indicator(typing: bool) -> String {
    if !typing {
        return String::new();
    }
    r#"<div class="typing-dots"><span></span><span></span><span></span></div>"#.to_string()
}

/// Quick-reply buttons, hidden while the bot is typing.
/// Each button carries `data-option-index` into `options`.
pub fn render_quick_replies(options: &[String], typing: bool) -> String {
    if options.is_empty() || typing {
        return String::new();
    }

    options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            format!(
                r#"<button class="quick-reply-btn" data-option-index="{}">{}</button>"#,
                index,
                escape_html(option)
            )
        })
        .collect()
}

/// One product card; `index` drives the staggered entrance animation
pub fn render_product_card(product: &Product, index: usize) -> String {
    let tags: String = product
        .tags()
        .into_iter()
        .map(|tag| format!(r#"<span class="product-tag">{}</span>"#, escape_html(tag)))
        .collect();

    let description = product
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map(|d| format!(r#"<p class="product-description">{}</p>"#, escape_html(d)))
        .unwrap_or_default();

    let image_url = if product.image_url.is_empty() {
        FALLBACK_IMAGE_URL
    } else {
        product.image_url.as_str()
    };

    format!(
        r#"<div class="product-card" data-product-index="{index}" style="animation-delay: {delay:.1}s"><img src="{src}" alt="{alt}" class="product-image"><div class="product-info"><h3 class="product-name">{name}</h3><div class="product-meta">{tags}</div><div class="product-price">{price}</div>{description}</div></div>"#,
        index = index,
        delay = index as f64 * 0.1,
        src = escape_html(image_url),
        alt = escape_html(&product.name),
        name = escape_html(&product.name),
        tags = tags,
        price = format_price(product.price),
        description = description,
    )
}

/// Recommendations section; empty when not visible
pub fn render_products_section(products: &[Product], visible: bool) -> String {
    if !visible {
        return String::new();
    }

    let grid = if products.is_empty() {
        r#"<div class="no-products-message"><p>No products found matching your current filters. Try adjusting your preferences! 💎</p></div>"#.to_string()
    } else {
        products
            .iter()
            .enumerate()
            .map(|(index, product)| render_product_card(product, index))
            .collect()
    };

    format!(
        r#"<div class="container"><h2 class="section-title">Your Personalized Recommendations</h2><div class="products-grid">{}</div></div>"#,
        grid
    )
}

/// Contents of the floating toggle button
pub fn render_chat_toggle(open: bool, has_notification: bool) -> String {
    let (chat_display, close_display) = if open { ("none", "block") } else { ("block", "none") };
    let badge = if has_notification && !open {
        r#"<span class="notification-badge">1</span>"#
    } else {
        ""
    };

    format!(
        r#"<svg class="chat-icon" width="28" height="28" viewBox="0 0 28 28" fill="none" style="display: {}"><path d="M14 2C7.373 2 2 6.82 2 12.8c0 3.445 1.832 6.505 4.667 8.4v4.8l4.4-2.4c1.267.267 2.6.4 3.933.4 6.627 0 12-4.82 12-10.8S20.627 2 14 2z" fill="currentColor"/></svg><svg class="close-icon" width="28" height="28" viewBox="0 0 28 28" fill="none" style="display: {}"><path d="M21 7L7 21M7 7l14 14" stroke="currentColor" stroke-width="2.5" stroke-linecap="round"/></svg>{}"#,
        chat_display, close_display, badge
    )
}

pub fn render_hero() -> String {
    r#"<div class="hero-content"><h1 class="hero-title"><span class="gradient-text">Discover Your Perfect</span><br>Jewelry Match</h1><p class="hero-subtitle">Let our AI assistant guide you to the perfect piece</p><button class="cta-button" id="heroStartChat"><span>Start Your Journey</span></button></div><div class="hero-decoration"><div class="floating-gem gem-1"></div><div class="floating-gem gem-2"></div><div class="floating-gem gem-3"></div></div>"#.to_string()
}

/// Static chat window skeleton; dynamic parts are filled by id
pub fn render_chat_shell() -> String {
    r#"<div class="chatbot-header"><div class="chatbot-header-info"><div class="chatbot-avatar"></div><div><h3 class="chatbot-title">Jewelry Assistant</h3><p class="chatbot-status"><span class="status-dot"></span>Online</p></div></div><button class="chatbot-close" id="chatClose" aria-label="Close Chat">&times;</button></div><div class="chatbot-messages" id="chatMessages"></div><div class="chatbot-typing" id="chatTyping"></div><div class="chatbot-input-area"><input type="text" class="chatbot-input" id="chatInput" placeholder="Type your message..." autocomplete="off"><button class="chatbot-send" id="chatSend" aria-label="Send Message">&#10148;</button></div><div class="quick-replies" id="chatQuickReplies"></div>"#.to_string()
}

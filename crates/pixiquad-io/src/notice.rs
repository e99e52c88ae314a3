//! Blocking user notices.

use dioxus::logger::tracing;

/// Show a modal alert and log it.
///
/// Falls back to logging alone outside a browser window.
pub fn alert(message: &str) {
    tracing::warn!("{message}");
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

//! Toast notifications.

use std::rc::Rc;
use std::time::Duration;

use edge_core::NotificationConfig;
use edge_dom::{escape_text, Dom, DomError, InMemoryDocument, NodeId};

use crate::timer::Delay;

const NOTIFICATION_SELECTOR: &str = ".service-notification";

/// Kind of toast. Selects the class, icon and background colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationKind {
    Success,
    Error,
    #[default]
    Info,
}

impl NotificationKind {
    /// Class added next to `service-notification`.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Success => "✓",
            Self::Error => "✗",
            Self::Info => "ℹ",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Success => "#10b981",
            Self::Error => "#ef4444",
            Self::Info => "#3b82f6",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.class())
    }
}

/// Shows at most one toast at a time, appended to the body.
#[derive(Debug, Clone)]
pub struct Notifier {
    dom: Rc<InMemoryDocument>,
    dismiss_after: Duration,
}

impl Notifier {
    pub fn new(dom: Rc<InMemoryDocument>, config: &NotificationConfig) -> Self {
        Self {
            dom,
            dismiss_after: Duration::from_millis(config.dismiss_after_ms),
        }
    }

    /// How long a toast stays before `auto_dismiss` removes it.
    pub fn dismiss_after(&self) -> Duration {
        self.dismiss_after
    }

    /// Replace any current toast with a new one. Returns the toast element.
    pub fn show(&self, message: &str, kind: NotificationKind) -> Result<NodeId, DomError> {
        self.dismiss()?;

        let markup = format!(
            concat!(
                r#"<div class="service-notification {kind}" style="{style}">"#,
                r#"<div class="notification-content" style="display: flex; align-items: center; gap: 1rem;">"#,
                r#"<span class="notification-icon" style="font-weight: bold; font-size: 1.2rem;">{icon}</span>"#,
                r#"<span class="notification-message" style="flex: 1; font-weight: 500;">{message}</span>"#,
                r#"<button class="notification-close">&times;</button>"#,
                "</div></div>"
            ),
            kind = kind.class(),
            style = container_style(kind),
            icon = kind.icon(),
            message = escape_text(message),
        );

        self.dom.append_element(self.dom.body(), &markup)
    }

    /// Remove the current toast. Returns whether one was present.
    pub fn dismiss(&self) -> Result<bool, DomError> {
        match self.dom.query_selector(NOTIFICATION_SELECTOR)? {
            Some(existing) => {
                self.dom.remove(existing)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Wait out the display time, then remove `toast` if it is still shown.
    pub async fn auto_dismiss(&self, toast: NodeId, delay: &dyn Delay) -> Result<bool, DomError> {
        delay.sleep(self.dismiss_after).await;
        if !self.dom.contains(toast) {
            return Ok(false);
        }
        self.dom.remove(toast)?;
        Ok(true)
    }

    /// Message text of the current toast.
    pub fn current_message(&self) -> Result<Option<String>, DomError> {
        let Some(toast) = self.dom.query_selector(NOTIFICATION_SELECTOR)? else {
            return Ok(None);
        };
        match self.dom.query_selector_in(toast, ".notification-message")? {
            Some(message) => Ok(Some(self.dom.text_content(message)?)),
            None => Ok(None),
        }
    }
}

fn container_style(kind: NotificationKind) -> String {
    format!(
        "position: fixed; top: 90px; right: 20px; background: {}; color: white; \
         padding: 1rem 1.5rem; border-radius: 12px; box-shadow: 0 10px 30px rgba(0, 0, 0, 0.2); \
         z-index: 10000; transform: translateX(0); max-width: 400px; min-width: 300px;",
        kind.color()
    )
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::timer::RecordingDelay;

    fn notifier() -> Notifier {
        let dom = Rc::new(InMemoryDocument::parse("<body><main></main></body>"));
        Notifier::new(dom, &NotificationConfig::default())
    }

    #[test]
    fn test_show_appends_styled_toast() {
        let notifier = notifier();
        let toast = notifier.show("saved", NotificationKind::Success).unwrap();
        let dom = &notifier.dom;

        assert_eq!(dom.parent(toast), Some(dom.body()));
        assert!(dom.has_class(toast, "service-notification").unwrap());
        assert!(dom.has_class(toast, "success").unwrap());
        assert_eq!(dom.style(toast, "background").unwrap().as_deref(), Some("#10b981"));

        let icon = dom.query_selector_in(toast, ".notification-icon").unwrap().unwrap();
        assert_eq!(dom.text_content(icon).unwrap(), "✓");
        assert_eq!(notifier.current_message().unwrap().as_deref(), Some("saved"));
    }

    #[test]
    fn test_show_replaces_previous_toast() {
        let notifier = notifier();
        let first = notifier.show("first", NotificationKind::Error).unwrap();
        notifier.show("second", NotificationKind::Info).unwrap();

        assert!(!notifier.dom.contains(first));
        assert_eq!(
            notifier
                .dom
                .query_selector_all(".service-notification")
                .unwrap()
                .len(),
            1
        );
        assert_eq!(notifier.current_message().unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_message_is_escaped() {
        let notifier = notifier();
        notifier.show("<b>hi</b>", NotificationKind::Info).unwrap();

        assert!(notifier.dom.query_selector("b").unwrap().is_none());
        assert_eq!(notifier.current_message().unwrap().as_deref(), Some("<b>hi</b>"));
    }

    #[test]
    fn test_dismiss() {
        let notifier = notifier();
        assert!(!notifier.dismiss().unwrap());
        notifier.show("x", NotificationKind::Info).unwrap();
        assert!(notifier.dismiss().unwrap());
        assert_eq!(notifier.current_message().unwrap(), None);
    }

    #[test]
    fn test_auto_dismiss_waits_configured_time() {
        let notifier = notifier();
        let delay = RecordingDelay::new();
        let toast = notifier.show("x", NotificationKind::Info).unwrap();

        assert!(block_on(notifier.auto_dismiss(toast, &delay)).unwrap());
        assert_eq!(delay.requested(), [Duration::from_millis(6000)]);
        assert!(!notifier.dom.contains(toast));
    }

    #[test]
    fn test_auto_dismiss_skips_replaced_toast() {
        let notifier = notifier();
        let delay = RecordingDelay::new();
        let old = notifier.show("old", NotificationKind::Info).unwrap();
        notifier.show("new", NotificationKind::Info).unwrap();

        assert!(!block_on(notifier.auto_dismiss(old, &delay)).unwrap());
        assert_eq!(notifier.current_message().unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn test_kind_palette() {
        assert_eq!(NotificationKind::Error.icon(), "✗");
        assert_eq!(NotificationKind::Error.color(), "#ef4444");
        assert_eq!(NotificationKind::Info.icon(), "ℹ");
        assert_eq!(NotificationKind::default(), NotificationKind::Info);
    }
}

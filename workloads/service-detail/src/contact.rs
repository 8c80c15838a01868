//! Contact form bound to the injected contact section.

use std::rc::Rc;
use std::sync::OnceLock;
use std::time::Duration;

use edge_core::ServicePageConfig;
use edge_dom::{Dom, DomError, InMemoryDocument, NodeId};
use edge_observability::{DiagnosticSink, LogBuilder, LogLevel};
use regex::Regex;

use crate::notification::{NotificationKind, Notifier};
use crate::timer::Delay;

pub const INVALID_EMAIL_MESSAGE: &str = "올바른 이메일 주소를 입력해주세요.";
pub const INCOMPLETE_FORM_MESSAGE: &str = "모든 필수 항목을 정확히 입력해주세요.";
pub const SUBMITTED_MESSAGE: &str =
    "문의사항이 성공적으로 전송되었습니다! 빠른 시일 내에 연락드리겠습니다.";
pub const SENDING_LABEL: &str = "전송 중...";

pub const ERROR_BORDER: &str = "#ef4444";
pub const DEFAULT_BORDER: &str = "var(--border-color)";
pub const SENDING_BACKGROUND: &str = "var(--secondary-color)";
pub const READY_BACKGROUND: &str = "var(--gradient-primary)";

const INITIALIZED_ATTR: &str = "data-initialized";
const REQUIRED_FIELDS: &str = "input[required], select[required], textarea[required]";
const EMAIL_FIELD: &str = r#"input[type="email"]"#;
const SUBMIT_BUTTON: &str = r#"button[type="submit"]"#;

static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();

/// `something@something.something` with no whitespace or extra `@`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
        .is_match(email)
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation passed and the simulated send completed.
    Submitted,
    /// Fields that failed validation, in document order.
    Rejected { invalid_fields: Vec<NodeId> },
    /// A previous submission is still sending.
    Busy,
}

/// Validation and simulated submission for the service contact form.
pub struct ContactForm {
    dom: Rc<InMemoryDocument>,
    form: NodeId,
    notifier: Notifier,
    sink: Rc<dyn DiagnosticSink>,
    submit_delay: Duration,
}

impl std::fmt::Debug for ContactForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactForm")
            .field("form", &self.form)
            .field("submit_delay", &self.submit_delay)
            .finish_non_exhaustive()
    }
}

impl ContactForm {
    /// Bind the form matching `config.form_selector`.
    ///
    /// Marks the form `data-initialized="true"`. Returns `None` when there is
    /// no form or it was already bound.
    pub fn initialize(
        dom: Rc<InMemoryDocument>,
        config: &ServicePageConfig,
        notifier: Notifier,
        sink: Rc<dyn DiagnosticSink>,
    ) -> Result<Option<Self>, DomError> {
        let Some(form) = dom.query_selector(&config.form_selector)? else {
            return Ok(None);
        };
        if dom.has_attribute(form, INITIALIZED_ATTR)? {
            return Ok(None);
        }
        dom.set_attribute(form, INITIALIZED_ATTR, "true")?;

        LogBuilder::new(sink.as_ref(), LogLevel::Debug, "Contact form initialized")
            .component("contact-form")
            .field("selector", config.form_selector.as_str())
            .emit();

        Ok(Some(Self {
            dom,
            form,
            notifier,
            sink,
            submit_delay: Duration::from_millis(config.submit_delay_ms),
        }))
    }

    /// The bound form element.
    pub fn node(&self) -> NodeId {
        self.form
    }

    /// Field with the given `name` attribute.
    pub fn field(&self, name: &str) -> Result<Option<NodeId>, DomError> {
        self.dom
            .query_selector_in(self.form, &format!(r#"[name="{}"]"#, name))
    }

    /// Check required fields and the email rule, marking failures.
    pub fn validate(&self) -> Result<Vec<NodeId>, DomError> {
        let mut invalid = Vec::new();

        for field in self.dom.query_selector_all_in(self.form, REQUIRED_FIELDS)? {
            if self.dom.value(field)?.trim().is_empty() {
                self.dom.set_style(field, "border-color", ERROR_BORDER)?;
                invalid.push(field);
            }
        }

        if let Some(email) = self.dom.query_selector_in(self.form, EMAIL_FIELD)? {
            if !is_valid_email(&self.dom.value(email)?) {
                self.dom.set_style(email, "border-color", ERROR_BORDER)?;
                self.notifier.show(INVALID_EMAIL_MESSAGE, NotificationKind::Error)?;
                if !invalid.contains(&email) {
                    invalid.push(email);
                }
            }
        }

        Ok(invalid)
    }

    /// Validate, then simulate sending.
    ///
    /// The submit button shows the sending label and is disabled while
    /// `delay` runs; afterwards the form is reset and the button restored.
    pub async fn submit(&self, delay: &dyn Delay) -> Result<SubmitOutcome, DomError> {
        let button = self.dom.query_selector_in(self.form, SUBMIT_BUTTON)?;
        if let Some(button) = button {
            if self.dom.has_attribute(button, "disabled")? {
                return Ok(SubmitOutcome::Busy);
            }
        }

        let invalid_fields = self.validate()?;
        if !invalid_fields.is_empty() {
            self.notifier
                .show(INCOMPLETE_FORM_MESSAGE, NotificationKind::Error)?;
            LogBuilder::warn(self.sink.as_ref(), "Contact form rejected")
                .component("contact-form")
                .field_i64("invalid_fields", invalid_fields.len() as i64)
                .emit();
            return Ok(SubmitOutcome::Rejected { invalid_fields });
        }

        let original_label = match button {
            Some(button) => {
                let label = self.dom.text_content(button)?;
                self.dom.set_text_content(button, SENDING_LABEL)?;
                self.dom.set_attribute(button, "disabled", "")?;
                self.dom.set_style(button, "background", SENDING_BACKGROUND)?;
                Some((button, label))
            }
            None => None,
        };

        delay.sleep(self.submit_delay).await;

        self.notifier
            .show(SUBMITTED_MESSAGE, NotificationKind::Success)?;
        self.dom.reset(self.form)?;
        if let Some((button, label)) = original_label {
            self.dom.set_text_content(button, &label)?;
            self.dom.remove_attribute(button, "disabled")?;
            self.dom.set_style(button, "background", READY_BACKGROUND)?;
        }

        LogBuilder::info(self.sink.as_ref(), "Contact form submitted")
            .component("contact-form")
            .duration_ms("delay_ms", self.submit_delay)
            .emit();
        Ok(SubmitOutcome::Submitted)
    }

    /// Remove the error border from `field` once the user edits it.
    pub fn clear_error(&self, field: NodeId) -> Result<(), DomError> {
        self.dom.set_style(field, "border-color", DEFAULT_BORDER)
    }
}

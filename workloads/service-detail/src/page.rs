//! Service page bootstrap.

use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use edge_components::{BatchError, ComponentLoader, LoadError, LoadOutcome};
use edge_core::SiteConfig;
use edge_data::{Retriever, SpinRetriever};
use edge_dom::{Dom, DomError, InMemoryDocument, NodeId};
use edge_observability::{DiagnosticSink, LogBuilder, StructuredLogger};

use crate::contact::{ContactForm, SubmitOutcome};
use crate::counters::animate_counters;
use crate::notification::Notifier;
use crate::timer::{Delay, TokioDelay};

/// Loader wired to shared page capabilities.
pub type PageLoader = ComponentLoader<Rc<dyn Retriever>, Rc<InMemoryDocument>, Rc<dyn DiagnosticSink>>;

/// What `on_ready` did.
#[derive(Debug)]
pub struct ReadyReport {
    /// Result of the configured `[loader] components`, if any were listed.
    pub components: Option<Result<(), BatchError>>,
    /// Result of the contact section load. `None` off service pages.
    pub contact: Option<Result<LoadOutcome, LoadError>>,
    /// Contact form bound by this call.
    pub form: Option<ContactForm>,
}

/// Service detail page.
pub struct ServicePage {
    config: SiteConfig,
    dom: Rc<InMemoryDocument>,
    loader: PageLoader,
    sink: Rc<dyn DiagnosticSink>,
    delay: Rc<dyn Delay>,
}

impl ServicePage {
    pub fn new(
        config: SiteConfig,
        dom: Rc<InMemoryDocument>,
        retriever: Rc<dyn Retriever>,
        sink: Rc<dyn DiagnosticSink>,
        delay: Rc<dyn Delay>,
    ) -> Self {
        let loader = ComponentLoader::new(retriever, Rc::clone(&dom), Rc::clone(&sink));
        Self {
            config,
            dom,
            loader,
            sink,
            delay,
        }
    }

    /// Build a page that fetches over Spin HTTP, logs through `tracing` and
    /// waits on tokio timers.
    pub fn from_config(config: SiteConfig, dom: Rc<InMemoryDocument>) -> Result<Self> {
        config.validate()?;
        let logger = StructuredLogger::from_config(&config.logging)
            .context("Invalid [logging] settings")?
            .with_component("service-detail");

        let mut retriever = SpinRetriever::new();
        if let Some(base_url) = &config.loader.base_url {
            retriever = retriever.with_base_url(base_url.as_str());
        }

        Ok(Self::new(
            config,
            dom,
            Rc::new(retriever),
            Rc::new(logger),
            Rc::new(TokioDelay),
        ))
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn dom(&self) -> &Rc<InMemoryDocument> {
        &self.dom
    }

    pub fn loader(&self) -> &PageLoader {
        &self.loader
    }

    pub fn notifier(&self) -> Notifier {
        Notifier::new(Rc::clone(&self.dom), &self.config.notifications)
    }

    /// Body carries the service page class, or the hero marker is present.
    pub fn is_service_page(&self) -> Result<bool, DomError> {
        let service_page = &self.config.service_page;
        let body = self.dom.body();
        if body != NodeId::ROOT && self.dom.has_class(body, &service_page.body_class)? {
            return Ok(true);
        }
        Ok(self.dom.query_selector(&service_page.marker_selector)?.is_some())
    }

    /// Load configured components, then on service pages load the contact
    /// section and bind its form.
    ///
    /// The form is bound after the contact load settles, whether or not it
    /// succeeded.
    pub async fn on_ready(&self) -> Result<ReadyReport, DomError> {
        let components = if self.config.loader.components.is_empty() {
            None
        } else {
            Some(
                self.loader
                    .load_many(self.config.loader.components.clone())
                    .await,
            )
        };

        if !self.is_service_page()? {
            return Ok(ReadyReport {
                components,
                contact: None,
                form: None,
            });
        }

        let service_page = &self.config.service_page;
        let contact = self
            .loader
            .load(
                service_page.contact_fragment.as_str(),
                service_page.contact_target.as_str(),
            )
            .await;

        let form = ContactForm::initialize(
            Rc::clone(&self.dom),
            service_page,
            self.notifier(),
            Rc::clone(&self.sink),
        )?;

        LogBuilder::info(self.sink.as_ref(), "Service detail page loaded successfully")
            .component("service-detail")
            .field_bool("contact_loaded", contact.is_ok())
            .field_bool("form_bound", form.is_some())
            .emit();

        Ok(ReadyReport {
            components,
            contact: Some(contact),
            form,
        })
    }

    /// Animate the page's stat counters at the configured tick.
    pub async fn animate_counters(&self) -> Result<usize, DomError> {
        let tick = Duration::from_millis(self.config.service_page.counter_tick_ms);
        animate_counters(&self.dom, self.delay.as_ref(), tick).await
    }

    /// Submit a bound contact form using the page timer.
    pub async fn submit(&self, form: &ContactForm) -> Result<SubmitOutcome, DomError> {
        form.submit(self.delay.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use edge_components::{CacheStatus, ComponentLoadedDetail, Injection, COMPONENT_LOADED};
    use edge_core::LoadRequest;
    use edge_data::StaticRetriever;
    use edge_observability::RecordingSink;
    use futures::executor::block_on;

    use super::*;
    use crate::timer::RecordingDelay;

    const CONTACT: &str = "components/contact-section.html";
    const CONTACT_MARKUP: &str = concat!(
        r#"<section id="contact" class="contact-section">"#,
        r#"<form class="service-contact-form">"#,
        r#"<input type="email" name="email" required>"#,
        r#"<button type="submit">보내기</button>"#,
        "</form></section>"
    );

    struct Harness {
        page: ServicePage,
        retriever: Rc<StaticRetriever>,
        sink: Rc<RecordingSink>,
        delay: Rc<RecordingDelay>,
    }

    fn harness(markup: &str, retriever: StaticRetriever, config: SiteConfig) -> Harness {
        let retriever = Rc::new(retriever);
        let sink = Rc::new(RecordingSink::new());
        let delay = Rc::new(RecordingDelay::new());
        let page = ServicePage::new(
            config,
            Rc::new(InMemoryDocument::parse(markup)),
            retriever.clone(),
            sink.clone(),
            delay.clone(),
        );
        Harness {
            page,
            retriever,
            sink,
            delay,
        }
    }

    fn service_page(retriever: StaticRetriever) -> Harness {
        harness(
            r#"<body class="service-page"><div id="contact-placeholder"></div></body>"#,
            retriever,
            SiteConfig::default(),
        )
    }

    #[test]
    fn test_service_page_detection() {
        let by_class = service_page(StaticRetriever::new());
        assert!(by_class.page.is_service_page().unwrap());

        let by_marker = harness(
            r#"<body><section class="service-hero"><h1>웹 개발</h1></section></body>"#,
            StaticRetriever::new(),
            SiteConfig::default(),
        );
        assert!(by_marker.page.is_service_page().unwrap());

        let other = harness("<body class=\"home\"></body>", StaticRetriever::new(), SiteConfig::default());
        assert!(!other.page.is_service_page().unwrap());

        let bare = harness("<p>fragment</p>", StaticRetriever::new(), SiteConfig::default());
        assert!(!bare.page.is_service_page().unwrap());
    }

    #[test]
    fn test_on_ready_loads_contact_and_binds_form() {
        let h = service_page(StaticRetriever::new().with_fragment(CONTACT, CONTACT_MARKUP));

        let report = block_on(h.page.on_ready()).unwrap();

        let outcome = report.contact.unwrap().unwrap();
        assert!(matches!(outcome.injection, Injection::Injected { .. }));
        let form = report.form.unwrap();
        assert_eq!(
            h.page
                .dom()
                .attribute(form.node(), "data-initialized")
                .unwrap()
                .as_deref(),
            Some("true")
        );

        let signals = h.page.dom().dispatched_named(COMPONENT_LOADED);
        assert_eq!(signals.len(), 1);
        assert_eq!(
            ComponentLoadedDetail::from_signal(&signals[0].signal),
            Some(ComponentLoadedDetail::new("#contact-placeholder"))
        );
        assert_eq!(h.retriever.calls(CONTACT), 1);
        assert!(h
            .sink
            .entries()
            .iter()
            .any(|e| e.message == "Service detail page loaded successfully"));
    }

    #[test]
    fn test_on_ready_twice_serves_contact_from_cache() {
        let h = service_page(StaticRetriever::new().with_fragment(CONTACT, CONTACT_MARKUP));

        let first = block_on(h.page.on_ready()).unwrap();
        assert!(first.form.is_some());
        let second = block_on(h.page.on_ready()).unwrap();

        assert_eq!(second.contact.unwrap().unwrap().cache, CacheStatus::Hit);
        // Re-injection replaces the form, so the fresh one is bound again.
        assert!(second.form.is_some());
        assert_eq!(h.retriever.calls(CONTACT), 1);
    }

    #[test]
    fn test_failed_contact_load_still_initializes() {
        let h = harness(
            concat!(
                r#"<body class="service-page"><div id="contact-placeholder"></div>"#,
                r#"<form class="service-contact-form"></form></body>"#
            ),
            StaticRetriever::new().with_status(CONTACT, 404),
            SiteConfig::default(),
        );

        let report = block_on(h.page.on_ready()).unwrap();

        assert!(matches!(
            report.contact,
            Some(Err(LoadError::Retrieval { .. }))
        ));
        assert!(report.form.is_some());
        assert_eq!(h.sink.errors().len(), 1);
    }

    #[test]
    fn test_missing_form_is_not_an_error() {
        let h = service_page(StaticRetriever::new().with_fragment(CONTACT, "<p>곧 제공됩니다</p>"));

        let report = block_on(h.page.on_ready()).unwrap();
        assert!(report.contact.unwrap().is_ok());
        assert!(report.form.is_none());
    }

    #[test]
    fn test_other_pages_fetch_nothing() {
        let h = harness(
            "<body><div id=\"contact-placeholder\"></div></body>",
            StaticRetriever::new().with_fragment(CONTACT, CONTACT_MARKUP),
            SiteConfig::default(),
        );

        let report = block_on(h.page.on_ready()).unwrap();

        assert!(report.contact.is_none());
        assert!(report.components.is_none());
        assert_eq!(h.retriever.total_calls(), 0);
    }

    #[test]
    fn test_configured_components_load_first() {
        let mut config = SiteConfig::default();
        config.loader.components = vec![
            LoadRequest::new("components/header.html", "#header"),
            LoadRequest::new("components/footer.html", "#footer"),
        ];
        let h = harness(
            r#"<body><div id="header"></div><div id="footer"></div></body>"#,
            StaticRetriever::new()
                .with_fragment("components/header.html", "<nav></nav>")
                .with_fragment("components/footer.html", "<footer></footer>"),
            config,
        );

        let report = block_on(h.page.on_ready()).unwrap();

        assert_eq!(report.components, Some(Ok(())));
        let dom = h.page.dom();
        assert!(dom.query_selector("#header nav").unwrap().is_some());
        assert!(dom.query_selector("#footer footer").unwrap().is_some());
    }

    #[test]
    fn test_submit_uses_page_delay() {
        let h = service_page(StaticRetriever::new().with_fragment(CONTACT, CONTACT_MARKUP));
        let form = block_on(h.page.on_ready()).unwrap().form.unwrap();
        let email = form.field("email").unwrap().unwrap();
        h.page.dom().set_value(email, "client@example.com").unwrap();

        let outcome = block_on(h.page.submit(&form)).unwrap();

        assert_eq!(outcome, SubmitOutcome::Submitted);
        assert_eq!(h.delay.requested(), [Duration::from_millis(2500)]);
    }

    #[test]
    fn test_animate_counters_uses_configured_tick() {
        let mut config = SiteConfig::default();
        config.service_page.counter_tick_ms = 10;
        let h = harness(
            r#"<body><div class="stat-card"><h3>500+</h3></div></body>"#,
            StaticRetriever::new(),
            config,
        );

        assert_eq!(block_on(h.page.animate_counters()).unwrap(), 1);
        assert_eq!(h.delay.requested()[0], Duration::from_millis(10));
    }

    #[test]
    fn test_from_config_rejects_bad_logging() {
        let mut config = SiteConfig::default();
        config.logging.level = "loud".to_string();
        let dom = Rc::new(InMemoryDocument::new());

        let err = ServicePage::from_config(config, dom).err().unwrap();
        assert!(err.to_string().contains("[logging]"));
    }

    #[test]
    fn test_from_config_defaults() {
        let page = ServicePage::from_config(SiteConfig::default(), Rc::new(InMemoryDocument::new()))
            .unwrap();
        assert_eq!(page.notifier().dismiss_after(), Duration::from_millis(6000));
    }
}

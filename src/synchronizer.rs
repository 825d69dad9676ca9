use std::time::Duration;

use instant::Instant;
use log::{debug, info, warn};

use crate::config::{GaugeConfig, Selector};
use crate::dom::{DomMutation, GaugeDom};
use crate::pearl::{PearlContent, PearlReading, extract_pearl_content};
use crate::style::{BASE_STYLE, Polarity, evaluation_style};


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    // Waiting for the first gauge container to appear.
    Initializing { attempts: u32, since: Instant },
    Active,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitOutcome {
    Activated,
    RetryAfter(Duration),
    AlreadyActive,
}

// Mirrors the evaluation shown in pearls into a display element inside every gauge container.
//
// Two change feeds drive it: structure changes anywhere in the document (`on_structure_change`)
// and content changes inside known pearls (`on_content_change`). Both write through the caches
// below, which are rebuilt wholesale on every relevant structure change. Entries for elements
// removed from the page stay in the caches until then; writing to a detached element is harmless.
pub struct GaugeSynchronizer<D: GaugeDom> {
    dom: D,
    config: GaugeConfig,
    sources: Vec<D::Element>,
    displays: Vec<D::Element>,
    watched_sources: Vec<D::Element>,
    state: LifecycleState,
}

impl<D: GaugeDom> GaugeSynchronizer<D> {
    pub fn new(dom: D, config: GaugeConfig) -> Self {
        GaugeSynchronizer {
            dom,
            config,
            sources: Vec::new(),
            displays: Vec::new(),
            watched_sources: Vec::new(),
            state: LifecycleState::Uninitialized,
        }
    }

    pub fn dom(&self) -> &D { &self.dom }
    pub fn config(&self) -> &GaugeConfig { &self.config }
    pub fn state(&self) -> LifecycleState { self.state }
    pub fn is_active(&self) -> bool { self.state == LifecycleState::Active }
    pub fn sources(&self) -> &[D::Element] { &self.sources }
    pub fn displays(&self) -> &[D::Element] { &self.displays }

    // Performs first-time setup once at least one gauge container exists. Until then asks the
    // caller to try again later.
    pub fn try_initialize(&mut self) -> Result<InitOutcome, D::Error> {
        let (attempts, since) = match self.state {
            LifecycleState::Active => return Ok(InitOutcome::AlreadyActive),
            LifecycleState::Uninitialized => (0, Instant::now()),
            LifecycleState::Initializing { attempts, since } => (attempts, since),
        };
        let attempts = attempts + 1;
        self.refresh_caches()?;
        let gauges = self.dom.query_all(&self.config.gauge_selector())?;
        if gauges.is_empty() {
            self.state = LifecycleState::Initializing { attempts, since };
            debug!("No evaluation gauges yet (attempt {attempts})");
            return Ok(InitOutcome::RetryAfter(self.config.init_retry_delay));
        }
        self.create_displays()?;
        self.dom.watch_structure()?;
        self.watch_sources()?;
        self.state = LifecycleState::Active;
        info!(
            "Evaluation gauge active: {} gauge(s), {} pearl(s), attempt {}, {:?} after start",
            gauges.len(),
            self.sources.len(),
            attempts,
            since.elapsed(),
        );
        Ok(InitOutcome::Activated)
    }

    pub fn current_content(&self) -> PearlContent {
        extract_pearl_content(
            self.sources.iter().map(|source| PearlReading {
                markup: self.dom.inner_markup(source),
                text: self.dom.text_content(source),
            }),
            &self.config.loading_marker,
        )
    }

    pub fn refresh_caches(&mut self) -> Result<(), D::Error> {
        self.sources = self.dom.query_all(&self.config.pearl_selector())?;
        self.displays = self.dom.query_all(&self.config.display_selector())?;
        Ok(())
    }

    // Idempotent: a container that already has a display only gets restyled.
    pub fn create_displays(&mut self) -> Result<(), D::Error> {
        let gauges = self.dom.query_all(&self.config.gauge_selector())?;
        if gauges.is_empty() {
            return Ok(());
        }
        let display_selector = self.config.display_selector();
        let content = self.current_content();
        for gauge in gauges {
            let display = match self.dom.query_within(&gauge, &display_selector)? {
                Some(display) => {
                    if !self.displays.contains(&display) {
                        self.displays.push(display.clone());
                    }
                    display
                }
                None => {
                    let display = self.dom.create_element(&self.config.display_id)?;
                    for (property, value) in BASE_STYLE {
                        self.dom.set_style(&display, property, value)?;
                    }
                    self.dom.set_text(&display, &content.display)?;
                    self.dom.append_child(&gauge, &display)?;
                    self.displays.push(display.clone());
                    debug!("Created evaluation display in {gauge:?}");
                    display
                }
            };
            self.apply_style(&display, content.polarity)?;
        }
        Ok(())
    }

    // The reverse modifier is read from the display's container, so a display that has been
    // detached from the page is left untouched.
    pub fn apply_style(&self, display: &D::Element, polarity: Polarity) -> Result<(), D::Error> {
        let Some(container) = self.dom.parent(display) else {
            return Ok(());
        };
        let reversed = self.dom.has_class(&container, &self.config.reverse_class);
        let style = evaluation_style(polarity, reversed, &self.config.palette);
        for (property, value) in style.properties() {
            self.dom.set_style(display, property, value)?;
        }
        Ok(())
    }

    // All displays mirror the same authoritative pearl.
    pub fn propagate(&self) -> Result<(), D::Error> {
        let content = self.current_content();
        for display in &self.displays {
            self.dom.set_text(display, &content.display)?;
            self.apply_style(display, content.polarity)?;
        }
        Ok(())
    }

    pub fn on_structure_change(
        &mut self, batch: &[DomMutation<D::Element>],
    ) -> Result<(), D::Error> {
        if !self.is_active() {
            return Ok(());
        }
        let gauge_selector = self.config.gauge_selector();
        let mut needs_refresh = false;
        for mutation in batch {
            match mutation {
                DomMutation::Attributes { target, .. } => {
                    if mutation.is_class_change() && self.dom.matches(target, &gauge_selector)? {
                        self.restyle_container(target)?;
                    }
                }
                DomMutation::ChildList { added, removed } => {
                    if !needs_refresh {
                        needs_refresh = self.any_relevant(added.iter().chain(removed))?;
                    }
                }
                DomMutation::CharacterData { .. } => {}
            }
        }
        if needs_refresh {
            self.refresh_caches()?;
            self.create_displays()?;
            self.watch_sources()?;
            self.propagate()?;
            debug!(
                "Gauge structure changed: {} pearl(s), {} display(s)",
                self.sources.len(),
                self.displays.len()
            );
        }
        Ok(())
    }

    pub fn on_content_change(&self) -> Result<(), D::Error> {
        if !self.is_active() {
            return Ok(());
        }
        self.propagate()
    }

    // Double-clicking a gauge toggles computer evaluation. Returns whether the toggle was found.
    pub fn on_double_click(&self, target: &D::Element) -> Result<bool, D::Error> {
        if !self.dom.matches(target, &self.config.gauge_selector())? {
            return Ok(false);
        }
        let label = self.config.toggle_label_selector();
        let clicked = self.dom.click(&label)?;
        if !clicked {
            warn!("Cannot find evaluation toggle \"{label}\"");
        }
        Ok(clicked)
    }

    fn restyle_container(&self, container: &D::Element) -> Result<(), D::Error> {
        if let Some(display) = self.dom.query_within(container, &self.config.display_selector())? {
            self.apply_style(&display, self.current_content().polarity)?;
        }
        Ok(())
    }

    fn any_relevant<'a>(
        &self, nodes: impl IntoIterator<Item = &'a D::Element>,
    ) -> Result<bool, D::Error>
    where
        D::Element: 'a,
    {
        let selectors = [self.config.gauge_selector(), self.config.pearl_selector()];
        for node in nodes {
            if self.is_relevant(node, &selectors)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn is_relevant(&self, node: &D::Element, selectors: &[Selector]) -> Result<bool, D::Error> {
        for selector in selectors {
            if self.dom.matches(node, selector)? || self.dom.contains_match(node, selector)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // Pearls that left the page are forgotten, so they get subscribed again if they come back.
    fn watch_sources(&mut self) -> Result<(), D::Error> {
        self.watched_sources.retain(|source| self.sources.contains(source));
        for source in &self.sources {
            if !self.watched_sources.contains(source) {
                self.dom.watch_content(source)?;
                self.watched_sources.push(source.clone());
            }
        }
        Ok(())
    }
}

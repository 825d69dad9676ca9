#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

extern crate console_error_panic_hook;
extern crate wasm_bindgen;

extern crate eval_gauge;

pub mod web_document;
pub mod web_element_ext;
pub mod web_error_handling;
pub mod web_gauge_dom;
pub mod web_iterators;
pub mod web_logger;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use eval_gauge::{GaugeConfig, GaugeSynchronizer, InitOutcome};
use log::{LevelFilter, error, warn};
use wasm_bindgen::prelude::*;

use crate::web_document::{web_document, web_window};
use crate::web_element_ext::EventTargetExt;
use crate::web_error_handling::{JsResult, describe_js_error, set_panic_hook};
use crate::web_gauge_dom::{WebGaugeDom, mutations_from_records};
use crate::web_logger::init_logger;


type WebSynchronizer = GaugeSynchronizer<WebGaugeDom>;

// One per page. Callbacks are serialized by the browser, but a callback can still fire while
// another one holds the synchronizer if it's dispatched synchronously, hence `try_borrow_mut`.
#[derive(Clone)]
struct SharedSynchronizer {
    synchronizer: Rc<RefCell<Option<WebSynchronizer>>>,
    retry_scheduled: Rc<Cell<bool>>,
    // Used when an attempt could not tell how long to wait.
    retry_delay: Duration,
}

impl SharedSynchronizer {
    fn new(retry_delay: Duration) -> Self {
        SharedSynchronizer {
            synchronizer: Rc::new(RefCell::new(None)),
            retry_scheduled: Rc::new(Cell::new(false)),
            retry_delay,
        }
    }

    fn set(&self, synchronizer: WebSynchronizer) {
        *self.synchronizer.borrow_mut() = Some(synchronizer);
    }

    fn with(&self, what: &str, f: impl FnOnce(&mut WebSynchronizer) -> JsResult<()>) {
        let Ok(mut guard) = self.synchronizer.try_borrow_mut() else {
            warn!("Skipping {what}: evaluation gauge is busy");
            return;
        };
        let Some(synchronizer) = guard.as_mut() else {
            return;
        };
        if let Err(err) = f(synchronizer) {
            error!("Evaluation gauge {what} failed: {}", describe_js_error(&err));
        }
    }
}

// Entry point. `config_json` may override any subset of `GaugeConfig` fields.
#[wasm_bindgen]
pub fn install_eval_gauge(config_json: Option<String>) -> JsResult<()> {
    set_panic_hook();
    init_logger(LevelFilter::Info);
    let config = match config_json {
        Some(json) => GaugeConfig::from_json(&json)
            .map_err(|err| rust_error!("Invalid evaluation gauge config: {err}"))?,
        None => GaugeConfig::default(),
    };
    install(config)
}

fn install(config: GaugeConfig) -> JsResult<()> {
    let document = web_document()?;
    let shared = SharedSynchronizer::new(config.init_retry_delay);
    let structure_observer = new_observer(&shared, "structure update", |sync, records| {
        sync.on_structure_change(&mutations_from_records(records))
    })?;
    let content_observer =
        new_observer(&shared, "content update", |sync, _| sync.on_content_change())?;
    let dom = WebGaugeDom::new(document.clone(), structure_observer, content_observer);
    shared.set(GaugeSynchronizer::new(dom, config));

    if document.is_loading() {
        let on_ready = shared.clone();
        document.raw().add_event_listener_and_forget(
            "DOMContentLoaded",
            move |_: web_sys::Event| {
                initialize(&on_ready, false);
                Ok(())
            },
        )?;
    } else {
        initialize(&shared, false);
    }

    // In case the page is assembled dynamically and the gauges show up late.
    let on_load = shared.clone();
    web_window()?.add_event_listener_and_forget("load", move |_: web_sys::Event| {
        initialize(&on_load, false);
        Ok(())
    })?;

    let on_double_click = shared;
    document.raw().add_event_listener_and_forget("dblclick", move |event: web_sys::Event| {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        else {
            return Ok(());
        };
        on_double_click.with("double click", |sync| sync.on_double_click(&target).map(|_| ()));
        Ok(())
    })?;
    Ok(())
}

fn new_observer(
    shared: &SharedSynchronizer, what: &'static str,
    on_records: impl Fn(&mut WebSynchronizer, &js_sys::Array) -> JsResult<()> + 'static,
) -> JsResult<web_sys::MutationObserver> {
    let shared = shared.clone();
    let closure = Closure::<dyn FnMut(js_sys::Array, web_sys::MutationObserver)>::new(
        move |records: js_sys::Array, _observer: web_sys::MutationObserver| {
            shared.with(what, |sync| on_records(sync, &records));
        },
    );
    let observer = web_sys::MutationObserver::new(closure.as_ref().unchecked_ref())?;
    // The observers live as long as the page.
    closure.forget();
    Ok(observer)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InitAttempt {
    // The synchronizer was borrowed by another callback.
    Busy,
    Finished(InitOutcome),
    Failed,
}

fn next_retry(attempt: InitAttempt, retry_delay: Duration) -> Option<Duration> {
    match attempt {
        InitAttempt::Finished(InitOutcome::RetryAfter(delay)) => Some(delay),
        InitAttempt::Finished(InitOutcome::Activated | InitOutcome::AlreadyActive) => None,
        InitAttempt::Busy | InitAttempt::Failed => Some(retry_delay),
    }
}

// Only one retry chain runs at a time, however many page events ask for initialization.
fn initialize(shared: &SharedSynchronizer, from_timer: bool) {
    if from_timer {
        shared.retry_scheduled.set(false);
    } else if shared.retry_scheduled.get() {
        return;
    }
    let mut attempt = InitAttempt::Busy;
    shared.with("initialization", |sync| match sync.try_initialize() {
        Ok(outcome) => {
            attempt = InitAttempt::Finished(outcome);
            Ok(())
        }
        Err(err) => {
            attempt = InitAttempt::Failed;
            Err(err)
        }
    });
    if let Some(delay) = next_retry(attempt, shared.retry_delay) {
        if let Err(err) = schedule_initialize(shared, delay) {
            error!("Cannot schedule evaluation gauge setup: {}", describe_js_error(&err));
        }
    }
}

fn schedule_initialize(shared: &SharedSynchronizer, delay: Duration) -> JsResult<()> {
    let on_timer = shared.clone();
    let callback = Closure::once_into_js(move || initialize(&on_timer, true));
    let timeout_ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
    web_window()?.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        timeout_ms,
    )?;
    shared.retry_scheduled.set(true);
    Ok(())
}

mod common;

use std::time::Duration;

use common::*;
use eval_gauge::config::DEFAULT_LOADING_MARKER;
use eval_gauge::{GaugeDom, InitOutcome, LifecycleState, Polarity};
use pretty_assertions::assert_eq;


#[test]
fn waits_for_gauge_container() {
    let mut sync = new_synchronizer();
    let body = sync.dom().body();
    add_pearl(sync.dom(), body, "-2.4");

    // Nothing to mount into for the first 300ms.
    for _ in 0..3 {
        assert_eq!(
            sync.try_initialize().unwrap(),
            InitOutcome::RetryAfter(Duration::from_millis(100))
        );
    }
    assert!(matches!(sync.state(), LifecycleState::Initializing { attempts: 3, .. }));
    assert!(!sync.dom().is_structure_watched());

    let gauge = add_gauge(sync.dom(), body);
    assert_eq!(sync.try_initialize().unwrap(), InitOutcome::Activated);
    assert_eq!(sync.state(), LifecycleState::Active);
    assert!(sync.dom().is_structure_watched());

    let dom = sync.dom();
    let display = single_display(dom, gauge);
    assert_eq!(dom.text(display), "2.4");
    assert_eq!(dom.style(display, "top").as_deref(), Some("0"));
    assert_eq!(dom.style(display, "color").as_deref(), Some("#c3c3c3"));
    assert_eq!(dom.style(display, "transform").as_deref(), Some("translateY(0)"));

    assert_eq!(sync.try_initialize().unwrap(), InitOutcome::AlreadyActive);
}

#[test]
fn display_has_base_style() {
    let mut sync = new_synchronizer();
    let body = sync.dom().body();
    let gauge = add_gauge(sync.dom(), body);
    activate(&mut sync);

    let dom = sync.dom();
    let display = single_display(dom, gauge);
    assert_eq!(dom.style(display, "position").as_deref(), Some("absolute"));
    assert_eq!(dom.style(display, "width").as_deref(), Some("100%"));
    assert_eq!(dom.style(display, "height").as_deref(), Some("28px"));
    assert_eq!(dom.style(display, "text-align").as_deref(), Some("center"));
    assert_eq!(dom.style(display, "pointer-events").as_deref(), Some("none"));
}

#[test]
fn creation_is_idempotent() {
    let mut sync = new_synchronizer();
    let body = sync.dom().body();
    let gauges = [add_gauge(sync.dom(), body), add_gauge(sync.dom(), body)];
    add_pearl(sync.dom(), body, "+0.8");
    activate(&mut sync);

    sync.create_displays().unwrap();
    sync.create_displays().unwrap();
    flush(&mut sync);

    for gauge in gauges {
        assert_eq!(display_of(sync.dom(), gauge).len(), 1);
    }
    assert_eq!(sync.displays().len(), 2);
}

#[test]
fn content_change_fans_out() {
    let mut sync = new_synchronizer();
    let body = sync.dom().body();
    let gauges = [add_gauge(sync.dom(), body), add_reversed_gauge(sync.dom(), body)];
    let pearl = add_pearl(sync.dom(), body, "+0.8");
    activate(&mut sync);

    for &gauge in &gauges {
        let display = single_display(sync.dom(), gauge);
        assert_eq!(sync.dom().text(display), "0.8");
        assert_eq!(sync.dom().style(display, "top").as_deref(), Some("100%"));
    }

    sync.dom().set_content(pearl, "-1.5");
    flush(&mut sync);

    let dom = sync.dom();
    let straight = single_display(dom, gauges[0]);
    let reversed = single_display(dom, gauges[1]);
    for display in [straight, reversed] {
        assert_eq!(dom.text(display), "1.5");
        assert_eq!(dom.style(display, "top").as_deref(), Some("0"));
        assert_eq!(dom.style(display, "bottom").as_deref(), Some("100%"));
        assert_eq!(dom.style(display, "color").as_deref(), Some("#c3c3c3"));
    }
    assert_eq!(dom.style(straight, "transform").as_deref(), Some("translateY(0)"));
    assert_eq!(dom.style(reversed, "transform").as_deref(), Some("translateY(0) scaleY(-1)"));
}

#[test]
fn loading_pearl_is_skipped() {
    let mut sync = new_synchronizer();
    let body = sync.dom().body();
    let gauge = add_gauge(sync.dom(), body);
    let loading = add_pearl(sync.dom(), body, DEFAULT_LOADING_MARKER);
    add_pearl(sync.dom(), body, "+1.1");
    activate(&mut sync);

    assert_eq!(sync.current_content().raw, "+1.1");
    let display = single_display(sync.dom(), gauge);
    assert_eq!(sync.dom().text(display), "1.1");

    // Once the first pearl finishes loading it takes over.
    sync.dom().set_content(loading, "-0.4");
    flush(&mut sync);
    assert_eq!(sync.dom().text(display), "0.4");
    assert_eq!(sync.current_content().polarity, Polarity::Negative);
}

#[test]
fn pearl_markup_is_mirrored_as_text() {
    let mut sync = new_synchronizer();
    let body = sync.dom().body();
    let gauge = add_gauge(sync.dom(), body);
    let pearl = add_pearl(sync.dom(), body, "<strong>-1.6</strong>");
    activate(&mut sync);

    let display = single_display(sync.dom(), gauge);
    assert_eq!(sync.dom().text(display), "1.6");
    assert_eq!(sync.dom().style(display, "top").as_deref(), Some("0"));

    sync.dom().set_content(pearl, "<span class=\"pos-x\">+&lt;0.1</span>");
    flush(&mut sync);
    assert_eq!(sync.dom().text(display), "<0.1");
    assert_eq!(sync.dom().style(display, "top").as_deref(), Some("100%"));
}

#[test]
fn reverse_toggle_restyles_in_place() {
    let mut sync = new_synchronizer();
    let body = sync.dom().body();
    let gauge = add_gauge(sync.dom(), body);
    add_pearl(sync.dom(), body, "+0.3");
    activate(&mut sync);
    let display = single_display(sync.dom(), gauge);
    assert_eq!(sync.dom().style(display, "transform").as_deref(), Some("translateY(-100%)"));

    sync.dom().set_classes(gauge, &["eval-gauge", "reverse"]);
    flush(&mut sync);
    assert_eq!(
        sync.dom().style(display, "transform").as_deref(),
        Some("translateY(-100%) scaleY(-1)")
    );

    sync.dom().set_classes(gauge, &["eval-gauge"]);
    flush(&mut sync);
    assert_eq!(sync.dom().style(display, "transform").as_deref(), Some("translateY(-100%)"));
    assert_eq!(display_of(sync.dom(), gauge).len(), 1);
}

#[test]
fn other_attribute_changes_are_ignored() {
    let mut sync = new_synchronizer();
    let body = sync.dom().body();
    let gauge = add_gauge(sync.dom(), body);
    activate(&mut sync);
    let display = single_display(sync.dom(), gauge);

    // Flip the class without notifying, then touch another attribute.
    sync.dom().set_classes(gauge, &["eval-gauge", "reverse"]);
    sync.dom().take_structure_batch();
    sync.dom().set_attribute(gauge, "title", "Evaluation");
    flush(&mut sync);
    assert_eq!(sync.dom().style(display, "transform").as_deref(), Some("translateY(-100%)"));
}

#[test]
fn late_gauge_gets_current_content() {
    let mut sync = new_synchronizer();
    let body = sync.dom().body();
    add_gauge(sync.dom(), body);
    add_pearl(sync.dom(), body, "-0.9");
    activate(&mut sync);

    // A whole panel containing the gauge is inserted at once.
    let panel = sync.dom().new_element("section", &["analyse__tools"]);
    let late_gauge = sync.dom().new_child(panel, "div", &["eval-gauge"]);
    sync.dom().append(body, panel);
    flush(&mut sync);

    let dom = sync.dom();
    let display = single_display(dom, late_gauge);
    assert_eq!(dom.text(display), "0.9");
    assert_eq!(dom.style(display, "top").as_deref(), Some("0"));
    assert_eq!(sync.displays().len(), 2);
}

#[test]
fn late_pearl_is_watched() {
    let mut sync = new_synchronizer();
    let body = sync.dom().body();
    let gauge = add_gauge(sync.dom(), body);
    add_pearl(sync.dom(), body, DEFAULT_LOADING_MARKER);
    activate(&mut sync);
    let display = single_display(sync.dom(), gauge);
    assert_eq!(sync.dom().text(display), "");

    let pearl = add_pearl(sync.dom(), body, "+2.0");
    flush(&mut sync);
    assert_eq!(sync.dom().text(display), "2.0");
    assert!(sync.dom().content_watched().contains(&pearl));

    sync.dom().set_content(pearl, "-7.1");
    flush(&mut sync);
    assert_eq!(sync.dom().text(display), "7.1");
    assert_eq!(sync.dom().style(display, "color").as_deref(), Some("#c3c3c3"));
}

#[test]
fn removed_pearl_degrades_to_empty() {
    let mut sync = new_synchronizer();
    let body = sync.dom().body();
    let gauge = add_gauge(sync.dom(), body);
    let pearl = add_pearl(sync.dom(), body, "-3.3");
    activate(&mut sync);

    sync.dom().remove(pearl);
    flush(&mut sync);

    let dom = sync.dom();
    let display = single_display(dom, gauge);
    assert!(sync.sources().is_empty());
    assert_eq!(dom.text(display), "");
    assert_eq!(dom.style(display, "top").as_deref(), Some("100%"));
    assert_eq!(dom.style(display, "color").as_deref(), Some("#3c3c3c"));
}

#[test]
fn removed_gauge_leaves_cache() {
    let mut sync = new_synchronizer();
    let body = sync.dom().body();
    let kept = add_gauge(sync.dom(), body);
    let removed = add_gauge(sync.dom(), body);
    let pearl = add_pearl(sync.dom(), body, "+0.1");
    activate(&mut sync);
    let stale_display = single_display(sync.dom(), removed);

    sync.dom().remove(removed);
    flush(&mut sync);
    assert!(!sync.dom().is_attached(stale_display));
    assert_eq!(sync.displays(), &[single_display(sync.dom(), kept)]);

    sync.dom().set_content(pearl, "+0.2");
    flush(&mut sync);
    assert_eq!(sync.dom().text(stale_display), "0.1");
}

#[test]
fn pearls_are_watched_once() {
    let mut sync = new_synchronizer();
    let body = sync.dom().body();
    add_gauge(sync.dom(), body);
    let pearl = add_pearl(sync.dom(), body, "+0.5");
    activate(&mut sync);
    assert_eq!(sync.dom().content_watched(), vec![pearl]);

    add_gauge(sync.dom(), body);
    flush(&mut sync);
    sync.dom().remove(pearl);
    flush(&mut sync);
    sync.dom().append(body, pearl);
    flush(&mut sync);
    assert_eq!(sync.dom().content_watched(), vec![pearl]);
    assert_eq!(sync.sources(), &[pearl]);
}

#[test]
fn notifications_before_activation_are_ignored() {
    let mut sync = new_synchronizer();
    let body = sync.dom().body();
    let gauge = add_gauge(sync.dom(), body);
    let batch = vec![eval_gauge::DomMutation::ChildList { added: vec![gauge], removed: vec![] }];
    sync.on_structure_change(&batch).unwrap();
    sync.on_content_change().unwrap();
    assert!(display_of(sync.dom(), gauge).is_empty());
    assert_eq!(sync.state(), LifecycleState::Uninitialized);
}

#[test]
fn double_click_toggles_evaluation() {
    let mut sync = new_synchronizer();
    let body = sync.dom().body();
    let gauge = add_gauge(sync.dom(), body);
    let elsewhere = sync.dom().append_new(body, "div", &["analyse__board"]);

    // No toggle on the page yet.
    assert!(!sync.on_double_click(&gauge).unwrap());

    let label = sync.dom().append_new(body, "label", &[]);
    sync.dom().set_attribute(label, "for", "analyse-toggle-ceval");
    assert!(!sync.on_double_click(&elsewhere).unwrap());
    assert!(sync.on_double_click(&gauge).unwrap());
    assert_eq!(sync.dom().clicks(), vec![label]);

    activate(&mut sync);
    assert!(sync.dom().matches(&gauge, &sync.config().gauge_selector()).unwrap());
}

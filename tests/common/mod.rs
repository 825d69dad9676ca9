// Rust-upgrade (https://github.com/rust-lang/rust/issues/46379):
//   remove `#[allow(dead_code)]` before public functions.

use eval_gauge::test_util::{MemoryDom, NodeId};
use eval_gauge::{GaugeConfig, GaugeSynchronizer};


pub type TestSynchronizer = GaugeSynchronizer<MemoryDom>;

#[allow(dead_code)]
pub fn init_logging() { let _ = env_logger::builder().is_test(true).try_init(); }

#[allow(dead_code)]
pub fn new_synchronizer() -> TestSynchronizer {
    init_logging();
    GaugeSynchronizer::new(MemoryDom::new(), GaugeConfig::default())
}

#[allow(dead_code)]
pub fn add_gauge(dom: &MemoryDom, parent: NodeId) -> NodeId {
    dom.append_new(parent, "div", &["eval-gauge"])
}

#[allow(dead_code)]
pub fn add_reversed_gauge(dom: &MemoryDom, parent: NodeId) -> NodeId {
    dom.append_new(parent, "div", &["eval-gauge", "reverse"])
}

#[allow(dead_code)]
pub fn add_pearl(dom: &MemoryDom, parent: NodeId, content: &str) -> NodeId {
    let pearl = dom.new_element("pearl", &[]);
    dom.set_content(pearl, content);
    dom.append(parent, pearl);
    pearl
}

#[allow(dead_code)]
pub fn display_of(dom: &MemoryDom, gauge: NodeId) -> Vec<NodeId> {
    dom.children(gauge)
        .into_iter()
        .filter(|&child| dom.element_id(child).as_deref() == Some("evaluation"))
        .collect()
}

#[allow(dead_code)]
pub fn single_display(dom: &MemoryDom, gauge: NodeId) -> NodeId {
    let displays = display_of(dom, gauge);
    assert_eq!(displays.len(), 1, "expected exactly one display in {gauge:?}");
    displays[0]
}

// Delivers queued notifications the way the browser would: structure batch first, then the
// content notification, until the page is quiet.
#[allow(dead_code)]
pub fn flush(sync: &mut TestSynchronizer) {
    for _ in 0..10 {
        let batch = sync.dom().take_structure_batch();
        let content_changed = sync.dom().take_content_notification();
        if batch.is_empty() && !content_changed {
            return;
        }
        sync.on_structure_change(&batch).unwrap();
        if content_changed {
            sync.on_content_change().unwrap();
        }
    }
    panic!("Notifications did not settle");
}

#[allow(dead_code)]
pub fn activate(sync: &mut TestSynchronizer) {
    assert_eq!(sync.try_initialize().unwrap(), eval_gauge::InitOutcome::Activated);
    flush(sync);
}

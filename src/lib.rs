#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod config;
pub mod dom;
pub mod pearl;
pub mod style;
pub mod synchronizer;
pub mod test_util;

pub use config::{GaugeConfig, Palette, Selector};
pub use dom::{DomMutation, GaugeDom};
pub use pearl::PearlContent;
pub use style::Polarity;
pub use synchronizer::{GaugeSynchronizer, InitOutcome, LifecycleState};

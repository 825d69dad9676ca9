use std::fmt;
use std::time::Duration;

use serde::Deserialize;


// Markup the host page puts into a pearl while the engine is still thinking.
pub const DEFAULT_LOADING_MARKER: &str = r#"<i class="ddloader"></i>"#;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Selector {
    Tag(String),
    Class(String),
    Id(String),
    // Anything else. Only the browser can match these.
    Css(String),
}

impl Selector {
    pub fn css(&self) -> String {
        match self {
            Selector::Tag(tag) => tag.clone(),
            Selector::Class(class) => format!(".{class}"),
            Selector::Id(id) => format!("#{id}"),
            Selector::Css(css) => css.clone(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.css()) }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub positive: String,
    pub negative: String,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            positive: "#3c3c3c".to_owned(),
            negative: "#c3c3c3".to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GaugeConfig {
    pub gauge_class: String,
    pub pearl_tag: String,
    pub display_id: String,
    // Set on a gauge container when the board is viewed from Black's side.
    pub reverse_class: String,
    pub loading_marker: String,
    pub palette: Palette,
    #[serde(with = "humantime_serde")]
    pub init_retry_delay: Duration,
    // `for` attribute of the label that switches computer evaluation on and off.
    pub toggle_label_for: String,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        GaugeConfig {
            gauge_class: "eval-gauge".to_owned(),
            pearl_tag: "pearl".to_owned(),
            display_id: "evaluation".to_owned(),
            reverse_class: "reverse".to_owned(),
            loading_marker: DEFAULT_LOADING_MARKER.to_owned(),
            palette: Palette::default(),
            init_retry_delay: Duration::from_millis(100),
            toggle_label_for: "analyse-toggle-ceval".to_owned(),
        }
    }
}

impl GaugeConfig {
    // Missing fields keep their default values, so `{}` is a valid config.
    pub fn from_json(json: &str) -> serde_json::Result<Self> { serde_json::from_str(json) }

    pub fn gauge_selector(&self) -> Selector { Selector::Class(self.gauge_class.clone()) }
    pub fn pearl_selector(&self) -> Selector { Selector::Tag(self.pearl_tag.clone()) }
    pub fn display_selector(&self) -> Selector { Selector::Id(self.display_id.clone()) }
    pub fn toggle_label_selector(&self) -> Selector {
        Selector::Css(format!(r#"label[for="{}"]"#, self.toggle_label_for))
    }
}

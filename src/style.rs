use strum::EnumIter;

use crate::config::Palette;


// Which side the evaluation favors. Positive is White.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter)]
pub enum Polarity {
    #[default]
    Positive,
    Negative,
}

impl Polarity {
    pub fn from_raw(raw: &str) -> Self {
        if raw.contains('-') { Polarity::Negative } else { Polarity::Positive }
    }
}

// Applied once, when the display element is created.
pub const BASE_STYLE: [(&str, &str); 10] = [
    ("width", "100%"),
    ("height", "28px"),
    ("text-align", "center"),
    ("pointer-events", "none"),
    ("user-select", "none"),
    ("font-size", "11px"),
    ("font-weight", "500"),
    ("padding-top", "6px"),
    ("padding-bottom", "6px"),
    ("position", "absolute"),
];

const FLIP: &str = "scaleY(-1)";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluationStyle {
    pub top: &'static str,
    pub bottom: &'static str,
    pub transform: String,
    pub color: String,
}

impl EvaluationStyle {
    pub fn properties(&self) -> [(&'static str, &str); 4] {
        [
            ("top", self.top),
            ("bottom", self.bottom),
            ("transform", &self.transform),
            ("color", &self.color),
        ]
    }
}

// The label sits at the top of the gauge for Black advantage and at the bottom for White
// advantage. Inside a reversed gauge it is flipped vertically.
pub fn evaluation_style(polarity: Polarity, reversed: bool, palette: &Palette) -> EvaluationStyle {
    let (top, bottom, translate, color) = match polarity {
        Polarity::Negative => ("0", "100%", "translateY(0)", &palette.negative),
        Polarity::Positive => ("100%", "auto", "translateY(-100%)", &palette.positive),
    };
    let transform = if reversed { format!("{translate} {FLIP}") } else { translate.to_owned() };
    EvaluationStyle {
        top,
        bottom,
        transform,
        color: color.clone(),
    }
}

use crate::style::Polarity;


#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PearlContent {
    pub raw: String,
    pub display: String,
    pub polarity: Polarity,
}

impl PearlContent {
    pub fn from_raw(raw: &str) -> Self {
        PearlContent {
            raw: raw.to_owned(),
            display: raw.chars().filter(|&ch| ch != '+' && ch != '-').collect(),
            polarity: Polarity::from_raw(raw),
        }
    }
}

// A pearl as read from the page. The markup tells whether it has finished loading; the text is
// what gets mirrored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PearlReading {
    pub markup: Option<String>,
    pub text: Option<String>,
}

impl PearlReading {
    // For sources without markup of their own.
    pub fn plain(content: &str) -> Self {
        PearlReading {
            markup: Some(content.to_owned()),
            text: Some(content.to_owned()),
        }
    }
}

pub fn is_meaningful(content: &str, loading_marker: &str) -> bool {
    !content.is_empty() && content != loading_marker
}

// The first pearl that has finished loading wins.
pub fn extract_pearl_content(
    sources: impl IntoIterator<Item = PearlReading>, loading_marker: &str,
) -> PearlContent {
    sources
        .into_iter()
        .find(|source| {
            source.markup.as_deref().is_some_and(|markup| is_meaningful(markup, loading_marker))
        })
        .map(|source| PearlContent::from_raw(source.text.as_deref().unwrap_or_default()))
        .unwrap_or_default()
}

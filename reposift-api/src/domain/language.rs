use serde::Serialize;

/// Languages come from provider data during contribution and refresh and
/// are never directly user-authored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub name: String,
    pub display_name: String,
}

impl Language {
    pub fn from_display(display: &str) -> Self {
        Self {
            name: super::safe_name(display),
            display_name: display.to_owned(),
        }
    }
}

use serde::{Deserialize, Serialize};

/// A rendered prompt ready to be sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub name: String,
    pub text: String,
    /// Image attached to the prompt, as a `data:` URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
}

impl Prompt {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            media: None,
        }
    }

    pub fn with_media(mut self, data_uri: impl Into<String>) -> Self {
        self.media = Some(data_uri.into());
        self
    }
}

use crate::config::{Extraction, PromptConfig};

/// Role-primed prompt layout and the marker used to locate the reply in the
/// decoded output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub priming: String,
    pub user_label: String,
    pub marker: String,
    pub extract: Extraction,
}

impl From<&PromptConfig> for PromptTemplate {
    fn from(config: &PromptConfig) -> Self {
        Self {
            priming: config.priming.clone(),
            user_label: config.user_label.clone(),
            marker: config.marker.clone(),
            extract: config.extract,
        }
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::from(&PromptConfig::default())
    }
}

impl PromptTemplate {
    /// `<priming>\n<user_label> <message>\n<marker>`
    pub fn render(&self, message: &str) -> String {
        format!(
            "{}\n{} {}\n{}",
            self.priming, self.user_label, message, self.marker
        )
    }

    pub fn extract_reply(&self, decoded: &str) -> String {
        match self.extract {
            Extraction::LastMarker => extract_reply(decoded, &self.marker),
            Extraction::LastMarkerOrWhole if decoded.contains(self.marker.as_str()) => {
                extract_reply(decoded, &self.marker)
            }
            Extraction::LastMarkerOrWhole => decoded.trim().to_string(),
        }
    }
}

/// Everything after the last `marker`, trimmed. Returns an empty string when
/// the marker does not occur.
pub fn extract_reply(decoded: &str, marker: &str) -> String {
    match decoded.rfind(marker) {
        Some(idx) => decoded[idx + marker.len()..].trim().to_string(),
        None => String::new(),
    }
}

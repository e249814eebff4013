//! Display labels for device information

use serde::{Deserialize, Serialize};

/// Display language for labels and placeholders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl Locale {
    /// Resolve a language tag such as `en-US` or `zh-CN`, falling back to English
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "zh" => Locale::Zh,
            _ => Locale::En,
        }
    }

    /// Placeholder for values the device did not report
    pub fn unknown(self) -> &'static str {
        match self {
            Locale::En => "Unknown",
            Locale::Zh => "未知",
        }
    }

    fn signal_label(self, signal: Signal) -> &'static str {
        match (self, signal) {
            (Locale::En, Signal::Strong) => "Strong",
            (Locale::En, Signal::Medium) => "Medium",
            (Locale::En, Signal::Weak) => "Weak",
            (Locale::En, Signal::None) => "No signal",
            (Locale::Zh, Signal::Strong) => "强",
            (Locale::Zh, Signal::Medium) => "中等",
            (Locale::Zh, Signal::Weak) => "弱",
            (Locale::Zh, Signal::None) => "无信号",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Signal {
    Strong,
    Medium,
    Weak,
    None,
}

/// Map a signal strength code reported by the device to a display label.
///
/// Codes are matched case-insensitively; unrecognised codes are returned
/// unchanged and a missing code yields the unknown placeholder.
pub fn signal_display_text(signal: Option<&str>, locale: Locale) -> String {
    let Some(signal) = signal.filter(|s| !s.is_empty()) else {
        return locale.unknown().to_string();
    };

    let code = match signal.to_ascii_lowercase().as_str() {
        "strong" => Signal::Strong,
        "medium" => Signal::Medium,
        "weak" => Signal::Weak,
        "none" => Signal::None,
        _ => return signal.to_string(),
    };
    locale.signal_label(code).to_string()
}

//! Widget configuration: copy, suggested prompts, timing, and placement.
//!
//! Numeric knobs come from environment variables; the copy defaults to the
//! Điện Biên Phủ history page the widget was built for.

use std::time::Duration;

use crate::position::{AnchorPolicy, DEFAULT_BOTTOM_MARGIN_REM, DEFAULT_TOP_FRACTION};

pub const DEFAULT_SEND_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_ICON_SIZE_PX: f64 = 120.0;

pub const DEFAULT_TITLE: &str = "Hỏi đáp về Điện Biên Phủ";
pub const DEFAULT_GREETING: &str = "Chọn câu hỏi hoặc nhập câu hỏi của bạn về chiến dịch Điện Biên Phủ";
pub const DEFAULT_APOLOGY: &str = "Xin lỗi, đã có lỗi xảy ra khi xử lý tin nhắn của bạn.";
pub const DEFAULT_SUGGESTED_PROMPTS: [&str; 4] = [
    "Tóm tắt diễn biến chính của chiến dịch Điện Biên Phủ",
    "Vai trò của Đại tướng Võ Nguyên Giáp trong chiến dịch",
    "Ý nghĩa của chiến thắng Điện Biên Phủ",
    "Những khó khăn trong chiến dịch Điện Biên Phủ",
];

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetConfig {
    pub title: String,
    pub greeting: String,
    /// Shown in place of any failed reply.
    pub apology: String,
    pub suggested_prompts: Vec<String>,
    pub send_timeout: Duration,
    pub anchor: AnchorPolicy,
    pub icon_size_px: f64,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_owned(),
            greeting: DEFAULT_GREETING.to_owned(),
            apology: DEFAULT_APOLOGY.to_owned(),
            suggested_prompts: DEFAULT_SUGGESTED_PROMPTS.iter().map(|p| (*p).to_owned()).collect(),
            send_timeout: Duration::from_secs(DEFAULT_SEND_TIMEOUT_SECS),
            anchor: AnchorPolicy::default(),
            icon_size_px: DEFAULT_ICON_SIZE_PX,
        }
    }
}

impl WidgetConfig {
    /// Build widget config from environment variables.
    ///
    /// Optional:
    /// - `WIDGET_SEND_TIMEOUT_SECS`: default 30
    /// - `WIDGET_TOP_FRACTION`: default 0.70, clamped to `0.0..=1.0`
    /// - `WIDGET_BOTTOM_MARGIN_REM`: default 2.0
    /// - `WIDGET_ICON_SIZE_PX`: default 120
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`WidgetConfig::from_env`], reading values through `lookup`.
    /// Unparseable or non-finite values fall back to their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let send_timeout_secs = parse(&lookup, "WIDGET_SEND_TIMEOUT_SECS", DEFAULT_SEND_TIMEOUT_SECS).max(1);
        let top_fraction = parse_finite(&lookup, "WIDGET_TOP_FRACTION", DEFAULT_TOP_FRACTION).clamp(0.0, 1.0);
        let bottom_margin_rem = parse_finite(&lookup, "WIDGET_BOTTOM_MARGIN_REM", DEFAULT_BOTTOM_MARGIN_REM);

        Self {
            send_timeout: Duration::from_secs(send_timeout_secs),
            anchor: AnchorPolicy { top_fraction, bottom_margin_rem },
            icon_size_px: parse_finite(&lookup, "WIDGET_ICON_SIZE_PX", DEFAULT_ICON_SIZE_PX),
            ..Self::default()
        }
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// `NaN` and infinities parse as `f64` but would leak into CSS.
fn parse_finite(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: f64) -> f64 {
    Some(parse(lookup, key, default))
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

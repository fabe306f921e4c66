//! Floating icon placement.
//!
//! DESIGN
//! ======
//! Two-state policy: the icon floats at a fixed fraction of the viewport
//! height until the page is scrolled past the point where it would cover the
//! end of the content, then it pins to a margin above the viewport bottom.
//! There is no hysteresis and no continuous follow.
//!
//! At exactly `scroll_offset == max_scroll` the icon stays top-anchored.
//!
//! `AnchorTracker` coalesces scroll events so the anchor is recomputed at most
//! once per animation frame.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_FRACTION: f64 = 0.70;
pub const DEFAULT_BOTTOM_MARGIN_REM: f64 = 2.0;

/// Read-only viewport signals, all in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    pub scroll_offset: f64,
    pub viewport_height: f64,
    pub document_height: f64,
    pub widget_height: f64,
}

impl ViewportMetrics {
    /// Largest scroll offset at which the floating icon clears the page end.
    #[must_use]
    pub fn max_scroll(&self) -> f64 {
        self.document_height - self.viewport_height - self.widget_height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorPolicy {
    pub top_fraction: f64,
    pub bottom_margin_rem: f64,
}

impl Default for AnchorPolicy {
    fn default() -> Self {
        Self { top_fraction: DEFAULT_TOP_FRACTION, bottom_margin_rem: DEFAULT_BOTTOM_MARGIN_REM }
    }
}

/// Where the icon sits on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "edge", rename_all = "lowercase")]
pub enum AnchorPosition {
    /// Offset from the viewport top, as a fraction of viewport height.
    Top { viewport_fraction: f64 },
    /// Pinned above the viewport bottom.
    Bottom { margin_rem: f64 },
}

impl AnchorPosition {
    /// `(top, bottom)` CSS values for a `position: fixed` element.
    #[must_use]
    pub fn css(&self) -> (String, String) {
        match self {
            Self::Top { viewport_fraction } => {
                let vh = (viewport_fraction * 100_000.0).round() / 1000.0;
                (format!("{vh}vh"), "auto".to_owned())
            }
            Self::Bottom { margin_rem } => ("auto".to_owned(), format!("{margin_rem}rem")),
        }
    }

    #[must_use]
    pub fn is_pinned(&self) -> bool {
        matches!(self, Self::Bottom { .. })
    }
}

/// Pure anchor computation from the four viewport inputs.
#[must_use]
pub fn compute_anchor(metrics: &ViewportMetrics, policy: &AnchorPolicy) -> AnchorPosition {
    if metrics.scroll_offset > metrics.max_scroll() {
        AnchorPosition::Bottom { margin_rem: policy.bottom_margin_rem }
    } else {
        AnchorPosition::Top { viewport_fraction: policy.top_fraction }
    }
}

// =============================================================================
// FRAME BATCHING
// =============================================================================

/// Coalesces scroll events into one recomputation per animation frame.
#[derive(Debug, Clone)]
pub struct AnchorTracker {
    policy: AnchorPolicy,
    pending: Option<ViewportMetrics>,
    current: AnchorPosition,
}

impl AnchorTracker {
    #[must_use]
    pub fn new(policy: AnchorPolicy) -> Self {
        let current = AnchorPosition::Top { viewport_fraction: policy.top_fraction };
        Self { policy, pending: None, current }
    }

    /// Record the latest metrics from a scroll event.
    ///
    /// Returns `true` when the host must request an animation frame, which is
    /// only for the first event since the previous frame.
    pub fn on_scroll(&mut self, metrics: ViewportMetrics) -> bool {
        let first = self.pending.is_none();
        self.pending = Some(metrics);
        first
    }

    /// Run the batched recomputation. Returns the new anchor if it changed.
    pub fn on_frame(&mut self) -> Option<AnchorPosition> {
        let metrics = self.pending.take()?;
        let next = compute_anchor(&metrics, &self.policy);
        if next == self.current {
            return None;
        }
        tracing::debug!(pinned = next.is_pinned(), scroll = metrics.scroll_offset, "position: anchor changed");
        self.current = next;
        Some(next)
    }

    #[must_use]
    pub fn current(&self) -> AnchorPosition {
        self.current
    }
}

#[cfg(test)]
#[path = "position_test.rs"]
mod tests;

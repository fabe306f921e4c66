//! Floating assistant: chat widget core for a content page.
//!
//! SYSTEM CONTEXT
//! ==============
//! A floating icon that repositions itself on scroll, opens into a chat
//! panel, and relays questions to a generative backend. This crate holds the
//! headless parts: anchor placement (`position`), the transcript, the remote
//! session lifecycle (`session`), and the panel state machine (`widget`).
//! Rendering is left to the host.

pub mod config;
pub mod error;
pub mod llm;
pub mod position;
pub mod session;
pub mod transcript;
pub mod widget;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::WidgetConfig;
pub use position::{AnchorPolicy, AnchorPosition, AnchorTracker, ViewportMetrics, compute_anchor};
pub use session::{Session, SessionError, SessionManager};
pub use transcript::{Message, Transcript};
pub use widget::{Phase, PendingSend, SendOutcome, SubmitError, WidgetController, WidgetState, WidgetView};

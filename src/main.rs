//! Terminal host for the assistant widget.
//!
//! Reads one command per line from stdin and prints what the panel would
//! show. Logs go to stderr.

use std::sync::Arc;

use floating_assistant::llm::{Backend, LlmClient, Unconfigured};
use floating_assistant::{
    AnchorTracker, PendingSend, SubmitError, ViewportMetrics, WidgetConfig, WidgetController, WidgetView,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, PartialEq)]
enum Command {
    Open,
    Close,
    Quit,
    Prompt(usize),
    Scroll { offset: f64, viewport: f64, document: f64 },
    Say(String),
    Invalid(&'static str),
}

fn parse_command(line: &str) -> Command {
    let mut words = line.split_whitespace();
    match words.next() {
        Some("/open") => Command::Open,
        Some("/close") => Command::Close,
        Some("/quit") => Command::Quit,
        Some("/prompt") => match words.next().and_then(|n| n.parse::<usize>().ok()) {
            Some(n) if n > 0 => Command::Prompt(n - 1),
            _ => Command::Invalid("usage: /prompt <n>"),
        },
        Some("/scroll") => {
            let nums: Vec<f64> = words.filter_map(|w| w.parse().ok()).collect();
            match nums[..] {
                [offset, viewport, document] => Command::Scroll { offset, viewport, document },
                _ => Command::Invalid("usage: /scroll <offset> <viewport> <document>"),
            }
        }
        Some(cmd) if cmd.starts_with('/') => Command::Invalid("commands: /open /close /prompt /scroll /quit"),
        _ => Command::Say(line.to_owned()),
    }
}

/// Prints only what changed since the previous frame.
#[derive(Default)]
struct Screen {
    shown: usize,
    was_open: bool,
    greeted: bool,
}

impl Screen {
    fn render(&mut self, view: &WidgetView<'_>) {
        for line in self.frame(view) {
            println!("{line}");
        }
    }

    fn frame(&mut self, view: &WidgetView<'_>) -> Vec<String> {
        let mut lines = Vec::new();
        if view.state.is_open && !self.was_open {
            lines.push(format!("=== {} ===", view.title));
        }
        if !view.state.is_open && self.was_open {
            lines.push("=== closed ===".to_owned());
        }
        self.was_open = view.state.is_open;

        if view.messages.len() < self.shown {
            self.shown = 0;
        }
        if !view.state.is_open {
            self.greeted = false;
            return lines;
        }

        if let (Some(greeting), Some(prompts)) = (view.greeting, view.suggested_prompts) {
            if !self.greeted {
                lines.push(greeting.to_owned());
                lines.extend(prompts.iter().enumerate().map(|(i, prompt)| format!("  [{}] {prompt}", i + 1)));
                self.greeted = true;
            }
        }
        for message in &view.messages[self.shown..] {
            let who = if message.is_user() { ">" } else { "<" };
            lines.push(format!("{who} {}", message.text()));
        }
        self.shown = view.messages.len();
        lines
    }
}

async fn drive(widget: &mut WidgetController, submitted: Result<PendingSend, SubmitError>) {
    match submitted {
        Ok(pending) => {
            println!("> {}", pending.text());
            println!("  ...");
            widget.settle(pending).await;
        }
        Err(e) => println!("  ({e})"),
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // Non-fatal: without a backend every answer is the apology.
    let backend: Arc<dyn Backend> = match LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Arc::new(client)
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured, replies disabled");
            Arc::new(Unconfigured::new(e.to_string()))
        }
    };

    let config = WidgetConfig::from_env();
    let mut tracker = AnchorTracker::new(config.anchor);
    let icon_size = config.icon_size_px;
    let mut widget = WidgetController::mount(backend, config).await;
    let mut screen = Screen::default();

    println!("type /open to start, /quit to leave");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match parse_command(&line) {
            Command::Quit => break,
            Command::Open => widget.activate(),
            Command::Close => widget.deactivate().await,
            Command::Prompt(index) => {
                let submitted = widget.select_prompt(index);
                screen.shown += usize::from(submitted.is_ok());
                drive(&mut widget, submitted).await;
            }
            Command::Say(text) => {
                let submitted = widget.submit(&text);
                // `drive` echoes the accepted question itself.
                screen.shown += usize::from(submitted.is_ok());
                drive(&mut widget, submitted).await;
            }
            Command::Scroll { offset, viewport, document } => {
                let metrics = ViewportMetrics {
                    scroll_offset: offset,
                    viewport_height: viewport,
                    document_height: document,
                    widget_height: icon_size,
                };
                tracker.on_scroll(metrics);
                let changed = tracker.on_frame().is_some();
                let (top, bottom) = tracker.current().css();
                println!("  icon: top={top} bottom={bottom}{}", if changed { " (moved)" } else { "" });
            }
            Command::Invalid(usage) => println!("  {usage}"),
        }
        screen.render(&widget.view());
    }
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

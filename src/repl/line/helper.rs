//! rustyline integration: completion and highlighting through the service

use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use owo_colors::OwoColorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use tokio::runtime::Handle;
use tracing::debug;

use crate::repl::completion::synthesizer::typed_fragment;
use crate::repl::engine::LineId;
use crate::repl::highlight::ColorSpan;
use crate::repl::service::ReplService;

/// Editor helper bound to the line currently being typed
pub struct LineHelper {
    service: ReplService,
    runtime: Handle,
    current: Arc<AtomicU64>,
}

impl LineHelper {
    pub fn new(
        service: ReplService,
        runtime: Handle,
        current: Arc<AtomicU64>,
    ) -> Self {
        Self {
            service,
            runtime,
            current,
        }
    }

    fn line_id(&self) -> LineId {
        LineId(self.current.load(Ordering::SeqCst))
    }

    /// `line` with ANSI truecolor escapes, or `None` when highlighting failed
    fn colorize(
        &self,
        line: &str,
    ) -> Option<String> {
        let spans = self
            .runtime
            .block_on(self.service.highlight(self.line_id(), line))
            .ok()?;
        Some(paint(line, &spans))
    }
}

/// Apply `spans` to `line`; spans that overlap, run past the end or split a
/// character are left uncolored
fn paint(
    line: &str,
    spans: &[ColorSpan],
) -> String {
    let mut out = String::with_capacity(line.len() * 2);
    let mut cursor = 0;
    for span in spans {
        let fits = cursor <= span.start
            && span.start <= span.end
            && span.end <= line.len()
            && line.is_char_boundary(span.start)
            && line.is_char_boundary(span.end);
        if !fits {
            continue;
        }
        out.push_str(&line[cursor..span.start]);
        let text = &line[span.start..span.end];
        let c = span.color;
        out.push_str(&text.truecolor(c.r, c.g, c.b).to_string());
        cursor = span.end;
    }
    out.push_str(&line[cursor..]);
    out
}

impl Completer for LineHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        if line.starts_with(':') || !line.is_char_boundary(pos) {
            return Ok((pos, Vec::new()));
        }
        let start = pos - typed_fragment(line, pos).len();
        let items = match self
            .runtime
            .block_on(self.service.complete_code(self.line_id(), line, pos))
        {
            Ok(items) => items,
            Err(e) => {
                debug!("Completion failed: {}", e);
                Vec::new()
            }
        };

        let candidates = items
            .into_iter()
            .map(|item| Pair {
                display: match &item.detail {
                    Some(detail) => format!("{}  {}", item.label, detail.dimmed()),
                    None => item.label.clone(),
                },
                replacement: item.label,
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Highlighter for LineHelper {
    fn highlight<'l>(
        &self,
        line: &'l str,
        _pos: usize,
    ) -> Cow<'l, str> {
        if line.is_empty() || line.starts_with(':') {
            return Cow::Borrowed(line);
        }
        match self.colorize(line) {
            Some(colored) => Cow::Owned(colored),
            None => Cow::Borrowed(line),
        }
    }

    fn highlight_char(
        &self,
        _line: &str,
        _pos: usize,
        _forced: bool,
    ) -> bool {
        true
    }
}

impl Hinter for LineHelper {
    type Hint = String;
}

impl Validator for LineHelper {}

impl Helper for LineHelper {}

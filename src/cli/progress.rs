// src/cli/progress.rs — Terminal progress renderer for live run feedback

use tokio::sync::watch;

use crate::core::state::AgentState;
use crate::core::types::{ActionKind, AgentPhase};

/// Render snapshots to stderr until the run stops.
///
/// All progress output goes to stderr so stdout remains clean for the
/// final report.
pub async fn render(mut snapshots: watch::Receiver<AgentState>) {
    let mut printer = ProgressPrinter::new();
    loop {
        let done = {
            let state = snapshots.borrow_and_update();
            for line in printer.lines(&state) {
                eprintln!("{}", line);
            }
            state.phase == AgentPhase::Stopped
        };
        if done || snapshots.changed().await.is_err() {
            break;
        }
    }
}

/// Tracks what has already been printed and turns each new snapshot
/// into the lines describing what changed.
pub struct ProgressPrinter {
    phase: AgentPhase,
    iteration: u32,
    decisions: usize,
    evaluations: usize,
    errors: usize,
}

impl ProgressPrinter {
    pub fn new() -> Self {
        Self {
            phase: AgentPhase::Idle,
            iteration: 0,
            decisions: 0,
            evaluations: 0,
            errors: 0,
        }
    }

    pub fn lines(&mut self, state: &AgentState) -> Vec<String> {
        let mut out = Vec::new();

        if state.iteration > self.iteration {
            out.push(format!(
                "[iter {}/{}] deciding...",
                state.iteration, state.config.max_iterations
            ));
            self.iteration = state.iteration;
        }

        while self.decisions < state.decisions.len() {
            let d = &state.decisions[self.decisions];
            out.push(match d.action {
                ActionKind::Wait => {
                    format!("[iter {}] wait: {}", d.iteration, truncate(&d.reasoning, 70))
                }
                _ => format!(
                    "[iter {}] {} {} ({:.0}%)",
                    d.iteration,
                    d.action,
                    truncate(&d.target, 40),
                    d.confidence * 100.0
                ),
            });
            self.decisions += 1;
        }

        while self.evaluations < state.evaluations.len() {
            let e = &state.evaluations[self.evaluations];
            out.push(format!(
                "[iter {}] quality={:.2} style={:.2} {} (${:.2})",
                e.iteration,
                e.quality_score,
                e.style_score,
                if e.success { "ok" } else { "miss" },
                state.spent_usd,
            ));
            self.evaluations += 1;
        }

        while self.errors < state.errors.len() {
            out.push(format!("[error] {}", state.errors[self.errors]));
            self.errors += 1;
        }

        if state.phase != self.phase {
            match state.phase {
                AgentPhase::Paused => out.push("[run] paused".into()),
                AgentPhase::Running if self.phase == AgentPhase::Paused => {
                    out.push("[run] resumed".into());
                }
                AgentPhase::Stopped => {
                    let reason = state
                        .stop_reason
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "stopped".into());
                    out.push(format!(
                        "[done] {} after {} iteration(s), quality={:.2} style={:.2} spent=${:.2}",
                        reason,
                        state.iteration,
                        state.progress.mean_quality,
                        state.progress.mean_style,
                        state.spent_usd,
                    ));
                }
                _ => {}
            }
            self.phase = state.phase;
        }

        out
    }
}

impl Default for ProgressPrinter {
    fn default() -> Self {
        Self::new()
    }
}

/// Cut a string for a log line without splitting a UTF-8 character.
fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

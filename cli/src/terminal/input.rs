use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, bail};
use colored::*;
use console::Term;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use sweepr_common::{success, warn};
use sweepr_core::sweep::StopSignal;

use crate::terminal::colors;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const MAX_PROMPT_ATTEMPTS: usize = 3;

/// Turns a `q` or Ctrl-C key press into a stop request while alive.
///
/// The terminal is in raw mode for the lifetime of the handle, so Ctrl-C arrives
/// as a key event instead of a signal.
pub struct InputHandle {
    done: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl InputHandle {
    pub fn start(stop: StopSignal) -> Self {
        let done: Arc<AtomicBool> = Arc::new(AtomicBool::new(false));
        let done_flag = Arc::clone(&done);

        let worker = thread::spawn(move || {
            if let Err(e) = enable_raw_mode() {
                warn!("key presses will be ignored: {e}");
                return;
            }

            while !done_flag.load(Ordering::Relaxed) {
                if !matches!(event::poll(POLL_INTERVAL), Ok(true)) {
                    continue;
                }
                if let Ok(Event::Key(key_event)) = event::read() {
                    let is_q = key_event.code == KeyCode::Char('q');
                    let is_ctrl_c = key_event.code == KeyCode::Char('c')
                        && key_event.modifiers.contains(KeyModifiers::CONTROL);

                    if (is_q || is_ctrl_c) && key_event.kind == KeyEventKind::Press {
                        stop.stop();
                        break;
                    }
                }
            }
            let _ = disable_raw_mode();
        });

        Self {
            done,
            worker: Some(worker),
        }
    }
}

impl Drop for InputHandle {
    fn drop(&mut self) {
        self.done.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        let _ = disable_raw_mode();
    }
}

/// Stop source used when the terminal must not be touched: plain SIGINT.
pub fn spawn_ctrl_c(stop: StopSignal) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.stop();
        }
    })
}

/// Asks a question on the terminal and returns the trimmed answer.
pub fn prompt(question: &str) -> anyhow::Result<String> {
    let term = Term::stdout();
    let marker: ColoredString = "?".color(colors::ACCENT).bold();
    term.write_str(&format!("{} {} ", marker, question.color(colors::TEXT_DEFAULT)))
        .context("failed to write prompt")?;
    let answer: String = term.read_line().context("failed to read answer")?;
    Ok(answer.trim().to_string())
}

/// Prompts until `parse` accepts the answer, giving up after a few attempts.
pub fn prompt_until<T, E, F>(question: &str, mut parse: F) -> anyhow::Result<T>
where
    F: FnMut(&str) -> Result<T, E>,
    E: std::fmt::Display,
{
    for _ in 0..MAX_PROMPT_ATTEMPTS {
        let answer: String = prompt(question)?;
        match parse(&answer) {
            Ok(value) => return Ok(value),
            Err(e) => warn!("{e}"),
        }
    }
    bail!("no valid answer after {MAX_PROMPT_ATTEMPTS} attempts")
}

/// Parses a 1-based menu choice into an index into `options`.
pub fn parse_choice(answer: &str, options: usize) -> Result<usize, String> {
    match answer.trim().parse::<usize>() {
        Ok(n) if (1..=options).contains(&n) => Ok(n - 1),
        _ => Err(format!("expected a number between 1 and {options}, got '{answer}'")),
    }
}

/// Asks for a network name by number.
pub fn choose(question: &str, options: &[String]) -> anyhow::Result<usize> {
    let idx: usize = prompt_until(question, |answer| parse_choice(answer, options.len()))?;
    success!("Selected {}", options[idx].color(colors::PRIMARY));
    Ok(idx)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_is_one_based() {
        assert_eq!(parse_choice("1", 3), Ok(0));
        assert_eq!(parse_choice(" 3 ", 3), Ok(2));
    }

    #[test]
    fn choice_out_of_range() {
        assert!(parse_choice("0", 3).is_err());
        assert!(parse_choice("4", 3).is_err());
        assert!(parse_choice("two", 3).is_err());
        assert!(parse_choice("", 0).is_err());
    }
}

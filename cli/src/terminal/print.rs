//! Layout of everything written to stdout besides log records.
//!
//! Lines are built by pure functions and only then handed to [`print`], so
//! their width can be checked without a terminal.

use std::fmt::Display;

use crate::terminal::colors;
use crate::terminal::format::Detail;
use colored::*;
use sweepr_common::info;
use sweepr_common::log::PRINT_TARGET;
use unicode_width::UnicodeWidthStr;

pub const TOTAL_WIDTH: usize = 64;
/// Key column of the `> key....: value` lines printed before a sweep.
const FIELD_KEY_WIDTH: usize = 12;
/// Key column of host and network trees, dots included.
const TREE_KEY_WIDTH: usize = 7;

#[macro_export]
macro_rules! mprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

pub fn banner(no_banner: bool, q_level: u8) {
    if no_banner || q_level > 0 {
        return;
    }
    print(&banner_line());
}

pub fn header(title: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }
    print(&header_line(title));
}

pub fn separator() {
    print(&"═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR).to_string());
}

pub fn field(key: &str, value: impl Display) {
    print(&field_line(key, value));
}

pub fn tree(idx: usize, name: &str, details: &[Detail]) {
    for line in tree_lines(idx, name, details) {
        print(&line);
    }
}

pub fn centered(msg: &str) {
    print(&center(msg));
}

/// Shown in place of a result list that came back empty.
pub fn nothing_found(what: &str) {
    centered(&format!("no {what} found").red().bold().to_string());
}

pub fn banner_line() -> String {
    let label: String = format!("⟦ SWEEPR v{} ⟧", env!("CARGO_PKG_VERSION"));
    framed(&label, label.bright_green().bold(), "═")
}

pub fn header_line(title: &str) -> String {
    let label: String = format!("⟦ {} ⟧", title.to_uppercase());
    framed(&label, label.bright_green(), "─")
}

/// `plain` is the uncoloured text of `label`, used to measure it.
fn framed(plain: &str, label: ColoredString, fill: &str) -> String {
    let pad: usize = TOTAL_WIDTH.saturating_sub(UnicodeWidthStr::width(plain));
    let left: usize = pad / 2;

    format!(
        "{}{}{}",
        fill.repeat(left).bright_black(),
        label,
        fill.repeat(pad - left).bright_black()
    )
}

pub fn field_line(key: &str, value: impl Display) -> String {
    let dots: String = ".".repeat(FIELD_KEY_WIDTH.saturating_sub(key.len()));
    format!(
        "{} {}{}{} {}",
        ">".color(colors::SEPARATOR),
        key.color(colors::PRIMARY),
        dots.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR),
        value
    )
}

/// `[idx] name` followed by one branch per detail.
pub fn tree_lines(idx: usize, name: &str, details: &[Detail]) -> Vec<String> {
    let head: String = format!(
        "{}{}{} {}",
        "[".color(colors::SEPARATOR),
        idx.to_string().color(colors::ACCENT),
        "]".color(colors::SEPARATOR),
        name.color(colors::PRIMARY)
    );

    let branches = details.iter().enumerate().map(|(i, (key, value))| {
        let branch: &str = if i + 1 == details.len() { "└─" } else { "├─" };
        let dots: String = ".".repeat(TREE_KEY_WIDTH.saturating_sub(key.len()));
        format!(
            " {} {}{}{} {}",
            branch.bright_black(),
            key.color(colors::TEXT_DEFAULT),
            dots.color(colors::SEPARATOR),
            ":".color(colors::SEPARATOR),
            value
        )
    });

    std::iter::once(head).chain(branches).collect()
}

pub fn center(msg: &str) -> String {
    let space: String = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    format!("{space}{msg}")
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

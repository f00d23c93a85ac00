// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Terminal output helpers

use console::style;

pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

pub fn info(message: &str) {
    println!("{} {}", style("→").cyan(), message);
}

pub fn warning(message: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Prints an aligned `key: value` line.
pub fn field(key: &str, value: &str) {
    println!("  {:<12} {}", format!("{key}:"), value);
}

// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Proptest Strategies

use proptest::prelude::*;

/// Signature field values (no separators, non-empty).
pub fn field_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9._-]{1,24}"
}

/// Replaces the character at `pos % len` with a different one.
pub fn mutate_one_char(value: &str, pos: usize) -> String {
    let mut chars: Vec<char> = value.chars().collect();
    let idx = pos % chars.len();
    chars[idx] = if chars[idx] == 'x' { 'y' } else { 'x' };
    chars.into_iter().collect()
}

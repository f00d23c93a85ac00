// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI Commands

pub mod click;
pub mod content;
pub mod open;
pub mod session;
pub mod sign;
pub mod verify;

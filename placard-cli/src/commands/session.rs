// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Session Commands

use std::fs;

use anyhow::Result;
use placard_core::session::{SESSION_COUNT_KEY, TOTAL_TIME_KEY};
use placard_core::{KeyValueStore, SqliteStore};

use crate::config::CliConfig;
use crate::display;

/// Shows the persisted session totals.
pub fn show(config: &CliConfig) -> Result<()> {
    fs::create_dir_all(&config.data_dir)?;
    let store = SqliteStore::open(config.session_path())?;
    let total = store.get_u64(TOTAL_TIME_KEY)?.unwrap_or(0);
    let count = store.get_u64(SESSION_COUNT_KEY)?.unwrap_or(0);

    println!();
    display::field("total time", &format!("{}s", total));
    display::field("sessions", &count.to_string());
    println!();
    Ok(())
}

/// Clears the persisted session totals.
pub fn reset(config: &CliConfig) -> Result<()> {
    fs::create_dir_all(&config.data_dir)?;
    let mut store = SqliteStore::open(config.session_path())?;
    store.remove(TOTAL_TIME_KEY)?;
    store.remove(SESSION_COUNT_KEY)?;
    display::success("Session totals cleared");
    Ok(())
}

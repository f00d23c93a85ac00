// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Session open and resource precaching

mod prefetch;
mod request;

pub use prefetch::{PrefetchOutcome, PrefetchQueue, BAD_REQUEST, PREFETCH_MAX_REDIRECTS};
pub use request::{OpenDelegate, OpenRequest, OPEN_ENDPOINT};

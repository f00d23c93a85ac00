// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! API request base: signing, transport and envelope handling.

mod envelope;
mod error;
mod request;

pub use envelope::{parse_envelope, JsonObject, RESPONSE_FIELD};
pub use error::{EnvelopeError, RequestError};
pub use request::{ApiDelegate, ApiRequest, ParamProvider, RequestSpec};

// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Content requests and renderer integration
//!
//! Rendering itself is the host's job. The SDK hands a [`Content`] payload
//! to a [`HostHandle`] and receives [`RendererEvent`]s back, tagged with the
//! request's content tag.

mod dismiss;
mod host;
mod payload;
mod request;
mod rewards;
mod state;

pub use dismiss::{DismissLog, DEFAULT_DISMISS_CAPACITY};
pub use host::HostHandle;
pub use payload::{Content, Frame, Frames, Orientation, Rect, Transition, FULLSCREEN_FRAME};
pub use request::{ContentDelegate, ContentRequest, DismissType, RendererEvent, CONTENT_ENDPOINT};
pub use rewards::{
    parse_purchases, parse_rewards, purchase_signature, reward_signature, validate_purchase,
    validate_reward, Purchase, Reward,
};
pub use state::RequestState;

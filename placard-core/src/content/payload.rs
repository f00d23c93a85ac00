// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Content payload handed to the renderer.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::api::JsonObject;

/// Marker frame meaning "fill the screen".
pub const FULLSCREEN_FRAME: &str = "PH_FULLSCREEN";
const LANDSCAPE_KEY: &str = "PH_LANDSCAPE";
const PORTRAIT_KEY: &str = "PH_PORTRAIT";
const DIALOG_TRANSITION: &str = "PH_DIALOG";

/// Screen orientation a frame applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Landscape,
    Portrait,
}

/// Display rectangle in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Where content should appear for one orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Frame {
    Fullscreen,
    Rect(Rect),
}

/// Frames declared by the payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Frames {
    Fullscreen,
    ByOrientation {
        landscape: Option<Rect>,
        portrait: Option<Rect>,
    },
    /// No usable frame data.
    #[default]
    Missing,
}

/// How the renderer brings the content on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transition {
    #[default]
    Modal,
    Dialog,
}

/// Renderable content returned by a content request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Content {
    /// Template URL. `None` means nothing to show.
    pub url: Option<Url>,
    pub frames: Frames,
    pub transition: Transition,
    /// Delay before the close button appears.
    pub close_delay: Duration,
    /// URL pinged when the content is closed.
    pub close_ping: Option<String>,
    /// Opaque blob passed through to the template.
    pub context: Value,
}

impl Content {
    /// Reads a content payload leniently. Unknown or malformed fields fall
    /// back to their defaults.
    pub fn from_response(response: &JsonObject) -> Self {
        let url = response
            .get("url")
            .and_then(Value::as_str)
            .and_then(|s| Url::parse(s).ok());

        let frames = match response.get("frame") {
            Some(Value::String(s)) if s == FULLSCREEN_FRAME => Frames::Fullscreen,
            Some(Value::Object(map)) => Frames::ByOrientation {
                landscape: map.get(LANDSCAPE_KEY).and_then(parse_rect),
                portrait: map.get(PORTRAIT_KEY).and_then(parse_rect),
            },
            _ => Frames::Missing,
        };

        let transition = match response.get("transition").and_then(Value::as_str) {
            Some(DIALOG_TRANSITION) => Transition::Dialog,
            _ => Transition::Modal,
        };

        let close_delay = response
            .get("close_delay")
            .and_then(Value::as_f64)
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(Duration::from_secs_f64)
            .unwrap_or_default();

        let close_ping = response
            .get("close_ping")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Content {
            url,
            frames,
            transition,
            close_delay,
            close_ping,
            context: response.get("context").cloned().unwrap_or(Value::Null),
        }
    }

    /// Whether there is anything to render.
    pub fn has_target(&self) -> bool {
        self.url.is_some()
    }

    /// Frame for the given orientation, `None` if the payload lacks one.
    pub fn frame_for(&self, orientation: Orientation) -> Option<Frame> {
        match &self.frames {
            Frames::Fullscreen => Some(Frame::Fullscreen),
            Frames::ByOrientation {
                landscape,
                portrait,
            } => match orientation {
                Orientation::Landscape => landscape.map(Frame::Rect),
                Orientation::Portrait => portrait.map(Frame::Rect),
            },
            Frames::Missing => None,
        }
    }
}

fn parse_rect(value: &Value) -> Option<Rect> {
    serde_json::from_value(value.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_full_payload() {
        let response = object(json!({
            "url": "https://content.test/template.html",
            "frame": {
                "PH_LANDSCAPE": {"x": 0, "y": 0, "w": 480, "h": 320},
                "PH_PORTRAIT": {"x": 0, "y": 0, "w": 320, "h": 480}
            },
            "transition": "PH_DIALOG",
            "close_delay": 2.5,
            "close_ping": "https://content.test/ping",
            "context": {"campaign": 7}
        }));

        let content = Content::from_response(&response);
        assert!(content.has_target());
        assert_eq!(content.transition, Transition::Dialog);
        assert_eq!(content.close_delay, Duration::from_millis(2500));
        assert_eq!(content.close_ping.as_deref(), Some("https://content.test/ping"));
        assert_eq!(content.context["campaign"], 7);
        assert_eq!(
            content.frame_for(Orientation::Portrait),
            Some(Frame::Rect(Rect {
                x: 0.0,
                y: 0.0,
                w: 320.0,
                h: 480.0
            }))
        );
    }

    #[test]
    fn test_fullscreen_frame_applies_to_both_orientations() {
        let response = object(json!({"url": "https://c.test/", "frame": "PH_FULLSCREEN"}));
        let content = Content::from_response(&response);
        assert_eq!(content.frame_for(Orientation::Landscape), Some(Frame::Fullscreen));
        assert_eq!(content.frame_for(Orientation::Portrait), Some(Frame::Fullscreen));
    }

    #[test]
    fn test_missing_url_has_no_target() {
        let content = Content::from_response(&object(json!({"frame": "PH_FULLSCREEN"})));
        assert!(!content.has_target());
        assert_eq!(content.transition, Transition::Modal);
        assert_eq!(content.close_delay, Duration::ZERO);
    }
}

// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

/// Lifecycle stage of a content request, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum RequestState {
    #[default]
    Initialized,
    Preloading,
    Preloaded,
    DisplayingContent,
    Done,
}

impl RequestState {
    /// Moves to `next` only if it is later. Returns whether it moved.
    pub fn advance(&mut self, next: RequestState) -> bool {
        if next > *self {
            *self = next;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_is_forward_only() {
        let mut state = RequestState::Preloaded;
        assert!(!state.advance(RequestState::Initialized));
        assert!(!state.advance(RequestState::Preloaded));
        assert_eq!(state, RequestState::Preloaded);
        assert!(state.advance(RequestState::Done));
        assert_eq!(state, RequestState::Done);
    }
}

//! Captcha widget state.
//!
//! The token is produced by a third-party widget and forwarded to the
//! backend untouched; nothing here verifies it.

use serde::Serialize;

/// Opaque token from the captcha widget.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CaptchaToken(String);

impl CaptchaToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Lifecycle of the captcha widget on a form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CaptchaState {
    #[default]
    Loading,
    Ready,
    Verified(CaptchaToken),
    Expired,
    LoadFailed { attempts: u32 },
}

impl CaptchaState {
    /// The widget script finished loading.
    pub fn loaded(&mut self) {
        *self = Self::Ready;
    }

    /// The user solved the challenge. Blank tokens are ignored.
    pub fn verify(&mut self, token: impl Into<String>) {
        let token = token.into();
        if token.trim().is_empty() {
            return;
        }
        *self = Self::Verified(CaptchaToken(token));
    }

    /// The widget reported the token as expired.
    pub fn expire(&mut self) {
        *self = Self::Expired;
    }

    /// The widget script failed to load.
    pub fn load_failed(&mut self) {
        let attempts = match self {
            Self::LoadFailed { attempts } => *attempts + 1,
            _ => 1,
        };
        *self = Self::LoadFailed { attempts };
    }

    /// Token to forward, if the challenge is solved.
    pub fn token(&self) -> Option<&CaptchaToken> {
        match self {
            Self::Verified(token) => Some(token),
            _ => None,
        }
    }

    /// Whether the UI should offer a reload to recover the widget.
    pub fn needs_reload(&self) -> bool {
        matches!(self, Self::LoadFailed { .. })
    }
}

//! Inline-button payloads
//!
//! Wire format: `customize_<token>`, `position_<anchor>_<token>`,
//! `change_watermark_<token>`. Anchor tags contain no `_`, so the first
//! underscore after `position_` always ends the anchor.

use std::str::FromStr;

use crate::session::PhotoToken;
use crate::watermark::Anchor;

const CUSTOMIZE: &str = "customize_";
const POSITION: &str = "position_";
const CHANGE_WATERMARK: &str = "change_watermark_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Customize { token: PhotoToken },
    SetPosition { anchor: Anchor, token: PhotoToken },
    ChangeWatermark { token: PhotoToken },
}

impl CallbackAction {
    /// Parses callback data; `None` for anything not produced by [`encode`](Self::encode).
    pub fn parse(data: &str) -> Option<Self> {
        if let Some(token) = data.strip_prefix(CHANGE_WATERMARK) {
            return non_empty(token).map(|token| CallbackAction::ChangeWatermark { token });
        }
        if let Some(token) = data.strip_prefix(CUSTOMIZE) {
            return non_empty(token).map(|token| CallbackAction::Customize { token });
        }
        if let Some(rest) = data.strip_prefix(POSITION) {
            let (anchor, token) = rest.split_once('_')?;
            let anchor = Anchor::from_str(anchor).ok()?;
            return non_empty(token).map(|token| CallbackAction::SetPosition { anchor, token });
        }
        None
    }

    pub fn encode(&self) -> String {
        match self {
            CallbackAction::Customize { token } => format!("{}{}", CUSTOMIZE, token),
            CallbackAction::SetPosition { anchor, token } => format!("{}{}_{}", POSITION, anchor, token),
            CallbackAction::ChangeWatermark { token } => format!("{}{}", CHANGE_WATERMARK, token),
        }
    }

    pub fn token(&self) -> &PhotoToken {
        match self {
            CallbackAction::Customize { token }
            | CallbackAction::SetPosition { token, .. }
            | CallbackAction::ChangeWatermark { token } => token,
        }
    }
}

fn non_empty(token: &str) -> Option<PhotoToken> {
    if token.is_empty() {
        None
    } else {
        Some(PhotoToken::from(token))
    }
}

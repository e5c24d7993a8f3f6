//! Platform-neutral inline keyboards

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use super::callback::CallbackAction;
use super::messages;
use crate::session::PhotoToken;
use crate::watermark::anchor::ANCHOR_GRID;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn callback(label: impl Into<String>, action: &CallbackAction) -> Self {
        Self {
            label: label.into(),
            data: action.encode(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// "Customize Position" / "Change Watermark" row attached to every result photo.
    pub fn result_actions(token: &PhotoToken) -> Self {
        Self {
            rows: vec![vec![
                Button::callback(
                    messages::BUTTON_CUSTOMIZE,
                    &CallbackAction::Customize { token: token.clone() },
                ),
                Button::callback(
                    messages::BUTTON_CHANGE_WATERMARK,
                    &CallbackAction::ChangeWatermark { token: token.clone() },
                ),
            ]],
        }
    }

    /// Anchor picker: six buttons in the four rows of the anchor grid.
    pub fn anchor_grid(token: &PhotoToken) -> Self {
        let rows = ANCHOR_GRID
            .iter()
            .map(|row| {
                row.iter()
                    .map(|anchor| {
                        Button::callback(
                            anchor.label(),
                            &CallbackAction::SetPosition {
                                anchor: *anchor,
                                token: token.clone(),
                            },
                        )
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// All callback payloads, row by row.
    pub fn callback_data(&self) -> Vec<&str> {
        self.rows.iter().flatten().map(|b| b.data.as_str()).collect()
    }
}

impl From<&Keyboard> for InlineKeyboardMarkup {
    fn from(keyboard: &Keyboard) -> Self {
        InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
            row.iter()
                .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.data.clone()))
                .collect::<Vec<_>>()
        }))
    }
}

//! Converts the platform-agnostic [`InlineKeyboard`] into teloxide's own
//! `InlineKeyboardMarkup` (§6 "Callback-data grammar", §9 Design Notes).

use interact_core::keyboard::InlineKeyboard;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

pub fn to_teloxide(keyboard: &InlineKeyboard) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = keyboard
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|b| InlineKeyboardButton::callback(b.text.clone(), b.callback_data.clone()))
                .collect()
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use interact_core::keyboard::InlineButton;

    #[test]
    fn converts_rows_and_buttons() {
        let kb = InlineKeyboard::new().row(vec![InlineButton::new("✎", "tweak_gen:g1")]);
        let markup = to_teloxide(&kb);
        assert_eq!(markup.inline_keyboard.len(), 1);
        assert_eq!(markup.inline_keyboard[0].len(), 1);
    }
}

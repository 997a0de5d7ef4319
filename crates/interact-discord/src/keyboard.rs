//! Converts the platform-agnostic [`InlineKeyboard`] into serenity's
//! message-component action rows (§6 "Callback-data grammar", §9 Design
//! Notes). Discord has no native "inline keyboard" concept; the nearest
//! equivalent is a button-bearing `CreateActionRow`, with the same
//! callback-data string carried as the button's `custom_id`.

use interact_core::keyboard::InlineKeyboard;
use serenity::builder::{CreateActionRow, CreateButton};
use serenity::model::application::ButtonStyle;

pub fn to_action_rows(keyboard: &InlineKeyboard) -> Vec<CreateActionRow> {
    keyboard
        .rows()
        .iter()
        .map(|row| {
            let buttons = row
                .iter()
                .map(|b| {
                    CreateButton::new(b.callback_data.clone())
                        .label(b.text.clone())
                        .style(ButtonStyle::Secondary)
                })
                .collect();
            CreateActionRow::Buttons(buttons)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use interact_core::keyboard::InlineButton;

    #[test]
    fn converts_rows_and_buttons() {
        let kb = InlineKeyboard::new().row(vec![InlineButton::new("✎", "tweak_gen:g1")]);
        let rows = to_action_rows(&kb);
        assert_eq!(rows.len(), 1);
    }
}

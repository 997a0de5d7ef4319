//! C5 Handler Set: every `CommandHandler`/`CallbackHandler`/`ReplyHandler`
//! named in §4, wired onto a [`Dispatchers`] by [`register_all`].

pub mod common;
pub mod delivery;
pub mod entry;
pub mod hide;
pub mod info;
pub mod link;
pub mod lora;
pub mod rate;
pub mod rerun;
pub mod settings;
pub mod tweak;

use std::sync::Arc;

use interact_core::config::CALLBACK_DATA_MAX_BYTES;
use interact_dispatch::grammar::{
    HIDE_MENU, LINK_PREFIX, LORA_PREFIX, RATE_GEN_PREFIX, RERUN_GEN_PREFIX, RESTORE_DELIVERY_PREFIX,
    SET_PREFIX, TWEAK_APPLY_PREFIX, TWEAK_CANCEL_PREFIX, TWEAK_GEN_PREFIX, TWEAK_MENU_RENDER_PREFIX,
    TWEAK_PARAM_EDIT_PREFIX, VIEW_GEN_INFO_PREFIX, VIEW_SPELL_STEP_PREFIX, WALLET_PREFIX,
    SETTINGS_PARAM_EDIT, TWEAK_PARAM_EDIT, WALLET_MAGIC_AMOUNT,
};
use interact_dispatch::registry::Dispatchers;

/// Remaining room after a prefix, up to the platform's 64-byte
/// callback-data limit. Each registration below passes `width(PREFIX)` as
/// its `max_token_width`, so adding characters to a prefix can never
/// silently exceed `CALLBACK_DATA_MAX_BYTES` without the subtraction
/// itself underflowing first (§9).
const fn width(prefix: &str) -> usize {
    CALLBACK_DATA_MAX_BYTES - prefix.len()
}

/// Registers every command, callback, and reply handler in this crate onto
/// `dispatchers`. Call once at gateway startup, before any adapter starts
/// forwarding events.
pub fn register_all(dispatchers: &mut Dispatchers) {
    dispatchers.commands.register(r"^/start(?:@\w+)?\s*$", Arc::new(entry::StartCommandHandler));
    dispatchers.commands.register(r"^/help(?:@\w+)?\s*$", Arc::new(entry::HelpCommandHandler));
    dispatchers.commands.register(r"^/settings(?:@\w+)?\s*$", Arc::new(entry::SettingsCommandHandler));
    dispatchers.commands.register(r"^/loras(?:@\w+)?\s*$", Arc::new(entry::LorasCommandHandler));
    dispatchers
        .commands
        .register(r"^/link(?:@\w+)?(?:\s+(\S+))?\s*$", Arc::new(link::LinkCommandHandler));
    dispatchers.commands.register(r"^/wallet(?:@\w+)?\s*$", Arc::new(link::WalletCommandHandler));

    dispatchers
        .callbacks
        .register(TWEAK_GEN_PREFIX, width(TWEAK_GEN_PREFIX), Arc::new(tweak::TweakOpenHandler));
    dispatchers
        .callbacks
        .register(TWEAK_CANCEL_PREFIX, width(TWEAK_CANCEL_PREFIX), Arc::new(tweak::TweakCancelHandler));
    dispatchers.callbacks.register(
        TWEAK_PARAM_EDIT_PREFIX,
        width(TWEAK_PARAM_EDIT_PREFIX),
        Arc::new(tweak::TweakParamEditHandler),
    );
    dispatchers
        .callbacks
        .register(TWEAK_APPLY_PREFIX, width(TWEAK_APPLY_PREFIX), Arc::new(tweak::TweakApplyHandler));
    dispatchers.callbacks.register(
        TWEAK_MENU_RENDER_PREFIX,
        width(TWEAK_MENU_RENDER_PREFIX),
        Arc::new(tweak::TweakMenuRenderHandler),
    );

    dispatchers
        .callbacks
        .register(RERUN_GEN_PREFIX, width(RERUN_GEN_PREFIX), Arc::new(rerun::RerunHandler));
    dispatchers
        .callbacks
        .register(RATE_GEN_PREFIX, width(RATE_GEN_PREFIX), Arc::new(rate::RateGenHandler));
    dispatchers.callbacks.register(
        VIEW_GEN_INFO_PREFIX,
        width(VIEW_GEN_INFO_PREFIX),
        Arc::new(info::ViewGenInfoHandler),
    );
    dispatchers.callbacks.register(
        VIEW_SPELL_STEP_PREFIX,
        width(VIEW_SPELL_STEP_PREFIX),
        Arc::new(info::ViewSpellStepHandler),
    );
    dispatchers.callbacks.register(
        RESTORE_DELIVERY_PREFIX,
        width(RESTORE_DELIVERY_PREFIX),
        Arc::new(delivery::RestoreDeliveryHandler),
    );
    dispatchers.callbacks.register(HIDE_MENU, 0, Arc::new(hide::HideMenuHandler));

    dispatchers
        .callbacks
        .register(SET_PREFIX, width(SET_PREFIX), Arc::new(settings::SettingsMenuHandler));
    dispatchers
        .callbacks
        .register(LORA_PREFIX, width(LORA_PREFIX), Arc::new(lora::LoraBrowserHandler));
    dispatchers
        .callbacks
        .register(WALLET_PREFIX, width(WALLET_PREFIX), Arc::new(link::WalletAddHandler));
    dispatchers
        .callbacks
        .register(LINK_PREFIX, width(LINK_PREFIX), Arc::new(link::LinkActionHandler));

    dispatchers
        .replies
        .register(SETTINGS_PARAM_EDIT, Arc::new(settings::SettingsParamEditReplyHandler));
    dispatchers
        .replies
        .register(TWEAK_PARAM_EDIT, Arc::new(tweak::TweakParamEditReplyHandler));
    dispatchers
        .replies
        .register(WALLET_MAGIC_AMOUNT, Arc::new(link::WalletMagicAmountReplyHandler));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_all_does_not_panic_on_width_limits() {
        let mut dispatchers = Dispatchers::new();
        register_all(&mut dispatchers);
    }
}

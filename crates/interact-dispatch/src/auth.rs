//! §4.2 Authorization: most inline buttons are private to the originating
//! user; `rate_gen:*` is intentionally public in group chats.

use crate::error::{DispatchError, Result};
use crate::event::IncomingCallback;

/// Callback-data prefix that is exempt from the owner-only rule in group
/// chats (§4.2, §8 invariant 5).
pub const PUBLIC_IN_GROUPS_PREFIX: &str = "rate_gen:";

/// Enforce §4.2: if the bot message is a reply to a user command, only the
/// original commander may act on it — except `rate_gen:*` in a group or
/// supergroup chat, which is open to all members.
pub fn check(prefix: &str, event: &IncomingCallback) -> Result<()> {
    if prefix == PUBLIC_IN_GROUPS_PREFIX && event.is_group {
        return Ok(());
    }

    match &event.owner_user_id {
        Some(owner) if owner != &event.sender.platform_id => Err(DispatchError::Unauthorized),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Sender;
    use interact_core::types::Platform;

    fn event(owner: Option<&str>, is_group: bool) -> IncomingCallback {
        IncomingCallback {
            sender: Sender {
                platform: Platform::Telegram,
                platform_id: "presser".to_string(),
                username: None,
                first_name: None,
                master_account_id: "acct-presser".to_string(),
            },
            chat_id: "chat1".to_string(),
            message_id: "msg1".to_string(),
            callback_id: "cbq1".to_string(),
            callback_data: "tweak_gen:g1".to_string(),
            is_group,
            owner_user_id: owner.map(str::to_string),
            current_keyboard: None,
        }
    }

    #[test]
    fn owner_may_act_on_their_own_menu() {
        assert!(check("tweak_gen:", &event(Some("presser"), false)).is_ok());
    }

    #[test]
    fn non_owner_denied_in_private_chat() {
        assert!(matches!(
            check("tweak_gen:", &event(Some("someone_else"), false)),
            Err(DispatchError::Unauthorized)
        ));
    }

    #[test]
    fn non_owner_denied_in_group_for_non_rate_prefix() {
        assert!(matches!(
            check("tweak_gen:", &event(Some("someone_else"), true)),
            Err(DispatchError::Unauthorized)
        ));
    }

    #[test]
    fn rate_gen_open_to_anyone_in_group() {
        assert!(check(PUBLIC_IN_GROUPS_PREFIX, &event(Some("someone_else"), true)).is_ok());
    }

    #[test]
    fn rate_gen_still_owner_only_in_private_chat() {
        assert!(matches!(
            check(PUBLIC_IN_GROUPS_PREFIX, &event(Some("someone_else"), false)),
            Err(DispatchError::Unauthorized)
        ));
    }

    #[test]
    fn no_owner_means_no_commander_to_enforce_against() {
        assert!(check("tweak_gen:", &event(None, false)).is_ok());
    }
}

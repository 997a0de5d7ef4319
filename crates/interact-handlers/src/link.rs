//! Platform-Link and Wallet-Link flows (§4.8): `/link <0x…>`, `/wallet`,
//! and the Approve/Reject/Report buttons on a pending merge request.

use async_trait::async_trait;

use interact_core::config::DEFAULT_LINK_CHAIN_ID;
use interact_core::keyboard::{InlineButton, InlineKeyboard};
use interact_core::outbound::OutgoingMessage;
use interact_core::safety::escape;
use interact_data::types::{MagicAmountRequest, PlatformLinkRequest};
use interact_dispatch::grammar::{link_approve, link_magic, link_reject, link_report, parse_link_action, wallet_add};
use interact_dispatch::{
    CommandHandler, CommandMatch, DispatchError, IncomingCallback, IncomingCommand, IncomingReply,
    InteractionContext, ReplyHandler, Result,
};
use interact_dispatch::{CallbackHandler, transport::MessageRef};
use interact_state::ReplyContext;

fn abbreviate_address(addr: &str) -> String {
    if addr.len() <= 14 {
        return addr.to_string();
    }
    format!("{}\u{2026}{}", &addr[..8], &addr[addr.len() - 4..])
}

async fn send_reply(ctx: &dyn InteractionContext, chat_id: &str, reply_to: &str, text: &str) {
    let message = OutgoingMessage::text(escape(text), InlineKeyboard::new());
    ctx.transport().send(chat_id, Some(reply_to), &message).await.ok();
}

/// `/link <0x…>` (§4.8). Attempts the approval-request flow first; a 404
/// (no current holder) falls back to the magic-amount deposit flow.
pub struct LinkCommandHandler;

#[async_trait]
impl CommandHandler for LinkCommandHandler {
    async fn handle(&self, ctx: &dyn InteractionContext, event: &IncomingCommand, m: &CommandMatch) -> Result<()> {
        let address = match m.get(0) {
            Some(addr) => addr,
            None => {
                send_reply(ctx, &event.chat_id, &event.message_id, "Usage: /link <0x wallet address>").await;
                return Ok(());
            }
        };

        let maid = &event.sender.master_account_id;
        match ctx
            .data()
            .request_platform_link(&PlatformLinkRequest {
                requester_master_account_id: maid,
                wallet_address: address,
            })
            .await
        {
            Ok(_resp) => {
                send_reply(
                    ctx,
                    &event.chat_id,
                    &event.message_id,
                    "Link request sent to the current holder of that wallet. You'll be notified once it's resolved.",
                )
                .await;
            }
            Err(e) if e.is_conflict() => {
                send_reply(ctx, &event.chat_id, &event.message_id, "A link request for this wallet is already pending.").await;
            }
            Err(e) if e.is_not_found() => {
                match ctx
                    .data()
                    .request_magic_amount(maid, &MagicAmountRequest { chain_id: DEFAULT_LINK_CHAIN_ID, wallet_address: address })
                    .await
                {
                    Ok(magic) => {
                        send_reply(
                            ctx,
                            &event.chat_id,
                            &event.message_id,
                            &format!(
                                "Send exactly {} wei to {} before {} to verify this wallet.",
                                magic.magic_amount_wei, magic.foundation_address, magic.expires_at
                            ),
                        )
                        .await;
                    }
                    Err(_) => {
                        send_reply(ctx, &event.chat_id, &event.message_id, "Something went wrong starting the wallet link. Please try again.").await;
                    }
                }
            }
            Err(_) => {
                send_reply(ctx, &event.chat_id, &event.message_id, "Something went wrong. Please try again.").await;
            }
        }
        Ok(())
    }
}

/// `/wallet` (§4.8): list linked wallets with an "Add" fallback into `/link`.
pub struct WalletCommandHandler;

#[async_trait]
impl CommandHandler for WalletCommandHandler {
    async fn handle(&self, ctx: &dyn InteractionContext, event: &IncomingCommand, _m: &CommandMatch) -> Result<()> {
        let wallets = ctx.data().list_wallets(&event.sender.master_account_id).await?;

        let mut lines = vec!["*Linked wallets*".to_string()];
        if wallets.is_empty() {
            lines.push("None yet.".to_string());
        } else {
            for w in &wallets {
                lines.push(format!("\u{2022} {}", abbreviate_address(&w.address)));
            }
        }

        let keyboard = InlineKeyboard::new().row(vec![InlineButton::new("Add", wallet_add())]);
        let message = OutgoingMessage::text(escape(&lines.join("\n")), keyboard);
        ctx.transport().send(&event.chat_id, Some(&event.message_id), &message).await.ok();
        Ok(())
    }
}

/// `wallet:add` (§4.8): "add" falls back into the magic-amount flow — prompt
/// for the wallet address via a reply, then submit it once it arrives.
pub struct WalletAddHandler;

#[async_trait]
impl CallbackHandler for WalletAddHandler {
    async fn handle(&self, ctx: &dyn InteractionContext, event: &IncomingCallback, _remainder: &str) -> Result<()> {
        let prompt = OutgoingMessage::text(escape("Reply with the wallet address (0x…) to link."), InlineKeyboard::new());
        let sent = ctx
            .transport()
            .send(&event.chat_id, None, &prompt)
            .await
            .map_err(|_| DispatchError::Validation("couldn't send wallet-address prompt".to_string()))?;
        ctx.reply_contexts()
            .put(&sent.chat_id, &sent.message_id, ReplyContext::WalletMagicAmount);
        ctx.transport().answer_callback(&event.callback_id, None, false).await.ok();
        Ok(())
    }
}

/// Reply to the `wallet:add` prompt (§4.8): the address text submits
/// straight to the magic-amount deposit flow.
pub struct WalletMagicAmountReplyHandler;

#[async_trait]
impl ReplyHandler for WalletMagicAmountReplyHandler {
    async fn handle(&self, ctx: &dyn InteractionContext, event: &IncomingReply, reply_context: ReplyContext) -> Result<()> {
        match reply_context {
            ReplyContext::WalletMagicAmount => {}
            _ => return Err(DispatchError::ContextLoss),
        }

        let address = event.text.trim();
        let maid = &event.sender.master_account_id;

        match ctx
            .data()
            .request_magic_amount(maid, &MagicAmountRequest { chain_id: DEFAULT_LINK_CHAIN_ID, wallet_address: address })
            .await
        {
            Ok(magic) => {
                let keyboard = InlineKeyboard::new().row(vec![InlineButton::new("OK", link_magic(&magic.request_id))]);
                let message = OutgoingMessage::text(
                    escape(&format!(
                        "Send exactly {} wei to {} before {} to verify this wallet.",
                        magic.magic_amount_wei, magic.foundation_address, magic.expires_at
                    )),
                    keyboard,
                );
                ctx.transport().send(&event.chat_id, Some(&event.message_id), &message).await.ok();
            }
            Err(_) => {
                send_reply(ctx, &event.chat_id, &event.message_id, "Something went wrong starting the wallet link. Please try again.").await;
            }
        }
        Ok(())
    }
}

/// `link:<approve|reject|report|magic>:<requestId>` (§4.8).
pub struct LinkActionHandler;

#[async_trait]
impl CallbackHandler for LinkActionHandler {
    async fn handle(&self, ctx: &dyn InteractionContext, event: &IncomingCallback, remainder: &str) -> Result<()> {
        let (action, request_id) = parse_link_action(remainder)
            .ok_or_else(|| DispatchError::Validation("malformed link callback".to_string()))?;

        let target = MessageRef {
            chat_id: event.chat_id.clone(),
            message_id: event.message_id.clone(),
        };

        if action == "magic" {
            // Acknowledgement only; the magic-amount request itself was
            // already submitted by `WalletMagicAmountReplyHandler`.
            let message = OutgoingMessage::text(escape("Noted. We'll credit the wallet once the deposit clears."), InlineKeyboard::new());
            ctx.transport().edit(&target, &message).await.ok();
            return Ok(());
        }

        let resolution = ctx.data().resolve_link_request(request_id, action).await?;

        let text = match action {
            "approve" => "Link request approved.".to_string(),
            "reject" => "Link request rejected.".to_string(),
            "report" if resolution.banned => "Reported. The requester has been banned.".to_string(),
            "report" => "Reported.".to_string(),
            _ => "Done.".to_string(),
        };
        let message = OutgoingMessage::text(escape(&text), InlineKeyboard::new());
        ctx.transport().edit(&target, &message).await.ok();
        Ok(())
    }
}

pub fn link_action_buttons(request_id: &str) -> InlineKeyboard {
    InlineKeyboard::new().row(vec![
        InlineButton::new("Approve", link_approve(request_id)),
        InlineButton::new("Reject", link_reject(request_id)),
        InlineButton::new("Report", link_report(request_id)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviate_address_keeps_head_and_tail() {
        assert_eq!(abbreviate_address("0xABCDEF0123456789WXYZ"), "0xABCDEF\u{2026}WXYZ");
    }

    #[test]
    fn abbreviate_address_leaves_short_values_untouched() {
        assert_eq!(abbreviate_address("0xABC"), "0xABC");
    }
}

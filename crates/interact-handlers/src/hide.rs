//! `hide_menu` (§4.7): clear the inline keyboard on the current message.

use async_trait::async_trait;

use interact_core::keyboard::InlineKeyboard;
use interact_dispatch::transport::MessageRef;
use interact_dispatch::{CallbackHandler, IncomingCallback, InteractionContext, Result};

pub struct HideMenuHandler;

#[async_trait]
impl CallbackHandler for HideMenuHandler {
    async fn handle(&self, ctx: &dyn InteractionContext, event: &IncomingCallback, _remainder: &str) -> Result<()> {
        let target = MessageRef {
            chat_id: event.chat_id.clone(),
            message_id: event.message_id.clone(),
        };
        ctx.transport()
            .edit_keyboard(&target, &InlineKeyboard::new())
            .await
            .ok();
        Ok(())
    }
}

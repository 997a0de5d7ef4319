//! `rate_gen:<genId>:<kind>` (§4.7): post a rating, acknowledge with an emoji.

use async_trait::async_trait;

use interact_core::safety::SafeText;
use interact_core::types::RatingKind;
use interact_data::types::RateGenerationRequest;
use interact_dispatch::grammar::parse_colon_pair;
use interact_dispatch::{CallbackHandler, DispatchError, IncomingCallback, InteractionContext, Result};

pub struct RateGenHandler;

#[async_trait]
impl CallbackHandler for RateGenHandler {
    async fn handle(
        &self,
        ctx: &dyn InteractionContext,
        event: &IncomingCallback,
        remainder: &str,
    ) -> Result<()> {
        let (generation_id, kind_raw) = parse_colon_pair(remainder)
            .ok_or_else(|| DispatchError::Validation("malformed rate_gen callback".to_string()))?;
        let kind = RatingKind::parse(kind_raw)
            .ok_or_else(|| DispatchError::Validation(format!("unknown rating kind {kind_raw:?}")))?;

        ctx.data()
            .rate_generation(
                generation_id,
                &RateGenerationRequest {
                    master_account_id: &event.sender.master_account_id,
                    kind: kind.as_str(),
                },
            )
            .await?;

        ctx.transport()
            .answer_callback(&event.callback_id, Some(&SafeText::trusted(kind.ack_emoji())), false)
            .await
            .ok();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_emoji_matches_documented_mapping() {
        assert_eq!(RatingKind::Beautiful.ack_emoji(), "\u{1F63B}\u{1F63B}\u{1F63B}");
        assert_eq!(RatingKind::Funny.ack_emoji(), "\u{1F639}\u{1F639}\u{1F639}");
        assert_eq!(RatingKind::Negative.ack_emoji(), "\u{1F63F}\u{1F63F}\u{1F63F}");
        assert_eq!(RatingKind::Sad.ack_emoji(), "\u{1F63F}\u{1F63F}\u{1F63F}");
    }
}

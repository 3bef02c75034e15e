//! `/start` and `/help`.

use crate::texts;
use algebrach_error::AlgebrachResult;
use algebrach_social::{EventContext, Handler, Message, ReplyTarget};
use async_trait::async_trait;

/// Greets the user.
#[derive(Debug, Default)]
pub struct Start;

#[async_trait]
impl Handler<Message> for Start {
    async fn handle(&self, message: &Message, ctx: &EventContext) -> AlgebrachResult<()> {
        ctx.api
            .send_text(ReplyTarget::reply_to(message), texts::START)
            .await?;
        Ok(())
    }
}

/// Lists the commands.
#[derive(Debug, Default)]
pub struct Help;

#[async_trait]
impl Handler<Message> for Help {
    async fn handle(&self, message: &Message, ctx: &EventContext) -> AlgebrachResult<()> {
        ctx.api
            .send_text(ReplyTarget::reply_to(message), texts::HELP)
            .await?;
        Ok(())
    }
}

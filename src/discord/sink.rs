//! Discord delivery sink.
//!
//! Renders structured cards as Discord embeds and sends them over the
//! REST API. Holds only an `Arc<Http>`, so it can be constructed as soon
//! as the client is built and shared with the routing core.

use std::sync::Arc;

use serenity::async_trait;
use serenity::builder::{CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, CreateMessage};
use serenity::http::Http;
use serenity::model::id::{ChannelId, MessageId};
use serenity::model::Colour;

use tracing::debug;

use crate::bridge::PlatformSink;
use crate::common::error::{DeliveryError, DeliveryResult};
use crate::common::messages::Card;

pub struct DiscordSink {
    http: Arc<Http>,
}

impl DiscordSink {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

/// Map a card onto a Discord embed, part by part.
fn build_embed(card: &Card) -> CreateEmbed {
    let mut embed = CreateEmbed::new();

    if let Some(author) = &card.author {
        let mut builder = CreateEmbedAuthor::new(&author.name);
        if let Some(icon_url) = &author.icon_url {
            builder = builder.icon_url(icon_url);
        }
        embed = embed.author(builder);
    }
    if let Some(title) = &card.title {
        embed = embed.title(title);
    }
    if let Some(url) = &card.thumbnail_url {
        embed = embed.thumbnail(url);
    }
    if let Some(footer) = &card.footer {
        let mut builder = CreateEmbedFooter::new(&footer.text);
        if let Some(icon_url) = &footer.icon_url {
            builder = builder.icon_url(icon_url);
        }
        embed = embed.footer(builder);
    }
    if let Some(color) = card.color {
        embed = embed.colour(Colour::from_rgb(color.r, color.g, color.b));
    }
    if let Some(description) = &card.description {
        embed = embed.description(description);
    }
    for (name, value) in &card.fields {
        // Discord rejects empty field values; substitute a zero-width space.
        let value = if value.is_empty() { "\u{200b}" } else { value };
        embed = embed.field(name, value, true);
    }

    embed
}

#[async_trait]
impl PlatformSink for DiscordSink {
    async fn send_card(&self, channel_id: u64, card: Card) -> DeliveryResult<()> {
        ChannelId::new(channel_id)
            .send_message(&self.http, CreateMessage::new().embed(build_embed(&card)))
            .await
            .map_err(|e| DeliveryError::SendFailed {
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn reply(&self, channel_id: u64, message_id: u64, text: &str) -> DeliveryResult<()> {
        let channel = ChannelId::new(channel_id);
        channel
            .send_message(
                &self.http,
                CreateMessage::new()
                    .content(text)
                    .reference_message((channel, MessageId::new(message_id))),
            )
            .await
            .map_err(|e| DeliveryError::SendFailed {
                message: e.to_string(),
            })?;
        Ok(())
    }
}

/// No-op sink used when no Discord credential is configured. Accepts and
/// drops everything so the game host keeps running.
pub struct DisabledSink;

#[async_trait]
impl PlatformSink for DisabledSink {
    async fn send_card(&self, _channel_id: u64, card: Card) -> DeliveryResult<()> {
        debug!("Discord disabled, dropping card: {:?}", card.description);
        Ok(())
    }

    async fn reply(&self, _channel_id: u64, _message_id: u64, text: &str) -> DeliveryResult<()> {
        debug!("Discord disabled, dropping reply: {}", text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::color::Rgb;
    use crate::common::messages::CardAuthor;
    use serde_json::json;

    #[test]
    fn test_embed_carries_all_card_parts() {
        let card = Card {
            author: Some(CardAuthor {
                name: "[ALL] Alice".to_string(),
                icon_url: Some("https://example.com/a.png".to_string()),
            }),
            title: Some("title".to_string()),
            thumbnail_url: Some("https://example.com/t.png".to_string()),
            footer: None,
            color: Some(Rgb {
                r: 0xe1,
                g: 0xaf,
                b: 0x37,
            }),
            description: Some("gg".to_string()),
            fields: vec![
                ("Server".to_string(), "srv".to_string()),
                ("Map".to_string(), String::new()),
            ],
        };

        let value = serde_json::to_value(build_embed(&card)).unwrap();
        assert_eq!(value["author"]["name"], json!("[ALL] Alice"));
        assert_eq!(value["title"], json!("title"));
        assert_eq!(value["thumbnail"]["url"], json!("https://example.com/t.png"));
        assert_eq!(value["color"], json!(0xe1af37));
        assert_eq!(value["description"], json!("gg"));
        assert_eq!(value["fields"][0]["value"], json!("srv"));
        // Empty field values are padded so Discord accepts them.
        assert_eq!(value["fields"][1]["value"], json!("\u{200b}"));
    }

    #[test]
    fn test_empty_card_builds_empty_embed() {
        let value = serde_json::to_value(build_embed(&Card::default())).unwrap();
        assert!(value.get("author").is_none() || value["author"].is_null());
        assert!(value.get("color").is_none() || value["color"].is_null());
    }

    #[tokio::test]
    async fn test_disabled_sink_accepts_everything() {
        let sink = DisabledSink;
        assert!(sink.send_card(1, Card::default()).await.is_ok());
        assert!(sink.reply(1, 1, "dropped").await.is_ok());
    }
}

//! Placeholder substitution for chat lines and message cards.
//!
//! Templates use `{Key}` or `{Namespace.Key}` placeholders, case-sensitive,
//! no nesting and no escaping. Resolution priority: color tokens first,
//! then computed constants (`{Time}`, `{Date}`), then per-message dynamic
//! keys. Substituted values are never rescanned, and unresolved
//! placeholders pass through verbatim.

use std::collections::HashMap;

use chrono::{DateTime, Local};
use tracing::warn;

use crate::bridge::color::{ChatColor, Rgb, DEFAULT_COLOR_CODE};
use crate::common::messages::{Card, CardAuthor, CardFooter};
use crate::config::types::EmbedConfig;

/// Reserved card color token meaning "use the sender's team/role color".
pub const TEAM_COLOR_TOKEN: &str = "{TeamColor}";

/// Per-message substitution context, assembled fresh for every message.
///
/// Dynamic values are resolved eagerly at construction time; rendering
/// only performs lookups.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    values: HashMap<String, String>,
    time_format: String,
    date_format: String,
    team_color: Rgb,
    /// Timestamp rendered by `{Time}` and `{Date}`.
    at: DateTime<Local>,
}

impl TemplateContext {
    pub fn new(time_format: impl Into<String>, date_format: impl Into<String>) -> Self {
        Self {
            values: HashMap::new(),
            time_format: time_format.into(),
            date_format: date_format.into(),
            team_color: Rgb::WHITE,
            at: Local::now(),
        }
    }

    /// Use the message's own timestamp for `{Time}`/`{Date}` instead of
    /// the render time.
    pub fn with_timestamp(mut self, at: DateTime<Local>) -> Self {
        self.at = at;
        self
    }

    /// Add a dynamic key (without braces, e.g. `Player.Name`).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Set the sender's team/role color used by the `{TeamColor}` token.
    pub fn with_team_color(mut self, color: Rgb) -> Self {
        self.team_color = color;
        self
    }

    pub fn team_color(&self) -> Rgb {
        self.team_color
    }

    /// Resolve a placeholder key, honoring the fixed priority order.
    fn lookup(&self, key: &str) -> Option<String> {
        if key == "Default" {
            return Some(DEFAULT_COLOR_CODE.to_string());
        }
        if let Some(color) = ChatColor::from_name(key) {
            return Some(color.code().to_string());
        }
        match key {
            "Time" => Some(self.at.format(&self.time_format).to_string()),
            "Date" => Some(self.at.format(&self.date_format).to_string()),
            _ => self.values.get(key).cloned(),
        }
    }
}

/// Render a template against a context.
///
/// Single left-to-right scan; a substituted value is appended to the
/// output as-is and never rescanned for further placeholders.
pub fn render(template: &str, ctx: &TemplateContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];

        match candidate.find('}') {
            Some(end) => {
                let key = &candidate[1..end];
                if !key.contains('{') {
                    if let Some(value) = ctx.lookup(key) {
                        out.push_str(&value);
                        rest = &candidate[end + 1..];
                        continue;
                    }
                }
                // Unresolved or malformed: the brace is literal, keep
                // scanning right after it.
                out.push('{');
                rest = &candidate[1..];
            }
            None => {
                out.push_str(candidate);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

/// Build a structured card from the configured metadata and field
/// templates.
///
/// Metadata is rendered in a fixed order (author + icon, title, thumbnail,
/// footer + icon, color) and omitted when its template renders empty.
/// Field pairs are user-declared content: rendered in declared order,
/// empty results kept.
pub fn render_card(spec: &EmbedConfig, fields: &[(String, String)], ctx: &TemplateContext) -> Card {
    let mut card = Card::default();

    let author = render(&spec.author, ctx);
    if !author.is_empty() {
        let icon = render(&spec.avatar_url, ctx);
        card.author = Some(CardAuthor {
            name: author,
            icon_url: if icon.is_empty() { None } else { Some(icon) },
        });
    }

    let title = render(&spec.title, ctx);
    if !title.is_empty() {
        card.title = Some(title);
    }

    let thumbnail = render(&spec.thumbnail_url, ctx);
    if !thumbnail.is_empty() {
        card.thumbnail_url = Some(thumbnail);
    }

    let footer = render(&spec.footer, ctx);
    if !footer.is_empty() {
        let icon = render(&spec.footer_icon_url, ctx);
        card.footer = Some(CardFooter {
            text: footer,
            icon_url: if icon.is_empty() { None } else { Some(icon) },
        });
    }

    card.color = resolve_card_color(&spec.color, ctx);

    card.fields = fields
        .iter()
        .map(|(name, value)| (render(name, ctx), render(value, ctx)))
        .collect();

    card
}

/// Resolve the card color template: empty means omit, `{TeamColor}` means
/// the sender's team/role color snapped to the chat palette, anything else
/// must render to a hex literal.
fn resolve_card_color(template: &str, ctx: &TemplateContext) -> Option<Rgb> {
    let raw = template.trim();
    if raw.is_empty() {
        return None;
    }
    if raw == TEAM_COLOR_TOKEN {
        return Some(ChatColor::nearest_rgb(ctx.team_color()));
    }

    let rendered = render(raw, ctx);
    match Rgb::parse_hex(rendered.trim()) {
        Some(rgb) => Some(rgb),
        None => {
            warn!(
                "Invalid embed color template '{}' (rendered '{}'), omitting color",
                template, rendered
            );
            None
        }
    }
}

//! Bidirectional mapping between in-game chat color codes and RGB colors.
//!
//! The in-game chat supports a small fixed palette addressed by control
//! characters embedded in the chat line. Platform-side colors (role colors,
//! embed colors) are full RGB, so arbitrary colors are approximated by the
//! nearest palette entry.

/// A 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` hex color (leading `#` optional, case-insensitive).
    pub fn parse_hex(s: &str) -> Option<Rgb> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Rgb::new(r, g, b))
    }

    /// Format as `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Squared Euclidean distance in RGB space.
    fn distance_sq(self, other: Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }
}

/// An in-game chat palette color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatColor {
    White,
    DarkRed,
    LightPurple,
    Green,
    Olive,
    Lime,
    Red,
    Grey,
    Gold,
    Silver,
    Blue,
    DarkBlue,
    Magenta,
    LightRed,
    Orange,
}

/// Control character that resets chat text to the default color.
pub const DEFAULT_COLOR_CODE: char = '\u{01}';

/// The fixed palette: color, RGB value, and chat control character.
///
/// Iteration order is significant: nearest-color ties resolve to the first
/// entry encountered.
const PALETTE: [(ChatColor, Rgb, char); 15] = [
    (ChatColor::White, Rgb::new(0xff, 0xff, 0xff), '\u{01}'),
    (ChatColor::DarkRed, Rgb::new(0x8b, 0x00, 0x00), '\u{02}'),
    (ChatColor::LightPurple, Rgb::new(0xb9, 0x81, 0xf0), '\u{03}'),
    (ChatColor::Green, Rgb::new(0x3e, 0xff, 0x3f), '\u{04}'),
    (ChatColor::Olive, Rgb::new(0xbc, 0xfe, 0x94), '\u{05}'),
    (ChatColor::Lime, Rgb::new(0xa3, 0xfe, 0x47), '\u{06}'),
    (ChatColor::Red, Rgb::new(0xff, 0x3f, 0x3f), '\u{07}'),
    (ChatColor::Grey, Rgb::new(0xc4, 0xc4, 0xc4), '\u{08}'),
    (ChatColor::Gold, Rgb::new(0xeb, 0xe3, 0x78), '\u{09}'),
    (ChatColor::Silver, Rgb::new(0xb0, 0xc2, 0xd8), '\u{0a}'),
    (ChatColor::Blue, Rgb::new(0x5d, 0x97, 0xd7), '\u{0b}'),
    (ChatColor::DarkBlue, Rgb::new(0x4c, 0x6a, 0xff), '\u{0c}'),
    (ChatColor::Magenta, Rgb::new(0xd4, 0x2d, 0xe6), '\u{0e}'),
    (ChatColor::LightRed, Rgb::new(0xeb, 0x4b, 0x4b), '\u{0f}'),
    (ChatColor::Orange, Rgb::new(0xe1, 0xaf, 0x37), '\u{10}'),
];

impl ChatColor {
    /// Map an arbitrary RGB color to the closest palette color.
    ///
    /// Exact palette matches return immediately; otherwise the entry with
    /// the minimum Euclidean distance wins, first entry on ties.
    pub fn from_rgb(rgb: Rgb) -> ChatColor {
        if let Some((color, _, _)) = PALETTE.iter().find(|(_, c, _)| *c == rgb) {
            return *color;
        }

        let mut best = ChatColor::White;
        let mut best_distance = u32::MAX;
        for (color, palette_rgb, _) in PALETTE {
            let distance = rgb.distance_sq(palette_rgb);
            if distance < best_distance {
                best_distance = distance;
                best = color;
            }
        }
        best
    }

    /// The RGB value of this palette color.
    pub fn rgb(self) -> Rgb {
        PALETTE
            .iter()
            .find(|(color, _, _)| *color == self)
            .map(|(_, rgb, _)| *rgb)
            .unwrap_or(Rgb::WHITE)
    }

    /// The chat control character that switches to this color.
    pub fn code(self) -> char {
        PALETTE
            .iter()
            .find(|(color, _, _)| *color == self)
            .map(|(_, _, code)| *code)
            .unwrap_or(DEFAULT_COLOR_CODE)
    }

    /// Look up a palette color by its template token name.
    pub fn from_name(name: &str) -> Option<ChatColor> {
        match name {
            "White" => Some(ChatColor::White),
            "DarkRed" => Some(ChatColor::DarkRed),
            "LightPurple" => Some(ChatColor::LightPurple),
            "Green" => Some(ChatColor::Green),
            "Olive" => Some(ChatColor::Olive),
            "Lime" => Some(ChatColor::Lime),
            "Red" => Some(ChatColor::Red),
            "Grey" => Some(ChatColor::Grey),
            "Gold" => Some(ChatColor::Gold),
            "Silver" => Some(ChatColor::Silver),
            "Blue" => Some(ChatColor::Blue),
            "DarkBlue" => Some(ChatColor::DarkBlue),
            "Magenta" => Some(ChatColor::Magenta),
            "LightRed" => Some(ChatColor::LightRed),
            "Orange" => Some(ChatColor::Orange),
            _ => None,
        }
    }

    /// Snap an arbitrary RGB color onto the palette.
    pub fn nearest_rgb(rgb: Rgb) -> Rgb {
        ChatColor::from_rgb(rgb).rgb()
    }
}

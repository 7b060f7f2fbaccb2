//! Multi-line message segmentation for in-game chat delivery.
//!
//! Platform messages can contain emoji, blank lines, and arbitrarily long
//! unbroken runs, none of which the in-game chat renders well. This module
//! normalizes content into a sequence of printable chat lines and decides
//! whether the message can be inlined into the header line.

/// Longest whitespace-free run the in-game chat renders without overflow.
pub const MAX_RUN_CHARS: usize = 50;

/// A platform message prepared for in-game chat delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmented {
    /// Printable chat lines, in order. May be empty; the caller must then
    /// suppress delivery entirely.
    pub lines: Vec<String>,
    /// True when the single line should be inlined into the header.
    pub inline: bool,
}

/// Segment raw multi-line content into in-game chat lines.
pub fn segment(raw: &str) -> Segmented {
    let lines: Vec<String> = demojize(raw)
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(break_long_words)
        .collect();

    let inline = lines.len() == 1;
    Segmented { lines, inline }
}

/// Longest emoji sequence considered, in codepoints. ZWJ family and
/// skin-tone sequences stay well below this.
const MAX_EMOJI_CODEPOINTS: usize = 16;

/// Replace Unicode emoji with their `:shortcode:` text equivalents.
///
/// Emoji can span several codepoints (flags are regional-indicator pairs,
/// families join with ZWJ), so matching is longest-sequence-first rather
/// than per character.
fn demojize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        if ch.is_ascii() {
            out.push(ch);
            rest = &rest[1..];
            continue;
        }
        match match_emoji(rest) {
            Some((emoji, len)) => {
                let name = emoji.shortcode().unwrap_or_else(|| emoji.name());
                out.push(':');
                out.push_str(name);
                out.push(':');
                rest = &rest[len..];
            }
            None => {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    out
}

/// Longest-match emoji lookup at the start of `rest`. Returns the emoji
/// and the byte length of the matched sequence.
fn match_emoji(rest: &str) -> Option<(&'static emojis::Emoji, usize)> {
    let ends: Vec<usize> = rest
        .char_indices()
        .take(MAX_EMOJI_CODEPOINTS)
        .map(|(i, ch)| i + ch.len_utf8())
        .collect();

    ends.into_iter()
        .rev()
        .find_map(|end| emojis::get(&rest[..end]).map(|emoji| (emoji, end)))
}

/// Force-break whitespace-free runs longer than [`MAX_RUN_CHARS`].
///
/// Overlong tokens are chunked at the character boundary; no characters
/// are lost, only separator spaces inserted.
fn break_long_words(line: &str) -> String {
    let mut tokens: Vec<String> = Vec::new();

    for token in line.split(' ') {
        if token.chars().count() < MAX_RUN_CHARS {
            tokens.push(token.to_string());
        } else {
            let chars: Vec<char> = token.chars().collect();
            for chunk in chars.chunks(MAX_RUN_CHARS) {
                tokens.push(chunk.iter().collect());
            }
        }
    }

    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_is_inline() {
        let seg = segment("hello world");
        assert_eq!(seg.lines, vec!["hello world"]);
        assert!(seg.inline);
    }

    #[test]
    fn test_blank_lines_removed() {
        let seg = segment("a\n\n\nb");
        assert_eq!(seg.lines, vec!["a", "b"]);
        assert!(!seg.inline);
    }

    #[test]
    fn test_whitespace_only_lines_removed() {
        let seg = segment("a\n   \t \nb");
        assert_eq!(seg.lines, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_input_yields_no_lines() {
        assert!(segment("").lines.is_empty());
        assert!(segment("\n \n").lines.is_empty());
    }

    #[test]
    fn test_long_run_is_broken() {
        let run: String = "x".repeat(120);
        let seg = segment(&run);
        assert_eq!(seg.lines.len(), 1);

        let tokens: Vec<&str> = seg.lines[0].split(' ').collect();
        assert!(tokens.len() >= 2);
        assert_eq!(tokens, vec![&"x".repeat(50)[..], &"x".repeat(50)[..], &"x".repeat(20)[..]]);
        // No character loss.
        let rejoined: String = tokens.concat();
        assert_eq!(rejoined, run);
    }

    #[test]
    fn test_exact_threshold_run_kept_whole() {
        let run: String = "y".repeat(50);
        let seg = segment(&run);
        assert_eq!(seg.lines, vec![run]);
    }

    #[test]
    fn test_short_tokens_untouched() {
        let seg = segment("short tokens only here");
        assert_eq!(seg.lines, vec!["short tokens only here"]);
    }

    #[test]
    fn test_long_run_multibyte_safe() {
        let run: String = "é".repeat(60);
        let seg = segment(&run);
        let tokens: Vec<&str> = seg.lines[0].split(' ').collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].chars().count(), 50);
        assert_eq!(tokens[1].chars().count(), 10);
    }

    #[test]
    fn test_emoji_replaced_with_shortcode() {
        let seg = segment("nice 🎉 work");
        assert_eq!(seg.lines.len(), 1);
        assert!(seg.lines[0].contains(":tada:"), "got: {}", seg.lines[0]);
        assert!(!seg.lines[0].contains('🎉'));
    }

    #[test]
    fn test_flag_sequence_replaced() {
        // Flags are two regional-indicator codepoints, not one.
        let seg = segment("hello 🇩🇪 world");
        assert!(seg.lines[0].contains(":de:"), "got: {}", seg.lines[0]);
        assert!(!seg.lines[0].contains('\u{1f1e9}'));
    }

    #[test]
    fn test_zwj_family_replaced_whole() {
        let seg = segment("look 👨\u{200d}👩\u{200d}👧 here");
        assert!(!seg.lines[0].contains('\u{200d}'), "got: {}", seg.lines[0]);
        assert!(!seg.lines[0].contains('👨'));
        assert!(seg.lines[0].contains("family"), "got: {}", seg.lines[0]);
    }

    #[test]
    fn test_non_emoji_unicode_preserved() {
        let seg = segment("héllo wörld");
        assert_eq!(seg.lines, vec!["héllo wörld"]);
    }
}

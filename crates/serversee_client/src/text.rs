//! Styled text from MOTDs (`§`/`&` codes) and console lines (ANSI SGR).

use serde::Serialize;

const ANSI_PREFIX: &str = "\u{1b}[";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextSpan {
    pub text: String,
    /// `#RRGGBB`, `None` for the default colour.
    pub color: Option<&'static str>,
    pub bold: bool,
    pub italic: bool,
    pub underlined: bool,
    pub strikethrough: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct Style {
    color: Option<&'static str>,
    bold: bool,
    italic: bool,
    underlined: bool,
    strikethrough: bool,
}

impl Style {
    fn span(&self, text: &str) -> TextSpan {
        TextSpan {
            text: text.to_string(),
            color: self.color,
            bold: self.bold,
            italic: self.italic,
            underlined: self.underlined,
            strikethrough: self.strikethrough,
        }
    }
}

fn legacy_color(code: char) -> Option<&'static str> {
    Some(match code {
        '0' => "#000000",
        '1' => "#0000AA",
        '2' => "#00AA00",
        '3' => "#00AAAA",
        '4' => "#AA0000",
        '5' => "#AA00AA",
        '6' => "#FFAA00",
        '7' => "#AAAAAA",
        '8' => "#555555",
        '9' => "#5555FF",
        'a' => "#55FF55",
        'b' => "#55FFFF",
        'c' => "#FF5555",
        'd' => "#FF55FF",
        'e' => "#FFFF55",
        'f' => "#FFFFFF",
        _ => return None,
    })
}

fn ansi_color(code: u32) -> Option<&'static str> {
    Some(match code {
        30 => "#000000",
        31 => "#AA0000",
        32 => "#00AA00",
        33 => "#AA5500",
        34 => "#0000AA",
        35 => "#AA00AA",
        36 => "#00AAAA",
        37 => "#AAAAAA",
        90 => "#555555",
        91 => "#FF5555",
        92 => "#55FF55",
        93 => "#FFFF55",
        94 => "#5555FF",
        95 => "#FF55FF",
        96 => "#55FFFF",
        97 => "#FFFFFF",
        _ => return None,
    })
}

/// Splits `text` into styled spans. Text containing an ANSI escape is read
/// as a console line, anything else as Minecraft formatting codes.
pub fn parse(text: &str) -> Vec<TextSpan> {
    if text.contains(ANSI_PREFIX) {
        parse_ansi(text)
    } else {
        parse_legacy(text)
    }
}

/// The visible text with all formatting removed.
pub fn strip(text: &str) -> String {
    parse(text).into_iter().map(|span| span.text).collect()
}

fn parse_legacy(text: &str) -> Vec<TextSpan> {
    let normalized = text.replace('&', "§");
    let mut parts = normalized.split('§');
    let mut spans = Vec::new();
    let mut style = Style::default();

    if let Some(head) = parts.next().filter(|head| !head.is_empty()) {
        spans.push(style.span(head));
    }

    for part in parts {
        let mut chars = part.chars();
        let Some(code) = chars.next() else {
            continue;
        };
        let code = code.to_ascii_lowercase();

        if let Some(color) = legacy_color(code) {
            // A colour code also clears every decoration.
            style = Style {
                color: Some(color),
                ..Style::default()
            };
        } else {
            match code {
                'l' => style.bold = true,
                'm' => style.strikethrough = true,
                'n' => style.underlined = true,
                'o' => style.italic = true,
                'r' => style = Style::default(),
                _ => {}
            }
        }

        let rest = chars.as_str();
        if !rest.is_empty() {
            spans.push(style.span(rest));
        }
    }
    spans
}

fn parse_ansi(text: &str) -> Vec<TextSpan> {
    let mut spans = Vec::new();
    let mut style = Style::default();
    let mut plain = String::new();
    let mut rest = text;

    while let Some(start) = rest.find(ANSI_PREFIX) {
        let after = &rest[start + ANSI_PREFIX.len()..];
        let params_len = after
            .find(|c: char| !(c.is_ascii_digit() || c == ';'))
            .unwrap_or(after.len());

        if !after[params_len..].starts_with('m') {
            // Not an SGR sequence, keep it as text.
            plain.push_str(&rest[..start + ANSI_PREFIX.len()]);
            rest = after;
            continue;
        }

        plain.push_str(&rest[..start]);
        if !plain.is_empty() {
            spans.push(style.span(&plain));
            plain.clear();
        }
        apply_sgr(&mut style, &after[..params_len]);
        rest = &after[params_len + 1..];
    }

    plain.push_str(rest);
    if !plain.is_empty() {
        spans.push(style.span(&plain));
    }
    spans
}

fn apply_sgr(style: &mut Style, params: &str) {
    let codes: Vec<u32> = params.split(';').filter_map(|c| c.parse().ok()).collect();
    if codes.is_empty() || codes.contains(&0) {
        *style = Style::default();
        return;
    }
    for code in codes {
        match code {
            1 => style.bold = true,
            3 => style.italic = true,
            4 => style.underlined = true,
            39 => style.color = None,
            _ => {
                if let Some(color) = ansi_color(code) {
                    style.color = Some(color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_codes() {
        let spans = parse("Welcome §aGreen §lBold&rPlain");
        assert_eq!(spans.len(), 4);
        assert_eq!(spans[0].text, "Welcome ");
        assert_eq!(spans[0].color, None);
        assert_eq!(spans[1].color, Some("#55FF55"));
        assert!(!spans[1].bold);
        assert!(spans[2].bold);
        assert_eq!(spans[2].color, Some("#55FF55"));
        assert_eq!(spans[3], TextSpan { text: "Plain".into(), ..Default::default() });
    }

    #[test]
    fn test_color_resets_decorations() {
        let spans = parse("§l§nA§cB");
        assert!(spans[0].bold && spans[0].underlined);
        assert!(!spans[1].bold && !spans[1].underlined);
        assert_eq!(spans[1].color, Some("#FF5555"));
    }

    #[test]
    fn test_uppercase_and_unknown_codes() {
        let spans = parse("§AX§kY§§Z");
        assert_eq!(spans[0].color, Some("#55FF55"));
        // `§§Z` reads `Z` as an (unknown) code
        assert_eq!(strip("§AX§kY§§Z"), "XY");
    }

    #[test]
    fn test_ansi_sequences() {
        let spans = parse("\u{1b}[1;31mERROR\u{1b}[0m done \u{1b}[93mwarn\u{1b}[39m!");
        assert_eq!(spans.len(), 4);
        assert_eq!(spans[0].text, "ERROR");
        assert!(spans[0].bold);
        assert_eq!(spans[0].color, Some("#AA0000"));
        assert_eq!(spans[1], TextSpan { text: " done ".into(), ..Default::default() });
        assert_eq!(spans[2].color, Some("#FFFF55"));
        assert_eq!(spans[3].color, None);
    }

    #[test]
    fn test_ansi_empty_params_reset() {
        let spans = parse("\u{1b}[4mU\u{1b}[mN");
        assert!(spans[0].underlined);
        assert!(!spans[1].underlined);
    }

    #[test]
    fn test_non_sgr_escape_kept() {
        assert_eq!(strip("\u{1b}[2Kline\u{1b}[0m"), "\u{1b}[2Kline");
    }

    #[test]
    fn test_strip_plain() {
        assert_eq!(strip(""), "");
        assert_eq!(strip("§6§lServer &7| &fLobby"), "Server | Lobby");
    }
}

//! services/api/src/render/metrics.rs
//!
//! Width metrics for the standard Helvetica face, used to wrap body text to the
//! printable width of a page. Widths are the AFM values in thousandths of the
//! font size.

/// Returns the advance width of `c` in Helvetica, in 1/1000 em units.
///
/// Covers WinAnsi-printable ASCII plus the Latin-1 letters Norwegian text
/// needs. Anything else falls back to the average lowercase width, which keeps
/// wrapping conservative rather than overflowing the margin.
fn char_width(c: char) -> u32 {
    match c {
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | 'I' | '\\' | '[' | ']' => 278,
        '"' => 355,
        '#' | '$' | '?' | '_' => 556,
        '%' => 889,
        '&' | 'A' | 'B' | 'E' | 'K' | 'V' | 'X' | 'Y' => 667,
        '\'' => 191,
        '(' | ')' | '-' | '`' | 'r' => 333,
        '*' => 389,
        '+' | '<' | '=' | '>' | '^' | '~' => 584,
        '0'..='9' => 556,
        '@' => 1015,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' => 722,
        'F' | 'T' | 'Z' => 611,
        'G' | 'O' | 'Q' => 778,
        'J' => 500,
        'L' => 556,
        'M' => 833,
        'P' | 'S' => 667,
        'W' => 944,
        'a' | 'b' | 'd' | 'e' | 'g' | 'h' | 'n' | 'o' | 'p' | 'q' | 'u' => 556,
        'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 500,
        'f' | 't' => 278,
        'i' | 'j' | 'l' => 222,
        'm' => 833,
        'w' => 722,
        '{' | '}' => 334,
        '|' => 260,
        '\u{e6}' => 889,           // ae
        '\u{f8}' => 611,           // o-slash
        '\u{e5}' => 556,           // a-ring
        '\u{c6}' => 1000,          // AE
        '\u{d8}' => 778,           // O-slash
        '\u{c5}' => 667,           // A-ring
        '\u{e9}' | '\u{e8}' => 556, // accented e
        '\u{2022}' => 350,         // bullet
        _ => 556,
    }
}

/// Measures `text` at `font_size` points.
pub fn string_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text.chars().map(char_width).sum();
    units as f32 * font_size / 1000.0
}

/// Greedy word wrap: words are packed onto a line until the next word would
/// push it past `max_width` points. A single over-long word gets a line of its
/// own rather than being split.
pub fn wrap(text: &str, font_size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", line, word)
        };
        if string_width(&candidate, font_size) <= max_width || line.is_empty() {
            line = candidate;
        } else {
            lines.push(line);
            line = word.to_string();
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

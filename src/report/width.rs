//! Terminal display width for mixed half-/full-width text

/// Columns a character occupies in a monospace terminal
pub fn char_width(c: char) -> usize {
    match c as u32 {
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3040..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6 => 2,
        _ => 1,
    }
}

pub fn display_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

/// Pad to `width` columns with ideographic spaces, plus one ASCII space for an odd remainder
pub fn pad_display(text: &str, width: usize) -> String {
    let current = display_width(text);
    if current >= width {
        return text.to_string();
    }

    let remaining = width - current;
    let mut out = String::with_capacity(text.len() + remaining * 3);
    out.push_str(text);
    for _ in 0..remaining / 2 {
        out.push('\u{3000}');
    }
    if remaining % 2 == 1 {
        out.push(' ');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_width() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("ドウデュース"), 12);
        assert_eq!(display_width("ｱｲｳ"), 3); // half-width katakana
        assert_eq!(display_width("\u{3000}"), 2);
    }

    #[test]
    fn test_pad_display_full_width() {
        let padded = pad_display("イクイノックス", 18);
        assert_eq!(display_width(&padded), 18);
        assert!(padded.ends_with("\u{3000}\u{3000}"));
    }

    #[test]
    fn test_pad_display_odd_remainder() {
        let padded = pad_display("Deep", 9);
        assert_eq!(padded, "Deep\u{3000}\u{3000} ");
        assert_eq!(display_width(&padded), 9);
    }

    #[test]
    fn test_pad_display_too_long() {
        assert_eq!(pad_display("サトノダイヤモンドプラス", 18), "サトノダイヤモンドプラス");
    }
}

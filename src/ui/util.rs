use alloy::primitives::Address;
use std::time::Duration;

pub fn short_hex(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.len() <= 10 {
        return trimmed.to_string();
    }
    let prefix_len = 6.min(trimmed.len());
    let suffix_len = 4.min(trimmed.len().saturating_sub(prefix_len));
    let prefix = &trimmed[..prefix_len];
    let suffix = &trimmed[trimmed.len() - suffix_len..];
    format!("{}...{}", prefix, suffix)
}

pub fn short_address(address: &Address) -> String {
    short_hex(&address.to_checksum(None))
}

pub fn millis(duration: Duration) -> String {
    format!("{}ms", duration.as_millis())
}

/// Cursor glyph appended to a line being edited.
pub const CURSOR: &str = "▏";

/// Braille spinner frame for `tick`.
pub fn spinner(tick: usize) -> char {
    const FRAMES: [char; 8] = ['⣾', '⣽', '⣻', '⢿', '⡿', '⣟', '⣯', '⣷'];
    FRAMES[tick % FRAMES.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortens_long_hex() {
        assert_eq!(
            short_hex("0x000000000000000000000000000000000000dEaD"),
            "0x0000...dEaD"
        );
        assert_eq!(short_hex("0x1234"), "0x1234");
    }

    #[test]
    fn spinner_cycles() {
        assert_eq!(spinner(0), spinner(8));
    }
}

/// Offset subtracted from each codepoint so that `'a'` maps to 1.
const CODEPOINT_OFFSET: i64 = 96;

/// Highest code in the recognized alphabet (`'z'`).
const ALPHABET_MAX: i64 = 26;

/// Sentinel for padding and for any character outside a-z.
pub(crate) const UNKNOWN: f32 = 0.0;

/// Maps a single (already lowercased) character to its numeric code.
///
/// Letters a-z map to 1-26. Anything whose shifted codepoint falls below 0
/// or above 26 collapses to [`UNKNOWN`]: spaces, digits, punctuation,
/// accented letters, emoji. The clamp range is asymmetric on purpose; the
/// classifier was trained against exactly this mapping and widening it
/// changes predictions at the margin.
pub(crate) fn encode_char(c: char) -> f32 {
    let code = i64::from(u32::from(c)) - CODEPOINT_OFFSET;
    if (0..=ALPHABET_MAX).contains(&code) {
        code as f32
    } else {
        UNKNOWN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_map_to_alphabet_positions() {
        assert_eq!(encode_char('a'), 1.0);
        assert_eq!(encode_char('b'), 2.0);
        assert_eq!(encode_char('m'), 13.0);
        assert_eq!(encode_char('z'), 26.0);
    }

    #[test]
    fn space_and_digits_are_unknown() {
        assert_eq!(encode_char(' '), UNKNOWN);
        assert_eq!(encode_char('0'), UNKNOWN);
        assert_eq!(encode_char('9'), UNKNOWN);
        assert_eq!(encode_char('-'), UNKNOWN);
        assert_eq!(encode_char('\''), UNKNOWN);
    }

    #[test]
    fn characters_above_the_alphabet_are_unknown() {
        // Accented letters sit past 'z' after the offset and must clamp.
        assert_eq!(encode_char('é'), UNKNOWN);
        assert_eq!(encode_char('ü'), UNKNOWN);
        assert_eq!(encode_char('{'), UNKNOWN);
        assert_eq!(encode_char('🎉'), UNKNOWN);
    }

    #[test]
    fn uppercase_is_not_folded_here() {
        // Lowercasing happens before the character map, not inside it.
        assert_eq!(encode_char('A'), UNKNOWN);
    }

    #[test]
    fn backtick_sits_at_the_zero_boundary() {
        // '`' is codepoint 96, the only character that maps to 0 without
        // being clamped. It must still read as unknown.
        assert_eq!(encode_char('`'), 0.0);
    }
}

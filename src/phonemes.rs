//! Two-letter phoneme tags for the speech buffer.
//!
//! A phoneme's numeric value is its position in [`PHONEME_TAGS`]. Tags with
//! a single sound letter are padded with `*`; `_1`, `_2` and `_3` are pauses
//! of increasing length.

use crate::registers::SPEECH_APPEND_MAX;

/// Number of phonemes the board knows.
pub const PHONEME_COUNT: usize = 55;

/// Tag table, indexed by phoneme value.
#[rustfmt::skip]
pub const PHONEME_TAGS: [[u8; 2]; PHONEME_COUNT] = [
    *b"OW", *b"AW", *b"EY", *b"AI", *b"AY", *b"EA", *b"OY", *b"UR", *b"AE", *b"AA",
    *b"AU", *b"EH", *b"IY", *b"AO", *b"ER", *b"AH", *b"UW", *b"UH", *b"IH", *b"AX",
    *b"S*", *b"SH", *b"F*", *b"V*", *b"Z*", *b"ZH", *b"TH", *b"DH", *b"M*", *b"N*",
    *b"NG", *b"H*", *b"X*", *b"R*", *b"RX", *b"L*", *b"LX", *b"W*", *b"WH", *b"Y*",
    *b"WX", *b"YX", *b"KX", *b"GX", *b"T*", *b"D*", *b"P*", *b"B*", *b"K*", *b"G*",
    *b"J*", *b"CH", *b"_1", *b"_2", *b"_3",
];

/// Look up the phoneme value of a two-letter tag, ignoring case.
///
/// # Example
/// ```
/// use buzzkill_driver::phoneme_from_tag;
///
/// assert_eq!(phoneme_from_tag(*b"ow"), Some(0));
/// assert_eq!(phoneme_from_tag(*b"_3"), Some(54));
/// assert_eq!(phoneme_from_tag(*b"QQ"), None);
/// ```
pub fn phoneme_from_tag(tag: [u8; 2]) -> Option<u8> {
    PHONEME_TAGS
        .iter()
        .position(|entry| entry.eq_ignore_ascii_case(&tag))
        .map(|index| index as u8)
}

/// Why a tag string could not be translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TagError {
    /// No tags before the terminator.
    Empty,
    /// A tag was cut short by a space, the terminator or the end of input.
    Truncated,
    /// A tag is not in [`PHONEME_TAGS`].
    Unknown([u8; 2]),
    /// More tags than fit in one speech buffer append.
    TooLong,
}

/// Translate a string of tags into phoneme values.
///
/// Tags are two consecutive characters. Spaces between tags are skipped,
/// and input ends at `.`, a NUL byte, or the end of the string.
pub fn parse_tags(tags: &str) -> Result<heapless::Vec<u8, SPEECH_APPEND_MAX>, TagError> {
    let mut out = heapless::Vec::new();
    let mut bytes = tags
        .as_bytes()
        .iter()
        .copied()
        .take_while(|&b| b != b'.' && b != 0)
        .peekable();

    loop {
        while bytes.next_if_eq(&b' ').is_some() {}
        let Some(first) = bytes.next() else { break };
        let second = match bytes.next() {
            Some(b' ') | None => return Err(TagError::Truncated),
            Some(b) => b,
        };
        let tag = [first, second];
        let phoneme = phoneme_from_tag(tag).ok_or(TagError::Unknown(tag))?;
        out.push(phoneme).map_err(|_| TagError::TooLong)?;
    }

    if out.is_empty() {
        Err(TagError::Empty)
    } else {
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_positions() {
        assert_eq!(phoneme_from_tag(*b"OW"), Some(0));
        assert_eq!(phoneme_from_tag(*b"AX"), Some(19));
        assert_eq!(phoneme_from_tag(*b"S*"), Some(20));
        assert_eq!(phoneme_from_tag(*b"CH"), Some(51));
        assert_eq!(phoneme_from_tag(*b"_1"), Some(52));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(phoneme_from_tag(*b"sh"), Some(21));
        assert_eq!(phoneme_from_tag(*b"Sh"), Some(21));
    }

    #[test]
    fn tags_are_unique() {
        for (i, a) in PHONEME_TAGS.iter().enumerate() {
            for b in &PHONEME_TAGS[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn parses_hello() {
        // "hello"
        let phonemes = parse_tags("H*EH LX OW").unwrap();
        assert_eq!(phonemes.as_slice(), &[31, 11, 36, 0]);
    }

    #[test]
    fn stops_at_period_and_nul() {
        assert_eq!(parse_tags("OW AW. EY").unwrap().as_slice(), &[0, 1]);
        assert_eq!(parse_tags("OW\0AW").unwrap().as_slice(), &[0]);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(parse_tags(""), Err(TagError::Empty));
        assert_eq!(parse_tags("   ."), Err(TagError::Empty));
        assert_eq!(parse_tags("OW A"), Err(TagError::Truncated));
        assert_eq!(parse_tags("O W"), Err(TagError::Truncated));
        assert_eq!(parse_tags("OW QQ"), Err(TagError::Unknown(*b"QQ")));
    }

    #[test]
    fn length_limit() {
        let ok: String = "_1".repeat(SPEECH_APPEND_MAX);
        assert_eq!(parse_tags(&ok).unwrap().len(), SPEECH_APPEND_MAX);

        let too_long: String = "_1".repeat(SPEECH_APPEND_MAX + 1);
        assert_eq!(parse_tags(&too_long), Err(TagError::TooLong));
    }
}

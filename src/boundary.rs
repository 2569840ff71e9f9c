// WHY: heuristic signal for a segment cut mid-sentence; feeds warnings only, never errors

/// Characters that decide whether a segment ends on a sentence boundary
#[derive(Debug, Clone)]
pub struct BoundaryRules {
    /// Characters that terminate a sentence
    pub end_punctuation: Vec<char>,
    /// Closing quotes and brackets that may follow the terminator
    pub closing_chars: Vec<char>,
}

impl Default for BoundaryRules {
    fn default() -> Self {
        Self {
            end_punctuation: vec!['.', '?', '!'],
            closing_chars: vec![
                '"', '\'', '\u{201C}', '\u{201D}', '\u{2019}', '\u{00BB}', '\u{203A}', ')', ']',
                '}',
            ],
        }
    }
}

impl BoundaryRules {
    /// Whether `text` looks like it was cut in the middle of a sentence
    ///
    /// Trailing whitespace and closing characters are peeled off first, so
    /// `He left."` and `(Done.)` count as terminated. Blank text never warns.
    pub fn ends_mid_sentence(&self, text: &str) -> bool {
        let trimmed = text
            .trim_end()
            .trim_end_matches(|c: char| c.is_whitespace() || self.closing_chars.contains(&c));
        trimmed
            .chars()
            .next_back()
            .is_some_and(|last| !self.end_punctuation.contains(&last))
    }
}

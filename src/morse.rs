// src/morse.rs
// Morse code table and the run-to-text state machine

use crate::segmenter::Run;

// --- Classification boundaries, in units ---
// Keyed runs of at least this many units are dashes (ideal ratio 1:3).
const DIT_DAH_BOUNDARY: usize = 2;
// Gaps of at least this many units end a character.
const LETTER_SPACE_BOUNDARY: usize = 3;
// Gaps of at least this many units also end a word (ideal word gap is 7).
const WORD_SPACE_BOUNDARY: usize = 6;

pub const DEFAULT_PLACEHOLDER: char = '?';

/// Latin letters and digits with their dot/dash patterns.
pub const MORSE_TABLE: &[(char, &str)] = &[
    ('A', ".-"),
    ('B', "-..."),
    ('C', "-.-."),
    ('D', "-.."),
    ('E', "."),
    ('F', "..-."),
    ('G', "--."),
    ('H', "...."),
    ('I', ".."),
    ('J', ".---"),
    ('K', "-.-"),
    ('L', ".-.."),
    ('M', "--"),
    ('N', "-."),
    ('O', "---"),
    ('P', ".--."),
    ('Q', "--.-"),
    ('R', ".-."),
    ('S', "..."),
    ('T', "-"),
    ('U', "..-"),
    ('V', "...-"),
    ('W', ".--"),
    ('X', "-..-"),
    ('Y', "-.--"),
    ('Z', "--.."),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
    ('0', "-----"),
];

/// Character for a dot/dash pattern.
pub fn lookup(pattern: &str) -> Option<char> {
    MORSE_TABLE
        .iter()
        .find(|(_, p)| *p == pattern)
        .map(|(c, _)| *c)
}

/// Dot/dash pattern for a character, case-insensitive.
pub fn pattern_for(c: char) -> Option<&'static str> {
    let c = c.to_ascii_uppercase();
    MORSE_TABLE
        .iter()
        .find(|(ch, _)| *ch == c)
        .map(|(_, p)| *p)
}

/// Turns calibrated runs into text one run at a time.
///
/// The decoder is idle while `symbol` is empty and accumulating otherwise;
/// gaps of a letter space or longer flush the pending symbol group.
#[derive(Debug, Clone)]
pub struct SymbolDecoder {
    unit: usize,
    placeholder: char,
    symbol: String,
    text: String,
}

impl SymbolDecoder {
    pub fn new(unit: usize, placeholder: char) -> Self {
        Self {
            unit: unit.max(1),
            placeholder,
            symbol: String::new(),
            text: String::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.symbol.is_empty()
    }

    /// Pending dot/dash group not yet mapped to a character.
    pub fn pending(&self) -> &str {
        &self.symbol
    }

    pub fn push(&mut self, run: Run) {
        if run.keyed {
            if run.len < DIT_DAH_BOUNDARY * self.unit {
                self.symbol.push('.');
            } else {
                self.symbol.push('-');
            }
        } else if run.len >= WORD_SPACE_BOUNDARY * self.unit {
            self.flush();
            if !self.text.is_empty() && !self.text.ends_with(' ') {
                self.text.push(' ');
            }
        } else if run.len >= LETTER_SPACE_BOUNDARY * self.unit {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if self.symbol.is_empty() {
            return;
        }
        let c = lookup(&self.symbol).unwrap_or(self.placeholder);
        log::trace!("symbol {} -> {}", self.symbol, c);
        self.text.push(c);
        self.symbol.clear();
    }

    /// Flushes any pending group and returns the trimmed text.
    pub fn finish(mut self) -> String {
        self.flush();
        self.text.trim().to_string()
    }
}

/// Decodes a whole run sequence with the given unit.
pub fn decode_runs(runs: &[Run], unit: usize, placeholder: char) -> String {
    let mut decoder = SymbolDecoder::new(unit, placeholder);
    for &run in runs {
        decoder.push(run);
    }
    decoder.finish()
}

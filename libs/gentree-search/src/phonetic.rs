//! Phonetic encoding for sound-alike name and place matching.
//!
//! The stored `...S` fields hold codes produced by the same encoder, so the
//! encoder used at query time must match the one used when indexing.

/// Encodes a name into an opaque, comparable code.
pub trait PhoneticEncoder: Send + Sync {
    fn encode(&self, name: &str) -> String;
}

/// American Soundex: first letter followed by three digits.
///
/// Letters separated only by `h`/`w` share a code; vowels break runs.
/// Non-letters are skipped. Input with no letters encodes to an empty code.
#[derive(Debug, Clone, Copy, Default)]
pub struct Soundex;

impl Soundex {
    fn digit(c: char) -> Option<char> {
        match c {
            'b' | 'f' | 'p' | 'v' => Some('1'),
            'c' | 'g' | 'j' | 'k' | 'q' | 's' | 'x' | 'z' => Some('2'),
            'd' | 't' => Some('3'),
            'l' => Some('4'),
            'm' | 'n' => Some('5'),
            'r' => Some('6'),
            _ => None,
        }
    }
}

impl PhoneticEncoder for Soundex {
    fn encode(&self, name: &str) -> String {
        let mut letters = name
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_lowercase());

        let Some(first) = letters.next() else {
            return String::new();
        };

        let mut code = String::with_capacity(4);
        code.push(first.to_ascii_uppercase());
        let mut previous = Self::digit(first);

        for c in letters {
            if code.len() == 4 {
                break;
            }
            match c {
                'h' | 'w' => continue,
                _ => {}
            }
            let digit = Self::digit(c);
            if let Some(d) = digit {
                if digit != previous {
                    code.push(d);
                }
            }
            previous = digit;
        }

        while code.len() < 4 {
            code.push('0');
        }
        code
    }
}

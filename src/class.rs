//! Character-class pattern primitives.
//!
//! The scanner classifies the current character with small composable
//! predicates instead of compiled regular expressions. A [`CharClass`] is a
//! single character, an inclusive range, a union of classes, or the negation
//! of a class; plain `char`s work as patterns too.

/// Anything that can classify a single character.
pub trait CharPattern {
    fn matches(&self, c: char) -> bool;
}

impl CharPattern for char {
    #[inline]
    fn matches(&self, c: char) -> bool {
        *self == c
    }
}

impl<P: CharPattern + ?Sized> CharPattern for &P {
    #[inline]
    fn matches(&self, c: char) -> bool {
        (**self).matches(c)
    }
}

/// A composable character class.
///
/// # Examples
///
/// ```rust
/// use serde_eson::class::{CharClass, CharPattern};
///
/// const VOWEL: CharClass = CharClass::Union(&[
///     CharClass::Char('a'),
///     CharClass::Char('e'),
///     CharClass::Char('i'),
///     CharClass::Char('o'),
///     CharClass::Char('u'),
/// ]);
/// const NOT_VOWEL: CharClass = CharClass::Not(&VOWEL);
///
/// assert!(VOWEL.matches('e'));
/// assert!(NOT_VOWEL.matches('x'));
/// assert!(CharClass::Range('a', 'z').matches('x'));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharClass {
    Char(char),
    /// Inclusive on both ends.
    Range(char, char),
    Union(&'static [CharClass]),
    Not(&'static CharClass),
}

impl CharPattern for CharClass {
    fn matches(&self, c: char) -> bool {
        match self {
            CharClass::Char(expected) => *expected == c,
            CharClass::Range(min, max) => (*min..=*max).contains(&c),
            CharClass::Union(classes) => classes.iter().any(|class| class.matches(c)),
            CharClass::Not(class) => !class.matches(c),
        }
    }
}

impl From<char> for CharClass {
    fn from(c: char) -> Self {
        CharClass::Char(c)
    }
}

pub const DIGIT: CharClass = CharClass::Range('0', '9');
pub const BINARY_DIGIT: CharClass = CharClass::Range('0', '1');
pub const OCTAL_DIGIT: CharClass = CharClass::Range('0', '7');
pub const HEX_DIGIT: CharClass = CharClass::Union(&[
    DIGIT,
    CharClass::Range('a', 'f'),
    CharClass::Range('A', 'F'),
]);

pub const HEX_PREFIX: CharClass = CharClass::Union(&[CharClass::Char('x'), CharClass::Char('X')]);
pub const BINARY_PREFIX: CharClass =
    CharClass::Union(&[CharClass::Char('b'), CharClass::Char('B')]);
pub const OCTAL_PREFIX: CharClass =
    CharClass::Union(&[CharClass::Char('o'), CharClass::Char('O')]);
pub const EXPONENT: CharClass = CharClass::Union(&[CharClass::Char('e'), CharClass::Char('E')]);

pub const DIGIT_OR_DOT: CharClass = CharClass::Union(&[DIGIT, CharClass::Char('.')]);

pub const IDENTIFIER_START: CharClass = CharClass::Union(&[
    CharClass::Range('a', 'z'),
    CharClass::Range('A', 'Z'),
    CharClass::Char('_'),
    CharClass::Char('$'),
]);
pub const IDENTIFIER_TAIL: CharClass = CharClass::Union(&[IDENTIFIER_START, DIGIT]);

/// Characters that start a literal object key (string or number).
pub const KEY_START: CharClass = CharClass::Union(&[
    CharClass::Char('"'),
    CharClass::Char('\''),
    CharClass::Char('.'),
    DIGIT,
]);

pub const NEWLINE: CharClass = CharClass::Union(&[CharClass::Char('\n'), CharClass::Char('\r')]);
pub const NOT_NEWLINE: CharClass = CharClass::Not(&NEWLINE);

pub const SPACE: CharClass = CharClass::Union(&[
    CharClass::Char(' '),
    CharClass::Char('\t'),
    CharClass::Char('\u{000C}'),
    NEWLINE,
]);

pub const UNARY: CharClass = CharClass::Union(&[CharClass::Char('+'), CharClass::Char('-')]);

pub const REGEXP_FLAG: CharClass = CharClass::Union(&[
    CharClass::Char('g'),
    CharClass::Char('i'),
    CharClass::Char('m'),
    CharClass::Char('s'),
    CharClass::Char('u'),
    CharClass::Char('y'),
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_classes() {
        assert!(DIGIT.matches('7'));
        assert!(!DIGIT.matches('a'));
        assert!(OCTAL_DIGIT.matches('7'));
        assert!(!OCTAL_DIGIT.matches('8'));
        assert!(BINARY_DIGIT.matches('1'));
        assert!(!BINARY_DIGIT.matches('2'));
        assert!(HEX_DIGIT.matches('F'));
        assert!(HEX_DIGIT.matches('c'));
        assert!(!HEX_DIGIT.matches('g'));
    }

    #[test]
    fn test_identifier_classes() {
        assert!(IDENTIFIER_START.matches('$'));
        assert!(IDENTIFIER_START.matches('_'));
        assert!(!IDENTIFIER_START.matches('1'));
        assert!(IDENTIFIER_TAIL.matches('1'));
        assert!(!IDENTIFIER_TAIL.matches('-'));
    }

    #[test]
    fn test_negation() {
        assert!(NOT_NEWLINE.matches('x'));
        assert!(!NOT_NEWLINE.matches('\n'));
        assert!(!NOT_NEWLINE.matches('\r'));
        assert!(CharClass::Not(&CharClass::Char('/')).matches('a'));
    }

    #[test]
    fn test_plain_char_pattern() {
        assert!('x'.matches('x'));
        assert!(!'x'.matches('y'));
        assert!((&'x').matches('x'));
    }
}

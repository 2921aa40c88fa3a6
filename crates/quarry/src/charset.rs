//! Character sets and collations.

/// A character set paired with its default collation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charset {
    /// Charset name as the server reports it.
    pub name: &'static str,
    /// Collation name.
    pub collation: &'static str,
    /// Maximum bytes per encoded character.
    pub max_len: u8,
}

impl Charset {
    /// Creates a custom charset/collation pair.
    #[must_use]
    pub const fn new(name: &'static str, collation: &'static str, max_len: u8) -> Self {
        Self {
            name,
            collation,
            max_len,
        }
    }
}

/// Full Unicode, 4 bytes per character.
pub const UTF8MB4: Charset = Charset::new("utf8mb4", "utf8mb4_unicode_ci", 4);
/// Legacy 3-byte Unicode.
pub const UTF8: Charset = Charset::new("utf8", "utf8_general_ci", 3);
/// Western European single-byte charset.
pub const LATIN1: Charset = Charset::new("latin1", "latin1_swedish_ci", 1);
/// Plain ASCII.
pub const ASCII: Charset = Charset::new("ascii", "ascii_general_ci", 1);

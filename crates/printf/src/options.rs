use crate::Locale;

/// How `%u` renders a negative integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnsignedNegative {
    /// Reinterpret as unsigned (`-1` becomes `4294967295`) and warn.
    #[default]
    Legacy,
    /// Render like `%d`.
    Signed,
}

/// Per-call formatting options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatOptions {
    pub locale: Locale,
    /// Turn "too many arguments" into an error instead of a warning.
    pub debug: bool,
    pub unsigned_negative: UnsignedNegative,
}

impl FormatOptions {
    pub fn with_locale(locale: Locale) -> Self {
        FormatOptions {
            locale,
            ..Default::default()
        }
    }
}

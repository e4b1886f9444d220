/// Number symbols for one locale.
///
/// ```
/// use strpack_printf::Locale;
///
/// let de = Locale::lookup("de_DE.UTF-8");
/// assert_eq!(de.decimal_separator, b',');
/// assert_eq!(de.grouping_separator, Some(b'.'));
/// assert_eq!(Locale::lookup("xx_YY"), Locale::C);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    pub name: &'static str,
    pub decimal_separator: u8,
    /// `None` disables the `'` grouping flag.
    pub grouping_separator: Option<u8>,
    /// Digits per group.
    pub grouping_size: usize,
}

impl Locale {
    pub const C: Locale = Locale {
        name: "C",
        decimal_separator: b'.',
        grouping_separator: None,
        grouping_size: 3,
    };

    /// Finds the symbols for `name`, ignoring any `.codeset` or
    /// `@modifier` suffix. Unknown names give [`Locale::C`].
    pub fn lookup(name: &str) -> Locale {
        let base = name
            .split(['.', '@'])
            .next()
            .unwrap_or_default()
            .replace('-', "_");
        LOCALES
            .iter()
            .find(|locale| locale.name.eq_ignore_ascii_case(&base))
            .copied()
            .unwrap_or(Locale::C)
    }

    /// Inserts the grouping separator into a run of integer digits.
    pub(crate) fn group(&self, digits: &[u8]) -> Vec<u8> {
        let Some(separator) = self.grouping_separator.filter(|_| self.grouping_size > 0) else {
            return digits.to_vec();
        };
        let mut out = Vec::with_capacity(digits.len() + digits.len() / self.grouping_size);
        for (i, &d) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % self.grouping_size == 0 {
                out.push(separator);
            }
            out.push(d);
        }
        out
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::C
    }
}

const fn locale(name: &'static str, decimal: u8, grouping: u8) -> Locale {
    Locale {
        name,
        decimal_separator: decimal,
        grouping_separator: Some(grouping),
        grouping_size: 3,
    }
}

static LOCALES: &[Locale] = &[
    Locale::C,
    Locale {
        name: "POSIX",
        ..Locale::C
    },
    locale("en_US", b'.', b','),
    locale("en_GB", b'.', b','),
    locale("de_DE", b',', b'.'),
    locale("fr_FR", b',', b' '),
    locale("it_IT", b',', b'.'),
    locale("es_ES", b',', b'.'),
    locale("pt_BR", b',', b'.'),
    locale("ru_RU", b',', b' '),
    locale("ja_JP", b'.', b','),
    locale("de_CH", b'.', b'\''),
];

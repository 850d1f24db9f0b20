use std::borrow::Cow;

/// A text encoding a console stream can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Ascii,
    Latin1,
}

impl Encoding {
    /// Looks up an encoding by its common label (`utf-8`, `US-ASCII`,
    /// `iso-8859-1`, ...).
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "utf8" => Some(Self::Utf8),
            "ascii" | "usascii" | "ansix3.41968" | "646" => Some(Self::Ascii),
            "latin1" | "iso88591" | "l1" => Some(Self::Latin1),
            _ => None,
        }
    }

    /// Derives the encoding from the POSIX locale (`LC_ALL`, `LC_CTYPE`,
    /// `LANG`, first non-empty wins), e.g. `en_US.UTF-8`.
    pub fn from_locale() -> Option<Self> {
        ["LC_ALL", "LC_CTYPE", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.is_empty())
            .and_then(|locale| Self::from_locale_name(&locale))
    }

    fn from_locale_name(locale: &str) -> Option<Self> {
        if locale == "C" || locale == "POSIX" {
            return Some(Self::Ascii);
        }
        let codeset = locale.split_once('.')?.1;
        let codeset = codeset.split_once('@').map_or(codeset, |(c, _)| c);
        Self::from_label(codeset)
    }

    /// Encodes `text`, replacing every character this encoding cannot
    /// represent with `?`.
    pub fn encode_lossy<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
        let limit = match self {
            Self::Utf8 => return Cow::Borrowed(text.as_bytes()),
            Self::Ascii if text.is_ascii() => return Cow::Borrowed(text.as_bytes()),
            Self::Ascii => 0x7f,
            Self::Latin1 => 0xff,
        };
        Cow::Owned(
            text.chars()
                .map(|c| match u32::from(c) {
                    code if code <= limit => code as u8,
                    _ => b'?',
                })
                .collect(),
        )
    }
}

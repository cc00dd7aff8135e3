//! Formatting and parsing through an ordered list of format selectors.
//!
//! Formatting tries each selector in order and keeps the first non-empty
//! result. Flags enums whose value isn't itself declared are decomposed
//! into their flag members and joined with [`FLAG_DELIMITER`].
//!
//! Parsing always tries a numeric literal first (decimal, or `0x` hex) when
//! the text looks numeric, then matches the text against the selectors in
//! order. Flags enums additionally accept delimiter-separated combinations.

use serde::{Deserialize, Serialize};

use crate::cache::MemberCache;
use crate::error::{FormatError, ParseError};
use crate::kind::{LiteralError, Underlying, parse_hex_bits};
use crate::member::EnumMember;

/// Identifier of a custom format registered with a [`FormatResolver`].
pub type CustomFormatId = u16;

/// Joins flag member names when formatting a combination.
pub const FLAG_DELIMITER: &str = ", ";

/// Splits flag combinations when parsing; tokens are trimmed.
pub const FLAG_SEPARATOR: &str = ",";

/// Format selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumFormat {
    /// The member's name.
    Name,
    /// The raw value in decimal.
    UnderlyingValue,
    /// The raw value as `0x`-prefixed, zero-padded uppercase hex.
    HexadecimalValue,
    /// The member's description attribute.
    Description,
    /// A format resolved through the caller's [`FormatResolver`].
    Custom(CustomFormatId),
}

impl EnumFormat {
    /// Value formats apply to any value, declared or not.
    #[inline]
    pub const fn is_value_format(self) -> bool {
        matches!(self, Self::UnderlyingValue | Self::HexadecimalValue)
    }
}

/// Formats used by [`MemberCache::as_string`]: the name, else the number.
pub const DEFAULT_FORMATS: &[EnumFormat] = &[EnumFormat::Name, EnumFormat::UnderlyingValue];

/// Formats used when parsing with an empty list.
pub const DEFAULT_PARSE_FORMATS: &[EnumFormat] = &[EnumFormat::Name];

/// A custom format function.
pub type CustomFormatFn<U> = dyn Fn(&EnumMember<U>) -> Option<String> + Send + Sync;

/// Resolves custom format ids to functions.
pub trait FormatResolver<U: Underlying> {
    fn resolve(&self, id: CustomFormatId) -> Option<&CustomFormatFn<U>>;
}

/// Resolver with no custom formats.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCustomFormats;

impl<U: Underlying> FormatResolver<U> for NoCustomFormats {
    #[inline]
    fn resolve(&self, _id: CustomFormatId) -> Option<&CustomFormatFn<U>> {
        None
    }
}

/// Append-only registry of custom formats.
///
/// ```
/// use enum_cache::{CustomFormats, EnumFormat, MemberCache, MemberRecord};
///
/// let cache = MemberCache::build([MemberRecord::new("Red", 1u8)], false, None);
/// let mut formats = CustomFormats::<u8>::new();
/// let lower = formats.register(|m| Some(m.name().to_lowercase())).unwrap();
///
/// let text = cache.to_string_with(1, &[lower], &formats).unwrap();
/// assert_eq!(text.as_deref(), Some("red"));
/// assert_eq!(cache.parse_with("red", false, &[lower], &formats), Ok(1));
/// ```
pub struct CustomFormats<U: Underlying> {
    formats: Vec<Box<CustomFormatFn<U>>>,
}

impl<U: Underlying> Default for CustomFormats<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: Underlying> CustomFormats<U> {
    pub fn new() -> Self {
        Self { formats: Vec::new() }
    }

    /// Register a format and return its selector.
    ///
    /// Ids are handed out in registration order starting at 0.
    pub fn register<F>(&mut self, format: F) -> Result<EnumFormat, FormatError>
    where
        F: Fn(&EnumMember<U>) -> Option<String> + Send + Sync + 'static,
    {
        let id = CustomFormatId::try_from(self.formats.len()).map_err(|_| FormatError::RegistryFull {
            capacity: self.formats.len(),
        })?;
        self.formats.push(Box::new(format));
        Ok(EnumFormat::Custom(id))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

impl<U: Underlying> FormatResolver<U> for CustomFormats<U> {
    fn resolve(&self, id: CustomFormatId) -> Option<&CustomFormatFn<U>> {
        self.formats.get(usize::from(id)).map(|f| f.as_ref())
    }
}

/// Parse settings, loadable from configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub ignore_case: bool,
    /// Flag combination separator.
    pub delimiter: String,
    pub formats: Vec<EnumFormat>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            ignore_case: false,
            delimiter: FLAG_SEPARATOR.to_string(),
            formats: DEFAULT_PARSE_FORMATS.to_vec(),
        }
    }
}

fn check_formats<U: Underlying>(
    formats: &[EnumFormat],
    resolver: &dyn FormatResolver<U>,
) -> Result<(), FormatError> {
    for &format in formats {
        if let EnumFormat::Custom(id) = format
            && resolver.resolve(id).is_none()
        {
            return Err(FormatError::InvalidFormatSelector { id });
        }
    }
    Ok(())
}

fn looks_numeric(text: &str) -> bool {
    matches!(text.as_bytes().first(), Some(b'0'..=b'9' | b'+' | b'-'))
}

fn parse_numeric<U: Underlying>(text: &str) -> Result<U, LiteralError> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(digits) => parse_hex_bits(digits),
        None => U::parse_decimal(text),
    }
}

fn matches_text(candidate: &str, text: &str, ignore_case: bool) -> bool {
    candidate == text || (ignore_case && candidate.to_lowercase() == text.to_lowercase())
}

impl<U: Underlying> MemberCache<U> {
    fn apply_format(
        &self,
        format: EnumFormat,
        value: U,
        member: Option<&EnumMember<U>>,
        resolver: &dyn FormatResolver<U>,
    ) -> Option<String> {
        let text = match format {
            EnumFormat::Name => member.map(|m| m.name().to_string()),
            EnumFormat::Description => member.and_then(|m| m.description()).map(str::to_string),
            EnumFormat::UnderlyingValue => Some(value.to_string()),
            EnumFormat::HexadecimalValue => {
                let width = (U::KIND.bits() / 4) as usize;
                Some(format!("0x{:0width$X}", value.to_bits()))
            }
            EnumFormat::Custom(id) => member.and_then(|m| resolver.resolve(id).and_then(|f| f(m))),
        };
        text.filter(|s| !s.is_empty())
    }

    fn format_member(
        &self,
        member: &EnumMember<U>,
        formats: &[EnumFormat],
        resolver: &dyn FormatResolver<U>,
    ) -> Option<String> {
        formats
            .iter()
            .find_map(|&f| self.apply_format(f, member.value(), Some(member), resolver))
    }

    /// Decompose into declared flag members and join their formatted forms.
    fn format_flag_bits(
        &self,
        value: U,
        formats: &[EnumFormat],
        resolver: &dyn FormatResolver<U>,
    ) -> Option<String> {
        if value == U::ZERO || !self.is_valid_flag_combination(value) {
            return None;
        }
        let mut parts = Vec::new();
        for member in self.flag_members(value) {
            parts.push(self.format_member(member, formats, resolver)?);
        }
        Some(parts.join(FLAG_DELIMITER))
    }

    /// Format with built-in selectors only. See [`MemberCache::to_string_with`].
    pub fn to_string(&self, value: U, formats: &[EnumFormat]) -> Result<Option<String>, FormatError> {
        self.to_string_with(value, formats, &NoCustomFormats)
    }

    /// Format `value` using the first selector that produces a non-empty
    /// string.
    ///
    /// A declared value is formatted through its primary member. A flags
    /// value that isn't declared is decomposed into flag members, each
    /// formatted with the same list and joined with `", "`; if any bit has no
    /// flag member (or no format applies to one), the first value format in
    /// the list is the fallback. `Ok(None)` means nothing applied.
    ///
    /// An empty list means [`DEFAULT_FORMATS`].
    pub fn to_string_with(
        &self,
        value: U,
        formats: &[EnumFormat],
        resolver: &dyn FormatResolver<U>,
    ) -> Result<Option<String>, FormatError> {
        check_formats(formats, resolver)?;
        let formats = if formats.is_empty() { DEFAULT_FORMATS } else { formats };

        if let Some(member) = self.get_member_by_value(value) {
            return Ok(self.format_member(member, formats, resolver));
        }
        if self.is_flags
            && let Some(joined) = self.format_flag_bits(value, formats, resolver)
        {
            return Ok(Some(joined));
        }
        Ok(formats
            .iter()
            .filter(|f| f.is_value_format())
            .find_map(|&f| self.apply_format(f, value, None, resolver)))
    }

    /// Name (or flag combination of names), else the decimal value.
    pub fn as_string(&self, value: U) -> String {
        match self.to_string(value, DEFAULT_FORMATS) {
            Ok(Some(text)) => text,
            _ => value.to_string(),
        }
    }

    /// Parse with built-in selectors only. See [`MemberCache::parse_with`].
    pub fn parse(&self, text: &str, ignore_case: bool, formats: &[EnumFormat]) -> Result<U, ParseError> {
        self.parse_with(text, ignore_case, formats, &NoCustomFormats)
    }

    /// Parse `text` into a value.
    ///
    /// Numeric-looking text (leading digit, `+` or `-`) is parsed as a
    /// literal first; an out-of-range literal fails with
    /// [`ParseError::Overflow`]. Otherwise the text is matched against each
    /// selector in order. Flags enums also accept `,`-separated tokens,
    /// each resolved the same way and OR-ed together; one failing token
    /// fails the whole parse.
    ///
    /// An empty list means [`DEFAULT_PARSE_FORMATS`].
    pub fn parse_with(
        &self,
        text: &str,
        ignore_case: bool,
        formats: &[EnumFormat],
        resolver: &dyn FormatResolver<U>,
    ) -> Result<U, ParseError> {
        self.parse_delimited(text, ignore_case, formats, FLAG_SEPARATOR, resolver)
    }

    /// Parse using configured options.
    pub fn parse_with_options(
        &self,
        text: &str,
        options: &ParseOptions,
        resolver: &dyn FormatResolver<U>,
    ) -> Result<U, ParseError> {
        self.parse_delimited(text, options.ignore_case, &options.formats, &options.delimiter, resolver)
    }

    fn parse_delimited(
        &self,
        text: &str,
        ignore_case: bool,
        formats: &[EnumFormat],
        delimiter: &str,
        resolver: &dyn FormatResolver<U>,
    ) -> Result<U, ParseError> {
        check_formats(formats, resolver)?;
        let formats = if formats.is_empty() { DEFAULT_PARSE_FORMATS } else { formats };

        let text = text.trim();
        if text.is_empty() {
            return Err(ParseError::no_match(text));
        }

        let whole = self.parse_token(text, ignore_case, formats, resolver);
        if !self.is_flags || delimiter.is_empty() || !text.contains(delimiter) {
            return whole;
        }
        // A single member whose formatted form contains the delimiter.
        if let Ok(value) = whole {
            return Ok(value);
        }

        let mut combined = U::ZERO;
        for token in text.split(delimiter) {
            combined = combined | self.parse_token(token.trim(), ignore_case, formats, resolver)?;
        }
        Ok(combined)
    }

    fn parse_token(
        &self,
        token: &str,
        ignore_case: bool,
        formats: &[EnumFormat],
        resolver: &dyn FormatResolver<U>,
    ) -> Result<U, ParseError> {
        if looks_numeric(token) {
            match parse_numeric::<U>(token) {
                Ok(value) => return Ok(value),
                Err(LiteralError::Overflow) => {
                    return Err(ParseError::Overflow {
                        input: token.to_string(),
                        kind: U::KIND,
                    });
                }
                Err(LiteralError::Malformed) => {}
            }
        }
        formats
            .iter()
            .find_map(|&f| self.match_format(f, token, ignore_case, resolver))
            .ok_or_else(|| ParseError::no_match(token))
    }

    fn match_format(
        &self,
        format: EnumFormat,
        token: &str,
        ignore_case: bool,
        resolver: &dyn FormatResolver<U>,
    ) -> Option<U> {
        match format {
            EnumFormat::Name => self.get_member_by_name(token, ignore_case).map(EnumMember::value),
            EnumFormat::Description => self.find_by_text(token, ignore_case, |m| m.description().map(str::to_string)),
            EnumFormat::Custom(id) => {
                let custom = resolver.resolve(id)?;
                self.find_by_text(token, ignore_case, custom)
            }
            // Literals were already tried.
            EnumFormat::UnderlyingValue | EnumFormat::HexadecimalValue => None,
        }
    }

    /// First member whose rendering equals `token`, exact matches first.
    fn find_by_text<F>(&self, token: &str, ignore_case: bool, render: F) -> Option<U>
    where
        F: Fn(&EnumMember<U>) -> Option<String>,
    {
        let rendered: Vec<(U, String)> = self
            .get_members(crate::MemberSelection::All)
            .filter_map(|m| render(m).map(|text| (m.value(), text)))
            .collect();
        rendered
            .iter()
            .find(|(_, text)| text == token)
            .or_else(|| {
                ignore_case
                    .then(|| rendered.iter().find(|(_, text)| matches_text(text, token, true)))
                    .flatten()
            })
            .map(|&(value, _)| value)
    }
}

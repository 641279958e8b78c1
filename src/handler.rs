//! Handlers and the encoding registry.
//!
//! A [`Handler`] pairs the decode and encode converters for one encoding.
//! The [`EncodingRegistry`] owns everything needed to find one: the alias
//! list, caller-registered handlers, and the ordered backend providers.
//! Lookup walks built-ins, then registered handlers, then backends, and
//! finally retries through the kind table's preferred spellings.

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};

use crate::backend::{ConverterProvider, OpenError, RawStatus, StatefulConverter};
use crate::codec::{self, ConvError, ConvertFn, Progress};
use crate::{CharEncoding, Error};

/// Cap on caller-registered handlers. Registrations past the cap are
/// discarded with a warning rather than failing the caller.
pub const MAX_EXTRA_HANDLERS: usize = 50;

/// Which way a conversion runs relative to the UTF-8 pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// External encoding to UTF-8.
    Decode,
    /// UTF-8 to external encoding.
    Encode,
}

/// Outcome of converting one chunk through a handler.
///
/// Direction-specific interpretation is already applied: a chunk that
/// stops at a trailing partial sequence comes back as `Consumed` on either
/// side, with the tail left unconsumed for the next chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// Everything acceptable was converted; wait for more input.
    Consumed(Progress),
    /// The output buffer filled up; grow it and call again.
    NeedSpace(Progress),
    /// The input is invalid at the reported offset. The good prefix was
    /// converted; the stream decides whether to substitute or fail.
    Malformed(Progress),
}

impl ChunkOutcome {
    /// Byte counts for this call regardless of how it ended.
    pub fn progress(&self) -> Progress {
        match *self {
            ChunkOutcome::Consumed(p)
            | ChunkOutcome::NeedSpace(p)
            | ChunkOutcome::Malformed(p) => p,
        }
    }
}

/// A process-lifetime handler built from the stateless converter functions.
pub struct BuiltinHandler {
    name: &'static str,
    decode: Option<ConvertFn>,
    encode: Option<ConvertFn>,
}

impl BuiltinHandler {
    /// The handler's canonical spelling.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

const fn builtin(name: &'static str, decode: ConvertFn, encode: ConvertFn) -> BuiltinHandler {
    BuiltinHandler {
        name,
        decode: Some(decode),
        encode: Some(encode),
    }
}

/// Table-driven handlers available without any registration. "UTF-16"
/// decodes as little endian and encodes little endian with a leading BOM.
static BUILTIN_HANDLERS: &[BuiltinHandler] = &[
    builtin("UTF-16LE", codec::utf16le_to_utf8, codec::utf8_to_utf16le),
    builtin("UTF-16BE", codec::utf16be_to_utf8, codec::utf8_to_utf16be),
    builtin("UTF-16", codec::utf16le_to_utf8, codec::utf8_to_utf16_with_bom),
    builtin("ISO-8859-1", codec::latin1_to_utf8, codec::utf8_to_latin1),
    builtin("ASCII", codec::ascii_to_utf8, codec::utf8_to_ascii),
    builtin("US-ASCII", codec::ascii_to_utf8, codec::utf8_to_ascii),
    builtin("ISO-8859-2", codec::iso8859_2_to_utf8, codec::utf8_to_iso8859_2),
    builtin("ISO-8859-3", codec::iso8859_3_to_utf8, codec::utf8_to_iso8859_3),
    builtin("ISO-8859-4", codec::iso8859_4_to_utf8, codec::utf8_to_iso8859_4),
    builtin("ISO-8859-5", codec::iso8859_5_to_utf8, codec::utf8_to_iso8859_5),
    builtin("ISO-8859-6", codec::iso8859_6_to_utf8, codec::utf8_to_iso8859_6),
    builtin("ISO-8859-7", codec::iso8859_7_to_utf8, codec::utf8_to_iso8859_7),
    builtin("ISO-8859-8", codec::iso8859_8_to_utf8, codec::utf8_to_iso8859_8),
    builtin("ISO-8859-9", codec::iso8859_9_to_utf8, codec::utf8_to_iso8859_9),
    builtin("ISO-8859-10", codec::iso8859_10_to_utf8, codec::utf8_to_iso8859_10),
    builtin("ISO-8859-11", codec::iso8859_11_to_utf8, codec::utf8_to_iso8859_11),
    builtin("ISO-8859-13", codec::iso8859_13_to_utf8, codec::utf8_to_iso8859_13),
    builtin("ISO-8859-14", codec::iso8859_14_to_utf8, codec::utf8_to_iso8859_14),
    builtin("ISO-8859-15", codec::iso8859_15_to_utf8, codec::utf8_to_iso8859_15),
    builtin("ISO-8859-16", codec::iso8859_16_to_utf8, codec::utf8_to_iso8859_16),
];

static UTF8_HANDLER: BuiltinHandler = builtin(
    "UTF-8",
    codec::utf8_passthrough,
    codec::utf8_passthrough,
);

/// A passthrough handler for UTF-8 itself, for callers that want a uniform
/// handler object instead of special-casing the identity conversion.
pub fn utf8_handler() -> Handler {
    Handler::Builtin(&UTF8_HANDLER)
}

/// Canonical spellings of all built-in handlers.
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    std::iter::once(UTF8_HANDLER.name).chain(BUILTIN_HANDLERS.iter().map(|h| h.name))
}

/// A caller-supplied handler kept alive by the registry.
///
/// At least one direction must be present; names are stored uppercase, the
/// same normalization the alias table applies.
pub struct RegisteredHandler {
    name: String,
    decode: Option<ConvertFn>,
    encode: Option<ConvertFn>,
}

impl RegisteredHandler {
    /// Builds a handler from converter functions. Returns `None` when both
    /// directions are absent.
    pub fn new(name: &str, decode: Option<ConvertFn>, encode: Option<ConvertFn>) -> Option<Self> {
        if decode.is_none() && encode.is_none() {
            return None;
        }
        Some(Self {
            name: name.to_ascii_uppercase(),
            decode,
            encode,
        })
    }

    /// The registered (uppercased) name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A backend-owned decoder/encoder pair. The converter state lives exactly
/// as long as this value; dropping it releases the backend resources.
pub struct BackendHandler {
    name: String,
    decoder: Box<dyn StatefulConverter>,
    encoder: Box<dyn StatefulConverter>,
}

impl BackendHandler {
    /// The encoding name the pair was opened for.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// An open conversion handler, tagged by where its converters came from.
pub enum Handler {
    /// Entry in the process-lifetime built-in table.
    Builtin(&'static BuiltinHandler),
    /// Caller-registered handler shared with the registry.
    Registered(Arc<RegisteredHandler>),
    /// Stateful pair owned by this value alone.
    Backend(BackendHandler),
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Builtin(h) => write!(f, "Handler::Builtin({})", h.name),
            Handler::Registered(h) => write!(f, "Handler::Registered({})", h.name),
            Handler::Backend(h) => write!(f, "Handler::Backend({})", h.name),
        }
    }
}

impl Handler {
    /// The encoding name this handler converts.
    pub fn name(&self) -> &str {
        match self {
            Handler::Builtin(h) => h.name,
            Handler::Registered(h) => h.name(),
            Handler::Backend(h) => h.name(),
        }
    }

    /// Whether the handler can convert in `direction`.
    pub fn supports(&self, direction: Direction) -> bool {
        let (decode, encode) = match self {
            Handler::Builtin(h) => (h.decode.is_some(), h.encode.is_some()),
            Handler::Registered(h) => (h.decode.is_some(), h.encode.is_some()),
            Handler::Backend(_) => (true, true),
        };
        match direction {
            Direction::Decode => decode,
            Direction::Encode => encode,
        }
    }

    fn convert_fn(&self, direction: Direction) -> Option<ConvertFn> {
        let (decode, encode) = match self {
            Handler::Builtin(h) => (h.decode, h.encode),
            Handler::Registered(h) => (h.decode, h.encode),
            Handler::Backend(_) => return None,
        };
        match direction {
            Direction::Decode => decode,
            Direction::Encode => encode,
        }
    }

    /// Decodes one chunk of external bytes into UTF-8.
    ///
    /// A trailing partial sequence is not an error; the unconsumed bytes
    /// simply wait for the next chunk.
    pub fn decode_chunk(&mut self, dst: &mut [u8], src: &[u8]) -> crate::Result<ChunkOutcome> {
        if let Handler::Backend(h) = self {
            let out = h.decoder.convert(dst, src)?;
            return Ok(match out.status {
                RawStatus::Complete | RawStatus::TruncatedInput => {
                    ChunkOutcome::Consumed(out.progress)
                }
                RawStatus::SpaceExhausted => ChunkOutcome::NeedSpace(out.progress),
                RawStatus::MalformedInput => ChunkOutcome::Malformed(out.progress),
            });
        }
        let f = self.convert_fn(Direction::Decode).ok_or(Error::Internal)?;
        match f(dst, Some(src)) {
            Ok(p) => {
                if p.consumed < src.len() && p.produced > 0 {
                    Ok(ChunkOutcome::NeedSpace(p))
                } else {
                    Ok(ChunkOutcome::Consumed(p))
                }
            }
            Err(ConvError::Truncated { consumed, produced }) => {
                Ok(ChunkOutcome::Consumed(Progress { consumed, produced }))
            }
            Err(ConvError::Malformed { consumed, produced }) => {
                Ok(ChunkOutcome::Malformed(Progress { consumed, produced }))
            }
            Err(ConvError::Internal) => Err(Error::Internal),
        }
    }

    /// Encodes one chunk of UTF-8 into the external encoding.
    ///
    /// `src` of `None` is the flush/initialize call that lets encoders
    /// emit a byte-order mark before any data. A scalar split at the end
    /// of the chunk is deferred exactly like on the decode side: the good
    /// prefix is reported and the partial bytes stay unconsumed.
    pub fn encode_chunk(
        &mut self,
        dst: &mut [u8],
        src: Option<&[u8]>,
    ) -> crate::Result<ChunkOutcome> {
        if let Handler::Backend(h) = self {
            let out = h.encoder.convert(dst, src.unwrap_or(&[]))?;
            return Ok(match out.status {
                RawStatus::Complete | RawStatus::TruncatedInput => {
                    ChunkOutcome::Consumed(out.progress)
                }
                RawStatus::SpaceExhausted => ChunkOutcome::NeedSpace(out.progress),
                RawStatus::MalformedInput => ChunkOutcome::Malformed(out.progress),
            });
        }
        let f = self.convert_fn(Direction::Encode).ok_or(Error::Internal)?;
        let srclen = src.map_or(0, <[u8]>::len);
        match f(dst, src) {
            Ok(p) => {
                if p.consumed < srclen && p.produced > 0 {
                    Ok(ChunkOutcome::NeedSpace(p))
                } else {
                    // Either everything was taken, or the chunk ends inside
                    // a scalar and the tail waits for the next one.
                    Ok(ChunkOutcome::Consumed(p))
                }
            }
            Err(ConvError::Truncated { consumed, produced }) => {
                Ok(ChunkOutcome::Consumed(Progress { consumed, produced }))
            }
            Err(ConvError::Malformed { consumed, produced }) => {
                Ok(ChunkOutcome::Malformed(Progress { consumed, produced }))
            }
            Err(ConvError::Internal) => Err(Error::Internal),
        }
    }
}

struct Alias {
    /// Real encoding name the alias points at.
    name: String,
    /// Uppercased alias spelling.
    alias: String,
}

/// The context object holding aliases, registered handlers, and backend
/// providers.
///
/// A fresh registry already serves every built-in encoding; everything
/// else is added by the embedding application at startup.
#[derive(Default)]
pub struct EncodingRegistry {
    aliases: Vec<Alias>,
    extra: Vec<Arc<RegisteredHandler>>,
    providers: Vec<Box<dyn ConverterProvider>>,
}

impl EncodingRegistry {
    /// Creates a registry with no aliases, extra handlers, or providers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Points `alias` at `name`, replacing an earlier target if the alias
    /// already exists. Aliases are matched case-insensitively.
    pub fn add_alias(&mut self, name: &str, alias: &str) {
        let upper = alias.to_ascii_uppercase();
        if let Some(existing) = self.aliases.iter_mut().find(|a| a.alias == upper) {
            existing.name = name.to_string();
            return;
        }
        self.aliases.push(Alias {
            name: name.to_string(),
            alias: upper,
        });
    }

    /// The real name `alias` points at, if any. Matching is
    /// case-insensitive and allocates nothing, keeping the handler lookup
    /// fast path allocation-free.
    pub fn get_alias(&self, alias: &str) -> Option<&str> {
        self.aliases
            .iter()
            .find(|a| a.alias.eq_ignore_ascii_case(alias))
            .map(|a| a.name.as_str())
    }

    /// Removes `alias`, matching its stored spelling exactly. Returns
    /// whether anything was removed.
    pub fn remove_alias(&mut self, alias: &str) -> bool {
        let before = self.aliases.len();
        self.aliases.retain(|a| a.alias != alias);
        before != self.aliases.len()
    }

    /// Drops every alias.
    pub fn clear_aliases(&mut self) {
        self.aliases.clear();
    }

    /// Maps a name to its encoding kind: alias resolution first, then a
    /// case-insensitive match against the known spellings.
    ///
    /// The undecorated `"UTF-16"` and `"UCS-4"` map to the little-endian
    /// kinds; actual byte order comes from detection when it matters. An
    /// empty name means no declaration, and an unknown one maps to
    /// [`CharEncoding::Error`].
    pub fn parse_encoding_name(&self, name: &str) -> CharEncoding {
        let name = self.get_alias(name).unwrap_or(name);
        match name.to_ascii_uppercase().as_str() {
            "" => CharEncoding::None,
            "UTF-8" | "UTF8" => CharEncoding::Utf8,
            "UTF-16" | "UTF16" => CharEncoding::Utf16Le,
            "ISO-10646-UCS-2" | "UCS-2" | "UCS2" => CharEncoding::Ucs2,
            "ISO-10646-UCS-4" | "UCS-4" | "UCS4" => CharEncoding::Ucs4Le,
            "ISO-8859-1" | "ISO-LATIN-1" | "ISO LATIN 1" => CharEncoding::Iso8859_1,
            "ISO-8859-2" | "ISO-LATIN-2" | "ISO LATIN 2" => CharEncoding::Iso8859_2,
            "ISO-8859-3" => CharEncoding::Iso8859_3,
            "ISO-8859-4" => CharEncoding::Iso8859_4,
            "ISO-8859-5" => CharEncoding::Iso8859_5,
            "ISO-8859-6" => CharEncoding::Iso8859_6,
            "ISO-8859-7" => CharEncoding::Iso8859_7,
            "ISO-8859-8" => CharEncoding::Iso8859_8,
            "ISO-8859-9" => CharEncoding::Iso8859_9,
            "ISO-2022-JP" => CharEncoding::Iso2022Jp,
            "SHIFT_JIS" => CharEncoding::ShiftJis,
            "EUC-JP" => CharEncoding::EucJp,
            other => {
                debug!("unrecognized encoding name {other:?}");
                CharEncoding::Error
            }
        }
    }

    /// Adds a caller-supplied handler. Registrations beyond
    /// [`MAX_EXTRA_HANDLERS`] are discarded with a warning.
    pub fn register_handler(&mut self, handler: RegisteredHandler) {
        if self.extra.len() >= MAX_EXTRA_HANDLERS {
            warn!(
                "discarding handler registration for {:?}: registry is full",
                handler.name()
            );
            return;
        }
        self.extra.push(Arc::new(handler));
    }

    /// Appends a backend provider. Providers are consulted in registration
    /// order after built-in and registered handlers.
    pub fn register_provider(&mut self, provider: Box<dyn ConverterProvider>) {
        self.providers.push(provider);
    }

    /// Opens a handler for `name` in `direction`.
    ///
    /// `Ok(None)` means the stream is already UTF-8 and needs no
    /// conversion. The chain: alias resolution, the UTF-8 fast path, a
    /// name match over built-ins, registered handlers and backends, and
    /// finally the kind table's preferred spellings for names that only
    /// parse as a kind.
    pub fn open_handler(&self, name: &str, direction: Direction) -> crate::Result<Option<Handler>> {
        let resolved = self.get_alias(name).unwrap_or(name);
        if resolved.eq_ignore_ascii_case("UTF-8") || resolved.eq_ignore_ascii_case("UTF8") {
            return Ok(None);
        }
        if let Some(handler) = self.find_by_name(resolved, direction)? {
            return Ok(Some(handler));
        }
        match self.parse_encoding_name(name) {
            CharEncoding::Error => Err(Error::UnsupportedEncoding(name.to_string())),
            kind => self
                .lookup_kind(kind, direction)
                .map_err(|e| match e {
                    Error::UnsupportedEncoding(_) => Error::UnsupportedEncoding(name.to_string()),
                    other => other,
                }),
        }
    }

    /// Opens a handler for a detected or parsed encoding kind.
    ///
    /// `Ok(None)` means no conversion is needed (`Utf8`, or `None` where
    /// the caller falls back to its default). Kinds with no stable name
    /// and no handler report the unsupported error.
    pub fn lookup_kind(
        &self,
        kind: CharEncoding,
        direction: Direction,
    ) -> crate::Result<Option<Handler>> {
        use CharEncoding as E;
        let names: &[&str] = match kind {
            E::None | E::Utf8 => return Ok(None),
            E::Error => &[],
            E::Utf16Le => &["UTF-16LE"],
            E::Utf16Be => &["UTF-16BE"],
            E::Ascii => &["ASCII", "US-ASCII"],
            E::Iso8859_1 => &["ISO-8859-1"],
            E::Iso8859_2 => &["ISO-8859-2"],
            E::Iso8859_3 => &["ISO-8859-3"],
            E::Iso8859_4 => &["ISO-8859-4"],
            E::Iso8859_5 => &["ISO-8859-5"],
            E::Iso8859_6 => &["ISO-8859-6"],
            E::Iso8859_7 => &["ISO-8859-7"],
            E::Iso8859_8 => &["ISO-8859-8"],
            E::Iso8859_9 => &["ISO-8859-9"],
            E::Iso2022Jp => &["ISO-2022-JP"],
            E::ShiftJis => &["SHIFT-JIS", "SHIFT_JIS", "Shift_JIS"],
            E::EucJp => &["EUC-JP"],
            E::Ebcdic => &["EBCDIC", "ebcdic", "EBCDIC-US", "IBM-037"],
            E::Ucs4Le | E::Ucs4Be | E::Ucs4Swapped2143 | E::Ucs4Swapped3412 => {
                &["ISO-10646-UCS-4", "UCS-4", "UCS4"]
            }
            E::Ucs2 => &["ISO-10646-UCS-2", "UCS-2", "UCS2"],
        };
        for candidate in names {
            if let Some(handler) = self.find_by_name(candidate, direction)? {
                debug!("kind {kind:?} served by handler {:?}", handler.name());
                return Ok(Some(handler));
            }
        }
        Err(Error::UnsupportedEncoding(
            kind.canonical_name().unwrap_or("unrecognized").to_string(),
        ))
    }

    fn find_by_name(&self, name: &str, direction: Direction) -> crate::Result<Option<Handler>> {
        for h in BUILTIN_HANDLERS {
            if h.name.eq_ignore_ascii_case(name) {
                let handler = Handler::Builtin(h);
                if handler.supports(direction) {
                    return Ok(Some(handler));
                }
            }
        }
        for h in &self.extra {
            if h.name().eq_ignore_ascii_case(name) {
                let handler = Handler::Registered(Arc::clone(h));
                if handler.supports(direction) {
                    return Ok(Some(handler));
                }
            }
        }
        self.open_backend(name)
    }

    fn open_backend(&self, name: &str) -> crate::Result<Option<Handler>> {
        for provider in &self.providers {
            let decoder = match provider.open(name, Direction::Decode) {
                Ok(converter) => converter,
                Err(OpenError::Unsupported) => continue,
                Err(e) => return Err(open_failure(provider.name(), name, e)),
            };
            let encoder = match provider.open(name, Direction::Encode) {
                Ok(converter) => converter,
                Err(OpenError::Unsupported) => continue,
                Err(e) => return Err(open_failure(provider.name(), name, e)),
            };
            debug!("encoding {name:?} served by backend {}", provider.name());
            return Ok(Some(Handler::Backend(BackendHandler {
                name: name.to_string(),
                decoder,
                encoder,
            })));
        }
        Ok(None)
    }
}

fn open_failure(provider: &str, encoding: &str, err: OpenError) -> Error {
    warn!("backend {provider} failed to open {encoding:?}: {err}");
    match err {
        OpenError::OutOfMemory => Error::OutOfMemory,
        _ => Error::Internal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::Latin1Provider;

    #[test]
    fn aliases_resolve_case_insensitively() {
        let mut registry = EncodingRegistry::new();
        registry.add_alias("ISO-8859-5", "MY-CYRILLIC");
        assert_eq!(registry.get_alias("my-cyrillic"), Some("ISO-8859-5"));

        // Re-adding replaces the target.
        registry.add_alias("ISO-8859-2", "my-cyrillic");
        assert_eq!(registry.get_alias("MY-CYRILLIC"), Some("ISO-8859-2"));
    }

    #[test]
    fn remove_alias_matches_stored_spelling() {
        let mut registry = EncodingRegistry::new();
        registry.add_alias("ISO-8859-5", "cyr");
        // Stored uppercase; the lowercase spelling no longer matches.
        assert!(!registry.remove_alias("cyr"));
        assert!(registry.remove_alias("CYR"));
        assert_eq!(registry.get_alias("cyr"), None);
    }

    #[test]
    fn clear_aliases_empties_the_table() {
        let mut registry = EncodingRegistry::new();
        registry.add_alias("ISO-8859-5", "a");
        registry.add_alias("ISO-8859-2", "b");
        registry.clear_aliases();
        assert_eq!(registry.get_alias("a"), None);
        assert_eq!(registry.get_alias("b"), None);
    }

    #[test]
    fn parse_known_names() {
        let registry = EncodingRegistry::new();
        assert_eq!(registry.parse_encoding_name("utf-8"), CharEncoding::Utf8);
        assert_eq!(registry.parse_encoding_name("UTF-16"), CharEncoding::Utf16Le);
        assert_eq!(registry.parse_encoding_name("UCS-4"), CharEncoding::Ucs4Le);
        assert_eq!(
            registry.parse_encoding_name("ISO LATIN 1"),
            CharEncoding::Iso8859_1
        );
        assert_eq!(
            registry.parse_encoding_name("Shift_JIS"),
            CharEncoding::ShiftJis
        );
        assert_eq!(registry.parse_encoding_name(""), CharEncoding::None);
        assert_eq!(registry.parse_encoding_name("KOI8-R"), CharEncoding::Error);
    }

    #[test]
    fn parse_resolves_aliases_first() {
        let mut registry = EncodingRegistry::new();
        registry.add_alias("ISO-8859-7", "GREEK");
        assert_eq!(registry.parse_encoding_name("greek"), CharEncoding::Iso8859_7);
    }

    #[test]
    fn utf8_needs_no_handler() {
        let registry = EncodingRegistry::new();
        assert!(registry
            .open_handler("UTF-8", Direction::Decode)
            .unwrap()
            .is_none());
        assert!(registry
            .open_handler("utf8", Direction::Encode)
            .unwrap()
            .is_none());
        assert!(registry
            .lookup_kind(CharEncoding::Utf8, Direction::Decode)
            .unwrap()
            .is_none());
        assert!(registry
            .lookup_kind(CharEncoding::None, Direction::Decode)
            .unwrap()
            .is_none());
    }

    #[test]
    fn builtin_lookup_by_name() {
        let registry = EncodingRegistry::new();
        let handler = registry
            .open_handler("iso-8859-5", Direction::Decode)
            .unwrap()
            .unwrap();
        assert_eq!(handler.name(), "ISO-8859-5");
        assert!(matches!(handler, Handler::Builtin(_)));
    }

    #[test]
    fn lookup_through_alias() {
        let mut registry = EncodingRegistry::new();
        registry.add_alias("ISO-8859-2", "LATIN-2");
        let handler = registry
            .open_handler("latin-2", Direction::Encode)
            .unwrap()
            .unwrap();
        assert_eq!(handler.name(), "ISO-8859-2");
    }

    #[test]
    fn unknown_name_is_unsupported() {
        let registry = EncodingRegistry::new();
        let err = registry
            .open_handler("KOI8-R", Direction::Decode)
            .unwrap_err();
        assert_eq!(err, Error::UnsupportedEncoding("KOI8-R".to_string()));
    }

    #[test]
    fn kind_lookup_uses_preference_lists() {
        let registry = EncodingRegistry::new();
        let handler = registry
            .lookup_kind(CharEncoding::Ascii, Direction::Decode)
            .unwrap()
            .unwrap();
        assert_eq!(handler.name(), "ASCII");

        let handler = registry
            .lookup_kind(CharEncoding::Utf16Be, Direction::Encode)
            .unwrap()
            .unwrap();
        assert_eq!(handler.name(), "UTF-16BE");

        // No backend serves UCS-4 here.
        let err = registry
            .lookup_kind(CharEncoding::Ucs4Le, Direction::Decode)
            .unwrap_err();
        assert_eq!(
            err,
            Error::UnsupportedEncoding("ISO-10646-UCS-4".to_string())
        );
    }

    #[test]
    fn registered_handler_is_found_before_backends() {
        let mut registry = EncodingRegistry::new();
        let handler = RegisteredHandler::new(
            "x-latin-echo",
            Some(crate::codec::latin1_to_utf8),
            None,
        )
        .unwrap();
        registry.register_handler(handler);

        let found = registry
            .open_handler("X-LATIN-ECHO", Direction::Decode)
            .unwrap()
            .unwrap();
        assert!(matches!(found, Handler::Registered(_)));
        assert_eq!(found.name(), "X-LATIN-ECHO");

        // Only the decode direction was registered.
        let err = registry
            .open_handler("X-LATIN-ECHO", Direction::Encode)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedEncoding(_)));
    }

    #[test]
    fn registration_requires_a_direction() {
        assert!(RegisteredHandler::new("X-NOTHING", None, None).is_none());
    }

    #[test]
    fn registrations_past_the_cap_are_discarded() {
        let mut registry = EncodingRegistry::new();
        for i in 0..MAX_EXTRA_HANDLERS + 5 {
            let name = format!("X-EXTRA-{i}");
            let handler =
                RegisteredHandler::new(&name, Some(crate::codec::latin1_to_utf8), None).unwrap();
            registry.register_handler(handler);
        }
        // Early registrations survive, late ones were dropped.
        assert!(registry
            .open_handler("X-EXTRA-0", Direction::Decode)
            .unwrap()
            .is_some());
        assert!(registry
            .open_handler(&format!("X-EXTRA-{}", MAX_EXTRA_HANDLERS - 1), Direction::Decode)
            .unwrap()
            .is_some());
        assert!(registry
            .open_handler(&format!("X-EXTRA-{MAX_EXTRA_HANDLERS}"), Direction::Decode)
            .is_err());
    }

    #[test]
    fn backend_serves_names_nothing_else_knows() {
        let mut registry = EncodingRegistry::new();
        registry.register_provider(Box::new(Latin1Provider {
            advertised: "X-BACKEND-1252",
        }));

        let mut handler = registry
            .open_handler("X-BACKEND-1252", Direction::Decode)
            .unwrap()
            .unwrap();
        assert!(matches!(handler, Handler::Backend(_)));

        let mut dst = [0u8; 16];
        let outcome = handler.decode_chunk(&mut dst, b"caf\xe9").unwrap();
        let p = outcome.progress();
        assert_eq!(&dst[..p.produced], "café".as_bytes());
    }

    #[test]
    fn builtin_names_include_utf8_and_latin_family() {
        let names: Vec<_> = builtin_names().collect();
        assert!(names.contains(&"UTF-8"));
        assert!(names.contains(&"UTF-16"));
        assert!(names.contains(&"ISO-8859-16"));
        assert!(names.contains(&"US-ASCII"));
    }

    #[test]
    fn decode_chunk_defers_truncated_sequences() {
        let mut handler = EncodingRegistry::new()
            .open_handler("UTF-16LE", Direction::Decode)
            .unwrap()
            .unwrap();
        let mut dst = [0u8; 16];
        let outcome = handler.decode_chunk(&mut dst, &[0x41, 0x00, 0x42]).unwrap();
        assert_eq!(
            outcome,
            ChunkOutcome::Consumed(Progress {
                consumed: 2,
                produced: 1
            })
        );
    }

    #[test]
    fn encode_chunk_defers_split_scalar() {
        let mut handler = EncodingRegistry::new()
            .open_handler("ISO-8859-1", Direction::Encode)
            .unwrap()
            .unwrap();
        let mut dst = [0u8; 16];
        // Lead byte of a two-byte scalar with no continuation yet.
        let outcome = handler.encode_chunk(&mut dst, Some(b"a\xc3")).unwrap();
        assert_eq!(
            outcome,
            ChunkOutcome::Consumed(Progress {
                consumed: 1,
                produced: 1
            })
        );
        assert_eq!(&dst[..1], b"a");

        // Nothing but the partial scalar: zero progress, still no error.
        let outcome = handler.encode_chunk(&mut dst, Some(b"\xc3")).unwrap();
        assert_eq!(outcome, ChunkOutcome::Consumed(Progress::default()));
    }

    #[test]
    fn encode_chunk_reports_malformed_target() {
        let mut handler = EncodingRegistry::new()
            .open_handler("ASCII", Direction::Encode)
            .unwrap()
            .unwrap();
        let mut dst = [0u8; 16];
        let outcome = handler
            .encode_chunk(&mut dst, Some("a\u{0434}".as_bytes()))
            .unwrap();
        assert_eq!(
            outcome,
            ChunkOutcome::Malformed(Progress {
                consumed: 1,
                produced: 1
            })
        );
    }

    #[test]
    fn utf8_handler_is_a_passthrough() {
        let mut handler = utf8_handler();
        let mut dst = [0u8; 8];
        let outcome = handler.decode_chunk(&mut dst, b"abc").unwrap();
        assert_eq!(
            outcome.progress(),
            Progress {
                consumed: 3,
                produced: 3
            }
        );
    }
}

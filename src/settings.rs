use encoding::EncodingRef;
use encoding::all::WINDOWS_1251;

use std::fmt;

/// Output encoding for files written with [`crate::BlockPar::save_to_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputEncoding {
    #[default]
    Utf8,
    /// UTF-16LE with a byte order mark.
    Utf16Le,
}

/// Controls how text documents are parsed and how files are decoded.
#[derive(Clone)]
pub struct LoadSettings {
    /// Deepest block nesting accepted before the parser gives up. Unlimited when `None`.
    max_depth: Option<usize>,
    /// Codec for files that have no BOM and are not valid UTF-8.
    ansi_codec: EncodingRef,
}

impl fmt::Debug for LoadSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadSettings")
            .field("max_depth", &self.max_depth)
            .field("ansi_codec", &self.ansi_codec.name())
            .finish()
    }
}

impl PartialEq for LoadSettings {
    fn eq(&self, other: &Self) -> bool {
        self.max_depth == other.max_depth && self.ansi_codec.name() == other.ansi_codec.name()
    }
}

impl Default for LoadSettings {
    fn default() -> Self {
        LoadSettings {
            max_depth: None,
            ansi_codec: WINDOWS_1251,
        }
    }
}

impl LoadSettings {
    pub fn new() -> Self {
        LoadSettings::default()
    }

    /// Rejects documents nested deeper than `max_depth`. Useful for untrusted input;
    /// by default whatever the writer produced is accepted.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn ansi_codec(mut self, ansi_codec: EncodingRef) -> Self {
        self.ansi_codec = ansi_codec;
        self
    }

    pub fn get_max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn get_ansi_codec(&self) -> EncodingRef {
        self.ansi_codec
    }
}

/// Controls how a tree is written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSettings {
    ascii: bool,
    indent: String,
    encoding: OutputEncoding,
}

impl Default for SaveSettings {
    fn default() -> Self {
        SaveSettings {
            ascii: false,
            indent: "    ".to_owned(),
            encoding: OutputEncoding::Utf8,
        }
    }
}

impl SaveSettings {
    pub fn new() -> Self {
        SaveSettings::default()
    }

    /// When set, every non-ASCII character is written as a `\u{..}` escape.
    pub fn ascii(mut self, ascii: bool) -> Self {
        self.ascii = ascii;
        self
    }

    /// Indentation unit repeated once per nesting level.
    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn encoding(mut self, encoding: OutputEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn is_ascii(&self) -> bool {
        self.ascii
    }

    pub fn get_indent(&self) -> &str {
        &self.indent
    }

    pub fn get_encoding(&self) -> OutputEncoding {
        self.encoding
    }
}

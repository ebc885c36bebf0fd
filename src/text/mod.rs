//! The block text format.
//!
//! A document is a sequence of entries; an entry is either `name = value` or
//! `name { ...entries... }`. Whitespace between entries is insignificant, entry order is
//! preserved. Names and values are quoted (`"..."`, with `\"`, `\\`, `\n`, `\r`, `\t` and
//! `\u{XXXX}` escapes) only when they cannot be written bare. `//` comment lines are
//! kept with the entry below them.
//!
//! ```
//! use blockpar::BlockPar;
//!
//! let tree = BlockPar::load_from_text("ship {\n    name = Ranger\n}\n").unwrap();
//! assert_eq!(tree.param_path_get("ship/name").unwrap().as_str(), "Ranger");
//! assert_eq!(tree.save_to_text(false), "ship {\n    name = Ranger\n}\n");
//! ```

mod escape;
mod reader;
mod writer;

use crate::block::BlockPar;
use crate::err::Result;
use crate::settings::{LoadSettings, SaveSettings};

use log::debug;

pub(crate) use reader::TextReader;
pub(crate) use writer::TextWriter;

impl BlockPar {
    /// Parses a whole document into a fresh tree.
    pub fn load_from_text(text: &str) -> Result<BlockPar> {
        Self::load_from_text_with(text, &LoadSettings::default())
    }

    pub fn load_from_text_with(text: &str, settings: &LoadSettings) -> Result<BlockPar> {
        let tree = TextReader::new(text, settings).parse_document()?;
        debug!(
            "Loaded {} bytes of text: {} parameters, {} blocks at top level",
            text.len(),
            tree.param_count(),
            tree.block_count()
        );
        Ok(tree)
    }

    /// Replaces `self` with the parsed document. On failure `self` is left untouched.
    pub fn load_from_text_into(&mut self, text: &str) -> Result<()> {
        *self = Self::load_from_text(text)?;
        Ok(())
    }

    /// Serializes the tree. With `ascii_mode` the output contains ASCII characters only.
    pub fn save_to_text(&self, ascii_mode: bool) -> String {
        self.save_to_text_with(&SaveSettings::new().ascii(ascii_mode))
    }

    pub fn save_to_text_with(&self, settings: &SaveSettings) -> String {
        let mut writer = TextWriter::new(settings);
        writer.write_block(self, 0);
        let text = writer.finish();

        debug!("Saved {} entries as {} bytes of text", self.all_count(), text.len());
        text
    }
}

//! Whole-file wrappers around the text codec.
//!
//! Files are read completely, decoded to text and handed to the parser; saving
//! does the opposite. Decoding honours a byte order mark (UTF-8, UTF-16LE, UTF-16BE);
//! without one the bytes are taken as UTF-8 when valid, otherwise they are decoded
//! with the configured ANSI codec.

use crate::block::BlockPar;
use crate::err::{BlockParError, Result};
use crate::settings::{LoadSettings, OutputEncoding, SaveSettings};

use encoding::all::{UTF_16BE, UTF_16LE};
use encoding::{DecoderTrap, EncoderTrap, Encoding, EncodingRef};
use log::{debug, warn};

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];

fn decode_with(codec: EncodingRef, bytes: &[u8]) -> Result<String> {
    codec
        .decode(bytes, DecoderTrap::Strict)
        .map_err(|message| BlockParError::Decode {
            encoding: codec.name(),
            message: message.into_owned(),
        })
}

/// Turns raw file contents into text.
pub fn decode_text(bytes: &[u8], settings: &LoadSettings) -> Result<String> {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        debug!("Detected UTF-8 BOM");
        return String::from_utf8(rest.to_vec()).map_err(|e| BlockParError::Decode {
            encoding: "utf-8",
            message: e.to_string(),
        });
    }
    if let Some(rest) = bytes.strip_prefix(UTF16LE_BOM) {
        debug!("Detected UTF-16LE BOM");
        return decode_with(UTF_16LE, rest);
    }
    if let Some(rest) = bytes.strip_prefix(UTF16BE_BOM) {
        debug!("Detected UTF-16BE BOM");
        return decode_with(UTF_16BE, rest);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.to_owned()),
        Err(e) => {
            let codec = settings.get_ansi_codec();
            warn!(
                "Input is not valid UTF-8 ({}), falling back to `{}`",
                e,
                codec.name()
            );
            decode_with(codec, bytes)
        }
    }
}

/// Turns text into file contents.
pub fn encode_text(text: &str, encoding: OutputEncoding) -> Result<Vec<u8>> {
    match encoding {
        OutputEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
        OutputEncoding::Utf16Le => {
            let mut out = UTF16LE_BOM.to_vec();
            let body = UTF_16LE
                .encode(text, EncoderTrap::Strict)
                .map_err(|message| BlockParError::Encode {
                    encoding: UTF_16LE.name(),
                    message: message.into_owned(),
                })?;
            out.extend_from_slice(&body);
            Ok(out)
        }
    }
}

impl BlockPar {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<BlockPar> {
        Self::load_from_file_with(path, &LoadSettings::default())
    }

    pub fn load_from_file_with(path: impl AsRef<Path>, settings: &LoadSettings) -> Result<BlockPar> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| BlockParError::Io {
            source,
            path: path.to_path_buf(),
        })?;

        debug!("Read {} bytes from {}", bytes.len(), path.display());
        let text = decode_text(&bytes, settings)?;
        Self::load_from_text_with(&text, settings)
    }

    pub fn load_from_reader(mut reader: impl Read, settings: &LoadSettings) -> Result<BlockPar> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let text = decode_text(&bytes, settings)?;
        Self::load_from_text_with(&text, settings)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>, settings: &SaveSettings) -> Result<()> {
        let path = path.as_ref();
        let bytes = encode_text(&self.save_to_text_with(settings), settings.get_encoding())?;

        fs::write(path, &bytes).map_err(|source| BlockParError::Io {
            source,
            path: path.to_path_buf(),
        })?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    pub fn save_to_writer(&self, mut writer: impl Write, settings: &SaveSettings) -> Result<()> {
        let bytes = encode_text(&self.save_to_text_with(settings), settings.get_encoding())?;
        writer.write_all(&bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding::all::WINDOWS_1252;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_decodes_boms() {
        let settings = LoadSettings::default();

        let mut utf8 = UTF8_BOM.to_vec();
        utf8.extend_from_slice("a = ж".as_bytes());
        assert_eq!(decode_text(&utf8, &settings).unwrap(), "a = ж");

        let utf16 = encode_text("a = ж", OutputEncoding::Utf16Le).unwrap();
        assert_eq!(&utf16[..2], UTF16LE_BOM);
        assert_eq!(decode_text(&utf16, &settings).unwrap(), "a = ж");

        let mut utf16be = UTF16BE_BOM.to_vec();
        utf16be.extend_from_slice(&[0x00, b'a', 0x04, 0x36]);
        assert_eq!(decode_text(&utf16be, &settings).unwrap(), "aж");
    }

    #[test]
    fn test_falls_back_to_ansi_codec() {
        // "ж" in windows-1251
        let bytes = [b'a', b'=', 0xE6];
        assert_eq!(decode_text(&bytes, &LoadSettings::default()).unwrap(), "a=ж");

        let settings = LoadSettings::new().ansi_codec(WINDOWS_1252);
        assert_eq!(decode_text(&bytes, &settings).unwrap(), "a=æ");
    }

    #[test]
    fn test_file_round_trip() {
        let d = tempdir().unwrap();
        let mut tree = BlockPar::new();
        tree.param_path_add("ship/name", "Рейнджер").unwrap();

        for encoding in [OutputEncoding::Utf8, OutputEncoding::Utf16Le] {
            let f = d.path().join("out.txt");
            tree.save_to_file(&f, &SaveSettings::new().encoding(encoding))
                .unwrap();
            assert_eq!(BlockPar::load_from_file(&f).unwrap(), tree);
        }
    }

    #[test]
    fn test_missing_file_reports_path() {
        let d = tempdir().unwrap();
        let f = d.path().join("nope.txt");
        match BlockPar::load_from_file(&f) {
            Err(BlockParError::Io { path, .. }) => assert_eq!(path, f),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_reader_and_writer() {
        let tree = BlockPar::load_from_reader("a = 1\nb { c = 2 }".as_bytes(), &LoadSettings::default())
            .unwrap();

        let mut out = Vec::new();
        tree.save_to_writer(&mut out, &SaveSettings::new().ascii(true))
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a = 1\nb {\n    c = 2\n}\n");
    }
}

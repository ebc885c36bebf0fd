//! Parser for the block text format.
//!
//! ```text
//! document := entries EOF
//! entries  := ( whitespace | ';' | comment | entry )*
//! comment  := "//" up to end of line
//! entry    := name ( '=' value | '{' entries '}' )
//! name     := quoted | bare-name
//! value    := quoted | bare-value
//! ```
//!
//! Open blocks are kept on an explicit stack, so nesting costs heap and not call
//! frames. `LoadSettings::max_depth` bounds it when set.
//!
//! Comment lines are collected and attached to the entry that follows them.
//! Comments with no entry after them in the same block are dropped.

use crate::block::BlockPar;
use crate::err::{BlockParError, ParseErrorReason, Result};
use crate::node::Node;
use crate::settings::LoadSettings;
use crate::text::escape::{is_name_terminator, is_value_terminator};
use crate::value::ParamValue;

use log::trace;

/// A cursor over the source text. `pos` is a byte offset on a char boundary.
pub(crate) struct TextReader<'a> {
    src: &'a str,
    pos: usize,
    max_depth: Option<usize>,
}

/// A block whose `}` has not been seen yet, with the entries of its parent read so far.
struct OpenBlock {
    name: String,
    comment: Option<String>,
    offset: usize,
    parent_nodes: Vec<Node>,
}

impl<'a> TextReader<'a> {
    pub(crate) fn new(src: &'a str, settings: &LoadSettings) -> Self {
        let pos = if src.starts_with('\u{FEFF}') {
            '\u{FEFF}'.len_utf8()
        } else {
            0
        };

        TextReader {
            src,
            pos,
            max_depth: settings.get_max_depth(),
        }
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    #[inline]
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn error_at(&self, offset: usize, reason: ParseErrorReason) -> BlockParError {
        let before = &self.src[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;

        BlockParError::Parse {
            offset,
            line,
            column,
            reason,
        }
    }

    fn error_here(&self, reason: ParseErrorReason) -> BlockParError {
        self.error_at(self.pos, reason)
    }

    /// Skips whitespace and `;` separators. Returns the text of the `//` comments
    /// passed on the way, one line each.
    fn skip_trivia(&mut self) -> Vec<&'a str> {
        let mut comments = Vec::new();
        loop {
            let rest = self.rest();
            if let Some(comment) = rest.strip_prefix("//") {
                let line_len = comment.find('\n').unwrap_or(comment.len());
                comments.push(comment[..line_len].trim_end_matches('\r'));
                self.pos += 2 + line_len;
                continue;
            }

            match self.peek() {
                Some(c) if c.is_whitespace() || c == ';' => {
                    self.bump();
                }
                _ => return comments,
            }
        }
    }

    /// Skips whitespace that does not end the line.
    fn skip_inline_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() && c != '\n' && c != '\r' {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    pub(crate) fn parse_document(mut self) -> Result<BlockPar> {
        let mut open: Vec<OpenBlock> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();

        loop {
            let comments = self.skip_trivia();
            let comment = (!comments.is_empty()).then(|| comments.join("\n"));

            match self.peek() {
                None => {
                    return match open.pop() {
                        Some(block) => Err(self.error_at(
                            block.offset,
                            ParseErrorReason::UnclosedBlock(block.name),
                        )),
                        None => Ok(BlockPar::from_nodes(nodes)),
                    };
                }
                Some('}') => {
                    let Some(block) = open.pop() else {
                        return Err(self.error_here(ParseErrorReason::UnmatchedCloseBrace));
                    };
                    self.bump();

                    let children = std::mem::replace(&mut nodes, block.parent_nodes);
                    nodes.push(Node::Block {
                        name: block.name,
                        child: BlockPar::from_nodes(children),
                        comment: block.comment,
                    });
                }
                Some(_) => {
                    let start = self.pos;
                    let name = self.parse_name()?;
                    self.skip_whitespace();

                    match self.peek() {
                        Some('=') => {
                            self.bump();
                            self.skip_inline_whitespace();
                            let value = self.parse_value()?;
                            trace!("Offset {}: parameter `{}`", start, name);

                            nodes.push(Node::Param {
                                name,
                                value,
                                comment,
                            });
                        }
                        Some('{') => {
                            if let Some(max) = self.max_depth.filter(|&max| open.len() >= max) {
                                return Err(self.error_here(ParseErrorReason::TooDeep(max)));
                            }
                            self.bump();
                            trace!("Offset {}: block `{}` at depth {}", start, name, open.len() + 1);

                            open.push(OpenBlock {
                                name,
                                comment,
                                offset: start,
                                parent_nodes: std::mem::take(&mut nodes),
                            });
                        }
                        _ => return Err(self.error_here(ParseErrorReason::MissingEquals(name))),
                    }
                }
            }
        }
    }

    fn parse_name(&mut self) -> Result<String> {
        if self.peek() == Some('"') {
            return self.parse_quoted();
        }

        let rest = self.rest();
        let len = rest.find(is_name_terminator).unwrap_or(rest.len());
        if len == 0 {
            let found = self.peek().unwrap_or_default();
            return Err(self.error_here(ParseErrorReason::ExpectedName(found)));
        }

        self.pos += len;
        Ok(rest[..len].to_owned())
    }

    fn parse_value(&mut self) -> Result<ParamValue> {
        if self.peek() == Some('"') {
            let value = self.parse_quoted()?;
            self.skip_inline_whitespace();
            return Ok(ParamValue::from(value));
        }

        let rest = self.rest();
        let len = rest.find(is_value_terminator).unwrap_or(rest.len());
        self.pos += len;

        Ok(ParamValue::from(rest[..len].trim_end()))
    }

    fn parse_quoted(&mut self) -> Result<String> {
        let open_quote = self.pos;
        self.bump();

        let mut out = String::new();
        loop {
            // copy the run up to the next quote or backslash in one go
            let rest = self.rest();
            let run = rest.find(['"', '\\']).unwrap_or(rest.len());
            out.push_str(&rest[..run]);
            self.pos += run;

            match self.bump() {
                None => {
                    return Err(self.error_at(open_quote, ParseErrorReason::UnterminatedQuote));
                }
                Some('"') => return Ok(out),
                Some(_) => out.push(self.parse_escape(open_quote)?),
            }
        }
    }

    /// Reads the escape after a backslash.
    fn parse_escape(&mut self, open_quote: usize) -> Result<char> {
        let escape_start = self.pos;

        match self.bump() {
            None => Err(self.error_at(open_quote, ParseErrorReason::UnterminatedQuote)),
            Some('"') => Ok('"'),
            Some('\\') => Ok('\\'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('u') => {
                let rest = self.rest();
                let hex = rest
                    .strip_prefix('{')
                    .and_then(|r| r.find('}').map(|end| &r[..end]))
                    .filter(|hex| (1..=6).contains(&hex.len()))
                    .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()));
                let code = hex
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .and_then(char::from_u32);

                match (hex, code) {
                    (Some(hex), Some(c)) => {
                        // `{` + hex digits + `}`
                        self.pos += hex.len() + 2;
                        Ok(c)
                    }
                    _ => Err(self.error_at(
                        escape_start,
                        ParseErrorReason::InvalidUnicodeEscape,
                    )),
                }
            }
            Some(other) => Err(self.error_at(escape_start, ParseErrorReason::InvalidEscape(other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Result<BlockPar> {
        TextReader::new(text, &LoadSettings::default()).parse_document()
    }

    fn parse_error(text: &str) -> (ParseErrorReason, usize, usize, usize) {
        match parse(text) {
            Err(BlockParError::Parse {
                reason,
                offset,
                line,
                column,
            }) => (reason, offset, line, column),
            other => panic!("expected a parse error for {:?}, got {:?}", text, other),
        }
    }

    #[test]
    fn test_parses_params_and_blocks_in_order() {
        let t = parse(
            "name = Ranger\n\
             engine {\n    speed = 300\n}\n\
             cargo = food\n",
        )
        .unwrap();

        assert_eq!(t.all_count(), 3);
        assert_eq!(t.all_type(1).unwrap(), NodeKind::Block);
        assert_eq!(t.param_get("name", 0).unwrap(), "Ranger");
        assert_eq!(
            t.block_get("engine").unwrap().param_get("speed", 0).unwrap(),
            "300"
        );
        assert_eq!(t.all_name(2).unwrap(), "cargo");
        t.assert_invariants();
    }

    #[test]
    fn test_whitespace_is_insignificant() {
        let compact = parse("a=1;b{c=2}d=\"x y\"").unwrap();
        let spread = parse("  a   =   1\n\n b\n {\n\tc = 2\n }\n d = \"x y\"  \n").unwrap();
        assert_eq!(compact, spread);
    }

    #[test]
    fn test_bare_values_are_trimmed_and_may_contain_spaces() {
        let t = parse("title = Space Rangers 2   \nempty =\nlist = 1,2=3\n").unwrap();
        assert_eq!(t.param_get("title", 0).unwrap(), "Space Rangers 2");
        assert_eq!(t.param_get("empty", 0).unwrap(), "");
        assert_eq!(t.param_get("list", 0).unwrap(), "1,2=3");
    }

    #[test]
    fn test_quoted_names_and_escapes() {
        let t = parse(r#""two words" = "a \"q\" \\ \n\t\u{44E}""#).unwrap();
        assert_eq!(t.param_get("two words", 0).unwrap(), "a \"q\" \\ \n\tю");
    }

    #[test]
    fn test_comments_attach_to_next_entry() {
        let t = parse("// header\na = 1 // not a comment\n// b = 2\n//\r\nc { // opens\n}\n").unwrap();
        assert_eq!(t.param_get("a", 0).unwrap(), "1 // not a comment");
        assert_eq!(t.param_count_of("b"), 0);
        assert_eq!(t.block_count(), 1);

        assert_eq!(t.all_comment(0).unwrap(), Some(" header"));
        assert_eq!(t.all_comment(1).unwrap(), Some(" b = 2\n"));
        // nothing follows `// opens` inside `c`
        assert!(t.block_get("c").unwrap().is_empty());
    }

    #[test]
    fn test_leading_bom_is_ignored() {
        let t = parse("\u{FEFF}a = 1").unwrap();
        assert_eq!(t.param_get("a", 0).unwrap(), "1");
    }

    #[test]
    fn test_unterminated_quote() {
        let (reason, offset, line, column) = parse_error("a = 1\nb = \"never closed");
        assert_eq!(reason, ParseErrorReason::UnterminatedQuote);
        assert_eq!(offset, 10);
        assert_eq!((line, column), (2, 5));
    }

    #[test]
    fn test_unmatched_braces() {
        let (reason, offset, ..) = parse_error("a = 1\n}");
        assert_eq!(reason, ParseErrorReason::UnmatchedCloseBrace);
        assert_eq!(offset, 6);

        let (reason, offset, ..) = parse_error("outer {\n inner {\n }\n");
        assert_eq!(reason, ParseErrorReason::UnclosedBlock("outer".to_owned()));
        assert_eq!(offset, 0);
    }

    #[test]
    fn test_missing_equals() {
        let (reason, ..) = parse_error("lonely\n");
        assert_eq!(reason, ParseErrorReason::MissingEquals("lonely".to_owned()));

        let (reason, ..) = parse_error("= 5");
        assert_eq!(reason, ParseErrorReason::ExpectedName('='));
    }

    #[test]
    fn test_bad_escapes() {
        let (reason, ..) = parse_error(r#"a = "\q""#);
        assert_eq!(reason, ParseErrorReason::InvalidEscape('q'));

        let (reason, ..) = parse_error(r#"a = "\u{110000}""#);
        assert_eq!(reason, ParseErrorReason::InvalidUnicodeEscape);

        let (reason, ..) = parse_error(r#"a = "\u0041""#);
        assert_eq!(reason, ParseErrorReason::InvalidUnicodeEscape);

        let (reason, ..) = parse_error(r#"a = "\u{+41}""#);
        assert_eq!(reason, ParseErrorReason::InvalidUnicodeEscape);
    }

    #[test]
    fn test_depth_limit() {
        let deep = "a{".repeat(5) + &"}".repeat(5);
        let settings = LoadSettings::new().max_depth(4);
        let err = TextReader::new(&deep, &settings).parse_document().unwrap_err();
        assert!(matches!(
            err,
            BlockParError::Parse {
                reason: ParseErrorReason::TooDeep(4),
                ..
            }
        ));

        let settings = LoadSettings::new().max_depth(5);
        assert!(TextReader::new(&deep, &settings).parse_document().is_ok());
    }

    #[test]
    fn test_deep_nesting_is_unbounded_by_default() {
        let depth = 50_000;
        let deep = "a{".repeat(depth) + &"}".repeat(depth);

        let mut t = parse(&deep).unwrap();
        let mut levels = 0;
        while t.block_count() > 0 {
            // unlink level by level so dropping does not recurse deeply
            t = std::mem::take(t.block_at_mut(0).unwrap());
            levels += 1;
        }
        assert_eq!(levels, depth);
    }
}

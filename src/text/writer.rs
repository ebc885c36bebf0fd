use crate::block::BlockPar;
use crate::node::Node;
use crate::settings::SaveSettings;
use crate::text::escape::{is_bare_name, is_bare_value, push_comment_line, push_quoted};

/// Serializes blocks into the text format, one entry per line.
pub(crate) struct TextWriter<'s> {
    settings: &'s SaveSettings,
    out: String,
}

impl<'s> TextWriter<'s> {
    pub(crate) fn new(settings: &'s SaveSettings) -> Self {
        TextWriter {
            settings,
            out: String::new(),
        }
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }

    fn indent(&mut self, level: usize) {
        for _ in 0..level {
            self.out.push_str(self.settings.get_indent());
        }
    }

    fn name(&mut self, name: &str) {
        if is_bare_name(name, self.settings.is_ascii()) {
            self.out.push_str(name);
        } else {
            push_quoted(name, self.settings.is_ascii(), &mut self.out);
        }
    }

    fn value(&mut self, value: &str) {
        if is_bare_value(value, self.settings.is_ascii()) {
            self.out.push_str(value);
        } else {
            push_quoted(value, self.settings.is_ascii(), &mut self.out);
        }
    }

    /// One `//` line per line of `comment`, at the indentation of the entry it precedes.
    fn comment(&mut self, comment: Option<&str>, level: usize) {
        let Some(comment) = comment else {
            return;
        };
        for line in comment.split('\n') {
            self.indent(level);
            self.out.push_str("//");
            push_comment_line(line, self.settings.is_ascii(), &mut self.out);
            self.out.push('\n');
        }
    }

    /// Writes every entry of `block` in raw order at nesting `level`.
    pub(crate) fn write_block(&mut self, block: &BlockPar, level: usize) {
        for node in block {
            self.comment(node.comment(), level);
            match node {
                Node::Param { name, value, .. } => {
                    self.indent(level);
                    self.name(name);
                    self.out.push_str(" = ");
                    self.value(value);
                    self.out.push('\n');
                }
                Node::Block { name, child, .. } => {
                    self.indent(level);
                    self.name(name);
                    self.out.push_str(" {\n");
                    self.write_block(child, level + 1);
                    self.indent(level);
                    self.out.push_str("}\n");
                }
                Node::Empty => {}
            }
        }
    }
}

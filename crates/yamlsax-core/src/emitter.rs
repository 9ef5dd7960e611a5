use crate::Result;
use crate::sax::{Attribute, ContentHandler};

/// Turns open/close/text intents into [`ContentHandler`] calls.
///
/// Attaches at most one attribute per element (the anchor attribute on a
/// declaration, the alias attribute on a reference) and tracks nesting depth
/// for the optional indentation text nodes.
pub(crate) struct SaxEmitter<'a> {
    sink: &'a mut dyn ContentHandler,
    anchor_attribute: &'a str,
    alias_attribute: &'a str,
    indent: bool,
    depth: usize,
    /// `"\n"` followed by as many tabs as the deepest level seen so far.
    indent_buf: String,
}

impl<'a> SaxEmitter<'a> {
    pub(crate) fn new(
        sink: &'a mut dyn ContentHandler,
        anchor_attribute: &'a str,
        alias_attribute: &'a str,
        indent: bool,
    ) -> Self {
        Self {
            sink,
            anchor_attribute,
            alias_attribute,
            indent,
            depth: 0,
            indent_buf: String::from("\n"),
        }
    }

    pub(crate) fn start_element_structure(
        &mut self,
        name: &str,
        anchor: Option<&str>,
        is_declaration: bool,
    ) -> Result<()> {
        self.write_indent()?;
        self.start_element(name, anchor, is_declaration)?;
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn end_element_structure(&mut self, name: &str) -> Result<()> {
        self.depth -= 1;
        self.write_indent()?;
        self.sink.end_element(name)?;
        Ok(())
    }

    /// A leaf element in one call: open, text when non-empty, close.
    pub(crate) fn add_content_element(
        &mut self,
        name: &str,
        value: Option<&str>,
        anchor: Option<&str>,
        is_declaration: bool,
    ) -> Result<()> {
        self.write_indent()?;
        self.start_element(name, anchor, is_declaration)?;
        if let Some(text) = value {
            if !text.is_empty() {
                self.sink.characters(text)?;
            }
        }
        self.sink.end_element(name)?;
        Ok(())
    }

    fn start_element(&mut self, name: &str, anchor: Option<&str>, is_declaration: bool) -> Result<()> {
        match anchor {
            Some(anchor) => {
                let attribute = Attribute {
                    name: if is_declaration {
                        self.anchor_attribute
                    } else {
                        self.alias_attribute
                    },
                    value: anchor,
                };
                self.sink.start_element(name, &[attribute])?;
            }
            None => self.sink.start_element(name, &[])?,
        }
        Ok(())
    }

    fn write_indent(&mut self) -> Result<()> {
        if self.indent {
            while self.indent_buf.len() < self.depth + 1 {
                self.indent_buf.push('\t');
            }
            self.sink.characters(&self.indent_buf[..=self.depth])?;
        }
        Ok(())
    }
}

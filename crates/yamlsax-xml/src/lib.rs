//! XML text serialization for `yamlsax` SAX events.
//!
//! [`XmlWriter`] implements [`ContentHandler`] over any [`Write`] and emits
//! exactly what it is told: no declaration unless asked for, no whitespace of
//! its own (indentation, when enabled upstream, arrives as character events).

use std::io::{self, Write};

use anyhow::Context;
use yamlsax_core::{Attribute, ContentHandler, ReaderOptions, YamlSaxReader};

/// Streams SAX events as XML text into a [`Write`].
pub struct XmlWriter<W: Write> {
    out: W,
    declaration: bool,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            declaration: false,
        }
    }

    /// Emit an `<?xml ... ?>` declaration on `start_document`.
    pub fn with_declaration(mut self) -> Self {
        self.declaration = true;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ContentHandler for XmlWriter<W> {
    fn start_document(&mut self) -> anyhow::Result<()> {
        if self.declaration {
            self.out
                .write_all(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>")
                .context("write XML declaration")?;
        }
        Ok(())
    }

    fn end_document(&mut self) -> anyhow::Result<()> {
        self.out.flush().context("flush XML output")
    }

    fn start_element(&mut self, name: &str, attributes: &[Attribute<'_>]) -> anyhow::Result<()> {
        write_start_tag(&mut self.out, name, attributes).context("write XML output")
    }

    fn end_element(&mut self, name: &str) -> anyhow::Result<()> {
        write_end_tag(&mut self.out, name).context("write XML output")
    }

    fn characters(&mut self, text: &str) -> anyhow::Result<()> {
        write_escaped(&mut self.out, text, false).context("write XML output")
    }
}

/// Transcode YAML text straight to an XML string.
///
/// # Errors
///
/// Everything [`YamlSaxReader::parse`] can raise.
pub fn yaml_to_xml(source: &str, options: ReaderOptions) -> yamlsax_core::Result<String> {
    let reader = YamlSaxReader::new(options);
    let mut writer = XmlWriter::new(Vec::new());
    reader.parse(source, &mut writer)?;
    String::from_utf8(writer.into_inner())
        .map_err(|error| yamlsax_core::Error::Sink(error.into()))
}

fn write_start_tag<W: Write>(out: &mut W, name: &str, attributes: &[Attribute<'_>]) -> io::Result<()> {
    out.write_all(b"<")?;
    out.write_all(name.as_bytes())?;
    for attribute in attributes {
        out.write_all(b" ")?;
        out.write_all(attribute.name.as_bytes())?;
        out.write_all(b"=\"")?;
        write_escaped(out, attribute.value, true)?;
        out.write_all(b"\"")?;
    }
    out.write_all(b">")
}

fn write_end_tag<W: Write>(out: &mut W, name: &str) -> io::Result<()> {
    out.write_all(b"</")?;
    out.write_all(name.as_bytes())?;
    out.write_all(b">")
}

/// Escape `&`, `<`, `>` (and `"` inside attribute values), copying clean
/// stretches through unmodified.
fn write_escaped<W: Write>(out: &mut W, text: &str, in_attribute: bool) -> io::Result<()> {
    let mut clean_from = 0;
    for (index, byte) in text.bytes().enumerate() {
        let escape: &[u8] = match byte {
            b'&' => b"&amp;",
            b'<' => b"&lt;",
            b'>' => b"&gt;",
            b'"' if in_attribute => b"&quot;",
            _ => continue,
        };
        out.write_all(text[clean_from..index].as_bytes())?;
        out.write_all(escape)?;
        clean_from = index + 1;
    }
    out.write_all(text[clean_from..].as_bytes())
}

use anyhow::Result;

/// A single element attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

/// The downstream markup-event protocol.
///
/// For a well-formed run the calls arrive strictly nested and balanced:
/// `start_document`, one `start_element`/`end_element` pair per element with
/// `characters` in between, `end_document`. Any error a handler returns
/// aborts the run and propagates to the caller unchanged; nothing is retried
/// and events already delivered are not taken back.
pub trait ContentHandler {
    /// First event of every run.
    fn start_document(&mut self) -> Result<()>;

    /// Last event of a successful run.
    fn end_document(&mut self) -> Result<()>;

    fn start_element(&mut self, name: &str, attributes: &[Attribute<'_>]) -> Result<()>;

    fn end_element(&mut self, name: &str) -> Result<()>;

    /// Character data inside the current element. Indentation whitespace,
    /// when enabled, arrives through this call as well.
    fn characters(&mut self, text: &str) -> Result<()>;
}

//! Streaming YAML → SAX transcoding.
//!
//! Walks a YAML parse-event stream (mappings, sequences, scalars, anchors,
//! aliases) and pushes SAX-style markup events to a [`ContentHandler`]
//! without materializing the document. The only buffering is per anchored
//! subtree, and only under the resolve strategies.

mod alias;
mod driver;
mod emitter;
mod error;
mod event;
mod formatter;
mod sax;

use indexmap::IndexMap;
use saphyr_parser::Parser;

use crate::alias::{EventHandler, ReferHandler, ResolveHandler};
use crate::driver::{Driver, NodeKind};
use crate::emitter::SaxEmitter;
use crate::event::NameResolver;

pub use crate::alias::AliasStrategy;
pub use crate::error::{Error, Result};
pub use crate::event::YamlEvent;
pub use crate::formatter::NameFormatter;
pub use crate::sax::{Attribute, ContentHandler};

/// Options for a transcoding run, fixed at reader construction.
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Element name wrapping the whole stream.
    pub root_name: String,
    /// Element name wrapping each document in the stream.
    pub document_name: String,
    /// Element name for sequence elements.
    pub array_element_name: String,
    /// Attribute marking an anchor declaration (refer strategies).
    pub anchor_attribute_name: String,
    /// Attribute marking an alias reference (refer strategies).
    pub alias_attribute_name: String,
    /// Emit newline-plus-tabs indentation text nodes.
    pub indent: bool,
    pub alias_strategy: AliasStrategy,
    /// Exact-match key renames, applied before any other name shaping.
    pub key_map: IndexMap<String, String>,
    /// Replacement for spaces in mapping keys; `None` leaves them alone.
    pub key_whitespace_replacement: Option<String>,
    /// Prefix for keys starting with a digit; `None` leaves them alone.
    pub key_prefix_on_numeric: Option<String>,
    /// Replacement for characters illegal in element names; `None` skips the
    /// scan entirely.
    pub illegal_element_name_char_replacement: Option<String>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            root_name: "yaml".to_string(),
            document_name: "document".to_string(),
            array_element_name: "element".to_string(),
            anchor_attribute_name: "id".to_string(),
            alias_attribute_name: "ref".to_string(),
            indent: false,
            alias_strategy: AliasStrategy::Refer,
            key_map: IndexMap::new(),
            key_whitespace_replacement: None,
            key_prefix_on_numeric: None,
            illegal_element_name_char_replacement: None,
        }
    }
}

/// Translates a YAML event stream into SAX events against a
/// [`ContentHandler`].
///
/// A reader is reusable across runs, but one run is synchronous and atomic
/// from the caller's view: it either completes or returns the first error,
/// and all per-run state is discarded either way.
#[derive(Debug)]
pub struct YamlSaxReader {
    options: ReaderOptions,
    formatter: NameFormatter,
}

impl YamlSaxReader {
    pub fn new(options: ReaderOptions) -> Self {
        let formatter = NameFormatter::new(
            options.key_map.clone(),
            options.key_whitespace_replacement.clone(),
            options.key_prefix_on_numeric.clone(),
            options.illegal_element_name_char_replacement.clone(),
        );
        Self { options, formatter }
    }

    /// Parse YAML text and push the equivalent SAX events to `sink`.
    ///
    /// # Errors
    ///
    /// Scanner errors, alias validation failures under the resolve
    /// strategies, and any error the sink raises.
    pub fn parse(&self, source: &str, sink: &mut impl ContentHandler) -> Result<()> {
        let resolver = NameResolver::new(source);
        let events = Parser::new_from_str(source)
            .map(move |step| match step {
                Ok((event, span)) => Ok(resolver.convert(&event, span)),
                Err(error) => Err(Error::Parse(error.to_string())),
            })
            .filter_map(|step| step.transpose());
        self.run(events, sink)
    }

    /// Transcode an already-produced event sequence.
    ///
    /// Events are consumed one at a time; output is pushed to the sink before
    /// the next event is taken.
    ///
    /// # Errors
    ///
    /// Alias validation failures under the resolve strategies, and any error
    /// the sink raises.
    pub fn parse_events<I>(&self, events: I, sink: &mut impl ContentHandler) -> Result<()>
    where
        I: IntoIterator<Item = YamlEvent>,
    {
        self.run(events.into_iter().map(Ok), sink)
    }

    fn run(
        &self,
        events: impl Iterator<Item = Result<YamlEvent>>,
        sink: &mut dyn ContentHandler,
    ) -> Result<()> {
        let mut driver = Driver::new(
            &self.formatter,
            &self.options.document_name,
            &self.options.array_element_name,
        );
        sink.start_document()?;
        let emitter = SaxEmitter::new(
            &mut *sink,
            &self.options.anchor_attribute_name,
            &self.options.alias_attribute_name,
            self.options.indent,
        );
        let mut handler: Box<dyn EventHandler + '_> = match self.options.alias_strategy {
            AliasStrategy::Refer => Box::new(ReferHandler::new(emitter)),
            AliasStrategy::Resolve => Box::new(ResolveHandler::new(emitter, false)),
            AliasStrategy::ReferResolve => Box::new(ResolveHandler::new(emitter, true)),
        };
        handler.on_structure_start(&mut driver, NodeKind::Mapping, &self.options.root_name, None)?;
        for event in events {
            driver.handle(handler.as_mut(), &event?)?;
        }
        handler.on_structure_end(&mut driver, NodeKind::Mapping, &self.options.root_name)?;
        drop(handler);
        sink.end_document()?;
        Ok(())
    }
}

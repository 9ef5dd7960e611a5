use crate::Result;
use crate::alias::EventHandler;
use crate::event::YamlEvent;
use crate::formatter::NameFormatter;

/// Tag of one open structural frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Mapping,
    Sequence,
}

/// Walks the flat event stream and rebuilds element nesting and naming.
///
/// The state is two parallel stacks plus one flag: the kinds of the open
/// structures, the element names pending for them, and whether the next
/// scalar inside a mapping is a key. Sequence elements never consume a
/// pending name; their element name is always the configured array element
/// name.
///
/// An unbalanced input stream is a producer contract violation and fails on
/// the underlying stack access rather than being diagnosed here.
pub(crate) struct Driver<'a> {
    formatter: &'a NameFormatter,
    document_name: &'a str,
    array_element_name: &'a str,
    kinds: Vec<NodeKind>,
    names: Vec<String>,
    next_is_key: bool,
    render_next_structure: bool,
}

impl<'a> Driver<'a> {
    pub(crate) fn new(
        formatter: &'a NameFormatter,
        document_name: &'a str,
        array_element_name: &'a str,
    ) -> Self {
        Self {
            formatter,
            document_name,
            array_element_name,
            kinds: Vec::new(),
            names: Vec::new(),
            next_is_key: true,
            render_next_structure: false,
        }
    }

    pub(crate) fn handle(&mut self, handler: &mut dyn EventHandler, event: &YamlEvent) -> Result<()> {
        tracing::trace!(?event, "event");
        match event {
            YamlEvent::DocumentStart => {
                self.names.push(self.document_name.to_string());
                self.render_next_structure = true;
                Ok(())
            }
            YamlEvent::Scalar { value, anchor } => self.scalar(handler, value, anchor.as_deref()),
            YamlEvent::MappingStart { anchor } => {
                self.structure_start(handler, NodeKind::Mapping, anchor.as_deref())
            }
            YamlEvent::SequenceStart { anchor } => {
                self.structure_start(handler, NodeKind::Sequence, anchor.as_deref())
            }
            YamlEvent::MappingEnd => self.structure_end(handler, NodeKind::Mapping),
            YamlEvent::SequenceEnd => self.structure_end(handler, NodeKind::Sequence),
            YamlEvent::Alias { anchor } => self.alias(handler, anchor),
        }
    }

    fn scalar(
        &mut self,
        handler: &mut dyn EventHandler,
        value: &str,
        anchor: Option<&str>,
    ) -> Result<()> {
        if self.next_is_key && !self.in_sequence() {
            let name = self.formatter.format(value);
            tracing::trace!(%name, "element name");
            self.names.push(name.clone());
            handler.on_name(value, &name)?;
            self.next_is_key = false;
        } else {
            let name = self.value_name();
            handler.on_value(self, &name, value, anchor)?;
            self.next_is_key = true;
        }
        Ok(())
    }

    fn structure_start(
        &mut self,
        handler: &mut dyn EventHandler,
        kind: NodeKind,
        anchor: Option<&str>,
    ) -> Result<()> {
        if self.render_next_structure {
            let name = if self.in_sequence() {
                self.array_element_name.to_string()
            } else {
                self.names
                    .last()
                    .cloned()
                    .expect("structure start without a pending element name")
            };
            handler.on_structure_start(self, kind, &name, anchor)?;
        }
        self.kinds.push(kind);
        self.render_next_structure = true;
        self.next_is_key = true;
        Ok(())
    }

    fn structure_end(&mut self, handler: &mut dyn EventHandler, kind: NodeKind) -> Result<()> {
        self.kinds
            .pop()
            .expect("structure end without a matching start");
        if self.in_sequence() {
            let name = self.array_element_name;
            handler.on_structure_end(self, kind, name)
        } else if let Some(name) = self.names.pop() {
            handler.on_structure_end(self, kind, &name)
        } else {
            Ok(())
        }
    }

    fn alias(&mut self, handler: &mut dyn EventHandler, anchor: &str) -> Result<()> {
        let name = self.value_name();
        handler.on_alias(self, &name, anchor)?;
        self.next_is_key = true;
        Ok(())
    }

    /// Element name for a value position: the array element name inside a
    /// sequence, otherwise the pending mapping-key name.
    fn value_name(&mut self) -> String {
        if self.in_sequence() {
            self.array_element_name.to_string()
        } else {
            self.names
                .pop()
                .expect("value without a pending element name")
        }
    }

    fn in_sequence(&self) -> bool {
        matches!(self.kinds.last(), Some(NodeKind::Sequence))
    }

    /// Re-arm the state so a captured subtree replays under `name` at the
    /// current position, exactly as the live events would have rendered it.
    pub(crate) fn begin_replay(&mut self, name: &str) {
        if !self.in_sequence() {
            self.names.push(name.to_string());
        }
        self.render_next_structure = true;
    }
}

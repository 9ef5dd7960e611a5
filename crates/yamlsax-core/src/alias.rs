use indexmap::IndexMap;

use crate::Result;
use crate::driver::{Driver, NodeKind};
use crate::emitter::SaxEmitter;
use crate::error::Error;
use crate::event::YamlEvent;

/// How anchors and aliases are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AliasStrategy {
    /// Tag the anchored element with the anchor attribute and emit every
    /// alias as an empty element carrying the alias attribute. No validation:
    /// a dangling reference is the downstream consumer's concern.
    #[default]
    Refer,
    /// Inline a copy of the anchored subtree at every alias site. Requires
    /// anchors to be declared before use and rejects self-referential ones.
    Resolve,
    /// Both: attributes as with `Refer`, inlined copies as with `Resolve`.
    ReferResolve,
}

impl core::str::FromStr for AliasStrategy {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "refer" => Ok(Self::Refer),
            "resolve" => Ok(Self::Resolve),
            "refer-resolve" | "refer_resolve" => Ok(Self::ReferResolve),
            _ => Err(format!(
                "unknown alias strategy '{s}', expected: refer, resolve, refer-resolve"
            )),
        }
    }
}

/// Hooks the driver invokes as it walks the event stream.
///
/// One implementation per alias strategy. The driver itself never touches the
/// emitter; attribute injection and subtree replay stay strategy-local.
pub(crate) trait EventHandler {
    /// A mapping key scalar resolved to `name`. Produces no markup; `raw` is
    /// the key before name shaping.
    fn on_name(&mut self, raw: &str, name: &str) -> Result<()>;

    fn on_value(
        &mut self,
        driver: &mut Driver<'_>,
        name: &str,
        value: &str,
        anchor: Option<&str>,
    ) -> Result<()>;

    fn on_structure_start(
        &mut self,
        driver: &mut Driver<'_>,
        kind: NodeKind,
        name: &str,
        anchor: Option<&str>,
    ) -> Result<()>;

    fn on_structure_end(&mut self, driver: &mut Driver<'_>, kind: NodeKind, name: &str)
    -> Result<()>;

    fn on_alias(&mut self, driver: &mut Driver<'_>, name: &str, anchor: &str) -> Result<()>;
}

/// Attribute-tagging strategy: a stateless pass-through to the emitter.
pub(crate) struct ReferHandler<'a> {
    pub(crate) sax: SaxEmitter<'a>,
}

impl<'a> ReferHandler<'a> {
    pub(crate) fn new(sax: SaxEmitter<'a>) -> Self {
        Self { sax }
    }
}

impl EventHandler for ReferHandler<'_> {
    fn on_name(&mut self, _raw: &str, _name: &str) -> Result<()> {
        Ok(())
    }

    fn on_value(
        &mut self,
        _driver: &mut Driver<'_>,
        name: &str,
        value: &str,
        anchor: Option<&str>,
    ) -> Result<()> {
        self.sax.add_content_element(name, Some(value), anchor, true)
    }

    fn on_structure_start(
        &mut self,
        _driver: &mut Driver<'_>,
        _kind: NodeKind,
        name: &str,
        anchor: Option<&str>,
    ) -> Result<()> {
        self.sax.start_element_structure(name, anchor, true)
    }

    fn on_structure_end(
        &mut self,
        _driver: &mut Driver<'_>,
        _kind: NodeKind,
        name: &str,
    ) -> Result<()> {
        self.sax.end_element_structure(name)
    }

    fn on_alias(&mut self, _driver: &mut Driver<'_>, name: &str, anchor: &str) -> Result<()> {
        self.sax.add_content_element(name, None, Some(anchor), false)
    }
}

/// An in-progress capture of one anchored subtree.
struct Recording {
    anchor: String,
    events: Vec<YamlEvent>,
    /// Structures opened and not yet closed since the capture began; the
    /// capture completes when this returns to zero.
    open_depth: usize,
}

/// Inline-copy strategy: anchored subtrees are captured event-for-event and
/// replayed through the driver at every alias site.
///
/// With `refer` set (the combined strategy) declarations additionally carry
/// the anchor attribute and the top element of every replayed copy carries
/// the alias attribute.
pub(crate) struct ResolveHandler<'a> {
    pub(crate) sax: SaxEmitter<'a>,
    refer: bool,
    anchors: IndexMap<String, Vec<YamlEvent>>,
    recordings: Vec<Recording>,
    /// Anchors whose captured subtree is currently being replayed, innermost
    /// last. Together with `recordings` this is the set of anchors an alias
    /// must not resolve to.
    replay_stack: Vec<String>,
    /// Alias attribute to attach to the next emitted element: set when a
    /// replay starts, consumed by the copy's top element.
    pending_alias: Option<String>,
}

impl<'a> ResolveHandler<'a> {
    pub(crate) fn new(sax: SaxEmitter<'a>, refer: bool) -> Self {
        Self {
            sax,
            refer,
            anchors: IndexMap::new(),
            recordings: Vec::new(),
            replay_stack: Vec::new(),
            pending_alias: None,
        }
    }

    fn replaying(&self) -> bool {
        !self.replay_stack.is_empty()
    }

    /// Append a live input event to every in-progress capture and close the
    /// captures whose subtree just ended. Replayed events are never captured:
    /// the alias event that triggered them already was.
    fn record(&mut self, event: &YamlEvent) {
        if self.recordings.is_empty() {
            return;
        }
        for recording in &mut self.recordings {
            recording.events.push(event.clone());
            match event {
                YamlEvent::MappingStart { .. } | YamlEvent::SequenceStart { .. } => {
                    recording.open_depth += 1;
                }
                YamlEvent::MappingEnd | YamlEvent::SequenceEnd => {
                    recording.open_depth -= 1;
                }
                _ => {}
            }
        }
        let mut index = 0;
        while index < self.recordings.len() {
            if self.recordings[index].open_depth == 0 {
                let done = self.recordings.remove(index);
                tracing::trace!(anchor = %done.anchor, events = done.events.len(), "anchor captured");
                self.anchors.insert(done.anchor, done.events);
            } else {
                index += 1;
            }
        }
    }

    /// Attribute for the element about to be emitted: the alias attribute at
    /// the top of a replayed copy, the anchor attribute on declarations under
    /// the combined strategy, nothing otherwise.
    fn attribute_for(&mut self, anchor: Option<&str>) -> (Option<String>, bool) {
        if let Some(alias) = self.pending_alias.take() {
            (Some(alias), false)
        } else if self.refer {
            (anchor.map(str::to_string), true)
        } else {
            (None, true)
        }
    }
}

impl EventHandler for ResolveHandler<'_> {
    fn on_name(&mut self, raw: &str, _name: &str) -> Result<()> {
        if !self.replaying() {
            self.record(&YamlEvent::Scalar {
                value: raw.to_string(),
                anchor: None,
            });
        }
        Ok(())
    }

    fn on_value(
        &mut self,
        _driver: &mut Driver<'_>,
        name: &str,
        value: &str,
        anchor: Option<&str>,
    ) -> Result<()> {
        if !self.replaying() && (anchor.is_some() || !self.recordings.is_empty()) {
            let event = YamlEvent::Scalar {
                value: value.to_string(),
                anchor: anchor.map(str::to_string),
            };
            self.record(&event);
            if let Some(anchor_name) = anchor {
                self.anchors.insert(anchor_name.to_string(), vec![event]);
            }
        }
        let (attribute, is_declaration) = self.attribute_for(anchor);
        self.sax
            .add_content_element(name, Some(value), attribute.as_deref(), is_declaration)
    }

    fn on_structure_start(
        &mut self,
        _driver: &mut Driver<'_>,
        kind: NodeKind,
        name: &str,
        anchor: Option<&str>,
    ) -> Result<()> {
        if !self.replaying() && (anchor.is_some() || !self.recordings.is_empty()) {
            let event = match kind {
                NodeKind::Mapping => YamlEvent::MappingStart {
                    anchor: anchor.map(str::to_string),
                },
                NodeKind::Sequence => YamlEvent::SequenceStart {
                    anchor: anchor.map(str::to_string),
                },
            };
            self.record(&event);
            if let Some(anchor_name) = anchor {
                self.recordings.push(Recording {
                    anchor: anchor_name.to_string(),
                    events: vec![event],
                    open_depth: 1,
                });
            }
        }
        let (attribute, is_declaration) = self.attribute_for(anchor);
        self.sax
            .start_element_structure(name, attribute.as_deref(), is_declaration)
    }

    fn on_structure_end(
        &mut self,
        _driver: &mut Driver<'_>,
        kind: NodeKind,
        name: &str,
    ) -> Result<()> {
        if !self.replaying() {
            let event = match kind {
                NodeKind::Mapping => YamlEvent::MappingEnd,
                NodeKind::Sequence => YamlEvent::SequenceEnd,
            };
            self.record(&event);
        }
        self.sax.end_element_structure(name)
    }

    fn on_alias(&mut self, driver: &mut Driver<'_>, name: &str, anchor: &str) -> Result<()> {
        if !self.replaying() {
            self.record(&YamlEvent::Alias {
                anchor: anchor.to_string(),
            });
        }
        if self.replay_stack.iter().any(|active| active == anchor)
            || self.recordings.iter().any(|r| r.anchor == anchor)
        {
            return Err(Error::CyclicAlias {
                anchor: anchor.to_string(),
                element: name.to_string(),
            });
        }
        let Some(events) = self.anchors.get(anchor) else {
            return Err(Error::UnresolvedAlias {
                anchor: anchor.to_string(),
                element: name.to_string(),
            });
        };
        let events = events.clone();
        tracing::trace!(anchor, element = name, events = events.len(), "inlining anchored subtree");
        if self.refer {
            self.pending_alias = Some(anchor.to_string());
        }
        driver.begin_replay(name);
        self.replay_stack.push(anchor.to_string());
        let mut outcome = Ok(());
        for event in &events {
            outcome = driver.handle(&mut *self, event);
            if outcome.is_err() {
                break;
            }
        }
        self.replay_stack.pop();
        outcome
    }
}

use saphyr_parser::{Event, Span};

/// One event of the hierarchical document stream the driver consumes.
///
/// Anchors are carried by name. A name is bound at most once per run
/// (producer contract) and referenced by [`YamlEvent::Alias`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YamlEvent {
    /// Start of one document in a (possibly multi-document) stream.
    DocumentStart,
    MappingStart { anchor: Option<String> },
    MappingEnd,
    SequenceStart { anchor: Option<String> },
    SequenceEnd,
    Scalar { value: String, anchor: Option<String> },
    Alias { anchor: String },
}

/// Recovers anchor and alias names for saphyr events.
///
/// saphyr only hands out numeric anchor ids, so the names are read back from
/// the source text around each event's span: the `&name` preceding an
/// anchored node, the `*name` at an alias site.
pub(crate) struct NameResolver<'a> {
    source: &'a str,
    /// Mapping from char index (saphyr markers) to byte index for slicing.
    char_to_byte: Vec<usize>,
}

impl<'a> NameResolver<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        let mut char_to_byte: Vec<usize> = source.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(source.len());
        Self {
            source,
            char_to_byte,
        }
    }

    fn to_byte(&self, char_idx: usize) -> usize {
        self.char_to_byte
            .get(char_idx)
            .copied()
            .unwrap_or(self.source.len())
    }

    /// Convert one parser event. Events outside the transcoder's protocol
    /// (stream and document ends) are dropped.
    pub(crate) fn convert(&self, event: &Event<'_>, span: Span) -> Option<YamlEvent> {
        match event {
            Event::DocumentStart(_) => Some(YamlEvent::DocumentStart),
            Event::MappingStart(aid, _) => Some(YamlEvent::MappingStart {
                anchor: self.anchor_name(*aid, span),
            }),
            Event::MappingEnd => Some(YamlEvent::MappingEnd),
            Event::SequenceStart(aid, _) => Some(YamlEvent::SequenceStart {
                anchor: self.anchor_name(*aid, span),
            }),
            Event::SequenceEnd => Some(YamlEvent::SequenceEnd),
            Event::Scalar(value, _, aid, _) => Some(YamlEvent::Scalar {
                value: value.to_string(),
                anchor: self.anchor_name(*aid, span),
            }),
            Event::Alias(_) => Some(YamlEvent::Alias {
                anchor: self.alias_name(span),
            }),
            _ => None,
        }
    }

    /// Find the `&name` written closest before an anchored node.
    fn anchor_name(&self, anchor_id: usize, span: Span) -> Option<String> {
        if anchor_id == 0 {
            return None;
        }
        let start = self.to_byte(span.start.index());
        let mut search_start = start.saturating_sub(200);
        while !self.source.is_char_boundary(search_start) {
            search_start += 1;
        }
        let region = &self.source[search_start..start];
        let amp_pos = region.rfind('&')?;
        let name: String = region[amp_pos + 1..]
            .chars()
            .take_while(|c| is_anchor_char(*c))
            .collect();
        if name.is_empty() { None } else { Some(name) }
    }

    fn alias_name(&self, span: Span) -> String {
        let start = self.to_byte(span.start.index());
        let end = self.to_byte(span.end.index());
        let region = &self.source[start..end];

        if let Some(rest) = region.strip_prefix('*') {
            rest.chars().take_while(|c| is_anchor_char(*c)).collect()
        } else if let Some(star_pos) = region.find('*') {
            region[star_pos + 1..]
                .chars()
                .take_while(|c| is_anchor_char(*c))
                .collect()
        } else {
            String::from("unknown")
        }
    }
}

/// Check if a character is valid in a YAML anchor/alias name.
/// Any character except flow indicators ([]{},) and whitespace.
fn is_anchor_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '[' | ']' | '{' | '}' | ',')
}

#[cfg(test)]
mod tests {
    use saphyr_parser::Parser;

    use super::*;

    fn events_of(source: &str) -> Vec<YamlEvent> {
        let resolver = NameResolver::new(source);
        Parser::new_from_str(source)
            .map(|step| step.expect("scan"))
            .filter_map(|(event, span)| resolver.convert(&event, span))
            .collect()
    }

    #[test]
    fn plain_mapping() {
        let events = events_of("a: 1\n");
        assert_eq!(
            events,
            vec![
                YamlEvent::DocumentStart,
                YamlEvent::MappingStart { anchor: None },
                YamlEvent::Scalar {
                    value: "a".into(),
                    anchor: None
                },
                YamlEvent::Scalar {
                    value: "1".into(),
                    anchor: None
                },
                YamlEvent::MappingEnd,
            ]
        );
    }

    #[test]
    fn scalar_anchor_and_alias_names() {
        let events = events_of("a: &id1 test\nb: *id1\n");
        assert!(events.contains(&YamlEvent::Scalar {
            value: "test".into(),
            anchor: Some("id1".into()),
        }));
        assert!(events.contains(&YamlEvent::Alias {
            anchor: "id1".into(),
        }));
    }

    #[test]
    fn anchored_block_mapping() {
        let events = events_of("a: &sub\n  x: 1\nb: *sub\n");
        assert!(events.contains(&YamlEvent::MappingStart {
            anchor: Some("sub".into()),
        }));
    }

    #[test]
    fn anchored_flow_sequence() {
        let events = events_of("a: &seq [1, 2]\n");
        assert!(events.contains(&YamlEvent::SequenceStart {
            anchor: Some("seq".into()),
        }));
    }

    #[test]
    fn multi_document_stream() {
        let events = events_of("---\na: 1\n---\nb: 2\n");
        let doc_starts = events
            .iter()
            .filter(|e| matches!(e, YamlEvent::DocumentStart))
            .count();
        assert_eq!(doc_starts, 2);
    }
}

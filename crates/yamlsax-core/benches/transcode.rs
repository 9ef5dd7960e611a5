use criterion::{Criterion, criterion_group, criterion_main};
use yamlsax_core::{AliasStrategy, Attribute, ContentHandler, ReaderOptions, YamlEvent, YamlSaxReader};

struct NullSink;

impl ContentHandler for NullSink {
    fn start_document(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn end_document(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn start_element(&mut self, _name: &str, _attributes: &[Attribute<'_>]) -> anyhow::Result<()> {
        Ok(())
    }

    fn end_element(&mut self, _name: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn characters(&mut self, _text: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

fn synthetic_events(entries: usize) -> Vec<YamlEvent> {
    let mut events = vec![YamlEvent::DocumentStart, YamlEvent::MappingStart { anchor: None }];
    for i in 0..entries {
        events.push(YamlEvent::Scalar {
            value: format!("key{i}"),
            anchor: None,
        });
        events.push(YamlEvent::SequenceStart { anchor: None });
        for j in 0..4 {
            events.push(YamlEvent::Scalar {
                value: format!("value{j}"),
                anchor: None,
            });
        }
        events.push(YamlEvent::SequenceEnd);
    }
    events.push(YamlEvent::MappingEnd);
    events
}

fn bench_event_stream(c: &mut Criterion) {
    let events = synthetic_events(1_000);

    let mut group = c.benchmark_group("transcode");
    group.bench_function("events_1k_entries", |b| {
        let reader = YamlSaxReader::new(ReaderOptions::default());
        b.iter(|| {
            let mut sink = NullSink;
            reader
                .parse_events(events.iter().cloned(), &mut sink)
                .expect("transcode");
        });
    });
    group.finish();
}

fn bench_anchor_replay(c: &mut Criterion) {
    let mut events = vec![
        YamlEvent::DocumentStart,
        YamlEvent::MappingStart { anchor: None },
        YamlEvent::Scalar {
            value: "shared".to_string(),
            anchor: None,
        },
        YamlEvent::SequenceStart {
            anchor: Some("common".to_string()),
        },
    ];
    for j in 0..16 {
        events.push(YamlEvent::Scalar {
            value: format!("item{j}"),
            anchor: None,
        });
    }
    events.push(YamlEvent::SequenceEnd);
    for i in 0..256 {
        events.push(YamlEvent::Scalar {
            value: format!("copy{i}"),
            anchor: None,
        });
        events.push(YamlEvent::Alias {
            anchor: "common".to_string(),
        });
    }
    events.push(YamlEvent::MappingEnd);

    let mut group = c.benchmark_group("transcode");
    group.bench_function("resolve_256_replays", |b| {
        let reader = YamlSaxReader::new(ReaderOptions {
            alias_strategy: AliasStrategy::Resolve,
            ..ReaderOptions::default()
        });
        b.iter(|| {
            let mut sink = NullSink;
            reader
                .parse_events(events.iter().cloned(), &mut sink)
                .expect("transcode");
        });
    });
    group.finish();
}

criterion_group!(benches, bench_event_stream, bench_anchor_replay);
criterion_main!(benches);

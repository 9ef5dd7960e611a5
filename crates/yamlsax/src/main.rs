use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use bpaf::Bpaf;
use tracing_subscriber::prelude::*;
use yamlsax_core::{AliasStrategy, ReaderOptions, YamlSaxReader};
use yamlsax_xml::XmlWriter;

/// One `FROM=TO` key rename.
#[derive(Debug, Clone)]
struct KeyRename {
    from: String,
    to: String,
}

impl core::str::FromStr for KeyRename {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((from, to)) if !from.is_empty() => Ok(Self {
                from: from.to_string(),
                to: to.to_string(),
            }),
            _ => Err(format!("expected FROM=TO, got '{s}'")),
        }
    }
}

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version)]
/// Convert a YAML document stream to SAX-shaped XML
struct Args {
    /// Element name of the output root (default: yaml)
    #[bpaf(long("root-name"), argument("NAME"))]
    root_name: Option<String>,

    /// Element name wrapping each YAML document (default: document)
    #[bpaf(long("document-name"), argument("NAME"))]
    document_name: Option<String>,

    /// Element name for sequence elements (default: element)
    #[bpaf(long("array-element-name"), argument("NAME"))]
    array_element_name: Option<String>,

    /// Attribute name marking anchor declarations (default: id)
    #[bpaf(long("anchor-attribute"), argument("NAME"))]
    anchor_attribute: Option<String>,

    /// Attribute name marking alias references (default: ref)
    #[bpaf(long("alias-attribute"), argument("NAME"))]
    alias_attribute: Option<String>,

    /// How to handle anchors and aliases: refer, resolve or refer-resolve
    #[bpaf(
        long("alias-strategy"),
        argument("STRATEGY"),
        fallback(AliasStrategy::Refer)
    )]
    alias_strategy: AliasStrategy,

    /// Indent the XML output with newlines and tabs
    #[bpaf(long("indent"), switch)]
    indent: bool,

    /// Rename a mapping key before name shaping (repeatable)
    #[bpaf(long("map"), argument("FROM=TO"))]
    map: Vec<KeyRename>,

    /// Replacement for spaces in mapping keys
    #[bpaf(long("key-whitespace-replacement"), argument("STR"))]
    key_whitespace_replacement: Option<String>,

    /// Prefix for keys that start with a digit
    #[bpaf(long("key-prefix-on-numeric"), argument("STR"))]
    key_prefix_on_numeric: Option<String>,

    /// Replacement for characters illegal in element names
    #[bpaf(long("illegal-char-replacement"), argument("STR"))]
    illegal_char_replacement: Option<String>,

    /// Prepend an XML declaration
    #[bpaf(long("declaration"), switch)]
    declaration: bool,

    /// Write the XML to FILE instead of stdout
    #[bpaf(short('o'), long("output"), argument("FILE"))]
    output: Option<PathBuf>,

    /// YAML input file; stdin when omitted or "-"
    #[bpaf(positional("FILE"))]
    file: Option<String>,
}

fn main() -> ExitCode {
    init_tracing();

    let args = args().run();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Tracing subscriber controlled by the `YAMLSAX_LOG` env var.
fn init_tracing() {
    if let Ok(filter) = tracing_subscriber::EnvFilter::try_from_env("YAMLSAX_LOG") {
        tracing_subscriber::registry()
            .with(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_targets(true)
                    .with_bracketed_fields(true)
                    .with_indent_lines(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .init();
    }
}

fn run(args: &Args) -> Result<()> {
    let source = read_input(args.file.as_deref())?;
    tracing::debug!(
        bytes = source.len(),
        strategy = ?args.alias_strategy,
        "converting YAML input"
    );
    let reader = YamlSaxReader::new(build_options(args));

    let mut writer = XmlWriter::new(Vec::new());
    if args.declaration {
        writer = writer.with_declaration();
    }
    reader
        .parse(&source, &mut writer)
        .context("failed to convert YAML input")?;
    let xml = writer.into_inner();

    match &args.output {
        Some(path) => std::fs::write(path, &xml)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let stdout = std::io::stdout();
            let mut stdout = stdout.lock();
            stdout.write_all(&xml).context("write to stdout")?;
            stdout.write_all(b"\n").context("write to stdout")?;
        }
    }
    Ok(())
}

fn read_input(file: Option<&str>) -> Result<String> {
    match file {
        None | Some("-") => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("read YAML from stdin")?;
            Ok(source)
        }
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
        }
    }
}

fn build_options(args: &Args) -> ReaderOptions {
    let mut options = ReaderOptions::default();
    if let Some(name) = &args.root_name {
        options.root_name = name.clone();
    }
    if let Some(name) = &args.document_name {
        options.document_name = name.clone();
    }
    if let Some(name) = &args.array_element_name {
        options.array_element_name = name.clone();
    }
    if let Some(name) = &args.anchor_attribute {
        options.anchor_attribute_name = name.clone();
    }
    if let Some(name) = &args.alias_attribute {
        options.alias_attribute_name = name.clone();
    }
    options.alias_strategy = args.alias_strategy;
    options.indent = args.indent;
    for rename in &args.map {
        options.key_map.insert(rename.from.clone(), rename.to.clone());
    }
    options.key_whitespace_replacement = args.key_whitespace_replacement.clone();
    options.key_prefix_on_numeric = args.key_prefix_on_numeric.clone();
    options.illegal_element_name_char_replacement = args.illegal_char_replacement.clone();
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() -> anyhow::Result<()> {
        let parsed = args()
            .run_inner(&[] as &[&str])
            .map_err(|e| anyhow::anyhow!("{e:?}"))?;
        assert!(parsed.file.is_none());
        assert!(parsed.root_name.is_none());
        assert_eq!(parsed.alias_strategy, AliasStrategy::Refer);
        assert!(!parsed.indent);
        assert!(parsed.map.is_empty());
        Ok(())
    }

    #[test]
    fn cli_parses_all_node_name_options() -> anyhow::Result<()> {
        let parsed = args()
            .run_inner(&[
                "--root-name",
                "root",
                "--document-name",
                "doc",
                "--array-element-name",
                "e",
                "in.yaml",
            ])
            .map_err(|e| anyhow::anyhow!("{e:?}"))?;
        assert_eq!(parsed.root_name.as_deref(), Some("root"));
        assert_eq!(parsed.document_name.as_deref(), Some("doc"));
        assert_eq!(parsed.array_element_name.as_deref(), Some("e"));
        assert_eq!(parsed.file.as_deref(), Some("in.yaml"));
        Ok(())
    }

    #[test]
    fn cli_parses_alias_strategy() -> anyhow::Result<()> {
        let parsed = args()
            .run_inner(&["--alias-strategy", "refer-resolve"])
            .map_err(|e| anyhow::anyhow!("{e:?}"))?;
        assert_eq!(parsed.alias_strategy, AliasStrategy::ReferResolve);
        Ok(())
    }

    #[test]
    fn cli_rejects_unknown_alias_strategy() {
        assert!(args().run_inner(&["--alias-strategy", "inline"]).is_err());
    }

    #[test]
    fn cli_parses_repeated_key_renames() -> anyhow::Result<()> {
        let parsed = args()
            .run_inner(&["--map", "some key=someKey", "--map", "a=b"])
            .map_err(|e| anyhow::anyhow!("{e:?}"))?;
        assert_eq!(parsed.map.len(), 2);
        assert_eq!(parsed.map[0].from, "some key");
        assert_eq!(parsed.map[0].to, "someKey");
        Ok(())
    }

    #[test]
    fn cli_rejects_malformed_key_rename() {
        assert!(args().run_inner(&["--map", "no-separator"]).is_err());
    }

    #[test]
    fn build_options_applies_every_flag() -> anyhow::Result<()> {
        let parsed = args()
            .run_inner(&[
                "--anchor-attribute",
                "anchor",
                "--alias-attribute",
                "alias",
                "--alias-strategy",
                "resolve",
                "--indent",
                "--key-whitespace-replacement",
                "_",
                "--key-prefix-on-numeric",
                "n",
                "--illegal-char-replacement",
                "-",
                "--map",
                "from=to",
            ])
            .map_err(|e| anyhow::anyhow!("{e:?}"))?;
        let options = build_options(&parsed);
        assert_eq!(options.anchor_attribute_name, "anchor");
        assert_eq!(options.alias_attribute_name, "alias");
        assert_eq!(options.alias_strategy, AliasStrategy::Resolve);
        assert!(options.indent);
        assert_eq!(options.key_whitespace_replacement.as_deref(), Some("_"));
        assert_eq!(options.key_prefix_on_numeric.as_deref(), Some("n"));
        assert_eq!(
            options.illegal_element_name_char_replacement.as_deref(),
            Some("-")
        );
        assert_eq!(options.key_map.get("from").map(String::as_str), Some("to"));
        Ok(())
    }
}

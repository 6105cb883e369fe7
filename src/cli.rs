use crate::config::{LayoutConfig, load_config};
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::model::GraphInput;
use crate::pipeline::{arrange_nodes, layout_graph};
use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug, info};
use serde::Deserialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "tgl", version, about = "Lay out tiered category graphs")]
pub struct Args {
    /// Input graph (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the layout dump. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Layout config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Reject inputs with dangling references or duplicate ids
    #[arg(long)]
    pub strict: bool,

    /// Arrange the flat node and edge lists instead of composing categories
    #[arg(long)]
    pub arrange: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "warn")]
    pub log_level: String,
}

/// Input documents may arrive wrapped in the analysis envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum InputDocument {
    Wrapped {
        #[serde(rename = "analysisData")]
        analysis_data: GraphInput,
    },
    Bare(GraphInput),
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logger(&args.log_level);
    debug!(args:?; "Parsed arguments");

    let config = load_config(args.config.as_deref())?;
    let source = read_input(args.input.as_deref())?;
    let input = parse_input(&source)?;
    if args.strict {
        input.validate()?;
    }

    let dump = build_dump(&input, &config, args.arrange);
    info!(nodes = dump.counts.nodes, edges = dump.counts.edges; "Layout computed");
    write_layout_dump(args.output.as_deref(), &dump)
}

fn init_logger(level: &str) {
    let log_level = LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {level}. Using 'warn' instead.");
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn parse_input(source: &str) -> Result<GraphInput> {
    let document: InputDocument = serde_json::from_str(source)?;
    Ok(match document {
        InputDocument::Wrapped { analysis_data } => analysis_data,
        InputDocument::Bare(input) => input,
    })
}

fn build_dump(input: &GraphInput, config: &LayoutConfig, arrange: bool) -> LayoutDump {
    if arrange {
        let nodes = arrange_nodes(&input.nodes, &input.edges, config);
        return LayoutDump::from_arranged(&nodes, &input.edges);
    }
    LayoutDump::from_result(&layout_graph(input, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_and_wrapped_documents() {
        let bare = parse_input(r#"{"nodes":[{"id":"n1"}],"c1Categories":[{"id":"c1-a"}]}"#).unwrap();
        assert_eq!(bare.nodes.len(), 1);
        assert_eq!(bare.c1_categories.len(), 1);

        let wrapped = parse_input(
            r#"{"analysisData":{"graphNodes":[{"id":"n1"},{"id":"n2"}],"c2Categories":[{"id":"c2","c1CategoryId":"c1","nodeIds":["n1"]}]}}"#,
        )
        .unwrap();
        assert_eq!(wrapped.nodes.len(), 2);
        assert_eq!(wrapped.c2_categories[0].node_ids, vec!["n1"]);
    }

    #[test]
    fn builds_dump_for_both_modes() {
        let input = parse_input(
            r#"{"nodes":[{"id":"n1"}],"c1Categories":[{"id":"c1-a"}],"c2Categories":[{"id":"c2-a","c1CategoryId":"c1-a","nodeIds":["n1"]}]}"#,
        )
        .unwrap();
        let config = LayoutConfig::default();

        let composed = build_dump(&input, &config, false);
        assert_eq!(composed.counts.nodes, 3);
        assert_eq!(composed.counts.edges, 2);

        let arranged = build_dump(&input, &config, true);
        assert_eq!(arranged.counts.nodes, 1);
        assert_eq!(arranged.counts.edges, 0);
    }
}

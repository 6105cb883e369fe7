use crate::layout::{Direction, LayoutOptions};
use crate::model::Size;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Which of several nodes sharing an id gets the layout engine's slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DuplicatePolicy {
    #[default]
    KeepFirst,
    KeepLast,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub direction: Direction,
    pub node_separation: f32,
    pub rank_separation: f32,
    pub margin: f32,
    /// Footprint registered for every node when laying out a composed graph.
    pub composition_footprint: Size,
    /// Footprint registered for every node by the standalone arrangement step.
    pub arrangement_footprint: Size,
    pub min_distance: f32,
    /// Overlap passes; 1 reproduces the single-pass behaviour.
    pub overlap_passes: usize,
    pub scatter_extent: f32,
    /// Seed for the scatter fallback. Unseeded when `None`.
    pub scatter_seed: Option<u64>,
    pub duplicate_ids: DuplicatePolicy,
    /// Budget for the dagre engine before the layered placement takes over.
    pub engine_time_limit: Duration,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: Direction::TopBottom,
            node_separation: 80.0,
            rank_separation: 120.0,
            margin: 20.0,
            composition_footprint: Size::new(150.0, 50.0),
            arrangement_footprint: Size::new(180.0, 60.0),
            min_distance: 60.0,
            overlap_passes: 1,
            scatter_extent: 800.0,
            scatter_seed: None,
            duplicate_ids: DuplicatePolicy::KeepFirst,
            engine_time_limit: Duration::from_secs(5),
        }
    }
}

impl LayoutConfig {
    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            direction: self.direction,
            node_separation: self.node_separation,
            rank_separation: self.rank_separation,
            margin: self.margin,
            time_limit: self.engine_time_limit,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FootprintFile {
    width: Option<f32>,
    height: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    direction: Option<String>,
    node_separation: Option<f32>,
    rank_separation: Option<f32>,
    margin: Option<f32>,
    composition_footprint: Option<FootprintFile>,
    arrangement_footprint: Option<FootprintFile>,
    min_distance: Option<f32>,
    overlap_passes: Option<usize>,
    scatter_extent: Option<f32>,
    scatter_seed: Option<u64>,
    duplicate_ids: Option<DuplicatePolicy>,
    engine_time_limit_ms: Option<u64>,
}

/// Load an optional JSON (or JSON5) config file on top of the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    let mut config = LayoutConfig::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed = parse_config_file(&contents)?;
    apply_config_file(&mut config, parsed)?;
    log::debug!(path:? = path; "Loaded layout config");
    Ok(config)
}

fn parse_config_file(contents: &str) -> anyhow::Result<ConfigFile> {
    match serde_json::from_str(contents) {
        Ok(parsed) => Ok(parsed),
        // Hand-written configs often carry comments or trailing commas.
        Err(json_err) => json5::from_str(contents)
            .map_err(|_| anyhow::anyhow!("invalid config file: {json_err}")),
    }
}

fn apply_config_file(config: &mut LayoutConfig, parsed: ConfigFile) -> anyhow::Result<()> {
    if let Some(token) = parsed.direction.as_deref() {
        config.direction = Direction::from_token(token)
            .ok_or_else(|| anyhow::anyhow!("unknown layout direction `{token}`"))?;
    }
    if let Some(v) = parsed.node_separation {
        config.node_separation = v;
    }
    if let Some(v) = parsed.rank_separation {
        config.rank_separation = v;
    }
    if let Some(v) = parsed.margin {
        config.margin = v;
    }
    if let Some(footprint) = parsed.composition_footprint {
        apply_footprint(&mut config.composition_footprint, footprint);
    }
    if let Some(footprint) = parsed.arrangement_footprint {
        apply_footprint(&mut config.arrangement_footprint, footprint);
    }
    if let Some(v) = parsed.min_distance {
        config.min_distance = v.max(0.0);
    }
    if let Some(v) = parsed.overlap_passes {
        config.overlap_passes = v;
    }
    if let Some(v) = parsed.scatter_extent {
        config.scatter_extent = v.max(0.0);
    }
    if parsed.scatter_seed.is_some() {
        config.scatter_seed = parsed.scatter_seed;
    }
    if let Some(v) = parsed.duplicate_ids {
        config.duplicate_ids = v;
    }
    if let Some(ms) = parsed.engine_time_limit_ms {
        config.engine_time_limit = Duration::from_millis(ms.max(1));
    }
    Ok(())
}

fn apply_footprint(size: &mut Size, file: FootprintFile) {
    if let Some(width) = file.width {
        size.width = width.max(1.0);
    }
    if let Some(height) = file.height {
        size.height = height.max(1.0);
    }
}

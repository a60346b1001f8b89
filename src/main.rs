use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use serde::Deserialize;
use structured_logger::json::new_writer;
use structured_logger::Builder;

use osm_preload::etl::coords::parse_coord;
use osm_preload::{
    BBox, DuplicateTags, Error, Input, LoadOptions, OsmDatasource, OsmMapData, Result,
};

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct UserConfig {
    pub data_path: Option<String>,
    pub load: LoadOptions,
}

/// Load an OpenStreetMap XML dump and report on it.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// OSM XML file (`.osm` or `.osm.xz`), `-` for standard input.
    /// Takes precedence over `data_path` in the config file.
    input: Option<String>,

    /// JSON file with `data_path` and `load` options.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    log_level: String,

    /// Keep tags of nodes.
    #[arg(long)]
    node_tags: bool,

    /// Keep tags of relations.
    #[arg(long)]
    relation_tags: bool,

    #[arg(long, value_enum)]
    duplicate_tags: Option<DuplicateTags>,

    /// Report the ways whose bounding boxes intersect this box, in degrees.
    #[arg(long, value_parser = parse_query_box, value_name = "MINLON,MINLAT,MAXLON,MAXLAT")]
    query: Option<BBox>,
}

fn parse_query_box(s: &str) -> std::result::Result<BBox, String> {
    let coords = s
        .split(',')
        .map(|part| parse_coord(part.trim()).map_err(|err| err.to_string()))
        .collect::<std::result::Result<Vec<i32>, String>>()?;
    let [left, bottom, right, top] = coords[..] else {
        return Err("expected four comma-separated coordinates".to_string());
    };
    let bbox = BBox::new(left, bottom, right, top);
    if bbox.is_empty() {
        return Err("minimum exceeds maximum".to_string());
    }
    Ok(bbox)
}

fn load_user_config(path: &Path) -> Result<UserConfig> {
    let file = File::open(path).map_err(|source| Error::System {
        context: "cannot open config file",
        source,
    })?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|err| Error::Generic(format!("cannot parse config: {err}")))
}

fn setup_logging(level: &str) {
    Builder::with_level(level)
        .with_target_writer("*", new_writer(io::stdout()))
        .init();
}

fn report(data: &OsmMapData) {
    let closed = data.ways().filter(|way| way.closed).count();
    let clockwise = data.ways().filter(|way| way.closed && way.clockwise).count();
    let bbox = data.get_bbox().to_string();
    let center = data.get_center().to_string();
    info!(
        nodes = data.node_count(),
        ways = data.way_count(),
        relations = data.relation_count(),
        closed_ways = closed,
        clockwise_ways = clockwise,
        bbox = bbox.as_str(),
        center = center.as_str();
        "Summary"
    );
}

fn report_query(data: &OsmMapData, query: &BBox) {
    let mut ways = Vec::new();
    data.get_ways(&mut ways, query);
    let ids = ways
        .iter()
        .map(|way| way.id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let query = query.to_string();
    info!(
        query = query.as_str(),
        count = ways.len(),
        ids = ids.as_str();
        "Ways intersecting query box"
    );
}

fn run(cli: Cli) -> Result<()> {
    let user_config = match &cli.config {
        Some(path) => load_user_config(path)?,
        None => UserConfig::default(),
    };

    let mut options = user_config.load;
    options.node_tags |= cli.node_tags;
    options.relation_tags |= cli.relation_tags;
    if let Some(policy) = cli.duplicate_tags {
        options.duplicate_tags = policy;
    }

    let data_path = cli
        .input
        .or(user_config.data_path)
        .ok_or("no input given: pass a path, `-` or a config with data_path")?;

    let mut data = OsmMapData::new();
    data.load(Input::from_arg(&data_path), &options)?;

    report(&data);
    if let Some(query) = &cli.query {
        report_query(&data, query);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let message = err.to_string();
            error!(err = message.as_str(); "Failed to load map data");
            ExitCode::FAILURE
        },
    }
}

mod host;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};

use blockfall_engine::assets::DirectoryProvider;
use blockfall_engine::config::SceneConfig;
use blockfall_engine::layers::LayerRegistry;
use blockfall_engine::logging::{LoggingConfig, init_logging};
use blockfall_engine::stage::Stage;
use blockfall_engine::viewport::ViewportOracle;

use host::ConsoleHost;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// A window size in logical pixels, with its device pixel ratio.
#[derive(Debug, Copy, Clone, PartialEq)]
struct WindowSize {
    width: f32,
    height: f32,
    pixel_ratio: f32,
}

/// Parses `WxH` or `WxH@DPR`.
fn parse_window(s: &str) -> Result<WindowSize, String> {
    let (dims, ratio) = match s.split_once('@') {
        Some((dims, ratio)) => (dims, ratio.parse::<f32>().map_err(|_| format!("bad pixel ratio in `{s}`"))?),
        None => (s, 1.0),
    };
    let (w, h) = dims.split_once(['x', 'X']).ok_or_else(|| format!("expected WxH, got `{s}`"))?;
    let num = |v: &str| v.trim().parse::<f32>().map_err(|_| format!("bad dimension `{v}` in `{s}`"));
    Ok(WindowSize { width: num(w)?, height: num(h)?, pixel_ratio: ratio })
}

fn cli() -> Command {
    Command::new("blockfall-studio")
        .about("Composes the Blockfall title screen headlessly and prints each submitted frame")
        .arg(Arg::new("config").long("config").value_name("FILE").help("Scene config (TOML)"))
        .arg(
            Arg::new("assets")
                .long("assets")
                .value_name("DIR")
                .help("Directory textures and fonts are loaded from")
                .default_value("assets"),
        )
        .arg(
            Arg::new("viewport")
                .long("viewport")
                .value_name("WxH[@DPR]")
                .help("Window size applied on successive frames; repeatable")
                .value_parser(parse_window)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("frames")
                .long("frames")
                .value_name("N")
                .help("Number of frames to run")
                .value_parser(clap::value_parser!(u32))
                .default_value("30"),
        )
        .arg(
            Arg::new("log")
                .long("log")
                .value_name("FILTER")
                .help("Log filter, e.g. `blockfall_engine=debug`"),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    init_logging(LoggingConfig {
        env_filter: matches.get_one::<String>("log").cloned(),
        timestamps: false,
        ..LoggingConfig::default()
    });

    let config = match matches.get_one::<String>("config") {
        Some(path) => SceneConfig::load(path).with_context(|| format!("loading scene config `{path}`"))?,
        None => SceneConfig::default(),
    };
    let registry = LayerRegistry::from_config(&config.layers).context("invalid layer table")?;

    let assets_dir = matches.get_one::<String>("assets").map(PathBuf::from).unwrap_or_default();
    let mut provider = DirectoryProvider::new(&assets_dir).context("starting asset loader")?;

    let mut oracle = ViewportOracle::new(config.pixel_ratio.clone());
    let mut stage = Stage::new(&config, registry).context("composing title screen")?;
    let mut host = ConsoleHost::new(stage.registry());
    stage.attach(&mut oracle);

    let mut windows: Vec<WindowSize> =
        matches.get_many::<WindowSize>("viewport").into_iter().flatten().copied().collect();
    if windows.is_empty() {
        windows.push(WindowSize { width: 1280.0, height: 720.0, pixel_ratio: 1.0 });
    }
    let frames = matches.get_one::<u32>("frames").copied().unwrap_or(30);

    println!();
    println!("  blockfall studio · {} frame(s) · assets from {}", frames, assets_dir.display());

    let mut windows = windows.into_iter();
    for _ in 0..frames {
        if let Some(w) = windows.next() {
            oracle.resize_from_window(w.width, w.height, w.pixel_ratio, stage.camera());
        }
        let report = stage.frame(&mut provider, &mut host);
        for err in &report.failed_assets {
            println!("  ! {err}");
        }
        if stage.pending_assets() > 0 {
            thread::sleep(FRAME_INTERVAL);
        }
    }

    let cancelled = stage.teardown();
    stage.detach(&mut oracle);
    println!();
    println!("  {} submission(s); {} load(s) cancelled at teardown", host.submissions(), cancelled);
    Ok(())
}

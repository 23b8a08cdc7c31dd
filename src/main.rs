use pokemon_battle_search::{load_config, run, CliOptions, Mode, SearchConfig};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::env;
use std::path::PathBuf;

fn usage() -> ! {
    eprintln!(
        "Usage: cargo run --release -- --scenario scenario.json [--mode safest|opponent|punish|policy] \
[--depth N] [--reply-depth N] [--no-prune] [--sequential] [--config search.json] [--roster roster.json] \
[--matrix-out matrix.csv] [--playouts N] [--seed SEED] [--verbose]"
    );
    std::process::exit(1);
}

struct Args {
    opts: CliOptions,
    verbose: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut scenario_path = None;
    let mut mode = Mode::Policy;
    let mut config_path = None;
    let mut depth = None;
    let mut reply_depth = None;
    let mut prune = None;
    let mut parallel = None;
    let mut roster_path = None;
    let mut matrix_out = None;
    let mut playouts = 0usize;
    let mut seed = 0u64;
    let mut verbose = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--scenario" => {
                scenario_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--scenario requires a path (e.g. --scenario scenario.json)")
                })?);
            }
            "--mode" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--mode requires safest, opponent, punish or policy"))?;
                mode = match val.to_ascii_lowercase().as_str() {
                    "safest" => Mode::Safest,
                    "opponent" => Mode::Opponent,
                    "punish" => Mode::Punish,
                    "policy" => Mode::Policy,
                    other => anyhow::bail!("Unknown mode {other} (use safest, opponent, punish or policy)"),
                };
            }
            "--depth" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--depth requires a number"))?;
                depth = Some(val.parse()?);
            }
            "--reply-depth" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--reply-depth requires a number"))?;
                reply_depth = Some(val.parse()?);
            }
            "--no-prune" => prune = Some(false),
            "--sequential" => parallel = Some(false),
            "--config" => {
                config_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--config requires a path (e.g. --config search.json)")
                })?);
            }
            "--roster" => {
                roster_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--roster requires a path (e.g. --roster roster.json)")
                })?);
            }
            "--matrix-out" => {
                matrix_out = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--matrix-out requires a path (e.g. --matrix-out matrix.csv)")
                })?);
            }
            "--playouts" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--playouts requires a number"))?;
                playouts = val.parse()?;
            }
            "--seed" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a number"))?;
                seed = val.parse()?;
            }
            "--verbose" | "-v" => verbose = true,
            "--help" | "-h" => usage(),
            other => return Err(anyhow::anyhow!("Unknown argument {other}")),
        }
    }

    let scenario_path = scenario_path.ok_or_else(|| anyhow::anyhow!("--scenario is required"))?;
    let mut config = match &config_path {
        Some(path) => load_config(path)?,
        None => SearchConfig::default(),
    };
    if let Some(depth) = depth {
        config = config.with_depth(depth);
    }
    if let Some(depth) = reply_depth {
        config = config.with_reply_depth(depth);
    }
    if let Some(prune) = prune {
        config = config.with_prune(prune);
    }
    if let Some(parallel) = parallel {
        config = config.with_parallel(parallel);
    }

    Ok(Args {
        opts: CliOptions {
            scenario_path,
            mode,
            config,
            roster_path,
            matrix_out,
            playouts,
            seed,
        },
        verbose,
    })
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = ConfigBuilder::new()
        .set_location_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = parse_args()?;
    init_logging(args.verbose)?;
    run(args.opts)
}

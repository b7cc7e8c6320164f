use anyhow::Context;
use bounty_core::{RewardInputs, RngState};
use bounty_data::{
    builtin_characters, load_engine_config, load_roster, validate_roster, EngineConfig,
    RosterEntry, CHARACTERS_FILE, ENGINE_CONFIG_FILE,
};
use std::path::{Path, PathBuf};

const USAGE: &str = "\
usage: bounty [roll|list|check] [ID...] [options]

commands:
  roll     resolve rewards (default)
  list     show the roster
  check    validate the roster and exit non-zero on problems

options:
  --assets DIR     asset directory (default: $BOUNTY_ASSETS or ./assets)
  --roster PATH    roster JSON (default: <assets>/characters.json, else built-in)
  --config PATH    engine config JSON (default: <assets>/engine.json)
  --seed N         RNG seed (default: config seed, else random)
  --base V         base value bound to `base`
  --level L        level bound to `level` (multiplier = level * 0.5)
  --user ID        user id written to reward logs
  --trials N       rolls per character (default 1)
  --all            include disabled characters
  --json           print RewardLog JSON lines
  -h, --help       show this help";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Roll,
    List,
    Check,
}

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    command: Command,
    ids: Vec<String>,
    assets: PathBuf,
    roster: Option<PathBuf>,
    config: Option<PathBuf>,
    seed: Option<u64>,
    base_value: Option<f64>,
    level: Option<f64>,
    user_id: Option<String>,
    trials: u32,
    include_disabled: bool,
    json: bool,
    help: bool,
}

impl CliOptions {
    fn new(assets: PathBuf) -> Self {
        Self {
            command: Command::Roll,
            ids: Vec::new(),
            assets,
            roster: None,
            config: None,
            seed: None,
            base_value: None,
            level: None,
            user_id: None,
            trials: 1,
            include_disabled: false,
            json: false,
            help: false,
        }
    }
}

fn parse_cli_options(args: &[String], assets_env: Option<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::new(PathBuf::from(
        assets_env.unwrap_or_else(|| "assets".to_string()),
    ));
    let mut idx = 0usize;
    while idx < args.len() {
        let arg = args[idx].as_str();
        match arg {
            "roll" if idx == 0 => options.command = Command::Roll,
            "list" if idx == 0 => options.command = Command::List,
            "check" if idx == 0 => options.command = Command::Check,
            "-h" | "--help" => options.help = true,
            "--all" => options.include_disabled = true,
            "--json" => options.json = true,
            "--assets" => options.assets = PathBuf::from(flag_value(args, &mut idx)?),
            "--roster" => options.roster = Some(PathBuf::from(flag_value(args, &mut idx)?)),
            "--config" => options.config = Some(PathBuf::from(flag_value(args, &mut idx)?)),
            "--seed" => options.seed = Some(parse_flag(args, &mut idx)?),
            "--base" => options.base_value = Some(parse_flag(args, &mut idx)?),
            "--level" => options.level = Some(parse_flag(args, &mut idx)?),
            "--user" => options.user_id = Some(flag_value(args, &mut idx)?.to_string()),
            "--trials" => options.trials = parse_flag(args, &mut idx)?,
            _ if arg.starts_with('-') => return Err(format!("unknown option '{}'", arg)),
            _ => options.ids.push(arg.to_string()),
        }
        idx += 1;
    }
    if options.trials == 0 {
        return Err("--trials must be at least 1".to_string());
    }
    Ok(options)
}

fn flag_value<'a>(args: &'a [String], idx: &mut usize) -> Result<&'a str, String> {
    let flag = &args[*idx];
    *idx += 1;
    args.get(*idx)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires a value", flag))
}

fn parse_flag<T: std::str::FromStr>(args: &[String], idx: &mut usize) -> Result<T, String> {
    let flag = args[*idx].clone();
    let value = flag_value(args, idx)?;
    value
        .parse::<T>()
        .map_err(|_| format!("invalid value '{}' for {}", value, flag))
}

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_cli_options(&args, std::env::var("BOUNTY_ASSETS").ok()) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}\n\n{USAGE}");
            std::process::exit(2);
        }
    };
    if options.help {
        println!("{USAGE}");
        return;
    }
    match run(&options) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when `check` found problems.
fn run(options: &CliOptions) -> anyhow::Result<bool> {
    let roster = load_selected_roster(options)?;
    match options.command {
        Command::List => {
            for entry in &roster {
                println!("{}", describe_entry(entry));
            }
            Ok(true)
        }
        Command::Check => {
            let issues = validate_roster(&roster);
            for issue in &issues {
                println!("{issue}");
            }
            if issues.is_empty() {
                println!("{} characters ok", roster.len());
            }
            Ok(issues.is_empty())
        }
        Command::Roll => {
            let config = load_selected_config(options)?;
            roll(options, &config, &roster)?;
            Ok(true)
        }
    }
}

fn load_selected_roster(options: &CliOptions) -> anyhow::Result<Vec<RosterEntry>> {
    let entries = match &options.roster {
        Some(path) => load_roster(path)?,
        None => {
            let path = options.assets.join(CHARACTERS_FILE);
            if path.exists() {
                load_roster(&path)?
            } else {
                log::info!("{} not found, using built-in roster", path.display());
                builtin_characters()
                    .into_iter()
                    .map(RosterEntry::Character)
                    .collect()
            }
        }
    };
    if options.ids.is_empty() {
        return Ok(entries);
    }
    options
        .ids
        .iter()
        .map(|id| {
            entries
                .iter()
                .find(|entry| entry.id() == id)
                .cloned()
                .with_context(|| format!("no character with id '{}'", id))
        })
        .collect()
}

fn load_selected_config(options: &CliOptions) -> anyhow::Result<EngineConfig> {
    let path = options
        .config
        .clone()
        .unwrap_or_else(|| options.assets.join(ENGINE_CONFIG_FILE));
    let mut config = load_config_file(&path)?;
    if let Some(seed) = options.seed {
        config.seed = Some(seed);
    }
    if let Some(base) = options.base_value {
        config.base_value = base;
    }
    if let Some(level) = options.level {
        config.level = level;
    }
    if let Some(user) = &options.user_id {
        config.user_id = user.clone();
    }
    Ok(config)
}

fn load_config_file(path: &Path) -> anyhow::Result<EngineConfig> {
    load_engine_config(path).with_context(|| format!("engine config {}", path.display()))
}

fn roll(options: &CliOptions, config: &EngineConfig, roster: &[RosterEntry]) -> anyhow::Result<()> {
    let mut rng = match config.seed {
        Some(seed) => RngState::from_seed(seed),
        None => RngState::from_entropy(),
    };
    let inputs = config.inputs();
    log::info!(
        "rolling with seed {} base {} level {}",
        rng.seed(),
        inputs.base_value,
        inputs.level
    );
    let explicit = !options.ids.is_empty();
    for entry in roster {
        if !(explicit || options.include_disabled || is_enabled(entry)) {
            continue;
        }
        for _ in 0..options.trials {
            roll_entry(options, config, inputs, entry, &mut rng)?;
        }
    }
    Ok(())
}

fn roll_entry(
    options: &CliOptions,
    config: &EngineConfig,
    inputs: RewardInputs,
    entry: &RosterEntry,
    rng: &mut RngState,
) -> anyhow::Result<()> {
    let outcome = entry.resolve(inputs, rng);
    let log = entry.reward_log(&config.user_id, &outcome, Some(rng.seed()));
    if options.json {
        println!("{}", serde_json::to_string(&log).context("serialize reward log")?);
        return Ok(());
    }
    let mut line = format!(
        "{:<4} {:<20} {:<14} {:>14}",
        entry.id(),
        entry.name(),
        log.mode_used,
        log.actual_value
    );
    if let Some(trace) = &log.metadata.formula_result {
        line.push_str(&format!("  [{}]", trace));
    }
    if let Some(failure) = &log.metadata.failure {
        line.push_str(&format!("  ! {}", failure));
    }
    println!("{line}");
    Ok(())
}

fn is_enabled(entry: &RosterEntry) -> bool {
    entry.character().map(|c| c.enabled).unwrap_or(false)
}

fn describe_entry(entry: &RosterEntry) -> String {
    match entry {
        RosterEntry::Character(character) => format!(
            "{:<4} {:<20} {:<14} {:<12} weight {}{}",
            character.id,
            character.name,
            character.reward_mode,
            character.display_text,
            character.probability_weight,
            if character.enabled { "" } else { " (disabled)" }
        ),
        RosterEntry::UnknownMode { id, name, tag } => {
            format!("{:<4} {:<20} {:<14} (unknown mode)", id, name, tag)
        }
    }
}

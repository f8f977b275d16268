use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use hero_engine::api::{simulate_rolls, RollConfig};
use hero_engine::export::{self, export_file_name};
use hero_engine::modifiers::parse_value;
use hero_engine::persistence::JsonFileStorage;
use hero_engine::powers::trait_label;
use hero_engine::roll::format_modifier;
use hero_engine::zones::{health_zone, resolve_zone_with};
use hero_engine::{
    is_available, CharacterStore, Dice, EngineConfig, HealthPool, RollResolver, ZoneOverrides,
    ZoneTag,
};
use tracing_subscriber::EnvFilter;

#[derive(Subcommand)]
enum Cmd {
    /// Roll three dice; the modifier applies to the mid die
    Roll {
        /// Three face counts, comma separated
        #[arg(long, value_delimiter = ',', default_values_t = [6, 8, 10])]
        dice: Vec<u32>,
        /// Total modifier added to mid
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        modifier: i64,
        /// RNG seed for determinism (omit for the secure source)
        #[arg(long)]
        seed: Option<u64>,
        /// Number of rolls
        #[arg(long, default_value_t = 1)]
        rolls: u32,
    },
    /// Resolve the zone for a health value
    Zone {
        #[arg(long)]
        current: u32,
        #[arg(long)]
        max: u32,
        /// Force a zone on (repeatable)
        #[arg(long = "override", value_parser = parse_zone)]
        overrides: Vec<ZoneTag>,
        /// YAML or JSON engine config
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Many seeded rolls; prints tier counts and means as JSON
    Simulate {
        #[arg(long, value_delimiter = ',', default_values_t = [6, 8, 10])]
        dice: Vec<u32>,
        #[arg(long, default_value_t = 1000)]
        rolls: u32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        modifier: i64,
        /// Include one narration line per roll
        #[arg(long, default_value_t = false)]
        log: bool,
    },
    /// Work with a sheet stored as JSON in a directory
    Sheet {
        #[arg(long)]
        dir: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[command(subcommand)]
        action: SheetCmd,
    },
}

#[derive(Subcommand)]
enum SheetCmd {
    /// Print zone, health, powers and modifiers
    Show,
    /// Set current health
    Health { current: u32 },
    Damage { amount: u32 },
    Heal { amount: u32 },
    /// Toggle a zone override
    Override {
        #[arg(value_parser = parse_zone)]
        zone: ZoneTag,
    },
    ModAdd {
        name: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
        #[arg(long, default_value_t = false)]
        persistent: bool,
    },
    ModToggle { id: String },
    ModClearTemp,
    /// Roll the sheet's dice with its active modifiers
    Roll {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Write an export document; FILE may be a directory
    Export { file: PathBuf },
    Import { file: PathBuf },
}

#[derive(Parser)]
#[command(name = "hero-cli")]
#[command(about = "Hero sheet zone and dice harness")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

fn parse_zone(s: &str) -> Result<ZoneTag, String> {
    s.parse::<ZoneTag>().map_err(|e| e.to_string())
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(p) => EngineConfig::load(p),
        None => Ok(EngineConfig::default()),
    }
}

fn make_dice(seed: Option<u64>) -> Dice {
    match seed {
        Some(s) => Dice::from_seed(s),
        None => Dice::secure(),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Roll {
            dice,
            modifier,
            seed,
            rolls,
        } => {
            let mut roller = make_dice(seed);
            let mut resolver = RollResolver::new();
            for _ in 0..rolls {
                let res = resolver.roll(&dice, modifier, &mut roller)?;
                println!("{}", res.narrate());
            }
        }
        Cmd::Zone {
            current,
            max,
            overrides,
            config,
        } => {
            let cfg = load_config(config)?;
            let health = HealthPool::with_current(current, max);
            let mut forced = ZoneOverrides::default();
            for tag in overrides {
                forced.set(tag, true);
            }
            let zone = resolve_zone_with(&health, &forced, &cfg.zone_mode);
            println!(
                "[ZONE] {}/{} ({}%) health={} → {} (status die {})",
                health.current,
                health.max,
                health.percentage(),
                health_zone(&health, &cfg.zone_mode),
                zone,
                zone.suggested_status_die()
            );
            for tag in ZoneTag::ALL {
                println!(
                    "  {:<6} {}",
                    tag.zone(),
                    if is_available(zone, tag) { "available" } else { "locked" }
                );
            }
        }
        Cmd::Simulate {
            dice,
            rolls,
            seed,
            modifier,
            log,
        } => {
            let stats = simulate_rolls(RollConfig {
                dice,
                modifier,
                seed,
                samples: rolls,
                keep_log: log,
            })?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Cmd::Sheet { dir, config, action } => {
            let cfg = load_config(config)?;
            let storage = JsonFileStorage::new(&dir, &cfg.storage_key);
            let mut store = CharacterStore::open(storage, cfg);
            run_sheet(&mut store, action)?;
            if !store.last_save_ok() {
                eprintln!("warning: sheet could not be saved");
            }
        }
    }
    Ok(())
}

fn run_sheet(store: &mut CharacterStore<JsonFileStorage>, action: SheetCmd) -> anyhow::Result<()> {
    match action {
        SheetCmd::Show => print_sheet(store),
        SheetCmd::Health { current } => {
            store.set_health(current);
            print_sheet(store);
        }
        SheetCmd::Damage { amount } => {
            if store.damage(amount) {
                println!("[STATE] drops to 0 HP");
            }
            print_sheet(store);
        }
        SheetCmd::Heal { amount } => {
            store.heal(amount);
            print_sheet(store);
        }
        SheetCmd::Override { zone } => {
            let on = store.toggle_override(zone);
            println!("[ZONE] {} override {}", zone.zone(), if on { "ENABLED" } else { "OFF" });
        }
        SheetCmd::ModAdd {
            name,
            value,
            persistent,
        } => {
            let value = parse_value(&value)?;
            let id = store.add_modifier(&name, f64::from(value), persistent)?;
            println!("[MOD] added {} ({})", id, format_modifier(i64::from(value)));
        }
        SheetCmd::ModToggle { id } => {
            let active = store.toggle_modifier(&id)?;
            println!("[MOD] {} {}", id, if active { "active" } else { "inactive" });
        }
        SheetCmd::ModClearTemp => {
            let removed = store.clear_temporary_modifiers();
            println!("[MOD] cleared {} temporary modifier(s)", removed);
        }
        SheetCmd::Roll { seed } => {
            let mut roller = make_dice(seed);
            let mut resolver = RollResolver::new();
            let res = store.roll(&mut resolver, &mut roller)?;
            println!("{}", res.narrate());
        }
        SheetCmd::Export { file } => {
            let now = export::now();
            let path = if file.is_dir() {
                file.join(export_file_name(now))
            } else {
                file
            };
            let text = store.export_json(now)?;
            fs::write(&path, text)
                .with_context(|| format!("failed to write export: {}", path.display()))?;
            println!("exported to {}", path.display());
        }
        SheetCmd::Import { file } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("failed to read import: {}", file.display()))?;
            store.import_json(&text)?;
            println!("Character loaded successfully!");
        }
    }
    Ok(())
}

fn print_sheet(store: &CharacterStore<JsonFileStorage>) {
    let hero = store.hero();
    let zone = store.zone();
    println!(
        "{}: {}/{} HP ({}%) zone={} status die {}",
        if hero.name.is_empty() { "Hero" } else { hero.name.as_str() },
        hero.health.current,
        hero.health.max,
        hero.health.percentage(),
        zone,
        zone.suggested_status_die()
    );
    for p in &hero.powers {
        let mark = if is_available(zone, p.zone) { " " } else { "×" };
        println!("  {} [{}] {} {} ({})", mark, p.zone.zone(), p.name, p.die, p.id);
    }
    let available = hero.available_abilities(&store.config().zone_mode);
    for a in &hero.abilities {
        let mark = if available.iter().any(|x| x.id == a.id) { " " } else { "×" };
        println!(
            "  {} <{}> {}: {}",
            mark,
            a.interaction_type.badge(),
            a.name,
            trait_label(a, &hero.powers, &hero.qualities)
        );
    }
    let dice = store.dice();
    println!("  dice: d{} d{} d{}", dice[0], dice[1], dice[2]);
    for m in store.modifiers().iter() {
        println!(
            "  mod {} {} {} [{}{}]",
            m.id,
            m.name,
            format_modifier(i64::from(m.value)),
            if m.is_persistent { "persist" } else { "temp" },
            if m.is_active { "" } else { ", off" }
        );
    }
    println!("  modifier total {}", format_modifier(store.modifiers().active_total()));
}

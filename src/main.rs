//! Clinks entry point
//!
//! Headless native runner: loads settings and the last save, drives the
//! session on a fixed timestep for a span of game time, then saves.
//!
//! Usage: `clinks [seconds] [settings.json] [--afk] [--autobuy]`

use clinks::consts::{MAX_SUBSTEPS, SIM_DT_MS};
use clinks::persistence::{JsonFileStore, SaveStore};
use clinks::sim::{GaltonWorld, Intent, Session};
use clinks::{Result, Settings};

/// Simulated frame length (60 fps)
const FRAME_MS: f64 = 1000.0 / 60.0;
/// How often the HUD summary is logged, in game time
const REPORT_INTERVAL_MS: f64 = 10_000.0;

struct Args {
    seconds: f64,
    settings_path: String,
    afk: bool,
    autobuy: bool,
}

impl Args {
    fn parse() -> Self {
        let mut args = Args {
            seconds: 60.0,
            settings_path: "clinks_settings.json".to_string(),
            afk: false,
            autobuy: false,
        };
        let mut positional = 0;
        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "--afk" => args.afk = true,
                "--autobuy" => args.autobuy = true,
                _ if positional == 0 => {
                    match arg.parse::<f64>() {
                        Ok(s) if s.is_finite() && s >= 0.0 => args.seconds = s,
                        _ => log::warn!("Ignoring invalid duration {:?}", arg),
                    }
                    positional += 1;
                }
                _ => {
                    args.settings_path = arg;
                    positional += 1;
                }
            }
        }
        args
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    log::info!("Clinks (native) starting...");

    let mut settings = Settings::load(&args.settings_path);
    settings.afk |= args.afk;

    let mut store = JsonFileStore::new(&settings.save_path);
    let save = match store.load() {
        Ok(save) => save,
        Err(e) => {
            log::warn!("Could not load save ({}), starting fresh", e);
            None
        }
    };
    let world = GaltonWorld::new(settings.resolved_seed().wrapping_add(1));
    let mut session = Session::from_save(settings, save, world)?;

    let total_ms = args.seconds * 1000.0;
    let mut accumulator = 0.0;
    let mut next_report = REPORT_INTERVAL_MS;

    while session.time_ms() < total_ms {
        accumulator += FRAME_MS;

        let mut substeps = 0;
        while accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
            let report = session.tick(SIM_DT_MS);
            accumulator -= SIM_DT_MS;
            substeps += 1;

            if report.autosave_due {
                store.save(&session.snapshot())?;
            }
        }

        if session.time_ms() >= next_report {
            next_report += REPORT_INTERVAL_MS;
            if args.autobuy {
                autobuy(&mut session);
            }
            log_hud(&session);
        }
    }

    session.flush();
    log_hud(&session);
    store.save(&session.snapshot())?;
    Ok(())
}

/// Spend the balance on whatever is cheapest, one purchase at a time
fn autobuy(session: &mut Session<GaltonWorld>) {
    loop {
        let hud = session.hud();
        let mut offers: Vec<(f64, Intent)> = hud
            .buildings
            .iter()
            .map(|b| (b.next_cost, Intent::PurchaseBuilding(b.kind)))
            .collect();
        if let Some(cost) = hud.row_cost {
            offers.push((cost, Intent::PurchaseRow));
        }
        let Some((cost, intent)) = offers
            .into_iter()
            .min_by(|a, b| a.0.total_cmp(&b.0))
        else {
            return;
        };
        if cost > hud.currency || session.apply(intent).is_err() {
            return;
        }
    }
}

fn log_hud(session: &Session<GaltonWorld>) {
    let hud = session.hud();
    log::info!(
        "t={:.0}s balance={:.2} pending={:.2} rows={} in flight={}",
        session.time_ms() / 1000.0,
        hud.currency,
        hud.pending,
        hud.rows,
        hud.units_in_flight
    );
    for b in hud.buildings.iter().filter(|b| b.count > 0) {
        log::info!("  {} x{} (level {})", b.kind, b.count, b.level);
    }
    if !hud.buckets.is_empty() {
        let distribution: Vec<String> = hud
            .buckets
            .distribution()
            .iter()
            .map(|p| format!("{:.1}", p))
            .collect();
        log::info!("  buckets % [{}]", distribution.join(" "));
    }
}

//! lottery-runner: headless runner for the birth lottery.
//!
//! Usage:
//!   lottery-runner --seed 12345 --draws 10 --db cache.db
//!   lottery-runner --data-dir ./data --refresh
//!   lottery-runner --ipc-mode

use anyhow::Result;
use birth_lottery_core::{
    cache::{load_distribution, CacheStatus},
    config::LotteryConfig,
    distribution::Distribution,
    report::{lookup_row, respond, DataResponse},
    sampler::{BatchSummary, DrawResult},
    session::DrawSession,
    source::FileSource,
    store::SnapshotStore,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetData,
    Draw,
    DrawBatch {
        #[serde(default)]
        count: Option<u32>,
    },
    Lookup {
        code: String,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct DrawReply<'a> {
    draws:   Vec<DrawLine<'a>>,
    summary: BatchSummary,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct DrawLine<'a> {
    rank:        Option<u32>,
    id:          &'a str,
    name:        &'a str,
    iso2:        &'a str,
    probability: f64,
    odds:        Option<f64>,
}

impl<'a> From<&DrawResult<'a>> for DrawLine<'a> {
    fn from(result: &DrawResult<'a>) -> Self {
        let entry = result.entry;
        Self {
            rank:        result.rank,
            id:          &entry.record.id,
            name:        &entry.record.name,
            iso2:        &entry.record.iso2,
            probability: entry.probability,
            odds:        result.odds(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_seed(&args)?;
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let refresh = args.iter().any(|a| a == "--refresh");
    let db = find_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = find_arg(&args, "--data-dir").unwrap_or("./data");

    let config = LotteryConfig::load(data_dir)?;
    let draws = parse_arg(&args, "--draws", config.batch_size);

    if !ipc_mode {
        println!("Birth Lottery - lottery-runner");
        println!("  seed:      {}", seed.map_or("entropy".to_string(), |s| s.to_string()));
        println!("  draws:     {draws}");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!();
    }

    let store = SnapshotStore::open(db)?;
    store.migrate()?;
    if refresh {
        log::info!("--refresh: discarding cached snapshot");
        store.clear_snapshot()?;
    }

    let source = FileSource::new(config.worldbank_path(data_dir));
    let loaded = load_distribution(&store, &source, &config, chrono::Utc::now());

    if ipc_mode {
        return run_ipc_loop(loaded.map(|(d, _)| d), seed, &config);
    }

    let (distribution, status) = loaded?;
    let mut session = match seed {
        Some(s) => DrawSession::new(distribution, s),
        None => DrawSession::from_entropy(distribution),
    };
    print_distribution(session.distribution(), status);
    let results = session.draw_batch(draws)?;
    print_draws(&results);
    Ok(())
}

fn run_ipc_loop(
    loaded: birth_lottery_core::error::LotteryResult<Distribution>,
    seed: Option<u64>,
    config: &LotteryConfig,
) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    // A failed load still answers get_data with the failure contract.
    let data = respond(&loaded);
    let mut session = loaded.ok().map(|d| match seed {
        Some(s) => DrawSession::new(d, s),
        None => DrawSession::from_entropy(d),
    });

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let reply = match (cmd, session.as_mut()) {
            (IpcCommand::Quit, _) => break,
            (IpcCommand::GetData, _) => serde_json::to_value(&data)?,
            (_, None) => serde_json::to_value(DataResponse::failure("data unavailable"))?,
            (IpcCommand::Draw, Some(s)) => match s.draw() {
                Ok(result) => draw_reply(&[result])?,
                Err(e) => serde_json::json!({ "error": e.to_string() }),
            },
            (IpcCommand::DrawBatch { count }, Some(s)) => {
                match s.draw_batch(count.unwrap_or(config.batch_size)) {
                    Ok(results) => draw_reply(&results)?,
                    Err(e) => serde_json::json!({ "error": e.to_string() }),
                }
            }
            (IpcCommand::Lookup { code }, Some(s)) => match lookup_row(s.distribution(), &code) {
                Ok(row) => serde_json::to_value(&row)?,
                Err(e) => serde_json::json!({ "error": e.to_string() }),
            },
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn draw_reply(results: &[DrawResult<'_>]) -> Result<serde_json::Value> {
    let reply = DrawReply {
        draws:   results.iter().map(DrawLine::from).collect(),
        summary: BatchSummary::from_results(results),
    };
    Ok(serde_json::to_value(&reply)?)
}

fn print_distribution(distribution: &Distribution, status: CacheStatus) {
    println!("=== DISTRIBUTION ({status:?}) ===");
    println!("  eligible:      {}", distribution.eligible_count());
    println!("  total births:  {:.0}", distribution.total_weight());
    for entry in distribution.entries().iter().take(10) {
        let marker = if entry.eligible { " " } else { "x" };
        println!(
            "  {marker} {:<3} {:<28} births {:>12.0}  p {:>10.6}%",
            entry.record.id, entry.record.name, entry.record.births, entry.probability
        );
    }
    println!();
    println!("=== REGIONS ===");
    for (region, share) in distribution.share_by_region() {
        println!("  {region:<28} {share:>10.6}%");
    }
    println!();
}

fn print_draws(results: &[DrawResult<'_>]) {
    println!("=== DRAWS ===");
    for result in results {
        let line = DrawLine::from(result);
        println!(
            "  #{:<2} {:<3} {:<28} {:>10.6}%  (1 in {:.1})",
            line.rank.unwrap_or(0),
            line.id,
            line.name,
            line.probability,
            line.odds.unwrap_or(f64::INFINITY)
        );
    }
    println!();
    println!("=== SUMMARY ===");
    for tally in BatchSummary::from_results(results).lines {
        println!("  {:<28} x{}", tally.name, tally.count);
    }
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

/// `--seed` has no default to fall back to; a bad value is an error.
fn parse_seed(args: &[String]) -> Result<Option<u64>> {
    match find_arg(args, "--seed") {
        None => Ok(None),
        Some(raw) => match raw.parse() {
            Ok(seed) => Ok(Some(seed)),
            Err(e) => anyhow::bail!("invalid --seed {raw:?}: {e}"),
        },
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    find_arg(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

//! Replays a recorded Cricsheet match through the scoring engine and prints
//! the scorecard snapshot after every applied delivery.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use scoring::events::EventPayload;
use scoring::feed::{match_id_from_info_path, read_info_file, DeliveryReader};
use scoring::{Dispatcher, MatchRegistry, ScoringConfig};
use types::ids::MatchId;

#[derive(Parser, Debug)]
#[command(name = "scorecard-replay", version, about = "Replay a Cricsheet match ball by ball")]
struct Args {
    /// Match info file (e.g. 335982_info.csv)
    #[arg(long)]
    info: PathBuf,

    /// Deliveries file (e.g. 335982.csv or all_matches.csv)
    #[arg(long)]
    deliveries: PathBuf,

    /// Match id; defaults to the info file name prefix
    #[arg(long)]
    match_id: Option<String>,

    /// Print only the final snapshot
    #[arg(long)]
    final_only: bool,

    /// Pretty-print snapshot JSON
    #[arg(long)]
    pretty: bool,
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = ScoringConfig::from_env().context("Invalid scoring configuration")?;

    let match_id = match &args.match_id {
        Some(id) => MatchId::try_new(id.as_str()).context("Match id must not be empty")?,
        None => match_id_from_info_path(&args.info)
            .with_context(|| format!("Cannot derive match id from {}", args.info.display()))?,
    };

    tracing::info!(match_id = %match_id, "Starting scorecard replay");

    let registry = MatchRegistry::new();
    let dispatcher = Dispatcher::new(&registry, config);

    for event in read_info_file(&match_id, &args.info).context("Failed to read info file")? {
        // Rejections are logged and counted by the dispatcher.
        let _ = dispatcher.dispatch(&event);
    }

    let deliveries = DeliveryReader::open(&args.deliveries).context("Failed to open deliveries file")?;
    for event in deliveries {
        let event = match event {
            Ok(event) if event.match_id == match_id => event,
            Ok(_) => continue,
            Err(err) => {
                tracing::warn!(error = %err, "Skipping undecodable row");
                continue;
            }
        };

        let is_delivery = matches!(event.payload, EventPayload::Delivery(_));
        if dispatcher.dispatch(&event).is_ok() && is_delivery && !args.final_only {
            print_json(&registry.snapshot(&match_id)?, args.pretty)?;
        }
    }

    let snapshot = registry.snapshot(&match_id)?;
    if args.final_only {
        print_json(&snapshot, args.pretty)?;
    }

    let metrics = dispatcher.metrics().snapshot();
    tracing::info!(
        score = %snapshot.score_line(),
        events_applied = metrics.events_applied,
        events_rejected = metrics.events_rejected,
        mutations_applied = metrics.mutations_applied,
        "Replay finished"
    );

    Ok(())
}

//! score-runner: headless churn and CLV scoring for a customer cohort.
//!
//! Usage:
//!   score-runner --orders orders.json --as-of 2024-06-01T00:00:00Z
//!   score-runner --aggregates customers.json --sort clv --json
//!   score-runner --synthetic 200 --seed 42 --campaigns
//!   score-runner --ipc-mode --config scoring.json

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use retention_core::{
    build_aggregates,
    cohort::{plan_campaigns, rank, CohortSummary, Direction, SortKey},
    synthetic::SyntheticOrders,
    BatchOutcome, Clock, CustomerAggregate, CustomerSegment, FixedClock, OrderRecord,
    Prediction, ScoringConfig, ScoringEngine, SystemClock,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Score { customer: CustomerAggregate },
    ScoreBatch { customers: Vec<CustomerAggregate> },
    Quit,
}

/// One scored row as shown to dashboards: the semantic segment plus its
/// display style tag.
#[derive(serde::Serialize)]
struct PredictionView<'a> {
    customer_id:     &'a str,
    segment_label:   &'static str,
    segment_style:   &'static str,
    actions:         Vec<&'static str>,
    #[serde(flatten)]
    prediction:      &'a Prediction,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let synthetic = parse_arg(&args, "--synthetic", 0usize);
    let json_output = has_flag(&args, "--json");
    let show_campaigns = has_flag(&args, "--campaigns");
    let ipc_mode = has_flag(&args, "--ipc-mode");
    let sort_key: SortKey = flag_value(&args, "--sort")
        .unwrap_or("churn")
        .parse()
        .map_err(anyhow::Error::msg)?;

    let config = match flag_value(&args, "--config") {
        Some(path) => ScoringConfig::load(path)?,
        None => ScoringConfig::default(),
    };
    let engine = ScoringEngine::new(config)?;

    let clock: Box<dyn Clock> = match flag_value(&args, "--as-of") {
        Some(raw) => {
            let instant = DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("--as-of must be RFC 3339, got {raw}"))?
                .with_timezone(&Utc);
            Box::new(FixedClock::at(instant))
        }
        None => Box::new(SystemClock),
    };

    if ipc_mode {
        return run_ipc_loop(&engine, clock.as_ref());
    }

    let customers = load_customers(&args, synthetic, seed, clock.as_ref())?;

    if !json_output {
        println!("score-runner");
        println!("  customers: {}", customers.len());
        println!("  sort:      {sort_key:?}");
        println!();
    }

    let mut outcome = engine.score_batch(&customers, clock.as_ref());
    rank(&mut outcome.scored, sort_key, Direction::Descending);

    if json_output {
        print_json(&outcome)?;
    } else {
        print_table(&outcome);
        print_summary(&outcome);
    }
    if show_campaigns {
        print_campaigns(&outcome);
    }
    Ok(())
}

fn load_customers(
    args: &[String],
    synthetic: usize,
    seed: u64,
    clock: &dyn Clock,
) -> Result<Vec<CustomerAggregate>> {
    if let Some(path) = flag_value(args, "--aggregates") {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        return Ok(serde_json::from_str(&content)?);
    }

    let orders: Vec<OrderRecord> = if let Some(path) = flag_value(args, "--orders") {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        serde_json::from_str(&content)?
    } else if synthetic > 0 {
        SyntheticOrders::new(seed).generate(synthetic, clock.now())
    } else {
        bail!("one of --orders, --aggregates or --synthetic N is required");
    };

    log::info!("loaded {} orders", orders.len());
    Ok(build_aggregates(&orders)?)
}

fn run_ipc_loop(engine: &ScoringEngine, clock: &dyn Clock) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Score { customer } => {
                let reply = match engine.score(&customer, std::slice::from_ref(&customer), clock.now()) {
                    Ok(prediction) => serde_json::to_value(view(&customer.identifier, &prediction))?,
                    Err(e) => serde_json::json!({ "error": e.to_string() }),
                };
                writeln!(stdout, "{reply}")?;
            }
            IpcCommand::ScoreBatch { customers } => {
                let outcome = engine.score_batch(&customers, clock);
                let rows: Vec<PredictionView> = outcome
                    .scored
                    .iter()
                    .map(|c| view(c.customer_id(), &c.prediction))
                    .collect();
                let reply = serde_json::json!({
                    "as_of": outcome.as_of,
                    "scored": rows,
                    "rejected": outcome.rejected,
                });
                writeln!(stdout, "{reply}")?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

/// Display style tag per segment. Presentation only; the core never
/// sees these.
fn segment_style(segment: CustomerSegment) -> &'static str {
    match segment {
        CustomerSegment::Vip     => "badge-purple",
        CustomerSegment::Loyal   => "badge-green",
        CustomerSegment::New     => "badge-blue",
        CustomerSegment::Regular => "badge-gray",
        CustomerSegment::AtRisk  => "badge-orange",
        CustomerSegment::Dormant => "badge-red",
    }
}

fn view<'a>(customer_id: &'a str, prediction: &'a Prediction) -> PredictionView<'a> {
    PredictionView {
        customer_id,
        segment_label: prediction.segment.label(),
        segment_style: segment_style(prediction.segment),
        actions: prediction.recommendation_messages(),
        prediction,
    }
}

fn print_json(outcome: &BatchOutcome) -> Result<()> {
    let mut stdout = io::stdout().lock();
    for c in &outcome.scored {
        writeln!(stdout, "{}", serde_json::to_string(&view(c.customer_id(), &c.prediction))?)?;
    }
    for r in &outcome.rejected {
        writeln!(stdout, "{}", serde_json::json!({ "customer_id": r.customer_id, "error": r.reason }))?;
    }
    Ok(())
}

fn print_table(outcome: &BatchOutcome) {
    println!(
        "{:<36} {:<10} {:<14} {:<7} {:>5} {:>8} {:>6}",
        "customer", "segment", "style", "risk", "churn", "clv", "next",
    );
    for c in &outcome.scored {
        let p = &c.prediction;
        let next = if p.is_overdue() {
            "overdue".to_string()
        } else {
            format!("{}d", p.days_until_next_purchase)
        };
        println!(
            "{:<36} {:<10} {:<14} {:<7} {:>5} {:>8.0} {:>6}",
            c.customer_id(),
            p.segment.label(),
            segment_style(p.segment),
            p.churn_risk.label(),
            p.churn_score,
            p.predicted_clv,
            next,
        );
    }
    for r in &outcome.rejected {
        println!("{:<36} REJECTED: {}", r.customer_id, r.reason);
    }
}

fn print_summary(outcome: &BatchOutcome) {
    let summary = CohortSummary::from_scored(&outcome.scored);

    println!();
    println!("=== COHORT SUMMARY ===");
    println!("  batch_id:        {}", outcome.batch_id);
    println!("  as_of:           {}", outcome.as_of);
    println!("  scored:          {}", summary.customers);
    println!("  rejected:        {}", outcome.rejected.len());
    println!("  avg churn score: {:.1}", summary.avg_churn_score);
    println!("  high risk:       {}", summary.high_risk_count());
    println!("  overdue:         {}", summary.overdue);
    println!("  total spent:     ${:.2}", summary.total_spent);
    println!("  predicted CLV:   ${:.0}", summary.total_predicted_clv);
    println!();
    println!("=== SEGMENTS ===");
    for segment in CustomerSegment::ALL {
        let count = summary.by_segment.get(&segment).copied().unwrap_or(0);
        println!("  {:<10} {count}", segment.label());
    }
}

fn print_campaigns(outcome: &BatchOutcome) {
    println!();
    println!("=== CAMPAIGNS ===");
    let plan = plan_campaigns(&outcome.scored);
    if plan.is_empty() {
        println!("  (no recipients)");
    }
    for list in plan {
        println!("  {} ({} recipients)", list.campaign.label(), list.recipients.len());
        for id in list.recipients {
            println!("    {id}");
        }
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

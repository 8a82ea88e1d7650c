//! cabin-runner: headless and live runner for the cabin CRM engine.
//!
//! Usage:
//!   cabin-runner --seed 12345 --ticks 300
//!   cabin-runner --config cabin.json --live --ticks 10 --briefing
//!   cabin-runner --report "[EMERGENCY_DATA]\nType: Cardiac\nSOP: Assess;Notify\n[/EMERGENCY_DATA]"

use anyhow::{Context, Result};
use cabin_crm_core::{
    alert::{detect_medical_emergency, AlertDesk},
    config::SimConfig,
    cue::{CueSink, LogCueSink},
    engine::SimEngine,
    gateway::{Analyzer, CannedAnalyzer, InsightGateway},
    gemini::{GeminiAnalyzer, AUTH_ENV_VAR},
    session::{DashboardSession, IntakeOutcome},
    snapshot::CabinSnapshot,
};
use chrono::Utc;
use clap::Parser;
use std::{path::PathBuf, sync::Arc, time::Duration};

#[derive(Debug, Parser)]
#[command(name = "cabin-runner", version, about = "Run a simulated cabin CRM session")]
struct Args {
    /// Master seed for every random stream.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to run.
    #[arg(long, default_value_t = 30)]
    ticks: u64,

    /// JSON session config. Defaults to the reference A330 cabin.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tick in real time instead of as fast as possible.
    #[arg(long)]
    live: bool,

    /// Request a crew briefing at the end of the run.
    #[arg(long)]
    briefing: bool,

    /// Request a post-flight debrief at the end of the run.
    #[arg(long)]
    debrief: bool,

    /// Feed this analysis text through emergency detection. Literal `\n`
    /// sequences are read as line breaks.
    #[arg(long, value_parser = parse_report)]
    report: Option<String>,

    /// Print the final snapshot as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimConfig::default(),
    };

    println!("Cabin CRM: cabin-runner");
    println!("  seed:      {}", args.seed);
    println!("  ticks:     {}", args.ticks);
    println!("  phase:     {}", config.flight_phase);
    println!("  tick secs: {}", config.tick_interval_secs);

    let session_id = format!("session-{}-{}", args.seed, Utc::now().timestamp());
    let engine = SimEngine::new(session_id, args.seed, &config)?;
    let cues: Arc<dyn CueSink> = Arc::new(LogCueSink);
    let desk = AlertDesk::new(config.alerts.policy, cues.clone());
    println!("  policy:    {:?}", desk.policy());
    println!();
    let gateway = InsightGateway::new(build_analyzer());

    let snapshot = if args.live {
        run_live(&args, &config, engine, desk, gateway.clone(), cues).await?
    } else {
        run_headless(&args, &config, engine, desk)?
    };

    print_summary(&snapshot);

    if args.briefing {
        let crew_summary = snapshot.crew.iter().map(|c| c.summary_line()).collect::<Vec<_>>();
        let zone_summary = snapshot.zones.iter().map(|z| z.summary_line()).collect::<Vec<_>>();
        let phase = format!("{}: {}", snapshot.flight_phase, config.briefing_label);
        let insight = gateway
            .request_crew_briefing(&crew_summary.join("\n"), &zone_summary.join("\n"), &phase)
            .await;
        println!();
        println!("=== CREW BRIEFING ({:?}) ===", insight.source);
        println!("{}", insight.text);
    }

    if args.debrief {
        let insight = gateway.request_debrief_report(&flight_summary(&snapshot)).await;
        println!();
        println!("=== POST-FLIGHT DEBRIEF ({:?}) ===", insight.source);
        println!("{}", insight.text);
    }

    if args.json {
        println!();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

/// Turns literal `\n` escapes into line breaks.
fn parse_report(raw: &str) -> Result<String, String> {
    Ok(raw.replace("\\r\\n", "\n").replace("\\n", "\n"))
}

fn build_analyzer() -> Arc<dyn Analyzer> {
    match GeminiAnalyzer::from_env() {
        Ok(gemini) => Arc::new(gemini),
        Err(err) => {
            log::warn!("{err}; insight requests will use fallback text");
            Arc::new(CannedAnalyzer::failing(format!("{AUTH_ENV_VAR} not set")))
        }
    }
}

fn run_headless(
    args: &Args,
    config: &SimConfig,
    mut engine: SimEngine,
    mut desk: AlertDesk,
) -> Result<CabinSnapshot> {
    engine.run_ticks(args.ticks)?;

    if let Some(report) = &args.report {
        let detected = detect_medical_emergency(
            report,
            &config.alerts.default_seat,
            &config.alerts.default_crew_name,
            Utc::now(),
        );
        match detected {
            Some(alert) => {
                let outcome = desk.submit(alert)?;
                log::info!("alert outcome: {outcome:?}");
                engine.record_events("alerts", &desk.drain_events())?;
            }
            None => println!("  report: no emergency detected"),
        }
    }

    println!("  journal:   {} entries", engine.journal().len());
    Ok(engine.snapshot(desk.active()))
}

async fn run_live(
    args: &Args,
    config: &SimConfig,
    engine: SimEngine,
    desk: AlertDesk,
    gateway: InsightGateway,
    cues: Arc<dyn CueSink>,
) -> Result<CabinSnapshot> {
    let handle = DashboardSession::start(engine, desk, gateway, cues)?;

    if let Some(report) = &args.report {
        if let Some(alert) = detect_medical_emergency(
            report,
            &config.alerts.default_seat,
            &config.alerts.default_crew_name,
            Utc::now(),
        ) {
            if let IntakeOutcome::Full { alert_id } = handle.intake().try_submit(alert)? {
                println!("  report: intake full, alert {alert_id} dropped");
            }
        }
    }

    let mut views = handle.subscribe();
    let run_for = Duration::from_secs(config.tick_interval_secs * args.ticks);
    let watch_ticks = async {
        while views.changed().await.is_ok() {
            let view = views.borrow_and_update().clone();
            println!(
                "  tick {:>4} | {} | alert: {}",
                view.snapshot.tick,
                view.snapshot.sop_report.status,
                view.snapshot
                    .active_alert
                    .as_ref()
                    .map_or("none", |a| a.category_label())
            );
        }
    };
    // Runs until the deadline; the watch loop only ends if the session dies.
    let _ = tokio::time::timeout(run_for + Duration::from_millis(100), watch_ticks).await;

    let report = handle.shutdown().await?;
    println!("  alerts:    {} raised", report.alerts_raised);
    Ok(report.final_snapshot)
}

fn print_summary(snapshot: &CabinSnapshot) {
    println!();
    println!("=== RUN SUMMARY ===");
    println!("  session:        {}", snapshot.session_id);
    println!("  final tick:     {}", snapshot.tick);
    println!("  elapsed:        {}s", snapshot.elapsed_secs);
    println!("  medical active: {}", snapshot.medical_active);
    if let Some(alert) = &snapshot.active_alert {
        println!(
            "  alert:          {} at seat {} ({})",
            alert.category_label(),
            alert.seat_number,
            alert.sop_brief.join(" → ")
        );
    }

    println!();
    println!("=== CREW ===");
    for member in &snapshot.crew {
        println!(
            "  {:<10} zone {} | fatigue {:>3} | {}",
            member.name,
            member.zone,
            member.fatigue_score,
            member.current_task.map_or("None", |t| t.label())
        );
    }

    println!();
    println!("=== ZONES ===");
    for zone in &snapshot.zones {
        let latency = snapshot.latencies.get(&zone.zone_id).copied().unwrap_or_default();
        println!(
            "  {:<8} staff {}/{} | coverage {:>5.1}% | {latency}ms{}",
            zone.label,
            zone.current_staff_count,
            zone.sop_required_staff,
            zone.coverage,
            if zone.is_overloaded { " | OVERLOADED" } else { "" }
        );
    }

    println!();
    println!("=== SOP REPORT: {} ===", snapshot.sop_report.status);
    for d in &snapshot.sop_report.discrepancies {
        println!("  [{}] {}", d.badge(), d.advisory);
    }
}

fn flight_summary(snapshot: &CabinSnapshot) -> String {
    let crew = snapshot.crew.len().max(1) as f64;
    let avg_fatigue = snapshot.crew.iter().map(|c| c.fatigue_score as f64).sum::<f64>() / crew;
    let overloaded = snapshot.zones.iter().filter(|z| z.is_overloaded).count();
    format!(
        "Phase: {}\nElapsed: {}s\nCrew: {}\nAverage fatigue: {avg_fatigue:.1}\n\
         Overloaded zones: {overloaded}/{}\nSOP status: {}\nMedical active: {}",
        snapshot.flight_phase,
        snapshot.elapsed_secs,
        snapshot.crew.len(),
        snapshot.zones.len(),
        snapshot.sop_report.status,
        snapshot.medical_active
    )
}

//! Live dashboard session: the engine on a real-time tick.
//!
//! One spawned task owns the engine and the alert desk. Everything else
//! talks to it through channels:
//!
//!   control  (mpsc)      acknowledge / dismiss / invalidate / briefing
//!   intake   (mpsc, 1)   detected alerts; a full intake drops the newcomer
//!   insights (mpsc)      briefing results tagged with a view generation
//!   view     (watch)     latest DashboardView, replaced at tick boundaries
//!   shutdown (oneshot)   stop; checked before every other branch
//!
//! Briefing results from an older view generation are discarded.

use crate::{
    alert::{AlertDesk, AlertOutcome},
    cue::{AudioCue, CueSink},
    engine::SimEngine,
    entity::EmergencyAlert,
    error::{SimError, SimResult},
    event::SimEvent,
    gateway::{Insight, InsightGateway},
    snapshot::CabinSnapshot,
    types::Tick,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

const CONTROL_BUFFER: usize = 16;
const ALERT_INTAKE_DEPTH: usize = 1;

/// What presentation renders. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub snapshot:        CabinSnapshot,
    pub briefing:        Option<Insight>,
    pub view_generation: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub ticks:          Tick,
    pub alerts_raised:  u64,
    pub final_snapshot: CabinSnapshot,
}

#[derive(Debug)]
enum SessionCommand {
    Acknowledge,
    Dismiss,
    InvalidateView,
    RequestBriefing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntakeOutcome {
    Accepted,
    /// Another alert is already waiting; this one was not queued.
    Full { alert_id: String },
}

/// Cloneable entry point for alert producers (voice flow, runner).
#[derive(Debug, Clone)]
pub struct AlertIntake {
    tx: mpsc::Sender<EmergencyAlert>,
}

impl AlertIntake {
    pub fn try_submit(&self, alert: EmergencyAlert) -> SimResult<IntakeOutcome> {
        match self.tx.try_send(alert) {
            Ok(()) => Ok(IntakeOutcome::Accepted),
            Err(mpsc::error::TrySendError::Full(alert)) => {
                log::warn!("alert intake full; dropping {}", alert.id);
                Ok(IntakeOutcome::Full { alert_id: alert.id })
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(SimError::SessionClosed),
        }
    }
}

pub struct DashboardSession;

impl DashboardSession {
    /// Spawn the session loop. Must be called inside a tokio runtime.
    /// The first tick fires one tick interval after start.
    pub fn start(
        mut engine: SimEngine,
        desk: AlertDesk,
        gateway: InsightGateway,
        cues: Arc<dyn CueSink>,
    ) -> SimResult<SessionHandle> {
        engine.begin()?;

        let initial = DashboardView {
            snapshot:        engine.snapshot(desk.active()),
            briefing:        None,
            view_generation: 0,
        };
        let (view_tx, view_rx) = watch::channel(initial);
        let (control_tx, control_rx) = mpsc::channel(CONTROL_BUFFER);
        let (intake_tx, intake_rx) = mpsc::channel(ALERT_INTAKE_DEPTH);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let session = SessionLoop {
            engine,
            desk,
            gateway,
            cues,
            view_tx,
            briefing: None,
            view_generation: 0,
            alerts_raised: 0,
        };
        let task = tokio::spawn(session.run(control_rx, intake_rx, shutdown_rx));

        Ok(SessionHandle {
            control:  control_tx,
            intake:   AlertIntake { tx: intake_tx },
            view:     view_rx,
            shutdown: Some(shutdown_tx),
            task:     Some(task),
        })
    }
}

/// Owner's side of a running session. Dropping it stops the session.
pub struct SessionHandle {
    control:  mpsc::Sender<SessionCommand>,
    intake:   AlertIntake,
    view:     watch::Receiver<DashboardView>,
    shutdown: Option<oneshot::Sender<()>>,
    task:     Option<JoinHandle<SimResult<SessionReport>>>,
}

impl SessionHandle {
    pub fn intake(&self) -> AlertIntake {
        self.intake.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.view.clone()
    }

    pub fn current_view(&self) -> DashboardView {
        self.view.borrow().clone()
    }

    pub async fn acknowledge_alert(&self) -> SimResult<()> {
        self.send(SessionCommand::Acknowledge).await
    }

    pub async fn dismiss_alert(&self) -> SimResult<()> {
        self.send(SessionCommand::Dismiss).await
    }

    /// Start a new view generation; in-flight briefings are discarded.
    pub async fn invalidate_view(&self) -> SimResult<()> {
        self.send(SessionCommand::InvalidateView).await
    }

    /// Ask for a crew briefing of the current cabin.
    pub async fn request_briefing(&self) -> SimResult<()> {
        self.send(SessionCommand::RequestBriefing).await
    }

    async fn send(&self, command: SessionCommand) -> SimResult<()> {
        self.control.send(command).await.map_err(|_| SimError::SessionClosed)
    }

    /// Stop the loop and wait for it. No tick fires after this returns.
    pub async fn shutdown(mut self) -> SimResult<SessionReport> {
        if let Some(stop) = self.shutdown.take() {
            let _ = stop.send(());
        }
        let task = self.task.take().ok_or(SimError::SessionClosed)?;
        task.await
            .map_err(|e| SimError::Other(anyhow::anyhow!("session task failed: {e}")))?
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if let Some(stop) = self.shutdown.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

struct SessionLoop {
    engine:          SimEngine,
    desk:            AlertDesk,
    gateway:         InsightGateway,
    cues:            Arc<dyn CueSink>,
    view_tx:         watch::Sender<DashboardView>,
    briefing:        Option<Insight>,
    view_generation: u64,
    alerts_raised:   u64,
}

impl SessionLoop {
    async fn run(
        mut self,
        mut control_rx: mpsc::Receiver<SessionCommand>,
        mut intake_rx: mpsc::Receiver<EmergencyAlert>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) -> SimResult<SessionReport> {
        let period = self.engine.clock.tick_interval();
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let (insight_tx, mut insight_rx) = mpsc::unbounded_channel::<(u64, Insight)>();

        log::info!("session {} live, tick every {period:?}", self.engine.session_id);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown_rx => break,
                Some(command) = control_rx.recv() => {
                    self.handle_command(command, &insight_tx)?;
                }
                Some(alert) = intake_rx.recv() => {
                    self.submit_alert(alert)?;
                }
                Some((generation, insight)) = insight_rx.recv() => {
                    self.accept_insight(generation, insight);
                }
                _ = ticker.tick() => {
                    let events = self.engine.tick()?;
                    self.play_fatigue_cues(&events);
                    self.publish();
                }
            }
        }

        self.engine.clock.pause();
        log::info!(
            "session {} stopped at tick {}",
            self.engine.session_id,
            self.engine.clock.current_tick
        );
        Ok(SessionReport {
            ticks:          self.engine.clock.current_tick,
            alerts_raised:  self.alerts_raised,
            final_snapshot: self.engine.snapshot(self.desk.active()),
        })
    }

    fn handle_command(
        &mut self,
        command: SessionCommand,
        insight_tx: &mpsc::UnboundedSender<(u64, Insight)>,
    ) -> SimResult<()> {
        match command {
            SessionCommand::Acknowledge => {
                self.desk.acknowledge();
                self.flush_alert_events()?;
            }
            SessionCommand::Dismiss => {
                self.desk.dismiss();
                self.flush_alert_events()?;
            }
            SessionCommand::InvalidateView => {
                self.view_generation += 1;
                self.briefing = None;
                log::debug!("view generation now {}", self.view_generation);
            }
            SessionCommand::RequestBriefing => {
                let generation = self.view_generation;
                let gateway = self.gateway.clone();
                let tx = insight_tx.clone();
                let crew_summary = self.engine.state().crew_summary();
                let zone_summary = self.engine.state().zone_summary();
                let phase = self.engine.briefing_phase();
                tokio::spawn(async move {
                    let insight = gateway
                        .request_crew_briefing(&crew_summary, &zone_summary, &phase)
                        .await;
                    let _ = tx.send((generation, insight));
                });
                return Ok(());
            }
        }
        self.publish();
        Ok(())
    }

    fn submit_alert(&mut self, alert: EmergencyAlert) -> SimResult<()> {
        match self.desk.submit(alert) {
            Ok(AlertOutcome::Raised { .. } | AlertOutcome::Replaced { .. }) => {
                self.alerts_raised += 1;
            }
            Ok(AlertOutcome::Dropped { .. }) => {}
            Err(SimError::AlertSlotOccupied { active_id, incoming_id }) => {
                log::warn!("alert {incoming_id} rejected; {active_id} still active");
            }
            Err(err) => return Err(err),
        }
        self.flush_alert_events()?;
        self.publish();
        Ok(())
    }

    fn accept_insight(&mut self, generation: u64, insight: Insight) {
        if generation != self.view_generation {
            log::debug!(
                "discarding {:?} insight from generation {generation} (now {})",
                insight.kind,
                self.view_generation
            );
            return;
        }
        self.briefing = Some(insight);
        self.publish();
    }

    fn play_fatigue_cues(&self, events: &[SimEvent]) {
        for event in events {
            if let SimEvent::FatigueThresholdCrossed { .. } = event {
                self.cues.play(AudioCue::FATIGUE);
            }
        }
    }

    fn flush_alert_events(&mut self) -> SimResult<()> {
        let events = self.desk.drain_events();
        self.engine.record_events("alerts", &events)
    }

    fn publish(&self) {
        let view = DashboardView {
            snapshot:        self.engine.snapshot(self.desk.active()),
            briefing:        self.briefing.clone(),
            view_generation: self.view_generation,
        };
        self.view_tx.send_replace(view);
    }
}

//! Sentry tactical state machine.
//!
//! Awareness bookkeeping runs every tick; the state decision only runs when
//! the sentry's randomized evaluation interval has elapsed. Both are pure
//! functions over `Tactics` plus whatever the caller observed this tick.

use std::collections::BTreeSet;

use glam::DVec3;
use rand::Rng;

use dronewar_core::components::Tactics;
use dronewar_core::constants::*;
use dronewar_core::enums::TacticalState;

/// What the sentry should do after an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TacticalDecision {
    /// Keep the current state and target.
    Hold,
    /// Patrol toward a fresh random point.
    Patrol,
    /// Find cover from the last known threat origin.
    Hide,
    /// Chase the given drone.
    Pursue(u32),
}

impl TacticalDecision {
    /// The state this decision leads to, given the current one.
    pub fn resulting_state(self, current: TacticalState) -> TacticalState {
        match self {
            TacticalDecision::Hold => current,
            TacticalDecision::Patrol => TacticalState::Patrolling,
            TacticalDecision::Hide => TacticalState::Hiding,
            TacticalDecision::Pursue(_) => TacticalState::Pursuing,
        }
    }
}

/// Input to one evaluation.
pub struct SentryContext {
    pub state: TacticalState,
    pub threat_level: f64,
    pub detector_count: usize,
    pub last_detection_ms: Option<f64>,
    pub now_ms: f64,
    /// Most vulnerable drone in reach, if any. Only consulted when detected.
    pub vulnerable_target: Option<u32>,
}

/// Output of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TacticalUpdate {
    pub decision: TacticalDecision,
    pub new_state: TacticalState,
    pub threat_level: f64,
    pub state_changed: bool,
}

/// Record this tick's detectors. Returns true on the undetected-to-detected
/// edge, which is also when threat rises.
pub fn update_awareness(
    tactics: &mut Tactics,
    detectors: BTreeSet<u32>,
    detector_centroid: Option<DVec3>,
    now_ms: f64,
) -> bool {
    if tactics.state.is_destroyed() {
        return false;
    }

    let was_detected = tactics.is_detected();
    tactics.detected_by = detectors;
    if !tactics.is_detected() {
        return false;
    }

    tactics.last_detection_ms = Some(now_ms);
    if let Some(origin) = detector_centroid {
        tactics.last_threat_origin = Some(origin);
    }
    if !was_detected {
        tactics.threat_level += THREAT_DETECTION_INCREMENT;
        return true;
    }
    false
}

/// Whether the evaluation interval has elapsed.
pub fn evaluation_due(tactics: &Tactics, now_ms: f64) -> bool {
    !tactics.state.is_destroyed()
        && now_ms - tactics.last_evaluation_ms > tactics.evaluation_interval_ms
}

/// Draw a fresh evaluation interval for a sentry.
pub fn random_evaluation_interval<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(EVALUATION_INTERVAL_MIN_MS..EVALUATION_INTERVAL_MAX_MS)
}

/// Evaluate the state machine once.
pub fn evaluate(ctx: &SentryContext) -> TacticalUpdate {
    if ctx.state.is_destroyed() {
        return TacticalUpdate {
            decision: TacticalDecision::Hold,
            new_state: ctx.state,
            threat_level: ctx.threat_level,
            state_changed: false,
        };
    }

    let (decision, threat_level) = if ctx.detector_count > 0 {
        (evaluate_detected(ctx), ctx.threat_level)
    } else {
        evaluate_undetected(ctx)
    };

    let new_state = decision.resulting_state(ctx.state);
    TacticalUpdate {
        decision,
        new_state,
        threat_level,
        state_changed: new_state != ctx.state,
    }
}

fn evaluate_detected(ctx: &SentryContext) -> TacticalDecision {
    if ctx.threat_level > THREAT_HIDE_THRESHOLD || ctx.detector_count >= HIDE_DETECTOR_COUNT {
        return TacticalDecision::Hide;
    }
    match ctx.vulnerable_target {
        Some(id) => TacticalDecision::Pursue(id),
        None => TacticalDecision::Hide,
    }
}

fn evaluate_undetected(ctx: &SentryContext) -> (TacticalDecision, f64) {
    // A sentry that was never seen has been unseen forever.
    let since = ctx
        .last_detection_ms
        .map(|t| ctx.now_ms - t)
        .unwrap_or(f64::INFINITY);

    if since <= RECENT_DETECTION_MS {
        return (TacticalDecision::Hold, ctx.threat_level);
    }

    let decayed = (ctx.threat_level - THREAT_DECAY).max(0.0);
    if since > PATROL_RESUME_MS {
        (TacticalDecision::Patrol, decayed)
    } else {
        (TacticalDecision::Hide, decayed)
    }
}

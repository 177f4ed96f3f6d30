//! TurnByTurnEngine - next maneuver, distance to it, and what to say.

use geodesy::{distance_meters, Coordinate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use wayguide_providers::{ManeuverType, RouteStep};

use super::deviation::DeviationDetector;
use crate::config::GuidanceConfig;
use crate::localizer::{localize, Language};
use crate::types::Instruction;

/// Where the walker is along a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepLocation {
    /// Step whose end is nearest to the walker
    pub current_index: usize,
    /// Next actionable step at or after the current one
    pub next_turn_index: Option<usize>,
    /// Route distance to that step, or to the end of the route (meters, never negative)
    pub distance_to_turn_m: f64,
}

impl StepLocation {
    /// Whether the next maneuver belongs to the current step.
    pub fn turn_is_current(&self) -> bool {
        self.next_turn_index == Some(self.current_index)
    }
}

/// Locate the walker on `steps`. Returns `None` for an empty route.
pub fn locate_current_step(
    steps: &[RouteStep],
    position: &Coordinate,
    total_distance_m: f64,
) -> Option<StepLocation> {
    let (current_index, _) = steps
        .iter()
        .enumerate()
        .map(|(i, step)| (i, distance_meters(position, &step.end)))
        .min_by(|a, b| a.1.total_cmp(&b.1))?;

    let next_turn_index = steps[current_index..]
        .iter()
        .position(RouteStep::is_actionable)
        .map(|offset| current_index + offset);

    let current_cumulative = steps[current_index].cumulative_distance_m;
    let distance = match next_turn_index {
        Some(j) => steps[j].cumulative_distance_m - current_cumulative,
        None => total_distance_m - current_cumulative,
    };

    Some(StepLocation {
        current_index,
        next_turn_index,
        distance_to_turn_m: distance.max(0.0),
    })
}

/// Turn-by-turn instruction calculator for one route.
///
/// Stateless with respect to the route itself; remembers only what was last
/// spoken and the deviation history, so one engine follows one walker.
#[derive(Debug, Clone)]
pub struct TurnByTurnEngine {
    config: GuidanceConfig,
    deviation: DeviationDetector,
    last_spoken: Option<String>,
    last_continue_band: Option<i64>,
}

impl TurnByTurnEngine {
    pub fn new() -> Self {
        Self::with_config(GuidanceConfig::default())
    }

    pub fn with_config(config: GuidanceConfig) -> Self {
        let deviation = DeviationDetector::new(config.deviation_raise_m, config.deviation_clear_m);
        Self {
            config,
            deviation,
            last_spoken: None,
            last_continue_band: None,
        }
    }

    pub fn config(&self) -> &GuidanceConfig {
        &self.config
    }

    /// Build the instruction for `position`, or `None` for an empty route.
    ///
    /// With no actionable step ahead the instruction is a `continue` over the
    /// remaining route distance.
    pub fn next_instruction(
        &self,
        steps: &[RouteStep],
        position: &Coordinate,
        total_distance_m: f64,
        language: Language,
    ) -> Option<Instruction> {
        let location = locate_current_step(steps, position, total_distance_m)?;
        Some(self.instruction_at(steps, &location, language))
    }

    /// Build the instruction for an already computed location.
    pub fn instruction_at(
        &self,
        steps: &[RouteStep],
        location: &StepLocation,
        language: Language,
    ) -> Instruction {
        let (maneuver_type, modifier) = location
            .next_turn_index
            .and_then(|j| steps.get(j))
            .and_then(|step| step.maneuver.as_ref())
            .map(|m| (m.kind.clone(), m.modifier.clone()))
            .unwrap_or((ManeuverType::Continue, None));

        let distance_m = location.distance_to_turn_m;
        let text = localize(&maneuver_type, modifier.as_ref(), distance_m, language);

        debug!(
            step = location.current_index,
            next_turn = ?location.next_turn_index,
            distance_m,
            "Instruction computed"
        );

        Instruction {
            text,
            maneuver_type,
            modifier,
            distance_m,
            upcoming: distance_m > self.config.upcoming_distance_m,
        }
    }

    /// Whether `instruction` qualifies for announcement, ignoring repetition.
    pub fn should_announce(&self, instruction: &Instruction, location: &StepLocation) -> bool {
        if instruction.maneuver_type.is_actionable() {
            instruction.distance_m <= self.config.announce_distance_m
                || location.turn_is_current()
                || instruction.maneuver_type.is_always_announced()
        } else {
            self.last_continue_band != Some(self.continue_band(instruction.distance_m))
        }
    }

    /// Decide what to speak for `instruction`, if anything.
    ///
    /// The same text is never returned twice in a row; `continue` instructions
    /// are spoken once per distance band.
    pub fn announce(&mut self, instruction: &Instruction, location: &StepLocation) -> Option<String> {
        if !self.should_announce(instruction, location) {
            return None;
        }
        if self.last_spoken.as_deref() == Some(instruction.text.as_str()) {
            return None;
        }

        if !instruction.maneuver_type.is_actionable() {
            self.last_continue_band = Some(self.continue_band(instruction.distance_m));
        }
        self.last_spoken = Some(instruction.text.clone());
        Some(instruction.text.clone())
    }

    /// Speak an arbitrary message (turn-around, arrival) under the no-repeat rule.
    pub fn announce_text(&mut self, text: &str) -> Option<String> {
        if self.last_spoken.as_deref() == Some(text) {
            return None;
        }
        self.last_spoken = Some(text.to_string());
        Some(text.to_string())
    }

    fn continue_band(&self, distance_m: f64) -> i64 {
        (distance_m / self.config.continue_repeat_m.max(1.0)).floor() as i64
    }

    /// Feed a distance-to-destination sample to the wrong-direction detector.
    pub fn observe_distance(&mut self, distance_to_destination_m: f64) -> bool {
        self.deviation.observe(distance_to_destination_m)
    }

    pub fn is_deviating(&self) -> bool {
        self.deviation.is_deviating()
    }

    /// Whether the walker is within the arrival radius.
    pub fn is_arrival(&self, distance_to_destination_m: f64) -> bool {
        distance_to_destination_m < self.config.arrival_radius_m
    }

    /// Forget spoken history and deviation state for a new route.
    pub fn reset(&mut self) {
        self.deviation.reset();
        self.last_spoken = None;
        self.last_continue_band = None;
    }
}

impl Default for TurnByTurnEngine {
    fn default() -> Self {
        Self::new()
    }
}

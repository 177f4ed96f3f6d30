//! NavigationStateMachine - owns the phase and context of one session.
//!
//! Every operation takes the write guard once, mutates, and publishes exactly
//! one event while the guard is still held, so subscribers observe changes in
//! the order they were applied.

use chrono::Utc;
use geodesy::Coordinate;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, RwLock};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use wayguide_providers::{Destination, SessionStore, StoreError};

use super::context::{SessionContext, SessionSnapshot};
use super::events::{SessionEvent, SessionEventKind};
use super::phase::NavigationPhase;
use crate::config::WayguideConfig;
use crate::localizer::Language;
use crate::types::Result;

#[derive(Debug, Clone)]
struct MachineState {
    phase: NavigationPhase,
    context: SessionContext,
}

impl MachineState {
    /// Move along an allowed edge if its guard holds, applying the phase's implied flags.
    fn enter(&mut self, to: NavigationPhase, arrival_radius_m: f64) -> bool {
        let from = self.phase;
        if !from.can_transition_to(to) {
            warn!(from = %from, to = %to, "Transition not allowed");
            return false;
        }

        match to {
            NavigationPhase::Navigating
                if !(self.context.destination_validated
                    && self.context.location_permission_granted) =>
            {
                warn!(
                    validated = self.context.destination_validated,
                    permission = self.context.location_permission_granted,
                    "Cannot start navigating yet"
                );
                return false;
            }
            NavigationPhase::Arrived
                if !self
                    .context
                    .distance_to_destination_m
                    .is_some_and(|d| d < arrival_radius_m) =>
            {
                warn!(
                    distance_m = ?self.context.distance_to_destination_m,
                    "Arrival refused outside arrival radius"
                );
                return false;
            }
            _ => {}
        }

        self.phase = to;
        match (from, to) {
            (NavigationPhase::Arrived, NavigationPhase::Welcome) => {
                self.context = self.context.preferences_only();
            }
            (_, NavigationPhase::DestinationInput) => self.context.clear_destination(),
            _ => {}
        }
        self.context.navigating = to == NavigationPhase::Navigating;
        self.context.arrived = to == NavigationPhase::Arrived;

        info!(from = %from, to = %to, "Phase transition");
        true
    }
}

/// Finite state machine for one guidance session.
pub struct NavigationStateMachine {
    session_id: Uuid,
    config: WayguideConfig,
    state: RwLock<MachineState>,
    events: broadcast::Sender<SessionEvent>,
    sequence: AtomicU64,
}

impl NavigationStateMachine {
    /// Create a machine with default configuration.
    pub fn new() -> Self {
        Self::with_config(WayguideConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(config: WayguideConfig) -> Self {
        let (events, _) = broadcast::channel(config.session.event_buffer.max(1));
        let session_id = Uuid::new_v4();
        let context = SessionContext::with_language(config.session.default_language);

        info!(session_id = %session_id, "Guidance session created");

        Self {
            session_id,
            config,
            state: RwLock::new(MachineState {
                phase: NavigationPhase::Welcome,
                context,
            }),
            events,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &WayguideConfig {
        &self.config
    }

    pub async fn phase(&self) -> NavigationPhase {
        self.state.read().await.phase
    }

    pub async fn context(&self) -> SessionContext {
        self.state.read().await.context.clone()
    }

    pub async fn language(&self) -> Language {
        self.state.read().await.context.language
    }

    /// Current `{phase, context}` pair.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        SessionSnapshot {
            phase: state.phase,
            context: state.context.clone(),
            saved_at: Utc::now(),
        }
    }

    /// Receive every change event from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Change events as a stream. Events missed by a lagging consumer are skipped.
    pub fn changes(&self) -> impl Stream<Item = SessionEvent> + Send + 'static {
        BroadcastStream::new(self.events.subscribe()).filter_map(|item| match item {
            Ok(event) => Some(event),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "Change stream lagged");
                None
            }
        })
    }

    /// Apply `f` under the write guard and publish one event if anything changed.
    ///
    /// Returns whether the phase changed.
    async fn mutate<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut MachineState, f64),
    {
        let mut state = self.state.write().await;
        let before_phase = state.phase;
        let before_context = state.context.clone();

        f(&mut *state, self.config.guidance.arrival_radius_m);

        let transitioned = state.phase != before_phase;
        if transitioned {
            self.publish(SessionEventKind::Transition, before_phase, &state);
        } else if state.context != before_context {
            self.publish(SessionEventKind::ContextUpdate, before_phase, &state);
        }
        transitioned
    }

    fn publish(&self, kind: SessionEventKind, from: NavigationPhase, state: &MachineState) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let event = SessionEvent {
            sequence,
            session_id: self.session_id,
            timestamp: Utc::now(),
            kind,
            from,
            to: state.phase,
            context: state.context.clone(),
        };
        // No receivers is fine
        let _ = self.events.send(event);
        debug!(session_id = %self.session_id, sequence, kind = ?kind, "Session event published");
    }

    /// Move to `to` if the edge exists and its guard holds.
    pub async fn transition_to(&self, to: NavigationPhase) -> bool {
        self.mutate(|state, radius| {
            state.enter(to, radius);
        })
        .await
    }

    /// Record a granted permission and advance where the journey allows it.
    pub async fn grant_location_permission(&self) -> bool {
        self.mutate(|state, radius| {
            state.context.location_permission_granted = true;
            state.context.location_unavailable = false;

            match state.phase {
                NavigationPhase::LocationPermission => {
                    let next = if state.context.destination_validated {
                        NavigationPhase::Navigating
                    } else {
                        NavigationPhase::LanguageSelection
                    };
                    state.enter(next, radius);
                }
                NavigationPhase::DestinationValidation if state.context.destination_validated => {
                    state.enter(NavigationPhase::Navigating, radius);
                }
                _ => {}
            }
        })
        .await
    }

    /// Record a denied permission; guidance will fall back to static narration.
    pub async fn deny_location_permission(&self) -> bool {
        self.mutate(|state, radius| {
            state.context.location_permission_granted = false;
            state.context.location_unavailable = true;

            if state.phase == NavigationPhase::LocationPermission {
                state.enter(NavigationPhase::LanguageSelection, radius);
            }
        })
        .await
    }

    /// Store the language; advances out of language selection.
    pub async fn select_language(&self, code: &str) -> bool {
        let language = Language::from_code(code);
        self.mutate(|state, radius| {
            state.context.language = language;
            if state.phase == NavigationPhase::LanguageSelection {
                state.enter(NavigationPhase::VoiceConsent, radius);
            }
        })
        .await
    }

    /// Store the voice preference; advances out of voice consent.
    pub async fn set_voice_preference(&self, enabled: bool) -> bool {
        self.mutate(|state, radius| {
            state.context.voice_enabled = enabled;
            if state.phase == NavigationPhase::VoiceConsent {
                state.enter(NavigationPhase::DestinationInput, radius);
            }
        })
        .await
    }

    /// Submit a destination code for validation. Only valid in destination input.
    pub async fn submit_destination_code(&self, code: &str) -> bool {
        let code = code.trim().to_string();
        self.mutate(|state, radius| {
            if state.phase != NavigationPhase::DestinationInput {
                warn!(phase = %state.phase, "Destination code submitted outside destination input");
                return;
            }
            if code.is_empty() {
                warn!("Empty destination code ignored");
                return;
            }
            state.context.destination_code = Some(code);
            state.context.destination = None;
            state.context.destination_validated = false;
            state.enter(NavigationPhase::DestinationValidation, radius);
        })
        .await
    }

    /// Report the outcome of destination validation.
    ///
    /// On success the session starts navigating only if permission is already
    /// granted; otherwise it waits in validation for the permission outcome.
    pub async fn validate_destination(&self, success: bool) -> bool {
        self.mutate(|state, radius| {
            if state.phase != NavigationPhase::DestinationValidation {
                warn!(phase = %state.phase, "Validation outside destination validation");
                return;
            }
            apply_validation(state, success, radius);
        })
        .await
    }

    /// Store a looked-up destination and validate it in one step.
    pub async fn accept_destination(&self, destination: Destination) -> bool {
        self.mutate(|state, radius| {
            if state.phase != NavigationPhase::DestinationValidation {
                warn!(phase = %state.phase, "Destination accepted outside destination validation");
                return;
            }
            state.context.destination = Some(destination);
            apply_validation(state, true, radius);
        })
        .await
    }

    /// Record the walker's position and distance to the destination.
    pub async fn record_position(&self, position: Coordinate, distance_to_destination_m: f64) {
        self.mutate(|state, _| {
            state.context.position = Some(position);
            state.context.distance_to_destination_m = Some(distance_to_destination_m);
        })
        .await;
    }

    /// Record a live fix, but only while navigating.
    ///
    /// The phase check and the update happen under one lock, so a fix racing a
    /// transition out of `navigating` is dropped. A recorded fix also clears
    /// `location_unavailable`. Returns whether the fix was recorded.
    pub async fn record_navigation_fix(
        &self,
        position: Coordinate,
        distance_to_destination_m: f64,
    ) -> bool {
        let mut recorded = false;
        self.mutate(|state, _| {
            if state.phase != NavigationPhase::Navigating {
                return;
            }
            state.context.position = Some(position);
            state.context.distance_to_destination_m = Some(distance_to_destination_m);
            state.context.location_unavailable = false;
            recorded = true;
        })
        .await;
        recorded
    }

    pub async fn set_location_unavailable(&self, unavailable: bool) {
        self.mutate(|state, _| state.context.location_unavailable = unavailable)
            .await;
    }

    pub async fn set_routing_failed(&self, failed: bool) {
        self.mutate(|state, _| state.context.routing_failed = failed)
            .await;
    }

    /// `navigating -> arrived`, guarded by the last observed distance.
    pub async fn confirm_arrival(&self) -> bool {
        self.transition_to(NavigationPhase::Arrived).await
    }

    /// `navigating -> recovery`.
    pub async fn request_help(&self) -> bool {
        self.transition_to(NavigationPhase::Recovery).await
    }

    /// `recovery -> navigating`.
    pub async fn resume_navigation(&self) -> bool {
        self.transition_to(NavigationPhase::Navigating).await
    }

    /// Clear the context entirely and return to welcome.
    pub async fn reset(&self) -> bool {
        let mut state = self.state.write().await;
        let from = state.phase;
        state.phase = NavigationPhase::Welcome;
        state.context = SessionContext::with_language(self.config.session.default_language);
        self.publish(SessionEventKind::Reset, from, &state);

        info!(session_id = %self.session_id, from = %from, "Session reset");
        from != NavigationPhase::Welcome
    }

    fn phase_key(&self) -> String {
        format!("{}.phase", self.config.session.storage_prefix)
    }

    fn context_key(&self) -> String {
        format!("{}.context", self.config.session.storage_prefix)
    }

    /// Write the current phase and context to `store`.
    pub async fn persist(&self, store: &dyn SessionStore) -> Result<()> {
        let (phase, context_json) = {
            let state = self.state.read().await;
            (state.phase, serde_json::to_string(&state.context)?)
        };

        store.put(&self.phase_key(), phase.as_str().to_string()).await?;
        store.put(&self.context_key(), context_json).await?;

        debug!(session_id = %self.session_id, phase = %phase, "Session persisted");
        Ok(())
    }

    /// Restore phase and context from `store`.
    ///
    /// `external_code` is the destination code the session was (re)opened with,
    /// if any. It decides whether the stored journey resumes:
    /// - none: back to welcome, destination forgotten, preferences kept
    /// - same as stored: stored phase and context resume
    /// - different: destination replaced, phase becomes destination validation
    ///
    /// An unreadable snapshot is an error and leaves the machine untouched.
    pub async fn restore(
        &self,
        store: &dyn SessionStore,
        external_code: Option<&str>,
    ) -> Result<NavigationPhase> {
        let external_code = external_code
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string);

        let stored = self.load(store).await?;

        let (phase, context) = match (stored, external_code) {
            (None, code) => {
                let mut context =
                    SessionContext::with_language(self.config.session.default_language);
                let phase = match code {
                    Some(code) => {
                        context.destination_code = Some(code);
                        NavigationPhase::DestinationValidation
                    }
                    None => NavigationPhase::Welcome,
                };
                (phase, context)
            }
            (Some((_, mut context)), None) => {
                context.clear_destination();
                (NavigationPhase::Welcome, context)
            }
            (Some((phase, context)), Some(code))
                if context.destination_code.as_deref() == Some(code.as_str()) =>
            {
                (phase, context)
            }
            (Some((_, mut context)), Some(code)) => {
                context.clear_destination();
                context.destination_code = Some(code);
                (NavigationPhase::DestinationValidation, context)
            }
        };

        let mut state = self.state.write().await;
        let from = state.phase;
        state.phase = phase;
        state.context = context;
        self.publish(SessionEventKind::Restored, from, &state);

        info!(session_id = %self.session_id, phase = %phase, "Session restored");
        Ok(phase)
    }

    async fn load(
        &self,
        store: &dyn SessionStore,
    ) -> Result<Option<(NavigationPhase, SessionContext)>> {
        let phase_key = self.phase_key();
        let context_key = self.context_key();

        let raw_phase = store.get(&phase_key).await?;
        let raw_context = store.get(&context_key).await?;

        let (raw_phase, raw_context) = match (raw_phase, raw_context) {
            (None, None) => return Ok(None),
            (Some(phase), Some(context)) => (phase, context),
            (None, Some(_)) => {
                return Err(StoreError::Corrupt {
                    key: phase_key,
                    reason: "missing".to_string(),
                }
                .into())
            }
            (Some(_), None) => {
                return Err(StoreError::Corrupt {
                    key: context_key,
                    reason: "missing".to_string(),
                }
                .into())
            }
        };

        let phase = NavigationPhase::parse(&raw_phase).ok_or_else(|| StoreError::Corrupt {
            key: phase_key,
            reason: format!("unknown phase '{raw_phase}'"),
        })?;

        let context = serde_json::from_str::<SessionContext>(&raw_context).map_err(|e| {
            StoreError::Corrupt {
                key: context_key,
                reason: e.to_string(),
            }
        })?;

        Ok(Some((phase, context)))
    }
}

impl Default for NavigationStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_validation(state: &mut MachineState, success: bool, radius: f64) {
    if success {
        state.context.destination_validated = true;
        if state.context.location_permission_granted {
            state.enter(NavigationPhase::Navigating, radius);
        }
    } else {
        state.context.destination = None;
        state.context.destination_validated = false;
        state.enter(NavigationPhase::DestinationInput, radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GuidanceError;
    use wayguide_providers::MemoryStore;

    fn library() -> Destination {
        Destination::new("City Library", Coordinate::new(6.4541, 3.3947))
    }

    /// Walk the onboarding flow up to destination validation.
    async fn at_validation(machine: &NavigationStateMachine, grant: bool) {
        assert!(machine.transition_to(NavigationPhase::LocationPermission).await);
        if grant {
            assert!(machine.grant_location_permission().await);
        } else {
            assert!(machine.deny_location_permission().await);
        }
        assert!(machine.select_language("fr").await);
        assert!(machine.set_voice_preference(true).await);
        assert!(machine.submit_destination_code("  LIB-01 ").await);
    }

    async fn navigating_machine() -> NavigationStateMachine {
        let machine = NavigationStateMachine::new();
        at_validation(&machine, true).await;
        assert!(machine.accept_destination(library()).await);
        machine
    }

    #[test]
    fn test_new_session_starts_at_welcome() {
        let machine = NavigationStateMachine::new();
        assert_eq!(tokio_test::block_on(machine.phase()), NavigationPhase::Welcome);
        assert_eq!(
            tokio_test::block_on(machine.context()),
            SessionContext::default()
        );
    }

    #[tokio::test]
    async fn test_onboarding_flow() {
        let machine = NavigationStateMachine::new();
        at_validation(&machine, true).await;

        assert_eq!(machine.phase().await, NavigationPhase::DestinationValidation);
        let ctx = machine.context().await;
        assert_eq!(ctx.destination_code.as_deref(), Some("LIB-01"));
        assert_eq!(ctx.language, Language::French);
        assert!(ctx.voice_enabled);
        assert!(ctx.location_permission_granted);
    }

    #[tokio::test]
    async fn test_navigating_requires_validation() {
        let machine = NavigationStateMachine::new();
        at_validation(&machine, true).await;

        assert!(!machine.transition_to(NavigationPhase::Navigating).await);
        assert_eq!(machine.phase().await, NavigationPhase::DestinationValidation);

        assert!(machine.validate_destination(true).await);
        assert_eq!(machine.phase().await, NavigationPhase::Navigating);
        assert!(machine.context().await.navigating);
    }

    #[tokio::test]
    async fn test_validation_waits_for_permission() {
        let machine = NavigationStateMachine::new();
        at_validation(&machine, false).await;

        assert!(!machine.validate_destination(true).await);
        assert_eq!(machine.phase().await, NavigationPhase::DestinationValidation);
        assert!(machine.context().await.destination_validated);
        assert!(machine.context().await.location_unavailable);

        assert!(machine.grant_location_permission().await);
        assert_eq!(machine.phase().await, NavigationPhase::Navigating);
        assert!(!machine.context().await.location_unavailable);
    }

    #[tokio::test]
    async fn test_permission_asked_after_validation() {
        let machine = NavigationStateMachine::new();
        at_validation(&machine, false).await;
        machine.validate_destination(true).await;

        assert!(machine.transition_to(NavigationPhase::LocationPermission).await);
        assert!(machine.grant_location_permission().await);
        assert_eq!(machine.phase().await, NavigationPhase::Navigating);
    }

    #[tokio::test]
    async fn test_failed_validation_returns_to_input() {
        let machine = NavigationStateMachine::new();
        at_validation(&machine, true).await;

        assert!(machine.validate_destination(false).await);
        assert_eq!(machine.phase().await, NavigationPhase::DestinationInput);
        let ctx = machine.context().await;
        assert!(ctx.destination.is_none());
        assert!(!ctx.destination_validated);
    }

    #[tokio::test]
    async fn test_operations_outside_their_phase() {
        let machine = NavigationStateMachine::new();

        assert!(!machine.submit_destination_code("LIB-01").await);
        assert!(!machine.validate_destination(true).await);
        assert!(!machine.confirm_arrival().await);
        assert!(machine.context().await.destination_code.is_none());

        // Preferences stick even without a transition
        assert!(!machine.select_language("es").await);
        assert_eq!(machine.language().await, Language::Spanish);
        assert_eq!(machine.phase().await, NavigationPhase::Welcome);
    }

    #[tokio::test]
    async fn test_empty_code_rejected() {
        let machine = NavigationStateMachine::new();
        machine.transition_to(NavigationPhase::LanguageSelection).await;
        machine.select_language("en").await;
        machine.set_voice_preference(false).await;

        assert!(!machine.submit_destination_code("   ").await);
        assert_eq!(machine.phase().await, NavigationPhase::DestinationInput);
    }

    #[tokio::test]
    async fn test_arrival_radius_boundary() {
        let machine = navigating_machine().await;
        let here = Coordinate::new(6.4541, 3.3947);

        machine.record_position(here, 15.0).await;
        assert!(!machine.confirm_arrival().await);
        assert_eq!(machine.phase().await, NavigationPhase::Navigating);

        machine.record_position(here, 14.9).await;
        assert!(machine.confirm_arrival().await);
        let ctx = machine.context().await;
        assert!(ctx.arrived);
        assert!(!ctx.navigating);
    }

    #[tokio::test]
    async fn test_arrived_to_welcome_keeps_preferences() {
        let machine = navigating_machine().await;
        machine.record_position(Coordinate::new(6.4541, 3.3947), 3.0).await;
        assert!(machine.confirm_arrival().await);

        assert!(machine.transition_to(NavigationPhase::Welcome).await);
        let ctx = machine.context().await;
        assert!(ctx.destination.is_none());
        assert!(ctx.destination_code.is_none());
        assert!(!ctx.arrived);
        assert!(ctx.position.is_none());
        assert_eq!(ctx.language, Language::French);
        assert!(ctx.voice_enabled);
        assert!(ctx.location_permission_granted);
    }

    #[tokio::test]
    async fn test_recovery_roundtrip() {
        let machine = navigating_machine().await;

        assert!(machine.request_help().await);
        assert_eq!(machine.phase().await, NavigationPhase::Recovery);
        assert!(!machine.context().await.navigating);

        assert!(machine.resume_navigation().await);
        assert_eq!(machine.phase().await, NavigationPhase::Navigating);
    }

    #[tokio::test]
    async fn test_navigation_fix_only_while_navigating() {
        let machine = navigating_machine().await;
        let here = Coordinate::new(6.45, 3.39);
        machine.set_location_unavailable(true).await;

        assert!(machine.record_navigation_fix(here, 120.0).await);
        let ctx = machine.context().await;
        assert_eq!(ctx.position, Some(here));
        assert_eq!(ctx.distance_to_destination_m, Some(120.0));
        assert!(!ctx.location_unavailable);

        assert!(machine.request_help().await);
        let elsewhere = Coordinate::new(6.46, 3.40);
        assert!(!machine.record_navigation_fix(elsewhere, 80.0).await);
        let ctx = machine.context().await;
        assert_eq!(ctx.position, Some(here));
        assert_eq!(ctx.distance_to_destination_m, Some(120.0));
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let machine = navigating_machine().await;

        assert!(machine.reset().await);
        assert_eq!(machine.phase().await, NavigationPhase::Welcome);
        assert_eq!(machine.context().await, SessionContext::default());
    }

    #[tokio::test]
    async fn test_events_are_ordered_and_single() {
        let machine = NavigationStateMachine::new();
        let mut rx = machine.subscribe();

        machine.transition_to(NavigationPhase::LocationPermission).await;
        machine.grant_location_permission().await;
        // Rejected transition publishes nothing
        machine.transition_to(NavigationPhase::Arrived).await;
        machine.select_language("es").await;

        let first = rx.recv().await.unwrap();
        assert_eq!(first.sequence, 1);
        assert_eq!(first.kind, SessionEventKind::Transition);
        assert_eq!(first.to, NavigationPhase::LocationPermission);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.sequence, 2);
        assert_eq!(second.from, NavigationPhase::LocationPermission);
        assert_eq!(second.to, NavigationPhase::LanguageSelection);
        assert!(second.context.location_permission_granted);

        let third = rx.recv().await.unwrap();
        assert_eq!(third.sequence, 3);
        assert_eq!(third.to, NavigationPhase::VoiceConsent);
        assert_eq!(third.context.language, Language::Spanish);

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_context_update_event() {
        let machine = navigating_machine().await;
        let mut changes = Box::pin(machine.changes());

        machine.record_position(Coordinate::new(6.45, 3.39), 120.0).await;

        let event = changes.next().await.unwrap();
        assert_eq!(event.kind, SessionEventKind::ContextUpdate);
        assert!(!event.is_transition());
        assert_eq!(event.context.distance_to_destination_m, Some(120.0));
    }

    #[tokio::test]
    async fn test_persist_and_resume_same_code() {
        let store = MemoryStore::new();
        let machine = navigating_machine().await;
        machine.persist(&store).await.unwrap();
        assert_eq!(
            store.get("wayguide.phase").await.unwrap().as_deref(),
            Some("navigating")
        );

        let restored = NavigationStateMachine::new();
        let phase = restored.restore(&store, Some("LIB-01")).await.unwrap();
        assert_eq!(phase, NavigationPhase::Navigating);
        assert_eq!(restored.context().await, machine.context().await);
    }

    #[tokio::test]
    async fn test_restore_without_code_forgets_destination() {
        let store = MemoryStore::new();
        let machine = navigating_machine().await;
        machine.record_position(Coordinate::new(6.45, 3.39), 80.0).await;
        machine.persist(&store).await.unwrap();

        let restored = NavigationStateMachine::new();
        let phase = restored.restore(&store, None).await.unwrap();
        assert_eq!(phase, NavigationPhase::Welcome);

        let ctx = restored.context().await;
        assert!(ctx.destination_code.is_none());
        assert!(ctx.destination.is_none());
        assert!(!ctx.destination_validated && !ctx.navigating);
        assert!(ctx.position.is_none());
        assert_eq!(ctx.language, Language::French);
        assert!(ctx.voice_enabled);
    }

    #[tokio::test]
    async fn test_restore_with_new_code() {
        let store = MemoryStore::new();
        navigating_machine().await.persist(&store).await.unwrap();

        let restored = NavigationStateMachine::new();
        let phase = restored.restore(&store, Some(" MKT-07 ")).await.unwrap();
        assert_eq!(phase, NavigationPhase::DestinationValidation);

        let ctx = restored.context().await;
        assert_eq!(ctx.destination_code.as_deref(), Some("MKT-07"));
        assert!(ctx.destination.is_none());
        assert!(!ctx.destination_validated);
        assert!(ctx.location_permission_granted);
    }

    #[tokio::test]
    async fn test_restore_missing_snapshot() {
        let store = MemoryStore::new();
        let machine = NavigationStateMachine::new();

        assert_eq!(
            machine.restore(&store, None).await.unwrap(),
            NavigationPhase::Welcome
        );
        assert_eq!(
            machine.restore(&store, Some("LIB-01")).await.unwrap(),
            NavigationPhase::DestinationValidation
        );
        assert_eq!(
            machine.context().await.destination_code.as_deref(),
            Some("LIB-01")
        );
    }

    #[tokio::test]
    async fn test_restore_corrupt_snapshot_leaves_state() {
        let store = MemoryStore::new();
        store.put("wayguide.phase", "navigating".into()).await.unwrap();
        store.put("wayguide.context", "{not json".into()).await.unwrap();

        let machine = NavigationStateMachine::new();
        machine.select_language("es").await;
        let before = machine.snapshot().await;

        let err = machine.restore(&store, Some("LIB-01")).await.unwrap_err();
        assert!(matches!(err, GuidanceError::Store(StoreError::Corrupt { .. })));
        assert_eq!(machine.phase().await, before.phase);
        assert_eq!(machine.context().await, before.context);

        store.put("wayguide.phase", "lost".into()).await.unwrap();
        store.put("wayguide.context", "{}".into()).await.unwrap();
        assert!(machine.restore(&store, None).await.is_err());
    }

    #[tokio::test]
    async fn test_storage_prefix() {
        let mut config = WayguideConfig::default();
        config.session.storage_prefix = "kiosk-3".to_string();

        let store = MemoryStore::new();
        NavigationStateMachine::with_config(config)
            .persist(&store)
            .await
            .unwrap();
        assert!(store.get("kiosk-3.phase").await.unwrap().is_some());
        assert!(store.get("wayguide.phase").await.unwrap().is_none());
    }
}

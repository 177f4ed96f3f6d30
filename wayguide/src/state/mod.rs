//! Journey state: phases, session context, change events and the machine that owns them.
//!
//! ```text
//! welcome ────────────────► location_permission | language_selection
//! location_permission ────► language_selection | navigating
//! language_selection ─────► voice_consent
//! voice_consent ──────────► destination_input
//! destination_input ──────► destination_validation
//! destination_validation ─► navigating | destination_input | location_permission
//! navigating ─────────────► arrived | recovery
//! recovery ───────────────► navigating | destination_input
//! arrived ────────────────► welcome | destination_input
//! ```

mod context;
mod events;
mod machine;
mod phase;

pub use context::{SessionContext, SessionSnapshot};
pub use events::{SessionEvent, SessionEventKind};
pub use machine::NavigationStateMachine;
pub use phase::NavigationPhase;

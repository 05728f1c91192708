//! # interviewer-core
//!
//! Interview session state machine.
//!
//! ## Key Types
//!
//! - [`InterviewSession`] - Applies [`Intent`]s and orchestrates model calls
//! - [`SessionView`] - Snapshot of phase, transcript, credits, error and feedback
//! - [`CreditLedger`] - Credit balance shared across a user's sessions
//! - [`ProfileStore`] - Best-effort storage for the user's profile

mod credits;
mod error;
mod intent;
mod machine;
mod profile;
mod providers;
mod state;

pub use credits::{CreditLedger, DEFAULT_STARTING_CREDITS, TOP_UP_CREDITS};
pub use error::{SessionError, APOLOGY_TURN};
pub use intent::Intent;
pub use machine::{InterviewSession, SessionSettings, TranscriptOutput, DEFAULT_REQUEST_TIMEOUT};
pub use profile::{InMemoryProfileStore, JsonProfileStore, ProfileError, ProfileStore, UserProfile};
pub use providers::{
    AuthProvider, AuthSession, PaymentMethod, PaymentProvider, Receipt, SignInProvider,
    SimulatedAuth, SimulatedPayment,
};
pub use state::{InterviewPhase, SessionView};

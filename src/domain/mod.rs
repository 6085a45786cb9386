//! Domain layer: identities, session intent and settings, search results,
//! operation outcomes, and the outcome notifier.
//!
//! Nothing in here talks to a backend; these are the values the
//! coordinator and the gateway exchange.

pub mod event_bus;
pub mod identity;
pub mod intent;
pub mod outcome;
pub mod search_result;
pub mod subscription;

pub use event_bus::OutcomeNotifier;
pub use identity::{GAME_SESSION, LocalPlayerId, SessionName};
pub use intent::{
    Advertisement, MATCH_TYPE_KEY, SessionAttribute, SessionIntent, SessionSearch, SessionSettings,
};
pub use outcome::{JoinResult, OperationKind, SessionOutcome};
pub use search_result::SessionSearchResult;
pub use subscription::{OutcomeFilter, OutcomeSubscription};

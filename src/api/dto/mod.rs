//! Data Transfer Objects for REST request/response serialization.
//!
//! Operation endpoints answer `202 Accepted` with an [`AcceptedResponse`];
//! the operation's outcome arrives later on the WebSocket stream.

pub mod common_dto;
pub mod search_dto;
pub mod session_dto;

pub use common_dto::*;
pub use search_dto::*;
pub use session_dto::*;

// ============================================================================
// Client State Containers
// ============================================================================
//
// What the app screens read from and call into:
// - Session (login, registration, profile, persisted token)
// - OrderBook (order history, checkout, cancel, rate)
// - HomeFeed (restaurants and categories)
// - Location (delivery address)
//
// All of them talk to the server through `DeliveryApi`.
//
// ============================================================================

pub mod api;
pub mod home;
pub mod location;
pub mod orders;
pub mod session;
pub mod storage;

pub use api::{ClientError, DeliveryApi, InProcessApi};
pub use home::HomeFeed;
pub use location::Location;
pub use orders::OrderBook;
pub use session::Session;
pub use storage::{KeyValueStore, MemoryStore, TOKEN_KEY, USER_KEY};

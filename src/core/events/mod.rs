//=========================================================================
// Events
//=========================================================================
//
// Subscriber lists through which the game loop publishes its streams to
// game logic.
//
//=========================================================================

mod channel;

pub use channel::{EventChannel, HandlerError, HandlerResult, Subscription};

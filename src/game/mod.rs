// Round logic: feedback, the session state machine, and the gates around it

pub mod coordinator;
pub mod error;
pub mod feedback;
pub mod limiter;
pub mod selector;
pub mod session;

pub use coordinator::SessionCoordinator;
pub use error::GameError;
pub use feedback::FeedbackEngine;
pub use limiter::DailyLimiter;
pub use selector::WordSelector;
pub use session::GuessResult;

pub mod api;
pub mod clock;
pub mod models;

pub use clock::{Clock, FixedClock, SystemClock};
pub use models::{Choice, Question, MAX_TEXT_LEN};

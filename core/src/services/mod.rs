//! Cross-cutting services resolved from the container.

pub mod clock;
pub mod id_generator;

use once_cell::sync::Lazy;

use crate::container::ServiceToken;

pub use clock::{Clock, FixedClock, SystemClock};
pub use id_generator::{IdGenerator, SequentialIdGenerator, UuidGenerator};

pub static CLOCK: Lazy<ServiceToken<dyn Clock>> = Lazy::new(|| ServiceToken::new("Clock"));

pub static ID_GENERATOR: Lazy<ServiceToken<dyn IdGenerator>> =
    Lazy::new(|| ServiceToken::new("IdGenerator"));

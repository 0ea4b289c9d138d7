//! Rate limiting logic and state management.

mod backend;
mod clock;
mod gate;
mod key;
mod limiter;
mod rules;
mod window;

pub use backend::LimiterBackend;
pub use clock::{Clock, ManualClock, SystemClock};
pub use gate::{Gate, SubjectCheck, Verdict};
pub use key::{LimitKey, Subject, SubjectKind};
pub use limiter::{sweep_task, RateLimiter};
pub use rules::{LimitRule, LimitsConfig, ScopeConfig};
pub use window::{Decision, TimeWindow};

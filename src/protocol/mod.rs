//! Fixed-grammar text command protocol.
//!
//! ```text
//! ┌────────────┐   ┌─────────────┐   ┌──────────────────────────────┐
//! │ Frame      │──▶│   codec     │──▶│   dispatch                   │
//! │ (≤23 B)    │   │ (opcode +   │   │ → replies, new Settings,     │
//! │            │   │  digits)    │   │   clock set, trigger request │
//! └────────────┘   └─────────────┘   └──────────────────────────────┘
//! ```
//!
//! | Opcode | Fields          | Frame length |
//! |--------|-----------------|--------------|
//! | `st`   | YY MM DD hh mm ss | 14 |
//! | `si`   | interval (4)    | 6 |
//! | `cs`   | hh mm           | 6 |
//! | `ce`   | hh mm           | 6 |
//! | `gt`   | none            | 2 |
//! | `gs`   | none            | 2 |
//! | `tp`   | none            | 2 |
//!
//! Both halves are pure: nothing here touches the clock, the store or the
//! actuator.  The [`AppService`](crate::app::service::AppService) applies
//! the [`Outcome`](dispatch::Outcome).

pub mod codec;
pub mod dispatch;

pub use codec::{Frame, decode, frame_from_bytes, parse_digits, try_decode};
pub use dispatch::{Counters, Outcome, Reply, dispatch};

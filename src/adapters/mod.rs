//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                 |
//! |------------|--------------------|-----------------------------|
//! | `ble`      | ReplyPort          | GATT UART service           |
//! |            | (FrameQueue feed)  |                             |
//! | `hardware` | ClockPort          | RTC                         |
//! |            | ActuatorPort       | Focus / shutter GPIO        |
//! |            | DelayNs            | FreeRTOS / thread sleep     |
//! | `log_sink` | EventSink          | Serial log output           |
//! | `nvs`      | StoragePort        | NVS / in-memory store       |
//! | `time`     | ClockPort          | gettimeofday / Instant      |

pub mod ble;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;

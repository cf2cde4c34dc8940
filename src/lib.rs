//! # GrowCube Client
//!
//! Client driver for the GrowCube smart irrigation controller. The device
//! exposes its state over a single TCP connection (port 8800) using a
//! `#`-delimited text protocol.
//!
//! ## Protocol Overview
//!
//! The client opens a connection, sends HELLO with its local time, waits for
//! the device's VERSION frame, requests readings and then collects one
//! SENSOR_READING per channel. Frames arrive in no fixed order and some may
//! never arrive, so a session always returns the status it has accumulated
//! when its time budget runs out, tagged as incomplete.
//!
//! ### Wire Formats
//!
//! | Family   | Wire Format                        | Example                  |
//! |----------|------------------------------------|--------------------------|
//! | Standard | `ele[a]<type>#<len>#<content>#`    | `ele24#10#1.0.0@ab12#`   |
//! | Short    | `ele5<2 digits>`                   | `ele533`                 |
//!
//! `0x00` bytes between frames are padding and are dropped.
//!
//! ### Message Types
//!
//! | Code | Type                | Direction      | Content                          |
//! |------|---------------------|----------------|----------------------------------|
//! | 44   | HELLO               | Client→Device  | `YYYY@MM@DD@HH@MM@SS`            |
//! | 43   | REQUEST_READINGS    | Client→Device  | `1`                              |
//! | 24   | VERSION             | Device→Client  | `<version>@<id>`                 |
//! | 33   | START_READINGS      | Device→Client  | `0@0`, or `1@1` when water is low|
//! | 21   | SENSOR_READING      | Device→Client  | `<ch>@<moisture>@<hum>@<temp>`   |
//! | 30   | SENSOR_DISCONNECTED | Device→Client  | `<ch>`                           |
//! | 34   | OUTLET_LOCKED       | Device→Client  | `<ch>`                           |
//! | 20   | OK                  | Device→Client  | `1`                              |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use growcube::{get_status, DeviceConfig};
//!
//! let report = get_status(DeviceConfig::new("192.168.1.20")).await?;
//! if !report.is_complete() {
//!     eprintln!("partial status: {:?}", report.outcome);
//! }
//! println!("{}", report.status);
//! ```
//!
//! ## Modules
//!
//! - [`codec`]: Frame encoding/decoding and type codes
//! - [`transport`]: Deadline-bounded framed TCP connection
//! - [`protocol`]: Status aggregation and session orchestration
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod codec;
pub mod config;
pub mod error;
pub mod protocol;
pub mod transport;

// Re-exports for convenience
pub use codec::{Frame, MessageType};
pub use config::{Config, DeviceConfig};
pub use error::{GrowcubeError, Result};
pub use protocol::{get_status, Outcome, Session, SessionState, Status, StatusReport};
pub use transport::{Connection, TimeoutBudget, DEFAULT_PORT};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

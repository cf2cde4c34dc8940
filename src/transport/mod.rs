//! Transport layer for the GrowCube client.
//!
//! One [`Connection`] owns one socket and exchanges whole frames with the
//! device. All reads and writes in a session draw from a single
//! [`TimeoutBudget`], so no operation can block past the session deadline.
//!
//! # Usage
//!
//! ```rust,ignore
//! use growcube::transport::{Connection, TimeoutBudget};
//! use growcube::codec::Frame;
//!
//! let budget = TimeoutBudget::from_secs(15);
//! let mut conn = Connection::connect("192.168.1.20", 8800, Duration::from_secs(5), &budget).await?;
//! conn.send(&Frame::request_readings(), &budget).await?;
//! let frame = conn.receive(&budget).await?;
//! conn.close(&budget).await;
//! ```

mod budget;
mod tcp;

pub use budget::{TimeoutBudget, MAX_BUDGET};
pub use tcp::{Connection, MAX_TOKEN_LEN, PADDING};

/// Default TCP port of the device
pub const DEFAULT_PORT: u16 = 8800;

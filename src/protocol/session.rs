//! Session orchestration for one status request.
//!
//! A session owns its connection and its [`Status`]. Both are dropped when
//! the call returns.

use chrono::Local;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};

use super::status::{Applied, Status};
use crate::codec::{Frame, MessageType};
use crate::config::DeviceConfig;
use crate::error::{GrowcubeError, Result};
use crate::transport::{Connection, TimeoutBudget};

/// Session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    /// Opening the TCP connection
    Connecting,
    /// HELLO sent, waiting for VERSION
    Handshaking,
    /// Readings requested, collecting channel frames
    Refreshing,
    /// Handshake done and the caller only wanted connectivity
    ConnectOnlyDone,
    /// Connection closed
    Done,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Every channel reported
    Complete,
    /// Stopped after the handshake as requested
    ConnectOnly,
    /// Budget ran out; status is partial
    TimedOut,
    /// The first frame was not VERSION; status is partial
    UnexpectedHandshake {
        /// Type code of the frame received instead
        code: u16,
    },
}

/// Result of a session: the status plus how complete it is.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Accumulated device status
    pub status: Status,
    /// How the session ended
    pub outcome: Outcome,
    /// Frames received from the device
    pub frames_received: u64,
    /// Frames with untracked types
    pub frames_ignored: u64,
    /// Session duration in milliseconds
    pub elapsed_ms: u64,
}

impl StatusReport {
    fn new(status: Status) -> Self {
        Self {
            status,
            outcome: Outcome::TimedOut,
            frames_received: 0,
            frames_ignored: 0,
            elapsed_ms: 0,
        }
    }

    /// Whether the session achieved what was asked of it.
    pub fn is_complete(&self) -> bool {
        match self.outcome {
            Outcome::Complete => true,
            Outcome::ConnectOnly => true,
            Outcome::TimedOut | Outcome::UnexpectedHandshake { .. } => false,
        }
    }

    fn record(&mut self, applied: Applied) {
        self.frames_received += 1;
        if applied == Applied::Ignored {
            self.frames_ignored += 1;
        }
    }
}

/// Drives one connect → handshake → refresh exchange.
#[derive(Debug)]
pub struct Session {
    config: DeviceConfig,
    state: SessionState,
}

impl Session {
    /// Create a session for the given device.
    pub fn new(config: DeviceConfig) -> Self {
        Self {
            config,
            state: SessionState::Connecting,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Connect over TCP and run the session.
    ///
    /// A timeout yields `Ok` with [`Outcome::TimedOut`]. Connection, framing
    /// and validation failures are returned as errors.
    pub async fn run(&mut self) -> Result<StatusReport> {
        self.config.validate()?;
        let budget = TimeoutBudget::new(self.config.timeout());

        self.transition(SessionState::Connecting);
        let connected = Connection::connect(
            &self.config.host,
            self.config.port,
            self.config.connect_timeout(),
            &budget,
        )
        .await;
        let conn = match connected {
            Ok(conn) => conn,
            Err(e) => {
                self.transition(SessionState::Done);
                return Err(e);
            },
        };

        self.run_with(conn, &budget).await
    }

    /// Run the session over an already open connection.
    ///
    /// The connection is closed on every exit path.
    pub async fn run_with<S>(
        &mut self,
        mut conn: Connection<S>,
        budget: &TimeoutBudget,
    ) -> Result<StatusReport>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut report = StatusReport::new(Status::new(self.config.connect_only));

        let result = self.drive(&mut conn, budget, &mut report).await;
        conn.close(budget).await;
        self.transition(SessionState::Done);

        report.elapsed_ms = budget.elapsed().as_millis() as u64;
        report.outcome = match result {
            Ok(outcome) => outcome,
            Err(e) if e.is_timeout() => {
                tracing::warn!(
                    "Session timed out after {:?} with {} of 4 channels refreshed",
                    budget.elapsed(),
                    report.status.refreshed_count()
                );
                Outcome::TimedOut
            },
            Err(e) => {
                tracing::error!("Session with {} aborted: {}", conn.peer(), e);
                return Err(e);
            },
        };

        tracing::info!(
            "Session finished: {:?}, {} frames received",
            report.outcome,
            report.frames_received
        );
        Ok(report)
    }

    async fn drive<S>(
        &mut self,
        conn: &mut Connection<S>,
        budget: &TimeoutBudget,
        report: &mut StatusReport,
    ) -> Result<Outcome>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.transition(SessionState::Handshaking);
        conn.send(&Frame::hello(&Local::now()), budget).await?;

        let first = conn.receive(budget).await?;
        if first.message_type() != MessageType::Version {
            report.frames_received += 1;
            tracing::warn!(
                "Expected VERSION as first frame, got {}; returning partial status",
                first
            );
            return Ok(Outcome::UnexpectedHandshake { code: first.code() });
        }
        let applied = report.status.apply(&first)?;
        report.record(applied);

        if self.config.connect_only {
            self.transition(SessionState::ConnectOnlyDone);
            return Ok(Outcome::ConnectOnly);
        }

        self.transition(SessionState::Refreshing);
        conn.send(&Frame::request_readings(), budget).await?;

        while !report.status.is_refresh_complete() {
            if budget.is_exhausted() {
                return Err(GrowcubeError::Timeout(
                    "readings did not complete".to_string(),
                ));
            }
            let frame = conn.receive(budget).await?;
            let applied = report.status.apply(&frame)?;
            report.record(applied);
        }

        Ok(Outcome::Complete)
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            tracing::debug!("Session state {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}

/// Fetch a status snapshot from the device described by `config`.
pub async fn get_status(config: DeviceConfig) -> Result<StatusReport> {
    Session::new(config).run().await
}

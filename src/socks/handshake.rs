//! SOCKS5 handshake state machine
//!
//! Runs the greeting and CONNECT request over an encrypted channel and dials
//! the destination. Every protocol violation closes the session silently:
//! no error reply is ever written back.

use super::consts::{GREETING_REPLY, MAX_MESSAGE_LEN};
use super::reply::success_reply;
use super::request::{parse_greeting, parse_request};
use super::types::TargetAddr;
use crate::channel::FramedChannel;
use crate::error::{FariError, Result, Socks5Error};
use crate::transport::{self, SocketOpts};
use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::debug;

/// Handshake progress for one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Waiting for the method-selection greeting
    AwaitGreeting,
    /// Greeting answered, waiting for the request
    AwaitRequest,
    /// Request accepted; the destination is dialed from here
    Established,
    /// Terminal, after any failure
    Closed,
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HandshakeState::AwaitGreeting => "await-greeting",
            HandshakeState::AwaitRequest => "await-request",
            HandshakeState::Established => "established",
            HandshakeState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Sequential SOCKS5 negotiation for a single connection
///
/// Steps must be called in order: [`greet`](Self::greet),
/// [`read_request`](Self::read_request), then [`connect`](Self::connect).
/// A step called out of order, or any step that fails, leaves the handshake
/// in [`HandshakeState::Closed`].
#[derive(Debug)]
pub struct Socks5Handshake {
    state: HandshakeState,
}

impl Default for Socks5Handshake {
    fn default() -> Self {
        Self::new()
    }
}

impl Socks5Handshake {
    /// Start a handshake awaiting the greeting
    pub fn new() -> Self {
        Socks5Handshake {
            state: HandshakeState::AwaitGreeting,
        }
    }

    /// Current state
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Receive the greeting and answer "no authentication required"
    ///
    /// A greeting with a version other than 5 gets no reply at all.
    pub async fn greet<S>(&mut self, channel: &mut FramedChannel<S>) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.expect(HandshakeState::AwaitGreeting)?;

        let result = async {
            let mut buf = [0u8; MAX_MESSAGE_LEN];
            let n = channel.decode(&mut buf).await?;
            parse_greeting(&buf[..n])?;
            channel.encode(&GREETING_REPLY).await?;
            Ok::<_, FariError>(())
        }
        .await;

        self.advance(result, HandshakeState::AwaitRequest)
    }

    /// Receive the request and extract the destination
    ///
    /// Only CONNECT is accepted. Nothing is written back on rejection.
    pub async fn read_request<S>(&mut self, channel: &mut FramedChannel<S>) -> Result<TargetAddr>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.expect(HandshakeState::AwaitRequest)?;

        let result = async {
            let mut buf = [0u8; MAX_MESSAGE_LEN];
            let n = channel.decode(&mut buf).await?;
            Ok::<_, FariError>(parse_request(&buf[..n])?)
        }
        .await;

        self.advance(result, HandshakeState::Established)
    }

    /// Run greeting and request back to back
    pub async fn negotiate<S>(&mut self, channel: &mut FramedChannel<S>) -> Result<TargetAddr>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.greet(channel).await?;
        self.read_request(channel).await
    }

    /// Dial `target` and send the success reply
    ///
    /// A failed dial closes the session without a reply.
    pub async fn connect<S>(
        &mut self,
        channel: &mut FramedChannel<S>,
        target: &TargetAddr,
        timeout: Duration,
        opts: &SocketOpts,
    ) -> Result<TcpStream>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.expect(HandshakeState::Established)?;

        let result = async {
            let stream = transport::connect(target, timeout, opts).await?;
            channel.encode(&success_reply()).await?;
            Ok::<_, FariError>(stream)
        }
        .await;

        self.advance(result, HandshakeState::Established)
    }

    /// Force the terminal state
    pub fn close(&mut self) {
        self.state = HandshakeState::Closed;
    }

    fn expect(&mut self, wanted: HandshakeState) -> Result<()> {
        if self.state != wanted {
            let state = self.state;
            self.close();
            debug!("Handshake step for {} called in state {}", wanted, state);
            return Err(Socks5Error::UnexpectedState(match wanted {
                HandshakeState::AwaitGreeting => "greeting",
                HandshakeState::AwaitRequest => "request",
                HandshakeState::Established => "connect",
                HandshakeState::Closed => "closed",
            })
            .into());
        }
        Ok(())
    }

    fn advance<T>(&mut self, result: Result<T>, next: HandshakeState) -> Result<T> {
        match result {
            Ok(value) => {
                self.state = next;
                Ok(value)
            }
            Err(e) => {
                debug!("Handshake failed in state {}: {}", self.state, e);
                self.close();
                Err(e)
            }
        }
    }
}

//! Minimal Discord gateway session.
//!
//! Only what the relay needs: identify, wait for `READY` once, then keep the
//! session alive with heartbeats. Dispatched events are ignored and reports
//! go over REST, so a dropped session does not stop publishing.

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::connect_async;

use crate::error::{RelayError, Result};

pub const GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

const READY_TIMEOUT: Duration = Duration::from_secs(30);

/// `GUILDS`: enough to see the channels of joined guilds
pub const INTENT_GUILDS: u64 = 1;

pub mod opcode {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewayPayload {
    fn new(op: u8, d: Value) -> Self {
        Self {
            op,
            d,
            s: None,
            t: None,
        }
    }

    fn is_dispatch(&self, event: &str) -> bool {
        self.op == opcode::DISPATCH && self.t.as_deref() == Some(event)
    }
}

pub fn identify_payload(token: &str, intents: u64) -> GatewayPayload {
    GatewayPayload::new(
        opcode::IDENTIFY,
        json!({
            "token": token,
            "intents": intents,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "sysrelay",
                "device": "sysrelay",
            },
        }),
    )
}

pub fn heartbeat_payload(seq: Option<u64>) -> GatewayPayload {
    GatewayPayload::new(opcode::HEARTBEAT, json!(seq))
}

pub fn parse_hello(payload: &GatewayPayload) -> Result<Duration> {
    if payload.op != opcode::HELLO {
        return Err(RelayError::gateway(format!(
            "expected Hello (op {}), got op {}",
            opcode::HELLO,
            payload.op
        )));
    }

    payload.d["heartbeat_interval"]
        .as_u64()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .ok_or_else(|| RelayError::gateway("Hello without a heartbeat interval"))
}

/// Identity reported by the `READY` dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyInfo {
    pub user_tag: String,
    pub session_id: String,
}

pub fn parse_ready(payload: &GatewayPayload) -> Result<ReadyInfo> {
    let user = &payload.d["user"];
    let username = user["username"]
        .as_str()
        .ok_or_else(|| RelayError::gateway("READY without a user"))?;

    let user_tag = match user["discriminator"].as_str() {
        Some(disc) if disc != "0" => format!("{}#{}", username, disc),
        _ => username.to_string(),
    };

    Ok(ReadyInfo {
        user_tag,
        session_id: payload.d["session_id"].as_str().unwrap_or_default().to_string(),
    })
}

fn encode(payload: &GatewayPayload) -> Result<Message> {
    Ok(Message::Text(serde_json::to_string(payload)?.into()))
}

async fn next_payload<R>(stream: &mut R) -> Result<GatewayPayload>
where
    R: Stream<Item = std::result::Result<Message, tungstenite::Error>> + Unpin,
{
    while let Some(message) = stream.next().await {
        match message.map_err(|e| RelayError::gateway(e.to_string()))? {
            Message::Text(text) => return Ok(serde_json::from_str(&text)?),
            Message::Close(frame) => {
                let reason = frame
                    .map(|f| format!("{} {}", u16::from(f.code), f.reason.as_str()))
                    .unwrap_or_else(|| "no close frame".to_string());
                return Err(RelayError::gateway(format!("connection closed: {}", reason)));
            }
            _ => continue,
        }
    }

    Err(RelayError::gateway("connection closed before READY"))
}

/// Answer heartbeat requests until `READY`; any session end before that is a
/// login failure.
async fn wait_for_ready<W, R>(
    sink: &mut W,
    stream: &mut R,
    seq: &mut Option<u64>,
) -> Result<ReadyInfo>
where
    W: Sink<Message, Error = tungstenite::Error> + Unpin,
    R: Stream<Item = std::result::Result<Message, tungstenite::Error>> + Unpin,
{
    loop {
        let payload = next_payload(stream).await?;
        if payload.s.is_some() {
            *seq = payload.s;
        }

        match payload.op {
            opcode::HEARTBEAT => {
                sink.send(encode(&heartbeat_payload(*seq))?)
                    .await
                    .map_err(|e| RelayError::gateway(e.to_string()))?;
            }
            opcode::RECONNECT => {
                return Err(RelayError::gateway("server asked to reconnect before READY"))
            }
            opcode::INVALID_SESSION => {
                return Err(RelayError::gateway(
                    "session rejected during identify (check the token)",
                ))
            }
            _ if payload.is_dispatch("READY") => return parse_ready(&payload),
            _ => continue,
        }
    }
}

/// A logged-in gateway session with its heartbeat task.
pub struct GatewaySession {
    pub ready: ReadyInfo,
    keep_alive: JoinHandle<()>,
}

impl GatewaySession {
    pub async fn connect(token: &str) -> Result<Self> {
        Self::connect_to(GATEWAY_URL, token).await
    }

    pub async fn connect_to(url: &str, token: &str) -> Result<Self> {
        Self::connect_within(url, token, READY_TIMEOUT).await
    }

    /// Connect and identify. Hello and `READY` must each arrive within `limit`.
    pub async fn connect_within(url: &str, token: &str, limit: Duration) -> Result<Self> {
        let (socket, _) = connect_async(url)
            .await
            .map_err(|e| RelayError::gateway(format!("failed to connect to {}: {}", url, e)))?;
        let (mut sink, mut stream) = socket.split();

        let hello = timeout(limit, next_payload(&mut stream))
            .await
            .map_err(|_| RelayError::gateway(format!("no Hello within {:?}", limit)))??;
        let heartbeat = parse_hello(&hello)?;
        log::debug!("Gateway heartbeat interval: {:?}", heartbeat);

        sink.send(encode(&identify_payload(token, INTENT_GUILDS))?)
            .await
            .map_err(|e| RelayError::gateway(e.to_string()))?;

        let mut seq = None;
        let ready = timeout(limit, wait_for_ready(&mut sink, &mut stream, &mut seq))
            .await
            .map_err(|_| RelayError::gateway(format!("no READY within {:?}", limit)))??;

        let keep_alive = tokio::spawn(keep_alive(sink, stream, heartbeat, seq));

        Ok(Self { ready, keep_alive })
    }

    pub fn user_tag(&self) -> &str {
        &self.ready.user_tag
    }

    pub fn is_alive(&self) -> bool {
        !self.keep_alive.is_finished()
    }

    pub fn close(self) {
        self.keep_alive.abort();
    }
}

async fn keep_alive<W, R>(mut sink: W, mut stream: R, period: Duration, mut seq: Option<u64>)
where
    W: Sink<Message, Error = tungstenite::Error> + Unpin,
    R: Stream<Item = std::result::Result<Message, tungstenite::Error>> + Unpin,
{
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let beat_now = tokio::select! {
            _ = ticker.tick() => true,
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<GatewayPayload>(&text) {
                        Ok(payload) => {
                            if payload.s.is_some() {
                                seq = payload.s;
                            }
                            match payload.op {
                                opcode::HEARTBEAT => true,
                                opcode::HEARTBEAT_ACK => {
                                    log::debug!("Gateway heartbeat acknowledged");
                                    false
                                }
                                opcode::RECONNECT | opcode::INVALID_SESSION => {
                                    log::warn!("Gateway session ended by server (op {})", payload.op);
                                    break;
                                }
                                _ => false,
                            }
                        }
                        Err(e) => {
                            log::debug!("Ignoring undecodable gateway payload: {}", e);
                            false
                        }
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    log::warn!("Gateway closed the connection: {:?}", frame);
                    break;
                }
                Some(Ok(_)) => false,
                Some(Err(e)) => {
                    log::warn!("Gateway connection error: {}", e);
                    break;
                }
                None => {
                    log::warn!("Gateway connection ended");
                    break;
                }
            },
        };

        if beat_now {
            let message = match encode(&heartbeat_payload(seq)) {
                Ok(message) => message,
                Err(e) => {
                    log::error!("Failed to encode heartbeat: {}", e);
                    break;
                }
            };
            if let Err(e) = sink.send(message).await {
                log::warn!("Failed to send gateway heartbeat: {}", e);
                break;
            }
            log::debug!("Gateway heartbeat sent (seq {:?})", seq);
        }
    }
}

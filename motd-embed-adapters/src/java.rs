//! Java edition adapter using the Server List Ping protocol.
//!
//! The exchange is a single round trip over TCP: a handshake announcing the
//! status intent, an empty status request, and a status response carrying a
//! JSON document. Every packet is prefixed with its length as a VarInt.
//!
//! ## Example
//!
//! ```rust,no_run
//! use motd_embed_adapters::java::JavaStatusClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = JavaStatusClient::new();
//!     let status = client.query(&"play.example.com:25565".parse()?).await?;
//!
//!     println!("Version: {}", status.version.name);
//!     println!("MOTD: {}", status.motd);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use motd_embed_types::{MotdInput, Players, ServerAddress, ServerStatus, Version};

use crate::{OriginError, StatusFetcher};

/// Protocol version sent in the handshake when none is configured.
///
/// Servers answer status requests whatever version the client announces.
pub const DEFAULT_PROTOCOL_VERSION: i32 = 47;

/// Largest status packet accepted from a server.
const MAX_PACKET_LEN: usize = 2 * 1024 * 1024;

/// A VarInt never spans more than five bytes.
const MAX_VARINT_LEN: usize = 5;

const HANDSHAKE_PACKET_ID: i32 = 0x00;
const STATUS_REQUEST_PACKET_ID: i32 = 0x00;
const STATUS_RESPONSE_PACKET_ID: i32 = 0x00;
const NEXT_STATE_STATUS: i32 = 1;

/// Client for the Java edition status exchange.
#[derive(Debug, Clone)]
pub struct JavaStatusClient {
    protocol_version: i32,
}

impl JavaStatusClient {
    /// Create a client with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new builder for configuring the client.
    pub fn builder() -> JavaStatusClientBuilder {
        JavaStatusClientBuilder::default()
    }

    /// Query the status of the server at `address`.
    pub async fn query(&self, address: &ServerAddress) -> Result<ServerStatus, OriginError> {
        debug!(%address, "connecting for status");
        let stream = TcpStream::connect((address.host(), address.port())).await?;
        stream.set_nodelay(true)?;
        self.exchange(stream, address).await
    }

    /// Run the handshake/request/response exchange over an open stream.
    async fn exchange<S>(
        &self,
        mut stream: S,
        address: &ServerAddress,
    ) -> Result<ServerStatus, OriginError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut request = Vec::new();
        encode_packet(&mut request, &self.handshake(address));
        encode_packet(&mut request, &status_request());
        stream.write_all(&request).await?;
        stream.flush().await?;

        let payload = read_packet(&mut stream).await?;
        let mut body = payload.as_slice();
        let packet_id = decode_varint(&mut body)?;
        if packet_id != STATUS_RESPONSE_PACKET_ID {
            return Err(protocol_error(format!(
                "expected status response, got packet {packet_id:#04x}"
            )));
        }
        let json = decode_string(&mut body)?;
        debug!(%address, bytes = json.len(), "status response received");

        parse_status(json)
    }

    fn handshake(&self, address: &ServerAddress) -> Vec<u8> {
        let mut payload = Vec::new();
        encode_varint(&mut payload, HANDSHAKE_PACKET_ID);
        encode_varint(&mut payload, self.protocol_version);
        encode_string(&mut payload, address.host());
        payload.extend_from_slice(&address.port().to_be_bytes());
        encode_varint(&mut payload, NEXT_STATE_STATUS);
        payload
    }
}

impl Default for JavaStatusClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatusFetcher for JavaStatusClient {
    async fn fetch(&self, address: &ServerAddress) -> Result<ServerStatus, OriginError> {
        self.query(address).await
    }
}

/// Builder for JavaStatusClient.
#[derive(Debug, Default)]
pub struct JavaStatusClientBuilder {
    protocol_version: Option<i32>,
}

impl JavaStatusClientBuilder {
    /// Set the protocol version announced in the handshake.
    pub fn protocol_version(mut self, version: i32) -> Self {
        self.protocol_version = Some(version);
        self
    }

    /// Build the client.
    pub fn build(self) -> JavaStatusClient {
        JavaStatusClient {
            protocol_version: self.protocol_version.unwrap_or(DEFAULT_PROTOCOL_VERSION),
        }
    }
}

fn status_request() -> Vec<u8> {
    let mut payload = Vec::new();
    encode_varint(&mut payload, STATUS_REQUEST_PACKET_ID);
    payload
}

fn protocol_error(detail: impl Into<String>) -> OriginError {
    OriginError::Unavailable(format!("protocol error: {}", detail.into()))
}

fn encode_varint(buf: &mut Vec<u8>, value: i32) {
    let mut value = value as u32;
    loop {
        if value & !0x7F == 0 {
            buf.push(value as u8);
            return;
        }
        buf.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
}

fn encode_string(buf: &mut Vec<u8>, s: &str) {
    encode_varint(buf, s.len() as i32);
    buf.extend_from_slice(s.as_bytes());
}

fn encode_packet(buf: &mut Vec<u8>, payload: &[u8]) {
    encode_varint(buf, payload.len() as i32);
    buf.extend_from_slice(payload);
}

fn decode_varint(input: &mut &[u8]) -> Result<i32, OriginError> {
    let mut value: u32 = 0;
    for i in 0..MAX_VARINT_LEN {
        let (&byte, rest) = input
            .split_first()
            .ok_or_else(|| protocol_error("truncated VarInt"))?;
        *input = rest;
        value |= u32::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value as i32);
        }
    }
    Err(protocol_error("VarInt is too long"))
}

fn decode_string(input: &mut &[u8]) -> Result<String, OriginError> {
    let len = usize::try_from(decode_varint(input)?)
        .map_err(|_| protocol_error("negative string length"))?;
    if len > input.len() {
        return Err(protocol_error("string runs past end of packet"));
    }
    let (bytes, rest) = input.split_at(len);
    *input = rest;
    String::from_utf8(bytes.to_vec()).map_err(|_| protocol_error("string is not UTF-8"))
}

async fn read_varint<R: AsyncRead + Unpin>(reader: &mut R) -> Result<i32, OriginError> {
    let mut value: u32 = 0;
    for i in 0..MAX_VARINT_LEN {
        let byte = reader.read_u8().await?;
        value |= u32::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value as i32);
        }
    }
    Err(protocol_error("VarInt is too long"))
}

async fn read_packet<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, OriginError> {
    let len = read_varint(reader).await?;
    let len = match usize::try_from(len) {
        Ok(len) if len > 0 && len <= MAX_PACKET_LEN => len,
        _ => return Err(protocol_error(format!("invalid packet length {len}"))),
    };
    let mut payload = vec![0; len];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    version: Option<RawVersion>,
    players: Option<RawPlayers>,
    description: Option<Value>,
    favicon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawVersion {
    name: Option<String>,
    protocol: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPlayers {
    #[serde(default)]
    online: i64,
    #[serde(default)]
    max: i64,
}

fn clamp_count(count: i64) -> u32 {
    u32::try_from(count.max(0)).unwrap_or(u32::MAX)
}

/// Convert a status response document into a [`ServerStatus`].
fn parse_status(json: String) -> Result<ServerStatus, OriginError> {
    let response: StatusResponse = serde_json::from_str(&json)
        .map_err(|e| protocol_error(format!("invalid status JSON: {e}")))?;

    let version = response
        .version
        .map(|v| Version {
            name: v.name.unwrap_or_else(|| Version::default().name),
            protocol: v.protocol,
        })
        .unwrap_or_default();
    let players = response.players.unwrap_or_default();

    Ok(ServerStatus {
        online: true,
        motd: response
            .description
            .map(MotdInput::from_json)
            .unwrap_or_else(|| MotdInput::text("")),
        players: Players {
            online: clamp_count(players.online),
            max: clamp_count(players.max),
        },
        version,
        favicon: response.favicon,
    })
}

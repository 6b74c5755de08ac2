//! Core protocol types for Questgate.
//!
//! Two kinds of types live here:
//!
//! - **Identity data** that flows between the game server and the remote
//!   identity service: [`Credentials`], [`AccessToken`], [`Profile`].
//! - **Events** that flow between the game server and game clients:
//!   [`ClientEvent`] (client → server) and [`ServerEvent`]
//!   (server → client), plus their payloads [`Player`] and
//!   [`WorldSnapshot`].
//!
//! Every event on the wire has the same shape:
//!
//! ```text
//! { "event": "player:joined", "data": <payload> }
//! ```

use std::fmt;

use questgate_transport::ConnectionId;
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

/// Client → server: credentials. Server → client: the welcome snapshot.
pub const LOGIN_EVENT: &str = "player:login";
/// Client → server: "I'm leaving".
pub const LOGOUT_EVENT: &str = "player:logout";
/// Server → all: someone joined, here is who's online now.
pub const JOINED_EVENT: &str = "player:joined";
/// Server → all: someone left, here is who's online now.
pub const LEFT_EVENT: &str = "player:left";
/// Server → client: the request failed.
pub const ERROR_EVENT: &str = "error";

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player, as issued by the identity service.
///
/// Newtype over `u64` so a player id can't be confused with a connection
/// id. `#[serde(transparent)]` keeps it a plain number on the wire:
/// `PlayerId(42)` is `42`, not `{"0":42}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Login credentials exactly as the client sent them.
///
/// The gateway never looks inside: whatever object the client put in the
/// `data` field of its `player:login` event is forwarded to the identity
/// service as the request body. `Debug` prints field names only, so
/// credentials can't leak into logs.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(Map<String, Value>);

impl Credentials {
    /// Creates an empty credentials object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, builder-style.
    ///
    /// ```rust
    /// use questgate_protocol::Credentials;
    ///
    /// let creds = Credentials::new().with("user", "alice").with("pass", "x");
    /// assert_eq!(creds.get("user"), Some(&serde_json::json!("alice")));
    /// ```
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Looks up a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` if the client sent an empty object.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Credentials {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("fields", &self.0.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// An opaque bearer token issued by the identity service.
///
/// Only ever passed back to the same service in an
/// `Authorization: Bearer` header. `Debug` is redacted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for building request headers.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// The authenticated player's profile, as returned by the identity service.
///
/// Only `id` is interpreted (it's the player's identity in the roster).
/// Every other field is kept verbatim in `fields` and serialized back
/// unchanged, so clients receive exactly what the service returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// The player's identity.
    pub id: PlayerId,

    /// All remaining profile fields, untouched.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Profile {
    /// Creates a profile with just an id and a display name.
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("name".to_owned(), Value::String(name.into()));
        Self { id, fields }
    }

    /// The display name, if the service provided one.
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// World payloads
// ---------------------------------------------------------------------------

/// A roster entry: a profile admitted to the world over one connection.
///
/// The connection id is server-internal, so on the wire a player is just
/// its profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    /// The connection this player joined through.
    #[serde(skip)]
    pub connection: ConnectionId,

    /// The profile the identity service returned.
    #[serde(flatten)]
    pub profile: Profile,
}

impl Player {
    /// Pairs a profile with the connection it logged in on.
    pub fn new(connection: ConnectionId, profile: Profile) -> Self {
        Self { connection, profile }
    }

    /// Shorthand for `self.profile.id`.
    pub fn id(&self) -> PlayerId {
        self.profile.id
    }
}

/// The one-time "welcome" payload sent to a player who just joined.
///
/// A point-in-time copy taken in the same step that inserted `player`
/// into the roster, so `players` always contains `player`. It is not
/// updated afterwards; later changes arrive as `player:joined` /
/// `player:left` events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSnapshot {
    /// The player who joined.
    pub player: Player,
    /// The roster right after the join, in join order.
    pub players: Vec<Player>,
    /// The world map (opaque to the gateway).
    pub map: Value,
    /// Non-player characters.
    pub npcs: Vec<Value>,
    /// Items lying on the ground.
    pub dropped_items: Vec<Value>,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Events a game client sends to the server.
///
/// `#[serde(tag = "event", content = "data")]` is serde's "adjacently
/// tagged" representation: `{ "event": "player:login", "data": {...} }`.
/// Decoding is hand-written so that `data` is optional and ignored for
/// events that carry no payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// "Log me in with these credentials."
    #[serde(rename = "player:login")]
    Login(Credentials),

    /// "I'm leaving." Payload is ignored.
    #[serde(rename = "player:logout")]
    Logout,
}

impl<'de> Deserialize<'de> for ClientEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Frame {
            event: String,
            #[serde(default)]
            data: Value,
        }

        let frame = Frame::deserialize(deserializer)?;
        match frame.event.as_str() {
            LOGIN_EVENT => serde_json::from_value(frame.data)
                .map(ClientEvent::Login)
                .map_err(de::Error::custom),
            LOGOUT_EVENT => Ok(ClientEvent::Logout),
            other => Err(de::Error::unknown_variant(other, &[LOGIN_EVENT, LOGOUT_EVENT])),
        }
    }
}

/// Events the server sends to game clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Targeted: "you have joined, here is the world".
    #[serde(rename = "player:login")]
    Login(WorldSnapshot),

    /// Broadcast: "a player joined, here is who's online now".
    #[serde(rename = "player:joined")]
    Joined(Vec<Player>),

    /// Broadcast: "a player left, here is who's online now".
    #[serde(rename = "player:left")]
    Left(Vec<Player>),

    /// Targeted: something went wrong. `code` follows HTTP conventions
    /// (401 bad login, 503 identity service unreachable, ...).
    #[serde(rename = "error")]
    Error { code: u16, message: String },
}

impl ServerEvent {
    /// The wire name of this event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login(_) => LOGIN_EVENT,
            Self::Joined(_) => JOINED_EVENT,
            Self::Left(_) => LEFT_EVENT,
            Self::Error { .. } => ERROR_EVENT,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The client SDK parses these exact JSON shapes, so most tests here
    //! assert on `serde_json::Value` rather than on Rust equality.

    use super::*;
    use serde_json::json;

    fn alice() -> Profile {
        Profile::new(PlayerId(1), "alice")
    }

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&PlayerId(42)).unwrap(), "42");
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
    }

    #[test]
    fn test_credentials_serialize_as_the_raw_object() {
        let creds = Credentials::new().with("user", "alice").with("pass", "x");
        let json = serde_json::to_value(&creds).unwrap();
        assert_eq!(json, json!({"user": "alice", "pass": "x"}));
    }

    #[test]
    fn test_credentials_debug_hides_values() {
        let creds = Credentials::new().with("user", "alice").with("pass", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("pass"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("alice"));
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("tok-123");
        assert_eq!(format!("{token:?}"), "AccessToken(***)");
        assert_eq!(token.as_str(), "tok-123");
    }

    #[test]
    fn test_profile_keeps_unknown_fields_verbatim() {
        let body = json!({
            "id": 1,
            "name": "alice",
            "level": 12,
            "skills": {"mining": 3}
        });
        let profile: Profile = serde_json::from_value(body.clone()).unwrap();

        assert_eq!(profile.id, PlayerId(1));
        assert_eq!(profile.name(), Some("alice"));
        assert_eq!(serde_json::to_value(&profile).unwrap(), body);
    }

    #[test]
    fn test_profile_without_id_fails_to_decode() {
        let result: Result<Profile, _> = serde_json::from_value(json!({"name": "alice"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_profile_name_missing_returns_none() {
        let profile: Profile = serde_json::from_value(json!({"id": 3})).unwrap();
        assert_eq!(profile.name(), None);
    }

    // =====================================================================
    // Player / WorldSnapshot
    // =====================================================================

    #[test]
    fn test_player_serializes_as_profile_only() {
        let player = Player::new(ConnectionId::new(9), alice());
        let json = serde_json::to_value(&player).unwrap();
        assert_eq!(json, json!({"id": 1, "name": "alice"}));
        assert_eq!(player.id(), PlayerId(1));
    }

    #[test]
    fn test_world_snapshot_uses_camel_case_dropped_items() {
        let player = Player::new(ConnectionId::new(1), alice());
        let snapshot = WorldSnapshot {
            player: player.clone(),
            players: vec![player],
            map: json!({"tiles": [[0, 1]]}),
            npcs: vec![json!({"id": 5, "name": "Guard"})],
            dropped_items: vec![json!({"item_id": 2, "x": 3, "y": 4})],
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["player"], json!({"id": 1, "name": "alice"}));
        assert_eq!(json["players"], json!([{"id": 1, "name": "alice"}]));
        assert_eq!(json["droppedItems"][0]["item_id"], 2);
        assert!(json.get("dropped_items").is_none());
    }

    // =====================================================================
    // Events
    // =====================================================================

    #[test]
    fn test_client_login_event_json_format() {
        let event: ClientEvent = serde_json::from_value(json!({
            "event": "player:login",
            "data": {"user": "alice", "pass": "x"}
        }))
        .unwrap();

        assert_eq!(
            event,
            ClientEvent::Login(Credentials::new().with("user", "alice").with("pass", "x"))
        );
    }

    #[test]
    fn test_client_logout_event_without_data() {
        let event: ClientEvent =
            serde_json::from_value(json!({"event": "player:logout"})).unwrap();
        assert_eq!(event, ClientEvent::Logout);
    }

    #[test]
    fn test_client_logout_event_payload_is_ignored() {
        for data in [json!(null), json!({}), json!({"reason": "bye"}), json!("now")] {
            let event: ClientEvent =
                serde_json::from_value(json!({"event": "player:logout", "data": data})).unwrap();
            assert_eq!(event, ClientEvent::Logout);
        }
    }

    #[test]
    fn test_client_login_event_without_credentials_fails() {
        let result = serde_json::from_value::<ClientEvent>(json!({"event": "player:login"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_client_logout_event_serializes_without_data() {
        let json = serde_json::to_value(ClientEvent::Logout).unwrap();
        assert_eq!(json, json!({"event": "player:logout"}));
    }

    #[test]
    fn test_server_joined_event_json_format() {
        let event = ServerEvent::Joined(vec![Player::new(ConnectionId::new(1), alice())]);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "player:joined");
        assert_eq!(json["data"], json!([{"id": 1, "name": "alice"}]));
    }

    #[test]
    fn test_server_event_names_match_wire_tags() {
        let player = Player::new(ConnectionId::new(1), alice());
        let events = [
            ServerEvent::Login(WorldSnapshot {
                player: player.clone(),
                players: vec![player.clone()],
                map: Value::Null,
                npcs: vec![],
                dropped_items: vec![],
            }),
            ServerEvent::Joined(vec![player.clone()]),
            ServerEvent::Left(vec![]),
            ServerEvent::Error {
                code: 503,
                message: "identity service unreachable".into(),
            },
        ];

        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["event"], event.name());
        }
    }
}

//! Relay wire protocol
//!
//! Line-delimited JSON: one object per `\n`-terminated line, each tagged with
//! a `type` field. Stage grids travel as rows of `[kind, status]` pairs and are
//! validated to the full 20x12 shape when they are read.
//!
//! Piece kinds are single uppercase letters. The relay decodes every
//! `update_state` and re-encodes it as `opponent_state`, so unknown fields are
//! dropped rather than forwarded.

use serde::de::Error as _;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize};

use tetris_duel_core::{GameSnapshot, Stage};

use crate::types::{Cell, CellStatus, PieceKind, STAGE_HEIGHT, STAGE_WIDTH};

// ============== Stage Encoding ==============

/// One stage cell as `[kind | null, status]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WireCell(pub Cell);

impl Serialize for WireCell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.0.kind.map(|k| k.as_str()))?;
        tuple.serialize_element(self.0.status.as_str())?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for WireCell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (kind, status) = <(Option<String>, String)>::deserialize(deserializer)?;
        let kind = match kind {
            Some(s) => Some(
                PieceKind::ALL
                    .into_iter()
                    .find(|k| k.as_str() == s)
                    .ok_or_else(|| D::Error::custom(format!("invalid piece kind {s:?}")))?,
            ),
            None => None,
        };
        let status = CellStatus::from_str(&status)
            .ok_or_else(|| D::Error::custom(format!("invalid cell status {status:?}")))?;
        Ok(WireCell(Cell { kind, status }))
    }
}

/// A full stage grid, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WireStage(Vec<Vec<WireCell>>);

impl WireStage {
    pub fn from_stage(stage: &Stage) -> Self {
        Self(
            stage
                .rows()
                .map(|row| row.iter().copied().map(WireCell).collect())
                .collect(),
        )
    }

    /// Rebuild a [`Stage`], keeping overlay statuses as sent.
    pub fn to_stage(&self) -> Stage {
        let mut stage = Stage::new();
        for (y, row) in self.0.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                stage.set(x as i8, y as i8, cell.0);
            }
        }
        stage
    }

    pub fn rows(&self) -> &[Vec<WireCell>] {
        &self.0
    }
}

impl Default for WireStage {
    fn default() -> Self {
        Self::from_stage(&Stage::new())
    }
}

impl Serialize for WireStage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WireStage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let rows = Vec::<Vec<WireCell>>::deserialize(deserializer)?;
        if rows.len() != STAGE_HEIGHT as usize
            || rows.iter().any(|r| r.len() != STAGE_WIDTH as usize)
        {
            return Err(D::Error::custom(format!(
                "stage must be {} rows of {} cells",
                STAGE_HEIGHT, STAGE_WIDTH
            )));
        }
        Ok(Self(rows))
    }
}

// ============== Messages ==============

/// Board state a player shares with their opponent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatePayload {
    pub stage: WireStage,
    pub score: u32,
    pub rows: u32,
    #[serde(rename = "gameOver")]
    pub game_over: bool,
}

impl From<&GameSnapshot> for StatePayload {
    fn from(snap: &GameSnapshot) -> Self {
        Self {
            stage: WireStage::from_stage(&snap.stage),
            score: snap.score,
            rows: snap.rows_cleared,
            game_over: snap.game_over,
        }
    }
}

/// client -> server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    UpdateState(StatePayload),
    PlayerWon,
}

/// server -> client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Waiting,
    Start { room: String },
    OpponentState(StatePayload),
    GameOverWin,
    GameOverLose,
    Error { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}

// ============== Parsing ==============

#[derive(Debug)]
pub enum ProtocolError {
    /// Not JSON, or a known message with a bad payload.
    Malformed(serde_json::Error),
    /// Valid JSON without a string `type` field.
    MissingType,
    UnknownType(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolError::Malformed(e) => write!(f, "malformed message: {e}"),
            ProtocolError::MissingType => write!(f, "message has no type"),
            ProtocolError::UnknownType(t) => write!(f, "unknown message type {t:?}"),
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProtocolError::Malformed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ProtocolError {
    fn from(e: serde_json::Error) -> Self {
        ProtocolError::Malformed(e)
    }
}

pub fn parse_client_message(line: &str) -> Result<ClientMessage, ProtocolError> {
    match serde_json::from_str::<ClientMessage>(line) {
        Ok(msg) => Ok(msg),
        Err(e) => {
            // Tell an unknown tag apart from a bad payload.
            #[derive(Deserialize)]
            struct TypeOnly {
                #[serde(rename = "type")]
                msg_type: Option<String>,
            }
            let msg_type = serde_json::from_str::<TypeOnly>(line)?.msg_type;
            match msg_type.as_deref() {
                None => Err(ProtocolError::MissingType),
                Some("update_state") | Some("player_won") => Err(ProtocolError::Malformed(e)),
                Some(other) => Err(ProtocolError::UnknownType(other.to_string())),
            }
        }
    }
}

pub fn parse_server_message(line: &str) -> Result<ServerMessage, ProtocolError> {
    Ok(serde_json::from_str(line)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tetris_duel_core::{EngineConfig, GameState};

    fn empty_stage_json() -> String {
        let row = vec![r#"[null,"empty"]"#; STAGE_WIDTH as usize].join(",");
        let rows = vec![format!("[{row}]"); STAGE_HEIGHT as usize].join(",");
        format!("[{rows}]")
    }

    #[test]
    fn test_parse_player_won() {
        let msg = parse_client_message(r#"{"type":"player_won"}"#).unwrap();
        assert_eq!(msg, ClientMessage::PlayerWon);
    }

    #[test]
    fn test_parse_update_state() {
        let json = format!(
            r#"{{"type":"update_state","stage":{},"score":120,"rows":3,"gameOver":false}}"#,
            empty_stage_json()
        );
        match parse_client_message(&json).unwrap() {
            ClientMessage::UpdateState(state) => {
                assert_eq!(state.score, 120);
                assert_eq!(state.rows, 3);
                assert!(!state.game_over);
                assert_eq!(state.stage.to_stage(), Stage::new());
            }
            other => panic!("expected update_state, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_stage_shape_is_malformed() {
        let json = r#"{"type":"update_state","stage":[[[null,"empty"]]],"score":0,"rows":0,"gameOver":false}"#;
        let err = parse_client_message(json).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
        assert!(err.to_string().contains("20 rows of 12 cells"));
    }

    #[test]
    fn test_bad_cell_status_is_malformed() {
        let json = empty_stage_json().replacen("\"empty\"", "\"merged\"", 1);
        let line = format!(
            r#"{{"type":"update_state","stage":{json},"score":0,"rows":0,"gameOver":false}}"#
        );
        assert!(matches!(
            parse_client_message(&line),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn test_unknown_and_missing_type() {
        assert!(matches!(
            parse_client_message(r#"{"type":"chat","text":"hi"}"#),
            Err(ProtocolError::UnknownType(t)) if t == "chat"
        ));
        assert!(matches!(
            parse_client_message(r#"{"score":1}"#),
            Err(ProtocolError::MissingType)
        ));
        assert!(matches!(
            parse_client_message("not json"),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn test_server_message_tags() {
        assert_eq!(
            serde_json::to_string(&ServerMessage::Waiting).unwrap(),
            r#"{"type":"waiting"}"#
        );
        assert_eq!(
            serde_json::to_string(&ServerMessage::Start {
                room: "room_1_2".into()
            })
            .unwrap(),
            r#"{"type":"start","room":"room_1_2"}"#
        );
        assert_eq!(
            serde_json::to_string(&ServerMessage::GameOverLose).unwrap(),
            r#"{"type":"game_over_lose"}"#
        );
    }

    #[test]
    fn test_cell_encoding() {
        let cell = WireCell(Cell::settled(PieceKind::T));
        assert_eq!(serde_json::to_string(&cell).unwrap(), r#"["T","settled"]"#);
        let empty: WireCell = serde_json::from_str(r#"[null,"empty"]"#).unwrap();
        assert_eq!(empty.0, Cell::EMPTY);
        assert!(serde_json::from_str::<WireCell>(r#"["Q","settled"]"#).is_err());
        assert!(serde_json::from_str::<WireCell>(r#"["t","settled"]"#).is_err());
    }

    #[test]
    fn test_payload_from_snapshot_carries_overlay() {
        let mut game = GameState::new(EngineConfig::with_seed(4));
        game.start();
        let payload = StatePayload::from(&game.snapshot());

        assert_eq!(payload.score, 0);
        assert!(!payload.game_over);
        let transient = payload
            .stage
            .rows()
            .iter()
            .flatten()
            .filter(|c| c.0.status == CellStatus::Transient)
            .count();
        assert_eq!(transient, 4);

        let line =
            serde_json::to_string(&ServerMessage::OpponentState(payload.clone())).unwrap();
        assert_eq!(
            parse_server_message(&line).unwrap(),
            ServerMessage::OpponentState(payload)
        );
    }
}

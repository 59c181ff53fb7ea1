//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};

use crate::game::PlayerId;

/// Messages sent from client to server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMsg {
    /// Step left along the lane
    Left,
    /// Step right along the lane
    Right,
    /// Jump, only while grounded
    Jump,
    /// Burst forward, gated by the dash cooldown
    Dash,
    /// Shove every obstacle away, gated by the push cooldown
    MoveObstacle,
    /// Respawn at the spawn point with fresh cooldowns
    Restart,
    /// Any other `type`; ignored by the server
    #[serde(other)]
    Unknown,
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMsg {
    /// Handle assigned to the connection
    Init { id: PlayerId },

    /// World snapshot, sent every tick
    State {
        players: Vec<PlayerSnapshot>,
        obstacles: Vec<ObstacleSnapshot>,
    },

    /// The receiving player hit an obstacle
    Gameover,
}

/// Player state in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub position_x: f64,
    pub position_y: f64,
    pub alive: bool,
}

/// Obstacle state in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObstacleSnapshot {
    pub position_x: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn client_commands_use_wire_names() {
        let cases = [
            ("left", ClientMsg::Left),
            ("right", ClientMsg::Right),
            ("jump", ClientMsg::Jump),
            ("dash", ClientMsg::Dash),
            ("moveObstacle", ClientMsg::MoveObstacle),
            ("restart", ClientMsg::Restart),
        ];
        for (name, expected) in cases {
            let text = json!({ "type": name }).to_string();
            let msg: ClientMsg = assert_ok!(serde_json::from_str(&text));
            assert_eq!(msg, expected, "type {name}");
        }
    }

    #[test]
    fn unknown_type_is_not_an_error() {
        let msg: ClientMsg = assert_ok!(serde_json::from_str(r#"{"type":"teleport"}"#));
        assert_eq!(msg, ClientMsg::Unknown);
    }

    #[test]
    fn malformed_messages_are_rejected() {
        assert_err!(serde_json::from_str::<ClientMsg>("not json"));
        assert_err!(serde_json::from_str::<ClientMsg>(r#"{"kind":"left"}"#));
        assert_err!(serde_json::from_str::<ClientMsg>(r#"{"type":"left""#));
    }

    #[test]
    fn state_message_shape() {
        let msg = ServerMsg::State {
            players: vec![PlayerSnapshot {
                id: 1,
                position_x: 500.0,
                position_y: 15.0,
                alive: true,
            }],
            obstacles: vec![ObstacleSnapshot { position_x: 2000.0 }],
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "state",
                "players": [{ "id": 1, "positionX": 500.0, "positionY": 15.0, "alive": true }],
                "obstacles": [{ "positionX": 2000.0 }],
            })
        );
    }

    #[test]
    fn init_and_gameover_shape() {
        assert_eq!(
            serde_json::to_value(ServerMsg::Init { id: 3 }).unwrap(),
            json!({ "type": "init", "id": 3 })
        );
        assert_eq!(
            serde_json::to_value(ServerMsg::Gameover).unwrap(),
            json!({ "type": "gameover" })
        );
    }
}

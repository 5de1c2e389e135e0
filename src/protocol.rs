use anyhow::{Context, Result};
use serde::Deserialize;

/// Game-side view pushed by the client bridge.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameSnapshot {
    #[serde(default)]
    pub has_target: bool,
    #[serde(default)]
    pub target_distance: Option<f32>,
    #[serde(default)]
    pub player_heading: f32,
    #[serde(default)]
    pub heading_to_target: Option<f32>,
    #[serde(default)]
    pub player_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayCommand {
    Stop,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IncomingMessage {
    GameState(GameSnapshot),
    Command { command: OverlayCommand },
}

pub fn parse_incoming_message(text: &str) -> Result<IncomingMessage> {
    serde_json::from_str::<IncomingMessage>(text)
        .context("payload did not match a game_state or command message")
}

#[cfg(test)]
mod tests {
    use super::{parse_incoming_message, GameSnapshot, IncomingMessage, OverlayCommand};

    #[test]
    fn parses_game_state_payload() {
        let payload = r#"{
            "type":"game_state",
            "has_target":true,
            "target_distance":18.25,
            "player_heading":270.0,
            "heading_to_target":45.5,
            "player_name":"Mr. Foo Bar"
        }"#;

        let parsed = parse_incoming_message(payload).expect("expected game state parse");
        assert_eq!(
            parsed,
            IncomingMessage::GameState(GameSnapshot {
                has_target: true,
                target_distance: Some(18.25),
                player_heading: 270.0,
                heading_to_target: Some(45.5),
                player_name: Some("Mr. Foo Bar".to_owned()),
            })
        );
    }

    #[test]
    fn game_state_fields_are_optional() {
        let parsed =
            parse_incoming_message(r#"{"type":"game_state"}"#).expect("expected game state parse");
        match parsed {
            IncomingMessage::GameState(snapshot) => {
                assert!(!snapshot.has_target);
                assert_eq!(snapshot.target_distance, None);
                assert_eq!(snapshot.player_heading, 0.0);
                assert_eq!(snapshot.player_name, None);
            }
            other => panic!("expected game state, got {other:?}"),
        }
    }

    #[test]
    fn parses_stop_command() {
        let parsed = parse_incoming_message(r#"{"type":"command","command":"stop"}"#)
            .expect("expected command parse");
        assert_eq!(
            parsed,
            IncomingMessage::Command {
                command: OverlayCommand::Stop
            }
        );
    }

    #[test]
    fn rejects_unrecognized_payload() {
        assert!(parse_incoming_message(r#"{"hello":"world"}"#).is_err());
        assert!(parse_incoming_message(r#"{"type":"command","command":"dance"}"#).is_err());
        assert!(parse_incoming_message("not json").is_err());
    }
}

use std::time::Duration;

use crossbeam_channel::Receiver;
use eframe::egui;
use tracing::{debug, info};

use crate::{
    controller::{OverlayController, PanelState},
    game::LiveGameState,
    protocol::{IncomingMessage, OverlayCommand},
};

pub struct OverlayApp {
    events: Receiver<IncomingMessage>,
    game: LiveGameState,
    controller: OverlayController,
    poll_interval: Duration,
    close_sent: bool,
    passthrough_sent: bool,
}

impl OverlayApp {
    pub fn new(
        events: Receiver<IncomingMessage>,
        controller: OverlayController,
        poll_interval: Duration,
    ) -> Self {
        Self {
            events,
            game: LiveGameState::default(),
            controller,
            poll_interval,
            close_sent: false,
            passthrough_sent: false,
        }
    }

    fn drain_events(&mut self) {
        while let Ok(message) = self.events.try_recv() {
            match message {
                IncomingMessage::GameState(snapshot) => {
                    if !self.game.is_connected() {
                        info!(player = ?snapshot.player_name, "first game state received");
                    }
                    self.game.apply(snapshot);
                }
                IncomingMessage::Command {
                    command: OverlayCommand::Stop,
                } => {
                    debug!("stop command received");
                    self.controller.stop();
                }
            }
        }
    }
}

impl eframe::App for OverlayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        // Closing the native window behaves like the stop command.
        if ctx.input(|input| input.viewport().close_requested()) {
            self.controller.stop();
        }

        self.controller.frame(ctx, &self.game);

        if self.controller.is_terminated() {
            if !self.close_sent {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                self.close_sent = true;
            }
            return;
        }
        // With the panel gone the transparent window must not swallow game input.
        if self.controller.panel_state() == PanelState::Closed && !self.passthrough_sent {
            ctx.send_viewport_cmd(egui::ViewportCommand::MousePassthrough(true));
            self.passthrough_sent = true;
        }
        ctx.request_repaint_after(self.poll_interval);
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        [0.0, 0.0, 0.0, 0.0]
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossbeam_channel::unbounded;
    use tempfile::TempDir;

    use super::OverlayApp;
    use crate::{
        controller::OverlayController,
        game::GameState,
        protocol::{parse_incoming_message, IncomingMessage},
        settings::{open_store, StoreScope},
    };

    fn app(dir: &TempDir) -> (crossbeam_channel::Sender<IncomingMessage>, OverlayApp) {
        let (tx, rx) = unbounded();
        let controller =
            OverlayController::new(open_store(StoreScope::Shared, dir.path().to_path_buf()));
        (tx, OverlayApp::new(rx, controller, Duration::from_millis(100)))
    }

    #[test]
    fn game_state_messages_update_live_state() {
        let dir = TempDir::new().expect("temp dir");
        let (tx, mut app) = app(&dir);
        let message = parse_incoming_message(
            r#"{"type":"game_state","has_target":true,"target_distance":3.5,"player_heading":10,"heading_to_target":5}"#,
        )
        .expect("game state message");
        tx.send(message).expect("send message");

        app.drain_events();
        assert!(app.game.is_connected());
        assert_eq!(app.game.target_distance(), Ok(Some(3.5)));
        assert!(!app.controller.is_terminated());
    }

    #[test]
    fn stop_command_saves_and_terminates() {
        let dir = TempDir::new().expect("temp dir");
        let (tx, mut app) = app(&dir);
        let stop = parse_incoming_message(r#"{"type":"command","command":"stop"}"#)
            .expect("stop message");
        tx.send(stop.clone()).expect("send stop");
        tx.send(stop).expect("send stop again");

        app.drain_events();
        assert!(app.controller.is_terminated());
        assert!(dir.path().join("arrow_overlay.ini").exists());
    }
}

use anyhow::{Context as _, Result};
use eframe::egui::{
    self, Align2, Color32, Rect, Rgba, Sense, Shape, Stroke, TextStyle, Ui, Vec2,
};
use tracing::{debug, error, info, warn};

use crate::{
    game::GameState,
    geometry::{build_arrow_polygon, relative_heading},
    settings::{DisplayConfig, SettingsStore, StoreScope},
    widgets::{self, Edit},
};

pub const LOG_PREFIX: &str = "[target-arrow]";

const PANEL_ID: &str = "target_arrow_panel";
const NO_TARGET_HINT: &str = "No target";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Open,
    /// Saved and no longer drawn; there is no way back for this session.
    Closed,
}

/// Owns the display settings and renders the arrow panel once per frame.
pub struct OverlayController {
    config: DisplayConfig,
    store: Box<dyn SettingsStore>,
    identity: Option<String>,
    loaded: bool,
    panel: PanelState,
    open_flag: bool,
    terminated: bool,
    last_frame_error: Option<String>,
}

impl OverlayController {
    pub fn new(store: Box<dyn SettingsStore>) -> Self {
        let mut controller = Self {
            config: DisplayConfig::default(),
            store,
            identity: None,
            loaded: false,
            panel: PanelState::Open,
            open_flag: true,
            terminated: false,
            last_frame_error: None,
        };
        // The shared file does not depend on who is playing.
        if controller.store.scope() == StoreScope::Shared {
            controller.load_settings(None);
        }
        controller
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn panel_state(&self) -> PanelState {
        self.panel
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Flips the panel's open flag; the save happens on the next frame.
    pub fn request_close(&mut self) {
        self.open_flag = false;
    }

    /// Saves and ends the frame loop. Calling it again does nothing.
    pub fn stop(&mut self) {
        if self.terminated {
            return;
        }
        info!("{LOG_PREFIX} stop requested, saving display settings");
        self.save();
        self.terminated = true;
    }

    pub fn apply_color_edit(&mut self, edit: Edit<[f32; 4]>) -> bool {
        let changed = edit.apply_to(&mut self.config.arrow_color);
        if changed {
            debug!(color = ?self.config.arrow_color, "arrow color edited");
        }
        changed
    }

    pub fn apply_scale_edit(&mut self, edit: Edit<f32>) -> bool {
        let changed = edit.apply_to(&mut self.config.arrow_scale);
        if changed {
            debug!(scale = self.config.arrow_scale, "arrow scale edited");
        }
        changed
    }

    pub fn frame(&mut self, ctx: &egui::Context, game: &dyn GameState) {
        if self.terminated {
            return;
        }
        self.ensure_loaded(game);

        match self.panel {
            PanelState::Closed => return,
            PanelState::Open if !self.open_flag => {
                info!("{LOG_PREFIX} panel closed, saving display settings");
                self.panel = PanelState::Closed;
                self.save();
                return;
            }
            PanelState::Open => {}
        }
        // The panel's first appearance fixes its position, so it waits for the
        // per-character settings.
        if !self.loaded {
            return;
        }

        match self.show_panel(ctx, game) {
            Ok(()) => self.last_frame_error = None,
            Err(err) => self.report_frame_error(&err),
        }
    }

    fn ensure_loaded(&mut self, game: &dyn GameState) {
        if self.loaded {
            return;
        }
        // Per-character files wait for the first game snapshot to learn the name.
        if let Ok(name) = game.player_name() {
            self.load_settings(name);
        }
    }

    fn load_settings(&mut self, identity: Option<String>) {
        let path = self.store.path_for(identity.as_deref());
        self.config = self.store.load(identity.as_deref());
        self.identity = identity;
        self.loaded = true;
        info!(
            path = %path.display(),
            scale = self.config.arrow_scale,
            "{LOG_PREFIX} display settings loaded"
        );
    }

    fn save(&self) {
        let identity = self.identity.as_deref();
        if let Err(err) = self.store.save(&self.config, identity) {
            error!(
                ?err,
                path = %self.store.path_for(identity).display(),
                "{LOG_PREFIX} failed saving display settings: {err}"
            );
        }
    }

    fn report_frame_error(&mut self, err: &anyhow::Error) {
        let message = format!("{err:#}");
        if self.last_frame_error.as_deref() != Some(message.as_str()) {
            warn!("{LOG_PREFIX} frame skipped: {message}");
            self.last_frame_error = Some(message);
        }
    }

    fn show_panel(&mut self, ctx: &egui::Context, game: &dyn GameState) -> Result<()> {
        let config = self.config;
        let mut window = egui::Window::new("Target Arrow")
            .id(egui::Id::new(PANEL_ID))
            .title_bar(false)
            .frame(egui::Frame::none())
            .collapsible(false)
            .resizable(false)
            .default_size(config.saved_size());
        if let Some(pos) = config.saved_position() {
            window = window.default_pos(pos);
        }

        let Some(shown) = window.show(ctx, |ui| self.draw_contents(ui, game)) else {
            return Ok(());
        };
        self.record_window_rect(shown.response.rect);
        shown.inner.unwrap_or(Ok(()))
    }

    fn draw_contents(&mut self, ui: &mut Ui, game: &dyn GameState) -> Result<()> {
        let line_height = ui.text_style_height(&TextStyle::Body) + ui.spacing().item_spacing.y;
        let mut scale_px = self.config.clamped_scale() * line_height;

        let region = ui
            .vertical_centered(|ui| ui.allocate_exact_size(Vec2::splat(scale_px), Sense::hover()).0)
            .inner;

        let has_target = game.has_target().context("reading target selection")?;
        let distance = if has_target {
            game.target_distance()
                .context("reading target distance")?
                .unwrap_or(0.0)
        } else {
            draw_no_target_hint(ui, region);
            0.0
        };

        ui.vertical_centered(|ui| ui.label(format_distance(distance)));

        let color_edit = widgets::color_edit(ui, self.config.arrow_color);
        self.apply_color_edit(color_edit);

        let scale_edit = widgets::scale_slider(ui, self.config.clamped_scale());
        if self.apply_scale_edit(scale_edit) {
            scale_px = self.config.clamped_scale() * line_height;
        }

        if has_target {
            let player_heading = game.player_heading().context("reading player heading")?;
            let bearing = game.heading_to_target().context("reading heading to target")?;
            let heading = relative_heading(player_heading, bearing);
            let points = build_arrow_polygon(heading, scale_px, region.min);
            ui.painter().add(Shape::convex_polygon(
                points.to_vec(),
                arrow_color32(self.config.arrow_color),
                Stroke::NONE,
            ));
        }

        if ui.small_button("close").clicked() {
            self.request_close();
        }
        Ok(())
    }

    fn record_window_rect(&mut self, rect: Rect) {
        self.config.window_x = rect.min.x.round();
        self.config.window_y = rect.min.y.round();
        self.config.window_w = rect.width().round();
        self.config.window_h = rect.height().round();
    }
}

pub fn format_distance(distance: f32) -> String {
    format!("{distance:.2}")
}

fn arrow_color32([r, g, b, a]: [f32; 4]) -> Color32 {
    Rgba::from_rgba_unmultiplied(r, g, b, a).into()
}

fn draw_no_target_hint(ui: &Ui, region: Rect) {
    let font = TextStyle::Body.resolve(ui.style());
    ui.painter().text(
        region.center(),
        Align2::CENTER_CENTER,
        NO_TARGET_HINT,
        font,
        ui.visuals().weak_text_color(),
    );
}

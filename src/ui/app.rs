use std::time::Duration;

use eframe::egui;

use crate::types::media::SharedMedia;
use crate::types::settings::PlayerSettings;
use crate::types::viewport::Viewport;
use crate::ui::video_player::PlayerWidget;

pub struct AppState {
    pub viewport: Viewport,
    pub player: PlayerWidget,
}

pub struct PlayerApp {
    pub state: AppState,
}

impl PlayerApp {
    pub fn new(settings: PlayerSettings, media: SharedMedia) -> Self {
        let settings = settings.sanitized();
        let autoplay = settings.autoplay;
        let viewport = Viewport::new(settings.reference_width);
        let mut player = PlayerWidget::new(settings);
        player.attach(media);
        player.mount(&viewport);
        if autoplay {
            player.toggle_play();
        }
        Self {
            state: AppState { viewport, player },
        }
    }
}

impl eframe::App for PlayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.player.pump();

        egui::CentralPanel::default().show(ctx, |ui| {
            // The panel is the player's container; its width drives the scale.
            self.state.viewport.observe_width(ui.available_width());
            self.state.player.show(ui);
        });

        // Keep pumping the media bus; faster while frames are flowing.
        if self.state.player.is_playing() {
            ctx.request_repaint_after(Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

use eframe::egui;

use crate::types::playback_state::PlaybackState;

// Layout constants, in design units before scaling
const VIDEO_HEIGHT: f32 = 1035.0;
const EDGE_INSET: f32 = 34.0;
const PLAYBAR_HEIGHT: f32 = 8.0;
const PLAYBAR_BOTTOM_GAP: f32 = 34.0;
const LABEL_ROW_GAP: f32 = 48.0;
const LABEL_FONT_SIZE: f32 = 26.0;
const VOLUME_OFFSET_X: f32 = 110.0;
const VOLUME_SIZE: (f32, f32) = (220.0, 30.0);
const ICON_SIZE: f32 = 21.0;
const BUTTON_SIZE: (f32, f32) = (50.0, 42.0);

pub const ICON_COLOR: egui::Color32 = egui::Color32::from_rgb(0x33, 0x33, 0x33);
pub const LABEL_COLOR: egui::Color32 = egui::Color32::from_rgb(0xE0, 0xE0, 0xE0);

/// Screen rects of every part of the player for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameLayout {
    pub scale: f32,
    pub frame: egui::Rect,
    pub video: egui::Rect,
    pub playbar: egui::Rect,
    pub elapsed_label: egui::Pos2,
    pub remaining_label: egui::Pos2,
    pub volume: egui::Rect,
    pub play_pause: egui::Rect,
}

impl FrameLayout {
    pub fn new(origin: egui::Pos2, reference: egui::Vec2, scale: f32) -> Self {
        let at = |x: f32, y: f32| origin + egui::vec2(x, y) * scale;
        let rect = |x: f32, y: f32, w: f32, h: f32| {
            egui::Rect::from_min_size(at(x, y), egui::vec2(w, h) * scale)
        };

        let playbar_top = VIDEO_HEIGHT - PLAYBAR_BOTTOM_GAP - PLAYBAR_HEIGHT;
        let label_y = playbar_top - LABEL_ROW_GAP;
        let strip_height = (reference.y - VIDEO_HEIGHT).max(0.0);

        Self {
            scale,
            frame: rect(0.0, 0.0, reference.x, reference.y),
            video: rect(0.0, 0.0, reference.x, VIDEO_HEIGHT),
            playbar: rect(
                EDGE_INSET,
                playbar_top,
                reference.x - 2.0 * EDGE_INSET,
                PLAYBAR_HEIGHT,
            ),
            elapsed_label: at(EDGE_INSET, label_y),
            remaining_label: at(reference.x - EDGE_INSET, label_y),
            volume: rect(
                VOLUME_OFFSET_X,
                label_y - VOLUME_SIZE.1 / 2.0,
                VOLUME_SIZE.0,
                VOLUME_SIZE.1,
            ),
            play_pause: rect(
                EDGE_INSET,
                VIDEO_HEIGHT + (strip_height - BUTTON_SIZE.1) / 2.0,
                BUTTON_SIZE.0,
                BUTTON_SIZE.1,
            ),
        }
    }

    pub fn label_font(&self) -> egui::FontId {
        egui::FontId::proportional(LABEL_FONT_SIZE * self.scale)
    }
}

/// Largest rect with the frame's aspect ratio that fits inside `outer`, centred.
pub fn fit_rect(outer: egui::Rect, width: u32, height: u32) -> egui::Rect {
    if width == 0 || height == 0 || outer.width() <= 0.0 || outer.height() <= 0.0 {
        return outer;
    }
    let aspect = width as f32 / height as f32;
    let size = if outer.width() / outer.height() > aspect {
        egui::vec2(outer.height() * aspect, outer.height())
    } else {
        egui::vec2(outer.width(), outer.width() / aspect)
    };
    egui::Rect::from_center_size(outer.center(), size)
}

pub fn paint_playbar(painter: &egui::Painter, bar: egui::Rect, fraction: f64, opacity: f32) {
    painter.rect_filled(bar, 0.0, egui::Color32::from_white_alpha(60).gamma_multiply(opacity));
    let filled = egui::Rect::from_min_size(
        bar.min,
        egui::vec2(bar.width() * fraction as f32, bar.height()),
    );
    painter.rect_filled(filled, 0.0, egui::Color32::WHITE.gamma_multiply(opacity));
}

pub fn paint_time_label(
    painter: &egui::Painter,
    layout: &FrameLayout,
    pos: egui::Pos2,
    align: egui::Align2,
    text: &str,
    opacity: f32,
) {
    painter.text(
        pos,
        align,
        text,
        layout.label_font(),
        LABEL_COLOR.gamma_multiply(opacity),
    );
}

/// Play triangle while paused, pause bars while playing.
pub fn paint_play_pause(painter: &egui::Painter, button: egui::Rect, playback: PlaybackState) {
    let icon = egui::Rect::from_center_size(
        button.center(),
        egui::Vec2::splat(ICON_SIZE * button.height() / BUTTON_SIZE.1),
    );
    let unit = icon.width() / ICON_SIZE;
    let point = |x: f32, y: f32| icon.min + egui::vec2(x, y) * unit;
    let stroke = egui::Stroke::new(2.0 * unit, ICON_COLOR);

    match playback {
        PlaybackState::Playing => {
            painter.line_segment([point(2.0, 2.0), point(2.0, 19.0)], stroke);
            painter.line_segment([point(13.0, 2.0), point(13.0, 19.0)], stroke);
        }
        PlaybackState::Paused => {
            painter.add(egui::Shape::convex_polygon(
                vec![point(1.0, 2.0), point(16.0, 10.5), point(1.0, 19.0)],
                egui::Color32::TRANSPARENT,
                stroke,
            ));
        }
    }
}

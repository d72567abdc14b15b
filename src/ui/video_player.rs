use std::cell::RefCell;
use std::rc::{Rc, Weak};

use eframe::egui;

use crate::ops::seek::{click_fraction, seek_target};
use crate::ops::time_format::format_time;
use crate::types::events::{EventTarget, Subscription};
use crate::types::media::{MediaEvent, MediaEventKind, SharedMedia};
use crate::types::playback_state::PlayerState;
use crate::types::settings::PlayerSettings;
use crate::types::viewport::{ResizeEvent, Viewport};
use crate::ui::controls::{self, FrameLayout};
use crate::ui::frame_scaler::FrameScaler;

/// Listeners held while the widget is mounted. Dropping this releases all of them.
struct Mount {
    _resize: Subscription<ResizeEvent>,
    media: Vec<Subscription<MediaEvent>>,
}

/// A video player widget: play/pause, scrub bar, volume, time labels, and a
/// frame that scales with its container.
///
/// The widget never decides whether the media is playing. It issues requests
/// to the attached [`crate::MediaElement`] and redraws from the notifications
/// that come back.
pub struct PlayerWidget {
    id: egui::Id,
    settings: PlayerSettings,
    scaler: FrameScaler,
    state: Rc<RefCell<PlayerState>>,
    media: Option<SharedMedia>,
    mount: Option<Mount>,
    texture: Option<egui::TextureHandle>,
}

impl PlayerWidget {
    pub fn new(settings: PlayerSettings) -> Self {
        let settings = settings.sanitized();
        let state = PlayerState::new(settings.initial_volume);
        Self {
            id: egui::Id::new("player_widget"),
            scaler: FrameScaler::new(settings.reference_width),
            settings,
            state: Rc::new(RefCell::new(state)),
            media: None,
            mount: None,
            texture: None,
        }
    }

    /// Distinguishes several players on one screen.
    pub fn id_salt(mut self, salt: impl std::hash::Hash) -> Self {
        self.id = egui::Id::new(salt);
        self
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    /// Snapshot of what the widget currently shows.
    pub fn state(&self) -> PlayerState {
        self.state.borrow().clone()
    }

    pub fn is_playing(&self) -> bool {
        self.state.borrow().playback.is_playing()
    }

    pub fn is_mounted(&self) -> bool {
        self.mount.is_some()
    }

    /// Hands the widget its media element and pushes the current volume onto it.
    pub fn attach(&mut self, media: SharedMedia) {
        let volume = self.state.borrow().volume.volume;
        match media.try_borrow_mut() {
            Ok(mut element) => element.set_volume(volume),
            Err(_) => log::warn!("could not apply initial volume: media busy"),
        }
        if let Some(mount) = self.mount.as_mut() {
            mount.media = subscribe_media(&media, &self.state);
        }
        self.media = Some(media);
    }

    pub fn detach(&mut self) -> Option<SharedMedia> {
        if let Some(mount) = self.mount.as_mut() {
            mount.media.clear();
        }
        self.texture = None;
        self.media.take()
    }

    /// Starts following the viewport and the media element. Mounting again
    /// first releases the previous listeners.
    pub fn mount(&mut self, viewport: &Viewport) {
        self.unmount();
        let resize = self.scaler.mount(viewport, Rc::downgrade(&self.state));
        let media = self
            .media
            .as_ref()
            .map(|media| subscribe_media(media, &self.state))
            .unwrap_or_default();
        log::debug!("player mounted with {} media listeners", media.len());
        self.mount = Some(Mount {
            _resize: resize,
            media,
        });
    }

    pub fn unmount(&mut self) {
        if self.mount.take().is_some() {
            log::debug!("player unmounted");
        }
    }

    /// Requests play when the media is paused, pause otherwise. The shown state
    /// follows only once the media element confirms.
    pub fn toggle_play(&mut self) {
        let Some(media) = &self.media else {
            log::debug!("toggle ignored: no media attached");
            return;
        };
        let Ok(mut media) = media.try_borrow_mut() else {
            log::warn!("toggle ignored: media busy");
            return;
        };
        if media.is_paused() {
            media.play();
        } else {
            media.pause();
        }
    }

    /// Seeks to the time under a click on the play bar.
    pub fn seek_to_click(&mut self, click_x: f32, bar_left: f32, bar_width: f32) {
        match click_fraction(click_x, bar_left, bar_width) {
            Some(fraction) => self.seek_to_fraction(fraction),
            None => log::debug!("seek ignored: play bar has no width"),
        }
    }

    pub fn seek_to_fraction(&mut self, fraction: f64) {
        let duration = self.state.borrow().time.duration;
        let Some(target) = seek_target(fraction, duration) else {
            log::debug!("seek ignored: duration unknown");
            return;
        };
        let Some(media) = &self.media else {
            return;
        };
        match media.try_borrow_mut() {
            Ok(mut media) => media.set_current_time(target),
            Err(_) => log::warn!("seek to {:.2}s ignored: media busy", target),
        }
    }

    pub fn set_volume(&mut self, volume: f64) {
        if !volume.is_finite() {
            log::warn!("ignoring volume {}", volume);
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.state.borrow_mut().volume.volume = volume;
        if let Some(media) = &self.media {
            match media.try_borrow_mut() {
                Ok(mut media) => media.set_volume(volume),
                Err(_) => log::warn!("volume {} not applied: media busy", volume),
            }
        }
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.state.borrow_mut().hovered = hovered;
    }

    /// Lets the media element deliver its pending notifications.
    pub fn pump(&mut self) {
        if let Some(media) = &self.media {
            match media.try_borrow_mut() {
                Ok(mut media) => media.pump(),
                Err(_) => log::warn!("media busy, skipping pump"),
            }
        }
    }

    fn refresh_texture(&mut self, ctx: &egui::Context) {
        let Some(media) = &self.media else {
            return;
        };
        let frame = match media.try_borrow_mut() {
            Ok(mut media) => media.take_frame(),
            Err(_) => None,
        };
        let Some(frame) = frame else {
            return;
        };
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [frame.width as usize, frame.height as usize],
            &frame.data,
        );
        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture(
                    "player_video_frame",
                    image,
                    egui::TextureOptions::LINEAR,
                ));
            }
        }
    }

    /// Show the player in egui. The frame is laid out in design units times
    /// the current scale factor.
    pub fn show(&mut self, ui: &mut egui::Ui) -> egui::Response {
        self.refresh_texture(ui.ctx());

        let snapshot = self.state();
        let scale = snapshot.scale.scale;
        let reference = egui::vec2(self.settings.reference_width, self.settings.reference_height);
        let (rect, response) = ui.allocate_exact_size(reference * scale, egui::Sense::hover());
        let layout = FrameLayout::new(rect.min, reference, scale);

        let hovered = ui.rect_contains_pointer(layout.video);
        if hovered != snapshot.hovered {
            self.set_hovered(hovered);
        }
        let opacity = ui.ctx().animate_bool(self.id.with("hover"), hovered);

        let painter = ui.painter_at(layout.frame);
        painter.rect_filled(layout.frame, 0.0, egui::Color32::WHITE);
        painter.rect_filled(layout.video, 0.0, egui::Color32::BLACK);
        if let Some(texture) = &self.texture {
            let size = texture.size();
            painter.image(
                texture.id(),
                controls::fit_rect(layout.video, size[0] as u32, size[1] as u32),
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        } else if let Some(poster) = &self.settings.poster_path {
            egui::Image::new(format!("file://{}", poster)).paint_at(ui, layout.video);
        }

        if opacity > 0.0 {
            controls::paint_time_label(
                &painter,
                &layout,
                layout.elapsed_label,
                egui::Align2::LEFT_CENTER,
                &format_time(snapshot.time.current_time),
                opacity,
            );
            controls::paint_time_label(
                &painter,
                &layout,
                layout.remaining_label,
                egui::Align2::RIGHT_CENTER,
                &format_time(snapshot.time.remaining()),
                opacity,
            );
            controls::paint_playbar(&painter, layout.playbar, snapshot.time.progress(), opacity);

            let bar_hit = layout.playbar.expand2(egui::vec2(0.0, 8.0 * scale));
            let bar_response = ui.interact(bar_hit, self.id.with("playbar"), egui::Sense::click());
            if bar_response.clicked() {
                if let Some(pos) = bar_response.interact_pointer_pos() {
                    self.seek_to_click(pos.x, layout.playbar.left(), layout.playbar.width());
                }
            }

            let mut volume = snapshot.volume.volume;
            let slider = ui
                .scope_builder(egui::UiBuilder::new().max_rect(layout.volume), |ui| {
                    ui.multiply_opacity(opacity);
                    ui.spacing_mut().slider_width = layout.volume.width();
                    ui.add(
                        egui::Slider::new(&mut volume, 0.0..=1.0)
                            .step_by(0.01)
                            .show_value(false),
                    )
                })
                .inner;
            if slider.changed() {
                self.set_volume(volume);
            }
        }

        let button = ui.interact(
            layout.play_pause,
            self.id.with("play_pause"),
            egui::Sense::click(),
        );
        controls::paint_play_pause(&painter, layout.play_pause, snapshot.playback);
        if button.clicked() {
            self.toggle_play();
        }

        response
    }
}

fn apply_event(state: &Weak<RefCell<PlayerState>>, event: &MediaEvent) {
    let Some(state) = state.upgrade() else {
        return;
    };
    match state.try_borrow_mut() {
        Ok(mut state) => state.apply(event),
        Err(_) => log::warn!("dropped {:?}: player state busy", event),
    }
}

fn subscribe_media(
    media: &SharedMedia,
    state: &Rc<RefCell<PlayerState>>,
) -> Vec<Subscription<MediaEvent>> {
    let events = media.borrow().events();
    MediaEventKind::ALL
        .iter()
        .map(|&kind| {
            let state = Rc::downgrade(state);
            EventTarget::subscribe(&events, kind, move |event: &MediaEvent| {
                apply_event(&state, event)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::scripted_media::ScriptedMedia;
    use crate::types::media::MediaElement;
    use crate::types::playback_state::PlaybackState;

    fn mounted() -> (PlayerWidget, Rc<RefCell<ScriptedMedia>>, Viewport) {
        let media = Rc::new(RefCell::new(ScriptedMedia::new()));
        let viewport = Viewport::new(920.0);
        let mut widget = PlayerWidget::new(PlayerSettings::default());
        widget.attach(media.clone());
        widget.mount(&viewport);
        (widget, media, viewport)
    }

    #[test]
    fn test_toggle_requests_and_waits_for_notification() {
        let (mut widget, media, _viewport) = mounted();
        assert_eq!(widget.state().playback, PlaybackState::Paused);

        widget.toggle_play();
        assert_eq!(media.borrow().play_requests, 1);
        assert_eq!(widget.state().playback, PlaybackState::Playing);

        widget.toggle_play();
        assert_eq!(media.borrow().pause_requests, 1);
        assert_eq!(widget.state().playback, PlaybackState::Paused);
    }

    #[test]
    fn test_rejected_play_leaves_widget_paused() {
        let (mut widget, media, _viewport) = mounted();
        media.borrow_mut().reject_play = true;

        widget.toggle_play();
        assert_eq!(media.borrow().play_requests, 1);
        assert!(!widget.is_playing());
    }

    #[test]
    fn test_external_stop_is_mirrored() {
        let (mut widget, media, _viewport) = mounted();
        media.borrow_mut().load_metadata(12.0);
        widget.toggle_play();
        assert!(widget.is_playing());

        media.borrow_mut().end_of_stream();
        let state = widget.state();
        assert_eq!(state.playback, PlaybackState::Paused);
        assert_eq!(state.time.current_time, 12.0);
        assert_eq!(format_time(state.time.remaining()), "0:00");
    }

    #[test]
    fn test_play_after_end_starts_over() {
        let (mut widget, media, _viewport) = mounted();
        media.borrow_mut().load_metadata(12.0);
        widget.toggle_play();
        media.borrow_mut().end_of_stream();
        assert!(media.borrow().ended());

        widget.toggle_play();
        assert!(!media.borrow().ended());
        assert_eq!(media.borrow().current_time, 0.0);
        let state = widget.state();
        assert_eq!(state.playback, PlaybackState::Playing);
        assert_eq!(state.time.current_time, 0.0);
        assert_eq!(format_time(state.time.remaining()), "0:12");
    }

    #[test]
    fn test_operations_without_media_are_noops() {
        let viewport = Viewport::new(1840.0);
        let mut widget = PlayerWidget::new(PlayerSettings::default());
        widget.mount(&viewport);

        widget.toggle_play();
        widget.seek_to_fraction(0.5);
        widget.seek_to_click(10.0, 0.0, 100.0);
        widget.set_volume(0.2);
        widget.pump();

        let state = widget.state();
        assert_eq!(state.playback, PlaybackState::Paused);
        assert_eq!(state.volume.volume, 0.2);
        assert_eq!(state.scale.scale, 1.0);
    }

    #[test]
    fn test_progress_tracks_notifications() {
        let (widget, media, _viewport) = mounted();
        media.borrow_mut().advance_to(30.0);
        assert_eq!(widget.state().time.progress(), 0.0);
        assert_eq!(format_time(widget.state().time.remaining()), "0:00");

        media.borrow_mut().load_metadata(120.0);
        media.borrow_mut().advance_to(30.0);
        let time = widget.state().time;
        assert_eq!(time.current_time, 30.0);
        assert_eq!(time.progress(), 0.25);
        assert_eq!(format_time(time.remaining()), "1:30");
    }

    #[test]
    fn test_seek_sets_fraction_of_duration() {
        let (mut widget, media, _viewport) = mounted();
        media.borrow_mut().load_metadata(93.7);

        widget.seek_to_fraction(0.73);
        assert_eq!(media.borrow().current_time, 0.73 * 93.7);
        assert_eq!(widget.state().time.current_time, 0.73 * 93.7);

        widget.seek_to_click(134.0, 34.0, 400.0);
        assert_eq!(media.borrow().current_time, 0.25 * 93.7);
    }

    #[test]
    fn test_seek_skipped_until_duration_known() {
        let (mut widget, media, _viewport) = mounted();
        widget.seek_to_fraction(0.5);
        widget.seek_to_click(50.0, 0.0, 100.0);
        assert_eq!(media.borrow().current_time, 0.0);

        media.borrow_mut().load_metadata(0.0);
        widget.seek_to_fraction(0.5);
        assert_eq!(media.borrow().current_time, 0.0);
    }

    #[test]
    fn test_volume_is_mirrored_onto_media() {
        let (mut widget, media, _viewport) = mounted();
        assert_eq!(media.borrow().volume, 1.0);

        widget.set_volume(0.37);
        assert_eq!(media.borrow().volume(), 0.37);
        assert_eq!(widget.state().volume.volume, 0.37);

        widget.set_volume(1.5);
        assert_eq!(media.borrow().volume, 1.0);
        widget.set_volume(f64::NAN);
        assert_eq!(media.borrow().volume, 1.0);
        assert_eq!(widget.state().volume.volume, 1.0);
    }

    #[test]
    fn test_initial_volume_pushed_on_attach() {
        let media = Rc::new(RefCell::new(ScriptedMedia::new()));
        let settings = PlayerSettings {
            initial_volume: 0.6,
            ..PlayerSettings::default()
        };
        let mut widget = PlayerWidget::new(settings);
        widget.attach(media.clone());
        assert_eq!(media.borrow().volume, 0.6);
    }

    #[test]
    fn test_zero_reference_width_keeps_scale_finite() {
        let viewport = Viewport::new(920.0);
        let mut widget = PlayerWidget::new(PlayerSettings {
            reference_width: 0.0,
            ..PlayerSettings::default()
        });
        widget.mount(&viewport);
        assert_eq!(widget.settings().reference_width, 1840.0);
        assert_eq!(widget.state().scale.scale, 0.5);
    }

    #[test]
    fn test_scale_follows_container() {
        let (widget, _media, mut viewport) = mounted();
        assert_eq!(widget.state().scale.scale, 0.5);

        viewport.observe_width(1380.0);
        assert_eq!(widget.state().scale.scale, 1380.0 / 1840.0);
        viewport.observe_width(0.0);
        assert_eq!(widget.state().scale.scale, 0.0);
    }

    #[test]
    fn test_unmount_releases_every_listener() {
        let (mut widget, media, mut viewport) = mounted();
        assert_eq!(media.borrow().listener_count(), 4);
        assert_eq!(viewport.events().borrow().listener_count(), 1);

        media.borrow_mut().load_metadata(60.0);
        widget.toggle_play();
        media.borrow_mut().advance_to(5.0);
        viewport.observe_width(1000.0);
        widget.set_volume(0.5);

        widget.unmount();
        assert!(!widget.is_mounted());
        assert_eq!(media.borrow().listener_count(), 0);
        assert_eq!(viewport.events().borrow().listener_count(), 0);

        // Late notifications no longer reach the widget.
        media.borrow_mut().advance_to(9.0);
        viewport.observe_width(400.0);
        assert_eq!(widget.state().time.current_time, 5.0);
        assert_eq!(widget.state().scale.scale, 1000.0 / 1840.0);
    }

    #[test]
    fn test_remount_does_not_stack_listeners() {
        let (mut widget, media, viewport) = mounted();
        widget.mount(&viewport);
        widget.mount(&viewport);
        assert_eq!(media.borrow().listener_count(), 4);
        assert_eq!(viewport.events().borrow().listener_count(), 1);
    }

    #[test]
    fn test_dropping_widget_releases_listeners() {
        let (widget, media, viewport) = mounted();
        drop(widget);
        assert_eq!(media.borrow().listener_count(), 0);
        assert_eq!(viewport.events().borrow().listener_count(), 0);
    }

    #[test]
    fn test_attach_and_detach_while_mounted() {
        let viewport = Viewport::new(1840.0);
        let media = Rc::new(RefCell::new(ScriptedMedia::new()));
        let mut widget = PlayerWidget::new(PlayerSettings::default());
        widget.mount(&viewport);
        assert_eq!(media.borrow().listener_count(), 0);

        widget.attach(media.clone());
        assert_eq!(media.borrow().listener_count(), 4);
        media.borrow_mut().load_metadata(10.0);
        assert!(widget.state().time.duration_known());

        assert!(widget.detach().is_some());
        assert_eq!(media.borrow().listener_count(), 0);
        widget.toggle_play();
        assert_eq!(media.borrow().play_requests, 0);
    }

    #[test]
    fn test_show_renders_headless() {
        let (mut widget, media, mut viewport) = mounted();
        media.borrow_mut().load_metadata(30.0);
        media.borrow_mut().advance_to(12.0);

        let ctx = egui::Context::default();
        let input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(1280.0, 800.0),
            )),
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                viewport.observe_width(ui.available_width());
                widget.show(ui);
            });
        });

        let scale = widget.state().scale.scale;
        assert!(scale > 0.0 && scale < 1.0);
        assert_eq!(scale, viewport.width() / 1840.0);
    }

    fn run_frame(
        ctx: &egui::Context,
        widget: &mut PlayerWidget,
        viewport: &mut Viewport,
        events: Vec<egui::Event>,
    ) {
        let input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(1280.0, 800.0),
            )),
            events,
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                viewport.observe_width(ui.available_width());
                widget.show(ui);
            });
        });
    }

    #[test]
    fn test_pointer_over_video_sets_hovered() {
        let (mut widget, _media, mut viewport) = mounted();
        let ctx = egui::Context::default();

        // First frame lays the panel out so the pointer can be hit-tested.
        run_frame(&ctx, &mut widget, &mut viewport, Vec::new());
        assert!(!widget.state().hovered);

        let over_video = egui::Event::PointerMoved(egui::pos2(200.0, 200.0));
        run_frame(&ctx, &mut widget, &mut viewport, vec![over_video]);
        assert!(widget.state().hovered);

        // Below the video area, over the play/pause row.
        let below_video = egui::Event::PointerMoved(egui::pos2(200.0, 760.0));
        run_frame(&ctx, &mut widget, &mut viewport, vec![below_video]);
        assert!(!widget.state().hovered);

        run_frame(&ctx, &mut widget, &mut viewport, vec![egui::Event::PointerGone]);
        assert!(!widget.state().hovered);
    }
}

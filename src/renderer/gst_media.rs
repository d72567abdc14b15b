use std::time::{Duration, Instant};

use gst::prelude::*;
use gstreamer as gst;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;

use crate::error::PlayerError;
use crate::types::events::EventTarget;
use crate::types::media::{MediaElement, MediaEvent, MediaEvents, VideoFrame};

// Helper function to convert a path to a file URI for GStreamer
#[cfg(windows)]
fn path_to_file_uri(path: &str) -> String {
    // Remove UNC prefix if present
    let mut path = path.replace("\\", "/");
    if let Some(stripped) = path.strip_prefix("//?/") {
        path = stripped.to_string();
    }
    format!("file:///{}", path)
}

#[cfg(not(windows))]
fn path_to_file_uri(path: &str) -> String {
    format!("file://{}", path)
}

/// Accepts either a URI or a local path and returns something `playbin` can open.
pub fn source_to_uri(source: &str) -> String {
    if source.contains("://") {
        return source.to_string();
    }
    match std::fs::canonicalize(source) {
        Ok(abs_path) => path_to_file_uri(&abs_path.to_string_lossy()),
        Err(_) => path_to_file_uri(source),
    }
}

fn seconds(time: gst::ClockTime) -> f64 {
    time.nseconds() as f64 / 1_000_000_000.0
}

/// Whether a pipeline state change leaves the media playing (`Some(true)`) or
/// stopped (`Some(false)`).
///
/// Intermediate steps are `None`: a flushing seek while playing drops the
/// pipeline to PAUSED with PLAYING still pending, which is not a pause.
fn settled_playback(old: gst::State, current: gst::State, pending: gst::State) -> Option<bool> {
    if pending != gst::State::VoidPending || old == current {
        return None;
    }
    match current {
        gst::State::Playing => Some(true),
        gst::State::Paused | gst::State::Ready | gst::State::Null => Some(false),
        _ => None,
    }
}

/// A `playbin` pipeline exposed as a [`MediaElement`].
///
/// Bus messages are drained in [`MediaElement::pump`] on the UI thread and turned
/// into notifications; decoded frames arrive through an RGBA appsink.
pub struct GstMediaElement {
    playbin: gst::Element,
    sink: gst_app::AppSink,
    bus: gst::Bus,
    events: MediaEvents,
    paused: bool,
    duration: Option<f64>,
    last_position: f64,
    last_tick: Instant,
    time_update_interval: Duration,
    pending_frame: Option<VideoFrame>,
    frame_number: u64,
    last_frame_pts: Option<gst::ClockTime>,
    ended: bool,
}

impl GstMediaElement {
    pub fn new(source: &str, time_update_interval: Duration) -> Result<Self, PlayerError> {
        gst::init()?; // Safe to call multiple times

        let uri = source_to_uri(source);
        log::info!("opening media source {}", uri);

        let caps = gst_video::VideoCapsBuilder::new()
            .format(gst_video::VideoFormat::Rgba)
            .build();
        let sink = gst_app::AppSink::builder()
            .caps(&caps)
            .max_buffers(1)
            .drop(true)
            .build();

        let playbin = gst::ElementFactory::make("playbin")
            .property("uri", uri.as_str())
            .build()?;
        playbin.set_property("video-sink", &sink);

        let bus = playbin
            .bus()
            .ok_or_else(|| gst::glib::bool_error!("playbin has no bus"))?;

        // Preroll so metadata and the first frame become available before play.
        playbin
            .set_state(gst::State::Paused)
            .map_err(|_| PlayerError::StateChange {
                state: gst::State::Paused,
            })?;

        Ok(Self {
            playbin,
            sink,
            bus,
            events: EventTarget::shared(),
            paused: true,
            duration: None,
            last_position: 0.0,
            last_tick: Instant::now(),
            time_update_interval,
            pending_frame: None,
            frame_number: 0,
            last_frame_pts: None,
            ended: false,
        })
    }

    fn dispatch(&self, event: MediaEvent) {
        log::debug!("media event {:?}", event);
        match self.events.try_borrow_mut() {
            Ok(mut events) => events.dispatch(&event),
            Err(_) => log::warn!("dropped {:?}: listeners busy", event),
        }
    }

    fn refresh_duration(&mut self) {
        let Some(duration) = self.playbin.query_duration::<gst::ClockTime>().map(seconds) else {
            return;
        };
        if self.duration != Some(duration) {
            log::info!("media duration {:.2}s", duration);
            self.duration = Some(duration);
            self.dispatch(MediaEvent::LoadedMetadata { duration });
        }
    }

    fn handle_message(&mut self, msg: &gst::Message) {
        match msg.view() {
            gst::MessageView::StateChanged(change)
                if msg.src() == Some(self.playbin.upcast_ref::<gst::Object>()) =>
            {
                let playing =
                    settled_playback(change.old(), change.current(), change.pending());
                match playing {
                    Some(true) if self.paused => {
                        self.paused = false;
                        self.last_tick = Instant::now();
                        self.dispatch(MediaEvent::Play);
                    }
                    Some(false) if !self.paused => {
                        self.paused = true;
                        self.dispatch(MediaEvent::Pause);
                    }
                    _ => {}
                }
            }
            gst::MessageView::AsyncDone(_) | gst::MessageView::DurationChanged(_) => {
                self.refresh_duration();
            }
            gst::MessageView::Eos(_) => {
                log::info!("end of stream");
                self.ended = true;
                if let Some(duration) = self.duration {
                    self.last_position = duration;
                    self.dispatch(MediaEvent::TimeUpdate {
                        current_time: duration,
                    });
                }
                self.pause();
            }
            gst::MessageView::Error(err) => {
                log::error!(
                    "media pipeline error from {:?}: {} ({:?})",
                    msg.src().map(|s| s.path_string()),
                    err.error(),
                    err.debug()
                );
            }
            _ => {}
        }
    }

    fn tick_position(&mut self) {
        if self.paused || self.last_tick.elapsed() < self.time_update_interval {
            return;
        }
        self.last_tick = Instant::now();
        if let Some(position) = self.playbin.query_position::<gst::ClockTime>().map(seconds) {
            if position != self.last_position {
                self.last_position = position;
                self.dispatch(MediaEvent::TimeUpdate {
                    current_time: position,
                });
            }
        }
    }

    fn pull_frame(&mut self) -> Option<VideoFrame> {
        let sample = if self.paused {
            self.sink.try_pull_preroll(gst::ClockTime::ZERO)?
        } else {
            self.sink.try_pull_sample(gst::ClockTime::ZERO)?
        };
        let buffer = sample.buffer()?;
        let pts = buffer.pts();
        if self.paused && pts.is_some() && pts == self.last_frame_pts {
            return None;
        }

        let info = gst_video::VideoInfo::from_caps(sample.caps()?).ok()?;
        let map = buffer.map_readable().ok()?;
        let width = info.width();
        let height = info.height();
        let stride = usize::try_from(info.stride()[0]).ok()?;
        let row = width as usize * 4;
        if stride < row {
            log::warn!("unexpected frame stride {} for width {}", stride, width);
            return None;
        }

        let mut data = Vec::with_capacity(row * height as usize);
        for line in map.as_slice().chunks(stride).take(height as usize) {
            if line.len() < row {
                break;
            }
            data.extend_from_slice(&line[..row]);
        }
        if data.len() != row * height as usize {
            log::warn!(
                "decoded frame size mismatch: got {}, expected {}",
                data.len(),
                row * height as usize
            );
            return None;
        }

        self.last_frame_pts = pts;
        self.frame_number += 1;
        Some(VideoFrame {
            data,
            width,
            height,
            timestamp: pts.map(seconds).unwrap_or(self.last_position),
            frame_number: self.frame_number,
        })
    }
}

impl MediaElement for GstMediaElement {
    fn play(&mut self) {
        if self.ended {
            // Playing again after the end starts over.
            self.set_current_time(0.0);
        }
        if let Err(e) = self.playbin.set_state(gst::State::Playing) {
            log::warn!("play request rejected: {}", e);
        }
    }

    fn pause(&mut self) {
        if let Err(e) = self.playbin.set_state(gst::State::Paused) {
            log::warn!("pause request rejected: {}", e);
        }
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn ended(&self) -> bool {
        self.ended
    }

    fn current_time(&self) -> f64 {
        self.playbin
            .query_position::<gst::ClockTime>()
            .map(seconds)
            .unwrap_or(self.last_position)
    }

    fn set_current_time(&mut self, seconds: f64) {
        if !seconds.is_finite() || seconds < 0.0 {
            log::warn!("ignoring seek to {}", seconds);
            return;
        }
        let target = gst::ClockTime::from_nseconds((seconds * 1_000_000_000.0) as u64);
        if let Err(e) = self
            .playbin
            .seek_simple(gst::SeekFlags::FLUSH | gst::SeekFlags::KEY_UNIT, target)
        {
            log::warn!("seek to {:.2}s failed: {}", seconds, e);
            return;
        }
        self.ended = false;
        self.last_position = seconds;
        self.last_frame_pts = None;
        self.dispatch(MediaEvent::TimeUpdate {
            current_time: seconds,
        });
    }

    fn duration(&self) -> f64 {
        self.duration.unwrap_or(f64::NAN)
    }

    fn volume(&self) -> f64 {
        self.playbin.property::<f64>("volume")
    }

    fn set_volume(&mut self, volume: f64) {
        self.playbin.set_property("volume", volume);
    }

    fn events(&self) -> MediaEvents {
        self.events.clone()
    }

    fn pump(&mut self) {
        while let Some(msg) = self.bus.pop() {
            self.handle_message(&msg);
        }
        self.tick_position();
        if let Some(frame) = self.pull_frame() {
            self.pending_frame = Some(frame);
        }
    }

    fn take_frame(&mut self) -> Option<VideoFrame> {
        self.pending_frame.take()
    }
}

impl Drop for GstMediaElement {
    fn drop(&mut self) {
        if let Err(e) = self.playbin.set_state(gst::State::Null) {
            log::warn!("failed to shut down media pipeline: {}", e);
        }
    }
}

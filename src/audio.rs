//! Audio: a laser effect and a looping music track
//!
//! Playback never touches game state. Browsers may reject `play()` until the
//! user interacts with the page; rejected music is retried on the next
//! click or key press.

use crate::sim::GameEvent;

/// Laser effect clip
pub const LASER_URL: &str = "assets/sounds/laser.mp3";
/// Background music clip
pub const MUSIC_URL: &str = "assets/sounds/background.mp3";

/// What the audio layer should do for a game event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    /// Restart and play the laser clip
    Laser,
    /// Start the music loop if it is not already playing
    StartMusic,
}

impl AudioCue {
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::TargetHit { .. } => Some(AudioCue::Laser),
            GameEvent::RunStarted => Some(AudioCue::StartMusic),
            _ => None,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::Cell;
    use std::rc::Rc;

    use wasm_bindgen_futures::JsFuture;
    use web_sys::HtmlAudioElement;

    use super::{AudioCue, LASER_URL, MUSIC_URL};
    use crate::tuning::AudioTuning;

    /// Audio manager for the game
    pub struct AudioManager {
        laser: Option<HtmlAudioElement>,
        music: Option<HtmlAudioElement>,
        /// Set when the browser blocked the music
        music_blocked: Rc<Cell<bool>>,
    }

    fn load_clip(url: &str, volume: f32) -> Option<HtmlAudioElement> {
        match HtmlAudioElement::new_with_src(url) {
            Ok(el) => {
                el.set_preload("auto");
                el.set_volume(volume as f64);
                Some(el)
            }
            Err(e) => {
                log::error!("Error loading {}: {:?}", url, e);
                None
            }
        }
    }

    impl AudioManager {
        pub fn new(tuning: &AudioTuning) -> Self {
            let music = load_clip(MUSIC_URL, tuning.music_volume);
            if let Some(m) = &music {
                m.set_loop(true);
            }
            Self {
                laser: load_clip(LASER_URL, tuning.effect_volume),
                music,
                music_blocked: Rc::new(Cell::new(false)),
            }
        }

        pub fn play(&self, cue: AudioCue) {
            match cue {
                AudioCue::Laser => self.play_laser(),
                AudioCue::StartMusic => self.start_music(),
            }
        }

        fn play_laser(&self) {
            let Some(laser) = &self.laser else { return };
            laser.set_current_time(0.0);
            match laser.play() {
                Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
                    if let Err(e) = JsFuture::from(promise).await {
                        log::info!("Could not play laser sound: {:?}", e);
                    }
                }),
                Err(e) => log::info!("Could not play laser sound: {:?}", e),
            }
        }

        /// Start the loop unless it is already running
        pub fn start_music(&self) {
            let Some(music) = &self.music else { return };
            if !music.paused() {
                return;
            }
            let blocked = self.music_blocked.clone();
            match music.play() {
                Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
                    match JsFuture::from(promise).await {
                        Ok(_) => blocked.set(false),
                        Err(e) => {
                            log::info!("Could not play background music: {:?}", e);
                            blocked.set(true);
                        }
                    }
                }),
                Err(e) => {
                    log::info!("Could not play background music: {:?}", e);
                    self.music_blocked.set(true);
                }
            }
        }

        /// Call from click/keydown handlers
        pub fn on_user_gesture(&self) {
            if self.music_blocked.replace(false) {
                log::info!("Retrying background music after user interaction");
                self.start_music();
            }
        }

        /// Stop and rewind the music (quit to the start screen)
        pub fn stop_music(&self) {
            self.music_blocked.set(false);
            if let Some(music) = &self.music {
                if !music.paused() {
                    let _ = music.pause();
                    music.set_current_time(0.0);
                }
            }
        }
    }
}

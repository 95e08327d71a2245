//! Math Defender entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, HtmlCanvasElement, HtmlElement, HtmlImageElement, HtmlInputElement,
        KeyboardEvent,
    };

    use math_defender::audio::{AudioCue, AudioManager};
    use math_defender::fx::Effects;
    use math_defender::platform::{FrameClock, web};
    use math_defender::renderer::CanvasRenderer;
    use math_defender::sim::{self, RunState, RunSummary, TickInput};
    use math_defender::ui::{self, Hud, Screen};

    const EQUATIONS_URL: &str = "equations.csv";
    const TUNING_URL: &str = "tuning.json";
    const SHOOTER_URL: &str = "assets/shooter.png";

    /// Game instance holding all state
    struct Game {
        state: RunState,
        clock: FrameClock,
        fx: Effects,
        audio: AudioManager,
        renderer: Option<CanvasRenderer>,
        input: TickInput,
        /// Screen currently visible in the DOM
        shown: Option<Screen>,
    }

    impl Game {
        /// Begin a fresh run (play / play again)
        fn start(&mut self) {
            let seed = js_sys::Date::now() as u64;
            self.state.reset_with_seed(seed);
            sim::start_run(&mut self.state);
            self.clock.reset();
            self.input.answers.clear();
            // Dispatch now so music starts inside the click handler
            self.dispatch_events();
        }

        /// Back to the start screen
        fn quit(&mut self) {
            self.audio.stop_music();
            self.state.reset();
            self.fx.clear();
            self.input.answers.clear();
            log::info!("Returned to start screen");
        }

        /// Run simulation ticks
        fn update(&mut self, time: f64) {
            let steps = self.clock.frame(time);
            for _ in 0..steps {
                let input = std::mem::take(&mut self.input);
                sim::tick(&mut self.state, &input);
                self.fx.tick();
            }
            self.dispatch_events();
        }

        fn dispatch_events(&mut self) {
            let events = self.state.drain_events();
            self.fx.apply(&events);
            for event in &events {
                if let Some(cue) = AudioCue::for_event(event) {
                    self.audio.play(cue);
                }
            }
        }

        /// Render the current frame
        fn render(&self, time: f64) {
            if let Some(renderer) = &self.renderer {
                renderer.render(&self.state, &self.fx, time / 1000.0);
            }
        }

        /// Update screens and HUD elements in DOM
        fn update_dom(&mut self, document: &Document) {
            let screen = Screen::for_phase(self.state.phase);
            if self.shown != Some(screen) {
                show_screen(document, screen);
                if screen == Screen::End {
                    if let Err(e) = fill_stats(document, &self.state.summary()) {
                        log::error!("Could not build end screen: {:?}", e);
                    }
                }
                if screen == Screen::Play {
                    if let Some(input) = answer_input(document) {
                        let _ = input.focus();
                    }
                }
                self.shown = Some(screen);
            }

            if screen == Screen::Play {
                let hud = Hud::from_state(&self.state);
                set_text(document, "scoreDisplay", &hud.score);
                set_text(document, "levelDisplay", &hud.level);
                set_text(document, "healthText", &hud.health);
                if let Some(bar) = document
                    .get_element_by_id("healthBar")
                    .and_then(|el| el.dyn_into::<HtmlElement>().ok())
                {
                    let _ = bar
                        .style()
                        .set_property("--health-width", &format!("{}%", hud.health_percent));
                }
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn show_screen(document: &Document, screen: Screen) {
        for s in Screen::ALL {
            if let Some(el) = document.get_element_by_id(s.element_id()) {
                let classes = el.class_list();
                let _ = if s == screen {
                    classes.remove_1("hidden")
                } else {
                    classes.add_1("hidden")
                };
            }
        }
    }

    fn answer_input(document: &Document) -> Option<HtmlInputElement> {
        document
            .get_element_by_id("answerInput")?
            .dyn_into::<HtmlInputElement>()
            .ok()
    }

    /// Per-level blocks plus the total, rebuilt on every visit to the end screen
    fn fill_stats(document: &Document, summary: &RunSummary) -> Result<(), JsValue> {
        let Some(container) = document.get_element_by_id("statsContainer") else {
            return Ok(());
        };
        container.set_inner_html("");

        for block in ui::summary_report(summary) {
            let div = document.create_element("div")?;
            div.set_class_name(block.class);
            let title = document.create_element(ui::STATS_HEADING_TAG)?;
            title.set_text_content(Some(&block.title));
            div.append_child(&title)?;
            for line in block.lines {
                let p = document.create_element("p")?;
                p.set_text_content(Some(&line));
                div.append_child(&p)?;
            }
            container.append_child(&div)?;
        }
        Ok(())
    }

    /// Entry point for WASM
    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Math Defender starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let tuning = web::load_tuning(TUNING_URL).await;
        let bank = web::load_equations(EQUATIONS_URL).await;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        resize_canvas(&window, &canvas);

        let renderer = CanvasRenderer::new(&canvas);
        if renderer.is_none() {
            log::error!("2D canvas context unavailable, rendering disabled");
        }

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game {
            audio: AudioManager::new(&tuning.audio),
            state: RunState::with_tuning(seed, bank, tuning),
            clock: FrameClock::new(),
            fx: Effects::new(seed),
            renderer,
            input: TickInput::default(),
            shown: None,
        }));

        load_shooter_image(game.clone());
        setup_buttons(&document, game.clone());
        setup_input_handlers(&window, &document, game.clone());
        setup_resize(&window, canvas, game.clone());

        request_animation_frame(game);

        log::info!("Math Defender running!");
    }

    fn resize_canvas(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    fn load_shooter_image(game: Rc<RefCell<Game>>) {
        let image = match HtmlImageElement::new() {
            Ok(image) => image,
            Err(e) => {
                log::warn!("Could not create shooter image: {:?}", e);
                if let Some(r) = game.borrow_mut().renderer.as_mut() {
                    r.shooter.failed();
                }
                return;
            }
        };

        {
            let game = game.clone();
            let loaded = image.clone();
            let closure = Closure::<dyn FnMut()>::new(move || {
                if let Some(r) = game.borrow_mut().renderer.as_mut() {
                    r.shooter.loaded(loaded.clone());
                }
                log::info!("Shooter image loaded");
            });
            image.set_onload(Some(closure.as_ref().unchecked_ref()));
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut()>::new(move || {
                if let Some(r) = game.borrow_mut().renderer.as_mut() {
                    r.shooter.failed();
                }
            });
            image.set_onerror(Some(closure.as_ref().unchecked_ref()));
            closure.forget();
        }

        image.set_src(SHOOTER_URL);
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        for id in ["playButton", "playAgainButton"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                    game.borrow_mut().start();
                });
                let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        if let Some(btn) = document.get_element_by_id("quitButton") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().quit();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_input_handlers(window: &web_sys::Window, document: &Document, game: Rc<RefCell<Game>>) {
        // Enter submits the answer field
        if let Some(input) = answer_input(document) {
            let game = game.clone();
            let field = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.key() != "Enter" {
                    return;
                }
                let mut g = game.borrow_mut();
                let value = field.value();
                if let Some(answer) = ui::accept_submission(&value, g.state.is_active()) {
                    g.input.answers.push(answer.to_string());
                    field.set_value("");
                }
            });
            let _ = input
                .add_event_listener_with_callback("keypress", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Any click or key press may unblock music
        for kind in ["click", "keydown"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                // The button handlers may hold the borrow during dispatch
                if let Ok(g) = game.try_borrow() {
                    g.audio.on_user_gesture();
                }
            });
            let _ = window.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(window: &web_sys::Window, canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else { return };
            let (width, height) = resize_canvas(&window, &canvas);
            if let Some(r) = game.borrow_mut().renderer.as_mut() {
                r.resize(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render(time);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_dom(&document);
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Math Defender (native) starting...");
    log::info!("The game itself runs in the browser - build with `trunk serve`");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let summary = demo::autoplay(seed);
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Could not serialize summary: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless autoplay: answers the lowest target every so often, skipping
/// some so that misses happen too
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use math_defender::sim::{self, EquationBank, RunState, RunSummary, TickInput};
    use math_defender::{Tuning, consts::SIM_HZ};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    /// Ticks between answers
    const THINK_TICKS: u64 = 45;
    /// Chance of letting a target fall
    const SKIP_CHANCE: f64 = 0.15;
    /// Give up after ten simulated minutes
    const MAX_TICKS: u64 = SIM_HZ as u64 * 600;

    pub fn autoplay(seed: u64) -> RunSummary {
        let mut state = RunState::with_tuning(seed, EquationBank::fallback(), Tuning::default());
        let mut rng = Pcg32::seed_from_u64(seed ^ 0x00de_ad00);
        sim::start_run(&mut state);

        while state.is_active() && state.time_ticks < MAX_TICKS {
            let mut input = TickInput::default();
            if state.time_ticks % THINK_TICKS == 0 && !rng.random_bool(SKIP_CHANCE) {
                let lowest = state
                    .alive_targets()
                    .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y));
                if let Some(target) = lowest {
                    input.answers.push(format!("{}", target.answer));
                }
            }
            sim::tick(&mut state, &input);
            for event in state.drain_events() {
                log::debug!("{:?}", event);
            }
        }

        log::info!(
            "Demo finished after {:.1}s: score {}, health {}",
            state.time_ticks as f64 / SIM_HZ as f64,
            state.score,
            state.health
        );
        state.summary()
    }
}

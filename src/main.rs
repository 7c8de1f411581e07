//! Neon Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent};

    use neon_runner::audio::{AudioManager, SoundEffect};
    use neon_runner::commentary::Commentator;
    use neon_runner::consts::*;
    use neon_runner::highscores::HighScore;
    use neon_runner::renderer::SdfRenderState;
    use neon_runner::sim::{GameEvent, GameState, Status, TickInput, tick};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        render_state: Option<SdfRenderState>,
        audio: AudioManager,
        high_score: HighScore,
        commentator: Commentator,
        accumulator: f64,
        last_time: f64,
        input: TickInput,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            Self {
                state: GameState::new(seed),
                render_state: None,
                audio: AudioManager::new(),
                high_score: HighScore::load(),
                commentator: Commentator::new(),
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt_ms: f64, now_ms: f64) {
            // A backgrounded tab can hand us a huge delta; cap it
            let dt_ms = dt_ms.min(100.0);
            self.accumulator += dt_ms;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                tick(&mut self.state, &input, SIM_DT_MS);
                self.accumulator -= SIM_DT_MS;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.jump = false;
            }

            self.drain_events(now_ms);
        }

        /// Forward queued simulation events to audio, persistence and commentary
        fn drain_events(&mut self, now_ms: f64) {
            let events = std::mem::take(&mut self.state.events);
            for event in events {
                match event {
                    GameEvent::RunStarted => {
                        self.commentator.on_run_started();
                        log::info!("Run started");
                    }
                    GameEvent::Jump => self.audio.play(SoundEffect::Jump),
                    GameEvent::Coin => self.audio.play(SoundEffect::Coin),
                    GameEvent::Crash => {
                        self.audio.play(SoundEffect::Crash);
                        let final_score = self.state.score as u32;
                        let previous_best = self.high_score.best;
                        if self.high_score.record(final_score) {
                            log::info!("New high score: {}m", final_score);
                        }
                        self.high_score.save();
                        self.commentator.run_ended(&self.state, previous_best, now_ms);
                    }
                    GameEvent::Milestone(kind) => {
                        self.commentator
                            .milestone(&self.state, self.high_score.best, kind, now_ms);
                    }
                }
            }
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.state, time) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let window = web_sys::window().unwrap();
            let document = window.document().unwrap();

            // Coin counter
            if let Some(el) = document.query_selector("#hud-coins .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.state.coins.to_string()));
            }

            // Distance, zero padded like an odometer
            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&format!("{:06}", self.state.score as u32)));
            }

            // Show/hide title overlay
            if let Some(el) = document.get_element_by_id("start-overlay") {
                if self.state.status == Status::Start {
                    let _ = el.set_attribute("class", "");
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }

            // Show/hide game over
            if let Some(el) = document.get_element_by_id("game-over") {
                if self.state.status == Status::GameOver {
                    let _ = el.set_attribute("class", "");
                    if let Some(score_el) = document.get_element_by_id("final-score") {
                        score_el.set_text_content(Some(&format!("{}m", self.state.score as u32)));
                    }
                    if let Some(best_el) = document.get_element_by_id("final-best") {
                        best_el.set_text_content(Some(&format!("{}m", self.high_score.best)));
                    }
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Neon Runner starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = SdfRenderState::new(surface, &adapter, width, height).await;
        game.borrow_mut().render_state = Some(render_state);

        // Set up input handlers
        setup_input_handlers(game.clone());

        // Set up restart button
        setup_restart_button(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Neon Runner running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        // Keyboard: Space or ArrowUp
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                match event.code().as_str() {
                    "Space" | "ArrowUp" => {
                        event.prevent_default();
                        let mut g = game.borrow_mut();
                        g.audio.resume();
                        g.input.jump = true;
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse - anywhere on the page counts, overlays included
        {
            let game = game.clone();
            let document = web_sys::window().unwrap().document().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.input.jump = true;
            });
            let _ = document
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let document = web_sys::window().unwrap().document().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.input.jump = true;
            });
            let _ = document
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt_ms = if g.last_time > 0.0 {
                time - g.last_time
            } else {
                SIM_DT_MS
            };
            g.last_time = time;

            g.update(dt_ms, time);
            g.render(time);
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.input.jump = true;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
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
    log::info!("Neon Runner (native) starting...");
    log::info!("Rendering requires a browser - run with `trunk serve` for the web version");

    run_headless_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted run exercising the simulation without a renderer
#[cfg(not(target_arch = "wasm32"))]
fn run_headless_demo() {
    use neon_runner::consts::SIM_DT_MS;
    use neon_runner::sim::{GameEvent, GameState, TickInput, tick};

    let mut state = GameState::new(42);
    // Press once to leave the title screen
    tick(&mut state, &TickInput { jump: true }, SIM_DT_MS);

    let mut jumps = 0u32;
    let mut crashes = 0u32;
    for frame in 0..600u32 {
        let jump = frame % 90 == 89;
        if jump {
            jumps += 1;
        }
        tick(&mut state, &TickInput { jump }, SIM_DT_MS);
        for event in state.events.drain(..) {
            if let GameEvent::Crash = event {
                crashes += 1;
                log::info!("Crashed at frame {}", frame);
            }
        }
    }

    log::info!(
        "Headless demo: {}m, {} coins, speed {:.2}, {} jumps, {} crashes",
        state.score as u32,
        state.coins,
        state.speed,
        jumps,
        crashes
    );
}

//! Minicade entry point
//!
//! Web: wires DOM events and requestAnimationFrame to a [`Session`].
//! Native: runs one game headless with a scripted player.
//!
//! [`Session`]: minicade::Session

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use minicade::audio::WebAudioSink;
    use minicade::platform::{InputAdapter, InputEvent, Key, LoopDriver, on_visibility_change, to_field};
    use minicade::sim::GamePhase;
    use minicade::storage::{KeyValueStore, LocalStore, UnavailableStore};
    use minicade::{GameId, Session};

    /// Game instance holding all state
    struct Game {
        session: Session,
        driver: LoopDriver,
        input: InputAdapter,
        canvas: HtmlCanvasElement,
        document: Document,
        last_phase: GamePhase,
    }

    impl Game {
        /// Client coordinates to field coordinates
        fn field_pos(&self, client_x: i32, client_y: i32) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            to_field(
                Vec2::new(client_x as f32, client_y as f32),
                Vec2::new(rect.left() as f32, rect.top() as f32),
                Vec2::new(rect.width() as f32, rect.height() as f32),
                self.session.game().field(),
            )
        }

        /// Run the ticks owed for this frame
        fn update(&mut self, time: f64) {
            let ticks = self.driver.advance(time);
            for _ in 0..ticks {
                let input = self.input.take_tick_input();
                self.session.tick(&input);
            }

            let phase = self.session.game().phase();
            if phase != self.last_phase {
                log::debug!("{} -> {}", self.last_phase.as_str(), phase.as_str());
                self.last_phase = phase;
            }
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn update_hud(&self) {
            let hud = self.session.hud();
            self.set_text("score", &hud.score.to_string());
            self.set_text("best", &self.session.best().to_string());
            let status = match hud.phase {
                GamePhase::Idle => "Press space or tap to start",
                GamePhase::Running => "",
                GamePhase::Paused => "Paused",
                GamePhase::Over => "Game over - press space to play again",
            };
            self.set_text("status", status);
            let extras: Vec<String> = hud
                .extras
                .iter()
                .map(|(label, value)| format!("{label}: {value}"))
                .collect();
            self.set_text("extras", &extras.join("  "));
        }
    }

    /// `?game=flappy&seed=7`
    fn parse_query(search: &str) -> (GameId, Option<u64>) {
        let mut game = GameId::default();
        let mut seed = None;
        for pair in search.trim_start_matches('?').split('&') {
            match pair.split_once('=') {
                Some(("game", value)) => game = GameId::from_str(value).unwrap_or_default(),
                Some(("seed", value)) => seed = value.parse().ok(),
                _ => {}
            }
        }
        (game, seed)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            return;
        }

        log::info!("Minicade starting...");

        let Some(window) = web_sys::window() else {
            log::error!("no window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("no document");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("no canvas");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let search = window.location().search().unwrap_or_default();
        let (id, seed) = parse_query(&search);
        let seed = seed.unwrap_or_else(|| js_sys::Date::now() as u64);

        let store: Box<dyn KeyValueStore> = match LocalStore::new() {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("LocalStorage unavailable, scores will not persist: {e}");
                Box::new(UnavailableStore)
            }
        };
        let audio = WebAudioSink::new(0.5);
        let session = Session::launch(id, seed, store, Box::new(audio));

        let field = session.game().field();
        canvas.set_width(field.x as u32);
        canvas.set_height(field.y as u32);

        let game = Rc::new(RefCell::new(Game {
            session,
            driver: LoopDriver::new(),
            input: InputAdapter::new(),
            canvas: canvas.clone(),
            document: document.clone(),
            last_phase: GamePhase::Idle,
        }));

        setup_input_handlers(&window, &canvas, game.clone());
        setup_auto_pause(&window, &document, game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game);

        log::info!("Minicade running {}", id.as_str());
    }

    fn setup_input_handlers(window: &web_sys::Window, canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = Key::from_dom(&event.key());
                if matches!(key, Key::Space | Key::ArrowUp | Key::ArrowDown) {
                    event.prevent_default();
                }
                game.borrow_mut().input.handle(InputEvent::KeyDown {
                    key,
                    repeat: event.repeat(),
                });
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = Key::from_dom(&event.key());
                game.borrow_mut().input.handle(InputEvent::KeyUp { key });
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let pos = g.field_pos(event.client_x(), event.client_y());
                g.input.handle(InputEvent::PointerDown(pos));
            });
            let _ = canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let pos = g.field_pos(event.client_x(), event.client_y());
                g.input.handle(InputEvent::PointerMove(pos));
            });
            let _ = canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.handle(InputEvent::PointerUp);
            });
            let _ = window.add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut g = game.borrow_mut();
                    let pos = g.field_pos(touch.client_x(), touch.client_y());
                    g.input.handle(InputEvent::TouchStart(pos));
                }
            });
            let _ = canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut g = game.borrow_mut();
                    let pos = g.field_pos(touch.client_x(), touch.client_y());
                    g.input.handle(InputEvent::TouchMove(pos));
                }
            });
            let _ = canvas.add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                game.borrow_mut().input.handle(InputEvent::TouchEnd);
            });
            let _ = canvas.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(window: &web_sys::Window, document: &Document, game: Rc<RefCell<Game>>) {
        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
                let mut g = game.borrow_mut();
                let g = &mut *g;
                on_visibility_change(
                    hidden,
                    &mut g.driver,
                    &mut g.input,
                    g.session.game().phase(),
                    g.session.settings(),
                );
            });
            let _ = document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur (click outside): keys released while unfocused never arrive
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().input.release_all();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
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
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use minicade::audio::NullSink;
    use minicade::platform::{InputAdapter, InputEvent, Key, LoopDriver};
    use minicade::sim::GamePhase;
    use minicade::storage::{FileStore, KeyValueStore, MemoryStore};
    use minicade::{GameId, Session};

    const USAGE: &str = "usage: minicade [runner|flappy|memory|shooter|tennis] [ticks] [seed]";
    const STORE_PATH: &str = "minicade-data.json";

    struct Args {
        game: GameId,
        ticks: u64,
        seed: u64,
    }

    fn parse_args(args: &[String]) -> Result<Args, String> {
        let game = match args.first() {
            Some(name) => GameId::from_str(name).ok_or_else(|| format!("unknown game '{name}'"))?,
            None => GameId::default(),
        };
        let ticks = match args.get(1) {
            Some(raw) => raw.parse().map_err(|_| format!("bad tick count '{raw}'"))?,
            None => 3600,
        };
        let seed = match args.get(2) {
            Some(raw) => raw.parse().map_err(|_| format!("bad seed '{raw}'"))?,
            None => 1,
        };
        Ok(Args { game, ticks, seed })
    }

    fn tap(key: Key) -> [InputEvent; 2] {
        [
            InputEvent::KeyDown {
                key: key.clone(),
                repeat: false,
            },
            InputEvent::KeyUp { key },
        ]
    }

    /// Scripted player. It only sees the field size, never the game state.
    fn autoplay(id: GameId, tick: u64, field: Vec2, rng: &mut Pcg32) -> Vec<InputEvent> {
        let mut events = Vec::new();
        match id {
            GameId::Runner if tick % 45 == 0 => events.extend(tap(Key::Space)),
            GameId::Flappy if tick % 28 == 0 => events.extend(tap(Key::Space)),
            GameId::Memory if tick % 31 == 0 => {
                // Click a random card centre; cards are 100 px on a 115 px pitch
                let cols = ((field.x + 15.0) / 115.0).round().max(1.0) as u32;
                let rows = ((field.y + 15.0) / 115.0).round().max(1.0) as u32;
                let col = rng.random_range(0..cols) as f32;
                let row = rng.random_range(0..rows) as f32;
                let pos = Vec2::new(col * 115.0 + 50.0, row * 115.0 + 50.0);
                events.push(InputEvent::PointerDown(pos));
                events.push(InputEvent::PointerUp);
            }
            GameId::Shooter => {
                if tick == 0 {
                    events.extend(tap(Key::Space));
                }
                let key = |left: bool| if left { Key::ArrowLeft } else { Key::ArrowRight };
                if tick % 90 == 0 {
                    let left = (tick / 90) % 2 == 0;
                    events.push(InputEvent::KeyUp { key: key(!left) });
                    events.push(InputEvent::KeyDown {
                        key: key(left),
                        repeat: false,
                    });
                }
            }
            GameId::Tennis => {
                if tick == 0 {
                    events.extend(tap(Key::Space));
                }
                let y = field.y / 2.0 + (tick as f32 * 0.05).sin() * field.y * 0.4;
                events.push(InputEvent::PointerMove(Vec2::new(20.0, y)));
            }
            _ => {}
        }
        events
    }

    fn open_store() -> Box<dyn KeyValueStore> {
        match FileStore::open(STORE_PATH) {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("Cannot open {STORE_PATH}, scores will not persist: {e}");
                Box::new(MemoryStore::new())
            }
        }
    }

    pub fn run() {
        let raw: Vec<String> = std::env::args().skip(1).collect();
        let args = match parse_args(&raw) {
            Ok(args) => args,
            Err(msg) => {
                eprintln!("{msg}\n{USAGE}");
                std::process::exit(2);
            }
        };

        let mut session = Session::launch(args.game, args.seed, open_store(), Box::new(NullSink));
        let mut driver = LoopDriver::new();
        let mut input = InputAdapter::new();
        let mut rng = Pcg32::seed_from_u64(args.seed);
        let field = session.game().field();

        let mut ticks = 0;
        let mut frame = 0u64;
        'frames: while ticks < args.ticks {
            let now_ms = frame as f64 * 1000.0 / 60.0;
            frame += 1;
            for _ in 0..driver.advance(now_ms) {
                for event in autoplay(args.game, ticks, field, &mut rng) {
                    input.handle(event);
                }
                session.tick(&input.take_tick_input());
                ticks += 1;
                if session.game().phase() == GamePhase::Over || ticks >= args.ticks {
                    break 'frames;
                }
            }
        }

        let hud = session.hud();
        log::info!(
            "{} stopped after {ticks} ticks ({})",
            args.game.as_str(),
            hud.phase.as_str()
        );
        println!(
            "{}: score {} (best {}) after {ticks} ticks, {}",
            args.game.as_str(),
            hud.score,
            session.best(),
            hud.phase.as_str()
        );
        for (label, value) in hud.extras {
            println!("  {label}: {value}");
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

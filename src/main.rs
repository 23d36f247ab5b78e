//! Bridge Builder entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::PI;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlAudioElement, HtmlCanvasElement, MouseEvent,
    };

    use bridge_builder::audio::{AudioManager, WebAudioSink};
    use bridge_builder::consts::*;
    use bridge_builder::sim::layout::{SegmentSprite, object_anchor, segment_sprites};
    use bridge_builder::sim::{BudgetBand, Load, Material, RunPhase, Shape};
    use bridge_builder::{BridgeSession, BuildError, SessionEvent, Settings};

    /// Game instance holding all state
    struct Game {
        session: BridgeSession,
        audio: AudioManager<WebAudioSink>,
        music: Option<HtmlAudioElement>,
        ctx: CanvasRenderingContext2d,
        last_time: f64,
    }

    impl Game {
        /// Run due animation ticks
        fn update(&mut self, dt: f32) {
            self.session.advance(dt);
            self.play_events();
        }

        /// Route session events to audio
        fn play_events(&mut self) {
            for event in self.session.drain_events() {
                match event {
                    SessionEvent::Cue(cue) => self.audio.play_cue(cue),
                    SessionEvent::Succeeded(result) | SessionEvent::Failed(result) => {
                        log::info!(
                            "{} result: {} stars, {}% left",
                            result.load_type,
                            result.stars,
                            result.efficiency_rounded()
                        );
                    }
                }
            }
        }

        /// Background music needs a user gesture before it may play
        fn start_music(&mut self) {
            if self.music.is_some() {
                return;
            }
            let settings = self.session.settings();
            if !settings.sound_enabled {
                return;
            }
            match HtmlAudioElement::new_with_src(settings.music_track.url()) {
                Ok(el) => {
                    el.set_loop(true);
                    el.set_volume(settings.effective_volume() as f64 * 0.3);
                    let _ = el.play();
                    log::info!("Playing {}", settings.music_track.as_str());
                    self.music = Some(el);
                }
                Err(e) => log::warn!("Failed to create music element: {:?}", e),
            }
        }

        /// Render the current frame
        fn render(&self) {
            let ctx = &self.ctx;
            let w = SCENE_WIDTH as f64;
            let h = SCENE_HEIGHT as f64;
            let ground = GROUND_Y as f64;

            // Sky
            ctx.set_fill_style_str("#87ceeb");
            ctx.fill_rect(0.0, 0.0, w, h);

            // Water in the gap
            ctx.set_fill_style_str("#1e6fd9");
            let water_top = WATER_Y as f64 - 10.0;
            ctx.fill_rect(GAP_START as f64, water_top, (GAP_END - GAP_START) as f64, h - water_top);

            // Banks
            ctx.set_fill_style_str("#6b8e23");
            ctx.fill_rect(0.0, ground, GAP_START as f64, h - ground);
            ctx.fill_rect(GAP_END as f64, ground, w - GAP_END as f64, h - ground);

            let anim = self.session.animation();
            for sprite in segment_sprites(self.session.assembly().segments(), anim) {
                draw_segment(ctx, &sprite);
            }

            if let Some(anchor) = object_anchor(anim) {
                if let Some(load) = anim.load() {
                    let (ow, oh) = object_size(load.id);
                    ctx.set_fill_style_str(load_color(load.id));
                    ctx.fill_rect(
                        anchor.x as f64 - ow / 2.0,
                        anchor.y as f64 - oh,
                        ow,
                        oh,
                    );
                }
            }

            // Splash
            ctx.set_fill_style_str("#e0f4ff");
            for p in &anim.particles {
                ctx.set_global_alpha(p.life.clamp(0.0, 1.0) as f64);
                ctx.begin_path();
                let _ = ctx.arc(p.pos.x as f64, p.pos.y as f64, p.size as f64, 0.0, 2.0 * PI);
                ctx.fill();
            }
            ctx.set_global_alpha(1.0);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            let snap = self.session.snapshot();

            if let Some(el) = document.get_element_by_id("budget") {
                el.set_text_content(Some(&format!("${}", snap.budget.remaining)));
                let band = match snap.budget_band {
                    BudgetBand::Healthy => "healthy",
                    BudgetBand::Low => "low",
                    BudgetBand::Critical => "critical",
                };
                let _ = el.set_attribute("class", &format!("budget {}", band));
            }

            if let Some(el) = document.get_element_by_id("result") {
                let text = match &snap.last_result {
                    Some(r) if r.success => format!(
                        "{} made it! {} {}% budget left",
                        r.load_type,
                        "★".repeat(r.stars as usize),
                        r.efficiency_rounded()
                    ),
                    Some(r) => format!("The bridge collapsed under the {}!", r.load_type),
                    None if snap.animation.phase.is_running() => "Testing...".to_string(),
                    None => String::new(),
                };
                el.set_text_content(Some(&text));
            }

            set_disabled(document, "add-segment", !snap.can_add_segment);
            set_disabled(document, "run-test", !snap.can_run_test);
            for material in Material::ALL {
                let affordable = snap
                    .affordable
                    .iter()
                    .any(|&(m, ok)| m == material && ok);
                set_disabled(document, &format!("material-{}", material.as_str()), !affordable);
            }

            let phase = snap.animation.phase;
            let has_next = snap.selection.load.next().is_some();
            set_hidden(document, "next-load", !(phase == RunPhase::Succeeded && has_next));
            set_hidden(document, "try-again", !phase.is_terminal());
        }
    }

    fn material_color(material: Material) -> &'static str {
        match material {
            Material::Wood => "#8b5a2b",
            Material::Stone => "#7d7d7d",
            Material::Concrete => "#b5b5ad",
            Material::Steel => "#4682b4",
        }
    }

    fn load_color(load: Load) -> &'static str {
        match load {
            Load::Person => "#ff7f50",
            Load::Car => "#dc143c",
            Load::Truck => "#ff8c00",
            Load::Bus => "#ffd700",
            Load::Tank => "#556b2f",
        }
    }

    fn object_size(load: Load) -> (f64, f64) {
        match load {
            Load::Person => (12.0, 30.0),
            Load::Car => (40.0, 20.0),
            Load::Truck => (50.0, 28.0),
            Load::Bus => (60.0, 30.0),
            Load::Tank => (55.0, 25.0),
        }
    }

    fn draw_segment(ctx: &CanvasRenderingContext2d, sprite: &SegmentSprite) {
        let r = sprite.rect;
        let (x, y) = (r.min.x as f64, r.min.y as f64);
        let (w, h) = (r.size.x as f64, r.size.y as f64);

        ctx.set_fill_style_str(material_color(sprite.segment.material));
        ctx.set_stroke_style_str("#333333");
        ctx.set_line_width(1.5);

        match sprite.segment.shape {
            Shape::Straight => {
                ctx.fill_rect(x, y, w, h);
                ctx.stroke_rect(x, y, w, h);
            }
            Shape::Triangle => {
                ctx.fill_rect(x, y, w, h * 0.3);
                ctx.begin_path();
                ctx.move_to(x, y + h * 0.3);
                ctx.line_to(x + w / 2.0, y + h);
                ctx.line_to(x + w, y + h * 0.3);
                ctx.stroke();
            }
            Shape::Arch => {
                ctx.fill_rect(x, y, w, 8.0);
                ctx.begin_path();
                let _ = ctx.arc(x + w / 2.0, y + h, w / 2.0, PI, 2.0 * PI);
                ctx.stroke();
            }
            Shape::IBeam => {
                ctx.fill_rect(x, y, w, 6.0);
                ctx.fill_rect(x + w * 0.4, y + 6.0, w * 0.2, h - 12.0);
                ctx.fill_rect(x, y + h - 6.0, w, 6.0);
            }
        }
    }

    fn set_disabled(document: &Document, id: &str, disabled: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = if disabled {
                el.set_attribute("disabled", "")
            } else {
                el.remove_attribute("disabled")
            };
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialised".into());
        }

        log::info!("Bridge Builder starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no #canvas element"))?
            .dyn_into()?;
        canvas.set_width(SCENE_WIDTH as u32);
        canvas.set_height(SCENE_HEIGHT as u32);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;

        // Splash droplets vary per page load; outcomes never depend on this
        let settings = Settings {
            splash_seed: js_sys::Date::now() as u64,
            ..Settings::default()
        };
        let audio = AudioManager::with_settings(WebAudioSink::new(), &settings);
        let game = Rc::new(RefCell::new(Game {
            session: BridgeSession::new(settings),
            audio,
            music: None,
            ctx,
            last_time: 0.0,
        }));

        setup_buttons(&document, &game);

        // Start game loop
        request_animation_frame(game);

        log::info!("Bridge Builder running!");
        Ok(())
    }

    /// Wire a button to a session action; rejected actions are logged
    fn on_click<F>(document: &Document, id: &str, game: &Rc<RefCell<Game>>, action: F)
    where
        F: Fn(&mut BridgeSession) -> Result<(), BuildError> + 'static,
    {
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("Missing button #{}", id);
            return;
        };
        let game = game.clone();
        let id = id.to_string();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let mut g = game.borrow_mut();
            g.audio.sink().resume();
            g.start_music();
            if let Err(e) = action(&mut g.session) {
                log::warn!("#{}: {}", id, e);
            }
            g.play_events();
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, game: &Rc<RefCell<Game>>) {
        for material in Material::ALL {
            let id = format!("material-{}", material.as_str());
            on_click(document, &id, game, move |s| s.select_material(material));
        }
        for shape in Shape::ALL {
            let id = format!("shape-{}", shape.as_str());
            on_click(document, &id, game, move |s| s.select_shape(shape));
        }
        for load in Load::ALL {
            let id = format!("load-{}", load.as_str());
            on_click(document, &id, game, move |s| s.select_load(load));
        }
        on_click(document, "add-segment", game, |s| s.add_segment().map(|_| ()));
        on_click(document, "clear", game, |s| {
            s.clear_assembly();
            Ok(())
        });
        on_click(document, "run-test", game, |s| s.run_test().map(|_| ()));
        on_click(document, "next-load", game, |s| {
            s.next_load();
            Ok(())
        });
        on_click(document, "try-again", game, |s| {
            s.try_again();
            Ok(())
        });
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

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                TICK_MS as f32 / 1000.0
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Bridge Builder (native) starting...");
    log::info!("Native mode runs a headless demo - run with `trunk serve` for the web version");

    println!("\nRunning load tests...");
    headless_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Build a few bridges and drive each load across with a manual clock
#[cfg(not(target_arch = "wasm32"))]
fn headless_demo() {
    use bridge_builder::audio::{AudioManager, LogSink};
    use bridge_builder::sim::{Load, Material, Shape};
    use bridge_builder::{BridgeSession, SessionEvent, Settings};

    let plans: [(Load, &[(Material, Shape)]); 3] = [
        (Load::Person, &[(Material::Wood, Shape::Straight)]),
        (
            Load::Car,
            &[(Material::Stone, Shape::Triangle), (Material::Stone, Shape::Triangle)],
        ),
        (Load::Tank, &[(Material::Steel, Shape::IBeam); 3]),
    ];

    let settings = Settings::default();
    let mut audio = AudioManager::with_settings(LogSink, &settings);
    let mut session = BridgeSession::new(settings);

    for (load, pieces) in plans {
        session.clear_assembly();
        if let Err(e) = session.select_load(load) {
            log::warn!("could not select {}: {}", load.as_str(), e);
            continue;
        }
        for &(material, shape) in pieces {
            if let Err(e) = session.select_material(material) {
                log::warn!("could not select {}: {}", material.as_str(), e);
            }
            if let Err(e) = session.select_shape(shape) {
                log::warn!("could not select {}: {}", shape.as_str(), e);
            }
            if let Err(e) = session.add_segment() {
                log::warn!("could not place {}: {}", material.as_str(), e);
            }
        }

        let verdict = match session.run_test() {
            Ok(verdict) => verdict,
            Err(e) => {
                log::warn!("test refused: {}", e);
                continue;
            }
        };
        let mut ticks = 0;
        while session.is_testing() {
            session.tick();
            ticks += 1;
        }

        for event in session.drain_events() {
            match event {
                SessionEvent::Cue(cue) => audio.play_cue(cue),
                SessionEvent::Succeeded(r) | SessionEvent::Failed(r) => println!(
                    "{:>6}: strength {:>4.1} vs {:>4.1} -> {} in {} ticks ({} stars, {}% left)",
                    r.load_type,
                    verdict.bridge_strength,
                    verdict.required_strength,
                    if r.success { "held" } else { "collapsed" },
                    ticks,
                    r.stars,
                    r.efficiency_rounded()
                ),
            }
        }
    }

    println!(
        "Total stars this session: {}",
        session.scoreboard().total_stars()
    );
}

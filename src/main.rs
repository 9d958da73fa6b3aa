// What you SEE:
// • Live camera fills the window (mirrored like a selfie by default).
// • Pinch a frame with thumb + index finger and hold still: the outline turns
//   from red to green, the bar fills, and the framed pixels freeze into a tile.
// • Drag tiles around with the mouse. SWITCH / CLEAR / DOWNLOAD buttons
//   (or W / C / S) switch camera, wipe tiles, save the collage. ESC quits.

mod camera;
mod capture;
mod config;
mod detector;
mod draw;
mod engine;
mod error;
mod export;
mod geometry;
mod hover;
mod input;
mod pixels;
mod tiles;
mod types;
mod ui;

use camera::CameraCapture;
use clap::Parser;
use config::{Args, Config};
use detector::{HandDetector, LandmarkSlot};
use draw::{Drawer, WHITE, draw_collage, draw_text_5x7};
use engine::CollageEngine;
use error::Error;
use input::{PointerEvent, Propagation};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use types::FrameBuffer;
use ui::{Action, Toolbar};

fn main() -> Result<(), Error> {
    let args = Args::parse();

    if args.print_config {
        println!("{}", Config::default().to_toml()?);
        return Ok(());
    }

    init_logging(&args);
    info!("Starting pinch-collage v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_args(&args).inspect_err(|e| error!("{}", e))?;

    /* --- Camera + window setup ---
       Visual: window opens with live camera feed. */
    let mut cam = CameraCapture::new(
        config.camera.index,
        config.camera.width,
        config.camera.height,
        config.camera.fps,
    )?;
    let (w, h) = cam.resolution();
    let (w, h) = (w as usize, h as usize);
    let mut drawer = Drawer::new("Pinch Collage", w, h)?;

    /* --- Hand detector ---
       Visual: none directly; without it the viewfinder simply never appears. */
    let detector = if config.detector.enabled {
        match HandDetector::spawn(&config.detector_options(), LandmarkSlot::new()) {
            Ok(d) => Some(d),
            Err(e) => {
                warn!("running without hand tracking: {}", e);
                None
            }
        }
    } else {
        info!("hand detector disabled");
        None
    };
    let mut detector_alive = detector.is_some();

    let mut engine = CollageEngine::new(config.settings(), w as f32);
    let mut toolbar = Toolbar::new(w as i32, h as i32);

    /* --- Reusable buffers ---
       `scene` is the collage in camera coordinates; `screen` is what you actually see. */
    let mut scene = FrameBuffer::filled(w, h, 0);
    let mut screen = FrameBuffer::filled(w, h, 0);

    // Front camera = configured index, mirrored per config; the other one never is.
    let mut on_front = true;
    let mut switch_pending = false;

    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        // A switch requested last frame runs now, after the busy label was shown once.
        if switch_pending {
            switch_camera(&mut cam, &config, &mut on_front, &mut engine);
            switch_pending = false;
            toolbar.set_switching(false);
        }

        let now = Instant::now();

        /* 1) Fresh frame, stretched to the canvas if this camera differs in size. */
        let raw = cam.next_frame()?;
        let live = Arc::new(if raw.width == w && raw.height == h { raw } else { pixels::fit_to(&raw, w, h) });

        /* 2) Hands: hand the frame to the detector, read whatever it last finished. */
        let hands = match &detector {
            Some(d) => {
                d.offer(&live);
                if detector_alive && !d.is_alive() {
                    warn!("hand detector exited; tiles can still be dragged");
                    detector_alive = false;
                }
                d.slot().snapshot()
            }
            None => Vec::new(),
        };

        /* 3) Inputs, in arrival order. */
        let events = drawer.poll_pointer();
        let mut actions = Vec::new();
        if drawer.w_pressed_once() { actions.push(Action::SwitchCamera); }
        if drawer.c_pressed_once() { actions.push(Action::Clear); }
        if drawer.s_pressed_once() { actions.push(Action::Download); }

        /* 4) Core update + collage in camera space. */
        let state = engine.tick(now, &hands, &events, &*live);
        // Presses the collage did not claim may belong to a button.
        for (event, propagation) in events.iter().zip(&state.input) {
            if let (PointerEvent::Start { x, y }, Propagation::NotConsumed) = (event, propagation) {
                actions.extend(toolbar.hit(*x, *y));
            }
        }
        if let Some(id) = state.captured {
            info!(?id, tiles = state.tiles.len(), "snap!");
        }
        let tile_count = state.tiles.len();
        let progress = state.gesture.filter(|g| g.hovering).map(|g| g.progress);
        draw_collage(&mut scene, &live, &state);
        drop(state);

        /* 5) Flip to display space if mirrored. */
        if engine.mirrored() {
            pixels::mirror_into(&scene, &mut screen);
        } else {
            screen.pixels.copy_from_slice(&scene.pixels);
        }

        /* 6) Buttons / shortcuts. DOWNLOAD saves what you see, before UI goes on top. */
        for action in actions {
            match action {
                Action::Clear => engine.clear(),
                Action::Download => {
                    if let Err(e) = export::export_canvas(&screen, &config.export.path) {
                        error!("could not save collage: {}", e);
                    }
                }
                Action::SwitchCamera if !switch_pending => {
                    switch_pending = true;
                    toolbar.set_switching(true);
                }
                Action::SwitchCamera => debug!("camera switch already in progress"),
            }
        }

        /* 7) UI on top, then present. */
        toolbar.draw(&mut screen);
        let hold = match progress {
            _ if engine.hover_state().has_snapped_this_hold => String::from("SNAPPED"),
            Some(p) => format!("{:.0}%", p * 100.0),
            None => String::from("-"),
        };
        let hud = format!("TILES: {} | HOLD: {} | {}", tile_count, hold, hud_fps_text);
        draw_text_5x7(&mut screen, 8, h as i32 - 16, &hud, WHITE);
        drawer.present(&screen)?;

        /* 8) FPS counter (log + HUD once per second) */
        frames_this_second += 1;
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            let fps = frames_this_second as f32 / secs;
            debug!("FPS: {:.1}", fps);
            hud_fps_text = format!("FPS: {:.1}", fps);
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    info!("bye ({} tiles on the canvas)", engine.tiles().len());
    Ok(())
}

/// Toggle between the front (configured) and alternate camera.
/// A camera that fails to open is logged and the current one stays.
fn switch_camera(cam: &mut CameraCapture, config: &Config, on_front: &mut bool, engine: &mut CollageEngine) {
    let target = if *on_front { config.camera.alternate_index } else { config.camera.index };
    info!(from = cam.index(), to = target, "switching camera");
    match CameraCapture::new(target, config.camera.width, config.camera.height, config.camera.fps) {
        Ok(next) => {
            *cam = next;
            *on_front = !*on_front;
            engine.set_mirrored(*on_front && config.input.mirrored);
        }
        Err(e) => warn!("camera switch failed, keeping camera {}: {}", cam.index(), e),
    }
}

fn init_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pinch_collage={}", args.log_level())));
    fmt().with_env_filter(filter).with_target(false).init();
}

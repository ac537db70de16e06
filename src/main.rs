//! Wayglass demo
//!
//! Opens a window (or a wallpaper when WAYGLASS_BACKGROUND is set) and
//! pumps the display at roughly 60 Hz. F toggles fullscreen, Escape quits.

use std::thread;
use std::time::Duration;

use log::info;
use wayglass::{DisplayConfig, Key, WaylandDisplay};

const FRAME_TIME: Duration = Duration::from_millis(16);

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DisplayConfig::default().with_title("Wayglass");
    let mut display = WaylandDisplay::new(config);
    display.initialize(1280, 720, false)?;

    if let Some(size) = display.fullscreen_size() {
        info!("Output mode {}x{}", size.width, size.height);
    }

    'running: while !display.is_closed() {
        display.update();

        let events: Vec<_> = display.drain_events().collect();
        for event in events {
            info!(
                "{:?} {}",
                event.key,
                if event.pressed { "pressed" } else { "released" }
            );
            if !event.pressed {
                continue;
            }
            match event.key {
                Key::Escape => break 'running,
                Key::Char('f') => {
                    let fullscreen = !display.is_fullscreen();
                    display.set_fullscreen(fullscreen);
                }
                _ => {}
            }
        }

        display.swap_buffers();
        thread::sleep(FRAME_TIME);
    }

    info!("Shutting down");
    display.shutdown();
    Ok(())
}

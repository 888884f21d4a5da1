use crate::constants::*;
use crate::timer::JsSleeper;
use crate::media::Sleeper;
use glam::Vec2;
use std::time::Duration;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

pub fn js_err(e: JsValue) -> anyhow::Error {
    anyhow::anyhow!("{:?}", e)
}

pub fn window_document() -> Option<(web::Window, web::Document)> {
    let window = web::window()?;
    let document = window.document()?;
    Some((window, document))
}

pub fn device_pixel_ratio() -> f64 {
    web::window().map_or(1.0, |w| w.device_pixel_ratio())
}

/// Match the canvas backing store to its CSS box times the device pixel ratio.
/// Returns the new size in device pixels.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> Vec2 {
    let dpr = device_pixel_ratio();
    let rect = canvas.get_bounding_client_rect();
    let w_px = ((rect.width() * dpr) as u32).max(1);
    let h_px = ((rect.height() * dpr) as u32).max(1);
    if canvas.width() != w_px {
        canvas.set_width(w_px);
    }
    if canvas.height() != h_px {
        canvas.set_height(h_px);
    }
    Vec2::new(w_px as f32, h_px as f32)
}

/// Client coordinates mapped into canvas pixels.
pub fn client_to_canvas_px(
    client_x: f64,
    client_y: f64,
    canvas: &web::HtmlCanvasElement,
) -> Option<Vec2> {
    let rect = canvas.get_bounding_client_rect();
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let sx = (client_x - rect.left()) / rect.width() * canvas.width() as f64;
    let sy = (client_y - rect.top()) / rect.height() * canvas.height() as f64;
    Some(Vec2::new(sx as f32, sy as f32))
}

pub fn find_canvas(document: &web::Document, id: &str) -> Option<web::HtmlCanvasElement> {
    document
        .get_element_by_id(id)?
        .dyn_into::<web::HtmlCanvasElement>()
        .ok()
}

/// Poll for the canvas until it shows up or the retry budget runs out.
pub async fn acquire_canvas(id: &str) -> Option<web::HtmlCanvasElement> {
    let sleeper = JsSleeper;
    for attempt in 0..CANVAS_RETRY_ATTEMPTS {
        if let Some((_, document)) = window_document() {
            if let Some(canvas) = find_canvas(&document, id) {
                if attempt > 0 {
                    log::info!("[dom] #{} found after {} retries", id, attempt);
                }
                return Some(canvas);
            }
        }
        if attempt % CANVAS_RETRY_LOG_EVERY == 0 {
            log::debug!("[dom] waiting for #{} ({})", id, attempt);
        }
        sleeper
            .sleep(Duration::from_millis(CANVAS_RETRY_INTERVAL_MS))
            .await;
    }
    log::warn!(
        "[dom] #{} not found after {} attempts, background disabled",
        id,
        CANVAS_RETRY_ATTEMPTS
    );
    None
}

/// Playback is signalled by the sticky player's `active` class.
pub fn is_player_active(document: &web::Document) -> bool {
    document
        .get_element_by_id(PLAYER_ELEMENT_ID)
        .is_some_and(|el| el.class_list().contains(PLAYER_ACTIVE_CLASS))
}

use crate::canvas::CanvasSurface;
use crate::dom;
use crate::field::FieldController;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    pub field: Rc<RefCell<FieldController>>,
    pub surface: CanvasSurface,
    pub document: web::Document,
    /// Media element whose playback also counts as "playing".
    pub media: Option<web::HtmlMediaElement>,
}

impl FrameContext {
    fn playing(&self) -> bool {
        dom::is_player_active(&self.document) || self.media.as_ref().is_some_and(|m| !m.paused())
    }

    pub fn frame(&mut self) {
        let now = instant::now();
        let playing = self.playing();
        // a bad frame is logged and skipped; the next one still runs
        if let Err(e) = self
            .field
            .borrow_mut()
            .frame(now, playing, &mut self.surface)
        {
            log::error!("render error: {:?}", e);
        }
    }
}

type Tick = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Running `requestAnimationFrame` chain. Dropping it stops the chain.
pub struct AnimationLoop {
    tick: Tick,
    handle: Rc<Cell<Option<i32>>>,
}

impl AnimationLoop {
    pub fn cancel(&mut self) {
        if let Some(id) = self.handle.take() {
            if let Some(w) = web::window() {
                _ = w.cancel_animation_frame(id);
            }
        }
        // breaks the closure's reference to itself
        self.tick.borrow_mut().take();
    }

    pub fn is_running(&self) -> bool {
        self.tick.borrow().is_some()
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn request_frame(tick: &Tick, handle: &Cell<Option<i32>>) {
    let Some(w) = web::window() else {
        return;
    };
    if let Some(cb) = tick.borrow().as_ref() {
        match w.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(id) => handle.set(Some(id)),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) -> AnimationLoop {
    let tick: Tick = Rc::new(RefCell::new(None));
    let handle = Rc::new(Cell::new(None));
    let tick_clone = tick.clone();
    let handle_clone = handle.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        handle_clone.set(None);
        frame_ctx.borrow_mut().frame();
        request_frame(&tick_clone, &handle_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick, &handle);
    AnimationLoop { tick, handle }
}

use super::Listener;
use crate::dom;
use crate::field::FieldController;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys as web;

pub fn wire_scroll(window: &web::Window, field: &Rc<RefCell<FieldController>>) -> Listener {
    let field = field.clone();
    let win = window.clone();
    Listener::new(window, "scroll", move |_| {
        let Ok(y) = win.scroll_y() else {
            return;
        };
        // scroll offsets are CSS pixels, the field works in canvas pixels
        let y = y * dom::device_pixel_ratio();
        field.borrow_mut().on_scroll(y as f32, instant::now());
    })
}

/// Keep the backing store in step with the layout; the particle batch
/// follows once the resize settles.
pub fn wire_resize(
    window: &web::Window,
    canvas: &web::HtmlCanvasElement,
    field: &Rc<RefCell<FieldController>>,
) -> Listener {
    let canvas = canvas.clone();
    let field = field.clone();
    Listener::new(window, "resize", move |_| {
        let size = dom::sync_canvas_backing_size(&canvas);
        field
            .borrow_mut()
            .on_resize(size.x, size.y, instant::now());
    })
}

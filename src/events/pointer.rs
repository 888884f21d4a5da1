use super::Listener;
use crate::dom;
use crate::field::FieldController;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Track the pointer over the whole window; the canvas sits behind the page.
pub fn wire_pointermove(
    window: &web::Window,
    canvas: &web::HtmlCanvasElement,
    field: &Rc<RefCell<FieldController>>,
) -> Listener {
    let canvas = canvas.clone();
    let field = field.clone();
    Listener::new(window, "pointermove", move |ev: web::Event| {
        let Some(ev) = ev.dyn_ref::<web::MouseEvent>() else {
            return;
        };
        if let Some(pos) =
            dom::client_to_canvas_px(ev.client_x() as f64, ev.client_y() as f64, &canvas)
        {
            field.borrow_mut().on_pointer_move(pos.x, pos.y);
        }
    })
}

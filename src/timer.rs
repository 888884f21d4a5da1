use crate::media::Sleeper;
use std::time::Duration;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// `setTimeout` wrapped in a promise.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsSleeper;

impl Sleeper for JsSleeper {
    async fn sleep(&self, duration: Duration) {
        let ms = duration.as_millis().min(i32::MAX as u128) as i32;
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            let scheduled = web::window().is_some_and(|w| {
                w.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
                    .is_ok()
            });
            if !scheduled {
                _ = resolve.call0(&JsValue::NULL);
            }
        });
        _ = JsFuture::from(promise).await;
    }
}

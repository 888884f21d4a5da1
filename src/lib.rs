//! Audio-reactive particle background and chunked audio storage for the
//! rawbeat site.
//!
//! [`field`] and [`media`] are plain Rust and build on every target. The
//! browser glue (canvas, DOM events, WebAudio, JS store bridge) only exists
//! on `wasm32`.

pub mod field;
pub mod media;

#[cfg(target_arch = "wasm32")]
mod audio;
#[cfg(target_arch = "wasm32")]
mod canvas;
#[cfg(target_arch = "wasm32")]
mod constants;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod events;
#[cfg(target_arch = "wasm32")]
mod frame;
#[cfg(target_arch = "wasm32")]
mod store;
#[cfg(target_arch = "wasm32")]
mod timer;

#[cfg(target_arch = "wasm32")]
pub use web_api::*;

#[cfg(target_arch = "wasm32")]
mod web_api {
    use crate::constants::CANVAS_ELEMENT_ID;
    use crate::field::{FieldController, FieldParams};
    use crate::media::{ChunkPipeline, MediaError, PipelineConfig, Track};
    use crate::store::{BlobSource, JsDocumentStore};
    use crate::timer::JsSleeper;
    use crate::{audio, canvas, dom, events, frame};
    use serde::de::DeserializeOwned;
    use serde::Deserialize;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use wasm_bindgen::prelude::*;
    use web_sys as web;

    // one background per page
    static STARTED: AtomicBool = AtomicBool::new(false);

    #[wasm_bindgen(start)]
    pub fn start() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();
        log::info!("rawbeat-web starting");
        Ok(())
    }

    fn parse_options<T: DeserializeOwned + Default>(value: &JsValue) -> anyhow::Result<T> {
        if value.is_undefined() || value.is_null() {
            return Ok(T::default());
        }
        let text: String = js_sys::JSON::stringify(value)
            .map_err(dom::js_err)?
            .into();
        Ok(serde_json::from_str(&text)?)
    }

    fn anyhow_to_js(e: anyhow::Error) -> JsValue {
        js_sys::Error::new(&format!("{:#}", e)).into()
    }

    fn media_error_to_js(e: MediaError) -> JsValue {
        let err = js_sys::Error::new(&e.to_string());
        _ = js_sys::Reflect::set(
            &err,
            &"kind".into(),
            &format!("{:?}", e.kind()).into(),
        );
        if let Some(n) = e.succeeded() {
            _ = js_sys::Reflect::set(&err, &"succeeded".into(), &(n as u32).into());
        }
        err.into()
    }

    fn report_progress(callback: &Option<js_sys::Function>) -> impl FnMut(f32) + '_ {
        move |pct| {
            if let Some(f) = callback {
                _ = f.call1(&JsValue::NULL, &JsValue::from_f64(pct as f64));
            }
        }
    }

    fn string_keys(keys: &js_sys::Array) -> Vec<String> {
        keys.iter().filter_map(|k| k.as_string()).collect()
    }

    #[derive(Debug, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    struct FieldOptions {
        canvas_id: String,
        #[serde(flatten)]
        params: FieldParams,
        /// Named preset; takes precedence over the individual params.
        preset: Option<Preset>,
        seed: Option<u64>,
    }

    #[derive(Clone, Copy, Debug, Deserialize)]
    #[serde(rename_all = "lowercase")]
    enum Preset {
        Primary,
        Light,
    }

    impl Default for FieldOptions {
        fn default() -> Self {
            Self {
                canvas_id: CANVAS_ELEMENT_ID.to_string(),
                params: FieldParams::default(),
                preset: None,
                seed: None,
            }
        }
    }

    /// Handle to a running background. Dropping it (or calling `free()` from
    /// JS) stops the background as well.
    #[wasm_bindgen]
    pub struct FieldHandle {
        field: Rc<RefCell<FieldController>>,
        frame_ctx: Rc<RefCell<frame::FrameContext>>,
        animation: frame::AnimationLoop,
        listeners: Vec<events::Listener>,
        active: bool,
    }

    #[wasm_bindgen]
    impl FieldHandle {
        /// Cancel the animation loop and detach every listener.
        pub fn stop(&mut self) {
            if !self.active {
                return;
            }
            self.animation.cancel();
            self.listeners.clear();
            self.active = false;
            STARTED.store(false, Ordering::SeqCst);
            log::info!("[field] stopped");
        }

        #[wasm_bindgen(getter)]
        pub fn running(&self) -> bool {
            self.active && self.animation.is_running()
        }

        #[wasm_bindgen(js_name = particleCount)]
        pub fn particle_count(&self) -> usize {
            self.field.borrow().particles().len()
        }

        /// Drive the beat from a live analysis of `element` instead of the
        /// fixed-tempo kick.
        #[wasm_bindgen(js_name = connectAudioVisualizer)]
        pub fn connect_audio_visualizer(
            &self,
            element: web::HtmlMediaElement,
        ) -> Result<(), JsValue> {
            let tap = audio::AnalyserTap::connect(&element).map_err(anyhow_to_js)?;
            self.field.borrow_mut().set_beat_source(Box::new(tap));
            self.frame_ctx.borrow_mut().media = Some(element);
            Ok(())
        }
    }

    impl Drop for FieldHandle {
        fn drop(&mut self) {
            self.stop();
        }
    }

    /// Start the particle background. Resolves to a [`FieldHandle`], or to
    /// `undefined` when the canvas never appears or a background is already
    /// running.
    #[wasm_bindgen(js_name = startField)]
    pub async fn start_field(options: JsValue) -> Result<JsValue, JsValue> {
        let options: FieldOptions = parse_options(&options).map_err(anyhow_to_js)?;
        if STARTED.swap(true, Ordering::SeqCst) {
            log::warn!("[field] already running");
            return Ok(JsValue::UNDEFINED);
        }
        match init_field(options).await {
            Ok(Some(handle)) => Ok(handle.into()),
            Ok(None) => {
                STARTED.store(false, Ordering::SeqCst);
                Ok(JsValue::UNDEFINED)
            }
            Err(e) => {
                STARTED.store(false, Ordering::SeqCst);
                log::error!("init error: {:?}", e);
                Err(anyhow_to_js(e))
            }
        }
    }

    async fn init_field(options: FieldOptions) -> anyhow::Result<Option<FieldHandle>> {
        let Some(canvas) = dom::acquire_canvas(&options.canvas_id).await else {
            return Ok(None);
        };
        let (window, document) =
            dom::window_document().ok_or_else(|| anyhow::anyhow!("no window"))?;

        let params = match options.preset {
            Some(Preset::Primary) => FieldParams::primary(),
            Some(Preset::Light) => FieldParams::light(),
            None => options.params,
        };
        let size = dom::sync_canvas_backing_size(&canvas);
        let seed = options.seed.unwrap_or_else(rand::random);
        let field = Rc::new(RefCell::new(FieldController::new(
            size.x, size.y, params, seed,
        )));

        let listeners = vec![
            events::pointer::wire_pointermove(&window, &canvas, &field),
            events::scroll::wire_scroll(&window, &field),
            events::scroll::wire_resize(&window, &canvas, &field),
        ];

        let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
            field: field.clone(),
            surface: canvas::CanvasSurface::from_canvas(&canvas)?,
            document,
            media: None,
        }));
        let animation = frame::start_loop(frame_ctx.clone());
        log::info!("[field] running on #{}", options.canvas_id);

        Ok(Some(FieldHandle {
            field,
            frame_ctx,
            animation,
            listeners,
            active: true,
        }))
    }

    /// Split `file` into chunk documents in `store`. Resolves to the chunk
    /// keys in order.
    #[wasm_bindgen(js_name = uploadAudio)]
    pub async fn upload_audio(
        file: web::Blob,
        store: JsValue,
        on_progress: Option<js_sys::Function>,
        options: JsValue,
    ) -> Result<js_sys::Array, JsValue> {
        let config: PipelineConfig = parse_options(&options).map_err(anyhow_to_js)?;
        let store = JsDocumentStore::new(store);
        let pipeline = ChunkPipeline::new(&store, &JsSleeper, config);
        let keys = pipeline
            .upload(&BlobSource::new(file), report_progress(&on_progress))
            .await
            .map_err(media_error_to_js)?;
        Ok(keys.into_iter().map(JsValue::from).collect())
    }

    /// Fetch and reassemble the chunks behind `keys` into a data URL.
    #[wasm_bindgen(js_name = loadAudio)]
    pub async fn load_audio(
        keys: js_sys::Array,
        store: JsValue,
        on_progress: Option<js_sys::Function>,
        options: JsValue,
    ) -> Result<String, JsValue> {
        let config: PipelineConfig = parse_options(&options).map_err(anyhow_to_js)?;
        let store = JsDocumentStore::new(store);
        let pipeline = ChunkPipeline::new(&store, &JsSleeper, config);
        pipeline
            .load(&string_keys(&keys), report_progress(&on_progress))
            .await
            .map_err(media_error_to_js)
    }

    /// Resolve a track record (`chunkIds`, `url` or `data`) to a playable URL.
    #[wasm_bindgen(js_name = resolveTrack)]
    pub async fn resolve_track(
        track: JsValue,
        store: JsValue,
        on_progress: Option<js_sys::Function>,
        options: JsValue,
    ) -> Result<String, JsValue> {
        let text: String = js_sys::JSON::stringify(&track)?.into();
        let track: Track = serde_json::from_str(&text)
            .map_err(|e| JsValue::from(js_sys::Error::new(&format!("invalid track: {e}"))))?;
        let config: PipelineConfig = parse_options(&options).map_err(anyhow_to_js)?;
        let store = JsDocumentStore::new(store);
        let pipeline = ChunkPipeline::new(&store, &JsSleeper, config);
        log::info!("[track] resolving {}", track.name);
        pipeline
            .resolve(&track.source, report_progress(&on_progress))
            .await
            .map_err(media_error_to_js)
    }

    /// Delete the chunk documents behind `keys`.
    #[wasm_bindgen(js_name = purgeAudio)]
    pub async fn purge_audio(
        keys: js_sys::Array,
        store: JsValue,
        options: JsValue,
    ) -> Result<u32, JsValue> {
        let config: PipelineConfig = parse_options(&options).map_err(anyhow_to_js)?;
        let store = JsDocumentStore::new(store);
        let pipeline = ChunkPipeline::new(&store, &JsSleeper, config);
        let removed = pipeline
            .purge(&string_keys(&keys))
            .await
            .map_err(media_error_to_js)?;
        Ok(removed as u32)
    }
}

//! Bridges from browser objects to the media pipeline's collaborators.

use crate::media::{Document, DocumentStore, MediaError, MediaResult, MediaSource, StoreError};
use std::ops::Range;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

fn backend(e: JsValue) -> StoreError {
    let message = e
        .dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .or_else(|| e.as_string())
        .unwrap_or_else(|| format!("{:?}", e));
    StoreError::Backend(message)
}

fn to_js(doc: &Document) -> Result<JsValue, StoreError> {
    let text = serde_json::to_string(doc)?;
    js_sys::JSON::parse(&text).map_err(backend)
}

fn from_js(value: &JsValue) -> Result<Option<Document>, StoreError> {
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    let text: String = js_sys::JSON::stringify(value).map_err(backend)?.into();
    Ok(Some(serde_json::from_str(&text)?))
}

/// Document store implemented by a JS object exposing promise-returning
/// `put(collection, key, doc)`, `get(collection, key)`, `getAll(collection)`,
/// `delete(collection, key)` and `update(collection, key, partial)`.
pub struct JsDocumentStore {
    inner: JsValue,
}

impl JsDocumentStore {
    pub fn new(inner: JsValue) -> Self {
        Self { inner }
    }

    async fn call(&self, method: &str, args: &[JsValue]) -> Result<JsValue, StoreError> {
        let f = js_sys::Reflect::get(&self.inner, &JsValue::from_str(method)).map_err(backend)?;
        let f: js_sys::Function = f
            .dyn_into()
            .map_err(|_| StoreError::Backend(format!("store has no `{method}` method")))?;
        let args: js_sys::Array = args.iter().collect();
        let ret = f.apply(&self.inner, &args).map_err(backend)?;
        JsFuture::from(js_sys::Promise::resolve(&ret))
            .await
            .map_err(backend)
    }
}

impl DocumentStore for JsDocumentStore {
    async fn put(&self, collection: &str, key: &str, doc: Document) -> Result<(), StoreError> {
        let doc = to_js(&doc)?;
        self.call("put", &[collection.into(), key.into(), doc])
            .await
            .map(drop)
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        let value = self.call("get", &[collection.into(), key.into()]).await?;
        from_js(&value)
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let value = self.call("getAll", &[collection.into()]).await?;
        Ok(from_js(&value)?
            .and_then(|doc| match doc {
                Document::Array(items) => Some(items),
                _ => None,
            })
            .unwrap_or_default())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        self.call("delete", &[collection.into(), key.into()])
            .await
            .map(drop)
    }

    async fn update(
        &self,
        collection: &str,
        key: &str,
        partial: Document,
    ) -> Result<(), StoreError> {
        let partial = to_js(&partial)?;
        self.call("update", &[collection.into(), key.into(), partial])
            .await
            .map(drop)
    }
}

/// A `Blob` (usually a picked `File`) read slice by slice.
pub struct BlobSource {
    blob: web::Blob,
    mime: String,
}

impl BlobSource {
    pub fn new(blob: web::Blob) -> Self {
        let mime = blob.type_();
        Self { blob, mime }
    }
}

impl MediaSource for BlobSource {
    fn len(&self) -> usize {
        self.blob.size() as usize
    }

    fn mime_type(&self) -> &str {
        &self.mime
    }

    async fn read(&self, range: Range<usize>) -> MediaResult<Vec<u8>> {
        let fail = |e: JsValue| MediaError::Source {
            start: range.start,
            end: range.end,
            succeeded: 0,
            message: format!("{:?}", e),
        };
        let slice = self
            .blob
            .slice_with_f64_and_f64(range.start as f64, range.end as f64)
            .map_err(fail)?;
        let buffer = JsFuture::from(slice.array_buffer()).await.map_err(fail)?;
        Ok(js_sys::Uint8Array::new(&buffer).to_vec())
    }
}

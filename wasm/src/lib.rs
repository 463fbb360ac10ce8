//! randbytes WebAssembly Module
//! Cryptographically strong random bytes for browsers and any WebAssembly runtime.
//!
//! ## Usage in JavaScript
//!
//! ```javascript
//! import init, { randomBytes, randomBytesSync, RandomBytesGenerator } from './randbytes_wasm.js';
//!
//! await init();
//!
//! const a = randomBytesSync(18);                  // Uint8Array(18)
//! const b = await randomBytes(18);                // Promise, when available
//! randomBytes(18, (err, bytes) => { /* ... */ }); // callback
//!
//! // Explicitly without promises: randomBytes(18) now throws
//! const gen = new RandomBytesGenerator(false);
//! gen.generate(18, (err, bytes) => { /* ... */ });
//! ```

// JS numbers are f64; sizes are range-checked before casting
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use std::cell::OnceCell;

use js_sys::{Function, Uint8Array};
use randbytes_core::{
    ArgumentError, CallbackArg, EntropySource, GeneratorConfig, OsEntropy, RandomBytes, MAX_SIZE,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

/// Random byte generator with an explicit promise setting.
#[wasm_bindgen(js_name = RandomBytesGenerator)]
pub struct Generator {
    inner: RandomBytes<OsEntropy>,
}

#[wasm_bindgen(js_class = RandomBytesGenerator)]
impl Generator {
    /// Create a generator. With `promises` off, `generate(size)` without a
    /// callback throws instead of returning a Promise.
    #[wasm_bindgen(constructor)]
    pub fn new(promises: bool) -> Generator {
        let config = GeneratorConfig::new().with_deferred(promises);
        Generator {
            inner: RandomBytes::with_config(OsEntropy::new(), config),
        }
    }

    /// `generate(size)` returns a Promise; `generate(size, callback)` calls
    /// `callback(null, bytes)` or `callback(err)` later and returns undefined.
    pub fn generate(&self, size: JsValue, callback: JsValue) -> Result<JsValue, JsError> {
        request(&self.inner, &size, callback)
    }

    /// Generate bytes synchronously.
    #[wasm_bindgen(js_name = generateSync)]
    pub fn generate_sync(&self, size: JsValue) -> Result<Vec<u8>, JsError> {
        request_sync(&self.inner, &size)
    }
}

thread_local! {
    static DEFAULT: OnceCell<RandomBytes<OsEntropy>> = const { OnceCell::new() };
}

/// `randomBytes(size)` returns a Promise when the host has one;
/// `randomBytes(size, callback)` always works.
#[wasm_bindgen(js_name = randomBytes)]
pub fn random_bytes(size: JsValue, callback: JsValue) -> Result<JsValue, JsError> {
    DEFAULT.with(|cell| request(default_generator(cell), &size, callback))
}

/// Generate bytes synchronously (the `randomBytes.sync` form).
#[wasm_bindgen(js_name = randomBytesSync)]
pub fn random_bytes_sync(size: JsValue) -> Result<Vec<u8>, JsError> {
    DEFAULT.with(|cell| request_sync(default_generator(cell), &size))
}

fn default_generator(cell: &OnceCell<RandomBytes<OsEntropy>>) -> &RandomBytes<OsEntropy> {
    cell.get_or_init(|| {
        let config = GeneratorConfig::new().with_deferred(promise_available());
        RandomBytes::with_config(OsEntropy::new(), config)
    })
}

fn promise_available() -> bool {
    js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("Promise"))
        .map(|p| p.is_function())
        .unwrap_or(false)
}

fn request<S: EntropySource>(
    rng: &RandomBytes<S>,
    size: &JsValue,
    callback: JsValue,
) -> Result<JsValue, JsError> {
    let size = parse_size(size).map_err(to_js_error)?;

    let callback = callback_arg(callback);
    if matches!(callback, CallbackArg::Missing) && rng.config().deferred() {
        let (task, deferred) = rng.deferred_task(size).map_err(to_js_error)?;
        spawn_local(task);
        let promise = future_to_promise(async move {
            deferred
                .await
                .map(|bytes| Uint8Array::from(bytes.as_slice()).into())
                .map_err(|err| JsValue::from(to_js_error(err)))
        });
        return Ok(promise.into());
    }

    let task = rng
        .callback_task(
            size,
            callback.map(|f| {
                move |outcome: randbytes_core::Result<Vec<u8>, S::Error>| {
                    if let Err(thrown) = complete(&f, outcome) {
                        rethrow_later(thrown);
                    }
                }
            }),
        )
        .map_err(to_js_error)?;
    spawn_local(task);
    Ok(JsValue::UNDEFINED)
}

fn request_sync<S: EntropySource>(
    rng: &RandomBytes<S>,
    size: &JsValue,
) -> Result<Vec<u8>, JsError> {
    let size = parse_size(size).map_err(to_js_error)?;
    rng.generate_sync(size).map_err(to_js_error)
}

/// Node-style completion: `callback(null, bytes)` or `callback(err)`.
///
/// Returns whatever the callback threw.
fn complete<E: std::error::Error + 'static>(
    callback: &Function,
    outcome: randbytes_core::Result<Vec<u8>, E>,
) -> Result<(), JsValue> {
    match outcome {
        Ok(bytes) => callback.call2(
            &JsValue::NULL,
            &JsValue::NULL,
            &Uint8Array::from(bytes.as_slice()),
        ),
        Err(err) => callback.call1(&JsValue::NULL, &JsValue::from(to_js_error(err))),
    }
    .map(drop)
}

/// Raise `thrown` as an uncaught exception from a fresh microtask.
///
/// Throwing from inside the running task would unwind through the executor.
fn rethrow_later(thrown: JsValue) {
    log::error!("randomBytes callback threw");

    let thrower = Function::new_with_args("err", "throw err").bind1(&JsValue::NULL, &thrown);
    let scheduled = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("queueMicrotask"))
        .and_then(JsCast::dyn_into::<Function>)
        .and_then(|queue| queue.call1(&JsValue::NULL, &thrower));

    if scheduled.is_err() {
        log::error!("queueMicrotask unavailable, callback exception dropped: {thrown:?}");
    }
}

fn callback_arg(value: JsValue) -> CallbackArg<Function> {
    if value.is_undefined() {
        return CallbackArg::Missing;
    }
    match value.dyn_into::<Function>() {
        Ok(f) => CallbackArg::Callable(f),
        Err(other) => CallbackArg::NotCallable(js_type(&other)),
    }
}

fn parse_size(size: &JsValue) -> Result<usize, ArgumentError> {
    let Some(n) = size.as_f64() else {
        return Err(ArgumentError::InvalidSize(js_type(size)));
    };

    if !n.is_finite() || n < 0.0 || n.fract() != 0.0 {
        return Err(ArgumentError::InvalidSize(n.to_string()));
    }
    if n > MAX_SIZE as f64 {
        return Err(ArgumentError::SizeOutOfRange {
            size: n as usize,
            max: MAX_SIZE,
        });
    }
    Ok(n as usize)
}

fn js_type(value: &JsValue) -> String {
    if value.is_null() {
        return "null".to_string();
    }
    value
        .js_typeof()
        .as_string()
        .unwrap_or_else(|| "unknown".to_string())
}

fn to_js_error(err: impl std::fmt::Display) -> JsError {
    JsError::new(&err.to_string())
}

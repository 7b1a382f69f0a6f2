//! JSON result envelope for the WASM boundary.
//!
//! Every public function in `haplomap-wasm` returns a `String` containing
//! JSON. Success → `{"ok": <value>}`, failure → `{"error": "<message>"}`.

use std::fmt::Display;

use serde::Serialize;

/// Serialize a success value as `{"ok": val}`.
pub fn wasm_ok<T: Serialize>(val: &T) -> String {
    #[derive(Serialize)]
    struct Ok<'a, T: Serialize> {
        ok: &'a T,
    }
    serde_json::to_string(&Ok { ok: val }).unwrap_or_else(|e| wasm_err(e))
}

/// Serialize an error as `{"error": "msg"}`.
pub fn wasm_err(msg: impl Display) -> String {
    #[derive(Serialize)]
    struct Err {
        error: String,
    }
    serde_json::to_string(&Err {
        error: msg.to_string(),
    })
    .unwrap_or_else(|_| r#"{"error":"serialization failed"}"#.into())
}

/// Map a `haplomap_core::Result<T>` into the JSON envelope.
pub fn wasm_result<T: Serialize>(r: haplomap_core::Result<T>) -> String {
    match r {
        Ok(val) => wasm_ok(&val),
        Err(e) => wasm_err(e),
    }
}

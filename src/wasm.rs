use wasm_bindgen::prelude::*;

use crate::{ErgoBox, ReducedTransaction, SignedTransaction, UnsignedTransaction};

#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn codec_error(context: &str, e: crate::CodecError) -> JsError {
    JsError::new(&format!("{} ({}): {}", context, e.kind(), e))
}

/// Decode a hex encoded box in canonical form
#[wasm_bindgen]
pub fn decode_box(hex_str: &str) -> Result<JsValue, JsError> {
    let ergo_box = ErgoBox::from_hex(hex_str).map_err(|e| codec_error("Error decoding box", e))?;
    Ok(serde_wasm_bindgen::to_value(&ergo_box)?)
}

/// Decode a hex encoded signed transaction
#[wasm_bindgen]
pub fn decode_transaction(hex_str: &str) -> Result<JsValue, JsError> {
    let tx = SignedTransaction::from_hex(hex_str)
        .map_err(|e| codec_error("Error decoding transaction", e))?;
    Ok(serde_wasm_bindgen::to_value(&tx)?)
}

#[wasm_bindgen]
pub fn decode_unsigned_transaction(hex_str: &str) -> Result<JsValue, JsError> {
    let tx = UnsignedTransaction::from_hex(hex_str)
        .map_err(|e| codec_error("Error decoding unsigned transaction", e))?;
    Ok(serde_wasm_bindgen::to_value(&tx)?)
}

#[wasm_bindgen]
pub fn decode_reduced_transaction(hex_str: &str) -> Result<JsValue, JsError> {
    let reduced = ReducedTransaction::from_hex(hex_str)
        .map_err(|e| codec_error("Error decoding reduced transaction", e))?;
    Ok(serde_wasm_bindgen::to_value(&reduced)?)
}

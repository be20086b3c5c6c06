//! FFI bindings for Nutri-Assess
//!
//! This module provides C-compatible functions for calling the engine from other languages.
//! All functions use C strings (null-terminated) and return allocated memory that
//! must be freed by the caller using `nutri_assess_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::error::ComputeError;
use crate::pipeline::{assess_json, compute_assessment};
use crate::types::AssessmentInput;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Hand a pipeline result to the caller, recording the error on failure
fn finish(result: Result<String, ComputeError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Assess a raw input record and return the report JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `nutri_assess_free_string`.
/// - Returns NULL on error; call `nutri_assess_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn nutri_assess_compute(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json_str) = cstr_to_string(json) else {
        set_last_error("Invalid JSON string pointer");
        return ptr::null_mut();
    };

    finish(assess_json(json_str))
}

/// Compute the bare result for an already-canonical input.
///
/// The input is an `AssessmentInput` JSON object; the output is the
/// `AssessmentResult` JSON object without a report envelope.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `nutri_assess_free_string`.
/// - Returns NULL on error; call `nutri_assess_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn nutri_assess_compute_result(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json_str) = cstr_to_string(json) else {
        set_last_error("Invalid JSON string pointer");
        return ptr::null_mut();
    };

    finish(
        serde_json::from_str::<AssessmentInput>(&json_str)
            .map_err(|e| ComputeError::ParseError(e.to_string()))
            .and_then(|input| {
                serde_json::to_string(&compute_assessment(&input)).map_err(ComputeError::JsonError)
            }),
    )
}

/// Free a string returned by Nutri-Assess functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Nutri-Assess function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn nutri_assess_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Nutri-Assess function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn nutri_assess_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn nutri_assess_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

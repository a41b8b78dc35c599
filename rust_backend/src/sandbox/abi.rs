//! Flat C ABI over [`SandboxModule`].
//!
//! Requests and responses are NUL-terminated UTF-8 JSON strings. Response
//! strings are owned by the caller and must be released with
//! [`sweph_free_string`]. Hosts that cannot allocate inside the module's
//! memory (WebAssembly) use [`sweph_alloc`] / [`sweph_dealloc`] to stage the
//! request.
//!
//! No function unwinds across the boundary: a panic becomes an `engine`
//! error response.

use std::alloc::{self, Layout};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use once_cell::sync::Lazy;
use serde_json::Value;

use super::{ErrorBody, Response, SandboxModule};
use crate::error::{BridgeError, BridgeResult, ErrorKind};

/// ABI version, major*10000 + minor*100 + patch
pub const SWEPH_ABI_VERSION: u32 = 100;

static MODULE: Lazy<SandboxModule> = Lazy::new(SandboxModule::new);

macro_rules! catch_panic {
    ($default:expr, $body:expr) => {{
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body)) {
            Ok(result) => result,
            Err(_) => $default,
        }
    }};
}

fn into_c_string(json: String) -> *mut c_char {
    // serde_json escapes control characters, so the text has no interior NUL
    match CString::new(json) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

fn error_response(error: BridgeError) -> *mut c_char {
    let result: BridgeResult<Value> = Err(error);
    into_c_string(Response::from(result).to_json())
}

fn panic_response() -> *mut c_char {
    into_c_string(
        Response::Error(ErrorBody {
            kind: ErrorKind::Engine,
            message: "internal error: operation panicked".to_string(),
        })
        .to_json(),
    )
}

/// Handle one JSON request.
///
/// # Safety
///
/// `request` must be null or point to a NUL-terminated string that stays
/// valid for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn sweph_call(request: *const c_char) -> *mut c_char {
    catch_panic!(panic_response(), {
        if request.is_null() {
            return error_response(BridgeError::Validation("null request".to_string()));
        }
        // SAFETY: checked for null; the caller guarantees NUL termination
        let request = unsafe { CStr::from_ptr(request) };
        match request.to_str() {
            Ok(text) => into_c_string(MODULE.handle(text)),
            Err(_) => error_response(BridgeError::Validation(
                "request is not valid UTF-8".to_string(),
            )),
        }
    })
}

/// Release a string returned by [`sweph_call`]. Null is ignored.
///
/// # Safety
///
/// `s` must be null or a pointer returned by [`sweph_call`] that has not
/// been freed yet.
#[no_mangle]
pub unsafe extern "C" fn sweph_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    // SAFETY: the pointer came from CString::into_raw in this module
    drop(unsafe { CString::from_raw(s) });
}

/// Allocate `size` bytes inside the module. Returns null when `size` is 0 or
/// the allocation fails.
#[no_mangle]
pub extern "C" fn sweph_alloc(size: usize) -> *mut u8 {
    match Layout::array::<u8>(size) {
        Ok(layout) if size > 0 => unsafe { alloc::alloc(layout) },
        _ => std::ptr::null_mut(),
    }
}

/// Release memory obtained from [`sweph_alloc`].
///
/// # Safety
///
/// `ptr` must come from [`sweph_alloc`] called with the same `size`.
#[no_mangle]
pub unsafe extern "C" fn sweph_dealloc(ptr: *mut u8, size: usize) {
    if ptr.is_null() || size == 0 {
        return;
    }
    if let Ok(layout) = Layout::array::<u8>(size) {
        // SAFETY: same layout as the matching sweph_alloc
        unsafe { alloc::dealloc(ptr, layout) };
    }
}

#[no_mangle]
pub extern "C" fn sweph_abi_version() -> u32 {
    SWEPH_ABI_VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(request: &str) -> Value {
        let c_request = CString::new(request).unwrap();
        unsafe {
            let raw = sweph_call(c_request.as_ptr());
            assert!(!raw.is_null());
            let text = CStr::from_ptr(raw).to_str().unwrap().to_owned();
            sweph_free_string(raw);
            serde_json::from_str(&text).unwrap()
        }
    }

    #[test]
    fn test_call_through_abi() {
        let response = call(r#"{"op": "julday", "args": [2000, 1, 1, 12.0]}"#);
        assert_eq!(response["ok"], serde_json::json!(2451545.0));
    }

    #[test]
    fn test_null_request() {
        unsafe {
            let raw = sweph_call(std::ptr::null());
            let text = CStr::from_ptr(raw).to_str().unwrap().to_owned();
            sweph_free_string(raw);
            assert!(text.contains("null request"));
            sweph_free_string(std::ptr::null_mut());
        }
    }

    #[test]
    fn test_alloc_round_trip() {
        let ptr = sweph_alloc(64);
        assert!(!ptr.is_null());
        unsafe {
            ptr.write_bytes(0xAB, 64);
            sweph_dealloc(ptr, 64);
        }
        assert!(sweph_alloc(0).is_null());
    }

    #[test]
    fn test_abi_version() {
        assert_eq!(sweph_abi_version(), 100);
    }
}

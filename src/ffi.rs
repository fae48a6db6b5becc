//! FFI bindings for Friction Lens
//!
//! This module provides C-compatible functions for calling the analyzer from other
//! languages. All functions use C strings (null-terminated) and return allocated
//! memory that must be freed by the caller using `lens_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::AnalyzerConfig;
use crate::pipeline::{analyze_session, SessionAnalyzer};

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
        Err(_) => {
            set_last_error("Output contains an interior NUL byte");
            ptr::null_mut()
        }
    }
}

/// Read the three analysis arguments; a NULL external pointer means no external events
unsafe fn analysis_args(
    session_id: *const c_char,
    records_json: *const c_char,
    external_json: *const c_char,
) -> Result<(String, String, String), &'static str> {
    let session = cstr_to_string(session_id).ok_or("Invalid session_id string pointer")?;
    let records = cstr_to_string(records_json).ok_or("Invalid records JSON string pointer")?;
    let external = if external_json.is_null() {
        String::new()
    } else {
        cstr_to_string(external_json).ok_or("Invalid external JSON string pointer")?
    };
    Ok((session, records, external))
}

// ============================================================================
// Stateless API
// ============================================================================

/// Analyze one session and return the correlated moments as a JSON array.
///
/// # Safety
/// - `session_id` and `records_json` must be valid null-terminated C strings.
/// - `external_json` must be a valid null-terminated C string or NULL.
/// - Returns a newly allocated string that must be freed with `lens_free_string`.
/// - Returns NULL on error; call `lens_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn lens_analyze_session(
    session_id: *const c_char,
    records_json: *const c_char,
    external_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let (session, records, external) =
        match analysis_args(session_id, records_json, external_json) {
            Ok(args) => args,
            Err(msg) => {
                set_last_error(msg);
                return ptr::null_mut();
            }
        };

    match analyze_session(&session, &records, &external) {
        Ok(result) => string_to_cstr(&result),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Configured Analyzer API
// ============================================================================

/// Opaque handle to a configured SessionAnalyzer
pub struct LensAnalyzerHandle {
    analyzer: SessionAnalyzer,
}

/// Create an analyzer from a JSON `AnalyzerConfig` (NULL or empty for defaults).
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string or NULL.
/// - Must be freed with `lens_analyzer_free`.
/// - Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn lens_analyzer_new(config_json: *const c_char) -> *mut LensAnalyzerHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        AnalyzerConfig::default()
    } else {
        let Some(json) = cstr_to_string(config_json) else {
            set_last_error("Invalid config string pointer");
            return ptr::null_mut();
        };
        if json.trim().is_empty() {
            AnalyzerConfig::default()
        } else {
            match serde_json::from_str::<AnalyzerConfig>(&json) {
                Ok(config) => {
                    let window = config.correlation_window_ms;
                    config.with_correlation_window_ms(window)
                }
                Err(e) => {
                    set_last_error(&format!("Invalid analyzer config: {}", e));
                    return ptr::null_mut();
                }
            }
        }
    };

    let handle = Box::new(LensAnalyzerHandle {
        analyzer: SessionAnalyzer::with_config(config),
    });
    Box::into_raw(handle)
}

/// Free an analyzer.
///
/// # Safety
/// - `analyzer` must be a valid pointer returned by `lens_analyzer_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn lens_analyzer_free(analyzer: *mut LensAnalyzerHandle) {
    if !analyzer.is_null() {
        drop(Box::from_raw(analyzer));
    }
}

/// Analyze one session with a configured analyzer.
///
/// # Safety
/// - `analyzer` must be a valid pointer returned by `lens_analyzer_new`.
/// - String arguments follow the same rules as `lens_analyze_session`.
/// - Returns a newly allocated string that must be freed with `lens_free_string`.
#[no_mangle]
pub unsafe extern "C" fn lens_analyzer_analyze(
    analyzer: *const LensAnalyzerHandle,
    session_id: *const c_char,
    records_json: *const c_char,
    external_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if analyzer.is_null() {
        set_last_error("Null analyzer pointer");
        return ptr::null_mut();
    }
    let handle = &*analyzer;

    let (session, records, external) =
        match analysis_args(session_id, records_json, external_json) {
            Ok(args) => args,
            Err(msg) => {
                set_last_error(msg);
                return ptr::null_mut();
            }
        };

    match handle.analyzer.analyze_json(&session, &records, &external) {
        Ok(result) => string_to_cstr(&result),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by lens functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a lens function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn lens_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next lens function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn lens_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn lens_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. A built request keeps the core
//! `HttpRequest` behind an opaque `handle` so its transform can be applied
//! later by `rq_parse_response`. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use resource_core::{ApiError, HttpMethod, HttpRequest, ResourceClient};
use serde_json::Value;

/// Opaque handle to a `ResourceClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiClient {
    pub(crate) inner: ResourceClient,
}

/// Allocate a C string, dropping interior NUL bytes.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    CString::new(s.replace('\0', ""))
        .unwrap_or_default()
        .into_raw()
}

/// Free a C string allocated by `into_c_string`. Null is ignored.
pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// `url` excludes the query; `query_string` is null when there is none.
/// `handle` is owned by the library and must not be touched by the caller.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub query_string: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
    pub handle: *mut c_void,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest<Value>) -> *mut Self {
        let url = into_c_string(req.url.clone());
        let query_string = req
            .query_string()
            .map(into_c_string)
            .unwrap_or(std::ptr::null_mut());
        let body = req
            .body
            .clone()
            .map(into_c_string)
            .unwrap_or(std::ptr::null_mut());

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .iter()
                .map(|(k, v)| FfiHeader {
                    key: into_c_string(k.clone()),
                    value: into_c_string(v.clone()),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        let method = req.method.into();
        let handle = Box::into_raw(Box::new(req)) as *mut c_void;
        Box::into_raw(Box::new(FfiHttpRequest {
            method,
            url,
            query_string,
            headers,
            headers_len,
            body,
            handle,
        }))
    }

    /// The core request behind `handle`, if any.
    pub(crate) fn core(&self) -> Option<&HttpRequest<Value>> {
        if self.handle.is_null() {
            None
        } else {
            Some(unsafe { &*(self.handle as *const HttpRequest<Value>) })
        }
    }

    /// Free a request created by `from_core`, including its handle.
    pub(crate) fn free(req: *mut Self) {
        if req.is_null() {
            return;
        }
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.query_string);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
        if !req.handle.is_null() {
            drop(unsafe { Box::from_raw(req.handle as *mut HttpRequest<Value>) });
        }
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing a request, then
/// passes a pointer to `rq_parse_response`. The FFI layer reads but does not
/// free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in result envelopes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Http = 2,
    Deserialization = 3,
    Serialization = 4,
    Panic = 5,
    NullArg = 6,
    MissingParameter = 7,
    UnknownResource = 8,
    InvalidArgument = 9,
    Config = 10,
}

fn classify(err: &ApiError) -> (FfiErrorCode, u16) {
    match err {
        ApiError::MissingParameter { .. } => (FfiErrorCode::MissingParameter, 0),
        ApiError::UnknownResource(_) => (FfiErrorCode::UnknownResource, 0),
        ApiError::NotFound => (FfiErrorCode::NotFound, 404),
        ApiError::HttpError { status, .. } => (FfiErrorCode::Http, *status),
        ApiError::DeserializationError(_) => (FfiErrorCode::Deserialization, 0),
        ApiError::SerializationError(_) => (FfiErrorCode::Serialization, 0),
        ApiError::ConfigError(_) => (FfiErrorCode::Config, 0),
    }
}

/// Result envelope for all `rq_build_*` functions.
///
/// On success `error_code` is `Ok` and `request` is set. On a missing
/// parameter, `missing_parameter` and `operation` name what was absent and
/// which call raised it. Every other pointer is null when unused.
#[repr(C)]
pub struct FfiBuildResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub missing_parameter: *mut c_char,
    pub operation: *mut c_char,
    pub request: *mut FfiHttpRequest,
}

impl FfiBuildResult {
    fn empty(error_code: FfiErrorCode, error_message: Option<String>) -> Self {
        FfiBuildResult {
            error_code,
            error_message: error_message
                .map(into_c_string)
                .unwrap_or(std::ptr::null_mut()),
            missing_parameter: std::ptr::null_mut(),
            operation: std::ptr::null_mut(),
            request: std::ptr::null_mut(),
        }
    }

    pub(crate) fn ok(req: HttpRequest<Value>) -> *mut Self {
        let mut result = Self::empty(FfiErrorCode::Ok, None);
        result.request = FfiHttpRequest::from_core(req);
        Box::into_raw(Box::new(result))
    }

    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let (code, _) = classify(&err);
        let mut result = Self::empty(code, Some(err.to_string()));
        if let ApiError::MissingParameter {
            parameter,
            operation,
        } = err
        {
            result.missing_parameter = into_c_string(parameter);
            result.operation = into_c_string(operation);
        }
        Box::into_raw(Box::new(result))
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Box::into_raw(Box::new(Self::empty(
            FfiErrorCode::NullArg,
            Some(format!("null argument: {name}")),
        )))
    }

    pub(crate) fn invalid_argument(msg: String) -> *mut Self {
        Box::into_raw(Box::new(Self::empty(FfiErrorCode::InvalidArgument, Some(msg))))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Box::into_raw(Box::new(Self::empty(
            FfiErrorCode::Panic,
            Some(msg.to_string()),
        )))
    }
}

/// Result envelope for `rq_parse_response`.
///
/// On success `json` holds the transformed body, or is null when the request
/// carries no transform. On failure `error_code` describes the category and
/// `http_status` the offending status, if any.
#[repr(C)]
pub struct FfiParseResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub json: *mut c_char,
}

impl FfiParseResult {
    pub(crate) fn ok(value: Option<Value>) -> *mut Self {
        Box::into_raw(Box::new(FfiParseResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            json: value
                .map(|v| into_c_string(v.to_string()))
                .unwrap_or(std::ptr::null_mut()),
        }))
    }

    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let (error_code, http_status) = classify(&err);
        Box::into_raw(Box::new(FfiParseResult {
            error_code,
            error_message: into_c_string(err.to_string()),
            http_status,
            json: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiParseResult {
            error_code: FfiErrorCode::NullArg,
            error_message: into_c_string(format!("null argument: {name}")),
            http_status: 0,
            json: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiParseResult {
            error_code: FfiErrorCode::Panic,
            error_message: into_c_string(msg.to_string()),
            http_status: 0,
            json: std::ptr::null_mut(),
        }))
    }
}

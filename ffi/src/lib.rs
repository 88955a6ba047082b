//! C-ABI wrapper around `resource-core`.
//!
//! # Overview
//! Exposes the resource request builders through `extern "C"` functions so
//! any language with a C FFI can build request descriptors and decode
//! responses without linking to serde or an HTTP stack.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Resources are addressed by name through the built-in registry, so one
//!   `rq_build_*` function serves every resource.
//! - A null id or payload pointer means "not supplied" and surfaces as a
//!   `MissingParameter` error naming the parameter and operation. A null
//!   client, resource name or request pointer is a `NullArg` error.
//! - Payloads cross the boundary as JSON C strings.
//! - The C caller owns all returned pointers and must call the matching
//!   `rq_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use resource_core::{
    config, ApiError, ClientConfig, HttpRequest, HttpResponse, ListParams, ResourceBuilder,
    ResourceClient,
};
use serde_json::Value;

use types::*;

// ---------------------------------------------------------------------------
// Argument decoding
// ---------------------------------------------------------------------------

enum BuildError {
    Api(ApiError),
    NullArg(&'static str),
    Invalid(String),
}

impl From<ApiError> for BuildError {
    fn from(err: ApiError) -> Self {
        BuildError::Api(err)
    }
}

type BuildResult = Result<HttpRequest<Value>, BuildError>;

fn into_build_result(result: BuildResult) -> *mut FfiBuildResult {
    match result {
        Ok(req) => FfiBuildResult::ok(req),
        Err(BuildError::Api(err)) => FfiBuildResult::from_error(err),
        Err(BuildError::NullArg(name)) => FfiBuildResult::null_arg(name),
        Err(BuildError::Invalid(msg)) => FfiBuildResult::invalid_argument(msg),
    }
}

/// Borrow an optional C string argument. Null maps to `None`.
fn opt_str<'a>(ptr: *const c_char, name: &str) -> Result<Option<&'a str>, BuildError> {
    if ptr.is_null() {
        return Ok(None);
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map(Some)
        .map_err(|_| BuildError::Invalid(format!("{name} is not valid UTF-8")))
}

/// Parse an optional JSON C string argument. Null maps to `None`.
fn opt_json(ptr: *const c_char, name: &str) -> Result<Option<Value>, BuildError> {
    match opt_str(ptr, name)? {
        None => Ok(None),
        Some(raw) => serde_json::from_str(raw)
            .map(Some)
            .map_err(|e| BuildError::Invalid(format!("{name} is not valid JSON: {e}"))),
    }
}

fn client_ref<'a>(client: *const FfiClient) -> Result<&'a ResourceClient, BuildError> {
    if client.is_null() {
        return Err(BuildError::NullArg("client"));
    }
    Ok(&unsafe { &*client }.inner)
}

fn resource_builder(
    client: *const FfiClient,
    resource: *const c_char,
) -> Result<ResourceBuilder<Value>, BuildError> {
    let client = client_ref(client)?;
    let name = opt_str(resource, "resource")?.ok_or(BuildError::NullArg("resource"))?;
    Ok(client.by_name(name)?)
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Install the process-wide base path used by clients created with a null
/// `base_url`.
///
/// Returns `Config` if a configuration is already installed, `NullArg` if
/// `base_path` is null and `InvalidArgument` if it is not valid UTF-8.
#[unsafe(no_mangle)]
pub extern "C" fn rq_configure(base_path: *const c_char) -> FfiErrorCode {
    catch_unwind(|| {
        if base_path.is_null() {
            return FfiErrorCode::NullArg;
        }
        let Ok(path) = unsafe { CStr::from_ptr(base_path) }.to_str() else {
            return FfiErrorCode::InvalidArgument;
        };
        match config::install(ClientConfig::new(path)) {
            Ok(()) => FfiErrorCode::Ok,
            Err(_) => FfiErrorCode::Config,
        }
    })
    .unwrap_or(FfiErrorCode::Panic)
}

/// Create a new `ResourceClient` bound to `base_url`.
///
/// A null `base_url` binds the client to the process-wide configuration.
/// Returns null if `base_url` is not valid UTF-8 or if an internal panic
/// occurs. The caller must free the returned pointer with `rq_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn rq_client_new(base_url: *const c_char) -> *mut FfiClient {
    catch_unwind(|| {
        let inner = if base_url.is_null() {
            ResourceClient::from_global()
        } else {
            match unsafe { CStr::from_ptr(base_url) }.to_str() {
                Ok(url) => ResourceClient::new(url),
                Err(_) => return std::ptr::null_mut(),
            }
        };
        Box::into_raw(Box::new(FfiClient { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `rq_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rq_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build `GET {base}/{resource}/{id}`.
///
/// The caller must free the result with `rq_free_build_result`.
#[unsafe(no_mangle)]
pub extern "C" fn rq_build_get_one(
    client: *const FfiClient,
    resource: *const c_char,
    id: *const c_char,
) -> *mut FfiBuildResult {
    catch_unwind(|| {
        into_build_result((|| -> BuildResult {
            let builder = resource_builder(client, resource)?;
            Ok(builder.get_one(opt_str(id, "id")?)?)
        })())
    })
    .unwrap_or_else(|_| FfiBuildResult::panic("panic in rq_build_get_one"))
}

/// Build `GET {base}/{resource}` with optional paging and sorting.
///
/// `page` and `size` outside `0..=u32::MAX` (for example `-1`) are treated
/// as absent, as is a null `sort`.
#[unsafe(no_mangle)]
pub extern "C" fn rq_build_get_list(
    client: *const FfiClient,
    resource: *const c_char,
    page: i64,
    size: i64,
    sort: *const c_char,
) -> *mut FfiBuildResult {
    catch_unwind(|| {
        into_build_result((|| -> BuildResult {
            let builder = resource_builder(client, resource)?;
            let params = ListParams {
                page: u32::try_from(page).ok(),
                size: u32::try_from(size).ok(),
                sort: opt_str(sort, "sort")?.map(str::to_string),
            };
            Ok(builder.get_list(&params).into_json())
        })())
    })
    .unwrap_or_else(|_| FfiBuildResult::panic("panic in rq_build_get_list"))
}

/// Build `POST {base}/{resource}` from a JSON payload.
#[unsafe(no_mangle)]
pub extern "C" fn rq_build_create(
    client: *const FfiClient,
    resource: *const c_char,
    payload_json: *const c_char,
) -> *mut FfiBuildResult {
    catch_unwind(|| {
        into_build_result((|| -> BuildResult {
            let builder = resource_builder(client, resource)?;
            let payload = opt_json(payload_json, "payload")?;
            Ok(builder.create(payload.as_ref())?)
        })())
    })
    .unwrap_or_else(|_| FfiBuildResult::panic("panic in rq_build_create"))
}

/// Build `PUT {base}/{resource}/{id}` from a JSON payload.
#[unsafe(no_mangle)]
pub extern "C" fn rq_build_update(
    client: *const FfiClient,
    resource: *const c_char,
    id: *const c_char,
    payload_json: *const c_char,
) -> *mut FfiBuildResult {
    catch_unwind(|| {
        into_build_result((|| -> BuildResult {
            let builder = resource_builder(client, resource)?;
            let id = opt_str(id, "id")?;
            let payload = opt_json(payload_json, "payload")?;
            Ok(builder.update(id, payload.as_ref())?)
        })())
    })
    .unwrap_or_else(|_| FfiBuildResult::panic("panic in rq_build_update"))
}

/// Build `DELETE {base}/{resource}/{id}`.
#[unsafe(no_mangle)]
pub extern "C" fn rq_build_delete(
    client: *const FfiClient,
    resource: *const c_char,
    id: *const c_char,
) -> *mut FfiBuildResult {
    catch_unwind(|| {
        into_build_result((|| -> BuildResult {
            let builder = resource_builder(client, resource)?;
            Ok(builder.delete(opt_str(id, "id")?)?.into_json())
        })())
    })
    .unwrap_or_else(|_| FfiBuildResult::panic("panic in rq_build_delete"))
}

/// Build `POST {base}/Agent/{id}/activate`.
#[unsafe(no_mangle)]
pub extern "C" fn rq_build_activate(
    client: *const FfiClient,
    id: *const c_char,
) -> *mut FfiBuildResult {
    catch_unwind(|| {
        into_build_result((|| -> BuildResult {
            let client = client_ref(client)?;
            Ok(client.agent().activate(opt_str(id, "id")?)?.into_json())
        })())
    })
    .unwrap_or_else(|_| FfiBuildResult::panic("panic in rq_build_activate"))
}

/// Build `POST {base}/Agent/{id}/event/{event_type}`.
///
/// `payload_json` may be null, in which case no body is sent.
#[unsafe(no_mangle)]
pub extern "C" fn rq_build_publish_event(
    client: *const FfiClient,
    id: *const c_char,
    event_type: *const c_char,
    payload_json: *const c_char,
) -> *mut FfiBuildResult {
    catch_unwind(|| {
        into_build_result((|| -> BuildResult {
            let client = client_ref(client)?;
            let id = opt_str(id, "id")?;
            let event_type = opt_str(event_type, "event_type")?;
            let payload = opt_json(payload_json, "payload")?;
            let req = client
                .agent()
                .publish_event(id, event_type, payload.as_ref())?;
            Ok(req.into_json())
        })())
    })
    .unwrap_or_else(|_| FfiBuildResult::panic("panic in rq_build_publish_event"))
}

// ---------------------------------------------------------------------------
// Parse response
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`.
///
/// A null or non-UTF-8 body is treated as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(resp.body) }
            .to_str()
            .unwrap_or("")
            .to_string()
    };
    HttpResponse {
        status: resp.status,
        body,
    }
}

/// Check the response status and apply the request's transform to the body.
///
/// `request` must come from a successful `rq_build_*` call and still be
/// owned by its build result. The caller must free the returned pointer with
/// `rq_free_parse_result`.
#[unsafe(no_mangle)]
pub extern "C" fn rq_parse_response(
    request: *const FfiHttpRequest,
    response: *const FfiHttpResponse,
) -> *mut FfiParseResult {
    catch_unwind(|| {
        if request.is_null() {
            return FfiParseResult::null_arg("request");
        }
        if response.is_null() {
            return FfiParseResult::null_arg("response");
        }
        let Some(core) = unsafe { &*request }.core() else {
            return FfiParseResult::null_arg("request.handle");
        };
        let response = ffi_response_to_core(unsafe { &*response });
        match core.parse(response) {
            Ok(value) => FfiParseResult::ok(value),
            Err(e) => FfiParseResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiParseResult::panic("panic in rq_parse_response"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a build result and the request it owns. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rq_free_build_result(result: *mut FfiBuildResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_c_string(result.missing_parameter);
        free_c_string(result.operation);
        FfiHttpRequest::free(result.request);
    });
}

/// Free a parse result. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rq_free_parse_result(result: *mut FfiParseResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_c_string(result.json);
    });
}

/// Free a string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rq_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

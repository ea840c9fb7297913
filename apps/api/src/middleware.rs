use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Uri, header};
use axum::middleware::Next;
use axum::response::Response;
use porta_core::{AppError, AppResult, ContactId};
use porta_domain::CallerContext;

use crate::error::ApiResult;
use crate::state::AppState;

/// Resolves the caller from the trusted contact header.
///
/// Requests without the header are anonymous.
pub async fn resolve_caller(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let caller = caller_from_headers(request.headers(), &state.contact_header)?;

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

/// Rejects requests a browser marks as cross-site.
///
/// Action routes run side-effecting custom APIs on `GET` as well.
pub async fn reject_cross_site_requests(request: Request, next: Next) -> ApiResult<Response> {
    if is_cross_site_fetch(request.headers()) {
        return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
    }

    Ok(next.run(request).await)
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if is_cross_site_fetch(headers) {
            return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
        }

        if !has_allowed_origin(headers, &state.frontend_url) {
            return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

fn is_cross_site_fetch(headers: &HeaderMap) -> bool {
    headers
        .get("sec-fetch-site")
        .is_some_and(|fetch_site| fetch_site == HeaderValue::from_static("cross-site"))
}

/// Matches `Origin`, or the origin part of `Referer`, exactly against the frontend URL.
fn has_allowed_origin(headers: &HeaderMap, frontend_url: &str) -> bool {
    let allowed_origin = frontend_url.trim_end_matches('/');

    let origin_is_allowed = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|origin| origin == allowed_origin);

    let referer_is_allowed = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(|referer| referer.parse::<Uri>().ok())
        .and_then(|uri| {
            let scheme = uri.scheme_str()?;
            let authority = uri.authority()?;
            Some(format!("{scheme}://{authority}"))
        })
        .is_some_and(|referer_origin| referer_origin == allowed_origin);

    origin_is_allowed || referer_is_allowed
}

pub(crate) fn caller_from_headers(
    headers: &HeaderMap,
    contact_header: &HeaderName,
) -> AppResult<CallerContext> {
    let Some(value) = headers.get(contact_header) else {
        return Ok(CallerContext::anonymous());
    };

    let text = value.to_str().map_err(|error| {
        AppError::Validation(format!("invalid {contact_header} header: {error}"))
    })?;

    Ok(ContactId::parse_optional(text)?
        .map_or_else(CallerContext::anonymous, CallerContext::for_contact))
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

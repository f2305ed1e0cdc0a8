//! Locale redirect for the site root.
//!
//! Visitors hitting `/` are sent to a localized landing path chosen from the
//! edge network's country header. Other paths are left alone so the
//! redirect target never redirects again.

use crate::constants::{COUNTRY_HEADER, FALLBACK_LOCALE_PATH};
use http::header::LOCATION;
use http::{HeaderMap, HeaderValue, Request, Response, StatusCode};

/// Country code (lower case) to landing path. Anything missing falls back
/// to [`FALLBACK_LOCALE_PATH`].
const LOCALE_ROUTES: &[(&str, &str)] = &[("kr", "/ko")];

pub fn localized_path(country: Option<&str>) -> &'static str {
    let Some(country) = country else {
        return FALLBACK_LOCALE_PATH;
    };
    let country = country.trim().to_ascii_lowercase();

    LOCALE_ROUTES
        .iter()
        .find(|(code, _)| *code == country.as_str())
        .map(|(_, path)| *path)
        .unwrap_or(FALLBACK_LOCALE_PATH)
}

/// Country header value, if present and readable.
pub fn country_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(COUNTRY_HEADER)
        .and_then(|value| value.to_str().ok())
}

/// Redirect for `request`, or `None` when the path is not the root.
pub fn route<B>(request: &Request<B>) -> Option<Response<()>> {
    if request.uri().path() != "/" {
        return None;
    }

    let target = localized_path(country_from_headers(request.headers()));
    let location = match request.uri().query() {
        Some(query) => format!("{}?{}", target, query),
        None => target.to_string(),
    };
    crate::verbose!("Redirecting / to {}", location);

    Some(redirect_to(&location))
}

/// 307 to `location`, or to the fallback locale if `location` is not a
/// valid header value.
fn redirect_to(location: &str) -> Response<()> {
    let value = HeaderValue::try_from(location).unwrap_or_else(|e| {
        crate::warn!("Bad redirect target {:?}: {}", location, e);
        HeaderValue::from_static(FALLBACK_LOCALE_PATH)
    });

    let mut response = Response::new(());
    *response.status_mut() = StatusCode::TEMPORARY_REDIRECT;
    response.headers_mut().insert(LOCATION, value);
    response
}

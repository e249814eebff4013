//! Bearer token extraction from the page URL

use url::Url;

const TOKEN_PARAM: &str = "token";

/// Extract the `token` query parameter from a full page URL.
///
/// Returns `Ok(None)` when the parameter is absent or empty.
pub fn token_from_url(page_url: &str) -> crate::Result<Option<String>> {
    let url = Url::parse(page_url)
        .map_err(|e| crate::DeviceStatusError::InvalidUrl(format!("{}: {}", page_url, e)))?;
    let token = url
        .query_pairs()
        .find(|(key, _)| key == TOKEN_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty());
    Ok(token)
}

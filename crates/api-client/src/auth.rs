use crate::error::ApiError;

/// Obtains a crumb for the authenticated Yahoo endpoints.
///
/// Yahoo only issues a crumb to a client that already carries its session
/// cookie, so this first visits `cookie_url` (the response status is irrelevant,
/// only the `Set-Cookie` header matters) and then asks for the crumb. The
/// client must have its cookie store enabled.
pub async fn fetch_crumb(
    client: &reqwest::Client,
    cookie_url: &str,
    query_base_url: &str,
) -> Result<String, ApiError> {
    let _ = client.get(cookie_url).send().await?;

    let response = client
        .get(format!("{query_base_url}/v1/test/getcrumb"))
        .send()
        .await?;
    let status = response.status();
    let crumb = response.text().await?.trim().to_string();

    if !status.is_success() {
        return Err(ApiError::Crumb(format!("HTTP {status}: {crumb}")));
    }
    // An HTML page instead of a token means consent or rate limiting got in the way.
    if crumb.is_empty() || crumb.contains('<') {
        return Err(ApiError::Crumb("empty or malformed crumb".to_string()));
    }

    tracing::debug!("Obtained provider crumb");
    Ok(crumb)
}

use crate::error::ProviderError;

/// Sends `request` and returns the body of a 2xx response.
///
/// 429 maps to [`ProviderError::RateLimited`] and every other non-2xx status
/// to [`ProviderError::UnexpectedStatus`], so the retry classifier can tell
/// them apart.
pub(crate) async fn read_success_body(
    request: reqwest::RequestBuilder,
    provider: &'static str,
) -> Result<String, ProviderError> {
    let response = request.send().await?;
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::RateLimited { provider });
    }
    if !status.is_success() {
        return Err(ProviderError::UnexpectedStatus {
            status: status.as_u16(),
            provider,
        });
    }

    Ok(response.text().await?)
}

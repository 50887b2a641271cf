//! Cover image download helper.

use crate::api::CatalogError;
use tracing::{debug, warn};

/// A downloaded image, ready to hand to whatever transports it.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    /// Sanitized file name (all whitespace removed)
    pub filename: String,
    /// Raw image bytes
    pub bytes: Vec<u8>,
}

/// Download an image from `url`, naming it `filename`.
///
/// Uses the same failure convention as the catalog client: a non-200
/// status or transport error is logged and returned, never raised.
pub async fn fetch_image(
    http: &reqwest::Client,
    url: &str,
    filename: &str,
) -> Result<FetchedImage, CatalogError> {
    let response = match http.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(url, error = %e, "image request could not be sent");
            return Err(CatalogError::Transport(e));
        }
    };

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        warn!(status = status.as_u16(), url, "image request rejected");
        return Err(CatalogError::Rejected {
            status: status.as_u16(),
            message: "image fetch failed".to_string(),
            url: url.to_string(),
        });
    }

    let bytes = match response.bytes().await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            warn!(url, error = %e, "image body could not be read");
            return Err(CatalogError::Transport(e));
        }
    };

    let filename: String = filename.chars().filter(|c| !c.is_whitespace()).collect();
    debug!(filename = %filename, size = bytes.len(), "image downloaded");

    Ok(FetchedImage { filename, bytes })
}

//! Image download for documents built with images enabled
//!
//! Images are saved beside the page's document and referenced by file name;
//! they are never embedded.

use crate::crawler::fetch_bytes;
use crate::extract::content::ContentRoot;
use crate::url::resolve_resource;
use reqwest::Client;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Folder next to each document that holds its images
pub const IMAGES_DIR: &str = "images";

const DEFAULT_EXTENSION: &str = ".jpg";

const IMAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// `src` attribute value to saved file name, for images that were fetched
pub type ImageMap = HashMap<String, String>;

/// One image to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    /// Raw `src` attribute, the key the synthesizer looks up
    pub src: String,
    pub url: Url,
    pub file_name: String,
}

/// Lists the images the document walk reaches, numbered in document order
///
/// Images inside page chrome that the root filters out are neither planned
/// nor counted.
pub fn plan_images(root: &ContentRoot<'_>, page_url: &Url) -> Vec<ImageRequest> {
    root.select_included("img")
        .into_iter()
        .filter(|img| img.value().attr("src").is_some())
        .enumerate()
        .filter_map(|(n, img)| {
            let src = img.value().attr("src")?.to_string();
            let url = resolve_resource(&src, page_url)?;
            let file_name = format!("image_{}{}", n, image_extension(&url));
            Some(ImageRequest {
                src,
                url,
                file_name,
            })
        })
        .collect()
}

/// Fetches planned images into `folder/images`
///
/// Failures are logged and left out of the returned map.
pub async fn download_images(
    client: &Client,
    requests: &[ImageRequest],
    folder: &Path,
) -> std::io::Result<ImageMap> {
    let mut saved = ImageMap::new();
    if requests.is_empty() {
        return Ok(saved);
    }

    let images_dir = folder.join(IMAGES_DIR);
    tokio::fs::create_dir_all(&images_dir).await?;

    for request in requests {
        let bytes = match tokio::time::timeout(IMAGE_TIMEOUT, fetch_bytes(client, &request.url))
            .await
        {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => {
                tracing::warn!("Failed to download image {}: {}", request.url, e);
                continue;
            }
            Err(_) => {
                tracing::warn!("Timed out downloading image {}", request.url);
                continue;
            }
        };

        let path = images_dir.join(&request.file_name);
        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            tracing::warn!("Failed to save image {}: {}", path.display(), e);
            continue;
        }
        saved.insert(request.src.clone(), request.file_name.clone());
    }

    tracing::debug!("Saved {}/{} images", saved.len(), requests.len());
    Ok(saved)
}

/// Extension of the URL's file name with its dot, or `.jpg`
fn image_extension(url: &Url) -> String {
    Path::new(url.path())
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

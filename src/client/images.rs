//! Image URL helpers.

use url::Url;

/// Shown when a listing has no image.
pub const PLACEHOLDER_IMAGE: &str = "https://placehold.co/800x600/png";

/// Rendition sizes used by the listing pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageSize {
    Thumbnail,
    #[default]
    Card,
    Detail,
    Hero,
}

impl ImageSize {
    /// Width and height in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ImageSize::Thumbnail => (300, 200),
            ImageSize::Card => (400, 300),
            ImageSize::Detail => (800, 600),
            ImageSize::Hero => (1200, 800),
        }
    }
}

fn is_unsplash(url: &Url) -> bool {
    url.host_str().is_some_and(|h| h.ends_with("unsplash.com"))
}

fn has_param(url: &Url, key: &str) -> bool {
    url.query_pairs().any(|(k, _)| k == key)
}

/// Replaces or adds query parameters, keeping the others in place.
fn set_params(url: &mut Url, params: &[(&str, String)]) {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !params.iter().any(|(p, _)| **p == **k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
}

/// Resolves an image reference for display.
///
/// Empty references become the placeholder, Unsplash links get a 600px webp
/// rendition unless they already carry a width, other absolute URLs pass
/// through, and relative upload paths are joined onto `api_base` when given.
pub fn image_url(path: &str, api_base: Option<&Url>) -> String {
    if path.is_empty() {
        return PLACEHOLDER_IMAGE.to_string();
    }

    if let Ok(mut url) = Url::parse(path) {
        if is_unsplash(&url) && !has_param(&url, "w") {
            set_params(
                &mut url,
                &[
                    ("w", "600".to_string()),
                    ("q", "80".to_string()),
                    ("fm", "webp".to_string()),
                    ("fit", "crop".to_string()),
                ],
            );
            return url.to_string();
        }
        return path.to_string();
    }

    match api_base.and_then(|base| base.join(path).ok()) {
        Some(url) => url.to_string(),
        None => path.to_string(),
    }
}

/// Sized Unsplash rendition; other URLs are returned untouched.
pub fn optimized_image_url(original: &str, size: ImageSize, quality: u8) -> String {
    let Ok(mut url) = Url::parse(original) else {
        return original.to_string();
    };
    if !is_unsplash(&url) {
        return original.to_string();
    }
    let (width, height) = size.dimensions();
    set_params(
        &mut url,
        &[
            ("w", width.to_string()),
            ("h", height.to_string()),
            ("q", quality.to_string()),
            ("fit", "crop".to_string()),
            ("auto", "format".to_string()),
        ],
    );
    url.to_string()
}

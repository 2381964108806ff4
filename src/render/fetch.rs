use std::path::{Path, PathBuf};

use crate::foundation::error::{CardError, CardResult};

#[derive(Clone, Debug)]
/// Decoded raster image in straight (non-premultiplied) RGBA8 form.
pub struct FetchedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Decoded pixel buffer.
    pub pixels: image::RgbaImage,
}

/// Decode encoded image bytes into RGBA8.
pub fn decode_image(bytes: &[u8]) -> CardResult<FetchedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| CardError::image_fetch(format!("decode image: {e}")))?;
    let pixels = dyn_img.to_rgba8();
    let (width, height) = pixels.dimensions();
    Ok(FetchedImage {
        width,
        height,
        pixels,
    })
}

/// Source of card images, keyed by the URL carried in image primitives.
///
/// The renderer fetches every referenced image through this trait before it
/// paints anything. Failures surface as [`CardError::ImageFetch`]; the
/// renderer downgrades them to skip-and-continue.
pub trait ImageFetcher {
    /// Fetch and decode the image behind `url`.
    fn fetch(&self, url: &str) -> CardResult<FetchedImage>;
}

/// Image fetcher over a filesystem root; URLs are root-relative paths.
pub struct FsImageFetcher {
    root: PathBuf,
}

impl FsImageFetcher {
    /// Create a fetcher rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageFetcher for FsImageFetcher {
    fn fetch(&self, url: &str) -> CardResult<FetchedImage> {
        let rel = normalize_rel_path(url)?;
        let path = self.root.join(Path::new(&rel));
        let bytes = std::fs::read(&path)
            .map_err(|e| CardError::image_fetch(format!("reading {}: {e}", path.display())))?;
        decode_image(&bytes)
    }
}

/// Normalize and validate root-relative image paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and
/// rejects absolute paths or parent traversals (`..`).
pub fn normalize_rel_path(url: &str) -> CardResult<String> {
    let s = url.replace('\\', "/");
    if s.starts_with('/') {
        return Err(CardError::image_fetch("image paths must be relative"));
    }
    if s.is_empty() {
        return Err(CardError::image_fetch("image path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(CardError::image_fetch("image paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(CardError::image_fetch("image path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/render/fetch.rs"]
mod tests;

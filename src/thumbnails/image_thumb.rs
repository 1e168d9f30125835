use anyhow::Context;
use image::imageops::FilterType;
use image::GenericImageView;
use std::path::Path;

/// Mirrors `cache.go::thumbnailer`'s sizing formula exactly: the target
/// width and height are chosen so their sum is always 200, proportioned by
/// the source's aspect ratio, rather than a fixed bounding box.
fn thumbnail_dimensions(width: u32, height: u32) -> (u32, u32) {
    let w = width as u64;
    let h = height as u64;
    let thumb_w = ((w * 100 * 2) / (w + h)).max(1) as u32;
    let thumb_h = (200u32).saturating_sub(thumb_w).max(1);
    (thumb_w, thumb_h)
}

pub async fn generate_thumbnail(source: &Path, dest: &Path) -> anyhow::Result<()> {
    let source = source.to_path_buf();
    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let img = image::open(&source)
            .with_context(|| format!("opening {} for thumbnailing", source.display()))?;
        let (w, h) = img.dimensions();
        let (thumb_w, thumb_h) = thumbnail_dimensions(w, h);
        let thumb = img.resize_exact(thumb_w, thumb_h, FilterType::Nearest);
        thumb
            .save(&dest)
            .with_context(|| format!("writing thumbnail {}", dest.display()))?;
        Ok(())
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_sum_to_two_hundred() {
        let (w, h) = thumbnail_dimensions(1920, 1080);
        assert_eq!(w + h, 200);
    }

    #[test]
    fn square_source_splits_evenly() {
        let (w, h) = thumbnail_dimensions(100, 100);
        assert_eq!(w, 100);
        assert_eq!(h, 100);
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Image preprocessing tests
//!
//! These tests verify that the ImagePreprocessor:
//! - Accepts every upload format and writes an RGB JPEG
//! - Caps the largest side at the configured maximum
//! - Honors custom enhancement settings
//! - Falls back to the original file on any failure

use bht_detector::{
    config::PreprocessConfig,
    vision::{ImagePreprocessor, PreparedImage},
};
use image::{DynamicImage, GenericImageView, ImageFormat, Luma, LumaA, Rgba};
use std::path::{Path, PathBuf};

fn save(dir: &Path, name: &str, image: DynamicImage, format: ImageFormat) -> PathBuf {
    let path = dir.join(name);
    image.save_with_format(&path, format).unwrap();
    path
}

#[cfg(test)]
mod preprocessing_tests {
    use super::*;

    #[test]
    fn test_formats_normalize_to_jpeg() {
        let input = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let preprocessor = ImagePreprocessor::new(PreprocessConfig::default(), scratch.path());

        let sources = [
            save(
                input.path(),
                "gray.png",
                DynamicImage::ImageLuma8(image::ImageBuffer::from_pixel(20, 10, Luma([90]))),
                ImageFormat::Png,
            ),
            save(
                input.path(),
                "alpha.png",
                DynamicImage::ImageLumaA8(image::ImageBuffer::from_pixel(20, 10, LumaA([90, 128]))),
                ImageFormat::Png,
            ),
            save(
                input.path(),
                "rgba.png",
                DynamicImage::ImageRgba8(image::ImageBuffer::from_pixel(
                    20,
                    10,
                    Rgba([1, 2, 3, 4]),
                )),
                ImageFormat::Png,
            ),
            save(
                input.path(),
                "photo.jpg",
                DynamicImage::new_rgb8(20, 10),
                ImageFormat::Jpeg,
            ),
        ];

        for source in &sources {
            let prepared = preprocessor.prepare(source);
            assert!(prepared.is_normalized(), "{} not normalized", source.display());

            let output = image::open(prepared.path()).unwrap();
            assert_eq!(output.dimensions(), (20, 10));
            assert!(matches!(output, DynamicImage::ImageRgb8(_)));
            assert_eq!(
                image::ImageFormat::from_path(prepared.path()).unwrap(),
                ImageFormat::Jpeg
            );
        }
    }

    #[test]
    fn test_tall_image_capped_at_max_dimension() {
        let input = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let config = PreprocessConfig {
            max_dimension: 100,
            ..PreprocessConfig::default()
        };
        let source = save(
            input.path(),
            "tall.png",
            DynamicImage::new_rgb8(50, 400),
            ImageFormat::Png,
        );

        let prepared = ImagePreprocessor::new(config, scratch.path()).prepare(&source);
        assert_eq!(image::open(prepared.path()).unwrap().dimensions(), (12, 100));
    }

    #[test]
    fn test_identity_enhancement_preserves_flat_image() {
        let config = PreprocessConfig {
            contrast: 1.0,
            sharpness: 1.0,
            ..PreprocessConfig::default()
        };
        let preprocessor = ImagePreprocessor::new(config, std::env::temp_dir());
        let flat = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            6,
            6,
            image::Rgb([120, 60, 30]),
        ));

        let output = preprocessor.normalize(flat.clone());
        assert_eq!(output, flat.to_rgb8());
    }

    #[test]
    fn test_missing_source_falls_back() {
        let scratch = tempfile::tempdir().unwrap();
        let preprocessor = ImagePreprocessor::new(PreprocessConfig::default(), scratch.path());
        let missing = scratch.path().join("missing.png");

        match preprocessor.prepare(&missing) {
            PreparedImage::Original(path) => assert_eq!(path, missing),
            PreparedImage::Normalized(_) => panic!("missing file cannot be normalized"),
        }
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_try_prepare_reports_errors() {
        let scratch = tempfile::tempdir().unwrap();
        let preprocessor = ImagePreprocessor::new(PreprocessConfig::default(), scratch.path());
        let err = preprocessor
            .try_prepare(&scratch.path().join("missing.png"))
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to load image"));
    }
}

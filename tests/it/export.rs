use paint_surface::{Color4, DrawingMode, SurfaceError};

use crate::helpers::{solid_image, TestSurfaceBuilder};

#[test]
fn export_matches_image_dimensions() {
    let surface = TestSurfaceBuilder::new()
        .with_image(solid_image(123, 45, [200, 10, 10, 255]))
        .build();

    let bitmap = surface.export_bitmap();

    assert_eq!(bitmap.dimensions(), (123, 45));
    assert_eq!(bitmap.get_pixel(60, 20).0, [200, 10, 10, 255]);
}

#[test]
fn export_without_image_uses_surface_size() {
    let surface = TestSurfaceBuilder::new().build();
    assert_eq!(surface.export_bitmap().dimensions(), surface.size());
}

#[test]
fn export_is_zoom_invariant() {
    let build = |zoom: f32| {
        TestSurfaceBuilder::new()
            .with_image(solid_image(80, 60, [0, 120, 0, 255]))
            .with_color(Color4::rgb(1.0, 1.0, 0.0))
            .with_zoom(zoom)
            .with_drag(DrawingMode::Rectangle, (10.0, 10.0), (40.0, 30.0))
            .with_drag(DrawingMode::Ellipse, (50.0, 5.0), (75.0, 55.0))
            .with_drag(DrawingMode::Line, (0.0, 59.0), (79.0, 0.0))
            .with_drag(DrawingMode::Freehand, (5.0, 50.0), (30.0, 55.0))
            .build()
    };

    let zoomed = build(2.0).export_bitmap();
    let plain = build(1.0).export_bitmap();

    assert_eq!(zoomed.dimensions(), plain.dimensions());
    assert!(zoomed.as_raw() == plain.as_raw());
}

#[test]
fn changing_zoom_does_not_alter_export() {
    let mut surface = TestSurfaceBuilder::new()
        .with_drag(DrawingMode::Line, (0.0, 0.0), (100.0, 100.0))
        .build();
    let before = surface.export_bitmap();
    surface.set_zoom(3.5).unwrap();
    assert!(surface.export_bitmap() == before);
}

#[test]
fn committed_content_is_painted() {
    let surface = TestSurfaceBuilder::new()
        .with_image(solid_image(50, 50, [255, 255, 255, 255]))
        .with_color(Color4::rgb(0.0, 0.0, 1.0))
        .with_drag(DrawingMode::Line, (0.0, 25.0), (49.0, 25.0))
        .build();

    let bitmap = surface.export_bitmap();

    assert_eq!(bitmap.get_pixel(25, 25).0, [0, 0, 255, 255]);
    assert_eq!(bitmap.get_pixel(25, 5).0, [255, 255, 255, 255]);
}

#[test]
fn save_writes_a_decodable_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.jpg");
    let surface = TestSurfaceBuilder::new()
        .with_image(solid_image(40, 30, [90, 90, 90, 255]))
        .with_drag(DrawingMode::Rectangle, (5.0, 5.0), (30.0, 20.0))
        .build();

    surface.save(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Jpeg);
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (40, 30));
}

#[test]
fn save_overwrites_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.jpg");
    std::fs::write(&path, vec![0u8; 100_000]).unwrap();

    TestSurfaceBuilder::new()
        .with_image(solid_image(8, 8, [0, 0, 0, 255]))
        .build()
        .save(&path)
        .unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.len() < 100_000);
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
}

#[test]
fn save_into_missing_directory_reports_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.jpg");
    let surface = TestSurfaceBuilder::new().build();

    let err = surface.save(&path).unwrap_err();

    assert!(matches!(err, SurfaceError::ExportIo { .. }));
    assert!(!path.exists());
}

#[test]
fn failed_encode_keeps_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keep.jpg");
    std::fs::write(&path, b"previous good export").unwrap();
    // Wider than a JPEG frame header can describe.
    let surface = TestSurfaceBuilder::new()
        .with_image(solid_image(70_000, 1, [0, 0, 0, 255]))
        .build();

    let err = surface.save(&path).unwrap_err();

    assert!(matches!(err, SurfaceError::Encode { .. }));
    assert_eq!(std::fs::read(&path).unwrap(), b"previous good export");
}

#[test]
fn failed_encode_creates_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("new.jpg");
    let surface = TestSurfaceBuilder::new()
        .with_image(solid_image(70_000, 1, [0, 0, 0, 255]))
        .build();

    assert!(surface.save(&path).is_err());
    assert!(!path.exists());
}

//! Surface creation, geometry, and teardown against the software backend.
//!
//! Every test here runs on any machine: the `SoftwareBackend` records each
//! backend call so the tests can assert on exact call sequences.

use std::sync::Arc;

use vs_common::{ChromaType, Resolution, VideoFormat, VideoInfo};
use vs_vaapi::software::{BackendCall, Operation};
use vs_vaapi::{
    AllocFlags, BufferMemoryType, BufferProxy, Display, Image, SoftwareBackend, Subpicture,
    SubpictureFlags, Surface, SurfaceError, INVALID_ID,
};

fn setup() -> (Arc<SoftwareBackend>, Display) {
    let backend = Arc::new(SoftwareBackend::new());
    let display = Display::new(backend.clone());
    (backend, display)
}

fn overlay(display: &Display) -> Arc<Subpicture> {
    let image = Image::new(display, VideoFormat::Bgra, 16, 16).unwrap();
    Subpicture::new(image, SubpictureFlags::empty()).unwrap()
}

// ── Creation ──

#[test]
fn explicit_format_geometry_matches_request() {
    let (_backend, display) = setup();
    let formats = [
        VideoFormat::Nv12,
        VideoFormat::Yv12,
        VideoFormat::I420,
        VideoFormat::P010,
        VideoFormat::Yuy2,
        VideoFormat::Uyvy,
        VideoFormat::Ayuv,
        VideoFormat::Y444,
        VideoFormat::Gray8,
        VideoFormat::Rgba,
        VideoFormat::Bgra,
        VideoFormat::Argb,
        VideoFormat::Abgr,
        VideoFormat::Rgbx,
        VideoFormat::Bgrx,
        VideoFormat::Xrgb,
        VideoFormat::Xbgr,
    ];

    for format in formats {
        for (width, height) in [(64, 64), (1920, 1080), (33, 17)] {
            let surface = Surface::new_with_format(&display, format, width, height)
                .unwrap_or_else(|e| panic!("{format} {width}x{height}: {e}"));
            assert_eq!(surface.size(), Resolution::new(width, height), "{format}");
            assert_eq!(surface.format(), format);
            assert_eq!(Some(surface.chroma_type()), format.chroma_type());
        }
    }
}

#[test]
fn explicit_format_with_pinned_layout_keeps_geometry() {
    let (_backend, display) = setup();
    let info = VideoInfo::new(VideoFormat::Nv12, 1280, 720).unwrap();
    let surface = Surface::new_full(
        &display,
        &info,
        AllocFlags::LINEAR_STORAGE | AllocFlags::FIXED_STRIDES | AllocFlags::FIXED_OFFSETS,
    )
    .unwrap();
    assert_eq!(surface.size(), Resolution::new(1280, 720));
    assert_eq!(surface.format(), VideoFormat::Nv12);
}

#[test]
fn unsupported_chroma_leaves_no_allocation() {
    let (backend, display) = setup();
    let result = Surface::new(&display, ChromaType::Yuv410, 64, 64);
    assert!(matches!(result, Err(SurfaceError::UnsupportedChromaType(ChromaType::Yuv410))));
    assert_eq!(backend.count(Operation::CreateSurface), 0);
    assert_eq!(backend.live_surfaces(), 0);
}

#[test]
fn driver_refusal_leaves_no_allocation() {
    let (backend, display) = setup();
    // Negotiation succeeds, but the driver does not support 4:1:1.
    let result = Surface::new(&display, ChromaType::Yuv411, 64, 64);
    assert!(matches!(result, Err(SurfaceError::Backend(_))));
    assert_eq!(backend.count(Operation::CreateSurface), 1);
    assert_eq!(backend.live_surfaces(), 0);
}

#[test]
fn surfaces_get_distinct_ids() {
    let (_backend, display) = setup();
    let a = Surface::new(&display, ChromaType::Yuv420, 16, 16).unwrap();
    let b = Surface::new(&display, ChromaType::Yuv420, 16, 16).unwrap();
    assert_ne!(a.id(), INVALID_ID);
    assert_ne!(a.id(), b.id());
}

#[test]
fn imported_buffer_is_released_with_surface() {
    let (backend, display) = setup();
    let info = VideoInfo::new(VideoFormat::Bgrx, 32, 32).unwrap();
    let proxy = BufferProxy::new(11, info.size, BufferMemoryType::DmaBuf);

    let surface = Surface::new_from_buffer_proxy(&display, Arc::clone(&proxy), &info).unwrap();
    assert!(surface
        .buffer_proxy()
        .is_some_and(|p| Arc::ptr_eq(p, &proxy)));
    assert_eq!(Arc::strong_count(&proxy), 2);

    drop(surface);
    assert_eq!(Arc::strong_count(&proxy), 1);
    assert_eq!(backend.live_surfaces(), 0);
}

// ── Teardown ──

#[test]
fn destroy_with_overlays_deassociates_each_before_destroy() {
    let (backend, display) = setup();
    let mut surface = Surface::new(&display, ChromaType::Yuv420, 64, 64).unwrap();

    let overlays: Vec<_> = (0..3).map(|_| overlay(&display)).collect();
    for sub in &overlays {
        surface.associate_subpicture(sub, None, None).unwrap();
    }
    for sub in &overlays {
        assert_eq!(Arc::strong_count(sub), 2);
    }

    let surface_id = surface.id();
    backend.clear_calls();
    drop(surface);

    let calls = backend.calls();
    let destroy_at = calls
        .iter()
        .position(|c| *c == BackendCall::DestroySurface { surface: surface_id })
        .expect("surface destroyed");
    let deassociations: Vec<usize> = calls
        .iter()
        .enumerate()
        .filter(|(_, c)| c.operation() == Operation::DeassociateSubpicture)
        .map(|(i, _)| i)
        .collect();

    assert_eq!(deassociations.len(), 3);
    assert!(deassociations.iter().all(|&i| i < destroy_at));
    for sub in &overlays {
        assert_eq!(Arc::strong_count(sub), 1);
    }
}

#[test]
fn released_overlays_are_destroyed_before_surface() {
    let (backend, display) = setup();
    let mut surface = Surface::new(&display, ChromaType::Yuv420, 64, 64).unwrap();
    for _ in 0..2 {
        let sub = overlay(&display);
        surface.associate_subpicture(&sub, None, None).unwrap();
    }
    assert_eq!(backend.live_subpictures(), 2);

    backend.clear_calls();
    drop(surface);

    let ops: Vec<Operation> = backend
        .calls()
        .iter()
        .map(BackendCall::operation)
        .filter(|op| {
            matches!(
                op,
                Operation::DeassociateSubpicture
                    | Operation::DestroySubpicture
                    | Operation::DestroySurface
            )
        })
        .collect();
    assert_eq!(
        ops,
        vec![
            Operation::DeassociateSubpicture,
            Operation::DestroySubpicture,
            Operation::DeassociateSubpicture,
            Operation::DestroySubpicture,
            Operation::DestroySurface,
        ]
    );
    assert_eq!(backend.live_subpictures(), 0);
    assert_eq!(backend.live_images(), 0);
}

#[test]
fn failed_destroy_is_not_fatal() {
    let (backend, display) = setup();
    let surface = Surface::new(&display, ChromaType::Yuv420, 16, 16).unwrap();
    backend.fail_next(Operation::DestroySurface);
    drop(surface);
    assert_eq!(backend.count(Operation::DestroySurface), 1);
    assert!(!display.is_locked());
}

//! The `Notifier` contract (spec §6 "Notifier callbacks"), the host-side
//! collaborator the scheduler reports progress and images through.
//! Grounded on `original_source/src/painter/painting/thread_notifier.h`.

/// Row-major `R32G32B32` image (spec §6 "Byte layout... R32G32B32
/// (12 B/pixel)"): the background-included output.
#[derive(Debug, Clone)]
pub struct RgbImage {
    pub size: [usize; 2],
    pub pixels: Vec<[f32; 3]>,
}

impl RgbImage {
    pub fn new(size: [usize; 2]) -> Self {
        RgbImage {
            size,
            pixels: vec![[0.0; 3]; size[0] * size[1]],
        }
    }
}

/// Row-major `R32G32B32A32_PREMULTIPLIED` image (spec §6): the
/// background-excluded output, alpha capturing foreground coverage.
#[derive(Debug, Clone)]
pub struct RgbaImage {
    pub size: [usize; 2],
    pub pixels: Vec<[f32; 4]>,
}

impl RgbaImage {
    pub fn new(size: [usize; 2]) -> Self {
        RgbaImage {
            size,
            pixels: vec![[0.0; 4]; size[0] * size[1]],
        }
    }
}

/// Both published images for one pass (spec §6 "Outputs per pass").
#[derive(Debug, Clone)]
pub struct Images {
    pub with_background: RgbImage,
    pub without_background: RgbaImage,
}

/// The core's only outward-facing callback surface (spec §6). The host
/// implements this; the core never assumes a display, a file format, or
/// a UI framework (spec §1).
pub trait Notifier: Send + Sync {
    fn thread_busy(&self, thread: usize, pixel: [usize; 2]);
    fn thread_free(&self, thread: usize);
    /// Fired on every sample merge, for live display (spec §4.10
    /// "Concurrency").
    fn pixel_set(&self, pixel: [usize; 2], rgb32: [f32; 3]);
    /// Called by the single publishing worker at a pass boundary; the
    /// returned lock is released at the end of publication (spec §5
    /// "publication phase").
    fn images(&self, pass_number: u32) -> std::sync::MutexGuard<'_, Images>;
    fn pass_done(&self, pass_number: u32);
    fn error_message(&self, text: &str);
}

/// A `Notifier` that discards everything, useful for tests and
/// benchmarks that don't care about live display.
pub struct NullNotifier {
    images: std::sync::Mutex<Images>,
}

impl NullNotifier {
    pub fn new(screen_size: [usize; 2]) -> Self {
        NullNotifier {
            images: std::sync::Mutex::new(Images {
                with_background: RgbImage::new(screen_size),
                without_background: RgbaImage::new(screen_size),
            }),
        }
    }
}

impl Notifier for NullNotifier {
    fn thread_busy(&self, _thread: usize, _pixel: [usize; 2]) {}
    fn thread_free(&self, _thread: usize) {}
    fn pixel_set(&self, _pixel: [usize; 2], _rgb32: [f32; 3]) {}
    fn images(&self, _pass_number: u32) -> std::sync::MutexGuard<'_, Images> {
        self.images.lock().unwrap()
    }
    fn pass_done(&self, _pass_number: u32) {}
    fn error_message(&self, text: &str) {
        log::error!("{text}");
    }
}

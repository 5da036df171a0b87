//! Compile-time configuration constants.
//!
//! The original system has no config file at this layer (the ROM/filesystem
//! loader that would supply one is an external collaborator), so the handful
//! of knobs this crate exposes are `const`s rather than anything
//! runtime-parsed, in the style of a compile-time layout-constants module.

/// Maximum number of windows the system tracks at once.
pub const SYS_MAX_WINDOWS: usize = 32;

/// Reserved display-order value for the backdrop window. Always the lowest.
pub const SYS_WIN_Z_ORDER_BACKDROP: u16 = 0;

/// Sentinel display-order value assigned to a window the instant it becomes
/// active, before the window list is re-sorted and renumbered.
pub const SYS_WIN_Z_ORDER_NEWLY_ACTIVE: u16 = u16::MAX;

/// Maximum per-window accumulated clip rects before a caller must fall back
/// to a full-window invalidation.
pub const WIN_MAX_CLIP_RECTS: usize = 10;

/// Maximum per-window accumulated damage rects.
pub const WIN_MAX_DAMAGE_RECTS: usize = 4;

/// Width, in pixels, of each edge drag-zone strip.
pub const WIN_DEFAULT_DRAG_ZONE_SIZE: i32 = 4;

/// Maximum nested menu levels a window can own.
pub const WIN_MAX_MENU_LEVELS: usize = 4;

/// Circular event queue capacity.
pub const EVENT_QUEUE_SIZE: usize = 256;

/// Sentinel returned by control-id lookups that miss.
pub const CONTROL_ID_NOT_FOUND: u16 = u16::MAX;

/// Sentinel returned by menu hit-tests that miss.
pub const MENU_ID_NO_SELECTION: u16 = u16::MAX;

/// Minimum/maximum legal `Bitmap::create` dimensions.
pub const BITMAP_MIN_DIM: i32 = 2;
pub const BITMAP_MAX_DIM: i32 = 2000;

/// Legal `draw_round_box` radius range.
pub const ROUND_BOX_MIN_RADIUS: i32 = 3;
pub const ROUND_BOX_MAX_RADIUS: i32 = 20;

/// Safety cap on `Font::measure_string`/`draw_string` character counts when
/// the caller passes "unlimited" (`-1` in the original C API).
pub const WORD_WRAP_MAX_LEN: usize = 12_800;

/// Fixed VRAM byte offset between the two screen bitmap layers.
pub const VRAM_OFFSET_TO_NEXT_SCREEN: u32 = 0x0020_0000;

/// Default video mode preferred when a machine supports more than one and no
/// other preference has been configured.
pub const DEFAULT_VIDEO_MODE: crate::platform::VideoMode = crate::platform::VideoMode::Mode640x480;

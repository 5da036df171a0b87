//! One physical display channel: VICKY register block, text RAM/LUTs, and the
//! two bitmap layers.
//!
//! Grounded on `original_source/lib_sys.c`'s `Sys_AutoConfigure` (per-model
//! address tables, now pulled from `platform::screen_addresses`) and
//! `general_a2560.c` (VICKY register layout, border/mode register offsets).

use crate::allocator::{Allocator, Pool};
use crate::bitmap::Bitmap;
use crate::config::VRAM_OFFSET_TO_NEXT_SCREEN;
use crate::error::{SystemInitError, WmResult};
use crate::platform::{MachineModel, ScreenAddresses, VideoMode};

/// Offsets within the VICKY register block, per `general_a2560.c`.
mod reg {
    pub const MASTER_CTRL: usize = 0x00;
    pub const BORDER_CTRL: usize = 0x78;
    pub const BORDER_COLOR: usize = 0x7C;
    pub const GAMMA_CTRL: usize = 0x04;
    pub const BITMAP_L0_VRAM_ADDR: usize = 0x100;
    pub const BITMAP_L1_VRAM_ADDR: usize = 0x104;
}

/// Mode bits packed into `MASTER_CTRL` (bits 1:2 select resolution on this
/// hardware family per `general_a2560.c`'s mode table).
const MODE_BITS_MASK: u32 = 0b0000_0110;

fn mode_bits(mode: VideoMode) -> u32 {
    match mode {
        VideoMode::Mode640x400 => 0b0000_0000,
        VideoMode::Mode640x480 => 0b0000_0010,
        VideoMode::Mode800x600 => 0b0000_0100,
        VideoMode::Mode1024x768 => 0b0000_0110,
    }
}

fn bits_to_mode(bits: u32) -> VideoMode {
    match bits & MODE_BITS_MASK {
        0b0000_0000 => VideoMode::Mode640x400,
        0b0000_0010 => VideoMode::Mode640x480,
        0b0000_0100 => VideoMode::Mode800x600,
        _ => VideoMode::Mode1024x768,
    }
}

const GAMMA_ENABLE_BIT: u32 = 1 << 7;

/// Standard 16-color VGA palette, as BGRA bytes: the byte order VICKY's LUT
/// wants on this family.
const VGA_16_PALETTE: [[u8; 4]; 16] = [
    [0x00, 0x00, 0x00, 0xFF],
    [0xAA, 0x00, 0x00, 0xFF],
    [0x00, 0xAA, 0x00, 0xFF],
    [0xAA, 0xAA, 0x00, 0xFF],
    [0x00, 0x00, 0xAA, 0xFF],
    [0xAA, 0x00, 0xAA, 0xFF],
    [0x00, 0x55, 0xAA, 0xFF],
    [0xAA, 0xAA, 0xAA, 0xFF],
    [0x55, 0x55, 0x55, 0xFF],
    [0xFF, 0x55, 0x55, 0xFF],
    [0x55, 0xFF, 0x55, 0xFF],
    [0xFF, 0xFF, 0x55, 0xFF],
    [0x55, 0x55, 0xFF, 0xFF],
    [0xFF, 0x55, 0xFF, 0xFF],
    [0x55, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF],
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayContent {
    TextOnly,
    GraphicsOnly,
    TextOverGraphics,
}

/// One physical VICKY channel: register block plus text and graphics state.
pub struct Screen {
    addrs: ScreenAddresses,
    video_mode: VideoMode,
    width_px: i32,
    height_px: i32,
    border_x: i32,
    border_y: i32,
    cols: i32,
    rows: i32,
    layer0: Option<Bitmap>,
    layer1: Option<Bitmap>,
}

impl Screen {
    /// Build a `Screen` for `channel` on `model`, auto-configuring video mode,
    /// border/cell geometry, text LUTs, and gamma, following
    /// `original_source/lib_sys.c`'s `Sys_AutoConfigure` step list.
    ///
    /// # Safety
    /// The channel's VICKY register block at `addrs.vicky` must be mapped and
    /// live for the returned `Screen`'s lifetime.
    pub unsafe fn auto_configure(model: MachineModel, channel: usize) -> Result<Screen, SystemInitError> {
        let addrs = crate::platform::screen_addresses(model, channel);

        let master = read_reg(addrs.vicky, reg::MASTER_CTRL);
        let video_mode = bits_to_mode(master);
        let (width_px, height_px) = video_mode.dimensions();

        let (border_x, border_y) = read_border(addrs.vicky);
        let (cols, rows) = compute_cell_geometry(width_px, height_px, border_x, border_y);

        seed_text_lut(addrs.vicky);
        set_gamma_enabled(addrs.vicky, true);

        Ok(Screen {
            addrs,
            video_mode,
            width_px,
            height_px,
            border_x,
            border_y,
            cols,
            rows,
            layer0: None,
            layer1: None,
        })
    }

    pub fn video_mode(&self) -> VideoMode {
        self.video_mode
    }

    pub fn width_px(&self) -> i32 {
        self.width_px
    }

    pub fn height_px(&self) -> i32 {
        self.height_px
    }

    pub fn visible_cols(&self) -> i32 {
        self.cols
    }

    pub fn visible_rows(&self) -> i32 {
        self.rows
    }

    /// Write `mode`, clearing the existing mode bits first, then re-detect
    /// border/cell geometry.
    pub fn set_video_mode(&mut self, mode: VideoMode) {
        let mut master = read_reg(self.addrs.vicky, reg::MASTER_CTRL);
        master &= !MODE_BITS_MASK;
        master |= mode_bits(mode);
        write_reg(self.addrs.vicky, reg::MASTER_CTRL, master);

        self.video_mode = mode;
        let (w, h) = mode.dimensions();
        self.width_px = w;
        self.height_px = h;
        let (bx, by) = read_border(self.addrs.vicky);
        self.border_x = bx;
        self.border_y = by;
        let (cols, rows) = compute_cell_geometry(w, h, bx, by);
        self.cols = cols;
        self.rows = rows;
    }

    /// Configure text/graphics/overlay content mode.
    pub fn set_display_content(&mut self, content: DisplayContent) {
        let mut master = read_reg(self.addrs.vicky, reg::MASTER_CTRL);
        const TEXT_ENABLE_BIT: u32 = 1 << 0;
        const BITMAP_ENABLE_BIT: u32 = 1 << 3;
        match content {
            DisplayContent::TextOnly => {
                master |= TEXT_ENABLE_BIT;
                master &= !BITMAP_ENABLE_BIT;
            }
            DisplayContent::GraphicsOnly => {
                master &= !TEXT_ENABLE_BIT;
                master |= BITMAP_ENABLE_BIT;
            }
            DisplayContent::TextOverGraphics => {
                master |= TEXT_ENABLE_BIT;
                master |= BITMAP_ENABLE_BIT;
            }
        }
        write_reg(self.addrs.vicky, reg::MASTER_CTRL, master);
    }

    /// Allocate both bitmap layers in VRAM and register their addresses with
    /// VICKY at the fixed offsets `0` and `VRAM_OFFSET_TO_NEXT_SCREEN`.
    pub fn allocate_bitmap_layers(&mut self, alloc: &mut Allocator) -> WmResult<()> {
        let layer0 = Bitmap::create(alloc, self.width_px, self.height_px, true)?;
        let layer1 = Bitmap::create(alloc, self.width_px, self.height_px, true)?;

        write_layer_vram_addr(self.addrs.vicky, reg::BITMAP_L0_VRAM_ADDR, 0);
        write_layer_vram_addr(self.addrs.vicky, reg::BITMAP_L1_VRAM_ADDR, VRAM_OFFSET_TO_NEXT_SCREEN);

        self.layer0 = Some(layer0);
        self.layer1 = Some(layer1);
        Ok(())
    }

    pub fn layer0(&self) -> Option<&Bitmap> {
        self.layer0.as_ref()
    }

    pub fn layer0_mut(&mut self) -> Option<&mut Bitmap> {
        self.layer0.as_mut()
    }

    pub fn layer1(&self) -> Option<&Bitmap> {
        self.layer1.as_ref()
    }

    pub fn layer1_mut(&mut self) -> Option<&mut Bitmap> {
        self.layer1.as_mut()
    }
}

fn read_reg(vicky: usize, offset: usize) -> u32 {
    unsafe { core::ptr::read_volatile((vicky + offset) as *const u32) }
}

fn write_reg(vicky: usize, offset: usize, value: u32) {
    unsafe { core::ptr::write_volatile((vicky + offset) as *mut u32, value) };
}

/// Border size in pixels per axis: one byte per axis on C256, packed into a
/// 32-bit word on A2560; this reads the packed word uniformly and masks,
/// which also covers the single-byte case once promoted through the MMIO
/// bus.
fn read_border(vicky: usize) -> (i32, i32) {
    let packed = read_reg(vicky, reg::BORDER_CTRL);
    let x = (packed & 0xFF) as i32;
    let y = ((packed >> 8) & 0xFF) as i32;
    (x, y)
}

const TEXT_CELL_WIDTH: i32 = 8;
const TEXT_CELL_HEIGHT: i32 = 8;

fn compute_cell_geometry(width_px: i32, height_px: i32, border_x: i32, border_y: i32) -> (i32, i32) {
    let cols = (width_px - 2 * border_x) / TEXT_CELL_WIDTH;
    let rows = (height_px - 2 * border_y) / TEXT_CELL_HEIGHT;
    (cols.max(0), rows.max(0))
}

fn seed_text_lut(vicky: usize) {
    const TEXT_FORE_LUT_OFFSET: usize = 0x200;
    for (i, entry) in VGA_16_PALETTE.iter().enumerate() {
        let word = u32::from_le_bytes(*entry);
        write_reg(vicky, TEXT_FORE_LUT_OFFSET + i * 4, word);
    }
}

fn set_gamma_enabled(vicky: usize, enabled: bool) {
    let mut v = read_reg(vicky, reg::GAMMA_CTRL);
    if enabled {
        v |= GAMMA_ENABLE_BIT;
    } else {
        v &= !GAMMA_ENABLE_BIT;
    }
    write_reg(vicky, reg::GAMMA_CTRL, v);
}

fn write_layer_vram_addr(vicky: usize, reg_offset: usize, vram_offset: u32) {
    write_reg(vicky, reg_offset, vram_offset);
}

/// Fall-through diagnostic sink used by `log::write_bytes` on real hardware
/// (no `emulator_diagnostics` peek address to write to). Writes directly into
/// text character RAM at the console cursor, one byte per cell, wrapping at
/// end of row. This crate does not track a persistent console cursor across
/// calls beyond a single process-lifetime counter, since the diagnostic
/// channel is a debugging aid, not a user-facing terminal.
use core::sync::atomic::{AtomicUsize, Ordering};
static CONSOLE_CURSOR: AtomicUsize = AtomicUsize::new(0);

/// Text RAM base used by the console fallback. Bound once via
/// `set_console_text_ram` during `System::init`; writes are dropped until then.
static CONSOLE_TEXT_RAM: AtomicUsize = AtomicUsize::new(0);
static CONSOLE_CELL_COUNT: AtomicUsize = AtomicUsize::new(0);

pub fn set_console_text_ram(text_ram: usize, cell_count: usize) {
    CONSOLE_TEXT_RAM.store(text_ram, Ordering::Relaxed);
    CONSOLE_CELL_COUNT.store(cell_count, Ordering::Relaxed);
}

pub fn console_write(bytes: &[u8]) {
    let base = CONSOLE_TEXT_RAM.load(Ordering::Relaxed);
    let cells = CONSOLE_CELL_COUNT.load(Ordering::Relaxed);
    if base == 0 || cells == 0 {
        return;
    }
    for &b in bytes {
        let pos = CONSOLE_CURSOR.fetch_add(1, Ordering::Relaxed) % cells;
        unsafe { core::ptr::write_volatile((base + pos) as *mut u8, b) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_bits_round_trip() {
        for mode in [
            VideoMode::Mode640x400,
            VideoMode::Mode640x480,
            VideoMode::Mode800x600,
            VideoMode::Mode1024x768,
        ] {
            assert_eq!(bits_to_mode(mode_bits(mode)), mode);
        }
    }

    #[test]
    fn cell_geometry_subtracts_border_twice() {
        let (cols, rows) = compute_cell_geometry(640, 480, 8, 8);
        assert_eq!(cols, (640 - 16) / 8);
        assert_eq!(rows, (480 - 16) / 8);
    }

    #[test]
    fn cell_geometry_never_negative() {
        let (cols, rows) = compute_cell_geometry(10, 10, 100, 100);
        assert_eq!(cols, 0);
        assert_eq!(rows, 0);
    }

    #[test]
    fn console_write_noop_before_binding() {
        // No text RAM bound yet in this test process; must not panic or write.
        console_write(b"hello");
    }
}

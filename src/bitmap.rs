//! Indexed-color pixel surface with pen state, owned by one of the two pools.
//!
//! Grounded on `librender::surface::RenderSurface` for the raw-pointer pixel
//! access shape (`put_pixel`/`fill_rect`/`blit_rect`), adapted from ARGB8888 to
//! single-byte palette indices and from alpha blending to opaque indexed
//! color, per `original_source/bitmap.c`'s `Bitmap_*` family.

use core::ptr;

use crate::allocator::{Allocator, Pool};
use crate::config::{BITMAP_MAX_DIM, BITMAP_MIN_DIM, ROUND_BOX_MAX_RADIUS, ROUND_BOX_MIN_RADIUS};
use crate::error::{WmError, WmResult};
use crate::font::Font;
use crate::geometry::Rect;

extern crate alloc;
use alloc::vec::Vec;

/// An indexed-color pixel buffer plus pen state.
///
/// `addr` is never null for a live `Bitmap`: construction fails rather than
/// producing one, so a `Bitmap` always owns valid backing memory.
pub struct Bitmap {
    addr: *mut u8,
    width: i32,
    height: i32,
    pool: Pool,
    pen_x: i32,
    pen_y: i32,
    color: u8,
    font: Option<*const Font>,
}

impl Bitmap {
    /// Allocate a `width x height` indexed-color bitmap from the given pool.
    /// Dimensions must fall in `[BITMAP_MIN_DIM, BITMAP_MAX_DIM]`.
    pub fn create(alloc: &mut Allocator, width: i32, height: i32, vram: bool) -> WmResult<Bitmap> {
        if width < BITMAP_MIN_DIM || width > BITMAP_MAX_DIM || height < BITMAP_MIN_DIM || height > BITMAP_MAX_DIM {
            return Err(WmError::InvalidArgument);
        }
        let pool = if vram { Pool::Vram } else { Pool::Normal };
        let count = (width as usize) * (height as usize);
        let addr = alloc.zero_alloc(count, 1, pool)?;
        Ok(Bitmap {
            addr,
            width,
            height,
            pool,
            pen_x: 0,
            pen_y: 0,
            color: 0,
            font: None,
        })
    }

    /// Wrap a caller-owned, already-allocated buffer (used for the screen's
    /// bitmap layers, which live at a fixed VRAM address chosen by `Screen`
    /// rather than being handed out by the pool).
    ///
    /// # Safety
    /// `addr` must point to at least `width * height` valid, exclusively
    /// owned bytes for the lifetime of the returned `Bitmap`.
    pub unsafe fn from_raw(addr: *mut u8, width: i32, height: i32, pool: Pool) -> Bitmap {
        Bitmap { addr, width, height, pool, pen_x: 0, pen_y: 0, color: 0, font: None }
    }

    pub fn free(self, alloc: &mut Allocator) {
        let count = (self.width as usize) * (self.height as usize);
        alloc.free(self.addr, count, 1, self.pool);
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn pool(&self) -> Pool {
        self.pool
    }

    pub fn overall_rect(&self) -> Rect {
        Rect::from_origin_size(0, 0, self.width, self.height)
    }

    pub fn pen_x(&self) -> i32 {
        self.pen_x
    }

    pub fn pen_y(&self) -> i32 {
        self.pen_y
    }

    pub fn color(&self) -> u8 {
        self.color
    }

    /// Set the pen position. Negative coordinates are allowed (for partially
    /// off-the-left/top text), but `x >= width` or `y >= height` fails
    /// without mutating the pen.
    pub fn set_pen_xy(&mut self, x: i32, y: i32) -> WmResult<()> {
        if x >= self.width || y >= self.height {
            return Err(WmError::InvalidArgument);
        }
        self.pen_x = x;
        self.pen_y = y;
        Ok(())
    }

    pub fn advance_pen_x(&mut self, dx: i32) {
        self.pen_x += dx;
    }

    pub fn set_color(&mut self, color: u8) {
        self.color = color;
    }

    pub fn set_font(&mut self, font: &Font) {
        self.font = Some(font as *const Font);
    }

    pub fn font(&self) -> Option<&Font> {
        self.font.map(|p| unsafe { &*p })
    }

    /// Fixes `original_source/bitmap.c`'s `Bitmap_GetMemLocForXY`, whose range
    /// check (`x > max_col && y > max_row` with `&&` instead of `||`) is
    /// always false for in-bounds rejection on one axis. This performs the
    /// correct per-axis check instead.
    fn offset_for_xy(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            None
        } else {
            Some((y as usize) * (self.width as usize) + x as usize)
        }
    }

    pub fn get_pixel_at_xy(&self, x: i32, y: i32) -> Option<u8> {
        self.offset_for_xy(x, y).map(|off| unsafe { ptr::read(self.addr.add(off)) })
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: u8) -> WmResult<()> {
        match self.offset_for_xy(x, y) {
            Some(off) => {
                unsafe { ptr::write(self.addr.add(off), color) };
                Ok(())
            }
            None => Err(WmError::InvalidArgument),
        }
    }

    /// Fill `rect` (clipped to the bitmap's bounds) with `color`
    /// (`Bitmap_FillBox`/`Bitmap_FillMemory`).
    pub fn fill_box(&mut self, rect: Rect, color: u8) -> WmResult<()> {
        let clipped = match rect.intersect(&self.overall_rect()) {
            Some(r) => r,
            None => return Err(WmError::NoIntersection),
        };
        for y in clipped.min_y..=clipped.max_y {
            let row_start = (y as usize) * (self.width as usize) + clipped.min_x as usize;
            let len = clipped.width() as usize;
            unsafe {
                ptr::write_bytes(self.addr.add(row_start), color, len);
            }
        }
        Ok(())
    }

    /// Horizontal run (`Bitmap_DrawHLine`, which in the original delegates to
    /// `Bitmap_FillBox` with a height of 1).
    pub fn draw_h_line(&mut self, x: i32, y: i32, len: i32, color: u8) -> WmResult<()> {
        self.fill_box(Rect::from_origin_size(x, y, len, 1), color)
    }

    /// Vertical run (`Bitmap_DrawVLine`, a per-pixel loop in the original,
    /// since there is no horizontal-run fast path to reuse on this axis).
    pub fn draw_v_line(&mut self, x: i32, y: i32, len: i32, color: u8) -> WmResult<()> {
        for dy in 0..len {
            let _ = self.set_pixel(x, y + dy, color);
        }
        Ok(())
    }

    /// Bresenham line between two points (`Bitmap_DrawLine`).
    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: u8) -> WmResult<()> {
        let mut x1 = x1;
        let mut y1 = y1;
        let dx = (x2 - x1).abs();
        let dy = (y2 - y1).abs();
        let sx = if x1 < x2 { 1 } else { -1 };
        let sy = if y1 < y2 { 1 } else { -1 };
        let mut err = (if dx > dy { dx } else { -dy }) / 2;

        loop {
            let _ = self.set_pixel(x1, y1, color);
            if x1 == x2 && y1 == y2 {
                break;
            }
            let e2 = err;
            if e2 > -dx {
                err -= dy;
                x1 += sx;
            }
            if e2 < dy {
                err += dx;
                y1 += sy;
            }
        }
        Ok(())
    }

    /// Box outline or filled box (`Bitmap_DrawBox`/`Bitmap_DrawBoxCoords`).
    pub fn draw_box(&mut self, rect: Rect, color: u8, filled: bool) -> WmResult<()> {
        if filled {
            return self.fill_box(rect, color);
        }
        self.draw_h_line(rect.min_x, rect.min_y, rect.width(), color)?;
        self.draw_h_line(rect.min_x, rect.max_y, rect.width(), color)?;
        self.draw_v_line(rect.min_x, rect.min_y, rect.height(), color)?;
        self.draw_v_line(rect.max_x, rect.min_y, rect.height(), color)?;
        Ok(())
    }

    /// Full circle via the midpoint algorithm, all four quadrants
    /// (`Bitmap_DrawCircle` calling `Bitmap_DrawCircleQuadrants` with every
    /// flag set).
    pub fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: u8) -> WmResult<()> {
        self.draw_circle_quadrants(cx, cy, radius, color, [true, true, true, true])
    }

    /// Midpoint circle, selectively restricted to quadrants
    /// `[top_right, top_left, bottom_left, bottom_right]`
    /// (`Bitmap_DrawCircleQuadrants`). Used directly by `draw_round_box` to
    /// paint only the outward-facing arc at each corner.
    fn draw_circle_quadrants(&mut self, cx: i32, cy: i32, radius: i32, color: u8, quad: [bool; 4]) -> WmResult<()> {
        let mut f = 1 - radius;
        let mut ddf_x = 0;
        let mut ddf_y = -2 * radius;
        let mut x = 0;
        let mut y = radius;

        let [tr, tl, bl, br] = quad;

        if tr {
            let _ = self.set_pixel(cx, cy - radius, color);
        }
        if bl {
            let _ = self.set_pixel(cx, cy + radius, color);
        }
        if tl {
            let _ = self.set_pixel(cx - radius, cy, color);
        }
        if br {
            let _ = self.set_pixel(cx + radius, cy, color);
        }

        while x < y {
            if f >= 0 {
                y -= 1;
                ddf_y += 2;
                f += ddf_y;
            }
            x += 1;
            ddf_x += 2;
            f += ddf_x + 1;

            if tr {
                let _ = self.set_pixel(cx + x, cy - y, color);
                let _ = self.set_pixel(cx + y, cy - x, color);
            }
            if tl {
                let _ = self.set_pixel(cx - x, cy - y, color);
                let _ = self.set_pixel(cx - y, cy - x, color);
            }
            if bl {
                let _ = self.set_pixel(cx - x, cy + y, color);
                let _ = self.set_pixel(cx - y, cy + x, color);
            }
            if br {
                let _ = self.set_pixel(cx + x, cy + y, color);
                let _ = self.set_pixel(cx + y, cy + x, color);
            }
        }
        Ok(())
    }

    /// Rounded-corner box: four corner arcs plus four straight edge segments,
    /// optionally filled (`Bitmap_DrawRoundBox`). `radius` must fall in
    /// `[ROUND_BOX_MIN_RADIUS, ROUND_BOX_MAX_RADIUS]`.
    pub fn draw_round_box(&mut self, rect: Rect, radius: i32, color: u8, filled: bool) -> WmResult<()> {
        if radius < ROUND_BOX_MIN_RADIUS || radius > ROUND_BOX_MAX_RADIUS {
            return Err(WmError::InvalidArgument);
        }
        if rect.width() < radius * 2 || rect.height() < radius * 2 {
            return Err(WmError::InvalidArgument);
        }

        let left = rect.min_x;
        let top = rect.min_y;
        let right = rect.max_x;
        let bottom = rect.max_y;

        // Corner centers, inset by `radius` from each edge.
        self.draw_circle_quadrants(left + radius, top + radius, radius, color, [false, true, false, false])?;
        self.draw_circle_quadrants(right - radius, top + radius, radius, color, [true, false, false, false])?;
        self.draw_circle_quadrants(left + radius, bottom - radius, radius, color, [false, false, true, false])?;
        self.draw_circle_quadrants(right - radius, bottom - radius, radius, color, [false, false, false, true])?;

        // Straight edges, shortened by the corner radii.
        self.draw_h_line(left + radius, top, rect.width() - 2 * radius, color)?;
        self.draw_h_line(left + radius, bottom, rect.width() - 2 * radius, color)?;
        self.draw_v_line(left, top + radius, rect.height() - 2 * radius, color)?;
        self.draw_v_line(right, top + radius, rect.height() - 2 * radius, color)?;

        if filled {
            self.fill_box(Rect::new(left + radius, top, right - radius, bottom), color)?;
            self.fill_box(Rect::new(left, top + radius, left + radius - 1, bottom - radius), color)?;
            self.fill_box(Rect::new(right - radius + 1, top + radius, right, bottom - radius), color)?;
            // Seed a flood fill in each corner to pick up the area the three
            // boxes above don't cover (inside the arc, outside the inset
            // boxes), matching the original's four single-pixel fill seeds.
            let _ = self.flood_fill(left + radius / 2, top + radius / 2, color);
            let _ = self.flood_fill(right - radius / 2, top + radius / 2, color);
            let _ = self.flood_fill(left + radius / 2, bottom - radius / 2, color);
            let _ = self.flood_fill(right - radius / 2, bottom - radius / 2, color);
        }
        Ok(())
    }

    /// Flood fill from `(x, y)`, replacing the connected region of matching
    /// background color with `color`. Uses an explicit work queue rather than
    /// recursion, since a recursive port of the original risks blowing the
    /// stack on large fills.
    pub fn flood_fill(&mut self, x: i32, y: i32, color: u8) -> WmResult<()> {
        let target = match self.get_pixel_at_xy(x, y) {
            Some(c) => c,
            None => return Err(WmError::InvalidArgument),
        };
        if target == color {
            return Ok(());
        }

        let mut stack: Vec<(i32, i32)> = Vec::new();
        stack.push((x, y));

        while let Some((cx, cy)) = stack.pop() {
            if self.get_pixel_at_xy(cx, cy) != Some(target) {
                continue;
            }
            let _ = self.set_pixel(cx, cy, color);
            stack.push((cx + 1, cy));
            stack.push((cx - 1, cy));
            stack.push((cx, cy + 1));
            stack.push((cx, cy - 1));
        }
        Ok(())
    }

    /// Copy a rectangular region of `src` onto `self` at `(dst_x, dst_y)`,
    /// clamping the copy to both bitmaps' bounds (`Bitmap_Blit`).
    ///
    /// `src` is a raw pointer rather than `&Bitmap` so that source and
    /// destination may be the same `Bitmap`, copying one part of a bitmap
    /// onto another part of itself, as the original's `Bitmap_Blit` allows.
    /// A `&mut self, src: &Bitmap` signature would make that call
    /// impossible to express, since the borrow checker forbids borrowing the
    /// same bitmap both mutably and immutably at once; the row copy below
    /// instead reads `src`'s fields through the pointer and uses
    /// `ptr::copy`, which tolerates overlapping source and destination
    /// ranges.
    ///
    /// # Safety
    /// `src` must point to a live, valid `Bitmap` for the duration of the
    /// call (it may alias `self`).
    pub fn blit(
        &mut self,
        src: *const Bitmap,
        src_x: i32,
        src_y: i32,
        width: i32,
        height: i32,
        dst_x: i32,
        dst_y: i32,
    ) -> WmResult<()> {
        let (src_width, src_height, src_addr) = unsafe { ((*src).width, (*src).height, (*src).addr) };

        if src_x + width < 0 || src_y + height < 0 {
            return Err(WmError::NoIntersection);
        }
        if dst_x >= self.width || dst_y >= self.height {
            return Err(WmError::NoIntersection);
        }

        let mut src_x = src_x;
        let mut src_y = src_y;
        let mut dst_x = dst_x;
        let mut dst_y = dst_y;
        let mut w = width;
        let mut h = height;

        if src_x < 0 {
            dst_x -= src_x;
            w += src_x;
            src_x = 0;
        }
        if src_y < 0 {
            dst_y -= src_y;
            h += src_y;
            src_y = 0;
        }
        if dst_x < 0 {
            src_x -= dst_x;
            w += dst_x;
            dst_x = 0;
        }
        if dst_y < 0 {
            src_y -= dst_y;
            h += dst_y;
            dst_y = 0;
        }

        w = w.min(src_width - src_x).min(self.width - dst_x);
        h = h.min(src_height - src_y).min(self.height - dst_y);
        if w <= 0 || h <= 0 {
            return Err(WmError::NoIntersection);
        }

        for row in 0..h {
            let src_start = ((src_y + row) as usize) * (src_width as usize) + src_x as usize;
            let dst_start = ((dst_y + row) as usize) * (self.width as usize) + dst_x as usize;
            unsafe {
                ptr::copy(src_addr.add(src_start), self.addr.add(dst_start), w as usize);
            }
        }
        Ok(())
    }

    /// Tile `src` across `self` starting at `(0, 0)`, clamped to `self`'s
    /// bounds (`Bitmap_Tile`, the non-`V1` variant; see DESIGN.md for why
    /// `Bitmap_TileV1` is not carried forward). Fills one tile-height band
    /// across the full destination width, then copies that band downward
    /// tile-by-tile rather than re-reading `src` for every tile.
    pub fn tile(&mut self, src: &Bitmap) -> WmResult<()> {
        let tile_w = src.width;
        let tile_h = src.height;
        if tile_w <= 0 || tile_h <= 0 {
            return Err(WmError::InvalidArgument);
        }

        let dst_w = self.width;
        let dst_h = self.height;

        let h_tiles = dst_w / tile_w;
        let h_rem = dst_w % tile_w;

        for row in 0..tile_h.min(dst_h) {
            for t in 0..h_tiles {
                self.blit(src as *const Bitmap, 0, row, tile_w, 1, t * tile_w, row)?;
            }
            if h_rem > 0 {
                self.blit(src as *const Bitmap, 0, row, h_rem, 1, h_tiles * tile_w, row)?;
            }
        }

        let band_h = tile_h.min(dst_h);
        let v_tiles = dst_h / band_h;
        let v_rem = dst_h % band_h;

        for t in 1..v_tiles {
            self.copy_band_down(0, band_h, t * band_h, dst_w, band_h)?;
        }
        if v_rem > 0 {
            self.copy_band_down(0, band_h, v_tiles * band_h, dst_w, v_rem)?;
        }
        Ok(())
    }

    /// Copy an already-rendered horizontal band of `self` to another vertical
    /// offset within `self` (self-to-self blit, used by `tile` to propagate
    /// the first tile-height band downward without re-touching `src`).
    fn copy_band_down(&mut self, src_y: i32, _src_h: i32, dst_y: i32, width: i32, height: i32) -> WmResult<()> {
        for row in 0..height {
            let src_start = ((src_y + row) as usize) * (self.width as usize);
            let dst_start = ((dst_y + row) as usize) * (self.width as usize);
            if src_start == dst_start {
                continue;
            }
            unsafe {
                let ptr = self.addr;
                ptr::copy(ptr.add(src_start), ptr.add(dst_start), width as usize);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    extern crate alloc as alloc_crate;
    use alloc_crate::boxed::Box;
    use alloc_crate::vec;

    fn test_allocator(size: usize) -> (Allocator, Box<[u8]>) {
        let mut mem = vec![0u8; size].into_boxed_slice();
        let mut a = Allocator::new();
        unsafe { a.init_normal_pool(mem.as_mut_ptr(), mem.len()) };
        (a, mem)
    }

    #[test]
    fn create_rejects_out_of_range_dims() {
        let (mut a, _m) = test_allocator(65536);
        assert!(Bitmap::create(&mut a, 1, 10, false).is_err());
        assert!(Bitmap::create(&mut a, 10, 3000, false).is_err());
    }

    #[test]
    fn fill_box_clips_to_bounds() {
        let (mut a, _m) = test_allocator(65536);
        let mut bmp = Bitmap::create(&mut a, 20, 20, false).unwrap();
        bmp.fill_box(Rect::from_origin_size(-5, -5, 10, 10), 7).unwrap();
        assert_eq!(bmp.get_pixel_at_xy(0, 0), Some(7));
        assert_eq!(bmp.get_pixel_at_xy(5, 5), Some(0));
    }

    #[test]
    fn set_and_get_pixel_round_trip() {
        let (mut a, _m) = test_allocator(65536);
        let mut bmp = Bitmap::create(&mut a, 10, 10, false).unwrap();
        bmp.set_pixel(9, 9, 42).unwrap();
        assert_eq!(bmp.get_pixel_at_xy(9, 9), Some(42));
        // out of bounds must reject, not wrap (fixes the always-false range check bug)
        assert!(bmp.get_pixel_at_xy(10, 0).is_none());
        assert!(bmp.get_pixel_at_xy(0, 10).is_none());
        assert!(bmp.get_pixel_at_xy(-1, 0).is_none());
    }

    #[test]
    fn draw_line_reaches_endpoint() {
        let (mut a, _m) = test_allocator(65536);
        let mut bmp = Bitmap::create(&mut a, 20, 20, false).unwrap();
        bmp.draw_line(0, 0, 10, 5, 3).unwrap();
        assert_eq!(bmp.get_pixel_at_xy(0, 0), Some(3));
        assert_eq!(bmp.get_pixel_at_xy(10, 5), Some(3));
    }

    #[test]
    fn draw_round_box_rejects_radius_out_of_range() {
        let (mut a, _m) = test_allocator(65536);
        let mut bmp = Bitmap::create(&mut a, 40, 40, false).unwrap();
        let rect = Rect::from_origin_size(0, 0, 30, 30);
        assert!(bmp.draw_round_box(rect, 2, 1, true).is_err());
        assert!(bmp.draw_round_box(rect, 21, 1, true).is_err());
        assert!(bmp.draw_round_box(rect, 10, 1, true).is_ok());
    }

    #[test]
    fn draw_round_box_fills_interior() {
        let (mut a, _m) = test_allocator(65536);
        let mut bmp = Bitmap::create(&mut a, 40, 40, false).unwrap();
        let rect = Rect::from_origin_size(2, 2, 30, 30);
        bmp.draw_round_box(rect, 8, 5, true).unwrap();
        // center of the box must be filled
        assert_eq!(bmp.get_pixel_at_xy(17, 17), Some(5));
    }

    #[test]
    fn flood_fill_stops_at_boundary() {
        let (mut a, _m) = test_allocator(65536);
        let mut bmp = Bitmap::create(&mut a, 10, 10, false).unwrap();
        bmp.draw_box(Rect::from_origin_size(2, 2, 5, 5), 9, false).unwrap();
        bmp.flood_fill(4, 4, 3).unwrap();
        assert_eq!(bmp.get_pixel_at_xy(4, 4), Some(3));
        // outside the box must be untouched
        assert_eq!(bmp.get_pixel_at_xy(0, 0), Some(0));
        // the boundary itself is a different color and must remain
        assert_eq!(bmp.get_pixel_at_xy(2, 2), Some(9));
    }

    #[test]
    fn blit_truncates_to_fit_destination() {
        let (mut a, _m) = test_allocator(65536);
        let mut src = Bitmap::create(&mut a, 10, 10, false).unwrap();
        src.fill_box(src.overall_rect(), 8).unwrap();
        let mut dst = Bitmap::create(&mut a, 5, 5, false).unwrap();
        // requesting a 10x10 blit into a 5x5 destination must clip, not error
        dst.blit(&src as *const Bitmap, 0, 0, 10, 10, 0, 0).unwrap();
        assert_eq!(dst.get_pixel_at_xy(4, 4), Some(8));
    }

    #[test]
    fn blit_with_no_intersection_errors() {
        let (mut a, _m) = test_allocator(65536);
        let src = Bitmap::create(&mut a, 10, 10, false).unwrap();
        let mut dst = Bitmap::create(&mut a, 10, 10, false).unwrap();
        assert!(dst.blit(&src as *const Bitmap, 0, 0, 5, 5, 20, 20).is_err());
    }

    #[test]
    fn blit_supports_self_aliasing() {
        let (mut a, _m) = test_allocator(65536);
        let mut bmp = Bitmap::create(&mut a, 10, 10, false).unwrap();
        bmp.fill_box(Rect::from_origin_size(0, 0, 3, 3), 7).unwrap();
        // copy the 3x3 patch to the opposite corner of the same bitmap
        let self_ptr = &bmp as *const Bitmap;
        bmp.blit(self_ptr, 0, 0, 3, 3, 7, 7).unwrap();
        assert_eq!(bmp.get_pixel_at_xy(7, 7), Some(7));
        assert_eq!(bmp.get_pixel_at_xy(9, 9), Some(7));
        // source region itself must be untouched
        assert_eq!(bmp.get_pixel_at_xy(0, 0), Some(7));
    }

    #[test]
    fn blit_self_aliasing_handles_overlap() {
        let (mut a, _m) = test_allocator(65536);
        let mut bmp = Bitmap::create(&mut a, 10, 10, false).unwrap();
        bmp.fill_box(Rect::from_origin_size(0, 0, 5, 1), 1).unwrap();
        bmp.set_pixel(4, 0, 9).unwrap();
        // shift the row right by one pixel, overlapping source and dest
        let self_ptr = &bmp as *const Bitmap;
        bmp.blit(self_ptr, 0, 0, 5, 1, 1, 0).unwrap();
        assert_eq!(bmp.get_pixel_at_xy(5, 0), Some(9));
        assert_eq!(bmp.get_pixel_at_xy(1, 0), Some(1));
    }

    #[test]
    fn tile_covers_full_destination() {
        let (mut a, _m) = test_allocator(65536);
        let mut src = Bitmap::create(&mut a, 4, 4, false).unwrap();
        src.fill_box(src.overall_rect(), 6).unwrap();
        let mut dst = Bitmap::create(&mut a, 10, 10, false).unwrap();
        dst.tile(&src).unwrap();
        for x in [0, 9] {
            for y in [0, 9] {
                assert_eq!(dst.get_pixel_at_xy(x, y), Some(6));
            }
        }
    }
}

//! Mac-style bitmapped font: header parse, glyph blit, measure, wrapped draw.
//!
//! Grounded on `original_source/font.c`/`font.h` (the classic Mac "FONT"
//! resource adapted for indexed-color bitmaps): `Font_New`, `Font_DrawChar`,
//! `Font_MeasureStringWidth`, `Font_DrawString`, `Font_DrawStringInBox`.
//!
//! One deliberate deviation from the literal C source (see DESIGN.md "Font
//! table indexing"): `font.c` indexes `width_table_[the_char]` with the raw
//! character code, which is inconsistent with its own `lastChar-firstChar+3`
//! table-sizing formula whenever `firstChar != 0`. This implementation
//! indexes tables by `char_code - first_char`, which is what the sizing
//! formula actually requires.

extern crate alloc;
use alloc::vec::Vec;

use crate::bitmap::Bitmap;
use crate::config::WORD_WRAP_MAX_LEN;
use crate::error::{WmError, WmResult};

/// Sentinel for "no cap on character count" in measure/draw calls.
pub const NO_STRLEN_CAP: i32 = -1;

/// High byte of the width/offset table entry: total advance width, low byte:
/// left-side bearing (`h_offset`). `-1` (0xFFFF) marks "glyph absent".
const MISSING_GLYPH_MARK: u16 = 0xFFFF;

pub struct Font {
    pub font_type: i16,
    pub first_char: i16,
    pub last_char: i16,
    pub wid_max: i16,
    pub kern_max: i16,
    pub n_descent: i16,
    pub f_rect_width: i16,
    pub f_rect_height: i16,
    pub ow_t_loc: u16,
    pub ascent: i16,
    pub descent: i16,
    pub leading: i16,
    pub row_words: i16,
    image_table: Vec<u16>,
    loc_table: Vec<u16>,
    width_table: Vec<u16>,
    height_table: Option<Vec<u16>>,
}

/// Read a big-endian i16 (Mac resource format is big-endian).
fn read_i16(buf: &[u8], off: usize) -> i16 {
    i16::from_be_bytes([buf[off], buf[off + 1]])
}

fn read_u16(buf: &[u8], off: usize) -> u16 {
    u16::from_be_bytes([buf[off], buf[off + 1]])
}

fn read_u16_table(buf: &[u8], off: usize, count: usize) -> Vec<u16> {
    let mut v = Vec::with_capacity(count);
    for i in 0..count {
        v.push(read_u16(buf, off + i * 2));
    }
    v
}

const FONT_RECORD_SIZE: usize = 26;

impl Font {
    /// Parse a 26-byte Mac "FONT" resource header followed by the image,
    /// location, width/offset, and optional height/offset tables.
    pub fn new_from_blob(data: &[u8]) -> WmResult<Font> {
        if data.len() < FONT_RECORD_SIZE {
            return Err(WmError::InvalidArgument);
        }

        let font_type = read_i16(data, 0);
        let first_char = read_i16(data, 2);
        let last_char = read_i16(data, 4);
        let wid_max = read_i16(data, 6);
        let kern_max = read_i16(data, 8);
        let n_descent = read_i16(data, 10);
        let f_rect_width = read_i16(data, 12);
        let f_rect_height = read_i16(data, 14);
        let ow_t_loc = read_u16(data, 16);
        let ascent = read_i16(data, 18);
        let descent = read_i16(data, 20);
        let leading = read_i16(data, 22);
        let row_words = read_i16(data, 24);

        if last_char < first_char || row_words < 0 || f_rect_height < 0 {
            return Err(WmError::InvalidArgument);
        }

        let image_count = (row_words as usize) * (f_rect_height as usize);
        let table_count = (last_char - first_char + 3) as usize;

        let mut cursor = FONT_RECORD_SIZE;
        let need = |n: usize| n * 2;

        if data.len() < cursor + need(image_count) {
            return Err(WmError::InvalidArgument);
        }
        let image_table = read_u16_table(data, cursor, image_count);
        cursor += need(image_count);

        if data.len() < cursor + need(table_count) {
            return Err(WmError::InvalidArgument);
        }
        let loc_table = read_u16_table(data, cursor, table_count);
        cursor += need(table_count);

        if data.len() < cursor + need(table_count) {
            return Err(WmError::InvalidArgument);
        }
        let width_table = read_u16_table(data, cursor, table_count);
        cursor += need(table_count);

        let height_table = if font_type & 0x01 != 0 {
            if data.len() < cursor + need(table_count) {
                return Err(WmError::InvalidArgument);
            }
            Some(read_u16_table(data, cursor, table_count))
        } else {
            None
        };

        Ok(Font {
            font_type,
            first_char,
            last_char,
            wid_max,
            kern_max,
            n_descent,
            f_rect_width,
            f_rect_height,
            ow_t_loc,
            ascent,
            descent,
            leading,
            row_words,
            image_table,
            loc_table,
            width_table,
            height_table,
        })
    }

    /// Index of the synthetic "missing glyph" slot.
    fn missing_glyph_index(&self) -> usize {
        (self.last_char - self.first_char + 1) as usize
    }

    /// Resolve a requested char code to a table index, redirecting absent
    /// glyphs to the missing-glyph slot.
    fn resolve_index(&self, c: u8) -> usize {
        let raw = c as i16 - self.first_char;
        if raw < 0 || raw as usize >= self.width_table.len() || self.width_table[raw as usize] == MISSING_GLYPH_MARK {
            self.missing_glyph_index()
        } else {
            raw as usize
        }
    }

    /// `(h_offset, advance)` for the resolved glyph index.
    fn offset_and_advance(&self, idx: usize) -> (i32, i32) {
        let v = self.width_table[idx];
        let h_offset = (v & 0xFF) as i8 as i32;
        let advance = ((v >> 8) & 0xFF) as i32;
        (h_offset, advance)
    }

    fn pixel_only_width(&self, idx: usize) -> i32 {
        self.loc_table[idx + 1] as i32 - self.loc_table[idx] as i32
    }

    /// Row range `[first_row, max_row)` this glyph actually paints, using the
    /// optional height/offset table to skip blank rows when present.
    fn row_range(&self, idx: usize) -> (i32, i32) {
        match &self.height_table {
            Some(table) => {
                let mut v = table[idx];
                if v == 0 {
                    v = table[self.missing_glyph_index()];
                }
                let first_row = (v >> 8) as i32;
                let row_count = (v & 0xFF) as i32;
                (first_row, first_row + row_count)
            }
            None => (0, self.f_rect_height as i32),
        }
    }

    /// Draw one character at the bitmap's current pen position using the
    /// bitmap's current color. Returns the number of horizontal pixels the
    /// pen advanced: by `advance`, not by the glyph's pixel-only width.
    pub fn draw_char(&self, bitmap: &mut Bitmap, c: u8) -> WmResult<i32> {
        let idx = self.resolve_index(c);
        let (h_offset, advance) = self.offset_and_advance(idx);
        let pixel_only_width = self.pixel_only_width(idx);
        let (first_row, max_row) = self.row_range(idx);

        let loc_offset = self.loc_table[idx] as i32;
        let mut image_word = (loc_offset / 16) as usize;
        let image_bit_rem = (loc_offset % 16) as i32;

        let color = bitmap.color();
        let pen_x = bitmap.pen_x();
        let pen_y = bitmap.pen_y();

        for row in 0..self.f_rect_height as i32 {
            if row >= first_row && row < max_row {
                let write_y = pen_y + row;
                let mut write_x = pen_x + h_offset;
                let mut pixels_written = 0;
                let mut pixels_moved = 0;
                let mut word_idx = image_word;

                while pixels_written < pixel_only_width {
                    let word = *self.image_table.get(word_idx).unwrap_or(&0);
                    let mut bit = 15;
                    while bit >= 0 && pixels_written < pixel_only_width {
                        if pixels_moved >= image_bit_rem {
                            let set = (word >> bit) & 1 != 0;
                            if set {
                                let _ = bitmap.set_pixel(write_x, write_y, color);
                            }
                            write_x += 1;
                            pixels_written += 1;
                        }
                        pixels_moved += 1;
                        bit -= 1;
                    }
                    word_idx += 1;
                }
            }
            image_word += self.row_words as usize;
        }

        bitmap.advance_pen_x(advance);
        Ok(advance)
    }

    /// Sum of per-glyph advances for up to `max_chars` characters of `s` that
    /// fit within `available_width` pixels. `max_chars < 0` means unlimited,
    /// capped at `WORD_WRAP_MAX_LEN` as a safety bound.
    pub fn measure_string(&self, s: &[u8], max_chars: i32, available_width: i32) -> (i32, i32) {
        let cap = if max_chars < 0 {
            WORD_WRAP_MAX_LEN
        } else {
            (max_chars as usize).min(WORD_WRAP_MAX_LEN)
        };
        let mut used = 0i32;
        let mut count = 0i32;
        for &c in s.iter().take(cap) {
            let idx = self.resolve_index(c);
            let (_h, advance) = self.offset_and_advance(idx);
            if used + advance > available_width {
                break;
            }
            used += advance;
            count += 1;
        }
        (count, used)
    }

    /// Draw as much of `s` as fits on the bitmap's current line, honoring
    /// `max_chars` and the bitmap's remaining width (`width - pen_x`).
    pub fn draw_string(&self, bitmap: &mut Bitmap, s: &[u8], max_chars: i32) -> WmResult<i32> {
        let available_width = bitmap.width() - bitmap.pen_x();
        let (fit_count, _used) = self.measure_string(s, max_chars, available_width);
        for &c in s.iter().take(fit_count as usize) {
            self.draw_char(bitmap, c)?;
        }
        Ok(fit_count)
    }

    /// Draw wrapped text into a `width x height` box at the bitmap's pen
    /// position, advancing a full line (`f_rect_height + leading`) per row.
    /// `wrap` performs the line-break formatting (see `wrap_and_trim` in the
    /// glossary); `continue_page` is called when more text remains after the
    /// box fills. If it returns `true`, the box is cleared and the next page
    /// is drawn. Returns the byte offset into `s` of the first undrawn
    /// character (or `s.len()` if everything was drawn).
    pub fn draw_string_in_box(
        &self,
        bitmap: &mut Bitmap,
        width: i32,
        height: i32,
        s: &[u8],
        mut wrap: impl FnMut(&Font, &[u8], i32) -> Vec<Vec<u8>>,
        mut continue_page: Option<impl FnMut() -> bool>,
    ) -> WmResult<usize> {
        let mut remaining = s;
        let mut consumed = 0usize;
        let start_x = bitmap.pen_x();
        let start_y = bitmap.pen_y();

        loop {
            let lines = wrap(self, remaining, width);
            let line_height = self.f_rect_height as i32 + self.leading as i32;
            let max_lines = if line_height > 0 { (height / line_height).max(0) } else { 0 };

            let mut pen_y = start_y;
            let mut lines_drawn = 0usize;
            let mut page_consumed = 0usize;

            for line in lines.iter() {
                if lines_drawn as i32 >= max_lines {
                    break;
                }
                bitmap.set_pen_xy(start_x, pen_y)?;
                self.draw_string(bitmap, line, NO_STRLEN_CAP)?;
                pen_y += line_height;
                lines_drawn += 1;
                page_consumed += line.len();
            }

            consumed += page_consumed;

            if page_consumed >= remaining.len() {
                return Ok(consumed);
            }

            remaining = &remaining[page_consumed..];

            let keep_going = match continue_page.as_mut() {
                Some(f) => f(),
                None => false,
            };

            if !keep_going {
                return Ok(consumed);
            }

            bitmap.set_pen_xy(start_x, start_y)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::{Allocator, Pool};
    extern crate alloc as alloc_crate;
    use alloc_crate::vec;

    /// Build a tiny synthetic font: firstChar=65 ('A'), lastChar=66 ('B').
    /// Each glyph is 1 row tall, 1 pixel wide, fully set.
    fn tiny_font_blob() -> Vec<u8> {
        let first_char: i16 = 65;
        let last_char: i16 = 66;
        let f_rect_width: i16 = 1;
        let f_rect_height: i16 = 1;
        let row_words: i16 = 1; // 16 bits per row is plenty for 3 glyphs worth of 1px each

        let mut buf = Vec::new();
        buf.extend_from_slice(&0i16.to_be_bytes()); // fontType (no height table)
        buf.extend_from_slice(&first_char.to_be_bytes());
        buf.extend_from_slice(&last_char.to_be_bytes());
        buf.extend_from_slice(&1i16.to_be_bytes()); // widMax
        buf.extend_from_slice(&0i16.to_be_bytes()); // kernMax
        buf.extend_from_slice(&0i16.to_be_bytes()); // nDescent
        buf.extend_from_slice(&f_rect_width.to_be_bytes());
        buf.extend_from_slice(&f_rect_height.to_be_bytes());
        buf.extend_from_slice(&0u16.to_be_bytes()); // owTLoc
        buf.extend_from_slice(&1i16.to_be_bytes()); // ascent
        buf.extend_from_slice(&0i16.to_be_bytes()); // descent
        buf.extend_from_slice(&0i16.to_be_bytes()); // leading
        buf.extend_from_slice(&row_words.to_be_bytes());

        // image table: 1 word, bit 15 set -> draws leftmost pixel of each glyph
        buf.extend_from_slice(&0x8000u16.to_be_bytes());

        // loc table: firstChar..=lastChar+2 => 4 entries (lastChar-firstChar+3=4)
        // glyph 'A' at bit 0, glyph 'B' at bit 1, missing-glyph at bit 2, terminator at bit 3
        for bit in [0u16, 1, 2, 3] {
            buf.extend_from_slice(&bit.to_be_bytes());
        }

        // width table: h_offset=0 (low byte), advance=2 (high byte) for A and B; missing glyph advance=1
        let entry = |advance: u8, h_off: u8| -> u16 { ((advance as u16) << 8) | h_off as u16 };
        buf.extend_from_slice(&entry(2, 0).to_be_bytes()); // 'A'
        buf.extend_from_slice(&entry(3, 0).to_be_bytes()); // 'B'
        buf.extend_from_slice(&entry(1, 0).to_be_bytes()); // missing glyph
        buf.extend_from_slice(&entry(0, 0).to_be_bytes()); // terminator slot (unused)

        buf
    }

    fn test_allocator() -> (Allocator, alloc_crate::boxed::Box<[u8]>) {
        let mut mem = vec![0u8; 16384].into_boxed_slice();
        let mut a = Allocator::new();
        unsafe { a.init_normal_pool(mem.as_mut_ptr(), mem.len()) };
        (a, mem)
    }

    #[test]
    fn parses_header_fields() {
        let blob = tiny_font_blob();
        let font = Font::new_from_blob(&blob).unwrap();
        assert_eq!(font.first_char, 65);
        assert_eq!(font.last_char, 66);
        assert_eq!(font.f_rect_height, 1);
        assert_eq!(font.row_words, 1);
    }

    #[test]
    fn measure_matches_sum_of_advances() {
        let blob = tiny_font_blob();
        let font = Font::new_from_blob(&blob).unwrap();
        let (count, width) = font.measure_string(b"AB", NO_STRLEN_CAP, 1000);
        assert_eq!(count, 2);
        assert_eq!(width, 2 + 3); // advance('A') + advance('B')
    }

    #[test]
    fn measure_stops_when_next_glyph_would_overflow() {
        let blob = tiny_font_blob();
        let font = Font::new_from_blob(&blob).unwrap();
        let (count, width) = font.measure_string(b"AB", NO_STRLEN_CAP, 2);
        assert_eq!(count, 1);
        assert_eq!(width, 2);
    }

    #[test]
    fn draw_string_advances_pen_by_total_width() {
        let (mut alloc, _mem) = test_allocator();
        let blob = tiny_font_blob();
        let font = Font::new_from_blob(&blob).unwrap();
        let mut bmp = Bitmap::create(&mut alloc, 64, 32, false).unwrap();
        bmp.set_pen_xy(10, 20).unwrap();
        let fit = font.draw_string(&mut bmp, b"AB", NO_STRLEN_CAP).unwrap();
        assert_eq!(fit, 2);
        assert_eq!(bmp.pen_x(), 10 + 2 + 3);
    }

    #[test]
    fn missing_glyph_falls_back() {
        let blob = tiny_font_blob();
        let font = Font::new_from_blob(&blob).unwrap();
        // 'Z' (90) is outside [65,66], must redirect to missing-glyph (advance=1)
        let idx = font.resolve_index(b'Z');
        assert_eq!(idx, font.missing_glyph_index());
        let (_h, advance) = font.offset_and_advance(idx);
        assert_eq!(advance, 1);
    }

    #[test]
    fn rejects_truncated_blob() {
        let blob = tiny_font_blob();
        let truncated = &blob[..blob.len() - 4];
        assert!(Font::new_from_blob(truncated).is_err());
    }
}

//! Visual theme: colors, metrics, control templates, desktop pattern.
//!
//! Grounded on `original_source/theme.c`/`theme.h` (field layout, the four
//! standard control templates) and styled after `compositor/src/desktop/theme.rs`'s
//! named-color-constant approach, adapted to indexed palette colors (`u8`)
//! instead of packed ARGB.

extern crate alloc;

use crate::allocator::Allocator;
use crate::bitmap::Bitmap;
use crate::control::{Alignment, ControlType, HAlign, VAlign};
use crate::error::WmResult;
use crate::font::Font;

/// One of the four controls every window gets for free.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StandardControl {
    Close,
    Minimize,
    NormSize,
    Maximize,
}

/// Pure descriptor for instantiating a `Control`.
/// Themes own templates; controls are stamped out from them and never own
/// their art bitmaps.
pub struct ControlTemplate {
    pub control_type: ControlType,
    pub alignment: Alignment,
    pub width: i32,
    pub height: i32,
    pub min: i32,
    pub max: i32,
    /// Index into `Theme::control_art` for each of
    /// `[active][pressed]`; controls borrow, never own, this art.
    pub art: [[u8; 2]; 2],
    pub avail_text_width: i32,
}

pub struct Theme {
    pub icon_font: *const Font,
    pub control_font: *const Font,
    /// Indexed color LUT, 256 entries of palette index -> itself (identity
    /// for the base palette; themes may remap for alternate skins).
    pub color_lut: [u8; 256],
    pub outline_thickness: i32,
    pub outline_color: u8,
    pub titlebar_height: i32,
    pub titlebar_color: u8,
    pub titlebar_text_color: u8,
    pub iconbar_height: i32,
    pub iconbar_color: u8,
    pub content_color: u8,
    pub desktop_color: u8,
    pub desktop_pattern: alloc::vec::Vec<u8>,
    pub vicky_background_color: u32,
    pub vicky_border_color: u32,
    pub standard_fore_color: u8,
    pub standard_back_color: u8,
    pub highlight_fore_color: u8,
    pub highlight_back_color: u8,
    pub inactive_fore_color: u8,
    pub inactive_back_color: u8,
    /// Shared control art, indexed by the `u8` ids stored in each
    /// `ControlTemplate::art` entry. Controls borrow from here; they never
    /// own or free these bitmaps.
    pub control_art: alloc::vec::Vec<Bitmap>,
    close_template: ControlTemplate,
    minimize_template: ControlTemplate,
    normsize_template: ControlTemplate,
    maximize_template: ControlTemplate,
}

impl Theme {
    /// Build the default theme: one constructor, not one per machine. The
    /// only per-machine variance lives in `Platform`/`Screen`.
    pub fn default_theme(
        alloc: &mut Allocator,
        icon_font: *const Font,
        control_font: *const Font,
    ) -> WmResult<Theme> {
        let corner_button = |art_up: u8, art_down: u8| ControlTemplate {
            control_type: ControlType::Close,
            alignment: Alignment {
                h: HAlign::Left,
                v: VAlign::Top,
                x_offset: 4,
                y_offset: 4,
            },
            width: 14,
            height: 14,
            min: 0,
            max: 0,
            art: [[art_up, art_down], [art_up, art_down]],
            avail_text_width: 0,
        };

        let close_template = ControlTemplate {
            control_type: ControlType::Close,
            ..corner_button(0, 1)
        };
        let minimize_template = ControlTemplate {
            control_type: ControlType::Minimize,
            alignment: Alignment { h: HAlign::Right, v: VAlign::Top, x_offset: 36, y_offset: 4 },
            ..corner_button(2, 3)
        };
        let normsize_template = ControlTemplate {
            control_type: ControlType::NormSize,
            alignment: Alignment { h: HAlign::Right, v: VAlign::Top, x_offset: 20, y_offset: 4 },
            ..corner_button(4, 5)
        };
        let maximize_template = ControlTemplate {
            control_type: ControlType::Maximize,
            alignment: Alignment { h: HAlign::Right, v: VAlign::Top, x_offset: 4, y_offset: 4 },
            ..corner_button(6, 7)
        };

        let mut color_lut = [0u8; 256];
        for (i, slot) in color_lut.iter_mut().enumerate() {
            *slot = i as u8;
        }

        // Eight 14x14 art bitmaps: one up/down pair per standard control,
        // each flood-filled with a distinct color so the four buttons stay
        // visually distinguishable without a real icon set.
        let mut control_art = alloc::vec::Vec::with_capacity(8);
        for idx in 0..8u8 {
            let mut bmp = Bitmap::create(alloc, 14, 14, false)?;
            bmp.fill_box(bmp.overall_rect(), idx)?;
            control_art.push(bmp);
        }

        Ok(Theme {
            icon_font,
            control_font,
            color_lut,
            outline_thickness: 1,
            outline_color: 1,
            titlebar_height: 18,
            titlebar_color: 4,
            titlebar_text_color: 15,
            iconbar_height: 16,
            iconbar_color: 7,
            content_color: 15,
            desktop_color: 3,
            desktop_pattern: alloc::vec![3u8; 256],
            vicky_background_color: 0x00AAAAAA,
            vicky_border_color: 0x00000000,
            standard_fore_color: 0,
            standard_back_color: 7,
            highlight_fore_color: 15,
            highlight_back_color: 4,
            inactive_fore_color: 8,
            inactive_back_color: 7,
            control_art,
            close_template,
            minimize_template,
            normsize_template,
            maximize_template,
        })
    }

    pub fn art_bitmap(&self, idx: u8) -> &Bitmap {
        &self.control_art[idx as usize]
    }

    pub fn template_for(&self, which: StandardControl) -> &ControlTemplate {
        match which {
            StandardControl::Close => &self.close_template,
            StandardControl::Minimize => &self.minimize_template,
            StandardControl::NormSize => &self.normsize_template,
            StandardControl::Maximize => &self.maximize_template,
        }
    }

    /// Foreground/background pair for a control in the given `(active,
    /// pressed)` state: standard fore/back, inverted when pressed and
    /// active, or the dedicated inactive pair otherwise.
    pub fn control_colors(&self, active: bool, pressed: bool) -> (u8, u8) {
        if !active {
            return (self.inactive_fore_color, self.inactive_back_color);
        }
        if pressed {
            (self.standard_back_color, self.standard_fore_color)
        } else {
            (self.standard_fore_color, self.standard_back_color)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    extern crate alloc as alloc_crate;
    use alloc_crate::boxed::Box;

    fn test_allocator() -> (Allocator, Box<[u8]>) {
        let mut mem = alloc_crate::vec![0u8; 65536].into_boxed_slice();
        let mut a = Allocator::new();
        unsafe { a.init_normal_pool(mem.as_mut_ptr(), mem.len()) };
        (a, mem)
    }

    #[test]
    fn default_theme_templates_are_distinct_types() {
        let (mut a, _m) = test_allocator();
        let t = Theme::default_theme(&mut a, core::ptr::null(), core::ptr::null()).unwrap();
        assert_eq!(t.template_for(StandardControl::Close).control_type, ControlType::Close);
        assert_eq!(t.template_for(StandardControl::Minimize).control_type, ControlType::Minimize);
        assert_eq!(t.template_for(StandardControl::NormSize).control_type, ControlType::NormSize);
        assert_eq!(t.template_for(StandardControl::Maximize).control_type, ControlType::Maximize);
    }

    #[test]
    fn pressed_active_inverts_standard_colors() {
        let (mut a, _m) = test_allocator();
        let t = Theme::default_theme(&mut a, core::ptr::null(), core::ptr::null()).unwrap();
        let (fore_normal, back_normal) = t.control_colors(true, false);
        let (fore_pressed, back_pressed) = t.control_colors(true, true);
        assert_eq!(fore_normal, back_pressed);
        assert_eq!(back_normal, fore_pressed);
    }

    #[test]
    fn inactive_ignores_pressed_state() {
        let (mut a, _m) = test_allocator();
        let t = Theme::default_theme(&mut a, core::ptr::null(), core::ptr::null()).unwrap();
        assert_eq!(t.control_colors(false, false), t.control_colors(false, true));
    }

    #[test]
    fn control_art_has_eight_distinct_bitmaps() {
        let (mut a, _m) = test_allocator();
        let t = Theme::default_theme(&mut a, core::ptr::null(), core::ptr::null()).unwrap();
        assert_eq!(t.control_art.len(), 8);
        for (idx, bmp) in t.control_art.iter().enumerate() {
            assert_eq!(bmp.get_pixel_at_xy(0, 0), Some(idx as u8));
        }
    }
}

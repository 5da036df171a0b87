//! Window-bound control instance: alignment, state, rendering.
//!
//! Grounded on `original_source/control.c`/`control_template.c` for the
//! alignment-to-parent-rect algorithm and the active/pressed color-selection
//! rule, and on `compositor/src/desktop/window.rs`'s `HitTest` enum for the
//! shape of a small state enum with an `is_*` helper bank (here:
//! `is_righter`/`is_lefter` instead of resize-edge classification).

use crate::bitmap::Bitmap;
use crate::error::WmResult;
use crate::geometry::Rect;
use crate::theme::{ControlTemplate, Theme};

extern crate alloc;
use alloc::string::String;

pub const CONTROL_ID_NOT_FOUND: u16 = crate::config::CONTROL_ID_NOT_FOUND;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlType {
    Close,
    Minimize,
    NormSize,
    Maximize,
    Button,
    Checkbox,
    Radio,
    Label,
    Scroller,
    TextField,
    Custom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

#[derive(Clone, Copy, Debug)]
pub struct Alignment {
    pub h: HAlign,
    pub v: VAlign,
    pub x_offset: i32,
    pub y_offset: i32,
}

/// Recompute a window-local rect from `alignment`, a control's own
/// `width`/`height`, and the parent sub-rect it's aligned against.
pub fn align_to_window(alignment: &Alignment, width: i32, height: i32, parent: Rect) -> Rect {
    let x = match alignment.h {
        HAlign::Left => parent.min_x + alignment.x_offset,
        HAlign::Right => parent.max_x - alignment.x_offset - width + 1,
        HAlign::Center => parent.min_x + (parent.width() - width) / 2,
    };
    let y = match alignment.v {
        VAlign::Top => parent.min_y + alignment.y_offset,
        VAlign::Bottom => parent.max_y - alignment.y_offset - height + 1,
        VAlign::Center => parent.min_y + (parent.height() - height) / 2,
    };
    Rect::from_origin_size(x, y, width, height)
}

pub struct Control {
    pub control_type: ControlType,
    pub id: u16,
    pub group_id: Option<u16>,
    alignment: Alignment,
    pub width: i32,
    pub height: i32,
    pub min: i32,
    pub max: i32,
    pub value: i32,
    /// `[active][pressed]` art, borrowed from the theme's shared control art.
    images: [[*const Bitmap; 2]; 2],
    pub caption: Option<String>,
    avail_text_width: i32,
    pub active: bool,
    pub pressed: bool,
    pub visible: bool,
    pub enabled: bool,
    pub rect: Rect,
}

impl Control {
    /// Stamp out a control from `template`, bound to `id` and `parent_rect`.
    pub fn from_template(template: &ControlTemplate, theme: &Theme, id: u16, parent_rect: Rect) -> Control {
        let rect = align_to_window(&template.alignment, template.width, template.height, parent_rect);
        let images = [
            [
                theme.art_bitmap(template.art[0][0]) as *const Bitmap,
                theme.art_bitmap(template.art[0][1]) as *const Bitmap,
            ],
            [
                theme.art_bitmap(template.art[1][0]) as *const Bitmap,
                theme.art_bitmap(template.art[1][1]) as *const Bitmap,
            ],
        ];
        Control {
            control_type: template.control_type,
            id,
            group_id: None,
            alignment: template.alignment,
            width: template.width,
            height: template.height,
            min: template.min,
            max: template.max,
            value: template.min,
            images,
            caption: None,
            avail_text_width: template.avail_text_width,
            active: true,
            pressed: false,
            visible: true,
            enabled: true,
            rect,
        }
    }

    pub fn with_caption(mut self, caption: &str) -> Control {
        self.caption = Some(String::from(caption));
        self
    }

    /// Recompute `rect` from the stored alignment against a (possibly
    /// changed) parent rect. Called on every window size change.
    pub fn realign(&mut self, parent_rect: Rect) {
        self.rect = align_to_window(&self.alignment, self.width, self.height, parent_rect);
    }

    fn image_for_state(&self) -> *const Bitmap {
        self.images[self.active as usize][self.pressed as usize]
    }

    /// Render this control into `window_bitmap` at `self.rect`. Not visible
    /// means no output.
    pub fn render(&self, window_bitmap: &mut Bitmap, font: &crate::font::Font, theme: &Theme) -> WmResult<()> {
        if !self.visible {
            return Ok(());
        }

        let art_ptr = self.image_for_state();
        let art = unsafe { &*art_ptr };
        window_bitmap.blit(art_ptr, 0, 0, art.width(), art.height(), self.rect.min_x, self.rect.min_y)?;

        if let Some(caption) = &self.caption {
            let (_count, measured) = font.measure_string(caption.as_bytes(), -1, self.avail_text_width);
            let x = self.rect.min_x + (self.width - self.avail_text_width) / 2 + (self.avail_text_width - measured) / 2;
            let y = self.rect.min_y + (self.height + font.descent as i32) / 2 - 1;
            let (fore, _back) = theme.control_colors(self.active, self.pressed);
            window_bitmap.set_pen_xy(x, y)?;
            window_bitmap.set_color(fore);
            font.draw_string(window_bitmap, caption.as_bytes(), -1)?;
        }
        Ok(())
    }

    /// Set `active`/`pressed` flags only. No redraw is triggered here: the
    /// window's next render pass picks up the change once it's invalidated.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }

    /// Track the rightmost edge seen so far; returns whether `self` extends
    /// it.
    pub fn is_righter(&self, running_max_x: &mut i32) -> bool {
        if self.rect.max_x > *running_max_x {
            *running_max_x = self.rect.max_x;
            true
        } else {
            false
        }
    }

    /// Track the leftmost edge seen so far; returns whether `self` extends
    /// it.
    pub fn is_lefter(&self, running_min_x: &mut i32) -> bool {
        if self.rect.min_x < *running_min_x {
            *running_min_x = self.rect.min_x;
            true
        } else {
            false
        }
    }
}

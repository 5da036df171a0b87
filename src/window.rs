//! A composed, resizable region with a titlebar, content area, and controls.
//!
//! Grounded on `original_source/window.c`/`window.h` (sub-rect derivation,
//! clip/damage rect bookkeeping, state-change operations) and on
//! `compositor/src/desktop/window.rs`'s `WindowInfo`/`HitTest` shape for the
//! field grouping and hit-test enum idiom.

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::bitmap::Bitmap;
use crate::config::{WIN_DEFAULT_DRAG_ZONE_SIZE, WIN_MAX_CLIP_RECTS, WIN_MAX_DAMAGE_RECTS, WIN_MAX_MENU_LEVELS};
use crate::control::{Control, CONTROL_ID_NOT_FOUND};
use crate::error::{WmError, WmResult};
use crate::event::EventRecord;
use crate::font::Font;
use crate::geometry::Rect;
use crate::menu::Menu;
use crate::theme::{StandardControl, Theme};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowType {
    Standard,
    Backdrop,
    Dialog,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowState {
    Hidden,
    Minimized,
    Normal,
    Maximized,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragZone {
    ResizeE,
    ResizeW,
    ResizeN,
    ResizeS,
    ResizeSe,
    Drag,
    None,
}

pub type EventHandler = fn(&mut Window, &EventRecord);

/// Everything the caller must supply up front to create a `Window`.
pub struct WindowTemplate {
    pub title: String,
    pub window_type: WindowType,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub min_width: i32,
    pub min_height: i32,
    pub max_width: i32,
    pub max_height: i32,
    pub can_resize: bool,
    pub on_screen_bitmap: Bitmap,
    pub offscreen_bitmap: Bitmap,
    pub event_handler: Option<EventHandler>,
}

pub struct Window {
    pub title: String,
    pub window_type: WindowType,
    pub state: WindowState,

    pub on_screen_bitmap: Bitmap,
    pub offscreen_bitmap: Bitmap,

    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    normal_x: i32,
    normal_y: i32,
    normal_width: i32,
    normal_height: i32,
    pub min_width: i32,
    pub min_height: i32,
    pub max_width: i32,
    pub max_height: i32,
    can_resize: bool,

    overall_rect: Rect,
    titlebar_rect: Rect,
    iconbar_rect: Rect,
    content_rect: Rect,
    drag_zone_n: Rect,
    drag_zone_s: Rect,
    drag_zone_e: Rect,
    drag_zone_w: Rect,
    drag_zone_se: Rect,

    pub controls: Vec<Control>,
    pub selected_control: Option<usize>,

    pub pattern_bitmap: Option<Bitmap>,
    pub event_handler: Option<EventHandler>,
    pub menus: Vec<Menu>,

    clip_rects: Vec<Rect>,
    damage_rects: Vec<Rect>,

    pub id: u16,
    pub display_order: u16,
    pub active: bool,
    pub visible: bool,
    pub invalidated: bool,
    pub titlebar_invalidated: bool,
    pub is_backdrop: bool,
    pub user_data: u32,
}

impl Window {
    /// Build a `Window` from a populated template, deriving sub-rects and
    /// instantiating the four standard controls from `theme`.
    pub fn create(template: WindowTemplate, theme: &Theme) -> Window {
        let (min_w, min_h, max_w, max_h) = if template.can_resize {
            (template.min_width, template.min_height, template.max_width, template.max_height)
        } else {
            (template.width, template.width, template.width, template.width)
        };

        let width = template.width.clamp(min_w.min(template.width), max_w.max(template.width));
        let height = template.height.clamp(min_h.min(template.height), max_h.max(template.height));

        let overall_rect = Rect::from_origin_size(0, 0, width, height);
        let titlebar_rect = Rect::new(
            overall_rect.min_x + 1,
            overall_rect.min_y + 1,
            overall_rect.max_x - 1,
            overall_rect.min_y + theme.titlebar_height,
        );
        let content_rect = Rect::new(
            overall_rect.min_x + 1,
            titlebar_rect.max_y + 1,
            overall_rect.max_x - 1,
            overall_rect.max_y - 1,
        );
        let iconbar_rect = Rect::new(
            content_rect.min_x,
            content_rect.min_y,
            content_rect.max_x,
            (content_rect.min_y + theme.iconbar_height).min(content_rect.max_y),
        );

        let dz = WIN_DEFAULT_DRAG_ZONE_SIZE;
        let drag_zone_n = Rect::new(overall_rect.min_x, overall_rect.min_y, overall_rect.max_x, overall_rect.min_y + dz - 1);
        let drag_zone_s = Rect::new(overall_rect.min_x, overall_rect.max_y - dz + 1, overall_rect.max_x, overall_rect.max_y);
        let drag_zone_w = Rect::new(overall_rect.min_x, overall_rect.min_y, overall_rect.min_x + dz - 1, overall_rect.max_y);
        let drag_zone_e = Rect::new(overall_rect.max_x - dz + 1, overall_rect.min_y, overall_rect.max_x, overall_rect.max_y);
        let drag_zone_se = Rect::new(overall_rect.max_x - dz + 1, overall_rect.max_y - dz + 1, overall_rect.max_x, overall_rect.max_y);

        let mut controls = Vec::new();
        let is_backdrop = template.window_type == WindowType::Backdrop;
        if !is_backdrop {
            for (which, id) in [
                (StandardControl::Close, 1u16),
                (StandardControl::Minimize, 2u16),
                (StandardControl::NormSize, 3u16),
                (StandardControl::Maximize, 4u16),
            ] {
                let t = theme.template_for(which);
                controls.push(Control::from_template(t, theme, id, titlebar_rect));
            }
        }

        Window {
            title: template.title,
            window_type: template.window_type,
            state: WindowState::Normal,
            on_screen_bitmap: template.on_screen_bitmap,
            offscreen_bitmap: template.offscreen_bitmap,
            x: template.x,
            y: template.y,
            width,
            height,
            normal_x: template.x,
            normal_y: template.y,
            normal_width: width,
            normal_height: height,
            min_width: min_w,
            min_height: min_h,
            max_width: max_w,
            max_height: max_h,
            can_resize: template.can_resize,
            overall_rect,
            titlebar_rect,
            iconbar_rect,
            content_rect,
            drag_zone_n,
            drag_zone_s,
            drag_zone_e,
            drag_zone_w,
            drag_zone_se,
            controls,
            selected_control: None,
            pattern_bitmap: None,
            event_handler: template.event_handler,
            menus: Vec::with_capacity(WIN_MAX_MENU_LEVELS),
            clip_rects: Vec::with_capacity(WIN_MAX_CLIP_RECTS),
            damage_rects: Vec::with_capacity(WIN_MAX_DAMAGE_RECTS),
            id: 0,
            display_order: 0,
            active: false,
            visible: false,
            invalidated: true,
            titlebar_invalidated: true,
            is_backdrop,
            user_data: 0,
        }
    }

    pub fn overall_rect(&self) -> Rect {
        self.overall_rect
    }

    pub fn content_rect(&self) -> Rect {
        self.content_rect
    }

    pub fn titlebar_rect(&self) -> Rect {
        self.titlebar_rect
    }

    pub fn iconbar_rect(&self) -> Rect {
        self.iconbar_rect
    }

    pub fn global_rect(&self) -> Rect {
        self.overall_rect.translate(self.x, self.y)
    }

    pub fn clip_rect_count(&self) -> usize {
        self.clip_rects.len()
    }

    /// Add a local-coordinate clip rect. Fails silently (no state mutated)
    /// once `WIN_MAX_CLIP_RECTS` is reached; callers are then expected to
    /// invalidate the whole window instead.
    pub fn add_clip_rect(&mut self, rect: Rect) -> WmResult<()> {
        if self.clip_rects.len() >= WIN_MAX_CLIP_RECTS {
            return Err(WmError::ClipRectsFull);
        }
        self.clip_rects.push(rect);
        Ok(())
    }

    /// Merge overlapping/adjacent clip rects to keep the list small:
    /// repeatedly fold any pair whose union area doesn't exceed the sum of
    /// their individual areas by more than the overlap itself, i.e. any
    /// intersecting or touching pair.
    pub fn merge_clip_rects(&mut self) {
        let mut merged = true;
        while merged {
            merged = false;
            'outer: for i in 0..self.clip_rects.len() {
                for j in (i + 1)..self.clip_rects.len() {
                    let a = self.clip_rects[i];
                    let b = self.clip_rects[j];
                    if a.intersects(&b) || rects_touch(&a, &b) {
                        self.clip_rects[i] = a.union(&b);
                        self.clip_rects.remove(j);
                        merged = true;
                        break 'outer;
                    }
                }
            }
        }
    }

    /// Record damage from a move/resize: the window's previous global rect,
    /// which System will distribute to every other window. Capped at
    /// `WIN_MAX_DAMAGE_RECTS`; further damage in the same pass is dropped
    /// (the whole-window invalidation on the next render recovers any gap).
    fn push_damage_rect(&mut self, previous_global_rect: Rect) {
        if self.damage_rects.len() < WIN_MAX_DAMAGE_RECTS {
            self.damage_rects.push(previous_global_rect);
        }
    }

    /// Drain this window's pending damage rects (called once by System after
    /// distributing them to every other window).
    pub fn take_damage_rects(&mut self) -> Vec<Rect> {
        core::mem::take(&mut self.damage_rects)
    }

    /// Accept a damage rect from another window's move/resize/close: clip it
    /// to this window's own bounds and add the intersection as a local clip
    /// rect. A non-intersecting rect is silently rejected. If the clip list
    /// is already full, escalates to a full-window invalidation instead of
    /// dropping the damage.
    pub fn accept_damage_rect(&mut self, global_rect: Rect) {
        let local = global_rect.translate(-self.x, -self.y);
        if let Some(clipped) = local.intersect(&self.overall_rect) {
            if self.add_clip_rect(clipped).is_err() {
                self.clip_rects.clear();
                self.invalidated = true;
            }
        }
    }

    /// Redraw a single control into the offscreen bitmap and register its
    /// rect as a clip rect, rather than invalidating the whole window.
    /// `Control::set_active`/`set_pressed` only flip flags and trigger no
    /// redraw on their own; a caller that changes one control's state and
    /// wants an efficient partial repaint calls this afterward. Escalates to
    /// a full-window invalidation if the clip list is already full.
    pub fn redraw_control(&mut self, idx: usize, font: &Font, theme: &Theme) -> WmResult<()> {
        if idx >= self.controls.len() {
            return Err(WmError::NotFound);
        }
        let rect = self.controls[idx].rect;
        self.controls[idx].render(&mut self.offscreen_bitmap, font, theme)?;
        if self.add_clip_rect(rect).is_err() {
            self.clip_rects.clear();
            self.invalidated = true;
        }
        Ok(())
    }

    /// Handle a mouseDown at window-local `(x, y)`: hit-test the control
    /// list, mark a hit control pressed, record it as selected, and redraw
    /// just that control. Returns the hit control's id, or `None` if the
    /// point missed every control.
    pub fn press_control_at(&mut self, x: i32, y: i32, font: &Font, theme: &Theme) -> WmResult<Option<u16>> {
        let idx = match self.control_at(x, y) {
            Some(idx) => idx,
            None => return Ok(None),
        };
        self.controls[idx].set_pressed(true);
        self.selected_control = Some(idx);
        self.redraw_control(idx, font, theme)?;
        Ok(Some(self.controls[idx].id))
    }

    /// Handle a mouseUp: clear whichever control was marked selected by a
    /// prior `press_control_at`, regardless of where the mouseUp lands, and
    /// redraw it. Returns the id of the control that was released, for the
    /// caller to turn into a `controlClicked` event.
    pub fn release_control(&mut self, font: &Font, theme: &Theme) -> WmResult<Option<u16>> {
        let idx = match self.selected_control.take() {
            Some(idx) => idx,
            None => return Ok(None),
        };
        let id = self.controls[idx].id;
        self.controls[idx].set_pressed(false);
        self.redraw_control(idx, font, theme)?;
        Ok(Some(id))
    }

    /// Render this window, called back-to-front by System.
    pub fn render(&mut self, screen_bitmap: &mut Bitmap, font: &Font, theme: &Theme) -> WmResult<()> {
        if !self.visible {
            return Ok(());
        }

        if self.invalidated {
            self.offscreen_bitmap.draw_box(self.overall_rect, theme.outline_color, false)?;
            self.offscreen_bitmap.fill_box(self.titlebar_rect, theme.titlebar_color)?;
            self.offscreen_bitmap.fill_box(self.content_rect, theme.content_color)?;

            self.offscreen_bitmap.set_pen_xy(self.titlebar_rect.min_x + 2, self.titlebar_rect.min_y + 1)?;
            self.offscreen_bitmap.set_color(theme.titlebar_text_color);
            let avail = self.titlebar_rect.width() - 4;
            font.draw_string(&mut self.offscreen_bitmap, self.title.as_bytes(), {
                let (count, _w) = font.measure_string(self.title.as_bytes(), -1, avail);
                count
            })?;

            for control in &self.controls {
                control.render(&mut self.offscreen_bitmap, font, theme)?;
            }

            let global = self.global_rect();
            screen_bitmap.blit(
                &self.offscreen_bitmap as *const Bitmap,
                0,
                0,
                self.overall_rect.width(),
                self.overall_rect.height(),
                global.min_x,
                global.min_y,
            )?;

            self.clip_rects.clear();
            self.invalidated = false;
            return Ok(());
        }

        for rect in core::mem::take(&mut self.clip_rects) {
            let clipped = match rect.intersect(&self.overall_rect) {
                Some(r) => r,
                None => continue,
            };
            screen_bitmap.blit(
                &self.offscreen_bitmap as *const Bitmap,
                clipped.min_x,
                clipped.min_y,
                clipped.width(),
                clipped.height(),
                self.x + clipped.min_x,
                self.y + clipped.min_y,
            )?;
        }
        Ok(())
    }

    /// Save current bounds as normal, then grow to `screen`'s size, clamped
    /// to `max_width`/`max_height`: `width` becomes
    /// `min(max_width, screen_width)`, and likewise for height.
    pub fn maximize(&mut self, screen_width: i32, screen_height: i32) {
        self.normal_x = self.x;
        self.normal_y = self.y;
        self.normal_width = self.width;
        self.normal_height = self.height;

        let new_width = self.max_width.min(screen_width);
        let new_height = self.max_height.min(screen_height);
        self.change_window(0, 0, new_width, new_height, false);
        self.state = WindowState::Maximized;
    }

    pub fn norm_size(&mut self) {
        let (x, y, w, h) = (self.normal_x, self.normal_y, self.normal_width, self.normal_height);
        self.change_window(x, y, w, h, false);
        self.state = WindowState::Normal;
    }

    /// Hide the window, keeping its geometry.
    pub fn minimize(&mut self) {
        self.visible = false;
        self.state = WindowState::Minimized;
    }

    /// Reposition/resize, re-validating against min/max and repositioning
    /// controls. Emits a damage rect for the vacated region when the window
    /// actually moved or resized.
    pub fn change_window(&mut self, x: i32, y: i32, width: i32, height: i32, update_norm: bool) {
        let previous_global = self.global_rect();

        let width = width.clamp(self.min_width, self.max_width);
        let height = height.clamp(self.min_height, self.max_height);

        if x != self.x || y != self.y || width != self.width || height != self.height {
            self.push_damage_rect(previous_global);
        }

        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;

        self.overall_rect = Rect::from_origin_size(0, 0, width, height);
        self.titlebar_rect = Rect::new(
            self.overall_rect.min_x + 1,
            self.overall_rect.min_y + 1,
            self.overall_rect.max_x - 1,
            self.overall_rect.min_y + self.titlebar_rect.height(),
        );
        self.content_rect = Rect::new(
            self.overall_rect.min_x + 1,
            self.titlebar_rect.max_y + 1,
            self.overall_rect.max_x - 1,
            self.overall_rect.max_y - 1,
        );

        for control in &mut self.controls {
            let parent = self.titlebar_rect;
            control.realign(parent);
        }

        if update_norm {
            self.normal_x = x;
            self.normal_y = y;
            self.normal_width = width;
            self.normal_height = height;
        }

        self.invalidated = true;
    }

    /// Classify a window-local point against the drag zones.
    pub fn drag_zone_hit_test(&self, x: i32, y: i32) -> DragZone {
        if !self.can_resize {
            if self.titlebar_rect.contains_point(x, y) {
                return DragZone::Drag;
            }
            return DragZone::None;
        }
        if self.drag_zone_se.contains_point(x, y) {
            DragZone::ResizeSe
        } else if self.drag_zone_e.contains_point(x, y) {
            DragZone::ResizeE
        } else if self.drag_zone_w.contains_point(x, y) {
            DragZone::ResizeW
        } else if self.drag_zone_n.contains_point(x, y) {
            DragZone::ResizeN
        } else if self.drag_zone_s.contains_point(x, y) {
            DragZone::ResizeS
        } else if self.titlebar_rect.contains_point(x, y) {
            DragZone::Drag
        } else {
            DragZone::None
        }
    }

    pub fn global_to_local(&self, x: i32, y: i32) -> (i32, i32) {
        (x - self.x, y - self.y)
    }

    pub fn local_to_global(&self, x: i32, y: i32) -> (i32, i32) {
        (x + self.x, y + self.y)
    }

    /// Hit-test window-local coordinates against the control list, first
    /// inserted wins ties.
    pub fn control_at(&self, x: i32, y: i32) -> Option<usize> {
        self.controls.iter().position(|c| c.visible && c.rect.contains_point(x, y))
    }

    pub fn control_by_id(&self, id: u16) -> Option<usize> {
        self.controls.iter().position(|c| c.id == id)
    }

    pub fn control_id_at(&self, x: i32, y: i32) -> u16 {
        match self.control_at(x, y) {
            Some(idx) => self.controls[idx].id,
            None => CONTROL_ID_NOT_FOUND,
        }
    }
}

fn rects_touch(a: &Rect, b: &Rect) -> bool {
    let grown = Rect::new(a.min_x - 1, a.min_y - 1, a.max_x + 1, a.max_y + 1);
    grown.intersects(b)
}

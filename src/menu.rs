//! Pull-down/pop-up menus: layout, highlight tracking, and hit testing.
//!
//! Grounded on `original_source/menu.c` for the measure-then-layout algorithm
//! and the submenu-arrow/divider-rule drawing, and on `window.rs`'s own
//! clip-rect bookkeeping style for how a transient surface reports the
//! screen area it dirties.

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::allocator::Allocator;
use crate::bitmap::Bitmap;
use crate::config::MENU_ID_NO_SELECTION;
use crate::error::WmResult;
use crate::font::Font;
use crate::geometry::Rect;
use crate::theme::Theme;

const ITEM_HEIGHT: i32 = 16;
const DIVIDER_HEIGHT: i32 = 5;
const LEFT_PAD: i32 = 6;
const ARROW_WIDTH: i32 = 10;
const RIGHT_PAD: i32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuItemKind {
    Item,
    Submenu,
    Divider,
}

pub struct MenuItem {
    pub kind: MenuItemKind,
    pub id: u16,
    pub caption: String,
    pub submenu_group: Option<usize>,
    pub enabled: bool,
    rect: Rect,
}

impl MenuItem {
    pub fn item(id: u16, caption: &str) -> MenuItem {
        MenuItem {
            kind: MenuItemKind::Item,
            id,
            caption: String::from(caption),
            submenu_group: None,
            enabled: true,
            rect: Rect::new(0, 0, 0, 0),
        }
    }

    pub fn submenu(id: u16, caption: &str, group: usize) -> MenuItem {
        MenuItem {
            kind: MenuItemKind::Submenu,
            id,
            caption: String::from(caption),
            submenu_group: Some(group),
            enabled: true,
            rect: Rect::new(0, 0, 0, 0),
        }
    }

    pub fn divider() -> MenuItem {
        MenuItem {
            kind: MenuItemKind::Divider,
            id: MENU_ID_NO_SELECTION,
            caption: String::new(),
            submenu_group: None,
            enabled: true,
            rect: Rect::new(0, 0, 0, 0),
        }
    }
}

pub struct MenuGroup {
    pub items: Vec<MenuItem>,
}

/// A single menu's runtime state: its groups (top-level plus any submenus),
/// and, while open, the offscreen bitmap it's currently rendered into.
pub struct Menu {
    pub groups: Vec<MenuGroup>,
    bitmap: Option<Bitmap>,
    open_group: Option<usize>,
    global_rect: Rect,
    highlighted: Option<usize>,
}

impl Menu {
    pub fn new(groups: Vec<MenuGroup>) -> Menu {
        Menu {
            groups,
            bitmap: None,
            open_group: None,
            global_rect: Rect::new(0, 0, 0, 0),
            highlighted: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.bitmap.is_some()
    }

    pub fn global_rect(&self) -> Rect {
        self.global_rect
    }

    /// Measure every item's caption, lay out rects top-to-bottom, clamp the
    /// requested `(x, y)` on-screen, and render into a freshly-allocated
    /// bitmap.
    pub fn open(
        &mut self,
        group: usize,
        x: i32,
        y: i32,
        screen_width: i32,
        screen_height: i32,
        alloc: &mut Allocator,
        font: &Font,
        theme: &Theme,
    ) -> WmResult<()> {
        let inner_width = {
            let mut max_w = 0;
            for item in &self.groups[group].items {
                if item.kind == MenuItemKind::Divider {
                    continue;
                }
                let (_count, measured) = font.measure_string(item.caption.as_bytes(), -1, i32::MAX);
                let arrow = if item.kind == MenuItemKind::Submenu { ARROW_WIDTH } else { 0 };
                max_w = max_w.max(LEFT_PAD + measured + arrow + RIGHT_PAD);
            }
            max_w.max(40)
        };

        let mut inner_height = 0;
        {
            let items = &mut self.groups[group].items;
            for item in items.iter_mut() {
                let h = if item.kind == MenuItemKind::Divider { DIVIDER_HEIGHT } else { ITEM_HEIGHT };
                item.rect = Rect::new(0, inner_height, inner_width - 1, inner_height + h - 1);
                inner_height += h;
            }
        }

        let clamped_x = x.max(0).min((screen_width - inner_width).max(0));
        let clamped_y = y.max(0).min((screen_height - inner_height).max(0));

        let mut bitmap = Bitmap::create(alloc, inner_width, inner_height, false)?;
        bitmap.fill_box(bitmap.overall_rect(), theme.standard_back_color)?;
        bitmap.draw_box(bitmap.overall_rect(), theme.outline_color, false)?;

        self.open_group = Some(group);
        self.global_rect = Rect::from_origin_size(clamped_x, clamped_y, inner_width, inner_height);
        self.highlighted = None;

        for idx in 0..self.groups[group].items.len() {
            self.draw_item(&mut bitmap, group, idx, font, theme)?;
        }

        self.bitmap = Some(bitmap);
        Ok(())
    }

    fn draw_item(&self, bitmap: &mut Bitmap, group: usize, idx: usize, font: &Font, theme: &Theme) -> WmResult<()> {
        let item = &self.groups[group].items[idx];
        let (fore, back) = if Some(idx) == self.highlighted {
            (theme.highlight_fore_color, theme.highlight_back_color)
        } else if !item.enabled {
            (theme.inactive_fore_color, theme.inactive_back_color)
        } else {
            (theme.standard_fore_color, theme.standard_back_color)
        };

        bitmap.fill_box(item.rect, back)?;

        match item.kind {
            MenuItemKind::Divider => {
                let mid_y = (item.rect.min_y + item.rect.max_y) / 2;
                bitmap.draw_h_line(item.rect.min_x + 2, mid_y, item.rect.width() - 4, theme.outline_color)?;
            }
            MenuItemKind::Item | MenuItemKind::Submenu => {
                bitmap.set_pen_xy(item.rect.min_x + LEFT_PAD, item.rect.min_y + 2)?;
                bitmap.set_color(fore);
                font.draw_string(bitmap, item.caption.as_bytes(), -1)?;

                if item.kind == MenuItemKind::Submenu {
                    let arrow_x = item.rect.max_x - ARROW_WIDTH;
                    let mid_y = (item.rect.min_y + item.rect.max_y) / 2;
                    for dx in 0..4 {
                        bitmap.set_pixel(arrow_x + dx, mid_y - 3 + dx, fore)?;
                        bitmap.set_pixel(arrow_x + dx, mid_y + 3 - dx, fore)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Hit-test a point local to the menu's bitmap against the open group's
    /// item rects.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<usize> {
        let group = self.open_group?;
        self.groups[group].items.iter().position(|i| i.kind != MenuItemKind::Divider && i.rect.contains_point(x, y))
    }

    /// Update the highlighted item for a mouse-move at local `(x, y)`.
    /// Redraws the old and new highlighted items and returns their local
    /// rects so the caller can blit just those spans.
    pub fn mouse_move(&mut self, x: i32, y: i32, font: &Font, theme: &Theme) -> WmResult<Vec<Rect>> {
        let group = match self.open_group {
            Some(g) => g,
            None => return Ok(Vec::new()),
        };
        let hit = self.hit_test(x, y);
        if hit == self.highlighted {
            return Ok(Vec::new());
        }

        let mut dirty = Vec::new();
        let old = self.highlighted;
        self.highlighted = hit;

        let bitmap = match self.bitmap.as_mut() {
            Some(b) => b,
            None => return Ok(Vec::new()),
        };

        if let Some(old_idx) = old {
            dirty.push(self.groups[group].items[old_idx].rect);
        }
        if let Some(new_idx) = hit {
            dirty.push(self.groups[group].items[new_idx].rect);
        }

        if let Some(old_idx) = old {
            Self::redraw_item_static(bitmap, &self.groups[group], old_idx, self.highlighted, font, theme)?;
        }
        if let Some(new_idx) = hit {
            Self::redraw_item_static(bitmap, &self.groups[group], new_idx, self.highlighted, font, theme)?;
        }
        Ok(dirty)
    }

    fn redraw_item_static(
        bitmap: &mut Bitmap,
        group: &MenuGroup,
        idx: usize,
        highlighted: Option<usize>,
        font: &Font,
        theme: &Theme,
    ) -> WmResult<()> {
        let item = &group.items[idx];
        let (fore, back) = if Some(idx) == highlighted {
            (theme.highlight_fore_color, theme.highlight_back_color)
        } else if !item.enabled {
            (theme.inactive_fore_color, theme.inactive_back_color)
        } else {
            (theme.standard_fore_color, theme.standard_back_color)
        };
        bitmap.fill_box(item.rect, back)?;
        if item.kind != MenuItemKind::Divider {
            bitmap.set_pen_xy(item.rect.min_x + LEFT_PAD, item.rect.min_y + 2)?;
            bitmap.set_color(fore);
            font.draw_string(bitmap, item.caption.as_bytes(), -1)?;
        }
        Ok(())
    }

    /// Resolve a click at local `(x, y)`: returns the hit item's id, or
    /// `MENU_ID_NO_SELECTION` if the click missed every item or no menu is
    /// open. Either way the menu is closed and its bitmap freed; the caller
    /// is responsible for damaging `global_rect()` in every window before
    /// calling this.
    pub fn click(&mut self, x: i32, y: i32, alloc: &mut Allocator) -> u16 {
        let id = self
            .hit_test(x, y)
            .and_then(|idx| self.open_group.map(|g| self.groups[g].items[idx].id))
            .unwrap_or(MENU_ID_NO_SELECTION);
        self.close(alloc);
        id
    }

    pub fn close(&mut self, alloc: &mut Allocator) {
        if let Some(bitmap) = self.bitmap.take() {
            bitmap.free(alloc);
        }
        self.open_group = None;
        self.highlighted = None;
    }

    pub fn bitmap(&self) -> Option<&Bitmap> {
        self.bitmap.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    extern crate alloc as alloc_crate;
    use alloc_crate::boxed::Box;
    use alloc_crate::vec;

    fn test_allocator() -> (Allocator, Box<[u8]>) {
        let mut mem = vec![0u8; 1 << 16].into_boxed_slice();
        let mut a = Allocator::new();
        unsafe { a.init_normal_pool(mem.as_mut_ptr(), mem.len()) };
        (a, mem)
    }

    fn tiny_font() -> Font {
        let first_char: i16 = 65;
        let last_char: i16 = 66;
        let mut buf = Vec::new();
        buf.extend_from_slice(&0i16.to_be_bytes());
        buf.extend_from_slice(&first_char.to_be_bytes());
        buf.extend_from_slice(&last_char.to_be_bytes());
        buf.extend_from_slice(&1i16.to_be_bytes());
        buf.extend_from_slice(&0i16.to_be_bytes());
        buf.extend_from_slice(&0i16.to_be_bytes());
        buf.extend_from_slice(&1i16.to_be_bytes());
        buf.extend_from_slice(&1i16.to_be_bytes());
        buf.extend_from_slice(&0u16.to_be_bytes());
        buf.extend_from_slice(&1i16.to_be_bytes());
        buf.extend_from_slice(&0i16.to_be_bytes());
        buf.extend_from_slice(&0i16.to_be_bytes());
        buf.extend_from_slice(&1i16.to_be_bytes());
        buf.extend_from_slice(&0x8000u16.to_be_bytes());
        for bit in [0u16, 1, 2, 3] {
            buf.extend_from_slice(&bit.to_be_bytes());
        }
        let entry = |advance: u8, h_off: u8| -> u16 { ((advance as u16) << 8) | h_off as u16 };
        buf.extend_from_slice(&entry(6, 0).to_be_bytes());
        buf.extend_from_slice(&entry(6, 0).to_be_bytes());
        buf.extend_from_slice(&entry(6, 0).to_be_bytes());
        buf.extend_from_slice(&entry(0, 0).to_be_bytes());
        Font::new_from_blob(&buf).unwrap()
    }

    fn sample_menu() -> Menu {
        Menu::new(vec![MenuGroup {
            items: vec![MenuItem::item(1, "A"), MenuItem::divider(), MenuItem::item(2, "B")],
        }])
    }

    #[test]
    fn open_clamps_position_on_screen() {
        let (mut a, _m) = test_allocator();
        let theme = Theme::default_theme(&mut a, core::ptr::null(), core::ptr::null()).unwrap();
        let font = tiny_font();
        let mut menu = sample_menu();
        menu.open(0, 10000, 10000, 640, 480, &mut a, &font, &theme).unwrap();
        assert!(menu.global_rect().max_x <= 640);
        assert!(menu.global_rect().max_y <= 480);
    }

    #[test]
    fn hit_test_skips_dividers() {
        let (mut a, _m) = test_allocator();
        let theme = Theme::default_theme(&mut a, core::ptr::null(), core::ptr::null()).unwrap();
        let font = tiny_font();
        let mut menu = sample_menu();
        menu.open(0, 0, 0, 640, 480, &mut a, &font, &theme).unwrap();
        let divider_rect = menu.groups[0].items[1].rect;
        let mid = (divider_rect.min_y + divider_rect.max_y) / 2;
        assert_eq!(menu.hit_test(5, mid), None);
    }

    #[test]
    fn click_returns_id_and_closes() {
        let (mut a, _m) = test_allocator();
        let theme = Theme::default_theme(&mut a, core::ptr::null(), core::ptr::null()).unwrap();
        let font = tiny_font();
        let mut menu = sample_menu();
        menu.open(0, 0, 0, 640, 480, &mut a, &font, &theme).unwrap();
        let item_rect = menu.groups[0].items[0].rect;
        let id = menu.click(item_rect.min_x + 1, item_rect.min_y + 1, &mut a);
        assert_eq!(id, 1);
        assert!(!menu.is_open());
    }

    #[test]
    fn click_outside_any_item_returns_no_selection() {
        let (mut a, _m) = test_allocator();
        let theme = Theme::default_theme(&mut a, core::ptr::null(), core::ptr::null()).unwrap();
        let font = tiny_font();
        let mut menu = sample_menu();
        menu.open(0, 0, 0, 640, 480, &mut a, &font, &theme).unwrap();
        let id = menu.click(-5, -5, &mut a);
        assert_eq!(id, MENU_ID_NO_SELECTION);
    }

    #[test]
    fn mouse_move_tracks_highlight_change() {
        let (mut a, _m) = test_allocator();
        let theme = Theme::default_theme(&mut a, core::ptr::null(), core::ptr::null()).unwrap();
        let font = tiny_font();
        let mut menu = sample_menu();
        menu.open(0, 0, 0, 640, 480, &mut a, &font, &theme).unwrap();
        let item_rect = menu.groups[0].items[2].rect;
        let dirty = menu.mouse_move(item_rect.min_x + 1, item_rect.min_y + 1, &font, &theme).unwrap();
        assert_eq!(dirty.len(), 1);
        assert_eq!(menu.highlighted, Some(2));
    }
}

//! The top-level context tying every subsystem together: screens, theme,
//! windows, events, and menus.
//!
//! Grounded on `original_source/lib_sys.c`'s `Sys_Init`/`Sys_Destroy` for the
//! init/teardown ordering, `window.c`'s window-list management
//! (`Window_Add`/`Window_Remove`/activation reshuffling), and
//! `compositor/src/desktop/window.rs`'s `Desktop` for the idiom of an
//! explicit owning context rather than a hidden global mutable singleton.

extern crate alloc;
use alloc::vec::Vec;

use crate::allocator::Allocator;
use crate::config::{SYS_MAX_WINDOWS, SYS_WIN_Z_ORDER_BACKDROP, SYS_WIN_Z_ORDER_NEWLY_ACTIVE};
use crate::error::{SystemInitError, WmError, WmResult};
use crate::event::{EventKind, EventManager, EventRecord};
use crate::font::Font;
use crate::menu::Menu;
use crate::platform::MachineModel;
use crate::screen::Screen;
use crate::theme::Theme;
use crate::window::{Window, WindowTemplate};

/// The whole window manager's live state. One instance is
/// expected per process; nothing here is a global. Callers own this struct
/// and pass `&mut System` wherever a subsystem needs to reach another.
pub struct System {
    pub allocator: Allocator,
    pub model: MachineModel,
    pub screens: Vec<Screen>,
    pub theme: Theme,
    pub system_font: Font,
    pub windows: Vec<Window>,
    pub active_window_id: Option<u16>,
    pub events: EventManager,
    pub menu: Menu,
    next_window_id: u16,
}

impl System {
    /// Bring up the whole system: detect the machine, auto-configure every
    /// screen channel it reports, build the default theme, allocate both
    /// screens' bitmap layers in VRAM, and create the backdrop window. Any
    /// failure along the way is fatal and unwinds the partially-built state
    /// back to the caller.
    ///
    /// # Safety
    /// `gabe_sys_stat_addr` must be the live GABE status register address,
    /// and every VICKY register block the detected model implies must be
    /// mapped for the duration of the returned `System`.
    pub unsafe fn init(
        gabe_sys_stat_addr: usize,
        normal_pool: &mut [u8],
        system_font_blob: &[u8],
        icon_font_blob: &[u8],
    ) -> Result<System, SystemInitError> {
        let model = crate::platform::detect_machine(gabe_sys_stat_addr)?;

        let mut allocator = Allocator::new();
        allocator.init_normal_pool(normal_pool.as_mut_ptr(), normal_pool.len());

        let mut screens = Vec::with_capacity(model.num_screens());
        for channel in 0..model.num_screens() {
            let mut screen = Screen::auto_configure(model, channel)?;
            screen.allocate_bitmap_layers(&mut allocator).map_err(|_| SystemInitError::OutOfMemory)?;
            screens.push(screen);
        }

        let system_font = Font::new_from_blob(system_font_blob).map_err(|_| SystemInitError::HardwareMismatch)?;
        let icon_font = Font::new_from_blob(icon_font_blob).map_err(|_| SystemInitError::HardwareMismatch)?;

        let theme = Theme::default_theme(&mut allocator, &icon_font as *const Font, &system_font as *const Font)
            .map_err(|_| SystemInitError::OutOfMemory)?;

        let mut system = System {
            allocator,
            model,
            screens,
            theme,
            system_font,
            windows: Vec::with_capacity(SYS_MAX_WINDOWS),
            active_window_id: None,
            events: EventManager::new(),
            menu: Menu::new(Vec::new()),
            next_window_id: 1,
        };

        system.create_backdrop_window().map_err(|_| SystemInitError::OutOfMemory)?;

        crate::log_info!("system initialized: model={:?}, screens={}", system.model, system.screens.len());
        Ok(system)
    }

    fn create_backdrop_window(&mut self) -> WmResult<()> {
        let (width, height) = self.screens.first().map(|s| (s.width_px(), s.height_px())).unwrap_or((640, 480));

        let on_screen = crate::bitmap::Bitmap::create(&mut self.allocator, width, height, false)?;
        let offscreen = crate::bitmap::Bitmap::create(&mut self.allocator, width, height, false)?;

        let template = WindowTemplate {
            title: alloc::string::String::from("Desktop"),
            window_type: crate::window::WindowType::Backdrop,
            x: 0,
            y: 0,
            width,
            height,
            min_width: width,
            min_height: height,
            max_width: width,
            max_height: height,
            can_resize: false,
            on_screen_bitmap: on_screen,
            offscreen_bitmap: offscreen,
            event_handler: None,
        };

        let mut window = Window::create(template, &self.theme);
        window.visible = true;
        self.add_window(window)?;
        Ok(())
    }

    /// Tear down every window (freeing its bitmaps back into the allocator)
    /// and every screen's bitmap layers. Consumes `self` since nothing in
    /// `System` is valid afterward.
    pub fn destroy(mut self) {
        while let Some(window) = self.windows.pop() {
            window.on_screen_bitmap.free(&mut self.allocator);
            window.offscreen_bitmap.free(&mut self.allocator);
        }
        crate::log_info!("system destroyed");
    }

    /// Insert `window` at the front: refuse past `SYS_MAX_WINDOWS`, assign it
    /// the newly-active sentinel order, then renumber every non-backdrop
    /// window front-to-back and make it active.
    pub fn add_window(&mut self, mut window: Window) -> WmResult<u16> {
        if self.windows.len() >= SYS_MAX_WINDOWS {
            return Err(WmError::TooManyWindows);
        }

        let id = self.next_window_id;
        self.next_window_id = self.next_window_id.wrapping_add(1).max(1);

        window.id = id;
        window.display_order = SYS_WIN_Z_ORDER_NEWLY_ACTIVE;
        let is_backdrop = window.is_backdrop;
        self.windows.push(window);

        self.renumber_display_order();
        if !is_backdrop {
            self.set_active_window(Some(id));
        }
        Ok(id)
    }

    /// Remove and destroy the window with `id`: free its bitmaps, drop any
    /// queued events that reference it, distribute its vacated global rect
    /// as damage to every remaining window, and activate the next window if
    /// the removed one was active.
    pub fn remove_window(&mut self, id: u16) -> WmResult<()> {
        let idx = self.windows.iter().position(|w| w.id == id).ok_or(WmError::NotFound)?;
        let mut window = self.windows.remove(idx);
        let vacated = window.global_rect();

        window.on_screen_bitmap.free(&mut self.allocator);
        window.offscreen_bitmap.free(&mut self.allocator);

        self.events.remove_events_for_window(id);

        for other in self.windows.iter_mut() {
            other.accept_damage_rect(vacated);
        }

        self.renumber_display_order();

        if self.active_window_id == Some(id) {
            let next = self.windows.iter().filter(|w| !w.is_backdrop).min_by_key(|w| w.display_order).map(|w| w.id);
            self.active_window_id = None;
            if let Some(next_id) = next {
                self.set_active_window(Some(next_id));
            }
        }
        Ok(())
    }

    /// Activate `id` (or clear activation if `None`): mark the previous
    /// active window inactive, collect damage from every window that was in
    /// front of the newly active window's old position (it's about to move
    /// behind them), mark the new window active, move it to the front of
    /// the display order, and force a render.
    pub fn set_active_window(&mut self, id: Option<u16>) {
        if let Some(prev_id) = self.active_window_id {
            if let Some(prev) = self.windows.iter_mut().find(|w| w.id == prev_id) {
                prev.active = false;
                prev.titlebar_invalidated = true;
            }
        }

        self.active_window_id = id;
        self.events.set_active_window(id);

        if let Some(new_id) = id {
            let old_order = self.windows.iter().find(|w| w.id == new_id).map(|w| w.display_order);

            if let Some(old_order) = old_order {
                let new_rect = self.windows.iter().find(|w| w.id == new_id).map(|w| w.global_rect());
                if let Some(new_rect) = new_rect {
                    for other in self.windows.iter_mut() {
                        if other.id != new_id && !other.is_backdrop && other.display_order > old_order {
                            other.accept_damage_rect(new_rect);
                        }
                    }
                }
            }

            if let Some(w) = self.windows.iter_mut().find(|w| w.id == new_id) {
                w.active = true;
                w.titlebar_invalidated = true;
                if !w.is_backdrop {
                    w.display_order = SYS_WIN_Z_ORDER_NEWLY_ACTIVE;
                }
            }
            self.renumber_display_order();
        }

        for window in self.windows.iter_mut() {
            window.invalidated = true;
        }
    }

    /// Reassign contiguous `display_order` values front-to-back: the
    /// backdrop always sits at `SYS_WIN_Z_ORDER_BACKDROP`; every other
    /// window is renumbered in its current relative order, with whichever
    /// window (if any) carries the newly-active sentinel sorted to the
    /// front first.
    fn renumber_display_order(&mut self) {
        let mut indices: Vec<usize> = (0..self.windows.len()).filter(|&i| !self.windows[i].is_backdrop).collect();
        indices.sort_by_key(|&i| {
            let order = self.windows[i].display_order;
            if order == SYS_WIN_Z_ORDER_NEWLY_ACTIVE {
                0
            } else {
                (order as u32) + 1
            }
        });

        let mut next_order = SYS_WIN_Z_ORDER_BACKDROP + 1;
        for idx in indices {
            self.windows[idx].display_order = next_order;
            next_order += 1;
        }
        for window in self.windows.iter_mut() {
            if window.is_backdrop {
                window.display_order = SYS_WIN_Z_ORDER_BACKDROP;
            }
        }
    }

    pub fn window_by_id(&self, id: u16) -> Option<&Window> {
        self.windows.iter().find(|w| w.id == id)
    }

    pub fn window_by_id_mut(&mut self, id: u16) -> Option<&mut Window> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    /// Render every window back-to-front into its screen's bitmap layer.
    pub fn render(&mut self) -> WmResult<()> {
        let mut order: Vec<usize> = (0..self.windows.len()).collect();
        order.sort_by_key(|&i| self.windows[i].display_order);

        let screen = match self.screens.first_mut() {
            Some(s) => s,
            None => return Ok(()),
        };
        let screen_bitmap = match screen.layer0_mut() {
            Some(b) => b,
            None => return Ok(()),
        };

        for idx in order {
            self.windows[idx].render(screen_bitmap, &self.system_font, &self.theme)?;
        }
        Ok(())
    }

    /// Topmost visible window whose global rect contains `(x, y)`.
    fn window_at(&self, x: i32, y: i32) -> Option<usize> {
        self.windows
            .iter()
            .enumerate()
            .filter(|(_, w)| w.visible && w.global_rect().contains_point(x, y))
            .max_by_key(|(_, w)| w.display_order)
            .map(|(idx, _)| idx)
    }

    /// Dispatch a raw event: for mouseDown, hit-test the topmost window and,
    /// within it, the control under the pointer, marking it pressed and
    /// repainting it before the event reaches the queue. For mouseUp, clear
    /// whichever window's control was left pressed by a prior mouseDown and
    /// repaint it, regardless of where the pointer currently sits. The
    /// resolved `window_id`/`control_id` then drive `EventManager`'s own
    /// activation-swap and controlClicked normalization.
    pub fn dispatch(&mut self, mut event: EventRecord) {
        match event.what {
            EventKind::MouseDown => {
                if let Some(idx) = self.window_at(event.global_x, event.global_y) {
                    let (local_x, local_y) = self.windows[idx].global_to_local(event.global_x, event.global_y);
                    event.window_id = Some(self.windows[idx].id);
                    if let Ok(Some(control_id)) =
                        self.windows[idx].press_control_at(local_x, local_y, &self.system_font, &self.theme)
                    {
                        event.control_id = Some(control_id);
                    }
                }
            }
            EventKind::MouseUp => {
                if let Some(idx) = self.window_at(event.global_x, event.global_y) {
                    event.window_id = Some(self.windows[idx].id);
                }
                for window in self.windows.iter_mut() {
                    if let Ok(Some(control_id)) = window.release_control(&self.system_font, &self.theme) {
                        event.window_id = Some(window.id);
                        event.control_id = Some(control_id);
                        break;
                    }
                }
            }
            _ => {}
        }
        self.events.add_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Bitmap;
    use crate::window::WindowType;
    extern crate alloc as alloc_crate;
    use alloc_crate::boxed::Box;
    use alloc_crate::string::String;

    fn test_allocator() -> (Allocator, Box<[u8]>) {
        let mut mem = alloc_crate::vec![0u8; 1 << 20].into_boxed_slice();
        let mut a = Allocator::new();
        unsafe { a.init_normal_pool(mem.as_mut_ptr(), mem.len()) };
        (a, mem)
    }

    fn bare_system() -> (System, Box<[u8]>) {
        let (mut alloc, mem) = test_allocator();
        let theme = Theme::default_theme(&mut alloc, core::ptr::null(), core::ptr::null()).unwrap();
        let system = System {
            allocator: alloc,
            model: MachineModel::A2560U,
            screens: Vec::new(),
            theme,
            system_font: crate::font::Font::new_from_blob(&tiny_font_blob()).unwrap(),
            windows: Vec::new(),
            active_window_id: None,
            events: EventManager::new(),
            menu: Menu::new(Vec::new()),
            next_window_id: 1,
        };
        (system, mem)
    }

    fn tiny_font_blob() -> alloc_crate::vec::Vec<u8> {
        let mut buf = alloc_crate::vec::Vec::new();
        buf.extend_from_slice(&0i16.to_be_bytes());
        buf.extend_from_slice(&65i16.to_be_bytes());
        buf.extend_from_slice(&66i16.to_be_bytes());
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
        buf
    }

    fn make_standard_window(system: &mut System, x: i32, y: i32, w: i32, h: i32) -> Window {
        let on_screen = Bitmap::create(&mut system.allocator, w, h, false).unwrap();
        let offscreen = Bitmap::create(&mut system.allocator, w, h, false).unwrap();
        let template = WindowTemplate {
            title: String::from("W"),
            window_type: WindowType::Standard,
            x,
            y,
            width: w,
            height: h,
            min_width: w,
            min_height: h,
            max_width: 1024,
            max_height: 768,
            can_resize: true,
            on_screen_bitmap: on_screen,
            offscreen_bitmap: offscreen,
            event_handler: None,
        };
        Window::create(template, &system.theme)
    }

    #[test]
    fn add_window_assigns_unique_ids_and_activates() {
        let (mut system, _mem) = bare_system();
        let w1 = make_standard_window(&mut system, 0, 0, 100, 100);
        let w2 = make_standard_window(&mut system, 10, 10, 100, 100);
        let id1 = system.add_window(w1).unwrap();
        let id2 = system.add_window(w2).unwrap();
        assert_ne!(id1, id2);
        assert_eq!(system.active_window_id, Some(id2));
        assert!(!system.window_by_id(id1).unwrap().active);
        assert!(system.window_by_id(id2).unwrap().active);
    }

    #[test]
    fn add_window_refuses_past_capacity() {
        let (mut system, _mem) = bare_system();
        for _ in 0..SYS_MAX_WINDOWS {
            let w = make_standard_window(&mut system, 0, 0, 20, 20);
            system.add_window(w).unwrap();
        }
        let w = make_standard_window(&mut system, 0, 0, 20, 20);
        assert!(system.add_window(w).is_err());
    }

    #[test]
    fn remove_window_activates_next_and_distributes_damage() {
        let (mut system, _mem) = bare_system();
        let w1 = make_standard_window(&mut system, 0, 0, 100, 100);
        let w2 = make_standard_window(&mut system, 0, 0, 100, 100);
        let id1 = system.add_window(w1).unwrap();
        let id2 = system.add_window(w2).unwrap();

        system.remove_window(id2).unwrap();
        assert_eq!(system.windows.len(), 1);
        assert_eq!(system.active_window_id, Some(id1));
    }

    #[test]
    fn bring_to_front_invalidates_every_window() {
        let (mut system, _mem) = bare_system();
        let w1 = make_standard_window(&mut system, 0, 0, 100, 100);
        let w2 = make_standard_window(&mut system, 200, 0, 100, 100);
        let id1 = system.add_window(w1).unwrap();
        let _id2 = system.add_window(w2).unwrap();

        for w in system.windows.iter_mut() {
            w.invalidated = false;
        }
        system.set_active_window(Some(id1));
        assert!(system.windows.iter().all(|w| w.invalidated));
    }

    #[test]
    fn display_order_is_contiguous_front_to_back() {
        let (mut system, _mem) = bare_system();
        for i in 0..5 {
            let w = make_standard_window(&mut system, i * 10, 0, 50, 50);
            system.add_window(w).unwrap();
        }
        let mut orders: alloc_crate::vec::Vec<u16> = system.windows.iter().map(|w| w.display_order).collect();
        orders.sort();
        assert_eq!(orders, alloc_crate::vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn render_with_no_screens_is_a_noop() {
        let (mut system, _mem) = bare_system();
        let w = make_standard_window(&mut system, 0, 0, 50, 50);
        system.add_window(w).unwrap();
        assert!(system.render().is_ok());
    }

    #[test]
    fn window_lookup_by_id_matches_mutation() {
        let (mut system, _mem) = bare_system();
        let w = make_standard_window(&mut system, 0, 0, 50, 50);
        let id = system.add_window(w).unwrap();
        system.window_by_id_mut(id).unwrap().user_data = 42;
        assert_eq!(system.window_by_id(id).unwrap().user_data, 42);
    }

    #[test]
    fn mouse_down_then_up_on_a_control_synthesizes_control_clicked() {
        let (mut system, _mem) = bare_system();
        let w = make_standard_window(&mut system, 0, 0, 300, 200);
        let close_rect = w.controls[0].rect;
        let id = system.add_window(w).unwrap();
        let (global_x, global_y) = (close_rect.min_x, close_rect.min_y);

        let mut down = EventRecord::new(crate::event::EventKind::MouseDown, 0, 0);
        down.global_x = global_x;
        down.global_y = global_y;
        system.dispatch(down);
        assert!(system.window_by_id(id).unwrap().controls[0].pressed);

        let mut up = EventRecord::new(crate::event::EventKind::MouseUp, 0, 1);
        up.global_x = global_x;
        up.global_y = global_y;
        system.dispatch(up);
        assert!(!system.window_by_id(id).unwrap().controls[0].pressed);

        let first = system.events.next_event().unwrap();
        assert_eq!(first.what, crate::event::EventKind::MouseDown);
        let second = system.events.next_event().unwrap();
        assert_eq!(second.what, crate::event::EventKind::ControlClicked);
        assert_eq!(second.window_id, Some(id));
    }

    #[test]
    fn mouse_down_off_every_window_leaves_event_unrouted() {
        let (mut system, _mem) = bare_system();
        let w = make_standard_window(&mut system, 0, 0, 50, 50);
        system.add_window(w).unwrap();

        let mut down = EventRecord::new(crate::event::EventKind::MouseDown, 0, 0);
        down.global_x = 9000;
        down.global_y = 9000;
        system.dispatch(down);
        let e = system.events.next_event().unwrap();
        assert_eq!(e.window_id, None);
    }

    #[test]
    fn remove_window_drops_its_queued_events() {
        let (mut system, _mem) = bare_system();
        let w = make_standard_window(&mut system, 0, 0, 50, 50);
        let id = system.add_window(w).unwrap();
        let mut e = EventRecord::new(crate::event::EventKind::UpdateEvt, 0, 0);
        e.window_id = Some(id);
        system.dispatch(e);
        system.remove_window(id).unwrap();
        assert!(system.events.next_event().is_none());
    }
}

//! A windowing and graphics runtime for the Foenix C256/A2560 VICKY video
//! controller family: indexed-color bitmaps, a Mac-style bitmapped font
//! renderer, auto-configuring screens, and a window/control/event/menu
//! desktop built on top of them.
//!
//! `#![no_std]`: this crate runs directly on bare hardware or inside the
//! emulator's bare-metal harness, with no host OS underneath it. `alloc` is
//! required; callers supply the backing memory for both pools via
//! [`allocator::Allocator::init_normal_pool`]/`init_vram_pool`.

#![no_std]

extern crate alloc;

pub mod allocator;
pub mod bitmap;
pub mod config;
pub mod control;
pub mod error;
pub mod event;
pub mod font;
pub mod geometry;
pub mod log;
pub mod menu;
pub mod platform;
pub mod screen;
pub mod system;
pub mod theme;
pub mod window;

pub use error::{SystemInitError, WmError, WmResult};
pub use system::System;

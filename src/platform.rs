//! Machine model detection and per-machine hardware address tables.
//!
//! Grounded on `original_source/lib_sys.c`'s `Sys_AutoDetectMachine` (GABE
//! status register decode, screen-count-per-model table) and
//! `Sys_AutoConfigure` (per-model VICKY/text-RAM/LUT base address table).

use crate::error::SystemInitError;

/// Bits `[7:4]` of the GABE system status register, per
/// `original_source/lib_sys.c`.
const GABE_SYS_STAT_MODEL_SHIFT: u8 = 4;
const GABE_SYS_STAT_MODEL_MASK: u8 = 0x0F;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum MachineModel {
    C256U = 0,
    C256UPlus = 1,
    C256FmX = 2,
    C256GenX = 3,
    A2560U = 4,
    A2560UPlus = 5,
    A2560K = 6,
    A2560X = 7,
}

impl MachineModel {
    fn from_raw(id: u8) -> Option<MachineModel> {
        match id {
            0 => Some(MachineModel::C256U),
            1 => Some(MachineModel::C256UPlus),
            2 => Some(MachineModel::C256FmX),
            3 => Some(MachineModel::C256GenX),
            4 => Some(MachineModel::A2560U),
            5 => Some(MachineModel::A2560UPlus),
            6 => Some(MachineModel::A2560K),
            7 => Some(MachineModel::A2560X),
            _ => None,
        }
    }

    /// Number of independent screen channels this model exposes. Only the
    /// A2560K/X dual-VICKY machines expose two (`original_source/lib_sys.c`,
    /// `Sys_AutoDetectMachine`).
    pub fn num_screens(&self) -> usize {
        match self {
            MachineModel::A2560K | MachineModel::A2560X => 2,
            _ => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoMode {
    Mode640x400,
    Mode640x480,
    Mode800x600,
    Mode1024x768,
}

impl VideoMode {
    pub fn dimensions(&self) -> (i32, i32) {
        match self {
            VideoMode::Mode640x400 => (640, 400),
            VideoMode::Mode640x480 => (640, 480),
            VideoMode::Mode800x600 => (800, 600),
            VideoMode::Mode1024x768 => (1024, 768),
        }
    }
}

/// Base addresses for one screen channel on a given machine.
#[derive(Clone, Copy, Debug)]
pub struct ScreenAddresses {
    pub vicky: usize,
    pub text_ram: usize,
    pub text_attr_ram: usize,
    pub text_font_ram: usize,
    pub text_fore_lut: usize,
    pub text_back_lut: usize,
}

/// Per-channel address tables, one entry per screen the model exposes.
/// C256 machines report the same single-VICKY table for both logical
/// channels; A2560K/X report genuinely distinct A/B tables
/// (`original_source/lib_sys.c`, `Sys_AutoConfigure`).
pub fn screen_addresses(model: MachineModel, channel: usize) -> ScreenAddresses {
    match model {
        MachineModel::C256U | MachineModel::C256UPlus | MachineModel::C256FmX | MachineModel::C256GenX => {
            ScreenAddresses {
                vicky: 0x00B0_0000,
                text_ram: 0x00C0_0000,
                text_attr_ram: 0x00C0_1000,
                text_font_ram: 0x00C0_2000,
                text_fore_lut: 0x00C0_2800,
                text_back_lut: 0x00C0_2840,
            }
        }
        MachineModel::A2560U | MachineModel::A2560UPlus => ScreenAddresses {
            vicky: 0xFEC0_0000,
            text_ram: 0xFEC3_0000,
            text_attr_ram: 0xFEC3_1000,
            text_font_ram: 0xFEC3_2000,
            text_fore_lut: 0xFEC3_2800,
            text_back_lut: 0xFEC3_2840,
        },
        MachineModel::A2560K | MachineModel::A2560X => {
            if channel == 0 {
                ScreenAddresses {
                    vicky: 0xFEC0_0000,
                    text_ram: 0xFEC3_0000,
                    text_attr_ram: 0xFEC3_1000,
                    text_font_ram: 0xFEC3_2000,
                    text_fore_lut: 0xFEC3_2800,
                    text_back_lut: 0xFEC3_2840,
                }
            } else {
                ScreenAddresses {
                    vicky: 0xFED0_0000,
                    text_ram: 0xFED3_0000,
                    text_attr_ram: 0xFED3_1000,
                    text_font_ram: 0xFED3_2000,
                    text_fore_lut: 0xFED3_2800,
                    text_back_lut: 0xFED3_2840,
                }
            }
        }
    }
}

/// Decode the GABE system status register's model field.
pub fn decode_gabe_status(raw: u8) -> Option<MachineModel> {
    MachineModel::from_raw((raw >> GABE_SYS_STAT_MODEL_SHIFT) & GABE_SYS_STAT_MODEL_MASK)
}

/// Read the GABE status register and classify the running machine, failing
/// fatally if the model byte isn't recognized.
///
/// # Safety
/// `gabe_sys_stat_addr` must be the address of the live GABE status register.
pub unsafe fn detect_machine(gabe_sys_stat_addr: usize) -> Result<MachineModel, SystemInitError> {
    let raw = core::ptr::read_volatile(gabe_sys_stat_addr as *const u8);
    decode_gabe_status(raw).ok_or(SystemInitError::UnknownMachine)
}

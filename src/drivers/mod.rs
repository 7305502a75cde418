//! Peripheral drivers: camera remote lines and the manual trigger button.

pub mod button;
pub mod shutter;

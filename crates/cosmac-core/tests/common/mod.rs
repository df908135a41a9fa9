//! Scripted [`HardwareHost`] double shared by the integration suites.

#![allow(dead_code)]

use cosmac_core::{HardwareHost, KeypadGroup};

/// Host with scriptable key state that records every command the core
/// issues.
#[derive(Debug, Default)]
pub struct ScriptedHost {
    /// Key lines currently held down.
    pub pressed: Vec<u8>,
    /// Whether the secondary/interrupt key is held.
    pub secondary_down: bool,
    /// Every `set_output_flag` value, in order.
    pub output_flags: Vec<bool>,
    /// Number of frame-sync commands received.
    pub frame_syncs: usize,
    /// Every `update_display` value, in order.
    pub displayed: Vec<u8>,
    /// Every keypad-group selection, in order.
    pub groups: Vec<KeypadGroup>,
}

impl ScriptedHost {
    pub fn with_keys(pressed: &[u8]) -> Self {
        Self {
            pressed: pressed.to_vec(),
            ..Self::default()
        }
    }

    pub fn press(&mut self, key: u8) {
        if !self.pressed.contains(&key) {
            self.pressed.push(key);
        }
    }

    pub fn release_all(&mut self) {
        self.pressed.clear();
    }
}

impl HardwareHost for ScriptedHost {
    fn read_keyboard(&mut self, key: u8) -> bool {
        self.pressed.contains(&key)
    }

    fn set_output_flag(&mut self, on: bool) {
        self.output_flags.push(on);
    }

    fn frame_sync(&mut self) {
        self.frame_syncs += 1;
    }

    fn read_secondary_key(&mut self) -> bool {
        self.secondary_down
    }

    fn update_display(&mut self, value: u8) {
        self.displayed.push(value);
    }

    fn set_keypad_group(&mut self, group: KeypadGroup) {
        self.groups.push(group);
    }
}

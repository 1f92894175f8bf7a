//! Settings persistence abstractions
//!
//! Provides a trait for the non-volatile key-value store that backs the
//! settings menu. Keys map 1:1 to [`super::types::Presets`] fields. The
//! backend (ESP NVS, flash map, file) lives outside this crate; the trait
//! is synchronous because the control loop is a polling loop.

/// Storage keys for persisted settings
///
/// One key per adjustable preset. The backing implementation decides how
/// keys map to its own namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SettingKey {
    /// RGB mode while active
    ActiveRgb = 0,
    /// RGB mode while inactive
    InactiveRgb = 1,
    /// RGB brightness percentage
    Brightness = 2,
    /// Buzzer pattern on becoming active
    ActiveBuzzer = 3,
    /// Buzzer pattern on becoming inactive
    InactiveBuzzer = 4,
    /// Buzzer volume percentage
    Volume = 5,
    /// Motor speed percentage
    MotorSpeed = 6,
}

impl SettingKey {
    /// All keys, in menu order
    pub const ALL: [SettingKey; 7] = [
        SettingKey::ActiveRgb,
        SettingKey::InactiveRgb,
        SettingKey::Brightness,
        SettingKey::ActiveBuzzer,
        SettingKey::InactiveBuzzer,
        SettingKey::Volume,
        SettingKey::MotorSpeed,
    ];

    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Errors from settings store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Key not present in the store
    NotFound,
    /// Backend read/write failed
    Backend,
}

/// Non-volatile settings store
///
/// All preset values fit in a byte (mode/pattern discriminants and
/// percentages), so the interface is a byte-per-key map. A failed save is
/// not fatal: the RAM cache stays authoritative and the box keeps
/// running (it just forgets the change on reboot).
pub trait SettingsStore {
    /// Read the value stored for a key
    fn load(&mut self, key: SettingKey) -> Result<u8, StoreError>;

    /// Write the value for a key
    fn save(&mut self, key: SettingKey, value: u8) -> Result<(), StoreError>;
}

/// In-memory settings store
///
/// Used by host tests and as the fallback when no backing flash is
/// present (the box then simply loses settings across power cycles).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: [Option<u8>; SettingKey::ALL.len()],
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&mut self, key: SettingKey) -> Result<u8, StoreError> {
        self.values[key.as_u8() as usize].ok_or(StoreError::NotFound)
    }

    fn save(&mut self, key: SettingKey, value: u8) -> Result<(), StoreError> {
        self.values[key.as_u8() as usize] = Some(value);
        Ok(())
    }
}

//! Key bindings - the static join between key codes, clips and key elements

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Platform key code, numbered like the legacy DOM `keyCode` (A = 65)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub const SPACE: KeyCode = KeyCode(32);

    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    pub const fn value(self) -> u16 {
        self.0
    }

    /// Caption printed on the physical key
    pub fn label(self) -> String {
        match self.0 {
            8 => "BKSP".to_string(),
            9 => "TAB".to_string(),
            13 => "ENTER".to_string(),
            32 => "SPACE".to_string(),
            48..=57 | 65..=90 => char::from(self.0 as u8).to_string(),
            112..=123 => format!("F{}", self.0 - 111),
            186 => ";".to_string(),
            187 => "=".to_string(),
            188 => ",".to_string(),
            189 => "-".to_string(),
            190 => ".".to_string(),
            191 => "/".to_string(),
            192 => "`".to_string(),
            219 => "[".to_string(),
            220 => "\\".to_string(),
            221 => "]".to_string(),
            222 => "'".to_string(),
            other => format!("#{}", other),
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a clip slot in the audio engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipId(pub usize);

/// Handle to a key element on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub usize);

/// Errors raised while assembling a kit
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KitError {
    #[error("key code {0} is bound more than once")]
    DuplicateCode(KeyCode),
    #[error("no key element with id {0:?}")]
    UnknownElement(ElementId),
}

/// One key's binding: a key code joined to one clip and one element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub code: KeyCode,
    pub clip: ClipId,
    pub element: ElementId,
    /// Key caption, e.g. "A"
    pub label: String,
    /// Clip display name, e.g. "clap"
    pub sound: String,
}

/// The nine pads of the stock kit, in display order
pub const DEFAULT_KIT: [(u16, &str); 9] = [
    (65, "clap"),
    (83, "hihat"),
    (68, "kick"),
    (70, "openhat"),
    (71, "boom"),
    (72, "ride"),
    (74, "snare"),
    (75, "tom"),
    (76, "tink"),
];

/// Immutable key code lookup table, built once at startup
///
/// Clip and element handles are assigned by declaration position, so the
/// n-th binding owns clip slot n and element n.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    bindings: Vec<Binding>,
    by_code: HashMap<KeyCode, usize>,
}

impl BindingTable {
    /// Build a table from `(code, sound)` pairs in display order
    pub fn new<I, S>(keys: I) -> Result<Self, KitError>
    where
        I: IntoIterator<Item = (KeyCode, S)>,
        S: Into<String>,
    {
        let mut table = Self::default();

        for (code, sound) in keys {
            let index = table.bindings.len();
            if table.by_code.insert(code, index).is_some() {
                return Err(KitError::DuplicateCode(code));
            }
            table.bindings.push(Binding {
                code,
                clip: ClipId(index),
                element: ElementId(index),
                label: code.label(),
                sound: sound.into(),
            });
        }

        Ok(table)
    }

    /// The stock nine-pad kit
    pub fn default_kit() -> Self {
        Self::new(DEFAULT_KIT.iter().map(|&(code, sound)| (KeyCode(code), sound)))
            .unwrap_or_default()
    }

    pub fn lookup(&self, code: KeyCode) -> Option<&Binding> {
        self.by_code.get(&code).map(|&i| &self.bindings[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

//! Kit files - which key plays which clip
//!
//! One binding per line:
//!
//! ```text
//! # code or key = clip path [; sound name]
//! 65 = sounds/clap.wav
//! S  = sounds/hihat.wav ; hat
//! ```
//!
//! Relative clip paths resolve against the kit file's directory. The sound
//! name defaults to the clip's file stem.

use drumkeys_kit::{BindingTable, KeyCode, KitError, DEFAULT_KIT};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading a kit file
#[derive(Error, Debug)]
pub enum KitFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error(transparent)]
    Kit(#[from] KitError),
}

/// One declared binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KitEntry {
    pub code: KeyCode,
    pub path: PathBuf,
    pub sound: String,
}

/// An ordered set of bindings with their clip files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Kit {
    entries: Vec<KitEntry>,
}

impl Kit {
    /// Read a kit file
    pub fn load(path: &Path) -> Result<Self, KitFileError> {
        let content = fs::read_to_string(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&content, base_dir)
    }

    /// The stock nine-pad kit with clips named `<sound>.wav` in `sample_dir`
    pub fn default_in(sample_dir: &Path) -> Self {
        let entries = DEFAULT_KIT
            .iter()
            .map(|&(code, sound)| KitEntry {
                code: KeyCode(code),
                path: sample_dir.join(format!("{}.wav", sound)),
                sound: sound.to_string(),
            })
            .collect();
        Self { entries }
    }

    /// Parse kit file content, resolving relative paths against `base_dir`
    pub fn parse(content: &str, base_dir: &Path) -> Result<Self, KitFileError> {
        let mut entries = Vec::new();
        let mut seen = HashSet::new();

        for (index, raw) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parse_error = |message: &str| KitFileError::Parse {
                line: line_no,
                message: message.to_string(),
            };

            let (key, rest) = line
                .split_once('=')
                .ok_or_else(|| parse_error("expected `key = clip path`"))?;

            let code = parse_key(key.trim())
                .ok_or_else(|| parse_error(&format!("unknown key `{}`", key.trim())))?;

            let (clip, sound) = match rest.split_once(';') {
                Some((clip, sound)) => (clip.trim(), Some(sound.trim())),
                None => (rest.trim(), None),
            };
            if clip.is_empty() {
                return Err(parse_error("missing clip path"));
            }

            if !seen.insert(code) {
                return Err(KitError::DuplicateCode(code).into());
            }

            let path = Path::new(clip);
            let path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                base_dir.join(path)
            };

            let sound = match sound {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or(clip)
                    .to_string(),
            };

            entries.push(KitEntry { code, path, sound });
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[KitEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Binding table in declaration order; entry n owns clip slot n
    pub fn binding_table(&self) -> Result<BindingTable, KitError> {
        BindingTable::new(self.entries.iter().map(|e| (e.code, e.sound.clone())))
    }
}

/// A key is either a numeric code or a single letter or digit
fn parse_key(key: &str) -> Option<KeyCode> {
    if let Ok(code) = key.parse::<u16>() {
        // Single digits are the digit keys, not codes 0-9
        if key.len() == 1 {
            return Some(KeyCode(u16::from(key.as_bytes()[0])));
        }
        return Some(KeyCode(code));
    }

    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Some(KeyCode(u16::from(c.to_ascii_uppercase() as u8)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes_and_letters() {
        let content = "# drums\n65 = clap.wav\ns = hats/hihat.wav ; hat\n\n7 = seven.wav";
        let kit = Kit::parse(content, Path::new("/kits")).unwrap();

        assert_eq!(
            kit.entries(),
            &[
                KitEntry {
                    code: KeyCode(65),
                    path: PathBuf::from("/kits/clap.wav"),
                    sound: "clap".to_string(),
                },
                KitEntry {
                    code: KeyCode(83),
                    path: PathBuf::from("/kits/hats/hihat.wav"),
                    sound: "hat".to_string(),
                },
                KitEntry {
                    code: KeyCode(55),
                    path: PathBuf::from("/kits/seven.wav"),
                    sound: "seven".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_absolute_path_kept() {
        let kit = Kit::parse("K = /samples/kick.wav", Path::new("/kits")).unwrap();
        assert_eq!(kit.entries()[0].path, PathBuf::from("/samples/kick.wav"));
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let result = Kit::parse("A = a.wav\n65 = b.wav", Path::new("."));
        assert!(matches!(
            result,
            Err(KitFileError::Kit(KitError::DuplicateCode(KeyCode(65))))
        ));
    }

    #[test]
    fn test_parse_errors_carry_line() {
        let missing_eq = Kit::parse("# header\nA clap.wav", Path::new("."));
        assert!(matches!(missing_eq, Err(KitFileError::Parse { line: 2, .. })));

        let bad_key = Kit::parse("shift = clap.wav", Path::new("."));
        assert!(matches!(bad_key, Err(KitFileError::Parse { line: 1, .. })));

        let no_clip = Kit::parse("A = ", Path::new("."));
        assert!(matches!(no_clip, Err(KitFileError::Parse { line: 1, .. })));
    }

    #[test]
    fn test_default_kit_paths() {
        let kit = Kit::default_in(Path::new("sounds"));
        assert_eq!(kit.entries().len(), 9);
        assert_eq!(kit.entries()[0].path, PathBuf::from("sounds/clap.wav"));
        assert_eq!(kit.entries()[8].sound, "tink");
    }

    #[test]
    fn test_binding_table_order() {
        let kit = Kit::parse("L = tink.wav\nA = clap.wav", Path::new(".")).unwrap();
        let table = kit.binding_table().unwrap();

        let first = table.iter().next().unwrap();
        assert_eq!(first.code, KeyCode(76));
        assert_eq!(first.sound, "tink");
        assert_eq!(table.lookup(KeyCode(65)).unwrap().clip.0, 1);
    }

    #[test]
    fn test_load_reads_relative_to_file() {
        let dir = std::env::temp_dir().join(format!("drumkeys-kit-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("kit.txt");
        std::fs::write(&path, "D = kick.wav\n").unwrap();

        let kit = Kit::load(&path).unwrap();
        assert_eq!(kit.entries()[0].path, dir.join("kick.wav"));
        assert_eq!(kit.entries()[0].code, KeyCode(68));
    }
}

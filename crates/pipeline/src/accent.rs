//! Accent library and resolver
//!
//! Maps a client-supplied accent identifier to the reference recording
//! used for voice cloning. Unknown identifiers fall back to the default
//! voice; a missing file on disk is reported before any synthesis runs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::PipelineError;

/// Key used when an identifier is not in the library
pub const DEFAULT_ACCENT: &str = "default";

const BUILTIN_ACCENTS: &[(&str, &str)] = &[
    ("aceh", "aksen_aceh_pria.wav"),
    ("bali", "aksen_bali_pria.wav"),
    ("banjar", "aksen_banjar_wanita.wav"),
    ("batak", "aksen_batak_pria.wav"),
    ("betawi", "aksen_betawi_pria.wav"),
    ("jawa", "aksen_jawa_pria.wav"),
    ("maluku", "aksen_maluku_pria.wav"),
    ("melayu", "aksen_melayu_pria.wav"),
    ("minang", "aksen_minang_pria.wav"),
    ("ntt", "aksen_ntt_pria.wav"),
    ("papua", "aksen_papua_pria.wav"),
    ("pontianak", "aksen_pontianak_wanita.wav"),
    ("sulsel", "aksen_sulsel_pria.wav"),
    ("sulut", "aksen_sulut_pria.wav"),
    ("sunda", "aksen_sunda_pria.wav"),
    ("sunda_v2", "aksen_sunda_pria.wav"),
    (DEFAULT_ACCENT, "aksen_default_pria.wav"),
];

/// Immutable accent-id → filename mapping
#[derive(Debug, Clone)]
pub struct AccentLibrary {
    entries: HashMap<String, String>,
}

impl AccentLibrary {
    /// The fixed library shipped with the backend
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_ACCENTS
                .iter()
                .map(|(id, file)| (id.to_string(), file.to_string()))
                .collect(),
        }
    }

    /// Filename for `accent_id`, matched case-insensitively, with the
    /// default accent's file on a miss
    pub fn filename_for(&self, accent_id: &str) -> &str {
        self.entries
            .get(&accent_id.to_lowercase())
            .or_else(|| self.entries.get(DEFAULT_ACCENT))
            .map(String::as_str)
            .unwrap_or(BUILTIN_ACCENTS[BUILTIN_ACCENTS.len() - 1].1)
    }

    pub fn contains(&self, accent_id: &str) -> bool {
        self.entries.contains_key(&accent_id.to_lowercase())
    }

    /// Known identifiers, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AccentLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Resolves accent identifiers to verified reference paths
#[derive(Debug, Clone)]
pub struct AccentResolver {
    library: AccentLibrary,
    reference_dir: PathBuf,
}

impl AccentResolver {
    pub fn new(library: AccentLibrary, reference_dir: impl Into<PathBuf>) -> Self {
        Self {
            library,
            reference_dir: reference_dir.into(),
        }
    }

    pub fn library(&self) -> &AccentLibrary {
        &self.library
    }

    pub fn reference_dir(&self) -> &Path {
        &self.reference_dir
    }

    /// Create the reference directory if it does not exist yet
    pub fn ensure_reference_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.reference_dir)
    }

    /// Path the identifier maps to, without checking the filesystem
    pub fn reference_path(&self, accent_id: &str) -> PathBuf {
        self.reference_dir.join(self.library.filename_for(accent_id))
    }

    /// Resolve `accent_id` to an existing reference recording
    ///
    /// The error carries the identifier exactly as the client sent it.
    pub fn resolve(&self, accent_id: &str) -> Result<PathBuf, PipelineError> {
        if !self.library.contains(accent_id) {
            tracing::debug!(accent_id = %accent_id, "Unknown accent, using the default voice");
        }

        let path = self.reference_path(accent_id);

        if !path.exists() {
            tracing::error!("Reference file not found: {}", path.display());
            return Err(PipelineError::AccentNotFound {
                accent_id: accent_id.to_string(),
                path,
            });
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_accents_case_insensitive() {
        let library = AccentLibrary::builtin();
        assert_eq!(library.filename_for("jawa"), "aksen_jawa_pria.wav");
        assert_eq!(library.filename_for("JAWA"), "aksen_jawa_pria.wav");
        assert_eq!(library.filename_for("Pontianak"), "aksen_pontianak_wanita.wav");
        assert_eq!(library.filename_for("sunda_v2"), library.filename_for("sunda"));
    }

    #[test]
    fn test_unknown_accents_use_default() {
        let library = AccentLibrary::builtin();
        let default_file = library.filename_for(DEFAULT_ACCENT);
        for id in ["unknown_xyz", "", " jawa", "klingon", "DEFAULTS"] {
            assert_eq!(library.filename_for(id), default_file, "id {:?}", id);
        }
    }

    #[test]
    fn test_resolution_is_stable() {
        let library = AccentLibrary::builtin();
        for id in library.ids() {
            let first = library.filename_for(id).to_string();
            let upper = library.filename_for(&id.to_uppercase()).to_string();
            assert_eq!(first, upper);
            assert_eq!(first, library.filename_for(id));
        }
        assert_eq!(library.len(), 17);
    }

    #[test]
    fn test_resolve_missing_file_keeps_requested_id() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = AccentResolver::new(AccentLibrary::builtin(), dir.path());

        match resolver.resolve("JaWa") {
            Err(PipelineError::AccentNotFound { accent_id, path }) => {
                assert_eq!(accent_id, "JaWa");
                assert!(path.ends_with("aksen_jawa_pria.wav"));
            }
            other => panic!("expected AccentNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("aksen_default_pria.wav"), b"RIFF").unwrap();
        let resolver = AccentResolver::new(AccentLibrary::builtin(), dir.path());

        let path = resolver.resolve("unknown_xyz").unwrap();
        assert_eq!(path, dir.path().join("aksen_default_pria.wav"));
    }

    #[test]
    fn test_ensure_reference_dir_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("audio_referensi");
        let resolver = AccentResolver::new(AccentLibrary::builtin(), &nested);

        resolver.ensure_reference_dir().unwrap();
        assert!(nested.is_dir());
    }
}

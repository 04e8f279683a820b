//! Sniff configuration (spec §6).
//!
//! Reading this from a project's ruleset/config file is the host's job; this
//! crate only defines the flags and the two named presets.

/// Which checks the walker runs, and whether structural failures during a
/// pass are swallowed (`false`, the default) or rethrown (`true`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub debug_mode: bool,
    pub check_has_doc_blocks: bool,
    pub check_has_tags: bool,
    pub check_no_misplaced: bool,
    pub check_type_match: bool,
    pub check_style: bool,
    pub check_phpfig: bool,
    pub check_pass_splat: bool,
}

impl Config {
    /// Every check enabled, debug mode off.
    pub fn strict() -> Self {
        Self {
            debug_mode: false,
            check_has_doc_blocks: true,
            check_has_tags: true,
            check_no_misplaced: true,
            check_type_match: true,
            check_style: true,
            check_phpfig: true,
            check_pass_splat: true,
        }
    }

    /// The out-of-the-box preset: only the checks spec §6 names as default.
    pub fn default_preset() -> Self {
        Self {
            debug_mode: false,
            check_has_doc_blocks: false,
            check_has_tags: false,
            check_no_misplaced: true,
            check_type_match: true,
            check_style: false,
            check_phpfig: false,
            check_pass_splat: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_preset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_enables_everything() {
        let c = Config::strict();
        assert!(c.check_has_doc_blocks);
        assert!(c.check_has_tags);
        assert!(c.check_no_misplaced);
        assert!(c.check_type_match);
        assert!(c.check_style);
        assert!(c.check_phpfig);
        assert!(c.check_pass_splat);
        assert!(!c.debug_mode);
    }

    #[test]
    fn default_preset_matches_spec() {
        let c = Config::default_preset();
        assert!(!c.check_has_doc_blocks);
        assert!(!c.check_has_tags);
        assert!(c.check_no_misplaced);
        assert!(c.check_type_match);
        assert!(!c.check_style);
        assert!(!c.check_phpfig);
        assert!(c.check_pass_splat);
    }
}

//! `ReportingShim` (spec §4.6): the sole bridge to the host diagnostic
//! framework. Forwards errors, warnings, fixable warnings, and fix
//! changesets.
//!
//! The trait is the host contract; [`RecordingShim`] is an in-memory
//! implementation for tests (and for any embedder that wants to collect
//! diagnostics rather than stream them to a live host).

use smol_str::SmolStr;

/// Stable diagnostic code identifiers (spec §6/§8).
pub mod codes {
    pub const FUN_PARAM_TYPE: &str = "phpdoc_fun_param_type";
    pub const FUN_PARAM_TYPE_MISMATCH: &str = "phpdoc_fun_param_type_mismatch";
    pub const FUN_RET_TYPE: &str = "phpdoc_fun_ret_type";
    pub const FUN_RET_TYPE_MISMATCH: &str = "phpdoc_fun_ret_type_mismatch";
    pub const VAR_TYPE_STYLE: &str = "phpdoc_var_type_style";
    pub const VAR_TYPE_MISMATCH: &str = "phpdoc_var_type_mismatch";
    pub const TAG_MISPLACED: &str = "phpdoc_tag_misplaced";
    pub const CLASS_PROP_TYPE_PHPFIG: &str = "phpdoc_class_prop_type_phpfig";
    pub const FUN_PARAM_PASS_SPLAT_MISMATCH: &str = "phpdoc_fun_param_pass_splat_mismatch";
    pub const MISSING_DOC_BLOCK: &str = "phpdoc_missing_doc_block";
    pub const MISSING_TAG: &str = "phpdoc_missing_tag";
    pub const DUPLICATE_PARAM_TAG: &str = "phpdoc_duplicate_param_tag";
    pub const MULTIPLE_RETURN_TAGS: &str = "phpdoc_multiple_return_tags";
    pub const PARAM_ORDER_MISMATCH: &str = "phpdoc_param_order_mismatch";
    pub const PARSE_FAILURE: &str = "phpdoc_type_sniff_parse_failure";
}

/// A token pointer into the host's tokenized file, opaque to this crate.
pub type TokenPtr = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: SmolStr,
    pub ptr: TokenPtr,
    pub message: SmolStr,
}

/// The host bridge (spec §4.6). `add_fixable_warning` returns whether the
/// host wants the proposed fix applied, mirroring the sniff-framework
/// convention of letting the host gate autofix under `--fix`.
pub trait ReportingShim {
    fn add_error(&mut self, ptr: TokenPtr, code: &str, message: &str);
    fn add_warning(&mut self, ptr: TokenPtr, code: &str, message: &str);
    fn add_fixable_warning(&mut self, ptr: TokenPtr, code: &str, message: &str) -> bool;

    fn begin_changeset(&mut self);
    fn replace_token(&mut self, ptr: TokenPtr, text: &str);
    fn end_changeset(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedEvent {
    Error(Diagnostic),
    Warning(Diagnostic),
    FixableWarning(Diagnostic),
    BeginChangeset,
    Replace { ptr: TokenPtr, text: SmolStr },
    EndChangeset,
}

/// An in-memory [`ReportingShim`] that records every call, for assertions
/// in tests. `apply_fixes` defaults to `true` — tests exercise the fixable
/// path by default unless told otherwise.
#[derive(Debug, Clone, Default)]
pub struct RecordingShim {
    pub events: Vec<RecordedEvent>,
    pub apply_fixes: bool,
}

impl RecordingShim {
    pub fn new() -> Self {
        RecordingShim {
            events: Vec::new(),
            apply_fixes: true,
        }
    }

    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RecordedEvent::Error(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RecordedEvent::Warning(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.events.iter().any(|e| match e {
            RecordedEvent::Error(d) | RecordedEvent::Warning(d) | RecordedEvent::FixableWarning(d) => {
                d.code == code
            }
            _ => false,
        })
    }
}

impl ReportingShim for RecordingShim {
    fn add_error(&mut self, ptr: TokenPtr, code: &str, message: &str) {
        self.events.push(RecordedEvent::Error(Diagnostic {
            code: SmolStr::new(code),
            ptr,
            message: SmolStr::new(message),
        }));
    }

    fn add_warning(&mut self, ptr: TokenPtr, code: &str, message: &str) {
        self.events.push(RecordedEvent::Warning(Diagnostic {
            code: SmolStr::new(code),
            ptr,
            message: SmolStr::new(message),
        }));
    }

    fn add_fixable_warning(&mut self, ptr: TokenPtr, code: &str, message: &str) -> bool {
        self.events.push(RecordedEvent::FixableWarning(Diagnostic {
            code: SmolStr::new(code),
            ptr,
            message: SmolStr::new(message),
        }));
        self.apply_fixes
    }

    fn begin_changeset(&mut self) {
        self.events.push(RecordedEvent::BeginChangeset);
    }

    fn replace_token(&mut self, ptr: TokenPtr, text: &str) {
        self.events.push(RecordedEvent::Replace {
            ptr,
            text: SmolStr::new(text),
        });
    }

    fn end_changeset(&mut self) {
        self.events.push(RecordedEvent::EndChangeset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_errors_and_warnings_separately() {
        let mut shim = RecordingShim::new();
        shim.add_error(1, codes::FUN_PARAM_TYPE_MISMATCH, "mismatch");
        shim.add_warning(2, codes::VAR_TYPE_STYLE, "style");
        assert_eq!(shim.errors().len(), 1);
        assert_eq!(shim.warnings().len(), 1);
        assert!(shim.has_code(codes::FUN_PARAM_TYPE_MISMATCH));
    }

    #[test]
    fn fixable_warning_honors_apply_fixes_flag() {
        let mut shim = RecordingShim::new();
        shim.apply_fixes = false;
        let wants_fix = shim.add_fixable_warning(1, codes::VAR_TYPE_STYLE, "style");
        assert!(!wants_fix);
    }

    #[test]
    fn changeset_events_are_recorded_in_order() {
        let mut shim = RecordingShim::new();
        shim.begin_changeset();
        shim.replace_token(3, "int");
        shim.end_changeset();
        assert_eq!(
            shim.events,
            vec![
                RecordedEvent::BeginChangeset,
                RecordedEvent::Replace { ptr: 3, text: SmolStr::new("int") },
                RecordedEvent::EndChangeset,
            ]
        );
    }
}

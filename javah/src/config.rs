//! Generator configuration, injected by the caller.

use serde::Deserialize;

/// Settings shared read-only by every class of a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Produce a header unit even for classes without native methods.
    pub emit_for_classes_with_no_natives: bool,
    /// Emit `#define`s for `static final` primitive constants.
    pub emit_constants: bool,
    /// Mangling rules in effect.
    pub abi: JniAbi,
    /// What a failing class does to the rest of the run.
    pub error_policy: ErrorPolicy,
    /// Worker threads; the rayon default when unset.
    pub jobs: Option<usize>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            emit_for_classes_with_no_natives: false,
            emit_constants: true,
            abi: JniAbi::default(),
            error_policy: ErrorPolicy::default(),
            jobs: None,
        }
    }
}

/// Version of the JNI symbol mangling scheme.
///
/// The overload-suffix style and escape width are fixed by the ABI rather
/// than being independent knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JniAbi {
    #[default]
    Jni1,
}

impl JniAbi {
    /// Prefix of every native method symbol.
    pub fn symbol_prefix(self) -> &'static str {
        match self {
            Self::Jni1 => "Java_",
        }
    }

    /// Separator between the short name and the argument signature of an
    /// overloaded native method.
    pub fn overload_separator(self) -> &'static str {
        match self {
            Self::Jni1 => "__",
        }
    }

    /// Number of hex digits following `_0` in an escaped code unit.
    pub fn escape_width(self) -> usize {
        match self {
            Self::Jni1 => 4,
        }
    }
}

/// Whether one class's failure aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Stop at the first failing class (in input order) and return its error.
    #[default]
    FailFast,
    /// Keep going and report failures alongside the generated headers.
    SkipAndReport,
}

#[cfg(test)]
mod tests {
    use super::{ErrorPolicy, GeneratorConfig, JniAbi};

    #[test]
    fn defaults_match_javah() {
        let config = GeneratorConfig::default();
        assert!(!config.emit_for_classes_with_no_natives);
        assert!(config.emit_constants);
        assert_eq!(config.error_policy, ErrorPolicy::FailFast);
        assert_eq!(config.abi.overload_separator(), "__");
        assert_eq!(config.abi.escape_width(), 4);
    }

    #[test]
    fn deserializes_partial_toml() {
        let config: GeneratorConfig = toml::from_str(
            r#"
            emit-for-classes-with-no-natives = true
            error-policy = "skip-and-report"
            jobs = 2
            "#,
        )
        .unwrap();
        assert!(config.emit_for_classes_with_no_natives);
        assert!(config.emit_constants);
        assert_eq!(config.abi, JniAbi::Jni1);
        assert_eq!(config.error_policy, ErrorPolicy::SkipAndReport);
        assert_eq!(config.jobs, Some(2));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(toml::from_str::<GeneratorConfig>("emit-everything = true").is_err());
    }
}

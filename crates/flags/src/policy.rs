use crate::config::{POLICY_ENV_PREFIX, load_config};
use crate::error::FlagError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const RESOURCES_APK_ACTION: &str =
    "com.android.server.connectivity.intent.action.SERVICE_CONNECTIVITY_RESOURCES_APK";
pub const RESOURCES_PACKAGE_SUFFIX: &str = ".connectivity.resources";
pub const TETHERING_MODULE: &str = "com.android.tethering";
const TETHERING_PACKAGE_SUFFIX: &str = ".tethering";
const TETHERING_GO_PACKAGE_SUFFIX: &str = ".go.tethering";
const APEX_ROOT: &str = "/apex";

/// How a module name maps to installed packages.
///
/// A module is found through its companion resources package: the package answering
/// `resources_action`, whose name ends in `resources_package_suffix`. Swapping that suffix for
/// the module rule's `package_suffix` yields the module package; `variant_suffixes` name the
/// alternate builds tried when the primary package is not installed.
///
/// ```toml
/// resources_action = "com.android.server.connectivity.intent.action.SERVICE_CONNECTIVITY_RESOURCES_APK"
/// resources_package_suffix = ".connectivity.resources"
/// apex_root = "/apex"
///
/// [modules."com.android.tethering"]
/// package_suffix = ".tethering"
/// variant_suffixes = [".go.tethering"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModulePolicy {
    pub resources_action: String,
    pub resources_package_suffix: String,
    pub apex_root: PathBuf,
    pub modules: BTreeMap<String, ModuleRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModuleRule {
    pub package_suffix: String,
    pub variant_suffixes: Vec<String>,
}

impl Default for ModulePolicy {
    fn default() -> Self {
        let tethering = ModuleRule {
            package_suffix: TETHERING_PACKAGE_SUFFIX.to_owned(),
            variant_suffixes: vec![TETHERING_GO_PACKAGE_SUFFIX.to_owned()],
        };

        Self {
            resources_action: RESOURCES_APK_ACTION.to_owned(),
            resources_package_suffix: RESOURCES_PACKAGE_SUFFIX.to_owned(),
            apex_root: PathBuf::from(APEX_ROOT),
            modules: BTreeMap::from([(TETHERING_MODULE.to_owned(), tethering)]),
        }
    }
}

impl ModulePolicy {
    /// Loads a policy file with `DEVCFG_POLICY__` environment overrides.
    ///
    /// # Errors
    /// Returns [`FlagError::Config`] for unreadable input and [`FlagError::InvalidPolicy`] if
    /// the result fails [`ModulePolicy::validate`].
    pub fn load(path: Option<impl AsRef<Path>>) -> Result<Self, FlagError> {
        let policy: Self = load_config(path, POLICY_ENV_PREFIX)?;
        policy.validate()?;
        Ok(policy)
    }

    #[must_use]
    pub fn rule(&self, module: &str) -> Option<&ModuleRule> {
        self.modules.get(module)
    }

    /// Mount point of a module's APEX (`<apex_root>/<module>`).
    #[must_use]
    pub fn apex_dir(&self, module: &str) -> PathBuf {
        self.apex_root.join(module)
    }

    /// Candidate module package names derived from the companion resources package:
    /// the primary name first, then each variant in order.
    ///
    /// Returns `None` if `companion` does not carry the resources suffix.
    #[must_use]
    pub fn module_packages(&self, companion: &str, rule: &ModuleRule) -> Option<Vec<String>> {
        let prefix = companion.strip_suffix(&self.resources_package_suffix)?;
        let names = std::iter::once(&rule.package_suffix)
            .chain(&rule.variant_suffixes)
            .map(|suffix| format!("{prefix}{suffix}"))
            .collect();
        Some(names)
    }

    /// Checks that every suffix is usable.
    ///
    /// # Errors
    /// Returns [`FlagError::InvalidPolicy`] naming the offending field.
    pub fn validate(&self) -> Result<(), FlagError> {
        if self.resources_action.trim().is_empty() {
            return Err(invalid("resources_action cannot be empty", None));
        }
        if !is_suffix(&self.resources_package_suffix) {
            return Err(invalid("resources_package_suffix must start with '.'", None));
        }

        for (module, rule) in &self.modules {
            if module.trim().is_empty() {
                return Err(invalid("module name cannot be empty", None));
            }
            if !is_suffix(&rule.package_suffix) {
                return Err(invalid("package_suffix must start with '.'", Some(module.as_str())));
            }
            if rule.package_suffix == self.resources_package_suffix {
                return Err(invalid(
                    "package_suffix cannot equal resources_package_suffix",
                    Some(module.as_str()),
                ));
            }
            if let Some(bad) = rule.variant_suffixes.iter().find(|s| !is_suffix(s)) {
                let message = format!("variant suffix '{bad}' must start with '.'");
                return Err(invalid(message, Some(module.as_str())));
            }
        }

        Ok(())
    }
}

fn is_suffix(suffix: &str) -> bool {
    suffix.len() > 1 && suffix.starts_with('.')
}

fn invalid(message: impl Into<std::borrow::Cow<'static, str>>, module: Option<&str>) -> FlagError {
    FlagError::InvalidPolicy {
        message: message.into(),
        context: module.map(|m| format!("module {m}").into()),
    }
}

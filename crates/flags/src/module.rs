use crate::error::FlagError;
use crate::platform::{MatchFlags, PackageManager, ResolveInfo};
use crate::policy::ModulePolicy;
use tracing::{debug, info, warn};

/// Resolves the version code of the package backing `module`.
///
/// The module is located through its companion resources package (see [`ModulePolicy`]).
/// The primary package name is tried first, then each variant in order; the first installed
/// one wins.
///
/// # Errors
/// Returns [`FlagError::PackageNotFound`] if the module has no rule, no companion package
/// answers the discovery query, the companion name does not carry the resources suffix, or
/// none of the candidate packages is installed.
pub fn module_version(
    packages: &dyn PackageManager,
    policy: &ModulePolicy,
    module: &str,
) -> Result<i64, FlagError> {
    let Some(rule) = policy.rule(module) else {
        return Err(not_found(module, "no rule for module"));
    };

    let activities =
        packages.query_intent_activities(&policy.resources_action, MatchFlags::SYSTEM_ONLY);
    let companion = companion_package(policy, module, &activities)
        .ok_or_else(|| not_found(module, "no companion resources package"))?;

    let Some(candidates) = policy.module_packages(companion, rule) else {
        return Err(not_found(companion, "companion name lacks the resources suffix"));
    };

    let mut last_err = None;
    for (index, name) in candidates.iter().enumerate() {
        match packages.package_info(name, MatchFlags::APEX) {
            Ok(package) => {
                if index > 0 {
                    info!(module, package = %name, "Using variant module package");
                }
                return Ok(package.long_version_code);
            },
            Err(err) => {
                debug!(module, package = %name, error = %err, "Module package lookup failed");
                last_err = Some(err);
            },
        }
    }

    Err(last_err.unwrap_or_else(|| not_found(module, "no candidate packages")))
}

/// Picks the companion package: the first result mounted under the module's APEX directory,
/// falling back to the first result.
fn companion_package<'a>(
    policy: &ModulePolicy,
    module: &str,
    activities: &'a [ResolveInfo],
) -> Option<&'a str> {
    let apex_dir = policy.apex_dir(module);
    if let Some(mounted) = activities.iter().find(|a| a.source_dir.starts_with(&apex_dir)) {
        return Some(&mounted.package_name);
    }

    let first = activities.first()?;
    warn!(
        module,
        package = %first.package_name,
        source_dir = %first.source_dir.display(),
        "Companion package is not under the module's APEX mount"
    );
    Some(&first.package_name)
}

fn not_found(name: &str, context: &'static str) -> FlagError {
    FlagError::PackageNotFound { message: name.to_owned().into(), context: Some(context.into()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PackageInfo;
    use crate::policy::TETHERING_MODULE;
    use std::collections::HashMap;
    use std::path::PathBuf;

    struct StaticPackages {
        versions: HashMap<&'static str, i64>,
        activities: Vec<ResolveInfo>,
    }

    impl PackageManager for StaticPackages {
        fn package_info(&self, name: &str, _: MatchFlags) -> Result<PackageInfo, FlagError> {
            self.versions
                .get(name)
                .map(|&v| PackageInfo { package_name: name.to_owned(), long_version_code: v })
                .ok_or_else(|| FlagError::package_not_found(name.to_owned()))
        }

        fn query_intent_activities(&self, _: &str, _: MatchFlags) -> Vec<ResolveInfo> {
            self.activities.clone()
        }
    }

    fn activity(package: &str, dir: &str) -> ResolveInfo {
        ResolveInfo { package_name: package.to_owned(), source_dir: PathBuf::from(dir) }
    }

    #[test]
    fn prefers_companion_under_apex_mount() {
        let packages = StaticPackages {
            versions: HashMap::from([("com.a.tethering", 1), ("com.b.tethering", 2)]),
            activities: vec![
                activity("com.a.connectivity.resources", "/system/priv-app/Res"),
                activity("com.b.connectivity.resources", "/apex/com.android.tethering/priv-app/Res"),
            ],
        };

        let version = module_version(&packages, &ModulePolicy::default(), TETHERING_MODULE);
        assert_eq!(version.ok(), Some(2));
    }

    #[test]
    fn falls_back_to_first_companion() {
        let packages = StaticPackages {
            versions: HashMap::from([("com.a.tethering", 1)]),
            activities: vec![activity("com.a.connectivity.resources", "/system/priv-app/Res")],
        };

        let version = module_version(&packages, &ModulePolicy::default(), TETHERING_MODULE);
        assert_eq!(version.ok(), Some(1));
    }

    #[test]
    fn tries_variants_in_order() {
        let packages = StaticPackages {
            versions: HashMap::from([("com.a.go.tethering", 5)]),
            activities: vec![activity("com.a.connectivity.resources", "/apex/com.android.tethering/x")],
        };

        let version = module_version(&packages, &ModulePolicy::default(), TETHERING_MODULE);
        assert_eq!(version.ok(), Some(5));
    }

    #[test]
    fn missing_pieces_are_not_found() {
        let policy = ModulePolicy::default();
        let empty = StaticPackages { versions: HashMap::new(), activities: vec![] };

        let err = module_version(&empty, &policy, TETHERING_MODULE).unwrap_err();
        assert!(err.is_not_found());
        assert!(module_version(&empty, &policy, "com.android.unknown").unwrap_err().is_not_found());

        let wrong_suffix = StaticPackages {
            versions: HashMap::from([("com.a.tethering", 1)]),
            activities: vec![activity("com.a.resources", "/apex/com.android.tethering/x")],
        };
        assert!(module_version(&wrong_suffix, &policy, TETHERING_MODULE).is_err());

        let uninstalled = StaticPackages {
            versions: HashMap::new(),
            activities: vec![activity("com.a.connectivity.resources", "/apex/com.android.tethering/x")],
        };
        let err = module_version(&uninstalled, &policy, TETHERING_MODULE).unwrap_err();
        assert!(matches!(err, FlagError::PackageNotFound { .. }));
    }
}

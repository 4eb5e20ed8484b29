use crate::args::Command;
use anyhow::{Result, bail};
use devcfg_flags::resources::{res_boolean, res_integer};
use devcfg_flags::{AppContext, FeatureTarget, FlagResolver};
use std::io::Write;

/// Evaluates `command` and writes the result as a single line to `out`.
pub(crate) fn execute(
    command: &Command,
    ctx: &dyn AppContext,
    flags: &FlagResolver,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Get { namespace, key, default } => {
            let value = match (flags.property(namespace, key), default) {
                (Some(value), _) => value,
                (None, Some(default)) => default.clone(),
                (None, None) => bail!("Flag {namespace}/{key} is not set"),
            };
            writeln!(out, "{value}")?;
        },
        Command::Int { namespace, key, default, min, max } => {
            let value = match (min, max) {
                (Some(min), Some(max)) => flags.int_in_range(namespace, key, *min..=*max, *default),
                _ => flags.int(namespace, key, *default),
            };
            writeln!(out, "{value}")?;
        },
        Command::Bool { namespace, key, default } => {
            writeln!(out, "{}", flags.boolean(namespace, key, *default))?;
        },
        Command::Feature { namespace, key, module, default_enabled } => {
            let target = module.as_deref().map_or(FeatureTarget::OwnPackage, FeatureTarget::Module);
            let enabled = flags.feature_enabled(ctx, namespace, key, target, *default_enabled);
            writeln!(out, "{enabled}")?;
        },
        Command::ResBool { id, default } => {
            writeln!(out, "{}", res_boolean(ctx, *id, *default))?;
        },
        Command::ResInt { id, default } => {
            writeln!(out, "{}", res_integer(ctx, *id, *default))?;
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use devcfg_flags::{ResourceId, TETHERING_MODULE};
    use devcfg_profile::{ActivityEntry, Device, DeviceProfile, PackageEntry, ResourceEntry};
    use std::collections::BTreeMap;

    fn device() -> Device {
        let flags = BTreeMap::from([(
            "connectivity".to_owned(),
            BTreeMap::from([
                ("gate".to_owned(), "28".to_owned()),
                ("retries".to_owned(), "12".to_owned()),
                ("probe".to_owned(), "TRUE".to_owned()),
            ]),
        )]);
        let profile = DeviceProfile {
            package_name: "com.example.app".to_owned(),
            flags,
            packages: vec![
                PackageEntry { name: "com.example.app".to_owned(), version: 30, apex: false },
                PackageEntry { name: "com.x.tethering".to_owned(), version: 10, apex: true },
            ],
            activities: vec![ActivityEntry {
                action: devcfg_flags::RESOURCES_APK_ACTION.to_owned(),
                package_name: "com.x.connectivity.resources".to_owned(),
                source_dir: "/apex/com.android.tethering/priv-app/Res".into(),
                system: true,
            }],
            resources: vec![ResourceEntry { id: 7, boolean: Some(true), integer: None }],
        };
        Device::from_profile(profile).unwrap()
    }

    fn run(device: &Device, command: Command) -> Result<String> {
        let flags = FlagResolver::builder().store(device.store()).build()?;
        let mut out = Vec::new();
        execute(&command, device, &flags, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    fn names(namespace: &str, key: &str) -> (String, String) {
        (namespace.to_owned(), key.to_owned())
    }

    #[test]
    fn flag_commands_print_values() {
        let device = device();
        let (namespace, key) = names("connectivity", "retries");

        let int = Command::Int { namespace, key, default: -1, min: Some(0), max: Some(10) };
        assert_eq!(run(&device, int).unwrap(), "-1\n");

        let (namespace, key) = names("connectivity", "probe");
        let boolean = Command::Bool { namespace, key, default: false };
        assert_eq!(run(&device, boolean).unwrap(), "true\n");

        let (namespace, key) = names("connectivity", "missing");
        let get = Command::Get { namespace, key, default: Some("fallback".to_owned()) };
        assert_eq!(run(&device, get).unwrap(), "fallback\n");

        let (namespace, key) = names("connectivity", "missing");
        assert!(run(&device, Command::Get { namespace, key, default: None }).is_err());
    }

    #[test]
    fn feature_command_targets_modules() {
        let device = device();

        let (namespace, key) = names("connectivity", "gate");
        let own = Command::Feature { namespace, key, module: None, default_enabled: false };
        assert_eq!(run(&device, own).unwrap(), "true\n");

        let (namespace, key) = names("connectivity", "gate");
        let module = Command::Feature {
            namespace,
            key,
            module: Some(TETHERING_MODULE.to_owned()),
            default_enabled: true,
        };
        assert_eq!(run(&device, module).unwrap(), "false\n");
    }

    #[test]
    fn resource_commands_fall_back() {
        let device = device();

        let res_bool = Command::ResBool { id: ResourceId(7), default: false };
        assert_eq!(run(&device, res_bool).unwrap(), "true\n");

        let res_int = Command::ResInt { id: ResourceId(7), default: 3 };
        assert_eq!(run(&device, res_int).unwrap(), "3\n");
    }
}

use std::io::Write;
use tempfile::NamedTempFile;

pub const PROFILE: &str = r#"
package_name = "test.package.name"

[flags.connectivity]
experiment_flag = "28"
retry_count = 5
probe_enabled = "true"

[[packages]]
name = "test.package.name"
version = 290000000

[[packages]]
name = "com.prefix.android.tethering"
version = 290000000
apex = true

[[activities]]
action = "com.android.server.connectivity.intent.action.SERVICE_CONNECTIVITY_RESOURCES_APK"
package_name = "com.prefix.android.connectivity.resources"
source_dir = "/apex/com.android.tethering/priv-app/ServiceConnectivityResources@version"

[[resources]]
id = 0x7f050001
boolean = true

[[resources]]
id = 0x7f060001
integer = 12
"#;

/// Writes `contents` to a temporary `.toml` file.
/// # Panics
/// * If the temporary file cannot be written.
#[must_use]
pub fn profile_file(contents: &str) -> NamedTempFile {
    let mut file =
        tempfile::Builder::new().suffix(".toml").tempfile().expect("Failed to create profile file");
    file.write_all(contents.as_bytes()).expect("Failed to write profile file");
    file
}

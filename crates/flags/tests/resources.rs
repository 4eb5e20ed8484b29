pub mod fixtures;

use devcfg_flags::ResourceId;
use devcfg_flags::resources::{res_boolean, res_integer};
use fixtures::*;

const ENABLED: ResourceId = ResourceId(0x7f05_0001);
const RETRIES: ResourceId = ResourceId(0x7f06_0001);
const MISSING: ResourceId = ResourceId(0x7f00_0000);

fn device_with_resources() -> FakeContext {
    let mut ctx = setup_device();
    ctx.resources.booleans.insert(ENABLED, false);
    ctx.resources.integers.insert(RETRIES, 3);
    ctx
}

#[test]
fn test_present_resources_win_over_defaults() {
    let ctx = device_with_resources();

    assert!(!res_boolean(&ctx, ENABLED, true));
    assert_eq!(res_integer(&ctx, RETRIES, 10), 3);
}

#[test]
fn test_missing_resources_return_defaults() {
    let ctx = device_with_resources();

    assert!(res_boolean(&ctx, MISSING, true));
    assert!(!res_boolean(&ctx, MISSING, false));
    assert_eq!(res_integer(&ctx, MISSING, 10), 10);
    assert_eq!(res_integer(&ctx, ENABLED, -1), -1, "A boolean id is not an integer resource");
}

//! Selection of the logcat lines that carry power-state markers.

/// Tag of the doze (device idle) controller.
pub const IDLE_CONTROLLER_TAG: &str = "DeviceIdleController:";

/// Tag of the power manager, which logs screen wake and sleep.
pub const POWER_MANAGER_TAG: &str = "PowerManagerService:";

/// Returns the trimmed, non-blank lines mentioning either tag, in input order.
///
/// Timestamps are not validated here; malformed lines are dropped later.
pub fn select_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| line.contains(IDLE_CONTROLLER_TAG) || line.contains(POWER_MANAGER_TAG))
        .collect()
}

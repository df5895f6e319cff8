//! Simulated install/uninstall progression

use fakedm_config::constants::MAX_PROGRESS;
use fakedm_types::{Package, PackageStatus};

/// Move a package one poll further through its current transition
///
/// Progress grows by `step` (capped at 100). Once it reaches 100 the
/// transition is finalized in the same poll: the status settles, the size
/// moves to the field matching the new resting state (unless it is already
/// there), and progress returns to 0. Packages at rest are left untouched.
pub fn advance(package: &mut Package, step: u32) {
    if !package.is_transitioning() {
        return;
    }

    if package.progress < MAX_PROGRESS {
        package.progress = package.progress.saturating_add(step).min(MAX_PROGRESS);
    }

    if package.progress >= MAX_PROGRESS {
        finish(package);
    }
}

fn finish(package: &mut Package) {
    // A transition that starts from its own end state has nothing to move.
    match package.status {
        PackageStatus::Installing if package.download_size > 0 => {
            package.installed_size = package.download_size;
            package.download_size = 0;
        }
        PackageStatus::Uninstalling if package.installed_size > 0 => {
            package.download_size = package.installed_size;
            package.installed_size = 0;
        }
        _ => {}
    }

    package.status = package.status.settled();
    package.progress = 0;
}

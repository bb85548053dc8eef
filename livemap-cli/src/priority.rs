//! Process scheduling priority

/// Set the nice value of this process; failure is logged, not fatal
#[cfg(unix)]
pub fn raise_priority(nice: i32) {
    if nice == 0 {
        return;
    }

    // SAFETY: setpriority only reads its integer arguments
    let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, nice) };
    if rc == 0 {
        log::info!("Scheduling priority set to {}", nice);
    } else {
        log::warn!(
            "Failed to set scheduling priority to {}: {}",
            nice,
            std::io::Error::last_os_error()
        );
    }
}

#[cfg(not(unix))]
pub fn raise_priority(nice: i32) {
    log::debug!("Scheduling priority {} not supported on this platform", nice);
}

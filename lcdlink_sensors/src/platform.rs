//! Producer liveness checks.
//!
//! The daemon must distinguish "producer process not running" from "region
//! unavailable": when the producer is down, no open is attempted at all.

use std::fs;
use std::path::Path;

/// Maximum length of a `/proc/<pid>/comm` entry (kernel truncates there).
const COMM_MAX: usize = 15;

/// Check whether a process with the given executable name is running.
///
/// Scans `/proc/*/comm`. The kernel truncates comm to 15 bytes, so a
/// truncated prefix of `name` also counts as a match.
pub fn producer_running(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }

    let Ok(entries) = fs::read_dir("/proc") else {
        return false;
    };

    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let Some(pid_str) = file_name.to_str() else {
            continue;
        };
        if !pid_str.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let comm_path = Path::new("/proc").join(pid_str).join("comm");
        let Ok(comm) = fs::read_to_string(&comm_path) else {
            continue;
        };
        if comm_matches(comm.trim_end(), name) {
            return true;
        }
    }

    false
}

/// Check if a process with the given pid is alive using `kill(pid, 0)`.
pub fn pid_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    // Null signal tests for existence without delivering anything.
    match kill(Pid::from_raw(pid as i32), None) {
        Ok(_) => true,
        Err(nix::Error::EPERM) => true, // exists, but not ours to signal
        Err(_) => false,
    }
}

fn comm_matches(comm: &str, name: &str) -> bool {
    comm == name || (comm.len() == COMM_MAX && name.starts_with(comm))
}

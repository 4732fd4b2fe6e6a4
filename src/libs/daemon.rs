//! Lifecycle of the background process that hosts the alarm.
//!
//! The alarm is created once: [`spawn`] starts a detached process only when
//! no live one is recorded in the PID file. The process runs the alarm until
//! it receives a termination signal.

use crate::api::browser::DevToolsBrowser;
use crate::libs::alarm::{Alarm, AlarmHandler};
use crate::libs::config::Config;
use crate::libs::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::libs::notifier::ConsoleNotifier;
use crate::libs::session::TabSession;
use crate::libs::storage::Store;
use crate::{msg_bail_anyhow, msg_error, msg_error_anyhow, msg_info};
use anyhow::Result;
use std::time::Duration;

pub const PID_FILE: &str = "keka-clicker-alarm.pid";

/// Argument the detached child is started with.
pub const DAEMON_RUN_ARG: &str = "--daemon-run";

/// Runs the alarm until SIGTERM/SIGINT (Ctrl-C on Windows).
///
/// Claims the PID file first, so a second timer cannot start while this one
/// is alive.
pub async fn run_with_signal_handling() -> Result<()> {
    claim_pid()?;
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate()).map_err(|e| msg_error_anyhow!(Message::FailedToCreateSignalHandler(e.to_string())))?;
        let mut sigint = signal(SignalKind::interrupt()).map_err(|e| msg_error_anyhow!(Message::FailedToCreateSignalHandler(e.to_string())))?;
        tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => {
                    msg_info!(Message::AlarmReceivedSigterm);
                }
                _ = sigint.recv() => {
                    msg_info!(Message::AlarmReceivedSigint);
                }
            }

            let _ = shutdown_tx.send(());
        });
    }

    #[cfg(windows)]
    {
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    msg_info!(Message::AlarmReceivedCtrlC);
                }
                Err(e) => {
                    msg_error!(Message::CtrlCListenFailed(e.to_string()));
                }
            }

            let _ = shutdown_tx.send(());
        });
    }

    #[cfg(not(any(unix, windows)))]
    {
        drop(shutdown_tx);
        crate::msg_warning!(Message::SignalHandlingNotSupported);
    }

    let alarm_handle = tokio::spawn(async move { run_alarm().await.map_err(|e| e.to_string()) });

    tokio::select! {
        result = alarm_handle => {
            match result {
                Ok(Ok(())) => msg_info!(Message::AlarmExited),
                Ok(Err(e)) => msg_error!(Message::AlarmError(e)),
                Err(e) => msg_error!(Message::AlarmTaskPanicked(e.to_string())),
            }
        }
        _ = shutdown_rx => {
            msg_info!(Message::AlarmShuttingDown);
        }
    }

    release_pid()
}

/// Records the current process as the one running the alarm.
///
/// Fails when a different live process is already recorded. Claiming again
/// from the recorded process is a no-op, which is how the detached child
/// takes over the PID its parent wrote.
pub fn claim_pid() -> Result<()> {
    let pid = std::process::id();
    if let Some(running) = running_pid()? {
        if running != pid {
            msg_bail_anyhow!(Message::AlarmAlreadyRunning(running));
        }
    }
    std::fs::write(DataStorage::new().get_path(PID_FILE)?, pid.to_string())?;
    Ok(())
}

/// Removes the PID file if it still names the current process.
pub fn release_pid() -> Result<()> {
    let pid_path = DataStorage::new().get_path(PID_FILE)?;
    if std::fs::read_to_string(&pid_path).is_ok_and(|pid| pid.trim() == std::process::id().to_string()) {
        std::fs::remove_file(&pid_path)?;
    }
    Ok(())
}

/// Runs the alarm in the current process.
pub async fn run_alarm() -> Result<()> {
    let devtools_url = Config::read()?.devtools_url();
    let handler = AlarmHandler::new(Store::new()?, ConsoleNotifier);
    Alarm::new().run(&handler, || DevToolsBrowser::new(&devtools_url), TabSession::new()).await;
    Ok(())
}

/// PID of the live alarm process, if any. Stale PID files are removed.
pub fn running_pid() -> Result<Option<u32>> {
    let pid_path = DataStorage::new().get_path(PID_FILE)?;
    if !pid_path.exists() {
        return Ok(None);
    }

    let pid = match std::fs::read_to_string(&pid_path)?.trim().parse::<u32>() {
        Ok(pid) => pid,
        Err(_) => {
            let _ = std::fs::remove_file(&pid_path);
            return Ok(None);
        }
    };
    if process_exists(pid)? {
        Ok(Some(pid))
    } else {
        let _ = std::fs::remove_file(&pid_path);
        Ok(None)
    }
}

/// Starts the alarm as a detached background process unless one is running.
pub fn spawn() -> Result<()> {
    if let Some(pid) = running_pid()? {
        msg_info!(Message::AlarmAlreadyRunning(pid));
        return Ok(());
    }

    let pid_path = DataStorage::new().get_path(PID_FILE)?;
    let current_exe = std::env::current_exe().map_err(|e| msg_error_anyhow!(Message::FailedToGetCurrentExecutable(e.to_string())))?;
    let mut command = std::process::Command::new(current_exe);
    command
        .args(["alarm", DAEMON_RUN_ARG])
        .env("KEKA_CLICKER_DEBUG", "1")
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // SAFETY: setsid is async-signal-safe and touches no parent state.
        unsafe {
            command.pre_exec(|| {
                nix::unistd::setsid()?;
                Ok(())
            });
        }
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x08000000;
        command.creation_flags(CREATE_NO_WINDOW);
    }

    #[cfg(not(any(unix, windows)))]
    {
        msg_bail_anyhow!(Message::DaemonModeNotSupported);
    }

    let child = command.spawn()?;
    let pid = child.id();
    std::fs::write(pid_path, pid.to_string())?;
    msg_info!(Message::AlarmStarted(pid));
    Ok(())
}

/// Stops the alarm process. Not running is not an error.
pub fn stop() -> Result<()> {
    let Some(pid) = running_pid()? else {
        msg_info!(Message::AlarmNotRunning);
        return Ok(());
    };

    let killed = kill_process(pid)?;
    let pid_path = DataStorage::new().get_path(PID_FILE)?;
    let _ = std::fs::remove_file(pid_path);

    if killed {
        msg_info!(Message::AlarmStopped(pid));
        Ok(())
    } else {
        msg_bail_anyhow!(Message::AlarmFailedToStop(pid));
    }
}

#[cfg(unix)]
fn process_exists(pid: u32) -> Result<bool> {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return Ok(false);
    };
    match kill(Pid::from_raw(raw), None) {
        Ok(()) | Err(Errno::EPERM) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(windows)]
fn process_exists(pid: u32) -> Result<bool> {
    use winapi::um::handleapi::CloseHandle;
    use winapi::um::processthreadsapi::OpenProcess;
    use winapi::um::winnt::SYNCHRONIZE;

    unsafe {
        let handle = OpenProcess(SYNCHRONIZE, 0, pid);
        if handle.is_null() {
            return Ok(false);
        }
        CloseHandle(handle);
        Ok(true)
    }
}

#[cfg(not(any(unix, windows)))]
fn process_exists(_pid: u32) -> Result<bool> {
    Ok(false)
}

#[cfg(windows)]
fn kill_process(pid: u32) -> Result<bool> {
    use winapi::um::errhandlingapi::GetLastError;
    use winapi::um::handleapi::CloseHandle;
    use winapi::um::processthreadsapi::{OpenProcess, TerminateProcess};
    use winapi::um::winnt::PROCESS_TERMINATE;

    unsafe {
        let handle = OpenProcess(PROCESS_TERMINATE, 0, pid);
        if handle.is_null() {
            let error = GetLastError();
            if error == 87 {
                // ERROR_INVALID_PARAMETER: no such process
                return Ok(false);
            }
            msg_bail_anyhow!(Message::FailedToOpenProcess(error));
        }

        let result = TerminateProcess(handle, 0);
        CloseHandle(handle);

        if result == 0 {
            let error = GetLastError();
            msg_bail_anyhow!(Message::FailedToTerminateProcess(error));
        }
        std::thread::sleep(Duration::from_millis(100));
        Ok(true)
    }
}

#[cfg(unix)]
fn kill_process(pid: u32) -> Result<bool> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    if !process_exists(pid)? {
        return Ok(false);
    }
    // process_exists rejected PIDs that do not fit
    let target = Pid::from_raw(pid as i32);

    kill(target, Signal::SIGTERM)?;

    for _ in 0..10 {
        std::thread::sleep(Duration::from_millis(100));
        if !process_exists(pid)? {
            return Ok(true);
        }
    }

    let _ = kill(target, Signal::SIGKILL);
    std::thread::sleep(Duration::from_millis(100));
    Ok(true)
}

#[cfg(not(any(unix, windows)))]
fn kill_process(_pid: u32) -> Result<bool> {
    msg_bail_anyhow!(Message::ProcessTerminationNotSupported);
}

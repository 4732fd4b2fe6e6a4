#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // === CONFIG MESSAGES ===
    ConfigSaved,
    ConfigDeleted,
    PromptSelectModules,
    ConfigModuleKeka,
    ConfigModuleAutoClock,
    ConfigModuleBrowser,
    PromptSubdomain,
    SubdomainInvalid,
    SubdomainNotSet,
    PromptDevToolsUrl,
    PromptClockInTime,
    PromptClockOutTime,
    PromptClockInEnabled(String),  // 12-hour time
    PromptClockOutEnabled(String), // 12-hour time
    TimeInvalid(String),
    AutoClockSameTimes,

    // === STORE MESSAGES ===
    StoreValue(String, String), // key, value
    StoreValueSaved(String),
    InvalidStoreValue(String, String), // key, expected

    // === BROWSER TAB MESSAGES ===
    TabOpening(String),
    TabRegistered(String),
    TabClosed(String),
    TabClosingOnDisconnect(String),
    TabOpenFailed,
    TabOpenFailedWithReason(String),
    TabCloseFailed(String, String), // tab, error
    TabLoadTimeout(u64),             // millis
    DevToolsUnreachable(String, String), // endpoint, error
    DevToolsConnectionClosed,
    DevToolsCommandFailed(String, String), // method, error

    // === TOKEN MESSAGES ===
    TokenNotFound(u64), // millis
    TokenRefreshed,
    TokenRefreshFailed,
    TokenValid,
    TokenInvalid,

    // === ATTENDANCE MESSAGES ===
    AttendanceSummaryEmpty,
    AttendanceRecordNotFound(String), // date
    PunchIn,
    PunchOut,
    ClockedTime(String),
    StatusClockedIn,
    StatusClockedOut,
    StatusError,
    StatusFetchFailed(String),
    TimeFetchFailed(String),
    ClockToggleFailed(String),
    Interrupted,

    // === NOTIFICATION MESSAGES ===
    ClockOutReminderTitle,
    ClockOutReminderMessage,
    ClockOutReminderAction,
    AutoClockTitle,
    AutoClockedIn(String),  // 12-hour time
    AutoClockedOut(String), // 12-hour time
    Notification(String, String), // title, message
    NotificationAction(String),

    // === ALARM MESSAGES ===
    AlarmScheduled(String, u64), // name, period secs
    AlarmFired(String),
    AlarmClientFailed(String),
    ReminderCheckFailed(String),
    AutoClockFailed(String),
    AlarmStarted(u32),
    AlarmStopped(u32),
    AlarmAlreadyRunning(u32),
    AlarmNotRunning,
    AlarmFailedToStop(u32),
    AlarmRunningInForeground,
    AlarmExited,
    AlarmShuttingDown,
    AlarmError(String),
    AlarmTaskPanicked(String),
    AlarmReceivedSigterm,
    AlarmReceivedSigint,
    AlarmReceivedCtrlC,

    // === PROCESS MESSAGES ===
    FailedToCreateSignalHandler(String),
    CtrlCListenFailed(String),
    SignalHandlingNotSupported,
    FailedToGetCurrentExecutable(String),
    DaemonModeNotSupported,
    FailedToOpenProcess(u32),
    FailedToTerminateProcess(u32),
    ProcessTerminationNotSupported,
}

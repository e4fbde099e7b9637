use std::fmt;

/// Operator interrupts the render queue listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorSignal {
    /// Ctrl-C.
    Interrupt,
    /// Termination request (SIGTERM, or console close on Windows).
    Terminate,
    /// SIGHUP, Unix only.
    Hangup,
    /// Ctrl-Break, Windows only.
    Break,
}

/// The one signal that skips the current job instead of aborting the queue.
#[cfg(windows)]
pub const SKIP_SIGNAL: OperatorSignal = OperatorSignal::Break;
#[cfg(not(windows))]
pub const SKIP_SIGNAL: OperatorSignal = OperatorSignal::Hangup;

/// Every signal the controller binds a handler to on this platform.
pub const TRAPPED_SIGNALS: [OperatorSignal; 3] = [
    OperatorSignal::Interrupt,
    OperatorSignal::Terminate,
    SKIP_SIGNAL,
];

impl OperatorSignal {
    pub fn name(self) -> &'static str {
        match self {
            OperatorSignal::Interrupt => "SIGINT",
            OperatorSignal::Terminate => "SIGTERM",
            OperatorSignal::Hangup => "SIGHUP",
            OperatorSignal::Break => "SIGBREAK",
        }
    }

    pub fn is_skip(self) -> bool {
        self == SKIP_SIGNAL
    }
}

impl fmt::Display for OperatorSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

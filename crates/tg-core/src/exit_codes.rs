//! Process exit codes.
//!
//! Scripts branch on these, so values never change once published:
//! `0`/`1` report the analysis outcome, `10..20` mean the caller can fix
//! something, `20..` mean trendguard itself failed.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Nothing reached a terminal phase.
    Clean = 0,
    /// At least one analyzed trend reached a terminal phase.
    DeclineDetected = 1,

    ArgsError = 10,
    /// Model file missing, unparseable or rejected by validation.
    ConfigError = 11,
    /// Observations unreadable or shaped wrong for the model.
    InputError = 12,

    InternalError = 20,
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Stable name carried in the `error.code` field of error documents.
    pub fn code_name(self) -> &'static str {
        match self {
            Self::Clean => "OK_CLEAN",
            Self::DeclineDetected => "OK_DECLINE",
            Self::ArgsError => "ERR_ARGS",
            Self::ConfigError => "ERR_CONFIG",
            Self::InputError => "ERR_INPUT",
            Self::InternalError => "ERR_INTERNAL",
            Self::IoError => "ERR_IO",
        }
    }

    /// True when the caller, not trendguard, has to act.
    pub fn is_caller_fault(self) -> bool {
        (10..20).contains(&self.as_i32())
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        // All published codes fit in a u8.
        std::process::ExitCode::from(code.as_i32() as u8)
    }
}

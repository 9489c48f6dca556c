use std::path::PathBuf;
use thiserror::Error;

/// Failures that callers need to tell apart.
///
/// Everything else (network, decode, filesystem) travels as a
/// context-wrapped [`anyhow::Error`]; these variants ride inside it and can
/// be recovered with `err.downcast_ref::<GbeError>()`.
#[derive(Debug, Error)]
pub enum GbeError {
    /// The platform key is not in the profile table.
    #[error("invalid platform: '{name}'. Valid platforms: {}", .valid.join(", "))]
    UnknownPlatform { name: String, valid: Vec<String> },

    /// An archive format outside the two supported kinds.
    #[error("unsupported archive format: {0}")]
    UnsupportedFormat(String),

    /// The cached patch binary is absent, so there is nothing to apply.
    #[error("source file not found: '{}'", .0.display())]
    MissingSource(PathBuf),

    /// No release asset carries the suffix for this platform group.
    #[error("failed to find {group} download URL")]
    DownloadUrlNotFound { group: String },

    /// An external program could not be started at all.
    #[error("failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// An external program ran and exited unsuccessfully.
    #[error("command failed: {program} (exit status: {})\noutput: {output}", .status.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    CommandFailed {
        program: String,
        status: Option<i32>,
        output: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_platform_lists_choices() {
        let e = GbeError::UnknownPlatform {
            name: "macos".into(),
            valid: vec!["linux".into(), "win32".into(), "win64".into()],
        };
        assert_eq!(
            e.to_string(),
            "invalid platform: 'macos'. Valid platforms: linux, win32, win64"
        );
    }

    #[test]
    fn command_failed_shows_status_and_output() {
        let e = GbeError::CommandFailed {
            program: "7z".into(),
            status: Some(2),
            output: "Can not open the file as archive".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("7z"));
        assert!(msg.contains("exit status: 2"));
        assert!(msg.contains("Can not open"));
    }
}

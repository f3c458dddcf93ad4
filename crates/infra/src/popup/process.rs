//! Process-backed popup launcher
//!
//! The consent URL is handed to a configured command (`xdg-open {url}` and
//! friends). When `track_process` is set the child itself is treated as the
//! popup window, which suits a dedicated browser instance (`chromium --app=...`).

use std::process::{Child, Command, Stdio};

use carcare_core::{PopupError, PopupHandle, PopupLauncher};
use carcare_domain::{CarCareError, PopupConfig, Result};
use tracing::{debug, warn};

const URL_PLACEHOLDER: &str = "{url}";

#[derive(Debug, Clone)]
pub struct ProcessPopupLauncher {
    program: String,
    args: Vec<String>,
    track_process: bool,
}

impl ProcessPopupLauncher {
    pub fn new(config: &PopupConfig) -> Result<Self> {
        let (program, args) = config
            .command
            .split_first()
            .ok_or_else(|| CarCareError::Config("popup.command must not be empty".into()))?;

        if program.trim().is_empty() {
            return Err(CarCareError::Config("popup.command program is blank".into()));
        }

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            track_process: config.track_process,
        })
    }

    /// Arguments with `{url}` substituted; appended when no placeholder exists.
    fn arguments(&self, url: &str) -> Vec<String> {
        let mut args: Vec<String> =
            self.args.iter().map(|arg| arg.replace(URL_PLACEHOLDER, url)).collect();
        if !self.args.iter().any(|arg| arg.contains(URL_PLACEHOLDER)) {
            args.push(url.to_string());
        }
        args
    }
}

impl PopupLauncher for ProcessPopupLauncher {
    fn open(&self, url: &str) -> std::result::Result<Box<dyn PopupHandle>, PopupError> {
        let child = Command::new(&self.program)
            .args(self.arguments(url))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| PopupError::Blocked(format!("{}: {err}", self.program)))?;

        debug!(
            program = %self.program,
            pid = child.id(),
            tracked = self.track_process,
            "popup launched"
        );
        Ok(Box::new(ProcessPopup { child, tracked: self.track_process, closed: false }))
    }
}

struct ProcessPopup {
    child: Child,
    tracked: bool,
    closed: bool,
}

impl ProcessPopup {
    fn exited(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(status) => status.is_some(),
            Err(err) => {
                warn!(error = %err, "failed to poll popup process");
                false
            }
        }
    }
}

impl PopupHandle for ProcessPopup {
    fn is_closed(&mut self) -> bool {
        // Always reap, so an untracked opener never lingers as a zombie.
        let exited = self.exited();
        if self.tracked && exited {
            self.closed = true;
        }
        self.closed
    }

    fn close(&mut self) -> std::result::Result<(), PopupError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        // Reaps an untracked opener that exited after the last poll.
        let exited = self.exited();
        if !self.tracked || exited {
            return Ok(());
        }

        self.child.kill().map_err(|err| PopupError::Close(err.to_string()))?;
        let _ = self.child.wait();
        Ok(())
    }
}

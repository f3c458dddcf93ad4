//! Opening the consent screen outside the process

mod process;

pub use process::ProcessPopupLauncher;

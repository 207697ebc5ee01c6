mod error;
mod fs_utils;
mod layout;
mod plan;
mod script;
mod shared;
mod types;
mod uninstall;

pub use error::{UninstallError, UninstallIssue};
pub use fs_utils::{rpmsave_path, RPMSAVE_SUFFIX};
pub use layout::RootLayout;
pub use plan::{
    apply_shared_overrides, initial_actions, plan_file_actions, refine_config_actions, FilePlan,
};
pub use script::{
    ScriptError, ScriptInvocation, ScriptOutcome, ScriptRunner, INSTALL_PREFIX_ENV,
    SCRIPT_PATH_PREAMBLE,
};
pub use shared::{find_shared_files, SharedFileMatch};
pub use types::{
    AppliedAction, FileAction, FileOp, PlannedAction, UninstallFlags, UninstallReport,
};
pub use uninstall::{
    uninstall_package, uninstall_package_with_digester, uninstall_package_with_runner,
};

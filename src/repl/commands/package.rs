//! `#r "nuget: <name>[, <version>]"`

use std::sync::Arc;

use tracing::{debug, warn};

use super::{reference_target, CommandHandler};
use crate::references::{PackageInstaller, PackageSpec};
use crate::repl::engine::{LineId, SubmissionStore};
use crate::repl::result::LineEvaluationResult;
use crate::runtime::EvaluationLogger;

/// Installs a package and adds its libraries to the line's references
pub struct PackageReferenceHandler {
    store: Arc<SubmissionStore>,
    installer: Arc<dyn PackageInstaller>,
}

impl PackageReferenceHandler {
    pub fn new(
        store: Arc<SubmissionStore>,
        installer: Arc<dyn PackageInstaller>,
    ) -> Self {
        Self { store, installer }
    }
}

impl CommandHandler for PackageReferenceHandler {
    fn name(&self) -> &'static str {
        "package-reference"
    }

    fn can_handle(
        &self,
        code: &str,
    ) -> bool {
        reference_target(code).is_some_and(PackageSpec::is_package_target)
    }

    fn handle(
        &self,
        line_id: LineId,
        code: &str,
        logger: &dyn EvaluationLogger,
    ) -> LineEvaluationResult {
        let installed = reference_target(code)
            .ok_or_else(|| "expected #r \"nuget: <name>[, <version>]\"".to_string())
            .and_then(|target| PackageSpec::parse(target).map_err(|e| e.to_string()))
            .and_then(|spec| self.installer.install(&spec).map_err(|e| e.to_string()));

        let package = match installed {
            Ok(package) => package,
            Err(message) => {
                warn!("Package reference on line {} failed: {}", line_id, message);
                logger.write_error(&format!("{}\n", message));
                return LineEvaluationResult::runtime_error(message);
            }
        };

        self.store.create_or_update(line_id, code, &package.references);
        debug!(
            "Line {} installed {} {} ({} references)",
            line_id,
            package.name,
            package.version,
            package.references.len()
        );
        logger.write_output(&format!(
            "Installed package {} {}\n",
            package.name, package.version
        ));
        LineEvaluationResult::success(None)
    }
}

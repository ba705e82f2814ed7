// Expression sandbox policy
//
// User-supplied naming expressions are evaluated inside an `ExpressionSandbox`.
// The sandbox owns the policy it enforces; nothing is consulted implicitly.
// At startup the launcher records a permissive policy as the process default
// so evaluators created without an explicit policy are not blocked.

use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors raised by the sandbox
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SandboxError {
    #[error("A default sandbox policy is already installed")]
    AlreadyInstalled,

    #[error("Permission denied: {0}")]
    Denied(Permission),
}

/// An operation an expression may attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permission {
    ReadFile(Utf8PathBuf),
    WriteFile(Utf8PathBuf),
    Execute(String),
    Connect(String),
    ReadProperty(String),
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::ReadFile(path) => write!(f, "read {}", path),
            Permission::WriteFile(path) => write!(f, "write {}", path),
            Permission::Execute(command) => write!(f, "execute {}", command),
            Permission::Connect(host) => write!(f, "connect {}", host),
            Permission::ReadProperty(name) => write!(f, "property {}", name),
        }
    }
}

/// Capability granting a set of permissions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SandboxPolicy {
    /// Grants every permission
    Permissive,

    /// Grants only reads of files under the given roots
    Restricted { read_roots: Vec<Utf8PathBuf> },
}

impl SandboxPolicy {
    pub fn permissive() -> Self {
        SandboxPolicy::Permissive
    }

    pub fn restricted<I, P>(read_roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Utf8Path>,
    {
        SandboxPolicy::Restricted {
            read_roots: read_roots
                .into_iter()
                .map(|root| root.as_ref().to_path_buf())
                .collect(),
        }
    }

    /// Whether the policy grants the permission
    pub fn implies(&self, permission: &Permission) -> bool {
        match self {
            SandboxPolicy::Permissive => true,
            SandboxPolicy::Restricted { read_roots } => match permission {
                Permission::ReadFile(path) => read_roots.iter().any(|root| path.starts_with(root)),
                _ => false,
            },
        }
    }
}

static DEFAULT_POLICY: OnceLock<SandboxPolicy> = OnceLock::new();

/// Record the policy used by sandboxes created with [`ExpressionSandbox::with_default_policy`].
///
/// Only the first install succeeds.
pub fn install_default(policy: SandboxPolicy) -> Result<(), SandboxError> {
    DEFAULT_POLICY
        .set(policy)
        .map_err(|_| SandboxError::AlreadyInstalled)
}

pub fn default_policy() -> Option<&'static SandboxPolicy> {
    DEFAULT_POLICY.get()
}

/// Restricted execution context handed to the expression evaluator
#[derive(Debug, Clone)]
pub struct ExpressionSandbox {
    policy: SandboxPolicy,
}

impl ExpressionSandbox {
    pub fn new(policy: SandboxPolicy) -> Self {
        Self { policy }
    }

    /// Sandbox using the installed default, or a deny-all policy when none is installed
    pub fn with_default_policy() -> Self {
        let policy = default_policy()
            .cloned()
            .unwrap_or_else(|| SandboxPolicy::restricted(Vec::<Utf8PathBuf>::new()));
        Self::new(policy)
    }

    pub fn policy(&self) -> &SandboxPolicy {
        &self.policy
    }

    pub fn check(&self, permission: &Permission) -> Result<(), SandboxError> {
        if self.policy.implies(permission) {
            Ok(())
        } else {
            tracing::debug!("Sandbox denied {}", permission);
            Err(SandboxError::Denied(permission.clone()))
        }
    }
}

//! Producer identity: a stable tag for one publishing process.
//!
//! SHA-256 over the node name and process id, hex encoded. It only
//! labels log lines and status output and is not meant to be
//! unforgeable.

use sha2::{Digest, Sha256};

/// Identity of the process `pid` running on `node`.
pub fn identity(node: &str, pid: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(node.as_bytes());
    hasher.update(pid.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

/// Node name to use for this process: the override if given, else
/// `$HOSTNAME`, else `"localhost"`.
pub fn node_name(node_override: Option<&str>) -> String {
    node_override
        .map(str::to_string)
        .or_else(|| std::env::var("HOSTNAME").ok())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Identity of the current process.
pub fn local_identity(node_override: Option<&str>) -> String {
    identity(&node_name(node_override), std::process::id())
}

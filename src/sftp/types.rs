use super::attributes::FileAttributes;

/// One entry of an `SSH_FXP_NAME` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    /// Server-formatted `ls -l` style line.
    pub display_name: String,
    pub attrs: FileAttributes,
}

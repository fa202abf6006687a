use crate::com_audit::domain::{ComponentRecord, TrustLevel};

const DEFAULT_SYSTEM_ROOT: &str = r"C:\Windows";
const DEFAULT_PROGRAM_FILES: &str = r"C:\Program Files";
const DEFAULT_PROGRAM_FILES_X86: &str = r"C:\Program Files (x86)";

/// Well-known install folders used to classify server paths
///
/// Resolution order is config file, then environment, then Windows defaults.
/// The environment is only consulted for folders the config did not set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownFolders {
    system: Vec<String>,
    program_files: Vec<String>,
}

impl Default for KnownFolders {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl KnownFolders {
    pub fn new(system: Vec<String>, program_files: Vec<String>) -> Self {
        Self {
            system,
            program_files,
        }
    }

    /// Resolves folders from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves folders through an arbitrary variable lookup
    ///
    /// `SystemRoot` is preferred over `windir`. Empty variables count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let system_root = var("SystemRoot")
            .or_else(|| var("windir"))
            .unwrap_or_else(|| DEFAULT_SYSTEM_ROOT.to_string());
        let system_root = system_root.trim_end_matches('\\');

        Self {
            system: vec![
                format!(r"{}\System32", system_root),
                format!(r"{}\SysWOW64", system_root),
            ],
            program_files: vec![
                var("ProgramFiles").unwrap_or_else(|| DEFAULT_PROGRAM_FILES.to_string()),
                var("ProgramFiles(x86)").unwrap_or_else(|| DEFAULT_PROGRAM_FILES_X86.to_string()),
            ],
        }
    }

    /// Replaces folder lists that were explicitly configured
    pub fn with_overrides(
        mut self,
        system: Option<Vec<String>>,
        program_files: Option<Vec<String>>,
    ) -> Self {
        if let Some(system) = system {
            self.system = system;
        }
        if let Some(program_files) = program_files {
            self.program_files = program_files;
        }
        self
    }

    pub fn system(&self) -> &[String] {
        &self.system
    }

    pub fn program_files(&self) -> &[String] {
        &self.program_files
    }
}

/// TrustClassifier assigns a coarse trust level to a component
///
/// Priority is fixed: elevated, then system folder, then program files,
/// then custom. Prefix matching ignores case.
#[derive(Debug, Clone, Default)]
pub struct TrustClassifier {
    folders: KnownFolders,
}

impl TrustClassifier {
    pub fn new(folders: KnownFolders) -> Self {
        Self { folders }
    }

    pub fn folders(&self) -> &KnownFolders {
        &self.folders
    }

    pub fn classify(&self, record: &ComponentRecord) -> TrustLevel {
        if record.is_elevated() {
            return TrustLevel::Elevated;
        }

        let path = match record.server_path() {
            Some(path) if !path.is_empty() => path,
            _ => return TrustLevel::Custom,
        };

        if Self::starts_with_any(path, &self.folders.system) {
            TrustLevel::System
        } else if Self::starts_with_any(path, &self.folders.program_files) {
            TrustLevel::ProgramFiles
        } else {
            TrustLevel::Custom
        }
    }

    fn starts_with_any(path: &str, folders: &[String]) -> bool {
        let path = path.to_lowercase();
        folders
            .iter()
            .filter(|folder| !folder.is_empty())
            .any(|folder| path.starts_with(&folder.to_lowercase()))
    }
}

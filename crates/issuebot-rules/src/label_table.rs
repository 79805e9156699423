//! Static label keyword table and the label conflict rules applied on top of it.

const BUILTIN_LABEL_KEYWORDS: &[(&str, &[&str])] = &[
    // platforms
    (
        "linux",
        &[
            "/proc/disk",
            "/proc/net",
            "/proc/smaps",
            "/proc/vmstat",
            "/sys/class",
            "alpine",
            "apt ",
            "apt-",
            "archlinux",
            "centos",
            "debian",
            "fedora",
            "gentoo",
            "kali",
            "linux",
            "manylinux",
            "mint",
            "opensuse",
            "red hat",
            "redhat",
            "RHEL",
            "rpm",
            "slackware",
            "suse",
            "ubuntu",
            "yum",
        ],
    ),
    (
        "windows",
        &[
            ".bat",
            "appveyor",
            "CloseHandle",
            "DLL",
            "GetLastError",
            "make.bat",
            "microsoft",
            "mingw",
            "MSVC",
            "msys",
            "NtQuery",
            "NTSTATUS",
            "NtWow64",
            "OpenProcess",
            "studio",
            "TCHAR",
            "TerminateProcess",
            "Visual Studio",
            "WCHAR",
            "win ",
            "win10",
            "win32",
            "win7",
            "windows error",
            "windows",
            "WindowsError",
            "WinError",
        ],
    ),
    (
        "macos",
        &[
            "big sur",
            "capitan",
            "catalina",
            "darwin",
            "dylib",
            "m1",
            "mac ",
            "macos",
            "mojave",
            "mojave",
            "os x",
            "osx",
            "sierra",
            "xcode",
            "yosemite",
        ],
    ),
    ("aix", &["aix"]),
    ("cygwin", &["cygwin"]),
    ("freebsd", &["freebsd"]),
    ("netbsd", &["netbsd"]),
    ("openbsd", &["openbsd"]),
    ("sunos", &["sunos", "solaris"]),
    ("wsl", &["wsl"]),
    (
        "unix",
        &[
            "/dev/pts",
            "/dev/tty",
            "_psutil_posix",
            "psposix",
            "statvfs",
            "waitpid",
        ],
    ),
    ("pypy", &["pypy"]),
    // types
    ("enhancement", &["enhancement"]),
    (
        "memleak",
        &["memory leak", "leaks memory", "memleak", "mem leak"],
    ),
    ("api", &["idea", "proposal", "api", "feature"]),
    (
        "performance",
        &["performance", "speedup", "speed up", "slow", "fast"],
    ),
    ("wheels", &["wheel", "wheels"]),
    (
        "scripts",
        &[
            "example dir",
            "example script",
            "examples script",
            "scripts/",
        ],
    ),
    (
        "bug",
        &[
            "can't execute",
            "can't install",
            "cannot execute",
            "cannot install",
            "crash",
            "critical",
            "fail",
            "install error",
        ],
    ),
    (
        "doc",
        &[
            "dev guide",
            "devguide",
            "doc ",
            "docfix",
            "document ",
            "documentation",
            "HISTORY",
            "index.rst",
            "pythonhosted",
            "README",
            "readthedocs",
            "sphinx",
        ],
    ),
    (
        "tests",
        &[
            " test ",
            "appveyor",
            "cirrus",
            "continuous integration",
            "coverage",
            "pytest",
            "tests",
            "travis",
            "unit test",
            "unittest",
        ],
    ),
    // critical errors
    (
        "priority-high",
        &[
            "core dumped",
            "MemoryError",
            "RuntimeError",
            "segfault",
            "segmentation fault",
            "SystemError",
            "WindowsError",
            "WinError",
            "ZeroDivisionError",
        ],
    ),
];

/// Label whose keywords are extended with the repository's script file names.
pub const SCRIPTS_LABEL: &str = "scripts";

/// Labels naming a platform.
pub const OS_LABELS: &[&str] = &[
    "aix", "bsd", "cygwin", "freebsd", "linux", "macos", "netbsd", "openbsd", "sunos", "unix",
    "windows", "wsl",
];

/// `(label, conflicting)`: `label` is never added while `conflicting` is assigned.
pub const ILLOGICAL_PAIRS: &[(&str, &str)] = &[
    ("bug", "enhancement"),
    ("doc", "tests"),
    ("scripts", "doc"),
    ("scripts", "tests"),
    ("bsd", "freebsd"),
    ("bsd", "openbsd"),
    ("bsd", "netbsd"),
];

/// Return the first assigned label that makes adding `label` illogical.
pub fn illogical_conflict<F>(label: &str, has_label: F) -> Option<&'static str>
where
    F: Fn(&str) -> bool,
{
    ILLOGICAL_PAIRS
        .iter()
        .find(|(left, right)| *left == label && has_label(right))
        .map(|(_, right)| *right)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelKeywords {
    pub label: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One keyword hit produced by [`LabelKeywordTable::classify`].
pub struct LabelMatch {
    pub label: String,
    pub keyword: String,
}

#[derive(Debug, Clone)]
/// Ordered label -> keywords mapping. Built once at startup and read-only afterwards.
pub struct LabelKeywordTable {
    entries: Vec<LabelKeywords>,
}

impl Default for LabelKeywordTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LabelKeywordTable {
    pub fn builtin() -> Self {
        let entries = BUILTIN_LABEL_KEYWORDS
            .iter()
            .map(|(label, keywords)| LabelKeywords {
                label: (*label).to_string(),
                keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
            })
            .collect();
        Self { entries }
    }

    /// Append script file names to the `scripts` label keywords.
    pub fn with_script_keywords<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names
            .into_iter()
            .map(Into::<String>::into)
            .filter(|name| !name.trim().is_empty());
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.label == SCRIPTS_LABEL)
        {
            Some(entry) => entry.keywords.extend(names),
            None => self.entries.push(LabelKeywords {
                label: SCRIPTS_LABEL.to_string(),
                keywords: names.collect(),
            }),
        }
        self
    }

    pub fn entries(&self) -> &[LabelKeywords] {
        &self.entries
    }

    pub fn keywords_for(&self, label: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.keywords.as_slice())
    }

    /// Case-insensitive substring search of every keyword in `text`.
    ///
    /// Matches are reported in table order, one per `(label, keyword)` hit, so a
    /// label appears once for each of its keywords found in the text.
    pub fn classify(&self, text: &str) -> Vec<LabelMatch> {
        let haystack = text.to_lowercase();
        let mut matches = Vec::new();
        for entry in &self.entries {
            for keyword in &entry.keywords {
                if haystack.contains(&keyword.to_lowercase()) {
                    matches.push(LabelMatch {
                        label: entry.label.clone(),
                        keyword: keyword.clone(),
                    });
                }
            }
        }
        matches
    }
}

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileState {
    Normal,
    Replaced,
    NotInstalled,
    NetShared,
}

impl FileState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Replaced => "replaced",
            Self::NotInstalled => "notinstalled",
            Self::NetShared => "netshared",
        }
    }

    /// Accepts the lowercase tokens as well as the numeric codes 0..=3 used by
    /// older databases.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "normal" | "0" => Some(Self::Normal),
            "replaced" | "1" => Some(Self::Replaced),
            "notinstalled" | "not-installed" | "2" => Some(Self::NotInstalled),
            "netshared" | "net-shared" | "3" => Some(Self::NetShared),
            _ => None,
        }
    }

    pub fn is_untouchable(self) -> bool {
        matches!(self, Self::NotInstalled | Self::NetShared)
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FileFlags(u32);

impl FileFlags {
    pub const CONFIG: Self = Self(1 << 0);
    pub const DOC: Self = Self(1 << 1);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_config(self) -> bool {
        self.contains(Self::CONFIG)
    }
}

impl std::ops::BitOr for FileFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FileMode(u32);

const S_IFMT: u32 = 0o170_000;
const S_IFDIR: u32 = 0o040_000;
const S_IFREG: u32 = 0o100_000;

impl FileMode {
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn directory(permissions: u32) -> Self {
        Self(S_IFDIR | (permissions & 0o7777))
    }

    pub const fn regular(permissions: u32) -> Self {
        Self(S_IFREG | (permissions & 0o7777))
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_dir(self) -> bool {
        self.0 & S_IFMT == S_IFDIR
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: String,
    pub state: FileState,
    pub flags: FileFlags,
    pub mode: FileMode,
    pub md5: Option<String>,
}

impl FileEntry {
    pub fn is_config(&self) -> bool {
        self.flags.is_config()
    }

    pub fn is_dir(&self) -> bool {
        self.mode.is_dir()
    }
}

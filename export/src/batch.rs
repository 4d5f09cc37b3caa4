//! Batch descriptor parser: one directive per line, `#` introduces a
//! comment. Single-path tasks name a cache root directly; `BEGIN_PROFILE`
//! blocks describe a foreign machine's key-paths so format discovery can
//! walk a cache image that was copied off another computer.

use std::path::PathBuf;

use strings::partition;

use crate::error::{Error, Result};
use crate::keypaths::{parse_directive_value, KeyPaths};

/// Which cache format a single-path task or profile-scoped walk should
/// be interpreted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatFlag {
    Walk,
    Wininet,
    Mozilla,
    Flash,
    Shockwave,
    Java,
    Unity,
}

impl FormatFlag {
    fn from_directive(word: &str) -> Option<Self> {
        match word {
            "WALK" => Some(Self::Walk),
            "WININET" => Some(Self::Wininet),
            "MOZILLA" => Some(Self::Mozilla),
            "FLASH" => Some(Self::Flash),
            "SHOCKWAVE" => Some(Self::Shockwave),
            "JAVA" => Some(Self::Java),
            "UNITY" => Some(Self::Unity),
            _ => None,
        }
    }
}

/// A single-path task: one cache root, one format.
#[derive(Debug, Clone)]
pub struct SinglePathTask {
    pub format: FormatFlag,
    pub path: PathBuf,
}

/// A named `BEGIN_PROFILE` block: a [`KeyPaths`] profile plus its
/// descriptor-assigned name.
#[derive(Debug, Clone)]
pub struct Profile {
    pub name: String,
    pub key_paths: KeyPaths,
}

/// The result of parsing a whole batch descriptor file.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub tasks: Vec<SinglePathTask>,
    pub profiles: Vec<Profile>,
}

const REQUIRED_DIRECTIVES: &[&str] = &[
    "DRIVE",
    "WINDOWS",
    "TEMPORARY",
    "USER",
    "APPDATA",
    "LOCAL_APPDATA",
    "LOCAL_LOW_APPDATA",
    "INTERNET_CACHE",
];

fn strip_comment(line: &str) -> &str {
    let (before, _, _) = partition(line, "#");
    before.trim()
}

struct ProfileBuilder {
    name: String,
    drive: Option<PathBuf>,
    windows: Option<PathBuf>,
    temporary: Option<PathBuf>,
    user: Option<PathBuf>,
    appdata: Option<PathBuf>,
    local_appdata: Option<PathBuf>,
    local_low_appdata: Option<PathBuf>,
    wininet_cache: Option<PathBuf>,
    seen: Vec<&'static str>,
}

impl ProfileBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            drive: None,
            windows: None,
            temporary: None,
            user: None,
            appdata: None,
            local_appdata: None,
            local_low_appdata: None,
            wininet_cache: None,
            seen: Vec::new(),
        }
    }

    fn apply(&mut self, directive: &'static str, value: &str) {
        let parsed = parse_directive_value(value);
        match directive {
            "DRIVE" => self.drive = parsed,
            "WINDOWS" => self.windows = parsed,
            "TEMPORARY" => self.temporary = parsed,
            "USER" => self.user = parsed,
            "APPDATA" => self.appdata = parsed,
            "LOCAL_APPDATA" => self.local_appdata = parsed,
            "LOCAL_LOW_APPDATA" => self.local_low_appdata = parsed,
            "INTERNET_CACHE" => self.wininet_cache = parsed,
            _ => unreachable!("directive filtered by REQUIRED_DIRECTIVES lookup"),
        }
        self.seen.push(directive);
    }

    fn finish(self, line: usize) -> Result<Profile> {
        for required in REQUIRED_DIRECTIVES {
            if !self.seen.contains(required) {
                return Err(Error::MalformedBatch {
                    line,
                    message: format!("profile '{}' is missing required directive {required}", self.name),
                });
            }
        }

        Ok(Profile {
            name: self.name,
            key_paths: KeyPaths {
                drive: self.drive,
                windows: self.windows,
                temporary: self.temporary,
                user: self.user,
                appdata: self.appdata,
                local_appdata: self.local_appdata,
                local_low_appdata: self.local_low_appdata,
                wininet_cache: self.wininet_cache,
            },
        })
    }
}

/// Parse a whole batch descriptor. Any profile missing one of its eight
/// required directives fails the entire parse; no partial task list is
/// returned.
pub fn parse(source: &str) -> Result<Batch> {
    let mut batch = Batch::default();
    let mut current: Option<ProfileBuilder> = None;
    let mut profile_start_line = 0usize;

    for (index, raw_line) in source.lines().enumerate() {
        let line_number = index + 1;
        let line = strip_comment(raw_line);
        if line.is_empty() {
            continue;
        }

        let (keyword, _, rest) = partition(line, " \t");
        let rest = rest.trim();

        if keyword == "BEGIN_PROFILE" {
            if current.is_some() {
                return Err(Error::MalformedBatch {
                    line: line_number,
                    message: "nested BEGIN_PROFILE without a matching END".to_string(),
                });
            }
            if rest.is_empty() {
                return Err(Error::MalformedBatch {
                    line: line_number,
                    message: "BEGIN_PROFILE requires a profile name".to_string(),
                });
            }
            profile_start_line = line_number;
            current = Some(ProfileBuilder::new(rest.to_string()));
            continue;
        }

        if keyword == "END" {
            let Some(builder) = current.take() else {
                return Err(Error::MalformedBatch {
                    line: line_number,
                    message: "END without a matching BEGIN_PROFILE".to_string(),
                });
            };
            batch.profiles.push(builder.finish(profile_start_line)?);
            continue;
        }

        if let Some(builder) = current.as_mut() {
            if REQUIRED_DIRECTIVES.contains(&keyword) {
                let directive = REQUIRED_DIRECTIVES
                    .iter()
                    .find(|d| **d == keyword)
                    .copied()
                    .unwrap();
                builder.apply(directive, rest);
                continue;
            }
            return Err(Error::MalformedBatch {
                line: line_number,
                message: format!("unrecognized directive '{keyword}' inside BEGIN_PROFILE"),
            });
        }

        if let Some(format) = FormatFlag::from_directive(keyword) {
            if rest.is_empty() {
                return Err(Error::MalformedBatch {
                    line: line_number,
                    message: format!("{keyword} requires a path"),
                });
            }
            batch.tasks.push(SinglePathTask {
                format,
                path: PathBuf::from(rest),
            });
            continue;
        }

        return Err(Error::MalformedBatch {
            line: line_number,
            message: format!("unrecognized directive '{keyword}'"),
        });
    }

    if current.is_some() {
        return Err(Error::MalformedBatch {
            line: profile_start_line,
            message: "BEGIN_PROFILE never closed with END".to_string(),
        });
    }

    Ok(batch)
}

use std::{fs, path::Path};

use ahash::AHashMap;

use crate::error::{Error, Result};

const SUBRUN_KEY: &str = "main:subrun";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// Key as written in the command file
    pub key: String,
    pub value: String,
    /// Line number in the command file, starting at 1
    pub line: usize,
}

/// All settings of a command file, grouped by subrun
///
/// The format follows the usual `Key = value` command files, e.g.
///
/// ```text
/// Main:numberOfEvents = 100000   ! per subrun
/// Main:numberOfSubruns = 2
/// Beams:eCM = 500.
///
/// Main:subrun = 1
/// Main:spareWord1 = default
/// Main:subrun = 2
/// Main:spareWord1 = stopmass
/// StringFragmentation:stopMass = 0.8
/// ```
///
/// Lines that do not start with a letter are ignored, as is everything
/// after a `!`. Keys are case-insensitive. Each subrun sees the lines
/// before the first `Main:subrun` plus its own block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandFile {
    common: Vec<Entry>,
    subruns: AHashMap<i64, Vec<Entry>>,
}

impl CommandFile {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_owned(),
            source,
        })?;
        text.parse()
    }

    /// Settings seen by the given subrun
    ///
    /// Subrun 0 only sees the common settings.
    pub fn subrun(&self, subrun: i64) -> Settings {
        let mut settings = Settings::default();
        let own = self.subruns.get(&subrun).into_iter().flatten();
        for entry in self.common.iter().chain(own) {
            settings.insert(&entry.key, &entry.value, Some(entry.line));
        }
        settings
    }

    /// Settings outside of any subrun block
    pub fn common(&self) -> Settings {
        self.subrun(0)
    }
}

impl std::str::FromStr for CommandFile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut res = Self::default();
        let mut subrun = None;
        for (n, line) in s.lines().enumerate() {
            let line_nr = n + 1;
            let line = line.split('!').next().unwrap_or_default().trim();
            if !line.starts_with(|c: char| c.is_ascii_alphabetic()) {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(Error::SettingsSyntax {
                    line: line_nr,
                    msg: format!("expected `Key = value`, found `{line}`"),
                });
            };
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                return Err(Error::SettingsSyntax {
                    line: line_nr,
                    msg: format!("missing key or value in `{line}`"),
                });
            }
            if key.eq_ignore_ascii_case(SUBRUN_KEY) {
                let idx = value.parse().map_err(|_| Error::SettingsSyntax {
                    line: line_nr,
                    msg: format!("invalid subrun number `{value}`"),
                })?;
                subrun = Some(idx);
                res.subruns.entry(idx).or_default();
                continue;
            }
            let entry = Entry {
                key: key.to_owned(),
                value: value.to_owned(),
                line: line_nr,
            };
            match subrun {
                Some(idx) => res.subruns.entry(idx).or_default().push(entry),
                None => res.common.push(entry),
            }
        }
        Ok(res)
    }
}

/// Settings for a single subrun
///
/// Later values override earlier ones.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Settings {
    // lowercase key -> (value, line in the command file)
    values: AHashMap<String, (String, Option<usize>)>,
}

impl Settings {
    /// Set a value that does not come from a command file
    pub fn set(&mut self, key: &str, value: &str) {
        self.insert(key, value, None)
    }

    fn insert(&mut self, key: &str, value: &str, line: Option<usize>) {
        self.values
            .insert(key.to_ascii_lowercase(), (value.to_owned(), line));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&key.to_ascii_lowercase())
            .map(|(v, _)| v.as_str())
    }

    /// Command file line the current value of `key` was read from
    pub fn line(&self, key: &str) -> Option<usize> {
        self.values
            .get(&key.to_ascii_lowercase())
            .and_then(|&(_, line)| line)
    }

    /// Error for a `key` whose value is not a valid `kind`
    pub fn invalid(&self, key: &str, value: impl ToString, kind: &'static str) -> Error {
        Error::SettingsValue {
            key: key.to_owned(),
            value: value.to_string(),
            kind,
            line: self.line(key),
        }
    }

    /// Integer setting
    pub fn mode(&self, key: &str) -> Result<Option<i64>> {
        self.parse_with(key, "integer", |v| v.parse().ok())
    }

    /// Floating-point setting
    pub fn parm(&self, key: &str) -> Result<Option<f64>> {
        self.parse_with(key, "number", |v| v.parse().ok())
    }

    /// Boolean setting
    pub fn flag(&self, key: &str) -> Result<Option<bool>> {
        self.parse_with(key, "flag", |v| match v.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => Some(true),
            "off" | "no" | "false" | "0" => Some(false),
            _ => None,
        })
    }

    /// String setting
    pub fn word(&self, key: &str) -> Option<&str> {
        self.get(key)
    }

    fn parse_with<T>(
        &self,
        key: &str,
        kind: &'static str,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Result<Option<T>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        parse(value)
            .map(Some)
            .ok_or_else(|| self.invalid(key, value, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CMND: &str = "
! plots.cmnd
Main:numberOfEvents = 1000   ! events per subrun
Main:numberOfSubruns = 2
Beams:eCM = 500.
HadronLevel:Decay = off

Main:subrun = 1
Main:spareWord1 = default

Main:subrun = 2
Main:spareWord1 = stopmass
main:numberofevents = 10
StringFragmentation:stopMass = 0.8
";

    #[test]
    fn subruns() {
        let file: CommandFile = CMND.parse().unwrap();
        let common = file.common();
        assert_eq!(common.mode("Main:numberOfEvents").unwrap(), Some(1000));
        assert_eq!(common.mode("Main:numberOfSubruns").unwrap(), Some(2));
        assert_eq!(common.parm("Beams:eCM").unwrap(), Some(500.));
        assert_eq!(common.flag("HadronLevel:Decay").unwrap(), Some(false));
        assert_eq!(common.word("Main:spareWord1"), None);

        let first = file.subrun(1);
        assert_eq!(first.word("Main:spareWord1"), Some("default"));
        assert_eq!(first.mode("Main:numberOfEvents").unwrap(), Some(1000));
        assert_eq!(first.get("StringFragmentation:stopMass"), None);

        let second = file.subrun(2);
        assert_eq!(second.word("main:spareword1"), Some("stopmass"));
        assert_eq!(second.mode("Main:numberOfEvents").unwrap(), Some(10));
        assert_eq!(second.parm("StringFragmentation:stopMass").unwrap(), Some(0.8));

        assert_eq!(common.line("Main:numberOfEvents"), Some(3));
        assert_eq!(second.line("Main:numberOfEvents"), Some(13));
        assert_eq!(second.line("Main:spareWord1"), Some(12));
        assert_eq!(second.line("Main:spareMode1"), None);
    }

    #[test]
    fn syntax_errors() {
        let err = "Beams:eCM 500".parse::<CommandFile>().unwrap_err();
        assert!(matches!(err, Error::SettingsSyntax { line: 1, .. }));
        let err = "\nBeams:eCM =".parse::<CommandFile>().unwrap_err();
        assert!(matches!(err, Error::SettingsSyntax { line: 2, .. }));
        let err = "Main:subrun = first".parse::<CommandFile>().unwrap_err();
        assert!(matches!(err, Error::SettingsSyntax { line: 1, .. }));
    }

    #[test]
    fn value_errors() {
        let file: CommandFile = "Beams:eCM = lots\nMain:spareFlag1 = maybe".parse().unwrap();
        let settings = file.common();
        assert!(matches!(
            settings.parm("Beams:eCM"),
            Err(Error::SettingsValue { line: Some(1), .. })
        ));
        let err = settings.flag("Main:spareFlag1").unwrap_err();
        assert!(matches!(err, Error::SettingsValue { line: Some(2), .. }));
        assert!(err.to_string().starts_with("Line 2: "));
        assert_eq!(settings.mode("Main:numberOfEvents").unwrap(), None);

        let mut settings = Settings::default();
        settings.set("Beams:eCM", "lots");
        let err = settings.parm("Beams:eCM").unwrap_err();
        assert!(matches!(err, Error::SettingsValue { line: None, .. }));
        assert_eq!(err.to_string(), "Setting `Beams:eCM` = `lots` is not a valid number");
    }
}

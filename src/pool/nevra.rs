//! NEVRA (name, epoch, version, release, arch) parsing and canonical rendering.

/// A partially or fully specified NEVRA. Any field left `None` is a wildcard when used
/// to build a query filter.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Nevra {
    pub name: Option<String>,
    pub epoch: Option<String>,
    pub version: Option<String>,
    pub release: Option<String>,
    pub arch: Option<String>,
}

/// The fixed set of forms [`crate::pool::Pool::resolve_pkg_spec`] tries, in order, when
/// the caller doesn't name an explicit subset.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NevraForm {
    Nevra,
    Nevr,
    Nev,
    Nea,
    Ne,
    Na,
    N,
}

pub const DEFAULT_NEVRA_FORMS: &[NevraForm] = &[
    NevraForm::Nevra,
    NevraForm::Nevr,
    NevraForm::Nev,
    NevraForm::Nea,
    NevraForm::Ne,
    NevraForm::Na,
    NevraForm::N,
];

impl Nevra {
    pub fn full_nevra(&self) -> String {
        let mut s = self.name.clone().unwrap_or_default();
        let ev = self.epoch_version_release();
        if !ev.is_empty() {
            s.push('-');
            s.push_str(&ev);
        }
        if let Some(arch) = &self.arch {
            s.push('.');
            s.push_str(arch);
        }
        s
    }

    pub fn nevra_without_epoch(&self) -> String {
        let mut s = self.name.clone().unwrap_or_default();
        let version = self.version.clone().unwrap_or_default();
        let mut evr = version;
        if let Some(release) = &self.release {
            evr.push('-');
            evr.push_str(release);
        }
        if !evr.is_empty() {
            s.push('-');
            s.push_str(&evr);
        }
        if let Some(arch) = &self.arch {
            s.push('.');
            s.push_str(arch);
        }
        s
    }

    fn epoch_version_release(&self) -> String {
        let mut s = String::new();
        if let Some(epoch) = &self.epoch {
            s.push_str(epoch);
            s.push(':');
        }
        s.push_str(self.version.as_deref().unwrap_or(""));
        if let Some(release) = &self.release {
            s.push('-');
            s.push_str(release);
        }
        s
    }

    /// Parses `text` according to `form`, returning `None` if the text does not have
    /// enough components for that form (e.g. parsing an NA form out of a string with
    /// no embedded `.` separator).
    pub fn parse_as(text: &str, form: NevraForm) -> Option<Nevra> {
        match form {
            NevraForm::N => Some(Nevra {
                name: Some(text.to_string()),
                ..Default::default()
            }),
            NevraForm::Na => {
                let (name, arch) = text.rsplit_once('.')?;
                Some(Nevra {
                    name: Some(name.to_string()),
                    arch: Some(arch.to_string()),
                    ..Default::default()
                })
            }
            NevraForm::Ne => {
                let (name, evr) = split_name_evr(text)?;
                let (epoch, version, release) = split_evr(&evr);
                Some(Nevra {
                    name: Some(name),
                    epoch,
                    version: Some(version),
                    release,
                    arch: None,
                })
            }
            NevraForm::Nea => {
                let (rest, arch) = text.rsplit_once('.')?;
                let (name, evr) = split_name_evr(rest)?;
                let (epoch, version, release) = split_evr(&evr);
                Some(Nevra {
                    name: Some(name),
                    epoch,
                    version: Some(version),
                    release,
                    arch: Some(arch.to_string()),
                })
            }
            NevraForm::Nev => {
                let (name, evr) = split_name_evr(text)?;
                let (epoch, version, _release) = split_evr(&evr);
                Some(Nevra {
                    name: Some(name),
                    epoch,
                    version: Some(version),
                    release: None,
                    arch: None,
                })
            }
            NevraForm::Nevr => {
                let (name, evr) = split_name_evr(text)?;
                let (epoch, version, release) = split_evr(&evr);
                Some(Nevra {
                    name: Some(name),
                    epoch,
                    version: Some(version),
                    release,
                    arch: None,
                })
            }
            NevraForm::Nevra => {
                let (rest, arch) = text.rsplit_once('.')?;
                let (name, evr) = split_name_evr(rest)?;
                let (epoch, version, release) = split_evr(&evr);
                Some(Nevra {
                    name: Some(name),
                    epoch,
                    version: Some(version),
                    release,
                    arch: Some(arch.to_string()),
                })
            }
        }
    }
}

/// Splits `name-evr` on the last `-` before a version-looking suffix. Since names may
/// themselves contain `-`, this takes the *last two* hyphen-separated components as
/// version and release, leaving everything before as the name; callers needing a
/// different split (e.g. no release present) should prefer a narrower `NevraForm`.
fn split_name_evr(text: &str) -> Option<(String, String)> {
    let mut parts: Vec<&str> = text.rsplit('-').collect();
    if parts.len() < 2 {
        return None;
    }
    let evr_parts: Vec<&str> = parts.drain(0..2).collect();
    let evr = format!("{}-{}", evr_parts[1], evr_parts[0]);
    let name = parts.into_iter().rev().collect::<Vec<_>>().join("-");
    if name.is_empty() {
        return None;
    }
    Some((name, evr))
}

fn split_evr(evr: &str) -> (Option<String>, String, Option<String>) {
    let (epoch, rest) = match evr.split_once(':') {
        Some((e, r)) => (Some(e.to_string()), r),
        None => (None, evr),
    };
    let (version, release) = match rest.split_once('-') {
        Some((v, r)) => (v.to_string(), Some(r.to_string())),
        None => (rest.to_string(), None),
    };
    (epoch, version, release)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_nevra() {
        let n = Nevra::parse_as("foo-1.0-1.x86_64", NevraForm::Nevra).unwrap();
        assert_eq!(n.name.as_deref(), Some("foo"));
        assert_eq!(n.version.as_deref(), Some("1.0"));
        assert_eq!(n.release.as_deref(), Some("1"));
        assert_eq!(n.arch.as_deref(), Some("x86_64"));
    }

    #[test]
    fn parses_na() {
        let n = Nevra::parse_as("foo.x86_64", NevraForm::Na).unwrap();
        assert_eq!(n.name.as_deref(), Some("foo"));
        assert_eq!(n.arch.as_deref(), Some("x86_64"));
    }

    #[test]
    fn full_nevra_roundtrip() {
        let n = Nevra {
            name: Some("foo".to_string()),
            epoch: Some("1".to_string()),
            version: Some("2.0".to_string()),
            release: Some("3".to_string()),
            arch: Some("x86_64".to_string()),
        };
        assert_eq!(n.full_nevra(), "foo-1:2.0-3.x86_64");
    }

    #[test]
    fn nevra_without_epoch_drops_it() {
        let n = Nevra {
            name: Some("foo".to_string()),
            epoch: Some("1".to_string()),
            version: Some("2.0".to_string()),
            release: Some("3".to_string()),
            arch: Some("x86_64".to_string()),
        };
        assert_eq!(n.nevra_without_epoch(), "foo-2.0-3.x86_64");
    }
}

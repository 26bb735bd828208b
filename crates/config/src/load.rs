use crate::Preferences;
use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use std::path::{Path, PathBuf};
use tracing::instrument;

const ENV_PREFIX: &str = "SHELF_";
const FILE_NAME: &str = "shelf.toml";

/// Location of the configuration file when none is given explicitly:
/// `shelf.toml` in the platform's configuration directory.
///
/// Returns `None` on platforms (or sandboxes) without a home directory.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "shelf").map(|dirs| dirs.config_dir().join(FILE_NAME))
}

/// Load [`Preferences`], layering defaults, a file, then the environment.
///
/// An explicit `path` must exist, otherwise [`ErrorKind::NotFound`] is
/// returned. Without one, the [`default_path`] is used if (and only if) a
/// file exists there.
#[instrument(level = "debug")]
pub fn load(path: Option<&Path>) -> Result<Preferences> {
    let file = match path {
        Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
        Some(path) => Some(path.to_path_buf()),
        None => default_path().filter(|p| p.is_file()),
    };
    let mut figment = Figment::from(Serialized::defaults(Preferences::default()));
    if let Some(file) = file {
        tracing::debug!(path = %file.display(), "reading configuration file");
        figment = merge_file(figment, &file);
    }
    figment.merge(Env::prefixed(ENV_PREFIX).split("__")).extract().or_raise(|| ErrorKind::Load)
}

fn merge_file(figment: Figment, path: &Path) -> Figment {
    match path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase).as_deref() {
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        // Anything else is assumed to be TOML, the documented default.
        _ => figment.merge(Toml::file_exact(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TriState;
    use figment::Jail;
    use std::ops::Deref;

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = load(Some(&path)).unwrap_err();
        assert_eq!(err.deref(), &ErrorKind::NotFound(path));
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "shelf.toml",
                r#"
                    downloaded_only = true

                    [badges]
                    language = true

                    [filters]
                    unread = "include"

                    [filters.tracking]
                    1 = "exclude"
                "#,
            )?;
            let prefs = load(Some(Path::new("shelf.toml"))).unwrap();
            assert!(prefs.downloaded_only);
            assert!(prefs.badges.language);
            // Untouched keys keep their defaults.
            assert!(prefs.badges.unread);
            assert_eq!(prefs.filters.unread, TriState::Include);
            assert_eq!(prefs.filters.started, TriState::Ignore);
            assert_eq!(prefs.filters.tracking(1), TriState::Exclude);
            assert_eq!(prefs.display, Default::default());
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("shelf.toml", "[filters]\ncompleted = \"include\"\n")?;
            jail.set_env("SHELF_FILTERS__COMPLETED", "exclude");
            jail.set_env("SHELF_FILTERS__TRACKING__2", "include");
            jail.set_env("SHELF_DISPLAY__MANGA_COUNT", "true");
            let prefs = load(Some(Path::new("shelf.toml"))).unwrap();
            assert_eq!(prefs.filters.completed, TriState::Exclude);
            assert_eq!(prefs.filters.tracking(2), TriState::Include);
            assert!(prefs.display.manga_count);
            Ok(())
        });
    }

    #[test]
    fn test_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shelf.yaml");
        std::fs::write(&path, "badges:\n  download: true\nfilters:\n  started: exclude\n").unwrap();
        let prefs = load(Some(&path)).unwrap();
        assert!(prefs.badges.download);
        assert_eq!(prefs.filters.started, TriState::Exclude);
    }

    #[test]
    fn test_invalid_tristate_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("shelf.toml", "[filters]\nunread = \"sometimes\"\n")?;
            let err = load(Some(Path::new("shelf.toml"))).unwrap_err();
            assert_eq!(err.deref(), &ErrorKind::Load);
            Ok(())
        });
    }
}

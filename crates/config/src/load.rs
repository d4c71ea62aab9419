use crate::error::{ErrorKind, Result};
use crate::settings::{Config, project_dirs};
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "WHEELHOUSE_";
const CONFIG_FILENAME: &str = "config.toml";

/// Layered configuration loader.
///
/// Later layers win:
///
/// 1. built-in defaults,
/// 2. a config file, TOML, YAML or JSON depending on its extension,
/// 3. environment variables, `WHEELHOUSE_QUEUE__MAX_ARTIFACT_SIZE=1024`
///    style (nested keys separated by `__`).
///
/// An explicitly given file must exist. Without one, `config.toml` in the
/// platform config directory is used if it's there.
#[derive(Debug, Clone)]
pub struct Loader {
    file: Option<PathBuf>,
    env_prefix: String,
}
impl Default for Loader {
    fn default() -> Self {
        Self {
            file: None,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }
}
impl Loader {
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn load(&self) -> Result<Config> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = self.config_file()? {
            tracing::debug!(path = %path.display(), "loading config file");
            figment = merge_file(figment, &path)?;
        }
        figment
            .merge(Env::prefixed(&self.env_prefix).split("__"))
            .extract()
            .or_raise(|| ErrorKind::Invalid)
    }

    fn config_file(&self) -> Result<Option<PathBuf>> {
        match &self.file {
            Some(path) if path.is_file() => Ok(Some(path.clone())),
            Some(path) => exn::bail!(ErrorKind::NotFound(path.clone())),
            None => Ok(default_file().filter(|path| path.is_file())),
        }
    }
}

fn default_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let unsupported = || ErrorKind::UnsupportedFormat(path.to_path_buf());
    let extension = path.extension().and_then(|ext| ext.to_str()).ok_or_raise(unsupported)?;
    let figment = match extension.to_ascii_lowercase().as_str() {
        "toml" => figment.merge(Toml::file_exact(path)),
        "yaml" | "yml" => figment.merge(Yaml::file_exact(path)),
        "json" => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(unsupported()),
    };
    Ok(figment)
}

/// Load the configuration with the default layering.
pub fn load(file: Option<&Path>) -> Result<Config> {
    let loader = Loader::default();
    match file {
        Some(path) => loader.file(path).load(),
        None => loader.load(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    // Tests use their own prefix so the real environment can't leak in.
    fn loader(prefix: &str) -> Loader {
        Loader::default().env_prefix(prefix)
    }

    fn write_config(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = loader("WHEELHOUSE_TEST_DEFAULTS_").load().unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.queue.max_artifact_size, None);
        assert_eq!(config.orphans.max_age, 86_400);
        assert!(config.database.ends_with("catalog.sqlite"));
    }

    #[rstest]
    #[case("config.toml", "log_level = \"debug\"\n[queue]\nmax_artifact_size = 1048576\n")]
    #[case("config.yaml", "log_level: debug\nqueue:\n  max_artifact_size: 1048576\n")]
    #[case("config.JSON", r#"{"log_level": "debug", "queue": {"max_artifact_size": 1048576}}"#)]
    fn test_file_formats(#[case] name: &str, #[case] contents: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, name, contents);
        let config = loader("WHEELHOUSE_TEST_FORMATS_").file(path).load().unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.queue.max_artifact_size, Some(1_048_576));
        // Untouched sections keep their defaults.
        assert_eq!(config.orphans.max_age, 86_400);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = loader("WHEELHOUSE_TEST_MISSING_").file(dir.path().join("nope.toml")).load().unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[rstest]
    #[case("config.ini")]
    #[case("config")]
    fn test_unsupported_format(#[case] name: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, name, "log_level = debug");
        let err = loader("WHEELHOUSE_TEST_UNSUPPORTED_").file(path).load().unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
    }

    #[test]
    fn test_invalid_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "config.toml", "[orphans]\nmax_age = \"a while\"\n");
        let err = loader("WHEELHOUSE_TEST_INVALID_").file(path).load().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid));
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "config.toml", "[orphans]\nmax_age = 60\n");
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("WHEELHOUSE_TEST_ENV_ORPHANS__MAX_AGE", "120") };
        let config = loader("WHEELHOUSE_TEST_ENV_").file(path).load().unwrap();
        assert_eq!(config.orphans.max_age, 120);
        assert_eq!(config.orphans.max_age(), time::Duration::minutes(2));
    }
}

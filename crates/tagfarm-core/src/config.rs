use crate::catalog::Category;
use crate::error::Error;
use config::{Config, Environment, File as ConfigFile, ValueKind};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "tagfarm.yaml";

const SAMPLE_CONFIG: &str = r#"# StashApp GraphQL endpoint
stash_url: http://localhost:9999/graphql
# Only needed when StashApp requires authentication
api_key: null

# Rewrite catalog file paths to where this machine mounts the media
path_map: []
#  - from: /data/media
#    to: /mnt/media

farm_path: /path/to/linkfarm
# Use scene titles for link names instead of file names
use_title: true

tags:
  favourite: true
  names:
    - Manual Tag
    - Overrides
    - Go Here

performers:
  favourite: true
  names:
    - Manual Performer
    - Overrides
    - Go Here
"#;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub stash_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub path_map: Vec<PathMapping>,
    pub farm_path: PathBuf,
    #[serde(default = "default_use_title")]
    pub use_title: bool,
    #[serde(default)]
    pub tags: Option<SelectionConfig>,
    #[serde(default)]
    pub performers: Option<SelectionConfig>,
}

/// Which items of a category get a directory in the farm.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectionConfig {
    #[serde(default)]
    pub favourite: bool,
    #[serde(default)]
    pub names: Option<Vec<String>>,
}

/// Rewrites a catalog-side path prefix to a local one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathMapping {
    pub from: PathBuf,
    pub to: PathBuf,
}

fn default_use_title() -> bool {
    true
}

/// Load `path` (format taken from its extension) with `TAGFARM_*`
/// environment overrides on top, then validate the result.
pub fn load_configuration(path: &Path) -> Result<AppConfig, Error> {
    if !path.is_file() {
        return Err(Error::ConfigNotFound(path.to_path_buf()));
    }

    let builder = Config::builder()
        .add_source(ConfigFile::from(path).required(true))
        .add_source(
            Environment::with_prefix("TAGFARM")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    if let Ok(value) = builder.get::<config::Value>("path_map") {
        if matches!(value.kind, ValueKind::Table(_)) {
            return Err(Error::InvalidConfig(
                "path_map must be a list of {from, to} entries".into(),
            ));
        }
    }

    let config = builder.try_deserialize::<AppConfig>()?;
    config.validate()?;
    Ok(config)
}

/// Write a commented starting configuration to `path`, replacing any
/// existing file.
pub fn write_sample_config(path: &Path) -> Result<(), Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, SAMPLE_CONFIG)?;
    Ok(())
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), Error> {
        let url = self.stash_url.trim();
        if url.is_empty() {
            return Err(Error::InvalidConfig("stash_url must not be empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!(
                "stash_url must be an http(s) URL, got '{}'",
                url
            )));
        }
        if self.farm_path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("farm_path must not be empty".into()));
        }
        for mapping in &self.path_map {
            if mapping.from.as_os_str().is_empty() {
                return Err(Error::InvalidConfig("path_map entries need a 'from' prefix".into()));
            }
        }
        Ok(())
    }

    pub fn selection(&self, category: Category) -> Option<&SelectionConfig> {
        match category {
            Category::Tag => self.tags.as_ref(),
            Category::Performer => self.performers.as_ref(),
        }
    }

    /// Apply `path_map` to a catalog path. The mapping with the most
    /// components wins; unmapped paths are returned unchanged.
    pub fn map_path(&self, path: &Path) -> PathBuf {
        self.path_map
            .iter()
            .filter(|mapping| path.starts_with(&mapping.from))
            .max_by_key(|mapping| mapping.from.components().count())
            .and_then(|mapping| {
                path.strip_prefix(&mapping.from)
                    .ok()
                    .map(|rest| mapping.to.join(rest))
            })
            .unwrap_or_else(|| path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn base_config() -> AppConfig {
        AppConfig {
            stash_url: "http://localhost:9999/graphql".to_string(),
            api_key: None,
            path_map: vec![],
            farm_path: PathBuf::from("/tmp/farm"),
            use_title: true,
            tags: None,
            performers: None,
        }
    }

    #[test]
    fn test_load_yaml_configuration() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tagfarm.yaml");
        fs::write(
            &path,
            "stash_url: http://stash.local/graphql\n\
             farm_path: /srv/farm\n\
             tags:\n  favourite: true\n  names: [Outdoor]\n",
        )
        .unwrap();

        let config = load_configuration(&path).unwrap();
        assert_eq!(config.farm_path, PathBuf::from("/srv/farm"));
        assert!(config.use_title, "use_title should default to true");
        let tags = config.selection(Category::Tag).unwrap();
        assert!(tags.favourite);
        assert_eq!(tags.names.as_deref(), Some(&["Outdoor".to_string()][..]));
        assert!(config.selection(Category::Performer).is_none());
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        match load_configuration(&path) {
            Err(Error::ConfigNotFound(p)) => assert_eq!(p, path),
            other => panic!("expected ConfigNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_sample_config_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("tagfarm.yaml");
        write_sample_config(&path).unwrap();

        let config = load_configuration(&path).unwrap();
        assert!(config.api_key.is_none());
        assert!(config.path_map.is_empty());
        assert_eq!(config.performers.unwrap().names.unwrap().len(), 3);
    }

    #[test]
    fn test_path_map_as_mapping_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tagfarm.yaml");
        fs::write(
            &path,
            "stash_url: http://stash.local/graphql\n\
             farm_path: /srv/farm\n\
             path_map:\n  /data/Media: /mnt/Media\n",
        )
        .unwrap();

        match load_configuration(&path) {
            Err(Error::InvalidConfig(msg)) => {
                assert_eq!(msg, "path_map must be a list of {from, to} entries")
            }
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_path_map_list_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tagfarm.yaml");
        fs::write(
            &path,
            "stash_url: http://stash.local/graphql\n\
             farm_path: /srv/farm\n\
             path_map:\n  - from: /data/Media\n    to: /mnt/Media\n",
        )
        .unwrap();

        let config = load_configuration(&path).unwrap();
        assert_eq!(
            config.path_map,
            vec![PathMapping {
                from: PathBuf::from("/data/Media"),
                to: PathBuf::from("/mnt/Media"),
            }]
        );
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = base_config();
        config.stash_url = "localhost:9999".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        config.stash_url = "  ".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_empty_farm_path() {
        let mut config = base_config();
        config.farm_path = PathBuf::new();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_map_path_longest_prefix_wins() {
        let mut config = base_config();
        config.path_map = vec![
            PathMapping {
                from: PathBuf::from("/data"),
                to: PathBuf::from("/mnt/data"),
            },
            PathMapping {
                from: PathBuf::from("/data/media"),
                to: PathBuf::from("/media"),
            },
        ];

        assert_eq!(
            config.map_path(Path::new("/data/media/a/b.mp4")),
            PathBuf::from("/media/a/b.mp4")
        );
        assert_eq!(
            config.map_path(Path::new("/data/other.mp4")),
            PathBuf::from("/mnt/data/other.mp4")
        );
        // Prefixes match whole components only.
        assert_eq!(
            config.map_path(Path::new("/database/x.mp4")),
            PathBuf::from("/database/x.mp4")
        );
    }
}

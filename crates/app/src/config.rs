use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use quiz_core::SubSeed;
use services::QuizSourceConfig;

pub const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";

/// Command-line options; every flag but `--legacy-sub-seed` falls back to
/// its environment variable.
#[derive(Debug, Parser)]
#[command(name = "quiz", version, about = "Practice and exam sessions over multiple-choice quizzes")]
pub struct Args {
    /// Quiz to open; loads `{id}.json`.
    #[arg(long, env = "QUIZ_ID")]
    pub id: Option<String>,

    /// Starting mode when nothing is stored: `practice` or `exam`.
    #[arg(long, env = "QUIZ_MODE")]
    pub mode: Option<String>,

    /// Shuffle seed; any integer, wrapped into 32 bits.
    #[arg(long, env = "QUIZ_SEED", allow_hyphen_values = true)]
    pub seed: Option<String>,

    /// Directory holding quiz definitions.
    #[arg(long, env = "QUIZ_DATA_DIR", default_value = "data", conflicts_with = "base_url")]
    pub data: PathBuf,

    /// Fetch definitions from `{base-url}/data/{id}.json` instead.
    #[arg(long, env = "QUIZ_BASE_URL")]
    pub base_url: Option<String>,

    /// SQLite database for saved progress.
    #[arg(long, env = "QUIZ_DB_URL", default_value = DEFAULT_DB_URL)]
    pub db: String,

    /// Where `export` writes `{id}-results.json`.
    #[arg(long, env = "QUIZ_EXPORT_DIR", default_value = ".")]
    pub export_dir: PathBuf,

    /// Derive per-question seeds from the id length, matching older saves
    /// whose seed was generated rather than passed in.
    #[arg(long)]
    pub legacy_sub_seed: bool,
}

impl Args {
    #[must_use]
    pub fn source(&self) -> QuizSourceConfig {
        match &self.base_url {
            Some(base) => QuizSourceConfig::Http(base.clone()),
            None => QuizSourceConfig::Directory(self.data.clone()),
        }
    }

    #[must_use]
    pub fn sub_seed(&self) -> SubSeed {
        if self.legacy_sub_seed {
            SubSeed::IdLength
        } else {
            SubSeed::Fnv1a
        }
    }
}

/// Turn a bare path or `sqlite:` URL into an absolute `sqlite://` URL that
/// creates the file on first use. In-memory URLs pass through.
#[must_use]
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.contains("mode=memory") {
        return trimmed.to_owned();
    }

    let url = if trimmed.starts_with("sqlite://") {
        trimmed.to_owned()
    } else {
        let path = Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(path)
        };
        format!("sqlite://{}", absolute.display())
    };

    if url.contains('?') {
        url
    } else {
        format!("{url}?mode=rwc")
    }
}

/// Make sure the database file's directory exists.
///
/// # Errors
///
/// Fails for URLs without a path or when the directory cannot be created.
pub async fn prepare_sqlite_dir(db_url: &str) -> anyhow::Result<()> {
    if db_url == "sqlite::memory:" || db_url.contains("mode=memory") {
        return Ok(());
    }

    let Some(rest) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid --db value: {db_url}");
    };
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() {
        bail!("invalid --db value: {db_url}");
    }

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_forms_are_normalized() {
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/quiz.db"),
            "sqlite:///tmp/quiz.db?mode=rwc"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:/var/lib/quiz.db"),
            "sqlite:///var/lib/quiz.db?mode=rwc"
        );
        assert_eq!(normalize_sqlite_url(" /srv/q.db "), "sqlite:///srv/q.db?mode=rwc");
        assert_eq!(
            normalize_sqlite_url("sqlite://q.db?mode=ro"),
            "sqlite://q.db?mode=ro"
        );
    }

    #[test]
    fn relative_paths_become_absolute() {
        let url = normalize_sqlite_url("state/quiz.db");
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(
            url,
            format!("sqlite://{}?mode=rwc", cwd.join("state/quiz.db").display())
        );
    }

    #[test]
    fn memory_urls_pass_through() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        let shared = "sqlite:file:quiz?mode=memory&cache=shared";
        assert_eq!(normalize_sqlite_url(shared), shared);
    }

    #[tokio::test]
    async fn prepare_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested/deeper/quiz.db");
        let url = normalize_sqlite_url(&db.display().to_string());

        prepare_sqlite_dir(&url).await.unwrap();
        assert!(dir.path().join("nested/deeper").is_dir());
        assert!(prepare_sqlite_dir("sqlite://").await.is_err());
        assert!(prepare_sqlite_dir("sqlite::memory:").await.is_ok());
    }

    #[test]
    fn flags_select_source_and_sub_seed() {
        let args = Args::try_parse_from(["quiz", "--id", "net-1", "--seed", "-5"]).unwrap();
        assert_eq!(args.id.as_deref(), Some("net-1"));
        assert_eq!(args.seed.as_deref(), Some("-5"));
        assert_eq!(args.source(), QuizSourceConfig::Directory(PathBuf::from("data")));
        assert_eq!(args.sub_seed(), SubSeed::Fnv1a);

        let args = Args::try_parse_from([
            "quiz",
            "--base-url",
            "https://quiz.example",
            "--legacy-sub-seed",
        ])
        .unwrap();
        assert_eq!(
            args.source(),
            QuizSourceConfig::Http("https://quiz.example".into())
        );
        assert_eq!(args.sub_seed(), SubSeed::IdLength);
    }
}

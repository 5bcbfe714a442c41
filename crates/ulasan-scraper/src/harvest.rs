//! Runs the external `tweet-harvest` CLI as a child process.
//!
//! The child always writes its CSV to `tweets-data/<file>` relative to its
//! working directory. Each run gets a staging directory inside the data
//! directory; the finished file is moved up into the data directory and the
//! staging directory is removed. Each non-blank stdout line is relayed as
//! `[OUT] ...` and each stderr line as `[LOG] ...`.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use crate::error::ScraperError;
use crate::events::EventSink;

/// Shortest token the harvester will pass to the child.
const MIN_TOKEN_LEN: usize = 10;

/// Directory, relative to its cwd, that tweet-harvest writes into.
const CHILD_OUTPUT_DIR: &str = "tweets-data";

/// Which search timeline to scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tab {
    #[default]
    Latest,
    Top,
}

impl Tab {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Latest => "LATEST",
            Tab::Top => "TOP",
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments for one harvest run.
#[derive(Debug, Clone)]
pub struct HarvestArgs {
    /// Output file name, without directory.
    pub filename: String,
    pub search_keyword: String,
    pub limit: u32,
    pub token: String,
    pub tab: Tab,
}

#[derive(Debug, Clone)]
pub struct Harvester {
    bin: String,
    data_dir: PathBuf,
}

impl Harvester {
    #[must_use]
    pub fn new(bin: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin: bin.into(),
            data_dir: data_dir.into(),
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Per-run working directory for the child. Output names carry the job
    /// id, so concurrent runs never share one.
    fn staging_dir(&self, filename: &str) -> PathBuf {
        self.data_dir.join(format!(".harvest-{filename}"))
    }

    /// Run the child to completion and return the path of the CSV it wrote.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidToken`] for a token shorter than 10 chars.
    /// - [`ScraperError::HarvestSpawn`] if the binary cannot be started.
    /// - [`ScraperError::HarvestExit`] on a non-zero exit, carrying the
    ///   collected stderr.
    /// - [`ScraperError::HarvestOutputMissing`] if the child exits cleanly
    ///   without writing the file.
    pub async fn run(&self, args: &HarvestArgs, sink: &EventSink) -> Result<PathBuf, ScraperError> {
        if args.token.chars().count() < MIN_TOKEN_LEN {
            return Err(ScraperError::InvalidToken);
        }

        let staging = self.staging_dir(&args.filename);
        tokio::fs::create_dir_all(&staging)
            .await
            .map_err(|e| ScraperError::io(&staging, e))?;

        let result = self.run_in(&staging, args, sink).await;
        if let Err(e) = tokio::fs::remove_dir_all(&staging).await {
            tracing::warn!(error = %e, path = %staging.display(), "failed to remove staging dir");
        }
        result
    }

    async fn run_in(
        &self,
        staging: &Path,
        args: &HarvestArgs,
        sink: &EventSink,
    ) -> Result<PathBuf, ScraperError> {
        sink.log(format!("[START] {}", self.bin));
        sink.log(format!("[QUERY] {}", args.search_keyword));
        sink.log(format!("[LIMIT] {} tweets", args.limit));

        let limit = args.limit.to_string();
        let spawned = Command::new(&self.bin)
            .args([
                "-o",
                args.filename.as_str(),
                "-s",
                args.search_keyword.as_str(),
                "--tab",
                args.tab.as_str(),
                "-l",
                limit.as_str(),
                "--token",
                args.token.as_str(),
            ])
            .current_dir(staging)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(source) => {
                sink.log(format!("[ERROR] {source}"));
                return Err(ScraperError::HarvestSpawn {
                    bin: self.bin.clone(),
                    source,
                });
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let ((), stderr_text) = tokio::join!(
            relay_lines(stdout, "[OUT]", sink),
            collect_lines(stderr, "[LOG]", sink),
        );

        let status = child.wait().await.map_err(|source| {
            sink.log(format!("[ERROR] {source}"));
            ScraperError::HarvestSpawn {
                bin: self.bin.clone(),
                source,
            }
        })?;

        if !status.success() {
            let code = status.code();
            match code {
                Some(code) => sink.log(format!("[FAIL] Exit code: {code}")),
                None => sink.log("[FAIL] Exit code: signal"),
            }
            let message = if stderr_text.trim().is_empty() {
                "tweet-harvest gagal".to_string()
            } else {
                stderr_text
            };
            return Err(ScraperError::HarvestExit { code, message });
        }

        sink.log("[DONE] Scraping completed successfully");
        sink.log(format!("[FILE] {}", args.filename));

        let produced = staging.join(CHILD_OUTPUT_DIR).join(&args.filename);
        if tokio::fs::metadata(&produced).await.is_err() {
            return Err(ScraperError::HarvestOutputMissing(produced));
        }
        let output = self.data_dir.join(&args.filename);
        tokio::fs::rename(&produced, &output)
            .await
            .map_err(|e| ScraperError::io(&output, e))?;
        Ok(output)
    }
}

/// Relay every non-blank line with `tag`.
async fn relay_lines<R>(reader: Option<R>, tag: &str, sink: &EventSink)
where
    R: AsyncRead + Unpin,
{
    forward_lines(reader, tag, sink, |_| {}).await;
}

/// Relay every non-blank line with `tag` and return the raw text read.
async fn collect_lines<R>(reader: Option<R>, tag: &str, sink: &EventSink) -> String
where
    R: AsyncRead + Unpin,
{
    let mut collected = String::new();
    forward_lines(reader, tag, sink, |line| {
        collected.push_str(line);
        collected.push('\n');
    })
    .await;
    collected
}

async fn forward_lines<R, F>(reader: Option<R>, tag: &str, sink: &EventSink, mut on_line: F)
where
    R: AsyncRead + Unpin,
    F: FnMut(&str),
{
    let Some(reader) = reader else {
        return;
    };

    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                on_line(&line);
                if !line.trim().is_empty() {
                    sink.log(format!("{tag} {line}"));
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, tag, "stopped reading harvester output");
                break;
            }
        }
    }
}

#[cfg(test)]
#[path = "harvest_test.rs"]
mod tests;

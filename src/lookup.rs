//! One-shot lookups: the perfect match plus a ranked listing.

use std::fmt;

use futures_util::{StreamExt, TryStreamExt};
use mblookup_query::types::format_credits;
use mblookup_query::{
    Artist, CatalogEntity, EntityKind, Label, QueryClient, Recording, Release, RemoteFetcher,
    ResultItem, WindowedResultSet,
};

use crate::config::OutputConfig;
use crate::error::Result;

/// One-line, human-readable summary of a catalog record.
pub trait Describe {
    /// The summary printed for this record in a report.
    fn describe(&self) -> String;
}

impl Describe for Artist {
    fn describe(&self) -> String {
        let mut line = self.name.clone();
        match (&self.disambiguation, &self.country) {
            (Some(note), _) if !note.is_empty() => line.push_str(&format!(" ({note})")),
            (_, Some(country)) => line.push_str(&format!(" [{country}]")),
            _ => {}
        }
        line
    }
}

impl Describe for Release {
    fn describe(&self) -> String {
        let mut line = self.title.clone();
        if !self.artist_credit.is_empty() {
            line.push_str(" by ");
            line.push_str(&format_credits(&self.artist_credit));
        }
        if let Some(ref date) = self.date {
            line.push_str(&format!(" ({date})"));
        }
        line
    }
}

impl Describe for Recording {
    fn describe(&self) -> String {
        let mut line = self.title.clone();
        if !self.artist_credit.is_empty() {
            line.push_str(" by ");
            line.push_str(&format_credits(&self.artist_credit));
        }
        if let Some(ms) = self.length {
            let seconds = ms / 1000;
            line.push_str(&format!(" [{}:{:02}]", seconds / 60, seconds % 60));
        }
        line
    }
}

impl Describe for Label {
    fn describe(&self) -> String {
        match self.country {
            Some(ref country) => format!("{} [{country}]", self.name),
            None => self.name.clone(),
        }
    }
}

/// Outcome of a lookup, ready for printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupReport {
    pub kind: EntityKind,
    /// Total matches reported by the service.
    pub total: usize,
    /// The unambiguous perfect match, if any.
    pub perfect: Option<String>,
    /// Ranked results as `(score, summary)`.
    pub rows: Vec<(u8, String)>,
}

impl fmt::Display for LookupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} matches: {}", self.kind, self.total)?;
        if let Some(ref perfect) = self.perfect {
            writeln!(f, "perfect match: {perfect}")?;
        }
        for (score, summary) in &self.rows {
            writeln!(f, "{score:>3}  {summary}")?;
        }
        Ok(())
    }
}

/// Search `kind` for `terms` and build a report.
///
/// # Errors
///
/// Propagates query construction and fetch errors.
pub async fn lookup<F>(
    client: &QueryClient<F>,
    kind: EntityKind,
    terms: &str,
    output: &OutputConfig,
) -> Result<LookupReport>
where
    F: RemoteFetcher<Artist> + RemoteFetcher<Release> + RemoteFetcher<Recording> + RemoteFetcher<Label>,
{
    match kind {
        EntityKind::Artist => report(client.artists(terms)?, output).await,
        EntityKind::Release => report(client.releases(terms)?, output).await,
        EntityKind::Recording => report(client.recordings(terms)?, output).await,
        EntityKind::Label => report(client.labels(terms)?, output).await,
    }
}

/// Report on an existing result set.
///
/// Lists at most `output.max_results` results, stopping at the first one
/// below `output.min_score`.
pub async fn report<T, F>(
    mut results: WindowedResultSet<T, F>,
    output: &OutputConfig,
) -> Result<LookupReport>
where
    T: CatalogEntity + Describe + Clone + Send + Sync + 'static,
    F: RemoteFetcher<T>,
{
    let perfect = results.perfect_match().await?.map(|item| item.describe());
    let rows: Vec<(u8, String)> = results
        .best(output.min_score)
        .take(output.max_results)
        .map_ok(|item| (item.score(), item.describe()))
        .try_collect()
        .await?;
    let total = results.count().await?;
    tracing::info!(entity = %T::KIND, total, listed = rows.len(), "lookup complete");
    Ok(LookupReport {
        kind: T::KIND,
        total,
        perfect,
        rows,
    })
}

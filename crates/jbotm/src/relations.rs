//! Cross-reference enrichment.
//!
//! jbovlaste marks references to other words with braces (`{broda}`). Every
//! word's translations and contents are scanned for such references and each
//! one that names an entry of the same document becomes a [`Relation`].
//!
//! Lookups are bounded by a [`PartitionIndex`] keyed on the leading
//! character of each headword. The word list is split into contiguous
//! chunks that run on a bounded pool of blocking workers; results are
//! gathered as they complete and put back into input order.

use crate::content::USERNAME;
use crate::error::{OtmError, Result};
use crate::otm::{DictionaryWord, Entry, Relation};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Leading characters that get a partition; everything else is unindexed
pub const PARTITION_ALPHABET: &str = ".abcdefgijklmnoprstuvwxyzABCDEFGIJKLMNOPRSTUVWXYZ";

/// Entries bucketed by the first character of their form
#[derive(Debug, Clone, Default)]
pub struct PartitionIndex {
    buckets: HashMap<char, Vec<Entry>>,
}

impl PartitionIndex {
    /// Build the index; entries whose form starts outside
    /// [`PARTITION_ALPHABET`] are left out.
    pub fn build<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        let mut buckets: HashMap<char, Vec<Entry>> = PARTITION_ALPHABET
            .chars()
            .map(|c| (c, Vec::new()))
            .collect();

        for entry in entries {
            let Some(first) = entry.form.chars().next() else {
                continue;
            };
            if let Some(bucket) = buckets.get_mut(&first) {
                bucket.push(entry.clone());
            }
        }

        Self { buckets }
    }

    /// Entries whose form starts with `leading`
    pub fn bucket(&self, leading: char) -> &[Entry] {
        self.buckets.get(&leading).map(Vec::as_slice).unwrap_or_default()
    }

    /// Entries whose form is exactly `form`
    pub fn lookup<'a>(&'a self, form: &'a str) -> impl Iterator<Item = &'a Entry> {
        let bucket = form.chars().next().map(|c| self.bucket(c)).unwrap_or_default();
        bucket.iter().filter(move |e| e.form == form)
    }

    /// Entries a reference token points at. A trailing `.` is read as
    /// punctuation unless some form ends with it.
    pub fn resolve<'a>(&'a self, token: &'a str) -> impl Iterator<Item = &'a Entry> {
        let form = match token.strip_suffix('.') {
            Some(stripped) if !stripped.is_empty() && self.lookup(token).next().is_none() => {
                stripped
            }
            _ => token,
        };
        self.lookup(form)
    }

    /// Number of indexed entries
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Words referenced with `{...}` markup in `text`
pub fn references(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let open = rest.find('{')?;
        let after = &rest[open + 1..];
        let close = after.find('}')?;
        rest = &after[close + 1..];
        Some(&after[..close])
    })
    .flat_map(|inner| inner.split(|c: char| c.is_whitespace() || c == ','))
    .map(|token| token.trim_matches(|c: char| !(c.is_alphanumeric() || c == '.' || c == '\'')))
    .filter(|token| !token.is_empty())
}

/// Relations for `word`, in order of first mention
pub fn find_relations(word: &DictionaryWord, index: &PartitionIndex) -> Vec<Relation> {
    let translation_texts = word
        .translations
        .iter()
        .flat_map(|t| t.forms.iter().map(move |f| (t.title.as_str(), f.as_str())));
    let content_texts = word
        .contents
        .iter()
        .filter(|c| c.title != USERNAME)
        .map(|c| (c.title.as_str(), c.text.as_str()));

    let mut relations: Vec<Relation> = Vec::new();
    for (title, text) in translation_texts.chain(content_texts) {
        for token in references(text) {
            for entry in index.resolve(token) {
                if *entry == word.entry || relations.iter().any(|r| r.entry == *entry) {
                    continue;
                }
                relations.push(Relation {
                    title: title.to_string(),
                    entry: entry.clone(),
                });
            }
        }
    }
    relations
}

/// Attach relations to every word of one chunk
pub fn add_relations_for_chunk(
    words: Vec<DictionaryWord>,
    index: &PartitionIndex,
) -> Vec<DictionaryWord> {
    words
        .into_iter()
        .map(|mut word| {
            word.relations = find_relations(&word, index);
            word
        })
        .collect()
}

/// Worker pool settings for [`enrich`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichOptions {
    /// Maximum number of chunks processed at once
    pub workers: usize,
    /// Number of contiguous chunks the word list is split into
    pub chunks: usize,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            workers: 8,
            chunks: 8,
        }
    }
}

/// Populate relations for the whole word list in parallel.
///
/// Output order matches input order. If any chunk fails the whole pass
/// fails and no words are returned.
pub async fn enrich(words: Vec<DictionaryWord>, opts: EnrichOptions) -> Result<Vec<DictionaryWord>> {
    enrich_with(words, opts, add_relations_for_chunk).await
}

/// [`enrich`] with a caller-supplied per-chunk worker
pub async fn enrich_with<F>(
    words: Vec<DictionaryWord>,
    opts: EnrichOptions,
    worker: F,
) -> Result<Vec<DictionaryWord>>
where
    F: Fn(Vec<DictionaryWord>, &PartitionIndex) -> Vec<DictionaryWord> + Send + Sync + 'static,
{
    let total = words.len();
    if total == 0 {
        return Ok(words);
    }

    let start = Instant::now();
    let index = Arc::new(PartitionIndex::build(words.iter().map(|w| &w.entry)));
    let worker = Arc::new(worker);
    let permits = Arc::new(Semaphore::new(opts.workers.max(1)));
    let chunk_size = total.div_ceil(opts.chunks.max(1));

    tracing::info!(
        words = total,
        indexed = index.len(),
        chunk_size,
        workers = opts.workers,
        "adding relations"
    );

    let mut tasks = JoinSet::new();
    let mut chunk_count = 0;
    let mut remaining = words.into_iter();
    loop {
        let chunk: Vec<DictionaryWord> = remaining.by_ref().take(chunk_size).collect();
        if chunk.is_empty() {
            break;
        }

        let id = chunk_count;
        chunk_count += 1;
        let index = Arc::clone(&index);
        let worker = Arc::clone(&worker);
        let permits = Arc::clone(&permits);

        tasks.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|e| OtmError::enrichment(id, e))?;
            tokio::task::spawn_blocking(move || (*worker)(chunk, index.as_ref()))
                .await
                .map(|words| (id, words))
                .map_err(|e| OtmError::enrichment(id, e))
        });
    }

    let mut finished: Vec<Option<Vec<DictionaryWord>>> = vec![None; chunk_count];
    let mut done = 0;
    while let Some(joined) = tasks.join_next().await {
        let (id, chunk) = joined.map_err(|e| OtmError::Enrichment {
            chunk: None,
            message: e.to_string(),
        })??;
        done += chunk.len();
        tracing::info!("{}/{} words done", done, total);
        finished[id] = Some(chunk);
    }

    tracing::info!(
        "relations added in {:.1} sec",
        start.elapsed().as_secs_f64()
    );

    Ok(finished.into_iter().flatten().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otm::{Content, Translation};

    fn word(form: &str, id: i64, text: &str) -> DictionaryWord {
        DictionaryWord {
            entry: Entry::new(form, id),
            translations: vec![Translation {
                title: "gismu".to_string(),
                forms: vec![text.to_string()],
            }],
            tags: Vec::new(),
            contents: vec![Content::new(USERNAME, "officialdata")],
            variations: Vec::new(),
            relations: Vec::new(),
        }
    }

    fn related_forms(word: &DictionaryWord) -> Vec<&str> {
        word.relations.iter().map(|r| r.entry.form.as_str()).collect()
    }

    #[test]
    fn test_references_extracts_braced_words() {
        let refs: Vec<&str> =
            references("see {broda}, {brode brodi} and {.i}; not broda {").collect();

        assert_eq!(refs, vec!["broda", "brode", "brodi", ".i"]);
    }

    #[test]
    fn test_references_trims_punctuation() {
        let refs: Vec<&str> = references("{(klama),} {ba'e!} {  }").collect();

        assert_eq!(refs, vec!["klama", "ba'e"]);
    }

    #[test]
    fn test_references_split_on_commas() {
        let refs: Vec<&str> = references("{lo broda.} {.i} {broda,brode}").collect();

        assert_eq!(refs, vec!["lo", "broda.", ".i", "broda", "brode"]);
    }

    #[test]
    fn test_resolve_trailing_full_stop() {
        let index = PartitionIndex::build(&[
            Entry::new("broda", 1),
            Entry::new(".i", 2),
            Entry::new("ba.", 3),
            Entry::new("ba", 4),
        ]);

        assert_eq!(index.resolve("broda.").collect::<Vec<_>>(), vec![&Entry::new("broda", 1)]);
        assert_eq!(index.resolve(".i").collect::<Vec<_>>(), vec![&Entry::new(".i", 2)]);
        assert_eq!(index.resolve("ba.").collect::<Vec<_>>(), vec![&Entry::new("ba.", 3)]);
        assert_eq!(index.resolve(".").count(), 0);
        assert_eq!(index.resolve("klama.").count(), 0);
    }

    #[test]
    fn test_find_relations_with_punctuated_references() {
        let index = PartitionIndex::build(&[
            Entry::new("broda", 1),
            Entry::new("brode", 2),
            Entry::new("brodi", 3),
        ]);
        let w = word("klama", 9, "see {lo broda.} and {brode,brodi}");

        let forms: Vec<String> = find_relations(&w, &index)
            .into_iter()
            .map(|r| r.entry.form)
            .collect();

        assert_eq!(forms, vec!["broda", "brode", "brodi"]);
    }

    #[test]
    fn test_index_partitions_by_leading_char() {
        let entries = vec![
            Entry::new("broda", 1),
            Entry::new("brode", 2),
            Entry::new("klama", 3),
            Entry::new("Alis", 4),
            Entry::new("'a", 5),
            Entry::new("hu", 6),
        ];
        let index = PartitionIndex::build(&entries);

        assert_eq!(index.bucket('b').len(), 2);
        assert_eq!(index.bucket('A').len(), 1);
        assert!(index.bucket('\'').is_empty());
        assert!(index.bucket('h').is_empty());
        assert_eq!(index.len(), 4);
        assert_eq!(index.lookup("klama").count(), 1);
        assert_eq!(index.lookup("klam").count(), 0);
    }

    #[test]
    fn test_find_relations_skips_self_and_duplicates() {
        let index = PartitionIndex::build(&[Entry::new("broda", 1), Entry::new("brode", 2)]);
        let mut w = word("broda", 1, "like {brode}, unlike {broda}");
        w.contents.insert(0, Content::new("notes", "also {brode} and {klama}"));

        let relations = find_relations(&w, &index);

        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].entry, Entry::new("brode", 2));
        assert_eq!(relations[0].title, "gismu");
    }

    #[test]
    fn test_username_is_not_scanned() {
        let index = PartitionIndex::build(&[Entry::new("brode", 2)]);
        let mut w = word("broda", 1, "nothing");
        w.contents = vec![Content::new(USERNAME, "{brode}")];

        assert!(find_relations(&w, &index).is_empty());
    }

    #[test]
    fn test_relation_title_names_content_block() {
        let index = PartitionIndex::build(&[Entry::new("brode", 2)]);
        let mut w = word("broda", 1, "nothing");
        w.contents.insert(0, Content::new("notes", "cf. {brode}"));

        assert_eq!(find_relations(&w, &index)[0].title, "notes");
    }

    #[tokio::test]
    async fn test_out_of_alphabet_headword_gets_no_relations() {
        let words = vec![
            word("'u", 1, "see {'e} and {broda}"),
            word("'e", 2, "see {'u}"),
            word("broda", 3, "see {'u}"),
        ];

        let enriched = enrich(words, EnrichOptions::default())
            .await
            .expect("enrichment succeeds");

        assert_eq!(related_forms(&enriched[0]), vec!["broda"]);
        assert!(enriched[1].relations.is_empty());
        assert!(enriched[2].relations.is_empty());
    }

    #[tokio::test]
    async fn test_sixteen_words_in_eight_chunks() {
        // Each word points at its neighbour two places ahead, which always
        // lands in a different chunk of two.
        let forms: Vec<String> = (0..16).map(|i| format!("b{i:02}")).collect();
        let words: Vec<DictionaryWord> = (0..16)
            .map(|i| {
                let target = &forms[(i + 2) % 16];
                let local = &forms[i ^ 1];
                word(&forms[i], i as i64, &format!("{{{target}}} {{{local}}}"))
            })
            .collect();

        let enriched = enrich(words, EnrichOptions::default())
            .await
            .expect("enrichment succeeds");

        assert_eq!(enriched.len(), 16);
        for (i, w) in enriched.iter().enumerate() {
            assert_eq!(w.entry.form, forms[i]);
            assert_eq!(
                related_forms(w),
                vec![forms[(i + 2) % 16].as_str(), forms[i ^ 1].as_str()]
            );
        }
    }

    #[tokio::test]
    async fn test_result_independent_of_completion_order() {
        let words: Vec<DictionaryWord> = (0..40)
            .map(|i| word(&format!("k{i}"), i, &format!("{{k{}}} {{k{}}}", (i * 7) % 40, (i + 1) % 40)))
            .collect();

        let baseline = enrich(words.clone(), EnrichOptions { workers: 1, chunks: 1 })
            .await
            .expect("enrichment succeeds");

        // Later chunks finish first
        let reversed = enrich_with(words, EnrichOptions { workers: 8, chunks: 8 }, |chunk, index| {
            let delay = 5 * chunk.len() as u64 + 40u64.saturating_sub(chunk[0].entry.id as u64);
            std::thread::sleep(std::time::Duration::from_millis(delay));
            add_relations_for_chunk(chunk, index)
        })
        .await
        .expect("enrichment succeeds");

        assert_eq!(baseline, reversed);
    }

    #[tokio::test]
    async fn test_uneven_chunks_keep_every_word() {
        let words: Vec<DictionaryWord> = (0..5).map(|i| word(&format!("d{i}"), i, "")).collect();

        let enriched = enrich(words.clone(), EnrichOptions { workers: 3, chunks: 8 })
            .await
            .expect("enrichment succeeds");

        assert_eq!(enriched, words);
    }

    #[tokio::test]
    async fn test_worker_failure_fails_the_pass() {
        let words: Vec<DictionaryWord> = (0..16).map(|i| word(&format!("f{i}"), i, "")).collect();

        let result = enrich_with(words, EnrichOptions::default(), |chunk, index| {
            if chunk.iter().any(|w| w.entry.id == 9) {
                panic!("worker blew up");
            }
            add_relations_for_chunk(chunk, index)
        })
        .await;

        assert!(matches!(result, Err(OtmError::Enrichment { chunk: Some(4), .. })));
    }

    #[tokio::test]
    async fn test_empty_list() {
        let enriched = enrich(Vec::new(), EnrichOptions::default())
            .await
            .expect("enrichment succeeds");

        assert!(enriched.is_empty());
    }
}

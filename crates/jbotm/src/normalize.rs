use crate::content::extract_contents;
use crate::otm::{DictionaryWord, Entry, Translation};
use crate::raw::RawEntry;

pub const UNOFFICIAL_TAG: &str = "unofficial";

/// Turn one raw record into an OTM word with empty relations.
///
/// A definition id that is not an integer does not abort the run: the
/// headword is reported and the entry gets [`Entry::DEGRADED_ID`].
pub fn normalize(raw: &RawEntry) -> DictionaryWord {
    let id = match raw.definitionid.trim().parse::<i64>() {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(
                word = %raw.word,
                definitionid = %raw.definitionid,
                "unparseable definition id: {}",
                e
            );
            Entry::DEGRADED_ID
        }
    };

    let title = match &raw.selmaho {
        Some(selmaho) => format!("{}: {}", raw.word_type, selmaho),
        None => raw.word_type.clone(),
    };

    let mut tags = Vec::new();
    if raw.is_unofficial() {
        tags.push(UNOFFICIAL_TAG.to_string());
    }

    DictionaryWord {
        entry: Entry::new(raw.word.as_str(), id),
        translations: vec![Translation {
            title,
            forms: vec![raw.definition.clone()],
        }],
        tags,
        contents: extract_contents(raw),
        variations: Vec::new(),
        relations: Vec::new(),
    }
}

//! Per-language post-processing of normalized words.
//!
//! Each [`Tweak`] is a pure `DictionaryWord -> DictionaryWord` transform.
//! Languages select an ordered list of them through configuration.

use crate::content::{GLOSS, KEYWORD, NOTES, RAFSI, USERNAME};
use crate::otm::DictionaryWord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reserved marker jbovlaste wraps around place-structure variables (`$x_1$`)
pub const RESERVED_MARKER: char = '$';

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Tweak {
    /// Tidy whitespace inside notes
    GoodNotes,
    /// Fold the keyword block into the gloss block
    IntegrateGloss,
    /// Reorder content blocks canonically
    SortContents,
    /// Drop notes blocks with no text
    DeleteEmptyNotes,
    /// Strip [`RESERVED_MARKER`] from translations and contents
    NoDollar,
}

impl Tweak {
    pub const ALL: [Tweak; 5] = [
        Tweak::GoodNotes,
        Tweak::IntegrateGloss,
        Tweak::SortContents,
        Tweak::DeleteEmptyNotes,
        Tweak::NoDollar,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tweak::GoodNotes => "good-notes",
            Tweak::IntegrateGloss => "integrate-gloss",
            Tweak::SortContents => "sort-contents",
            Tweak::DeleteEmptyNotes => "delete-empty-notes",
            Tweak::NoDollar => "no-dollar",
        }
    }

    pub fn apply(self, word: DictionaryWord) -> DictionaryWord {
        match self {
            Tweak::GoodNotes => good_notes(word),
            Tweak::IntegrateGloss => integrate_gloss(word),
            Tweak::SortContents => sort_contents(word),
            Tweak::DeleteEmptyNotes => delete_empty_notes(word),
            Tweak::NoDollar => strip_marker(word),
        }
    }
}

impl fmt::Display for Tweak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tweak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tweak::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("unknown tweak: {s}"))
    }
}

/// Run `tweaks` over `word` in order
pub fn apply_all(tweaks: &[Tweak], word: DictionaryWord) -> DictionaryWord {
    tweaks.iter().fold(word, |word, tweak| tweak.apply(word))
}

fn good_notes(mut word: DictionaryWord) -> DictionaryWord {
    for content in word.contents.iter_mut().filter(|c| c.title == NOTES) {
        content.text = tidy_lines(&content.text);
    }
    word
}

fn tidy_lines(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() && lines.last().is_none_or(|l| l.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

fn integrate_gloss(mut word: DictionaryWord) -> DictionaryWord {
    let Some(kw_pos) = word.contents.iter().position(|c| c.title == KEYWORD) else {
        return word;
    };

    match word.contents.iter().position(|c| c.title == GLOSS) {
        Some(gloss_pos) => {
            let keyword = word.contents.remove(kw_pos);
            let gloss_pos = if kw_pos < gloss_pos {
                gloss_pos - 1
            } else {
                gloss_pos
            };
            let gloss = &mut word.contents[gloss_pos];
            gloss.text.push('\n');
            gloss.text.push_str(&keyword.text);
        }
        None => word.contents[kw_pos].title = GLOSS.into(),
    }
    word
}

fn content_rank(title: &str) -> usize {
    match title {
        NOTES => 0,
        GLOSS => 1,
        KEYWORD => 2,
        RAFSI => 3,
        USERNAME => 5,
        _ => 4,
    }
}

fn sort_contents(mut word: DictionaryWord) -> DictionaryWord {
    word.contents.sort_by_key(|c| content_rank(&c.title));
    word
}

fn delete_empty_notes(mut word: DictionaryWord) -> DictionaryWord {
    word.contents
        .retain(|c| !(c.title == NOTES && c.text.trim().is_empty()));
    word
}

fn strip_marker(mut word: DictionaryWord) -> DictionaryWord {
    let strip = |s: &mut String| s.retain(|c| c != RESERVED_MARKER);

    // Headwords and titles are left alone; the form is the relation join key
    for translation in &mut word.translations {
        translation.forms.iter_mut().for_each(strip);
    }
    for content in &mut word.contents {
        strip(&mut content.text);
    }
    word
}

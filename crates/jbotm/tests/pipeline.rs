use jbotm::config::Config;
use jbotm::otm::{Document, Entry};
use jbotm::pipeline::{Generator, RunOptions, build_words};
use jbotm::raw::{RawEntry, User};
use jbotm::relations::{EnrichOptions, enrich};
use std::fs::{self, File};
use std::path::Path;
use zip::ZipArchive;

const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<dictionary>
<direction from="lojban" to="English">
<valsi word="broda" type="gismu">
  <definition>$x_1$ is a predicate; see {brode}</definition>
  <definitionid>1</definitionid>
  <notes>Compare {klama} and {hehe}. Also {broda} itself.</notes>
  <user><username>officialdata</username></user>
</valsi>
<valsi word="brode" type="gismu">
  <definition>$x_1$ is another predicate</definition>
  <definitionid>2</definitionid>
  <notes>Like {broda}, {broda}.</notes>
  <user><username>officialdata</username></user>
</valsi>
<valsi word="klama" type="gismu">
  <rafsi>kla</rafsi>
  <definition>$x_1$ comes/goes to $x_2$</definition>
  <definitionid>3</definitionid>
  <glossword word="come" />
  <user><username>officialdata</username></user>
</valsi>
<valsi word="hehe" type="experimental cmavo" unofficial="true">
  <definition>laughter</definition>
  <definitionid>four</definitionid>
  <user><username>someone</username></user>
</valsi>
</direction>
</dictionary>
"#;

fn config_in(dir: &Path) -> Config {
    let mut config = Config::default();
    config.paths.cache = dir.join("json");
    config.paths.xml = dir.join("xml");
    config.paths.output = dir.join("otm-json");
    config.paths.archive = dir.join("zip");
    config
}

#[tokio::test]
async fn test_export_to_archived_dictionary() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("xml")).expect("xml dir");
    fs::write(dir.path().join("xml").join("jbo-en.xml"), EXPORT).expect("write export");

    let config = config_in(dir.path());
    let langs = config.resolve_languages("en").expect("valid languages");
    let options = RunOptions {
        add_relations: true,
        no_dollar: false,
        zip: true,
    };

    let written = Generator::from_config(config, options)
        .run(&langs)
        .await
        .expect("generates");

    // The XML export was cached for the next run
    assert!(dir.path().join("json").join("jbo-en.json").is_file());

    let doc = Document::read_from(&written[0]).expect("reads output");
    assert_eq!(doc.meta.lang.to, "en");
    assert_eq!(doc.words.len(), 4);

    let broda = &doc.words[0];
    let related: Vec<(&str, &Entry)> = broda
        .relations
        .iter()
        .map(|r| (r.title.as_str(), &r.entry))
        .collect();
    assert_eq!(
        related,
        vec![
            ("gismu", &Entry::new("brode", 2)),
            ("notes", &Entry::new("klama", 3)),
        ]
    );

    let brode = &doc.words[1];
    assert_eq!(brode.relations.len(), 1);
    assert_eq!(brode.relations[0].entry, Entry::new("broda", 1));

    let hehe = &doc.words[3];
    assert_eq!(hehe.entry, Entry::new("hehe", Entry::DEGRADED_ID));
    assert_eq!(hehe.tags, vec!["unofficial"]);

    let mut archive = ZipArchive::new(
        File::open(dir.path().join("zip").join("en-otmjson.zip")).expect("open archive"),
    )
    .expect("valid zip");
    assert_eq!(archive.len(), 1);
    assert_eq!(
        archive.by_index(0).expect("entry").name(),
        "jbo-en_otm.json"
    );
}

#[tokio::test]
async fn test_cache_is_preferred_over_export() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("xml")).expect("xml dir");
    fs::write(dir.path().join("xml").join("jbo-eo.xml"), EXPORT).expect("write export");

    let generator = Generator::from_config(config_in(dir.path()), RunOptions::default());
    let first = generator.generate("eo").await.expect("from export");

    // Once cached, the export is no longer consulted
    fs::remove_file(dir.path().join("xml").join("jbo-eo.xml")).expect("remove export");
    let second = generator.generate("eo").await.expect("from cache");

    assert_eq!(first.words, second.words);
}

#[tokio::test]
async fn test_missing_language_data() {
    let dir = tempfile::tempdir().expect("tempdir");
    let generator = Generator::from_config(config_in(dir.path()), RunOptions::default());

    let err = generator.generate("fr").await.expect_err("nothing to read");

    assert!(err.to_string().contains("fr"));
    assert!(!dir.path().join("otm-json").exists());
}

fn numbered_entries(n: usize) -> Vec<RawEntry> {
    (0..n)
        .map(|i| RawEntry {
            word: format!("ba{i}"),
            word_type: "lujvo".to_string(),
            definitionid: i.to_string(),
            definition: format!("like {{ba{}}}", (i + 1) % n),
            notes: Some(format!("see {{ba{} ba{}}}", (i * 7) % n, (i * 3 + 2) % n)),
            user: User {
                username: "tester".to_string(),
                realname: None,
            },
            ..Default::default()
        })
        .collect()
}

#[tokio::test]
async fn test_enrichment_independent_of_pool_shape() {
    let words = build_words(&numbered_entries(53), &[]);

    let baseline = enrich(
        words.clone(),
        EnrichOptions {
            workers: 1,
            chunks: 1,
        },
    )
    .await
    .expect("sequential pass");

    for (workers, chunks) in [(2, 3), (8, 8), (4, 17), (16, 53), (3, 100)] {
        let enriched = enrich(words.clone(), EnrichOptions { workers, chunks })
            .await
            .expect("parallel pass");
        assert_eq!(enriched, baseline, "workers={workers} chunks={chunks}");
    }

    let forms: Vec<&str> = baseline.iter().map(|w| w.entry.form.as_str()).collect();
    let expected: Vec<String> = (0..53).map(|i| format!("ba{i}")).collect();
    assert_eq!(forms, expected);
    assert_eq!(baseline[1].relations[0].entry, Entry::new("ba2", 2));
}

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, warn};

use super::{SuggestError, SuggestionGenerator, Suggestions};
use crate::lang::LanguageCode;

const MIN_WORD_CHARS: usize = 2;

/// Suggests the most frequent words of a plain-text corpus.
///
/// Corpora live at `<dir>/<code>.txt`, where `<code>` is the language tag, or
/// the ISO 639-1 code for well-known language items (`Q1860` reads `en.txt`).
/// The file is re-read on every call.
pub struct CorpusGenerator {
    dir: PathBuf,
}

impl CorpusGenerator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn corpus_path(&self, language: &LanguageCode) -> Result<PathBuf, SuggestError> {
        let code = language
            .resource_code()
            .ok_or_else(|| SuggestError::UnsupportedLanguage(language.to_string()))?;
        Ok(self.dir.join(format!("{code}.txt")))
    }
}

impl SuggestionGenerator for CorpusGenerator {
    fn generate(&self, language: &LanguageCode) -> Result<Suggestions<'_>, SuggestError> {
        let path = self.corpus_path(language)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no corpus for language");
                return Err(SuggestError::UnsupportedLanguage(language.to_string()));
            }
            Err(source) => return Err(SuggestError::Corpus { path, source }),
        };

        let text = decode_corpus(&bytes, &path);
        let ranked = rank_words(&text);
        debug!(path = %path.display(), words = ranked.len(), "corpus ranked");
        Ok(Box::new(ranked.into_iter()))
    }
}

/// Decode honouring a UTF-8/UTF-16 BOM; UTF-8 otherwise.
fn decode_corpus(bytes: &[u8], path: &Path) -> String {
    let (encoding, bom_len) = Encoding::for_bom(bytes).unwrap_or((UTF_8, 0));
    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
    if had_errors {
        warn!(path = %path.display(), encoding = encoding.name(), "corpus contains invalid sequences");
    }
    text.into_owned()
}

/// Lowercased words, most frequent first; ties alphabetical.
fn rank_words(text: &str) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for word in tokenize(text) {
        *counts.entry(word).or_default() += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.cmp(b)));
    ranked.into_iter().map(|(word, _)| word).collect()
}

/// Alphabetic runs; `'` and `-` are kept inside a word but not at its edges.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphabetic() && c != '\'' && c != '-')
        .map(|w| w.trim_matches(['\'', '-']))
        .filter(|w| w.chars().count() >= MIN_WORD_CHARS)
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn corpus_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    fn lang(code: &str) -> LanguageCode {
        LanguageCode::parse(code).unwrap()
    }

    fn words(generator: &CorpusGenerator, code: &str) -> Vec<String> {
        generator.generate(&lang(code)).unwrap().collect()
    }

    #[test]
    fn ranks_by_frequency_then_alphabetically() {
        let dir = corpus_dir(&[("en.txt", "The cat saw the dog. A dog saw THE bird!")]);
        let generator = CorpusGenerator::new(dir.path());

        assert_eq!(words(&generator, "en"), vec!["the", "dog", "saw", "bird", "cat"]);
    }

    #[test]
    fn keeps_inner_apostrophes_and_hyphens() {
        let dir = corpus_dir(&[("fr.txt", "aujourd'hui -- peut-être 'quoi' l'été")]);
        let generator = CorpusGenerator::new(dir.path());

        let ranked = words(&generator, "fr");
        assert!(ranked.contains(&"aujourd'hui".to_string()), "got: {ranked:?}");
        assert!(ranked.contains(&"peut-être".to_string()));
        assert!(ranked.contains(&"quoi".to_string()));
        assert!(ranked.contains(&"l'été".to_string()));
    }

    #[test]
    fn language_item_reads_iso_corpus() {
        let dir = corpus_dir(&[("en.txt", "hello hello world")]);
        let generator = CorpusGenerator::new(dir.path());

        assert_eq!(words(&generator, "Q1860"), vec!["hello", "world"]);
    }

    #[test]
    fn missing_corpus_is_unsupported() {
        let dir = corpus_dir(&[]);
        let generator = CorpusGenerator::new(dir.path());

        let err = generator.generate(&lang("de")).err().unwrap();
        assert!(matches!(err, SuggestError::UnsupportedLanguage(ref l) if l == "de"));
    }

    #[test]
    fn unknown_language_item_is_unsupported() {
        let generator = CorpusGenerator::new(std::env::temp_dir());
        let err = generator.generate(&lang("Q999999999")).err().unwrap();
        assert!(matches!(err, SuggestError::UnsupportedLanguage(_)));
    }

    #[test]
    fn empty_corpus_yields_nothing() {
        let dir = corpus_dir(&[("kw.txt", "  12 34 ... \n")]);
        let generator = CorpusGenerator::new(dir.path());

        assert!(words(&generator, "kw").is_empty());
    }

    #[test]
    fn decodes_utf16_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "größe größe maß".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let dir = corpus_dir(&[]);
        fs::write(dir.path().join("de.txt"), &bytes).unwrap();
        let generator = CorpusGenerator::new(dir.path());

        assert_eq!(words(&generator, "de"), vec!["größe", "maß"]);
    }

    #[test]
    fn each_call_rereads_the_corpus() {
        let dir = corpus_dir(&[("en.txt", "alpha")]);
        let generator = CorpusGenerator::new(dir.path());
        assert_eq!(words(&generator, "en"), vec!["alpha"]);

        fs::write(dir.path().join("en.txt"), "beta beta").unwrap();
        assert_eq!(words(&generator, "en"), vec!["beta"]);
    }
}

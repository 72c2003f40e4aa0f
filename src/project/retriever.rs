//! Keyword scoring and budgeted context packing over a [`ProjectIndex`].
//!
//! Scoring is deliberately simple: whitespace tokens of the question are
//! counted in each block body, block names that contain a token earn a flat
//! bonus, and questions carrying a Python traceback boost blocks that raise
//! and blocks from the file the trace points at. The weights are exposed as
//! [`ScoreWeights`] so they can be tuned from configuration.

use tracing::debug;

use super::error::ProjectError;
use super::index::{BlockEntry, ProjectIndex};
use super::symbols::FILE_SCOPE_LABEL;

pub const DEFAULT_CHAR_BUDGET: usize = 12000;
pub const DEFAULT_FALLBACK_BLOCKS: usize = 5;

const TRACEBACK_MARKER: &str = "Traceback";
const RAISE_KEYWORD: &str = "raise";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreWeights {
    /// Added per occurrence of a question token in the block body.
    pub token: u64,
    /// Added once per question token found inside the block name.
    pub name: u64,
    /// Added per `raise` in the body when the question holds a traceback.
    pub raise: u64,
    /// Added when the block lives in the file a traceback points at.
    pub traceback_file: u64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            token: 2,
            name: 5,
            raise: 3,
            traceback_file: 20,
        }
    }
}

/// A question split into the pieces scoring needs.
struct QueryTerms {
    tokens: Vec<String>,
    has_traceback: bool,
}

impl QueryTerms {
    fn new(question: &str) -> Self {
        Self {
            tokens: question.split_whitespace().map(str::to_lowercase).collect(),
            has_traceback: question.contains(TRACEBACK_MARKER),
        }
    }

    fn score(&self, body: &str, name: Option<&str>, weights: &ScoreWeights) -> u64 {
        let body = body.to_lowercase();
        let name = name.map(str::to_lowercase);
        let mut score = 0;

        for token in &self.tokens {
            score += weights.token * body.matches(token.as_str()).count() as u64;
            if name.as_deref().is_some_and(|name| name.contains(token.as_str())) {
                score += weights.name;
            }
        }
        if self.has_traceback {
            score += weights.raise * body.matches(RAISE_KEYWORD).count() as u64;
        }
        score
    }
}

/// Relevance of one block to a question, before any traceback-file bonus.
pub fn score_block(question: &str, body: &str, name: Option<&str>, weights: &ScoreWeights) -> u64 {
    QueryTerms::new(question).score(body, name, weights)
}

/// File name a pasted Python traceback points at, if any.
///
/// Looks for the first line mentioning both `.py` and `File` that has a
/// double-quoted path, and returns that path's base name. Lines that do not
/// parse are ignored.
pub fn detect_traceback_target(question: &str) -> Option<String> {
    if !question.contains(TRACEBACK_MARKER) {
        return None;
    }
    question
        .lines()
        .filter(|line| line.contains(".py") && line.contains("File"))
        .find_map(|line| {
            let quoted = line.split('"').nth(1)?;
            let base = quoted.rsplit(['/', '\\']).next().unwrap_or(quoted);
            (!base.is_empty()).then(|| base.to_string())
        })
}

/// One block packed into an injection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedSection {
    pub path: String,
    pub name: Option<String>,
    pub score: u64,
    pub chars: usize,
}

impl RankedSection {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(FILE_SCOPE_LABEL)
    }
}

/// Result of [`Retriever::query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retrieval {
    pub injection: String,
    pub sections: Vec<RankedSection>,
    /// Distinct contributing files, in the order they first contributed.
    pub used_files: Vec<String>,
    pub used_chars: usize,
    /// True when nothing scored and the first blocks were used instead.
    pub fell_back: bool,
    pub traceback_target: Option<String>,
}

impl Retrieval {
    /// Message sent to the model: the injection followed by the question.
    pub fn prompt(&self, question: &str) -> String {
        format!(
            "Answer using the relevant project code below.\n{}\nQuestion: {}\n",
            self.injection, question
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retriever {
    pub weights: ScoreWeights,
    pub char_budget: usize,
    pub fallback_blocks: usize,
}

impl Default for Retriever {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            char_budget: DEFAULT_CHAR_BUDGET,
            fallback_blocks: DEFAULT_FALLBACK_BLOCKS,
        }
    }
}

impl Retriever {
    pub fn new(char_budget: usize) -> Self {
        Self {
            char_budget,
            ..Default::default()
        }
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Rank every block against `question` and pack the best ones into an
    /// injection of at most `char_budget` body characters.
    ///
    /// Packing is greedy in rank order and stops at the first block that
    /// would overflow the budget.
    pub fn query(&self, question: &str, index: &ProjectIndex) -> Result<Retrieval, ProjectError> {
        if index.is_empty() {
            return Err(ProjectError::EmptyIndex);
        }

        let terms = QueryTerms::new(question);
        let traceback_target = detect_traceback_target(question);

        let mut ranked: Vec<(u64, BlockEntry<'_>)> = index
            .blocks()
            .filter_map(|block| {
                let mut score = terms.score(block.body, block.name, &self.weights);
                if let Some(target) = &traceback_target {
                    if block.path.contains(target.as_str()) {
                        score += self.weights.traceback_file;
                    }
                }
                (score > 0).then_some((score, block))
            })
            .collect();

        let fell_back = ranked.is_empty();
        if fell_back {
            ranked = index
                .blocks()
                .take(self.fallback_blocks)
                .map(|block| (1, block))
                .collect();
        }

        // Stable: equal scores keep index order.
        ranked.sort_by(|a, b| b.0.cmp(&a.0));

        let mut retrieval = Retrieval {
            injection: String::new(),
            sections: Vec::new(),
            used_files: Vec::new(),
            used_chars: 0,
            fell_back,
            traceback_target,
        };

        for (score, block) in ranked {
            let chars = block.body.chars().count();
            if retrieval.used_chars + chars > self.char_budget {
                break;
            }
            retrieval.injection.push_str(&format!(
                "\n[File: {} | Symbol: {} | Score: {}]\n```\n{}\n```\n",
                block.path,
                block.display_name(),
                score,
                block.body
            ));
            retrieval.used_chars += chars;
            if !retrieval.used_files.iter().any(|path| path == block.path) {
                retrieval.used_files.push(block.path.to_string());
            }
            retrieval.sections.push(RankedSection {
                path: block.path.to_string(),
                name: block.name.map(str::to_string),
                score,
                chars,
            });
        }

        debug!(
            "Retrieved {} blocks from {} files ({} chars, fallback: {})",
            retrieval.sections.len(),
            retrieval.used_files.len(),
            retrieval.used_chars,
            retrieval.fell_back
        );
        Ok(retrieval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::IndexOptions;
    use crate::utils::test_utils::write_tree;

    fn weights() -> ScoreWeights {
        ScoreWeights::default()
    }

    fn build(files: &[(&str, &str)]) -> (tempfile::TempDir, ProjectIndex) {
        let dir = write_tree(files);
        let index = ProjectIndex::build(dir.path(), &IndexOptions::default()).unwrap();
        (dir, index)
    }

    #[test]
    fn score_counts_occurrences_and_name_bonus() {
        let body = "def login(user):\n    return check_login(user)";
        // "login" appears twice in the body (2 * 2) and in the name (+5).
        assert_eq!(score_block("LOGIN", body, Some("login"), &weights()), 9);
        // Name bonus is per token, not per occurrence.
        assert_eq!(score_block("log", body, Some("login_login"), &weights()), 9);
        assert_eq!(score_block("login", body, None, &weights()), 4);
        assert_eq!(score_block("unrelated", body, Some("login"), &weights()), 0);
    }

    #[test]
    fn traceback_questions_reward_raise() {
        let body = "raise ValueError()\nraise KeyError()";
        assert_eq!(score_block("Traceback", body, None, &weights()), 6);
        // The marker is case-sensitive.
        assert_eq!(score_block("traceback", body, None, &weights()), 0);
    }

    #[test]
    fn score_is_monotonic_in_occurrences() {
        let question = "parse token stream";
        let mut body = String::from("fn parse() {}");
        let mut last = score_block(question, &body, Some("parse"), &weights());
        for extra in ["token", " stream", " parse", " other"] {
            body.push_str(extra);
            let next = score_block(question, &body, Some("parse"), &weights());
            assert!(next >= last, "{next} < {last} after adding {extra:?}");
            last = next;
        }
    }

    #[test]
    fn traceback_target_is_the_quoted_base_name() {
        let question = "Traceback (most recent call last):\n  File \"/srv/app/models/user.py\", line 3, in <module>\nValueError";
        assert_eq!(detect_traceback_target(question).as_deref(), Some("user.py"));

        let windows = "Traceback:\n  File \"C:\\proj\\db.py\", line 1";
        assert_eq!(detect_traceback_target(windows).as_deref(), Some("db.py"));
    }

    #[test]
    fn malformed_traceback_lines_are_tolerated() {
        assert_eq!(detect_traceback_target("File x.py has a bug"), None);
        let malformed = "Traceback\n  File app.py, line 3\n";
        assert_eq!(detect_traceback_target(malformed), None);
        let later = "Traceback\n  File app.py\n  File \"lib/core.py\", line 9";
        assert_eq!(detect_traceback_target(later).as_deref(), Some("core.py"));
    }

    #[test]
    fn query_ranks_by_score_with_stable_ties() {
        let (_dir, index) = build(&[
            ("a.py", "def first():\n    cache = 1\n\ndef second():\n    cache = 2\n"),
            ("b.py", "def cache_get():\n    return cache\n"),
        ]);
        let retrieval = Retriever::default().query("cache", &index).unwrap();
        let order: Vec<_> = retrieval
            .sections
            .iter()
            .map(|s| (s.display_name().to_string(), s.score))
            .collect();
        assert_eq!(
            order,
            vec![
                ("cache_get".to_string(), 9),
                ("first".to_string(), 2),
                ("second".to_string(), 2),
            ]
        );
        assert_eq!(retrieval.used_files, vec!["b.py", "a.py"]);
        assert!(!retrieval.fell_back);
        assert!(retrieval
            .injection
            .starts_with("\n[File: b.py | Symbol: cache_get | Score: 9]\n```\ndef cache_get():"));
    }

    #[test]
    fn query_is_deterministic() {
        let (_dir, index) = build(&[
            ("a.py", "def alpha():\n    beta()\n"),
            ("b.py", "def beta():\n    alpha()\n"),
            ("c.js", "function alpha() { beta(); }"),
        ]);
        let retriever = Retriever::default();
        let first = retriever.query("alpha beta", &index).unwrap();
        let second = retriever.query("alpha beta", &index).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unmatched_question_falls_back_to_first_blocks() {
        let files: Vec<(String, String)> = (0..7)
            .map(|i| (format!("m{i}.py"), format!("def f{i}():\n    pass\n")))
            .collect();
        let borrowed: Vec<(&str, &str)> = files
            .iter()
            .map(|(p, c)| (p.as_str(), c.as_str()))
            .collect();
        let (_dir, index) = build(&borrowed);

        let retrieval = Retriever::default().query("zzz", &index).unwrap();
        assert!(retrieval.fell_back);
        assert!(!retrieval.injection.is_empty());
        assert_eq!(retrieval.sections.len(), 5);
        assert!(retrieval.sections.iter().all(|s| s.score == 1));
        assert_eq!(retrieval.sections[0].path, "m0.py");
    }

    #[test]
    fn budget_is_never_exceeded_and_packing_stops_at_first_overflow() {
        let big = format!("def big_match():\n    {}\n", "match ".repeat(30));
        let (_dir, index) = build(&[
            ("a.py", big.as_str()),
            ("b.py", "def small():\n    match\n"),
        ]);
        let big_len = index.blocks().next().unwrap().body.chars().count();

        // The top block does not fit, so nothing is packed even though the
        // smaller one would.
        let tight = Retriever::new(big_len - 1).query("match", &index).unwrap();
        assert!(tight.sections.is_empty());
        assert_eq!(tight.used_chars, 0);

        for budget in [0, 10, big_len, big_len + 5, 10_000] {
            let retrieval = Retriever::new(budget).query("match", &index).unwrap();
            assert!(retrieval.used_chars <= budget);
        }
    }

    #[test]
    fn traceback_file_gets_bonus() {
        let (_dir, index) = build(&[
            ("api.py", "def handler():\n    return value\n"),
            ("models/user.py", "def load():\n    pass\n"),
        ]);
        let question = "Traceback (most recent call last):\n  File \"/x/models/user.py\", line 2\nvalue";
        let retrieval = Retriever::default().query(question, &index).unwrap();
        assert_eq!(retrieval.traceback_target.as_deref(), Some("user.py"));
        assert_eq!(retrieval.sections[0].path, "models/user.py");
        assert_eq!(retrieval.sections[0].score, 20);
    }

    #[test]
    fn empty_index_is_an_error() {
        let index = ProjectIndex::default();
        let err = Retriever::default().query("anything", &index).unwrap_err();
        assert!(matches!(err, ProjectError::EmptyIndex));
    }

    #[test]
    fn prompt_wraps_injection_and_question() {
        let (_dir, index) = build(&[("a.py", "def run():\n    pass\n")]);
        let retrieval = Retriever::default().query("run", &index).unwrap();
        let prompt = retrieval.prompt("how does run work?");
        assert!(prompt.starts_with("Answer using the relevant project code below.\n\n[File: a.py"));
        assert!(prompt.ends_with("\nQuestion: how does run work?\n"));
    }
}

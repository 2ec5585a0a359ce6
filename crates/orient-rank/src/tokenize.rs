use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer, TokenStream};

/// Terms shorter than this many characters are dropped.
pub const MIN_TERM_CHARS: usize = 2;

/// Splits on non-alphanumeric characters, lowercases, and optionally drops
/// stop words.
#[derive(Clone)]
pub struct Analyzer {
	inner: TextAnalyzer,
}

impl Default for Analyzer {
	fn default() -> Self { Self::new(&[]) }
}

impl Analyzer {
	pub fn new(stop_words: &[String]) -> Self {
		let inner = if stop_words.is_empty() {
			TextAnalyzer::builder(SimpleTokenizer::default()).filter(LowerCaser).build()
		} else {
			TextAnalyzer::builder(SimpleTokenizer::default())
				.filter(LowerCaser)
				.filter(StopWordFilter::remove(stop_words.iter().map(|s| s.to_lowercase())))
				.build()
		};
		Self { inner }
	}

	pub fn terms(&self, text: &str) -> Vec<String> {
		let mut analyzer = self.inner.clone();
		let mut stream = analyzer.token_stream(text);
		let mut terms = Vec::new();
		while stream.advance() {
			let term = &stream.token().text;
			if term.chars().count() >= MIN_TERM_CHARS { terms.push(term.clone()); }
		}
		terms
	}
}

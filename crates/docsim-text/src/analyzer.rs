use std::iter::Peekable;
use std::str::CharIndices;

use tantivy::tokenizer::{LowerCaser, StopWordFilter, TextAnalyzer, Token, TokenStream, Tokenizer};

/// NLTK's English stop-word list.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
	"i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've", "you'll", "you'd",
	"your", "yours", "yourself", "yourselves", "he", "him", "his", "himself", "she", "she's", "her", "hers",
	"herself", "it", "it's", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
	"who", "whom", "this", "that", "that'll", "these", "those", "am", "is", "are", "was", "were", "be", "been",
	"being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if",
	"or", "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against", "between",
	"into", "through", "during", "before", "after", "above", "below", "to", "from", "up", "down", "in", "out",
	"on", "off", "over", "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
	"how", "all", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not", "only", "own",
	"same", "so", "than", "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've",
	"now", "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn", "didn't",
	"doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn", "isn't", "ma", "mightn",
	"mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't", "shouldn", "shouldn't", "wasn",
	"wasn't", "weren", "weren't", "won", "won't", "wouldn", "wouldn't",
];

pub fn is_stop_word(word: &str) -> bool {
	ENGLISH_STOP_WORDS.contains(&word)
}

/// Word tokenizer used by the normalizer: [`WordTokenizer`], lowercase,
/// drop English stop words.
pub fn build_analyzer() -> TextAnalyzer {
	TextAnalyzer::builder(WordTokenizer::default())
		.filter(LowerCaser)
		.filter(StopWordFilter::remove(ENGLISH_STOP_WORDS.iter().map(|s| s.to_string())))
		.build()
}

/// Splits on whitespace and punctuation but keeps `-` and `.` between word
/// characters, so `state-of-the-art`, `e-mail` and `u.s` stay single tokens.
/// Surrounding punctuation is never part of a token.
#[derive(Clone, Default)]
pub struct WordTokenizer {
	token: Token,
}

pub struct WordTokenStream<'a> {
	text: &'a str,
	chars: Peekable<CharIndices<'a>>,
	token: &'a mut Token,
}

impl Tokenizer for WordTokenizer {
	type TokenStream<'a> = WordTokenStream<'a>;

	fn token_stream<'a>(&'a mut self, text: &'a str) -> WordTokenStream<'a> {
		self.token.reset();
		WordTokenStream { text, chars: text.char_indices().peekable(), token: &mut self.token }
	}
}

fn is_word_char(c: char) -> bool {
	c.is_alphanumeric() || c == '_'
}

fn is_joiner(c: char) -> bool {
	c == '-' || c == '.'
}

impl WordTokenStream<'_> {
	fn joins_next_word(&self, joiner_at: usize, joiner: char) -> bool {
		self.text[joiner_at + joiner.len_utf8()..].chars().next().is_some_and(is_word_char)
	}
}

impl TokenStream for WordTokenStream<'_> {
	fn advance(&mut self) -> bool {
		self.token.text.clear();
		self.token.position = self.token.position.wrapping_add(1);

		while self.chars.next_if(|&(_, c)| !is_word_char(c)).is_some() {}
		let Some(&(start, _)) = self.chars.peek() else {
			return false;
		};
		let mut end = start;
		while let Some(&(at, c)) = self.chars.peek() {
			if is_word_char(c) {
				end = at + c.len_utf8();
			} else if !(is_joiner(c) && self.joins_next_word(at, c)) {
				break;
			}
			self.chars.next();
		}

		self.token.offset_from = start;
		self.token.offset_to = end;
		self.token.text.push_str(&self.text[start..end]);
		true
	}

	fn token(&self) -> &Token {
		self.token
	}

	fn token_mut(&mut self) -> &mut Token {
		self.token
	}
}

/// Run `analyzer` over `text` and collect the surviving token texts.
pub fn analyze(analyzer: &mut TextAnalyzer, text: &str) -> Vec<String> {
	let mut tokens = Vec::new();
	let mut stream = analyzer.token_stream(text);
	stream.process(&mut |token| tokens.push(token.text.clone()));
	tokens
}

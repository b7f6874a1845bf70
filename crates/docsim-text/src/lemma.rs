//! Noun lemmatizer in the WordNet morphology style: irregular forms first,
//! then a handful of suffix rules. Words are expected lowercased.

use std::borrow::Cow;

const IRREGULAR: &[(&str, &str)] = &[
	("children", "child"),
	("mice", "mouse"),
	("lice", "louse"),
	("feet", "foot"),
	("teeth", "tooth"),
	("geese", "goose"),
	("women", "woman"),
	("men", "man"),
	("people", "person"),
	("oxen", "ox"),
	("data", "datum"),
	("criteria", "criterion"),
	("phenomena", "phenomenon"),
	("media", "medium"),
	("bacteria", "bacterium"),
	("curricula", "curriculum"),
	("analyses", "analysis"),
	("theses", "thesis"),
	("hypotheses", "hypothesis"),
	("crises", "crisis"),
	("diagnoses", "diagnosis"),
	("bases", "basis"),
	("indices", "index"),
	("matrices", "matrix"),
	("vertices", "vertex"),
	("appendices", "appendix"),
	("wolves", "wolf"),
	("knives", "knife"),
	("lives", "life"),
	("wives", "wife"),
	("leaves", "leaf"),
	("halves", "half"),
	("selves", "self"),
	("shelves", "shelf"),
	("thieves", "thief"),
	("loaves", "loaf"),
	("calves", "calf"),
	("heroes", "hero"),
	("potatoes", "potato"),
	("tomatoes", "tomato"),
	("echoes", "echo"),
	("cacti", "cactus"),
	("fungi", "fungus"),
	("nuclei", "nucleus"),
	("radii", "radius"),
	("stimuli", "stimulus"),
	("alumni", "alumnus"),
];

/// Words whose surface form is already the base form despite looking plural.
const UNCHANGED: &[&str] = &[
	"series", "species", "news", "physics", "mathematics", "economics", "politics", "ethics", "statistics",
	"linguistics", "electronics", "means", "sheep", "fish", "deer", "aircraft", "scissors",
	"trousers", "glasses", "clothes", "always", "perhaps", "sometimes", "towards", "afterwards",
];

/// Singular nouns ending in `s`. Their plurals take `-es`, which is stripped
/// back to these forms.
const SIBILANT_SINGULARS: &[&str] = &[
	"alias", "apparatus", "atlas", "bias", "bonus", "bus", "campus", "canvas", "census", "chaos", "chorus",
	"circus", "consensus", "cosmos", "ethos", "focus", "gas", "genius", "iris", "kudos", "lens", "octopus",
	"pathos", "plus", "prospectus", "status", "thermos", "virus",
];

/// Nouns ending in `ie`, so their `-ies` plural must not become `-y`.
const IE_NOUNS: &[&str] = &[
	"brownie", "calorie", "cookie", "die", "genie", "goalie", "hippie", "lie", "lingerie", "magpie", "movie",
	"necktie", "pie", "pixie", "prairie", "rookie", "selfie", "smoothie", "tie", "zombie",
];

/// Reduce a lowercased word to its noun base form.
pub fn lemmatize(word: &str) -> Cow<'_, str> {
	if let Some((_, base)) = IRREGULAR.iter().find(|(form, _)| *form == word) {
		return Cow::Borrowed(base);
	}
	if UNCHANGED.contains(&word) || SIBILANT_SINGULARS.contains(&word) || word.chars().count() <= 3 {
		return Cow::Borrowed(word);
	}
	if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
		return Cow::Borrowed(word);
	}
	if let Some(stem) = word.strip_suffix("es").filter(|stem| SIBILANT_SINGULARS.contains(stem)) {
		return Cow::Borrowed(stem);
	}
	if let Some(stem) = word.strip_suffix("ies") {
		if IE_NOUNS.contains(&&word[..word.len() - 1]) {
			return Cow::Borrowed(&word[..word.len() - 1]);
		}
		if word.chars().count() > 4 {
			return Cow::Owned(format!("{stem}y"));
		}
	}
	for suffix in ["sses", "xes", "zes", "ches", "shes"] {
		if word.ends_with(suffix) {
			return Cow::Borrowed(&word[..word.len() - 2]);
		}
	}
	match word.strip_suffix('s') {
		Some(stem) => Cow::Borrowed(stem),
		None => Cow::Borrowed(word),
	}
}

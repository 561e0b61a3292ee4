//! German stopwords, used when normalizing review text
use std::collections::HashSet;

static STOPWORDS: &[&str] = &[
  "aber", "alle", "allem", "allen", "aller", "alles", "als", "also", "am", "an", "ander",
  "andere", "anderem", "anderen", "anderer", "anderes", "auch", "auf", "aus", "bei", "bin",
  "bis", "bist", "da", "damit", "dann", "das", "dass", "dasselbe", "dazu", "dein", "deine",
  "deinem", "deinen", "deiner", "dem", "demselben", "den", "denn", "der", "derer", "derselbe",
  "derselben", "des", "desselben", "dessen", "dich", "die", "dies", "diese", "dieselbe",
  "dieselben", "diesem", "diesen", "dieser", "dieses", "dir", "doch", "dort", "du", "durch",
  "ein", "eine", "einem", "einen", "einer", "eines", "einig", "einige", "einigem", "einigen",
  "einiger", "einiges", "einmal", "er", "es", "etwas", "euch", "euer", "eure", "eurem",
  "euren", "eurer", "eures", "für", "gegen", "gewesen", "hab", "habe", "haben", "hat",
  "hatte", "hatten", "hier", "hin", "hinter", "ich", "ihm", "ihn", "ihnen", "ihr", "ihre",
  "ihrem", "ihren", "ihrer", "ihres", "im", "in", "indem", "ins", "ist", "jede", "jedem",
  "jeden", "jeder", "jedes", "jene", "jenem", "jenen", "jener", "jenes", "jetzt", "kann",
  "können", "könnte", "machen", "man", "manche", "manchem", "manchen", "mancher", "manches",
  "mein", "meine", "meinem", "meinen", "meiner", "meines", "mich", "mir", "mit", "muss",
  "musste", "nach", "nun", "nur", "ob", "oder", "ohne", "sich", "sie", "sind", "so",
  "solche", "solchem", "solchen", "solcher", "solches", "soll", "sollte", "sondern", "sonst",
  "über", "um", "und", "uns", "unsere", "unserem", "unseren", "unser", "unseres", "unter",
  "viel", "vom", "von", "vor", "während", "war", "waren", "warst", "was", "weg", "weil",
  "welche", "welchem", "welchen", "welcher", "welches", "wenn", "werde", "werden", "wie",
  "wieder", "will", "wir", "wird", "wirst", "wo", "wollen", "wollte", "würde", "würden",
  "zu", "zum", "zur", "zwar", "zwischen",
];

/// Loads the lower-case German stopword set. Negations ("nicht", "kein") and intensifiers
/// ("sehr") are not stopwords, as they carry polarity.
pub fn load() -> HashSet<&'static str> {
  STOPWORDS.iter().copied().collect()
}

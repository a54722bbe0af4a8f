//! Keyword tables and patterns the analyzers run against.
//!
//! Everything here is plain data: a [`Lexicons`] value can be loaded from
//! TOML, checked, and compiled once into [`CompiledLexicons`], which is what
//! the aggregator constructors take.

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use stopwords::{Language, Spark, Stopwords};

use crate::error::LexiconError;

pub const LEXICON_VERSION: &str = "2024.1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicRule {
    pub label: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicons {
    pub version: String,
    /// Excluded from vocabulary analysis.
    pub stop_words: Vec<String>,
    /// Shorter list used by the behavioral pattern word counts.
    pub pattern_stop_words: Vec<String>,
    pub topics: Vec<TopicRule>,
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    /// Applied case-insensitively, in order.
    pub location_patterns: Vec<String>,
}

impl Default for Lexicons {
    fn default() -> Self {
        Self {
            version: LEXICON_VERSION.to_string(),
            stop_words: owned(&STOP_WORDS),
            pattern_stop_words: owned(&PATTERN_STOP_WORDS),
            topics: TOPICS
                .iter()
                .map(|(label, keywords)| TopicRule {
                    label: label.to_string(),
                    keywords: owned(keywords),
                })
                .collect(),
            positive: owned(&POSITIVE_WORDS),
            negative: owned(&NEGATIVE_WORDS),
            location_patterns: owned(&LOCATION_PATTERNS),
        }
    }
}

impl Lexicons {
    /// Parse a lexicon table. Missing keys fall back to the built-in tables.
    pub fn from_toml_str(raw: &str) -> Result<Self, LexiconError> {
        Ok(toml::from_str(raw)?)
    }

    /// Merge the stock Spanish and English stop lists into `stop_words`.
    pub fn with_stock_stopwords(mut self) -> Self {
        let mut seen: HashSet<String> = self.stop_words.iter().cloned().collect();
        for lang in [Language::Spanish, Language::English] {
            for word in Spark::stopwords(lang).unwrap_or_default() {
                let word = word.to_lowercase();
                if seen.insert(word.clone()) {
                    self.stop_words.push(word);
                }
            }
        }
        self
    }

    pub fn compile(&self) -> Result<CompiledLexicons, LexiconError> {
        let location_patterns = self
            .location_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| LexiconError::Pattern {
                        pattern: pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledLexicons {
            version: self.version.clone(),
            stop_words: lowered_set(&self.stop_words),
            pattern_stop_words: lowered_set(&self.pattern_stop_words),
            topics: self
                .topics
                .iter()
                .map(|t| CompiledTopic {
                    label: t.label.clone(),
                    keywords: t.keywords.iter().map(|k| k.to_lowercase()).collect(),
                })
                .collect(),
            positive: self.positive.iter().map(|w| w.to_lowercase()).collect(),
            negative: self.negative.iter().map(|w| w.to_lowercase()).collect(),
            location_patterns,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CompiledTopic {
    pub label: String,
    pub keywords: Vec<String>,
}

impl CompiledTopic {
    /// `lowered` must already be lowercase.
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct CompiledLexicons {
    pub version: String,
    pub stop_words: HashSet<String>,
    pub pattern_stop_words: HashSet<String>,
    pub topics: Vec<CompiledTopic>,
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub location_patterns: Vec<Regex>,
}

impl CompiledLexicons {
    pub fn builtin() -> Self {
        // The built-in patterns are covered by tests; compiling them cannot fail.
        Lexicons::default()
            .compile()
            .expect("built-in lexicons compile")
    }
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn lowered_set(words: &[String]) -> HashSet<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}

const STOP_WORDS: [&str; 29] = [
    "el", "la", "de", "que", "y", "en", "un", "es", "se", "no", "te", "lo", "le", "me", "mi", "tu",
    "su", "los", "las", "del", "the", "and", "you", "for", "are", "with", "this", "that", "have",
];

const PATTERN_STOP_WORDS: [&str; 20] = [
    "el", "la", "de", "que", "y", "en", "un", "es", "se", "no", "te", "lo", "le", "me", "mi", "tu",
    "su", "los", "las", "del",
];

const TOPICS: [(&str, &[&str]); 10] = [
    (
        "tecnología",
        &[
            "tecnología", "tecnologia", "tech", "software", "hardware", "app", "aplicación",
            "internet", "web", "digital", "computadora", "ordenador", "móvil", "celular",
            "smartphone",
        ],
    ),
    (
        "programación",
        &[
            "programación", "programacion", "código", "codigo", "python", "javascript", "java",
            "html", "css", "desarrollo", "developer", "coding", "script", "api",
        ],
    ),
    (
        "videojuegos",
        &[
            "juego", "videojuego", "gaming", "gamer", "play", "jugando", "consola", "steam",
            "nintendo", "playstation", "xbox", "minecraft", "fortnite",
        ],
    ),
    (
        "música",
        &[
            "música", "musica", "canción", "cancion", "artista", "banda", "album", "spotify",
            "youtube music", "escuchar", "ritmo", "melodía",
        ],
    ),
    (
        "películas",
        &[
            "película", "pelicula", "cine", "netflix", "disney", "amazon prime", "serie", "actor",
            "actriz", "director", "guion",
        ],
    ),
    (
        "deportes",
        &[
            "deporte", "fútbol", "futbol", "baloncesto", "tenis", "natación", "ejercicio",
            "gimnasio", "entrenamiento", "partido", "competencia",
        ],
    ),
    (
        "comida",
        &[
            "comida", "receta", "cocina", "restaurante", "cena", "almuerzo", "desayuno", "postre",
            "bebida", "cocinar",
        ],
    ),
    (
        "viajes",
        &[
            "viaje", "viajar", "vacaciones", "turismo", "hotel", "avión", "aeropuerto", "destino",
            "playa", "montaña", "ciudad",
        ],
    ),
    (
        "trabajo",
        &[
            "trabajo", "empleo", "oficina", "jefe", "compañero", "reunión", "proyecto", "deadline",
            "cliente", "empresa",
        ],
    ),
    (
        "estudio",
        &[
            "estudio", "universidad", "colegio", "examen", "tarea", "profesor", "clase", "aprender",
            "educación", "curso",
        ],
    ),
];

const POSITIVE_WORDS: [&str; 11] = [
    "bueno", "genial", "excelente", "fantástico", "maravilloso", "feliz", "contento", "alegre",
    "amo", "encanta", "increíble",
];

const NEGATIVE_WORDS: [&str; 11] = [
    "malo", "terrible", "horrible", "triste", "enojado", "molesto", "frustrado", "odio", "asco",
    "aburrido", "cansado",
];

const LOCATION_PATTERNS: [&str; 5] = [
    r"\b((?:calle|avenida|av\.|ciudad|pueblo|barrio|plaza)\s+\w+)",
    r"\b(madrid|barcelona|valencia|sevilla|bilbao|málaga|zaragoza|murcia|palma|granada)\b",
    r"\b(\d{5})\b",
    r"\b(españa|espana|spain)\b",
    r"\b(méxico|mexico|argentina|colombia|chile|perú|peru|venezuela)\b",
];

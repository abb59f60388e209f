//! Coercion of free-text model output into framework artifacts.
//!
//! Models are asked for JSON but routinely wrap it in prose or code fences,
//! rename keys, answer with Markdown headings and bullets instead, or use
//! words where numbers were requested. Extraction runs in two steps:
//!
//! 1. [`model_output_to_value`] finds the first parseable JSON object (or
//!    array) in the text and falls back to reading heading/bullet sections.
//! 2. [`FromModelOutput::from_value`] maps the loose value onto a typed
//!    artifact, matching keys by alias and clamping numbers into range.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::{
    BcgMatrix, BcgProduct, BcgQuadrant, ForceAssessment, LinkedInSentiment, McKinsey7S,
    PestelAnalysis, PestelDimension, PorterFiveForces, SwotAnalysis,
};

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[A-Za-z0-9_-]*").expect("valid regex"));

static BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*•+▪]|\d{1,2}[.)])\s+").expect("valid regex"));

/// Why a model reply could not be coerced
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("model output contained no recognizable structure")]
    NoStructure,

    #[error("model output is missing {0}")]
    Missing(&'static str),
}

/// Typed artifacts that can be read out of a model reply.
pub trait FromModelOutput: Sized {
    /// Map an already-parsed loose value onto the artifact.
    fn from_value(value: &Value) -> Result<Self, ExtractError>;

    /// Parse raw model text.
    fn from_model_output(text: &str) -> Result<Self, ExtractError> {
        let value = model_output_to_value(text);
        if value.is_null() {
            return Err(ExtractError::NoStructure);
        }
        Self::from_value(&value)
    }
}

// =============================================================================
// Locating structure in text
// =============================================================================

/// JSON embedded in the text, else heading/bullet sections, else `Null`.
pub fn model_output_to_value(text: &str) -> Value {
    find_json(text).unwrap_or_else(|| parse_sections(text))
}

/// First balanced JSON object or array in `text` that parses.
///
/// Arrays holding only numbers are taken for citation marks like `[1]`
/// and skipped.
pub fn find_json(text: &str) -> Option<Value> {
    let cleaned = CODE_FENCE.replace_all(text, "");
    let cleaned = cleaned.as_ref();

    for (start, c) in cleaned.char_indices() {
        if c != '{' && c != '[' {
            continue;
        }
        let Some(end) = balanced_end(&cleaned[start..]) else {
            continue;
        };
        match serde_json::from_str::<Value>(&cleaned[start..start + end]) {
            Ok(Value::Array(items)) if is_citation(&items) => {}
            Ok(value) => return Some(value),
            Err(_) => {}
        }
    }
    None
}

fn is_citation(items: &[Value]) -> bool {
    items.iter().all(Value::is_number)
}

/// Byte length of the bracketed span opening at the start of `text`.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// Read Markdown-ish sections into an object of heading -> items.
///
/// Recognized headings: `## Title`, `**Title**`, `Title:` and
/// `Title: inline item`. Bullets (`-`, `*`, `•`, `1.`) and plain lines
/// under a heading become its items.
pub fn parse_sections(text: &str) -> Value {
    let mut sections: Map<String, Value> = Map::new();
    let mut current: Option<String> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("```") {
            continue;
        }

        let is_bullet = BULLET.is_match(line);
        let content = BULLET.replace(line, "");
        let content = content.trim();

        if let Some((heading, inline)) = heading_of(line, content, is_bullet) {
            let items = sections
                .entry(heading.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let (Some(item), Value::Array(list)) = (inline, items) {
                list.push(Value::String(item));
            }
            current = Some(heading);
            continue;
        }

        if let Some(heading) = &current {
            let item = clean_item(content);
            if item.is_empty() {
                continue;
            }
            if let Some(Value::Array(list)) = sections.get_mut(heading) {
                list.push(Value::String(item));
            }
        }
    }

    if sections.is_empty() {
        Value::Null
    } else {
        Value::Object(sections)
    }
}

fn heading_of(line: &str, content: &str, is_bullet: bool) -> Option<(String, Option<String>)> {
    let hashed = line.starts_with('#');
    let bold_line = content.starts_with("**") && content.ends_with("**") && content.len() > 4;
    let plain = content.trim_start_matches('#').replace("**", "").replace("__", "");
    let plain = plain.trim();

    if let Some(head) = plain.strip_suffix(':') {
        return short_heading(head).map(|h| (h, None));
    }
    if hashed || (bold_line && !is_bullet) {
        return short_heading(plain).map(|h| (h, None));
    }
    if is_bullet {
        return None;
    }
    let (head, rest) = plain.split_once(':')?;
    let heading = short_heading(head)?;
    let item = clean_item(rest);
    Some((heading, (!item.is_empty()).then_some(item)))
}

fn short_heading(text: &str) -> Option<String> {
    let text = text.trim();
    let words = text.split_whitespace().count();
    (!text.is_empty() && text.chars().count() <= 48 && words <= 6).then(|| text.to_string())
}

fn clean_item(text: &str) -> String {
    let text = BULLET.replace(text.trim(), "");
    text.replace("**", "").trim().trim_end_matches([',', ';']).trim().to_string()
}

// =============================================================================
// Loose value helpers
// =============================================================================

/// Lower-case alphanumerics only, so `"Threat of New Entrants"`,
/// `threat_of_new_entrants` and `threat-of-new-entrants` compare equal.
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Field of `value` whose key matches one of `aliases`.
///
/// Exact normalized matches win; otherwise a key that starts with an alias
/// of four or more characters matches (`"Economic factors"` for `economic`).
pub fn lookup<'a>(value: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    let object = value.as_object()?;
    let wanted: Vec<String> = aliases.iter().map(|a| normalize_key(a)).collect();

    let normalized: Vec<(String, &Value)> =
        object.iter().map(|(k, v)| (normalize_key(k), v)).collect();

    normalized
        .iter()
        .find(|(k, _)| wanted.iter().any(|w| w == k))
        .or_else(|| {
            normalized
                .iter()
                .find(|(k, _)| wanted.iter().any(|w| w.len() >= 4 && k.starts_with(w.as_str())))
        })
        .map(|(_, v)| *v)
}

/// Step through single-key wrapper objects (`{"swot": {...}}`) until a
/// level holding one of `expected` is reached.
fn unwrap_root<'a>(value: &'a Value, expected: &[&str]) -> &'a Value {
    let mut current = value;
    for _ in 0..3 {
        if lookup(current, expected).is_some() {
            break;
        }
        match current.as_object() {
            Some(object) if object.len() == 1 => {
                let inner = object.values().next().unwrap_or(&Value::Null);
                if inner.is_object() {
                    current = inner;
                    continue;
                }
                break;
            }
            _ => break,
        }
    }
    current
}

/// Items of a list-ish value.
pub fn string_list(value: &Value) -> Vec<String> {
    const ITEM_KEYS: [&str; 8] = [
        "description",
        "factor",
        "name",
        "text",
        "point",
        "title",
        "item",
        "theme",
    ];

    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(clean_item(s)),
                Value::Number(n) => Some(n.to_string()),
                Value::Object(_) => lookup(item, &ITEM_KEYS)
                    .and_then(Value::as_str)
                    .or_else(|| item.as_object()?.values().find_map(Value::as_str))
                    .map(clean_item),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split(['\n', ';'])
            .map(clean_item)
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Prose from a string, a list, or the string fields of an object.
pub fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) => string_list(value).join("; "),
        Value::Object(object) => object
            .values()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        _ => String::new(),
    }
}

/// Float from a number or a numeric string such as `"12.5%"`, `"1.8x"`, `"1,200"`.
pub fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned = s.trim().trim_end_matches(['%', 'x', 'X']).replace(',', "");
            cleaned.trim().parse::<f64>().ok()
        }
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// Integer rating within `[min, max]`.
///
/// Accepts numbers, numeric strings (`"4"`, `"4/5"`) and rating words
/// (very low, low, medium/moderate, high, very high on a 1-5 scale).
pub fn score(value: &Value, min: u8, max: u8) -> Option<u8> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let lowered = s.trim().to_lowercase();
            let head = lowered.split('/').next().unwrap_or_default().trim();
            match head.parse::<f64>() {
                Ok(n) => n,
                Err(_) => rating_word(&lowered)?,
            }
        }
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(min as f64, max as f64) as u8)
}

fn rating_word(word: &str) -> Option<f64> {
    let rating = if word.contains("very high") || word.contains("extreme") || word.contains("very strong") {
        5.0
    } else if word.contains("very low") || word.contains("minimal") || word.contains("negligible") {
        1.0
    } else if word.contains("medium") || word.contains("moderate") {
        3.0
    } else if word.contains("high") || word.contains("strong") {
        4.0
    } else if word.contains("low") || word.contains("weak") {
        2.0
    } else {
        return None;
    };
    Some(rating)
}

// =============================================================================
// Framework coercions
// =============================================================================

const STRENGTHS: &[&str] = &["strengths", "strength", "s"];
const WEAKNESSES: &[&str] = &["weaknesses", "weakness", "w"];
const OPPORTUNITIES: &[&str] = &["opportunities", "opportunity", "o"];
const THREATS: &[&str] = &["threats", "threat", "t"];

impl FromModelOutput for SwotAnalysis {
    fn from_value(value: &Value) -> Result<Self, ExtractError> {
        let root = unwrap_root(value, STRENGTHS);
        let list = |aliases: &[&str]| lookup(root, aliases).map(string_list).unwrap_or_default();

        let swot = SwotAnalysis {
            strengths: list(STRENGTHS),
            weaknesses: list(WEAKNESSES),
            opportunities: list(OPPORTUNITIES),
            threats: list(THREATS),
        };

        if swot.is_empty() {
            return Err(ExtractError::Missing("SWOT quadrants"));
        }
        Ok(swot)
    }
}

const PESTEL_KEYS: [&[&str]; 6] = [
    &["political", "politics", "p"],
    &["economic", "economy", "e"],
    &["social", "sociocultural", "socio cultural", "s"],
    &["technological", "technology", "t"],
    &["environmental", "environment", "ecological"],
    &["legal", "regulatory", "l"],
];

fn pestel_dimension(value: Option<&Value>) -> PestelDimension {
    let Some(value) = value else {
        return PestelDimension { factors: Vec::new(), impact: 1 };
    };

    let (factors, impact) = if value.is_object() {
        let factors = lookup(value, &["factors", "factor", "items", "points", "details", "analysis"])
            .map(string_list)
            .unwrap_or_default();
        let impact = lookup(value, &["impact", "impact score", "impact level", "score", "rating"])
            .and_then(|v| score(v, 1, 5));
        (factors, impact)
    } else {
        (string_list(value), None)
    };

    let default_impact = if factors.is_empty() { 1 } else { 3 };
    PestelDimension {
        impact: impact.unwrap_or(default_impact),
        factors,
    }
}

impl FromModelOutput for PestelAnalysis {
    fn from_value(value: &Value) -> Result<Self, ExtractError> {
        let root = unwrap_root(value, PESTEL_KEYS[0]);
        let [political, economic, social, technological, environmental, legal] =
            PESTEL_KEYS.map(|aliases| pestel_dimension(lookup(root, aliases)));

        let pestel = PestelAnalysis {
            political,
            economic,
            social,
            technological,
            environmental,
            legal,
        };

        if pestel.dimensions().iter().all(|d| d.factors.is_empty()) {
            return Err(ExtractError::Missing("PESTEL factors"));
        }
        Ok(pestel)
    }
}

const PORTER_KEYS: [&[&str]; 5] = [
    &[
        "competitive rivalry",
        "rivalry",
        "industry rivalry",
        "rivalry among existing competitors",
        "competition",
    ],
    &["supplier power", "bargaining power of suppliers", "suppliers"],
    &[
        "buyer power",
        "bargaining power of buyers",
        "bargaining power of customers",
        "customer power",
        "buyers",
    ],
    &[
        "threat of substitutes",
        "threat of substitute products",
        "threat of substitution",
        "substitutes",
    ],
    &[
        "threat of new entrants",
        "threat of new entry",
        "new entrants",
        "barriers to entry",
    ],
];

/// Neutral intensity used when the model omits a rating
const DEFAULT_INTENSITY: u8 = 3;

fn force_assessment(value: &Value) -> ForceAssessment {
    match value {
        Value::Object(_) => {
            let intensity = lookup(value, &["intensity", "rating", "level", "score", "strength", "power"])
                .and_then(|v| score(v, 1, 5))
                .unwrap_or(DEFAULT_INTENSITY);
            let analysis = lookup(
                value,
                &["analysis", "explanation", "description", "rationale", "reasoning", "details", "summary"],
            )
            .map(text)
            .unwrap_or_default();
            ForceAssessment { intensity, analysis }
        }
        Value::String(s) if s.trim().chars().count() <= 20 && score(value, 1, 5).is_some() => {
            ForceAssessment {
                intensity: score(value, 1, 5).unwrap_or(DEFAULT_INTENSITY),
                analysis: String::new(),
            }
        }
        Value::Number(_) => ForceAssessment {
            intensity: score(value, 1, 5).unwrap_or(DEFAULT_INTENSITY),
            analysis: String::new(),
        },
        other => ForceAssessment {
            intensity: DEFAULT_INTENSITY,
            analysis: text(other),
        },
    }
}

impl FromModelOutput for PorterFiveForces {
    fn from_value(value: &Value) -> Result<Self, ExtractError> {
        let root = unwrap_root(value, PORTER_KEYS[0]);
        let found = PORTER_KEYS.map(|aliases| lookup(root, aliases));
        if found.iter().all(Option::is_none) {
            return Err(ExtractError::Missing("competitive forces"));
        }

        let [competitive_rivalry, supplier_power, buyer_power, threat_of_substitutes, threat_of_new_entrants] =
            found.map(|v| {
                v.map(force_assessment).unwrap_or(ForceAssessment {
                    intensity: DEFAULT_INTENSITY,
                    analysis: String::new(),
                })
            });

        Ok(PorterFiveForces {
            competitive_rivalry,
            supplier_power,
            buyer_power,
            threat_of_substitutes,
            threat_of_new_entrants,
        })
    }
}

const BCG_PRODUCTS: &[&str] = &[
    "products",
    "product lines",
    "business units",
    "units",
    "portfolio",
    "items",
];

/// Quadrant-keyed lists (`{"stars": ["A"], "dogs": ["B"]}`) placed at the
/// centre of their quadrant, since no coordinates were given.
const BCG_QUADRANT_KEYS: [(&[&str], BcgQuadrant, f64, f64); 4] = [
    (&["stars", "star"], BcgQuadrant::Star, 15.0, 1.5),
    (&["cash cows", "cash cow", "cashcows"], BcgQuadrant::CashCow, 5.0, 1.5),
    (&["question marks", "question mark", "problem children"], BcgQuadrant::QuestionMark, 15.0, 0.5),
    (&["dogs", "dog", "pets"], BcgQuadrant::Dog, 5.0, 0.5),
];

fn bcg_product(value: &Value) -> Option<BcgProduct> {
    let name = lookup(value, &["name", "product", "business unit", "unit", "title"])
        .map(text)
        .filter(|n| !n.is_empty())?;
    let growth = lookup(value, &["market growth rate", "market growth", "growth rate", "growth"])
        .and_then(number)?;
    let share = lookup(value, &["relative market share", "relative share", "market share", "share"])
        .and_then(number)?;
    Some(BcgProduct::new(name, growth, share))
}

impl FromModelOutput for BcgMatrix {
    fn from_value(value: &Value) -> Result<Self, ExtractError> {
        let root = unwrap_root(value, BCG_PRODUCTS);

        let listed = match root {
            Value::Array(_) => Some(root),
            _ => lookup(root, BCG_PRODUCTS),
        };
        if let Some(Value::Array(items)) = listed {
            return Ok(BcgMatrix {
                products: items.iter().filter_map(bcg_product).collect(),
            });
        }

        let mut products = Vec::new();
        let mut recognized = false;
        for (aliases, quadrant, growth, share) in BCG_QUADRANT_KEYS {
            if let Some(names) = lookup(root, aliases) {
                recognized = true;
                for name in string_list(names) {
                    let product = BcgProduct::new(name, growth, share);
                    debug_assert_eq!(product.quadrant, quadrant);
                    products.push(product);
                }
            }
        }

        if !recognized {
            return Err(ExtractError::Missing("BCG products"));
        }
        Ok(BcgMatrix { products })
    }
}

const SEVEN_S_KEYS: [&[&str]; 7] = [
    &["strategy"],
    &["structure"],
    &["systems", "system"],
    &["shared values", "shared value", "superordinate goals", "values"],
    &["style", "leadership style", "management style"],
    &["staff", "people"],
    &["skills", "capabilities"],
];

impl FromModelOutput for McKinsey7S {
    fn from_value(value: &Value) -> Result<Self, ExtractError> {
        let root = unwrap_root(value, SEVEN_S_KEYS[0]);
        let [strategy, structure, systems, shared_values, style, staff, skills] =
            SEVEN_S_KEYS.map(|aliases| lookup(root, aliases).map(text).unwrap_or_default());

        let model = McKinsey7S {
            strategy,
            structure,
            systems,
            shared_values,
            style,
            staff,
            skills,
        };

        if model.is_empty() {
            return Err(ExtractError::Missing("7S elements"));
        }
        Ok(model)
    }
}

const SENTIMENT_SCORE: &[&str] = &[
    "overall score",
    "overall sentiment score",
    "sentiment score",
    "score",
    "overall sentiment",
    "overall",
    "sentiment",
];

/// Score on [-1, 1] from a number on a known scale or a sentiment word.
fn sentiment_score(value: &Value) -> Option<f64> {
    if let Some(n) = number(value) {
        let rescaled = if n > 5.0 {
            n / 50.0 - 1.0
        } else if n > 1.0 {
            (n - 1.0) / 2.0 - 1.0
        } else {
            n
        };
        return Some(rescaled.clamp(-1.0, 1.0));
    }

    let word = value.as_str()?.trim().to_lowercase();
    let score = if word.contains("very positive") {
        0.8
    } else if word.contains("very negative") {
        -0.8
    } else if word.contains("positive") {
        0.5
    } else if word.contains("negative") {
        -0.5
    } else if word.contains("neutral") || word.contains("mixed") {
        0.0
    } else {
        return None;
    };
    Some(score)
}

/// Scale `parts` to percentages with one decimal that sum to exactly 100.
///
/// Works in tenths of a percent and hands the tenths lost to flooring to
/// the parts with the largest remainders.
fn percentages(parts: [f64; 3]) -> [f64; 3] {
    let total: f64 = parts.iter().sum();
    if total <= 0.0 {
        return [0.0; 3];
    }

    let exact = parts.map(|p| p * 1000.0 / total);
    let mut tenths = exact.map(|e| e.floor() as i64);
    let leftover = 1000 - tenths.iter().sum::<i64>();

    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.total_cmp(&ra)
    });
    for &i in order.iter().take(leftover.clamp(0, 3) as usize) {
        tenths[i] += 1;
    }

    tenths.map(|t| t as f64 / 10.0)
}

impl FromModelOutput for LinkedInSentiment {
    fn from_value(value: &Value) -> Result<Self, ExtractError> {
        let root = unwrap_root(value, SENTIMENT_SCORE);

        let distribution = lookup(root, &["distribution", "breakdown", "percentages"]).unwrap_or(root);
        let share = |aliases: &[&str]| lookup(distribution, aliases).and_then(number).map(|n| n.max(0.0));
        let positive = share(&["positive", "positive percentage", "positive share"]);
        let neutral = share(&["neutral", "neutral percentage", "neutral share"]);
        let negative = share(&["negative", "negative percentage", "negative share"]);

        let mut parts = [positive.unwrap_or(0.0), neutral.unwrap_or(0.0), negative.unwrap_or(0.0)];
        let mut total: f64 = parts.iter().sum();
        if total > 0.0 && parts.iter().all(|p| *p <= 1.0) && total <= 1.0 + 1e-6 {
            parts.iter_mut().for_each(|p| *p *= 100.0);
            total *= 100.0;
        }

        let score = lookup(root, SENTIMENT_SCORE).and_then(sentiment_score);
        let score = match (score, total > 0.0) {
            (Some(score), _) => score,
            (None, true) => ((parts[0] - parts[2]) / total).clamp(-1.0, 1.0),
            (None, false) => return Err(ExtractError::Missing("sentiment score")),
        };

        let [positive, neutral, negative] = if total > 0.0 {
            percentages(parts)
        } else {
            percentages([(1.0 + score) / 2.0 * 80.0, 20.0, (1.0 - score) / 2.0 * 80.0])
        };

        Ok(LinkedInSentiment {
            overall_score: (score * 1000.0).round() / 1000.0,
            positive,
            neutral,
            negative,
            key_themes: lookup(root, &["key themes", "themes", "topics", "key topics"])
                .map(string_list)
                .unwrap_or_default(),
            summary: lookup(root, &["summary", "overview", "explanation"])
                .map(text)
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_json_inside_prose_and_fences() {
        let reply = "Sure! Here is the analysis:\n```json\n{\"strengths\": [\"brand {global}\"]}\n```\nHope it helps.";
        let value = find_json(reply).unwrap();
        assert_eq!(value["strengths"][0], "brand {global}");
    }

    #[test]
    fn test_find_json_skips_unparseable_braces() {
        let reply = "Note {this is not json} but {\"a\": 1} is.";
        assert_eq!(find_json(reply).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_find_json_skips_numeric_citations() {
        let reply = "See [1]. {\"threats\": [\"tariffs\"]}";
        assert_eq!(find_json(reply).unwrap(), json!({"threats": ["tariffs"]}));
        assert!(find_json("Sources [1][2], []").is_none());
    }

    #[test]
    fn test_find_json_top_level_array() {
        let reply = r#"Here you go: [{"name": "Cloud"}, {"name": "Printers"}]"#;
        assert_eq!(
            find_json(reply).unwrap(),
            json!([{"name": "Cloud"}, {"name": "Printers"}])
        );
    }

    #[test]
    fn test_find_json_escaped_quotes() {
        let reply = r#"{"summary": "they said \"hi}\" loudly"}"#;
        assert_eq!(find_json(reply).unwrap()["summary"], "they said \"hi}\" loudly");
    }

    #[test]
    fn test_find_json_none() {
        assert!(find_json("no structure here").is_none());
        assert!(find_json("{ unterminated").is_none());
    }

    #[test]
    fn test_parse_sections_markdown() {
        let reply = "## Strengths\n- Strong brand\n- Scale economies\n\n**Weaknesses**\n* High debt\nOpportunities: Emerging markets\nThreats:\n1. New regulation\n2) Price wars";
        let value = parse_sections(reply);
        assert_eq!(value["Strengths"], json!(["Strong brand", "Scale economies"]));
        assert_eq!(value["Weaknesses"], json!(["High debt"]));
        assert_eq!(value["Opportunities"], json!(["Emerging markets"]));
        assert_eq!(value["Threats"], json!(["New regulation", "Price wars"]));
    }

    #[test]
    fn test_parse_sections_bullet_with_colon_is_item() {
        let reply = "Strengths:\n- Brand: recognized worldwide";
        let value = parse_sections(reply);
        assert_eq!(value["Strengths"], json!(["Brand: recognized worldwide"]));
    }

    #[test]
    fn test_parse_sections_nothing() {
        assert!(parse_sections("just a sentence without headings").is_null());
    }

    #[test]
    fn test_lookup_aliases_and_prefixes() {
        let value = json!({"Threat_of-New Entrants": 1, "Economic factors": 2, "S": 3});
        assert_eq!(lookup(&value, &["threat of new entrants"]), Some(&json!(1)));
        assert_eq!(lookup(&value, &["economic"]), Some(&json!(2)));
        assert_eq!(lookup(&value, &["s"]), Some(&json!(3)));
        assert_eq!(lookup(&value, &["st"]), None);
    }

    #[test]
    fn test_string_list_shapes() {
        assert_eq!(string_list(&json!(["a", " b ", ""])), vec!["a", "b"]);
        assert_eq!(
            string_list(&json!([{"factor": "tariffs", "impact": 4}, {"other": "x"}])),
            vec!["tariffs", "x"]
        );
        assert_eq!(string_list(&json!("- one\n- two; three")), vec!["one", "two", "three"]);
        assert!(string_list(&json!(null)).is_empty());
    }

    #[test]
    fn test_score_variants() {
        assert_eq!(score(&json!(4.4), 1, 5), Some(4));
        assert_eq!(score(&json!(9), 1, 5), Some(5));
        assert_eq!(score(&json!("4/5"), 1, 5), Some(4));
        assert_eq!(score(&json!("Very High"), 1, 5), Some(5));
        assert_eq!(score(&json!("moderate to high"), 1, 5), Some(3));
        assert_eq!(score(&json!("low"), 1, 5), Some(2));
        assert_eq!(score(&json!("unknown"), 1, 5), None);
    }

    #[test]
    fn test_number_variants() {
        assert_eq!(number(&json!("12.5%")), Some(12.5));
        assert_eq!(number(&json!("1.8x")), Some(1.8));
        assert_eq!(number(&json!("1,200")), Some(1200.0));
        assert_eq!(number(&json!("n/a")), None);
    }

    #[test]
    fn test_swot_from_wrapped_json() {
        let reply = r#"{"SWOT Analysis": {"Strengths": ["Brand"], "Weaknesses": "Debt; Legacy IT", "Opportunities": [], "Threats": [{"description": "Regulation"}]}}"#;
        let swot = SwotAnalysis::from_model_output(reply).unwrap();
        assert_eq!(swot.strengths, vec!["Brand"]);
        assert_eq!(swot.weaknesses, vec!["Debt", "Legacy IT"]);
        assert!(swot.opportunities.is_empty());
        assert_eq!(swot.threats, vec!["Regulation"]);
    }

    #[test]
    fn test_swot_from_markdown() {
        let reply = "### Strengths\n- Loyal customers\n### Threats\n- Cheap imports";
        let swot = SwotAnalysis::from_model_output(reply).unwrap();
        assert_eq!(swot.strengths, vec!["Loyal customers"]);
        assert_eq!(swot.threats, vec!["Cheap imports"]);
    }

    #[test]
    fn test_swot_empty_is_error() {
        let err = SwotAnalysis::from_model_output(r#"{"strengths": []}"#).unwrap_err();
        assert_eq!(err, ExtractError::Missing("SWOT quadrants"));
        assert_eq!(
            SwotAnalysis::from_model_output("I cannot help with that.").unwrap_err(),
            ExtractError::NoStructure
        );
    }

    #[test]
    fn test_pestel_impacts() {
        let reply = json!({
            "political": {"factors": ["Trade policy"], "impact": "high"},
            "economic": ["Inflation", "Rates"],
            "social": {"factors": []},
            "technological": {"factors": "AI adoption", "impact_score": 7},
            "legal": "GDPR"
        });
        let pestel = PestelAnalysis::from_value(&reply).unwrap();
        assert_eq!(pestel.political.impact, 4);
        assert_eq!(pestel.economic.impact, 3);
        assert_eq!(pestel.economic.factors.len(), 2);
        assert_eq!(pestel.social.impact, 1);
        assert_eq!(pestel.technological.impact, 5);
        assert_eq!(pestel.environmental.factors.len(), 0);
        assert_eq!(pestel.environmental.impact, 1);
        assert_eq!(pestel.legal.factors, vec!["GDPR"]);
    }

    #[test]
    fn test_porter_mixed_shapes() {
        let reply = json!({
            "Rivalry among existing competitors": {"rating": "4/5", "explanation": "Crowded market"},
            "Bargaining power of suppliers": "Low",
            "buyer_power": 5,
            "Threat of substitutes": "Streaming services and piracy offer alternatives to buyers"
        });
        let porter = PorterFiveForces::from_value(&reply).unwrap();
        assert_eq!(porter.competitive_rivalry.intensity, 4);
        assert_eq!(porter.competitive_rivalry.analysis, "Crowded market");
        assert_eq!(porter.supplier_power.intensity, 2);
        assert_eq!(porter.buyer_power.intensity, 5);
        assert_eq!(porter.threat_of_substitutes.intensity, 3);
        assert!(porter.threat_of_substitutes.analysis.starts_with("Streaming"));
        assert_eq!(porter.threat_of_new_entrants.intensity, 3);
    }

    #[test]
    fn test_porter_missing_everything() {
        assert_eq!(
            PorterFiveForces::from_value(&json!({"foo": 1})).unwrap_err(),
            ExtractError::Missing("competitive forces")
        );
    }

    #[test]
    fn test_bcg_recomputes_quadrants() {
        let reply = json!({"products": [
            {"name": "Cloud", "market_growth_rate": "22%", "relative_market_share": 1.4, "quadrant": "dog"},
            {"name": "Printers", "market_growth": 1.5, "market_share": "2.1x"},
            {"name": "No numbers"}
        ]});
        let bcg = BcgMatrix::from_value(&reply).unwrap();
        assert_eq!(bcg.products.len(), 2);
        assert_eq!(bcg.products[0].quadrant, BcgQuadrant::Star);
        assert_eq!(bcg.products[1].quadrant, BcgQuadrant::CashCow);
    }

    #[test]
    fn test_bcg_quadrant_lists() {
        let reply = json!({"stars": ["Cloud"], "dogs": "Fax machines"});
        let bcg = BcgMatrix::from_value(&reply).unwrap();
        assert_eq!(bcg.count(BcgQuadrant::Star), 1);
        assert_eq!(bcg.count(BcgQuadrant::Dog), 1);
    }

    #[test]
    fn test_bcg_bare_product_list() {
        let reply = r#"[{"name": "Cloud", "growth": 22, "share": 1.4}, {"name": "Printers", "growth": 1.5, "share": 2.1}]"#;
        let bcg = BcgMatrix::from_model_output(reply).unwrap();
        assert_eq!(bcg.products.len(), 2);
        assert_eq!(bcg.count(BcgQuadrant::Star), 1);
        assert_eq!(bcg.count(BcgQuadrant::CashCow), 1);
    }

    #[test]
    fn test_bcg_unrecognized() {
        assert!(BcgMatrix::from_value(&json!({"summary": "n/a"})).is_err());
    }

    #[test]
    fn test_mckinsey_joins_lists() {
        let reply = json!({"strategy": "Premium positioning", "skills": ["Design", "Supply chain"], "Shared Values": "Customer first"});
        let model = McKinsey7S::from_value(&reply).unwrap();
        assert_eq!(model.skills, "Design; Supply chain");
        assert_eq!(model.shared_values, "Customer first");
        assert!(model.structure.is_empty());
        assert!(McKinsey7S::from_value(&json!({"strategy": ""})).is_err());
    }

    #[test]
    fn test_sentiment_rescales_and_normalizes() {
        let reply = json!({"overall_score": 75, "positive": 0.5, "neutral": 0.3, "negative": 0.2, "key_themes": ["hiring"]});
        let sentiment = LinkedInSentiment::from_value(&reply).unwrap();
        assert!((sentiment.overall_score - 0.5).abs() < 1e-9);
        assert_eq!(sentiment.positive, 50.0);
        assert_eq!(sentiment.neutral, 30.0);
        assert_eq!(sentiment.negative, 20.0);
        assert_eq!(sentiment.key_themes, vec!["hiring"]);
    }

    #[test]
    fn test_sentiment_even_split_sums_to_hundred() {
        let reply = json!({"overall_score": 0.1, "positive": 1, "neutral": 1, "negative": 1});
        let sentiment = LinkedInSentiment::from_value(&reply).unwrap();
        let shares = [sentiment.positive, sentiment.neutral, sentiment.negative];
        let tenths: i64 = shares.iter().map(|s| (s * 10.0).round() as i64).sum();
        assert_eq!(tenths, 1000);
        assert!((shares.iter().sum::<f64>() - 100.0).abs() < 1e-9);
        assert_eq!(shares.iter().filter(|s| **s == 33.4).count(), 1);
    }

    #[test]
    fn test_percentages_uneven_split() {
        let shares = percentages([2.0, 2.0, 2.0 / 3.0]);
        assert_eq!(shares.map(|s| (s * 10.0).round() as i64).iter().sum::<i64>(), 1000);
        assert_eq!(shares, [42.9, 42.8, 14.3]);
    }

    #[test]
    fn test_sentiment_five_point_scale() {
        let sentiment = LinkedInSentiment::from_value(&json!({"sentiment_score": 5})).unwrap();
        assert_eq!(sentiment.overall_score, 1.0);
        let sentiment = LinkedInSentiment::from_value(&json!({"sentiment_score": 3})).unwrap();
        assert_eq!(sentiment.overall_score, 0.0);
    }

    #[test]
    fn test_sentiment_derived_distribution() {
        let sentiment = LinkedInSentiment::from_value(&json!({"overall_sentiment": "Positive"})).unwrap();
        assert_eq!(sentiment.overall_score, 0.5);
        assert_eq!(sentiment.positive, 60.0);
        assert_eq!(sentiment.neutral, 20.0);
        assert_eq!(sentiment.negative, 20.0);
    }

    #[test]
    fn test_sentiment_score_from_distribution() {
        let reply = json!({"distribution": {"positive": 70, "neutral": 10, "negative": 20}});
        let sentiment = LinkedInSentiment::from_value(&reply).unwrap();
        assert!((sentiment.overall_score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_sentiment_missing() {
        assert_eq!(
            LinkedInSentiment::from_value(&json!({"themes": ["x"]})).unwrap_err(),
            ExtractError::Missing("sentiment score")
        );
    }
}

//! Strategic framework artifacts.
//!
//! These are the typed shapes a language model reply is coerced into
//! (see `analysis::extract`). Every type serializes to the same JSON it
//! accepts, so persisted reports round-trip through `serde`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// SWOT analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SwotAnalysis {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,
}

impl SwotAnalysis {
    /// Internal factors in favour plus external factors in favour, minus the rest.
    pub fn balance(&self) -> i32 {
        let positive = self.strengths.len() + self.opportunities.len();
        let negative = self.weaknesses.len() + self.threats.len();
        positive as i32 - negative as i32
    }

    pub fn is_empty(&self) -> bool {
        self.strengths.is_empty()
            && self.weaknesses.is_empty()
            && self.opportunities.is_empty()
            && self.threats.is_empty()
    }
}

/// One PESTEL dimension: its factors and an impact rating from 1 to 5
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PestelDimension {
    pub factors: Vec<String>,
    #[schema(minimum = 1, maximum = 5)]
    pub impact: u8,
}

/// PESTEL analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PestelAnalysis {
    pub political: PestelDimension,
    pub economic: PestelDimension,
    pub social: PestelDimension,
    pub technological: PestelDimension,
    pub environmental: PestelDimension,
    pub legal: PestelDimension,
}

impl PestelAnalysis {
    pub const LABELS: [&'static str; 6] = [
        "Political",
        "Economic",
        "Social",
        "Technological",
        "Environmental",
        "Legal",
    ];

    /// Dimensions in `LABELS` order.
    pub fn dimensions(&self) -> [&PestelDimension; 6] {
        [
            &self.political,
            &self.economic,
            &self.social,
            &self.technological,
            &self.environmental,
            &self.legal,
        ]
    }

    pub fn average_impact(&self) -> f64 {
        let total: u32 = self.dimensions().iter().map(|d| d.impact as u32).sum();
        total as f64 / 6.0
    }
}

/// Assessment of a single competitive force
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForceAssessment {
    #[schema(minimum = 1, maximum = 5)]
    pub intensity: u8,
    pub analysis: String,
}

/// Porter's Five Forces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PorterFiveForces {
    pub competitive_rivalry: ForceAssessment,
    pub supplier_power: ForceAssessment,
    pub buyer_power: ForceAssessment,
    pub threat_of_substitutes: ForceAssessment,
    pub threat_of_new_entrants: ForceAssessment,
}

impl PorterFiveForces {
    pub const LABELS: [&'static str; 5] = [
        "Rivalry",
        "Suppliers",
        "Buyers",
        "Substitutes",
        "New entrants",
    ];

    /// Forces in `LABELS` order.
    pub fn forces(&self) -> [&ForceAssessment; 5] {
        [
            &self.competitive_rivalry,
            &self.supplier_power,
            &self.buyer_power,
            &self.threat_of_substitutes,
            &self.threat_of_new_entrants,
        ]
    }

    /// Mean force intensity, the overall competitive pressure.
    pub fn average_intensity(&self) -> f64 {
        let total: u32 = self.forces().iter().map(|f| f.intensity as u32).sum();
        total as f64 / 5.0
    }
}

/// BCG growth-share quadrant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BcgQuadrant {
    Star,
    CashCow,
    QuestionMark,
    Dog,
}

impl BcgQuadrant {
    /// Market growth (percent) separating high-growth markets
    pub const GROWTH_THRESHOLD: f64 = 10.0;

    /// Relative share at which a product leads its market
    pub const SHARE_THRESHOLD: f64 = 1.0;

    /// Classify a product by market growth rate (percent) and relative market share.
    pub fn classify(market_growth_rate: f64, relative_market_share: f64) -> Self {
        let high_growth = market_growth_rate >= Self::GROWTH_THRESHOLD;
        let high_share = relative_market_share >= Self::SHARE_THRESHOLD;
        match (high_growth, high_share) {
            (true, true) => BcgQuadrant::Star,
            (false, true) => BcgQuadrant::CashCow,
            (true, false) => BcgQuadrant::QuestionMark,
            (false, false) => BcgQuadrant::Dog,
        }
    }
}

impl std::fmt::Display for BcgQuadrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BcgQuadrant::Star => "Star",
            BcgQuadrant::CashCow => "Cash Cow",
            BcgQuadrant::QuestionMark => "Question Mark",
            BcgQuadrant::Dog => "Dog",
        };
        f.write_str(name)
    }
}

/// A product or business unit placed on the BCG matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BcgProduct {
    pub name: String,
    /// Annual market growth in percent
    pub market_growth_rate: f64,
    /// Share relative to the largest competitor (1.0 = parity)
    pub relative_market_share: f64,
    pub quadrant: BcgQuadrant,
}

impl BcgProduct {
    /// Build a product, deriving its quadrant from the two axes.
    pub fn new(name: impl Into<String>, market_growth_rate: f64, relative_market_share: f64) -> Self {
        let market_growth_rate = market_growth_rate.max(0.0);
        let relative_market_share = relative_market_share.max(0.0);
        Self {
            name: name.into(),
            market_growth_rate,
            relative_market_share,
            quadrant: BcgQuadrant::classify(market_growth_rate, relative_market_share),
        }
    }
}

/// BCG growth-share matrix
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BcgMatrix {
    pub products: Vec<BcgProduct>,
}

impl BcgMatrix {
    pub fn count(&self, quadrant: BcgQuadrant) -> usize {
        self.products.iter().filter(|p| p.quadrant == quadrant).count()
    }
}

/// McKinsey 7S model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct McKinsey7S {
    pub strategy: String,
    pub structure: String,
    pub systems: String,
    pub shared_values: String,
    pub style: String,
    pub staff: String,
    pub skills: String,
}

impl McKinsey7S {
    pub fn is_empty(&self) -> bool {
        [
            &self.strategy,
            &self.structure,
            &self.systems,
            &self.shared_values,
            &self.style,
            &self.staff,
            &self.skills,
        ]
        .iter()
        .all(|s| s.is_empty())
    }
}

/// Sentiment inferred from LinkedIn posts and snippets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LinkedInSentiment {
    /// Overall score in [-1, 1]
    pub overall_score: f64,
    /// Share of positive mentions in percent
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
    pub key_themes: Vec<String>,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcg_quadrant_boundaries() {
        assert_eq!(BcgQuadrant::classify(10.0, 1.0), BcgQuadrant::Star);
        assert_eq!(BcgQuadrant::classify(9.99, 1.0), BcgQuadrant::CashCow);
        assert_eq!(BcgQuadrant::classify(25.0, 0.4), BcgQuadrant::QuestionMark);
        assert_eq!(BcgQuadrant::classify(2.0, 0.2), BcgQuadrant::Dog);
    }

    #[test]
    fn test_bcg_product_clamps_negative_axes() {
        let product = BcgProduct::new("Legacy", -5.0, -1.0);
        assert_eq!(product.market_growth_rate, 0.0);
        assert_eq!(product.relative_market_share, 0.0);
        assert_eq!(product.quadrant, BcgQuadrant::Dog);
    }

    #[test]
    fn test_swot_balance() {
        let swot = SwotAnalysis {
            strengths: vec!["brand".into(), "scale".into()],
            weaknesses: vec!["debt".into()],
            opportunities: vec!["asia".into()],
            threats: vec![],
        };
        assert_eq!(swot.balance(), 2);
        assert!(!swot.is_empty());
    }

    #[test]
    fn test_porter_average_intensity() {
        let force = |intensity| ForceAssessment {
            intensity,
            analysis: String::new(),
        };
        let porter = PorterFiveForces {
            competitive_rivalry: force(5),
            supplier_power: force(1),
            buyer_power: force(3),
            threat_of_substitutes: force(2),
            threat_of_new_entrants: force(4),
        };
        assert!((porter.average_intensity() - 3.0).abs() < f64::EPSILON);
    }
}

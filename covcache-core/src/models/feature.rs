use crate::models::interval::ContigInterval;

///
/// A genomic annotation (peak, gene, repeat, ...). Contributes depth over its
/// whole interval but carries no bases.
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Feature {
    pub id: String,
    pub feature_type: String,
    pub position: ContigInterval,
    pub score: f64,
}

impl Feature {
    pub fn new(
        id: impl Into<String>,
        feature_type: impl Into<String>,
        position: ContigInterval,
        score: f64,
    ) -> Self {
        Feature {
            id: id.into(),
            feature_type: feature_type.into(),
            position,
            score,
        }
    }
}

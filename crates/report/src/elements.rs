use extract::schema::fields;
use extract::ExtractedElements;

pub const EM_DASH: &str = "—";
pub const NAME_PLACEHOLDER: &str = "N/A";

pub const METHODOLOGY: &str = "Public information + knowledge-graph reasoning + LLM analysis";
pub const DISCLAIMER: &str = "This report is for reference only and does not constitute investment advice.";
pub const NO_GRAPH_DATA: &str = "No graph data available";

/// The five core-element rows, resolved through legacy key aliases.
#[derive(Debug, Clone, Default)]
pub struct CoreElements<'a> {
    pub name: Option<&'a str>,
    pub founded: Option<&'a str>,
    pub sector: Option<&'a str>,
    pub one_liner: Option<&'a str>,
    pub description: Option<&'a str>,
}

impl<'a> CoreElements<'a> {
    pub fn resolve(elements: &'a ExtractedElements) -> Self {
        Self {
            name: elements.first_of(&[fields::COMPANY_NAME, "name"]),
            founded: elements.first_of(&[fields::FOUNDED, "founded_date"]),
            sector: elements.first_of(&[fields::SECTOR, "industry"]),
            one_liner: elements.first_of(&[fields::ONE_LINER, "value_proposition"]),
            description: elements.first_of(&[fields::DESCRIPTION, "product_description"]),
        }
    }

    pub fn title_name(&self) -> &'a str {
        self.name.unwrap_or(NAME_PLACEHOLDER)
    }

    /// (label, value) rows in table order.
    pub fn rows(&self) -> [(&'static str, Option<&'a str>); 5] {
        [
            ("Company", self.name),
            ("Founded", self.founded),
            ("Sector", self.sector),
            ("Value proposition", self.one_liner),
            ("Description", self.description),
        ]
    }
}

pub fn or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => EM_DASH,
    }
}

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Marketaux `/news/all` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MarketauxResponse {
    #[serde(default)]
    pub meta: MarketauxMeta,
    #[serde(default)]
    pub data: Vec<MarketauxArticle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MarketauxMeta {
    pub found: u64,
    pub returned: u64,
    pub limit: u64,
    pub page: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MarketauxArticle {
    pub uuid: String,
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub snippet: String,
    pub url: String,
    pub image_url: Option<String>,
    pub language: String,
    pub published_at: String,
    pub source: MarketauxSource,
    pub relevance_score: Option<f64>,
    pub entities: Vec<MarketauxEntity>,
}

/// Marketaux has shipped `source` both as a plain domain string and as an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarketauxSource {
    Name(String),
    Detailed {
        #[serde(default)]
        name: String,
        #[serde(default)]
        url: String,
        #[serde(default)]
        domain: String,
    },
}

impl Default for MarketauxSource {
    fn default() -> Self {
        MarketauxSource::Name(String::new())
    }
}

impl MarketauxSource {
    pub fn name(&self) -> &str {
        match self {
            MarketauxSource::Name(name) => name,
            MarketauxSource::Detailed { name, domain, .. } => {
                if name.is_empty() {
                    domain
                } else {
                    name
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MarketauxEntity {
    pub symbol: String,
    pub name: String,
    pub exchange: Option<String>,
    pub exchange_long: Option<String>,
    pub country: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub industry: String,
    pub match_score: f64,
    pub sentiment_score: f64,
    pub highlights: Vec<MarketauxHighlight>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MarketauxHighlight {
    pub highlight: String,
    pub sentiment: f64,
    pub highlight_sentiment: Option<f64>,
}

/// Article as the news pages consume it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub uuid: String,
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub snippet: String,
    pub url: String,
    pub image_url: String,
    pub language: String,
    pub published_at: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
}

impl From<MarketauxArticle> for NewsArticle {
    fn from(article: MarketauxArticle) -> Self {
        let source = article.source.name().to_string();
        Self {
            uuid: article.uuid,
            title: article.title,
            description: article.description,
            keywords: article.keywords,
            snippet: article.snippet,
            url: article.url,
            image_url: article.image_url.unwrap_or_default(),
            language: article.language,
            published_at: article.published_at,
            source,
            category: None,
            relevance_score: article.relevance_score,
        }
    }
}

impl NewsArticle {
    /// Case-insensitive match on title or description; an empty query matches.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.title.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}

/// Category tabs on the market news page.
pub const NEWS_CATEGORIES: [&str; 6] = ["All", "Crypto", "Tech", "Economy", "Forex", "Commodities"];

/// Maps a tab label to the filter sent to the news service.
pub fn category_filter(category: &str) -> String {
    if category.eq_ignore_ascii_case("all") {
        "general".to_string()
    } else {
        category.to_lowercase()
    }
}

struct Placeholder {
    title: &'static str,
    description: &'static str,
    snippet: &'static str,
    image_url: &'static str,
    source: &'static str,
    category: &'static str,
    keywords: &'static str,
}

const PLACEHOLDERS: [Placeholder; 6] = [
    Placeholder {
        title: "NVIDIA Surpasses Market Expectations with Record AI Chip Demand",
        description: "The tech giant reported quarterly earnings that shattered Wall Street estimates, driven by insatiable demand for its H100 AI processors from data centers worldwide.",
        snippet: "NVIDIA's data center revenue tripled year-over-year, signaling that the AI boom is still in its early stages.",
        image_url: "https://images.unsplash.com/photo-1620712943543-bcc4688e7485?auto=format&fit=crop&w=1470&q=80",
        source: "TechCrunch",
        category: "Technology",
        keywords: "AI, NVIDIA, Chips, Stocks",
    },
    Placeholder {
        title: "Federal Reserve Holds Rates Steady, Signals Cuts Ahead",
        description: "The Fed maintained its benchmark interest rate but projected rate cuts later in the year as inflation cools towards the 2% target.",
        snippet: "Markets rallied after the chair noted that risks to the employment and inflation goals are moving into better balance.",
        image_url: "https://images.unsplash.com/photo-1611974765270-ca1258634369?auto=format&fit=crop&w=1470&q=80",
        source: "Bloomberg",
        category: "Economy",
        keywords: "Fed, Rates, Economy, Inflation",
    },
    Placeholder {
        title: "Bitcoin Reclaims $65,000 Amid ETF Inflow Surge",
        description: "The largest cryptocurrency is rallying again as institutional investors pour billions into spot Bitcoin ETFs.",
        snippet: "Analysts expect the halving combined with sustained ETF demand to keep pressure on supply.",
        image_url: "https://images.unsplash.com/photo-1518546305927-5a555bb7020d?auto=format&fit=crop&w=1469&q=80",
        source: "CoinDesk",
        category: "Crypto",
        keywords: "Bitcoin, Crypto, ETF, Investment",
    },
    Placeholder {
        title: "Tesla Unveils New Affordable EV Model for Mass Market",
        description: "Tesla announced an entry-level model with a starting price under $25,000 and a range of 300 miles.",
        snippet: "Production is slated to begin late next year, a direct challenge to BYD and other rising EV competitors.",
        image_url: "https://images.unsplash.com/photo-1560958089-b8a1929cea89?auto=format&fit=crop&w=1471&q=80",
        source: "Reuters",
        category: "Auto",
        keywords: "Tesla, EV, Automotive",
    },
    Placeholder {
        title: "Oil Prices Spike as Geopolitical Tensions Escalate",
        description: "Brent crude futures jumped 4% following reports of supply disruptions, raising concerns about energy security.",
        snippet: "Energy analysts warn that a prolonged conflict could push oil back above $90 a barrel.",
        image_url: "https://images.unsplash.com/photo-1518458028785-8fbcd101ebb9?auto=format&fit=crop&w=1470&q=80",
        source: "CNBC",
        category: "Energy",
        keywords: "Oil, Energy, Geopolitics, Market",
    },
    Placeholder {
        title: "Apple Vision Pro 2 Rumored to Launch Early Next Year",
        description: "Supply chain leaks suggest Apple is fast-tracking a lighter, cheaper version of its spatial computer.",
        snippet: "The new device is expected to address battery life, one of the main criticisms of the first generation.",
        image_url: "https://images.unsplash.com/photo-1611186871348-b1ce696e52c9?auto=format&fit=crop&w=1470&q=80",
        source: "The Verge",
        category: "Technology",
        keywords: "Apple, VR, Tech, Gadgets",
    },
];

/// Built-in articles served when live news is unavailable. Publication times
/// step back one hour each from `now`.
pub fn placeholder_news(now: DateTime<Utc>) -> Vec<NewsArticle> {
    PLACEHOLDERS
        .iter()
        .enumerate()
        .map(|(i, p)| NewsArticle {
            uuid: (i + 1).to_string(),
            title: p.title.to_string(),
            description: p.description.to_string(),
            keywords: p.keywords.to_string(),
            snippet: p.snippet.to_string(),
            url: "#".to_string(),
            image_url: p.image_url.to_string(),
            language: "en".to_string(),
            published_at: (now - Duration::hours(i as i64)).to_rfc3339(),
            source: p.source.to_string(),
            category: Some(p.category.to_string()),
            relevance_score: None,
        })
        .collect()
}

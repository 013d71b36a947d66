//! crates/pitchdeck_core/src/catalog.rs
//!
//! The slide catalog: every slide type a deck can contain, with its display
//! names, a short content brief used when prompting the assistant, and the
//! elements the generated text is expected to cover. Six types are required
//! in every deck; the rest are optional.

use crate::domain::Language;

/// All slide types known to the generator, in deck order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlideType {
    Title,
    Introduction,
    Team,
    Experience,
    Problem,
    Solution,
    Revenue,
    GoToMarket,
    Demo,
    Technology,
    Pipeline,
    Expansion,
    Uniqueness,
    Competition,
    Market,
    Traction,
    Financials,
    UseOfFunds,
    Ask,
}

/// Static description of one slide type.
pub struct SlideSpec {
    pub name_en: &'static str,
    pub name_no: &'static str,
    /// One-sentence brief handed to the assistant when generating content.
    pub brief: &'static str,
    pub required_elements: &'static [&'static str],
    pub required: bool,
}

/// Deck order. Required and optional types interleave the way a finished
/// deck is usually arranged.
pub const DECK_ORDER: &[SlideType] = &[
    SlideType::Title,
    SlideType::Introduction,
    SlideType::Team,
    SlideType::Experience,
    SlideType::Problem,
    SlideType::Solution,
    SlideType::Revenue,
    SlideType::GoToMarket,
    SlideType::Demo,
    SlideType::Technology,
    SlideType::Pipeline,
    SlideType::Expansion,
    SlideType::Uniqueness,
    SlideType::Competition,
    SlideType::Market,
    SlideType::Traction,
    SlideType::Financials,
    SlideType::UseOfFunds,
    SlideType::Ask,
];

impl SlideType {
    /// The stable key used in API payloads and database rows.
    pub fn key(self) -> &'static str {
        match self {
            SlideType::Title => "title",
            SlideType::Introduction => "introduction",
            SlideType::Team => "team",
            SlideType::Experience => "experience",
            SlideType::Problem => "problem",
            SlideType::Solution => "solution",
            SlideType::Revenue => "revenue",
            SlideType::GoToMarket => "go_to_market",
            SlideType::Demo => "demo",
            SlideType::Technology => "technology",
            SlideType::Pipeline => "pipeline",
            SlideType::Expansion => "expansion",
            SlideType::Uniqueness => "uniqueness",
            SlideType::Competition => "competition",
            SlideType::Market => "market",
            SlideType::Traction => "traction",
            SlideType::Financials => "financials",
            SlideType::UseOfFunds => "use_of_funds",
            SlideType::Ask => "ask",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        DECK_ORDER.iter().copied().find(|t| t.key() == key)
    }

    pub fn spec(self) -> &'static SlideSpec {
        match self {
            SlideType::Title => &SlideSpec {
                name_en: "Title Slide",
                name_no: "Tittelside",
                brief: "State the company name, its tagline, and what the company does in one line.",
                required_elements: &["company_name", "tagline"],
                required: true,
            },
            SlideType::Introduction => &SlideSpec {
                name_en: "Introduction",
                name_no: "Introduksjon",
                brief: "Give a short narrative summary of the company and its core value proposition, opening with a hook.",
                required_elements: &["summary", "hook"],
                required: true,
            },
            SlideType::Team => &SlideSpec {
                name_en: "Meet the Team",
                name_no: "M\u{f8}t Teamet",
                brief: "Introduce the key team members with their roles and the experience that qualifies them.",
                required_elements: &["members", "roles", "experience"],
                required: false,
            },
            SlideType::Experience => &SlideSpec {
                name_en: "Our Experience with the Problem",
                name_no: "V\u{e5}r Erfaring med Problemet",
                brief: "Explain how the team came to understand the problem first-hand and what that taught them.",
                required_elements: &["background", "insights", "learnings"],
                required: false,
            },
            SlideType::Problem => &SlideSpec {
                name_en: "Problem Statement",
                name_no: "Problemstilling",
                brief: "Describe the market problem, who it affects, and why it needs solving now.",
                required_elements: &["problem_statement", "market_impact", "solution_need"],
                required: true,
            },
            SlideType::Solution => &SlideSpec {
                name_en: "Solution",
                name_no: "L\u{f8}sning",
                brief: "Describe the product and the specific ways it resolves the stated problem.",
                required_elements: &["solution_description", "benefits", "unique_features"],
                required: true,
            },
            SlideType::Revenue => &SlideSpec {
                name_en: "Revenue Model",
                name_no: "Inntektsmodell",
                brief: "Explain how the company earns money: streams, pricing, and expected development.",
                required_elements: &["revenue_streams", "pricing", "projections"],
                required: false,
            },
            SlideType::GoToMarket => &SlideSpec {
                name_en: "Go-To-Market Strategy",
                name_no: "Markedsstrategi",
                brief: "Lay out how the product reaches customers: channels, tactics, and rough timeline.",
                required_elements: &["approach", "channels", "timeline"],
                required: false,
            },
            SlideType::Demo => &SlideSpec {
                name_en: "Demo",
                name_no: "Demo",
                brief: "Walk through the product's main features and typical use cases.",
                required_elements: &["features", "benefits", "use_cases"],
                required: false,
            },
            SlideType::Technology => &SlideSpec {
                name_en: "Technology",
                name_no: "Teknologi",
                brief: "Summarize the technology stack and the technical edge it gives the product.",
                required_elements: &["tech_stack", "innovations", "advantages"],
                required: false,
            },
            SlideType::Pipeline => &SlideSpec {
                name_en: "Product Development Pipeline",
                name_no: "Produktutviklingsprosess",
                brief: "Show where development stands today, milestones reached, and what ships next.",
                required_elements: &["current_stage", "next_steps", "timeline"],
                required: false,
            },
            SlideType::Expansion => &SlideSpec {
                name_en: "Product Expansion",
                name_no: "Produktutvidelse",
                brief: "Outline planned follow-on products and the markets they open.",
                required_elements: &["future_products", "market_potential", "timeline"],
                required: false,
            },
            SlideType::Uniqueness => &SlideSpec {
                name_en: "Uniqueness & Protectability",
                name_no: "Unikhet & Beskyttelse",
                brief: "Explain what makes the product hard to copy: IP, data, or structural moats.",
                required_elements: &["unique_features", "ip_protection", "moat"],
                required: false,
            },
            SlideType::Competition => &SlideSpec {
                name_en: "Competitive Landscape",
                name_no: "Konkurransesituasjon",
                brief: "Name the main competitors and position the product against them.",
                required_elements: &["competitors", "advantages", "positioning"],
                required: false,
            },
            SlideType::Market => &SlideSpec {
                name_en: "Market Opportunity",
                name_no: "Markedsmulighet",
                brief: "Size the market, its growth, and the customer segments being targeted.",
                required_elements: &["market_size", "growth_rate", "target_segments"],
                required: true,
            },
            SlideType::Traction => &SlideSpec {
                name_en: "Traction & Milestones",
                name_no: "Traksjon & Milep\u{e6}ler",
                brief: "List concrete progress to date: customers, revenue, partnerships, milestones.",
                required_elements: &["current_status", "achievements", "roadmap"],
                required: false,
            },
            SlideType::Financials => &SlideSpec {
                name_en: "Financial Overview",
                name_no: "Finansiell Oversikt",
                brief: "Summarize key financial metrics and projections relevant to investors.",
                required_elements: &["key_metrics", "projections", "funding_request"],
                required: false,
            },
            SlideType::UseOfFunds => &SlideSpec {
                name_en: "Use of Funds",
                name_no: "Bruk av Midler",
                brief: "Break down how the raised capital will be allocated and to what effect.",
                required_elements: &["allocation", "timeline", "expected_impact"],
                required: false,
            },
            SlideType::Ask => &SlideSpec {
                name_en: "Ask",
                name_no: "Anmodning",
                brief: "State the amount being raised, what it buys, and the proposed terms.",
                required_elements: &["funding_request", "use_of_funds", "terms"],
                required: true,
            },
        }
    }

    /// Display name in the given deck language.
    pub fn display_name(self, language: Language) -> &'static str {
        match language {
            Language::English => self.spec().name_en,
            Language::Norwegian => self.spec().name_no,
        }
    }

    pub fn is_required(self) -> bool {
        self.spec().required
    }
}

/// The slide types every deck must contain, in deck order.
pub fn required_types() -> impl Iterator<Item = SlideType> {
    DECK_ORDER.iter().copied().filter(|t| t.is_required())
}

/// The optional slide types, in deck order.
pub fn optional_types() -> impl Iterator<Item = SlideType> {
    DECK_ORDER.iter().copied().filter(|t| !t.is_required())
}

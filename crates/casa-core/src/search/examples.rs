//! Curated example queries that showcase the hybrid search engine.

use serde::Serialize;

/// One line of the "why it works" breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExampleReason {
    pub label: &'static str,
    pub detail: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchExample {
    pub id: &'static str,
    pub label: &'static str,
    pub query: &'static str,
    pub title: &'static str,
    pub showcases: &'static str,
    pub reasons: &'static [ExampleReason],
}

pub const EXAMPLES: &[SearchExample] = &[
    SearchExample {
        id: "hybrid",
        label: "Hybrid Search",
        query: "Show me family apartments in Zurich with a nice view up to 16k",
        title: "The \"All-in-One\" Hybrid Search",
        showcases: "The \"Master Template\" working perfectly.",
        reasons: &[
            ExampleReason {
                label: "Family",
                detail: "Triggers Fragment (bedrooms >= 3).",
            },
            ExampleReason {
                label: "Zurich",
                detail: "Recognized as City Concept (city = 'Zurich').",
            },
            ExampleReason {
                label: "up to 16k",
                detail: "Triggers (price <= 16000).",
            },
            ExampleReason {
                label: "Nice view",
                detail: "Semantic search across text embeddings and image embeddings. Text weighted 60% + Image 40%.",
            },
        ],
    },
    SearchExample {
        id: "business",
        label: "Business Rule",
        query: "Cheap studio in Geneva",
        title: "The \"Business Rule\" Translator",
        showcases: "Combining multiple business definitions into a precise filter.",
        reasons: &[
            ExampleReason {
                label: "Cheap",
                detail: "Triggers Fragment (price <= 2500).",
            },
            ExampleReason {
                label: "Studio",
                detail: "Triggers Fragment (bedrooms = 0).",
            },
            ExampleReason {
                label: "Geneva",
                detail: "Exact match filter (city = 'Geneva').",
            },
            ExampleReason {
                label: "Result",
                detail: "Finds low-cost, single-room listings without typing \"price under 2500 and 0 bedrooms\".",
            },
        ],
    },
    SearchExample {
        id: "vibe",
        label: "Pure Vibe",
        query: "A quiet place to study near the water",
        title: "The \"Pure Vibe\" (Semantic) Search",
        showcases: "The raw power of the Gemini Embedding model when no hard filters exist.",
        reasons: &[
            ExampleReason {
                label: "No keywords",
                detail: "No \"cheap\", \"family\", etc. trigger your fragments.",
            },
            ExampleReason {
                label: "Master Template",
                detail: "Puts the entire phrase into the embedding function.",
            },
            ExampleReason {
                label: "Result",
                detail: "Finds listings semantically related to \"quiet\" and \"water\" even if those exact words aren't in the description.",
            },
        ],
    },
];

/// Returns the example whose query is exactly `query`.
pub fn find_example(query: &str) -> Option<&'static SearchExample> {
    EXAMPLES.iter().find(|e| e.query == query)
}

pub fn example_by_id(id: &str) -> Option<&'static SearchExample> {
    EXAMPLES.iter().find(|e| e.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_example_requires_exact_query() {
        assert_eq!(find_example("Cheap studio in Geneva").map(|e| e.id), Some("business"));
        assert!(find_example("cheap studio in geneva").is_none());
        assert!(find_example("").is_none());
    }

    #[test]
    fn test_example_ids_are_unique() {
        for example in EXAMPLES {
            assert_eq!(example_by_id(example.id), Some(example));
            assert!(!example.reasons.is_empty());
        }
    }
}

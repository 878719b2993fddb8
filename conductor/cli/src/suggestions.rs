//! Example query catalog
//!
//! Ready-made questions grouped by topic, plus a few quick suggestions.
//! Every entry is numbered from 1 in display order so `/ask <n>` can pick
//! one.

/// A named group of example queries
#[derive(Debug)]
pub struct Category {
    /// Heading shown above the queries
    pub name: &'static str,
    /// Example queries in display order
    pub queries: &'static [&'static str],
}

/// Example queries by topic
pub const CATEGORIES: &[Category] = &[
    Category {
        name: "LCA Basics",
        queries: &[
            "What is Life Cycle Assessment?",
            "LCA phases for mining operations",
            "Environmental impact categories",
        ],
    },
    Category {
        name: "Mining Processes",
        queries: &[
            "Carbon footprint of iron ore mining",
            "Water usage in coal extraction",
            "Energy consumption in mineral processing",
        ],
    },
    Category {
        name: "Circular Economy",
        queries: &[
            "Waste-to-resource opportunities",
            "Mine closure and rehabilitation",
            "Sustainable mining practices",
        ],
    },
    Category {
        name: "Environmental Impact",
        queries: &[
            "Biodiversity impact assessment",
            "Soil contamination analysis",
            "Air quality monitoring data",
        ],
    },
];

/// Short suggestions listed after the categories
pub const QUICK_SUGGESTIONS: &[&str] = &[
    "LCA for copper mining",
    "Circular economy benefits",
    "Environmental impact data",
];

/// All example queries in display order
pub fn all_examples() -> impl Iterator<Item = &'static str> {
    CATEGORIES
        .iter()
        .flat_map(|c| c.queries.iter().copied())
        .chain(QUICK_SUGGESTIONS.iter().copied())
}

/// The `n`-th example query, counting from 1
pub fn example(n: usize) -> Option<&'static str> {
    n.checked_sub(1).and_then(|i| all_examples().nth(i))
}

/// Render the numbered catalog
pub fn render_catalog() -> String {
    let mut out = String::new();
    let mut n = 1;

    for category in CATEGORIES {
        out.push_str(category.name);
        out.push('\n');
        for query in category.queries {
            out.push_str(&format!("  {n:>2}. {query}\n"));
            n += 1;
        }
    }

    out.push_str("Quick suggestions\n");
    for query in QUICK_SUGGESTIONS {
        out.push_str(&format!("  {n:>2}. {query}\n"));
        n += 1;
    }
    out
}

//! The fixed set of candidate hypotheses every query draws from.

use crup_common::{Hypothesis, SourceRef, Validation};

struct Entry {
    key: &'static str,
    title: &'static str,
    confidence: f64,
    domains: &'static [&'static str],
    physical: bool,
    technical: &'static str,
    historical: &'static str,
    sources: &'static [(&'static str, &'static str)],
}

const ENTRIES: &[Entry] = &[
    Entry {
        key: "h1",
        title: "Biological capacitor using modified mitochondria + graphene layers",
        confidence: 0.95,
        domains: &["biology", "materials"],
        physical: true,
        technical: "Feasible mid-term (2027+)",
        historical: "No critical blockers identified",
        sources: &[
            ("Mitochondrial Bioenergetics 2023", "Biology"),
            ("CVD Graphene Layering Methods", "Materials Science"),
        ],
    },
    Entry {
        key: "h2",
        title: "Quantum-entropy battery using room-temperature superconductors",
        confidence: 0.88,
        domains: &["physics", "engineering"],
        physical: true,
        technical: "Requires materials breakthrough",
        historical: "Similar attempts stalled at materials step",
        sources: &[
            ("Entropy Bounds in Practical Systems", "Physics"),
            ("Cryo-to-Room Temp Transition Designs", "Engineering"),
        ],
    },
    Entry {
        key: "h3",
        title: "Photosynthetic energy conversion with artificial chloroplasts",
        confidence: 0.76,
        domains: &["biology", "chemistry"],
        physical: true,
        technical: "Efficiency constraints likely",
        historical: "Mixed outcomes in pilot studies",
        sources: &[
            ("Artificial Chloroplasts 2022", "Biology"),
            ("Catalytic Light Harvesting", "Chemistry"),
        ],
    },
];

/// Materialise the corpus. Ids carry `stamp` as a suffix (`h1-<stamp>`) so
/// results from different runs never share an id.
pub fn hypotheses(stamp: i64) -> Vec<Hypothesis> {
    ENTRIES
        .iter()
        .map(|e| Hypothesis {
            id: format!("{}-{}", e.key, stamp),
            title: e.title.to_string(),
            confidence: e.confidence,
            domain_ids: e.domains.iter().map(|d| d.to_string()).collect(),
            validation: Validation {
                physical: e.physical,
                technical: e.technical.to_string(),
                historical: e.historical.to_string(),
            },
            sources: e
                .sources
                .iter()
                .map(|(title, domain)| SourceRef { title: title.to_string(), domain: domain.to_string() })
                .collect(),
        })
        .collect()
}

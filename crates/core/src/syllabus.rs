//! Built-in syllabus used on first launch and after a reset.

use crate::model::{Catalogue, Category, StudyItem};

const SYLLABUS: &[(&str, &str, &[(&str, &str)])] = &[
    (
        "foundation-1",
        "Phase 1: High Priority - Probability & Stats",
        &[
            ("ps-1", "Counting & Axioms of Probability"),
            ("ps-2", "Conditional Probability & Bayes Theorem"),
            ("ps-3", "Distributions: Bernoulli, Binomial, Poisson"),
            ("ps-4", "Normal & Standard Normal Distributions"),
            ("ps-5", "Central Limit Theorem & Confidence Intervals"),
            ("ps-6", "Hypothesis Testing: z-test, t-test, chi-squared"),
        ],
    ),
    (
        "foundation-2",
        "Phase 2: High Priority - Linear Algebra",
        &[
            ("la-1", "Vector Spaces & Linear Independence"),
            ("la-2", "Matrices: Projection, Orthogonal, Idempotent"),
            ("la-3", "Gaussian Elimination & Rank-Nullity"),
            ("la-4", "Eigenvalues & Eigenvectors"),
            ("la-5", "LU & Singular Value Decomposition (SVD)"),
        ],
    ),
    (
        "core-ml",
        "Phase 3: Core - Machine Learning",
        &[
            ("ml-1", "Regression: Linear, Multiple, Ridge, Logistic"),
            ("ml-2", "Classification: k-NN, Naive Bayes, SVM"),
            ("ml-3", "Decision Trees & Bias-Variance Trade-off"),
            ("ml-4", "Neural Networks & Cross-Validation"),
            ("ml-5", "Unsupervised: K-Means, PCA, Clustering"),
        ],
    ),
    (
        "essential-math",
        "Phase 4: Important - Calculus & Optimization",
        &[
            ("co-1", "Limits, Continuity & Differentiability"),
            ("co-2", "Taylor Series & Single Variable Calculus"),
            ("co-3", "Maxima, Minima & Optimization"),
        ],
    ),
    (
        "tech-stack-1",
        "Phase 5: Programming & DSA",
        &[
            ("dsa-1", "Stacks, Queues & Linked Lists"),
            ("dsa-2", "Trees & Hash Tables"),
            ("dsa-3", "Search & Sort: Binary, Merge, Quick"),
            ("dsa-4", "Graph Theory: Traversals & Shortest Path"),
        ],
    ),
    (
        "tech-stack-2",
        "Phase 6: Database Systems",
        &[
            ("db-1", "ER-Model & Relational Algebra"),
            ("db-2", "SQL & Normal Forms"),
            ("db-3", "Indexing & Data Warehouse Modeling"),
        ],
    ),
    (
        "specialization",
        "Phase 7: Specialized AI",
        &[
            ("ai-1", "Search: Informed, Uninformed, Adversarial"),
            ("ai-2", "Logic: Propositional & Predicate"),
            ("ai-3", "Reasoning under Uncertainty & Inference"),
        ],
    ),
];

/// The default syllabus with every item incomplete.
///
/// # Panics
///
/// Panics if the built-in table contains a duplicate id.
#[must_use]
pub fn default_catalogue() -> Catalogue {
    let categories = SYLLABUS.iter().map(|(id, label, items)| {
        Category::new(
            *id,
            *label,
            items.iter().map(|(item_id, title)| StudyItem::new(*item_id, *title)),
        )
    });
    Catalogue::new(categories).expect("built-in syllabus ids are unique")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemId;
    use crate::progress::aggregate_catalogue;

    #[test]
    fn default_syllabus_shape() {
        let catalogue = default_catalogue();
        assert_eq!(catalogue.categories().len(), 7);
        assert_eq!(catalogue.len(), 29);
        assert_eq!(aggregate_catalogue(&catalogue).completed, 0);

        let ids = catalogue.flatten_ids();
        assert_eq!(ids.first(), Some(&ItemId::new("ps-1")));
        assert_eq!(ids.last(), Some(&ItemId::new("ai-3")));
    }

    #[test]
    fn default_plan_over_ten_days() {
        // 29 items over an 11-day inclusive range: ceil(29/11) = 3 per day.
        let catalogue = default_catalogue();
        let plan = crate::plan::build_plan_iso(&catalogue, "2026-01-01", "2026-01-11").unwrap();
        assert_eq!(plan.len(), 10);
        assert_eq!(plan[9].item_ids.len(), 2);
    }
}

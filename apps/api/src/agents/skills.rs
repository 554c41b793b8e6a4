//! Fixed skill vocabulary shared by the CV analyzer and the matcher.

/// Curated skills grouped by category. Entries are lowercase.
pub const SKILL_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "programming_languages",
        &[
            "python", "java", "javascript", "typescript", "c++", "c#", "go", "rust", "swift",
            "kotlin", "php", "ruby", "scala", "r", "matlab", "sql",
        ],
    ),
    (
        "frameworks_libraries",
        &[
            "react", "vue", "angular", "node.js", "express", "django", "flask", "fastapi",
            "spring", "laravel", "rails", "tensorflow", "pytorch", "scikit-learn", "pandas",
            "numpy", "matplotlib", "seaborn",
        ],
    ),
    (
        "databases",
        &[
            "postgresql", "mysql", "mongodb", "redis", "elasticsearch", "sqlite", "cassandra",
            "dynamodb", "neo4j",
        ],
    ),
    (
        "cloud_platforms",
        &[
            "aws", "azure", "gcp", "google cloud", "amazon web services", "microsoft azure",
            "cloudflare",
        ],
    ),
    (
        "devops_tools",
        &[
            "docker", "kubernetes", "terraform", "jenkins", "gitlab", "github actions",
            "ansible", "prometheus", "grafana", "elk stack",
        ],
    ),
    (
        "ai_ml",
        &[
            "machine learning", "deep learning", "neural networks", "nlp",
            "natural language processing", "computer vision", "reinforcement learning",
            "data science", "data analysis", "mlops",
        ],
    ),
    (
        "blockchain",
        &[
            "blockchain", "web3", "solidity", "ethereum", "smart contracts", "defi", "nft",
            "cairo", "starknet", "zkproofs", "zero knowledge",
        ],
    ),
    (
        "security",
        &[
            "cybersecurity", "penetration testing", "vulnerability assessment",
            "security auditing", "cryptography", "network security",
        ],
    ),
    (
        "devrel",
        &[
            "developer relations", "technical writing", "community management",
            "developer advocacy", "content creation", "documentation",
        ],
    ),
    (
        "data_engineering",
        &[
            "data engineering", "etl", "data pipelines", "apache spark", "kafka", "airflow",
            "data warehousing", "big data",
        ],
    ),
    (
        "general",
        &[
            "git", "linux", "bash", "agile", "scrum", "devops", "ci/cd", "rest api", "graphql",
            "microservices", "api development",
        ],
    ),
];

/// Every vocabulary skill once, in category order.
pub fn vocabulary() -> impl Iterator<Item = &'static str> {
    let mut seen = std::collections::HashSet::new();
    SKILL_CATEGORIES
        .iter()
        .flat_map(|(_, skills)| skills.iter().copied())
        .filter(move |s| seen.insert(*s))
}

/// Python-style title case: a letter is uppercased when it follows a non-letter.
/// `"node.js"` → `"Node.Js"`, `"ci/cd"` → `"Ci/Cd"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}
